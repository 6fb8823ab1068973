//! Client configuration loaded from the process environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Everything the binary needs to connect and run.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// WebSocket endpoint of the game server.
    pub server_url: String,
    /// Session identifier for the log directory; auto-generated when
    /// absent.
    pub session_id: Option<String>,
    /// Override for the log directory root.
    pub log_dir: Option<PathBuf>,
    /// Combat replay cadence. The reference cadence is 200 ms; only
    /// local tooling should change it.
    pub combat_tick: Duration,
    /// Interval between keepalive pings.
    pub ping_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8765/ws".to_owned(),
            session_id: None,
            log_dir: None,
            combat_tick: client_core::combat::DEFAULT_TICK,
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `LEGEND_SERVER_URL` - WebSocket endpoint (default: ws://127.0.0.1:8765/ws)
    /// - `LEGEND_SESSION_ID` - Session identifier for log files (default: auto-generated)
    /// - `LEGEND_LOG_DIR` - Log directory root (default: platform cache dir)
    /// - `LEGEND_COMBAT_TICK_MS` - Combat replay tick in milliseconds (default: 200)
    /// - `LEGEND_PING_INTERVAL_SECS` - Keepalive interval in seconds (default: 30)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("LEGEND_SERVER_URL") {
            config.server_url = url;
        }
        config.session_id = env::var("LEGEND_SESSION_ID").ok();
        config.log_dir = env::var("LEGEND_LOG_DIR").ok().map(PathBuf::from);

        if let Some(ms) = read_env::<u64>("LEGEND_COMBAT_TICK_MS") {
            config.combat_tick = Duration::from_millis(ms.max(1));
        }
        if let Some(secs) = read_env::<u64>("LEGEND_PING_INTERVAL_SECS") {
            config.ping_interval = Duration::from_secs(secs.max(1));
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
