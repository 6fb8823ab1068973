//! Line-oriented combat transcript grammar.
//!
//! The server resolves an entire encounter up front and streams the
//! result as an ordered list of UTF-8 lines. Two line shapes are
//! machine-readable; everything else is free text shown verbatim:
//!
//! ```text
//! COMBAT_INIT|<hp>/<max>|<mp>/<max>|#0Wolf[white]:30/30|#1Wolf[white]:30/30
//! COMBAT_STATUS|<hp>/<max>|<mp>/<max>|#0Wolf[white]:10/30|SUMMON:Skeleton:40/40
//! ```
//!
//! Classification is a prefix check, O(1) in the line length aside
//! from the final verbatim copy. A malformed init/status body degrades
//! to free text; a malformed entry inside a well-formed line is
//! skipped individually. One bad line never aborts a replay.

use crate::types::{Quality, ResourceMeter};

/// One classified transcript line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CombatLine {
    /// Seeds the session roster; consumed once, never rendered as text.
    Init(InitLine),
    /// Updates numeric state for the fields it mentions; not rendered.
    Status(StatusLine),
    /// Rendered verbatim with a style classification.
    Text(TextLine),
}

impl CombatLine {
    const INIT_PREFIX: &'static str = "COMBAT_INIT|";
    const STATUS_PREFIX: &'static str = "COMBAT_STATUS|";

    /// Classifies a single transcript line. Infallible: unknown or
    /// malformed shapes come back as free text.
    pub fn classify(line: &str) -> Self {
        if let Some(body) = line.strip_prefix(Self::INIT_PREFIX) {
            if let Some(init) = InitLine::parse(body) {
                return Self::Init(init);
            }
            tracing::debug!(line, "malformed init line, treating as text");
        } else if let Some(body) = line.strip_prefix(Self::STATUS_PREFIX) {
            if let Some(status) = StatusLine::parse(body) {
                return Self::Status(status);
            }
            tracing::debug!(line, "malformed status line, treating as text");
        }
        Self::Text(TextLine::new(line))
    }
}

/// Roster seed emitted once at the head of a transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitLine {
    pub player_hp: ResourceMeter,
    pub player_mp: ResourceMeter,
    pub monsters: Vec<MonsterEntry>,
}

/// One `#<index><name>[<quality>]:<hp>/<max>` roster entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterEntry {
    /// Stable index assigned by the server, unique within the session.
    pub index: u32,
    pub name: String,
    pub quality: Quality,
    pub hp: ResourceMeter,
}

impl InitLine {
    fn parse(body: &str) -> Option<Self> {
        let mut fields = body.split('|');
        let player_hp = ResourceMeter::parse(fields.next()?)?;
        let player_mp = ResourceMeter::parse(fields.next()?)?;

        let mut monsters = Vec::new();
        for field in fields.filter(|f| !f.is_empty()) {
            match MonsterEntry::parse(field) {
                Some(entry) => monsters.push(entry),
                // A single bad entry is dropped, not the whole line.
                None => tracing::debug!(field, "skipping malformed init entry"),
            }
        }
        Some(Self {
            player_hp,
            player_mp,
            monsters,
        })
    }
}

impl MonsterEntry {
    fn parse(field: &str) -> Option<Self> {
        let rest = field.strip_prefix('#')?;
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let index = rest[..digits].parse().ok()?;

        let rest = &rest[digits..];
        let (name, rest) = rest.split_once('[')?;
        let (quality, rest) = rest.split_once(']')?;
        if name.is_empty() {
            return None;
        }
        let quality = quality.parse().ok()?;
        let hp = ResourceMeter::parse(rest.strip_prefix(':')?)?;

        Some(Self {
            index,
            name: name.to_owned(),
            quality,
            hp,
        })
    }
}

/// Per-round numeric update. Only the fields present change state;
/// a missing summon field means "hide the indicator", not "unchanged".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLine {
    pub player_hp: ResourceMeter,
    pub player_mp: ResourceMeter,
    pub monsters: Vec<MonsterStatus>,
    pub summon: Option<SummonStatus>,
}

/// Partial monster update: only the leading `#index` and the trailing
/// `hp/max` are authoritative; anything between is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonsterStatus {
    pub index: u32,
    pub hp: ResourceMeter,
}

/// `SUMMON:<name>:<hp>/<max>` field on a status line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummonStatus {
    pub name: String,
    pub hp: ResourceMeter,
}

impl StatusLine {
    const SUMMON_PREFIX: &'static str = "SUMMON:";

    fn parse(body: &str) -> Option<Self> {
        let mut fields = body.split('|');
        let player_hp = ResourceMeter::parse(fields.next()?)?;
        let player_mp = ResourceMeter::parse(fields.next()?)?;

        let mut monsters = Vec::new();
        let mut summon = None;
        for field in fields.filter(|f| !f.is_empty()) {
            if let Some(rest) = field.strip_prefix(Self::SUMMON_PREFIX) {
                match SummonStatus::parse(rest) {
                    Some(status) => summon = Some(status),
                    None => tracing::debug!(field, "skipping malformed summon entry"),
                }
            } else {
                match MonsterStatus::parse(field) {
                    Some(status) => monsters.push(status),
                    None => tracing::debug!(field, "skipping malformed status entry"),
                }
            }
        }
        Some(Self {
            player_hp,
            player_mp,
            monsters,
            summon,
        })
    }
}

impl MonsterStatus {
    fn parse(field: &str) -> Option<Self> {
        let rest = field.strip_prefix('#')?;
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let index = rest[..digits].parse().ok()?;
        // Trailing text between name and meter is ignored.
        let (_, meter) = rest.rsplit_once(':')?;
        let hp = ResourceMeter::parse(meter)?;
        Some(Self { index, hp })
    }
}

impl SummonStatus {
    fn parse(rest: &str) -> Option<Self> {
        let (name, meter) = rest.rsplit_once(':')?;
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_owned(),
            hp: ResourceMeter::parse(meter)?,
        })
    }
}

/// Display style of a free-text line.
///
/// Variants mirror the server's log vocabulary; the render layer maps
/// them to whatever styling it has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextStyle {
    Round,
    Victory,
    Defeat,
    Crit,
    Lifesteal,
    Stun,
    Poison,
    Splash,
    Block,
    Dodge,
    DoubleAttack,
    Damage,
    #[default]
    Plain,
}

/// Keyword table in priority order; the first containment match wins.
///
/// The order is a contract: a line carrying both a crit marker and the
/// generic damage token must style as a crit. Tokens are the server's
/// actual (Chinese) vocabulary, checked case-sensitively.
const STYLE_KEYWORDS: &[(TextStyle, &[&str])] = &[
    (TextStyle::Round, &["回合"]),
    (TextStyle::Victory, &["胜利"]),
    (TextStyle::Defeat, &["失败"]),
    (TextStyle::Crit, &["暴击", "压碎"]),
    (TextStyle::Lifesteal, &["吸血", "恢复"]),
    (TextStyle::Stun, &["眩晕"]),
    (TextStyle::Poison, &["中毒", "毒伤"]),
    (TextStyle::Splash, &["溅射"]),
    (TextStyle::Block, &["格挡", "减伤", "反弹"]),
    (TextStyle::Dodge, &["闪避"]),
    (TextStyle::DoubleAttack, &["双击"]),
    (TextStyle::Damage, &["伤害"]),
];

/// Free-text transcript line with its resolved style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub style: TextStyle,
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let style = TextStyle::classify(&text);
        Self { text, style }
    }
}

impl TextStyle {
    /// Resolves the style of one free-text line.
    pub fn classify(text: &str) -> Self {
        for (style, keywords) in STYLE_KEYWORDS {
            if keywords.iter().any(|keyword| text.contains(keyword)) {
                return *style;
            }
        }
        Self::Plain
    }
}
