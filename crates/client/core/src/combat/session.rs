//! One combat encounter being replayed.

use game_protocol::{
    CharacterSnapshot, CombatLine, CombatResultPayload, InitLine, Quality, ResourceMeter,
    StatusLine, TextLine,
};

/// One monster in the session roster, keyed by the stable index the
/// server assigned at init time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonsterView {
    pub index: u32,
    pub name: String,
    pub quality: Quality,
    pub hp: ResourceMeter,
}

/// Summon indicator. Present only while the latest status line carried
/// a `SUMMON:` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummonView {
    pub name: String,
    pub hp: ResourceMeter,
}

/// Immutable render snapshot of the session's numeric state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatView {
    pub player_hp: ResourceMeter,
    pub player_mp: ResourceMeter,
    pub summon: Option<SummonView>,
    /// Roster in init order.
    pub monsters: Vec<MonsterView>,
}

/// What one scheduler tick did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// An init line seeded the roster; nothing is rendered as text.
    Seeded,
    /// A status line updated numeric state; nothing is rendered.
    StatusApplied,
    /// A free-text line became visible.
    Rendered(TextLine),
}

/// Exclusively owned replay state for a single encounter.
///
/// Lines are classified at consumption time, so replaying a session is
/// a pure function of the transcript: parsing twice yields the same
/// updates.
#[derive(Debug)]
pub struct CombatSession {
    view: CombatView,
    transcript: Vec<String>,
    cursor: usize,
    finished: bool,
    victory: bool,
    character: Option<CharacterSnapshot>,
}

impl CombatSession {
    pub fn new(payload: CombatResultPayload) -> Self {
        Self {
            view: CombatView::default(),
            transcript: payload.logs,
            cursor: 0,
            finished: false,
            victory: payload.victory,
            character: payload.character,
        }
    }

    pub fn view(&self) -> &CombatView {
        &self.view
    }

    pub fn victory(&self) -> bool {
        self.victory
    }

    /// Refreshed character sheet to apply when a victorious replay
    /// completes.
    pub fn take_character(&mut self) -> Option<CharacterSnapshot> {
        self.character.take()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn remaining(&self) -> usize {
        self.transcript.len() - self.cursor
    }

    /// Consumes exactly one transcript line. Returns `None` once the
    /// transcript is exhausted; consuming the final line sets
    /// `finished`.
    pub fn advance(&mut self) -> Option<TickOutcome> {
        let line = self.transcript.get(self.cursor)?;
        self.cursor += 1;

        let outcome = match CombatLine::classify(line) {
            CombatLine::Init(init) => {
                self.seed(init);
                TickOutcome::Seeded
            }
            CombatLine::Status(status) => {
                self.apply_status(status);
                TickOutcome::StatusApplied
            }
            CombatLine::Text(text) => TickOutcome::Rendered(text),
        };

        if self.cursor == self.transcript.len() {
            self.finished = true;
        }
        Some(outcome)
    }

    fn seed(&mut self, init: InitLine) {
        self.view.player_hp = init.player_hp;
        self.view.player_mp = init.player_mp;
        for entry in init.monsters {
            let monster = MonsterView {
                index: entry.index,
                name: entry.name,
                quality: entry.quality,
                hp: entry.hp,
            };
            // A duplicate index keeps the later entry.
            match self.view.monsters.iter_mut().find(|m| m.index == monster.index) {
                Some(existing) => *existing = monster,
                None => self.view.monsters.push(monster),
            }
        }
    }

    fn apply_status(&mut self, status: StatusLine) {
        self.view.player_hp = status.player_hp;
        self.view.player_mp = status.player_mp;
        for update in status.monsters {
            match self.view.monsters.iter_mut().find(|m| m.index == update.index) {
                Some(monster) => monster.hp = update.hp,
                // The server never mentions an unseeded index; drop it.
                None => tracing::debug!(index = update.index, "status for unknown monster"),
            }
        }
        // Wholesale replacement: an absent SUMMON field hides the
        // indicator rather than leaving the previous value.
        self.view.summon = status.summon.map(|summon| SummonView {
            name: summon.name,
            hp: summon.hp,
        });
    }
}
