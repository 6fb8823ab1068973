//! Runeword recipe compatibility matching.
//!
//! Pure functions over the target item, the player's rune counts and
//! the server-supplied recipe catalog. Socketing itself is adjudicated
//! server-side; the matcher only tells the player which recipes their
//! socketed prefix can still become, what would complete each one and
//! what is missing.

use std::collections::HashMap;

use game_protocol::{ItemSnapshot, RuneId, RunewordRecipe};

/// Multiset of runes the player has available to socket.
#[derive(Clone, Debug, Default)]
pub struct RuneCounts {
    counts: HashMap<RuneId, u32>,
}

impl RuneCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tallies rune stacks out of an inventory listing. Which items
    /// are runes is decided by the catalog, not by item metadata.
    pub fn from_inventory<'a>(
        items: impl IntoIterator<Item = &'a ItemSnapshot>,
        is_rune: impl Fn(&str) -> bool,
    ) -> Self {
        let mut counts = Self::new();
        for item in items {
            if is_rune(&item.item_id) {
                counts.add(item.item_id.clone(), item.quantity);
            }
        }
        counts
    }

    pub fn add(&mut self, rune: RuneId, quantity: u32) {
        *self.counts.entry(rune).or_insert(0) += quantity;
    }

    pub fn count(&self, rune: &str) -> u32 {
        self.counts.get(rune).copied().unwrap_or(0)
    }

    fn take(&mut self, rune: &str) -> bool {
        match self.counts.get_mut(rune) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

impl<I: Into<RuneId>> FromIterator<(I, u32)> for RuneCounts {
    fn from_iter<T: IntoIterator<Item = (I, u32)>>(iter: T) -> Self {
        let mut counts = Self::new();
        for (rune, quantity) in iter {
            counts.add(rune.into(), quantity);
        }
        counts
    }
}

/// The socketing-relevant slice of an equipment piece.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SocketedItem {
    pub slot: String,
    pub total_sockets: u32,
    /// Socketed runes in socketing order; semantically a recipe prefix.
    pub socketed: Vec<RuneId>,
    /// Set once a recipe completed; such an item accepts no more runes.
    pub runeword_id: Option<String>,
}

/// One recipe the item is still compatible with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunewordCandidate<'a> {
    pub recipe: &'a RunewordRecipe,
    /// Runes still to socket, in required order.
    pub remaining_runes: Vec<RuneId>,
    /// Required runes the player does not have enough of.
    pub missing_runes: Vec<RuneId>,
    pub can_complete: bool,
    /// Count of already-socketed runes.
    pub progress: usize,
}

/// Ranks every recipe the item's socketed prefix can still become.
///
/// A recipe qualifies only if its slot set contains the item's slot
/// and its sequence length equals the item's total socket count
/// exactly; the socketed list must then be a prefix of the sequence.
/// Results order completable candidates first, each group ascending by
/// level requirement. An empty catalog or no match yields an empty
/// list, not an error.
pub fn match_runewords<'a>(
    item: &SocketedItem,
    available: &RuneCounts,
    catalog: &'a [RunewordRecipe],
) -> Vec<RunewordCandidate<'a>> {
    if item.runeword_id.is_some() {
        return Vec::new();
    }

    let mut candidates: Vec<RunewordCandidate<'a>> = catalog
        .iter()
        .filter(|recipe| recipe.allowed_slots.iter().any(|slot| *slot == item.slot))
        .filter(|recipe| recipe.runes.len() == item.total_sockets as usize)
        .filter(|recipe| recipe.runes.starts_with(&item.socketed))
        .map(|recipe| evaluate(recipe, item, available))
        .collect();

    candidates.sort_by(|a, b| {
        b.can_complete
            .cmp(&a.can_complete)
            .then(a.recipe.level_req.cmp(&b.recipe.level_req))
    });
    candidates
}

fn evaluate<'a>(
    recipe: &'a RunewordRecipe,
    item: &SocketedItem,
    available: &RuneCounts,
) -> RunewordCandidate<'a> {
    let progress = item.socketed.len();
    let remaining_runes: Vec<RuneId> = recipe.runes[progress..].to_vec();

    let mut pool = available.clone();
    let missing_runes: Vec<RuneId> = remaining_runes
        .iter()
        .filter(|rune| !pool.take(rune))
        .cloned()
        .collect();

    RunewordCandidate {
        recipe,
        can_complete: missing_runes.is_empty(),
        remaining_runes,
        missing_runes,
        progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(id: &str, slots: &[&str], runes: &[&str], level_req: u32) -> RunewordRecipe {
        RunewordRecipe {
            id: id.to_owned(),
            name: id.to_owned(),
            allowed_slots: slots.iter().map(|s| (*s).to_owned()).collect(),
            runes: runes.iter().map(|s| (*s).to_owned()).collect(),
            level_req,
        }
    }

    fn weapon(total_sockets: u32, socketed: &[&str]) -> SocketedItem {
        SocketedItem {
            slot: "weapon".to_owned(),
            total_sockets,
            socketed: socketed.iter().map(|s| (*s).to_owned()).collect(),
            runeword_id: None,
        }
    }

    #[test]
    fn prefix_match_reports_missing_runes() {
        let catalog = vec![recipe("kings", &["weapon"], &["a", "b", "c"], 25)];
        let available: RuneCounts = [("b", 1)].into_iter().collect();

        let candidates = match_runewords(&weapon(3, &["a"]), &available, &catalog);
        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.progress, 1);
        assert_eq!(candidate.remaining_runes, ["b", "c"]);
        assert_eq!(candidate.missing_runes, ["c"]);
        assert!(!candidate.can_complete);
    }

    #[test]
    fn unsocketed_item_with_full_runes_completes() {
        let catalog = vec![recipe("kings", &["weapon"], &["a", "b", "c"], 25)];
        let available: RuneCounts = [("a", 1), ("b", 1), ("c", 1)].into_iter().collect();

        let candidates = match_runewords(&weapon(3, &[]), &available, &catalog);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].can_complete);
        assert!(candidates[0].missing_runes.is_empty());
        assert_eq!(candidates[0].remaining_runes, ["a", "b", "c"]);
    }

    #[test]
    fn repeated_runes_decrement_the_pool() {
        let catalog = vec![recipe("echo", &["weapon"], &["a", "a"], 10)];
        let one: RuneCounts = [("a", 1)].into_iter().collect();
        let two: RuneCounts = [("a", 2)].into_iter().collect();

        let short = match_runewords(&weapon(2, &[]), &one, &catalog);
        assert_eq!(short[0].missing_runes, ["a"]);

        let full = match_runewords(&weapon(2, &[]), &two, &catalog);
        assert!(full[0].can_complete);
    }

    #[test]
    fn socket_count_must_match_exactly() {
        let catalog = vec![
            recipe("short", &["weapon"], &["a", "b"], 5),
            recipe("long", &["weapon"], &["a", "b", "c", "d"], 5),
        ];
        let available = RuneCounts::new();
        assert!(match_runewords(&weapon(3, &[]), &available, &catalog).is_empty());
    }

    #[test]
    fn wrong_slot_and_broken_prefix_disqualify() {
        let catalog = vec![
            recipe("armor_only", &["armor"], &["a", "b"], 5),
            recipe("weapon_two", &["weapon"], &["a", "b"], 5),
        ];
        let available = RuneCounts::new();

        let candidates = match_runewords(&weapon(2, &["b"]), &available, &catalog);
        // "b" is not a prefix of [a, b]; the armor recipe never applied.
        assert!(candidates.is_empty());
    }

    #[test]
    fn completed_item_matches_nothing() {
        let catalog = vec![recipe("kings", &["weapon"], &["a"], 1)];
        let available: RuneCounts = [("a", 1)].into_iter().collect();
        let mut item = weapon(1, &["a"]);
        item.runeword_id = Some("kings".to_owned());

        assert!(match_runewords(&item, &available, &catalog).is_empty());
    }

    #[test]
    fn ordering_puts_completable_first_then_level() {
        let catalog = vec![
            recipe("late", &["weapon"], &["a"], 20),
            recipe("early", &["weapon"], &["b"], 10),
            recipe("unreachable", &["weapon"], &["z"], 5),
        ];
        let available: RuneCounts = [("a", 1), ("b", 1)].into_iter().collect();

        let candidates = match_runewords(&weapon(1, &[]), &available, &catalog);
        let order: Vec<&str> = candidates.iter().map(|c| c.recipe.id.as_str()).collect();
        // Completable at levels 10 and 20 first, then the level-5
        // recipe the player cannot finish.
        assert_eq!(order, ["early", "late", "unreachable"]);
    }

    #[test]
    fn empty_catalog_is_not_an_error() {
        let available = RuneCounts::new();
        assert!(match_runewords(&weapon(2, &[]), &available, &[]).is_empty());
    }

    #[test]
    fn rune_counts_from_inventory_uses_catalog_membership() {
        let items = vec![
            ItemSnapshot {
                item_id: "tir".to_owned(),
                quantity: 3,
                ..ItemSnapshot::default()
            },
            ItemSnapshot {
                item_id: "sword".to_owned(),
                quantity: 1,
                ..ItemSnapshot::default()
            },
        ];
        let counts = RuneCounts::from_inventory(&items, |id| id == "tir");
        assert_eq!(counts.count("tir"), 3);
        assert_eq!(counts.count("sword"), 0);
    }
}
