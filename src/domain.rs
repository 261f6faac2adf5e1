//! This module implements the per-slot domain store: the set of candidate words still available
//! for each slot. Domains start as the full word list and only ever shrink -- node consistency,
//! arc consistency, and value ordering all read them, but `shrink` is the only mutator.

use std::collections::HashSet;
use std::fmt;
use std::fmt::Debug;

use crate::grid::{Grid, SlotId};
use crate::types::WordId;
use crate::word_list::WordList;

/// The candidate-word sets for every slot in a grid. Indexed by `SlotId`.
#[derive(Clone)]
pub struct Domains {
    options_by_slot: Vec<HashSet<WordId>>,
}

impl Domains {
    /// Initialize every slot's domain to the complete word list. No filtering happens here; node
    /// consistency is responsible for the first pruning pass.
    #[must_use]
    pub fn new(grid: &Grid, word_list: &WordList) -> Domains {
        let full_set: HashSet<WordId> = (0..word_list.words.len()).collect();

        Domains {
            options_by_slot: vec![full_set; grid.slot_configs.len()],
        }
    }

    /// The candidate words currently available for the given slot.
    #[must_use]
    pub fn options(&self, slot_id: SlotId) -> &HashSet<WordId> {
        &self.options_by_slot[slot_id]
    }

    /// Remove a specific word from a slot's domain, returning whether it was present.
    pub fn shrink(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.options_by_slot[slot_id].remove(&word_id)
    }

    /// Has this slot's domain been emptied? An empty domain proves the problem unsatisfiable.
    #[must_use]
    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.options_by_slot[slot_id].is_empty()
    }

    /// The number of candidates remaining for the given slot.
    #[must_use]
    pub fn option_count(&self, slot_id: SlotId) -> usize {
        self.options_by_slot[slot_id].len()
    }
}

impl Debug for Domains {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domains")
            .field(
                "option_counts",
                &self
                    .options_by_slot
                    .iter()
                    .map(HashSet::len)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
