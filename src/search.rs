//! This module implements the backtracking search that turns pruned domains into a complete
//! assignment. Variable ordering uses minimum-remaining-values with a maximum-degree tie-break,
//! value ordering uses least-constraining-value, and every failure path undoes exactly the
//! tentative assignment it made, so sibling branches always see the pre-attempt state. All
//! tie-breaks fall back to id order, so a given problem always searches the same tree.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::consistency::{ac3, enforce_node_consistency, glyph_counts_at_cell};
use crate::domain::Domains;
use crate::grid::{Grid, SlotId};
use crate::types::WordId;
use crate::word_list::WordList;
use crate::CHECK_INVARIANTS;

/// A struct tracking stats about the search process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Partial assignments visited (`backtrack` calls on an incomplete assignment).
    pub states: usize,

    /// Tentative assignments undone, whether because they were inconsistent or because the
    /// branch below them failed.
    pub backtracks: usize,
}

/// A partial mapping from slots to words, built up and torn down during search. The search owns
/// this exclusively; `assign` and `unassign` are the only mutators.
#[derive(Debug, Clone)]
pub struct Assignment {
    words_by_slot: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment over the given number of slots.
    #[must_use]
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            words_by_slot: vec![None; slot_count],
            assigned_count: 0,
        }
    }

    /// The word assigned to the given slot, if any.
    #[must_use]
    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words_by_slot[slot_id]
    }

    /// Does every slot have a word?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.words_by_slot.len()
    }

    /// Tentatively place a word in an unoccupied slot.
    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) {
        if CHECK_INVARIANTS && self.words_by_slot[slot_id].is_some() {
            panic!("Assigning into an occupied slot?");
        }

        self.words_by_slot[slot_id] = Some(word_id);
        self.assigned_count += 1;
    }

    /// Remove a slot's tentative word, restoring the pre-assignment state.
    pub fn unassign(&mut self, slot_id: SlotId) {
        if CHECK_INVARIANTS && self.words_by_slot[slot_id].is_none() {
            panic!("Unassigning an empty slot?");
        }

        self.words_by_slot[slot_id] = None;
        self.assigned_count -= 1;
    }

    /// Iterate over the (slot, word) pairs assigned so far.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.words_by_slot
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word)| word.map(|word_id| (slot_id, word_id)))
    }
}

/// Is the assignment consistent as a whole? Checks, from scratch each call: no word is used
/// twice, every word's length matches its slot, and every assigned neighbor pair agrees at its
/// shared cell.
#[must_use]
pub fn consistent(grid: &Grid, word_list: &WordList, assignment: &Assignment) -> bool {
    let mut used_words: HashSet<WordId> = HashSet::new();

    for (slot_id, word_id) in assignment.iter() {
        if !used_words.insert(word_id) {
            return false;
        }

        let word = &word_list.words[word_id];
        let slot = &grid.slot_configs[slot_id];
        if word.len() != slot.length {
            return false;
        }

        for &neighbor_id in grid.neighbors(slot_id) {
            let Some(neighbor_word_id) = assignment.get(neighbor_id) else {
                continue;
            };

            let (cell, neighbor_cell) = grid
                .overlap(slot_id, neighbor_id)
                .expect("neighbors must have an overlap");
            let neighbor_word = &word_list.words[neighbor_word_id];

            if word.glyphs[cell] != neighbor_word.glyphs[neighbor_cell] {
                return false;
            }
        }
    }

    true
}

/// Pick the next slot to fill: fewest remaining candidates first (MRV), ties broken by most
/// neighbors (degree), remaining ties by lowest slot id. Must only be called while at least one
/// slot is unassigned.
#[must_use]
pub fn select_unassigned_variable(
    grid: &Grid,
    domains: &Domains,
    assignment: &Assignment,
) -> SlotId {
    (0..grid.slot_configs.len())
        .filter(|&slot_id| assignment.get(slot_id).is_none())
        .min_by_key(|&slot_id| {
            (
                domains.option_count(slot_id),
                Reverse(grid.neighbors(slot_id).len()),
                slot_id,
            )
        })
        .expect("select_unassigned_variable called with a complete assignment")
}

/// Order a slot's candidates by how many options they would rule out across unassigned
/// neighboring slots, least-constraining first. Ties fall back to word id so the ordering is
/// reproducible regardless of domain-set iteration order. Domains must already be
/// node-consistent.
#[must_use]
pub fn order_domain_values(
    grid: &Grid,
    word_list: &WordList,
    domains: &Domains,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    let unassigned_neighbors: Vec<SlotId> = grid
        .neighbors(slot_id)
        .iter()
        .copied()
        .filter(|&neighbor_id| assignment.get(neighbor_id).is_none())
        .collect();

    // For each unassigned neighbor, count the glyphs available at the shared cell once; a
    // candidate putting glyph g there rules out every neighbor option that *doesn't* have g.
    let neighbor_counts: Vec<(usize, usize, Vec<u32>)> = unassigned_neighbors
        .iter()
        .map(|&neighbor_id| {
            let (cell, neighbor_cell) = grid
                .overlap(slot_id, neighbor_id)
                .expect("neighbors must have an overlap");
            let counts = glyph_counts_at_cell(word_list, domains.options(neighbor_id), neighbor_cell);
            (cell, domains.option_count(neighbor_id), counts)
        })
        .collect();

    let mut candidates: Vec<(usize, WordId)> = domains
        .options(slot_id)
        .iter()
        .map(|&word_id| {
            let word = &word_list.words[word_id];
            let ruled_out: usize = neighbor_counts
                .iter()
                .map(|(cell, neighbor_option_count, counts)| {
                    neighbor_option_count - counts[word.glyphs[*cell]] as usize
                })
                .sum();

            (ruled_out, word_id)
        })
        .collect();

    candidates.sort_unstable();

    candidates.into_iter().map(|(_, word_id)| word_id).collect()
}

/// Depth-first search over partial assignments. Returns true once the assignment is complete and
/// consistent; on any failure the tentative entry is removed before trying the next candidate or
/// returning, so the caller's assignment is exactly as it was.
pub fn backtrack(
    grid: &Grid,
    word_list: &WordList,
    domains: &Domains,
    assignment: &mut Assignment,
    statistics: &mut Statistics,
) -> bool {
    if assignment.is_complete() {
        return true;
    }

    statistics.states += 1;

    let slot_id = select_unassigned_variable(grid, domains, assignment);

    for word_id in order_domain_values(grid, word_list, domains, assignment, slot_id) {
        assignment.assign(slot_id, word_id);

        if consistent(grid, word_list, assignment)
            && backtrack(grid, word_list, domains, assignment, statistics)
        {
            return true;
        }

        assignment.unassign(slot_id);
        statistics.backtracks += 1;
    }

    false
}

/// A struct representing the results of a successful solve.
#[derive(Debug)]
pub struct Solution {
    pub assignment: Assignment,
    pub statistics: Statistics,
}

/// Solve the whole problem: enforce node consistency, establish arc consistency (reporting
/// unsatisfiability immediately if any domain is wiped out, without entering backtracking), then
/// search from an empty assignment. `None` means no solution exists; it is a normal outcome, not
/// an error.
#[must_use]
pub fn solve(grid: &Grid, word_list: &WordList) -> Option<Solution> {
    let mut domains = Domains::new(grid, word_list);

    enforce_node_consistency(grid, word_list, &mut domains);

    if !ac3(grid, word_list, &mut domains, None) {
        return None;
    }

    let mut assignment = Assignment::new(grid.slot_configs.len());
    let mut statistics = Statistics::default();

    if backtrack(grid, word_list, &domains, &mut assignment, &mut statistics) {
        Some(Solution {
            assignment,
            statistics,
        })
    } else {
        None
    }
}

/// Turn a (possibly partial) assignment into a (row, column) letter lookup covering the full
/// grid rectangle. Only open cells carry letters; a pure function with no side effects.
#[must_use]
pub fn letter_grid(
    grid: &Grid,
    word_list: &WordList,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let mut letters: Vec<Vec<Option<char>>> = vec![vec![None; grid.width]; grid.height];

    for (slot_id, word_id) in assignment.iter() {
        let slot = &grid.slot_configs[slot_id];
        let word = &word_list.words[word_id];

        for (cell_idx, &(x, y)) in slot.cell_coords().iter().enumerate() {
            letters[y][x] = Some(word_list.glyphs[word.glyphs[cell_idx]]);
        }
    }

    letters
}

/// Render an assignment as a text grid: `#` for blocked cells, the assigned letter for filled
/// cells, and a space for open cells no slot has filled yet.
#[must_use]
pub fn render_grid(grid: &Grid, word_list: &WordList, assignment: &Assignment) -> String {
    let letters = letter_grid(grid, word_list, assignment);

    (0..grid.height)
        .map(|y| {
            (0..grid.width)
                .map(|x| {
                    if grid.is_open(x, y) {
                        letters[y][x].unwrap_or(' ')
                    } else {
                        '#'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
