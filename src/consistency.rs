//! This module implements the consistency engine that prunes slot domains before and during
//! search:
//!
//! - Node consistency removes every candidate whose length doesn't match its slot.
//!
//! - Arc consistency (AC-3) removes every candidate that relies on a letter no crossing slot can
//!   still supply. For example, if the crossing slot has no options with the letter A in the
//!   shared cell, we want to remove any options for this slot that put an A there.
//!
//! We keep applying the arc rule until no more eliminations are possible or some domain is wiped
//! out, which proves the problem unsatisfiable.

use std::collections::{HashSet, VecDeque};

use crate::domain::Domains;
use crate::grid::{Grid, SlotId};
use crate::types::WordId;
use crate::word_list::WordList;

/// Count the occurrences of each glyph at one cell position across the given options. Indexed by
/// `GlyphId`; a zero count means no remaining option supplies that glyph in that cell.
#[must_use]
pub fn glyph_counts_at_cell(
    word_list: &WordList,
    options: &HashSet<WordId>,
    cell_idx: usize,
) -> Vec<u32> {
    let mut counts = vec![0; word_list.glyphs.len()];

    for &word_id in options {
        counts[word_list.words[word_id].glyphs[cell_idx]] += 1;
    }

    counts
}

/// Make every slot node-consistent by removing candidates whose length differs from the slot's.
/// Runs once, before arc consistency.
pub fn enforce_node_consistency(grid: &Grid, word_list: &WordList, domains: &mut Domains) {
    for slot in &grid.slot_configs {
        let mismatched: Vec<WordId> = domains
            .options(slot.id)
            .iter()
            .copied()
            .filter(|&word_id| word_list.words[word_id].len() != slot.length)
            .collect();

        for word_id in mismatched {
            domains.shrink(slot.id, word_id);
        }
    }
}

/// Make slot `x` arc-consistent with its neighbor `y`: remove from x's domain every word whose
/// letter at the shared cell has no supporting option left in y's domain. Returns whether x's
/// domain changed. Slots without an overlap need no revision. Domains must already be
/// node-consistent, so that every candidate reaches the shared cell.
pub fn revise(
    grid: &Grid,
    word_list: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some((x_cell, y_cell)) = grid.overlap(x, y) else {
        return false;
    };

    let support_counts = glyph_counts_at_cell(word_list, domains.options(y), y_cell);

    let unsupported: Vec<WordId> = domains
        .options(x)
        .iter()
        .copied()
        .filter(|&word_id| {
            let glyph = word_list.words[word_id].glyphs[x_cell];
            support_counts[glyph] == 0
        })
        .collect();

    let revised = !unsupported.is_empty();
    for word_id in unsupported {
        domains.shrink(x, word_id);
    }

    revised
}

/// Enforce arc consistency over the whole problem (or over `initial_arcs`, if given) using a FIFO
/// worklist. Each arc (x, y) is revised in turn; when a revision shrinks x, every arc (z, x) for
/// the other neighbors z of x is re-enqueued, since the shrinkage may have invalidated their
/// support. Returns false as soon as any domain is wiped out; returns true once the worklist
/// drains with all domains non-empty (a fixed point -- re-running makes no further removals).
pub fn ac3(
    grid: &Grid,
    word_list: &WordList,
    domains: &mut Domains,
    initial_arcs: Option<Vec<(SlotId, SlotId)>>,
) -> bool {
    // A domain can arrive empty (node consistency may have wiped it out), and a slot with no
    // neighbors would never be popped from the worklist, so check up front.
    if grid
        .slot_configs
        .iter()
        .any(|slot| domains.is_empty(slot.id))
    {
        return false;
    }

    let mut arcs: VecDeque<(SlotId, SlotId)> = initial_arcs.map_or_else(
        || {
            grid.slot_configs
                .iter()
                .flat_map(|slot| {
                    grid.neighbors(slot.id)
                        .iter()
                        .map(move |&neighbor| (slot.id, neighbor))
                })
                .collect()
        },
        VecDeque::from,
    );

    while let Some((x, y)) = arcs.pop_front() {
        if revise(grid, word_list, domains, x, y) {
            if domains.is_empty(x) {
                return false;
            }

            for &z in grid.neighbors(x) {
                if z != y {
                    arcs.push_back((z, x));
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use crate::consistency::{ac3, enforce_node_consistency, revise};
    use crate::domain::Domains;
    use crate::grid::{Grid, SlotId};
    use crate::word_list::WordList;

    /// One across slot (id 0) crossing one down slot (id 1) at each slot's middle cell.
    fn plus_grid() -> Grid {
        Grid::parse(
            "
            #.#
            ...
            #.#
            ",
        )
        .unwrap()
    }

    fn word_id(word_list: &WordList, s: &str) -> usize {
        word_list.word_id_by_string[s]
    }

    #[test]
    fn test_node_consistency_keeps_only_matching_lengths() {
        let grid = plus_grid();
        let word_list = WordList::from_contents("cat\ndog\nhouse\nto\nstereo\n").unwrap();
        let mut domains = Domains::new(&grid, &word_list);

        enforce_node_consistency(&grid, &word_list, &mut domains);

        for slot in &grid.slot_configs {
            assert_eq!(domains.option_count(slot.id), 2);
            for &option in domains.options(slot.id) {
                assert_eq!(word_list.words[option].len(), slot.length);
            }
        }
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let grid = plus_grid();
        let word_list = WordList::from_contents("cat\ndog\ntoo\n").unwrap();
        let mut domains = Domains::new(&grid, &word_list);
        enforce_node_consistency(&grid, &word_list, &mut domains);

        // Restrict the down slot to "too"; "cat" across has no middle-'o' support anymore.
        domains.shrink(1, word_id(&word_list, "cat"));
        domains.shrink(1, word_id(&word_list, "dog"));

        assert!(revise(&grid, &word_list, &mut domains, 0, 1));
        assert_eq!(domains.option_count(0), 1);
        assert!(domains.options(0).contains(&word_id(&word_list, "dog")));

        // A second pass has nothing left to remove.
        assert!(!revise(&grid, &word_list, &mut domains, 0, 1));
    }

    #[test]
    fn test_revise_is_a_no_op_without_an_overlap() {
        let grid = Grid::parse("...\n###\n...").unwrap();
        let word_list = WordList::from_contents("cat\ndog\n").unwrap();
        let mut domains = Domains::new(&grid, &word_list);

        assert!(!revise(&grid, &word_list, &mut domains, 0, 1));
        assert_eq!(domains.option_count(0), 2);
    }

    #[test]
    fn test_ac3_reaches_a_fixed_point() {
        let grid = plus_grid();
        let word_list = WordList::from_contents("cat\ndog\ntoo\ntin\n").unwrap();
        let mut domains = Domains::new(&grid, &word_list);
        enforce_node_consistency(&grid, &word_list, &mut domains);

        // "cat" across is only supported by "cat" down (middle 'a'), and vice versa; both
        // survive. Remove "cat" from the down slot and AC-3 must drop it from the across slot.
        domains.shrink(1, word_id(&word_list, "cat"));

        assert!(ac3(&grid, &word_list, &mut domains, None));
        assert!(!domains.options(0).contains(&word_id(&word_list, "cat")));

        // Fixed point: no arc has anything left to revise.
        for slot in &grid.slot_configs {
            for &neighbor in grid.neighbors(slot.id) {
                assert!(!revise(&grid, &word_list, &mut domains, slot.id, neighbor));
            }
        }
    }

    #[test]
    fn test_ac3_is_idempotent() {
        let grid = plus_grid();
        let word_list = WordList::from_contents("cat\ndog\ntoo\n").unwrap();
        let mut domains = Domains::new(&grid, &word_list);
        enforce_node_consistency(&grid, &word_list, &mut domains);

        assert!(ac3(&grid, &word_list, &mut domains, None));
        let counts_after_first: Vec<usize> = (0..grid.slot_configs.len())
            .map(|slot_id| domains.option_count(slot_id))
            .collect();

        assert!(ac3(&grid, &word_list, &mut domains, None));
        let counts_after_second: Vec<usize> = (0..grid.slot_configs.len())
            .map(|slot_id| domains.option_count(slot_id))
            .collect();

        assert_eq!(counts_after_first, counts_after_second);
    }

    #[test]
    fn test_ac3_fails_on_domain_wipeout() {
        let grid = plus_grid();
        let word_list = WordList::from_contents("cat\ndog\ntoo\nabc\n").unwrap();
        let mut domains = Domains::new(&grid, &word_list);
        enforce_node_consistency(&grid, &word_list, &mut domains);

        // Restrict the across slot to "abc" and the down slot to "dog": no word in the down
        // domain has 'b' in the middle, so revising wipes the across domain out.
        for word in ["cat", "dog", "too"] {
            domains.shrink(0, word_id(&word_list, word));
        }
        for word in ["cat", "too", "abc"] {
            domains.shrink(1, word_id(&word_list, word));
        }

        assert!(!ac3(&grid, &word_list, &mut domains, None));
    }

    #[test]
    fn test_ac3_fails_fast_on_a_domain_emptied_by_node_consistency() {
        // The only slot is four cells long; no four-letter words exist, so node consistency
        // leaves an empty domain and AC-3 must fail even though the slot has no arcs.
        let grid = Grid::parse("....").unwrap();
        let word_list = WordList::from_contents("cat\ndog\n").unwrap();
        let mut domains = Domains::new(&grid, &word_list);

        enforce_node_consistency(&grid, &word_list, &mut domains);
        assert!(domains.is_empty(0));
        assert!(!ac3(&grid, &word_list, &mut domains, None));
    }

    #[test]
    fn test_ac3_accepts_an_explicit_arc_list() {
        let grid = plus_grid();
        let word_list = WordList::from_contents("cat\ndog\ntoo\n").unwrap();
        let mut domains = Domains::new(&grid, &word_list);
        enforce_node_consistency(&grid, &word_list, &mut domains);

        domains.shrink(1, word_id(&word_list, "cat"));

        let arcs: Vec<(SlotId, SlotId)> = vec![(0, 1)];
        assert!(ac3(&grid, &word_list, &mut domains, Some(arcs)));
        assert!(!domains.options(0).contains(&word_id(&word_list, "cat")));
    }
}
