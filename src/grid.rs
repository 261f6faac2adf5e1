//! This module implements the static grid model: parsing a blocked/open structure description,
//! deriving the slots (maximal runs of open cells), and computing the overlap between each pair
//! of intersecting slots. Everything here is read-only once `Grid::parse` returns.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::MIN_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the `Grid`'s `slot_configs` field.
pub type SlotId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// The direction that a slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within the other slot.
#[derive(Debug, Clone)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A struct representing the aspects of a slot that are static during solving.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// For each cell of the slot, the crossing slot sharing that cell, if any.
    pub crossings: Vec<Option<Crossing>>,
}

impl SlotConfig {
    /// Generate the coords for each cell of this slot.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.start_cell.0 + cell_idx, self.start_cell.1),
                Direction::Down => (self.start_cell.0, self.start_cell.1 + cell_idx),
            })
            .collect()
    }

    /// Generate a `SlotSpec` identifying this slot.
    #[must_use]
    pub fn slot_spec(&self) -> SlotSpec {
        SlotSpec {
            start_cell: self.start_cell,
            direction: self.direction,
            length: self.length,
        }
    }
}

/// A struct identifying a specific slot in the grid.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct SlotSpec {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl SlotSpec {
    /// Generate the coords for each cell of this slot.
    #[must_use]
    pub fn cell_coords(&self) -> Vec<GridCoord> {
        (0..self.length)
            .map(|cell_idx| match self.direction {
                Direction::Across => (self.start_cell.0 + cell_idx, self.start_cell.1),
                Direction::Down => (self.start_cell.0, self.start_cell.1 + cell_idx),
            })
            .collect()
    }

    /// Parse a string like "1,2,down,5" into a `SlotSpec` struct.
    pub fn from_key(key: &str) -> Result<SlotSpec, String> {
        let key_parts: Vec<&str> = key.split(',').collect();
        if key_parts.len() != 4 {
            return Err(format!("invalid slot key: {key}"));
        }

        let x: Result<usize, _> = key_parts[0].parse();
        let y: Result<usize, _> = key_parts[1].parse();
        let direction: Option<Direction> = match key_parts[2] {
            "across" => Some(Direction::Across),
            "down" => Some(Direction::Down),
            _ => None,
        };
        let length: Result<usize, _> = key_parts[3].parse();

        if let (Ok(x), Ok(y), Some(direction), Ok(length)) = (x, y, direction, length) {
            Ok(SlotSpec {
                start_cell: (x, y),
                direction,
                length,
            })
        } else {
            Err(format!("invalid slot key: {key:?}"))
        }
    }

    /// Represent this slot as a string like "1,2,down,5".
    #[must_use]
    pub fn to_key(&self) -> String {
        let direction = match self.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        format!(
            "{},{},{},{}",
            self.start_cell.0, self.start_cell.1, direction, self.length,
        )
    }
}

/// Serialize a `SlotSpec` into a string key.
#[cfg(feature = "serde")]
impl Serialize for SlotSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

/// Deserialize a `SlotSpec` from a string key.
#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SlotSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw_string = String::deserialize(deserializer)?;
        SlotSpec::from_key(&raw_string).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The structure contains no lines, or no open cells at all.
    EmptyStructure,

    /// The structure contains a maximal open run that's too short to hold a word but too long to
    /// be a plain crossing cell.
    ShortRun {
        start_cell: GridCoord,
        direction: Direction,
        length: usize,
    },

    /// The structure contains an open cell that belongs to no slot in either direction.
    UnslottedCell(GridCoord),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::EmptyStructure => write!(f, "Grid structure contains no open cells"),
            GridError::ShortRun {
                start_cell,
                direction,
                length,
            } => write!(
                f,
                "Grid structure contains a {length}-cell open run at {key} (minimum slot length \
                 is {MIN_SLOT_LENGTH})",
                key = SlotSpec {
                    start_cell: *start_cell,
                    direction: *direction,
                    length: *length,
                }
                .to_key()
            ),
            GridError::UnslottedCell((x, y)) => {
                write!(f, "Grid structure contains an isolated open cell at {x},{y}")
            }
        }
    }
}

/// The static structure of a puzzle: the open-cell mask plus the derived slot set, overlap map,
/// and neighbor lists. Shared read-only by the domain store, the consistency engine, and the
/// search.
#[derive(Debug, Clone)]
pub struct Grid {
    pub width: usize,
    pub height: usize,

    /// A flat array of cells in order of row and then column; `true` means open.
    pub open: Vec<bool>,

    /// Config representing all of the slots in the grid and their crossings. Across slots come
    /// first in row order, then down slots in column order; ids follow this order and serve as
    /// the deterministic tie-break order during search.
    pub slot_configs: Vec<SlotConfig>,

    /// For each unordered pair of intersecting slots, the local cell index of the shared cell in
    /// each slot, keyed by `(min_id, max_id)` and valued in the same order.
    overlaps: HashMap<(SlotId, SlotId), (usize, usize)>,

    /// For each slot, the ids of all slots sharing a cell with it.
    neighbors: Vec<Vec<SlotId>>,
}

impl Grid {
    /// Parse a structure description into a `Grid`. Each line is a row; `#` marks a blocked cell
    /// and any other character marks an open cell. Lines are trimmed and blank lines skipped;
    /// rows shorter than the widest row are treated as blocked beyond their end.
    pub fn parse(structure: &str) -> Result<Grid, GridError> {
        let rows: Vec<Vec<char>> = structure
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().collect())
                }
            })
            .collect();

        if rows.is_empty() {
            return Err(GridError::EmptyStructure);
        }

        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let open: Vec<bool> = (0..height)
            .flat_map(|y| {
                let row = &rows[y];
                (0..width).map(move |x| x < row.len() && row[x] != '#')
            })
            .collect();

        if !open.iter().any(|&cell| cell) {
            return Err(GridError::EmptyStructure);
        }

        let grid = Grid::from_open_mask(width, height, open)?;

        Ok(grid)
    }

    /// Derive the slot set, overlap map, and neighbor lists from an open-cell mask.
    fn from_open_mask(width: usize, height: usize, open: Vec<bool>) -> Result<Grid, GridError> {
        let is_open = |x: usize, y: usize| open[y * width + x];

        // Identify the maximal runs of open cells in both directions. A run of one cell is just a
        // crossing cell for the other direction, but a run of two can never hold a word.
        let mut slot_specs: Vec<SlotSpec> = vec![];
        let mut record_run = |start_cell: GridCoord,
                              direction: Direction,
                              length: usize|
         -> Result<(), GridError> {
            if length >= MIN_SLOT_LENGTH {
                slot_specs.push(SlotSpec {
                    start_cell,
                    direction,
                    length,
                });
            } else if length > 1 {
                return Err(GridError::ShortRun {
                    start_cell,
                    direction,
                    length,
                });
            }
            Ok(())
        };

        for y in 0..height {
            let mut run_start: Option<usize> = None;
            for x in 0..=width {
                if x < width && is_open(x, y) {
                    run_start.get_or_insert(x);
                } else if let Some(start) = run_start.take() {
                    record_run((start, y), Direction::Across, x - start)?;
                }
            }
        }

        for x in 0..width {
            let mut run_start: Option<usize> = None;
            for y in 0..=height {
                if y < height && is_open(x, y) {
                    run_start.get_or_insert(y);
                } else if let Some(start) = run_start.take() {
                    record_run((x, start), Direction::Down, y - start)?;
                }
            }
        }

        // Build a map from cell location to the slots involved, which we can then use to
        // calculate crossings and to catch cells that no slot covers.
        let mut slots_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();

        for (slot_id, spec) in slot_specs.iter().enumerate() {
            for (cell_idx, &loc) in spec.cell_coords().iter().enumerate() {
                slots_by_loc.entry(loc).or_default().push((slot_id, cell_idx));
            }
        }

        for y in 0..height {
            for x in 0..width {
                if is_open(x, y) && !slots_by_loc.contains_key(&(x, y)) {
                    return Err(GridError::UnslottedCell((x, y)));
                }
            }
        }

        // Now we can build the actual slot configs, the unordered-pair overlap map, and the
        // neighbor lists.
        let mut slot_configs: Vec<SlotConfig> = vec![];
        let mut overlaps: HashMap<(SlotId, SlotId), (usize, usize)> = HashMap::new();
        let mut neighbors: Vec<Vec<SlotId>> = vec![vec![]; slot_specs.len()];

        for (slot_id, spec) in slot_specs.iter().enumerate() {
            let crossings: Vec<Option<Crossing>> = spec
                .cell_coords()
                .iter()
                .enumerate()
                .map(|(cell_idx, loc)| {
                    let crossing_slots: Vec<_> = slots_by_loc[loc]
                        .iter()
                        .filter(|&&(s, _)| s != slot_id)
                        .collect();

                    if crossing_slots.is_empty() {
                        None
                    } else if crossing_slots.len() > 1 {
                        panic!("More than two slots crossing in cell?");
                    } else {
                        let &(other_slot_id, other_slot_cell) = crossing_slots[0];

                        if slot_id < other_slot_id {
                            overlaps
                                .insert((slot_id, other_slot_id), (cell_idx, other_slot_cell));
                            neighbors[slot_id].push(other_slot_id);
                            neighbors[other_slot_id].push(slot_id);
                        }

                        Some(Crossing {
                            other_slot_id,
                            other_slot_cell,
                        })
                    }
                })
                .collect();

            slot_configs.push(SlotConfig {
                id: slot_id,
                start_cell: spec.start_cell,
                direction: spec.direction,
                length: spec.length,
                crossings,
            });
        }

        for neighbor_list in &mut neighbors {
            neighbor_list.sort_unstable();
        }

        Ok(Grid {
            width,
            height,
            open,
            slot_configs,
            overlaps,
            neighbors,
        })
    }

    /// Is the given cell open (able to hold a letter)?
    #[must_use]
    pub fn is_open(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.open[y * self.width + x]
    }

    /// The ids of all slots sharing a cell with the given slot.
    #[must_use]
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    /// If slots `a` and `b` intersect, the local cell index of the shared cell in each of them,
    /// in argument order.
    #[must_use]
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        if a <= b {
            self.overlaps.get(&(a, b)).copied()
        } else {
            self.overlaps.get(&(b, a)).copied().map(|(j, i)| (i, j))
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use crate::grid::{Direction, SlotSpec};

    #[test]
    fn test_slot_spec_serialization() {
        let slot_spec = SlotSpec {
            start_cell: (1, 2),
            direction: Direction::Across,
            length: 5,
        };

        let slot_key = serde_json::to_string(&slot_spec).unwrap();

        assert_eq!(slot_key, "\"1,2,across,5\"");
    }

    #[test]
    fn test_slot_spec_deserialization() {
        let slot_spec: SlotSpec = serde_json::from_str("\"3,4,down,12\"").unwrap();

        assert_eq!(
            slot_spec,
            SlotSpec {
                start_cell: (3, 4),
                direction: Direction::Down,
                length: 12,
            }
        );
    }
}
