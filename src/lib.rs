pub mod consistency;
pub mod domain;
pub mod grid;
pub mod search;
pub mod types;
pub mod word_list;

pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum number of distinct characters appearing in a grid.
pub const MAX_GLYPH_COUNT: usize = 256;

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// The minimum number of consecutive open cells that counts as a slot.
pub const MIN_SLOT_LENGTH: usize = 3;
