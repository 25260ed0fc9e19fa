/// A, C, G, T
pub const NUM_BASES: usize = 4;

/// Placeholder used by BED-like formats for a missing value.
pub const NULL_FIELD: &str = ".";

/// Minimum number of positional columns (chrom, start, end) in a BED row.
pub const MIN_BED_COLUMNS: usize = 3;
