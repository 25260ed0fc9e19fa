use std::fmt::{self, Display};

///
/// Region struct, representation of one row of a BED-like file.
///
/// Coordinates are 0-based, half-open (`[start, end)`), exactly as written in the file.
/// `fields` keeps every tab-separated column of the row, including the first three,
/// so auxiliary columns can be addressed by their position in the file.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Region {
    pub chr: String,
    pub start: u32,
    pub end: u32,

    pub fields: Vec<String>,
}

impl Region {
    pub fn new(chr: &str, start: u32, end: u32) -> Self {
        Region {
            chr: chr.to_string(),
            start,
            end,
            fields: vec![chr.to_string(), start.to_string(), end.to_string()],
        }
    }

    ///
    /// Number of bases covered by the region
    ///
    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    ///
    /// First and last base of the region in 1-based, inclusive coordinates.
    /// This is the coordinate system the reference lookup works in: `start + 1` to `end`.
    ///
    pub fn one_based(&self) -> (u64, u64) {
        (self.start as u64 + 1, self.end as u64)
    }

    ///
    /// `chr:first-last` locus string in 1-based, inclusive coordinates
    ///
    pub fn locus(&self) -> String {
        let (first, last) = self.one_based();
        format!("{}:{}-{}", self.chr, first, last)
    }

    ///
    /// Raw value of column `idx` (0 = chrom, 1 = start, 2 = end, ...)
    ///
    pub fn field(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    ///
    /// Get file string of Region
    ///
    pub fn as_string(&self) -> String {
        self.fields.join("\t")
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chr, self.start, self.end)
    }
}
