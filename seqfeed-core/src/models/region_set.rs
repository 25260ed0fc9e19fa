use std::fmt::{self, Display};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::consts::MIN_BED_COLUMNS;
use crate::errors::{DatasetError, Result};
use crate::models::Region;
use crate::utils::get_dynamic_reader;

///
/// RegionSet struct, the representation of an interval file such as a bed or
/// narrowPeak file. Regions are kept in file order.
///
#[derive(Clone, Debug)]
pub struct RegionSet {
    pub regions: Vec<Region>,
    pub header: Option<String>,
    pub path: Option<PathBuf>,
}

fn is_header_line(line: &str) -> bool {
    line.starts_with("browser") || line.starts_with("track") || line.starts_with('#')
}

impl TryFrom<&Path> for RegionSet {
    type Error = DatasetError;

    ///
    /// Create a new [RegionSet] from a bed file.
    ///
    /// # Arguments:
    /// - value: path to bed file on disk.
    fn try_from(value: &Path) -> Result<Self> {
        let path = value;
        let reader = get_dynamic_reader(path)?;

        let mut regions: Vec<Region> = Vec::new();
        let mut header: String = String::new();
        let mut first_line: bool = true;

        for (line_idx, line) in reader.lines().enumerate() {
            let string_line = line?;
            let line_no = line_idx + 1;

            if string_line.trim().is_empty() {
                continue;
            }

            if is_header_line(&string_line) {
                header.push_str(&string_line);
                first_line = false;
                continue;
            }

            let parts: Vec<String> = string_line.split('\t').map(|s| s.to_string()).collect();

            // Handling column headers like `chr start end etc` without #
            if first_line {
                first_line = false;
                if parts.len() >= MIN_BED_COLUMNS && parts[1].parse::<u32>().is_err() {
                    header.push_str(&string_line);
                    continue;
                }
            }

            if parts.len() < MIN_BED_COLUMNS {
                return Err(DatasetError::parse(
                    path.display(),
                    line_no,
                    format!("expected at least {} columns: {:?}", MIN_BED_COLUMNS, parts),
                ));
            }

            let start: u32 = parts[1].parse().map_err(|_| {
                DatasetError::parse(
                    path.display(),
                    line_no,
                    format!("invalid start position: {:?}", parts[1]),
                )
            })?;
            let end: u32 = parts[2].parse().map_err(|_| {
                DatasetError::parse(
                    path.display(),
                    line_no,
                    format!("invalid end position: {:?}", parts[2]),
                )
            })?;
            if end < start {
                return Err(DatasetError::parse(
                    path.display(),
                    line_no,
                    format!("end {} is before start {}", end, start),
                ));
            }

            regions.push(Region {
                chr: parts[0].to_owned(),
                start,
                end,
                fields: parts,
            });
        }

        if regions.is_empty() {
            return Err(DatasetError::EmptySource(format!(
                "0 regions found in the file: {}",
                path.display()
            )));
        }

        Ok(RegionSet {
            regions,
            header: match header.is_empty() {
                true => None,
                false => Some(header),
            },
            path: Some(value.to_owned()),
        })
    }
}

impl TryFrom<&str> for RegionSet {
    type Error = DatasetError;

    fn try_from(value: &str) -> Result<Self> {
        RegionSet::try_from(Path::new(value))
    }
}

impl TryFrom<String> for RegionSet {
    type Error = DatasetError;

    fn try_from(value: String) -> Result<Self> {
        RegionSet::try_from(Path::new(&value))
    }
}

impl TryFrom<PathBuf> for RegionSet {
    type Error = DatasetError;

    fn try_from(value: PathBuf) -> Result<Self> {
        RegionSet::try_from(value.as_path())
    }
}

impl From<Vec<Region>> for RegionSet {
    fn from(regions: Vec<Region>) -> Self {
        RegionSet {
            regions,
            header: None,
            path: None,
        }
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl RegionSet {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }

    ///
    /// Smallest number of columns found on any row. Auxiliary column requests must
    /// stay below this to be valid for every region.
    ///
    pub fn min_num_fields(&self) -> usize {
        self.regions
            .iter()
            .map(Region::num_fields)
            .min()
            .unwrap_or(0)
    }
}

impl Display for RegionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionSet with {} regions", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data/bed")
            .join(file_name)
    }

    #[rstest]
    fn test_open_from_path() {
        let file_path = get_test_path("example.narrowPeak");
        assert!(RegionSet::try_from(file_path.as_path()).is_ok());
    }

    #[rstest]
    fn test_open_from_string() {
        let file_path = get_test_path("example.narrowPeak");
        assert!(RegionSet::try_from(file_path.to_str().unwrap()).is_ok());
    }

    #[rstest]
    fn test_keeps_file_order_and_fields() {
        let rs = RegionSet::try_from(get_test_path("example.narrowPeak")).unwrap();
        assert_eq!(rs.len(), 3);
        assert_eq!(rs.regions[0].start, 100);
        assert_eq!(rs.regions[1].start, 250);
        assert_eq!(rs.regions[2].chr, "chr2");
        assert_eq!(rs.regions[0].field(5), Some("."));
        assert_eq!(rs.regions[0].field(7), Some("5.0945"));
        assert_eq!(rs.min_num_fields(), 10);
        assert!(rs.header.is_none());
    }

    #[rstest]
    fn test_track_line_is_header() {
        let rs = RegionSet::try_from(get_test_path("example.bed")).unwrap();
        assert_eq!(rs.len(), 3);
        assert_eq!(rs.header, Some("track name=example".to_string()));
        assert_eq!(rs.min_num_fields(), 3);
    }

    #[rstest]
    fn test_column_name_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("named.bed");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "chrom\tstart\tend").unwrap();
        writeln!(file, "chr1\t0\t10").unwrap();

        let rs = RegionSet::try_from(path.as_path()).unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.header, Some("chrom\tstart\tend".to_string()));
    }

    #[rstest]
    fn test_empty_file_is_empty_source() {
        let result = RegionSet::try_from(get_test_path("empty.bed"));
        assert!(matches!(result, Err(DatasetError::EmptySource(_))));
    }

    #[rstest]
    fn test_bad_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bed");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "chr1\t0\t10").unwrap();
        writeln!(file, "chr1\tten\t20").unwrap();

        let result = RegionSet::try_from(path.as_path());
        assert!(matches!(result, Err(DatasetError::Parse { line: 2, .. })));
    }

    #[rstest]
    fn test_inverted_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inverted.bed");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "chr1\t50\t10").unwrap();

        let result = RegionSet::try_from(path.as_path());
        assert!(matches!(result, Err(DatasetError::Parse { .. })));
    }

    #[rstest]
    fn test_missing_file() {
        let result = RegionSet::try_from(get_test_path("missing.bed"));
        assert!(matches!(result, Err(DatasetError::Io(_))));
    }
}
