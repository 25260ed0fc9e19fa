use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

pub type DynReader = BufReader<Box<dyn Read>>;

pub fn is_gzipped(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gz"))
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> io::Result<DynReader> {
    let file = File::open(path).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Failed to open file {}: {}", path.display(), err),
        )
    })?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::BufRead;
    use std::path::PathBuf;

    use rstest::rstest;

    #[rstest]
    #[case("pos_b.fa", false)]
    #[case("pos_b.fa.gz", true)]
    fn test_is_gzipped(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_gzipped(Path::new(name)), expected);
    }

    #[rstest]
    fn test_plain_and_gzipped_readers_agree() {
        let plain = PathBuf::from("../tests/data/fasta/pos_b.fa");
        let gz = PathBuf::from("../tests/data/fasta/pos_b.fa.gz");

        let plain_lines: Vec<String> = get_dynamic_reader(&plain)
            .unwrap()
            .lines()
            .collect::<io::Result<_>>()
            .unwrap();
        let gz_lines: Vec<String> = get_dynamic_reader(&gz)
            .unwrap()
            .lines()
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(plain_lines, gz_lines);
    }

    #[rstest]
    fn test_missing_file_names_path() {
        let err = get_dynamic_reader(Path::new("../tests/data/nope.fa")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("nope.fa"));
    }
}
