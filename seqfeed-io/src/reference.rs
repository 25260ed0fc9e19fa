use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bio::io::fasta::{Index, IndexedReader};
use log::{debug, info};
use tempfile::NamedTempFile;

use seqfeed_core::models::{Region, RegionSet};
use seqfeed_core::utils::{DynReader, is_gzipped};
use seqfeed_core::{DatasetError, Result};

use crate::fai::FastaIndex;
use crate::fasta::FastaReader;

///
/// Indexed reference sequence. Reads only the bytes of each requested interval.
///
pub struct ReferenceGenome {
    path: PathBuf,
    reader: IndexedReader<File>,
    index: FastaIndex,
}

impl ReferenceGenome {
    ///
    /// Open an uncompressed reference FASTA, using `<path>.fai` if present.
    ///
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if is_gzipped(path) {
            return Err(DatasetError::Reference(format!(
                "reference must be an uncompressed FASTA file: {}",
                path.display()
            )));
        }

        let index = FastaIndex::load_or_compute(path)?;
        let fai = Index::new(index.to_fai_string().as_bytes()).map_err(|err| {
            DatasetError::Reference(format!("invalid index for {}: {}", path.display(), err))
        })?;
        let reader = IndexedReader::with_index(File::open(path)?, fai);
        info!(
            "Opened reference {} with {} sequences",
            path.display(),
            index.len()
        );

        Ok(ReferenceGenome {
            path: path.to_owned(),
            reader,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> &FastaIndex {
        &self.index
    }

    ///
    /// Fetch bases `first..=last` of `chr`, 1-based and inclusive.
    ///
    pub fn fetch(&mut self, chr: &str, first: u64, last: u64) -> Result<Vec<u8>> {
        let record = self.index.get(chr).ok_or_else(|| {
            DatasetError::Reference(format!(
                "sequence '{}' not found in {}",
                chr,
                self.path.display()
            ))
        })?;

        if first == 0 {
            return Err(DatasetError::Reference(format!(
                "positions are 1-based, got {}:{}-{}",
                chr, first, last
            )));
        }
        if last > record.length {
            return Err(DatasetError::Reference(format!(
                "{}:{}-{} is past the end of '{}' (length {})",
                chr, first, last, chr, record.length
            )));
        }
        if last < first {
            return Ok(Vec::new());
        }

        // the reader works in 0-based, half-open coordinates
        self.reader.fetch(chr, first - 1, last).map_err(|err| {
            DatasetError::Reference(format!("cannot fetch {}:{}-{}: {}", chr, first, last, err))
        })?;
        let mut buf = Vec::with_capacity((last - first + 1) as usize);
        self.reader.read(&mut buf)?;

        let expected = (last - first + 1) as usize;
        if buf.len() != expected {
            return Err(DatasetError::Reference(format!(
                "index of {} is out of date: read {} bases for {}:{}-{}, expected {}",
                self.path.display(),
                buf.len(),
                chr,
                first,
                last,
                expected
            )));
        }

        Ok(buf)
    }

    ///
    /// Fetch the sequence under a 0-based, half-open region (`start + 1` to `end`, 1-based).
    ///
    pub fn fetch_region(&mut self, region: &Region) -> Result<Vec<u8>> {
        let (first, last) = region.one_based();
        self.fetch(&region.chr, first, last)
    }

    ///
    /// Resolve every region and write the sequences, in region order, to a temporary
    /// FASTA file. Record names are `chr:start-end` in the region's own coordinates.
    ///
    pub fn extract_regions(&mut self, regions: &RegionSet) -> Result<ExtractedSequences> {
        let mut file = tempfile::Builder::new()
            .prefix("seqfeed_")
            .suffix(".fa")
            .tempfile()?;

        {
            let mut writer = BufWriter::new(file.as_file_mut());
            for region in regions {
                let seq = self.fetch_region(region)?;
                writeln!(writer, ">{}", region)?;
                writer.write_all(&seq)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        debug!(
            "Extracted {} regions from {} into {}",
            regions.len(),
            self.path.display(),
            file.path().display()
        );

        Ok(ExtractedSequences {
            file,
            len: regions.len(),
        })
    }
}

///
/// Temporary FASTA file produced by [`ReferenceGenome::extract_regions`].
/// The inner `NamedTempFile` deletes the file when this value is dropped.
///
pub struct ExtractedSequences {
    file: NamedTempFile,
    len: usize,
}

impl ExtractedSequences {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    ///
    /// A fresh reader positioned at the first extracted sequence.
    ///
    pub fn reader(&self) -> Result<FastaReader<DynReader>> {
        FastaReader::from_path(self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::fasta::FastaRecord;

    #[fixture]
    fn reference() -> ReferenceGenome {
        ReferenceGenome::open("../tests/data/fasta/reference.fa").unwrap()
    }

    #[rstest]
    fn test_fetch_first_bases(mut reference: ReferenceGenome) {
        let seq = reference.fetch("chr1", 1, 10).unwrap();
        assert_eq!(seq, b"GCTAAAGACA".to_vec());
    }

    #[rstest]
    fn test_fetch_across_line_break(mut reference: ReferenceGenome) {
        let seq = reference.fetch("chr1", 58, 63).unwrap();
        assert_eq!(seq, b"TCGCTT".to_vec());
    }

    #[rstest]
    fn test_fetch_keeps_case_and_ambiguity(mut reference: ReferenceGenome) {
        let seq = reference.fetch("chr1", 150, 153).unwrap();
        assert_eq!(seq, b"CNNN".to_vec());
    }

    #[rstest]
    fn test_fetch_last_bases(mut reference: ReferenceGenome) {
        let seq = reference.fetch("chr1", 996, 1000).unwrap();
        assert_eq!(seq, b"ATGAT".to_vec());
    }

    #[rstest]
    fn test_region_coordinate_shift(mut reference: ReferenceGenome) {
        let region = Region::new("chr1", 0, 100);
        let seq = reference.fetch_region(&region).unwrap();
        assert_eq!(seq.len(), 100);
        assert_eq!(&seq[..10], b"GCTAAAGACA");
    }

    #[rstest]
    fn test_unknown_chromosome(mut reference: ReferenceGenome) {
        let result = reference.fetch("chrZ", 1, 10);
        assert!(matches!(result, Err(DatasetError::Reference(_))));
    }

    #[rstest]
    fn test_out_of_bounds(mut reference: ReferenceGenome) {
        let result = reference.fetch_region(&Region::new("chr2", 250, 350));
        assert!(matches!(result, Err(DatasetError::Reference(_))));
    }

    #[rstest]
    fn test_zero_width_index_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fa = dir.path().join("ref.fa");
        std::fs::write(&fa, ">chr1\nACGTACGTAC\n").unwrap();
        std::fs::write(dir.path().join("ref.fa.fai"), "chr1\t10\t6\t0\t0\n").unwrap();

        let result = ReferenceGenome::open(&fa);
        assert!(matches!(result, Err(DatasetError::Reference(_))));
    }

    #[rstest]
    fn test_compressed_reference_rejected() {
        let result = ReferenceGenome::open("../tests/data/fasta/pos_b.fa.gz");
        assert!(matches!(result, Err(DatasetError::Reference(_))));
    }

    #[rstest]
    fn test_extract_matches_expected_fasta(mut reference: ReferenceGenome) {
        let regions = RegionSet::try_from("../tests/data/bed/example.bed").unwrap();
        let extracted = reference.extract_regions(&regions).unwrap();
        assert_eq!(extracted.len(), 3);

        let got: Vec<FastaRecord> = extracted.reader().unwrap().collect::<Result<_>>().unwrap();
        let expected: Vec<FastaRecord> = FastaReader::from_path("../tests/data/fasta/example.fa")
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(got, expected);
    }

    #[rstest]
    fn test_extracted_file_removed_on_drop(mut reference: ReferenceGenome) {
        let regions = RegionSet::try_from("../tests/data/bed/example.bed").unwrap();
        let extracted = reference.extract_regions(&regions).unwrap();
        let path = extracted.path().to_owned();
        assert!(path.exists());

        drop(extracted);
        assert!(!path.exists());
    }
}
