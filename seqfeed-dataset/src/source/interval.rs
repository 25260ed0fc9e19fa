use std::path::{Path, PathBuf};

use log::info;
use ndarray::Array2;

use seqfeed_core::models::{ColumnValue, RegionSet};
use seqfeed_core::utils::DynReader;
use seqfeed_core::{DatasetError, OneHotEncoder, Result};
use seqfeed_io::{ExtractedSequences, FastaReader, FastaRecord, ReferenceGenome};

use super::{Pull, SequenceSource, SourceState, uniform_length};

/// One example from an [`IntervalSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalExample {
    pub onehot: Array2<i8>,
    /// Values of the requested BED columns, in request order.
    pub columns: Option<Vec<ColumnValue>>,
}

/// Extracted records paired with their row in the interval file.
struct IntervalCursor {
    reader: FastaReader<DynReader>,
    position: usize,
}

impl IntervalCursor {
    fn new(reader: FastaReader<DynReader>) -> Self {
        IntervalCursor {
            reader,
            position: 0,
        }
    }
}

impl Iterator for IntervalCursor {
    type Item = Result<(usize, FastaRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.reader.next()?;
        let position = self.position;
        self.position += 1;
        Some(record.map(|r| (position, r)))
    }
}

///
/// One-hot tensors for the intervals of a BED-like file, resolved against a reference.
///
/// All intervals are extracted once at construction into a temporary FASTA file owned by
/// the source; it is removed when the source is dropped. Restarting re-reads that file
/// from the first interval.
///
pub struct IntervalSource {
    genome_file: PathBuf,
    bed_file: PathBuf,
    endless: bool,
    columns: Option<Vec<usize>>,
    regions: RegionSet,
    extracted: ExtractedSequences,
    encoder: OneHotEncoder,
    state: SourceState<IntervalCursor>,
}

impl IntervalSource {
    ///
    /// # Arguments
    /// - genome_file: uncompressed reference FASTA (indexed with `.fai` or not)
    /// - bed_file: BED or narrowPeak file with the intervals, gzip'd or not
    /// - endless: restart from the first interval once exhausted
    ///
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        genome_file: P,
        bed_file: Q,
        endless: bool,
    ) -> Result<Self> {
        Self::with_columns(genome_file, bed_file, endless, None)
    }

    ///
    /// Like [`IntervalSource::new`], but every item also carries the typed values of
    /// the BED columns at `columns` (0 = chrom, 1 = start, 2 = end, ...).
    /// An empty column list is the same as none.
    ///
    pub fn with_columns<P: AsRef<Path>, Q: AsRef<Path>>(
        genome_file: P,
        bed_file: Q,
        endless: bool,
        columns: Option<&[usize]>,
    ) -> Result<Self> {
        let genome_file = genome_file.as_ref().to_owned();
        let bed_file = bed_file.as_ref().to_owned();
        let context = bed_file.display().to_string();

        let regions = RegionSet::try_from(bed_file.as_path())?;
        let (len, seq_len) = uniform_length(
            regions.iter().map(|region| Ok(region.width() as usize)),
            &context,
        )?;

        let columns = columns.filter(|cols| !cols.is_empty()).map(<[usize]>::to_vec);
        if let Some(cols) = &columns {
            let available = regions.min_num_fields();
            if let Some(bad) = cols.iter().find(|&&col| col >= available) {
                return Err(DatasetError::Configuration(format!(
                    "column {} requested, but {} has rows with only {} columns",
                    bad, context, available
                )));
            }
        }

        let mut reference = ReferenceGenome::open(&genome_file)?;
        let extracted = reference.extract_regions(&regions)?;
        let state = SourceState::Active(IntervalCursor::new(extracted.reader()?));

        info!(
            "Loaded {} intervals of length {} from {} against {}",
            len,
            seq_len,
            context,
            genome_file.display()
        );

        Ok(IntervalSource {
            genome_file,
            bed_file,
            endless,
            columns,
            regions,
            extracted,
            encoder: OneHotEncoder::new(seq_len),
            state,
        })
    }

    pub fn genome_file(&self) -> &Path {
        &self.genome_file
    }

    pub fn bed_file(&self) -> &Path {
        &self.bed_file
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn columns(&self) -> Option<&[usize]> {
        self.columns.as_deref()
    }

    fn column_values(&self, position: usize) -> Option<Vec<ColumnValue>> {
        let cols = self.columns.as_ref()?;
        let region = self.regions.regions.get(position)?;
        Some(
            cols.iter()
                .map(|&col| region.field(col).map_or(ColumnValue::Null, ColumnValue::parse))
                .collect(),
        )
    }
}

impl SequenceSource for IntervalSource {
    type Item = IntervalExample;

    fn len(&self) -> usize {
        self.regions.len()
    }

    fn seq_len(&self) -> usize {
        self.encoder.seq_len()
    }

    fn is_endless(&self) -> bool {
        self.endless
    }

    fn pull(&mut self) -> Result<Pull<IntervalExample>> {
        let extracted = &self.extracted;
        let context = self.bed_file.display().to_string();
        let pulled = self.state.advance(self.endless, &context, || {
            extracted.reader().map(IntervalCursor::new)
        })?;

        Ok(pulled.map(|(position, record)| IntervalExample {
            onehot: self.encoder.encode(&record.seq),
            columns: self.column_values(position),
        }))
    }

    fn restart(&mut self) -> Result<()> {
        self.state
            .reset(IntervalCursor::new(self.extracted.reader()?));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::source::RecordSource;

    #[fixture]
    fn path_to_reference() -> &'static str {
        "../tests/data/fasta/reference.fa"
    }

    #[fixture]
    fn path_to_narrowpeak() -> &'static str {
        "../tests/data/bed/example.narrowPeak"
    }

    fn expected_columns() -> Vec<Vec<ColumnValue>> {
        vec![
            vec!["chr1".into(), ColumnValue::Null, 182_i64.into(), 5.0945.into()],
            vec!["chr1".into(), ColumnValue::Null, 91_i64.into(), 4.6052.into()],
            vec!["chr2".into(), ColumnValue::Null, 182_i64.into(), 9.2103.into()],
        ]
    }

    #[rstest]
    fn test_len_and_shape(path_to_reference: &str, path_to_narrowpeak: &str) {
        let source = IntervalSource::new(path_to_reference, path_to_narrowpeak, false).unwrap();
        assert_eq!(source.len(), 3);
        assert_eq!(source.seq_len(), 100);
        assert_eq!(source.seq_shape(), (100, 4));
        assert_eq!(source.columns(), None);
    }

    #[rstest]
    fn test_matches_record_source(path_to_reference: &str) {
        let mut intervals =
            IntervalSource::new(path_to_reference, "../tests/data/bed/example.bed", true).unwrap();
        let mut records = RecordSource::new("../tests/data/fasta/example.fa", true).unwrap();

        assert_eq!(intervals.len(), records.len());
        assert_eq!(intervals.seq_shape(), records.seq_shape());

        // two passes, the second one after an endless restart
        for _ in 0..2 * intervals.len() {
            let from_intervals = intervals.pull().unwrap().into_option().unwrap();
            let from_records = records.pull().unwrap().into_option().unwrap();
            assert_eq!(from_intervals.onehot, from_records);
            assert!(from_intervals.columns.is_none());
        }
    }

    #[rstest]
    fn test_ambiguous_reference_bases(path_to_reference: &str, path_to_narrowpeak: &str) {
        let mut source = IntervalSource::new(path_to_reference, path_to_narrowpeak, false).unwrap();
        // chr1:100-200 covers three N bases
        let first = source.pull().unwrap().into_option().unwrap();
        assert_eq!(first.onehot.sum(), 97);
    }

    #[rstest]
    fn test_selected_columns(path_to_reference: &str, path_to_narrowpeak: &str) {
        let mut source = IntervalSource::with_columns(
            path_to_reference,
            path_to_narrowpeak,
            true,
            Some(&[0, 5, 6, 7]),
        )
        .unwrap();

        // first pass, then the same values again after the restart
        for _ in 0..2 {
            for expected in expected_columns() {
                let item = source.pull().unwrap().into_option().unwrap();
                assert_eq!(item.onehot.shape(), &[100, 4]);
                assert_eq!(item.columns, Some(expected));
            }
        }
    }

    #[rstest]
    fn test_empty_column_request_is_none(path_to_reference: &str, path_to_narrowpeak: &str) {
        let mut source =
            IntervalSource::with_columns(path_to_reference, path_to_narrowpeak, false, Some(&[]))
                .unwrap();
        assert_eq!(source.columns(), None);
        assert!(source.pull().unwrap().into_option().unwrap().columns.is_none());
    }

    #[rstest]
    fn test_column_out_of_range(path_to_reference: &str) {
        let result = IntervalSource::with_columns(
            path_to_reference,
            "../tests/data/bed/example.bed",
            false,
            Some(&[0, 5]),
        );
        assert!(matches!(result, Err(DatasetError::Configuration(_))));
    }

    #[rstest]
    fn test_finite_stops(path_to_reference: &str, path_to_narrowpeak: &str) {
        let mut source = IntervalSource::new(path_to_reference, path_to_narrowpeak, false).unwrap();
        let first_pass = source.items().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(first_pass.len(), 3);
        assert!(source.pull().unwrap().is_end_of_stream());

        source.restart().unwrap();
        let second_pass = source.items().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(first_pass, second_pass);
    }

    #[rstest]
    #[case("mismatched.bed")]
    fn test_mismatched_lengths(path_to_reference: &str, #[case] bed: &str) {
        let path = format!("../tests/data/bed/{}", bed);
        let result = IntervalSource::new(path_to_reference, path, false);
        assert!(matches!(
            result,
            Err(DatasetError::ShapeMismatch {
                expected: 90,
                found: 100,
                ..
            })
        ));
    }

    #[rstest]
    #[case("out_of_bounds.bed")]
    #[case("unknown_chrom.bed")]
    fn test_unresolvable_intervals(path_to_reference: &str, #[case] bed: &str) {
        let path = format!("../tests/data/bed/{}", bed);
        let result = IntervalSource::new(path_to_reference, path, false);
        assert!(matches!(result, Err(DatasetError::Reference(_))));
    }

    #[rstest]
    fn test_empty_bed(path_to_reference: &str) {
        let result = IntervalSource::new(path_to_reference, "../tests/data/bed/empty.bed", false);
        assert!(matches!(result, Err(DatasetError::EmptySource(_))));
    }

    #[rstest]
    fn test_extraction_removed_on_drop(path_to_reference: &str, path_to_narrowpeak: &str) {
        let source = IntervalSource::new(path_to_reference, path_to_narrowpeak, false).unwrap();
        let artifact = source.extracted.path().to_owned();
        assert!(artifact.exists());

        drop(source);
        assert!(!artifact.exists());
    }
}
