use std::path::{Path, PathBuf};

use log::info;
use ndarray::Array2;

use seqfeed_core::utils::DynReader;
use seqfeed_core::{OneHotEncoder, Result};
use seqfeed_io::FastaReader;

use super::{Pull, SequenceSource, SourceState, uniform_length};

///
/// One-hot tensors read directly from the records of a FASTA file.
///
/// The file is scanned once at construction to count records and check that they all
/// have the same length. Iteration then streams the file lazily, re-opening it from
/// the start whenever an endless source runs out.
///
pub struct RecordSource {
    path: PathBuf,
    endless: bool,
    len: usize,
    encoder: OneHotEncoder,
    state: SourceState<FastaReader<DynReader>>,
}

impl RecordSource {
    ///
    /// # Arguments
    /// - fa_file: FASTA file to read records from, gzip'd or not
    /// - endless: restart from the first record once exhausted
    ///
    pub fn new<P: AsRef<Path>>(fa_file: P, endless: bool) -> Result<Self> {
        let path = fa_file.as_ref().to_owned();
        let context = path.display().to_string();

        let lengths = FastaReader::from_path(&path)?.map(|record| record.map(|r| r.len()));
        let (len, seq_len) = uniform_length(lengths, &context)?;

        let state = SourceState::Active(FastaReader::from_path(&path)?);
        info!(
            "Loaded {} sequences of length {} from {}",
            len, seq_len, context
        );

        Ok(RecordSource {
            path,
            endless,
            len,
            encoder: OneHotEncoder::new(seq_len),
            state,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SequenceSource for RecordSource {
    type Item = Array2<i8>;

    fn len(&self) -> usize {
        self.len
    }

    fn seq_len(&self) -> usize {
        self.encoder.seq_len()
    }

    fn is_endless(&self) -> bool {
        self.endless
    }

    fn pull(&mut self) -> Result<Pull<Array2<i8>>> {
        let path = &self.path;
        let context = path.display().to_string();
        let pulled = self
            .state
            .advance(self.endless, &context, || FastaReader::from_path(path))?;
        Ok(pulled.map(|record| self.encoder.encode(&record.seq)))
    }

    fn restart(&mut self) -> Result<()> {
        self.state.reset(FastaReader::from_path(&self.path)?);
        Ok(())
    }
}
