use std::io::Read;
use std::path::Path;

use seq_io::fasta::{Error, Reader, Record};

use seqfeed_core::utils::{DynReader, get_dynamic_reader};
use seqfeed_core::{DatasetError, Result};

/// A single FASTA record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FastaRecord {
    /// First whitespace-delimited token of the header line.
    pub id: String,
    /// Rest of the header line, if any.
    pub description: Option<String>,
    pub seq: Vec<u8>,
}

impl FastaRecord {
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

fn parse_fasta_header(header: &str) -> (String, Option<String>) {
    let header = header.trim();
    match header.split_once(char::is_whitespace) {
        Some((id, rest)) => {
            let rest = rest.trim();
            (
                id.to_string(),
                (!rest.is_empty()).then(|| rest.to_string()),
            )
        }
        None => (header.to_string(), None),
    }
}

///
/// Streaming FASTA parser over [`seq_io::fasta::Reader`]. Holds at most one record in memory.
///
/// Sequence lines are concatenated with line endings removed. Any content before the
/// first header is a parse error, after which the reader stops.
///
pub struct FastaReader<R: Read> {
    reader: Reader<R>,
    source: String,
    done: bool,
}

impl FastaReader<DynReader> {
    ///
    /// Open a FASTA file, gzip'd or not.
    ///
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = get_dynamic_reader(path.as_ref())?;
        let mut fasta = FastaReader::new(reader);
        fasta.source = path.as_ref().display().to_string();
        Ok(fasta)
    }
}

impl<R: Read> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        FastaReader {
            reader: Reader::new(reader),
            source: String::from("<stream>"),
            done: false,
        }
    }
}

fn convert_error(source: &str, err: Error) -> DatasetError {
    match err {
        Error::Io(err) => DatasetError::Io(err),
        Error::InvalidStart { line, .. } => {
            DatasetError::parse(source, line, "sequence data before the first '>' header")
        }
        err => DatasetError::parse(source, 0, err.to_string()),
    }
}

impl<R: Read> Iterator for FastaReader<R> {
    type Item = Result<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let record = match self.reader.next() {
            Some(Ok(record)) => record,
            Some(Err(err)) => {
                self.done = true;
                return Some(Err(convert_error(&self.source, err)));
            }
            None => {
                self.done = true;
                return None;
            }
        };

        let (id, description) = parse_fasta_header(&String::from_utf8_lossy(record.head()));
        let mut seq = Vec::new();
        for line in record.seq_lines() {
            seq.extend_from_slice(line.trim_ascii());
        }

        Some(Ok(FastaRecord {
            id,
            description,
            seq,
        }))
    }
}
