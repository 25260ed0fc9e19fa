use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use fxhash::FxHashMap as HashMap;
use log::{debug, info};

use seqfeed_core::utils::{get_dynamic_reader, is_gzipped};
use seqfeed_core::{DatasetError, Result};

/// One line of a FASTA index: where a sequence lives in the file and how it is wrapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaiRecord {
    pub name: String,
    pub length: u64,
    pub offset: u64,     // byte offset to first base of sequence data
    pub line_bases: u64, // number of bases per line
    pub line_bytes: u64, // number of bytes per line (including newline chars)
}

impl FaiRecord {
    ///
    /// Line geometry must allow positions to be mapped to bytes: a non-empty sequence
    /// needs at least one base per line, and a line is never shorter than its bases.
    ///
    pub fn check_layout(&self) -> std::result::Result<(), String> {
        if self.length > 0 && self.line_bases == 0 {
            return Err(format!("'{}' has {} bases but 0 bases per line", self.name, self.length));
        }
        if self.line_bytes < self.line_bases {
            return Err(format!(
                "'{}' has {} bytes per line, fewer than its {} bases per line",
                self.name, self.line_bytes, self.line_bases
            ));
        }
        Ok(())
    }
}

impl Display for FaiRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.length, self.offset, self.line_bases, self.line_bytes
        )
    }
}

/// `<fasta>.fai`
pub fn fai_path(fasta_path: &Path) -> PathBuf {
    let mut path = fasta_path.as_os_str().to_owned();
    path.push(".fai");
    PathBuf::from(path)
}

struct RecordBuilder {
    name: String,
    offset: u64,
    length: u64,
    line_bases: Option<u64>,
    line_bytes: Option<u64>,
    short_line_seen: bool,
}

impl RecordBuilder {
    fn new(name: String, offset: u64) -> Self {
        RecordBuilder {
            name,
            offset,
            length: 0,
            line_bases: None,
            line_bytes: None,
            short_line_seen: false,
        }
    }

    fn finish(self) -> FaiRecord {
        FaiRecord {
            name: self.name,
            length: self.length,
            offset: self.offset,
            line_bases: self.line_bases.unwrap_or(0),
            line_bytes: self.line_bytes.unwrap_or(0),
        }
    }
}

///
/// Compute the FASTA index of an uncompressed FASTA file with a single streaming pass.
///
/// Every sequence line of a record must have the same width except the last one,
/// otherwise byte offsets could not be derived from positions.
///
pub fn compute_fai<T: AsRef<Path>>(file_path: T) -> Result<Vec<FaiRecord>> {
    let path = file_path.as_ref();

    // offsets into compressed data are meaningless
    if is_gzipped(path) {
        return Err(DatasetError::Reference(format!(
            "can't index compressed FASTA file: {}",
            path.display()
        )));
    }

    let mut reader = get_dynamic_reader(path)?;
    let mut results = Vec::new();
    let mut line = String::new();
    let mut line_no: usize = 0;
    let mut byte_position: u64 = 0;
    let mut current: Option<RecordBuilder> = None;

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line)? as u64;
        if bytes_read == 0 {
            break;
        }
        line_no += 1;
        byte_position += bytes_read;

        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                results.push(record.finish());
            }
            let name = header
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string();
            current = Some(RecordBuilder::new(name, byte_position));
            continue;
        }

        let Some(record) = current.as_mut() else {
            if line.trim().is_empty() {
                continue;
            }
            return Err(DatasetError::parse(
                path.display(),
                line_no,
                "sequence data before the first '>' header",
            ));
        };

        let line_len_bases = line.trim_end().len() as u64;
        if line_len_bases == 0 {
            record.short_line_seen = true;
            continue;
        }
        if record.short_line_seen {
            return Err(DatasetError::parse(
                path.display(),
                line_no,
                format!("different line length in sequence '{}'", record.name),
            ));
        }

        match (record.line_bases, record.line_bytes) {
            (None, _) | (_, None) => {
                record.line_bases = Some(line_len_bases);
                record.line_bytes = Some(bytes_read);
            }
            (Some(lb), Some(lby)) => {
                if line_len_bases < lb || (line_len_bases == lb && bytes_read < lby) {
                    record.short_line_seen = true;
                } else if line_len_bases > lb || bytes_read > lby {
                    return Err(DatasetError::parse(
                        path.display(),
                        line_no,
                        format!("different line length in sequence '{}'", record.name),
                    ));
                }
            }
        }
        record.length += line_len_bases;
    }

    if let Some(record) = current.take() {
        results.push(record.finish());
    }

    Ok(results)
}

///
/// Read an existing `.fai` file.
///
pub fn read_fai<T: AsRef<Path>>(file_path: T) -> Result<Vec<FaiRecord>> {
    let path = file_path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut results = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split('\t').collect();
        if parts.len() < 5 {
            return Err(DatasetError::parse(
                path.display(),
                line_idx + 1,
                format!("expected 5 columns, found {}", parts.len()),
            ));
        }

        let number = |idx: usize| -> Result<u64> {
            parts[idx].trim().parse::<u64>().map_err(|_| {
                DatasetError::parse(
                    path.display(),
                    line_idx + 1,
                    format!("invalid number in column {}: {:?}", idx + 1, parts[idx]),
                )
            })
        };

        let record = FaiRecord {
            name: parts[0].to_string(),
            length: number(1)?,
            offset: number(2)?,
            line_bases: number(3)?,
            line_bytes: number(4)?,
        };
        record.check_layout().map_err(|reason| {
            DatasetError::Reference(format!(
                "invalid index {} at line {}: {}",
                path.display(),
                line_idx + 1,
                reason
            ))
        })?;
        results.push(record);
    }

    Ok(results)
}

/// Name-addressable FASTA index.
#[derive(Clone, Debug)]
pub struct FastaIndex {
    records: Vec<FaiRecord>,
    lookup: HashMap<String, usize>,
}

impl From<Vec<FaiRecord>> for FastaIndex {
    fn from(records: Vec<FaiRecord>) -> Self {
        let lookup = records
            .iter()
            .enumerate()
            .map(|(idx, record)| (record.name.clone(), idx))
            .collect();
        FastaIndex { records, lookup }
    }
}

impl FastaIndex {
    ///
    /// Use `<fasta>.fai` when it exists, otherwise index the FASTA file in memory.
    ///
    pub fn load_or_compute<T: AsRef<Path>>(fasta_path: T) -> Result<Self> {
        let fasta_path = fasta_path.as_ref();
        let index_path = fai_path(fasta_path);

        let records = if index_path.is_file() {
            debug!("Reading FASTA index {}", index_path.display());
            read_fai(&index_path)?
        } else {
            info!(
                "No index found for {}, indexing it in memory",
                fasta_path.display()
            );
            compute_fai(fasta_path)?
        };

        Ok(FastaIndex::from(records))
    }

    pub fn get(&self, name: &str) -> Option<&FaiRecord> {
        self.lookup.get(name).map(|&idx| &self.records[idx])
    }

    /// The index in `.fai` text form, one tab-separated line per sequence.
    pub fn to_fai_string(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{}\n", record))
            .collect()
    }

    pub fn records(&self) -> &[FaiRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
