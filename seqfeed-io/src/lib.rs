//! # Input utilities for sequence data.
//!
//! This crate reads the two file kinds every seqfeed source is built from:
//!
//! - **`FastaReader`**: streams records out of a (optionally gzipped) FASTA file, one at a time
//! - **`FastaIndex`**: `.fai` rows for an uncompressed FASTA, read from disk and checked
//!   when present or computed with one streaming pass
//! - **`ReferenceGenome`**: resolves genomic intervals against an indexed reference, reading
//!   only the bytes of each requested interval, and writes them to a scoped temporary FASTA
//!   (`ExtractedSequences`) that is deleted when dropped
//!
pub mod fai;
pub mod fasta;
pub mod reference;

// re-expose core functions
pub use fai::*;
pub use fasta::*;
pub use reference::*;
