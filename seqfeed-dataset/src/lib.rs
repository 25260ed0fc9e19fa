//! # seqfeed-dataset
//!
//! Turns sequence files into streams of one-hot tensors for model training and evaluation.
//!
//! ## Main Components
//!
//! - **`RecordSource`**: one-hot tensors straight from the records of a FASTA file
//! - **`IntervalSource`**: one-hot tensors for BED intervals resolved against a reference,
//!   optionally paired with typed values of selected BED columns
//! - **`WeightedSourceCollection`**: merges labeled sources into one stream, either
//!   exhaustively (every example once, in source order) or endlessly with a two-level
//!   class-then-source weighted draw
//! - **`BatchedCollection`**: batches a collection, drains it into arrays, or pulls a
//!   shuffled subset
//!
//! Sources in endless mode restart themselves when exhausted. Sources in finite mode
//! report [`Pull::EndOfStream`] once they run out.
//!
//! ## Example
//!
//! ```rust
//! use seqfeed_dataset::{SequenceSource, WeightedSourceCollection};
//!
//! let paths = [
//!     "../tests/data/fasta/pos_a.fa",
//!     "../tests/data/fasta/pos_b.fa",
//!     "../tests/data/fasta/neg.fa",
//! ];
//! let mut collection = WeightedSourceCollection::from_fasta(&paths, &[1, 1, 0], true).unwrap();
//! assert_eq!(collection.len(), 6);
//! assert_eq!(collection.num_classes(), 2);
//!
//! let (tensor, label) = collection.iter().next().unwrap().unwrap();
//! assert_eq!(tensor.shape(), &[100, 4]);
//! assert!(label == 0 || label == 1);
//! ```
//!
pub mod batch;
pub mod collection;
pub mod config;
pub mod consts;
pub mod source;

// re-export things
pub use batch::*;
pub use collection::*;
pub use config::*;
pub use source::*;
