//! # seqfeed-core
//!
//! Core building blocks shared by every seqfeed crate.
//!
//! ## Main Components
//!
//! - **`OneHotEncoder`**: maps a nucleotide string to a fixed `(seq_len, 4)` tensor
//! - **`Region`** / **`RegionSet`**: genomic intervals read from BED-like files, in file order,
//!   with every tab-separated field retained for auxiliary column extraction
//! - **`ColumnValue`**: typed value of an auxiliary BED column
//! - **`DatasetError`**: the error taxonomy used across the workspace
//!
//! ## Example
//!
//! ```rust
//! use seqfeed_core::OneHotEncoder;
//!
//! let encoder = OneHotEncoder::new(4);
//! let tensor = encoder.encode(b"ACGN");
//! assert_eq!(tensor.shape(), &[4, 4]);
//! assert_eq!(tensor.row(3).sum(), 0);
//! ```
//!
pub mod consts;
pub mod encoding;
pub mod errors;
pub mod models;
pub mod utils;

// re-export things
pub use consts::*;
pub use encoding::*;
pub use errors::*;
