#[cfg(feature = "core")]
#[doc(inline)]
pub use seqfeed_core as core;

#[cfg(feature = "io")]
#[doc(inline)]
pub use seqfeed_io as io;

#[cfg(feature = "dataset")]
#[doc(inline)]
pub use seqfeed_dataset as dataset;
