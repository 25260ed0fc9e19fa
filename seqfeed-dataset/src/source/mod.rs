use log::debug;

use seqfeed_core::{DatasetError, NUM_BASES, Result};

pub mod interval;
pub mod record;

pub use interval::{IntervalExample, IntervalSource};
pub use record::RecordSource;

/// Outcome of advancing a source.
#[derive(Debug, Clone, PartialEq)]
pub enum Pull<T> {
    Item(T),
    /// A finite source ran out. Not an error.
    EndOfStream,
}

impl<T> Pull<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Pull<U> {
        match self {
            Pull::Item(item) => Pull::Item(f(item)),
            Pull::EndOfStream => Pull::EndOfStream,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Pull::Item(item) => Some(item),
            Pull::EndOfStream => None,
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Pull::EndOfStream)
    }
}

///
/// A finite, restartable producer of fixed-shape one-hot examples.
///
/// `len` and `seq_len` are fixed when the source is built. In endless mode `pull`
/// never returns [`Pull::EndOfStream`]: running out rebuilds the producer and
/// continues from the first item.
///
pub trait SequenceSource {
    type Item;

    /// Number of items in one full pass.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn seq_len(&self) -> usize;

    fn seq_shape(&self) -> (usize, usize) {
        (self.seq_len(), NUM_BASES)
    }

    fn is_endless(&self) -> bool;

    fn pull(&mut self) -> Result<Pull<Self::Item>>;

    /// Rebuild the producer so the next `pull` yields the first item again.
    fn restart(&mut self) -> Result<()>;

    fn items(&mut self) -> SourceIter<'_, Self>
    where
        Self: Sized,
    {
        SourceIter { source: self }
    }
}

/// Iterator view of a source; ends on [`Pull::EndOfStream`].
pub struct SourceIter<'a, S> {
    source: &'a mut S,
}

impl<S: SequenceSource> Iterator for SourceIter<'_, S> {
    type Item = Result<S::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.source.pull() {
            Ok(Pull::Item(item)) => Some(Ok(item)),
            Ok(Pull::EndOfStream) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

/// Restart state of a source's underlying producer.
pub(crate) enum SourceState<G> {
    Active(G),
    Exhausted,
}

impl<G, T> SourceState<G>
where
    G: Iterator<Item = Result<T>>,
{
    pub(crate) fn advance<F>(&mut self, endless: bool, context: &str, rebuild: F) -> Result<Pull<T>>
    where
        F: FnOnce() -> Result<G>,
    {
        if let SourceState::Active(producer) = self {
            match producer.next() {
                Some(item) => return item.map(Pull::Item),
                None => *self = SourceState::Exhausted,
            }
        }

        if !endless {
            return Ok(Pull::EndOfStream);
        }

        debug!("Restarting exhausted source {}", context);
        let mut producer = rebuild()?;
        match producer.next() {
            Some(item) => {
                *self = SourceState::Active(producer);
                item.map(Pull::Item)
            }
            None => Err(DatasetError::EmptySource(format!(
                "{} produced no items after restart",
                context
            ))),
        }
    }

    pub(crate) fn reset(&mut self, producer: G) {
        *self = SourceState::Active(producer);
    }
}

///
/// Count items and check they all share one non-zero length.
///
/// Returns `(count, seq_len)`.
///
pub(crate) fn uniform_length<I>(lengths: I, context: &str) -> Result<(usize, usize)>
where
    I: IntoIterator<Item = Result<usize>>,
{
    let mut count = 0;
    let mut seq_len: Option<usize> = None;

    for len in lengths {
        let len = len?;
        count += 1;
        match seq_len {
            None if len < 1 => {
                return Err(DatasetError::EmptySource(format!(
                    "empty sequence in {}",
                    context
                )));
            }
            None => seq_len = Some(len),
            Some(expected) if expected != len => {
                return Err(DatasetError::ShapeMismatch {
                    context: context.to_string(),
                    expected,
                    found: len,
                });
            }
            Some(_) => {}
        }
    }

    match seq_len {
        Some(seq_len) => Ok((count, seq_len)),
        None => Err(DatasetError::EmptySource(format!(
            "no sequences in {}",
            context
        ))),
    }
}
