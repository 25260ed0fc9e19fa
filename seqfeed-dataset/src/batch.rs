use std::path::Path;

use log::info;
use ndarray::{Array1, Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use seqfeed_core::{DatasetError, Result};

use crate::collection::{CollectionIter, Label, WeightedSourceCollection};
use crate::config::DatasetConfig;
use crate::consts::DEFAULT_SEED;
use crate::source::{RecordSource, SequenceSource};

/// Stacked examples: `xs` is `[n, seq_len, 4]`, `ys` holds the `n` labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub xs: Array3<i8>,
    pub ys: Array1<Label>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.ys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ys.is_empty()
    }
}

fn stack(items: Vec<(Array2<i8>, Label)>, seq_shape: (usize, usize)) -> Batch {
    let (seq_len, bases) = seq_shape;
    let mut xs = Array3::<i8>::zeros((items.len(), seq_len, bases));
    let mut ys = Vec::with_capacity(items.len());

    for (i, (x, y)) in items.into_iter().enumerate() {
        xs.index_axis_mut(Axis(0), i).assign(&x);
        ys.push(y);
    }

    Batch {
        xs,
        ys: Array1::from_vec(ys),
    }
}

///
/// Batching front end of a [`WeightedSourceCollection`] for training and evaluation loops.
///
/// Endless collections give an unbounded stream of full batches. Exhaustive collections
/// give `steps_per_epoch` batches per pass, the last one possibly short, and can be
/// drained into arrays at once with [`BatchedCollection::materialize`].
///
pub struct BatchedCollection<S: SequenceSource<Item = Array2<i8>> = RecordSource> {
    collection: WeightedSourceCollection<S>,
    batch_size: usize,
    rng: StdRng,
}

impl BatchedCollection<RecordSource> {
    pub fn from_fasta<P: AsRef<Path>>(
        fa_files: &[P],
        labels: &[Label],
        endless: bool,
        batch_size: usize,
    ) -> Result<Self> {
        let collection = WeightedSourceCollection::from_fasta(fa_files, labels, endless)?;
        Self::new(collection, batch_size)
    }

    ///
    /// Build the whole pipeline from a TOML dataset description.
    ///
    /// # Arguments
    /// - path: path to the config file; relative FASTA paths resolve against its directory
    ///
    pub fn from_config<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = DatasetConfig::try_from(path.as_ref())?;
        info!(
            "Building dataset from config {}",
            path.as_ref().display()
        );

        Ok(Self::from_fasta(
            &config.fa_files,
            &config.labels,
            config.endless,
            config.batch_size,
        )?
        .with_seed(config.seed))
    }
}

impl<S: SequenceSource<Item = Array2<i8>>> BatchedCollection<S> {
    pub fn new(collection: WeightedSourceCollection<S>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(DatasetError::Configuration(
                "batch size must be at least 1".to_string(),
            ));
        }

        Ok(BatchedCollection {
            collection,
            batch_size,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        })
    }

    /// Seed both the collection's draws and the subset shuffling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.collection = self.collection.with_seed(seed);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn seq_shape(&self) -> (usize, usize) {
        self.collection.seq_shape()
    }

    pub fn num_classes(&self) -> usize {
        self.collection.num_classes()
    }

    pub fn is_endless(&self) -> bool {
        self.collection.is_endless()
    }

    pub fn collection(&self) -> &WeightedSourceCollection<S> {
        &self.collection
    }

    /// Number of batches in one pass over every example.
    pub fn steps_per_epoch(&self) -> usize {
        self.len().div_ceil(self.batch_size)
    }

    pub fn batches(&mut self) -> BatchIter<'_, S> {
        let seq_shape = self.seq_shape();
        BatchIter {
            items: self.collection.iter(),
            batch_size: self.batch_size,
            seq_shape,
        }
    }

    ///
    /// Every example of an exhaustive collection in one batch, shuffled with the
    /// adapter's generator. Use [`take_as_arrays`](Self::take_as_arrays) for source order.
    ///
    pub fn materialize(&mut self) -> Result<Batch> {
        if self.is_endless() {
            return Err(DatasetError::Configuration(
                "cannot materialize an endless collection".to_string(),
            ));
        }

        self.random_subset(self.len())
    }

    /// The next `n` examples of the stream, unbatched. Fewer if an exhaustive pass ends first.
    pub fn take_as_arrays(&mut self, n: usize) -> Result<Batch> {
        let seq_shape = self.seq_shape();
        let items = self.collection.iter().take(n).collect::<Result<Vec<_>>>()?;
        Ok(stack(items, seq_shape))
    }

    ///
    /// `k` examples picked through a shuffle buffer as large as the collection.
    ///
    /// The buffer is filled from the stream; each pick removes a random entry and refills
    /// its slot with the next streamed item. On an exhaustive collection this is a random
    /// sample without replacement, capped at `len` examples.
    ///
    pub fn random_subset(&mut self, k: usize) -> Result<Batch> {
        let seq_shape = self.seq_shape();
        let capacity = self.collection.len();
        let rng = &mut self.rng;
        let mut stream = self.collection.iter();

        let mut buffer = Vec::with_capacity(capacity);
        for item in stream.by_ref().take(capacity) {
            buffer.push(item?);
        }

        let mut picked = Vec::with_capacity(k.min(capacity));
        while picked.len() < k && !buffer.is_empty() {
            let idx = rng.random_range(0..buffer.len());
            picked.push(buffer.swap_remove(idx));
            if let Some(item) = stream.next() {
                buffer.push(item?);
            }
        }

        Ok(stack(picked, seq_shape))
    }
}

/// Iterator returned by [`BatchedCollection::batches`].
pub struct BatchIter<'a, S: SequenceSource<Item = Array2<i8>>> {
    items: CollectionIter<'a, S>,
    batch_size: usize,
    seq_shape: (usize, usize),
}

impl<S: SequenceSource<Item = Array2<i8>>> Iterator for BatchIter<'_, S> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut items = Vec::with_capacity(self.batch_size);
        for item in self.items.by_ref().take(self.batch_size) {
            match item {
                Ok(item) => items.push(item),
                Err(err) => return Some(Err(err)),
            }
        }

        if items.is_empty() {
            return None;
        }
        Some(Ok(stack(items, self.seq_shape)))
    }
}
