use std::path::Path;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use seqfeed_core::{DatasetError, Result};

use crate::consts::DEFAULT_SEED;
use crate::source::{Pull, RecordSource, SequenceSource};

pub mod frequency;

pub use frequency::{ClassEntry, FrequencyModel, Label, SourceEntry};

///
/// Labeled sources merged into a single stream of `(item, label)` pairs.
///
/// In exhaustive mode (`endless == false`) iteration yields every item of every source
/// exactly once, source by source, in collection order. In endless mode iteration never
/// ends: each draw picks a class, then a source within it, through the
/// [`FrequencyModel`], and pulls that source's next item.
///
/// The collection owns the random generator used for its draws. It is seeded with
/// [`DEFAULT_SEED`] unless [`WeightedSourceCollection::with_seed`] says otherwise, so the
/// same seed and source order give the same stream.
///
pub struct WeightedSourceCollection<S: SequenceSource = RecordSource> {
    sources: Vec<S>,
    labels: Vec<Label>,
    model: FrequencyModel,
    endless: bool,
    seq_len: usize,
    rng: StdRng,
}

impl WeightedSourceCollection<RecordSource> {
    ///
    /// Build a collection with one [`RecordSource`] per FASTA file.
    ///
    /// # Arguments
    /// - fa_files: FASTA files, gzip'd or not
    /// - labels: label of each file
    /// - endless: weighted endless draws instead of one exhaustive pass
    ///
    pub fn from_fasta<P: AsRef<Path>>(
        fa_files: &[P],
        labels: &[Label],
        endless: bool,
    ) -> Result<Self> {
        // fail before touching any file
        check_counts(fa_files.len(), labels.len())?;

        let sources = fa_files
            .iter()
            .map(|path| RecordSource::new(path, endless))
            .collect::<Result<Vec<_>>>()?;

        Self::new(sources, labels, endless)
    }
}

fn check_counts(num_sources: usize, num_labels: usize) -> Result<()> {
    if num_sources != num_labels {
        return Err(DatasetError::Configuration(format!(
            "{} sources but {} labels",
            num_sources, num_labels
        )));
    }
    if num_sources == 0 {
        return Err(DatasetError::Configuration(
            "a collection needs at least one source".to_string(),
        ));
    }
    Ok(())
}

impl<S: SequenceSource> WeightedSourceCollection<S> {
    pub fn new(sources: Vec<S>, labels: &[Label], endless: bool) -> Result<Self> {
        check_counts(sources.len(), labels.len())?;

        let seq_len = sources[0].seq_len();
        if let Some(other) = sources.iter().find(|s| s.seq_len() != seq_len) {
            return Err(DatasetError::ShapeMismatch {
                context: "sources of one collection".to_string(),
                expected: seq_len,
                found: other.seq_len(),
            });
        }

        let lens = sources.iter().map(|s| s.len()).collect::<Vec<_>>();
        let model = FrequencyModel::build(labels, &lens)?;

        info!(
            "Built {} collection of {} sources, {} classes, {} items of length {}",
            if endless { "endless" } else { "exhaustive" },
            sources.len(),
            model.num_classes(),
            model.total_len(),
            seq_len
        );

        Ok(WeightedSourceCollection {
            sources,
            labels: labels.to_vec(),
            model,
            endless,
            seq_len,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Total number of items across all sources.
    pub fn len(&self) -> usize {
        self.model.total_len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_classes(&self) -> usize {
        self.model.num_classes()
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn seq_shape(&self) -> (usize, usize) {
        self.sources[0].seq_shape()
    }

    pub fn is_endless(&self) -> bool {
        self.endless
    }

    /// Label of each source, in collection order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn frequencies(&self) -> &FrequencyModel {
        &self.model
    }

    pub fn sources(&self) -> &[S] {
        &self.sources
    }

    ///
    /// One weighted draw using the given generator instead of the collection's own.
    ///
    /// Consumes the class draw, then the source draw, then advances the chosen source.
    ///
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(S::Item, Label)> {
        draw_from(&self.model, &mut self.sources, rng)
    }

    /// Stream of `(item, label)` pairs; finite in exhaustive mode, unbounded otherwise.
    pub fn iter(&mut self) -> CollectionIter<'_, S> {
        CollectionIter {
            collection: self,
            cursor: (0, 0),
            done: false,
        }
    }

    fn next_exhaustive(&mut self, cursor: &mut (usize, usize)) -> Option<Result<(S::Item, Label)>> {
        loop {
            let (index, taken) = *cursor;
            let source = self.sources.get_mut(index)?;

            if taken == source.len() {
                *cursor = (index + 1, 0);
                continue;
            }
            if taken == 0 {
                if let Err(err) = source.restart() {
                    return Some(Err(err));
                }
            }

            match source.pull() {
                Ok(Pull::Item(item)) => {
                    *cursor = (index, taken + 1);
                    return Some(Ok((item, self.labels[index])));
                }
                Ok(Pull::EndOfStream) => {
                    warn!(
                        "Source {} ended after {} of {} items",
                        index,
                        taken,
                        source.len()
                    );
                    *cursor = (index + 1, 0);
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

fn draw_from<S, R>(
    model: &FrequencyModel,
    sources: &mut [S],
    rng: &mut R,
) -> Result<(S::Item, Label)>
where
    S: SequenceSource,
    R: Rng + ?Sized,
{
    let (class, entry) = model.sample(rng);
    let source = &mut sources[entry.index];

    match source.pull()? {
        Pull::Item(item) => Ok((item, class.label)),
        Pull::EndOfStream => {
            warn!(
                "Finite source {} exhausted during a weighted draw, restarting it",
                entry.index
            );
            source.restart()?;
            match source.pull()? {
                Pull::Item(item) => Ok((item, class.label)),
                Pull::EndOfStream => Err(DatasetError::EmptySource(format!(
                    "source {} produced no items after restart",
                    entry.index
                ))),
            }
        }
    }
}

/// Iterator returned by [`WeightedSourceCollection::iter`].
pub struct CollectionIter<'a, S: SequenceSource> {
    collection: &'a mut WeightedSourceCollection<S>,
    // exhaustive mode: (source index, items taken from it)
    cursor: (usize, usize),
    done: bool,
}

impl<S: SequenceSource> Iterator for CollectionIter<'_, S> {
    type Item = Result<(S::Item, Label)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let next = if self.collection.endless {
            let collection = &mut *self.collection;
            Some(draw_from(
                &collection.model,
                &mut collection.sources,
                &mut collection.rng,
            ))
        } else {
            self.collection.next_exhaustive(&mut self.cursor)
        };

        // errors are terminal
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::Array2;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use seqfeed_core::decode_one_hot;

    #[fixture]
    fn fa_files() -> Vec<&'static str> {
        vec![
            "../tests/data/fasta/pos_a.fa",
            "../tests/data/fasta/pos_b.fa",
            "../tests/data/fasta/neg.fa",
        ]
    }

    fn prefix(tensor: &Array2<i8>) -> String {
        decode_one_hot(&tensor.view())[..10].to_string()
    }

    #[rstest]
    fn test_collection_surface(fa_files: Vec<&str>) {
        let collection = WeightedSourceCollection::from_fasta(&fa_files, &[1, 1, 0], true).unwrap();
        assert_eq!(collection.len(), 6);
        assert_eq!(collection.num_classes(), 2);
        assert_eq!(collection.seq_shape(), (100, 4));
        assert_eq!(collection.labels(), &[1, 1, 0]);
        assert!(collection.is_endless());
    }

    #[rstest]
    fn test_exhaustive_order(fa_files: Vec<&str>) {
        let mut collection =
            WeightedSourceCollection::from_fasta(&fa_files, &[1, 1, 0], false).unwrap();
        let items = collection.iter().collect::<Result<Vec<_>>>().unwrap();

        let seen = items
            .iter()
            .map(|(tensor, label)| (prefix(tensor), *label))
            .collect::<Vec<_>>();
        assert_eq!(
            seen,
            vec![
                ("CTGGCGCCTC".to_string(), 1),
                ("GATCTCGTTT".to_string(), 1),
                ("CAGGACCCTG".to_string(), 1),
                ("CTATCACATC".to_string(), 1),
                ("CGTCTTTCTG".to_string(), 0),
                ("CATCTCGCCC".to_string(), 0),
            ]
        );
    }

    #[rstest]
    fn test_exhaustive_passes_are_stable(fa_files: Vec<&str>) {
        let mut collection =
            WeightedSourceCollection::from_fasta(&fa_files, &[1, 1, 0], false).unwrap();
        let first = collection.iter().collect::<Result<Vec<_>>>().unwrap();
        let second = collection.iter().collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(first.len(), collection.len());
        assert_eq!(first, second);
    }

    #[rstest]
    fn test_endless_is_unbounded(fa_files: Vec<&str>) {
        let mut collection =
            WeightedSourceCollection::from_fasta(&fa_files, &[1, 1, 0], true).unwrap();
        let items = collection
            .iter()
            .take(100)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(items.len(), 100);
        assert!(items.iter().all(|(x, _)| x.shape() == [100, 4]));
        assert!(items.iter().any(|(_, y)| *y == 0));
        assert!(items.iter().any(|(_, y)| *y == 1));
    }

    #[rstest]
    fn test_endless_is_seeded(fa_files: Vec<&str>) {
        let run = |seed| {
            let mut collection = WeightedSourceCollection::from_fasta(&fa_files, &[1, 1, 0], true)
                .unwrap()
                .with_seed(seed);
            collection
                .iter()
                .take(30)
                .map(|item| item.map(|(x, y)| (prefix(&x), y)))
                .collect::<Result<Vec<_>>>()
                .unwrap()
        };
        assert_eq!(run(5), run(5));
    }

    #[rstest]
    fn test_class_frequencies(fa_files: Vec<&str>) {
        let mut collection =
            WeightedSourceCollection::from_fasta(&fa_files, &[1, 1, 0], true).unwrap();
        let draws = 6_000;
        let positive = collection
            .iter()
            .take(draws)
            .filter(|item| matches!(item, Ok((_, 1))))
            .count();
        let freq = positive as f64 / draws as f64;
        assert!((freq - 4.0 / 6.0).abs() < 0.03, "class freq {}", freq);
    }

    #[rstest]
    fn test_draw_with_explicit_rng(fa_files: Vec<&str>) {
        let mut collection =
            WeightedSourceCollection::from_fasta(&fa_files, &[1, 1, 0], false).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        // finite sources are restarted when a draw runs them dry
        for _ in 0..20 {
            let (tensor, label) = collection.draw(&mut rng).unwrap();
            assert_eq!(tensor.shape(), &[100, 4]);
            assert!(label == 0 || label == 1);
        }
    }

    #[rstest]
    fn test_label_count_mismatch(fa_files: Vec<&str>) {
        let result = WeightedSourceCollection::from_fasta(&fa_files, &[1, 0], true);
        assert!(matches!(result, Err(DatasetError::Configuration(_))));
    }

    #[rstest]
    fn test_mismatch_checked_before_opening() {
        let result =
            WeightedSourceCollection::from_fasta(&["../tests/data/fasta/missing.fa"], &[], true);
        assert!(matches!(result, Err(DatasetError::Configuration(_))));
    }

    #[rstest]
    fn test_shape_mismatch_across_sources() {
        let result = WeightedSourceCollection::from_fasta(
            &["../tests/data/fasta/neg.fa", "../tests/data/fasta/short.fa"],
            &[0, 1],
            true,
        );
        assert!(matches!(
            result,
            Err(DatasetError::ShapeMismatch {
                expected: 100,
                found: 50,
                ..
            })
        ));
    }
}
