use log::debug;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use seqfeed_core::{DatasetError, Result};

/// Class label attached to every example of a source.
pub type Label = i32;

/// A source as seen by the frequency model: its position in the collection and its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceEntry {
    pub index: usize,
    pub len: usize,
}

///
/// All sources sharing one label.
///
/// `source_probs[i]` is `sources[i].len / len`.
///
#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub label: Label,
    pub len: usize,
    pub sources: Vec<SourceEntry>,
    pub source_probs: Vec<f64>,
    source_dist: WeightedIndex<f64>,
}

impl ClassEntry {
    fn new(label: Label, sources: Vec<SourceEntry>) -> Result<Self> {
        let len = sources.iter().map(|s| s.len).sum::<usize>();
        let source_probs = sources
            .iter()
            .map(|s| s.len as f64 / len as f64)
            .collect::<Vec<_>>();
        let source_dist = weighted(&source_probs, label)?;

        Ok(ClassEntry {
            label,
            len,
            sources,
            source_probs,
            source_dist,
        })
    }
}

fn weighted(probs: &[f64], label: Label) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(probs.iter().copied()).map_err(|err| {
        DatasetError::Configuration(format!("cannot sample from class {}: {}", label, err))
    })
}

///
/// Two-level sampling model over a list of labeled sources.
///
/// A draw first picks a class with probability `class.len / total_len`, then a source
/// within that class with probability `source.len / class.len`. Classes are kept in order
/// of first appearance of their label, sources in collection order. The model is built
/// once and never changes.
///
#[derive(Debug, Clone)]
pub struct FrequencyModel {
    classes: Vec<ClassEntry>,
    total_len: usize,
    class_probs: Vec<f64>,
    class_dist: WeightedIndex<f64>,
}

impl FrequencyModel {
    ///
    /// # Arguments
    /// - labels: label of each source
    /// - lens: number of items in each source, same order as `labels`
    ///
    pub fn build(labels: &[Label], lens: &[usize]) -> Result<Self> {
        if labels.len() != lens.len() {
            return Err(DatasetError::Configuration(format!(
                "{} labels given for {} sources",
                labels.len(),
                lens.len()
            )));
        }
        if labels.is_empty() {
            return Err(DatasetError::Configuration(
                "cannot build a frequency model without sources".to_string(),
            ));
        }

        let mut grouped: Vec<(Label, Vec<SourceEntry>)> = Vec::new();
        for (index, (&label, &len)) in labels.iter().zip(lens).enumerate() {
            let entry = SourceEntry { index, len };
            match grouped.iter_mut().find(|(l, _)| *l == label) {
                Some((_, sources)) => sources.push(entry),
                None => grouped.push((label, vec![entry])),
            }
        }

        let classes = grouped
            .into_iter()
            .map(|(label, sources)| ClassEntry::new(label, sources))
            .collect::<Result<Vec<_>>>()?;

        let total_len = classes.iter().map(|c| c.len).sum::<usize>();
        let class_probs = classes
            .iter()
            .map(|c| c.len as f64 / total_len as f64)
            .collect::<Vec<_>>();
        let class_dist = WeightedIndex::new(class_probs.iter().copied()).map_err(|err| {
            DatasetError::Configuration(format!("cannot sample classes: {}", err))
        })?;

        debug!(
            "Frequency model: {} classes over {} items, class probabilities {:?}",
            classes.len(),
            total_len,
            class_probs
        );

        Ok(FrequencyModel {
            classes,
            total_len,
            class_probs,
            class_dist,
        })
    }

    /// Draw a class, then a source within it. Consumes two values from `rng`, in that order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (&ClassEntry, SourceEntry) {
        let class = &self.classes[self.class_dist.sample(rng)];
        let source = class.sources[class.source_dist.sample(rng)];
        (class, source)
    }

    pub fn classes(&self) -> &[ClassEntry] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn class_probs(&self) -> &[f64] {
        &self.class_probs
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn labels(&self) -> Vec<Label> {
        self.classes.iter().map(|c| c.label).collect()
    }

    pub fn class(&self, label: Label) -> Option<&ClassEntry> {
        self.classes.iter().find(|c| c.label == label)
    }
}
