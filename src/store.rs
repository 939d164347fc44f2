//! Per-image storage of committed annotations.

use std::collections::BTreeMap;

use crate::model::Annotation;

/// Committed annotations for every image touched in the session, keyed by
/// image identifier. Each sequence keeps insertion order.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSetStore {
    sets: BTreeMap<String, Vec<Annotation>>,
}

impl AnnotationSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annotations for an image; empty if the image has never been stored.
    pub fn get(&self, image_id: &str) -> &[Annotation] {
        self.sets.get(image_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether an entry exists for the image (even an empty one).
    pub fn contains_image(&self, image_id: &str) -> bool {
        self.sets.contains_key(image_id)
    }

    /// Replace an image's sequence wholesale.
    ///
    /// Uncommitted drafts never enter the store; any present are dropped.
    pub fn set(&mut self, image_id: &str, annotations: Vec<Annotation>) {
        let before = annotations.len();
        let committed: Vec<Annotation> = annotations
            .into_iter()
            .filter(Annotation::is_committed)
            .collect();
        if committed.len() != before {
            log::warn!(
                "Dropped {} uncommitted annotation(s) while storing image {}",
                before - committed.len(),
                image_id
            );
        }
        self.sets.insert(image_id.to_string(), committed);
    }

    /// Remove one annotation by id. Survivors keep their ids.
    pub fn remove(&mut self, image_id: &str, annotation_id: &str) -> Option<Annotation> {
        let set = self.sets.get_mut(image_id)?;
        let index = set.iter().position(|a| a.id() == Some(annotation_id))?;
        Some(set.remove(index))
    }

    /// Empty an image's sequence, keeping the entry.
    pub fn clear(&mut self, image_id: &str) {
        if let Some(set) = self.sets.get_mut(image_id) {
            set.clear();
        }
    }

    /// All stored images with their annotations, ordered by image id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Annotation])> {
        self.sets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of images with an entry.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total annotation count across all images.
    pub fn total_annotations(&self) -> usize {
        self.sets.values().map(Vec::len).sum()
    }
}
