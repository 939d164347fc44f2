//! The annotation engine for the image currently on screen.
//!
//! The engine owns the working copy of the current image's annotations, the
//! gesture state machine and the render surface. Everything runs to
//! completion on the caller's thread: each method takes `&mut self`, so an
//! image switch can never be interleaved with a pointer event.

use std::collections::HashSet;

use crate::allocator;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::geometry::{compute_scale, Point, ScaleTransform, Size};
use crate::interaction::{BoxInteraction, GestureOutcome, InteractionState};
use crate::model::{Annotation, ClassSet};
use crate::render::{self, Frame, RenderSurface};
use crate::store::AnnotationSetStore;

/// Receives the full annotation sequence of an image after every committed
/// change (label commit, delete, clear).
pub trait AnnotationObserver {
    fn on_annotations_changed(&mut self, image_id: &str, annotations: &[Annotation]);
}

impl<F> AnnotationObserver for F
where
    F: FnMut(&str, &[Annotation]),
{
    fn on_annotations_changed(&mut self, image_id: &str, annotations: &[Annotation]) {
        self(image_id, annotations)
    }
}

/// The image being annotated right now.
#[derive(Debug, Clone)]
struct CurrentImage {
    id: String,
    natural: Size,
    transform: ScaleTransform,
    annotations: Vec<Annotation>,
}

/// Annotation engine bound to a render surface.
pub struct AnnotationEngine<S: RenderSurface> {
    config: EngineConfig,
    classes: ClassSet,
    store: AnnotationSetStore,
    current: Option<CurrentImage>,
    interaction: BoxInteraction,
    surface: S,
    observers: Vec<Box<dyn AnnotationObserver>>,
}

impl<S: RenderSurface> AnnotationEngine<S> {
    pub fn new(config: EngineConfig, classes: ClassSet, surface: S) -> Self {
        let interaction = BoxInteraction::new(config.min_box_size, config.draft_color.clone());
        Self {
            config,
            classes,
            store: AnnotationSetStore::new(),
            current: None,
            interaction,
            surface,
            observers: Vec::new(),
        }
    }

    /// Register a change observer.
    pub fn add_observer(&mut self, observer: impl AnnotationObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn state(&self) -> &InteractionState {
        self.interaction.state()
    }

    /// Identifier of the image on screen, if a valid one is loaded.
    pub fn current_image(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.id.as_str())
    }

    /// Scale of the image on screen.
    pub fn transform(&self) -> Option<ScaleTransform> {
        self.current.as_ref().map(|c| c.transform)
    }

    /// Natural size of the image on screen.
    pub fn natural_size(&self) -> Option<Size> {
        self.current.as_ref().map(|c| c.natural)
    }

    /// Committed annotations of the image on screen.
    pub fn annotations(&self) -> &[Annotation] {
        self.current
            .as_ref()
            .map(|c| c.annotations.as_slice())
            .unwrap_or(&[])
    }

    /// Committed annotations of any image; the working copy for the current
    /// one, the stored sequence otherwise.
    pub fn annotations_for(&self, image_id: &str) -> &[Annotation] {
        match &self.current {
            Some(current) if current.id == image_id => current.annotations.as_slice(),
            _ => self.store.get(image_id),
        }
    }

    /// The draft waiting for a label, if any.
    pub fn pending_draft(&self) -> Option<&Annotation> {
        self.interaction.pending()
    }

    /// Display-space point where a class picker for the pending draft
    /// should open: the draft's bottom-right corner.
    pub fn label_prompt_anchor(&self) -> Option<Point> {
        let transform = self.transform()?;
        let draft = self.interaction.pending()?;
        Some(transform.to_display_point(draft.bbox.bottom_right()))
    }

    /// Write the working copy back and return the whole annotation set.
    pub fn sync_store(&mut self) -> &AnnotationSetStore {
        if let Some(current) = &self.current {
            self.store.set(&current.id, current.annotations.clone());
        }
        &self.store
    }

    /// The store as last synchronized. The current image's entry may lag
    /// behind its working copy; use [`Self::sync_store`] for a consistent view.
    pub fn store(&self) -> &AnnotationSetStore {
        &self.store
    }

    /// Make `image_id` the current image.
    ///
    /// In order: a pending label is cancelled, the outgoing image's working
    /// copy is written back to the store, the incoming image's sequence is
    /// loaded, the scale is recomputed and the canvas is redrawn.
    ///
    /// `initial` seeds the image's entry the first time it is loaded in the
    /// session; once the store holds an entry, that entry wins. Malformed
    /// boxes in `initial` are clamped to zero area and drafts are dropped.
    ///
    /// On [`EngineError::InvalidDimensions`] no image is current afterwards
    /// and drawing stays suspended until a valid image is loaded.
    pub fn load_image(
        &mut self,
        image_id: &str,
        natural_width: f32,
        natural_height: f32,
        initial: Option<Vec<Annotation>>,
    ) -> Result<(), EngineError> {
        if let Some(draft) = self.interaction.reset() {
            log::debug!(
                "Cancelled pending draft at ({}, {}) before switching images",
                draft.bbox.x,
                draft.bbox.y
            );
        }

        if let Some(outgoing) = self.current.take() {
            log::debug!(
                "Storing {} annotation(s) for outgoing image {}",
                outgoing.annotations.len(),
                outgoing.id
            );
            self.store.set(&outgoing.id, outgoing.annotations);
        }

        let natural = Size::new(natural_width, natural_height);
        let transform = match compute_scale(self.config.container_size(), natural) {
            Ok(transform) => transform,
            Err(e) => {
                log::error!("Cannot display image {}: {}", image_id, e);
                return Err(e);
            }
        };

        let annotations = if self.store.contains_image(image_id) {
            if initial.is_some() {
                log::debug!("Image {} already in session, ignoring initial annotations", image_id);
            }
            self.store.get(image_id).to_vec()
        } else {
            let sanitized = sanitize(image_id, initial.unwrap_or_default(), &self.classes);
            self.store.set(image_id, sanitized.clone());
            sanitized
        };

        log::info!(
            "Loaded image {} ({}x{}, scale {:.3}x{:.3}) with {} annotation(s)",
            image_id,
            natural_width,
            natural_height,
            transform.scale_x,
            transform.scale_y,
            annotations.len()
        );

        self.current = Some(CurrentImage {
            id: image_id.to_string(),
            natural,
            transform,
            annotations,
        });
        self.redraw();
        Ok(())
    }

    /// Pointer pressed at a display-space position.
    pub fn pointer_down(&mut self, position: Point) -> GestureOutcome {
        if self.current.is_none() {
            log::debug!("pointer_down dropped: no image loaded");
            return GestureOutcome::Ignored;
        }
        let outcome = self.interaction.pointer_down(position);
        self.redraw_if_needed(&outcome);
        outcome
    }

    /// Pointer moved to a display-space position.
    pub fn pointer_move(&mut self, position: Point) -> GestureOutcome {
        if self.current.is_none() {
            return GestureOutcome::Ignored;
        }
        let outcome = self.interaction.pointer_move(position);
        self.redraw_if_needed(&outcome);
        outcome
    }

    /// Pointer released at a display-space position.
    pub fn pointer_up(&mut self, position: Point) -> GestureOutcome {
        let Some(transform) = self.transform() else {
            log::debug!("pointer_up dropped: no image loaded");
            return GestureOutcome::Ignored;
        };
        let outcome = self.interaction.pointer_up(position, &transform);
        self.redraw_if_needed(&outcome);
        outcome
    }

    /// Assign the pending draft to `class_label` and commit it.
    ///
    /// An unknown class rejects the label and discards the draft as if the
    /// selection had been cancelled.
    pub fn choose_label(&mut self, class_label: &str) -> Result<Annotation, EngineError> {
        let draft = self
            .interaction
            .take_draft()
            .ok_or(EngineError::NotAwaitingLabel)?;

        let result = self.commit_draft(draft, class_label);
        self.redraw();
        result
    }

    fn commit_draft(
        &mut self,
        draft: Annotation,
        class_label: &str,
    ) -> Result<Annotation, EngineError> {
        let current = self.current.as_mut().ok_or(EngineError::NoImageLoaded)?;

        let Some(class) = self.classes.get(class_label) else {
            log::warn!("Rejected unknown class '{}'; draft discarded", class_label);
            return Err(EngineError::UnknownClassLabel(class_label.to_string()));
        };

        let id = allocator::allocate(&current.id, class_label, &current.annotations)?;
        let committed = draft.commit(id, &class.name, &class.color);
        log::info!(
            "Committed {} on image {} ({} total)",
            committed.id().unwrap_or_default(),
            current.id,
            current.annotations.len() + 1
        );
        current.annotations.push(committed.clone());

        notify(&mut self.observers, &current.id, &current.annotations);
        Ok(committed)
    }

    /// Discard the pending draft. Returns whether there was one.
    pub fn cancel_label(&mut self) -> bool {
        match self.interaction.take_draft() {
            Some(_) => {
                log::debug!("Label selection cancelled; draft discarded");
                self.redraw();
                true
            }
            None => false,
        }
    }

    /// Remove an annotation by id. Other annotations keep their ids.
    pub fn delete_annotation(
        &mut self,
        image_id: &str,
        annotation_id: &str,
    ) -> Result<Annotation, EngineError> {
        let removed = match &mut self.current {
            Some(current) if current.id == image_id => {
                let index = current
                    .annotations
                    .iter()
                    .position(|a| a.id() == Some(annotation_id))
                    .ok_or_else(|| EngineError::unknown_annotation(image_id, annotation_id))?;
                let removed = current.annotations.remove(index);
                notify(&mut self.observers, image_id, &current.annotations);
                removed
            }
            _ => {
                let removed = self
                    .store
                    .remove(image_id, annotation_id)
                    .ok_or_else(|| EngineError::unknown_annotation(image_id, annotation_id))?;
                notify(&mut self.observers, image_id, self.store.get(image_id));
                removed
            }
        };

        log::info!("Deleted {} from image {}", annotation_id, image_id);
        if self.current_image() == Some(image_id) {
            self.redraw();
        }
        Ok(removed)
    }

    /// Remove every annotation of an image. Returns how many were removed.
    pub fn clear_annotations(&mut self, image_id: &str) -> Result<usize, EngineError> {
        let removed = match &mut self.current {
            Some(current) if current.id == image_id => {
                let count = current.annotations.len();
                current.annotations.clear();
                notify(&mut self.observers, image_id, &current.annotations);
                count
            }
            _ => {
                if !self.store.contains_image(image_id) {
                    return Err(EngineError::UnknownImage(image_id.to_string()));
                }
                let count = self.store.get(image_id).len();
                self.store.clear(image_id);
                notify(&mut self.observers, image_id, self.store.get(image_id));
                count
            }
        };

        log::info!("Cleared {} annotation(s) from image {}", removed, image_id);
        if self.current_image() == Some(image_id) {
            self.redraw();
        }
        Ok(removed)
    }

    /// Redraw the full canvas. Does nothing while no valid image is loaded.
    pub fn redraw(&mut self) {
        let Some(current) = &self.current else {
            log::trace!("Redraw skipped: drawing suspended");
            return;
        };
        let preview = self.interaction.preview(&current.transform);
        let frame = Frame {
            container: self.config.container_size(),
            transform: current.transform,
            annotations: &current.annotations,
            pending: self.interaction.pending(),
            preview: preview.as_ref(),
        };
        render::redraw(&mut self.surface, &frame);
    }

    fn redraw_if_needed(&mut self, outcome: &GestureOutcome) {
        if outcome.needs_redraw() {
            self.redraw();
        }
    }
}

fn notify(
    observers: &mut [Box<dyn AnnotationObserver>],
    image_id: &str,
    annotations: &[Annotation],
) {
    for observer in observers.iter_mut() {
        observer.on_annotations_changed(image_id, annotations);
    }
}

/// Make persisted annotations safe to work with.
///
/// Drafts, repeated ids and annotations of classes outside the project are
/// dropped; malformed boxes are clamped to zero area. Anything dropped here
/// is neither drawn nor considered when allocating ids.
fn sanitize(image_id: &str, annotations: Vec<Annotation>, classes: &ClassSet) -> Vec<Annotation> {
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(annotations.len());

    for mut annotation in annotations {
        let (Some(id), Some(class_label)) = (annotation.id(), annotation.class_label()) else {
            log::warn!("Dropping uncommitted annotation from image {}", image_id);
            continue;
        };
        if !seen.insert(id.to_string()) {
            log::warn!("Dropping repeated id {} on image {}", id, image_id);
            continue;
        }
        if !classes.contains(class_label) {
            log::warn!(
                "Dropping {} on image {}: unknown class '{}'",
                id,
                image_id,
                class_label
            );
            continue;
        }

        let (bbox, changed) = annotation.bbox.sanitized();
        if changed {
            log::warn!(
                "Clamped malformed box of {} on image {}; it will not be drawn",
                id,
                image_id
            );
            annotation.bbox = bbox;
        }
        result.push(annotation);
    }

    result
}
