//! Pointer-driven box drawing state machine.
//!
//! ```text
//! Idle --down--> Dragging --up (big enough)--> PendingLabel --label/cancel--> Idle
//!                   |  ^
//!                   +--+ move (preview only)
//!                   |
//!                   +--up (too small)--> Idle
//! ```
//!
//! Pointer positions arrive in display-space; the draft box is converted to
//! image-space when the drag ends, and the minimum-size check is done there.

use crate::geometry::{BoundingBox, Point, ScaleTransform};
use crate::model::Annotation;

/// Where the current gesture stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Pointer is held down. Both points are display-space.
    Dragging { start: Point, current: Point },
    /// A box was drawn and waits for a class to be chosen.
    PendingLabel { draft: Annotation },
}

impl InteractionState {
    /// Whether no gesture is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Whether the pointer is held down.
    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::Dragging { .. })
    }

    /// Whether a draft waits for its label.
    pub fn is_pending_label(&self) -> bool {
        matches!(self, InteractionState::PendingLabel { .. })
    }

    /// State name for log messages.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "Idle",
            InteractionState::Dragging { .. } => "Dragging",
            InteractionState::PendingLabel { .. } => "PendingLabel",
        }
    }
}

/// Result of feeding one pointer event into the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Event does not apply in the current state.
    Ignored,
    /// A drag began.
    Started,
    /// The live preview moved.
    Previewed,
    /// The drag ended with a box below the minimum size.
    Discarded,
    /// The drag produced a draft that now waits for a label.
    DraftReady(BoundingBox),
}

impl GestureOutcome {
    /// Whether the canvas must be redrawn after this outcome.
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, GestureOutcome::Ignored | GestureOutcome::Started)
    }
}

/// The box-drawing gesture tracker.
#[derive(Debug, Clone)]
pub struct BoxInteraction {
    state: InteractionState,
    min_box_size: f32,
    draft_color: String,
}

impl BoxInteraction {
    pub fn new(min_box_size: f32, draft_color: impl Into<String>) -> Self {
        Self {
            state: InteractionState::Idle,
            min_box_size,
            draft_color: draft_color.into(),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Begin a drag. Refused unless idle, so a draft awaiting its label can
    /// never be joined by a second one.
    pub fn pointer_down(&mut self, position: Point) -> GestureOutcome {
        if !self.state.is_idle() {
            log::debug!("pointer_down ignored in state {}", self.state.name());
            return GestureOutcome::Ignored;
        }
        self.state = InteractionState::Dragging {
            start: position,
            current: position,
        };
        log::trace!("Drag started at ({}, {})", position.x, position.y);
        GestureOutcome::Started
    }

    /// Move the live corner of the drag.
    pub fn pointer_move(&mut self, position: Point) -> GestureOutcome {
        match &mut self.state {
            InteractionState::Dragging { current, .. } => {
                *current = position;
                GestureOutcome::Previewed
            }
            _ => GestureOutcome::Ignored,
        }
    }

    /// Finish the drag at `position`.
    ///
    /// Boxes narrower or shorter than the minimum size (in image-space) are
    /// discarded, as are boxes with non-finite geometry. Anything else
    /// becomes the pending draft.
    pub fn pointer_up(&mut self, position: Point, transform: &ScaleTransform) -> GestureOutcome {
        let InteractionState::Dragging { start, .. } = self.state else {
            return GestureOutcome::Ignored;
        };

        let bbox = BoundingBox::from_corners(
            transform.to_image_point(start),
            transform.to_image_point(position),
        );

        let finite = [bbox.x, bbox.y, bbox.width, bbox.height]
            .iter()
            .all(|v| v.is_finite());
        let large_enough = bbox.width >= self.min_box_size && bbox.height >= self.min_box_size;
        if !(finite && large_enough) {
            log::debug!(
                "Discarding {}x{} box (minimum {})",
                bbox.width,
                bbox.height,
                self.min_box_size
            );
            self.state = InteractionState::Idle;
            return GestureOutcome::Discarded;
        }

        log::debug!(
            "Draft box ({}, {}, {}, {}) awaiting label",
            bbox.x,
            bbox.y,
            bbox.width,
            bbox.height
        );
        self.state = InteractionState::PendingLabel {
            draft: Annotation::draft(bbox, self.draft_color.clone()),
        };
        GestureOutcome::DraftReady(bbox)
    }

    /// Take the pending draft out, returning the machine to idle.
    ///
    /// Returns `None` (and leaves the state alone) if no draft is pending.
    pub fn take_draft(&mut self) -> Option<Annotation> {
        if !self.state.is_pending_label() {
            return None;
        }
        match std::mem::take(&mut self.state) {
            InteractionState::PendingLabel { draft } => Some(draft),
            _ => None,
        }
    }

    /// Abandon whatever is in progress. Returns the discarded draft, if any.
    pub fn reset(&mut self) -> Option<Annotation> {
        match std::mem::take(&mut self.state) {
            InteractionState::PendingLabel { draft } => Some(draft),
            _ => None,
        }
    }

    /// Draft waiting for its label.
    pub fn pending(&self) -> Option<&Annotation> {
        match &self.state {
            InteractionState::PendingLabel { draft } => Some(draft),
            _ => None,
        }
    }

    /// Live preview of the drag in progress, in image-space.
    pub fn preview(&self, transform: &ScaleTransform) -> Option<Annotation> {
        match self.state {
            InteractionState::Dragging { start, current } => Some(Annotation::draft(
                BoundingBox::from_corners(
                    transform.to_image_point(start),
                    transform.to_image_point(current),
                ),
                self.draft_color.clone(),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine() -> BoxInteraction {
        BoxInteraction::new(20.0, "red")
    }

    fn drag(
        m: &mut BoxInteraction,
        from: (f32, f32),
        to: (f32, f32),
        t: &ScaleTransform,
    ) -> GestureOutcome {
        m.pointer_down(Point::new(from.0, from.1));
        m.pointer_move(Point::new(to.0, to.1));
        m.pointer_up(Point::new(to.0, to.1), t)
    }

    #[test]
    fn test_full_gesture() {
        let mut m = machine();
        let t = ScaleTransform::identity();

        assert_eq!(m.pointer_down(Point::new(10.0, 10.0)), GestureOutcome::Started);
        assert!(m.state().is_dragging());
        assert_eq!(m.pointer_move(Point::new(30.0, 30.0)), GestureOutcome::Previewed);
        assert_eq!(
            m.pointer_up(Point::new(50.0, 50.0), &t),
            GestureOutcome::DraftReady(BoundingBox::new(10.0, 10.0, 40.0, 40.0))
        );
        assert!(m.state().is_pending_label());

        let draft = m.take_draft().unwrap();
        assert!(!draft.is_committed());
        assert_eq!(draft.color, "red");
        assert!(m.state().is_idle());
    }

    #[test]
    fn test_minimum_size_threshold() {
        let t = ScaleTransform::identity();

        let mut m = machine();
        assert_eq!(drag(&mut m, (0.0, 0.0), (19.0, 25.0), &t), GestureOutcome::Discarded);
        assert!(m.state().is_idle());

        let mut m = machine();
        assert!(matches!(
            drag(&mut m, (0.0, 0.0), (20.0, 20.0), &t),
            GestureOutcome::DraftReady(_)
        ));
    }

    #[test]
    fn test_threshold_applies_in_image_space() {
        // Display is half the natural size: 15 display px are 30 image px.
        let t = ScaleTransform::new(0.5, 0.5);
        let mut m = machine();
        assert_eq!(
            drag(&mut m, (0.0, 0.0), (15.0, 15.0), &t),
            GestureOutcome::DraftReady(BoundingBox::new(0.0, 0.0, 30.0, 30.0))
        );
    }

    #[test]
    fn test_non_finite_box_discarded() {
        // A zero scale maps every display point to NaN or infinity.
        let mut m = machine();
        let zero = ScaleTransform::new(0.0, 1.0);
        assert_eq!(drag(&mut m, (0.0, 10.0), (0.0, 60.0), &zero), GestureOutcome::Discarded);
        assert!(m.state().is_idle());

        let nan = ScaleTransform::new(f32::NAN, f32::NAN);
        assert_eq!(drag(&mut m, (0.0, 0.0), (100.0, 100.0), &nan), GestureOutcome::Discarded);
        assert!(m.pending().is_none());
    }

    #[test]
    fn test_reverse_drag_normalizes() {
        let t = ScaleTransform::identity();
        let mut m = machine();
        assert_eq!(
            drag(&mut m, (80.0, 90.0), (20.0, 30.0), &t),
            GestureOutcome::DraftReady(BoundingBox::new(20.0, 30.0, 60.0, 60.0))
        );
    }

    #[test]
    fn test_no_new_drag_while_pending() {
        let t = ScaleTransform::identity();
        let mut m = machine();
        drag(&mut m, (0.0, 0.0), (40.0, 40.0), &t);

        assert_eq!(m.pointer_down(Point::new(5.0, 5.0)), GestureOutcome::Ignored);
        assert_eq!(m.pointer_move(Point::new(6.0, 6.0)), GestureOutcome::Ignored);
        assert_eq!(m.pointer_up(Point::new(6.0, 6.0), &t), GestureOutcome::Ignored);
        assert!(m.state().is_pending_label());
    }

    #[test]
    fn test_events_ignored_when_idle() {
        let t = ScaleTransform::identity();
        let mut m = machine();
        assert_eq!(m.pointer_move(Point::new(1.0, 1.0)), GestureOutcome::Ignored);
        assert_eq!(m.pointer_up(Point::new(1.0, 1.0), &t), GestureOutcome::Ignored);
        assert!(m.take_draft().is_none());
    }

    #[test]
    fn test_preview_only_while_dragging() {
        let t = ScaleTransform::new(2.0, 2.0);
        let mut m = machine();
        assert!(m.preview(&t).is_none());

        m.pointer_down(Point::new(10.0, 10.0));
        m.pointer_move(Point::new(30.0, 50.0));
        let preview = m.preview(&t).unwrap();
        assert_eq!(preview.bbox, BoundingBox::new(5.0, 5.0, 10.0, 20.0));
    }

    #[test]
    fn test_reset_returns_draft() {
        let t = ScaleTransform::identity();
        let mut m = machine();
        drag(&mut m, (0.0, 0.0), (40.0, 40.0), &t);
        assert!(m.reset().is_some());
        assert!(m.state().is_idle());

        m.pointer_down(Point::new(0.0, 0.0));
        assert!(m.reset().is_none());
        assert!(m.state().is_idle());
    }
}
