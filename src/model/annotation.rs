//! Labeled bounding-box annotation.

use serde::{Deserialize, Serialize};

use crate::geometry::BoundingBox;

/// A box on an image, optionally labeled with a class and identifier.
///
/// Field names on the wire follow the persistence payload: `id`, `class`,
/// `color` and `box`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Identifier such as `Dog2`; `None` while the box is a draft.
    pub id: Option<String>,
    /// Class name; `None` while the box is a draft.
    #[serde(rename = "class")]
    pub class_label: Option<String>,
    /// Stroke color used to render the box.
    pub color: String,
    /// Geometry in image-space.
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl Annotation {
    /// Create an uncommitted draft awaiting a label.
    pub fn draft(bbox: BoundingBox, color: impl Into<String>) -> Self {
        Self {
            id: None,
            class_label: None,
            color: color.into(),
            bbox,
        }
    }

    /// Create a committed annotation.
    pub fn committed(
        id: impl Into<String>,
        class_label: impl Into<String>,
        color: impl Into<String>,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            id: Some(id.into()),
            class_label: Some(class_label.into()),
            color: color.into(),
            bbox,
        }
    }

    /// Committed iff both the id and the class label are assigned.
    pub fn is_committed(&self) -> bool {
        self.id.is_some() && self.class_label.is_some()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn class_label(&self) -> Option<&str> {
        self.class_label.as_deref()
    }

    /// Turn a draft into a committed annotation.
    pub fn commit(mut self, id: String, class_label: &str, color: &str) -> Self {
        self.id = Some(id);
        self.class_label = Some(class_label.to_string());
        self.color = color.to_string();
        self
    }
}
