//! Board input messages.
//!
//! Every collaborator event reaching the board is a [`Message`], processed
//! in order by [`crate::board::BoardController::update`]. Messages are serde
//! types so a session can be recorded and replayed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    // Canvas pointer, display-space coordinates
    /// Pointer pressed on the canvas
    PointerDown { x: f32, y: f32 },
    /// Pointer moved over the canvas
    PointerMove { x: f32, y: f32 },
    /// Pointer released on the canvas
    PointerUp { x: f32, y: f32 },

    // Class popup
    /// A class was picked for the pending box
    LabelChosen { class: String },
    /// The popup was dismissed without a choice
    LabelCancelled,

    // Annotation list
    /// Delete one annotation of the current image
    DeleteAnnotation { id: String },
    /// Remove every annotation of the current image
    ClearAnnotations,

    // Navigation
    NextImage,
    PrevImage,
    /// Jump to an image by name
    SelectImage { name: String },

    /// Write the project now
    Save,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_stream() {
        let json = r#"[
            {"type": "pointer_down", "x": 10, "y": 10},
            {"type": "pointer_up", "x": 50, "y": 50},
            {"type": "label_chosen", "class": "Dog"},
            {"type": "select_image", "name": "b"},
            {"type": "next_image"},
            {"type": "save"}
        ]"#;
        let messages: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0], Message::PointerDown { x: 10.0, y: 10.0 });
        assert_eq!(
            messages[2],
            Message::LabelChosen {
                class: "Dog".to_string()
            }
        );
        assert_eq!(messages[4], Message::NextImage);
        assert_eq!(messages[5], Message::Save);
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<Message>(r#"{"type": "undo"}"#).is_err());
    }
}
