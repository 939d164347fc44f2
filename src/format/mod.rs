//! Project persistence.
//!
//! The board controller exchanges a [`ProjectData`] payload with storage:
//! class definitions plus, per image, the committed annotations in order.
//! [`json`] reads and writes it; [`AutoSaveManager`] decides when a dirty
//! session should be written back.

mod auto_save;
mod error;
pub mod json;
mod project;

#[cfg(test)]
mod tests;

pub use auto_save::AutoSaveManager;
pub use error::FormatError;
pub use project::{
    AnnotationEntry, ImageEntry, ProjectData, ProjectMetadata, image_key_from_url,
};
