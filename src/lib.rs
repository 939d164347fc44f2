//! boxlab - bounding box annotation engine
//!
//! Draw axis-aligned boxes over an image scaled into a fixed canvas, label
//! them from a class set, and keep per-image annotation sets across
//! navigation. Drawing goes through the [`render::RenderSurface`] trait so
//! the whole engine runs headless.

pub mod allocator;
pub mod board;
pub mod color_utils;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod geometry;
pub mod interaction;
pub mod message;
pub mod model;
pub mod render;
pub mod store;

pub use board::{BoardController, BoardError};
pub use config::AppConfig;
pub use engine::{AnnotationEngine, AnnotationObserver};
pub use error::EngineError;
pub use geometry::{BoundingBox, Point, ScaleTransform, Size};
pub use message::Message;
pub use model::{Annotation, ClassDefinition, ClassSet};
pub use render::{RecordingSurface, RenderSurface};
