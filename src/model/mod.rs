//! Data models for annotations and their classes.

mod annotation;
mod category;

pub use annotation::Annotation;
pub use category::{ClassDefinition, ClassSet};
