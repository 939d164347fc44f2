//! Class definitions a project's annotations can be labeled with.

use serde::{Deserialize, Serialize};

use crate::color_utils::class_color;
use crate::error::EngineError;

/// A class a box can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDefinition {
    /// Display name, also the prefix of annotation ids
    pub name: String,
    /// Color used for boxes of this class
    pub color: String,
}

impl ClassDefinition {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Ordered set of class definitions with unique names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ClassDefinition>", into = "Vec<ClassDefinition>")]
pub struct ClassSet {
    classes: Vec<ClassDefinition>,
}

impl ClassSet {
    /// Build a set, rejecting repeated names.
    pub fn new(classes: Vec<ClassDefinition>) -> Result<Self, EngineError> {
        let mut set = Self::default();
        for class in classes {
            set.push(class)?;
        }
        Ok(set)
    }

    /// Parse a `;`-separated list of names, coloring them by position.
    ///
    /// Names are trimmed and empty entries skipped, so `"Cat; Dog;"` yields
    /// two classes.
    pub fn from_delimited(names: &str) -> Result<Self, EngineError> {
        let mut set = Self::default();
        for (index, name) in names.split(';').enumerate() {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            set.push(ClassDefinition::new(name, class_color(index)))?;
        }
        Ok(set)
    }

    /// Append a class definition.
    pub fn push(&mut self, class: ClassDefinition) -> Result<(), EngineError> {
        if self.contains(&class.name) {
            return Err(EngineError::DuplicateClass(class.name));
        }
        self.classes.push(class);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ClassDefinition> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassDefinition> {
        self.classes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TryFrom<Vec<ClassDefinition>> for ClassSet {
    type Error = EngineError;

    fn try_from(classes: Vec<ClassDefinition>) -> Result<Self, Self::Error> {
        Self::new(classes)
    }
}

impl From<ClassSet> for Vec<ClassDefinition> {
    fn from(set: ClassSet) -> Self {
        set.classes
    }
}
