//! Project payload exchanged with persistence.
//!
//! `ProjectData` is what gets saved and loaded: the project name, its class
//! definitions, and every image with its committed annotations.
//!
//! # Versioning
//!
//! The payload uses semantic versioning (MAJOR.MINOR.PATCH). While at 0.x.x
//! the format is unstable: only files with the same minor version are
//! considered compatible, other 0.x files are read with a warning.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::geometry::{BoundingBox, Size};
use crate::model::{Annotation, ClassDefinition, ClassSet};
use crate::store::AnnotationSetStore;

/// Complete project data for save/load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Format version for compatibility checking.
    pub version: String,

    /// Project display name.
    #[serde(default)]
    pub name: String,

    /// Class definitions, in definition order.
    pub classes: Vec<ClassDefinition>,

    /// Images in navigation order.
    pub images: Vec<ImageEntry>,

    /// Creation/modification info.
    #[serde(default)]
    pub metadata: ProjectMetadata,
}

impl ProjectData {
    /// Current version of the project data format.
    pub const CURRENT_VERSION: &'static str = "0.1.0";

    /// Major version number for compatibility checking.
    pub const VERSION_MAJOR: u32 = 0;

    /// Minor version number.
    pub const VERSION_MINOR: u32 = 1;

    /// Create an empty project.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            name: name.into(),
            classes: Vec::new(),
            images: Vec::new(),
            metadata: ProjectMetadata::new(),
        }
    }

    /// Parse a version string into (major, minor, patch) components.
    pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
        let mut parts = version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((major, minor, patch))
    }

    /// Whether a file version can be read without caveats.
    ///
    /// For 0.x.x only the same minor version qualifies; from 1.0.0 on any
    /// file with the same major version does.
    pub fn is_version_compatible(file_version: &str) -> bool {
        let Some((major, minor, _)) = Self::parse_version(file_version) else {
            return false;
        };
        if Self::VERSION_MAJOR == 0 {
            major == 0 && minor == Self::VERSION_MINOR
        } else {
            major == Self::VERSION_MAJOR
        }
    }

    /// Whether a file version can be read at all (possibly with warnings).
    pub fn is_version_readable(file_version: &str) -> bool {
        Self::parse_version(file_version)
            .map(|(major, _, _)| major == Self::VERSION_MAJOR)
            .unwrap_or(false)
    }

    /// Validated class definitions.
    pub fn class_set(&self) -> Result<ClassSet, EngineError> {
        ClassSet::new(self.classes.clone())
    }

    /// Look up an image by name.
    pub fn image(&self, name: &str) -> Option<&ImageEntry> {
        self.images.iter().find(|i| i.name == name)
    }

    /// Get total annotation count across all images.
    pub fn total_annotations(&self) -> usize {
        self.images.iter().map(|i| i.annotations.len()).sum()
    }

    /// Copy the session's annotations into the payload.
    ///
    /// Images the store has no entry for keep their current annotations.
    /// Store entries for images the project does not list are appended.
    pub fn apply_store(&mut self, store: &AnnotationSetStore) {
        for (name, annotations) in store.iter() {
            let entries: Vec<AnnotationEntry> = annotations
                .iter()
                .filter_map(AnnotationEntry::from_annotation)
                .collect();

            match self.images.iter_mut().find(|i| i.name == name) {
                Some(image) => image.annotations = entries,
                None => {
                    log::warn!("Image {} is not part of project {}; appending", name, self.name);
                    let mut image = ImageEntry::new(name);
                    image.annotations = entries;
                    self.images.push(image);
                }
            }
        }
        self.metadata.touch();
    }
}

impl Default for ProjectData {
    fn default() -> Self {
        Self::new("")
    }
}

/// An image with its annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// Image key, unique within the project.
    pub name: String,

    /// Where the image can be fetched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Natural (width, height) in pixels, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<(u32, u32)>,

    /// Committed annotations in display order.
    #[serde(default)]
    pub annotations: Vec<AnnotationEntry>,
}

impl ImageEntry {
    /// Create an image entry with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            dimensions: None,
            annotations: Vec::new(),
        }
    }

    /// Create an image entry keyed by the file stem of its URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let mut entry = Self::new(image_key_from_url(&url));
        entry.url = Some(url);
        entry
    }

    /// Set the image dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Natural size, if known.
    pub fn natural_size(&self) -> Option<Size> {
        self.dimensions.map(|(w, h)| Size::new(w as f32, h as f32))
    }

    /// Annotations converted to the engine model.
    pub fn to_annotations(&self) -> Vec<Annotation> {
        self.annotations.iter().map(AnnotationEntry::to_annotation).collect()
    }
}

/// Image key for a URL: the last path segment without its final extension.
///
/// `/static/p1/cat.01.png` becomes `cat.01`; a name without an extension is
/// kept whole. Query strings and fragments are ignored.
pub fn image_key_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// A committed annotation as stored in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    /// Identifier, e.g. `Dog2`.
    pub id: String,

    /// Class name.
    #[serde(rename = "class")]
    pub class_label: String,

    /// Stroke color.
    pub color: String,

    /// Image-space geometry.
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

impl AnnotationEntry {
    pub fn new(
        id: impl Into<String>,
        class_label: impl Into<String>,
        color: impl Into<String>,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            id: id.into(),
            class_label: class_label.into(),
            color: color.into(),
            bbox,
        }
    }

    /// Convert a committed annotation; drafts have no payload form.
    pub fn from_annotation(annotation: &Annotation) -> Option<Self> {
        Some(Self {
            id: annotation.id.clone()?,
            class_label: annotation.class_label.clone()?,
            color: annotation.color.clone(),
            bbox: annotation.bbox,
        })
    }

    /// Convert to the engine model.
    pub fn to_annotation(&self) -> Annotation {
        Annotation::committed(&self.id, &self.class_label, &self.color, self.bbox)
    }
}

/// Project metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Tool that created this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Creation timestamp (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Last modified timestamp (ISO 8601).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,

    /// Extra data written by other tools, preserved as-is.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ProjectMetadata {
    /// Create new metadata stamped with the current time.
    pub fn new() -> Self {
        let now = current_timestamp();
        Self {
            created_by: Some(format!("boxlab {}", env!("CARGO_PKG_VERSION"))),
            created_at: Some(now.clone()),
            modified_at: Some(now),
            extra: HashMap::new(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.modified_at = Some(current_timestamp());
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
fn current_timestamp() -> String {
    let secs = web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_timestamp(secs)
}

fn format_timestamp(unix_secs: u64) -> String {
    let days = (unix_secs / 86_400) as i64;
    let secs_today = unix_secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        secs_today / 3600,
        (secs_today % 3600) / 60,
        secs_today % 60
    )
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
