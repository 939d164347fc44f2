//! JSON encoding of [`ProjectData`].
//!
//! Reading checks the payload version: files from another major version are
//! rejected, other 0.x minor versions are read with a warning. Class
//! definitions are validated so a payload with repeated class names, or an
//! annotation of a class it does not define, never reaches the engine.

use std::path::Path;

use crate::format::error::FormatError;
use crate::format::project::ProjectData;

/// Serialize a project to pretty-printed JSON bytes.
pub fn to_bytes(data: &ProjectData) -> Result<Vec<u8>, FormatError> {
    let json = serde_json::to_string_pretty(data)?;
    log::debug!(
        "Encoded project {:?}: {} images, {} annotations",
        data.name,
        data.images.len(),
        data.total_annotations()
    );
    Ok(json.into_bytes())
}

/// Parse and validate a project from JSON bytes.
pub fn from_bytes(bytes: &[u8]) -> Result<ProjectData, FormatError> {
    let data: ProjectData = serde_json::from_slice(bytes)?;

    if !ProjectData::is_version_readable(&data.version) {
        return Err(FormatError::VersionMismatch {
            expected: ProjectData::CURRENT_VERSION.to_string(),
            found: data.version,
        });
    }

    if !ProjectData::is_version_compatible(&data.version) {
        log::warn!(
            "Project version {} may not be fully compatible with {} (0.x formats are unstable)",
            data.version,
            ProjectData::CURRENT_VERSION
        );
    }

    let classes = data.class_set()?;

    let mut seen = std::collections::HashSet::new();
    for image in &data.images {
        if !seen.insert(image.name.as_str()) {
            return Err(FormatError::invalid_format(format!(
                "image {} is listed more than once",
                image.name
            )));
        }
        if let Some(entry) = image
            .annotations
            .iter()
            .find(|a| !classes.contains(&a.class_label))
        {
            return Err(FormatError::invalid_format(format!(
                "annotation {} on image {} uses undefined class '{}'",
                entry.id, image.name, entry.class_label
            )));
        }
    }

    Ok(data)
}

/// Write a project to `path`.
pub fn save(data: &ProjectData, path: &Path) -> Result<(), FormatError> {
    let bytes = to_bytes(data)?;
    std::fs::write(path, bytes)?;
    log::info!(
        "Saved {} images with {} annotations to {:?}",
        data.images.len(),
        data.total_annotations(),
        path
    );
    Ok(())
}

/// Read a project from `path`.
pub fn load(path: &Path) -> Result<ProjectData, FormatError> {
    let bytes = std::fs::read(path)?;
    let data = from_bytes(&bytes)?;
    log::info!(
        "Loaded {} images with {} annotations from {:?} (format version {})",
        data.images.len(),
        data.total_annotations(),
        path,
        data.version
    );
    Ok(data)
}
