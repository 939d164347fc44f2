//! Per-class identifier allocation.
//!
//! Ids are the class name followed directly by a positive integer (`Dog1`,
//! `Dog2`, ...). A new box gets the smallest number not currently used by
//! its class on that image, so deleting `Dog2` frees `Dog2` for the next box.
//!
//! The numeric suffix is always read by splitting the id at exactly
//! `class_label.len()` bytes. Stripping trailing digits would misread ids of
//! classes whose names end in digits (`Area51` + `3` is `Area513`).

use std::collections::HashSet;

use crate::error::EngineError;
use crate::model::Annotation;

/// Numeric suffix of `id` for `class_label`, if it is a well-formed id of
/// that class.
pub fn parse_suffix(class_label: &str, id: &str) -> Option<u32> {
    let suffix = id.strip_prefix(class_label)?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u32>().ok().filter(|n| *n > 0)
}

/// Smallest positive integer missing from an ascending, deduplicated list.
fn smallest_missing(numbers: &[u32]) -> u32 {
    for (i, n) in numbers.iter().enumerate() {
        let expected = i as u32 + 1;
        if *n != expected {
            return expected;
        }
    }
    numbers.len() as u32 + 1
}

/// Allocate the next id for `class_label` among `existing` annotations of one
/// image.
///
/// Only committed annotations are considered. If the preferred number would
/// collide with an id held by a different class (possible when class names
/// end in digits), the next free number is used instead.
pub fn allocate(
    image_id: &str,
    class_label: &str,
    existing: &[Annotation],
) -> Result<String, EngineError> {
    let committed = || existing.iter().filter(|a| a.is_committed());

    let mut numbers: Vec<u32> = committed()
        .filter(|a| a.class_label() == Some(class_label))
        .filter_map(|a| a.id().and_then(|id| parse_suffix(class_label, id)))
        .collect();
    numbers.sort_unstable();
    numbers.dedup();

    let taken: HashSet<&str> = committed().filter_map(|a| a.id()).collect();

    let is_taken = |n: u32| {
        numbers.binary_search(&n).is_ok() || taken.contains(format!("{class_label}{n}").as_str())
    };
    let mut next = smallest_missing(&numbers);
    while is_taken(next) {
        next += 1;
    }

    let id = format!("{class_label}{next}");
    if existing.iter().any(|a| a.id() == Some(id.as_str())) {
        log::error!("Allocator produced duplicate id {} on image {}", id, image_id);
        return Err(EngineError::duplicate_identifier(id, image_id));
    }

    log::debug!("Allocated id {} on image {}", id, image_id);
    Ok(id)
}
