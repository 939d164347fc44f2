//! Tests for `ProjectData` and its entries.

use crate::format::project::{AnnotationEntry, ImageEntry, ProjectData};
use crate::format::{FormatError, json};
use crate::geometry::BoundingBox;
use crate::model::{Annotation, ClassDefinition};
use crate::store::AnnotationSetStore;

fn create_project() -> ProjectData {
    let mut data = ProjectData::new("pets");
    data.classes = vec![
        ClassDefinition::new("Dog", "#ff0000"),
        ClassDefinition::new("Cat", "#00ff00"),
    ];
    data.images.push(ImageEntry::from_url("/static/p1/a.png").with_dimensions(1800, 800));
    data.images.push(ImageEntry::from_url("/static/p1/b.png"));
    data
}

#[test]
fn test_version_parsing() {
    assert_eq!(ProjectData::parse_version("0.1.0"), Some((0, 1, 0)));
    assert_eq!(ProjectData::parse_version("10.20.30"), Some((10, 20, 30)));
    assert_eq!(ProjectData::parse_version("invalid"), None);
    assert_eq!(ProjectData::parse_version("1.2"), None);
    assert_eq!(ProjectData::parse_version("1.2.3.4"), None);
}

#[test]
fn test_version_compatibility() {
    assert!(ProjectData::is_version_compatible(ProjectData::CURRENT_VERSION));
    assert!(ProjectData::is_version_compatible("0.1.7"));
    assert!(!ProjectData::is_version_compatible("0.2.0"));
    assert!(!ProjectData::is_version_compatible("1.0.0"));

    assert!(ProjectData::is_version_readable("0.9.0"));
    assert!(!ProjectData::is_version_readable("1.0.0"));
    assert!(!ProjectData::is_version_readable("garbage"));
}

#[test]
fn test_image_entries_keyed_by_file_stem() {
    let data = create_project();
    let a = data.image("a").unwrap();
    assert_eq!(a.url.as_deref(), Some("/static/p1/a.png"));
    assert_eq!(a.natural_size().map(|s| (s.width, s.height)), Some((1800.0, 800.0)));
    assert!(data.image("b").unwrap().natural_size().is_none());
    assert!(data.image("a.png").is_none());
}

#[test]
fn test_draft_has_no_entry() {
    let draft = Annotation::draft(BoundingBox::new(0.0, 0.0, 30.0, 30.0), "red");
    assert!(AnnotationEntry::from_annotation(&draft).is_none());

    let committed = Annotation::committed("Dog1", "Dog", "#ff0000", draft.bbox);
    let entry = AnnotationEntry::from_annotation(&committed).unwrap();
    assert_eq!(entry.to_annotation(), committed);
}

#[test]
fn test_apply_store() {
    let mut data = create_project();
    let cat = BoundingBox::new(1.0, 1.0, 30.0, 30.0);
    data.images[1]
        .annotations
        .push(AnnotationEntry::new("Cat1", "Cat", "#00ff00", cat));

    let dog = |id: &str, x: f32| {
        Annotation::committed(id, "Dog", "#ff0000", BoundingBox::new(x, 0.0, 40.0, 40.0))
    };
    let mut store = AnnotationSetStore::new();
    store.set("a", vec![dog("Dog1", 0.0), dog("Dog2", 50.0)]);
    store.set("extra", Vec::new());

    data.apply_store(&store);

    let ids: Vec<&str> = data
        .image("a")
        .unwrap()
        .annotations
        .iter()
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(ids, ["Dog1", "Dog2"]);
    // Images absent from the store are left alone.
    assert_eq!(data.image("b").unwrap().annotations.len(), 1);
    assert!(data.image("extra").is_some());
    assert_eq!(data.total_annotations(), 3);
}

#[test]
fn test_payload_field_names() {
    let bbox = BoundingBox::new(1.0, 2.0, 30.0, 40.0);
    let entry = AnnotationEntry::new("Dog1", "Dog", "#ff0000", bbox);
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["id"], "Dog1");
    assert_eq!(value["class"], "Dog");
    assert_eq!(value["box"]["width"], 30.0);
}

#[test]
fn test_rejects_unreadable_version() {
    let mut data = create_project();
    data.version = "2.0.0".to_string();
    let bytes = serde_json::to_vec(&data).unwrap();
    assert!(matches!(
        json::from_bytes(&bytes),
        Err(FormatError::VersionMismatch { .. })
    ));
}

#[test]
fn test_reads_other_minor_version() {
    let mut data = create_project();
    data.version = "0.0.3".to_string();
    let bytes = serde_json::to_vec(&data).unwrap();
    assert_eq!(json::from_bytes(&bytes).unwrap().version, "0.0.3");
}

#[test]
fn test_rejects_duplicate_classes() {
    let mut data = create_project();
    data.classes.push(ClassDefinition::new("Dog", "#0000ff"));
    let bytes = serde_json::to_vec(&data).unwrap();
    assert!(matches!(json::from_bytes(&bytes), Err(FormatError::Engine(_))));
}

#[test]
fn test_rejects_duplicate_images() {
    let mut data = create_project();
    data.images.push(ImageEntry::new("a"));
    let bytes = serde_json::to_vec(&data).unwrap();
    assert!(matches!(
        json::from_bytes(&bytes),
        Err(FormatError::InvalidFormat { .. })
    ));
}

#[test]
fn test_rejects_undefined_class() {
    let mut data = create_project();
    let bbox = BoundingBox::new(0.0, 0.0, 25.0, 25.0);
    data.images[0]
        .annotations
        .push(AnnotationEntry::new("Bird1", "Bird", "#ffe119", bbox));
    let bytes = serde_json::to_vec(&data).unwrap();

    match json::from_bytes(&bytes) {
        Err(FormatError::InvalidFormat { message }) => assert!(message.contains("Bird")),
        other => panic!("expected InvalidFormat, got {other:?}"),
    }
}

#[test]
fn test_minimal_payload() {
    let json = r#"{
        "version": "0.1.0",
        "classes": [{"name": "Dog", "color": "red"}],
        "images": [{"name": "a", "annotations": [{
            "id": "Dog1",
            "class": "Dog",
            "color": "red",
            "box": {"x": 1, "y": 2, "width": 30, "height": 30}
        }]}]
    }"#;
    let data = json::from_bytes(json.as_bytes()).unwrap();
    assert_eq!(data.name, "");
    assert_eq!(data.total_annotations(), 1);
    assert_eq!(data.image("a").unwrap().to_annotations()[0].id(), Some("Dog1"));
}
