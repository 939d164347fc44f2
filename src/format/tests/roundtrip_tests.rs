//! Save/load round trips keep every image's annotations, in order.

use crate::format::json;
use crate::format::project::{AnnotationEntry, ImageEntry, ProjectData};
use crate::geometry::BoundingBox;
use crate::model::ClassDefinition;

fn triples(data: &ProjectData, image: &str) -> Vec<(String, String, BoundingBox)> {
    data.image(image)
        .unwrap()
        .annotations
        .iter()
        .map(|a| (a.id.clone(), a.class_label.clone(), a.bbox))
        .collect()
}

fn create_project() -> ProjectData {
    let mut data = ProjectData::new("round trip");
    data.classes = vec![
        ClassDefinition::new("Dog", "#e6194b"),
        ClassDefinition::new("Cat", "#3cb44b"),
    ];

    let mut first = ImageEntry::from_url("imgs/first.jpg").with_dimensions(640, 480);
    // Out of numeric order on purpose: display order is what must survive.
    first.annotations = vec![
        AnnotationEntry::new("Dog3", "Dog", "#e6194b", BoundingBox::new(10.0, 10.0, 25.5, 30.0)),
        AnnotationEntry::new("Cat1", "Cat", "#3cb44b", BoundingBox::new(0.0, 0.0, 100.0, 100.0)),
        AnnotationEntry::new("Dog1", "Dog", "#e6194b", BoundingBox::new(300.25, 200.0, 40.0, 60.0)),
    ];
    data.images.push(first);
    data.images.push(ImageEntry::from_url("imgs/empty.jpg"));
    data
}

#[test]
fn test_bytes_round_trip() {
    let before = create_project();
    let loaded = json::from_bytes(&json::to_bytes(&before).unwrap()).unwrap();

    assert_eq!(triples(&loaded, "first"), triples(&before, "first"));
    assert!(loaded.image("empty").unwrap().annotations.is_empty());
    assert_eq!(loaded.classes, before.classes);
    assert_eq!(loaded.metadata, before.metadata);
}

#[test]
fn test_file_round_trip() {
    let path = std::env::temp_dir().join(format!("boxlab-roundtrip-{}.json", std::process::id()));
    let before = create_project();
    json::save(&before, &path).unwrap();
    let loaded = json::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded, before);
}

#[test]
fn test_load_missing_file() {
    let path = std::env::temp_dir().join("boxlab-definitely-missing.json");
    assert!(json::load(&path).is_err());
}
