//! End-to-end annotation sessions driven through the board controller.

use boxlab::format::{AutoSaveManager, ImageEntry, ProjectData, json};
use boxlab::render::{DrawCommand, RecordingSurface};
use boxlab::{AppConfig, BoardController, BoundingBox, ClassSet, Message};

const EPSILON: f32 = 0.001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn project() -> ProjectData {
    let classes = ClassSet::from_delimited("Cat; Dog").unwrap();
    let mut data = ProjectData::new("session");
    data.classes = classes.iter().cloned().collect();
    data.images.push(ImageEntry::from_url("/static/p1/big.png").with_dimensions(1800, 800));
    data.images.push(ImageEntry::from_url("/static/p1/small.jpg").with_dimensions(450, 200));
    data
}

fn board() -> BoardController<RecordingSurface> {
    let config = AppConfig::default();
    let mut board = BoardController::new(&config, project(), RecordingSurface::new())
        .unwrap()
        .with_auto_save(AutoSaveManager::disabled());
    board.open(0).unwrap();
    board
}

fn draw_box(
    board: &mut BoardController<RecordingSurface>,
    from: (f32, f32),
    to: (f32, f32),
    class: &str,
) {
    let messages = [
        Message::PointerDown { x: from.0, y: from.1 },
        Message::PointerMove { x: to.0, y: to.1 },
        Message::PointerUp { x: to.0, y: to.1 },
        Message::LabelChosen {
            class: class.to_string(),
        },
    ];
    for message in messages {
        board.update(message).unwrap();
    }
}

#[test]
fn boxes_are_stored_in_image_space() {
    let mut board = board();
    assert_eq!(board.current_image(), Some("big"));

    draw_box(&mut board, (10.0, 10.0), (60.0, 60.0), "Dog");

    let annotation = &board.engine().annotations()[0];
    assert_eq!(annotation.id(), Some("Dog1"));
    assert_eq!(annotation.bbox, BoundingBox::new(20.0, 20.0, 100.0, 100.0));

    let dog_color = board.engine().classes().get("Dog").unwrap().color.clone();
    let (rect, color) = board.engine().surface().rects().next().unwrap();
    assert!(approx_eq(rect.x, 10.0) && approx_eq(rect.width, 50.0));
    assert_eq!(color, dog_color);
    assert_eq!(board.engine().surface().labels().collect::<Vec<_>>(), ["Dog1"]);
}

#[test]
fn draft_is_drawn_last_until_labeled() {
    let mut board = board();
    draw_box(&mut board, (10.0, 10.0), (60.0, 60.0), "Cat");

    board.update(Message::PointerDown { x: 100.0, y: 100.0 }).unwrap();
    board.update(Message::PointerUp { x: 200.0, y: 150.0 }).unwrap();

    let commands = board.engine().surface().commands();
    assert!(matches!(commands.first(), Some(DrawCommand::Clear { .. })));
    assert!(matches!(
        commands.last(),
        Some(DrawCommand::StrokeRect { color, .. }) if color == "red"
    ));

    let anchor = board.engine().label_prompt_anchor().unwrap();
    assert!(approx_eq(anchor.x, 200.0) && approx_eq(anchor.y, 150.0));

    board.update(Message::LabelCancelled).unwrap();
    assert_eq!(board.engine().surface().rects().count(), 1);
    assert_eq!(board.to_payload().total_annotations(), 1);
}

#[test]
fn identifiers_fill_gaps_per_class() {
    let mut board = board();
    for i in 0..3 {
        let x = 10.0 + 40.0 * i as f32;
        draw_box(&mut board, (x, 10.0), (x + 30.0, 40.0), "Dog");
    }
    draw_box(&mut board, (10.0, 100.0), (40.0, 130.0), "Cat");

    board
        .update(Message::DeleteAnnotation {
            id: "Dog2".to_string(),
        })
        .unwrap();
    draw_box(&mut board, (10.0, 200.0), (40.0, 230.0), "Dog");

    let ids: Vec<_> = board.engine().annotations().iter().filter_map(|a| a.id()).collect();
    assert_eq!(ids, ["Dog1", "Dog3", "Cat1", "Dog2"]);
}

#[test]
fn small_drags_are_discarded() {
    let mut board = board();
    board.update(Message::NextImage).unwrap();
    assert_eq!(board.current_image(), Some("small"));

    // Display is twice the natural size: 38 display px are 19 image px.
    board.update(Message::PointerDown { x: 0.0, y: 0.0 }).unwrap();
    board.update(Message::PointerUp { x: 38.0, y: 50.0 }).unwrap();
    assert!(board.engine().state().is_idle());

    board.update(Message::PointerDown { x: 0.0, y: 0.0 }).unwrap();
    board.update(Message::PointerUp { x: 40.0, y: 40.0 }).unwrap();
    assert!(board.engine().state().is_pending_label());
}

#[test]
fn session_survives_navigation_and_save() {
    let path = std::env::temp_dir().join(format!("boxlab-session-{}.json", std::process::id()));

    let mut board = board().with_save_path(path.clone());
    draw_box(&mut board, (10.0, 10.0), (60.0, 60.0), "Dog");

    // Leave a draft pending on the way out.
    board.update(Message::PointerDown { x: 100.0, y: 100.0 }).unwrap();
    board.update(Message::PointerUp { x: 200.0, y: 200.0 }).unwrap();
    board.update(Message::NextImage).unwrap();
    draw_box(&mut board, (10.0, 10.0), (60.0, 60.0), "Cat");
    board.update(Message::NextImage).unwrap();
    assert_eq!(board.current_image(), Some("big"));
    assert_eq!(board.engine().annotations().len(), 1);

    board.update(Message::Save).unwrap();
    assert!(!board.has_unsaved_changes());

    let saved = json::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let big = saved.image("big").unwrap();
    assert_eq!(big.annotations.len(), 1);
    assert_eq!(big.annotations[0].id, "Dog1");
    assert_eq!(big.annotations[0].bbox, BoundingBox::new(20.0, 20.0, 100.0, 100.0));

    let small = saved.image("small").unwrap();
    assert_eq!(small.annotations[0].id, "Cat1");
    assert_eq!(small.annotations[0].bbox, BoundingBox::new(5.0, 5.0, 25.0, 25.0));
}

#[test]
fn recorded_stream_replays() {
    let events = r#"[
        {"type": "pointer_down", "x": 10, "y": 10},
        {"type": "pointer_move", "x": 30, "y": 30},
        {"type": "pointer_up", "x": 60, "y": 60},
        {"type": "label_chosen", "class": "Cat"},
        {"type": "select_image", "name": "small"},
        {"type": "clear_annotations"},
        {"type": "prev_image"}
    ]"#;
    let messages: Vec<Message> = serde_json::from_str(events).unwrap();

    let mut board = board();
    for message in messages {
        board.update(message).unwrap();
    }

    assert_eq!(board.current_image(), Some("big"));
    let payload = board.to_payload();
    assert_eq!(payload.image("big").unwrap().annotations[0].id, "Cat1");
    assert!(payload.image("small").unwrap().annotations.is_empty());
}
