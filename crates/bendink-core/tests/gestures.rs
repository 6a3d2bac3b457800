//! End-to-end pointer gestures driven through the select tool.

use bendink_core::shapes::HandleId;
use bendink_core::{
    CloneSide, Document, Effect, Event, Key, Modifiers, PressureOutliner, Rectangle, SelectTool,
    Shape, ShapeId, ShapeStore, ShapeUtil, Status, Sticky, Target, ToolKind,
};
use kurbo::{Point, Rect};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn press(tool: &mut SelectTool, doc: &mut Document, point: Point, target: Target, modifiers: Modifiers) -> Vec<Effect> {
    tool.handle(
        doc,
        Event::PointerDown {
            point,
            target,
            modifiers,
        },
    )
}

fn drag(tool: &mut SelectTool, doc: &mut Document, point: Point, modifiers: Modifiers) -> Vec<Effect> {
    tool.handle(doc, Event::PointerMove { point, modifiers })
}

fn release(tool: &mut SelectTool, doc: &mut Document, point: Point) -> Vec<Effect> {
    tool.handle(
        doc,
        Event::PointerUp {
            point,
            modifiers: Modifiers::NONE,
        },
    )
}

/// Draw an arrow from `start` to `end` with the arrow tool.
fn draw_arrow(tool: &mut SelectTool, doc: &mut Document, start: Point, end: Point) -> ShapeId {
    tool.set_tool(ToolKind::Arrow);
    press(tool, doc, start, Target::Canvas, Modifiers::NONE);
    drag(tool, doc, end, Modifiers::NONE);
    let effects = release(tool, doc, end);
    effects
        .iter()
        .find_map(|e| match e {
            Effect::Committed(ids) => ids.first().copied(),
            _ => None,
        })
        .expect("arrow committed")
}

fn page_bend_handle(doc: &Document, id: ShapeId) -> Point {
    let arrow = doc.shape(id).and_then(Shape::as_arrow).expect("arrow");
    arrow.point + arrow.bend_handle().to_vec2()
}

#[test]
fn test_draw_then_bend_arrow() {
    init_logging();
    let mut doc = Document::new();
    let mut tool = SelectTool::default();

    let id = draw_arrow(&mut tool, &mut doc, Point::ZERO, Point::new(200.0, 0.0));
    assert_eq!(tool.status(), Status::Idle);
    assert_eq!(tool.tool(), ToolKind::Select);
    assert_eq!(page_bend_handle(&doc, id), Point::new(100.0, 0.0));

    let handle = Target::Handle(id, HandleId::Bend);
    press(&mut tool, &mut doc, Point::new(100.0, 0.0), handle, Modifiers::NONE);
    drag(&mut tool, &mut doc, Point::new(100.0, -50.0), Modifiers::NONE);
    assert_eq!(tool.status(), Status::TranslatingHandle);
    let effects = release(&mut tool, &mut doc, Point::new(100.0, -50.0));
    assert!(effects.contains(&Effect::Committed(vec![id])));

    let arrow = doc.shape(id).and_then(Shape::as_arrow).expect("arrow");
    assert!((arrow.bend() - 0.5).abs() < 1e-9);
    assert!(!arrow.is_straight());
    let circle = arrow.arc().expect("bent arrow has an arc");
    assert!((circle.radius - 125.0).abs() < 1e-6);
    assert_eq!(arrow.point, Point::new(0.0, -50.0));
    assert_eq!(page_bend_handle(&doc, id), Point::new(100.0, -50.0));
}

#[test]
fn test_escape_restores_bend() {
    init_logging();
    let mut doc = Document::new();
    let mut tool = SelectTool::default();
    let id = draw_arrow(&mut tool, &mut doc, Point::ZERO, Point::new(200.0, 0.0));
    let before = doc.shape(id).map(Shape::version);

    let handle = Target::Handle(id, HandleId::Bend);
    press(&mut tool, &mut doc, Point::new(100.0, 0.0), handle, Modifiers::NONE);
    drag(&mut tool, &mut doc, Point::new(100.0, 60.0), Modifiers::NONE);
    let moved = doc.shape(id).and_then(Shape::as_arrow).map(|a| a.bend());
    assert_ne!(moved, Some(0.0));

    let effects = tool.handle(
        &mut doc,
        Event::KeyDown {
            key: Key::from_name("Escape"),
            modifiers: Modifiers::NONE,
        },
    );
    assert!(effects.contains(&Effect::Cancelled));
    assert_eq!(tool.status(), Status::Idle);
    assert_eq!(doc.shape(id).map(Shape::version), before);
    assert_eq!(page_bend_handle(&doc, id), Point::new(100.0, 0.0));
}

#[test]
fn test_shaft_path_is_cached_per_version() {
    init_logging();
    let mut doc = Document::new();
    let mut tool = SelectTool::default();
    let id = draw_arrow(&mut tool, &mut doc, Point::new(10.0, 10.0), Point::new(300.0, 120.0));

    let arrow = doc.shape(id).and_then(Shape::as_arrow).expect("arrow").clone();
    let first = doc.cache().shaft_path(&arrow, &PressureOutliner);
    let second = doc.cache().shaft_path(&arrow, &PressureOutliner);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn test_alt_drag_leaves_original() {
    init_logging();
    let mut doc = Document::new();
    let rect = Rectangle::new(Point::new(0.0, 0.0), 50.0, 50.0);
    let id = rect.id();
    doc.add(rect.into());
    doc.set_selected(vec![id]);

    let mut tool = SelectTool::default();
    press(&mut tool, &mut doc, Point::new(25.0, 25.0), Target::Shape(id), Modifiers::alt());
    drag(&mut tool, &mut doc, Point::new(25.0, 125.0), Modifiers::alt());
    assert_eq!(tool.status(), Status::TranslatingClone);
    release(&mut tool, &mut doc, Point::new(25.0, 125.0));

    assert_eq!(doc.len(), 2);
    assert_eq!(doc.bounds(id), Some(Rect::new(0.0, 0.0, 50.0, 50.0)));
    let copy = doc.selected_ids()[0];
    assert_ne!(copy, id);
    assert_eq!(doc.bounds(copy), Some(Rect::new(0.0, 100.0, 50.0, 150.0)));
}

#[test]
fn test_clone_paint_stamps_each_cell_once() {
    init_logging();
    let mut doc = Document::new();
    let rect = Rectangle::new(Point::ZERO, 40.0, 40.0);
    let id = rect.id();
    doc.add(rect.into());
    doc.set_selected(vec![id]);

    let paint = Modifiers {
        alt: true,
        shift: true,
        ..Modifiers::NONE
    };
    let mut tool = SelectTool::default();
    let effects = press(&mut tool, &mut doc, Point::new(100.0, 20.0), Target::Canvas, paint);
    assert_eq!(tool.status(), Status::ClonePainting);
    assert!(effects.iter().any(|e| matches!(e, Effect::Duplicated(ids) if ids.len() == 1)));

    drag(&mut tool, &mut doc, Point::new(164.0, 20.0), paint);
    drag(&mut tool, &mut doc, Point::new(100.0, 20.0), paint);
    release(&mut tool, &mut doc, Point::new(100.0, 20.0));

    assert_eq!(tool.status(), Status::Idle);
    assert_eq!(doc.len(), 3);
}

#[test]
fn test_clone_paint_cancel_removes_stamps() {
    init_logging();
    let mut doc = Document::new();
    let rect = Rectangle::new(Point::ZERO, 40.0, 40.0);
    let id = rect.id();
    doc.add(rect.into());
    doc.set_selected(vec![id]);

    let paint = Modifiers {
        alt: true,
        shift: true,
        ..Modifiers::NONE
    };
    let mut tool = SelectTool::default();
    press(&mut tool, &mut doc, Point::new(100.0, 20.0), Target::Canvas, paint);
    drag(&mut tool, &mut doc, Point::new(20.0, 100.0), paint);
    assert!(doc.len() > 1);

    tool.handle(&mut doc, Event::Cancel);
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.selected_ids(), vec![id]);
}

#[test]
fn test_shift_brush_adds_to_selection() {
    init_logging();
    let mut doc = Document::new();
    let a = Rectangle::new(Point::ZERO, 10.0, 10.0);
    let b = Rectangle::new(Point::new(100.0, 100.0), 10.0, 10.0);
    let (a_id, b_id) = (a.id(), b.id());
    doc.add(a.into());
    doc.add(b.into());
    doc.set_selected(vec![a_id]);

    let mut tool = SelectTool::default();
    press(&mut tool, &mut doc, Point::new(90.0, 90.0), Target::Canvas, Modifiers::shift());
    let effects = drag(&mut tool, &mut doc, Point::new(120.0, 120.0), Modifiers::shift());
    assert_eq!(tool.status(), Status::Brushing);
    assert!(effects.contains(&Effect::SelectionChanged(vec![a_id, b_id])));
    release(&mut tool, &mut doc, Point::new(120.0, 120.0));
    assert_eq!(doc.selected_ids(), vec![a_id, b_id]);
}

#[test]
fn test_sticky_clone_button_blank_copy() {
    init_logging();
    let mut doc = Document::new();
    let sticky = Sticky::new(Point::ZERO, "agenda");
    let id = sticky.id();
    doc.add(sticky.into());

    let mut tool = SelectTool::default();
    let target = Target::Clone(id, CloneSide::Bottom);
    press(&mut tool, &mut doc, Point::new(100.0, 216.0), target, Modifiers::NONE);
    release(&mut tool, &mut doc, Point::new(100.0, 216.0));

    assert_eq!(doc.len(), 2);
    let clone_id = doc.selected_ids()[0];
    match doc.shape(clone_id) {
        Some(Shape::Sticky(clone)) => {
            assert_eq!(clone.text(), "");
            assert_eq!(clone.position, Point::new(0.0, 232.0));
        }
        other => panic!("expected a sticky clone, got {other:?}"),
    }
}

#[test]
fn test_document_roundtrip_after_gesture() {
    init_logging();
    let mut doc = Document::new();
    let mut tool = SelectTool::default();
    let id = draw_arrow(&mut tool, &mut doc, Point::new(5.0, 5.0), Point::new(80.0, 45.0));

    let json = doc.to_json().expect("serialize");
    let restored = Document::from_json(&json).expect("deserialize");
    assert_eq!(restored.len(), 1);
    assert_eq!(restored.bounds(id), doc.bounds(id));
    assert_eq!(restored.selected_ids(), vec![id]);
}
