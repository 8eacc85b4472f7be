//! Response parser properties over well-formed and drifting model output

use framepilot::detect::{parse, BoundingBox, DetectionResult, Parser};

mod common;

#[test]
fn test_structured_ready_with_valid_bbox() {
    let result = parse("COMMAND: ready\nBBOX: [0.2,0.1,0.8,0.9]");
    let DetectionResult::Ready { bbox: Some(bbox), forced } = result else {
        panic!("expected ready with bbox");
    };
    assert!(!forced);
    assert!(bbox.x1 <= bbox.x2);
    assert!(bbox.y1 <= bbox.y2);
}

#[test]
fn test_bbox_ordering_invariant_never_violated() {
    // A selection of malformed boxes; none may surface as a parsed box
    let cases = [
        "COMMAND: ready\nBBOX: [0.9,0.1,0.2,0.9]",
        "COMMAND: ready\nBBOX: [0.1,0.9,0.9,0.2]",
        "COMMAND: move left\nBBOX: [2.0,0.0,3.0,1.0]",
    ];
    for raw in cases {
        let result = parse(raw);
        assert_eq!(
            result,
            DetectionResult::Unparsed(raw.to_string()),
            "malformed bbox must downgrade: {raw}"
        );
        assert!(result.bbox().is_none());
    }
}

#[test]
fn test_bounding_box_constructor_rejects_bad_ordering() {
    assert!(BoundingBox::new(0.9, 0.1, 0.2, 0.9).is_none());
    assert!(BoundingBox::new(0.1, 0.9, 0.9, 0.2).is_none());
    assert!(BoundingBox::new(-0.1, 0.0, 0.5, 0.5).is_none());
    assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).is_some());
}

#[test]
fn test_not_visible_without_command_marker() {
    let result = parse("Sorry, the thing you described is not visible here.");
    assert_eq!(result, DetectionResult::NotVisible);
}

#[test]
fn test_all_directional_keywords_recognized() {
    for dir in ["left", "right", "up", "down", "closer", "back"] {
        let text = format!("move {dir}");
        let result = parse(&text);
        assert!(
            matches!(result, DetectionResult::Directional { ref command, .. } if command == &text),
            "keyword not recognized: {text}"
        );
    }
}

#[test]
fn test_stall_override_forces_ready_on_fourth_tick() {
    let mut parser = Parser::new();

    for _ in 0..3 {
        assert!(matches!(
            parser.classify("COMMAND: move up"),
            DetectionResult::Directional { .. }
        ));
    }

    let forced = parser.classify("COMMAND: move up");
    assert!(matches!(forced, DetectionResult::Ready { forced: true, .. }));
    assert_eq!(forced.to_string(), "ready (forced after repetition)");
}

#[test]
fn test_stall_override_skips_not_visible() {
    let mut parser = Parser::new();

    for _ in 0..6 {
        assert_eq!(
            parser.classify("not visible"),
            DetectionResult::NotVisible,
            "terminal classification must never be forced"
        );
    }
}

#[test]
fn test_unparsed_responses_participate_in_stall_detection() {
    let mut parser = Parser::new();

    for _ in 0..3 {
        assert!(matches!(
            parser.classify("The scene contains a desk."),
            DetectionResult::Unparsed(_)
        ));
    }

    let forced = parser.classify("The scene contains a desk.");
    assert!(matches!(forced, DetectionResult::Ready { forced: true, .. }));
}
