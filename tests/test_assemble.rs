//! Integration tests for grouping raw detections into words and lines.

mod common;

use receiptscan::assemble::{assemble, extract_lines, extract_words};

use common::*;

#[test]
fn test_grocery_store_scenario() {
    let assembly = assemble(&grocery_store_detections());

    assert_eq!(assembly.words.len(), 2);
    assert_eq!(assembly.words[0].text, "GROCERY");
    assert_eq!(assembly.words[1].text, "STORE");

    assert_eq!(assembly.lines.len(), 1);
    let line = &assembly.lines[0];
    assert_eq!(line.text, "GROCERY STORE");
    assert_eq!(line.bbox, [0, 0, 135, 22]);
    assert_eq!(line.avg_conf, 90);
}

#[test]
fn test_empty_input_yields_nothing() {
    let assembly = assemble(&[]);
    assert!(assembly.words.is_empty());
    assert!(assembly.lines.is_empty());
}

#[test]
fn test_words_are_trimmed_and_filtered() {
    let detections = vec![
        det("  TOTAL ", 10, 100, 50, 18, 87, (1, 1, 1)),
        det("   ", 70, 100, 10, 18, 95, (1, 1, 1)),
        det("$9.44", 80, 100, 45, 18, -1, (1, 1, 1)),
        det("TAX", 10, 80, 30, 18, 0, (1, 1, 2)),
    ];

    let words = extract_words(&detections);
    let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
    assert_eq!(texts, vec!["TOTAL", "TAX"]);

    // Zero confidence is a valid word; geometry passes through untouched
    assert_eq!(words[1].conf, 0);
    assert_eq!((words[0].x, words[0].y, words[0].w, words[0].h), (10, 100, 50, 18));

    for word in &words {
        assert!(!word.text.trim().is_empty());
        assert!(word.conf >= 0);
    }
}

#[test]
fn test_rejected_detections_do_not_shape_lines() {
    // The rejected fragment sits far to the right; it must not widen the box
    let detections = vec![
        det("MILK", 10, 40, 40, 16, 80, (1, 1, 3)),
        det("ghost", 500, 0, 90, 90, -1, (1, 1, 3)),
        det("$3.50", 200, 42, 50, 16, 71, (1, 1, 3)),
    ];

    let lines = extract_lines(&detections);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "MILK $3.50");
    assert_eq!(lines[0].bbox, [10, 40, 250, 58]);
    // (80 + 71) / 2 = 75.5, truncated
    assert_eq!(lines[0].avg_conf, 75);
}

#[test]
fn test_group_of_only_rejected_detections_produces_no_line() {
    let detections = vec![
        det("", 0, 0, 0, 0, -1, (1, 1, 1)),
        det("  ", 5, 5, 5, 5, 50, (1, 1, 1)),
        det("BREAD", 10, 60, 50, 16, 93, (1, 2, 1)),
    ];

    let lines = extract_lines(&detections);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "BREAD");
}

#[test]
fn test_lines_sorted_top_to_bottom() {
    let detections = vec![
        det("TOTAL", 10, 300, 50, 18, 90, (1, 1, 4)),
        det("BANANAS", 10, 120, 70, 18, 90, (1, 1, 2)),
        det("$2.99", 200, 121, 45, 18, 85, (1, 1, 2)),
        det("GROCERY", 10, 20, 70, 18, 92, (1, 1, 1)),
        det("MILK", 10, 200, 40, 18, 88, (1, 1, 3)),
    ];

    let lines = extract_lines(&detections);
    let tops: Vec<u32> = lines.iter().map(|l| l.top()).collect();
    assert_eq!(tops, vec![20, 120, 200, 300]);
    assert!(tops.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(lines[1].text, "BANANAS $2.99");
}

#[test]
fn test_equal_tops_keep_discovery_order() {
    // Two columns on the same baseline: left block is seen first
    let detections = vec![
        det("SUBTOTAL", 10, 50, 80, 18, 90, (2, 1, 1)),
        det("$8.74", 300, 50, 50, 18, 90, (3, 1, 1)),
        det("Invoice", 10, 10, 60, 18, 90, (1, 1, 1)),
    ];

    for _ in 0..5 {
        let lines = extract_lines(&detections);
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Invoice", "SUBTOTAL", "$8.74"]);
    }
}

#[test]
fn test_words_within_a_line_keep_detection_order() {
    // Detection order wins over x position when concatenating
    let detections = vec![
        det("B", 100, 0, 10, 10, 60, (1, 1, 1)),
        det("A", 0, 0, 10, 10, 70, (1, 1, 1)),
    ];

    let lines = extract_lines(&detections);
    assert_eq!(lines[0].text, "B A");
    assert_eq!(lines[0].bbox, [0, 0, 110, 10]);
}

#[test]
fn test_line_box_is_tightest_union() {
    let detections = vec![
        det("a", 30, 12, 10, 20, 50, (1, 1, 1)),
        det("b", 5, 15, 10, 30, 51, (1, 1, 1)),
        det("c", 60, 10, 25, 8, 52, (1, 1, 1)),
    ];

    let assembly = assemble(&detections);
    let line = &assembly.lines[0];

    let words = &assembly.words;
    let x0 = words.iter().map(|w| w.x).min().unwrap();
    let y0 = words.iter().map(|w| w.y).min().unwrap();
    let x1 = words.iter().map(|w| w.x + w.w).max().unwrap();
    let y1 = words.iter().map(|w| w.y + w.h).max().unwrap();
    assert_eq!(line.bbox, [x0, y0, x1, y1]);
    assert_eq!(line.bbox, [5, 10, 85, 45]);

    let mean = words.iter().map(|w| w.conf).sum::<i32>() / words.len() as i32;
    assert_eq!(line.avg_conf, mean);
}

#[test]
fn test_oversized_engine_box_saturates_at_page_limit() {
    let detections = vec![
        det("TOTAL", 10, 40, 50, 12, 90, (1, 1, 1)),
        det("12.99", u32::MAX - 5, 41, 1_000, u32::MAX, 85, (1, 1, 1)),
    ];

    let assembly = assemble(&detections);
    assert_eq!(assembly.lines.len(), 1);
    assert_eq!(assembly.lines[0].bbox, [10, 40, u32::MAX, u32::MAX]);
    assert_eq!(assembly.words[1].bbox().right(), u32::MAX);
}
