use std::collections::HashMap;

use crate::models::{BoundingBox, LineKey, Line, RawDetection, Word};

/// Words and lines recovered from one page's detections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    pub words: Vec<Word>,
    pub lines: Vec<Line>,
}

/// Keep a detection only if it carries text and a non-negative confidence.
/// Returns the trimmed text of surviving detections.
fn accepted_text(detection: &RawDetection) -> Option<&str> {
    let text = detection.text.trim();
    if text.is_empty() || detection.confidence < 0 {
        None
    } else {
        Some(text)
    }
}

/// Filter detections into words, in detection order
pub fn extract_words(detections: &[RawDetection]) -> Vec<Word> {
    detections
        .iter()
        .filter_map(|d| {
            accepted_text(d).map(|text| Word {
                text: text.to_string(),
                x: d.bbox.left,
                y: d.bbox.top,
                w: d.bbox.width,
                h: d.bbox.height,
                conf: d.confidence,
            })
        })
        .collect()
}

struct LineGroup {
    texts: Vec<String>,
    boxes: Vec<BoundingBox>,
    confidences: Vec<i32>,
}

/// Group accepted detections into lines by their line key.
///
/// Groups are created in order of first appearance and the result is stably
/// sorted by top edge, so lines starting at the same height keep that order.
pub fn extract_lines(detections: &[RawDetection]) -> Vec<Line> {
    let mut order: Vec<LineKey> = Vec::new();
    let mut groups: HashMap<LineKey, LineGroup> = HashMap::new();

    for detection in detections {
        let Some(text) = accepted_text(detection) else {
            continue;
        };

        let group = groups.entry(detection.key).or_insert_with(|| {
            order.push(detection.key);
            LineGroup {
                texts: Vec::new(),
                boxes: Vec::new(),
                confidences: Vec::new(),
            }
        });
        group.texts.push(text.to_string());
        group.boxes.push(detection.bbox);
        group.confidences.push(detection.confidence);
    }

    let mut lines: Vec<Line> = order
        .iter()
        .filter_map(|key| groups.remove(key))
        .filter_map(build_line)
        .collect();

    lines.sort_by_key(|line| line.top());
    lines
}

fn build_line(group: LineGroup) -> Option<Line> {
    if group.texts.is_empty() {
        return None;
    }

    let x_min = group.boxes.iter().map(|b| b.left).min()?;
    let y_min = group.boxes.iter().map(|b| b.top).min()?;
    let x_max = group.boxes.iter().map(|b| b.right()).max()?;
    let y_max = group.boxes.iter().map(|b| b.bottom()).max()?;

    // Integer mean truncated toward zero; members are all >= 0
    let total: i64 = group.confidences.iter().map(|&c| c as i64).sum();
    let avg_conf = (total / group.confidences.len() as i64) as i32;

    Some(Line {
        text: group.texts.join(" "),
        bbox: [x_min, y_min, x_max, y_max],
        avg_conf,
    })
}

/// Turn one page's raw detections into words and top-to-bottom lines
pub fn assemble(detections: &[RawDetection]) -> Assembly {
    let assembly = Assembly {
        words: extract_words(detections),
        lines: extract_lines(detections),
    };
    tracing::debug!(
        detections = detections.len(),
        words = assembly.words.len(),
        lines = assembly.lines.len(),
        "assembled page text"
    );
    assembly
}
