use serde::Serialize;

/// Axis-aligned box in page pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }
}

/// Identifies the visual text line a detection belongs to.
///
/// Engines report a block/paragraph/line hierarchy; the assembler only ever
/// compares keys for equality, so the parts stay private.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    block: u32,
    paragraph: u32,
    line: u32,
}

impl LineKey {
    pub fn new(block: u32, paragraph: u32, line: u32) -> Self {
        Self { block, paragraph, line }
    }
}

/// One text fragment exactly as the recognition engine reported it
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub text: String,
    pub bbox: BoundingBox,
    /// Engine confidence, conventionally -1..=100. Negative means "no text here".
    pub confidence: i32,
    pub key: LineKey,
}

impl RawDetection {
    pub fn new(text: impl Into<String>, bbox: BoundingBox, confidence: i32, key: LineKey) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
            key,
        }
    }
}

/// A detection that survived filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Word {
    pub text: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub conf: i32,
}

impl Word {
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub text: String,
    /// `[x_min, y_min, x_max, y_max]`
    pub bbox: [u32; 4],
    pub avg_conf: i32,
}

impl Line {
    pub fn top(&self) -> u32 {
        self.bbox[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub width: u32,
    pub height: u32,
    pub words: Vec<Word>,
    pub lines: Vec<Line>,
    /// Skew is corrected during normalization, so this is always 0.
    pub orientation_deg: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub pages: Vec<Page>,
    pub engine: String,
    pub avg_conf: f64,
}
