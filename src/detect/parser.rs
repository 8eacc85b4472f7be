//! Free-text response parsing
//!
//! Two de-facto protocols are accepted: the structured `COMMAND:`/`BBOX:`
//! markers the prompt asks for, and a keyword scan over the raw text for
//! models that ignore the format instruction. Anything else is `Unparsed`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::history::ResponseHistory;

/// Directional keywords accepted by the loose protocol, scanned in order of
/// first occurrence in the response text
const KEYWORDS: &[&str] = &[
    "ready",
    "not visible",
    "move left",
    "move right",
    "move up",
    "move down",
    "move closer",
    "move back",
];

static BBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]*\.?[0-9]+)\s*,\s*([0-9]*\.?[0-9]+)\s*,\s*([0-9]*\.?[0-9]+)\s*,\s*([0-9]*\.?[0-9]+)")
        .expect("bbox regex is valid")
});

/// Normalized bounding box for a detected object
///
/// Coordinates in [0,1] with `x1 <= x2` and `y1 <= y2`; validated on
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    /// Build a bounding box, checking coordinate ordering and range
    #[must_use]
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Option<Self> {
        let in_range = |v: f32| (0.0..=1.0).contains(&v);
        if in_range(x1) && in_range(y1) && in_range(x2) && in_range(y2) && x1 <= x2 && y1 <= y2 {
            Some(Self { x1, y1, x2, y2 })
        } else {
            None
        }
    }

    /// All-zero sentinel meaning "no object"
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x1 == 0.0 && self.y1 == 0.0 && self.x2 == 0.0 && self.y2 == 0.0
    }
}

/// Classified vision-model response
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    /// Object centered well enough to take the photo
    Ready {
        bbox: Option<BoundingBox>,
        /// Set when the stall override promoted a repeated response
        forced: bool,
    },
    /// Object visible but off-center; `command` is the spoken direction
    Directional {
        command: String,
        bbox: Option<BoundingBox>,
    },
    /// Model reports the object is not in frame
    NotVisible,
    /// Response matched no known protocol; raw text retained
    Unparsed(String),
}

impl DetectionResult {
    /// Terminal results end the loop's interest in stall detection
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::NotVisible)
    }

    /// Normalized history key for stall detection
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Ready { .. } => "ready".to_string(),
            Self::NotVisible => "not visible".to_string(),
            Self::Directional { command, .. } => command.to_lowercase().trim().to_string(),
            Self::Unparsed(raw) => raw.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }

    /// Bounding box carried by the result, if any
    #[must_use]
    pub fn bbox(&self) -> Option<BoundingBox> {
        match self {
            Self::Ready { bbox, .. } | Self::Directional { bbox, .. } => *bbox,
            _ => None,
        }
    }
}

impl fmt::Display for DetectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready { forced: true, .. } => write!(f, "ready (forced after repetition)"),
            Self::Ready { .. } => write!(f, "ready"),
            Self::Directional { command, .. } => write!(f, "{command}"),
            Self::NotVisible => write!(f, "not visible"),
            Self::Unparsed(raw) => write!(f, "{}", raw.trim()),
        }
    }
}

/// Parse a raw model response into a classification
///
/// Marker lines win over the keyword fallback; a `bbox:` marker that does
/// not yield a well-ordered in-range box downgrades the whole response to
/// `Unparsed`.
#[must_use]
pub fn parse(response: &str) -> DetectionResult {
    let lower = response.to_lowercase();

    let bbox = match extract_bbox(&lower) {
        BboxScan::Absent => None,
        BboxScan::Valid(b) => Some(b),
        BboxScan::Empty => None,
        BboxScan::Malformed => return DetectionResult::Unparsed(response.to_string()),
    };

    if let Some(command) = extract_marker(&lower, "command:") {
        return classify(&command, bbox, response);
    }

    // Loose protocol: first recognized keyword anywhere in the text
    let earliest = KEYWORDS
        .iter()
        .filter_map(|kw| lower.find(kw).map(|pos| (pos, *kw)))
        .min_by_key(|(pos, _)| *pos);

    match earliest {
        Some((_, kw)) => classify(kw, bbox, response),
        None => DetectionResult::Unparsed(response.to_string()),
    }
}

/// Classify an extracted command string
fn classify(command: &str, bbox: Option<BoundingBox>, raw: &str) -> DetectionResult {
    let command = command.trim().trim_matches(|c: char| c == '.' || c == '\'' || c == '"');
    if command.starts_with("ready") {
        DetectionResult::Ready { bbox, forced: false }
    } else if command.starts_with("not visible") {
        DetectionResult::NotVisible
    } else if command.starts_with("move") {
        DetectionResult::Directional {
            command: command.to_string(),
            bbox,
        }
    } else {
        DetectionResult::Unparsed(raw.to_string())
    }
}

/// Extract the trailing text of a `marker:` line, if present
fn extract_marker(lower: &str, marker: &str) -> Option<String> {
    lower.lines().find_map(|line| {
        line.find(marker)
            .map(|pos| line[pos + marker.len()..].trim().to_string())
    })
}

/// Outcome of scanning for a `bbox:` marker
enum BboxScan {
    Absent,
    Valid(BoundingBox),
    /// All-zero sentinel: "no object"
    Empty,
    Malformed,
}

fn extract_bbox(lower: &str) -> BboxScan {
    let Some(tail) = extract_marker(lower, "bbox:") else {
        return BboxScan::Absent;
    };

    let Some(caps) = BBOX_RE.captures(&tail) else {
        return BboxScan::Malformed;
    };

    let mut coords = [0.0f32; 4];
    for (i, coord) in coords.iter_mut().enumerate() {
        match caps[i + 1].parse() {
            Ok(v) => *coord = v,
            Err(_) => return BboxScan::Malformed,
        }
    }

    let [x1, y1, x2, y2] = coords;
    match BoundingBox::new(x1, y1, x2, y2) {
        Some(b) if b.is_empty() => BboxScan::Empty,
        Some(b) => BboxScan::Valid(b),
        None => BboxScan::Malformed,
    }
}

/// Stateful parser: classification plus the stall override
///
/// Holds the bounded response history; when three previous non-terminal
/// classifications match the current one, the result is promoted to
/// `Ready { forced: true }` so the loop is guaranteed to terminate even
/// when the model oscillates indefinitely.
#[derive(Debug, Default)]
pub struct Parser {
    history: ResponseHistory,
}

impl Parser {
    /// Create a parser with an empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and apply the stall override
    pub fn classify(&mut self, response: &str) -> DetectionResult {
        let result = parse(response);
        let key = result.key();

        if self.history.check_stall(&key, result.is_terminal()) {
            tracing::info!(key = %key, "stall detected, forcing ready");
            return DetectionResult::Ready {
                bbox: result.bbox(),
                forced: true,
            };
        }

        result
    }

    /// Clear the history (session ended or target changed)
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
