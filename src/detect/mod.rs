//! Detection: response parsing, stall detection, and the auto-center loop
//!
//! The vision model's reply is free text whose schema is suggested by the
//! prompt, not enforced. This module turns that text into a directional
//! command, watches for the model looping on identical answers, and drives
//! the capture → query → parse → act cycle.

mod center;
mod history;
mod parser;

pub use center::{CenterLoop, PHOTO_TAKEN_FEEDBACK, TickOutcome};
pub use history::{HISTORY_WINDOW, ResponseHistory};
pub use parser::{BoundingBox, DetectionResult, Parser, parse};
