//! Prompt construction for the vision model
//!
//! The centering prompt documents a structured reply schema
//! (`COMMAND:`/`BBOX:`), but the model is not guaranteed to honor it; the
//! parser keeps a keyword fallback for free-text replies.

/// Build the auto-centering prompt for a target description
#[must_use]
pub fn centering_prompt(target: &str) -> String {
    format!(
        r#"USER DESCRIPTION: "{target}"

You are a vision assistant. Your job is to help the user frame the object or person they described above in the camera view so that a photo can be taken. Look for anything that could plausibly match the user's description, even if it is not a perfect match. Err on the side of inclusion: if there is any object that could reasonably be what the user described, use that. Do NOT default to people unless the user described a person. Do NOT try to identify who or what it is beyond the user's description. Do NOT comment on identity. Only give spatial directions for framing the described object or person in the view.

Reply in exactly this format:
COMMAND: <one of: ready, not visible, move left, move right, move up, move down, move closer, move back>
BBOX: [x1,y1,x2,y2]

where the bounding box uses normalized coordinates in [0,1] for the best plausible match, or [0,0,0,0] if no object matches.

Rules:
- If the described object (or the best plausible match) is fully within the central fifth (the middle 20% horizontally and vertically) of the frame, the command is 'ready'.
- If it is elsewhere in the frame, give the single direction that moves it toward the central fifth.
- If it is not in the frame at all, the command is 'not visible'.
- Be practical. Cast a wide net. Do not guess identity. Do not add extra text."#
    )
}

/// Build the auxiliary description prompt used for the not-visible cross-check
#[must_use]
pub fn describe_prompt() -> &'static str {
    "Describe what you see in this image. Be concise."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centering_prompt_embeds_target() {
        let prompt = centering_prompt("red cup");
        assert!(prompt.contains("\"red cup\""));
        assert!(prompt.contains("COMMAND:"));
        assert!(prompt.contains("BBOX:"));
    }

    #[test]
    fn test_centering_prompt_lists_all_commands() {
        let prompt = centering_prompt("anything");
        for cmd in [
            "ready",
            "not visible",
            "move left",
            "move right",
            "move up",
            "move down",
            "move closer",
            "move back",
        ] {
            assert!(prompt.contains(cmd), "missing command: {cmd}");
        }
    }
}
