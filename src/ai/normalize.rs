//! Response normalization.

/// Strip wrapping code-fence markers from a model response.
///
/// Models frequently wrap JSON payloads in ``` or ```json fences even when
/// instructed not to. Fence-free input passes through untouched apart from
/// surrounding whitespace; this transform is pure and has no failure mode.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Opening fences may carry a language tag.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"title":"Buy milk"}"#;

    #[test]
    fn strips_json_fence() {
        let fenced = format!("```json\n{}\n```", PAYLOAD);
        assert_eq!(strip_code_fences(&fenced), PAYLOAD);
    }

    #[test]
    fn strips_bare_fence() {
        let fenced = format!("```\n{}\n```", PAYLOAD);
        assert_eq!(strip_code_fences(&fenced), PAYLOAD);
    }

    #[test]
    fn strips_single_line_fence() {
        let fenced = format!("```json {} ```", PAYLOAD);
        assert_eq!(strip_code_fences(&fenced), PAYLOAD);
    }

    #[test]
    fn fence_free_input_is_a_noop() {
        assert_eq!(strip_code_fences(PAYLOAD), PAYLOAD);
        assert_eq!(strip_code_fences(&format!("  {}\n", PAYLOAD)), PAYLOAD);
    }

    #[test]
    fn idempotent() {
        let fenced = format!("```json\n{}\n```", PAYLOAD);
        let once = strip_code_fences(&fenced);
        assert_eq!(strip_code_fences(once), once);
    }
}
