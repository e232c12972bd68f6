use regex::Regex;
use std::sync::OnceLock;

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\[(\d+)\]\s?(.*)$").expect("valid numbered-line pattern"))
}

/// Parse the bracket-numbered fulltext blob into an index-addressable
/// sentence list. Lines look like `[<index>] <content>`; anything else is
/// ignored. Missing indices are permitted and stay `None`.
pub fn parse_numbered_text(blob: &str) -> Vec<Option<String>> {
    let mut sentences: Vec<Option<String>> = Vec::new();

    for line in blob.lines() {
        let Some(captures) = line_pattern().captures(line.trim_end()) else {
            continue;
        };
        let Ok(index) = captures[1].parse::<usize>() else {
            continue;
        };

        if index >= sentences.len() {
            sentences.resize(index + 1, None);
        }
        sentences[index] = Some(captures[2].to_string());
    }

    sentences
}

/// Look up a sentence by index, trimmed for matching against coordinate
/// record text.
pub fn sentence_at(sentences: &[Option<String>], index: usize) -> Option<&str> {
    sentences.get(index)?.as_deref().map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_lines() {
        let parsed = parse_numbered_text("[0] First sentence.\n[1] Second sentence.");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].as_deref(), Some("First sentence."));
        assert_eq!(parsed[1].as_deref(), Some("Second sentence."));
    }

    #[test]
    fn test_holes_stay_absent() {
        let parsed = parse_numbered_text("[0] First sentence.\n[2] Third sentence.");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].as_deref(), Some("First sentence."));
        assert_eq!(parsed[1], None);
        assert_eq!(parsed[2].as_deref(), Some("Third sentence."));
    }

    #[test]
    fn test_unnumbered_lines_ignored() {
        let parsed = parse_numbered_text("Title of the paper\n\n[0] Abstract text.\nFigure 1");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].as_deref(), Some("Abstract text."));
    }

    #[test]
    fn test_out_of_order_indices() {
        let parsed = parse_numbered_text("[3] Late.\n[1] Early.");
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0], None);
        assert_eq!(parsed[1].as_deref(), Some("Early."));
        assert_eq!(parsed[2], None);
        assert_eq!(parsed[3].as_deref(), Some("Late."));
    }

    #[test]
    fn test_empty_blob() {
        assert!(parse_numbered_text("").is_empty());
    }

    #[test]
    fn test_sentence_at_trims() {
        let parsed = parse_numbered_text("[0] Padded sentence.  ");
        assert_eq!(sentence_at(&parsed, 0), Some("Padded sentence."));
        assert_eq!(sentence_at(&parsed, 1), None);
    }
}
