use locpatch_types::rules::{MatchStrategy, Rule};

/// Result of running one rule against some content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Number of non-overlapping matches replaced.
    pub occurrences: u64,
    /// Content after replacement; `None` when nothing matched.
    pub output: Option<String>,
}

impl Substitution {
    pub fn matched(&self) -> bool {
        self.occurrences > 0
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offsets of every match of `rule.find` in `content`, leftmost-first and non-overlapping.
///
/// Bare identifiers only match where neither neighbour is an ASCII letter, digit or
/// underscore (regex `\b` semantics). An empty `find` never matches.
pub fn find_occurrences(content: &str, rule: &Rule) -> Vec<usize> {
    let find = rule.find.as_str();
    if find.is_empty() {
        return Vec::new();
    }

    let hits = content.match_indices(find).map(|(i, _)| i);
    match rule.strategy {
        MatchStrategy::Literal => hits.collect(),
        MatchStrategy::BareIdentifier => {
            let bytes = content.as_bytes();
            hits.filter(|&start| {
                let end = start + find.len();
                let before_ok = start == 0 || !is_word_byte(bytes[start - 1]);
                let after_ok = end == bytes.len() || !is_word_byte(bytes[end]);
                before_ok && after_ok
            })
            .collect()
        }
    }
}

/// Replace every match of `rule` in `content`.
pub fn substitute(content: &str, rule: &Rule) -> Substitution {
    let starts = find_occurrences(content, rule);
    if starts.is_empty() {
        return Substitution {
            occurrences: 0,
            output: None,
        };
    }

    let find_len = rule.find.len();
    let mut out = String::with_capacity(content.len() + starts.len() * rule.replace.len());
    let mut last = 0;
    for &start in &starts {
        out.push_str(&content[last..start]);
        out.push_str(&rule.replace);
        last = start + find_len;
    }
    out.push_str(&content[last..]);

    Substitution {
        occurrences: starts.len() as u64,
        output: Some(out),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn apply(content: &str, find: &str, replace: &str) -> (u64, String) {
        let rule = Rule::new(find, replace);
        let sub = substitute(content, &rule);
        (
            sub.occurrences,
            sub.output.unwrap_or_else(|| content.to_string()),
        )
    }

    #[test]
    fn bare_identifier_respects_word_boundaries() {
        assert_eq!(apply("Run the build", "Run", "运行"), (1, "运行 the build".to_string()));
        assert_eq!(apply("Running", "Run", "运行"), (0, "Running".to_string()));
        assert_eq!(apply("ReRun", "Run", "运行"), (0, "ReRun".to_string()));
        assert_eq!(apply("run_Run", "Run", "运行"), (0, "run_Run".to_string()));
    }

    #[test]
    fn bare_identifier_matches_next_to_punctuation_and_non_ascii() {
        assert_eq!(
            apply("<text>Run</text> \"Run\" 请Run", "Run", "运行"),
            (3, "<text>运行</text> \"运行\" 请运行".to_string())
        );
    }

    #[test]
    fn bare_identifier_at_content_edges() {
        assert_eq!(apply("Run", "Run", "Go"), (1, "Go".to_string()));
        assert_eq!(apply("x Run", "Run", "Go"), (1, "x Go".to_string()));
    }

    #[test]
    fn literal_matches_inside_larger_tokens() {
        assert_eq!(apply("v1.2.3", "v1.2", "版本1.2"), (1, "版本1.2.3".to_string()));
    }

    #[test]
    fn literal_is_case_sensitive_and_global() {
        assert_eq!(
            apply("Save file. save file. Save file.", "Save file", "保存"),
            (2, "保存. save file. 保存.".to_string())
        );
    }

    #[test]
    fn literal_is_non_overlapping_leftmost_first() {
        assert_eq!(apply("aaaa", "a a", "b"), (0, "aaaa".to_string()));
        assert_eq!(apply("a-a-a-a", "a-a", "X"), (2, "X-X".to_string()));
    }

    #[test]
    fn replacement_text_is_not_a_template() {
        assert_eq!(apply("cost: price", "price", "$1"), (1, "cost: $1".to_string()));
    }

    #[test]
    fn empty_find_never_matches() {
        assert_eq!(apply("anything", "", "x"), (0, "anything".to_string()));
    }

    #[test]
    fn multiline_find_matches_after_normalization() {
        let rule = Rule::new("Line one\r\nLine two", "一\n二");
        let sub = substitute("<p>Line one\nLine two</p>", &rule);
        assert_eq!(sub.output.as_deref(), Some("<p>一\n二</p>"));
    }
}
