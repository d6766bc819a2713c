//! Heuristic scans for English UI text that no rule set handles yet.

use crate::source::SourceTree;
use camino::{Utf8Path, Utf8PathBuf};
use locpatch_types::normalize_newlines;
use locpatch_types::rules::RuleSet;
use locpatch_types::verify::MissingTranslation;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Capitalized English text in attributes, JSX children, tips and message fields.
static TRANSLATABLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?:title|label|placeholder|description)="[A-Z][a-z]{2,}"#,
        r">\s*[A-Z][a-z]{3,}[^<]*<",
        r#""[A-Z][a-z].*\{highlight\}"#,
        r#"message:\s*["'][A-Z][a-z]"#,
        r#"text:\s*["'][A-Z][a-z]"#,
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("translatable pattern should compile"))
    .collect()
});

/// User-facing strings that keep a UI-less `context/` module in scope.
static CONTEXT_VISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["'](?:Connect|Select|Enter|Add|No |Please|Error|Warning|Success|Failed)"#)
        .expect("context pattern should compile")
});

/// `title="..."`, `label="..."` or `placeholder="..."` holding capitalized text.
static UNTRANSLATED_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(title|label|placeholder)="([A-Z][a-z][^"]+)""#)
        .expect("attribute pattern should compile")
});

fn in_context_dir(path: &Utf8Path) -> bool {
    path.parent()
        .is_some_and(|dir| dir.components().any(|c| c.as_str() == "context"))
}

/// True if `content` looks like it carries user-visible English text.
///
/// Modules under a `context/` directory with no `<text` or `<box` markup
/// only count when they quote a typical prompt or status word.
pub fn has_translatable_text(path: &Utf8Path, content: &str) -> bool {
    if in_context_dir(path)
        && !content.contains("<text")
        && !content.contains("<box")
        && !CONTEXT_VISIBLE.is_match(content)
    {
        return false;
    }
    TRANSLATABLE_PATTERNS.iter().any(|re| re.is_match(content))
}

/// The subset of `candidates` whose content has translatable text.
///
/// Unreadable files are left out.
pub fn detect_new_files(tree: &dyn SourceTree, candidates: &[Utf8PathBuf]) -> Vec<Utf8PathBuf> {
    candidates
        .iter()
        .filter(|path| match tree.read_to_string(path) {
            Ok(content) => has_translatable_text(path, &content),
            Err(err) => {
                debug!(path = %path, error = %err, "unreadable candidate; not a new file");
                false
            }
        })
        .cloned()
        .collect()
}

fn has_cjk(text: &str) -> bool {
    text.chars().any(|c| ('\u{4e00}'..='\u{9fa5}').contains(&c))
}

/// English attribute values in `content` that no rule of `set` replaces verbatim.
///
/// A hit counts as handled when some rule's `find` is exactly the attribute
/// as written, e.g. `title="Settings"`.
pub fn find_missing_translations(
    set: &RuleSet,
    document: &Utf8Path,
    content: &str,
) -> Vec<MissingTranslation> {
    UNTRANSLATED_ATTRIBUTE
        .captures_iter(content)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let text = caps.get(2)?.as_str();
            if has_cjk(text) || set.rules.iter().any(|r| r.find == full.as_str()) {
                return None;
            }
            let line = content[..full.start()].matches('\n').count() as u64 + 1;
            Some(MissingTranslation {
                document: document.to_path_buf(),
                target: set.target.clone(),
                attribute: caps[1].to_string(),
                text: text.to_string(),
                line,
            })
        })
        .collect()
}

/// Read the target of `set` through `tree` and report its untranslated attributes.
///
/// Sets without rules, without a usable target, or whose target is missing
/// or unreadable report nothing.
pub fn scan_missing_translations(
    tree: &dyn SourceTree,
    set: &RuleSet,
    document: &Utf8Path,
) -> Vec<MissingTranslation> {
    if set.rules.is_empty() || !set.has_target() || !set.target_within_root() {
        return Vec::new();
    }
    if !tree.exists(&set.target) {
        return Vec::new();
    }
    match tree.read_to_string(&set.target) {
        Ok(raw) => find_missing_translations(set, document, &normalize_newlines(&raw)),
        Err(err) => {
            debug!(target = %set.target, error = %err, "unreadable target; skipping scan");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySourceTree;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> &Utf8Path {
        Utf8Path::new(s)
    }

    #[test]
    fn translatable_text_patterns() {
        let path = p("src/tui/app.tsx");
        assert!(has_translatable_text(path, r#"<Dialog title="Settings" />"#));
        assert!(has_translatable_text(path, "<text>\n  Press enter\n</text>"));
        assert!(has_translatable_text(path, r#"tips: ["Use {highlight}/help{/highlight}"]"#));
        assert!(has_translatable_text(path, r#"toast({ message: "Copied" })"#));
        assert!(has_translatable_text(path, "{ text: 'Done' }"));

        assert!(!has_translatable_text(path, "export const x = 1;\n"));
        assert!(!has_translatable_text(path, r#"<Dialog title="Ok" />"#));
        assert!(!has_translatable_text(path, "<text>Run</text>"));
        assert!(!has_translatable_text(path, r#"<Dialog title="设置" />"#));
    }

    #[test]
    fn context_modules_need_markup_or_prompt_words() {
        let helper = r#"export const toast = { message: "Copied" }"#;
        assert!(has_translatable_text(p("src/tui/app.tsx"), helper));
        assert!(!has_translatable_text(p("src/tui/context/toast.tsx"), helper));

        let prompt = r#"const m = { message: "Please wait" }"#;
        assert!(has_translatable_text(p("src/tui/context/toast.tsx"), prompt));

        let markup = r#"<text>Loading</text>"#;
        assert!(has_translatable_text(p("src/tui/context/toast.tsx"), markup));

        // A file named `context.tsx` is not inside a context directory.
        assert!(has_translatable_text(p("src/tui/context.tsx"), helper));
    }

    #[test]
    fn new_files_filters_untranslatable_and_unreadable() {
        let tree = InMemorySourceTree::new()
            .with_file("src/a.tsx", "<text>Welcome back</text>")
            .with_file("src/b.tsx", "export const b = 2;")
            .with_file("src/c.tsx", r#"<Input placeholder="Search" />"#)
            .fail_reads("src/c.tsx");
        let candidates = vec![
            Utf8PathBuf::from("src/a.tsx"),
            Utf8PathBuf::from("src/b.tsx"),
            Utf8PathBuf::from("src/c.tsx"),
            Utf8PathBuf::from("src/gone.tsx"),
        ];

        assert_eq!(detect_new_files(&tree, &candidates), vec![Utf8PathBuf::from("src/a.tsx")]);
    }

    #[test]
    fn missing_translations_skip_handled_and_translated_attributes() {
        let set = RuleSet::from_pairs("src/dialog.tsx", [(r#"title="Settings""#, r#"title="设置""#)]);
        let content = concat!(
            "<Dialog title=\"Settings\">\n",
            "  <Input label=\"User name\" placeholder=\"Type here\" />\n",
            "  <Input label=\"Password 密码\" />\n",
            "  <Button title=\"Ok\" />\n",
            "</Dialog>\n",
        );

        let missing = find_missing_translations(&set, p("tui/dialog.json"), content);
        let found: Vec<(&str, &str, u64)> = missing
            .iter()
            .map(|m| (m.attribute.as_str(), m.text.as_str(), m.line))
            .collect();

        assert_eq!(found, vec![("label", "User name", 2), ("placeholder", "Type here", 2)]);
        assert_eq!(missing[0].document, Utf8PathBuf::from("tui/dialog.json"));
        assert_eq!(missing[0].target, Utf8PathBuf::from("src/dialog.tsx"));
        assert_eq!(missing[1].source_text(), r#"placeholder="Type here""#);
    }

    #[test]
    fn scan_reads_through_the_tree_and_skips_unusable_sets() {
        let tree = InMemorySourceTree::new()
            .with_file("src/a.tsx", "<Tab\r\n  title=\"Models\" />\r\n")
            .with_file("src/b.tsx", r#"<Tab title="Agents" />"#)
            .fail_reads("src/b.tsx");
        let doc = p("tui/a.json");

        let found = scan_missing_translations(&tree, &RuleSet::from_pairs("src/a.tsx", [("x", "y")]), doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);

        let empty = RuleSet::new("src/a.tsx", vec![]);
        assert!(scan_missing_translations(&tree, &empty, doc).is_empty());
        let outside = RuleSet::from_pairs("../a.tsx", [("x", "y")]);
        assert!(scan_missing_translations(&tree, &outside, doc).is_empty());
        let missing = RuleSet::from_pairs("src/gone.tsx", [("x", "y")]);
        assert!(scan_missing_translations(&tree, &missing, doc).is_empty());
        let unreadable = RuleSet::from_pairs("src/b.tsx", [("x", "y")]);
        assert!(scan_missing_translations(&tree, &unreadable, doc).is_empty());
    }
}
