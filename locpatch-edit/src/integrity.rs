use crate::placeholder::{extract_placeholders, placeholder_diff};
use camino::Utf8Path;
use locpatch_types::rules::{Rule, RuleSet};
use locpatch_types::verify::IntegrityIssue;

/// Compare the placeholder multisets of a rule's `find` and `replace`.
///
/// Returns `(missing, extra)` when they differ.
pub fn check_rule(rule: &Rule) -> Option<(Vec<String>, Vec<String>)> {
    let expected = extract_placeholders(&rule.find);
    let actual = extract_placeholders(&rule.replace);
    let (missing, extra) = placeholder_diff(&expected, &actual);
    if missing.is_empty() && extra.is_empty() {
        None
    } else {
        Some((missing, extra))
    }
}

/// Every rule in `set` whose translation loses or invents a placeholder.
pub fn check_rule_set(set: &RuleSet, document: Option<&Utf8Path>) -> Vec<IntegrityIssue> {
    set.rules
        .iter()
        .filter_map(|rule| {
            check_rule(rule).map(|(missing, extra)| IntegrityIssue {
                document: document.map(Utf8Path::to_path_buf),
                target: set.target.clone(),
                find: rule.find.clone(),
                replace: rule.replace.clone(),
                missing,
                extra,
            })
        })
        .collect()
}
