//! Property-based tests for the replacement engine.
//!
//! These tests verify key invariants:
//! - Idempotence: a second apply over translated output matches nothing
//! - Dry-run equivalence: a dry run reports the counts a real run produces
//! - Placeholder multisets ignore order but not multiplicity

use locpatch_edit::{
    Applier, ApplyOptions, InMemorySourceTree, extract_placeholders, placeholder_diff,
};
use locpatch_types::rules::RuleSet;
use proptest::prelude::*;

const TARGET: &str = "src/tui/app.tsx";

const WORDS: &[&str] = &[
    "Save", "Cancel", "Run", "Running", "Quit", "Open", "Files", "Help", "Exit", "Model",
];

const TRANSLATIONS: &[&str] = &[
    "保存", "取消", "运行", "正在运行", "退出", "打开", "文件", "帮助", "离开", "模型",
];

const SEPARATORS: &[&str] = &[" ", "<text>", "</text>", "\n", "\"", ", "];

/// Source content built from vocabulary words split by non-word separators.
fn arb_content() -> impl Strategy<Value = String> {
    prop::collection::vec((0..WORDS.len(), 0..SEPARATORS.len()), 0..40).prop_map(|tokens| {
        tokens
            .into_iter()
            .map(|(w, s)| format!("{}{}", WORDS[w], SEPARATORS[s]))
            .collect()
    })
}

/// Ordered, distinct bare-identifier rules mapping words to CJK text.
fn arb_rule_set() -> impl Strategy<Value = RuleSet> {
    prop::sample::subsequence((0..WORDS.len()).collect::<Vec<_>>(), 1..WORDS.len())
        .prop_shuffle()
        .prop_map(|indices| {
            RuleSet::from_pairs(TARGET, indices.into_iter().map(|i| (WORDS[i], TRANSLATIONS[i])))
        })
}

fn arb_placeholder_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop::string::string_regex(r"[a-z][a-zA-Z0-9_]{0,6}").unwrap(),
        0..6,
    )
}

proptest! {
    #[test]
    fn second_apply_matches_nothing(content in arb_content(), set in arb_rule_set()) {
        let tree = InMemorySourceTree::new().with_file(TARGET, content);

        let mut first = Applier::new(&tree, ApplyOptions { dry_run: false });
        first.apply(&set);
        let after_first = tree.get(TARGET);

        let mut second = Applier::new(&tree, ApplyOptions { dry_run: false });
        let outcome = second.apply(&set);

        prop_assert_eq!(outcome.replacements.succeeded, 0);
        prop_assert!(!outcome.written);
        prop_assert_eq!(tree.get(TARGET), after_first);
    }

    #[test]
    fn dry_run_counts_equal_real_run(
        content in arb_content(),
        sets in prop::collection::vec(arb_rule_set(), 1..4),
    ) {
        let dry_tree = InMemorySourceTree::new().with_file(TARGET, content.clone());
        let real_tree = InMemorySourceTree::new().with_file(TARGET, content.clone());

        let mut dry = Applier::new(&dry_tree, ApplyOptions { dry_run: true });
        let mut real = Applier::new(&real_tree, ApplyOptions { dry_run: false });

        for set in &sets {
            let d = dry.apply(set);
            let r = real.apply(set);
            prop_assert_eq!(d.status, r.status);
            prop_assert_eq!(d.replacements, r.replacements);
            prop_assert_eq!(&d.sha256_after, &r.sha256_after);
        }

        prop_assert_eq!(dry_tree.write_count(), 0);
        prop_assert_eq!(dry_tree.get(TARGET), Some(content));
    }

    #[test]
    fn placeholders_are_extracted_in_order(names in arb_placeholder_names()) {
        let text: String = names.iter().map(|n| format!("text {{{n}}} ")).collect();
        prop_assert_eq!(extract_placeholders(&text), names);
    }

    #[test]
    fn reordering_placeholders_is_not_an_issue(names in arb_placeholder_names()) {
        let mut reversed = names.clone();
        reversed.reverse();
        let (missing, extra) = placeholder_diff(&names, &reversed);
        prop_assert!(missing.is_empty());
        prop_assert!(extra.is_empty());
    }

    #[test]
    fn dropping_a_placeholder_reports_it_missing(
        names in arb_placeholder_names().prop_filter("non-empty", |n| !n.is_empty()),
        idx in any::<prop::sample::Index>(),
    ) {
        let i = idx.index(names.len());
        let mut actual = names.clone();
        let dropped = actual.remove(i);

        let (missing, extra) = placeholder_diff(&names, &actual);
        prop_assert_eq!(missing, vec![dropped]);
        prop_assert!(extra.is_empty());
    }
}
