use crate::normalize_newlines;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

/// How a rule's `find` text is located in file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// ASCII letters and digits only; matched on word boundaries.
    BareIdentifier,
    /// Anything else; matched as a literal, case-sensitive substring.
    Literal,
}

impl MatchStrategy {
    /// Classify a (newline-normalized) find pattern.
    pub fn classify(find: &str) -> Self {
        if !find.is_empty() && find.bytes().all(|b| b.is_ascii_alphanumeric()) {
            MatchStrategy::BareIdentifier
        } else {
            MatchStrategy::Literal
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStrategy::BareIdentifier => "bare_identifier",
            MatchStrategy::Literal => "literal",
        }
    }
}

/// One find/replace pair.
///
/// Both strings are stored newline-normalized and the strategy is chosen once,
/// here, so application never re-derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub find: String,
    pub replace: String,
    pub strategy: MatchStrategy,
}

impl Rule {
    pub fn new(find: impl AsRef<str>, replace: impl AsRef<str>) -> Self {
        let find = normalize_newlines(find.as_ref());
        let replace = normalize_newlines(replace.as_ref());
        let strategy = MatchStrategy::classify(&find);
        Self {
            find,
            replace,
            strategy,
        }
    }
}

/// Canonical spelling of a declared target path.
///
/// Trims whitespace, turns `\` into `/`, drops `.` components and folds
/// `dir/..` pairs. Leading `..` and root components are kept so
/// [`is_within_root`] can reject them.
pub fn canonical_target(raw: &str) -> Utf8PathBuf {
    let unified = raw.trim().replace('\\', "/");
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in Utf8Path::new(&unified).components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                // `/..` is `/`
                Some(Utf8Component::RootDir) | Some(Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().map(|c| c.as_str()).collect()
}

/// True if `path` is relative and never climbs above the directory it is joined to.
pub fn is_within_root(path: &Utf8Path) -> bool {
    let mut components = path.components().peekable();
    // `C:` written with forward slashes parses as a normal component off Windows.
    if let Some(Utf8Component::Normal(first)) = components.peek()
        && first.len() == 2
        && first.ends_with(':')
        && first.as_bytes()[0].is_ascii_alphabetic()
    {
        return false;
    }
    let mut depth = 0usize;
    for component in components {
        match component {
            Utf8Component::Normal(_) => depth += 1,
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Utf8Component::RootDir | Utf8Component::Prefix(_) => return false,
        }
    }
    true
}

/// A target file plus its ordered rules, parsed from one rule document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    /// Target path relative to the source root, in [`canonical_target`] form.
    /// May be empty if the document omitted it.
    pub target: Utf8PathBuf,

    /// Rules in declaration order.
    pub rules: Vec<Rule>,

    /// Deprecated rule sets are still applied but exempt from target validation.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

impl RuleSet {
    pub fn new(target: impl Into<Utf8PathBuf>, rules: Vec<Rule>) -> Self {
        Self {
            target: canonical_target(target.into().as_str()),
            rules,
            deprecated: false,
        }
    }

    /// Build a rule set from `(find, replace)` pairs, keeping their order.
    pub fn from_pairs<I, F, R>(target: impl Into<Utf8PathBuf>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, R)>,
        F: AsRef<str>,
        R: AsRef<str>,
    {
        let rules = pairs.into_iter().map(|(f, r)| Rule::new(f, r)).collect();
        Self::new(target, rules)
    }

    pub fn has_target(&self) -> bool {
        !self.target.as_str().is_empty()
    }

    /// False for absolute targets and targets that climb out of the source root.
    pub fn target_within_root(&self) -> bool {
        is_within_root(&self.target)
    }
}
