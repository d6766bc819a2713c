use std::collections::BTreeMap;

/// Extract `{name}` placeholders from `s`, in order of appearance, keeping duplicates.
///
/// A `{` opens a placeholder and the next `}` closes it; a later `{` before the
/// close restarts the capture, so only the innermost name of `{a{b}` is kept.
/// A `{` preceded by a backslash is literal. An unterminated `{` yields nothing.
pub fn extract_placeholders(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Option<String> = None;
    let mut escaped = false;

    for c in s.chars() {
        match c {
            '{' if !escaped => current = Some(String::new()),
            '}' => {
                if let Some(name) = current.take() {
                    out.push(name);
                }
            }
            _ => {
                if let Some(name) = current.as_mut() {
                    name.push(c);
                }
            }
        }
        escaped = c == '\\' && !escaped;
    }

    out
}

/// Multiset difference between two placeholder lists.
///
/// Returns `(missing, extra)`: names `expected` has more often than `actual`, and
/// names `actual` has more often than `expected`, repeated by the surplus, sorted.
pub fn placeholder_diff(expected: &[String], actual: &[String]) -> (Vec<String>, Vec<String>) {
    let mut balance: BTreeMap<&str, i64> = BTreeMap::new();
    for name in expected {
        *balance.entry(name.as_str()).or_default() += 1;
    }
    for name in actual {
        *balance.entry(name.as_str()).or_default() -= 1;
    }

    let mut missing = Vec::new();
    let mut extra = Vec::new();
    for (name, n) in balance {
        let bucket = if n > 0 { &mut missing } else { &mut extra };
        for _ in 0..n.unsigned_abs() {
            bucket.push(name.to_string());
        }
    }
    (missing, extra)
}
