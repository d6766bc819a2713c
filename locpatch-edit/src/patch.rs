use camino::Utf8PathBuf;
use std::collections::BTreeMap;

/// Render a git-style unified diff for every file whose content differs.
pub fn render_patch(
    before: &BTreeMap<Utf8PathBuf, String>,
    after: &BTreeMap<Utf8PathBuf, String>,
) -> String {
    let mut out = String::new();

    for (path, old) in before {
        let new = after.get(path).unwrap_or(old);
        if old == new {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));

        // diffy emits its own `--- original`/`+++ modified` header; keep the hunks only.
        let patch = diffy::create_patch(old, new).to_string();
        let hunks: Vec<&str> = patch
            .lines()
            .skip_while(|line| !line.starts_with("@@"))
            .collect();
        out.push_str(&hunks.join("\n"));
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
