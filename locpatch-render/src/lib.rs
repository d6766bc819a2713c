//! Rendering helpers (markdown) for human-readable reports.

use locpatch_types::apply::{ApplyRun, FileStatus};
use locpatch_types::coverage::CoverageReport;
use locpatch_types::verify::{
    ConfigStats, ObsoleteReason, ValidationKind, VerifyReport,
};

/// Uncovered files listed before the rest are elided.
const UNCOVERED_PREVIEW: usize = 20;

/// New files listed in a verify summary unless `detailed`.
const NEW_FILES_PREVIEW: usize = 10;

pub fn render_apply_md(run: &ApplyRun) -> String {
    let mut out = String::new();
    out.push_str(if run.dry_run {
        "# locpatch apply (dry run)\n\n"
    } else {
        "# locpatch apply\n\n"
    });

    let files = &run.summary.files;
    let reps = &run.summary.replacements;
    out.push_str(&format!(
        "- Files: {} (succeeded {}, skipped {}, failed {})\n",
        files.total, files.succeeded, files.skipped, files.failed
    ));
    out.push_str(&format!(
        "- Replacements: {} (succeeded {}, failed {})\n",
        reps.total, reps.succeeded, reps.failed
    ));
    out.push_str(&format!("- Files written: {}\n\n", run.summary.files_written));

    out.push_str("## Files\n\n");
    if run.outcomes.is_empty() {
        out.push_str("_No rule sets._\n");
        return out;
    }

    for o in &run.outcomes {
        out.push_str(&format!("- `{}` {}", o.target, status_label(o.status)));
        if let Some(reason) = o.skip_reason {
            out.push_str(&format!(" ({})", reason));
        }
        if o.status != FileStatus::Skipped {
            out.push_str(&format!(
                " {}/{}",
                o.replacements.succeeded, o.replacements.total
            ));
        }
        if let Some(msg) = &o.message {
            out.push_str(&format!(": {}", msg));
        }
        out.push('\n');

        for r in o.rules.iter().filter(|r| !r.matched) {
            out.push_str(&format!("  - unmatched `{}`\n", one_line(&r.find)));
        }
    }

    out
}

pub fn render_verify_md(report: &VerifyReport, detailed: bool) -> String {
    let mut out = String::new();
    out.push_str("# locpatch verify\n\n");
    out.push_str(&format!(
        "- Documents: {} ({} rules, {} load failures)\n",
        report.stats.documents, report.stats.rules, report.stats.load_failures
    ));
    out.push_str(&format!(
        "- Validation errors: {}\n",
        report.validation_errors.len()
    ));
    out.push_str(&format!(
        "- Placeholder issues: {}\n",
        report.integrity_issues.len()
    ));
    match &report.coverage {
        Some(c) => out.push_str(&format!(
            "- Coverage: {:.1}% ({}/{})\n",
            c.percentage, c.configured, c.eligible
        )),
        None => out.push_str("- Coverage: unavailable\n"),
    }
    if let Some(sim) = &report.simulation {
        let r = &sim.summary.replacements;
        out.push_str(&format!(
            "- Simulation: {}/{} replacements would apply\n",
            r.succeeded, r.total
        ));
    }
    out.push_str(&format!("- Obsolete documents: {}\n", report.obsolete.len()));
    out.push_str(&format!("- New files: {}\n", report.new_files.len()));
    out.push_str(&format!(
        "- Missing translations: {}\n",
        report.missing_translations.len()
    ));
    out.push_str(&format!(
        "- Verdict: {}\n",
        if report.has_problems() { "problems found" } else { "ok" }
    ));

    if !report.load_failures.is_empty() {
        out.push_str("\n## Load failures\n\n");
        for f in &report.load_failures {
            out.push_str(&format!("- `{}`: {}\n", f.document, f.message));
        }
    }

    if !report.validation_errors.is_empty() {
        out.push_str("\n## Validation errors\n\n");
        for e in &report.validation_errors {
            match (e.kind, &e.target) {
                (ValidationKind::TargetMissing, Some(target)) => out.push_str(&format!(
                    "- `{}`: target `{}` does not exist\n",
                    e.document, target
                )),
                (ValidationKind::TargetOutsideRoot, Some(target)) => out.push_str(&format!(
                    "- `{}`: target `{}` is outside the source root\n",
                    e.document, target
                )),
                _ => out.push_str(&format!("- `{}`: missing `file` field\n", e.document)),
            }
        }
    }

    if !report.integrity_issues.is_empty() {
        out.push_str("\n## Placeholder issues\n\n");
        for issue in &report.integrity_issues {
            let doc = issue
                .document
                .as_ref()
                .map(|p| p.as_str())
                .unwrap_or("-");
            out.push_str(&format!(
                "- `{}` `{}` → `{}`",
                doc,
                one_line(&issue.find),
                one_line(&issue.replace)
            ));
            if !issue.missing.is_empty() {
                out.push_str(&format!(" missing {}", braces(&issue.missing)));
            }
            if !issue.extra.is_empty() {
                out.push_str(&format!(" extra {}", braces(&issue.extra)));
            }
            out.push('\n');
        }
    }

    if !report.obsolete.is_empty() {
        out.push_str("\n## Obsolete documents\n\n");
        for o in &report.obsolete {
            let why = match o.reason {
                ObsoleteReason::FileMissing => "target deleted",
                ObsoleteReason::OutOfScope => "target outside scan set",
            };
            out.push_str(&format!("- `{}` → `{}` ({})\n", o.document, o.target, why));
        }
    }

    if !report.new_files.is_empty() {
        out.push_str("\n## New files\n\n");
        let shown = if detailed {
            report.new_files.len()
        } else {
            NEW_FILES_PREVIEW
        };
        for path in report.new_files.iter().take(shown) {
            out.push_str(&format!("- `{}`\n", path));
        }
        if report.new_files.len() > shown {
            out.push_str(&format!(
                "- … and {} more\n",
                report.new_files.len() - shown
            ));
        }
    }

    if !report.missing_translations.is_empty() {
        out.push_str("\n## Missing translations\n\n");
        for m in &report.missing_translations {
            out.push_str(&format!(
                "- `{}:{}` `{}` (`{}`)\n",
                m.target,
                m.line,
                m.source_text(),
                m.document
            ));
        }
    }

    if detailed {
        out.push('\n');
        out.push_str(&render_stats_md(&report.stats));
        if let Some(c) = &report.coverage {
            out.push('\n');
            out.push_str(&render_coverage_md(c));
        }
    }

    out
}

pub fn render_coverage_md(report: &CoverageReport) -> String {
    let mut out = String::new();
    out.push_str("# locpatch coverage\n\n");
    out.push_str(&format!(
        "- Scan: `{}` ({})\n",
        report.scan_dir,
        report.extensions.join(", ")
    ));
    out.push_str(&format!("- Eligible files: {}\n", report.eligible));
    out.push_str(&format!("- Configured targets: {}\n", report.configured));
    out.push_str(&format!("- Covered: {}\n", report.covered));
    out.push_str(&format!("- Coverage: {:.1}%\n", report.percentage));

    if !report.uncovered.is_empty() {
        out.push_str(&format!("\n## Uncovered ({})\n\n", report.uncovered.len()));
        for path in report.uncovered.iter().take(UNCOVERED_PREVIEW) {
            out.push_str(&format!("- `{}`\n", path));
        }
        if report.uncovered.len() > UNCOVERED_PREVIEW {
            out.push_str(&format!(
                "- … and {} more\n",
                report.uncovered.len() - UNCOVERED_PREVIEW
            ));
        }
    }

    if !report.skipped.is_empty() {
        out.push_str(&format!("\n## Skipped ({})\n\n", report.skipped.len()));
        for path in &report.skipped {
            out.push_str(&format!("- `{}`\n", path));
        }
    }

    out
}

pub fn render_stats_md(stats: &ConfigStats) -> String {
    let mut out = String::new();
    out.push_str("# locpatch stats\n\n");
    out.push_str(&format!(
        "- Documents: {}\n- Rules: {}\n- Load failures: {}\n\n",
        stats.documents, stats.rules, stats.load_failures
    ));

    if stats.categories.is_empty() {
        out.push_str("_No categories._\n");
        return out;
    }

    out.push_str("| Category | Documents | Rules |\n|---|---:|---:|\n");
    for (name, c) in &stats.categories {
        out.push_str(&format!("| {} | {} | {} |\n", name, c.documents, c.rules));
    }

    out
}

fn status_label(s: FileStatus) -> &'static str {
    match s {
        FileStatus::Succeeded => "succeeded",
        FileStatus::Unmatched => "unmatched",
        FileStatus::WriteFailed => "write failed",
        FileStatus::Skipped => "skipped",
    }
}

fn braces(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("{{{}}}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

fn one_line(s: &str) -> String {
    s.replace('\n', "\\n")
}
