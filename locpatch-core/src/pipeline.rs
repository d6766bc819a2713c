//! Core apply, verify, coverage and stats pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: rule documents come through a
//! [`RuleSetSource`] and translated files through a [`SourceTree`].

use crate::ports::{RuleSetSource, WritePort};
use crate::settings::{ApplySettings, CoverageSettings, VerifySettings};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use locpatch_edit::{
    Applier, ApplyOptions, SourceTree, analyze_coverage, check_rule_set, detect_new_files,
    eligible_files, find_obsolete, scan_missing_translations,
};
use locpatch_render::{render_apply_md, render_coverage_md, render_stats_md, render_verify_md};
use locpatch_rules::LoadedRuleSet;
use locpatch_types::ToolInfo;
use locpatch_types::apply::{ApplyRun, FileStatus};
use locpatch_types::coverage::CoverageReport;
use locpatch_types::verify::{
    ConfigStats, LoadFailure, ValidationError, ValidationKind, VerifyReport,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Error type for pipeline results. Exit code 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("scan directory not found: {0}")]
    ScanDirMissing(Utf8PathBuf),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Outcome of `run_apply`.
pub struct ApplyOutcome {
    pub run: ApplyRun,
    /// Unified diff of everything changed (or that would change).
    pub patch: String,
    /// Rule sets were present but no file had a successful replacement.
    pub nothing_applied: bool,
}

/// Run the apply pipeline over every loaded rule set, in document order.
///
/// Documents that failed to load are logged and left out; `run_verify`
/// reports them.
pub fn run_apply(
    settings: &ApplySettings,
    rules: &dyn RuleSetSource,
    tree: &dyn SourceTree,
    tool: ToolInfo,
) -> Result<ApplyOutcome, ToolError> {
    let loaded = rules.load_rule_sets()?;
    Ok(apply_loaded(&loaded, settings.dry_run, tree, tool))
}

fn apply_loaded(
    loaded: &[LoadedRuleSet],
    dry_run: bool,
    tree: &dyn SourceTree,
    tool: ToolInfo,
) -> ApplyOutcome {
    let mut run = ApplyRun::new(tool, dry_run);
    let mut applier = Applier::new(tree, ApplyOptions { dry_run });

    for entry in loaded {
        let Some(set) = entry.ok() else {
            debug!(document = %entry.path, "not applying document that failed to load");
            continue;
        };
        let mut outcome = applier.apply(set);
        outcome.document = Some(entry.path.clone());
        run.push(outcome);
    }
    run.ended_at = Some(Utc::now());

    let nothing_applied = !run.outcomes.is_empty()
        && !run
            .outcomes
            .iter()
            .any(|o| o.status == FileStatus::Succeeded);

    info!(
        dry_run,
        files = run.summary.files.total,
        succeeded = run.summary.files.succeeded,
        skipped = run.summary.files.skipped,
        failed = run.summary.files.failed,
        replacements = run.summary.replacements.succeeded,
        "apply finished"
    );

    ApplyOutcome {
        patch: applier.patch(),
        run,
        nothing_applied,
    }
}

/// Run the verify pipeline: config integrity, placeholder integrity, optional
/// simulation, coverage and obsolete documents.
pub fn run_verify(
    settings: &VerifySettings,
    rules: &dyn RuleSetSource,
    tree: &dyn SourceTree,
    tool: ToolInfo,
) -> Result<VerifyReport, ToolError> {
    let loaded = rules.load_rule_sets()?;
    let mut report = VerifyReport::new(tool.clone());

    report.stats = stats_of(&loaded);
    report.load_failures = load_failures(&loaded);
    report.validation_errors = validate(&loaded, tree);

    for entry in &loaded {
        if let Some(set) = entry.ok() {
            report
                .integrity_issues
                .extend(check_rule_set(set, Some(entry.path.as_path())));
        }
    }

    if settings.simulate {
        report.simulation = Some(apply_loaded(&loaded, true, tree, tool).run);
    }

    let scope = settings.coverage.scope();
    if tree.is_dir(&scope.scan_dir) {
        let skip = rules.load_skip_list();
        let sets = loaded.iter().filter_map(LoadedRuleSet::ok);
        let coverage = analyze_coverage(tree, &scope, sets, &skip.files)
            .context("analyze coverage")?;
        report.new_files = detect_new_files(tree, &coverage.uncovered);
        report.coverage = Some(coverage);

        let eligible = eligible_files(tree, &scope).context("list eligible files")?;
        report.obsolete = find_obsolete(
            tree,
            &eligible,
            loaded
                .iter()
                .filter_map(|e| e.ok().map(|set| (e.path.as_path(), set))),
        );
    } else {
        debug!(scan_dir = %scope.scan_dir, "scan directory missing; coverage unavailable");
    }

    for entry in &loaded {
        if let Some(set) = entry.ok() {
            report
                .missing_translations
                .extend(scan_missing_translations(tree, set, &entry.path));
        }
    }

    if report.has_problems() {
        warn!(
            load_failures = report.load_failures.len(),
            validation_errors = report.validation_errors.len(),
            integrity_issues = report.integrity_issues.len(),
            new_files = report.new_files.len(),
            missing_translations = report.missing_translations.len(),
            "verify found problems"
        );
    } else {
        info!(documents = report.stats.documents, "verify passed");
    }

    Ok(report)
}

/// Compute coverage of the scan directory by the loaded rule sets.
pub fn run_coverage(
    settings: &CoverageSettings,
    rules: &dyn RuleSetSource,
    tree: &dyn SourceTree,
) -> Result<CoverageReport, ToolError> {
    let scope = settings.scope();
    if !tree.is_dir(&scope.scan_dir) {
        return Err(ToolError::ScanDirMissing(tree.root().join(&scope.scan_dir)));
    }

    let loaded = rules.load_rule_sets()?;
    let skip = rules.load_skip_list();
    let report = analyze_coverage(
        tree,
        &scope,
        loaded.iter().filter_map(LoadedRuleSet::ok),
        &skip.files,
    )
    .context("analyze coverage")?;

    info!(
        eligible = report.eligible,
        configured = report.configured,
        percentage = report.percentage,
        "coverage computed"
    );
    Ok(report)
}

/// Count documents and rules overall and per category.
pub fn run_stats(rules: &dyn RuleSetSource) -> Result<ConfigStats, ToolError> {
    let loaded = rules.load_rule_sets()?;
    Ok(stats_of(&loaded))
}

fn stats_of(loaded: &[LoadedRuleSet]) -> ConfigStats {
    let mut stats = ConfigStats::default();
    for entry in loaded {
        match entry.ok() {
            Some(set) => {
                let rules = set.rules.len() as u64;
                stats.documents += 1;
                stats.rules += rules;
                let cat = stats.categories.entry(entry.category.clone()).or_default();
                cat.documents += 1;
                cat.rules += rules;
            }
            None => stats.load_failures += 1,
        }
    }
    stats
}

fn load_failures(loaded: &[LoadedRuleSet]) -> Vec<LoadFailure> {
    loaded
        .iter()
        .filter_map(|e| {
            e.rule_set.as_ref().err().map(|err| LoadFailure {
                document: e.path.clone(),
                message: err.to_string(),
            })
        })
        .collect()
}

fn validate(loaded: &[LoadedRuleSet], tree: &dyn SourceTree) -> Vec<ValidationError> {
    let check_targets = tree.is_dir(Utf8Path::new("."));
    if !check_targets {
        debug!(root = %tree.root(), "source root missing; skipping target checks");
    }

    let mut errors = Vec::new();
    for entry in loaded {
        let Some(set) = entry.ok() else { continue };
        if !set.has_target() {
            errors.push(ValidationError {
                document: entry.path.clone(),
                kind: ValidationKind::MissingFileField,
                target: None,
            });
        } else if !set.target_within_root() {
            errors.push(ValidationError {
                document: entry.path.clone(),
                kind: ValidationKind::TargetOutsideRoot,
                target: Some(set.target.clone()),
            });
        } else if check_targets && !set.deprecated && !tree.exists(&set.target) {
            errors.push(ValidationError {
                document: entry.path.clone(),
                kind: ValidationKind::TargetMissing,
                target: Some(set.target.clone()),
            });
        }
    }
    errors
}

fn write_json<T: Serialize>(
    writer: &dyn WritePort,
    path: &Utf8Path,
    value: &T,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).with_context(|| format!("serialize {}", path))?;
    writer.write_file(path, json.as_bytes())
}

/// Write `apply.json`, `apply.md` and `patch.diff` to the output directory.
pub fn write_apply_artifacts(
    outcome: &ApplyOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    write_json(writer, &out_dir.join("apply.json"), &outcome.run)?;
    writer.write_file(
        &out_dir.join("apply.md"),
        render_apply_md(&outcome.run).as_bytes(),
    )?;
    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}

/// Write `verify.json` and `verify.md` to the output directory.
pub fn write_verify_artifacts(
    report: &VerifyReport,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    write_json(writer, &out_dir.join("verify.json"), report)?;
    writer.write_file(
        &out_dir.join("verify.md"),
        render_verify_md(report, true).as_bytes(),
    )?;
    Ok(())
}

/// Write `coverage.json` and `coverage.md` to the output directory.
pub fn write_coverage_artifacts(
    report: &CoverageReport,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    write_json(writer, &out_dir.join("coverage.json"), report)?;
    writer.write_file(
        &out_dir.join("coverage.md"),
        render_coverage_md(report).as_bytes(),
    )?;
    Ok(())
}

/// Write `stats.json` and `stats.md` to the output directory.
pub fn write_stats_artifacts(
    stats: &ConfigStats,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;
    write_json(writer, &out_dir.join("stats.json"), stats)?;
    writer.write_file(&out_dir.join("stats.md"), render_stats_md(stats).as_bytes())?;
    Ok(())
}
