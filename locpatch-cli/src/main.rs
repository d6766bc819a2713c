mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use locpatch_core::adapters::{FsRuleSetSource, FsWritePort};
use locpatch_core::pipeline::{
    run_apply, run_coverage, run_stats, run_verify, write_apply_artifacts,
    write_coverage_artifacts, write_stats_artifacts, write_verify_artifacts,
};
use locpatch_core::settings::{ApplySettings, VerifySettings};
use locpatch_core::FsSourceTree;
use locpatch_render::{render_apply_md, render_coverage_md, render_stats_md, render_verify_md};
use locpatch_types::ToolInfo;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Apply changed nothing despite having rule sets, or verify found problems.
const EXIT_FINDINGS: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "locpatch",
    version,
    about = "Rule-driven, placeholder-safe localization patcher for source trees."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply every rule document to the source tree.
    Apply(ApplyArgs),
    /// Check rule documents, placeholders, coverage and obsolete targets.
    Verify(VerifyArgs),
    /// Report how many eligible source files have a rule document.
    Coverage(CoverageArgs),
    /// Count rule documents and rules per category.
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Working root; `locpatch.toml` is read from here (default: current directory).
    #[arg(long, default_value = ".")]
    root: Utf8PathBuf,

    /// Directory of rule documents (default: <root>/i18n).
    #[arg(long, env = "LOCPATCH_RULES_DIR")]
    rules_dir: Option<Utf8PathBuf>,

    /// Source tree that rule targets are relative to (default: <root>).
    #[arg(long, env = "LOCPATCH_SOURCE_ROOT")]
    source_root: Option<Utf8PathBuf>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also write JSON and markdown artifacts to this directory.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

#[derive(Debug, Args)]
struct ScopeArgs {
    /// Directory under the source root scanned for coverage (default: src).
    #[arg(long)]
    scan_dir: Option<Utf8PathBuf>,

    /// Eligible file extensions, comma separated (default: tsx,jsx).
    #[arg(long = "ext", value_delimiter = ',')]
    extensions: Vec<String>,
}

#[derive(Debug, Parser)]
struct ApplyArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Report what would change and print the diff without writing files.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Parser)]
struct VerifyArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    scope: ScopeArgs,

    /// Include per-category stats and the full coverage listing.
    #[arg(long, default_value_t = false)]
    detailed: bool,

    /// Also simulate a full apply without writing files.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Debug, Parser)]
struct CoverageArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(Debug, Parser)]
struct StatsArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Apply(args) => cmd_apply(args),
        Command::Verify(args) => cmd_verify(args),
        Command::Coverage(args) => cmd_coverage(args),
        Command::Stats(args) => cmd_stats(args),
    }
}

fn resolve_config(common: &CommonArgs, scope: Option<&ScopeArgs>) -> anyhow::Result<MergedConfig> {
    let file_config = config::load_or_default(&common.root).context("load locpatch.toml config")?;
    let overrides = CliOverrides {
        rules_dir: common.rules_dir.clone(),
        source_root: common.source_root.clone(),
        scan_dir: scope.and_then(|s| s.scan_dir.clone()),
        extensions: scope.map(|s| s.extensions.clone()).unwrap_or_default(),
    };
    let merged = ConfigMerger::new(file_config).merge(&common.root, overrides);

    debug!(
        "merged config: rules_dir={}, source_root={}, scan_dir={}, extensions={:?}",
        merged.rules_dir, merged.source_root, merged.coverage.scan_dir, merged.coverage.extensions
    );

    if !merged.rules_dir.is_dir() {
        anyhow::bail!("rules directory not found: {}", merged.rules_dir);
    }
    Ok(merged)
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<ExitCode> {
    let merged = resolve_config(&args.common, None)?;
    let rules = FsRuleSetSource::new(merged.rules_dir);
    let tree = FsSourceTree::new(merged.source_root);

    let settings = ApplySettings {
        dry_run: args.dry_run,
    };
    let outcome = run_apply(&settings, &rules, &tree, tool_info())?;

    match args.common.format {
        OutputFormat::Text => {
            print!("{}", render_apply_md(&outcome.run));
            if args.dry_run && !outcome.patch.is_empty() {
                println!();
                print!("{}", outcome.patch);
            }
        }
        OutputFormat::Json => print_json(&outcome.run)?,
    }

    if let Some(out_dir) = &args.common.out_dir {
        write_apply_artifacts(&outcome, out_dir, &FsWritePort)?;
        info!("wrote apply artifacts to {}", out_dir);
    }

    Ok(if outcome.nothing_applied {
        ExitCode::from(EXIT_FINDINGS)
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_verify(args: VerifyArgs) -> anyhow::Result<ExitCode> {
    let merged = resolve_config(&args.common, Some(&args.scope))?;
    let rules = FsRuleSetSource::new(merged.rules_dir);
    let tree = FsSourceTree::new(merged.source_root);

    let settings = VerifySettings {
        simulate: args.dry_run,
        coverage: merged.coverage,
    };
    let report = run_verify(&settings, &rules, &tree, tool_info())?;

    match args.common.format {
        OutputFormat::Text => print!("{}", render_verify_md(&report, args.detailed)),
        OutputFormat::Json => print_json(&report)?,
    }

    if let Some(out_dir) = &args.common.out_dir {
        write_verify_artifacts(&report, out_dir, &FsWritePort)?;
        info!("wrote verify artifacts to {}", out_dir);
    }

    Ok(if report.has_problems() {
        ExitCode::from(EXIT_FINDINGS)
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_coverage(args: CoverageArgs) -> anyhow::Result<ExitCode> {
    let merged = resolve_config(&args.common, Some(&args.scope))?;
    let rules = FsRuleSetSource::new(merged.rules_dir);
    let tree = FsSourceTree::new(merged.source_root);

    let report = run_coverage(&merged.coverage, &rules, &tree)?;

    match args.common.format {
        OutputFormat::Text => print!("{}", render_coverage_md(&report)),
        OutputFormat::Json => print_json(&report)?,
    }

    if let Some(out_dir) = &args.common.out_dir {
        write_coverage_artifacts(&report, out_dir, &FsWritePort)?;
        info!("wrote coverage artifacts to {}", out_dir);
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_stats(args: StatsArgs) -> anyhow::Result<ExitCode> {
    let merged = resolve_config(&args.common, None)?;
    let rules = FsRuleSetSource::new(merged.rules_dir);

    let stats = run_stats(&rules)?;

    match args.common.format {
        OutputFormat::Text => print!("{}", render_stats_md(&stats)),
        OutputFormat::Json => print_json(&stats)?,
    }

    if let Some(out_dir) = &args.common.out_dir {
        write_stats_artifacts(&stats, out_dir, &FsWritePort)?;
        info!("wrote stats artifacts to {}", out_dir);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_json<T: serde::Serialize>(v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    println!("{}", s);
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo::locpatch(env!("CARGO_PKG_VERSION"))
}
