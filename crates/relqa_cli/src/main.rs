//! relqa - match two releases of the same content and compare the pairs.

mod collect;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use relqa_core::audio::FfmpegDecoder;
use relqa_core::compare::{Executor, GroupReport};
use relqa_core::config::{ConfigManager, Settings};
use relqa_core::logging::{init_tracing, LogLevel, MessagePrefix, RunLogger};
use relqa_core::matching::{MatchEventKind, Matcher};
use relqa_core::models::MediaItem;
use relqa_core::persistence::{read_plan, write_plan};
use relqa_core::probe::{describe_all, fingerprint_all, DescriptorCache, FfprobeProber};

use collect::collect_inputs;

#[derive(Parser)]
#[command(name = "relqa", version, about = "Cross-release media matching and audio comparison")]
struct Cli {
    /// Settings file (created with defaults when missing)
    #[arg(long, global = true, env = "RELQA_CONFIG")]
    config: Option<PathBuf>,

    /// Debug-level console output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pair files of two releases and write a reviewable plan
    Match {
        /// Files or directories of the old release
        #[arg(long, required = true, num_args = 1..)]
        old: Vec<PathBuf>,
        /// Files or directories of the new release
        #[arg(long, required = true, num_args = 1..)]
        new: Vec<PathBuf>,
        /// Output plan CSV
        #[arg(long)]
        plan: PathBuf,
        /// Sample audio fingerprints before matching
        #[arg(long)]
        fingerprints: bool,
    },
    /// Compare every group of a reviewed plan
    Compare {
        /// Plan CSV written by `match`, possibly edited
        #[arg(long)]
        plan: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let settings = load_settings(&config_path)?;

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        settings.logging.level
    };
    init_tracing(level);
    tracing::debug!("Using settings from {}", config_path.display());

    match cli.command {
        Command::Match {
            old,
            new,
            plan,
            fingerprints,
        } => run_match(&settings, &old, &new, &plan, fingerprints),
        Command::Compare { plan } => run_compare(&settings, &plan),
    }
}

fn default_config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "relqa")
        .context("Could not determine a configuration directory")?;
    Ok(dirs.config_dir().join("settings.toml"))
}

/// Load (or create) the settings file and the folders it names.
fn load_settings(config_path: &Path) -> Result<Settings> {
    let mut config = ConfigManager::new(config_path);
    config
        .load_or_create()
        .with_context(|| format!("Failed to load settings from {}", config_path.display()))?;
    config
        .ensure_dirs_exist()
        .context("Failed to create output folders")?;
    Ok(config.into_settings())
}

fn open_logger(settings: &Settings, command: &str) -> Result<RunLogger> {
    let run_name = format!("{}_{}", command, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    RunLogger::new(
        run_name,
        &settings.paths.logs_folder,
        settings.log_config(),
        Some(Box::new(|line: &str| println!("{}", line))),
    )
    .with_context(|| format!("Failed to create run log in {}", settings.paths.logs_folder))
}

fn run_match(
    settings: &Settings,
    old: &[PathBuf],
    new: &[PathBuf],
    plan_path: &Path,
    fingerprints: bool,
) -> Result<ExitCode> {
    let logger = open_logger(settings, "match")?;

    let old_files = collect_inputs(old)?;
    let new_files = collect_inputs(new)?;
    logger.phase("Describing");
    logger.info(&format!(
        "{} old file(s), {} new file(s)",
        old_files.len(),
        new_files.len()
    ));

    let prober = FfprobeProber::from_settings(&settings.tools);
    let cache = DescriptorCache::new();
    let workers = settings.probe.worker_count();
    let mut old_items = describe_all(&old_files, &prober, &cache, workers);
    let mut new_items = describe_all(&new_files, &prober, &cache, workers);
    warn_unprobed(&logger, old_items.iter().chain(new_items.iter()));

    let mut matcher_config = settings.matcher_config();
    matcher_config.use_fingerprints |= fingerprints;
    if matcher_config.use_fingerprints {
        logger.phase("Fingerprinting");
        let decoder = FfmpegDecoder::new(&settings.tools.ffmpeg, settings.tools.timeout());
        let fp_config = settings.fingerprint_config();
        fingerprint_all(&mut old_items, &decoder, &fp_config, workers);
        fingerprint_all(&mut new_items, &decoder, &fp_config, workers);
    }

    logger.phase("Matching");
    let outcome = Matcher::new(matcher_config).run(&old_items, &new_items);
    for event in &outcome.events {
        let prefix = match event.kind {
            MatchEventKind::Ambiguous => MessagePrefix::Ambiguous,
            MatchEventKind::NoMatch => MessagePrefix::NoMatch,
        };
        logger.prefixed(LogLevel::Warn, prefix, &event.to_string());
    }

    write_plan(&outcome.plan, plan_path)
        .with_context(|| format!("Failed to write plan to {}", plan_path.display()))?;
    logger.info(&format!(
        "{} group(s), {} unmatched item(s) written to {}",
        outcome.plan.groups().len(),
        outcome.plan.unmatched().members.len(),
        plan_path.display()
    ));
    logger.close();

    Ok(ExitCode::SUCCESS)
}

fn run_compare(settings: &Settings, plan_path: &Path) -> Result<ExitCode> {
    let logger = open_logger(settings, "compare")?;

    let plan = read_plan(plan_path)
        .with_context(|| format!("Failed to load plan {}", plan_path.display()))?;

    logger.phase("Describing");
    let paths: Vec<PathBuf> = plan
        .comparable_groups()
        .flat_map(|g| g.enabled_members())
        .map(|m| m.path.clone())
        .collect();
    let prober = FfprobeProber::from_settings(&settings.tools);
    let items = describe_all(
        &paths,
        &prober,
        &DescriptorCache::new(),
        settings.probe.worker_count(),
    );
    warn_unprobed(&logger, items.iter());

    let decoder = FfmpegDecoder::new(&settings.tools.ffmpeg, settings.tools.timeout());
    let executor = Executor::new(&decoder, items, settings, Some(&logger));
    let reports = executor.run(&plan);

    let failed = summarize(&logger, &reports);
    if failed {
        logger.show_tail("compare");
    }
    logger.close();

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn warn_unprobed<'a>(logger: &RunLogger, items: impl Iterator<Item = &'a MediaItem>) {
    for item in items.filter(|i| !i.probed) {
        logger.prefixed(
            LogLevel::Warn,
            MessagePrefix::Warning,
            &format!("Could not probe {}", item.path.display()),
        );
    }
}

/// Log the per-run summary. Returns true when anything differed or failed.
fn summarize(logger: &RunLogger, reports: &[GroupReport]) -> bool {
    logger.phase("Summary");

    let compared = reports.iter().filter(|r| r.skipped.is_none()).count();
    let differing: Vec<&str> = reports
        .iter()
        .filter(|r| r.has_difference())
        .map(|r| r.group_id.as_str())
        .collect();
    let failing: Vec<&str> = reports
        .iter()
        .filter(|r| r.has_failure())
        .map(|r| r.group_id.as_str())
        .collect();

    logger.info(&format!(
        "{} group(s) compared, {} skipped",
        compared,
        reports.len() - compared
    ));
    if !differing.is_empty() {
        logger.prefixed(
            LogLevel::Warn,
            MessagePrefix::Diff,
            &format!("Groups with differences: {}", differing.join(", ")),
        );
    }
    if !failing.is_empty() {
        logger.prefixed(
            LogLevel::Error,
            MessagePrefix::Error,
            &format!("Groups with failures: {}", failing.join(", ")),
        );
    }
    if differing.is_empty() && failing.is_empty() {
        logger.prefixed(LogLevel::Info, MessagePrefix::Ok, "All compared groups match");
    }

    !differing.is_empty() || !failing.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn match_accepts_several_inputs_per_side() {
        let cli = Cli::try_parse_from([
            "relqa", "-v", "match", "--old", "a", "b", "--new", "c", "--plan", "plan.csv",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Match { old, new, plan, fingerprints } => {
                assert_eq!(old.len(), 2);
                assert_eq!(new, vec![PathBuf::from("c")]);
                assert_eq!(plan, PathBuf::from("plan.csv"));
                assert!(!fingerprints);
            }
            Command::Compare { .. } => panic!("expected match"),
        }
    }

    #[test]
    fn load_settings_creates_file_and_folders() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");
        let logs = dir.path().join("logs");
        std::fs::write(
            &config_path,
            format!(
                "[paths]\nlogs_folder = {:?}\ndiagnostics_folder = {:?}\n",
                logs.display().to_string(),
                dir.path().join("diag").display().to_string()
            ),
        )
        .unwrap();

        let settings = load_settings(&config_path).unwrap();

        assert_eq!(settings.paths.logs_folder, logs.display().to_string());
        assert!(logs.is_dir());
        assert!(dir.path().join("diag").is_dir());
        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[matching]"));
    }

    #[test]
    fn compare_requires_plan() {
        assert!(Cli::try_parse_from(["relqa", "compare"]).is_err());
    }
}
