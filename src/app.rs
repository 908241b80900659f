// Declare modules
pub mod binary;
pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod formatter;
pub mod ignore;
pub mod models;
pub mod output;
pub mod process;
pub mod scanner;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Instant;

use self::cli::{Cli, Command};
use self::commands::run_config_command;
use self::config::{effective_config, resolve_config};
use self::formatter::OutputGenerator;
use self::models::{ScanConfig, ScanResult};
use self::output::{ClipboardSink, OutputSink, StdoutSink};
use self::process::{ProcessLauncher, SystemLauncher};
use self::scanner::TreeScanner;

/// Scans `root` and assembles the document. Content blocks are skipped when
/// `include_content` is false or nothing survived the filters.
pub fn build_document(
    root: &Path,
    config: &ScanConfig,
    include_content: bool,
) -> (String, ScanResult) {
    let result = TreeScanner::new(root.to_path_buf(), config).scan();
    log::info!(
        "Found {} files matching criteria.",
        result.included_files.len()
    );

    let content = if include_content && !result.included_files.is_empty() {
        log::info!("Reading file contents...");
        Some(OutputGenerator::generate_content(&result.included_files))
    } else {
        if !include_content {
            log::info!("Skipping file contents (--no-content).");
        }
        None
    };

    let document = OutputGenerator::format_full_output(&result.tree_text, content.as_deref());
    (document, result)
}

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    let args = Cli::parse();
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let launcher = SystemLauncher;

    if let Some(Command::Config(cmd)) = &args.command {
        return run_config_command(cmd, &current_dir, &launcher);
    }

    let started = Instant::now();
    let document = match &args.file {
        Some(file) => single_file_document(file)?,
        None => directory_document(&args, &current_dir)?,
    };

    deliver(&document, args.stdout, &launcher)?;
    log::info!("Processed in {} ms.", started.elapsed().as_millis());
    Ok(())
}

fn single_file_document(file: &Path) -> Result<String> {
    log::info!("Processing single file: {}", file.display());
    if !file.is_file() {
        bail!("File not found: {}", file.display());
    }
    let content = fs::read_to_string(file)
        .with_context(|| format!("Error reading file: {}", file.display()))?;
    let name = file.file_name().unwrap_or_default().to_string_lossy();
    Ok(OutputGenerator::format_single_file(&name, &content))
}

fn directory_document(args: &Cli, root: &Path) -> Result<String> {
    log::info!("Processing directory: {}", root.display());
    fs::read_dir(root)
        .with_context(|| format!("Cannot read directory {}", root.display()))?;

    let config = resolve_config(args, effective_config(root), root);
    log::info!("Scanning directory structure...");
    let (document, _) = build_document(root, &config, !args.no_content);
    Ok(document)
}

fn deliver<L: ProcessLauncher>(document: &str, use_stdout: bool, launcher: &L) -> Result<()> {
    if use_stdout {
        return StdoutSink.deliver(document);
    }

    match ClipboardSink::new(launcher).deliver(document) {
        Ok(()) => {
            log::info!("Output successfully copied to clipboard.");
            Ok(())
        }
        Err(e) => {
            log::error!("Error copying to clipboard: {:#}. Printing to stdout instead.", e);
            StdoutSink.deliver(document)
        }
    }
}
