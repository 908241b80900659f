use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Copies project context (file structure and contents) to the clipboard for AI prompts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Copy the content of a single file instead of scanning the directory
    pub file: Option<PathBuf>,

    /// Glob patterns for files or directories to ignore
    #[arg(long, short = 'i', num_args = 1..)]
    pub ignore: Vec<String>,

    /// Do not read .gitignore files (configured and --ignore patterns still apply)
    #[arg(long)]
    pub no_ignore: bool,

    /// Limit the depth of directory scanning
    #[arg(long, short = 'd')]
    pub depth: Option<usize>,

    /// Print the output to stdout instead of copying to the clipboard
    #[arg(long, short = 's')]
    pub stdout: bool,

    /// Skip files larger than this many KB (replaces the configured limit)
    #[arg(long)]
    pub max_size: Option<u64>,

    /// Output only the file structure tree, without file contents
    #[arg(long)]
    pub no_content: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage the .contextcli.toml configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Open the configuration file in an editor
    Edit,
    /// Show the effective configuration
    Show,
    /// Show the path to the configuration file in use
    Path,
    /// Create a default configuration file in the current directory
    Init,
    /// List the configured extensions
    ListExtensions,
    /// Add one or more extensions (e.g. .cshtml .razor)
    AddExtension {
        #[arg(required = true)]
        extensions: Vec<String>,
    },
    /// Remove one or more extensions (e.g. .txt .log)
    RemoveExtension {
        #[arg(required = true)]
        extensions: Vec<String>,
    },
    /// Reset extensions to the default list
    ResetExtensions,
}
