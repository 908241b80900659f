use crate::app::cli::Cli;
use crate::app::ignore::IgnoreSet;
use crate::app::models::ScanConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".contextcli.toml";
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("failed to parse {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),
}

/// Persisted settings, as stored in `.contextcli.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    pub schema_version: u32,
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<String>,
    pub use_gitignore: bool,
    /// A missing key means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size_kb: Option<u64>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            extensions: default_extensions(),
            ignore_patterns: default_ignore_patterns(),
            use_gitignore: true,
            max_file_size_kb: Some(1024),
        }
    }
}

pub fn default_extensions() -> Vec<String> {
    [
        ".cs", ".js", ".ts", ".py", ".java", ".go", ".rs", ".php", ".rb", ".html", ".css",
        ".scss", ".json", ".yaml", ".yml", ".xml", ".sh", ".bat", ".ps1", ".sql", ".md", ".txt",
        ".csproj", ".sln", ".props", ".targets", "requirements.txt", "Dockerfile",
        ".env.example", "pyproject.toml", "package.json", ".toml", "Cargo.toml",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_ignore_patterns() -> Vec<String> {
    [
        "**/bin/**",
        "**/obj/**",
        "**/node_modules/**",
        "**/.git/**",
        "**/.svn/**",
        "**/.hg/**",
        "**/.vs/**",
        "**/.vscode/**",
        "**/target/**",
        "**/*.log",
        "**/*.dll",
        "**/*.exe",
        "**/*.so",
        "**/*.dylib",
        "**/*.pyc",
        "**/*.cache",
        "**/__pycache__/**",
        ".env",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Nearest `.contextcli.toml` from `start` upward, stopping at a repository root.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").is_dir() {
            break;
        }
    }
    None
}

fn user_config_file() -> Option<PathBuf> {
    let path = dirs::home_dir()?
        .join(".config")
        .join("contextcli")
        .join("config.toml");
    path.is_file().then_some(path)
}

/// The file that supplies the effective configuration, if any.
pub fn locate_config(start: &Path) -> Option<PathBuf> {
    locate_config_with(start, user_config_file())
}

/// Project file from `start` upward, else `user_file`.
pub fn locate_config_with(start: &Path, user_file: Option<PathBuf>) -> Option<PathBuf> {
    find_config_file(start).or(user_file)
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    let config: FileConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

    if config.schema_version > CURRENT_SCHEMA_VERSION {
        log::warn!(
            "Configuration file '{}' has schema version {}, newer than supported version {}. Some settings might be ignored.",
            path.display(),
            config.schema_version,
            CURRENT_SCHEMA_VERSION
        );
    }
    Ok(config)
}

pub fn save_config(config: &FileConfig, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConfigError::Write(path.to_path_buf(), e))?;
    }
    fs::write(path, content).map_err(|e| ConfigError::Write(path.to_path_buf(), e))
}

/// Loads the configuration in effect for `start`. Any problem falls back to defaults.
pub fn effective_config(start: &Path) -> FileConfig {
    let Some(path) = locate_config(start) else {
        return FileConfig::default();
    };
    match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}. Using default configuration.", e);
            FileConfig::default()
        }
    }
}

/// Applies CLI overrides and builds the immutable snapshot for one scan.
pub fn resolve_config(cli: &Cli, file: FileConfig, root: &Path) -> ScanConfig {
    let use_gitignore = file.use_gitignore && !cli.no_ignore;
    if cli.no_ignore {
        log::info!("Note: --no-ignore flag is active, ignoring .gitignore files.");
    }

    let max_kb = cli.max_size.or(file.max_file_size_kb);
    match max_kb {
        Some(kb) => log::info!("Effective MaxFileSize: {} KB", kb),
        None => log::info!("Effective MaxFileSize: Unlimited"),
    }
    log::info!("Effective UseGitignore: {}", use_gitignore);

    let ignore = IgnoreSet::build(&file.ignore_patterns, &cli.ignore, use_gitignore, root);
    let config = ScanConfig::new(&file.extensions, ignore)
        .with_max_depth(cli.depth)
        .with_max_file_size_bytes(max_kb.map(|kb| kb.saturating_mul(1024)));

    log::info!("Allowed extensions: {}", config.extensions.len());
    config
}

/// Canonical form used when editing the extension list.
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().to_lowercase()
}

/// Adds extensions not already present (case-insensitive). Returns how many were added.
pub fn add_extensions(config: &mut FileConfig, extensions: &[String]) -> usize {
    let mut added = 0;
    for ext in extensions.iter().map(|e| normalize_extension(e)) {
        if ext.is_empty() || config.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
            continue;
        }
        config.extensions.push(ext);
        added += 1;
    }
    added
}

/// Removes every case-insensitive match. Returns how many entries were removed.
pub fn remove_extensions(config: &mut FileConfig, extensions: &[String]) -> usize {
    let before = config.extensions.len();
    for ext in extensions.iter().map(|e| normalize_extension(e)) {
        config.extensions.retain(|e| !e.eq_ignore_ascii_case(&ext));
    }
    before - config.extensions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_missing_size_key_means_unlimited() {
        let config: FileConfig = toml::from_str("extensions = [\".rs\"]\n").unwrap();
        assert_eq!(config.extensions, vec![".rs"]);
        assert_eq!(config.max_file_size_kb, None);
        assert!(config.use_gitignore);
        assert_eq!(config.ignore_patterns, default_ignore_patterns());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = FileConfig::default();
        config.use_gitignore = false;

        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "extensions = 5").unwrap();

        assert!(matches!(
            load_config(&dir.path().join(CONFIG_FILE_NAME)),
            Err(ConfigError::Parse(..))
        ));
        assert_eq!(effective_config(dir.path()), FileConfig::default());
    }

    #[test]
    fn test_find_config_walks_upward_to_repo_root() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        assert_eq!(find_config_file(&nested), None);

        fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            find_config_file(&nested),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_project_file_wins_over_user_file() {
        let project = TempDir::new().unwrap();
        fs::create_dir(project.path().join(".git")).unwrap();
        let user = PathBuf::from("/home/someone/.config/contextcli/config.toml");

        assert_eq!(
            locate_config_with(project.path(), Some(user.clone())),
            Some(user.clone())
        );

        fs::write(project.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            locate_config_with(project.path(), Some(user)),
            Some(project.path().join(CONFIG_FILE_NAME))
        );
    }

    #[test]
    fn test_cli_overrides() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".gitignore"), "*.tmp\n").unwrap();

        let cli = Cli::parse_from([
            "contextcli",
            "--max-size",
            "2",
            "--depth",
            "3",
            "--no-ignore",
            "-i",
            "*.bak",
        ]);
        let file = FileConfig {
            extensions: vec![".RS".into(), "Dockerfile".into()],
            ignore_patterns: vec!["*.log".into()],
            ..FileConfig::default()
        };
        let scan = resolve_config(&cli, file, dir.path());

        assert_eq!(scan.max_file_size_bytes, Some(2048));
        assert_eq!(scan.max_depth, Some(3));
        assert!(scan.extensions.contains(".rs"));
        assert!(scan.extensions.contains("dockerfile"));
        assert!(scan.ignore.should_ignore("a.log", false));
        assert!(scan.ignore.should_ignore("a.bak", false));
        assert!(!scan.ignore.should_ignore("a.tmp", false));
    }

    #[test]
    fn test_edit_extension_list() {
        let mut config = FileConfig {
            extensions: vec![".rs".into()],
            ..FileConfig::default()
        };
        let added = add_extensions(&mut config, &[" .RAZOR ".into(), ".RS".into()]);
        assert_eq!(added, 1);
        assert_eq!(config.extensions, vec![".rs", ".razor"]);

        let removed = remove_extensions(&mut config, &[".Rs".into(), ".nope".into()]);
        assert_eq!(removed, 1);
        assert_eq!(config.extensions, vec![".razor"]);
    }
}
