use crate::app::cli::ConfigCommand;
use crate::app::config::{
    add_extensions, default_extensions, effective_config, find_config_file, load_config,
    locate_config, remove_extensions, save_config, FileConfig, CONFIG_FILE_NAME,
};
use crate::app::editor::open_in_editor;
use crate::app::process::ProcessLauncher;
use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};

/// Handles `contextcli config <subcommand>` relative to `cwd`.
pub fn run_config_command<L: ProcessLauncher>(
    command: &ConfigCommand,
    cwd: &Path,
    launcher: &L,
) -> Result<()> {
    match command {
        ConfigCommand::Edit => edit(cwd, locate_config(cwd), launcher),
        ConfigCommand::Show => {
            let config = effective_config(cwd);
            let rendered =
                toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("{}", rendered);
            Ok(())
        }
        ConfigCommand::Path => {
            match locate_config(cwd) {
                Some(path) => println!("Configuration file found at: {}", path.display()),
                None => println!(
                    "No configuration file ({}) found in the current directory or parent directories.",
                    CONFIG_FILE_NAME
                ),
            }
            Ok(())
        }
        ConfigCommand::Init => init(cwd).map(|_| ()),
        ConfigCommand::ListExtensions => {
            let config = effective_config(cwd);
            println!("Configured extensions:");
            if config.extensions.is_empty() {
                println!("(No extensions configured)");
            }
            for ext in &config.extensions {
                println!("- {}", ext);
            }
            Ok(())
        }
        ConfigCommand::AddExtension { extensions } => {
            modify(locate_config(cwd), |config| {
                let added = add_extensions(config, extensions);
                if added == 0 {
                    println!("No new extensions were added (they might already exist).");
                } else {
                    println!("Added {} extension(s).", added);
                }
                added > 0
            })
        }
        ConfigCommand::RemoveExtension { extensions } => {
            modify(locate_config(cwd), |config| {
                let removed = remove_extensions(config, extensions);
                if removed == 0 {
                    println!("No extensions were removed (they might not have existed).");
                } else {
                    println!("Removed {} extension(s).", removed);
                }
                removed > 0
            })
        }
        ConfigCommand::ResetExtensions => modify(locate_config(cwd), |config| {
            config.extensions = default_extensions();
            println!("Reset extensions to default.");
            true
        }),
    }
}

/// Writes a default config into `cwd`. Returns `None` if one already exists there.
pub fn init(cwd: &Path) -> Result<Option<PathBuf>> {
    let target = cwd.join(CONFIG_FILE_NAME);
    if target.exists() {
        println!("Configuration file '{}' already exists.", target.display());
        return Ok(None);
    }

    if let Some(higher) = find_config_file(cwd) {
        log::info!(
            "Note: Another config file exists higher up at '{}'.",
            higher.display()
        );
    }

    save_config(&FileConfig::default(), &target)?;
    println!("Created default configuration file at '{}'.", target.display());
    Ok(Some(target))
}

/// `located` is the file currently in effect (project or user-level).
fn edit<L: ProcessLauncher>(cwd: &Path, located: Option<PathBuf>, launcher: &L) -> Result<()> {
    let path = match located {
        Some(path) => {
            log::info!("Found configuration file at: {}", path.display());
            path
        }
        None => {
            let path = cwd.join(CONFIG_FILE_NAME);
            log::info!(
                "Configuration file not found. Creating default '{}' for editing.",
                CONFIG_FILE_NAME
            );
            save_config(&FileConfig::default(), &path)?;
            path
        }
    };

    open_in_editor(&path, launcher)?;

    if let Err(e) = load_config(&path) {
        log::warn!("Edited configuration is not valid: {}", e);
    }
    Ok(())
}

/// Loads the config in effect (`located`), applies `change`, and saves it when
/// `change` reports a modification.
fn modify<F>(located: Option<PathBuf>, change: F) -> Result<()>
where
    F: FnOnce(&mut FileConfig) -> bool,
{
    let path = located.ok_or_else(|| {
        anyhow!(
            "No configuration file ({}) found to modify. Run 'contextcli config init' to create one first.",
            CONFIG_FILE_NAME
        )
    })?;
    log::info!("Modifying configuration file: {}", path.display());

    let mut config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => bail!("Refusing to modify an unreadable configuration: {}", e),
    };

    if change(&mut config) {
        save_config(&config, &path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::locate_config_with;
    use crate::app::process::SystemLauncher;
    use std::ffi::OsString;
    use std::fs;
    use tempfile::TempDir;

    /// Pretends every program exists and exits cleanly.
    struct RecordingLauncher;

    impl ProcessLauncher for RecordingLauncher {
        fn run(&self, _program: &Path, _args: &[OsString]) -> Result<()> {
            Ok(())
        }

        fn run_with_input(&self, _program: &Path, _args: &[OsString], _input: &[u8]) -> Result<()> {
            Ok(())
        }

        fn find_program(&self, name: &str) -> Option<PathBuf> {
            Some(PathBuf::from(name))
        }
    }

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = repo();
        let created = init(dir.path()).unwrap();
        assert_eq!(created, Some(dir.path().join(CONFIG_FILE_NAME)));
        assert_eq!(init(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_modify_requires_existing_file() {
        let dir = repo();
        let located = locate_config_with(dir.path(), None);
        let err = modify(located, |_| true).unwrap_err();
        assert!(err.to_string().contains("config init"));
    }

    #[test]
    fn test_user_level_file_is_modified_without_project_file() {
        let project = repo();
        let home = TempDir::new().unwrap();
        let user_file = home.path().join("config.toml");
        save_config(&FileConfig::default(), &user_file).unwrap();

        let located = locate_config_with(project.path(), Some(user_file.clone()));
        modify(located, |config| {
            add_extensions(config, &[".vue".to_string()]) > 0
        })
        .unwrap();

        assert!(load_config(&user_file)
            .unwrap()
            .extensions
            .contains(&".vue".to_string()));
        assert!(!project.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_edit_opens_user_level_file() {
        let project = repo();
        let home = TempDir::new().unwrap();
        let user_file = home.path().join("config.toml");
        save_config(&FileConfig::default(), &user_file).unwrap();

        let located = locate_config_with(project.path(), Some(user_file.clone()));
        edit(project.path(), located, &RecordingLauncher).unwrap();

        assert!(!project.path().join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_add_remove_reset_persist() {
        let dir = repo();
        init(dir.path()).unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let add = ConfigCommand::AddExtension {
            extensions: vec![".VUE".into()],
        };
        run_config_command(&add, dir.path(), &SystemLauncher).unwrap();
        assert!(load_config(&path).unwrap().extensions.contains(&".vue".to_string()));

        let remove = ConfigCommand::RemoveExtension {
            extensions: vec![".vue".into(), ".rs".into()],
        };
        run_config_command(&remove, dir.path(), &SystemLauncher).unwrap();
        let config = load_config(&path).unwrap();
        assert!(!config.extensions.contains(&".vue".to_string()));
        assert!(!config.extensions.contains(&".rs".to_string()));

        run_config_command(&ConfigCommand::ResetExtensions, dir.path(), &SystemLauncher)
            .unwrap();
        assert_eq!(load_config(&path).unwrap().extensions, default_extensions());
    }
}
