use anyhow::{bail, Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Seam for everything that starts an external program.
pub trait ProcessLauncher {
    /// Runs `program` with `args` and waits for it to exit.
    fn run(&self, program: &Path, args: &[OsString]) -> Result<()>;

    /// Runs `program` with `args`, writing `input` to its stdin.
    fn run_with_input(&self, program: &Path, args: &[OsString], input: &[u8]) -> Result<()>;

    /// Resolves a program name against `PATH`. Only executables qualify.
    fn find_program(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<()> {
        let status = Command::new(program)
            .args(args)
            .status()
            .with_context(|| format!("Failed to start {}", program.display()))?;
        if !status.success() {
            bail!("{} exited with {}", program.display(), status);
        }
        Ok(())
    }

    fn run_with_input(&self, program: &Path, args: &[OsString], input: &[u8]) -> Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start {}", program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input)
                .with_context(|| format!("Failed to write to {}", program.display()))?;
        }

        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {}", program.display()))?;
        if !status.success() {
            bail!("{} exited with {}", program.display(), status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    #[test]
    fn test_find_program_requires_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let program = dir.path().join("fake-editor");
        fs::write(&program, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&program, fs::Permissions::from_mode(0o644)).unwrap();

        let name = program.to_str().unwrap();
        assert_eq!(SystemLauncher.find_program(name), None);

        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(SystemLauncher.find_program(name).is_some());
    }

    #[test]
    fn test_find_program_misses_unknown_name() {
        assert_eq!(
            SystemLauncher.find_program("contextcli-no-such-program-on-path"),
            None
        );
    }
}
