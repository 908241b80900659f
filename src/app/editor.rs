use crate::app::process::ProcessLauncher;
use anyhow::{bail, Result};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A program plus the arguments that precede the file to edit.
#[derive(Debug, PartialEq)]
pub struct EditorCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

const FALLBACK_EDITORS: &[&str] = &["nano", "vim", "vi", "code", "gedit", "open"];

/// `editor_var` is the raw `$EDITOR`/`$VISUAL` value, if set.
pub fn discover_editor<L: ProcessLauncher>(
    editor_var: Option<&str>,
    launcher: &L,
) -> Option<EditorCommand> {
    if let Some(var) = editor_var {
        let mut parts = var.split_whitespace();
        if let Some(program) = parts.next() {
            return Some(EditorCommand {
                program: PathBuf::from(program),
                args: parts.map(OsString::from).collect(),
            });
        }
    }

    if cfg!(windows) {
        return Some(EditorCommand {
            program: PathBuf::from("notepad.exe"),
            args: Vec::new(),
        });
    }

    FALLBACK_EDITORS
        .iter()
        .find_map(|name| launcher.find_program(name))
        .map(|program| EditorCommand {
            program,
            args: Vec::new(),
        })
}

/// Opens `file` in the user's editor and waits for it to close.
pub fn open_in_editor<L: ProcessLauncher>(file: &Path, launcher: &L) -> Result<()> {
    let editor_var = env::var("EDITOR").or_else(|_| env::var("VISUAL")).ok();
    let Some(editor) = discover_editor(editor_var.as_deref(), launcher) else {
        bail!("Could not find a default editor (set EDITOR/VISUAL or ensure nano/vim/code is in PATH)");
    };

    let mut args = editor.args;
    args.push(file.as_os_str().to_os_string());

    log::info!(
        "Launched editor '{}'. Waiting for exit...",
        editor.program.display()
    );
    launcher.run(&editor.program, &args)?;
    log::info!("Editor closed.");
    Ok(())
}
