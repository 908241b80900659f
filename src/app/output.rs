use crate::app::process::ProcessLauncher;
use anyhow::{anyhow, Result};
use std::ffi::OsString;

/// Destination for the assembled document.
pub trait OutputSink {
    fn deliver(&self, document: &str) -> Result<()>;
}

pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn deliver(&self, document: &str) -> Result<()> {
        println!("{}", document);
        Ok(())
    }
}

/// Pipes the document into the first clipboard program found on this system.
pub struct ClipboardSink<'a, L: ProcessLauncher> {
    launcher: &'a L,
}

impl<'a, L: ProcessLauncher> ClipboardSink<'a, L> {
    pub fn new(launcher: &'a L) -> Self {
        Self { launcher }
    }
}

type ClipboardProgram = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const CLIPBOARD_PROGRAMS: &[ClipboardProgram] = &[("pbcopy", &[])];

#[cfg(windows)]
const CLIPBOARD_PROGRAMS: &[ClipboardProgram] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", windows)))]
const CLIPBOARD_PROGRAMS: &[ClipboardProgram] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

impl<L: ProcessLauncher> OutputSink for ClipboardSink<'_, L> {
    fn deliver(&self, document: &str) -> Result<()> {
        for (name, args) in CLIPBOARD_PROGRAMS {
            let Some(program) = self.launcher.find_program(name) else {
                continue;
            };
            let args: Vec<OsString> = args.iter().map(OsString::from).collect();
            return self
                .launcher
                .run_with_input(&program, &args, document.as_bytes());
        }
        Err(anyhow!("no clipboard program found"))
    }
}
