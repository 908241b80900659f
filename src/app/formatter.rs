use crate::app::binary::dotted_extension;
use crate::app::models::FileRef;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Indentation for a tree line, one segment per ancestor directory.
pub fn tree_prefix(ancestors: &[bool]) -> String {
    ancestors
        .iter()
        .map(|&was_last| if was_last { "    " } else { "│   " })
        .collect()
}

/// Markdown fence tag for a file extension. Unknown extensions get an empty tag.
pub fn language_for(path: &Path) -> &'static str {
    let ext = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(dotted_extension)
        .unwrap_or_default();

    match ext.as_str() {
        ".cs" => "csharp",
        ".js" => "javascript",
        ".ts" => "typescript",
        ".py" => "python",
        ".java" => "java",
        ".go" => "go",
        ".rs" => "rust",
        ".php" => "php",
        ".rb" => "ruby",
        ".html" => "html",
        ".css" => "css",
        ".scss" => "scss",
        ".json" => "json",
        ".yaml" | ".yml" => "yaml",
        ".xml" => "xml",
        ".toml" => "toml",
        ".sh" => "bash",
        ".bat" => "batch",
        ".ps1" => "powershell",
        ".sql" => "sql",
        ".md" => "markdown",
        _ => "",
    }
}

pub struct OutputGenerator;

impl OutputGenerator {
    /// Fenced content blocks for every file, ordered by absolute path.
    pub fn generate_content(files: &[FileRef]) -> String {
        let mut sorted: Vec<&FileRef> = files.iter().collect();
        sorted.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));

        let mut output = String::new();
        for file in sorted {
            Self::append_file(file, &mut output);
        }
        output
    }

    fn append_file(file: &FileRef, output: &mut String) {
        output.push_str(&format!("## ./{}\n", file.relative_path));
        output.push_str(&format!("```{}\n", language_for(&file.path)));

        if let Err(e) = Self::append_lines(&file.path, output) {
            log::warn!(
                "Failed to read content of {}: {}",
                file.relative_path,
                e
            );
            output.push_str(&format!("[Error reading file: {}]\n", e));
        }

        output.push_str("```\n\n");
    }

    /// Copies the file line by line, decoding each line lossily. Lines already
    /// appended stay in place if a later read fails.
    fn append_lines(path: &Path, output: &mut String) -> std::io::Result<()> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(());
            }
            if line.ends_with(b"\n") {
                line.pop();
                if line.ends_with(b"\r") {
                    line.pop();
                }
            }
            output.push_str(&String::from_utf8_lossy(&line));
            output.push('\n');
        }
    }

    /// Assembles the final document. The content section is present only when
    /// `content` is `Some` and non-empty.
    pub fn format_full_output(tree: &str, content: Option<&str>) -> String {
        let mut out = String::from("# Project Files Structure\n\n");
        out.push_str(tree);
        out.push('\n');

        if let Some(content) = content.filter(|c| !c.is_empty()) {
            out.push_str("---\n\n# File Contents\n\n");
            out.push_str(content);
        }

        out
    }

    /// Document for single-file mode.
    pub fn format_single_file(name: &str, content: &str) -> String {
        format!("# File: {}\n\n```\n{}\n```", name, content)
    }
}
