use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How much of a file is probed for a NUL byte.
pub const SNIFF_LEN: u64 = 4096;

/// Extensions assumed to be text without reading the file.
const TEXT_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".json", ".xml", ".yaml", ".yml", ".csv", ".html", ".css", ".js", ".ts",
    ".py", ".rb", ".php", ".pl", ".sh", ".bat", ".ps1", ".sql", ".java", ".cs", ".go", ".rs",
    ".c", ".cpp", ".h", ".hpp", ".csproj", ".sln", ".props", ".targets", ".gitignore",
    ".gitattributes",
];

/// The dotted, lower-cased extension of a file name: `"a.RS"` -> `".rs"`,
/// `".gitignore"` -> `".gitignore"`, `"Dockerfile"` -> `None`.
pub fn dotted_extension(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    if idx + 1 == name.len() {
        return None;
    }
    Some(name[idx..].to_lowercase())
}

/// Heuristic text/binary classification: a NUL byte in the first [`SNIFF_LEN`]
/// bytes means binary. Unreadable files count as binary.
pub fn is_likely_binary(path: &Path, len: u64) -> bool {
    if len == 0 {
        return false;
    }

    let is_known_text = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(dotted_extension)
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()));
    if is_known_text {
        return false;
    }

    let mut buf = Vec::with_capacity(len.min(SNIFF_LEN) as usize);
    let read = File::open(path).and_then(|f| f.take(SNIFF_LEN).read_to_end(&mut buf));
    match read {
        Ok(_) => buf.contains(&0),
        Err(e) => {
            log::debug!("Treating {} as binary, read failed: {}", path.display(), e);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> (std::path::PathBuf, u64) {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        (path, bytes.len() as u64)
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension("main.RS").as_deref(), Some(".rs"));
        assert_eq!(dotted_extension("a.tar.gz").as_deref(), Some(".gz"));
        assert_eq!(dotted_extension(".gitignore").as_deref(), Some(".gitignore"));
        assert_eq!(dotted_extension("Dockerfile"), None);
        assert_eq!(dotted_extension("trailing."), None);
    }

    #[test]
    fn test_empty_file_is_text() {
        let dir = TempDir::new().unwrap();
        let (path, len) = write(&dir, "empty.bin", b"");
        assert!(!is_likely_binary(&path, len));
    }

    #[test]
    fn test_null_byte_is_binary() {
        let dir = TempDir::new().unwrap();
        let (path, len) = write(&dir, "blob.dat", b"abc\0def");
        assert!(is_likely_binary(&path, len));
    }

    #[test]
    fn test_plain_bytes_are_text() {
        let dir = TempDir::new().unwrap();
        let (path, len) = write(&dir, "notes.cfg", b"key = value\n");
        assert!(!is_likely_binary(&path, len));
    }

    #[test]
    fn test_text_extension_skips_probe() {
        let dir = TempDir::new().unwrap();
        let (path, len) = write(&dir, "weird.txt", b"\0\0\0");
        assert!(!is_likely_binary(&path, len));
    }

    #[test]
    fn test_null_after_probe_window_is_missed() {
        let dir = TempDir::new().unwrap();
        let mut bytes = vec![b'a'; SNIFF_LEN as usize];
        bytes.push(0);
        let (path, len) = write(&dir, "late.dat", &bytes);
        assert!(!is_likely_binary(&path, len));
    }

    #[test]
    fn test_unreadable_is_binary() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone.dat");
        assert!(is_likely_binary(&missing, 10));
    }
}
