use std::path::Path;

use tracing::warn;

use crate::types::CodeFileMap;

const SKIP_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "venv",
    "__pycache__",
    ".venv",
    "dist",
    "build",
];

const ALLOWED_EXTENSIONS: &[&str] = &[
    "go", "py", "js", "ts", "jsx", "tsx", "java", "rb", "php", "cs", "c", "cpp", "cc", "h", "hpp",
];

const MAX_FILE_BYTES: u64 = 1024 * 1024;

fn skip_dir(name: &str) -> bool {
    name.starts_with('.') || SKIP_DIRS.contains(&name)
}

fn allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Walks `root` synchronously and builds the Code File Map.
///
/// Returns an empty map if no files survive filtering; this is not an
/// error — the scan stage handles an empty map on its own.
pub fn collect(root: &str) -> CodeFileMap {
    let mut files = CodeFileMap::new();
    walk(Path::new(root), Path::new(root), &mut files);
    files
}

fn walk(root: &Path, dir: &Path, out: &mut CodeFileMap) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot read directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat entry");
                continue;
            }
        };

        if file_type.is_dir() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if skip_dir(&name) {
                continue;
            }
            walk(root, &path, out);
            continue;
        }

        if !file_type.is_file() {
            continue;
        }

        if !allowed_extension(&path) {
            continue;
        }

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat file");
                continue;
            }
        };
        if metadata.len() > MAX_FILE_BYTES {
            continue;
        }

        match std::fs::read(&path) {
            Ok(content) => {
                let rel = path
                    .strip_prefix(root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .into_owned();
                out.insert(rel, content);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable file, skipping");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn collects_allowed_extensions_and_skips_everything_else() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        fs::write(root.join("main.go"), b"package main").unwrap();
        fs::write(root.join("README.md"), b"# readme").unwrap();
        fs::create_dir(root.join("node_modules")).unwrap();
        fs::write(root.join("node_modules").join("lib.js"), b"ignored").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git").join("config.js"), b"ignored").unwrap();
        fs::create_dir(root.join("src")).unwrap();
        fs::write(root.join("src").join("app.py"), b"print(1)").unwrap();

        let files = collect(root.to_str().unwrap());
        assert_eq!(files.len(), 2);
        assert!(files.contains_key("main.go"));
        assert!(files.contains_key(&format!("src{}app.py", std::path::MAIN_SEPARATOR)));
    }

    #[test]
    fn skips_files_larger_than_one_mebibyte() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let big = vec![b'a'; (MAX_FILE_BYTES + 1) as usize];
        fs::write(root.join("big.go"), &big).unwrap();
        fs::write(root.join("small.go"), b"ok").unwrap();

        let files = collect(root.to_str().unwrap());
        assert_eq!(files.len(), 1);
        assert!(files.contains_key("small.go"));
    }

    #[test]
    fn empty_tree_yields_empty_map_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = collect(dir.path().to_str().unwrap());
        assert!(files.is_empty());
    }

    #[test]
    fn hidden_directories_are_skipped_regardless_of_name() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(".hidden")).unwrap();
        fs::write(root.join(".hidden").join("x.go"), b"x").unwrap();
        let files = collect(root.to_str().unwrap());
        assert!(files.is_empty());
    }
}
