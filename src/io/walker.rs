use crate::error::{PatternLintError, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub const SOURCE_EXTENSION: &str = "cs";

/// Finds C# sources under a root, honouring `.gitignore` and configured
/// glob patterns.
pub struct FileWalker {
    root: PathBuf,
    ignore_patterns: Vec<glob::Pattern>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ignore_patterns: vec![],
        }
    }

    /// Invalid patterns are reported and skipped.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    tracing::warn!(pattern = %p, error = %err, "ignoring invalid ignore pattern");
                    None
                }
            })
            .collect();
        self
    }

    /// Matching files in path order.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry.map_err(|err| {
                PatternLintError::from_io_error(
                    err.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("unreadable directory entry")),
                    Some(self.root.clone()),
                )
            })?;
            let path = entry.path();
            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        tracing::debug!(root = %self.root.display(), files = files.len(), "discovered sources");
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some(SOURCE_EXTENSION) {
            return false;
        }
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        !self
            .ignore_patterns
            .iter()
            .any(|p| p.matches_path(relative) || p.matches_path(path))
    }
}

pub fn find_source_files(root: &Path, ignore_patterns: &[String]) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .with_ignore_patterns(ignore_patterns)
        .walk()
}
