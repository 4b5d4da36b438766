use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::PatternLintConfig;
use super::validation::validate_config;
use crate::error::{PatternLintError, Result};

/// File name looked up in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".patternlint.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parses and validates config from a TOML string.
pub fn parse_and_validate_config(contents: &str, path: &Path) -> Result<PatternLintConfig> {
    let config = toml::from_str::<PatternLintConfig>(contents).map_err(|e| {
        PatternLintError::config_parse(format!("failed to parse {CONFIG_FILE_NAME}: {e}"), path.to_path_buf())
    })?;
    let errors = validate_config(&config);
    if errors.is_empty() {
        return Ok(config);
    }
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(PatternLintError::config(message, Some(path.to_path_buf())))
}

/// Loads an explicitly named config file. Errors propagate.
pub fn load_config_file(path: &Path) -> Result<PatternLintConfig> {
    let contents =
        read_config_file(path).map_err(|e| PatternLintError::from_io_error(e, Some(path.to_path_buf())))?;
    let config = parse_and_validate_config(&contents, path)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Tries one candidate path during discovery. A missing file is silent; an
/// unreadable or invalid one is logged and skipped.
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<PatternLintConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_and_validate_config(&contents, config_path) {
        Ok(config) => {
            tracing::debug!(path = %config_path.display(), "loaded config");
            Some(config)
        }
        Err(e) => {
            tracing::warn!("{e}. Using defaults.");
            None
        }
    }
}

pub(crate) fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        tracing::warn!(
            path = %config_path.display(),
            error = %error,
            "failed to read config file"
        );
    }
}

/// `start` and its ancestors, nearest first, up to `max_depth` entries.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Nearest `.patternlint.toml` at or above `start`, or the defaults.
pub fn load_config_from(start: &Path) -> PatternLintConfig {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            tracing::debug!(
                depth = MAX_TRAVERSAL_DEPTH,
                "no config found, using defaults"
            );
            PatternLintConfig::default()
        })
}

pub fn load_config() -> PatternLintConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_from(&dir),
        Err(e) => {
            tracing::warn!("failed to get current directory: {e}. Using default config.");
            PatternLintConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn ancestors_stop_at_depth() {
        let dirs: Vec<PathBuf> = directory_ancestors(PathBuf::from("/a/b/c"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c"), PathBuf::from("/a/b")]);
    }

    #[test]
    fn finds_config_in_parent_directory() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("src").join("Domain");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            indoc! {r#"
                [analysis]
                assembly_name = "Shop"

                [rules]
                disabled = ["TTRESG020"]

                [rules.severity]
                TTRESG032 = "error"
            "#},
        )
        .unwrap();

        let config = load_config_from(&nested);
        assert_eq!(config.analysis.assembly_name.as_deref(), Some("Shop"));
        assert!(config.rules.is_disabled("TTRESG020"));
        assert_eq!(config.rules.severity.get("TTRESG032").map(String::as_str), Some("error"));
    }

    #[test]
    fn invalid_discovered_config_falls_back_to_defaults() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[rules]\ndisabled = [\"NOPE\"]\n",
        )
        .unwrap();
        assert_eq!(load_config_from(root.path()), PatternLintConfig::default());
    }

    #[test]
    fn explicit_config_errors_propagate() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("custom.toml");
        fs::write(&path, "[fix]\nmax_iterations = 0\n").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(err.is_user_fixable());
        assert!(err.to_string().contains("max_iterations"));

        let missing = load_config_file(&root.path().join("missing.toml")).unwrap_err();
        assert!(!missing.is_user_fixable());
    }
}
