//! Configuration validation with error accumulation.
//!
//! Every check runs and all problems are returned together, so a user sees
//! every configuration issue in a single run.

use std::path::PathBuf;

use super::core::{IgnoreConfig, PatternLintConfig, RuleSettings, SEVERITY_NONE};
use crate::diagnostics::Severity;
use crate::error::PatternLintError;
use crate::rules::DESCRIPTORS;

/// Validate the entire config, accumulating all errors.
///
/// ```rust
/// use patternlint::config::validation::validate_config;
/// use patternlint::config::PatternLintConfig;
///
/// assert!(validate_config(&PatternLintConfig::default()).is_empty());
/// ```
pub fn validate_config(config: &PatternLintConfig) -> Vec<PatternLintError> {
    let mut errors = Vec::new();
    errors.extend(validate_rule_settings(&config.rules));
    errors.extend(validate_ignore_patterns(config.ignore.as_ref()));
    errors.extend(validate_library(config));
    if config.fix.max_iterations == 0 {
        errors.push(PatternLintError::config(
            "fix.max_iterations must be at least 1",
            None,
        ));
    }
    if let Some(format) = config.output.as_ref().and_then(|o| o.default_format.as_deref()) {
        if !matches!(format, "terminal" | "json" | "markdown") {
            errors.push(PatternLintError::config(
                format!("output.default_format: unknown format '{format}' (expected terminal, json or markdown)"),
                None,
            ));
        }
    }
    errors
}

fn is_known_rule(id: &str) -> bool {
    DESCRIPTORS.iter().any(|d| d.id.eq_ignore_ascii_case(id))
}

fn validate_rule_settings(rules: &RuleSettings) -> Vec<PatternLintError> {
    let mut errors = Vec::new();

    for id in &rules.disabled {
        if !is_known_rule(id) {
            errors.push(PatternLintError::config(
                format!("rules.disabled: unknown rule id '{id}'"),
                None,
            ));
        }
    }

    for (id, value) in &rules.severity {
        if !is_known_rule(id) {
            errors.push(PatternLintError::config(
                format!("rules.severity: unknown rule id '{id}'"),
                None,
            ));
        }
        if !value.eq_ignore_ascii_case(SEVERITY_NONE) && Severity::parse(value).is_none() {
            errors.push(PatternLintError::config(
                format!("rules.severity.{id}: invalid severity '{value}' (expected info, warning, error or none)"),
                None,
            ));
        }
    }

    errors
}

fn validate_ignore_patterns(ignore: Option<&IgnoreConfig>) -> Vec<PatternLintError> {
    let Some(ignore) = ignore else {
        return Vec::new();
    };

    ignore
        .patterns
        .iter()
        .enumerate()
        .filter_map(|(i, pattern)| {
            glob::Pattern::new(pattern).err().map(|e| {
                PatternLintError::config(
                    format!("invalid ignore pattern #{}: '{}' - {}", i + 1, pattern, e),
                    None,
                )
            })
        })
        .collect()
}

fn validate_library(config: &PatternLintConfig) -> Vec<PatternLintError> {
    let library = &config.analysis.library;
    let mut errors = Vec::new();
    for (field, value) in [
        ("assembly_name", &library.assembly_name),
        ("namespace", &library.namespace),
        ("internal_namespace", &library.internal_namespace),
    ] {
        if value.trim().is_empty() {
            errors.push(PatternLintError::config(
                format!("analysis.library.{field} must not be empty"),
                None,
            ));
        }
    }
    errors
}

/// Validate that paths exist, accumulating all path errors.
pub fn validate_paths_exist(paths: &[PathBuf]) -> Vec<PatternLintError> {
    paths
        .iter()
        .filter(|path| !path.exists())
        .map(|path| {
            PatternLintError::from_io_error(
                std::io::Error::new(std::io::ErrorKind::NotFound, "path does not exist"),
                Some(path.clone()),
            )
        })
        .collect()
}
