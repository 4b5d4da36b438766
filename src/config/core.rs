use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::diagnostics::Severity;
use crate::semantic::{CompilationOptions, LibraryInfo};

/// Root configuration structure for patternlint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatternLintConfig {
    /// How sources are compiled and analysed
    #[serde(default)]
    pub analysis: AnalysisSettings,

    /// Rule selection and severity overrides
    #[serde(default)]
    pub rules: RuleSettings,

    /// Fix application
    #[serde(default)]
    pub fix: FixSettings,

    /// Ignore patterns
    #[serde(default)]
    pub ignore: Option<IgnoreConfig>,

    /// Output configuration
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

impl PatternLintConfig {
    /// Get ignore patterns from configuration
    ///
    /// Returns the glob patterns excluded from file discovery, or an empty
    /// vector when none are configured.
    ///
    /// # Examples
    ///
    /// ```
    /// use patternlint::config::PatternLintConfig;
    /// let config = PatternLintConfig::default();
    /// assert!(config.get_ignore_patterns().is_empty());
    /// ```
    pub fn get_ignore_patterns(&self) -> Vec<String> {
        self.ignore
            .as_ref()
            .map(|ig| ig.patterns.clone())
            .unwrap_or_default()
    }

    pub fn compilation_options(&self) -> CompilationOptions {
        CompilationOptions {
            nullable_default: self.analysis.nullable_default,
            library: self.analysis.library.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Name of the analysed assembly; the root directory name when unset.
    pub assembly_name: Option<String>,
    /// Nullable context when no `#nullable` directive applies.
    pub nullable_default: bool,
    pub library: LibraryInfo,
    /// Evaluate declarations on the rayon pool.
    pub parallel: bool,
    /// Worker threads; 0 uses rayon's default.
    pub jobs: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            assembly_name: None,
            nullable_default: true,
            library: LibraryInfo::default(),
            parallel: true,
            jobs: 0,
        }
    }
}

/// Per-rule configuration.
///
/// ```toml
/// [rules]
/// disabled = ["TTRESG020"]
///
/// [rules.severity]
/// TTRESG032 = "error"
/// TTRESG001 = "none"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSettings {
    pub disabled: Vec<String>,
    /// Rule id to `info`, `warning`, `error` or `none`.
    pub severity: BTreeMap<String, String>,
}

/// Severity value that turns a rule off.
pub const SEVERITY_NONE: &str = "none";

impl RuleSettings {
    pub fn is_disabled(&self, id: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(id))
            || self
                .override_for(id)
                .is_some_and(|value| value.eq_ignore_ascii_case(SEVERITY_NONE))
    }

    /// Effective severity for a rule, `None` when it is turned off.
    pub fn effective_severity(&self, id: &str, default: Severity) -> Option<Severity> {
        if self.is_disabled(id) {
            return None;
        }
        Some(
            self.override_for(id)
                .and_then(|value| Severity::parse(value))
                .unwrap_or(default),
        )
    }

    fn override_for(&self, id: &str) -> Option<&str> {
        self.severity
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(id))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixSettings {
    /// Upper bound on fix rounds per file in `fix_all`.
    pub max_iterations: usize,
    /// Re-run the catalogue after each fix and reject non-converging ones.
    pub verify: bool,
}

impl Default for FixSettings {
    fn default() -> Self {
        Self {
            max_iterations: 32,
            verify: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IgnoreConfig {
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub default_format: Option<String>,
    /// Enable colored output (default: auto-detect based on TTY)
    #[serde(default)]
    pub use_color: Option<bool>,
}
