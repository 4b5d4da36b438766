//! Configuration: `.patternlint.toml` discovery, schema and validation.
//!
//! ```toml
//! [analysis]
//! assembly_name = "Shop.Domain"
//! nullable_default = true
//!
//! [analysis.library]
//! assembly_name = "Thinktecture.Runtime.Extensions"
//! namespace = "Thinktecture"
//! internal_namespace = "Thinktecture.Internal"
//!
//! [rules]
//! disabled = ["TTRESG020"]
//!
//! [fix]
//! max_iterations = 32
//! ```

mod core;
mod loader;
pub mod validation;

pub use self::core::{
    AnalysisSettings, FixSettings, IgnoreConfig, OutputConfig, PatternLintConfig, RuleSettings,
    SEVERITY_NONE,
};
pub use loader::{
    directory_ancestors, load_config, load_config_file, load_config_from, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
