//! patternlint: compile-time governance for algebraic data type patterns in
//! C# sources.
//!
//! Declarations annotated with `SmartEnum`, `ValueObject`, `ComplexValueObject`
//! or `Union` attributes (and their `ObjectFactory` augmentations) are
//! classified, inspected for shape and checked against a catalogue of rules
//! `TTRESG001`-`TTRESG048`. Many diagnostics come with a fix that rewrites the
//! offending declaration.
//!
//! ```rust
//! use patternlint::engine::Engine;
//! use patternlint::semantic::Compilation;
//!
//! let c = Compilation::from_sources(
//!     "App",
//!     &[("Color.cs", "[SmartEnum<int>] public sealed partial class Color { public static readonly Color Red = default; }")],
//! );
//! let report = Engine::default().analyze(&c);
//! assert!(report.diagnostics.iter().all(|d| d.id != "TTRESG004"));
//! ```

// Export modules for library usage
pub mod cli;
pub mod common;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod fixes;
pub mod io;
pub mod observability;
pub mod patterns;
pub mod rules;
pub mod semantic;
pub mod shape;
pub mod syntax;

pub use crate::config::PatternLintConfig;
pub use crate::diagnostics::{AnalysisReport, Diagnostic, Severity};
pub use crate::engine::{Engine, FixRun};
pub use crate::error::{ErrorCode, PatternLintError, Result};
pub use crate::fixes::{select_fix, FixEdit, FixStrategy};
pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
pub use crate::patterns::{classify, Classification, PatternKind};
pub use crate::semantic::Compilation;
