pub mod output;
pub mod walker;

pub use output::{create_writer, rules_table, OutputFormat, OutputWriter};
pub use walker::{find_source_files, FileWalker};

use crate::config::PatternLintConfig;
use crate::error::{PatternLintError, Result};
use crate::observability::{set_current_file, set_phase, AnalysisPhase};
use crate::semantic::{Assembly, Compilation};
use crate::syntax::SourceFile;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| PatternLintError::from_io_error(err, Some(path.to_path_buf())))
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|err| PatternLintError::from_io_error(err, Some(path.to_path_buf())))
}

/// A referenced assembly given as source: `NAME=DIR` or just `DIR`, in
/// which case the directory name is the assembly name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSpec {
    pub name: String,
    pub root: PathBuf,
}

impl ReferenceSpec {
    pub fn parse(value: &str) -> Self {
        match value.split_once('=') {
            Some((name, root)) if !name.is_empty() => Self {
                name: name.to_string(),
                root: PathBuf::from(root),
            },
            _ => {
                let root = PathBuf::from(value);
                let name = directory_name(&root);
                Self { name, root }
            }
        }
    }
}

fn directory_name(path: &Path) -> String {
    path.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| path.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "App".to_string())
}

/// Reads and parses every file, in parallel.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<Arc<SourceFile>>> {
    let _phase = set_phase(AnalysisPhase::Parsing);
    paths
        .par_iter()
        .map(|path| {
            let _file = set_current_file(path);
            let text = read_file(path)?;
            let file = SourceFile::parse(path.clone(), text);
            if file.has_errors() {
                tracing::debug!(path = %path.display(), "source has syntax errors");
            }
            Ok(Arc::new(file))
        })
        .collect()
}

fn load_assembly(name: String, root: &Path, config: &PatternLintConfig) -> Result<Assembly> {
    let paths = {
        let _phase = set_phase(AnalysisPhase::FileDiscovery);
        find_source_files(root, &config.get_ignore_patterns())?
    };
    Ok(Assembly::new(name, load_sources(&paths)?))
}

/// Builds the compilation for `root` and its referenced assemblies.
pub fn load_compilation(root: &Path, references: &[ReferenceSpec], config: &PatternLintConfig) -> Result<Compilation> {
    let name = config
        .analysis
        .assembly_name
        .clone()
        .unwrap_or_else(|| directory_name(root));
    let current = load_assembly(name, root, config)?;
    let references = references
        .iter()
        .map(|r| load_assembly(r.name.clone(), &r.root, config))
        .collect::<Result<Vec<_>>>()?;

    let _phase = set_phase(AnalysisPhase::SymbolCollection);
    Ok(Compilation::new(current, references, config.compilation_options()))
}
