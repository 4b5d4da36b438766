use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = r#"# patternlint configuration

[analysis]
nullable_default = true
parallel = true

[analysis.library]
assembly_name = "Thinktecture.Runtime.Extensions"
namespace = "Thinktecture"
internal_namespace = "Thinktecture.Internal"

[rules]
disabled = []

[rules.severity]
# TTRESG032 = "error"

[fix]
max_iterations = 32
verify = true

[ignore]
patterns = [
    "bin/**",
    "obj/**",
]

[output]
default_format = "terminal"
"#;

pub fn init_config(force: bool) -> Result<()> {
    write_default_config(Path::new("."), force)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");
    Ok(())
}

fn write_default_config(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}
