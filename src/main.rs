use anyhow::Result;
use patternlint::cli::{self, Commands};
use patternlint::observability::install_panic_hook;

fn main() -> Result<()> {
    install_panic_hook();
    let cli = cli::parse_args();

    let success = match cli.command {
        Commands::Check {
            analysis,
            format,
            output,
        } => cli::handle_check_command(analysis, format, output)?,
        Commands::Fix {
            analysis,
            dry_run,
            no_verify,
            format,
            output,
        } => cli::handle_fix_command(analysis, dry_run, no_verify, format, output)?,
        Commands::Rules => {
            cli::handle_rules_command()?;
            true
        }
        Commands::Init { force } => {
            cli::init_config(force)?;
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
