mod args;
mod output;
mod verify;

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let emails: Vec<String> = if cli.stdin {
        let mut emails = Vec::new();
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            let email = line.trim();
            if !email.is_empty() {
                emails.push(email.to_string());
            }
        }
        emails
    } else if let Some(Commands::Verify { email }) = &cli.cmd {
        vec![email.clone()]
    } else {
        Cli::clap_command().print_help()?;
        println!();
        return Ok(());
    };

    let config = cli.build_config()?;
    let rows = verify::run(config, &emails).await?;
    output::write_reports(&rows, &cli)?;

    // codes de sortie : 0 tout délivrable, 2 sinon, 1 fatal
    if output::any_not_deliverable(&rows) {
        std::process::exit(2);
    }
    Ok(())
}
