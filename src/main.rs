mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    match Cli::parse().command {
        Commands::List { select } => commands::list::run(select),
        Commands::Create {
            template,
            output_dir,
            dry_run,
            defaults,
            data,
            overwrite,
            yes,
        } => commands::create::run(commands::create::CreateArgs {
            template,
            output_dir,
            dry_run,
            defaults,
            data,
            overwrite,
            yes,
        }),
        Commands::Import { url } => commands::import::run(url),
    }
}
