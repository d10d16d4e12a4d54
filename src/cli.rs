use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "blueprint",
    about = "Project scaffolding from templates, with repository import",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available templates
    List {
        /// Pick a template afterwards and create a project from it
        #[arg(long)]
        select: bool,
    },

    /// Create a project from a template
    Create {
        /// Template name
        template: String,

        /// Output directory (default: the project name)
        output_dir: Option<String>,

        /// Print the files that would be written without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Use default values without prompting
        #[arg(long)]
        defaults: bool,

        /// Set variable values (can be repeated: -d key=value)
        #[arg(short, long = "data", value_name = "KEY=VALUE")]
        data: Vec<String>,

        /// Replace an existing output directory without asking
        #[arg(long)]
        overwrite: bool,

        /// Skip the final confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Import a repository as a reusable template
    Import {
        /// Repository URL or abbreviation (gh:user/repo, gl:, bb:)
        url: String,
    },
}
