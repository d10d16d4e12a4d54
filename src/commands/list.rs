use blueprint::config::{load_user_config, TemplateRoots};
use blueprint::registry::list_templates;
use blueprint::report::ConsoleReporter;
use console::style;
use miette::{IntoDiagnostic, Result};

use super::create::{self, CreateArgs};

pub fn run(select: bool) -> Result<()> {
    let config = load_user_config()?;
    let roots = TemplateRoots::resolve(&config)?;
    let templates = list_templates(&roots, &ConsoleReporter);

    if templates.is_empty() {
        println!(
            "No templates available. Use '{}' to add one.",
            style("blueprint import").cyan()
        );
        return Ok(());
    }

    println!(
        "{} ({} template{})\n",
        style("Available templates").bold(),
        templates.len(),
        if templates.len() == 1 { "" } else { "s" }
    );
    for (i, (name, description)) in templates.iter().enumerate() {
        println!("  {}. {}: {}", i + 1, style(name).cyan(), description);
    }

    if !select {
        return Ok(());
    }

    let names: Vec<String> = templates.into_keys().collect();
    let template = inquire::Select::new("Select a template:", names)
        .prompt()
        .into_diagnostic()?;

    create::run(CreateArgs {
        template,
        output_dir: None,
        dry_run: false,
        defaults: false,
        data: Vec::new(),
        overwrite: false,
        yes: false,
    })
}
