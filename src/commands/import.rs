use blueprint::config::{load_user_config, TemplateRoots};
use blueprint::import::{import_repository, ImportOutcome};
use blueprint::prompt::InquirePrompter;
use blueprint::report::ConsoleReporter;
use blueprint::template::GitFetcher;
use console::style;
use miette::Result;

pub fn run(url: String) -> Result<()> {
    let config = load_user_config()?;
    let roots = TemplateRoots::resolve(&config)?;

    let outcome = import_repository(
        &url,
        &roots.user,
        &config.import,
        &GitFetcher,
        &mut InquirePrompter,
        &ConsoleReporter,
    )?;

    match outcome {
        ImportOutcome::Imported(imported) => {
            println!(
                "  {} {} ({} file{})",
                style("saved to").dim(),
                imported.path.display(),
                imported.files.len(),
                if imported.files.len() == 1 { "" } else { "s" }
            );
            if let Some(sha) = &imported.commit_sha {
                println!("  {} {}", style("commit:").dim(), sha);
            }
        }
        ImportOutcome::Aborted => println!("Aborted."),
    }

    Ok(())
}
