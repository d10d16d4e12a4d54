use std::collections::HashMap;
use std::path::PathBuf;

use blueprint::config::{load_metadata, load_user_config, TemplateRoots};
use blueprint::prompt::{
    ConfigurationProvider, DefaultsPrompter, InquirePrompter, PromptOptions, Prompter,
    PromptingProvider, VariableRequest,
};
use blueprint::registry::find_template;
use blueprint::render::DEFAULT_PROJECT_NAME;
use blueprint::report::{ConsoleReporter, Reporter};
use blueprint::{create_project, plan_creation, CreateOptions, CreateOutcome};
use console::style;
use miette::Result;

pub struct CreateArgs {
    pub template: String,
    pub output_dir: Option<String>,
    pub dry_run: bool,
    pub defaults: bool,
    pub data: Vec<String>,
    pub overwrite: bool,
    pub yes: bool,
}

pub fn run(args: CreateArgs) -> Result<()> {
    let reporter = ConsoleReporter;
    let mut prompter: Box<dyn Prompter> = if args.defaults {
        Box::new(DefaultsPrompter)
    } else {
        Box::new(InquirePrompter)
    };

    let config = load_user_config()?;
    let roots = TemplateRoots::resolve(&config)?;
    let template_dir = find_template(&roots, &args.template)?;
    let metadata = load_metadata(&template_dir)?;

    let default_name = args
        .output_dir
        .as_deref()
        .and_then(|dir| {
            PathBuf::from(dir)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| args.template.clone());

    let options = PromptOptions {
        data_overrides: parse_data(&args.data, &reporter),
        default_author: config.default_author.clone(),
    };
    let request = VariableRequest {
        template_name: &args.template,
        metadata: &metadata,
        default_name,
    };
    let variables = PromptingProvider::new(prompter.as_mut(), options).provide(&request)?;

    println!("\n{}", style("Your project configuration:").bold());
    println!("{}", variables.summary());

    if !args.yes && !prompter.confirm("Proceed with this configuration?", true)? {
        println!("Aborted.");
        return Ok(());
    }

    let output_dir = PathBuf::from(args.output_dir.clone().unwrap_or_else(|| {
        variables
            .get_str("name")
            .unwrap_or(DEFAULT_PROJECT_NAME)
            .to_string()
    }));

    if args.dry_run {
        let plan = plan_creation(&template_dir, &output_dir, &variables, &metadata, &reporter)?;
        println!(
            "\n{} Dry run: files that would be generated in {}:",
            style("==>").cyan().bold(),
            style(plan.output_dir.display()).cyan()
        );
        for file in plan.files() {
            let action = if file.is_copy { "copy  " } else { "create" };
            println!("  {} {}", style(action).green(), file.relative_path.display());
        }
        println!(
            "\n{} Dry run: no files written.",
            style("\u{2139}").blue().bold()
        );
        return Ok(());
    }

    let options = CreateOptions {
        overwrite: args.overwrite,
    };
    match create_project(
        &template_dir,
        &output_dir,
        &variables,
        &metadata,
        options,
        prompter.as_mut(),
        &reporter,
    )? {
        CreateOutcome::Aborted => println!("Aborted."),
        CreateOutcome::Created(created) => {
            reporter.success(&format!(
                "Project created successfully at {}",
                style(output_dir.display()).cyan()
            ));
            println!(
                "  {} files rendered, {} files copied, {} generated",
                created.project.files_created.len(),
                created.project.files_copied.len(),
                created.dependency_file.iter().count() + created.component_files.len()
            );
            println!("Next steps: cd into your project and start coding!");
        }
    }

    Ok(())
}

fn parse_data(data: &[String], reporter: &dyn Reporter) -> HashMap<String, String> {
    data.iter()
        .filter_map(|kv| match kv.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Some((key.trim().to_string(), value.to_string()))
            }
            _ => {
                reporter.warn(&format!("ignoring '{kv}', expected KEY=VALUE"));
                None
            }
        })
        .collect()
}
