pub mod config;
pub mod error;
pub mod generate;
pub mod import;
pub mod prompt;
pub mod registry;
pub mod render;
pub mod report;
pub mod template;
pub mod variables;

use std::path::{Path, PathBuf};

use crate::config::TemplateMetadata;
use crate::error::Result;
use crate::generate::{generate_component_files, generate_dependency_file};
use crate::generate::{plan_component_files, plan_dependency_file};
use crate::prompt::Prompter;
use crate::render::{
    plan_render, render_template, GeneratedProject, GenerationPlan, PlannedFile, RenderOptions,
    RenderOutcome,
};
use crate::report::Reporter;
use crate::variables::VariableSet;

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateOptions {
    /// Clear an existing output directory without asking.
    pub overwrite: bool,
}

/// Everything `create_project` would write, computed without touching the disk.
#[derive(Debug)]
pub struct CreationPlan {
    pub output_dir: PathBuf,
    pub render_plan: GenerationPlan,
    /// Dependency manifest and component files, relative to the output root.
    pub generated: Vec<PlannedFile>,
}

impl CreationPlan {
    pub fn files(&self) -> impl Iterator<Item = &PlannedFile> {
        self.render_plan.files.iter().chain(&self.generated)
    }
}

#[derive(Debug)]
pub struct CreatedProject {
    pub project: GeneratedProject,
    pub dependency_file: Option<PathBuf>,
    pub component_files: Vec<PathBuf>,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(CreatedProject),
    Aborted,
}

/// Dry run: render in memory and build the generated files, writing nothing.
pub fn plan_creation(
    template_dir: &Path,
    output_dir: &Path,
    variables: &VariableSet,
    metadata: &TemplateMetadata,
    reporter: &dyn Reporter,
) -> Result<CreationPlan> {
    let render_plan = plan_render(template_dir, variables)?;

    let mut generated = Vec::new();
    generated.extend(plan_dependency_file(variables, metadata, reporter));
    generated.extend(plan_component_files(variables, metadata, reporter));

    Ok(CreationPlan {
        output_dir: output_dir.to_path_buf(),
        render_plan,
        generated,
    })
}

/// Render the template, then write the dependency manifest and component files.
pub fn create_project(
    template_dir: &Path,
    output_dir: &Path,
    variables: &VariableSet,
    metadata: &TemplateMetadata,
    options: CreateOptions,
    prompter: &mut dyn Prompter,
    reporter: &dyn Reporter,
) -> Result<CreateOutcome> {
    reporter.step("Creating project structure...");
    let render_options = RenderOptions {
        overwrite: options.overwrite,
    };
    let rendered = render_template(template_dir, output_dir, variables, render_options, prompter)?;
    let project = match rendered {
        RenderOutcome::Rendered(project) => project,
        RenderOutcome::Aborted => return Ok(CreateOutcome::Aborted),
    };

    let dependency_file = generate_dependency_file(output_dir, variables, metadata, reporter)?;
    if let Some(path) = &dependency_file {
        reporter.step(&format!("Wrote {}", path.display()));
    }

    let component_files = generate_component_files(output_dir, variables, metadata, reporter)?;

    Ok(CreateOutcome::Created(CreatedProject {
        project,
        dependency_file,
        component_files,
    }))
}
