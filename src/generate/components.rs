use std::path::{Path, PathBuf};

use crate::config::TemplateMetadata;
use crate::error::Result;
use crate::generate::dependencies::{DependencyManager, DEFAULT_MANAGER};
use crate::render::walker::{write_planned_file, PlannedFile};
use crate::render::DEFAULT_PROJECT_NAME;
use crate::report::Reporter;
use crate::variables::VariableSet;

pub const DOCKER_LABEL: &str = "Docker";
pub const GITHUB_ACTIONS_LABEL: &str = "CI/CD (GitHub Actions)";

const CI_WORKFLOW: &str = "\
name: CI
on: [push]
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v3
      - run: poetry install
      - run: poetry run pytest
";

/// Optional auxiliary files added to a rendered project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Docker,
    GithubActions,
}

impl Component {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            DOCKER_LABEL | "docker" => Some(Self::Docker),
            GITHUB_ACTIONS_LABEL | "ci" | "github-actions" => Some(Self::GithubActions),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Docker => DOCKER_LABEL,
            Self::GithubActions => GITHUB_ACTIONS_LABEL,
        }
    }

    pub fn relative_path(self) -> &'static str {
        match self {
            Self::Docker => "Dockerfile",
            Self::GithubActions => ".github/workflows/ci.yml",
        }
    }

    fn content(self, variables: &VariableSet, metadata: &TemplateMetadata) -> String {
        match self {
            Self::Docker => dockerfile(variables, metadata),
            Self::GithubActions => CI_WORKFLOW.to_string(),
        }
    }
}

/// Resolve the `components` variable. Unknown names are warned about and skipped.
pub fn selected_components(variables: &VariableSet, reporter: &dyn Reporter) -> Vec<Component> {
    let mut selected = Vec::new();
    for name in variables.get_list("components") {
        match Component::parse(&name) {
            Some(component) if !selected.contains(&component) => selected.push(component),
            Some(_) => {}
            None => reporter.warn(&format!("unsupported component '{name}', skipping")),
        }
    }
    selected
}

pub fn plan_component_files(
    variables: &VariableSet,
    metadata: &TemplateMetadata,
    reporter: &dyn Reporter,
) -> Vec<PlannedFile> {
    selected_components(variables, reporter)
        .into_iter()
        .map(|component| PlannedFile {
            relative_path: PathBuf::from(component.relative_path()),
            content: component.content(variables, metadata).into_bytes(),
            is_copy: false,
        })
        .collect()
}

/// Write every selected component file.
///
/// Each file is attempted even if an earlier one failed; the first error is
/// returned once all have been tried.
pub fn generate_component_files(
    output_dir: &Path,
    variables: &VariableSet,
    metadata: &TemplateMetadata,
    reporter: &dyn Reporter,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let mut first_error = None;

    for file in plan_component_files(variables, metadata, reporter) {
        match write_planned_file(&file, output_dir) {
            Ok(path) => written.push(path),
            Err(e) => {
                reporter.warn(&format!("failed to write {}", file.relative_path.display()));
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(written),
    }
}

fn dockerfile(variables: &VariableSet, metadata: &TemplateMetadata) -> String {
    let manager = variables
        .get_str("dep_manager")
        .unwrap_or(DEFAULT_MANAGER);
    let poetry = DependencyManager::parse(manager) == Some(DependencyManager::Poetry);
    let name = variables.get_str("name").unwrap_or(DEFAULT_PROJECT_NAME);
    let main_file = metadata.main_file_or_default();

    let (install, runner) = if poetry {
        ("pip install poetry && poetry install", "poetry run python")
    } else {
        ("pip install -r requirements.txt", "python")
    };

    format!(
        "FROM python:3.10-slim\n\
         COPY . /app\n\
         WORKDIR /app\n\
         RUN {install}\n\
         CMD [\"sh\", \"-c\", \"{runner} {name}/{main_file}\"]\n"
    )
}
