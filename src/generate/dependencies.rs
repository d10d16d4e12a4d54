use std::path::{Path, PathBuf};

use crate::config::TemplateMetadata;
use crate::error::Result;
use crate::render::walker::{write_planned_file, PlannedFile};
use crate::render::DEFAULT_PROJECT_NAME;
use crate::report::Reporter;
use crate::variables::VariableSet;

/// Manager used when the `dep_manager` variable is unset.
pub const DEFAULT_MANAGER: &str = "poetry";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyManager {
    Poetry,
    Pip,
    Uv,
}

impl DependencyManager {
    pub const ALL: [DependencyManager; 3] = [Self::Poetry, Self::Pip, Self::Uv];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Poetry => "poetry",
            Self::Pip => "pip",
            Self::Uv => "uv",
        }
    }

    /// Manifest path relative to the output root.
    pub fn manifest_file(self) -> &'static str {
        match self {
            Self::Poetry => "pyproject.toml",
            Self::Pip | Self::Uv => "requirements.txt",
        }
    }

    /// Only the poetry manifest lists the ORM and CLI framework choices.
    fn includes_named_extras(self) -> bool {
        matches!(self, Self::Poetry)
    }
}

/// Merge metadata base deps, caller extras, then (poetry only) `orm` and `cli_tool`.
///
/// Blank entries and the literal `none` are dropped; duplicates keep their
/// first position.
pub fn collect_dependencies(
    manager: DependencyManager,
    variables: &VariableSet,
    metadata: &TemplateMetadata,
) -> Vec<String> {
    let mut candidates: Vec<String> = metadata.base_dependencies(manager.name()).to_vec();
    candidates.extend(variables.get_list("extra_libs"));
    if manager.includes_named_extras() {
        for key in ["orm", "cli_tool"] {
            if let Some(value) = variables.get_str(key) {
                candidates.push(value.to_string());
            }
        }
    }

    let mut deps: Vec<String> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim();
        if candidate.is_empty() || candidate.eq_ignore_ascii_case("none") {
            continue;
        }
        if !deps.iter().any(|d| d == candidate) {
            deps.push(candidate.to_string());
        }
    }
    deps
}

/// Build the manifest for the selected manager without writing it.
///
/// An unrecognized manager is reported as a warning and yields `None`.
pub fn plan_dependency_file(
    variables: &VariableSet,
    metadata: &TemplateMetadata,
    reporter: &dyn Reporter,
) -> Option<PlannedFile> {
    let manager_name = variables.get_str("dep_manager").unwrap_or(DEFAULT_MANAGER);
    let Some(manager) = DependencyManager::parse(manager_name) else {
        reporter.warn(&format!(
            "unsupported dependency manager '{manager_name}', skipping dependency file"
        ));
        return None;
    };

    let deps = collect_dependencies(manager, variables, metadata);
    let content = match manager {
        DependencyManager::Poetry => pyproject_manifest(variables, &deps),
        DependencyManager::Pip | DependencyManager::Uv => requirements_manifest(&deps),
    };

    Some(PlannedFile {
        relative_path: PathBuf::from(manager.manifest_file()),
        content: content.into_bytes(),
        is_copy: false,
    })
}

/// Write the dependency manifest into `output_dir`, returning its path if one was produced.
pub fn generate_dependency_file(
    output_dir: &Path,
    variables: &VariableSet,
    metadata: &TemplateMetadata,
    reporter: &dyn Reporter,
) -> Result<Option<PathBuf>> {
    plan_dependency_file(variables, metadata, reporter)
        .map(|file| write_planned_file(&file, output_dir))
        .transpose()
}

fn pyproject_manifest(variables: &VariableSet, deps: &[String]) -> String {
    let name = variables.get_str("name").unwrap_or(DEFAULT_PROJECT_NAME);
    let version = variables.get_str("version").unwrap_or("0.1.0");
    let author = variables.get_str("author").unwrap_or("Unknown");

    let mut out = String::new();
    out.push_str("[tool.poetry]\n");
    out.push_str(&format!("name = {}\n", quote(name)));
    out.push_str(&format!("version = {}\n", quote(version)));
    out.push_str("description = \"\"\n");
    out.push_str(&format!("authors = [{}]\n", quote(author)));
    out.push('\n');
    out.push_str("[tool.poetry.dependencies]\n");
    out.push_str("python = \"^3.10\"\n");
    for dep in deps {
        out.push_str(&format!("{} = \"*\"\n", key(dep)));
    }
    out
}

fn requirements_manifest(deps: &[String]) -> String {
    let mut out = deps.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn quote(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn key(name: &str) -> String {
    let bare = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if bare {
        name.to_string()
    } else {
        quote(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use rstest::rstest;
    use std::collections::BTreeMap;
    use tera::Value;

    fn metadata() -> TemplateMetadata {
        TemplateMetadata {
            dependencies: Some(BTreeMap::from([
                ("poetry".to_string(), vec!["typer".to_string()]),
                ("pip".to_string(), vec!["flask".to_string()]),
            ])),
            ..Default::default()
        }
    }

    fn vars(manager: &str) -> VariableSet {
        let mut vars = VariableSet::new();
        vars.insert("name", "demo");
        vars.insert("author", "Jane Doe");
        vars.insert("version", "0.2.0");
        vars.insert("dep_manager", manager);
        vars.insert(
            "extra_libs",
            Value::Array(vec![
                Value::from("httpx"),
                Value::from(""),
                Value::from("  "),
                Value::from("none"),
            ]),
        );
        vars.insert("orm", "sqlalchemy");
        vars.insert("cli_tool", "typer");
        vars
    }

    fn content(file: &PlannedFile) -> String {
        String::from_utf8(file.content.clone()).unwrap()
    }

    #[rstest]
    #[case("poetry", "pyproject.toml")]
    #[case("pip", "requirements.txt")]
    #[case("uv", "requirements.txt")]
    fn blank_extras_never_reach_the_manifest(#[case] manager: &str, #[case] file: &str) {
        let planned = plan_dependency_file(&vars(manager), &metadata(), &MemoryReporter::new())
            .expect("manifest planned");
        assert_eq!(planned.relative_path, PathBuf::from(file));

        let text = content(&planned);
        assert!(text.contains("httpx"));
        assert!(!text.contains("none"));
        assert!(!text.contains("\"\" = "));
    }

    #[rstest]
    #[case(DependencyManager::Poetry)]
    #[case(DependencyManager::Pip)]
    #[case(DependencyManager::Uv)]
    fn collected_dependencies_have_no_blanks(#[case] manager: DependencyManager) {
        let deps = collect_dependencies(manager, &vars(manager.name()), &metadata());
        assert!(deps.contains(&"httpx".to_string()));
        assert!(deps.iter().all(|d| !d.trim().is_empty()));
    }

    #[test]
    fn poetry_manifest_layout() {
        let planned =
            plan_dependency_file(&vars("poetry"), &metadata(), &MemoryReporter::new()).unwrap();
        let text = content(&planned);

        assert!(text.starts_with("[tool.poetry]\nname = \"demo\"\nversion = \"0.2.0\"\n"));
        assert!(text.contains("authors = [\"Jane Doe\"]"));
        assert!(text.contains("[tool.poetry.dependencies]\npython = \"^3.10\"\n"));
        // typer is both a base dependency and the cli_tool: listed once
        assert_eq!(text.matches("typer = \"*\"").count(), 1);
        assert!(text.contains("sqlalchemy = \"*\""));

        let parsed: toml::Value = toml::from_str(&text).unwrap();
        assert!(parsed["tool"]["poetry"]["dependencies"].get("httpx").is_some());
    }

    #[test]
    fn requirements_order_and_no_named_extras() {
        let deps = collect_dependencies(DependencyManager::Pip, &vars("pip"), &metadata());
        assert_eq!(deps, vec!["flask", "httpx"]);

        let planned =
            plan_dependency_file(&vars("pip"), &metadata(), &MemoryReporter::new()).unwrap();
        assert_eq!(content(&planned), "flask\nhttpx\n");
    }

    #[test]
    fn unset_manager_defaults_to_poetry() {
        let mut vars = VariableSet::new();
        vars.insert("name", "demo");
        let planned =
            plan_dependency_file(&vars, &TemplateMetadata::default(), &MemoryReporter::new())
                .unwrap();
        assert_eq!(planned.relative_path, PathBuf::from("pyproject.toml"));
    }

    #[test]
    fn unsupported_manager_warns_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = MemoryReporter::new();

        let written =
            generate_dependency_file(dir.path(), &vars("conda"), &metadata(), &reporter).unwrap();

        assert!(written.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(reporter.warnings().len(), 1);
        assert!(reporter.warnings()[0].contains("conda"));
    }

    #[test]
    fn generate_writes_at_output_root() {
        let dir = tempfile::tempdir().unwrap();
        let written = generate_dependency_file(
            dir.path(),
            &vars("uv"),
            &metadata(),
            &MemoryReporter::new(),
        )
        .unwrap();

        assert_eq!(written, Some(dir.path().join("requirements.txt")));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("requirements.txt")).unwrap(),
            "httpx\n"
        );
    }

    #[test]
    fn keys_with_spaces_are_quoted() {
        assert_eq!(key("tortoise-orm"), "tortoise-orm");
        assert_eq!(key("Tortoise ORM"), "\"Tortoise ORM\"");
    }
}
