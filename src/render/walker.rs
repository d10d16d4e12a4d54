use std::path::{Component, Path, PathBuf};

use tera::Context;
use walkdir::WalkDir;

use crate::config::metadata::METADATA_FILE;
use crate::error::{BlueprintError, Result};
use crate::prompt::Prompter;
use crate::render::context::build_context;
use crate::render::file::{is_binary_content, render_file_content};
use crate::variables::VariableSet;

/// The one directory name that is substituted: it becomes the `name` variable.
pub const NAME_PLACEHOLDER: &str = "{{ name }}";

/// Used for the placeholder directory when `name` is unset.
pub const DEFAULT_PROJECT_NAME: &str = "unnamed";

#[derive(Debug)]
pub struct GeneratedProject {
    pub output_dir: PathBuf,
    pub files_created: Vec<PathBuf>,
    pub files_copied: Vec<PathBuf>,
}

/// A file that would be created during generation.
#[derive(Debug, Clone)]
pub struct PlannedFile {
    /// Path relative to the output directory.
    pub relative_path: PathBuf,
    /// The file content (rendered template or copied binary).
    pub content: Vec<u8>,
    /// Whether this file was copied verbatim (true) or rendered from a template (false).
    pub is_copy: bool,
}

/// The result of planning a generation without writing to disk.
#[derive(Debug, Default)]
pub struct GenerationPlan {
    /// Directories relative to the output directory, parents first.
    pub directories: Vec<PathBuf>,
    pub files: Vec<PlannedFile>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RenderOptions {
    /// Clear an existing output directory without asking.
    pub overwrite: bool,
}

#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(GeneratedProject),
    /// The operator declined to replace the existing output directory.
    Aborted,
}

/// Render `template_dir` into `output_dir`.
///
/// An existing output directory is only cleared after confirmation (or with
/// `overwrite`), and only once the whole template has rendered in memory.
pub fn render_template(
    template_dir: &Path,
    output_dir: &Path,
    variables: &VariableSet,
    options: RenderOptions,
    prompter: &mut dyn Prompter,
) -> Result<RenderOutcome> {
    let output_exists = output_dir.exists();
    if output_exists && !options.overwrite {
        let message = format!("Directory {} exists. Overwrite?", output_dir.display());
        if !prompter.confirm(&message, false)? {
            return Ok(RenderOutcome::Aborted);
        }
    }

    let plan = plan_render(template_dir, variables)?;

    if output_exists {
        clear_output(output_dir)?;
    }

    execute_plan(&plan, output_dir).map(RenderOutcome::Rendered)
}

/// Walk the template directory and collect rendered/copied files into memory without writing.
pub fn plan_render(template_dir: &Path, variables: &VariableSet) -> Result<GenerationPlan> {
    if !template_dir.exists() {
        return Err(BlueprintError::TemplatePathMissing {
            path: template_dir.to_path_buf(),
        });
    }

    let project_name =
        validate_project_name(variables.get_str("name").unwrap_or(DEFAULT_PROJECT_NAME))?;
    let context = build_context(variables);
    let mut plan = GenerationPlan::default();

    for entry in WalkDir::new(template_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| BlueprintError::Io {
            context: format!("walking template {}", template_dir.display()),
            source: e.into(),
        })?;
        let src_path = entry.path();
        let Ok(rel_path) = src_path.strip_prefix(template_dir) else {
            continue;
        };

        if rel_path == Path::new(METADATA_FILE) {
            continue;
        }

        let output_rel = output_relative_path(rel_path, project_name);

        if entry.file_type().is_dir() {
            plan.directories.push(output_rel);
            continue;
        }

        plan.files.push(plan_file(src_path, rel_path, output_rel, &context)?);
    }

    Ok(plan)
}

/// The placeholder directory is replaced by exactly one path component.
pub fn validate_project_name(name: &str) -> Result<&str> {
    let reason = if name == "." || name == ".." {
        Some("must not be '.' or '..'")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(BlueprintError::InvalidProjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(name),
    }
}

fn plan_file(
    src_path: &Path,
    rel_path: &Path,
    output_rel: PathBuf,
    context: &Context,
) -> Result<PlannedFile> {
    let bytes = std::fs::read(src_path).map_err(|e| BlueprintError::Io {
        context: format!("reading {}", src_path.display()),
        source: e,
    })?;

    // Binary and non-UTF-8 files are copied as-is.
    let content = match String::from_utf8(bytes) {
        Ok(text) if !is_binary_content(text.as_bytes()) => text,
        Ok(text) => return Ok(copied_file(output_rel, text.into_bytes())),
        Err(e) => return Ok(copied_file(output_rel, e.into_bytes())),
    };

    let template_name = rel_path.to_string_lossy().replace('\\', "/");
    let rendered = render_file_content(&template_name, &content, context)?;

    Ok(PlannedFile {
        relative_path: output_rel,
        content: rendered.into_bytes(),
        is_copy: false,
    })
}

fn copied_file(relative_path: PathBuf, content: Vec<u8>) -> PlannedFile {
    PlannedFile {
        relative_path,
        content,
        is_copy: true,
    }
}

/// Write the files from a generation plan to disk.
pub fn execute_plan(plan: &GenerationPlan, output_dir: &Path) -> Result<GeneratedProject> {
    create_dir(output_dir)?;
    for dir in &plan.directories {
        create_dir(&output_dir.join(dir))?;
    }

    let mut files_created = Vec::new();
    let mut files_copied = Vec::new();

    for file in &plan.files {
        write_planned_file(file, output_dir)?;
        if file.is_copy {
            files_copied.push(file.relative_path.clone());
        } else {
            files_created.push(file.relative_path.clone());
        }
    }

    Ok(GeneratedProject {
        output_dir: output_dir.to_path_buf(),
        files_created,
        files_copied,
    })
}

/// Write one planned file, creating its parent directories.
pub fn write_planned_file(file: &PlannedFile, output_dir: &Path) -> Result<PathBuf> {
    let dest_path = output_dir.join(&file.relative_path);
    if let Some(parent) = dest_path.parent() {
        create_dir(parent)?;
    }
    std::fs::write(&dest_path, &file.content).map_err(|e| BlueprintError::Io {
        context: format!("writing {}", dest_path.display()),
        source: e,
    })?;
    Ok(dest_path)
}

/// Only components named exactly like the placeholder are renamed.
fn output_relative_path(rel_path: &Path, project_name: &str) -> PathBuf {
    rel_path
        .components()
        .map(|component| match component {
            Component::Normal(part) if part == NAME_PLACEHOLDER => {
                std::ffi::OsStr::new(project_name)
            }
            other => other.as_os_str(),
        })
        .collect()
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| BlueprintError::Io {
        context: format!("creating directory {}", path.display()),
        source: e,
    })
}

fn clear_output(output_dir: &Path) -> Result<()> {
    let result = if output_dir.is_dir() {
        std::fs::remove_dir_all(output_dir)
    } else {
        std::fs::remove_file(output_dir)
    };
    result.map_err(|e| BlueprintError::Io {
        context: format!("clearing {}", output_dir.display()),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{Answer, ScriptedPrompter};
    use rstest::rstest;
    use std::fs;

    fn vars(name: &str) -> VariableSet {
        let mut vars = VariableSet::new();
        vars.insert("name", name);
        vars.insert("author", "Jane Doe");
        vars
    }

    fn template_with_placeholder() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let pkg = dir.path().join(NAME_PLACEHOLDER);
        fs::create_dir_all(pkg.join("sub")).unwrap();
        fs::write(pkg.join("cli.py"), "# {{ name }} by {{ author }}\n").unwrap();
        fs::write(pkg.join("sub/util.py"), "X = 1\n").unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/{{ author }}.md"), "doc").unwrap();
        fs::write(dir.path().join(METADATA_FILE), "description = \"t\"").unwrap();
        dir
    }

    #[test]
    fn output_path_renames_only_placeholder() {
        let rel = Path::new("{{ name }}/sub/{{ name }}.py");
        assert_eq!(
            output_relative_path(rel, "demo"),
            PathBuf::from("demo/sub/{{ name }}.py")
        );
    }

    #[test]
    fn plan_renames_placeholder_directory_and_skips_sidecar() {
        let template = template_with_placeholder();
        let plan = plan_render(template.path(), &vars("demo")).unwrap();

        let paths: Vec<PathBuf> = plan.files.iter().map(|f| f.relative_path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("docs/{{ author }}.md"),
                PathBuf::from("demo/cli.py"),
                PathBuf::from("demo/sub/util.py"),
            ]
        );
        assert!(plan.directories.contains(&PathBuf::from("demo/sub")));

        let cli = &plan.files[1];
        assert_eq!(
            String::from_utf8_lossy(&cli.content),
            "# demo by Jane Doe\n"
        );
    }

    #[test]
    fn plan_falls_back_to_unnamed() {
        let template = template_with_placeholder();
        let mut vars = VariableSet::new();
        vars.insert("author", "x");
        // cli.py needs `name`, so drop it from the tree for this check
        fs::remove_file(template.path().join(NAME_PLACEHOLDER).join("cli.py")).unwrap();

        let plan = plan_render(template.path(), &vars).unwrap();
        assert!(plan
            .files
            .iter()
            .any(|f| f.relative_path == Path::new("unnamed/sub/util.py")));
    }

    #[test]
    fn missing_template_is_not_found() {
        let result = plan_render(Path::new("/nonexistent/template"), &vars("demo"));
        assert!(matches!(
            result,
            Err(BlueprintError::TemplatePathMissing { .. })
        ));
    }

    #[test]
    fn declined_overwrite_leaves_directory_untouched() {
        let template = template_with_placeholder();
        let out = tempfile::tempdir().unwrap();
        fs::write(out.path().join("keep.txt"), "precious").unwrap();

        let mut prompter = ScriptedPrompter::new([Answer::Confirm(false)]);
        let outcome = render_template(
            template.path(),
            out.path(),
            &vars("demo"),
            RenderOptions::default(),
            &mut prompter,
        )
        .unwrap();

        assert!(matches!(outcome, RenderOutcome::Aborted));
        assert_eq!(
            fs::read_to_string(out.path().join("keep.txt")).unwrap(),
            "precious"
        );
        assert!(!out.path().join("demo").exists());
    }

    #[test]
    fn confirmed_overwrite_replaces_directory() {
        let template = template_with_placeholder();
        let out = tempfile::tempdir().unwrap();
        fs::write(out.path().join("stale.txt"), "old").unwrap();

        let mut prompter = ScriptedPrompter::new([Answer::Confirm(true)]);
        let outcome = render_template(
            template.path(),
            out.path(),
            &vars("demo"),
            RenderOptions::default(),
            &mut prompter,
        )
        .unwrap();

        let RenderOutcome::Rendered(project) = outcome else {
            panic!("expected a rendered project");
        };
        assert_eq!(project.files_created.len(), 3);
        assert!(!out.path().join("stale.txt").exists());
        assert!(out.path().join("demo/cli.py").exists());
        assert!(!out.path().join(METADATA_FILE).exists());
    }

    #[test]
    fn overwrite_option_skips_the_question() {
        let template = template_with_placeholder();
        let out = tempfile::tempdir().unwrap();

        let mut prompter = ScriptedPrompter::new([]);
        let outcome = render_template(
            template.path(),
            out.path(),
            &vars("demo"),
            RenderOptions { overwrite: true },
            &mut prompter,
        )
        .unwrap();

        assert!(matches!(outcome, RenderOutcome::Rendered(_)));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn undefined_placeholder_fails_before_writing() {
        let template = template_with_placeholder();
        fs::write(
            template.path().join(NAME_PLACEHOLDER).join("zz.py"),
            "{{ undefined_thing }}",
        )
        .unwrap();
        let parent = tempfile::tempdir().unwrap();
        let out = parent.path().join("project");

        let mut prompter = ScriptedPrompter::new([]);
        let result = render_template(
            template.path(),
            &out,
            &vars("demo"),
            RenderOptions::default(),
            &mut prompter,
        );

        match result {
            Err(BlueprintError::RenderError { file, .. }) => {
                assert!(file.ends_with("zz.py"), "unexpected file: {file}")
            }
            other => panic!("expected RenderError, got: {other:?}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn binary_files_are_copied_verbatim() {
        let template = tempfile::tempdir().unwrap();
        let bytes: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x00, 0x01, b'{', b'{'];
        fs::write(template.path().join("logo.png"), &bytes).unwrap();

        let plan = plan_render(template.path(), &vars("demo")).unwrap();
        assert_eq!(plan.files.len(), 1);
        assert!(plan.files[0].is_copy);
        assert_eq!(plan.files[0].content, bytes);
    }

    #[test]
    fn latin1_text_is_copied_verbatim() {
        let template = tempfile::tempdir().unwrap();
        let bytes = b"caf\xe9 = '{{ name }}'\n".to_vec();
        fs::write(template.path().join("legacy.py"), &bytes).unwrap();

        let plan = plan_render(template.path(), &vars("demo")).unwrap();
        assert!(plan.files[0].is_copy);
        assert_eq!(plan.files[0].content, bytes);
    }

    #[rstest]
    #[case("../escaped")]
    #[case("..")]
    #[case(".")]
    #[case("a/b")]
    #[case("a\\b")]
    fn project_name_cannot_leave_output_dir(#[case] name: &str) {
        let template = template_with_placeholder();
        let parent = tempfile::tempdir().unwrap();
        let out = parent.path().join("project");

        let result = render_template(
            template.path(),
            &out,
            &vars(name),
            RenderOptions::default(),
            &mut ScriptedPrompter::new([]),
        );

        assert!(matches!(
            result,
            Err(BlueprintError::InvalidProjectName { .. })
        ));
        assert!(!out.exists());
        assert!(!parent.path().join("escaped").exists());
    }

    #[test]
    fn dotted_project_names_are_allowed() {
        assert_eq!(validate_project_name("my.app").unwrap(), "my.app");
        assert_eq!(validate_project_name("..hidden").unwrap(), "..hidden");
    }
}
