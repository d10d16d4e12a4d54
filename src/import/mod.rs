use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex_lite::Regex;
use walkdir::WalkDir;

use crate::config::user::ImportConfig;
use crate::config::{save_metadata, TemplateMetadata};
use crate::error::{BlueprintError, Result};
use crate::prompt::Prompter;
use crate::render::file::is_binary_content;
use crate::render::NAME_PLACEHOLDER;
use crate::report::Reporter;
use crate::template::{validate_repository_url, RepositoryFetcher};
use crate::variables::split_list;

pub const STANDARD_VARIABLES: &[&str] = &["name", "author", "version"];
pub const CUSTOM_CHOICE: &str = "custom (enter manually)";
pub const DEFAULT_IMPORT_AUTHOR: &str = "Unknown";
pub const DEFAULT_IMPORT_DESCRIPTION: &str = "No description";

const PREVIEW_FILES: usize = 3;
const PREVIEW_CHARS: usize = 200;
const STAGING_PREFIX: &str = ".import-";
const TEMPLATE_OPENERS: &[&str] = &["{{", "{%", "{#"];

/// A template written by [`import_repository`].
#[derive(Debug)]
pub struct ImportedTemplate {
    pub name: String,
    pub path: PathBuf,
    /// Paths relative to the template root.
    pub files: Vec<PathBuf>,
    pub metadata: TemplateMetadata,
    pub commit_sha: Option<String>,
}

#[derive(Debug)]
pub enum ImportOutcome {
    Imported(ImportedTemplate),
    /// The operator declined to replace an existing template.
    Aborted,
}

/// Turn a remote repository into a new template under `templates_root`.
///
/// Nothing is written to `templates_root` until every question has been
/// answered; the template is assembled in a hidden staging directory and
/// renamed into place at the end. The clone is removed on every exit path.
pub fn import_repository(
    locator: &str,
    templates_root: &Path,
    config: &ImportConfig,
    fetcher: &dyn RepositoryFetcher,
    prompter: &mut dyn Prompter,
    reporter: &dyn Reporter,
) -> Result<ImportOutcome> {
    let url = validate_repository_url(locator)?;

    reporter.step(&format!("Cloning {url}..."));
    let clone = fetcher.fetch(&url, reporter)?;

    let files = list_repository_files(clone.path())?;
    if files.is_empty() {
        return Err(BlueprintError::NoFilesInRepository { url });
    }

    let selected = prompter.multi_select("Select files to include in the template", &files)?;
    if selected.is_empty() {
        return Err(BlueprintError::EmptySelection);
    }

    for file in selected.iter().take(PREVIEW_FILES) {
        let preview = preview_file(&clone.path().join(file))?;
        reporter.info(&format!("{file}:\n{preview}"));
    }

    let literals =
        split_list(&prompter.text("Enter strings to templatize (comma-separated)", Some(""))?);
    let mut mapping = BTreeMap::new();
    for literal in literals {
        let variable = choose_variable(&literal, config, prompter, reporter)?;
        mapping.insert(literal, variable);
    }

    let name = prompter.text("Enter a name for this template", None)?;
    let name = validate_template_name(&name)?;
    let target = templates_root.join(&name);
    if target.exists()
        && !prompter.confirm(&format!("Template '{name}' already exists. Replace it?"), false)?
    {
        return Ok(ImportOutcome::Aborted);
    }

    let default_main = Path::new(&selected[0])
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| selected[0].clone());
    let main_file = answer_or(
        prompter.text("Main entry file", Some(&default_main))?,
        &default_main,
    );
    let author = answer_or(
        prompter.text("Author name", Some(DEFAULT_IMPORT_AUTHOR))?,
        DEFAULT_IMPORT_AUTHOR,
    );
    let description = answer_or(
        prompter.text("Template description", Some(DEFAULT_IMPORT_DESCRIPTION))?,
        DEFAULT_IMPORT_DESCRIPTION,
    );

    let metadata = TemplateMetadata {
        description: Some(description),
        author: Some(author),
        variables: (!mapping.is_empty()).then_some(mapping),
        dependencies: None,
        main_file: Some(main_file),
    };

    std::fs::create_dir_all(templates_root).map_err(|e| BlueprintError::Io {
        context: format!("creating templates directory {}", templates_root.display()),
        source: e,
    })?;
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(templates_root)
        .map_err(|e| BlueprintError::Io {
            context: format!("creating staging directory in {}", templates_root.display()),
            source: e,
        })?;

    let empty = BTreeMap::new();
    let substitutions = metadata.variables.as_ref().unwrap_or(&empty);
    let mut written = Vec::with_capacity(selected.len());
    for file in &selected {
        let relative = Path::new(NAME_PLACEHOLDER).join(file);
        let substituted = copy_with_substitution(
            &clone.path().join(file),
            &staging.path().join(&relative),
            substitutions,
        )?;
        if !substituted {
            reporter.warn(&format!(
                "{file} is not valid UTF-8; copied without substituting variables"
            ));
        }
        written.push(relative);
    }
    save_metadata(staging.path(), &metadata)?;

    if target.exists() {
        std::fs::remove_dir_all(&target).map_err(|e| BlueprintError::Io {
            context: format!("removing existing template {}", target.display()),
            source: e,
        })?;
    }
    std::fs::rename(staging.path(), &target).map_err(|e| BlueprintError::Io {
        context: format!("moving imported template into {}", target.display()),
        source: e,
    })?;

    reporter.success(&format!("Template '{name}' imported successfully."));

    Ok(ImportOutcome::Imported(ImportedTemplate {
        name,
        path: target,
        files: written,
        metadata,
        commit_sha: clone.commit_sha.clone(),
    }))
}

/// Regular files under `root`, relative with `/` separators, `.git` excluded.
pub fn list_repository_files(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| BlueprintError::Io {
            context: format!("walking repository: {e}"),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory walk error")),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(parts.join("/"));
    }
    Ok(files)
}

/// Replace each literal with its `{{ variable }}` placeholder in one pass.
///
/// At every position the longest matching literal wins, and inserted
/// placeholders are never rescanned. Text between placeholders that Tera
/// would parse (`${{ github.sha }}`, JSX braces) is kept in `{% raw %}` blocks.
pub fn substitute_literals(content: &str, mapping: &BTreeMap<String, String>) -> String {
    let literals = sorted_literals(mapping);

    let mut out = String::with_capacity(content.len());
    let mut verbatim_start = 0;
    let mut pos = 0;
    while let Some(ch) = content[pos..].chars().next() {
        let rest = &content[pos..];
        match literals.iter().find(|(literal, _)| rest.starts_with(literal)) {
            Some((literal, variable)) => {
                push_verbatim(&mut out, &content[verbatim_start..pos]);
                out.push_str(&format!("{{{{ {variable} }}}}"));
                pos += literal.len();
                verbatim_start = pos;
            }
            None => pos += ch.len_utf8(),
        }
    }
    push_verbatim(&mut out, &content[verbatim_start..]);
    out
}

fn sorted_literals(mapping: &BTreeMap<String, String>) -> Vec<(&str, &str)> {
    let mut literals: Vec<(&str, &str)> = mapping
        .iter()
        .filter(|(literal, _)| !literal.is_empty())
        .map(|(l, v)| (l.as_str(), v.as_str()))
        .collect();
    literals.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    literals
}

fn push_verbatim(out: &mut String, text: &str) {
    // a trailing '{' would merge with the next placeholder's braces
    let needs_raw = TEMPLATE_OPENERS.iter().any(|o| text.contains(o)) || text.ends_with('{');
    if needs_raw {
        out.push_str("{% raw %}");
        out.push_str(text);
        out.push_str("{% endraw %}");
    } else {
        out.push_str(text);
    }
}

pub fn is_valid_variable_name(name: &str) -> bool {
    static IDENT: OnceLock<Option<Regex>> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(name))
}

/// Trimmed template name, or why it cannot be used as a directory name.
pub fn validate_template_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(BlueprintError::EmptyTemplateName);
    }
    let reason = if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else if name.starts_with('.') {
        Some("must not start with '.'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(BlueprintError::InvalidTemplateName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(name.to_string()),
    }
}

fn choose_variable(
    literal: &str,
    config: &ImportConfig,
    prompter: &mut dyn Prompter,
    reporter: &dyn Reporter,
) -> Result<String> {
    let suggested = config.suggest(literal).unwrap_or("name");
    let standard = STANDARD_VARIABLES.contains(&suggested);

    let mut choices: Vec<String> = STANDARD_VARIABLES.iter().map(|s| s.to_string()).collect();
    choices.push(CUSTOM_CHOICE.to_string());
    let default_choice = if standard { suggested } else { CUSTOM_CHOICE };

    let choice = prompter.select(
        &format!("Map '{literal}' to which variable?"),
        &choices,
        Some(default_choice),
    )?;
    if choice != CUSTOM_CHOICE {
        return Ok(choice);
    }

    let custom_default = (!standard).then_some(suggested);
    loop {
        let custom = prompter.text(
            &format!("Enter custom variable name for '{literal}'"),
            custom_default,
        )?;
        let custom = custom.trim();
        if is_valid_variable_name(custom) {
            return Ok(custom.to_string());
        }
        reporter.warn(&format!(
            "'{custom}' is not a valid variable name; use letters, digits and underscores"
        ));
    }
}

fn answer_or(answer: String, default: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    }
}

fn preview_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| BlueprintError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })?;
    if is_binary_content(&bytes) {
        return Ok("(binary file)".to_string());
    }
    Ok(String::from_utf8_lossy(&bytes)
        .chars()
        .take(PREVIEW_CHARS)
        .collect())
}

/// Copy `src` to `dest`, substituting literals in text files.
///
/// Returns false when a literal occurs in a file that is not valid UTF-8 and
/// was therefore copied unchanged; the renderer copies such files verbatim.
fn copy_with_substitution(
    src: &Path,
    dest: &Path,
    mapping: &BTreeMap<String, String>,
) -> Result<bool> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BlueprintError::Io {
            context: format!("creating directory {}", parent.display()),
            source: e,
        })?;
    }

    let bytes = std::fs::read(src).map_err(|e| BlueprintError::Io {
        context: format!("reading {}", src.display()),
        source: e,
    })?;

    let (output, substituted) = if is_binary_content(&bytes) {
        (bytes, true)
    } else {
        match String::from_utf8(bytes) {
            Ok(text) => (substitute_literals(&text, mapping).into_bytes(), true),
            Err(e) => {
                let bytes = e.into_bytes();
                let skipped = sorted_literals(mapping)
                    .iter()
                    .any(|(literal, _)| contains_bytes(&bytes, literal.as_bytes()));
                (bytes, !skipped)
            }
        }
    };

    std::fs::write(dest, output).map_err(|e| BlueprintError::Io {
        context: format!("writing {}", dest.display()),
        source: e,
    })?;
    Ok(substituted)
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
