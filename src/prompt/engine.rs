use std::collections::HashMap;

use tera::Value;

use crate::config::TemplateMetadata;
use crate::error::Result;
use crate::generate::components::{DOCKER_LABEL, GITHUB_ACTIONS_LABEL};
use crate::generate::DependencyManager;
use crate::prompt::Prompter;
use crate::variables::{split_list, VariableSet};

pub const DEFAULT_AUTHOR: &str = "Your Name";
pub const DEFAULT_VERSION: &str = "0.1.0";

const DATABASES: &[&str] = &["none", "sqlite", "postgresql", "mysql"];
const ORMS: &[&str] = &["sqlalchemy", "tortoise-orm"];
const DATA_LIBRARIES: &[&str] = &["numpy", "pandas", "matplotlib", "scikit-learn"];
const CLI_TOOLS: &[&str] = &["typer", "click"];

/// Extra questions asked for templates whose name contains one of `fragments`.
/// Only the first matching family applies.
struct TemplateFamily {
    fragments: &'static [&'static str],
    ask: fn(&mut Asker<'_>) -> Result<()>,
}

const TEMPLATE_FAMILIES: &[TemplateFamily] = &[
    TemplateFamily {
        fragments: &["fastapi", "flask"],
        ask: ask_web_questions,
    },
    TemplateFamily {
        fragments: &["data_science"],
        ask: ask_data_science_questions,
    },
    TemplateFamily {
        fragments: &["cli"],
        ask: ask_cli_questions,
    },
];

/// What a provider needs to know to assemble a variable set.
pub struct VariableRequest<'a> {
    pub template_name: &'a str,
    pub metadata: &'a TemplateMetadata,
    /// Offered as the default project name.
    pub default_name: String,
}

/// Produces the finished variable set for one render.
pub trait ConfigurationProvider {
    fn provide(&mut self, request: &VariableRequest<'_>) -> Result<VariableSet>;
}

/// Returns a prepared set unchanged.
pub struct FixedProvider(pub VariableSet);

impl ConfigurationProvider for FixedProvider {
    fn provide(&mut self, _request: &VariableRequest<'_>) -> Result<VariableSet> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Default, Clone)]
pub struct PromptOptions {
    /// Pre-supplied `KEY=VALUE` answers; these are never prompted for.
    pub data_overrides: HashMap<String, String>,
    pub default_author: Option<String>,
}

/// Asks the standard questions through a [`Prompter`].
pub struct PromptingProvider<'p> {
    prompter: &'p mut dyn Prompter,
    options: PromptOptions,
}

impl<'p> PromptingProvider<'p> {
    pub fn new(prompter: &'p mut dyn Prompter, options: PromptOptions) -> Self {
        Self { prompter, options }
    }
}

impl ConfigurationProvider for PromptingProvider<'_> {
    fn provide(&mut self, request: &VariableRequest<'_>) -> Result<VariableSet> {
        collect_variables(request, &self.options, &mut *self.prompter)
    }
}

pub fn collect_variables(
    request: &VariableRequest<'_>,
    options: &PromptOptions,
    prompter: &mut dyn Prompter,
) -> Result<VariableSet> {
    let mut asker = Asker {
        prompter,
        overrides: &options.data_overrides,
        values: VariableSet::new(),
    };

    asker.text("name", "Project name", &request.default_name)?;
    let author = options.default_author.as_deref().unwrap_or(DEFAULT_AUTHOR);
    asker.text("author", "Author name", author)?;
    asker.fixed("version", DEFAULT_VERSION);

    let managers: Vec<&str> = DependencyManager::ALL.iter().map(|m| m.name()).collect();
    asker.select("dep_manager", "Package manager", &managers, "poetry")?;

    if let Some(family) = TEMPLATE_FAMILIES
        .iter()
        .find(|f| f.fragments.iter().any(|frag| request.template_name.contains(frag)))
    {
        (family.ask)(&mut asker)?;
    }

    ask_components(&mut asker)?;
    asker.list("extra_libs", "Additional libraries (comma-separated, e.g., pydantic, httpx)")?;

    for (name, literal) in request.metadata.declared_variables() {
        if !asker.values.contains(name) {
            asker.text(name, &format!("Value for '{name}'"), literal)?;
        }
    }

    let Asker {
        overrides,
        mut values,
        ..
    } = asker;
    for (name, value) in overrides {
        if !values.contains(name) {
            values.insert(name.clone(), value.clone());
        }
    }

    Ok(values)
}

fn ask_web_questions(asker: &mut Asker<'_>) -> Result<()> {
    asker.select("database", "Database", DATABASES, "none")?;
    if asker.overrides.contains_key("orm") {
        asker.text("orm", "ORM library", "")?;
    } else if asker.prompter.confirm("Include ORM?", false)? {
        asker.select("orm", "ORM library", ORMS, "sqlalchemy")?;
    } else {
        asker.fixed("orm", "");
    }
    Ok(())
}

fn ask_data_science_questions(asker: &mut Asker<'_>) -> Result<()> {
    asker.multi("libraries", "Select libraries", DATA_LIBRARIES)
}

fn ask_cli_questions(asker: &mut Asker<'_>) -> Result<()> {
    asker.select("cli_tool", "CLI framework", CLI_TOOLS, "typer")
}

fn ask_components(asker: &mut Asker<'_>) -> Result<()> {
    if let Some(raw) = asker.overrides.get("components") {
        asker.values.insert("components", string_array(split_list(raw)));
        return Ok(());
    }

    let mut components = Vec::new();
    if asker.prompter.confirm("Include Docker?", false)? {
        components.push(DOCKER_LABEL.to_string());
    }
    if asker
        .prompter
        .confirm("Include CI/CD (GitHub Actions)?", false)?
    {
        components.push(GITHUB_ACTIONS_LABEL.to_string());
    }
    asker.values.insert("components", string_array(components));
    Ok(())
}

/// One question per variable, skipped when an override was supplied.
struct Asker<'a> {
    prompter: &'a mut dyn Prompter,
    overrides: &'a HashMap<String, String>,
    values: VariableSet,
}

impl Asker<'_> {
    fn overridden(&mut self, name: &str) -> bool {
        match self.overrides.get(name) {
            Some(value) => {
                self.values.insert(name, value.clone());
                true
            }
            None => false,
        }
    }

    fn fixed(&mut self, name: &str, value: &str) {
        if !self.overridden(name) {
            self.values.insert(name, value);
        }
    }

    fn text(&mut self, name: &str, message: &str, default: &str) -> Result<()> {
        if !self.overridden(name) {
            let answer = self.prompter.text(message, Some(default))?;
            self.values.insert(name, answer.trim().to_string());
        }
        Ok(())
    }

    fn select(&mut self, name: &str, message: &str, choices: &[&str], default: &str) -> Result<()> {
        if !self.overridden(name) {
            let choices: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
            let answer = self.prompter.select(message, &choices, Some(default))?;
            self.values.insert(name, answer);
        }
        Ok(())
    }

    fn multi(&mut self, name: &str, message: &str, choices: &[&str]) -> Result<()> {
        let picked = match self.overrides.get(name) {
            Some(raw) => split_list(raw),
            None => {
                let choices: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
                self.prompter.multi_select(message, &choices)?
            }
        };
        self.values.insert(name, string_array(picked));
        Ok(())
    }

    /// Free-text comma-separated list.
    fn list(&mut self, name: &str, message: &str) -> Result<()> {
        let raw = match self.overrides.get(name) {
            Some(raw) => raw.clone(),
            None => self.prompter.text(message, Some(""))?,
        };
        self.values.insert(name, string_array(split_list(&raw)));
        Ok(())
    }
}

fn string_array(items: Vec<String>) -> Value {
    Value::Array(items.into_iter().map(Value::String).collect())
}
