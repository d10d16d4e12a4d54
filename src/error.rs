#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum BlueprintError {
    #[error("Template '{name}' not found")]
    #[diagnostic(help("Run `blueprint list` to see the available templates"))]
    TemplateNotFound { name: String },

    #[error("Template path not found: {path}")]
    TemplatePathMissing { path: PathBuf },

    #[error("Failed to parse template metadata {path}")]
    #[diagnostic(help("Check the TOML syntax in the template's .template.toml file"))]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize template metadata for {path}")]
    MetadataSerialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },

    #[error("Failed to parse user config {path}")]
    #[diagnostic(help("Check the TOML syntax in your blueprint config.toml"))]
    UserConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Template rendering failed for {file}")]
    #[diagnostic(help(
        "Check the Tera syntax and make sure every referenced variable has a value"
    ))]
    RenderError {
        file: String,
        #[source]
        source: tera::Error,
    },

    #[error("Invalid project name '{name}': {reason}")]
    #[diagnostic(help("The project name becomes a directory name; use a plain name like my_app"))]
    InvalidProjectName { name: String, reason: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Prompt cancelled by user")]
    PromptCancelled,

    #[error("No answer available for '{message}'")]
    #[diagnostic(help("Pass the value with -d KEY=VALUE or run interactively"))]
    PromptUnavailable { message: String },

    #[error("Invalid repository URL: {url}")]
    #[diagnostic(help(
        "Use an https:// URL on github.com, gitlab.com or bitbucket.org, or gh:user/repo"
    ))]
    InvalidRepositoryUrl { url: String },

    #[error("Unsafe URL scheme in '{url}': {reason}")]
    #[diagnostic(help("Use https:// URLs for remote repositories"))]
    UnsafeUrl { url: String, reason: String },

    #[error("Git clone failed for {url}: {reason}")]
    #[diagnostic(help("Check the URL and your network connection"))]
    GitClone { url: String, reason: String },

    #[error("No files found in repository {url}")]
    NoFilesInRepository { url: String },

    #[error("No files selected; nothing was imported")]
    EmptySelection,

    #[error("Template name cannot be empty")]
    EmptyTemplateName,

    #[error("Invalid template name '{name}': {reason}")]
    InvalidTemplateName { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, BlueprintError>;
