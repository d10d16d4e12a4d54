use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BlueprintError, Result};

pub const TEMPLATES_DIR_ENV: &str = "BLUEPRINT_TEMPLATES_DIR";
pub const STARTER_DIR_ENV: &str = "BLUEPRINT_STARTER_DIR";

/// User-level configuration loaded from `~/.config/blueprint/config.toml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    /// Where user-created and imported templates live.
    pub templates_dir: Option<PathBuf>,

    /// Where the built-in starter templates live.
    pub starter_dir: Option<PathBuf>,

    /// Default offered for the author prompt.
    pub default_author: Option<String>,

    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Ordered rules suggesting a variable for a substring being templatized.
    #[serde(default)]
    pub suggestions: Vec<SuggestionRule>,
}

/// Suggest `variable` for any substring containing `contains`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRule {
    pub contains: String,
    pub variable: String,
}

impl ImportConfig {
    /// First matching rule wins.
    pub fn suggest(&self, literal: &str) -> Option<&str> {
        self.suggestions
            .iter()
            .find(|rule| literal.contains(&rule.contains))
            .map(|rule| rule.variable.as_str())
    }
}

/// The two directories templates are enumerated from, in scan order.
#[derive(Debug, Clone)]
pub struct TemplateRoots {
    pub user: PathBuf,
    pub starter: PathBuf,
}

impl TemplateRoots {
    pub fn new(user: impl Into<PathBuf>, starter: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            starter: starter.into(),
        }
    }

    /// Scan order; a template in a later root shadows one in an earlier root.
    pub fn scan_order(&self) -> [&Path; 2] {
        [self.user.as_path(), self.starter.as_path()]
    }

    /// Resolve roots from env vars, then the user config, then built-in defaults.
    pub fn resolve(config: &UserConfig) -> Result<Self> {
        let user = match std::env::var_os(TEMPLATES_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => match &config.templates_dir {
                Some(dir) => dir.clone(),
                None => default_templates_dir()?,
            },
        };

        let starter = match std::env::var_os(STARTER_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => config
                .starter_dir
                .clone()
                .unwrap_or_else(bundled_starter_dir),
        };

        Ok(Self { user, starter })
    }
}

fn default_templates_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join("blueprint").join("templates"))
        .ok_or_else(|| BlueprintError::Io {
            context: format!(
                "unable to determine templates directory: set {TEMPLATES_DIR_ENV} or ensure a home directory exists"
            ),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no data directory available",
            ),
        })
}

fn bundled_starter_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("starter_templates")
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("blueprint").join("config.toml"))
}

/// Load user configuration from the XDG config directory.
///
/// Returns defaults if the file does not exist, and an error if it exists but
/// cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    match config_path() {
        Some(path) if path.exists() => load_user_config_from(&path),
        _ => Ok(UserConfig::default()),
    }
}

pub fn load_user_config_from(path: &Path) -> Result<UserConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BlueprintError::Io {
        context: format!("reading user config {}", path.display()),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| BlueprintError::UserConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_user_config() {
        let toml_str = r#"
templates_dir = "/srv/templates"
default_author = "Ada"

[[import.suggestions]]
contains = "acme"
variable = "name"

[[import.suggestions]]
contains = "."
variable = "version"
"#;
        let config: UserConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.templates_dir, Some(PathBuf::from("/srv/templates")));
        assert!(config.starter_dir.is_none());
        assert_eq!(config.default_author.as_deref(), Some("Ada"));
        assert_eq!(config.import.suggestions.len(), 2);
    }

    #[test]
    fn parse_empty_config() {
        let config: UserConfig = toml::from_str("").unwrap();
        assert!(config.templates_dir.is_none());
        assert!(config.import.suggestions.is_empty());
    }

    #[test]
    fn suggestion_first_match_wins() {
        let import = ImportConfig {
            suggestions: vec![
                SuggestionRule {
                    contains: "acme".into(),
                    variable: "name".into(),
                },
                SuggestionRule {
                    contains: ".".into(),
                    variable: "version".into(),
                },
            ],
        };
        assert_eq!(import.suggest("acme.io"), Some("name"));
        assert_eq!(import.suggest("1.2.0"), Some("version"));
        assert_eq!(import.suggest("Jane"), None);
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "templates_dir = ").unwrap();

        let result = load_user_config_from(&path);
        assert!(matches!(result, Err(BlueprintError::UserConfigParse { .. })));
    }

    #[test]
    fn roots_prefer_config_over_defaults() {
        let config = UserConfig {
            templates_dir: Some(PathBuf::from("/a")),
            starter_dir: Some(PathBuf::from("/b")),
            ..Default::default()
        };
        if std::env::var_os(TEMPLATES_DIR_ENV).is_none()
            && std::env::var_os(STARTER_DIR_ENV).is_none()
        {
            let roots = TemplateRoots::resolve(&config).unwrap();
            assert_eq!(roots.user, PathBuf::from("/a"));
            assert_eq!(roots.starter, PathBuf::from("/b"));
        }
    }
}
