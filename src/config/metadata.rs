use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BlueprintError, Result};

/// File name of the metadata sidecar stored at a template's root.
pub const METADATA_FILE: &str = ".template.toml";

pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_MAIN_FILE: &str = "main.py";

/// Per-template descriptor. Every field is optional; unset fields are not written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TemplateMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Literal substring in the source files -> variable name it was replaced with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, String>>,

    /// Package manager name -> base dependency list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<BTreeMap<String, Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_file: Option<String>,
}

impl TemplateMetadata {
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }

    pub fn main_file_or_default(&self) -> &str {
        self.main_file.as_deref().unwrap_or(DEFAULT_MAIN_FILE)
    }

    pub fn base_dependencies(&self, manager: &str) -> &[String] {
        self.dependencies
            .as_ref()
            .and_then(|deps| deps.get(manager))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Variable names introduced by substring substitution, in a stable order.
    pub fn declared_variables(&self) -> Vec<(&str, &str)> {
        self.variables
            .iter()
            .flatten()
            .map(|(literal, name)| (name.as_str(), literal.as_str()))
            .collect()
    }
}

/// Load the sidecar. A missing file is valid and yields the default record.
pub fn load_metadata(template_dir: &Path) -> Result<TemplateMetadata> {
    let path = template_dir.join(METADATA_FILE);
    if !path.exists() {
        return Ok(TemplateMetadata::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| BlueprintError::Io {
        context: format!("reading template metadata {}", path.display()),
        source: e,
    })?;

    toml::from_str(&content).map_err(|e| BlueprintError::MetadataParse { path, source: e })
}

/// Rewrite the sidecar wholesale.
pub fn save_metadata(template_dir: &Path, metadata: &TemplateMetadata) -> Result<()> {
    let path = template_dir.join(METADATA_FILE);

    let content =
        toml::to_string_pretty(metadata).map_err(|e| BlueprintError::MetadataSerialize {
            path: path.clone(),
            source: e,
        })?;

    std::fs::write(&path, content).map_err(|e| BlueprintError::Io {
        context: format!("writing template metadata {}", path.display()),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sidecar_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = load_metadata(dir.path()).unwrap();
        assert_eq!(metadata, TemplateMetadata::default());
        assert_eq!(metadata.description_or_default(), DEFAULT_DESCRIPTION);
        assert_eq!(metadata.main_file_or_default(), "main.py");
    }

    #[test]
    fn round_trip_preserves_set_fields_only() {
        let dir = tempfile::tempdir().unwrap();
        let metadata = TemplateMetadata {
            description: Some("A CLI".to_string()),
            author: None,
            variables: Some(BTreeMap::from([(
                "my-app".to_string(),
                "name".to_string(),
            )])),
            dependencies: Some(BTreeMap::from([(
                "poetry".to_string(),
                vec!["typer".to_string()],
            )])),
            main_file: None,
        };

        save_metadata(dir.path(), &metadata).unwrap();
        let written = std::fs::read_to_string(dir.path().join(METADATA_FILE)).unwrap();
        assert!(!written.contains("author"));
        assert!(!written.contains("main_file"));

        let loaded = load_metadata(dir.path()).unwrap();
        assert_eq!(loaded, metadata);
        assert!(loaded.author.is_none());
        assert!(loaded.main_file.is_none());
    }

    #[test]
    fn malformed_sidecar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE), "description = [unclosed").unwrap();

        let result = load_metadata(dir.path());
        assert!(matches!(result, Err(BlueprintError::MetadataParse { .. })));
    }

    #[test]
    fn base_dependencies_for_unknown_manager_is_empty() {
        let metadata = TemplateMetadata {
            dependencies: Some(BTreeMap::from([(
                "pip".to_string(),
                vec!["flask".to_string()],
            )])),
            ..Default::default()
        };
        assert_eq!(metadata.base_dependencies("pip"), ["flask".to_string()]);
        assert!(metadata.base_dependencies("poetry").is_empty());
    }
}
