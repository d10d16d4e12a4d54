use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::metadata::{load_metadata, DEFAULT_DESCRIPTION};
use crate::config::TemplateRoots;
use crate::error::{BlueprintError, Result};
use crate::report::Reporter;

/// Enumerate templates from every root as `name -> description`.
///
/// Roots are scanned in order and one level deep; a template name found in a
/// later root replaces the earlier entry. A missing or corrupt sidecar never
/// stops the scan, the default description is used instead.
pub fn list_templates(roots: &TemplateRoots, reporter: &dyn Reporter) -> BTreeMap<String, String> {
    let mut templates = BTreeMap::new();

    for root in roots.scan_order() {
        for (name, path) in template_dirs(root, reporter) {
            let description = match load_metadata(&path) {
                Ok(metadata) => metadata.description_or_default().to_string(),
                Err(e) => {
                    reporter.warn(&format!("failed to load metadata for '{name}': {e}"));
                    DEFAULT_DESCRIPTION.to_string()
                }
            };
            templates.insert(name, description);
        }
    }

    templates
}

/// Resolve a template name to its directory, with the same precedence as
/// [`list_templates`].
pub fn find_template(roots: &TemplateRoots, name: &str) -> Result<PathBuf> {
    roots
        .scan_order()
        .iter()
        .rev()
        .map(|root| root.join(name))
        .find(|path| path.is_dir() && !is_hidden(name))
        .ok_or_else(|| BlueprintError::TemplateNotFound {
            name: name.to_string(),
        })
}

fn template_dirs(root: &Path, reporter: &dyn Reporter) -> Vec<(String, PathBuf)> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            reporter.warn(&format!("cannot read template root {}: {e}", root.display()));
            return Vec::new();
        }
    };

    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            (!is_hidden(&name)).then(|| (name, e.path()))
        })
        .collect();
    dirs.sort();
    dirs
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
