use tera::{Context, Tera};

use crate::error::{BlueprintError, Result};

/// Render one file's contents. Any undefined variable is an error.
pub fn render_file_content(
    template_name: &str,
    content: &str,
    context: &Context,
) -> Result<String> {
    let mut tera = Tera::default();
    // Generated sources are not HTML documents; never escape.
    tera.autoescape_on(vec![]);

    tera.add_raw_template(template_name, content)
        .and_then(|_| tera.render(template_name, context))
        .map_err(|e| BlueprintError::RenderError {
            file: template_name.to_string(),
            source: e,
        })
}

/// Detect binary content using content_inspector (BOM-aware, null-byte scanning).
///
/// Only the first 8KB are inspected.
pub fn is_binary_content(bytes: &[u8]) -> bool {
    let len = bytes.len().min(8192);
    !content_inspector::inspect(&bytes[..len]).is_text()
}
