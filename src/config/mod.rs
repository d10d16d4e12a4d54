pub mod metadata;
pub mod user;

pub use metadata::{load_metadata, save_metadata, TemplateMetadata, METADATA_FILE};
pub use user::{load_user_config, TemplateRoots, UserConfig};
