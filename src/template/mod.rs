pub mod clone;
pub mod source;

pub use clone::{clone_repository, CloneResult, GitFetcher, RepositoryFetcher};
pub use source::{validate_repository_url, SUPPORTED_HOSTS};
