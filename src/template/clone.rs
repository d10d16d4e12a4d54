use std::path::Path;

use crate::error::{BlueprintError, Result};
use crate::report::Reporter;

/// A repository checked out into a temporary directory.
#[derive(Debug)]
pub struct CloneResult {
    /// Removed when dropped.
    pub dir: tempfile::TempDir,
    pub commit_sha: Option<String>,
}

impl CloneResult {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// Fetches a validated repository URL into a scratch directory.
pub trait RepositoryFetcher {
    fn fetch(&self, url: &str, reporter: &dyn Reporter) -> Result<CloneResult>;
}

/// Shallow-free clone through gix.
#[derive(Debug, Default)]
pub struct GitFetcher;

impl RepositoryFetcher for GitFetcher {
    fn fetch(&self, url: &str, reporter: &dyn Reporter) -> Result<CloneResult> {
        clone_repository(url, reporter)
    }
}

/// Clone `url` into a fresh temporary directory and check out its default branch.
///
/// `file://` URLs are refused; `http://` works but is reported as insecure.
pub fn clone_repository(url: &str, reporter: &dyn Reporter) -> Result<CloneResult> {
    if url.starts_with("file://") {
        return Err(BlueprintError::UnsafeUrl {
            url: url.to_string(),
            reason: "file:// URLs are not allowed for imports".into(),
        });
    }

    if url.starts_with("http://") {
        reporter.warn("using insecure http:// URL; consider using https:// instead");
    }

    let tmp_dir = tempfile::tempdir().map_err(|e| BlueprintError::Io {
        context: "creating temporary directory for git clone".into(),
        source: e,
    })?;

    let clone_error = |reason: String| BlueprintError::GitClone {
        url: url.to_string(),
        reason,
    };

    let mut prepare =
        gix::prepare_clone(url, tmp_dir.path()).map_err(|e| clone_error(e.to_string()))?;

    let (mut checkout, _outcome) = prepare
        .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
        .map_err(|e| clone_error(e.to_string()))?;

    let (repo, _outcome) = checkout
        .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
        .map_err(|e| clone_error(format!("worktree checkout failed: {e}")))?;

    let commit_sha = repo.head_id().ok().map(|id| id.to_string());

    Ok(CloneResult {
        dir: tmp_dir,
        commit_sha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;

    #[test]
    fn clone_rejects_invalid_url() {
        let result = clone_repository("://bad", &MemoryReporter::new());
        match result.unwrap_err() {
            BlueprintError::GitClone { url, .. } => assert_eq!(url, "://bad"),
            other => panic!("expected GitClone error, got: {other:?}"),
        }
    }

    #[test]
    fn clone_rejects_file_url() {
        let result = GitFetcher.fetch("file:///tmp/repo", &MemoryReporter::new());
        match result.unwrap_err() {
            BlueprintError::UnsafeUrl { url, .. } => assert_eq!(url, "file:///tmp/repo"),
            other => panic!("expected UnsafeUrl error, got: {other:?}"),
        }
    }

    #[test]
    fn clone_fails_on_unreachable_host() {
        let reporter = MemoryReporter::new();
        let result = clone_repository("http://nonexistent.invalid/repo.git", &reporter);
        assert!(result.is_err());
        assert_eq!(reporter.warnings().len(), 1);
    }
}
