use crate::error::{BlueprintError, Result};

/// Hosts an import may come from.
pub const SUPPORTED_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org"];

/// Built-in abbreviation prefixes and their expansion targets.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("gh:", "https://github.com/"),
    ("gl:", "https://gitlab.com/"),
    ("bb:", "https://bitbucket.org/"),
];

/// Expand a shorthand like `gh:user/repo` into an https URL.
///
/// `Ok(None)` means the input carries no known prefix.
fn expand_abbreviation(input: &str) -> Result<Option<String>> {
    for &(prefix, base_url) in ABBREVIATIONS {
        if let Some(rest) = input.strip_prefix(prefix) {
            let rest = rest.trim_matches('/');
            if rest.is_empty() {
                return Err(BlueprintError::InvalidRepositoryUrl {
                    url: input.to_string(),
                });
            }
            return Ok(Some(format!("{base_url}{rest}")));
        }
    }
    Ok(None)
}

fn host_of(url: &str) -> Option<&str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let authority = rest.split('/').next()?;
    let host = authority.rsplit('@').next()?;
    Some(host.split(':').next().unwrap_or(host))
}

/// Check that `locator` names a repository we can import and return the URL to clone.
///
/// Checks shape only; nothing is contacted.
pub fn validate_repository_url(locator: &str) -> Result<String> {
    let locator = locator.trim();

    if locator.starts_with("file://") {
        return Err(BlueprintError::UnsafeUrl {
            url: locator.to_string(),
            reason: "file:// URLs are not allowed for imports".into(),
        });
    }

    let url = match expand_abbreviation(locator)? {
        Some(url) => url,
        None => locator.to_string(),
    };

    let invalid = || BlueprintError::InvalidRepositoryUrl {
        url: locator.to_string(),
    };

    let host = host_of(&url).ok_or_else(invalid)?.to_ascii_lowercase();
    let supported = SUPPORTED_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{h}")));
    if !supported {
        return Err(invalid());
    }

    // Needs at least an owner and a repository segment.
    let path = url.splitn(4, '/').nth(3).unwrap_or("");
    if path.split('/').filter(|s| !s.is_empty()).count() < 2 {
        return Err(invalid());
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://github.com/user/repo", "https://github.com/user/repo")]
    #[case("https://github.com/user/repo.git", "https://github.com/user/repo.git")]
    #[case("http://gitlab.com/org/project", "http://gitlab.com/org/project")]
    #[case("https://www.github.com/user/repo", "https://www.github.com/user/repo")]
    #[case("gh:user/repo", "https://github.com/user/repo")]
    #[case("gl:org/project", "https://gitlab.com/org/project")]
    #[case("bb:team/repo", "https://bitbucket.org/team/repo")]
    #[case("  gh:user/repo/  ", "https://github.com/user/repo")]
    fn accepts_supported_locators(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate_repository_url(input).unwrap(), expected);
    }

    #[rstest]
    #[case("not a url")]
    #[case("https://example.com/user/repo")]
    #[case("https://github.com/")]
    #[case("https://github.com/user")]
    #[case("git@github.com:user/repo.git")]
    #[case("gh:")]
    #[case("ftp://github.com/user/repo")]
    #[case("https://github.com.evil.io/user/repo")]
    fn rejects_invalid_locators(#[case] input: &str) {
        assert!(matches!(
            validate_repository_url(input),
            Err(BlueprintError::InvalidRepositoryUrl { .. })
        ));
    }

    #[test]
    fn rejects_file_url_as_unsafe() {
        assert!(matches!(
            validate_repository_url("file:///tmp/github.com/repo"),
            Err(BlueprintError::UnsafeUrl { .. })
        ));
    }

    #[test]
    fn host_ignores_credentials_and_port() {
        assert_eq!(host_of("https://me@github.com:443/a/b"), Some("github.com"));
        assert_eq!(host_of("ssh://github.com/a/b"), None);
    }
}
