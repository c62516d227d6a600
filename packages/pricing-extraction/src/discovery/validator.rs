//! Candidate-URL validation.
//!
//! A pure filter used by every link-producing component: a candidate must be
//! a well-formed absolute URL and must not point at an asset file.

/// File extensions that never hold pricing content.
const DENIED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".png", ".gif", ".zip", ".exe", ".css", ".js",
];

/// Whether a URL is a usable page candidate.
///
/// Requires a scheme and a host, and rejects asset-file suffixes. No network
/// access, no side effects.
pub fn is_candidate_url(url: &str) -> bool {
    let parsed = match url::Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    if parsed.host_str().is_none() {
        return false;
    }

    !has_denied_extension(url)
}

fn has_denied_extension(url: &str) -> bool {
    let lower = url.to_lowercase();
    DENIED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}
