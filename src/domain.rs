//! Base-URL canonicalization for search-replace tokens

use url::Url;

use crate::error::{common, Result};

/// Reduce a configured base URL to the bare host used as a search/replace key.
///
/// Tries strict URL parsing first and keeps `host[:port]` (the port only when
/// it is explicit and not the scheme default). Inputs that do not parse as a
/// URL with a host fall back to stripping any `scheme://` prefix and
/// everything from the first `/` on. The result is lowercase and normalizing
/// it again returns it unchanged.
pub fn normalize(url_or_host: &str) -> String {
    let trimmed = url_or_host.trim();

    if let Ok(url) = Url::parse(trimmed) {
        if let Some(host) = url.host_str() {
            return match url.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_string(),
            };
        }
    }

    strip_scheme_and_path(trimmed)
}

/// Search/replace token for `environment`.
///
/// Fails when the domain is absent or blank, and when it reduces to an empty
/// host (`https://`, `/`), since an empty token would erase every occurrence
/// of the other side's host.
pub fn host_token(environment: &str, domain: Option<&str>) -> Result<String> {
    let domain = domain
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| common::missing_required_field(environment, "domain"))?;
    let host = normalize(domain);
    if host.is_empty() {
        return Err(common::unusable_domain(environment, domain));
    }
    Ok(host)
}

fn strip_scheme_and_path(input: &str) -> String {
    let without_scheme = match input.find("://") {
        Some(idx) => &input[idx + 3..],
        None => input,
    };
    let host = match without_scheme.find('/') {
        Some(idx) => &without_scheme[..idx],
        None => without_scheme,
    };
    host.to_ascii_lowercase()
}
