use url::Url;

/// Parse a payload as a URI with a non-empty host.
///
/// Purely syntactic: no scheme allow-list and no reachability check.
pub fn parse_link(payload: &str) -> Option<Url> {
    Url::parse(payload.trim())
        .ok()
        .filter(|url| url.host_str().is_some_and(|host| !host.is_empty()))
}

pub fn is_link_like(payload: &str) -> bool {
    parse_link(payload).is_some()
}
