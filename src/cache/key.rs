use reqwest::Url;

/// Base used to resolve relative URLs when the proxy has no origin
const DETACHED_BASE: &str = "http://localhost/";

/// Compute the lookup key for a request URL
///
/// Keys are the path plus query, fragments dropped. Relative URLs are
/// resolved against the origin first, so percent-encoding and dot-segments
/// normalise the same way as for absolute URLs. Anything that resolves to a
/// different origin, protocol-relative URLs included, produces no key.
pub fn lookup_key(url: &str, origin: Option<&Url>) -> Option<String> {
    let resolved = match Url::parse(url) {
        Ok(parsed) => {
            if parsed.origin() != origin?.origin() {
                return None;
            }
            parsed
        }
        Err(_) => {
            let base = match origin {
                Some(origin) => origin.clone(),
                None => Url::parse(DETACHED_BASE).ok()?,
            };
            let joined = base.join(url).ok()?;
            if joined.origin() != base.origin() {
                return None;
            }
            joined
        }
    };

    let mut key = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        key.push('?');
        key.push_str(query);
    }
    Some(key)
}
