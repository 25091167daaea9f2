use url::Url;

/// A challenge file reference resolved against the platform base URL.
pub struct ResolvedFile {
    /// Whether the file is hosted on the platform itself and therefore
    /// eligible for an authenticated download.
    pub local: bool,
    pub url: String,
    pub filename: String,
}

/// Resolves a file reference (absolute URL or site-relative path) and
/// classifies it. Malformed references degrade to a non-local result with
/// an empty filename rather than failing.
pub fn resolve_file(base: &Url, file_ref: &str) -> ResolvedFile {
    let resolved = match base.join(file_ref) {
        Ok(resolved) => resolved,
        Err(_) => {
            return ResolvedFile {
                local: false,
                url: file_ref.to_owned(),
                filename: String::new(),
            }
        }
    };
    let local = resolved.host_str() == base.host_str()
        && resolved.port_or_known_default() == base.port_or_known_default();
    ResolvedFile {
        local,
        url: resolved.into(),
        filename: extract_filename(file_ref),
    }
}

/// Basename of the reference, with any query string stripped.
fn extract_filename(file_ref: &str) -> String {
    let basename = match file_ref.rfind('/') {
        Some(i) => &file_ref[i + 1..],
        None => file_ref,
    };
    match basename.rfind('?') {
        Some(i) => basename[..i].to_owned(),
        None => basename.to_owned(),
    }
}
