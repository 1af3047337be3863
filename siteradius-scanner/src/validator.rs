use url::Url;

/// Path suffixes that never lead to a content page.
pub const NON_CONTENT_EXTENSIONS: &[&str] = &[
    // images
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // archives
    "zip", "tar", "gz", "rar", "7z",
    // media
    "mp4", "mp3", "avi", "mov", "wav", "webm",
    // stylesheets and scripts
    "css", "js",
];

/// Host plus explicit port, e.g. `example.com` or `127.0.0.1:8080`.
///
/// This is what domain scoping compares; userinfo is ignored.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// The scoping key for a seed URL, or `None` if it has no host.
pub fn base_domain_of(url: &str) -> Option<String> {
    Url::parse(url).ok().as_ref().and_then(authority)
}

/// Decide whether a discovered link should be fetched.
pub fn is_valid_url(candidate: &str, base_domain: &str, same_domain_only: bool) -> bool {
    let Ok(parsed) = Url::parse(candidate) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }

    let Some(candidate_domain) = authority(&parsed) else {
        return false;
    };

    if same_domain_only && candidate_domain != base_domain {
        return false;
    }

    !has_non_content_extension(parsed.path())
}

fn has_non_content_extension(path: &str) -> bool {
    let Some((_, extension)) = path.rsplit_once('.') else {
        return false;
    };
    // a dot in an earlier segment is not an extension
    if extension.contains('/') {
        return false;
    }
    NON_CONTENT_EXTENSIONS
        .iter()
        .any(|known| extension.eq_ignore_ascii_case(known))
}
