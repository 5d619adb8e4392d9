//! Path normalisation and segment-aware prefix matching.

/// Paths every role may reach, signed in or not. `/` matches only itself.
pub const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/login",
    "/logout",
    "/forgot-password",
    "/reset-password",
    "/unauthorized",
];

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Canonical form used for every match.
///
/// Query and fragment are dropped, `\\` counts as a separator, empty and `.`
/// segments vanish, and `..` pops the previous segment (never above the root).
/// Percent-encoded dots (`%2e`) are treated as dots. The result always starts
/// with `/` and has no trailing slash unless it is the root.
pub fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());

    let mut segments: Vec<&str> = Vec::new();
    for segment in path[..end].split(['/', '\\']) {
        match dot_segment(segment) {
            Some(DotSegment::Current) => {}
            Some(DotSegment::Parent) => {
                segments.pop();
            }
            None if segment.is_empty() => {}
            None => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

enum DotSegment {
    Current,
    Parent,
}

fn dot_segment(segment: &str) -> Option<DotSegment> {
    if !segment.starts_with(['.', '%']) {
        return None;
    }
    match segment.to_ascii_lowercase().replace("%2e", ".").as_str() {
        "." => Some(DotSegment::Current),
        ".." => Some(DotSegment::Parent),
        _ => None,
    }
}

/// `path` is `prefix` itself or lives underneath it.
///
/// `/seller/cart` is under `/seller`; `/seller-tat` is not.
pub fn is_under(path: &str, prefix: &str) -> bool {
    let path = normalize(path);
    let prefix = normalize(prefix);
    if prefix == "/" {
        return path == "/";
    }
    match path.strip_prefix(prefix.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|p| is_under(path, p))
}
