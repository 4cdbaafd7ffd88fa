//! Root-relative POSIX path helpers.
//!
//! Every path stored on a version is cleaned: forward slashes only, a
//! single leading `/`, no trailing `/`, no empty, `.` or `..` segments.
//! The sync root itself is `/`.

/// The path of the sync root.
pub const ROOT_PATH: &str = "/";

/// Normalize a raw (possibly Windows-style) relative path.
pub fn clean_path(raw: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        ROOT_PATH.to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

/// Parent of a cleaned path, `None` for the root.
pub fn parent_path(path: &str) -> Option<String> {
    if path == ROOT_PATH {
        return None;
    }
    match path.rfind('/') {
        Some(0) | None => Some(ROOT_PATH.to_string()),
        Some(idx) => Some(path[..idx].to_string()),
    }
}

/// Last segment of a cleaned path; empty for the root.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or("")
}

/// Append a name to a cleaned folder path.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Segments of a cleaned path, root excluded.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// First segment of a cleaned path; empty for the root.
pub fn first_segment(path: &str) -> &str {
    segments(path).next().unwrap_or("")
}

/// The path itself followed by each ancestor, ending with `/`.
pub fn ancestors(path: &str) -> Vec<String> {
    let mut out = vec![path.to_string()];
    let mut current = path.to_string();
    while let Some(parent) = parent_path(&current) {
        out.push(parent.clone());
        current = parent;
    }
    out
}

/// Substitute the `from` prefix of `path` with `to`.
///
/// Returns `None` when `path` is not `from` or a descendant of it.
pub fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    if path == from {
        return Some(to.to_string());
    }
    let rest = if from == ROOT_PATH {
        path.strip_prefix('/')?
    } else {
        path.strip_prefix(from)?.strip_prefix('/')?
    };
    Some(join_path(to, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path("docs//a.txt"), "/docs/a.txt");
        assert_eq!(clean_path("\\docs\\sub\\"), "/docs/sub");
        assert_eq!(clean_path("/docs/./x/../a.txt"), "/docs/a.txt");
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path("/"), None);
        assert_eq!(parent_path("/docs").as_deref(), Some("/"));
        assert_eq!(parent_path("/docs/a.txt").as_deref(), Some("/docs"));
    }

    #[test]
    fn test_file_name_and_join() {
        assert_eq!(file_name("/docs/a.txt"), "a.txt");
        assert_eq!(file_name("/"), "");
        assert_eq!(join_path("/", "docs"), "/docs");
        assert_eq!(join_path("/docs", "a.txt"), "/docs/a.txt");
    }

    #[test]
    fn test_ancestors_end_at_root() {
        assert_eq!(
            ancestors("/shared/sub/file.txt"),
            vec!["/shared/sub/file.txt", "/shared/sub", "/shared", "/"]
        );
        assert_eq!(ancestors("/"), vec!["/"]);
    }

    #[test]
    fn test_rebase() {
        assert_eq!(
            rebase("/docs/a.txt", "/docs", "/archive/docs").as_deref(),
            Some("/archive/docs/a.txt")
        );
        assert_eq!(rebase("/docs", "/docs", "/x").as_deref(), Some("/x"));
        assert_eq!(rebase("/docsx/a", "/docs", "/x"), None);
        assert_eq!(rebase("/a", "/", "/x").as_deref(), Some("/x/a"));
    }

    #[test]
    fn test_first_segment() {
        assert_eq!(first_segment("/docs/a.txt"), "docs");
        assert_eq!(first_segment("/"), "");
    }
}
