//! Path and URL conversion utilities.
//!
//! This module handles conversions between:
//! - Routes (the URL path at which a page is served)
//! - Output file paths (where files are written in the output directory)

use std::path::{Component, Path, PathBuf};

/// Convert a route to an output file path.
///
/// Routes ending in `/` become `route/index.html`. Anything else names a
/// file directly.
///
/// # Examples
/// ```ignore
/// route_to_output_path("/css/naming/bem/", output_dir) => output_dir/css/naming/bem/index.html
/// route_to_output_path("/", output_dir) => output_dir/index.html
/// route_to_output_path("/404.html", output_dir) => output_dir/404.html
/// ```
pub fn route_to_output_path(route: &str, output_dir: &Path) -> PathBuf {
    let trimmed = route.trim_matches('/');

    if trimmed.is_empty() {
        output_dir.join("index.html")
    } else if route.ends_with('/') {
        output_dir.join(trimmed).join("index.html")
    } else {
        output_dir.join(trimmed)
    }
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Resolve a possibly relative path against the project base path.
pub fn resolve(base_path: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_path.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Lexically normalise a path: `.` components are dropped and `..` removes
/// the component before it. Symlinks are not followed.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// The sibling directory a build is staged in before it replaces `output_dir`.
pub fn staging_dir(output_dir: &Path) -> PathBuf {
    let mut name = output_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "_site".into());
    name.push(".partial");
    output_dir.with_file_name(name)
}
