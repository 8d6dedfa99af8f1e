//! Path helpers for colocation placement and repository layout

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Directory under a consumer's output that holds colocated dependencies
pub const COLOCATION_DIR: &str = ".modules";

/// Encode a dependency path into the relative directory it is colocated at.
///
/// The mapping is injective: normal components are kept with `%` escaped as
/// `%25` and bytes that are not valid UTF-8 written as `%XX`, `..` becomes
/// `%2E%2E`, a filesystem root becomes `%2F` and `.` components are dropped. So `dep/path` lands at `dep/path`, while
/// `../dep` and `/dep` land at `%2E%2E/dep` and `%2F/dep`.
pub fn encode_dependency_path(dependency: &Path) -> PathBuf {
    let mut encoded = PathBuf::new();
    for component in dependency.components() {
        match component {
            Component::Normal(part) => encoded.push(escape_component(part)),
            Component::ParentDir => encoded.push("%2E%2E"),
            Component::RootDir => encoded.push("%2F"),
            Component::Prefix(prefix) => encoded.push(
                escape_component(prefix.as_os_str())
                    .replace(':', "%3A")
                    .replace('\\', "%5C"),
            ),
            Component::CurDir => {}
        }
    }
    encoded
}

fn escape_component(part: &OsStr) -> String {
    let mut escaped = String::new();
    for chunk in part.as_encoded_bytes().utf8_chunks() {
        escaped.push_str(&chunk.valid().replace('%', "%25"));
        for byte in chunk.invalid() {
            escaped.push_str(&format!("%{:02X}", byte));
        }
    }
    escaped
}

/// Placement of `dependency` relative to a consumer's output directory
pub fn placement_path(dependency: &Path) -> PathBuf {
    Path::new(COLOCATION_DIR).join(encode_dependency_path(dependency))
}

/// Cut `cwd` at the first component equal to `plz_out_dir`, yielding the
/// repository root. Returns `cwd` unchanged when it is not inside the
/// build output tree.
pub fn repo_root_from(cwd: &Path, plz_out_dir: &str) -> PathBuf {
    let marker = plz_out_dir.trim_end_matches('/');
    let mut root = PathBuf::new();
    for component in cwd.components() {
        if let Component::Normal(part) = component {
            if part == marker {
                return root;
            }
        }
        root.push(component);
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_of_relative_path() {
        assert_eq!(
            placement_path(Path::new("dep/path")),
            PathBuf::from(".modules/dep/path")
        );
        assert_eq!(
            placement_path(Path::new("./dep/./path/")),
            PathBuf::from(".modules/dep/path")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_placement_distinguishes_absolute_and_parent_paths() {
        let relative = placement_path(Path::new("dep"));
        let absolute = placement_path(Path::new("/dep"));
        let parent = placement_path(Path::new("../dep"));

        assert_eq!(absolute, PathBuf::from(".modules/%2F/dep"));
        assert_eq!(parent, PathBuf::from(".modules/%2E%2E/dep"));
        assert_ne!(relative, absolute);
        assert_ne!(relative, parent);
    }

    #[test]
    fn test_placement_escapes_percent() {
        assert_eq!(
            placement_path(Path::new("%2F/dep")),
            PathBuf::from(".modules/%252F/dep")
        );
        assert_ne!(
            placement_path(Path::new("%2E%2E/dep")),
            placement_path(Path::new("../dep"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_placement_keeps_non_utf8_names_apart() {
        use std::os::unix::ffi::OsStrExt;

        let a = Path::new(std::ffi::OsStr::from_bytes(b"dep\xff"));
        let b = Path::new(std::ffi::OsStr::from_bytes(b"dep\xfe"));

        assert_eq!(placement_path(a), PathBuf::from(".modules/dep%FF"));
        assert_ne!(placement_path(a), placement_path(b));
        assert_ne!(placement_path(a), placement_path(Path::new("dep\u{fffd}")));
        assert_ne!(placement_path(a), placement_path(Path::new("dep%FF")));
    }

    #[cfg(unix)]
    #[test]
    fn test_repo_root_from() {
        assert_eq!(
            repo_root_from(Path::new("/home/me/repo/plz-out/gen/infra/root"), "plz-out/"),
            PathBuf::from("/home/me/repo")
        );
        assert_eq!(
            repo_root_from(Path::new("/home/me/repo/infra"), "plz-out"),
            PathBuf::from("/home/me/repo/infra")
        );
    }
}
