//! Single-file operations shared by the reconciler, rewriter and builders

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};

/// Copy one regular file to `dest`, creating parent directories.
///
/// Symlinks are followed when inspecting `src`, so a build-system source that
/// is a link to a regular file is accepted. Any existing `dest` is removed
/// first so a read-only copy from a previous build does not block the
/// overwrite. The copy is streamed and not atomic: a failure part way through
/// can leave a truncated destination.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    debug!(target: "terraform_pack::copy", "copying '{}' to '{}'", src.display(), dest.display());

    let metadata = fs::metadata(src).map_err(|e| Error::io(src, e))?;
    if !metadata.is_file() {
        return Err(Error::NotRegularFile {
            path: src.display().to_string(),
        });
    }

    let mut source = fs::File::open(src).map_err(|e| Error::io(src, e))?;

    ensure_parent_dir(dest)?;
    remove_if_exists(dest)?;

    let mut destination = fs::File::create(dest).map_err(|e| Error::io(dest, e))?;
    io::copy(&mut source, &mut destination).map_err(|e| Error::io(dest, e))?;
    destination
        .set_permissions(metadata.permissions())
        .map_err(|e| Error::io(dest, e))?;

    Ok(())
}

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }
    Ok(())
}

/// Remove whatever is at `path` (file, symlink or directory tree). Missing
/// paths are fine.
pub fn remove_if_exists(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io(path, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| Error::io(path, e))
}

/// Replace the contents of an existing file, keeping its permission bits.
///
/// Read-only files are made writable for the duration of the write and then
/// restored.
pub fn overwrite_file(path: &Path, contents: &[u8]) -> Result<()> {
    let permissions = fs::metadata(path)
        .map_err(|e| Error::io(path, e))?
        .permissions();

    if permissions.readonly() {
        let mut writable = permissions.clone();
        writable.set_readonly(false);
        fs::set_permissions(path, writable).map_err(|e| Error::io(path, e))?;
    }

    let written = fs::write(path, contents).map_err(|e| Error::io(path, e));
    // restore even when the write failed
    fs::set_permissions(path, permissions).map_err(|e| Error::io(path, e))?;
    written
}

/// Remove each directory of `strip` from `root`.
///
/// Entries must be relative and stay inside `root`. Missing entries are
/// skipped, so stripping twice is harmless.
pub fn strip_dirs<S: AsRef<str>>(root: &Path, strip: &[S]) -> Result<()> {
    for entry in strip {
        let relative = checked_relative(entry.as_ref())?;
        let path = root.join(relative);
        debug!(target: "terraform_pack::strip", "stripping '{}'", path.display());
        remove_if_exists(&path)?;
    }
    Ok(())
}

/// Validate that `path` is relative and never climbs above its root.
pub fn checked_relative(path: &str) -> Result<PathBuf> {
    let candidate = Path::new(path);
    let mut relative = PathBuf::new();
    for component in candidate.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::Path {
                    message: format!("'{}' must be a relative path inside the output", path),
                });
            }
        }
    }
    if relative.as_os_str().is_empty() {
        return Err(Error::Path {
            message: format!("'{}' does not name anything inside the output", path),
        });
    }
    Ok(relative)
}

/// Render a relative path with `/` separators regardless of platform
pub fn slash_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Copy each file of `srcs` directly into `dest_dir` under its base name.
pub fn flatten_into<P: AsRef<Path>>(srcs: &[P], dest_dir: &Path) -> Result<()> {
    for src in srcs {
        let src = src.as_ref();
        let name = src.file_name().ok_or_else(|| Error::Path {
            message: format!("'{}' has no file name", src.display()),
        })?;
        copy_file(src, &dest_dir.join(name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("main.tf");
        fs::write(&src, "resource \"null_resource\" \"a\" {}\n").unwrap();

        let dest = temp.path().join("out/nested/dir/main.tf");
        copy_file(&src, &dest).unwrap();

        assert_eq!(fs::read(&src).unwrap(), fs::read(&dest).unwrap());
    }

    #[test]
    fn test_copy_file_rejects_directory() {
        let temp = TempDir::new().unwrap();
        let result = copy_file(temp.path(), &temp.path().join("dest"));
        match result {
            Err(Error::NotRegularFile { path }) => {
                assert_eq!(path, temp.path().display().to_string())
            }
            other => panic!("expected NotRegularFile, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_file_missing_source_names_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.tf");
        let err = copy_file(&missing, &temp.path().join("dest.tf")).unwrap_err();
        assert!(err.to_string().contains("missing.tf"));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("script.sh");
        fs::write(&src, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o755)).unwrap();

        let dest = temp.path().join("out/script.sh");
        copy_file(&src, &dest).unwrap();

        let mode = fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_file_overwrites_read_only_destination() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = temp.path().join("main.tf");
        fs::write(&src, "new").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o444)).unwrap();

        let dest = temp.path().join("out/main.tf");
        copy_file(&src, &dest).unwrap();
        // second copy over a read-only destination
        copy_file(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_file_keeps_read_only_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("main.tf");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();

        overwrite_file(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o444);
    }

    #[test]
    fn test_strip_dirs_is_idempotent() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs/images")).unwrap();
        fs::write(temp.path().join("docs/images/a.png"), "png").unwrap();
        fs::write(temp.path().join("main.tf"), "").unwrap();

        strip_dirs(temp.path(), &["docs", "examples"]).unwrap();
        strip_dirs(temp.path(), &["docs", "examples"]).unwrap();

        assert!(!temp.path().join("docs").exists());
        assert!(temp.path().join("main.tf").exists());
    }

    #[test]
    fn test_strip_dirs_rejects_escaping_paths() {
        let temp = TempDir::new().unwrap();
        assert!(strip_dirs(temp.path(), &["../outside"]).is_err());
        assert!(strip_dirs(temp.path(), &["/etc"]).is_err());
        assert!(strip_dirs(temp.path(), &["."]).is_err());
    }

    #[test]
    fn test_slash_path() {
        let path: PathBuf = ["a", "b", "c.tf"].iter().collect();
        assert_eq!(slash_path(&path), "a/b/c.tf");
    }

    #[test]
    fn test_flatten_into_uses_base_names() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("src/one/main.tf");
        let b = temp.path().join("src/two/variables.tf");
        for path in [&a, &b] {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        let out = temp.path().join("out");
        flatten_into(&[a, b], &out).unwrap();

        assert!(out.join("main.tf").is_file());
        assert!(out.join("variables.tf").is_file());
    }
}
