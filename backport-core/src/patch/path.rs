use std::path::{Component, Path, PathBuf};

use super::error::PatchError;

/// Join a service-provided relative path onto the workspace root, refusing
/// anything that could land outside of it.
pub fn resolve_target(root: &Path, raw_path: &str) -> Result<PathBuf, PatchError> {
    validate_patch_path(raw_path)?;
    Ok(root.join(raw_path))
}

pub(crate) fn validate_patch_path(raw_path: &str) -> Result<(), PatchError> {
    let invalid = |reason: &str| PatchError::InvalidPath {
        path: raw_path.to_string(),
        reason: reason.to_string(),
    };

    if raw_path.is_empty() {
        return Err(invalid("path is empty"));
    }

    if raw_path
        .chars()
        .any(|c| matches!(c, '\0' | '\r' | '\n' | '\t'))
    {
        return Err(invalid("path contains control characters"));
    }

    let candidate = Path::new(raw_path);
    if candidate.is_absolute() {
        return Err(invalid("path must be relative"));
    }

    for component in candidate.components() {
        match component {
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path escapes workspace"));
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_paths() {
        let root = Path::new("/work/repo");
        assert_eq!(
            resolve_target(root, "pkg/util/strings.go").unwrap(),
            PathBuf::from("/work/repo/pkg/util/strings.go")
        );
        assert_eq!(
            resolve_target(root, "./README.md").unwrap(),
            PathBuf::from("/work/repo/./README.md")
        );
    }

    #[test]
    fn rejects_escaping_paths() {
        let root = Path::new("/work/repo");
        for raw in ["", "/etc/passwd", "../outside.txt", "src/../../x", "a\nb"] {
            let err = resolve_target(root, raw).unwrap_err();
            assert!(
                matches!(err, PatchError::InvalidPath { .. }),
                "accepted {raw:?}"
            );
        }
    }
}
