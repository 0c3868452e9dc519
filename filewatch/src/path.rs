use std::path::{Component, Path, PathBuf};

/// Normalise `path` to a single comparable form: tilde expansion plus
/// lexical resolution of `.` and `..` segments.
///
/// Purely lexical, never touches the filesystem: paths that do not (yet)
/// exist still canonicalise deterministically, and two spellings of the same
/// file compare equal by string comparison of the result.
pub fn canonicalise(path: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(stripped) => match dirs::home_dir() {
            Some(home) => home.join(stripped),
            None => {
                // If home directory cannot be determined, log and use path as-is
                tracing::warn!("cannot determine home directory, using path as-is");
                path.to_path_buf()
            }
        },
        Err(_) => path.to_path_buf(),
    };

    let mut out = PathBuf::new();
    for component in expanded.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    out
}
