//! Relative-path flattening.

use std::path::{Component, Path};

/// Joining string substituted for path separators.
const FLAT_JOINER: &str = "_";

/// Prefix substituted for a leading dot, so flattened dotfiles stay
/// visible, ordinary filenames on every platform.
const DOT_PREFIX: &str = "dot_";

/// Map a relative source path to its flat destination filename.
///
/// Pure function of its input: path separators become [`FLAT_JOINER`], and
/// a leading dot is rewritten to [`DOT_PREFIX`]. Non-UTF-8 components are
/// converted lossily.
pub fn flatten(relative_path: &Path) -> String {
    let flat = relative_path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(FLAT_JOINER);

    match flat.strip_prefix('.') {
        Some(rest) => format!("{DOT_PREFIX}{rest}"),
        None => flat,
    }
}
