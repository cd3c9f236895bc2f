use std::path::Path;

use crate::core::{render_tree, TreeOptions};
use crate::error::NasError;

/// Print a box-drawing tree of `path`
pub fn dir_tree(
    path: &Path,
    max_depth: Option<usize>,
    show_hidden: bool,
    show_files: bool,
    exclude: &[String],
) -> Result<(), NasError> {
    let options = TreeOptions {
        max_depth,
        show_hidden,
        show_files,
        ..Default::default()
    }
    .with_excludes(exclude)?;

    print!("{}", render_tree(path, &options)?);
    Ok(())
}
