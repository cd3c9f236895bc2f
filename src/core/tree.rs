use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::NasError;

/// Options for rendering a directory tree
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Deepest level shown; the root's children are level 1. None = unlimited
    pub max_depth: Option<usize>,
    pub show_hidden: bool,
    pub show_files: bool,
    pub exclude: Vec<Pattern>,
}

impl TreeOptions {
    /// Compile exclude globs, rejecting invalid patterns up front
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self, NasError> {
        for pattern in patterns {
            let compiled = Pattern::new(pattern).map_err(|e| {
                NasError::InvalidInput(format!("bad exclude pattern '{}': {}", pattern, e))
            })?;
            self.exclude.push(compiled);
        }
        Ok(self)
    }

    fn is_visible(&self, name: &str, is_dir: bool) -> bool {
        if !is_dir && !self.show_files {
            return false;
        }
        if !self.show_hidden && name.starts_with('.') {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(name))
    }
}

#[derive(Debug, Default)]
struct TreeCounts {
    dirs: usize,
    files: usize,
}

/// Render `root` as box-drawing text, ending with a count line
pub fn render_tree(root: &Path, options: &TreeOptions) -> Result<String, NasError> {
    if !root.is_dir() {
        return Err(NasError::DirectoryNotFound(root.to_path_buf()));
    }

    let mut out = format!("{}\n", root.display());
    let mut counts = TreeCounts::default();
    render_children(root, "", 1, options, &mut out, &mut counts);

    if options.show_files {
        out.push_str(&format!(
            "\n{} directories, {} files\n",
            counts.dirs, counts.files
        ));
    } else {
        out.push_str(&format!("\n{} directories\n", counts.dirs));
    }
    Ok(out)
}

/// Visible children of `dir`: directories first, then files, each sorted case-insensitively
fn visible_children(dir: &Path, options: &TreeOptions) -> std::io::Result<Vec<(String, PathBuf, bool)>> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let is_dir = entry.file_type()?.is_dir();
        if options.is_visible(&name, is_dir) {
            children.push((name, entry.path(), is_dir));
        }
    }
    children.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
            .then_with(|| a.0.cmp(&b.0))
    });
    Ok(children)
}

fn render_children(
    dir: &Path,
    prefix: &str,
    depth: usize,
    options: &TreeOptions,
    out: &mut String,
    counts: &mut TreeCounts,
) {
    if options.max_depth.map(|max| depth > max).unwrap_or(false) {
        return;
    }

    let children = match visible_children(dir, options) {
        Ok(children) => children,
        Err(_) => return,
    };

    let last_index = children.len().saturating_sub(1);
    for (idx, (name, path, is_dir)) in children.into_iter().enumerate() {
        let is_last = idx == last_index;
        let branch = if is_last { "└── " } else { "├── " };

        if is_dir {
            counts.dirs += 1;
            let readable = fs::read_dir(&path).is_ok();
            let suffix = if readable { "" } else { " [unreadable]" };
            out.push_str(&format!("{}{}{}{}\n", prefix, branch, name, suffix));

            if readable {
                let continuation = if is_last { "    " } else { "│   " };
                let child_prefix = format!("{}{}", prefix, continuation);
                render_children(&path, &child_prefix, depth + 1, options, out, counts);
            }
        } else {
            counts.files += 1;
            out.push_str(&format!("{}{}{}\n", prefix, branch, name));
        }
    }
}
