//! Edits to C preprocessor config headers.

use std::io::Write as _;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use regex::Regex;

use crate::error::FlagError;
use crate::flag::FlagName;

/// Insert `content` relative to the first line equal to `anchor`.
///
/// The insertion point is `anchor_index + offset`. Lines are compared without
/// their line terminators, so `anchor` may be given with or without a trailing
/// newline. `content` is inserted as-is and should carry its own newline(s).
///
/// The file is rewritten through a temporary file in the same directory and
/// then renamed over the original. On any error the original is untouched.
pub fn insert_at(path: &Path, anchor: &str, offset: isize, content: &str) -> Result<()> {
    let original = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut lines: Vec<&str> = original.split_inclusive('\n').collect();

    let anchor_trimmed = trim_eol(anchor);
    let Some(anchor_index) = lines.iter().position(|line| trim_eol(line) == anchor_trimmed)
    else {
        return Err(FlagError::AnchorNotFound {
            path: path.to_path_buf(),
            anchor: anchor_trimmed.to_string(),
        }
        .into());
    };

    let index = match anchor_index.checked_add_signed(offset) {
        Some(index) if index <= lines.len() => index,
        _ => bail!(
            "Insertion point {} + {} is outside {} ({} lines)",
            anchor_index,
            offset,
            path.display(),
            lines.len()
        ),
    };
    // A final line without a terminator gets one before anything follows it
    let needs_eol = index > 0 && !lines[index - 1].ends_with('\n');
    lines.insert(index, content);
    if needs_eol {
        lines.insert(index, "\n");
    }

    write_atomically(path, &lines.concat())
}

/// Whether the header already has a `#define` for `flag`.
pub fn defines_flag(path: &Path, flag: &FlagName) -> Result<bool> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let define_re = Regex::new(&format!(
        r"(?m)^\s*#\s*define\s+{}(\s|$)",
        regex::escape(flag.as_str())
    ))?;
    Ok(define_re.is_match(&contents))
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = std::fs::metadata(path)?.permissions();

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    std::fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
