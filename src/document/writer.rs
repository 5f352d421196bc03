//! Rendering and writing the headers middleware document.
//!
//! # Responsibilities
//! - Render the one fixed document shape the proxy expects
//! - Replace the target file without exposing a half-written document
//!
//! # Design Decisions
//! - Template renderer, not a YAML serializer: the shape never varies
//! - Two spaces per nesting level
//! - Written to a sibling temp file, then renamed over the target
//! - No backup here; the transaction owns snapshots

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::document::version::VERSION_MARKER;
use crate::error::{UpdateError, UpdateResult};
use crate::source::{HeaderSet, TIMESTAMP_FORMAT};

const INDENT: &str = "  ";

/// Plain scalars YAML would read as something other than a string.
const RESERVED_WORDS: &[&str] = &["true", "false", "yes", "no", "on", "off", "null", "y", "n", "~"];

/// Render the document text.
pub fn render_document(source_url: &str, middleware: &str, set: &HeaderSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# DO NOT MODIFY. THIS FILE IS GENERATED FROM {}", source_url);
    let _ = writeln!(out, "{}{}", VERSION_MARKER, set.version().format(TIMESTAMP_FORMAT));

    let middleware_key = format!("{}:", yaml_key(middleware));
    let sections: [&str; 5] = ["http:", "middlewares:", &middleware_key, "headers:", "customResponseHeaders:"];
    for (depth, section) in sections.iter().enumerate() {
        let _ = writeln!(out, "{}{}", INDENT.repeat(depth), section);
    }

    let indent = INDENT.repeat(sections.len());
    for header in set.headers() {
        let _ = writeln!(out, "{}{}: \"\"", indent, yaml_key(header));
    }
    out
}

/// Render and write the document to `path`, replacing any existing content.
pub fn write_document(path: &Path, source_url: &str, middleware: &str, set: &HeaderSet) -> UpdateResult<()> {
    let rendered = render_document(source_url, middleware, set);
    replace_file(path, rendered.as_bytes()).map_err(|source| UpdateError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        version = %set.version(),
        headers = set.headers().len(),
        "Middleware document written"
    );
    Ok(())
}

fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;

    // Temp files are created 0600; keep the mode the proxy could already read.
    match fs::metadata(path) {
        Ok(meta) => fs::set_permissions(tmp.path(), meta.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => set_default_mode(tmp.path())?,
        Err(e) => return Err(e),
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_default_mode(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_mode(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Header names are tokens and almost always plain; quote the rest.
///
/// Names come from a remote list, so anything outside the plain token
/// alphabet is double-quoted with control characters escaped.
fn yaml_key(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !RESERVED_WORDS.contains(&name.to_ascii_lowercase().as_str());
    if plain {
        return name.to_string();
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(quoted, "\\u{:04X}", c as u32);
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
