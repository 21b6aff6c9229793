//! Request target resolution module
//!
//! Maps a request path onto the working directory and classifies what is
//! there. Resolved paths never leave the root: `..` segments are refused and
//! the canonical result must still sit below the canonical root, which also
//! catches symlinks pointing outside.

use crate::logger;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// What a request path points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Directory(PathBuf),
    File {
        path: PathBuf,
        /// Name as requested, used for `Content-Disposition`
        name: String,
        size: u64,
    },
    Missing,
}

/// Join a request path onto `root` lexically, `None` if it tries to escape
pub fn contain(root: &Path, request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();

    let mut joined = root.to_path_buf();
    for segment in decoded.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        // Exactly one normal component, so no "..", drive prefix or separator
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => joined.push(part),
            _ => return None,
        }
    }
    Some(joined)
}

/// Resolve and classify `request_path` below the canonical `root`
///
/// Anything that is absent, escapes the root, or is neither a regular file
/// nor a directory resolves to `Missing`.
pub async fn resolve(root: &Path, request_path: &str) -> io::Result<ResolvedTarget> {
    let Some(candidate) = contain(root, request_path) else {
        logger::log_warning(&format!("Path traversal attempt blocked: {request_path}"));
        return Ok(ResolvedTarget::Missing);
    };

    // Missing files are the common 404 case, not worth a warning
    let canonical = match fs::canonicalize(&candidate).await {
        Ok(p) => p,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                logger::log_debug(&format!("Cannot resolve '{}': {e}", candidate.display()));
            }
            return Ok(ResolvedTarget::Missing);
        }
    };

    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            request_path,
            canonical.display()
        ));
        return Ok(ResolvedTarget::Missing);
    }

    let metadata = fs::metadata(&canonical).await?;
    if metadata.is_dir() {
        Ok(ResolvedTarget::Directory(canonical))
    } else if metadata.is_file() {
        let name = candidate
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(ResolvedTarget::File {
            path: canonical,
            name,
            size: metadata.len(),
        })
    } else {
        Ok(ResolvedTarget::Missing)
    }
}
