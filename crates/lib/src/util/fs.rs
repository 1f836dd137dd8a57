//! Atomic file replacement.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::trace;

/// Replace `path` with `content` so readers never observe a partial file.
///
/// The content is written to a temporary file in the destination directory
/// and renamed over the target. An existing target keeps its permissions,
/// a new file gets the usual `0644`.
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));

  let mut temp = NamedTempFile::new_in(dir)?;
  temp.write_all(content.as_bytes())?;
  temp.as_file().sync_all()?;

  match fs::metadata(path) {
    Ok(metadata) => fs::set_permissions(temp.path(), metadata.permissions())?,
    Err(e) if e.kind() == io::ErrorKind::NotFound => set_default_permissions(temp.path())?,
    Err(e) => return Err(e),
  }

  temp.persist(path).map_err(|e| e.error)?;
  trace!(path = %path.display(), bytes = content.len(), "replaced file");
  Ok(())
}

#[cfg(unix)]
fn set_default_permissions(path: &Path) -> io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_default_permissions(_path: &Path) -> io::Result<()> {
  Ok(())
}
