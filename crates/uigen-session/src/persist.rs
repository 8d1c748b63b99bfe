//! JSON file helpers shared by the file-backed collaborators

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{self, Write as _};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Read a JSON document; a missing file reads as `None`.
pub(crate) fn read_json<T, E>(path: &Path) -> Result<Option<T>, E>
where
    T: DeserializeOwned,
    E: From<io::Error> + From<serde_json::Error>,
{
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Distinguishes temp files of concurrent writers within one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Write a JSON document via temp file + fsync + rename.
///
/// The temp file is removed if any step fails.
pub(crate) fn write_json_atomic<T, E>(path: &Path, value: &T) -> Result<(), E>
where
    T: Serialize + ?Sized,
    E: From<io::Error> + From<serde_json::Error>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_vec_pretty(value)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state.json".to_string());
    let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let temp_path = path.with_file_name(format!("{file_name}.tmp.{}.{seq}", std::process::id()));

    if let Err(e) = write_and_rename(&temp_path, path, &json) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

fn write_and_rename(temp_path: &Path, path: &Path, json: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(json)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp_path, path)
}

/// Remove a file; already gone counts as removed.
pub(crate) fn remove_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
