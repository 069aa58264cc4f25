//! Zip packaging of a completed session directory.

use crate::error::Error;
use crate::session::Session;
use std::fs::File;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archives everything under the session directory into
/// `session_<id>.zip` next to it and returns the archive path. Entries are
/// added in sorted order so the archive layout is deterministic.
///
/// # Errors
///
/// Returns `Error::Archive` on any filesystem or zip failure; the caller
/// reports this as an overall batch failure since it prevents delivery.
pub fn zip_session(session: &Session) -> Result<PathBuf, Error> {
    let session_dir = session.dir();
    let archive_path = session
        .root()
        .join(format!("session_{}.zip", session.id()));

    let file = File::create(&archive_path).map_err(|e| Error::Archive {
        reason: format!("could not create {}: {e}", archive_path.display()),
    })?;

    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    add_directory(&mut writer, &session_dir, &session_dir, options)?;

    writer.finish().map_err(|e| Error::Archive {
        reason: format!("could not finalize {}: {e}", archive_path.display()),
    })?;

    Ok(archive_path)
}

fn add_directory(
    writer: &mut ZipWriter<File>,
    base: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<(), Error> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| Error::Archive {
            reason: format!("could not read {}: {e}", dir.display()),
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in entries {
        let name = entry_name(base, &path)?;
        if path.is_dir() {
            writer
                .add_directory(name.as_str(), options)
                .map_err(|e| Error::Archive {
                    reason: format!("could not add directory {name}: {e}"),
                })?;
            add_directory(writer, base, &path, options)?;
        } else {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| Error::Archive {
                    reason: format!("could not add file {name}: {e}"),
                })?;
            let mut source = File::open(&path).map_err(|e| Error::Archive {
                reason: format!("could not open {}: {e}", path.display()),
            })?;
            io::copy(&mut source, writer).map_err(|e| Error::Archive {
                reason: format!("could not copy {}: {e}", path.display()),
            })?;
        }
    }

    writer.flush().map_err(|e| Error::Archive {
        reason: format!("could not flush archive: {e}"),
    })?;
    Ok(())
}

/// Archive entry name relative to the session directory, with forward
/// slashes regardless of platform.
fn entry_name(base: &Path, path: &Path) -> Result<String, Error> {
    let relative = path.strip_prefix(base).map_err(|_| Error::Archive {
        reason: format!("{} escapes the session directory", path.display()),
    })?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
