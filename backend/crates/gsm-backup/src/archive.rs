//! Zip codec for data-directory snapshots. Blocking; run on a blocking thread.

use crate::{BackupError, Result as BackupResult};

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Archive every file and directory under `source` into a new zip at `dest`.
/// Entry names are relative to `source`. Returns the archive size in bytes.
pub fn write_archive(source: &Path, dest: &Path) -> BackupResult<u64> {
    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut pending = vec![source.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)?.collect::<io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = entry.file_type()?;
            let Some(name) = entry_name(source, &path) else {
                continue;
            };

            if file_type.is_dir() {
                zip.add_directory(format!("{}/", name), options)?;
                pending.push(path);
            } else if file_type.is_file() {
                let options = with_unix_mode(options, &entry.metadata()?);
                zip.start_file(name, options)?;
                io::copy(&mut File::open(&path)?, &mut zip)?;
            } else {
                log::debug!("Skipping {} (not a regular file)", path.display());
            }
        }
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(fs::metadata(dest)?.len())
}

/// Unpack `archive` into `dest`, creating it. Entries that would land outside
/// `dest` fail the whole extraction. Returns the number of entries written.
pub fn extract_archive(archive: &Path, dest: &Path) -> BackupResult<usize> {
    let mut zip = ZipArchive::new(BufReader::new(File::open(archive)?))?;
    fs::create_dir_all(dest)?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(BackupError::restore_failed(format!(
                "archive entry '{}' escapes the target directory",
                entry.name()
            )));
        };
        let out = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out)?;
            continue;
        }

        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&out)?;
        io::copy(&mut entry, &mut file)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out, fs::Permissions::from_mode(mode))?;
        }
    }

    Ok(zip.len())
}

/// `/`-separated path of `path` relative to `root`.
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join("/"))
}

#[cfg(unix)]
fn with_unix_mode(options: SimpleFileOptions, metadata: &fs::Metadata) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;
    options.unix_permissions(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn with_unix_mode(options: SimpleFileOptions, _metadata: &fs::Metadata) -> SimpleFileOptions {
    options
}
