//! Point-in-time archives of the server's data directory.

use crate::{
    BackupError, BackupMetrics, BackupSettings, Result as BackupResult, extract_archive,
    write_archive,
};

use gsm_core::{BackupRecord, BackupType, Clock, ServerState};
use gsm_db::BackupRepository;
use gsm_supervisor::ServerSupervisor;

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{Instrument, info_span};
use uuid::Uuid;

/// Proof that no other create, restore or delete runs until this is dropped.
pub struct BackupOperationGuard {
    _guard: OwnedMutexGuard<()>,
}

/// An opened archive ready to be streamed to a client.
pub struct BackupDownload {
    pub record: BackupRecord,
    pub file: tokio::fs::File,
    pub size_bytes: u64,
}

/// Creates, lists, deletes and restores archives.
///
/// Create, restore and delete share one operation lock and fail with `Busy`
/// instead of waiting. Restore additionally holds the supervisor's lifecycle
/// lock (taken first) so the server cannot be started mid-swap.
#[derive(Clone)]
pub struct BackupStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    settings: BackupSettings,
    repository: BackupRepository,
    supervisor: ServerSupervisor,
    clock: Arc<dyn Clock>,
    operation: Arc<Mutex<()>>,
    metrics: BackupMetrics,
}

impl BackupStore {
    pub fn new(
        settings: BackupSettings,
        repository: BackupRepository,
        supervisor: ServerSupervisor,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                settings,
                repository,
                supervisor,
                clock,
                operation: Arc::new(Mutex::new(())),
                metrics: BackupMetrics::new(),
            }),
        }
    }

    pub fn settings(&self) -> &BackupSettings {
        &self.inner.settings
    }

    /// Take the backup-operation lock without waiting.
    pub fn try_begin_operation(&self) -> BackupResult<BackupOperationGuard> {
        let guard = Arc::clone(&self.inner.operation)
            .try_lock_owned()
            .map_err(|_| BackupError::busy())?;
        Ok(BackupOperationGuard { _guard: guard })
    }

    /// Snapshot the data directory into a new archive.
    pub async fn create(
        &self,
        backup_type: BackupType,
        description: impl Into<String>,
    ) -> BackupResult<BackupRecord> {
        let description = description.into();
        let _operation = self.try_begin_operation()?;

        self.create_locked(backup_type, description)
            .instrument(info_span!("backup", operation = "create", backup_type = backup_type.as_str()))
            .await
    }

    /// Newest first.
    pub async fn list(&self) -> BackupResult<Vec<BackupRecord>> {
        Ok(self.inner.repository.find_all().await?)
    }

    pub async fn get(&self, id: Uuid) -> BackupResult<BackupRecord> {
        self.inner
            .repository
            .find(id)
            .await?
            .ok_or_else(|| BackupError::backup_not_found(id))
    }

    /// Remove an archive and its record.
    pub async fn delete(&self, id: Uuid) -> BackupResult<BackupRecord> {
        let _operation = self.try_begin_operation()?;
        let record = self.get(id).await?;

        let path = self.archive_path(&record)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Archive {} was already missing, removing its record", path.display());
            }
            Err(e) => return Err(e.into()),
        }

        if !self.inner.repository.delete(id).await? {
            return Err(BackupError::backup_not_found(id));
        }

        self.inner.metrics.deleted();
        info!("Deleted backup {} ({})", record.filename, record.id);
        Ok(record)
    }

    /// Replace the data directory with the contents of backup `id`.
    /// The server must be Stopped for the whole operation.
    pub async fn restore(&self, id: Uuid) -> BackupResult<BackupRecord> {
        let supervisor = &self.inner.supervisor;
        let state = supervisor.state();
        if state != ServerState::Stopped {
            return Err(BackupError::server_running(state));
        }

        let record = self.get(id).await?;

        // Lock order: supervisor lifecycle, then backup operation.
        let _lifecycle = supervisor.try_lock_lifecycle().map_err(|_| {
            // Still Stopped means another restore holds the lock, not a start.
            match supervisor.state() {
                ServerState::Stopped => BackupError::busy(),
                state => BackupError::server_running(state),
            }
        })?;
        let _operation = self.try_begin_operation()?;

        let state = supervisor.state();
        if state != ServerState::Stopped {
            return Err(BackupError::server_running(state));
        }

        let result = self
            .restore_locked(&record)
            .instrument(info_span!("backup", operation = "restore", id = %record.id))
            .await;

        match result {
            Ok(()) => {
                self.inner.metrics.restored();
                info!(
                    "Restored {} into {}",
                    record.filename,
                    self.inner.settings.data_dir.display()
                );
                Ok(record)
            }
            Err(e) => {
                self.inner.metrics.restore_failed();
                error!("Restore of {} failed: {}", record.filename, e);
                Err(e)
            }
        }
    }

    /// Open backup `id` for streaming. The bytes are the archive as stored.
    pub async fn download(&self, id: Uuid) -> BackupResult<BackupDownload> {
        let record = self.get(id).await?;
        let path = self.archive_path(&record)?;

        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Backup {} has no archive at {}", id, path.display());
                return Err(BackupError::backup_not_found(id));
            }
            Err(e) => return Err(e.into()),
        };
        let size_bytes = file.metadata().await?.len();

        Ok(BackupDownload {
            record,
            file,
            size_bytes,
        })
    }

    async fn create_locked(
        &self,
        backup_type: BackupType,
        description: String,
    ) -> BackupResult<BackupRecord> {
        let settings = &self.inner.settings;

        let data_is_dir = tokio::fs::metadata(&settings.data_dir)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !data_is_dir {
            self.inner.metrics.failed();
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("data directory {} does not exist", settings.data_dir.display()),
            )
            .into());
        }
        tokio::fs::create_dir_all(&settings.backup_dir).await?;

        let created_at = self.inner.clock.now();
        let filename = self.unique_filename(backup_type, created_at).await?;
        let final_path = settings.backup_dir.join(&filename);
        let partial_path = settings.backup_dir.join(format!(".{}.partial", filename));

        let quiesced = self.pause_saves().await;
        let archived = self.archive_into(&partial_path).await;
        if quiesced {
            self.resume_saves().await;
        }

        let size_bytes = match archived {
            Ok(size) => size,
            Err(e) => {
                remove_quietly(&partial_path).await;
                self.inner.metrics.failed();
                error!("Backup {} failed: {}", filename, e);
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial_path, &final_path).await {
            remove_quietly(&partial_path).await;
            self.inner.metrics.failed();
            return Err(e.into());
        }

        let record = BackupRecord::new(filename, backup_type, created_at, size_bytes, description);
        if let Err(e) = self.inner.repository.save(&record).await {
            remove_quietly(&final_path).await;
            self.inner.metrics.failed();
            return Err(e.into());
        }

        self.inner.metrics.created(backup_type, size_bytes);
        info!(
            "Created {} backup {} ({} bytes)",
            backup_type, record.filename, record.size_bytes
        );
        Ok(record)
    }

    async fn archive_into(&self, partial_path: &Path) -> BackupResult<u64> {
        let source = self.inner.settings.data_dir.clone();
        let dest = partial_path.to_path_buf();

        tokio::task::spawn_blocking(move || write_archive(&source, &dest))
            .await
            .map_err(io::Error::other)?
    }

    async fn restore_locked(&self, record: &BackupRecord) -> BackupResult<()> {
        let archive = self.archive_path(record)?;
        if !tokio::fs::try_exists(&archive).await.unwrap_or(false) {
            return Err(BackupError::restore_failed(format!(
                "archive {} is missing",
                archive.display()
            )));
        }

        let live = self.inner.settings.data_dir.clone();
        let (staging, previous) = self.restore_paths(&live)?;

        let extract_from = archive.clone();
        let extract_to = staging.clone();
        let extracted =
            tokio::task::spawn_blocking(move || extract_archive(&extract_from, &extract_to))
                .await
                .map_err(io::Error::other)
                .map_err(BackupError::from)
                .and_then(|result| result);

        match extracted {
            Ok(entries) => debug!("Extracted {} entries into {}", entries, staging.display()),
            Err(e) => {
                remove_dir_quietly(&staging).await;
                return Err(match e {
                    BackupError::RestoreFailed { .. } => e,
                    other => BackupError::restore_failed(format!(
                        "could not extract {}: {}",
                        record.filename, other
                    )),
                });
            }
        }

        swap_into_place(&live, &staging, &previous).await
    }

    /// Staging and set-aside paths, siblings of the live directory so renames stay on one volume.
    fn restore_paths(&self, live: &Path) -> BackupResult<(PathBuf, PathBuf)> {
        let (Some(parent), Some(name)) = (live.parent(), live.file_name()) else {
            return Err(BackupError::restore_failed(format!(
                "data directory {} has no parent",
                live.display()
            )));
        };
        let name = name.to_string_lossy();
        let stamp = self.inner.clock.now().format("%Y%m%d%H%M%S%3f");

        Ok((
            parent.join(format!(".{}.restore-{}", name, stamp)),
            parent.join(format!(".{}.pre-restore-{}", name, stamp)),
        ))
    }

    /// `backup-<type>-<timestamp>.zip`, with `-N` appended if that name is taken.
    async fn unique_filename(
        &self,
        backup_type: BackupType,
        created_at: DateTime<Utc>,
    ) -> BackupResult<String> {
        let base = format!(
            "backup-{}-{}",
            backup_type.as_str(),
            created_at.format("%Y%m%d-%H%M%S-%3f")
        );

        let mut candidate = format!("{}.zip", base);
        let mut suffix = 1;
        while tokio::fs::try_exists(self.inner.settings.backup_dir.join(&candidate)).await? {
            candidate = format!("{}-{}.zip", base, suffix);
            suffix += 1;
        }
        Ok(candidate)
    }

    /// Refuses stored names that are not a bare file name.
    fn archive_path(&self, record: &BackupRecord) -> BackupResult<PathBuf> {
        let bare = Path::new(&record.filename).file_name() == Some(OsStr::new(&record.filename));
        if !bare {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("backup {} has an invalid filename '{}'", record.id, record.filename),
            )
            .into());
        }
        Ok(self.inner.settings.backup_dir.join(&record.filename))
    }

    /// Ask a running server to flush and stop writing. Returns whether saves were paused.
    async fn pause_saves(&self) -> bool {
        let settings = &self.inner.settings;
        let supervisor = &self.inner.supervisor;
        if !settings.quiesce || supervisor.state() != ServerState::Running {
            return false;
        }

        if let Err(e) = supervisor.send_command(&settings.save_off_command).await {
            warn!("Could not pause world saves, archiving live data: {}", e);
            return false;
        }

        if settings.save_all_command.trim().is_empty() {
            return true;
        }

        let (_, mut receiver) = supervisor.broadcaster().subscribe();
        if let Err(e) = supervisor.send_command(&settings.save_all_command).await {
            warn!("Could not flush world data: {}", e);
            return true;
        }

        if settings.save_complete_pattern.is_empty() {
            return true;
        }

        let pattern = settings.save_complete_pattern.as_str();
        let flushed = tokio::time::timeout(settings.save_timeout, async {
            while let Some(line) = receiver.recv().await {
                if line.text.contains(pattern) {
                    return true;
                }
            }
            false
        })
        .await
        .unwrap_or(false);

        if flushed {
            debug!("World data flushed");
        } else {
            warn!(
                "No '{}' within {}s, archiving anyway",
                pattern,
                settings.save_timeout.as_secs()
            );
        }
        true
    }

    async fn resume_saves(&self) {
        let command = &self.inner.settings.save_on_command;
        if let Err(e) = self.inner.supervisor.send_command(command).await {
            warn!("Could not re-enable world saves with '{}': {}", command, e);
        }
    }
}

/// Move `live` aside, put `staging` in its place, then drop the old copy.
/// On failure the live directory is put back as it was.
async fn swap_into_place(live: &Path, staging: &Path, previous: &Path) -> BackupResult<()> {
    let had_live = tokio::fs::try_exists(live).await?;

    if had_live && let Err(e) = tokio::fs::rename(live, previous).await {
        remove_dir_quietly(staging).await;
        return Err(BackupError::restore_failed(format!(
            "could not move {} aside: {}",
            live.display(),
            e
        )));
    }

    if let Err(e) = tokio::fs::rename(staging, live).await {
        if had_live && let Err(back) = tokio::fs::rename(previous, live).await {
            error!(
                "Could not put the original data back, it is at {}: {}",
                previous.display(),
                back
            );
        }
        remove_dir_quietly(staging).await;
        return Err(BackupError::restore_failed(format!(
            "could not move restored data into {}: {}",
            live.display(),
            e
        )));
    }

    if had_live && let Err(e) = tokio::fs::remove_dir_all(previous).await {
        warn!("Could not remove previous data at {}: {}", previous.display(), e);
    }

    Ok(())
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Could not remove {}: {}", path.display(), e);
    }
}

async fn remove_dir_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(path).await
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!("Could not remove {}: {}", path.display(), e);
    }
}
