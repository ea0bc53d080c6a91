//! Orphaned Media Sweep Background Job
//!
//! Media files are written to durable storage before the database row that
//! references them commits. A failed or crashed mutation can therefore leave
//! files on disk that no post references (including truncated partial
//! copies). This job reclaims them: it runs once at startup and then daily,
//! deleting stored files that no post row references and that are older than
//! a grace period.
//!
//! The grace period keeps the sweep from racing an in-flight mutation whose
//! file is written but whose transaction has not committed yet.

use crate::db::post_repo;
use crate::media::{MediaClass, MediaStore};
use crate::metrics;
use sqlx::PgPool;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime};
use tokio::time::sleep;

/// Minimum age before an unreferenced file is considered orphaned.
const GRACE_PERIOD: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Sweep interval after the startup run.
const CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60); // 24 hours

pub async fn start_orphan_sweep(db: PgPool, store: MediaStore) {
    tracing::info!(
        "Starting orphan sweep background job (check_interval={}h, grace_period={}m)",
        CHECK_INTERVAL.as_secs() / 3600,
        GRACE_PERIOD.as_secs() / 60
    );

    loop {
        let cycle_start = Instant::now();

        match sweep_once(&db, &store).await {
            Ok(removed) => {
                metrics::record_sweep_run("success");
                metrics::record_orphans_removed(removed);
                tracing::info!(
                    removed,
                    duration_ms = cycle_start.elapsed().as_millis(),
                    "orphan sweep cycle completed"
                );
            }
            Err(e) => {
                metrics::record_sweep_run("error");
                tracing::error!(error = %e, "orphan sweep failed");
            }
        }

        sleep(CHECK_INTERVAL).await;
    }
}

/// Run one sweep cycle; returns the number of files removed.
pub async fn sweep_once(db: &PgPool, store: &MediaStore) -> Result<u64, sqlx::Error> {
    let referenced = post_repo::referenced_media_filenames(db).await?;

    let mut removed = 0;
    for class in [MediaClass::Image, MediaClass::Video] {
        removed += sweep_dir(&store.class_dir(class), &referenced);
    }

    Ok(removed)
}

fn sweep_dir(dir: &Path, referenced: &HashSet<String>) -> u64 {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        // Directory does not exist until the first upload of that class.
        Err(_) => return 0,
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if referenced.contains(name) {
            continue;
        }
        if !older_than_grace(&path) {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(file = %path.display(), "removed orphaned media file");
                removed += 1;
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "could not remove orphan");
            }
        }
    }

    removed
}

fn older_than_grace(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };

    match SystemTime::now().duration_since(modified) {
        Ok(age) => age >= GRACE_PERIOD,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn referenced_and_recent_files_survive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("kept.png"), b"x").unwrap();
        fs::write(dir.path().join("fresh.png"), b"y").unwrap();

        let referenced: HashSet<String> = ["kept.png".to_string()].into_iter().collect();

        // Both files are newer than the grace period, so neither is removed
        // regardless of reference status.
        let removed = sweep_dir(dir.path(), &referenced);
        assert_eq!(removed, 0);
        assert!(dir.path().join("kept.png").exists());
        assert!(dir.path().join("fresh.png").exists());
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("images");
        assert_eq!(sweep_dir(&missing, &HashSet::new()), 0);
    }
}
