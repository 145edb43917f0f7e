//! Session log writer
//!
//! Persists one JSON record per finished session and folds its totals
//! into a cross-session aggregate summary. The aggregate read-merge-write
//! runs under an exclusive lock so concurrent finalizes cannot lose
//! updates, and merging is idempotent per session id so a crash-retry
//! cannot double-count.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ModelUsage, SessionTotals};
use crate::{Error, Result};

/// Aggregate summary file name
const SUMMARY_FILE: &str = "usage_summary.json";

/// Sidecar lock guarding the aggregate read-merge-write
const LOCK_FILE: &str = "usage_summary.lock";

/// Attempts to take the lock before giving up
const LOCK_ATTEMPTS: u32 = 50;

/// Pause between lock attempts
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(100);

/// A lock file older than this is assumed abandoned by a crashed process
const LOCK_STALE_AFTER: Duration = Duration::from_secs(30);

/// Lifetime totals merged across every finalized session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_sessions: u64,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_cost: Decimal,
    /// Per-model lifetime breakdown
    pub models: BTreeMap<String, ModelUsage>,
    /// Session ids already merged; the idempotence guard
    pub processed_sessions: BTreeSet<String>,
}

impl AggregateSummary {
    /// Read the summary from disk; a missing file is an empty summary
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Fold one session's totals in. Returns false if already merged.
    pub fn merge(&mut self, totals: &SessionTotals) -> bool {
        if self.processed_sessions.contains(&totals.session_id) {
            return false;
        }

        self.total_sessions += 1;
        self.total_cost += totals.total_cost();
        for (model, usage) in &totals.models {
            self.models.entry(model.clone()).or_default().merge(usage);
        }
        self.processed_sessions.insert(totals.session_id.clone());
        true
    }
}

/// What happened to the aggregate merge during finalize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    /// Totals were folded into the aggregate
    Merged,
    /// This session id was already in the aggregate; nothing changed
    AlreadyMerged,
    /// Both the attempt and its retry failed; totals not in the aggregate
    Dropped,
}

/// Outcome of a finalize: both halves reported independently
#[derive(Debug)]
pub struct FinalizeSummary {
    /// Where the per-session record landed, if the write succeeded
    pub record_path: Option<PathBuf>,
    pub merge: MergeStatus,
}

/// Writes per-session records and maintains the aggregate summary.
///
/// Opened once at process start and handed to the session; all paths
/// live under one log directory.
#[derive(Debug, Clone)]
pub struct UsageLedger {
    log_dir: PathBuf,
}

impl UsageLedger {
    /// Create a ledger rooted at `log_dir`, creating the directory
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(log_dir: impl Into<PathBuf>) -> Result<Self> {
        let log_dir = log_dir.into();
        std::fs::create_dir_all(&log_dir)?;
        Ok(Self { log_dir })
    }

    /// Path of the aggregate summary file
    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.log_dir.join(SUMMARY_FILE)
    }

    /// Path of the per-session record for these totals
    #[must_use]
    pub fn session_record_path(&self, totals: &SessionTotals) -> PathBuf {
        let stamp = totals.started_at.format("%Y-%m-%d_at_%H-%M-%S");
        let short_id: String = totals.session_id.chars().take(8).collect();
        self.log_dir.join(format!("session_{stamp}_{short_id}.json"))
    }

    /// Persist finalized totals: session record first, then the
    /// aggregate merge. The two halves fail independently; a merge
    /// failure is retried once before the totals are dropped with a
    /// loud warning.
    pub fn finalize(&self, totals: &SessionTotals) -> FinalizeSummary {
        let record_path = match self.write_session_record(totals) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "session record written");
                Some(path)
            }
            Err(e) => {
                tracing::error!(error = %e, session = %totals.session_id, "failed to write session record");
                None
            }
        };

        let merge = match self.merge_into_aggregate(totals) {
            Ok(status) => status,
            Err(first) => {
                tracing::warn!(error = %first, session = %totals.session_id, "aggregate merge failed, retrying once");
                match self.merge_into_aggregate(totals) {
                    Ok(status) => status,
                    Err(second) => {
                        tracing::error!(
                            error = %second,
                            session = %totals.session_id,
                            cost = %totals.total_cost(),
                            "aggregate merge failed twice; session totals NOT in lifetime summary"
                        );
                        MergeStatus::Dropped
                    }
                }
            }
        };

        FinalizeSummary { record_path, merge }
    }

    /// Write the per-session JSON record atomically
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails
    pub fn write_session_record(&self, totals: &SessionTotals) -> Result<PathBuf> {
        let path = self.session_record_path(totals);
        let json = serde_json::to_string_pretty(totals)?;
        write_atomic(&self.log_dir, &path, json.as_bytes())?;
        Ok(path)
    }

    /// Read-merge-write the aggregate summary under the exclusive lock
    ///
    /// # Errors
    ///
    /// Returns error if the lock cannot be taken or the read/write fails
    pub fn merge_into_aggregate(&self, totals: &SessionTotals) -> Result<MergeStatus> {
        let _lock = AggregateLock::acquire(&self.log_dir)?;

        let path = self.summary_path();
        let mut summary = AggregateSummary::load(&path)?;

        if !summary.merge(totals) {
            tracing::debug!(session = %totals.session_id, "session already merged, skipping");
            return Ok(MergeStatus::AlreadyMerged);
        }

        let json = serde_json::to_string_pretty(&summary)?;
        write_atomic(&self.log_dir, &path, json.as_bytes())?;

        tracing::info!(
            session = %totals.session_id,
            sessions = summary.total_sessions,
            lifetime_cost = %summary.total_cost,
            "aggregate summary updated"
        );
        Ok(MergeStatus::Merged)
    }
}

/// Write bytes to `path` via a temp file in the same directory plus an
/// atomic rename, so readers never observe a half-written file.
fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| Error::Persistence(format!("persist {}: {}", path.display(), e.error)))?;
    Ok(())
}

/// Exclusive advisory lock over the aggregate file, held for the
/// duration of one read-merge-write. Created with `create_new` so only
/// one process can hold it; removed on drop.
struct AggregateLock {
    path: PathBuf,
}

impl AggregateLock {
    fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE);

        for _ in 0..LOCK_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if lock_is_stale(&path) {
                        tracing::warn!(path = %path.display(), "removing stale aggregate lock");
                        let _ = std::fs::remove_file(&path);
                        continue;
                    }
                    std::thread::sleep(LOCK_RETRY_DELAY);
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::Persistence(
            "timed out waiting for aggregate summary lock".to_string(),
        ))
    }
}

impl Drop for AggregateLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove lock file");
        }
    }
}

/// A leftover lock from a crashed process should not wedge accounting
/// forever.
fn lock_is_stale(path: &Path) -> bool {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| modified.elapsed().ok())
        .is_some_and(|age| age > LOCK_STALE_AFTER)
}

#[cfg(test)]
mod tests {
    use super::super::{Direction, Modality, RateTable, UsageAccumulator, UsageEvent};
    use super::*;

    const REALTIME: &str = "gpt-4o-realtime-preview-2024-12-17";

    fn sample_totals(session_id: &str) -> SessionTotals {
        let mut acc = UsageAccumulator::new(session_id, RateTable::builtin());
        acc.record(&UsageEvent::now(REALTIME, Modality::Text, Direction::Input, 1000));
        acc.record(&UsageEvent::now(REALTIME, Modality::Audio, Direction::Output, 30));
        acc.finish()
    }

    #[test]
    fn finalize_writes_record_and_merges() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = UsageLedger::new(dir.path()).unwrap();
        let totals = sample_totals("sess-a");

        let outcome = ledger.finalize(&totals);
        assert_eq!(outcome.merge, MergeStatus::Merged);
        let record = outcome.record_path.expect("record should be written");
        assert!(record.exists());

        let summary = AggregateSummary::load(&ledger.summary_path()).unwrap();
        assert_eq!(summary.total_sessions, 1);
        assert_eq!(summary.total_cost, totals.total_cost());
    }

    #[test]
    fn merge_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = UsageLedger::new(dir.path()).unwrap();
        let totals = sample_totals("sess-b");

        assert_eq!(ledger.merge_into_aggregate(&totals).unwrap(), MergeStatus::Merged);
        assert_eq!(
            ledger.merge_into_aggregate(&totals).unwrap(),
            MergeStatus::AlreadyMerged
        );

        let summary = AggregateSummary::load(&ledger.summary_path()).unwrap();
        assert_eq!(summary.total_sessions, 1);
        assert_eq!(summary.total_cost, totals.total_cost());
    }

    #[test]
    fn merge_adds_exactly_session_cost() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = UsageLedger::new(dir.path()).unwrap();

        let first = sample_totals("sess-c");
        ledger.finalize(&first);
        let before = AggregateSummary::load(&ledger.summary_path()).unwrap();

        let second = sample_totals("sess-d");
        ledger.finalize(&second);
        let after = AggregateSummary::load(&ledger.summary_path()).unwrap();

        assert_eq!(after.total_cost, before.total_cost + second.total_cost());
        assert_eq!(after.total_sessions, 2);
    }

    #[test]
    fn session_record_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = UsageLedger::new(dir.path()).unwrap();
        let totals = sample_totals("sess-e");

        let path = ledger.write_session_record(&totals).unwrap();
        let read: SessionTotals =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(read, totals);
    }

    #[test]
    fn stale_lock_is_broken() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = UsageLedger::new(dir.path()).unwrap();

        // Simulate a crashed writer's leftover lock, aged past the
        // staleness horizon.
        let lock_path = dir.path().join(LOCK_FILE);
        std::fs::write(&lock_path, b"").unwrap();
        let old = std::time::SystemTime::now() - Duration::from_secs(120);
        let file = OpenOptions::new().write(true).open(&lock_path).unwrap();
        file.set_modified(old).unwrap();
        drop(file);

        let totals = sample_totals("sess-f");
        assert_eq!(ledger.merge_into_aggregate(&totals).unwrap(), MergeStatus::Merged);
    }

    #[test]
    fn concurrent_finalizes_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = UsageLedger::new(dir.path()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    let totals = sample_totals(&format!("sess-par-{i}"));
                    ledger.finalize(&totals)
                })
            })
            .collect();

        for handle in handles {
            let outcome = handle.join().unwrap();
            assert_eq!(outcome.merge, MergeStatus::Merged);
        }

        let summary = AggregateSummary::load(&ledger.summary_path()).unwrap();
        assert_eq!(summary.total_sessions, 4);
        let expected = sample_totals("x").total_cost() * Decimal::from(4);
        assert_eq!(summary.total_cost, expected);
    }
}
