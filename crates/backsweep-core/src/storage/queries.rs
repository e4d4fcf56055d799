use super::models::*;
use super::sqlite::Database;
use rusqlite::{params, OptionalExtension, Result};

impl Database {
    // ── Fingerprint cache ────────────────────────────────────────

    /// Fetch a cached local fingerprint, honored only while the live file's
    /// (size, mtime) still matches the row it was computed against.
    pub fn get_fingerprint(
        &self,
        local_path: &str,
        file_size: i64,
        mtime_ns: i64,
    ) -> Result<Option<String>> {
        self.connection()
            .query_row(
                "SELECT digest FROM fingerprint_cache \
                 WHERE local_path = ?1 AND file_size = ?2 AND mtime_ns = ?3",
                params![local_path, file_size, mtime_ns],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn upsert_fingerprint(
        &self,
        local_path: &str,
        file_size: i64,
        mtime_ns: i64,
        digest: &str,
    ) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.connection().execute(
            "INSERT INTO fingerprint_cache \
             (local_path, file_size, mtime_ns, digest, computed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(local_path) DO UPDATE SET \
                 file_size = excluded.file_size, \
                 mtime_ns = excluded.mtime_ns, \
                 digest = excluded.digest, \
                 computed_at = excluded.computed_at",
            params![local_path, file_size, mtime_ns, digest, now],
        )?;
        Ok(())
    }

    // ── Verdicts ─────────────────────────────────────────────────

    pub fn get_verdict(&self, local_path: &str, root_id: &str) -> Result<Option<VerdictRow>> {
        self.connection()
            .query_row(
                "SELECT local_path, file_size, mtime_ns, root_id, status, \
                        backup_digest, checked_at \
                 FROM verdict WHERE local_path = ?1 AND root_id = ?2",
                params![local_path, root_id],
                |row| {
                    let status_str: String = row.get(4)?;
                    Ok(VerdictRow {
                        local_path: row.get(0)?,
                        file_size: row.get(1)?,
                        mtime_ns: row.get(2)?,
                        root_id: row.get(3)?,
                        status: VerdictStatus::parse(&status_str)
                            .unwrap_or(VerdictStatus::Indeterminate),
                        backup_digest: row.get(5)?,
                        checked_at: row.get(6)?,
                    })
                },
            )
            .optional()
    }

    pub fn upsert_verdict(&self, verdict: &VerdictRow) -> Result<()> {
        self.connection().execute(
            "INSERT INTO verdict \
             (local_path, file_size, mtime_ns, root_id, status, backup_digest, checked_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(local_path, root_id) DO UPDATE SET \
                 file_size = excluded.file_size, \
                 mtime_ns = excluded.mtime_ns, \
                 status = excluded.status, \
                 backup_digest = excluded.backup_digest, \
                 checked_at = excluded.checked_at",
            params![
                verdict.local_path,
                verdict.file_size,
                verdict.mtime_ns,
                verdict.root_id,
                verdict.status.as_str(),
                verdict.backup_digest,
                verdict.checked_at,
            ],
        )?;
        Ok(())
    }

    /// Drop every row keyed to a local path, fingerprint and verdicts alike.
    /// Called after the local copy is deleted.
    pub fn invalidate_local_path(&self, local_path: &str) -> Result<()> {
        self.connection().execute(
            "DELETE FROM fingerprint_cache WHERE local_path = ?1",
            params![local_path],
        )?;
        self.connection().execute(
            "DELETE FROM verdict WHERE local_path = ?1",
            params![local_path],
        )?;
        Ok(())
    }

    /// (fingerprint rows, verdict rows) currently stored.
    pub fn cache_stats(&self) -> Result<(i64, i64)> {
        let fingerprints: i64 = self.connection().query_row(
            "SELECT COUNT(*) FROM fingerprint_cache",
            [],
            |row| row.get(0),
        )?;
        let verdicts: i64 =
            self.connection()
                .query_row("SELECT COUNT(*) FROM verdict", [], |row| row.get(0))?;
        Ok((fingerprints, verdicts))
    }
}
