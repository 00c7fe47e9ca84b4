use crate::core::error;
use crate::core::pool;
use crate::core::store::Store;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// The DB Broker is the single entry point for inventory state access.
///
/// Reads go straight to a fresh pooled connection. Writes are serialized by
/// the pool and leave one line in `inventory.events.jsonl` whether they
/// succeed or fail.
pub struct DbBroker {
    db_path: PathBuf,
    audit_log_path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub op: String,
    pub db_id: String,
    pub record_id: Option<String>,
    pub status: String,
}

/// The op and record a successful write is audited under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    pub op: String,
    pub record_id: Option<String>,
}

impl AuditTarget {
    pub fn new(op: &str, record_id: Option<&str>) -> Self {
        Self {
            op: op.to_string(),
            record_id: record_id.map(str::to_string),
        }
    }
}

impl DbBroker {
    pub fn new(store: &Store) -> Self {
        Self {
            db_path: store.db_path(),
            audit_log_path: store.events_path(),
        }
    }

    pub fn read<F, R>(&self, op_name: &str, f: F) -> Result<R, error::PlushyError>
    where
        F: FnOnce(&Connection) -> Result<R, error::PlushyError>,
    {
        tracing::trace!(op = op_name, "store read");
        pool::global_pool().with_read(&self.db_path, f)
    }

    /// Execute a closure with the serialized write connection and audit the outcome.
    pub fn write<F, R>(
        &self,
        op_name: &str,
        record_id: Option<&str>,
        f: F,
    ) -> Result<R, error::PlushyError>
    where
        F: FnOnce(&Connection) -> Result<R, error::PlushyError>,
    {
        self.write_reporting(op_name, record_id, |conn| {
            let value = f(conn)?;
            Ok((value, AuditTarget::new(op_name, record_id)))
        })
    }

    /// Like [`DbBroker::write`], but the closure names the op and record it
    /// actually touched. `op_name` and `record_id` are only used when the
    /// closure fails.
    ///
    /// The audit log is opened before the write runs, so an unwritable log
    /// stops the write before anything commits. A failure to append the line
    /// afterwards is logged and the write's own result is returned.
    pub fn write_reporting<F, R>(
        &self,
        op_name: &str,
        record_id: Option<&str>,
        f: F,
    ) -> Result<R, error::PlushyError>
    where
        F: FnOnce(&Connection) -> Result<(R, AuditTarget), error::PlushyError>,
    {
        let mut log = self.open_audit_log()?;
        let result = pool::global_pool().with_write(&self.db_path, f);

        let (outcome, target, status) = match result {
            Ok((value, target)) => (Ok(value), target, "success"),
            Err(e) => {
                let status = if e.is_not_found() { "not_found" } else { "error" };
                (Err(e), AuditTarget::new(op_name, record_id), status)
            }
        };
        tracing::debug!(
            op = %target.op,
            record_id = target.record_id.as_deref().unwrap_or(""),
            status,
            "store write"
        );
        if let Err(e) = self.append_event(&mut log, &target, status) {
            tracing::error!(
                op = %target.op,
                error = %e,
                "audit line not written after store write"
            );
        }

        outcome
    }

    fn open_audit_log(&self) -> Result<File, error::PlushyError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)
            .map_err(error::PlushyError::IoError)
    }

    fn append_event(
        &self,
        log: &mut File,
        target: &AuditTarget,
        status: &str,
    ) -> Result<(), error::PlushyError> {
        let db_id = self
            .db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            op: target.op.clone(),
            db_id,
            record_id: target.record_id.clone(),
            status: status.to_string(),
        };

        let line = serde_json::to_string(&ev)
            .map_err(|e| error::PlushyError::ValidationError(e.to_string()))?;
        writeln!(log, "{}", line).map_err(error::PlushyError::IoError)?;
        Ok(())
    }
}
