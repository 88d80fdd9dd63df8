//! Best-effort audit sinks.
//!
//! Recording a decision must never fail or block a filter call: every sink
//! swallows its own errors and reports them through `log`.

use crate::config::FilterConfig;
use crate::models::AuditRecord;
use log::{info, warn};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub trait AuditSink: Send + Sync {
    fn record(&self, record: AuditRecord);
}

/// Used when no audit store is configured or it failed to initialise.
#[derive(Debug, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _record: AuditRecord) {}
}

/// Keeps records in memory, in the order they were written.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: AuditRecord) {
        self.records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(record.stamped());
    }
}

/// Appends one JSON document per line.
#[derive(Debug)]
pub struct JsonLinesAuditSink {
    file: Mutex<File>,
}

impl JsonLinesAuditSink {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn record(&self, record: AuditRecord) {
        let line = match serde_json::to_string(&record.stamped()) {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to encode audit record: {}", e);
                return;
            }
        };

        let mut file = self.file.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(e) = writeln!(file, "{}", line) {
            warn!("Failed to write audit record: {}", e);
        }
    }
}

#[cfg(feature = "mongo")]
pub use self::mongo::MongoAuditSink;

#[cfg(feature = "mongo")]
mod mongo {
    use super::AuditSink;
    use crate::error::{FilterError, Result};
    use crate::models::AuditRecord;
    use log::warn;
    use mongodb::bson::{self, Document};
    use mongodb::options::ClientOptions;
    use mongodb::sync::{Client, Collection};
    use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};
    use std::thread;
    use std::time::Duration;

    const QUEUE_CAPACITY: usize = 1024;
    const SERVER_TIMEOUT: Duration = Duration::from_secs(2);

    /// Writes each record as one document into `database.collection`.
    ///
    /// Inserts happen on a dedicated writer thread; `record` only enqueues and
    /// drops the record when the queue is full.
    pub struct MongoAuditSink {
        queue: SyncSender<AuditRecord>,
    }

    impl MongoAuditSink {
        pub fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
            let mut options = ClientOptions::parse(uri).run().map_err(audit_error)?;
            options.server_selection_timeout = Some(SERVER_TIMEOUT);
            options.connect_timeout = Some(SERVER_TIMEOUT);
            let client = Client::with_options(options).map_err(audit_error)?;
            let collection: Collection<Document> = client.database(database).collection(collection);

            let (queue, records) = sync_channel::<AuditRecord>(QUEUE_CAPACITY);
            thread::Builder::new()
                .name("audit-writer".to_string())
                .spawn(move || {
                    for record in records {
                        let document = match to_document(&record.stamped()) {
                            Ok(document) => document,
                            Err(e) => {
                                warn!("Failed to encode audit record: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = collection.insert_one(document).run() {
                            warn!("Failed to log to MongoDB: {}", e);
                        }
                    }
                })
                .map_err(audit_error)?;

            Ok(Self { queue })
        }
    }

    impl AuditSink for MongoAuditSink {
        fn record(&self, record: AuditRecord) {
            match self.queue.try_send(record) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => warn!("Audit queue full, dropping record"),
                Err(TrySendError::Disconnected(_)) => {
                    warn!("Audit writer stopped, dropping record")
                }
            }
        }
    }

    /// Encodes a record, storing the timestamp as a native BSON datetime.
    pub(super) fn to_document(record: &AuditRecord) -> Result<Document> {
        let mut document = bson::to_document(record).map_err(audit_error)?;
        if let Some(timestamp) = record.timestamp {
            document.insert(
                "timestamp",
                bson::DateTime::from_millis(timestamp.timestamp_millis()),
            );
        }
        Ok(document)
    }

    fn audit_error<E: std::fmt::Display>(e: E) -> FilterError {
        FilterError::Audit(e.to_string())
    }

}

/// Picks the audit sink described by the configuration.
///
/// A JSON-lines file wins when `AUDIT_LOG_PATH` is set. Otherwise MongoDB is
/// used when built with the `mongo` feature. Anything that fails to open
/// degrades to [`NoopAuditSink`].
pub fn from_config(config: &FilterConfig) -> Arc<dyn AuditSink> {
    if let Some(path) = &config.audit_log_path {
        match JsonLinesAuditSink::open(path) {
            Ok(sink) => {
                info!("Audit records appended to {:?}", path);
                return Arc::new(sink);
            }
            Err(e) => warn!("Failed to open audit log {:?}: {}", path, e),
        }
    }

    #[cfg(feature = "mongo")]
    {
        match MongoAuditSink::connect(
            &config.database_url,
            &config.audit_database,
            &config.audit_collection,
        ) {
            Ok(sink) => {
                info!(
                    "Audit records sent to {}.{}",
                    config.audit_database, config.audit_collection
                );
                return Arc::new(sink);
            }
            Err(e) => warn!("Failed to connect to MongoDB: {}", e),
        }
    }

    warn!("No audit sink available, removal decisions will not be recorded");
    Arc::new(NoopAuditSink)
}
