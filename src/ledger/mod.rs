//! Append-only request ledger
//!
//! Every fetch that resolves metadata appends one [`LedgerRecord`] before the
//! download starts. The ledger is an injected [`LedgerSink`] rather than a
//! global file handle, so its lifecycle is explicit and tests can swap it out.
//!
//! - [`CsvLedger`]: CSV file with a fixed header row
//! - [`NoOpLedger`]: ledger disabled

mod csv_ledger;

pub use csv_ledger::{CsvLedger, LEDGER_HEADER};

use crate::config::LedgerConfig;
use crate::types::LedgerRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Append-only sink for ledger records
///
/// Implementations never update or delete existing records.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    /// Append one record
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be persisted. Callers in the
    /// fetch pipeline log and ignore this error.
    async fn append(&self, record: &LedgerRecord) -> crate::Result<()>;

    /// Human-readable name for logging and capability reporting
    fn name(&self) -> &'static str;
}

/// Ledger used when request logging is disabled
pub struct NoOpLedger;

#[async_trait]
impl LedgerSink for NoOpLedger {
    async fn append(&self, _record: &LedgerRecord) -> crate::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Build the ledger sink described by the configuration
pub fn ledger_from_config(config: &LedgerConfig) -> Arc<dyn LedgerSink> {
    if config.enabled {
        tracing::info!(path = %config.path.display(), "Request ledger enabled");
        Arc::new(CsvLedger::new(config.path.clone()))
    } else {
        Arc::new(NoOpLedger)
    }
}
