//! Local SQLite article store: acts keyed by identity, their articles and
//! anomalies, plus a log of documents that failed to scrape.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Statement, Transaction, params};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{ActMetadata, Article, HierarchyLevel, ParseResult};
use crate::util::{ensure_directory, now_utc_string};

mod acts;
mod queries;
mod schema;
#[cfg(test)]
mod tests;

pub use acts::{ActSelector, UpsertOutcome, UpsertStatus};
pub use queries::{ReviewEntry, StoreCounts};

use schema::*;

const DB_SCHEMA_VERSION: &str = "1.0.0";

pub struct ArticleStore {
    connection: Connection,
}

impl ArticleStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            ensure_directory(parent)?;
        }

        let connection =
            Connection::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        Self::from_connection(connection)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().context("failed to open in-memory db")?;
        Self::from_connection(connection)
    }

    fn from_connection(connection: Connection) -> Result<Self> {
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }
}
