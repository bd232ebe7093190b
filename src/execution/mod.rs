//! # Query execution seam
//!
//! The graph database itself lives outside this crate. `QueryExecutor` is
//! the contract a driver-backed implementation fulfils: it takes a fully
//! rendered (tenant-scoped) query string and hands back rows.
//!
//! | Executor | Module | Description |
//! |----------|--------|-------------|
//! | `MemoryExecutor` | `memory` | Records queries, replies with canned rows |

pub mod memory;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

pub use memory::MemoryExecutor;

/// Query execution result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<ResultRow>,
}

/// A single record in the result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Column names in record order.
    pub keys: Vec<String>,
    pub values: HashMap<String, Value>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if self.values.insert(key.clone(), value.into()).is_none() {
            self.keys.push(key);
        }
        self
    }

    /// Get a typed value from the row.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let val = self.values.get(key)
            .ok_or_else(|| Error::NotFound(format!("Column '{key}'")))?;
        T::deserialize(val).map_err(|e| Error::TypeError {
            expected: std::any::type_name::<T>().into(),
            got: format!("{val} ({e})"),
        })
    }
}

/// `key:value` pairs joined by commas, in record order.
impl fmt::Display for ResultRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match self.values.get(key) {
                Some(Value::String(s)) => write!(f, "{key}:{s}")?,
                Some(other) => write!(f, "{key}:{other}")?,
                None => write!(f, "{key}:null")?,
            }
        }
        Ok(())
    }
}

/// The contract between this crate and a graph database driver.
///
/// Implementations own connection management, sessions, transactions and
/// result decoding. They only ever receive rendered query text.
#[async_trait]
pub trait QueryExecutor: Send + Sync + 'static {
    /// Run a query in a read-only session.
    async fn run(&self, query: &str) -> Result<QueryResult>;

    /// Liveness probe.
    async fn health(&self) -> Result<()> {
        Ok(())
    }
}
