//! In-memory executor.
//!
//! Records every query handed to it and answers with a preconfigured
//! result. Use it to test the parse → scope → execute pipeline without a
//! database.

use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;

use crate::{Error, Result};
use super::{QueryExecutor, QueryResult};

/// Recording executor with a canned response.
#[derive(Clone, Default)]
pub struct MemoryExecutor {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    executed: RwLock<Vec<String>>,
    response: RwLock<QueryResult>,
    failure: RwLock<Option<String>>,
}

impl MemoryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every query with `result`.
    pub fn with_result(self, result: QueryResult) -> Self {
        *self.inner.response.write() = result;
        self
    }

    /// Fail every query (and health check) with `message`.
    pub fn failing(self, message: impl Into<String>) -> Self {
        *self.inner.failure.write() = Some(message.into());
        self
    }

    /// Queries received so far, oldest first.
    pub fn executed(&self) -> Vec<String> {
        self.inner.executed.read().clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.inner.executed.read().last().cloned()
    }

    fn check_failure(&self) -> Result<()> {
        match self.inner.failure.read().as_ref() {
            Some(msg) => Err(Error::ExecutionError(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn run(&self, query: &str) -> Result<QueryResult> {
        self.inner.executed.write().push(query.to_string());
        self.check_failure()?;
        Ok(self.inner.response.read().clone())
    }

    async fn health(&self) -> Result<()> {
        self.check_failure()
    }
}
