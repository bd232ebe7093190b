//! # lexneo4j: tenant-scoped Cypher pattern translator
//!
//! Accepts a short, restricted Cypher pattern (one node, an optional single
//! relationship hop, an optional RETURN projection) and turns it into a
//! query string in which every node and relationship is pinned to one
//! tenant.
//!
//! ## Design Principles
//!
//! 1. **Parser owns nothing**: text → AST is a pure function
//! 2. **Non-destructive scoping**: tenant injection copies, never mutates
//! 3. **Executor-agnostic**: the database is a `QueryExecutor` that only
//!    ever sees rendered, tenant-scoped text
//!
//! ## Quick Start
//!
//! ```rust
//! let scoped = lexneo4j::cypher::scope_to_tenant(
//!     "MATCH (n:Person{foo:'bar'})-[r]->(o:Person) RETURN n.foo",
//!     "acme",
//! )?;
//! assert_eq!(
//!     scoped,
//!     "MATCH (n:Person{foo:'bar',tenant:'acme'})-[r{tenant:'acme'}]->(o:Person{tenant:'acme'}) RETURN n.foo",
//! );
//! # Ok::<(), lexneo4j::Error>(())
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod cypher;
pub mod execution;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{Config, DriverConfig, LogFormat};
pub use cypher::ast::{
    CypherNode, CypherQuery, CypherRelationship, CypherReturn, CypherVariableReturn,
    PropertyMap, RelDirection,
};
pub use cypher::{parse, scope_to_tenant};
pub use execution::{MemoryExecutor, QueryExecutor, QueryResult, ResultRow};

// ============================================================================
// Top-level handle
// ============================================================================

/// Wraps a `QueryExecutor` and guarantees that every query it forwards is
/// scoped to exactly one tenant.
pub struct TenantGraph<E: QueryExecutor> {
    executor: E,
}

impl<E: QueryExecutor> TenantGraph<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    /// Parse `query`, scope it to `tenant` and run it in a read session.
    pub async fn execute(&self, query: &str, tenant: &str) -> Result<QueryResult> {
        validate_tenant(tenant)?;

        // Phase 1: Parse
        let ast = cypher::parse(query)?;

        // Phase 2: Scope
        let scoped = ast.render_with_tenant(tenant);

        // Phase 3: Execute
        match self.executor.run(&scoped).await {
            Ok(result) => {
                tracing::info!(tenant, rows = result.rows.len(), "query executed");
                Ok(result)
            }
            Err(e) => {
                tracing::error!(tenant, error = %e, "query execution failed");
                Err(e)
            }
        }
    }

    pub async fn health(&self) -> Result<()> {
        self.executor.health().await
    }

    /// Access the underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }
}

/// In-memory graph handle for testing.
impl TenantGraph<MemoryExecutor> {
    pub fn open_memory() -> Self {
        Self::with_executor(MemoryExecutor::new())
    }
}

/// Reject tenant identifiers that are empty or could terminate the quoted
/// property value they are rendered into.
pub fn validate_tenant(tenant: &str) -> Result<()> {
    if tenant.is_empty() {
        return Err(Error::InvalidTenant("tenant identifier is empty".into()));
    }
    if let Some(c) = tenant.chars().find(|c| matches!(*c, '\'' | '\\')) {
        return Err(Error::InvalidTenant(format!("tenant identifier contains '{c}'")));
    }
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cypher syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
