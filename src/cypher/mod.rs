//! # Cypher Language
//!
//! Restricted Cypher pattern parser and tenant-aware serializer.
//! Pure functions with no I/O and no database dependency.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod token;

use crate::Result;
use ast::CypherQuery;

/// Parse a query string into an AST.
pub fn parse(query: &str) -> Result<CypherQuery> {
    let ast = parser::Parser::new(query).parse()?;
    tracing::debug!(
        len = query.len(),
        relationship = ast.relationship.is_some(),
        returns = ast.return_clause.as_ref().map_or(0, Vec::len),
        "parsed cypher query"
    );
    Ok(ast)
}

/// Parse a query string and render it scoped to `tenant`.
pub fn scope_to_tenant(query: &str, tenant: &str) -> Result<String> {
    Ok(parse(query)?.render_with_tenant(tenant))
}
