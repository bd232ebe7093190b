//! Serializer. Renders an AST back into query text.
//!
//! Two forms:
//! - plain: `Display` on every AST type, mirroring the input grammar;
//! - tenant-scoped: every node and relationship carries
//!   `tenant:'<id>'`. Relationships without a body get one synthesized.
//!
//! Tenant injection works on a copy; the parsed tree is left untouched.

use std::fmt;

use super::ast::*;

/// Property injected into every node and relationship.
pub const TENANT_PROPERTY: &str = "tenant";

impl CypherQuery {
    /// Plain rendering.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Rendering scoped to a single tenant.
    pub fn render_with_tenant(&self, tenant: &str) -> String {
        let scoped = self.with_tenant(tenant);
        tracing::debug!(tenant, query = %scoped, "rendered tenant-scoped query");
        scoped.to_string()
    }

    /// Copy of this query with the tenant property on every pattern element.
    pub fn with_tenant(&self, tenant: &str) -> CypherQuery {
        CypherQuery {
            match_node: self.match_node.with_tenant(tenant),
            relationship: self.relationship.as_ref().map(|rel| rel.with_tenant(tenant)),
            return_clause: self.return_clause.clone(),
        }
    }
}

impl CypherNode {
    /// Copy with `tenant` set. A user-supplied `tenant` value is overwritten.
    pub fn with_tenant(&self, tenant: &str) -> CypherNode {
        self.clone().with_property(TENANT_PROPERTY, tenant)
    }
}

impl CypherRelationship {
    pub fn with_tenant(&self, tenant: &str) -> CypherRelationship {
        let props = self.props.as_ref().map_or_else(CypherNode::new, Clone::clone);
        CypherRelationship {
            direction: self.direction,
            props: Some(props.with_tenant(tenant)),
            target: self.target.with_tenant(tenant),
        }
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for CypherQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MATCH ({})", self.match_node)?;
        if let Some(rel) = &self.relationship {
            write!(f, "{rel}")?;
        }
        if let Some(items) = &self.return_clause {
            f.write_str(" RETURN ")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{item}")?;
            }
        }
        Ok(())
    }
}

/// Renders the inside of the pattern; the caller supplies `()` or `[]`.
impl fmt::Display for CypherNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.variable_name {
            f.write_str(name)?;
        }
        if let Some(type_name) = &self.type_name {
            write!(f, ":{type_name}")?;
        }
        if !self.props.is_empty() {
            write!(f, "{}", self.props)?;
        }
        Ok(())
    }
}

impl fmt::Display for CypherRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = match self.direction {
            RelDirection::To => ("-", "->"),
            RelDirection::From => ("<-", "-"),
            RelDirection::Both => ("-", "-"),
        };
        f.write_str(open)?;
        if let Some(props) = &self.props {
            write!(f, "[{props}]")?;
        }
        write!(f, "{close}({})", self.target)
    }
}

impl fmt::Display for CypherVariableReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(prop) => write!(f, "{}.{prop}", self.variable_name),
            None => f.write_str(&self.variable_name),
        }
    }
}

impl fmt::Display for PropertyMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}:'{value}'")?;
        }
        f.write_str("}")
    }
}
