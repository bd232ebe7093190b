//! Cypher AST (Abstract Syntax Tree)
//!
//! These types represent a parsed pattern query. They are pure data;
//! rendering lives in [`super::render`], parsing in [`super::parser`].

use serde::{Deserialize, Serialize};

/// A complete query: `MATCH (node) [relationship] [RETURN items]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CypherQuery {
    pub match_node: CypherNode,
    pub relationship: Option<CypherRelationship>,
    pub return_clause: Option<CypherReturn>,
}

/// Node pattern: `(variable:Type {key: 'value'})`.
///
/// Also used for the body of a relationship: `[variable:TYPE {key: 'value'}]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CypherNode {
    pub variable_name: Option<String>,
    pub type_name: Option<String>,
    pub props: PropertyMap,
}

impl CypherNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>) -> Self {
        self.variable_name = Some(name.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key, value);
        self
    }

    /// True for the bare `()` / `[]` pattern.
    pub fn is_empty(&self) -> bool {
        self.variable_name.is_none() && self.type_name.is_none() && self.props.is_empty()
    }
}

/// Relationship hop from the match node to a target node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CypherRelationship {
    pub direction: RelDirection,
    /// The bracketed body, if one was written (`[]` included).
    pub props: Option<CypherNode>,
    pub target: CypherNode,
}

/// Relationship direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelDirection {
    /// `-[...]->`
    To,
    /// `<-[...]-`
    From,
    /// `-[...]-` (undirected)
    Both,
}

/// RETURN items, in the order they were written.
pub type CypherReturn = Vec<CypherVariableReturn>;

/// Single RETURN item: `variable` or `variable.property`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CypherVariableReturn {
    pub variable_name: String,
    pub property: Option<String>,
}

impl CypherVariableReturn {
    pub fn variable(name: impl Into<String>) -> Self {
        Self { variable_name: name.into(), property: None }
    }

    pub fn property(name: impl Into<String>, property: impl Into<String>) -> Self {
        Self { variable_name: name.into(), property: Some(property.into()) }
    }
}

// ============================================================================
// PropertyMap
// ============================================================================

/// Insertion-ordered string properties with unique keys.
///
/// Order is kept so rendered output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMap(Vec<(String, String)>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property. An existing key keeps its position and takes the
    /// new value; the previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for PropertyMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}
