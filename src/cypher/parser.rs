//! Cypher recursive descent parser.
//!
//! Grammar:
//!
//! ```text
//! query        := "MATCH" node relationship? ("RETURN" return)?
//! node         := "(" IDENT? (":" IDENT)? ("{" properties "}")? ")"
//! relProps     := "[" IDENT? (":" IDENT)? ("{" properties "}")? "]"
//! relationship := "-" relProps? ("->" | "-") node
//!               | "<-" relProps? "-" node
//! return       := returnItem ("," returnItem)*
//! returnItem   := IDENT ("." IDENT)?
//! properties   := (IDENT ":" STRING ("," IDENT ":" STRING)*)?
//! ```
//!
//! `IDENT` is an unquoted `STRING` made of letters, digits and `_`.
//! Property values may be bare or quoted but never contain `'` or `\`,
//! since they are rendered back between single quotes.
//!
//! Whitespace may appear between any two terminals. Tokens are pulled from
//! the lexer on demand; a single-slot pushback buffer is all the lookahead
//! the grammar needs.

use crate::{Error, Result};
use super::ast::*;
use super::lexer::Lexer;
use super::token::{Token, TokenInfo};

/// Number of input characters quoted in syntax error messages.
const CONTEXT_CHARS: usize = 16;

/// Parser state: a lexer, one token of pushback, and the raw input for
/// error context. Single use: `parse` consumes it.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    raw: &'a str,
    pushback: Option<TokenInfo>,
}

impl<'a> Parser<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { lexer: Lexer::new(raw), raw, pushback: None }
    }

    /// Parse the whole input into a query.
    pub fn parse(mut self) -> Result<CypherQuery> {
        parse_query(&mut self)
    }

    /// Next token, from the pushback slot if it is occupied.
    fn scan(&mut self) -> TokenInfo {
        match self.pushback.take() {
            Some(tok) => tok,
            None => self.lexer.scan(),
        }
    }

    /// Next non-whitespace token. The lexer folds whitespace runs into a
    /// single token, so one skip is enough.
    fn scan_ignore_whitespace(&mut self) -> TokenInfo {
        let tok = self.scan();
        if tok.token == Token::Ws { self.scan() } else { tok }
    }

    fn unscan(&mut self, tok: TokenInfo) {
        debug_assert!(self.pushback.is_none(), "pushback slot already occupied");
        self.pushback = Some(tok);
    }

    fn expect(&mut self, token: Token) -> Result<TokenInfo> {
        let tok = self.scan_ignore_whitespace();
        if tok.token == token {
            Ok(tok)
        } else {
            Err(self.unexpected(&tok, &format!("'{token}'")))
        }
    }

    fn unexpected(&self, found: &TokenInfo, expected: &str) -> Error {
        let found_desc = match found.token {
            Token::Eof => "end of input".to_string(),
            Token::String => format!("STRING '{}'", found.literal),
            other => format!("'{other}'"),
        };
        self.error(found.position, format!("expected {expected}, got {found_desc}"))
    }

    /// Accept `tok` as a variable, type, property or return name.
    fn identifier(&self, tok: TokenInfo, expected: &str) -> Result<String> {
        if tok.token != Token::String {
            return Err(self.unexpected(&tok, expected));
        }
        if tok.quoted {
            return Err(self.error(
                tok.position,
                format!("expected {expected}, got quoted STRING '{}'", tok.literal),
            ));
        }
        if let Some(c) = tok.literal.chars().find(|c| !is_identifier_char(*c)) {
            return Err(self.error(
                tok.position,
                format!("invalid character '{c}' in identifier '{}'", tok.literal),
            ));
        }
        Ok(tok.literal)
    }

    /// Accept `tok` as the value of property `key`.
    fn value(&self, tok: TokenInfo, key: &str) -> Result<String> {
        if tok.token != Token::String {
            return Err(self.unexpected(&tok, &format!("a value for property '{key}'")));
        }
        if let Some(c) = tok.literal.chars().find(|c| matches!(*c, '\'' | '\\')) {
            return Err(self.error(
                tok.position,
                format!("invalid character '{c}' in value of property '{key}'"),
            ));
        }
        Ok(tok.literal)
    }

    fn error(&self, position: usize, message: String) -> Error {
        let context: String = self.raw.get(position..).unwrap_or("").chars().take(CONTEXT_CHARS).collect();
        let message = if context.is_empty() {
            message
        } else {
            format!("{message} near \"{context}\"")
        };
        Error::SyntaxError { position, message }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// ============================================================================
// Query
// ============================================================================

fn parse_query(p: &mut Parser) -> Result<CypherQuery> {
    let tok = p.scan_ignore_whitespace();
    if tok.token != Token::Match {
        return Err(p.unexpected(&tok, "MATCH at the beginning of the expression"));
    }

    let mut query = CypherQuery { match_node: parse_node(p)?, ..Default::default() };

    let mut tok = p.scan_ignore_whitespace();
    if matches!(tok.token, Token::Relationship | Token::FromRelationship) {
        query.relationship = Some(parse_relationship(p, tok.token)?);
        tok = p.scan_ignore_whitespace();
    }

    match tok.token {
        Token::Return => query.return_clause = Some(parse_return(p)?),
        Token::Eof => {}
        Token::Where => {
            return Err(p.error(tok.position, "WHERE clauses are not supported".into()));
        }
        _ => return Err(p.unexpected(&tok, "a relationship, RETURN or end of input")),
    }

    Ok(query)
}

// ============================================================================
// Patterns
// ============================================================================

/// Parses "(a:Person{foo:'bar'})".
fn parse_node(p: &mut Parser) -> Result<CypherNode> {
    parse_pattern_body(p, Token::OpenParenthesis, Token::ClosedParenthesis)
}

/// Parses "[r:KNOWS{since:'2020'}]".
fn parse_relationship_properties(p: &mut Parser) -> Result<CypherNode> {
    parse_pattern_body(p, Token::OpenBracket, Token::ClosedBracket)
}

fn parse_pattern_body(p: &mut Parser, open: Token, close: Token) -> Result<CypherNode> {
    p.expect(open)?;
    let mut node = CypherNode::new();

    let mut tok = p.scan_ignore_whitespace();
    if tok.token == close {
        return Ok(node);
    }

    if tok.token == Token::String {
        node.variable_name = Some(p.identifier(tok, "a variable name")?);
        tok = p.scan_ignore_whitespace();
        if tok.token == close {
            return Ok(node);
        }
    }

    if tok.token == Token::DoubleColon {
        let type_tok = p.scan_ignore_whitespace();
        node.type_name = Some(p.identifier(type_tok, "a type name after ':'")?);
        tok = p.scan_ignore_whitespace();
        if tok.token == close {
            return Ok(node);
        }
    }

    if tok.token != Token::OpenCurlyBracket {
        return Err(p.unexpected(&tok, &format!("'{{ ... }}' or '{close}'")));
    }
    p.unscan(tok);
    node.props = parse_properties(p)?;

    p.expect(close)?;
    Ok(node)
}

/// Parses "-[r]->(o)", "--(o)", "<-[r]-(o)" once the opening marker is read.
fn parse_relationship(p: &mut Parser, opening: Token) -> Result<CypherRelationship> {
    let mut props = None;

    let mut tok = p.scan_ignore_whitespace();
    if !matches!(tok.token, Token::ToRelationship | Token::Relationship) {
        p.unscan(tok);
        props = Some(parse_relationship_properties(p)?);
        tok = p.scan_ignore_whitespace();
    }

    let direction = match (opening, tok.token) {
        (Token::FromRelationship, Token::Relationship) => RelDirection::From,
        (Token::FromRelationship, _) => {
            return Err(p.unexpected(&tok, "'-' to close a '<-' relationship"));
        }
        (_, Token::ToRelationship) => RelDirection::To,
        (_, Token::Relationship) => RelDirection::Both,
        _ => return Err(p.unexpected(&tok, "'->' or '-'")),
    };

    let target = parse_node(p)?;
    Ok(CypherRelationship { direction, props, target })
}

/// Parses "{foo:'bar', baz:'qux'}".
fn parse_properties(p: &mut Parser) -> Result<PropertyMap> {
    p.expect(Token::OpenCurlyBracket)?;
    let mut props = PropertyMap::new();

    let mut tok = p.scan_ignore_whitespace();
    if tok.token == Token::ClosedCurlyBracket {
        return Ok(props);
    }

    loop {
        let key = p.identifier(tok, "a property name")?;

        let colon = p.scan_ignore_whitespace();
        if colon.token != Token::DoubleColon {
            return Err(p.unexpected(&colon, &format!("':' after property '{key}'")));
        }

        let value = p.scan_ignore_whitespace();
        let value = p.value(value, &key)?;
        props.insert(key, value);

        let sep = p.scan_ignore_whitespace();
        match sep.token {
            Token::ClosedCurlyBracket => return Ok(props),
            Token::Comma => tok = p.scan_ignore_whitespace(),
            _ => return Err(p.unexpected(&sep, "',' or '}'")),
        }
    }
}

// ============================================================================
// RETURN
// ============================================================================

/// Parses "a,b.propname" up to end of input.
fn parse_return(p: &mut Parser) -> Result<CypherReturn> {
    let mut items = CypherReturn::new();

    loop {
        let tok = p.scan_ignore_whitespace();
        let expected = if items.is_empty() {
            "a return element name"
        } else {
            "a return element after ','"
        };
        let mut item = CypherVariableReturn::variable(p.identifier(tok, expected)?);

        let mut next = p.scan_ignore_whitespace();
        if next.token == Token::Dot {
            let prop = p.scan_ignore_whitespace();
            item.property = Some(p.identifier(prop, "a property name after '.'")?);
            next = p.scan_ignore_whitespace();
        }
        items.push(item);

        match next.token {
            Token::Eof => return Ok(items),
            Token::Comma => {}
            _ => return Err(p.unexpected(&next, "',' or end of input")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> Result<CypherQuery> {
        Parser::new(query).parse()
    }

    #[test]
    fn test_parse_properties() {
        let props = parse_properties(&mut Parser::new("{foo:'bar'}")).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("foo"), Some("bar"));
    }

    #[test]
    fn test_parse_multiple_properties() {
        let props = parse_properties(&mut Parser::new("{ a:'1', b : '2' ,c:3}")).unwrap();
        let pairs: Vec<_> = props.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("c", "3")]);
    }

    #[test]
    fn test_parse_empty_properties() {
        let props = parse_properties(&mut Parser::new("{}")).unwrap();
        assert!(props.is_empty());
    }

    #[test]
    fn test_bad_properties() {
        for input in ["{foo}", "{foo:}", "{:'bar'}", "{foo:'bar',}", "{foo:'bar'", "{foo:'bar' baz:'x'}", "foo:'bar'}"] {
            assert!(parse_properties(&mut Parser::new(input)).is_err(), "{input} should fail");
        }
    }

    #[test]
    fn test_parse_node_empty() {
        let node = parse_node(&mut Parser::new("()")).unwrap();
        assert!(node.is_empty());
    }

    #[test]
    fn test_parse_node_variable() {
        let node = parse_node(&mut Parser::new("(n)")).unwrap();
        assert_eq!(node.variable_name.as_deref(), Some("n"));
        assert_eq!(node.type_name, None);
    }

    #[test]
    fn test_parse_node_typed() {
        let node = parse_node(&mut Parser::new("(n:Person)")).unwrap();
        assert_eq!(node.variable_name.as_deref(), Some("n"));
        assert_eq!(node.type_name.as_deref(), Some("Person"));
        assert!(node.props.is_empty());
    }

    #[test]
    fn test_parse_node_with_properties() {
        let node = parse_node(&mut Parser::new("(n:Person{foo:'bar'})")).unwrap();
        assert_eq!(node.variable_name.as_deref(), Some("n"));
        assert_eq!(node.type_name.as_deref(), Some("Person"));
        assert_eq!(node.props.get("foo"), Some("bar"));
    }

    #[test]
    fn test_parse_node_type_only() {
        let node = parse_node(&mut Parser::new("(:Person{foo:'bar'})")).unwrap();
        assert_eq!(node.variable_name, None);
        assert_eq!(node.type_name.as_deref(), Some("Person"));
        assert_eq!(node.props.get("foo"), Some("bar"));
    }

    #[test]
    fn test_parse_node_variable_and_properties() {
        let node = parse_node(&mut Parser::new("( n { foo : 'bar' } )")).unwrap();
        assert_eq!(node.variable_name.as_deref(), Some("n"));
        assert_eq!(node.type_name, None);
        assert_eq!(node.props.get("foo"), Some("bar"));
    }

    #[test]
    fn test_parse_relationship_properties() {
        let r = parse_relationship_properties(&mut Parser::new("[]")).unwrap();
        assert!(r.is_empty());

        let r = parse_relationship_properties(&mut Parser::new("[n]")).unwrap();
        assert_eq!(r.variable_name.as_deref(), Some("n"));

        let r = parse_relationship_properties(&mut Parser::new("[n:Person]")).unwrap();
        assert_eq!(r.type_name.as_deref(), Some("Person"));

        let r = parse_relationship_properties(&mut Parser::new("[n:Person{foo:'bar'}]")).unwrap();
        assert_eq!(r.variable_name.as_deref(), Some("n"));
        assert_eq!(r.props.get("foo"), Some("bar"));

        let r = parse_relationship_properties(&mut Parser::new("[:Person{foo:'bar'}]")).unwrap();
        assert_eq!(r.variable_name, None);
        assert_eq!(r.type_name.as_deref(), Some("Person"));
    }

    #[test]
    fn test_return_single() {
        let ret = parse_return(&mut Parser::new("a")).unwrap();
        assert_eq!(ret, vec![CypherVariableReturn::variable("a")]);
    }

    #[test]
    fn test_return_multiple() {
        let ret = parse_return(&mut Parser::new("a.foo,b")).unwrap();
        assert_eq!(ret, vec![
            CypherVariableReturn::property("a", "foo"),
            CypherVariableReturn::variable("b"),
        ]);
    }

    #[test]
    fn test_return_errors() {
        for input in ["", "a,", "a.", "a b", ",a", "a..b"] {
            assert!(parse_return(&mut Parser::new(input)).is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_simple_match_return() {
        let q = parse("MATCH (n) RETURN n").unwrap();
        assert_eq!(q.match_node.variable_name.as_deref(), Some("n"));
        assert!(q.relationship.is_none());
        assert_eq!(q.return_clause, Some(vec![CypherVariableReturn::variable("n")]));
    }

    #[test]
    fn test_match_without_return() {
        let q = parse("match (n:Person)").unwrap();
        assert_eq!(q.match_node.type_name.as_deref(), Some("Person"));
        assert!(q.return_clause.is_none());
    }

    #[test]
    fn test_match_properties_return_property() {
        let q = parse("MATCH (n:Person{foo:'bar'}) RETURN n.foo").unwrap();
        assert_eq!(q.match_node.props.get("foo"), Some("bar"));
        assert_eq!(q.return_clause, Some(vec![CypherVariableReturn::property("n", "foo")]));
    }

    #[test]
    fn test_outgoing_relationship() {
        let q = parse("MATCH (n:Person{foo:'bar'})-[r]->(o:Person) RETURN n.foo").unwrap();
        let rel = q.relationship.unwrap();
        assert_eq!(rel.direction, RelDirection::To);
        assert_eq!(rel.props.unwrap().variable_name.as_deref(), Some("r"));
        assert_eq!(rel.target.variable_name.as_deref(), Some("o"));
        assert_eq!(q.match_node.props.get("foo"), Some("bar"));
    }

    #[test]
    fn test_incoming_relationship() {
        let q = parse("MATCH (n:Person{foo:'bar'})<-[r{foo:'bar2'}]-(o:Person) RETURN n.foo").unwrap();
        let rel = q.relationship.unwrap();
        assert_eq!(rel.direction, RelDirection::From);
        let props = rel.props.unwrap();
        assert_eq!(props.variable_name.as_deref(), Some("r"));
        assert_eq!(props.props.get("foo"), Some("bar2"));
        assert_eq!(rel.target.variable_name.as_deref(), Some("o"));
    }

    #[test]
    fn test_undirected_relationship() {
        let q = parse("MATCH (a)-[:KNOWS]-(b)").unwrap();
        let rel = q.relationship.unwrap();
        assert_eq!(rel.direction, RelDirection::Both);
        assert_eq!(rel.props.unwrap().type_name.as_deref(), Some("KNOWS"));
    }

    #[test]
    fn test_relationship_without_body() {
        let cases = [
            ("MATCH (a)-->(b)", RelDirection::To),
            ("MATCH (a)--(b)", RelDirection::Both),
            ("MATCH (a)<--(b)", RelDirection::From),
        ];
        for (input, direction) in cases {
            let rel = parse(input).unwrap().relationship.unwrap();
            assert_eq!(rel.direction, direction, "{input}");
            assert!(rel.props.is_none(), "{input}");
            assert_eq!(rel.target.variable_name.as_deref(), Some("b"));
        }
    }

    #[test]
    fn test_whitespace_between_terminals() {
        let q = parse("  MATCH ( n : Person )  - [ r ] -> ( o )  RETURN  n . name , o ").unwrap();
        assert_eq!(q.relationship.unwrap().direction, RelDirection::To);
        assert_eq!(q.return_clause.unwrap().len(), 2);
    }

    #[test]
    fn test_syntax_errors() {
        let bad = [
            "MATCH (n) RETURN n,",
            "MATCH (n RETURN n",
            "MATCH (n:) RETURN n",
            "MATCH (n:)-[]]->(o) RETURN n",
            "MATCH (n) RETURN",
            "(n) RETURN n",
            "",
            "MATCH (n)<-[r]->(o)",
            "MATCH (n)<-->(o)",
            "MATCH (n)-[r](o)",
            "MATCH (n)-(o)",
            "MATCH (n)-[r]->(o)-[s]->(p)",
            "MATCH (n) WHERE n.foo",
            "MATCH (n) garbage",
            "MATCH (n:Person:Employee)",
            "MATCH (n{foo:'bar',})",
            "MATCH (match) RETURN n",
        ];
        for input in bad {
            assert!(parse(input).is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_error_position_and_message() {
        match parse("MATCH (n:) RETURN n") {
            Err(Error::SyntaxError { position, message }) => {
                assert_eq!(position, 9);
                assert!(message.contains("type name"), "{message}");
                assert!(message.contains("')'"), "{message}");
            }
            other => panic!("Expected SyntaxError, got {other:?}"),
        }
    }

    #[test]
    fn test_quoted_identifiers_rejected() {
        let inputs = [
            "MATCH ('match')",
            "MATCH ('a b')",
            "MATCH ('')",
            "MATCH (n:'-x')",
            "MATCH (n) RETURN 'a b'",
            "MATCH (n) RETURN n.'a b'",
            "MATCH (n{'k y':'v'})",
            "MATCH (n)-['r']->(m)",
        ];
        for input in inputs {
            match parse(input) {
                Err(Error::SyntaxError { message, .. }) => {
                    assert!(message.contains("quoted STRING"), "{input}: {message}");
                }
                other => panic!("{input}: expected SyntaxError, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_identifier_characters() {
        let q = parse("MATCH (n_1:Été) RETURN n_1.größe").unwrap();
        assert_eq!(q.match_node.type_name.as_deref(), Some("Été"));

        for input in ["MATCH (n:`x)", "MATCH (n:x//)", "MATCH (a-b)", "MATCH (<x)", "MATCH (n{a-b:'v'})"] {
            match parse(input) {
                Err(Error::SyntaxError { message, .. }) => {
                    assert!(message.contains("invalid character"), "{input}: {message}");
                }
                other => panic!("{input}: expected SyntaxError, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_value_quote_and_backslash_rejected() {
        for input in ["MATCH (n{a:x'y})", "MATCH (n{a:x\\})", "MATCH (n{a:'x\\'})"] {
            match parse(input) {
                Err(Error::SyntaxError { position, message }) => {
                    assert_eq!(position, 11, "{input}");
                    assert!(message.contains("value of property 'a'"), "{input}: {message}");
                }
                other => panic!("{input}: expected SyntaxError, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_bare_and_quoted_values_equivalent() {
        assert_eq!(parse("MATCH (n{a:x,b:''})").unwrap(), parse("MATCH (n{a:'x',b:''})").unwrap());
        assert_eq!(parse("MATCH (n{a:''})").unwrap().match_node.props.get("a"), Some(""));
    }

    #[test]
    fn test_error_at_end_of_input() {
        match parse("MATCH (n) RETURN n,") {
            Err(Error::SyntaxError { position, message }) => {
                assert_eq!(position, 19);
                assert!(message.contains("end of input"), "{message}");
            }
            other => panic!("Expected SyntaxError, got {other:?}"),
        }
    }
}
