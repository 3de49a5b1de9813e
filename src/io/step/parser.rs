//! Part 21 parser: builds the raw entity graph from tokens.
//!
//! Entities are kept uninterpreted: an id, a type name and the argument
//! list. Complex instances (`#1 = (A(..) B(..));`) are stored with the
//! type name [`COMPLEX_ENTITY`] and one [`StepValue::Typed`] per part.

use std::collections::HashMap;

use crate::error::ImportError;

use super::lexer::{Lexer, SpannedToken, Token};

/// Type name given to complex entity instances.
pub const COMPLEX_ENTITY: &str = "(COMPLEX)";

/// A single argument value of a STEP entity.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    EntityRef(u64),
    String(String),
    Real(f64),
    Integer(i64),
    Enum(String),
    List(Vec<StepValue>),
    /// Derived value (`*`).
    Derived,
    /// Unset value (`$`).
    Null,
    /// Inline typed value `TYPE_NAME(args)`.
    Typed {
        type_name: String,
        args: Vec<StepValue>,
    },
}

impl StepValue {
    #[must_use]
    pub fn as_entity_ref(&self) -> Option<u64> {
        match self {
            Self::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Reals, and integers widened to reals.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::Typed { args, .. } if args.len() == 1 => args[0].as_real(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A parsed STEP entity instance.
#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: u64,
    pub type_name: String,
    pub args: Vec<StepValue>,
}

/// The parsed content of a STEP file.
#[derive(Debug, Clone, Default)]
pub struct StepFile {
    /// Header section entities (ids are 0).
    pub header: Vec<StepEntity>,
    /// Data section entities by id.
    pub entities: HashMap<u64, StepEntity>,
}

impl StepFile {
    /// Looks up an entity, failing with [`ImportError::MissingEntity`].
    ///
    /// # Errors
    ///
    /// Returns an error if no entity has this id.
    pub fn require(&self, id: u64) -> Result<&StepEntity, ImportError> {
        self.entities.get(&id).ok_or(ImportError::MissingEntity(id))
    }

    /// All entities of a type, ordered by id.
    #[must_use]
    pub fn entities_of_type(&self, type_name: &str) -> Vec<&StepEntity> {
        let mut found: Vec<&StepEntity> = self
            .entities
            .values()
            .filter(|e| e.type_name == type_name)
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }
}

/// Parser for Part 21 token streams.
pub struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    /// Parses a STEP file from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Empty`] for blank input, or a lexer/parser error
    /// for malformed input (including duplicate entity ids).
    pub fn parse(input: &[u8]) -> Result<StepFile, ImportError> {
        let tokens = Lexer::new(input).tokenize()?;
        if tokens.is_empty() {
            return Err(ImportError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        parser.parse_file()
    }

    fn parse_file(&mut self) -> Result<StepFile, ImportError> {
        let mut file = StepFile::default();

        self.expect_keyword("ISO-10303-21")?;
        self.expect_token(&Token::Semicolon)?;

        while !self.is_at_end() {
            if self.check_keyword("HEADER") {
                self.advance();
                self.expect_token(&Token::Semicolon)?;
                file.header = self.parse_header_entities()?;
                self.expect_keyword("ENDSEC")?;
                self.expect_token(&Token::Semicolon)?;
            } else if self.check_keyword("DATA") {
                self.advance();
                // DATA may carry a parameter list in later editions.
                if self.check_token(&Token::LParen) {
                    self.parse_args()?;
                }
                self.expect_token(&Token::Semicolon)?;
                for entity in self.parse_data_section()? {
                    let id = entity.id;
                    if file.entities.insert(id, entity).is_some() {
                        return Err(ImportError::parser(Some(id), "duplicate entity id"));
                    }
                }
                self.expect_keyword("ENDSEC")?;
                self.expect_token(&Token::Semicolon)?;
            } else if self.check_keyword("END-ISO-10303-21") {
                self.advance();
                self.expect_token(&Token::Semicolon)?;
                break;
            } else {
                return Err(self.unexpected("section keyword"));
            }
        }

        Ok(file)
    }

    fn parse_header_entities(&mut self) -> Result<Vec<StepEntity>, ImportError> {
        let mut entities = Vec::new();
        while let Some(Token::Keyword(type_name)) = self.peek().map(|t| t.token.clone()) {
            if type_name == "ENDSEC" {
                break;
            }
            self.advance();
            let args = self.parse_args()?;
            self.expect_token(&Token::Semicolon)?;
            entities.push(StepEntity {
                id: 0,
                type_name,
                args,
            });
        }
        Ok(entities)
    }

    fn parse_data_section(&mut self) -> Result<Vec<StepEntity>, ImportError> {
        let mut entities = Vec::new();
        while let Some(Token::EntityRef(id)) = self.peek().map(|t| t.token.clone()) {
            self.advance();
            self.expect_token(&Token::Equals)?;

            let entity = match self.peek().map(|t| t.token.clone()) {
                Some(Token::Keyword(type_name)) => {
                    self.advance();
                    let args = self.parse_args()?;
                    StepEntity { id, type_name, args }
                }
                Some(Token::LParen) => {
                    self.advance();
                    let mut parts = Vec::new();
                    while let Some(Token::Keyword(type_name)) = self.peek().map(|t| t.token.clone())
                    {
                        self.advance();
                        let args = self.parse_args()?;
                        parts.push(StepValue::Typed { type_name, args });
                    }
                    self.expect_token(&Token::RParen)?;
                    StepEntity {
                        id,
                        type_name: COMPLEX_ENTITY.to_owned(),
                        args: parts,
                    }
                }
                other => {
                    return Err(ImportError::parser(
                        Some(id),
                        format!("expected type name, got {other:?}"),
                    ));
                }
            };
            self.expect_token(&Token::Semicolon)
                .map_err(|_| ImportError::parser(Some(id), "expected ';' after entity"))?;
            entities.push(entity);
        }
        Ok(entities)
    }

    fn parse_args(&mut self) -> Result<Vec<StepValue>, ImportError> {
        self.expect_token(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.check_token(&Token::RParen) {
            args.push(self.parse_value()?);
            while self.check_token(&Token::Comma) {
                self.advance();
                args.push(self.parse_value()?);
            }
        }
        self.expect_token(&Token::RParen)?;
        Ok(args)
    }

    fn parse_value(&mut self) -> Result<StepValue, ImportError> {
        let Some(token) = self.peek().map(|t| t.token.clone()) else {
            return Err(self.unexpected("value"));
        };
        let value = match token {
            Token::EntityRef(id) => StepValue::EntityRef(id),
            Token::String(s) => StepValue::String(s),
            Token::Real(v) => StepValue::Real(v),
            Token::Integer(v) => StepValue::Integer(v),
            Token::Enum(s) => StepValue::Enum(s),
            Token::Asterisk => StepValue::Derived,
            Token::Dollar => StepValue::Null,
            Token::LParen => {
                return self.parse_args().map(StepValue::List);
            }
            Token::Keyword(type_name) => {
                self.advance();
                let args = self.parse_args()?;
                return Ok(StepValue::Typed { type_name, args });
            }
            _ => return Err(self.unexpected("value")),
        };
        self.advance();
        Ok(value)
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check_token(&self, expected: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == expected)
    }

    fn check_keyword(&self, name: &str) -> bool {
        matches!(self.peek(), Some(SpannedToken { token: Token::Keyword(k), .. }) if k == name)
    }

    fn unexpected(&self, expected: &str) -> ImportError {
        match self.peek() {
            Some(tok) => ImportError::parser(
                None,
                format!(
                    "expected {expected} at line {}, column {}, got {:?}",
                    tok.pos.line, tok.pos.col, tok.token
                ),
            ),
            None => ImportError::parser(None, format!("expected {expected}, got end of input")),
        }
    }

    fn expect_token(&mut self, expected: &Token) -> Result<(), ImportError> {
        if self.check_token(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("{expected:?}")))
        }
    }

    fn expect_keyword(&mut self, name: &str) -> Result<(), ImportError> {
        if self.check_keyword(name) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("keyword '{name}'")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn wrap(data: &str) -> String {
        format!("ISO-10303-21;\nHEADER;\nFILE_DESCRIPTION((''), '2;1');\nENDSEC;\nDATA;\n{data}\nENDSEC;\nEND-ISO-10303-21;\n")
    }

    #[test]
    fn parse_simple() {
        let input = wrap(
            "#1 = CARTESIAN_POINT('origin', (0.0, 0.0, 0.0));\n#2 = DIRECTION('x', (1.0, 0.0, 0.0));",
        );
        let file = Parser::parse(input.as_bytes()).unwrap();
        assert_eq!(file.header.len(), 1);
        assert_eq!(file.entities.len(), 2);

        let p1 = file.require(1).unwrap();
        assert_eq!(p1.type_name, "CARTESIAN_POINT");
        assert_eq!(p1.args[0], StepValue::String("origin".into()));
        let coords = p1.args[1].as_list().unwrap();
        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0].as_real(), Some(0.0));
    }

    #[test]
    fn null_derived_and_enum() {
        let file = Parser::parse(wrap("#1 = ORIENTED_EDGE('', *, $, #5, .T.);").as_bytes()).unwrap();
        let e = file.require(1).unwrap();
        assert_eq!(e.args[1], StepValue::Derived);
        assert!(e.args[2].is_null());
        assert_eq!(e.args[3].as_entity_ref(), Some(5));
        assert_eq!(e.args[4].as_enum(), Some("T"));
    }

    #[test]
    fn typed_values_and_complex_instances() {
        let input = wrap(
            "#1 = UNCERTAINTY_MEASURE_WITH_UNIT(LENGTH_MEASURE(1.E-07), #2, '', '');\n\
             #2 = ( LENGTH_UNIT() NAMED_UNIT(*) SI_UNIT(.MILLI., .METRE.) );",
        );
        let file = Parser::parse(input.as_bytes()).unwrap();
        assert_eq!(file.require(1).unwrap().args[0].as_real(), Some(1e-7));
        let complex = file.require(2).unwrap();
        assert_eq!(complex.type_name, COMPLEX_ENTITY);
        assert_eq!(complex.args.len(), 3);
    }

    #[test]
    fn entities_of_type_are_ordered_by_id() {
        let input = wrap(
            "#9 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));\n#2 = DIRECTION('', (1.0, 0.0, 0.0));\n#3 = CARTESIAN_POINT('', (1.0, 0.0, 0.0));",
        );
        let file = Parser::parse(input.as_bytes()).unwrap();
        let ids: Vec<u64> = file.entities_of_type("CARTESIAN_POINT").iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 9]);
    }

    // ── errors ──

    #[test]
    fn blank_input_is_empty() {
        assert!(matches!(Parser::parse(b"  /* nothing */ \n"), Err(ImportError::Empty)));
    }

    #[test]
    fn missing_magic_is_rejected() {
        assert!(matches!(Parser::parse(b"DATA;"), Err(ImportError::Parser { .. })));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let input = wrap("#1 = DIRECTION('', (1.0, 0.0, 0.0));\n#1 = DIRECTION('', (0.0, 1.0, 0.0));");
        let err = Parser::parse(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::Parser { entity_id: Some(1), .. }), "{err:?}");
    }

    #[test]
    fn missing_semicolon_names_the_entity() {
        let input = wrap("#4 = DIRECTION('', (1.0, 0.0, 0.0))\n#5 = DIRECTION('', (0.0, 1.0, 0.0));");
        let err = Parser::parse(input.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::Parser { entity_id: Some(4), .. }), "{err:?}");
    }
}
