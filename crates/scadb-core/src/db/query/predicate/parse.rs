//! Parser for the `q` filter language.
//!
//! ```text
//! expr := and_expr (',' and_expr)*
//! and_expr := term (';' term)*
//! term := '(' expr ')' | field op value
//! op := '=' | '!=' | '<' | '>' | '~'
//! ```
//!
//! `;` binds tighter than `,`. Values run to the next `;`, `,`, `)` or the
//! end of input and are kept verbatim as text literals.

use crate::db::query::{
    QueryError,
    predicate::{CompareOp, ComparePredicate, Predicate},
};

/// Parse a `q` string. Blank input parses to `None`.
pub fn parse(input: &str) -> Result<Option<Predicate>, QueryError> {
    if input.trim().is_empty() {
        return Ok(None);
    }

    let mut parser = Parser { src: input, pos: 0 };
    let predicate = parser.expr(0)?;

    parser.skip_ws();
    match parser.peek() {
        None => Ok(Some(predicate)),
        Some(')') => Err(parser.error("unbalanced ')'")),
        Some(c) => Err(parser.error(format!("unexpected '{c}'"))),
    }
}

// Guards against stack exhaustion on adversarial nesting.
const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, reason: impl Into<String>) -> QueryError {
        QueryError::Parse {
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn expr(&mut self, depth: usize) -> Result<Predicate, QueryError> {
        let mut terms = vec![self.and_expr(depth)?];

        while self.peek() == Some(',') {
            self.bump();
            terms.push(self.and_expr(depth)?);
        }

        Ok(collapse(terms, Predicate::Or))
    }

    fn and_expr(&mut self, depth: usize) -> Result<Predicate, QueryError> {
        let mut terms = vec![self.term(depth)?];

        while self.peek() == Some(';') {
            self.bump();
            terms.push(self.term(depth)?);
        }

        Ok(collapse(terms, Predicate::And))
    }

    fn term(&mut self, depth: usize) -> Result<Predicate, QueryError> {
        self.skip_ws();

        if self.peek() == Some('(') {
            if depth >= MAX_DEPTH {
                return Err(self.error("nesting too deep"));
            }
            self.bump();
            let inner = self.expr(depth + 1)?;
            self.skip_ws();
            if self.bump() != Some(')') {
                return Err(self.error("expected ')'"));
            }
            self.skip_ws();
            return Ok(inner);
        }

        let field = self.field()?;
        let op = self.op()?;
        let value = self.value()?;

        Ok(Predicate::Compare(ComparePredicate::new(field, op, value)))
    }

    fn field(&mut self) -> Result<String, QueryError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.bump();
        }

        if start == self.pos {
            return Err(self.error("expected field name"));
        }
        let field = self.src[start..self.pos].to_string();
        self.skip_ws();

        Ok(field)
    }

    fn op(&mut self) -> Result<CompareOp, QueryError> {
        let op = match self.peek() {
            Some('=') => CompareOp::Eq,
            Some('<') => CompareOp::Lt,
            Some('>') => CompareOp::Gt,
            Some('~') => CompareOp::Like,
            Some('!') => {
                self.bump();
                if self.peek() != Some('=') {
                    return Err(self.error("expected '=' after '!'"));
                }
                CompareOp::Ne
            }
            Some(c) => return Err(self.error(format!("unknown operator '{c}'"))),
            None => return Err(self.error("expected operator")),
        };
        self.bump();

        Ok(op)
    }

    fn value(&mut self) -> Result<String, QueryError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| !matches!(c, ';' | ',' | ')')) {
            self.bump();
        }

        if start == self.pos {
            return Err(self.error("expected value"));
        }

        Ok(self.src[start..self.pos].to_string())
    }
}

fn collapse(mut terms: Vec<Predicate>, join: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        join(terms)
    }
}
