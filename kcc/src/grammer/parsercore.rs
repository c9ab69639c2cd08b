use super::token::Token;
use crate::error::Error;

/// Cursor over a fully lexed token slice
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn at(tokens: &'a [Token], pos: usize) -> Self {
        Parser { tokens, pos }
    }

    /// Index of the next token
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Rewind (or fast-forward) to a position taken from `position()`
    pub fn restore(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

impl<'a> Parser<'a> {
    /// Peek : Watch next token without consuming it
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Peek n tokens ahead (0 is the next token)
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    /// Last consumed token
    pub fn prev(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|idx| self.tokens.get(idx))
    }

    /// Next : Consume next token and return it
    pub fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&self, cond: F) -> bool {
        self.peek().is_some_and(cond)
    }

    /// Consume if next token is match with condition
    pub fn consume_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Option<&'a Token> {
        if self.check_if(cond) {
            self.next()
        } else {
            None
        }
    }

    /// Next token must be match with condition
    pub fn expect_tobe<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Result<&'a Token, Error> {
        match self.peek() {
            Some(token) if cond(token) => {
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(Error::UnexpectedToken(token.into())),
            None => Err(Error::UnexpectedEOF),
        }
    }

    /// Same as `expect_tobe` but names what was expected
    pub fn expect_named<F: Fn(&Token) -> bool>(
        &mut self,
        what: &'static str,
        cond: F,
    ) -> Result<&'a Token, Error> {
        match self.peek() {
            Some(token) if cond(token) => {
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(Error::Expected(what, token.into())),
            None => Err(Error::UnexpectedEOF),
        }
    }
}

#[macro_export]
macro_rules! check {
    ($parser:expr, $kind:pat) => {
        $parser.check_if(|token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($parser:expr, $kind:pat) => {
        $parser.expect_tobe(|token| matches!(&token.kind, $kind))
    };
    ($parser:expr, $kind:pat, $what:expr) => {
        $parser.expect_named($what, |token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! optional {
    ($parser:expr, $trigger:pat, $following:expr) => {
        if $crate::check!($parser, $trigger) {
            $crate::expect!($parser, $trigger)?;
            Some($following)
        } else {
            None
        }
    };
    ($parser:expr, $trigger:pat) => {
        $parser.consume_if(|token| matches!(&token.kind, $trigger))
    };
}

/// Parse repeated elements with a delimiter
/// [ element { delimiter element } ] terminal
#[macro_export]
macro_rules! repeat {
    ($parser:expr, $elem:expr, $delimiter:pat, $terminal:pat) => {{
        let mut items = Vec::new();
        if !$crate::check!($parser, $terminal) {
            items.push($elem?);
            while $crate::check!($parser, $delimiter) {
                $crate::expect!($parser, $delimiter)?;
                items.push($elem?);
            }
        }
        items
    }};
}
