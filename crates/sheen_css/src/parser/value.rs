use crate::errors::CssResult;
use crate::parser::state::State;
use crate::parser::{closer_for, consume_whitespace, next_token, EventHandler, Flow, Parser, Token};
use crate::tokenizer::TokenKind;

// Substates of the value production
const VALUE_INITIAL: u8 = 0;
const VALUE_WS: u8 = 1;
const VALUE_BLOCK_WS: u8 = 2;
const VALUE_BLOCK_BODY: u8 = 3;
const VALUE_BLOCK_AFTER_ANY: u8 = 4;

// Substates of the any production
const ANY_INITIAL: u8 = 0;
const ANY_OPEN_WS: u8 = 1;
const ANY_CLOSE: u8 = 2;
const ANY_WS: u8 = 3;

/// Tokens that end a run of `any`. None of them can start an `any`.
fn ends_any_run(token: &Token) -> bool {
    matches!(
        token.kind,
        TokenKind::Eof
            | TokenKind::Char(';')
            | TokenKind::Char('{')
            | TokenKind::Char('}')
            | TokenKind::Char(')')
            | TokenKind::Char(']')
    )
}

/// Tokens that end the value of a declaration
fn ends_value(token: &Token) -> bool {
    token.is_eof() || token.is_char(';') || token.is_char('}')
}

impl<H: EventHandler> Parser<H> {
    /// value1 -> value value0
    pub(super) fn parse_value1(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == 1 {
            if self.parse_error {
                return self.done();
            }
            return self.replace(State::Value0);
        }

        let token = next_token!(self);
        let empty = ends_value(&token);
        self.push_back(token);
        if empty {
            // A declaration needs a value
            self.set_parse_error();
            return self.done();
        }
        self.push(State::Value, 1)
    }

    /// value0 -> value value0 | ε
    pub(super) fn parse_value0(&mut self, _substate: u8) -> CssResult<Flow> {
        if self.parse_error {
            return self.done();
        }

        let token = next_token!(self);
        let end = ends_value(&token);
        self.push_back(token);
        if end {
            return self.done();
        }
        self.push(State::Value, 0)
    }

    /// value -> any | block | ATKEYWORD S*
    pub(super) fn parse_value(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            VALUE_INITIAL => {
                let token = next_token!(self);
                match token.kind {
                    TokenKind::AtKeyword => self.goto(VALUE_WS),
                    TokenKind::Char('{') => {
                        self.match_stack.try_reserve(1)?;
                        self.match_stack.push('}');
                        self.goto(VALUE_BLOCK_WS)
                    }
                    _ => {
                        self.push_back(token);
                        self.replace(State::Any)
                    }
                }
            }
            VALUE_WS => {
                consume_whitespace!(self);
                self.done()
            }
            VALUE_BLOCK_WS => {
                consume_whitespace!(self);
                self.goto(VALUE_BLOCK_BODY)
            }
            VALUE_BLOCK_BODY => {
                // block -> '{' S* [ any | block | ATKEYWORD S* | ';' S* ]* '}' S*
                if self.parse_error {
                    return self.done();
                }

                let token = next_token!(self);
                match token.kind {
                    TokenKind::Char('}') => {
                        self.match_stack.pop();
                        self.goto(VALUE_WS)
                    }
                    TokenKind::Char(';') => self.goto(VALUE_BLOCK_WS),
                    TokenKind::Eof => {
                        self.match_stack.pop();
                        self.push_back(token);
                        self.done()
                    }
                    TokenKind::Char('{') | TokenKind::AtKeyword => {
                        self.push_back(token);
                        self.push(State::Value, VALUE_BLOCK_BODY)
                    }
                    TokenKind::Char(')') | TokenKind::Char(']') => {
                        self.set_parse_error();
                        self.push_back(token);
                        self.done()
                    }
                    _ => {
                        self.push_back(token);
                        self.push(State::Any0, VALUE_BLOCK_AFTER_ANY)
                    }
                }
            }
            _ => self.goto(VALUE_BLOCK_BODY),
        }
    }

    /// any0 -> any any0 | ε
    pub(super) fn parse_any0(&mut self, _substate: u8) -> CssResult<Flow> {
        if self.parse_error {
            return self.done();
        }

        let token = next_token!(self);
        let end = ends_any_run(&token);
        self.push_back(token);
        if end {
            return self.done();
        }
        self.push(State::Any, 0)
    }

    /// any1 -> any any0
    pub(super) fn parse_any1(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == 0 {
            return self.push(State::Any, 1);
        }
        if self.parse_error {
            return self.done();
        }
        self.replace(State::Any0)
    }

    /// any -> [ IDENT | NUMBER | PERCENTAGE | DIMENSION | STRING | CHAR | URI | HASH |
    ///          UNICODE-RANGE | INCLUDES | DASHMATCH | PREFIXMATCH | SUFFIXMATCH |
    ///          SUBSTRINGMATCH | FUNCTION S* any0 ')' | '(' S* any0 ')' | '[' S* any0 ']' ] S*
    pub(super) fn parse_any(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            ANY_INITIAL => {
                let token = next_token!(self);
                match token.kind {
                    TokenKind::Function | TokenKind::Char('(') | TokenKind::Char('[') => {
                        if let Some(closer) = closer_for(&token) {
                            self.match_stack.try_reserve(1)?;
                            self.match_stack.push(closer);
                        }
                        self.goto(ANY_OPEN_WS)
                    }
                    TokenKind::Ident
                    | TokenKind::Number
                    | TokenKind::Percentage
                    | TokenKind::Dimension
                    | TokenKind::String
                    | TokenKind::Uri
                    | TokenKind::Hash
                    | TokenKind::UnicodeRange
                    | TokenKind::Includes
                    | TokenKind::DashMatch
                    | TokenKind::PrefixMatch
                    | TokenKind::SuffixMatch
                    | TokenKind::SubstringMatch => self.goto(ANY_WS),
                    TokenKind::Char(c) if !matches!(c, '{' | '}' | ')' | ']' | ';') => self.goto(ANY_WS),
                    _ => {
                        self.set_parse_error();
                        self.push_back(token);
                        self.done()
                    }
                }
            }
            ANY_OPEN_WS => {
                consume_whitespace!(self);
                self.push(State::Any0, ANY_CLOSE)
            }
            ANY_CLOSE => {
                if self.parse_error {
                    // The bracket stays open for the recovery scanner
                    return self.done();
                }

                let token = next_token!(self);
                let expected = self.match_stack.last().copied();
                if token.is_eof() {
                    // Open constructs are closed at the end of the input
                    self.match_stack.pop();
                    self.push_back(token);
                    return self.goto(ANY_WS);
                }

                if expected.is_some_and(|c| token.is_char(c)) {
                    self.match_stack.pop();
                    return self.goto(ANY_WS);
                }

                self.set_parse_error();
                self.push_back(token);
                self.done()
            }
            _ => {
                consume_whitespace!(self);
                self.done()
            }
        }
    }
}
