//! Recovery from malformed constructs
//!
//! All three scanners discard tokens while keeping track of open brackets. A closing bracket that
//! does not match the innermost open one is ignored. For declarations, brackets that were still
//! open when the error was found (inside a function of the broken value) are taken over from the
//! `any` productions.

use crate::errors::CssResult;
use crate::parser::{closer_for, consume_whitespace, next_token, EventHandler, Flow, Parser, Token};

const SCAN_INITIAL: u8 = 0;
const SCAN_TOKENS: u8 = 1;
const SCAN_TRAILING_WS: u8 = 2;

/// Outcome of feeding one token to the bracket tracker
enum Bracket {
    Opened,
    /// The innermost bracket was closed by the given character
    Closed(char),
    Other,
}

impl<H: EventHandler> Parser<H> {
    /// Skips the rest of a declaration, up to a `;` or `}` outside of any brackets. The terminator
    /// is left for the declaration list.
    pub(super) fn parse_malformed_decl(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == SCAN_INITIAL {
            self.start_recovery(true);
        }

        loop {
            let token = next_token!(self);
            if token.is_eof() {
                self.push_back(token);
                return self.end_recovery();
            }

            if self.open_brackets.is_empty() && (token.is_char(';') || token.is_char('}')) {
                self.push_back(token);
                return self.end_recovery();
            }

            self.track_bracket(&token)?;
        }
    }

    /// Skips a statement with a broken selector, up to and including the end of the next block
    pub(super) fn parse_malformed_selector(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == SCAN_TRAILING_WS {
            consume_whitespace!(self);
            return self.end_recovery();
        }
        if substate == SCAN_INITIAL {
            self.start_recovery(false);
        }

        loop {
            let token = next_token!(self);
            if token.is_eof() {
                self.push_back(token);
                return self.end_recovery();
            }

            if let Bracket::Closed('}') = self.track_bracket(&token)? {
                if self.open_brackets.is_empty() {
                    return self.goto(SCAN_TRAILING_WS);
                }
            }
        }
    }

    /// Skips an at-rule, up to and including a `;` or the end of its block
    pub(super) fn parse_malformed_at_rule(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == SCAN_TRAILING_WS {
            consume_whitespace!(self);
            return self.end_recovery();
        }
        if substate == SCAN_INITIAL {
            self.start_recovery(false);
        }

        loop {
            let token = next_token!(self);
            if token.is_eof() {
                self.push_back(token);
                return self.end_recovery();
            }

            if self.open_brackets.is_empty() {
                if token.is_char(';') {
                    return self.goto(SCAN_TRAILING_WS);
                }
                if token.is_char('}') {
                    // Belongs to an enclosing block
                    self.push_back(token);
                    return self.end_recovery();
                }
            }

            if let Bracket::Closed('}') = self.track_bracket(&token)? {
                if self.open_brackets.is_empty() {
                    return self.goto(SCAN_TRAILING_WS);
                }
            }
        }
    }

    fn start_recovery(&mut self, keep_open_brackets: bool) {
        log::warn!(
            "parser: recovering from malformed {:?} at {}",
            self.stack.last().map(|frame| frame.state),
            self.tokenizer.current_location()
        );
        self.set_parse_error();
        self.open_brackets = std::mem::take(&mut self.match_stack);
        if !keep_open_brackets {
            self.open_brackets.clear();
        }
        if let Some(top) = self.stack.last_mut() {
            top.substate = SCAN_TOKENS;
        }
    }

    fn end_recovery(&mut self) -> CssResult<Flow> {
        self.open_brackets.clear();
        self.done()
    }

    fn track_bracket(&mut self, token: &Token) -> CssResult<Bracket> {
        if let Some(closer) = closer_for(token) {
            self.open_brackets.try_reserve(1)?;
            self.open_brackets.push(closer);
            return Ok(Bracket::Opened);
        }

        if let Some(&expected) = self.open_brackets.last() {
            if token.is_char(expected) {
                self.open_brackets.pop();
                return Ok(Bracket::Closed(expected));
            }
        }

        Ok(Bracket::Other)
    }
}
