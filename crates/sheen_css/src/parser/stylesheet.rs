use crate::errors::CssResult;
use crate::parser::state::State;
use crate::parser::{consume_whitespace, next_token, Event, EventHandler, Flow, Parser};
use crate::tokenizer::TokenKind;

// Substates of the start production
const START_INITIAL: u8 = 0;
const START_WS: u8 = 1;
const START_DONE: u8 = 2;
/// Start of a parser for a `style` attribute
pub(super) const START_INLINE: u8 = 3;
const START_INLINE_BODY: u8 = 4;

// Substates of the stylesheet production
const STYLESHEET_INITIAL: u8 = 0;
const STYLESHEET_WS: u8 = 1;

impl<H: EventHandler> Parser<H> {
    /// start -> stylesheet EOF
    pub(super) fn parse_start(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            START_INITIAL => {
                self.emit(Event::StartStylesheet);
                self.goto(START_WS)
            }
            START_WS => {
                consume_whitespace!(self);
                self.push(State::Stylesheet, START_DONE)
            }
            START_INLINE => {
                self.emit(Event::StartStylesheet);
                self.goto(START_INLINE_BODY)
            }
            START_INLINE_BODY => self.push(State::InlineStyle, START_DONE),
            _ => {
                self.emit(Event::EndStylesheet);
                self.done()
            }
        }
    }

    /// stylesheet -> [ CDO | CDC | S | statement ]*
    pub(super) fn parse_stylesheet(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == STYLESHEET_WS {
            consume_whitespace!(self);
            return self.goto(STYLESHEET_INITIAL);
        }

        let token = next_token!(self);
        match token.kind {
            TokenKind::Eof => {
                self.push_back(token);
                self.done()
            }
            TokenKind::Cdo | TokenKind::Cdc => self.goto(STYLESHEET_WS),
            _ => {
                self.push_back(token);
                self.push(State::Statement, STYLESHEET_WS)
            }
        }
    }

    /// statement -> ruleset | at-rule
    pub(super) fn parse_statement(&mut self) -> CssResult<Flow> {
        let token = next_token!(self);
        let next = if token.kind == TokenKind::AtKeyword {
            State::AtRule
        } else {
            State::Ruleset
        };
        self.push_back(token);
        self.replace(next)
    }
}
