use crate::errors::CssResult;
use crate::parser::state::State;
use crate::parser::{consume_whitespace, next_token, Event, EventHandler, Flow, Parser};
use crate::tokenizer::TokenKind;

const INLINE_INITIAL: u8 = 0;
const INLINE_WS: u8 = 1;
const INLINE_DONE: u8 = 2;

impl<H: EventHandler> Parser<H> {
    /// inline-style -> S* inline-style-body, wrapped in an implicit ruleset
    pub(super) fn parse_inline_style(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            INLINE_INITIAL => {
                self.emit(Event::StartRuleset);
                self.goto(INLINE_WS)
            }
            INLINE_WS => {
                consume_whitespace!(self);
                self.push(State::InlineStyleBody, INLINE_DONE)
            }
            _ => {
                self.emit(Event::EndRuleset);
                self.done()
            }
        }
    }

    /// inline-style-body -> [ declaration | decl-list | S ]* EOF
    ///
    /// There is no enclosing block, so a stray `}` is dropped instead of ending the list.
    pub(super) fn parse_inline_style_body(&mut self, _substate: u8) -> CssResult<Flow> {
        let token = next_token!(self);
        match token.kind {
            TokenKind::Eof => {
                self.push_back(token);
                self.done()
            }
            TokenKind::Whitespace | TokenKind::Char('}') => Ok(Flow::Continue),
            TokenKind::Char(';') => {
                self.push_back(token);
                self.push(State::DeclList, 0)
            }
            _ => {
                self.push_back(token);
                self.push(State::Declaration, 0)
            }
        }
    }
}
