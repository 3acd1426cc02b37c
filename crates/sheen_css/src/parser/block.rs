use crate::errors::CssResult;
use crate::parser::state::State;
use crate::parser::{consume_whitespace, next_token, trim_whitespace, Event, EventHandler, Flow, Parser, Run};
use crate::tokenizer::TokenKind;

// Substates of the block production
const BLOCK_INITIAL: u8 = 0;
const BLOCK_WS: u8 = 1;
const BLOCK_CLOSE: u8 = 2;
const BLOCK_TRAILING_WS: u8 = 3;

// Substates of the block-content production
const CONTENT_INITIAL: u8 = 0;
const CONTENT_WS: u8 = 1;
const CONTENT_AFTER_ANY: u8 = 2;
const CONTENT_RECOVERED: u8 = 3;

impl<H: EventHandler> Parser<H> {
    /// block -> '{' S* block-content '}' S*
    pub(super) fn parse_block(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            BLOCK_INITIAL => {
                let token = next_token!(self);
                debug_assert!(token.is_char('{'));
                self.emit(Event::StartBlock);
                self.reset_tokens();
                self.goto(BLOCK_WS)
            }
            BLOCK_WS => {
                consume_whitespace!(self);
                self.push(State::BlockContent, BLOCK_CLOSE)
            }
            BLOCK_CLOSE => {
                let token = next_token!(self);
                self.emit(Event::EndBlock);
                if token.is_char('}') {
                    return self.goto(BLOCK_TRAILING_WS);
                }

                // Block content only ends at '}' or at the end of the input
                self.push_back(token);
                self.done()
            }
            _ => {
                consume_whitespace!(self);
                self.done()
            }
        }
    }

    /// block-content -> ( any | block | ATKEYWORD S* | ';' S* )*
    ///
    /// The content is handed to the event handler in runs that end at a `;`, in front of a nested
    /// block and at the end of the block.
    pub(super) fn parse_block_content(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            CONTENT_INITIAL => {
                let token = next_token!(self);
                match token.kind {
                    TokenKind::Eof | TokenKind::Char('}') => {
                        self.push_back(token);
                        self.emit_block_content();
                        self.done()
                    }
                    TokenKind::Char(';') => {
                        self.forget_last();
                        self.emit_block_content();
                        self.reset_tokens();
                        self.goto(CONTENT_WS)
                    }
                    TokenKind::Char('{') => {
                        self.push_back(token);
                        self.emit_block_content();
                        self.reset_tokens();
                        self.push(State::Block, CONTENT_INITIAL)
                    }
                    TokenKind::AtKeyword => self.goto(CONTENT_WS),
                    TokenKind::Char(')') | TokenKind::Char(']') => {
                        self.set_parse_error();
                        self.push_back(token);
                        self.push(State::MalformedDecl, CONTENT_RECOVERED)
                    }
                    _ => {
                        self.push_back(token);
                        self.push(State::Any, CONTENT_AFTER_ANY)
                    }
                }
            }
            CONTENT_WS => {
                consume_whitespace!(self);
                self.goto(CONTENT_INITIAL)
            }
            CONTENT_AFTER_ANY => {
                if self.parse_error {
                    return self.push(State::MalformedDecl, CONTENT_RECOVERED);
                }
                self.goto(CONTENT_INITIAL)
            }
            _ => {
                self.reset_tokens();
                self.goto(CONTENT_INITIAL)
            }
        }
    }

    fn emit_block_content(&mut self) {
        if self.parse_error || trim_whitespace(&self.tokens).is_empty() {
            return;
        }
        if !self.emit_run(Run::BlockContent) {
            log::debug!("parser: block content rejected");
        }
    }
}
