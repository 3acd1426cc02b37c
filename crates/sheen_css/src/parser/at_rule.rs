use crate::errors::CssResult;
use crate::parser::state::State;
use crate::parser::{consume_whitespace, next_token, Event, EventHandler, Flow, Parser, Run};
use crate::tokenizer::TokenKind;

// Substates of the at-rule production
const AT_RULE_INITIAL: u8 = 0;
const AT_RULE_WS: u8 = 1;
const AT_RULE_PRELUDE: u8 = 2;

// Substates of the at-rule-end production
const END_INITIAL: u8 = 0;
const END_WS: u8 = 1;
const END_AFTER_BLOCK: u8 = 2;

impl<H: EventHandler> Parser<H> {
    /// at-rule -> ATKEYWORD S* any0 at-rule-end
    pub(super) fn parse_at_rule(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            AT_RULE_INITIAL => {
                self.reset_tokens();
                let token = next_token!(self);
                debug_assert_eq!(token.kind, TokenKind::AtKeyword);
                self.goto(AT_RULE_WS)
            }
            AT_RULE_WS => {
                consume_whitespace!(self);
                self.push(State::Any0, AT_RULE_PRELUDE)
            }
            _ => {
                if self.parse_error {
                    return self.replace(State::MalformedAtRule);
                }

                let token = next_token!(self);
                let unbalanced = token.is_char(')') || token.is_char(']') || token.is_char('}');
                self.push_back(token);
                if unbalanced {
                    self.set_parse_error();
                    return self.replace(State::MalformedAtRule);
                }

                if !self.emit_run(Run::AtRule) {
                    self.set_parse_error();
                    return self.replace(State::MalformedAtRule);
                }
                self.replace(State::AtRuleEnd)
            }
        }
    }

    /// at-rule-end -> block | ';' S*
    pub(super) fn parse_at_rule_end(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            END_INITIAL => {
                let token = next_token!(self);
                match token.kind {
                    TokenKind::Char(';') => self.goto(END_WS),
                    TokenKind::Char('{') => {
                        self.push_back(token);
                        self.push(State::Block, END_AFTER_BLOCK)
                    }
                    _ => {
                        // End of input: the at-rule is closed implicitly
                        self.push_back(token);
                        self.emit(Event::EndAtRule);
                        self.done()
                    }
                }
            }
            END_WS => {
                consume_whitespace!(self);
                self.emit(Event::EndAtRule);
                self.done()
            }
            _ => {
                self.emit(Event::EndAtRule);
                self.done()
            }
        }
    }
}
