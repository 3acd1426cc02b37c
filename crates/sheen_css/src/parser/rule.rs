use crate::errors::CssResult;
use crate::parser::state::State;
use crate::parser::{consume_whitespace, next_token, Event, EventHandler, Flow, Parser, Run};

// Substates of the ruleset production
const RULESET_INITIAL: u8 = 0;
const RULESET_BRACE: u8 = 1;
const RULESET_WS: u8 = 2;

// Substates of the ruleset-end production
const END_INITIAL: u8 = 0;
const END_DECL_LIST: u8 = 1;
const END_BRACE: u8 = 2;
const END_WS: u8 = 3;

impl<H: EventHandler> Parser<H> {
    /// ruleset -> selector? '{' S* ruleset-end
    pub(super) fn parse_ruleset(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            RULESET_INITIAL => {
                self.reset_tokens();
                let token = next_token!(self);
                let brace = token.is_char('{');
                self.push_back(token);
                if brace {
                    self.goto(RULESET_BRACE)
                } else {
                    self.push(State::Selector, RULESET_BRACE)
                }
            }
            RULESET_BRACE => {
                let token = next_token!(self);
                if token.is_eof() {
                    // A selector without a block contributes nothing
                    self.push_back(token);
                    return self.done();
                }

                if !token.is_char('{') || self.parse_error {
                    self.set_parse_error();
                    self.push_back(token);
                    return self.replace(State::MalformedSelector);
                }

                // The brace itself is not part of the selector
                self.forget_last();
                if !self.emit_run(Run::Selector) {
                    self.set_parse_error();
                    self.push_back(token);
                    return self.replace(State::MalformedSelector);
                }

                self.emit(Event::StartRuleset);
                self.goto(RULESET_WS)
            }
            _ => {
                consume_whitespace!(self);
                self.replace(State::RulesetEnd)
            }
        }
    }

    /// ruleset-end -> declaration? decl-list '}' S*
    pub(super) fn parse_ruleset_end(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            END_INITIAL => {
                let token = next_token!(self);
                let starts_declaration = !token.is_eof() && !token.is_char(';') && !token.is_char('}');
                self.push_back(token);
                if starts_declaration {
                    self.push(State::Declaration, END_DECL_LIST)
                } else {
                    self.goto(END_DECL_LIST)
                }
            }
            END_DECL_LIST => self.push(State::DeclList, END_BRACE),
            END_BRACE => {
                let token = next_token!(self);
                if token.is_char('}') {
                    self.emit(Event::EndRuleset);
                    return self.goto(END_WS);
                }

                // The declaration list only ends at '}' or at the end of the input, which closes
                // the ruleset implicitly
                self.push_back(token);
                self.emit(Event::EndRuleset);
                self.done()
            }
            _ => {
                consume_whitespace!(self);
                self.done()
            }
        }
    }

    /// selector -> any1
    pub(super) fn parse_selector(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == 0 {
            return self.push(State::Any1, 1);
        }
        self.done()
    }
}
