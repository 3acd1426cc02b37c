use crate::errors::CssResult;
use crate::parser::state::State;
use crate::parser::{consume_whitespace, next_token, EventHandler, Flow, Parser, Run};
use crate::tokenizer::TokenKind;

// Substates of the declaration production
const DECL_INITIAL: u8 = 0;
const DECL_COLON: u8 = 1;
const DECL_WS: u8 = 2;
const DECL_VALUE: u8 = 3;

// Substates of the decl-list productions
const LIST_INITIAL: u8 = 0;
const LIST_WS: u8 = 1;
const LIST_END_AFTER_DECL: u8 = 1;

impl<H: EventHandler> Parser<H> {
    /// declaration -> property ':' S* value1
    pub(super) fn parse_declaration(&mut self, substate: u8) -> CssResult<Flow> {
        match substate {
            DECL_INITIAL => {
                self.reset_tokens();
                self.push(State::Property, DECL_COLON)
            }
            DECL_COLON => {
                if self.parse_error {
                    return self.replace(State::MalformedDecl);
                }

                let token = next_token!(self);
                if !token.is_char(':') {
                    self.set_parse_error();
                    self.push_back(token);
                    return self.replace(State::MalformedDecl);
                }
                self.goto(DECL_WS)
            }
            DECL_WS => {
                consume_whitespace!(self);
                self.push(State::Value1, DECL_VALUE)
            }
            _ => {
                if self.parse_error {
                    return self.replace(State::MalformedDecl);
                }

                if !self.emit_run(Run::Declaration) {
                    log::debug!("parser: declaration rejected");
                }
                self.done()
            }
        }
    }

    /// decl-list -> ';' S* decl-list-end | ε
    pub(super) fn parse_decl_list(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == LIST_WS {
            consume_whitespace!(self);
            return self.replace(State::DeclListEnd);
        }

        let token = next_token!(self);
        if token.is_eof() || token.is_char('}') {
            self.push_back(token);
            return self.done();
        }

        if token.is_char(';') {
            return self.goto(LIST_WS);
        }

        // Leftovers of a declaration that did not end where expected
        self.set_parse_error();
        self.push_back(token);
        self.push(State::MalformedDecl, LIST_INITIAL)
    }

    /// decl-list-end -> declaration? decl-list
    pub(super) fn parse_decl_list_end(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == LIST_END_AFTER_DECL {
            return self.replace(State::DeclList);
        }

        let token = next_token!(self);
        let starts_declaration = !token.is_eof() && !token.is_char(';') && !token.is_char('}');
        self.push_back(token);
        if starts_declaration {
            self.push(State::Declaration, LIST_END_AFTER_DECL)
        } else {
            self.goto(LIST_END_AFTER_DECL)
        }
    }

    /// property -> IDENT S*
    pub(super) fn parse_property(&mut self, substate: u8) -> CssResult<Flow> {
        if substate == 1 {
            consume_whitespace!(self);
            return self.done();
        }

        let token = next_token!(self);
        if token.kind != TokenKind::Ident {
            self.set_parse_error();
            self.push_back(token);
            return self.done();
        }
        self.goto(1)
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::{Event, Parser};
    use crate::parser_config::ParserConfig;
    use sheen_shared::intern::Interner;

    fn declarations(css: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut parser = Parser::with_interner(ParserConfig::default(), Interner::new(), |event: Event<'_>| {
            if let Event::Declaration(tokens) = event {
                found.push(tokens.iter().map(|t| t.text.as_str()).collect::<String>());
            }
            true
        })
        .unwrap();
        parser.feed(css.as_bytes()).unwrap();
        parser.finish().unwrap();
        drop(parser);
        found
    }

    #[test]
    fn empty_declarations_are_skipped() {
        assert_eq!(declarations("a { ;; color: red;; }"), vec!["color: red"]);
    }

    #[test]
    fn missing_colon() {
        assert_eq!(declarations("a { color red; width: 1px }"), vec!["width: 1px"]);
    }

    #[test]
    fn brackets_are_balanced_while_recovering() {
        assert_eq!(
            declarations("a { x: [;] ) ; y: { ; } z; w: 2 }"),
            vec!["y: { ; }", "w: 2"]
        );
    }

    #[test]
    fn important_is_part_of_the_run() {
        assert_eq!(declarations("a{color:red ! important}"), vec!["color:red ! important"]);
    }
}
