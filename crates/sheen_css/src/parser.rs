//! Resumable CSS 2.1 grammar parser
//!
//! The parser drives an explicit stack of [`Frame`]s. Every grammar production is a [`State`] and
//! is implemented as a step function in one of the submodules: a step either advances the
//! substate of its own frame, pushes a child production (recording where to continue once the
//! child is done), replaces itself or pops. When the tokenizer runs out of data, the step returns
//! [`Flow::NeedData`] without changing its frame, so the parse can be suspended after any byte
//! and resumed by feeding the next chunk.
//!
//! Tokens read by the productions are collected into a token run which is handed to the event
//! handler (selectors, at-rule preludes, declarations and block content).

mod at_rule;
mod block;
mod declaration;
mod inline;
mod malformed;
mod rule;
pub mod state;
mod stylesheet;
mod value;

use std::fmt;

use sheen_shared::intern::{Interner, Istr};
use sheen_shared::location::Location;

use crate::errors::{CssError, CssResult};
use crate::input::{CharsetSource, InputStream};
use crate::parser::state::{Frame, State};
use crate::parser_config::{Context, ParserConfig};
use crate::tokenizer::{Lexed, TokenKind, Tokenizer, TokenizerConfig};

/// A token as seen by the event handler. The text is interned.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Istr,
    pub location: Location,
}

impl Token {
    pub fn is_char(&self, c: char) -> bool {
        self.kind == TokenKind::Char(c)
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Returns true for an identifier that matches the given (lowercase) keyword
    pub fn is_ident(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Ident && self.text.eq_ignore_ascii_case(keyword)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) at {}", self.kind, self.text.as_str(), self.location)
    }
}

/// Events emitted by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    StartStylesheet,
    EndStylesheet,
    /// The selector of the next ruleset. Rejecting it skips the whole ruleset.
    Selector(&'a [Token]),
    StartRuleset,
    EndRuleset,
    /// The at-keyword and prelude of an at-rule. Rejecting it skips the whole at-rule.
    StartAtRule(&'a [Token]),
    EndAtRule,
    StartBlock,
    EndBlock,
    /// A run of block content, terminated by `;`, a nested block or the end of the block
    BlockContent(&'a [Token]),
    /// A single declaration of a ruleset. Rejecting it drops the declaration.
    Declaration(&'a [Token]),
}

/// Receives the parser events. Returning false rejects the event.
pub trait EventHandler {
    fn handle(&mut self, event: Event<'_>) -> bool;

    /// Called when quirks mode is switched on or off
    fn set_quirks(&mut self, _quirks: bool) {}
}

impl<F> EventHandler for F
where
    F: FnMut(Event<'_>) -> bool,
{
    fn handle(&mut self, event: Event<'_>) -> bool {
        self(event)
    }
}

/// Result of feeding data to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All available input has been parsed; the parse is suspended until more data arrives
    NeedData,
    /// The whole document has been parsed
    Done,
}

/// What a production step wants the main loop to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    NeedData,
}

/// Events that carry the current token run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Selector,
    AtRule,
    BlockContent,
    Declaration,
}

/// Fetches the next token, or suspends the current production when the tokenizer needs data
macro_rules! next_token {
    ($parser:expr) => {
        match $parser.next()? {
            Some(token) => token,
            None => return Ok(Flow::NeedData),
        }
    };
}
pub(crate) use next_token;

/// Skips whitespace, suspending the current production when the tokenizer needs data
macro_rules! consume_whitespace {
    ($parser:expr) => {
        if $parser.consume_whitespace()? == Flow::NeedData {
            return Ok(Flow::NeedData);
        }
    };
}
pub(crate) use consume_whitespace;

pub struct Parser<H: EventHandler> {
    input: InputStream,
    tokenizer: Tokenizer,
    interner: Interner,
    handler: H,
    config: ParserConfig,
    stack: Vec<Frame>,
    /// One token of pushback
    pushback: Option<Token>,
    /// The last token that was read was appended to the token run
    last_recorded: bool,
    /// Token run of the current selector, declaration, at-rule prelude or block content
    tokens: Vec<Token>,
    /// Closing characters of the brackets opened by the `any` productions
    match_stack: Vec<char>,
    /// Closing characters of the brackets opened while recovering from a malformed construct
    open_brackets: Vec<char>,
    /// The current construct is malformed; tokens are no longer collected
    parse_error: bool,
}

impl<H: EventHandler> Parser<H> {
    /// Creates a parser for the given configuration. Strings are interned in a table owned by
    /// this parser.
    pub fn new(config: ParserConfig, handler: H) -> CssResult<Self> {
        Self::with_interner(config, Interner::new(), handler)
    }

    pub fn with_interner(config: ParserConfig, interner: Interner, handler: H) -> CssResult<Self> {
        let input = InputStream::new(config.charset.as_deref(), config.charset_source)?;
        let tokenizer = Tokenizer::new(TokenizerConfig {
            emit_comments: config.emit_comments,
        });

        let start = match config.context {
            Context::Stylesheet => Frame::new(State::Start),
            Context::Inline => Frame {
                state: State::Start,
                substate: stylesheet::START_INLINE,
            },
        };

        let mut parser = Self {
            input,
            tokenizer,
            interner,
            handler,
            config,
            stack: vec![start],
            pushback: None,
            last_recorded: false,
            tokens: Vec::new(),
            match_stack: Vec::new(),
            open_brackets: Vec::new(),
            parse_error: false,
        };
        parser.handler.set_quirks(parser.config.quirks);

        Ok(parser)
    }

    /// Switches quirks mode on or off
    pub fn configure(&mut self, quirks: bool) {
        self.config.quirks = quirks;
        self.handler.set_quirks(quirks);
    }

    /// Returns the detected charset and where it came from
    pub fn read_charset(&self) -> (&'static str, CharsetSource) {
        self.input.read_charset()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Parses a chunk of raw bytes. Parsing continues as far as the available data allows.
    pub fn feed(&mut self, bytes: &[u8]) -> CssResult<Status> {
        if self.stack.is_empty() {
            return Err(CssError::BadParameter("feed after the parse completed".into()));
        }

        self.input.append(bytes)?;
        self.run()
    }

    /// Signals the end of the input and parses the remaining data
    pub fn finish(&mut self) -> CssResult<()> {
        if self.stack.is_empty() {
            return Ok(());
        }

        self.input.close()?;
        match self.run()? {
            Status::Done => Ok(()),
            // The tokenizer never needs data once the stream is closed
            Status::NeedData => Err(CssError::BadParameter("parser suspended after end of input".into())),
        }
    }

    fn run(&mut self) -> CssResult<Status> {
        while let Some(frame) = self.stack.last().copied() {
            #[cfg(feature = "debug_parser")]
            log::trace!("parser: {:?} depth {}", frame, self.stack.len());

            let flow = match frame.state {
                State::Start => self.parse_start(frame.substate)?,
                State::Stylesheet => self.parse_stylesheet(frame.substate)?,
                State::Statement => self.parse_statement()?,
                State::Ruleset => self.parse_ruleset(frame.substate)?,
                State::RulesetEnd => self.parse_ruleset_end(frame.substate)?,
                State::AtRule => self.parse_at_rule(frame.substate)?,
                State::AtRuleEnd => self.parse_at_rule_end(frame.substate)?,
                State::Block => self.parse_block(frame.substate)?,
                State::BlockContent => self.parse_block_content(frame.substate)?,
                State::Selector => self.parse_selector(frame.substate)?,
                State::Declaration => self.parse_declaration(frame.substate)?,
                State::DeclList => self.parse_decl_list(frame.substate)?,
                State::DeclListEnd => self.parse_decl_list_end(frame.substate)?,
                State::Property => self.parse_property(frame.substate)?,
                State::Value0 => self.parse_value0(frame.substate)?,
                State::Value1 => self.parse_value1(frame.substate)?,
                State::Value => self.parse_value(frame.substate)?,
                State::Any0 => self.parse_any0(frame.substate)?,
                State::Any1 => self.parse_any1(frame.substate)?,
                State::Any => self.parse_any(frame.substate)?,
                State::MalformedDecl => self.parse_malformed_decl(frame.substate)?,
                State::MalformedSelector => self.parse_malformed_selector(frame.substate)?,
                State::MalformedAtRule => self.parse_malformed_at_rule(frame.substate)?,
                State::InlineStyle => self.parse_inline_style(frame.substate)?,
                State::InlineStyleBody => self.parse_inline_style_body(frame.substate)?,
            };

            if flow == Flow::NeedData {
                return Ok(Status::NeedData);
            }
        }

        Ok(Status::Done)
    }

    /// Pushes a child production. The current production continues at `then` once the child is
    /// done.
    fn push(&mut self, state: State, then: u8) -> CssResult<Flow> {
        if let Some(top) = self.stack.last_mut() {
            top.substate = then;
        }
        self.stack.try_reserve(1)?;
        self.stack.push(Frame::new(state));
        Ok(Flow::Continue)
    }

    /// Replaces the current production
    fn replace(&mut self, state: State) -> CssResult<Flow> {
        if let Some(top) = self.stack.last_mut() {
            *top = Frame::new(state);
        }
        Ok(Flow::Continue)
    }

    /// Moves the current production to another substate
    fn goto(&mut self, substate: u8) -> CssResult<Flow> {
        if let Some(top) = self.stack.last_mut() {
            top.substate = substate;
        }
        Ok(Flow::Continue)
    }

    /// Pops the current production
    fn done(&mut self) -> CssResult<Flow> {
        self.stack.pop();
        Ok(Flow::Continue)
    }

    /// Reads the next token, from the pushback slot when it is filled. Comments are dropped.
    /// Returns `None` when the tokenizer needs more data.
    fn next(&mut self) -> CssResult<Option<Token>> {
        let token = match self.pushback.take() {
            Some(token) => token,
            None => loop {
                match self.tokenizer.next_token(&mut self.input) {
                    Lexed::NeedData => return Ok(None),
                    Lexed::Token(raw) if raw.kind == TokenKind::Comment => continue,
                    Lexed::Token(raw) => {
                        break Token {
                            kind: raw.kind,
                            text: token_text(&self.interner, raw.kind, raw.text(&self.input)),
                            location: raw.location,
                        }
                    }
                }
            },
        };

        self.last_recorded = !self.parse_error && !token.is_eof();
        if self.last_recorded {
            self.tokens.try_reserve(1)?;
            self.tokens.push(token.clone());
        }

        Ok(Some(token))
    }

    /// Un-reads the token that was read last
    fn push_back(&mut self, token: Token) {
        self.forget_last();
        self.pushback = Some(token);
    }

    /// Removes the token that was read last from the token run, keeping it consumed
    fn forget_last(&mut self) {
        if self.last_recorded {
            self.tokens.pop();
            self.last_recorded = false;
        }
    }

    fn consume_whitespace(&mut self) -> CssResult<Flow> {
        loop {
            let Some(token) = self.next()? else {
                return Ok(Flow::NeedData);
            };
            if !token.is_whitespace() {
                self.push_back(token);
                return Ok(Flow::Continue);
            }
        }
    }

    /// Starts a new token run
    fn reset_tokens(&mut self) {
        self.tokens.clear();
        self.match_stack.clear();
        self.last_recorded = false;
        self.parse_error = false;
    }

    /// Marks the current construct as malformed
    fn set_parse_error(&mut self) {
        if !self.parse_error {
            log::trace!("parser: parse error in {:?}", self.stack.last());
        }
        self.parse_error = true;
    }

    /// Hands a plain event to the handler. Only run events can be rejected, so the result is not
    /// needed.
    fn emit(&mut self, event: Event<'_>) {
        self.handler.handle(event);
    }

    /// Hands the current token run, without surrounding whitespace, to the handler
    fn emit_run(&mut self, kind: Run) -> bool {
        let run = trim_whitespace(&self.tokens);
        let event = match kind {
            Run::Selector => Event::Selector(run),
            Run::AtRule => Event::StartAtRule(run),
            Run::BlockContent => Event::BlockContent(run),
            Run::Declaration => Event::Declaration(run),
        };
        self.handler.handle(event)
    }
}

/// Strips leading and trailing whitespace tokens from a token run
pub fn trim_whitespace(tokens: &[Token]) -> &[Token] {
    let start = tokens.iter().position(|t| !t.is_whitespace()).unwrap_or(tokens.len());
    let end = tokens.iter().rposition(|t| !t.is_whitespace()).map_or(start, |end| end + 1);
    &tokens[start..end]
}

/// Tokenizes a complete piece of css, such as a single property value. Comments and the final EOF
/// token are dropped.
pub fn tokenize(css: &str, interner: &Interner) -> CssResult<Vec<Token>> {
    let mut input = InputStream::new(None, CharsetSource::Default)?;
    input.append(css.as_bytes())?;
    input.close()?;

    let mut tokenizer = Tokenizer::new(TokenizerConfig::default());
    let mut tokens = Vec::new();
    loop {
        let raw = match tokenizer.next_token(&mut input) {
            Lexed::Token(raw) => raw,
            Lexed::NeedData => return Err(CssError::BadParameter("tokenizer suspended on closed input".into())),
        };
        match raw.kind {
            TokenKind::Eof => return Ok(tokens),
            TokenKind::Comment => continue,
            kind => {
                tokens.try_reserve(1)?;
                tokens.push(Token {
                    kind,
                    text: token_text(interner, kind, raw.text(&input)),
                    location: raw.location,
                });
            }
        }
    }
}

/// Whitespace never reaches a compiled style, so its text is kept out of the table
fn token_text(interner: &Interner, kind: TokenKind, text: &str) -> Istr {
    match kind {
        TokenKind::Whitespace => Istr::detached(text),
        _ => interner.intern(text),
    }
}

/// Returns the closing character for a token that opens a bracketed group
fn closer_for(token: &Token) -> Option<char> {
    match token.kind {
        TokenKind::Function | TokenKind::Char('(') => Some(')'),
        TokenKind::Char('[') => Some(']'),
        TokenKind::Char('{') => Some('}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records events as strings
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        reject_selectors: bool,
        reject_at_rules: bool,
    }

    fn describe(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join("|")
    }

    impl EventHandler for Recorder {
        fn handle(&mut self, event: Event<'_>) -> bool {
            let (line, result) = match event {
                Event::StartStylesheet => ("start-stylesheet".to_string(), true),
                Event::EndStylesheet => ("end-stylesheet".to_string(), true),
                Event::Selector(t) => (format!("selector {}", describe(t)), !self.reject_selectors),
                Event::StartRuleset => ("start-ruleset".to_string(), true),
                Event::EndRuleset => ("end-ruleset".to_string(), true),
                Event::StartAtRule(t) => (format!("at-rule {}", describe(t)), !self.reject_at_rules),
                Event::EndAtRule => ("end-at-rule".to_string(), true),
                Event::StartBlock => ("start-block".to_string(), true),
                Event::EndBlock => ("end-block".to_string(), true),
                Event::BlockContent(t) => (format!("content {}", describe(t)), true),
                Event::Declaration(t) => (format!("decl {}", describe(t)), true),
            };
            self.events.push(line);
            result
        }
    }

    fn parse_with(css: &str, context: Context, recorder: Recorder) -> Vec<String> {
        let config = ParserConfig {
            context,
            ..Default::default()
        };
        let mut parser = Parser::with_interner(config, Interner::new(), recorder).unwrap();
        parser.feed(css.as_bytes()).unwrap();
        parser.finish().unwrap();
        parser.into_handler().events
    }

    fn parse(css: &str) -> Vec<String> {
        parse_with(css, Context::Stylesheet, Recorder::default())
    }

    #[test]
    fn ruleset_events() {
        assert_eq!(
            parse("<!-- a > b, .c { color : red ; margin:0 }\n-->"),
            vec![
                "start-stylesheet",
                "selector a| |>| |b|,| |.|c",
                "start-ruleset",
                "decl color| |:| |red",
                "decl margin|:|0",
                "end-ruleset",
                "end-stylesheet",
            ]
        );
    }

    #[test]
    fn at_rule_events() {
        assert_eq!(
            parse("@import url(a.css) screen;@media print { p { x: y; z: w } }"),
            vec![
                "start-stylesheet",
                "at-rule import| |a.css| |screen",
                "end-at-rule",
                "at-rule media| |print",
                "start-block",
                "content p",
                "start-block",
                "content x|:| |y",
                "content z|:| |w",
                "end-block",
                "end-block",
                "end-at-rule",
                "end-stylesheet",
            ]
        );
    }

    #[test]
    fn malformed_declaration_is_skipped() {
        assert_eq!(
            parse("a { color: red; bogus: ; width: (1; 2); ; foo: bar }"),
            vec![
                "start-stylesheet",
                "selector a",
                "start-ruleset",
                "decl color|:| |red",
                "decl foo|:| |bar",
                "end-ruleset",
                "end-stylesheet",
            ]
        );
    }

    #[test]
    fn malformed_property_names_are_skipped() {
        assert_eq!(
            parse("a { 12px: red; color: blue }"),
            vec![
                "start-stylesheet",
                "selector a",
                "start-ruleset",
                "decl color|:| |blue",
                "end-ruleset",
                "end-stylesheet",
            ]
        );
    }

    #[test]
    fn rejected_selector_skips_the_ruleset() {
        let recorder = Recorder {
            reject_selectors: true,
            ..Default::default()
        };
        assert_eq!(
            parse_with("a { b { } c: d } @x;", Context::Stylesheet, recorder),
            vec!["start-stylesheet", "selector a", "at-rule x", "end-at-rule", "end-stylesheet"]
        );
    }

    #[test]
    fn rejected_at_rule_is_skipped() {
        let recorder = Recorder {
            reject_at_rules: true,
            ..Default::default()
        };
        assert_eq!(
            parse_with("@font-face { src: x; } @foo bar; a{}", Context::Stylesheet, recorder),
            vec![
                "start-stylesheet",
                "at-rule font-face",
                "at-rule foo| |bar",
                "selector a",
                "start-ruleset",
                "end-ruleset",
                "end-stylesheet",
            ]
        );
    }

    #[test]
    fn malformed_selector_skips_to_end_of_block() {
        assert_eq!(
            parse("a ) b { color: red } p { x: y }"),
            vec![
                "start-stylesheet",
                "selector p",
                "start-ruleset",
                "decl x|:| |y",
                "end-ruleset",
                "end-stylesheet",
            ]
        );
    }

    #[test]
    fn unterminated_constructs_are_closed_at_eof() {
        assert_eq!(
            parse("a { color: rgb(1, 2"),
            vec![
                "start-stylesheet",
                "selector a",
                "start-ruleset",
                "decl color|:| |rgb|1|,| |2",
                "end-ruleset",
                "end-stylesheet",
            ]
        );
    }

    #[test]
    fn inline_style() {
        assert_eq!(
            parse_with("color: red; } margin: 0 !important", Context::Inline, Recorder::default()),
            vec![
                "start-stylesheet",
                "start-ruleset",
                "decl color|:| |red",
                "decl margin|:| |0| |!|important",
                "end-ruleset",
                "end-stylesheet",
            ]
        );
    }

    #[test]
    fn feed_after_completion_fails() {
        let mut parser = Parser::with_interner(ParserConfig::default(), Interner::new(), |_: Event<'_>| true).unwrap();
        parser.finish().unwrap();
        assert!(matches!(parser.feed(b"a{}"), Err(CssError::BadParameter(_))));
    }

    #[test]
    fn closure_handlers() {
        let mut count = 0;
        let mut parser = Parser::with_interner(
            ParserConfig::default(),
            Interner::new(),
            |event: Event<'_>| {
                if matches!(event, Event::Declaration(_)) {
                    count += 1;
                }
                true
            },
        )
        .unwrap();
        assert_eq!(parser.feed(b"a { b: c; d: e }").unwrap(), Status::NeedData);
        parser.finish().unwrap();
        drop(parser);
        assert_eq!(count, 2);
    }
}
