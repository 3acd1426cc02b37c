//! Helpers shared by the command line tool, the integration tests and the benchmarks. They feed
//! the input in chunks of a given size, so the resumable paths get exercised.

use sheen_css::errors::CssResult;
use sheen_css::input::InputStream;
use sheen_css::parser::{Event, EventHandler, Parser, Token};
use sheen_css::parser_config::ParserConfig;
use sheen_css::stylesheet::{Stylesheet, StylesheetBuilder};
use sheen_css::tokenizer::{Lexed, TokenKind, Tokenizer, TokenizerConfig};
use sheen_shared::intern::Interner;

/// Splits `bytes` into chunks of `chunk_size` bytes. A size of 0 gives a single chunk.
pub fn chunks(bytes: &[u8], chunk_size: usize) -> std::slice::Chunks<'_, u8> {
    let size = if chunk_size == 0 { bytes.len().max(1) } else { chunk_size };
    bytes.chunks(size)
}

/// Tokenizes `css` and describes every token as `kind "text" at line:column`
pub fn tokens(css: &[u8], chunk_size: usize, config: &ParserConfig) -> CssResult<Vec<String>> {
    let mut input = InputStream::new(config.charset.as_deref(), config.charset_source)?;
    let mut tokenizer = Tokenizer::new(TokenizerConfig {
        emit_comments: config.emit_comments,
    });
    let mut chunks = chunks(css, chunk_size);

    let mut tokens = Vec::new();
    loop {
        match tokenizer.next_token(&mut input) {
            Lexed::Token(token) => {
                tokens.push(format!("{} {:?} at {}", token.kind, token.text(&input), token.location));
                if token.kind == TokenKind::Eof {
                    return Ok(tokens);
                }
            }
            Lexed::NeedData => match chunks.next() {
                Some(chunk) => input.append(chunk)?,
                None => input.close()?,
            },
        }
    }
}

/// Describes a parser event on a single line
pub fn describe_event(event: Event<'_>) -> String {
    let run = |name: &str, tokens: &[Token]| {
        let tokens: Vec<String> = tokens.iter().map(|t| format!("{t:?}")).collect();
        format!("{name} [{}]", tokens.join(", "))
    };

    match event {
        Event::StartStylesheet => "start-stylesheet".into(),
        Event::EndStylesheet => "end-stylesheet".into(),
        Event::Selector(tokens) => run("selector", tokens),
        Event::StartRuleset => "start-ruleset".into(),
        Event::EndRuleset => "end-ruleset".into(),
        Event::StartAtRule(tokens) => run("at-rule", tokens),
        Event::EndAtRule => "end-at-rule".into(),
        Event::StartBlock => "start-block".into(),
        Event::EndBlock => "end-block".into(),
        Event::BlockContent(tokens) => run("block-content", tokens),
        Event::Declaration(tokens) => run("declaration", tokens),
    }
}

/// Accepts every event and keeps its description
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<String>,
}

impl EventHandler for EventLog {
    fn handle(&mut self, event: Event<'_>) -> bool {
        self.events.push(describe_event(event));
        true
    }
}

/// Parses `css` and returns the description of every event
pub fn events(css: &[u8], chunk_size: usize, config: ParserConfig) -> CssResult<Vec<String>> {
    let mut parser = Parser::with_interner(config, Interner::new(), EventLog::default())?;
    for chunk in chunks(css, chunk_size) {
        parser.feed(chunk)?;
    }
    parser.finish()?;
    Ok(parser.into_handler().events)
}

/// Builds a stylesheet from `css`
pub fn stylesheet(css: &[u8], chunk_size: usize, config: ParserConfig) -> CssResult<Stylesheet> {
    let interner = Interner::new();
    let builder = StylesheetBuilder::new(&config, interner.clone());
    let mut parser = Parser::with_interner(config, interner, builder)?;
    for chunk in chunks(css, chunk_size) {
        parser.feed(chunk)?;
    }
    parser.finish()?;
    Ok(parser.into_handler().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_sizes() {
        assert_eq!(chunks(b"abcde", 2).count(), 3);
        assert_eq!(chunks(b"abcde", 0).count(), 1);
        assert_eq!(chunks(b"", 0).count(), 0);
    }

    #[test]
    fn token_descriptions() {
        let tokens = tokens(b"a{", 0, &ParserConfig::default()).unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], "IDENT \"a\" at 1:1");
        assert!(tokens[2].starts_with("EOF"), "{}", tokens[2]);
    }
}
