//! Stylesheets
//!
//! [`StylesheetBuilder`] receives the parser events and turns them into a [`Stylesheet`]: selector
//! runs are parsed into [`Selector`]s, declarations are compiled into one [`Style`] per rule and
//! at-rules are checked for their place in the sheet. Anything that is invalid is dropped with a
//! debug log line, as CSS error handling demands.

use std::sync::Arc;

use cow_utils::CowUtils;
use serde::Deserialize;
use sheen_shared::intern::{Interner, Istr};

use crate::errors::CssResult;
use crate::parser::{trim_whitespace, Event, EventHandler, Parser, Token};
use crate::parser_config::{Context, ParserConfig};
use crate::properties::bytecode::{Style, StyleBuilder};
use crate::properties::{compile_into, CompileContext};
use crate::selector::{parse_selector_group, Selector};
use crate::tokenizer::TokenKind;

/// Defines the origin of the stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Browser defaults
    UserAgent,
    /// Stylesheets configured by the user
    User,
    /// Stylesheets that are linked or embedded in the document
    #[default]
    Author,
}

/// A complete stylesheet with all its rules and the location where it was found
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
    pub origin: Origin,
    /// Url or file path where the stylesheet was found
    pub location: Option<String>,
    /// A value was only accepted because the sheet was parsed in quirks mode
    pub quirks_used: bool,
}

/// A ruleset: the selectors that must match and the compiled declarations
#[derive(Debug, Clone, PartialEq)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    pub style: Arc<Style>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Style(StyleRule),
    Charset(Istr),
    Import { url: Istr, media: Vec<Istr> },
    Media { media: Vec<Istr>, rules: Vec<StyleRule> },
    Page { selector: Option<Istr>, style: Arc<Style> },
}

impl Stylesheet {
    /// Parses a complete stylesheet. Strings are interned in a table of its own, so they are
    /// released together with the sheet.
    pub fn parse(css: &str, config: ParserConfig) -> CssResult<Stylesheet> {
        Self::parse_bytes(css.as_bytes(), config, Interner::new())
    }

    /// Parses a complete stylesheet, interning its strings in `interner`. Afterwards the table is
    /// purged, so it only keeps strings that live sheets still reference.
    pub fn parse_bytes(bytes: &[u8], config: ParserConfig, interner: Interner) -> CssResult<Stylesheet> {
        let builder = StylesheetBuilder::new(&config, interner.clone());
        let mut parser = Parser::with_interner(config, interner.clone(), builder)?;
        parser.feed(bytes)?;
        parser.finish()?;
        let sheet = parser.into_handler().finish();
        interner.purge();
        Ok(sheet)
    }

    /// Parses the contents of a `style` attribute
    pub fn parse_inline(css: &str, config: ParserConfig) -> CssResult<Style> {
        let config = ParserConfig {
            context: Context::Inline,
            ..config
        };
        let sheet = Self::parse(css, config)?;
        let style = sheet.rules.into_iter().find_map(|rule| match rule {
            Rule::Style(rule) => Some(rule.style),
            _ => None,
        });
        Ok(style.map(Arc::unwrap_or_clone).unwrap_or_default())
    }

    /// Rulesets that apply to the given media type, in document order
    pub fn style_rules<'a>(&'a self, medium: &'a str) -> impl Iterator<Item = &'a StyleRule> + 'a {
        self.rules.iter().flat_map(move |rule| {
            let rules: &[StyleRule] = match rule {
                Rule::Style(rule) => std::slice::from_ref(rule),
                Rule::Media { media, rules } if media_matches(media, medium) => rules,
                _ => &[],
            };
            rules.iter()
        })
    }
}

fn media_matches(media: &[Istr], medium: &str) -> bool {
    media.is_empty() || media.iter().any(|m| m.as_str() == "all" || m.eq_ignore_ascii_case(medium))
}

/// Where the builder is in the event stream
#[derive(Debug)]
enum Open {
    /// Top level, between statements
    Sheet,
    /// Inside a ruleset
    Ruleset(Vec<Selector>, StyleBuilder),
    /// A `@media` rule; the selectors of the next nested ruleset are pending
    Media {
        media: Vec<Istr>,
        rules: Vec<StyleRule>,
        pending: Option<Vec<Selector>>,
        nested: Option<(Vec<Selector>, StyleBuilder)>,
    },
    /// A `@page` rule
    Page(Option<Istr>, StyleBuilder),
    /// An at-rule without a block (`@charset`, `@import`)
    Statement,
}

/// Builds a [`Stylesheet`] out of parser events
pub struct StylesheetBuilder {
    ctx: CompileContext,
    origin: Origin,
    location: Option<String>,
    rules: Vec<Rule>,
    open: Open,
    depth: usize,
    /// Any statement has been seen; `@charset` is no longer allowed
    seen_statement: bool,
    /// A statement other than `@charset` or `@import` has been seen
    seen_rule: bool,
}

impl StylesheetBuilder {
    pub fn new(config: &ParserConfig, interner: Interner) -> Self {
        Self {
            ctx: CompileContext::new(interner, config.quirks),
            origin: config.origin,
            location: config.source.clone(),
            rules: Vec::new(),
            open: Open::Sheet,
            depth: 0,
            seen_statement: false,
            seen_rule: false,
        }
    }

    pub fn finish(self) -> Stylesheet {
        Stylesheet {
            rules: self.rules,
            origin: self.origin,
            location: self.location,
            quirks_used: self.ctx.quirks_used(),
        }
    }

    fn selectors(&mut self, tokens: &[Token]) -> Option<Vec<Selector>> {
        let selectors = parse_selector_group(tokens, self.ctx.interner());
        if selectors.is_none() {
            log::debug!("dropping ruleset with invalid selector {}", describe(tokens));
        }
        selectors
    }

    fn start_at_rule(&mut self, tokens: &[Token]) -> bool {
        let Some((keyword, prelude)) = tokens.split_first() else {
            return false;
        };
        let name = keyword.text.cow_to_ascii_lowercase();
        let prelude = trim_whitespace(prelude);

        let first_statement = !self.seen_statement;
        self.seen_statement = true;

        match name.as_ref() {
            "charset" => {
                let accepted = match prelude {
                    [charset] if first_statement && charset.kind == TokenKind::String => {
                        self.rules.push(Rule::Charset(charset.text.clone()));
                        true
                    }
                    _ => false,
                };
                self.open = Open::Statement;
                accepted || self.reject_at_rule(tokens)
            }
            "import" if !self.seen_rule => {
                let Some((url, media)) = prelude.split_first() else {
                    return self.reject_at_rule(tokens);
                };
                if !matches!(url.kind, TokenKind::String | TokenKind::Uri) {
                    return self.reject_at_rule(tokens);
                }
                let Some(media) = self.media_list(media) else {
                    return self.reject_at_rule(tokens);
                };
                self.rules.push(Rule::Import {
                    url: url.text.clone(),
                    media,
                });
                self.open = Open::Statement;
                true
            }
            "media" => {
                self.seen_rule = true;
                match self.media_list(prelude) {
                    Some(media) if !media.is_empty() => {
                        self.open = Open::Media {
                            media,
                            rules: Vec::new(),
                            pending: None,
                            nested: None,
                        };
                        true
                    }
                    _ => self.reject_at_rule(tokens),
                }
            }
            "page" => {
                self.seen_rule = true;
                let selector = match prelude {
                    [] => None,
                    [colon, name] if colon.is_char(':') && name.kind == TokenKind::Ident => {
                        Some(self.ctx.interner().intern(name.text.cow_to_ascii_lowercase().as_ref()))
                    }
                    _ => return self.reject_at_rule(tokens),
                };
                self.open = Open::Page(selector, StyleBuilder::new());
                true
            }
            _ => {
                self.seen_rule = true;
                self.reject_at_rule(tokens)
            }
        }
    }

    fn reject_at_rule(&mut self, tokens: &[Token]) -> bool {
        log::debug!("dropping at-rule {}", describe(tokens));
        self.open = Open::Sheet;
        false
    }

    /// Comma separated media types. An empty run gives an empty list.
    fn media_list(&self, tokens: &[Token]) -> Option<Vec<Istr>> {
        let tokens = trim_whitespace(tokens);
        if tokens.is_empty() {
            return Some(Vec::new());
        }

        let mut media = Vec::new();
        for run in tokens.split(|t| t.is_char(',')) {
            match trim_whitespace(run) {
                [medium] if medium.kind == TokenKind::Ident => media.push(
                    self.ctx
                        .interner()
                        .intern(medium.text.cow_to_ascii_lowercase().as_ref()),
                ),
                _ => return None,
            }
        }
        Some(media)
    }

    /// Compiles a `name: value` run into the builder. Returns false when the declaration is
    /// dropped.
    fn declaration(ctx: &mut CompileContext, tokens: &[Token], builder: &mut StyleBuilder) -> bool {
        let tokens = trim_whitespace(tokens);
        let Some((property, rest)) = tokens.split_first() else {
            return false;
        };
        let rest = trim_whitespace(rest);
        let value = match rest.split_first() {
            Some((colon, value)) if property.kind == TokenKind::Ident && colon.is_char(':') => value,
            _ => {
                log::debug!("dropping malformed declaration {}", describe(tokens));
                return false;
            }
        };

        match compile_into(ctx, &property.text, value, builder) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("dropping declaration {}: {e}", describe(tokens));
                false
            }
        }
    }

    fn block_content(&mut self, tokens: &[Token]) -> bool {
        let depth = self.depth;
        match &mut self.open {
            Open::Media { pending, nested, .. } => match (depth, nested) {
                (1, _) => {
                    if trim_whitespace(tokens).is_empty() {
                        return true;
                    }
                    let selectors = parse_selector_group(tokens, self.ctx.interner());
                    if selectors.is_none() {
                        log::debug!("dropping ruleset with invalid selector {}", describe(tokens));
                    }
                    *pending = selectors;
                    true
                }
                (2, Some((_, builder))) => Self::declaration(&mut self.ctx, tokens, builder),
                _ => false,
            },
            Open::Page(_, builder) if depth == 1 => Self::declaration(&mut self.ctx, tokens, builder),
            _ => false,
        }
    }

    fn start_block(&mut self) {
        self.depth += 1;
        if let Open::Media { pending, nested, .. } = &mut self.open {
            if self.depth == 2 {
                *nested = pending.take().map(|selectors| (selectors, StyleBuilder::new()));
            }
        }
    }

    fn end_block(&mut self) {
        if let Open::Media { rules, nested, .. } = &mut self.open {
            if self.depth == 2 {
                if let Some((selectors, builder)) = nested.take() {
                    rules.push(StyleRule {
                        selectors,
                        style: Arc::new(builder.finish()),
                    });
                }
            }
        }
        self.depth = self.depth.saturating_sub(1);
    }

    fn end_at_rule(&mut self) {
        let open = std::mem::replace(&mut self.open, Open::Sheet);
        match open {
            Open::Media { media, rules, .. } => self.rules.push(Rule::Media { media, rules }),
            Open::Page(selector, builder) => self.rules.push(Rule::Page {
                selector,
                style: Arc::new(builder.finish()),
            }),
            _ => {}
        }
        self.depth = 0;
    }
}

impl EventHandler for StylesheetBuilder {
    fn handle(&mut self, event: Event<'_>) -> bool {
        match event {
            Event::StartStylesheet | Event::EndStylesheet => true,
            Event::Selector(tokens) => {
                self.seen_statement = true;
                self.seen_rule = true;
                match self.selectors(tokens) {
                    Some(selectors) => {
                        self.open = Open::Ruleset(selectors, StyleBuilder::new());
                        true
                    }
                    None => false,
                }
            }
            Event::StartRuleset => {
                // Inline styles have a ruleset without selector
                if matches!(self.open, Open::Sheet) {
                    self.open = Open::Ruleset(Vec::new(), StyleBuilder::new());
                }
                true
            }
            Event::Declaration(tokens) => match &mut self.open {
                Open::Ruleset(_, builder) => Self::declaration(&mut self.ctx, tokens, builder),
                _ => false,
            },
            Event::EndRuleset => {
                if let Open::Ruleset(selectors, builder) = std::mem::replace(&mut self.open, Open::Sheet) {
                    self.rules.push(Rule::Style(StyleRule {
                        selectors,
                        style: Arc::new(builder.finish()),
                    }));
                }
                true
            }
            Event::StartAtRule(tokens) => self.start_at_rule(tokens),
            Event::EndAtRule => {
                self.end_at_rule();
                true
            }
            Event::StartBlock => {
                self.start_block();
                true
            }
            Event::EndBlock => {
                self.end_block();
                true
            }
            Event::BlockContent(tokens) => self.block_content(tokens),
        }
    }

    fn set_quirks(&mut self, quirks: bool) {
        self.ctx.set_quirks(quirks);
    }
}

fn describe(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::bytecode::Opv;
    use crate::properties::Property;

    fn parse(css: &str) -> Stylesheet {
        Stylesheet::parse_bytes(css.as_bytes(), ParserConfig::default(), Interner::new()).unwrap()
    }

    fn properties(style: &Style) -> Vec<Property> {
        style.instructions().iter().map(|opv: &Opv| opv.property).collect()
    }

    #[test]
    fn rulesets_compile_their_declarations() {
        let sheet = parse("h1, p.note { color: red; margin-top: 1em !important; bogus: 1; width: -1px }");
        assert_eq!(sheet.rules.len(), 1);
        let Rule::Style(rule) = &sheet.rules[0] else {
            panic!("expected a ruleset");
        };
        assert_eq!(rule.selectors.len(), 2);
        assert_eq!(rule.selectors[1].to_string(), "p.note");
        assert_eq!(properties(&rule.style), [Property::Color, Property::MarginTop]);
        assert!(rule.style.instructions()[1].is_important());
    }

    #[test]
    fn invalid_selectors_drop_the_ruleset() {
        let sheet = parse("p:bogus { color: red } em { color: blue }");
        assert_eq!(sheet.rules.len(), 1);
        let Rule::Style(rule) = &sheet.rules[0] else {
            panic!("expected a ruleset");
        };
        assert_eq!(rule.selectors[0].to_string(), "em");
    }

    #[test]
    fn charset_and_import_placement() {
        let sheet = parse("@charset \"utf-8\"; @import url(a.css) print, screen; p {} @import \"b.css\"; @charset \"x\";");
        assert_eq!(sheet.rules.len(), 3);
        assert!(matches!(&sheet.rules[0], Rule::Charset(name) if name.as_str() == "utf-8"));
        match &sheet.rules[1] {
            Rule::Import { url, media } => {
                assert_eq!(url.as_str(), "a.css");
                assert_eq!(media.iter().map(|m| m.as_str()).collect::<Vec<_>>(), ["print", "screen"]);
            }
            other => panic!("expected an import, got {other:?}"),
        }
        assert!(matches!(&sheet.rules[2], Rule::Style(_)));
    }

    #[test]
    fn charset_must_come_first() {
        let sheet = parse("p {} @charset \"utf-8\";");
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn media_rules() {
        let sheet = parse("@media Print, tv { h1 { color: red } p:bad { color: blue } em { width: 1px } }");
        match &sheet.rules[0] {
            Rule::Media { media, rules } => {
                assert_eq!(media.iter().map(|m| m.as_str()).collect::<Vec<_>>(), ["print", "tv"]);
                assert_eq!(rules.len(), 2);
                assert_eq!(properties(&rules[0].style), [Property::Color]);
                assert_eq!(properties(&rules[1].style), [Property::Width]);
            }
            other => panic!("expected a media rule, got {other:?}"),
        }

        assert_eq!(sheet.style_rules("print").count(), 2);
        assert_eq!(sheet.style_rules("screen").count(), 0);
    }

    #[test]
    fn page_rules() {
        let sheet = parse("@page :first { margin: 2cm }");
        match &sheet.rules[0] {
            Rule::Page { selector, style } => {
                assert_eq!(selector.as_ref().map(|s| s.as_str()), Some("first"));
                assert_eq!(style.instructions().len(), 4);
            }
            other => panic!("expected a page rule, got {other:?}"),
        }
    }

    #[test]
    fn unknown_at_rules_are_dropped() {
        let sheet = parse("@font-face { font-family: x } p { color: red }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.style_rules("screen").count(), 1);
    }

    #[test]
    fn inline_styles() {
        let style = Stylesheet::parse_inline("color: red; display: block", ParserConfig::default()).unwrap();
        assert_eq!(properties(&style), [Property::Color, Property::Display]);
    }

    #[test]
    fn quirks_are_reported() {
        let config = ParserConfig {
            quirks: true,
            ..Default::default()
        };
        let sheet = Stylesheet::parse_bytes(b"p { width: 10 }", config, Interner::new()).unwrap();
        assert!(sheet.quirks_used);
        assert!(!parse("p { width: 10px }").quirks_used);
    }

    #[test]
    fn parsing_leaves_the_global_table_alone() {
        let before = Interner::global().len();
        for i in 0..1000 {
            let css = format!("p {{ font-family: \"family{i}\"; width: {i}.{i}px }} /* c{i} */");
            let sheet = Stylesheet::parse(&css, ParserConfig::default()).unwrap();
            let Rule::Style(rule) = &sheet.rules[0] else {
                panic!("expected a ruleset");
            };
            assert_eq!(properties(&rule.style), [Property::FontFamily, Property::Width]);
        }
        assert_eq!(Interner::global().len(), before);
    }

    #[test]
    fn shared_tables_release_strings_of_dropped_sheets() {
        let interner = Interner::new();
        let sheet = Stylesheet::parse_bytes(
            b"p.note { font-family: \"Gill Sans\", serif; width: 2.5px } /* note */",
            ParserConfig::default(),
            interner.clone(),
        )
        .unwrap();

        // token text of braces, numbers and property names is gone, the sheet's strings stay
        assert!(!interner.is_empty());
        assert_eq!(interner.purge(), 0);
        assert!(interner.intern("Gill Sans").ref_count() > 2);

        drop(sheet);
        assert!(interner.purge() > 0);
        assert!(interner.is_empty());
    }
}
