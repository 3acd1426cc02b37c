//! CSS 2.1 selectors
//!
//! Selector runs from the parser are validated and normalised here: element and attribute names
//! are lowercased, whitespace around combinators is dropped and a comma separated group is split
//! into its selectors.

use std::fmt;

use cow_utils::CowUtils;
use sheen_shared::intern::{Interner, Istr};

use crate::parser::{trim_whitespace, Token};
use crate::tokenizer::TokenKind;

const PSEUDO_CLASSES: [&str; 6] = ["first-child", "link", "visited", "hover", "active", "focus"];
const PSEUDO_ELEMENTS: [&str; 4] = ["first-line", "first-letter", "before", "after"];

/// A single selector: compound selectors joined by combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    pub fn specificity(&self) -> Specificity {
        Specificity::from(self.parts.as_slice())
    }
}

/// A part of a selector. Combinators separate the compound selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorPart {
    Universal,
    Type(Istr),
    Id(Istr),
    Class(Istr),
    Attribute(Box<AttributeSelector>),
    PseudoClass(Istr),
    /// `:lang(code)`
    Lang(Istr),
    PseudoElement(Istr),
    Combinator(Combinator),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: Istr,
    pub matcher: MatcherType,
    pub value: Option<Istr>,
}

/// How an attribute value is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatcherType {
    /// The attribute only has to be present
    #[default]
    None,
    Equals,
    Includes,
    DashMatch,
    PrefixMatch,
    SuffixMatch,
    SubstringMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
}

impl fmt::Display for MatcherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherType::None => write!(f, ""),
            MatcherType::Equals => write!(f, "="),
            MatcherType::Includes => write!(f, "~="),
            MatcherType::DashMatch => write!(f, "|="),
            MatcherType::PrefixMatch => write!(f, "^="),
            MatcherType::SuffixMatch => write!(f, "$="),
            MatcherType::SubstringMatch => write!(f, "*="),
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::Descendant => write!(f, " "),
            Combinator::Child => write!(f, " > "),
            Combinator::NextSibling => write!(f, " + "),
            Combinator::SubsequentSibling => write!(f, " ~ "),
        }
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorPart::Universal => write!(f, "*"),
            SelectorPart::Type(name) => write!(f, "{name}"),
            SelectorPart::Id(name) => write!(f, "#{name}"),
            SelectorPart::Class(name) => write!(f, ".{name}"),
            SelectorPart::Attribute(attr) => match &attr.value {
                Some(value) => write!(f, "[{}{}{:?}]", attr.name, attr.matcher, value.as_str()),
                None => write!(f, "[{}]", attr.name),
            },
            SelectorPart::PseudoClass(name) => write!(f, ":{name}"),
            SelectorPart::Lang(code) => write!(f, ":lang({code})"),
            SelectorPart::PseudoElement(name) => write!(f, "::{name}"),
            SelectorPart::Combinator(combinator) => write!(f, "{combinator}"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

/// Selector specificity: ids, then classes, attributes and pseudo-classes, then element names
/// and pseudo-elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity(pub u32, pub u32, pub u32);

impl Specificity {
    /// Declarations from a `style` attribute outrank every selector
    pub const INLINE: Specificity = Specificity(u32::MAX, 0, 0);

    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self(a, b, c)
    }
}

impl From<&[SelectorPart]> for Specificity {
    fn from(parts: &[SelectorPart]) -> Self {
        let mut specificity = Specificity::default();
        for part in parts {
            match part {
                SelectorPart::Id(_) => specificity.0 += 1,
                SelectorPart::Class(_)
                | SelectorPart::Attribute(_)
                | SelectorPart::PseudoClass(_)
                | SelectorPart::Lang(_) => specificity.1 += 1,
                SelectorPart::Type(_) | SelectorPart::PseudoElement(_) => specificity.2 += 1,
                SelectorPart::Universal | SelectorPart::Combinator(_) => {}
            }
        }
        specificity
    }
}

/// Parses a comma separated selector group. Returns `None` when any of the selectors is invalid,
/// which invalidates the whole group.
pub fn parse_selector_group(tokens: &[Token], interner: &Interner) -> Option<Vec<Selector>> {
    let mut selectors = Vec::new();
    for run in tokens.split(|t| t.is_char(',')) {
        let mut reader = SelectorReader {
            tokens: trim_whitespace(run),
            pos: 0,
            interner,
        };
        selectors.push(reader.selector()?);
    }
    Some(selectors)
}

struct SelectorReader<'a> {
    tokens: &'a [Token],
    pos: usize,
    interner: &'a Interner,
}

impl<'a> SelectorReader<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(Token::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn lowercase(&self, text: &str) -> Istr {
        self.interner.intern(text.cow_to_ascii_lowercase().as_ref())
    }

    fn selector(&mut self) -> Option<Selector> {
        let mut parts = Vec::new();
        self.compound(&mut parts)?;

        loop {
            let whitespace = self.skip_whitespace();
            let Some(token) = self.peek() else {
                break;
            };

            let combinator = match token.kind {
                TokenKind::Char('>') => Combinator::Child,
                TokenKind::Char('+') => Combinator::NextSibling,
                TokenKind::Char('~') => Combinator::SubsequentSibling,
                _ if whitespace => Combinator::Descendant,
                _ => return None,
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_whitespace();
            }

            parts.push(SelectorPart::Combinator(combinator));
            self.compound(&mut parts)?;
        }

        // A pseudo-element may only appear in the last compound selector
        let last_combinator = parts
            .iter()
            .rposition(|p| matches!(p, SelectorPart::Combinator(_)))
            .unwrap_or(0);
        if parts[..last_combinator]
            .iter()
            .any(|p| matches!(p, SelectorPart::PseudoElement(_)))
        {
            return None;
        }

        Some(Selector { parts })
    }

    /// An element name or `*` followed by any number of ids, classes, attribute selectors and
    /// pseudo selectors, without whitespace in between
    fn compound(&mut self, parts: &mut Vec<SelectorPart>) -> Option<()> {
        let start = parts.len();

        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Ident) => {
                let name = self.next()?;
                parts.push(SelectorPart::Type(self.lowercase(&name.text)));
            }
            Some(TokenKind::Char('*')) => {
                self.pos += 1;
                parts.push(SelectorPart::Universal);
            }
            _ => {}
        }

        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Hash => {
                    let starts_with_name = token
                        .text
                        .trim_start_matches('-')
                        .starts_with(|c: char| !c.is_ascii_digit());
                    if !starts_with_name {
                        return None;
                    }
                    self.pos += 1;
                    parts.push(SelectorPart::Id(token.text.clone()));
                }
                TokenKind::Char('.') => {
                    self.pos += 1;
                    let name = self.next().filter(|t| t.kind == TokenKind::Ident)?;
                    parts.push(SelectorPart::Class(name.text.clone()));
                }
                TokenKind::Char('[') => {
                    self.pos += 1;
                    let attribute = self.attribute()?;
                    parts.push(SelectorPart::Attribute(Box::new(attribute)));
                }
                TokenKind::Char(':') => {
                    self.pos += 1;
                    let part = self.pseudo()?;
                    parts.push(part);
                }
                _ => break,
            }
        }

        (parts.len() > start).then_some(())
    }

    /// The rest of `[name]` or `[name op value]` after the `[`
    fn attribute(&mut self) -> Option<AttributeSelector> {
        self.skip_whitespace();
        let name = self.next().filter(|t| t.kind == TokenKind::Ident)?;
        let name = self.lowercase(&name.text);
        self.skip_whitespace();

        let matcher = match self.next()?.kind {
            TokenKind::Char(']') => {
                return Some(AttributeSelector {
                    name,
                    matcher: MatcherType::None,
                    value: None,
                })
            }
            TokenKind::Char('=') => MatcherType::Equals,
            TokenKind::Includes => MatcherType::Includes,
            TokenKind::DashMatch => MatcherType::DashMatch,
            TokenKind::PrefixMatch => MatcherType::PrefixMatch,
            TokenKind::SuffixMatch => MatcherType::SuffixMatch,
            TokenKind::SubstringMatch => MatcherType::SubstringMatch,
            _ => return None,
        };

        self.skip_whitespace();
        let value = self
            .next()
            .filter(|t| matches!(t.kind, TokenKind::Ident | TokenKind::String))?;
        self.skip_whitespace();
        if !self.next()?.is_char(']') {
            return None;
        }

        Some(AttributeSelector {
            name,
            matcher,
            value: Some(value.text.clone()),
        })
    }

    /// The rest of a pseudo-class or pseudo-element after the first `:`
    fn pseudo(&mut self) -> Option<SelectorPart> {
        let double_colon = self.peek().is_some_and(|t| t.is_char(':'));
        if double_colon {
            self.pos += 1;
        }

        let token = self.next()?;
        let name = self.lowercase(&token.text);
        match token.kind {
            TokenKind::Ident if PSEUDO_ELEMENTS.contains(&name.as_str()) => Some(SelectorPart::PseudoElement(name)),
            TokenKind::Ident if !double_colon && PSEUDO_CLASSES.contains(&name.as_str()) => {
                Some(SelectorPart::PseudoClass(name))
            }
            TokenKind::Function if !double_colon && name.as_str() == "lang" => {
                self.skip_whitespace();
                let code = self.next().filter(|t| t.kind == TokenKind::Ident)?;
                self.skip_whitespace();
                if !self.next()?.is_char(')') {
                    return None;
                }
                Some(SelectorPart::Lang(code.text.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;
    use test_case::test_case;

    fn parse(css: &str) -> Option<Vec<Selector>> {
        let interner = Interner::new();
        parse_selector_group(&tokenize(css, &interner).unwrap(), &interner)
    }

    fn normalised(css: &str) -> Option<String> {
        let selectors = parse(css)?;
        Some(selectors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))
    }

    #[test_case("A  >B", "a > b"; "child combinator")]
    #[test_case("ul li,  P+em", "ul li, p + em"; "group")]
    #[test_case("*.warning#top", "*.warning#top"; "compound")]
    #[test_case("a[HREF] [lang|=en]", "a[href] [lang|=\"en\"]"; "attributes")]
    #[test_case("input[type = \"text\"]", "input[type=\"text\"]"; "quoted attribute value")]
    #[test_case("a:Hover p:first-line", "a:hover p::first-line"; "pseudo classes and elements")]
    #[test_case("p::after", "p::after"; "double colon pseudo element")]
    #[test_case("html:lang( fr ) q", "html:lang(fr) q"; "lang")]
    #[test_case("h1 ~ p", "h1 ~ p"; "subsequent sibling")]
    fn valid_selectors(css: &str, expected: &str) {
        assert_eq!(normalised(css).as_deref(), Some(expected));
    }

    #[test_case("a,"; "empty selector in group")]
    #[test_case("a > > b"; "double combinator")]
    #[test_case("#1a"; "id starting with a digit")]
    #[test_case("a:unknown"; "unknown pseudo class")]
    #[test_case("p::hover"; "pseudo class with double colon")]
    #[test_case("p:before a"; "pseudo element not last")]
    #[test_case("a[href"; "unterminated attribute")]
    #[test_case(". a"; "space after dot")]
    #[test_case("a > "; "trailing combinator")]
    fn invalid_selectors(css: &str) {
        assert_eq!(parse(css), None);
    }

    #[test_case("*", Specificity(0, 0, 0))]
    #[test_case("li", Specificity(0, 0, 1))]
    #[test_case("ul ol+li", Specificity(0, 0, 3))]
    #[test_case("h1 + *[rel=up]", Specificity(0, 1, 1))]
    #[test_case("ul ol li.red", Specificity(0, 1, 3))]
    #[test_case("li.red.level", Specificity(0, 2, 1))]
    #[test_case("#x34y", Specificity(1, 0, 0))]
    #[test_case("a:hover::before", Specificity(0, 1, 2))]
    fn specificities(css: &str, expected: Specificity) {
        let selectors = parse(css).unwrap();
        assert_eq!(selectors[0].specificity(), expected);
    }

    #[test]
    fn specificity_ordering() {
        assert!(Specificity(1, 0, 0) > Specificity(0, 12, 30));
        assert!(Specificity(0, 1, 0) > Specificity(0, 0, 5));
        assert!(Specificity::INLINE > Specificity(100, 0, 0));
    }
}
