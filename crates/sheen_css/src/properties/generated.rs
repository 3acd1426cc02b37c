//! Generated content, automatic numbering and lists

use sheen_shared::fixed::Fixed;
use sheen_shared::intern::Istr;

use crate::errors::{CssError, CssResult};
use crate::properties::bytecode::{Sink, StyleBuilder};
use crate::properties::common::{compile_list, parse_number, Cursor};
use crate::properties::Property;
use crate::tokenizer::TokenKind;
use crate::values::{Content, ContentItem, Counters, Keyword, ListStyleType, Quotes};

/// Reads a counter name
fn counter_name(c: &mut Cursor<'_>) -> CssResult<Istr> {
    let token = c.token()?;
    if token.kind != TokenKind::Ident || token.is_ident("none") || token.is_ident("inherit") {
        return Err(CssError::Invalid);
    }
    Ok(token.text.clone())
}

/// The optional list style of `counter()` and `counters()`, up to and including the `)`
fn counter_style(c: &mut Cursor<'_>) -> CssResult<ListStyleType> {
    let style = if c.eat_char(',') {
        c.keyword::<ListStyleType>().ok_or(CssError::Invalid)?
    } else {
        ListStyleType::Decimal
    };
    c.expect_char(')')?;
    Ok(style)
}

fn item_word(item: ContentItem, style: ListStyleType) -> u32 {
    u32::from(item.code()) | (u32::from(style.code()) << 8)
}

fn content_items(c: &mut Cursor<'_>, property: Property, sink: &mut dyn Sink) -> CssResult<()> {
    sink.opv(property, Content::Set.code())?;

    let mut items = 0;
    while !c.at_end() {
        let token = c.token()?;
        match token.kind {
            TokenKind::String => {
                sink.word(u32::from(ContentItem::String.code()))?;
                sink.string(token.text.clone())?;
            }
            TokenKind::Uri => {
                sink.word(u32::from(ContentItem::Uri.code()))?;
                sink.string(token.text.clone())?;
            }
            TokenKind::Ident => {
                let quote = match ContentItem::from_ident(&token.text) {
                    Some(quote) => quote,
                    None => return Err(CssError::Invalid),
                };
                sink.word(u32::from(quote.code()))?;
            }
            TokenKind::Function if token.text.eq_ignore_ascii_case("attr") => {
                let name = c.token()?;
                if name.kind != TokenKind::Ident {
                    return Err(CssError::Invalid);
                }
                c.expect_char(')')?;
                sink.word(u32::from(ContentItem::Attr.code()))?;
                sink.string(name.text.clone())?;
            }
            TokenKind::Function if token.text.eq_ignore_ascii_case("counter") => {
                let name = counter_name(c)?;
                let style = counter_style(c)?;
                sink.word(item_word(ContentItem::Counter, style))?;
                sink.string(name)?;
            }
            TokenKind::Function if token.text.eq_ignore_ascii_case("counters") => {
                let name = counter_name(c)?;
                c.expect_char(',')?;
                let separator = c.token()?;
                if separator.kind != TokenKind::String {
                    return Err(CssError::Invalid);
                }
                let style = counter_style(c)?;
                sink.word(item_word(ContentItem::Counters, style))?;
                sink.string(name)?;
                sink.string(separator.text.clone())?;
            }
            _ => return Err(CssError::Invalid),
        }
        items += 1;
    }

    if items == 0 {
        return Err(CssError::Invalid);
    }
    sink.word(0)
}

/// `normal | none | [ <string> | <uri> | <counter> | attr(<identifier>) | open-quote |
/// close-quote | no-open-quote | no-close-quote ]+`
pub fn content(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    if let Some(keyword) = c.keyword::<Content>() {
        c.expect_end()?;
        return b.opv(property, keyword.code());
    }
    compile_list(c, b, |c, sink| content_items(c, property, sink))
}

fn counter_pairs(c: &mut Cursor<'_>, property: Property, sink: &mut dyn Sink) -> CssResult<()> {
    let default = if property == Property::CounterIncrement {
        Fixed::ONE
    } else {
        Fixed::ZERO
    };

    sink.opv(property, Counters::Set.code())?;
    let mut first = true;
    while !c.at_end() {
        if !first {
            sink.word(u32::from(Counters::Set.code()))?;
        }
        first = false;

        let name = counter_name(c)?;
        let value = if c.peek().is_some_and(|t| t.kind == TokenKind::Number) {
            parse_number(c, true)?
        } else {
            default
        };
        sink.string(name)?;
        sink.fixed(value)?;
    }

    if first {
        return Err(CssError::Invalid);
    }
    sink.word(0)
}

/// counter-increment and counter-reset: `none | [ <identifier> <integer>? ]+`
pub fn counter(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    if c.eat_ident("none") {
        return b.opv(property, Counters::None.code());
    }
    compile_list(c, b, |c, sink| counter_pairs(c, property, sink))
}

fn quote_pairs(c: &mut Cursor<'_>, property: Property, sink: &mut dyn Sink) -> CssResult<()> {
    sink.opv(property, Quotes::Set.code())?;
    let mut first = true;
    while !c.at_end() {
        if !first {
            sink.word(u32::from(Quotes::Set.code()))?;
        }
        first = false;

        for _ in 0..2 {
            let quote = c.token()?;
            if quote.kind != TokenKind::String {
                return Err(CssError::Invalid);
            }
            sink.string(quote.text.clone())?;
        }
    }

    if first {
        return Err(CssError::Invalid);
    }
    sink.word(0)
}

/// `none | [ <string> <string> ]+`
pub fn quotes(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    if c.eat_ident("none") {
        return b.opv(property, Quotes::None.code());
    }
    compile_list(c, b, |c, sink| quote_pairs(c, property, sink))
}

#[cfg(test)]
mod tests {
    use crate::properties::tests::{compiled, compiled_style, header};
    use crate::properties::Property;
    use crate::values::*;
    use test_case::test_case;

    #[test]
    fn content_items() {
        let style = compiled_style("content", "\"Chapter \" counter(chapter, upper-roman) \". \" open-quote").unwrap();
        assert_eq!(
            style.bytecode(),
            &[
                header(Property::Content, Content::Set.code()),
                u32::from(ContentItem::String.code()),
                0,
                u32::from(ContentItem::Counter.code()) | (u32::from(ListStyleType::UpperRoman.code()) << 8),
                1,
                u32::from(ContentItem::String.code()),
                2,
                u32::from(ContentItem::OpenQuote.code()),
                0,
            ]
        );
        let strings: Vec<&str> = style.strings().iter().map(|s| s.as_str()).collect();
        assert_eq!(strings, ["Chapter ", "chapter", ". "]);
    }

    #[test]
    fn counters_function_and_attr() {
        let style = compiled_style("content", "counters(item, \".\") attr(title)").unwrap();
        assert_eq!(
            style.bytecode(),
            &[
                header(Property::Content, Content::Set.code()),
                u32::from(ContentItem::Counters.code()) | (u32::from(ListStyleType::Decimal.code()) << 8),
                0,
                1,
                u32::from(ContentItem::Attr.code()),
                2,
                0,
            ]
        );
    }

    #[test_case("normal", Content::Normal)]
    #[test_case("none", Content::None)]
    fn content_keywords(value: &str, expected: Content) {
        assert_eq!(compiled("content", value), Ok(vec![header(Property::Content, expected.code())]));
    }

    #[test_case("normal \"x\""; "keyword with items")]
    #[test_case("counter(none)"; "reserved counter name")]
    #[test_case("counter(a, fancy)"; "unknown counter style")]
    #[test_case("counters(a)"; "missing separator")]
    #[test_case("12px"; "dimension")]
    fn invalid_content(value: &str) {
        assert!(compiled("content", value).is_err());
    }

    #[test]
    fn counter_defaults() {
        let increment = compiled_style("counter-increment", "a b 2").unwrap();
        assert_eq!(
            increment.bytecode(),
            &[
                header(Property::CounterIncrement, Counters::Set.code()),
                0,
                1 << 10,
                u32::from(Counters::Set.code()),
                1,
                2 << 10,
                0,
            ]
        );

        let reset = compiled_style("counter-reset", "a").unwrap();
        assert_eq!(reset.bytecode(), &[header(Property::CounterReset, Counters::Set.code()), 0, 0, 0]);
    }

    #[test]
    fn quote_pairs() {
        let style = compiled_style("quotes", "'\"' '\"' \"'\" \"'\"").unwrap();
        assert_eq!(
            style.bytecode(),
            &[header(Property::Quotes, Quotes::Set.code()), 0, 0, u32::from(Quotes::Set.code()), 1, 1, 0]
        );
        assert!(compiled("quotes", "'a'").is_err());
        assert_eq!(compiled("quotes", "none"), Ok(vec![header(Property::Quotes, Quotes::None.code())]));
    }
}
