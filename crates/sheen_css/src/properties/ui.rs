//! User interface properties: cursor and outlines

use crate::errors::{CssError, CssResult};
use crate::properties::bytecode::{Sink, StyleBuilder};
use crate::properties::common::{compile_list, parse_colour, Cursor, Declared};
use crate::properties::Property;
use crate::tokenizer::TokenKind;
use crate::values::{BorderStyle, Cursor as CursorKeyword, Keyword};

fn cursor_items(c: &mut Cursor<'_>, property: Property, sink: &mut dyn Sink) -> CssResult<()> {
    let mut first = true;
    let mut item = |sink: &mut dyn Sink, code: u16| {
        if std::mem::take(&mut first) {
            sink.opv(property, code)
        } else {
            sink.word(u32::from(code))
        }
    };

    while c.peek().is_some_and(|t| t.kind == TokenKind::Uri) {
        let uri = c.token()?;
        item(sink, CursorKeyword::Uri.code())?;
        sink.string(uri.text.clone())?;
        c.expect_char(',')?;
    }

    let keyword = c.keyword::<CursorKeyword>().ok_or(CssError::Invalid)?;
    item(sink, keyword.code())
}

/// `[ <uri> , ]* <keyword>`. Every uri item is followed by its string; the list ends with the
/// keyword.
pub fn cursor(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    compile_list(c, b, |c, sink| cursor_items(c, property, sink))
}

/// outline-color accepts `invert`, but not `transparent`
pub fn parse_outline_color(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let colour = parse_colour(c)?;
    if colour.tag == crate::values::ColorValue::Transparent.code() {
        return Err(CssError::Invalid);
    }
    Ok(colour)
}

/// outline-style: the border styles except `hidden`
pub fn parse_outline_style(c: &mut Cursor<'_>) -> CssResult<Declared> {
    match c.keyword::<BorderStyle>() {
        Some(BorderStyle::Hidden) | None => Err(CssError::Invalid),
        Some(style) => Ok(Declared::keyword(style)),
    }
}
