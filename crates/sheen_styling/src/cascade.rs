//! The cascade
//!
//! A [`Cascade`] is fed the compiled declarations of every rule that matches an element, each with
//! the [`Rank`] of its rule. The rules may come in any order: for every instruction the cascade
//! asks [`Cascade::outranks`] whether it beats what has been applied to the property so far, and
//! only then writes the value. Operands are read in either case, so the next instruction is always
//! found.
//!
//! [`Cascade::finish`] fills in the properties no rule touched and [`compose`] resolves `inherit`
//! against the parent element.

use std::borrow::Borrow;

use sheen_css::properties::bytecode::{Opv, Reader, Style};
use sheen_css::properties::{operand_words, Property, PROPERTY_COUNT};
use sheen_css::selector::Specificity;
use sheen_css::stylesheet::Origin;
use sheen_css::values::{
    position_axes, position_tag, BorderSpacing, Clip, Content, ContentItem, Counters, Cursor, Dimension,
    FontFamily, Keyword, ListStyleType, PositionAxis, Quotes, Unit, UriValue, CLIP_EDGE_AUTO,
};
use sheen_shared::fixed::Fixed;
use sheen_shared::intern::Istr;

use crate::computed::{ComputedStyle, ContentValue, CounterEntry, FontFamilyItem, List, Raw};
use crate::errors::{CascadeError, CascadeResult};
use crate::layout::slot;

const BAD: CascadeError = CascadeError::InvalidBytecode;

/// Where a rule comes from and how specific its selector is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub origin: Origin,
    pub specificity: Specificity,
}

impl Rank {
    pub fn new(origin: Origin, specificity: Specificity) -> Self {
        Self { origin, specificity }
    }

    /// Declarations of a `style` attribute
    pub fn inline() -> Self {
        Self::new(Origin::Author, Specificity::INLINE)
    }
}

/// Priority of a declaration by origin and importance, as defined in
/// <https://www.w3.org/TR/CSS2/cascade.html#cascading-order>
fn priority(origin: Origin, important: bool) -> u8 {
    match (origin, important) {
        (Origin::UserAgent, false) => 1,
        (Origin::User, false) => 2,
        (Origin::Author, false) => 3,
        (Origin::Author, true) => 5,
        (Origin::User, true) => 6,
        (Origin::UserAgent, true) => 7,
    }
}

/// The declaration that currently holds a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Applied {
    priority: u8,
    specificity: Specificity,
    important: bool,
}

/// Computed style under construction
#[derive(Debug, Clone)]
pub struct Cascade {
    style: ComputedStyle,
    applied: [Option<Applied>; PROPERTY_COUNT],
}

impl Default for Cascade {
    fn default() -> Self {
        Self::new()
    }
}

impl Cascade {
    pub fn new() -> Self {
        Self {
            style: ComputedStyle::new(),
            applied: [None; PROPERTY_COUNT],
        }
    }

    /// Whether a declaration of `property` with the given importance and rank beats the one
    /// applied so far. Ties go to the later declaration.
    pub fn outranks(&self, property: Property, important: bool, rank: &Rank) -> bool {
        match self.applied[property as usize] {
            None => true,
            Some(applied) => {
                (priority(rank.origin, important), rank.specificity) >= (applied.priority, applied.specificity)
            }
        }
    }

    /// Whether the value that won the cascade for `property` was declared `!important`
    pub fn is_important(&self, property: Property) -> bool {
        self.applied[property as usize].is_some_and(|applied| applied.important)
    }

    /// Whether any declaration has been applied to `property`
    pub fn is_applied(&self, property: Property) -> bool {
        self.applied[property as usize].is_some()
    }

    /// The style as cascaded so far
    pub fn style(&self) -> &ComputedStyle {
        &self.style
    }

    /// Applies the instructions of a compiled declaration block.
    ///
    /// On error the style is left in an unspecified state and must be discarded.
    pub fn cascade(&mut self, style: &Style, rank: &Rank) -> CascadeResult<()> {
        let mut reader = style.reader();
        while !reader.at_end() {
            let opv = reader.next_instruction().ok_or(BAD)?;
            let property = opv.property;
            let important = opv.is_important();

            if !self.outranks(property, important, rank) {
                reader.skip_operands(opv).ok_or(BAD)?;
                continue;
            }

            if slot(property).is_none() {
                // Aural properties are not stored
                reader.skip_operands(opv).ok_or(BAD)?;
            } else if opv.is_inherit() {
                self.style.set_inherit(property);
            } else {
                let (raw, list) = decode(opv, &mut reader)?;
                self.style.set_raw(property, &raw);
                if let Some(list) = list {
                    self.style.set_list(property, list);
                }
            }

            log::trace!("cascade: {property} applied with priority {}", priority(rank.origin, important));
            self.applied[property as usize] = Some(Applied {
                priority: priority(rank.origin, important),
                specificity: rank.specificity,
                important,
            });
        }
        Ok(())
    }

    /// Gives every property that no declaration touched its parent's value when it is inherited,
    /// and its initial value otherwise. Explicit `inherit` values are left for [`compose`].
    pub fn finish(self, parent: Option<&ComputedStyle>) -> CascadeResult<ComputedStyle> {
        let mut style = self.style;
        for property in Property::ALL {
            if self.applied[property as usize].is_some() || slot(property).is_none() {
                continue;
            }
            match parent {
                Some(parent) if property.is_inherited() => style.copy_from(parent, property)?,
                _ => style.set_initial(property)?,
            }
        }
        Ok(style)
    }
}

/// Resolves every `inherit` state of `child` from `parent`, or to the initial value when there is
/// no parent. The parent is only read.
pub fn compose(parent: Option<&ComputedStyle>, child: &ComputedStyle) -> CascadeResult<ComputedStyle> {
    let mut style = child.clone();
    for property in Property::ALL {
        if !style.is_inherit(property) {
            continue;
        }
        match parent {
            Some(parent) if !parent.is_inherit(property) => style.copy_from(parent, property)?,
            _ => style.set_initial(property)?,
        }
    }
    Ok(style)
}

/// Cascades the declaration blocks of all rules matching an element and composes the result with
/// the parent's computed style
pub fn select_style<S, I>(matches: I, parent: Option<&ComputedStyle>) -> CascadeResult<ComputedStyle>
where
    S: Borrow<Style>,
    I: IntoIterator<Item = (S, Rank)>,
{
    let mut cascade = Cascade::new();
    for (style, rank) in matches {
        cascade.cascade(style.borrow(), &rank)?;
    }
    let style = cascade.finish(parent)?;
    compose(parent, &style)
}

/// Decodes the value of an instruction that is not `inherit`
fn decode(opv: Opv, reader: &mut Reader<'_>) -> CascadeResult<(Raw, Option<List>)> {
    let tag = opv.value;
    let decoded = match opv.property {
        Property::BackgroundImage | Property::ListStyleImage => {
            let uri = if tag == UriValue::Uri.code() {
                Some(string(reader)?)
            } else {
                None
            };
            (Raw::tag(tag), Some(List::Uri(uri)))
        }
        Property::BackgroundPosition => (background_position(tag, reader)?, None),
        Property::BorderSpacing => {
            let mut raw = Raw::tag(tag);
            if tag == BorderSpacing::Set.code() {
                raw.set_dimension(0, dimension(reader)?);
                raw.set_dimension(1, dimension(reader)?);
            }
            (raw, None)
        }
        Property::Clip => {
            let mut raw = Raw::tag(tag);
            if tag & 0x3 == Clip::Rect.code() {
                for (index, auto) in CLIP_EDGE_AUTO.iter().enumerate() {
                    if tag & auto == 0 {
                        raw.set_dimension(index, dimension(reader)?);
                    }
                }
            }
            (raw, None)
        }
        Property::Content => {
            let items = if tag == Content::Set.code() {
                decode_list(reader, content_items)?.0
            } else {
                Box::default()
            };
            (Raw::tag(tag), Some(List::Content(items)))
        }
        Property::CounterIncrement | Property::CounterReset => {
            let items = if tag == Counters::Set.code() {
                decode_list(reader, counter_entries)?.0
            } else {
                Box::default()
            };
            (Raw::tag(tag), Some(List::Counters(items)))
        }
        Property::Quotes => {
            let items = if tag == Quotes::Set.code() {
                decode_list(reader, quote_pairs)?.0
            } else {
                Box::default()
            };
            (Raw::tag(tag), Some(List::Quotes(items)))
        }
        Property::Cursor => {
            let (uris, keyword) = decode_list(reader, |r, push| cursor_items(r, push, tag))?;
            (Raw::tag(keyword), Some(List::Cursor(uris)))
        }
        Property::FontFamily => {
            let (items, ()) = decode_list(reader, |r, push| family_items(r, push, tag))?;
            (Raw::tag(tag), Some(List::FontFamily(items)))
        }
        _ => {
            let raw = match operand_words(opv, reader.remaining()).ok_or(BAD)? {
                0 => Raw::tag(tag),
                1 => Raw::word(tag, reader.word().ok_or(BAD)?),
                2 => Raw::dimension(tag, dimension(reader)?),
                _ => return Err(BAD),
            };
            (raw, None)
        }
    };
    Ok(decoded)
}

fn string(reader: &mut Reader<'_>) -> CascadeResult<Istr> {
    reader.string().cloned().ok_or(BAD)
}

fn dimension(reader: &mut Reader<'_>) -> CascadeResult<Dimension> {
    reader.dimension().ok_or(BAD)
}

fn next_code(reader: &mut Reader<'_>) -> CascadeResult<u16> {
    let word = reader.word().ok_or(BAD)?;
    u16::try_from(word).map_err(|_| BAD)
}

/// Decodes a list into an exactly sized allocation. `parse` runs twice: once to count the items
/// and once to store them.
fn decode_list<'a, T, R>(
    reader: &mut Reader<'a>,
    parse: impl Fn(&mut Reader<'a>, &mut dyn FnMut(T)) -> CascadeResult<R>,
) -> CascadeResult<(Box<[T]>, R)> {
    let mut count = 0usize;
    parse(&mut reader.clone(), &mut |_| count += 1)?;

    let mut items = Vec::new();
    items.try_reserve_exact(count)?;
    let rest = parse(reader, &mut |item| items.push(item))?;
    Ok((items.into_boxed_slice(), rest))
}

/// Keyword positions are computed to percentages
fn background_position(tag: u16, reader: &mut Reader<'_>) -> CascadeResult<Raw> {
    let percent = |value| Dimension::new(Fixed::from_int(value), Unit::Pct);

    let (horizontal, vertical) = position_axes(tag);
    let mut raw = Raw::tag(position_tag(PositionAxis::Set, PositionAxis::Set));
    for (index, axis) in [horizontal, vertical].into_iter().enumerate() {
        let position = match axis {
            PositionAxis::Start => percent(0),
            PositionAxis::Center => percent(50),
            PositionAxis::End => percent(100),
            PositionAxis::Set => dimension(reader)?,
            PositionAxis::Inherit => return Err(BAD),
        };
        raw.set_dimension(index, position);
    }
    Ok(raw)
}

fn family_items(reader: &mut Reader<'_>, push: &mut dyn FnMut(FontFamilyItem), first: u16) -> CascadeResult<()> {
    let mut code = first;
    while code != 0 {
        let item = match FontFamily::from_code(code) {
            Some(FontFamily::String | FontFamily::IdentList) => FontFamilyItem::Named(string(reader)?),
            Some(FontFamily::Inherit) | None => return Err(BAD),
            Some(generic) => FontFamilyItem::Generic(generic),
        };
        push(item);
        code = next_code(reader)?;
    }
    Ok(())
}

/// Pushes the uris and returns the closing keyword
fn cursor_items(reader: &mut Reader<'_>, push: &mut dyn FnMut(Istr), first: u16) -> CascadeResult<u16> {
    let mut code = first;
    while code == Cursor::Uri.code() {
        push(string(reader)?);
        code = next_code(reader)?;
    }
    match Cursor::from_code(code) {
        Some(Cursor::Inherit) | None => Err(BAD),
        Some(_) => Ok(code),
    }
}

fn content_items(reader: &mut Reader<'_>, push: &mut dyn FnMut(ContentValue)) -> CascadeResult<()> {
    loop {
        let word = reader.word().ok_or(BAD)?;
        if word == 0 {
            return Ok(());
        }
        let style = || ListStyleType::from_code(((word >> 8) & 0xff) as u16).ok_or(BAD);
        let item = match ContentItem::from_code((word & 0xff) as u16).ok_or(BAD)? {
            ContentItem::String => ContentValue::String(string(reader)?),
            ContentItem::Uri => ContentValue::Uri(string(reader)?),
            ContentItem::Attr => ContentValue::Attr(string(reader)?),
            ContentItem::Counter => ContentValue::Counter {
                name: string(reader)?,
                style: style()?,
            },
            ContentItem::Counters => ContentValue::Counters {
                name: string(reader)?,
                separator: string(reader)?,
                style: style()?,
            },
            ContentItem::OpenQuote => ContentValue::OpenQuote,
            ContentItem::CloseQuote => ContentValue::CloseQuote,
            ContentItem::NoOpenQuote => ContentValue::NoOpenQuote,
            ContentItem::NoCloseQuote => ContentValue::NoCloseQuote,
            ContentItem::Inherit => return Err(BAD),
        };
        push(item);
    }
}

/// Entries of a pair list continue while the separator word is `set`
fn next_pair(reader: &mut Reader<'_>, set: u16) -> CascadeResult<bool> {
    match reader.word().ok_or(BAD)? {
        0 => Ok(false),
        word if word == u32::from(set) => Ok(true),
        _ => Err(BAD),
    }
}

fn counter_entries(reader: &mut Reader<'_>, push: &mut dyn FnMut(CounterEntry)) -> CascadeResult<()> {
    loop {
        let name = string(reader)?;
        let value = reader.fixed().ok_or(BAD)?.to_int();
        push(CounterEntry { name, value });
        if !next_pair(reader, Counters::Set.code())? {
            return Ok(());
        }
    }
}

fn quote_pairs(reader: &mut Reader<'_>, push: &mut dyn FnMut((Istr, Istr))) -> CascadeResult<()> {
    loop {
        let open = string(reader)?;
        let close = string(reader)?;
        push((open, close));
        if !next_pair(reader, Quotes::Set.code())? {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheen_css::parser_config::ParserConfig;
    use sheen_css::stylesheet::{Rule, Stylesheet};
    use sheen_css::values::{ColorValue, Display, LineHeight, Offset, Size, Spacing};
    use test_case::test_case;

    fn inline(css: &str) -> Style {
        Stylesheet::parse_inline(css, ParserConfig::default()).unwrap()
    }

    fn author(a: u32, b: u32, c: u32) -> Rank {
        Rank::new(Origin::Author, Specificity::new(a, b, c))
    }

    fn cascaded(css: &str) -> ComputedStyle {
        select_style([(inline(css), author(0, 0, 1))], None).unwrap()
    }

    const RED: u32 = 0xffff_0000;
    const BLUE: u32 = 0xff00_00ff;
    const GREEN: u32 = 0xff00_8000;

    #[test]
    fn important_declaration_after_invalid_one() {
        let sheet = Stylesheet::parse("a { color: red; bogus: ; color: blue !important; }", ParserConfig::default())
            .unwrap();
        let Some(Rule::Style(rule)) = sheet.rules.first() else {
            unreachable!("expected a ruleset");
        };
        assert_eq!(rule.style.instructions().len(), 2);

        let mut cascade = Cascade::new();
        cascade.cascade(&rule.style, &author(0, 0, 1)).unwrap();
        assert!(cascade.is_important(Property::Color));

        let style = cascade.finish(None).unwrap();
        assert_eq!(style.color(), (ColorValue::Set, Some(BLUE)));
    }

    #[test]
    fn margin_edges() {
        let style = cascaded("margin: 1px 2px");
        assert_eq!(style.margin_top(), (Offset::Set, Some(Dimension::px(1))));
        assert_eq!(style.margin_right(), (Offset::Set, Some(Dimension::px(2))));
        assert_eq!(style.margin_bottom(), (Offset::Set, Some(Dimension::px(1))));
        assert_eq!(style.margin_left(), (Offset::Set, Some(Dimension::px(2))));
    }

    #[test_case(Origin::UserAgent, false, Origin::Author, false, GREEN; "author beats user agent")]
    #[test_case(Origin::User, false, Origin::Author, false, GREEN; "author beats user")]
    #[test_case(Origin::Author, false, Origin::Author, true, GREEN; "important beats normal")]
    #[test_case(Origin::Author, true, Origin::User, true, GREEN; "user important beats author important")]
    #[test_case(Origin::User, true, Origin::Author, true, RED; "author important loses to user important")]
    fn priority_law(low: Origin, low_important: bool, high: Origin, high_important: bool, expected: u32) {
        let declaration = |colour: &str, important: bool| {
            inline(&format!("color: {colour}{}", if important { " !important" } else { "" }))
        };
        let red = declaration("red", low_important);
        let green = declaration("green", high_important);
        let low = Rank::new(low, Specificity::default());
        let high = Rank::new(high, Specificity::default());

        let forward = select_style([(&red, low), (&green, high)], None).unwrap();
        let backward = select_style([(&green, high), (&red, low)], None).unwrap();
        assert_eq!(forward.color(), (ColorValue::Set, Some(expected)));
        assert_eq!(backward.color(), forward.color());
    }

    #[test]
    fn specificity_then_order() {
        let red = inline("color: red");
        let blue = inline("color: blue");

        let style = select_style([(&red, author(0, 1, 0)), (&blue, author(0, 0, 5))], None).unwrap();
        assert_eq!(style.color(), (ColorValue::Set, Some(RED)));

        let style = select_style([(&red, author(0, 1, 0)), (&blue, author(0, 1, 0))], None).unwrap();
        assert_eq!(style.color(), (ColorValue::Set, Some(BLUE)));

        let style = select_style([(&blue, Rank::inline()), (&red, author(1, 0, 0))], None).unwrap();
        assert_eq!(style.color(), (ColorValue::Set, Some(BLUE)));
    }

    #[test]
    fn inheritance_law() {
        let parent = cascaded("color: green; width: 10px; letter-spacing: 3px");
        let child = select_style(std::iter::empty::<(Style, Rank)>(), Some(&parent)).unwrap();

        assert_eq!(child.color(), parent.color());
        assert_eq!(child.letter_spacing(), (Spacing::Set, Some(Dimension::px(3))));
        assert_eq!(child.width(), (Size::Auto, None));
        assert_eq!(parent.width(), (Size::Set, Some(Dimension::px(10))));
    }

    #[test]
    fn explicit_inherit() {
        let parent = cascaded("width: 10px; display: block");
        let child = select_style([(inline("width: inherit; display: inherit"), author(0, 0, 1))], Some(&parent))
            .unwrap();
        assert_eq!(child.width(), (Size::Set, Some(Dimension::px(10))));
        assert_eq!(child.display(), Display::Block);

        // Without a parent, inherit gives the initial value
        let orphan = cascaded("width: inherit");
        assert_eq!(orphan.width(), (Size::Auto, None));
    }

    #[test]
    fn cascading_leaves_inherit_for_compose() {
        let mut cascade = Cascade::new();
        cascade.cascade(&inline("float: inherit"), &author(0, 0, 1)).unwrap();
        let style = cascade.finish(None).unwrap();
        assert!(style.is_inherit(Property::Float));
        assert!(!style.is_inherit(Property::Display));

        let parent = cascaded("float: left");
        let composed = compose(Some(&parent), &style).unwrap();
        assert_eq!(composed.float(), sheen_css::values::Float::Left);
        // The child is not modified
        assert!(style.is_inherit(Property::Float));
    }

    #[test]
    fn aural_properties_are_skipped() {
        let style = cascaded("azimuth: 30deg; voice-family: male, child; color: red; cue: url(a.wav)");
        assert_eq!(style.color(), (ColorValue::Set, Some(RED)));
    }

    #[test]
    fn font_family_list() {
        let style = cascaded("font-family: \"Gill Sans\", Helvetica Neue, serif");
        let names: Vec<String> = style
            .font_family()
            .iter()
            .map(|item| match item {
                FontFamilyItem::Generic(generic) => generic.to_string(),
                FontFamilyItem::Named(name) => name.to_string(),
            })
            .collect();
        assert_eq!(names, ["Gill Sans", "Helvetica Neue", "serif"]);
    }

    #[test]
    fn generated_content() {
        let style = cascaded(
            "content: open-quote counters(item, \".\", lower-roman) attr(title); \
             counter-reset: item 3 other; quotes: '<' '>' '[' ']'",
        );

        let (tag, items) = style.content();
        assert_eq!(tag, Content::Set);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], ContentValue::OpenQuote);
        assert!(matches!(
            &items[1],
            ContentValue::Counters { name, separator, style: ListStyleType::LowerRoman }
                if name.as_str() == "item" && separator.as_str() == "."
        ));
        assert!(matches!(&items[2], ContentValue::Attr(name) if name.as_str() == "title"));

        let (tag, counters) = style.counter_reset();
        assert_eq!(tag, Counters::Set);
        let counters: Vec<(&str, i32)> = counters.iter().map(|c| (c.name.as_str(), c.value)).collect();
        assert_eq!(counters, [("item", 3), ("other", 0)]);

        let (tag, quotes) = style.quotes();
        assert_eq!(tag, Quotes::Set);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].0.as_str(), "[");
    }

    #[test]
    fn cursor_list() {
        let style = cascaded("cursor: url(a.cur), url(b.cur), pointer");
        let (keyword, uris) = style.cursor();
        assert_eq!(keyword, Cursor::Pointer);
        assert_eq!(uris.iter().map(|u| u.as_str()).collect::<Vec<_>>(), ["a.cur", "b.cur"]);
        assert!(style.has_uncommon());
    }

    #[test]
    fn background_position_keywords() {
        let style = cascaded("background-position: right 10px");
        let percent = |value| Dimension::new(Fixed::from_int(value), Unit::Pct);
        assert_eq!(
            style.background_position(),
            [
                (PositionAxis::Set, Some(percent(100))),
                (PositionAxis::Set, Some(Dimension::px(10)))
            ]
        );
    }

    #[test]
    fn clip_and_spacing() {
        let style = cascaded("clip: rect(1px, auto, 3em, 4px); border-spacing: 2px 3px");
        let (tag, rect) = style.clip();
        assert_eq!(tag, Clip::Rect);
        let rect = rect.unwrap();
        assert_eq!(rect.top, Some(Dimension::px(1)));
        assert_eq!(rect.right, None);
        assert_eq!(rect.bottom, Some(Dimension::new(Fixed::from_int(3), Unit::Em)));
        assert_eq!(
            style.border_spacing(),
            (BorderSpacing::Set, Some([Dimension::px(2), Dimension::px(3)]))
        );
    }

    #[test]
    fn numbers_and_images() {
        let style = cascaded("line-height: 1.5; z-index: -2; widows: 4; list-style-image: url(dot.png)");
        assert_eq!(style.line_height(), (LineHeight::Number, Some(Fixed::from_raw(1536)), None));
        assert_eq!(style.z_index().1, Some(-2));
        assert_eq!(style.widows().1, Some(4));
        let (tag, uri) = style.list_style_image();
        assert_eq!(tag, UriValue::Uri);
        assert_eq!(uri.map(|u| u.as_str()), Some("dot.png"));
        assert_eq!(style.background_image(), (UriValue::None, None));
    }

    #[test]
    fn losing_lists_do_not_disturb_decoding() {
        let strong = inline("font-family: serif !important");
        let weak = inline("font-family: a, b, c; color: red");
        let style = select_style([(&strong, author(0, 0, 1)), (&weak, author(0, 0, 1))], None).unwrap();
        assert_eq!(style.font_family(), &[FontFamilyItem::Generic(FontFamily::Serif)]);
        assert_eq!(style.color(), (ColorValue::Set, Some(RED)));
    }
}
