//! Computed style records
//!
//! A [`ComputedStyle`] keeps the value tag and units of every stored property packed into a few
//! words (see [`crate::layout`]), with the magnitudes and colours in a separate run of value words.
//! Rarely set properties live in an [`Uncommon`] block that is only allocated when one of them gets
//! a value other than its initial one. List values and uris are kept next to the packed words.
//!
//! A tag of 0 is the `inherit` state. Styles fresh out of the cascade may hold it until they are
//! composed with their parent.

use sheen_css::properties::Property;
use sheen_css::values::{
    position_axes, BackgroundAttachment, BackgroundRepeat, BorderCollapse, BorderSpacing, BorderStyle,
    BorderWidth, CaptionSide, Clear, Clip, ColorValue, Content, Counters, Cursor, Dimension, Direction,
    Display, EmptyCells, Float, FontFamily, FontSize, FontStyle, FontVariant, FontWeight, Integer, Keyword,
    Length, LineHeight, ListStylePosition, ListStyleType, MaxSize, Offset, Overflow, PageBreak,
    PageBreakInside, Position, PositionAxis, Quotes, Size, Spacing, TableLayout, TextAlign, TextTransform,
    UnicodeBidi, Unit, UriValue, VerticalAlign, Visibility, WhiteSpace, ZIndex, CLIP_EDGE_AUTO,
};
use sheen_shared::fixed::Fixed;
use sheen_shared::intern::Istr;

use crate::errors::CascadeResult;
use crate::initial;
use crate::layout::{slot, Block, Slot, COMMON_VALUES, COMMON_WORDS, UNCOMMON_VALUES, UNCOMMON_WORDS, UNIT_BITS};

/// An entry of a font-family list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontFamilyItem {
    Generic(FontFamily),
    Named(Istr),
}

/// A counter-increment or counter-reset entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterEntry {
    pub name: Istr,
    pub value: i32,
}

/// An item of the content property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValue {
    String(Istr),
    Uri(Istr),
    Attr(Istr),
    Counter { name: Istr, style: ListStyleType },
    Counters { name: Istr, separator: Istr, style: ListStyleType },
    OpenQuote,
    CloseQuote,
    NoOpenQuote,
    NoCloseQuote,
}

/// Edges of a clip rectangle. `None` is `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipRect {
    pub top: Option<Dimension>,
    pub right: Option<Dimension>,
    pub bottom: Option<Dimension>,
    pub left: Option<Dimension>,
}

/// The unpacked state of a property: its tag with up to four units and value words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Raw {
    pub tag: u16,
    pub units: [Unit; 4],
    pub values: [u32; 4],
}

impl Raw {
    pub fn tag(tag: u16) -> Self {
        Self {
            tag,
            ..Default::default()
        }
    }

    pub fn dimension(tag: u16, dimension: Dimension) -> Self {
        let mut raw = Self::tag(tag);
        raw.set_dimension(0, dimension);
        raw
    }

    pub fn word(tag: u16, word: u32) -> Self {
        let mut raw = Self::tag(tag);
        raw.values[0] = word;
        raw
    }

    pub fn set_dimension(&mut self, index: usize, dimension: Dimension) {
        self.units[index] = dimension.unit;
        self.values[index] = dimension.value.raw() as u32;
    }

    pub fn get_dimension(&self, index: usize) -> Dimension {
        Dimension::new(self.fixed(index), self.units[index])
    }

    pub fn fixed(&self, index: usize) -> Fixed {
        Fixed::from_raw(self.values[index] as i32)
    }
}

/// List values of a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum List {
    Uri(Option<Istr>),
    FontFamily(Box<[FontFamilyItem]>),
    Quotes(Box<[(Istr, Istr)]>),
    Counters(Box<[CounterEntry]>),
    Cursor(Box<[Istr]>),
    Content(Box<[ContentValue]>),
}

/// Copies a list into an exactly sized allocation
pub(crate) fn try_boxed<T: Clone>(items: &[T]) -> CascadeResult<Box<[T]>> {
    let mut list = Vec::new();
    list.try_reserve_exact(items.len())?;
    list.extend_from_slice(items);
    Ok(list.into_boxed_slice())
}

/// Properties that are rarely set on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uncommon {
    bits: [u32; UNCOMMON_WORDS],
    values: [u32; UNCOMMON_VALUES],
    counter_increment: Box<[CounterEntry]>,
    counter_reset: Box<[CounterEntry]>,
    cursor: Box<[Istr]>,
    content: Box<[ContentValue]>,
}

impl Uncommon {
    /// An uncommon block with every property at its initial value
    fn initial() -> Self {
        let mut uncommon = Self {
            bits: [0; UNCOMMON_WORDS],
            values: [0; UNCOMMON_VALUES],
            counter_increment: Box::default(),
            counter_reset: Box::default(),
            cursor: Box::default(),
            content: Box::default(),
        };
        for property in Property::ALL {
            if let Some(slot) = slot(property).filter(|s| s.block == Block::Uncommon) {
                write_raw(&mut uncommon.bits, &mut uncommon.values, slot, &initial::raw(property));
            }
        }
        uncommon
    }
}

/// The computed style of one element
#[derive(Debug, Clone)]
pub struct ComputedStyle {
    bits: [u32; COMMON_WORDS],
    values: [u32; COMMON_VALUES],
    background_image: Option<Istr>,
    list_style_image: Option<Istr>,
    font_family: Box<[FontFamilyItem]>,
    quotes: Box<[(Istr, Istr)]>,
    uncommon: Option<Box<Uncommon>>,
}

/// An absent uncommon block equals one that holds initial values
impl PartialEq for ComputedStyle {
    fn eq(&self, other: &Self) -> bool {
        let uncommon = match (&self.uncommon, &other.uncommon) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            (Some(u), None) | (None, Some(u)) => **u == Uncommon::initial(),
        };
        uncommon
            && self.bits == other.bits
            && self.values == other.values
            && self.background_image == other.background_image
            && self.list_style_image == other.list_style_image
            && self.font_family == other.font_family
            && self.quotes == other.quotes
    }
}

impl Eq for ComputedStyle {}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::new()
    }
}

fn read_raw(bits: &[u32], values: &[u32], slot: Slot) -> Raw {
    let field = (bits[usize::from(slot.word)] & slot.mask()) >> slot.shift;

    let mut raw = Raw::tag((field & ((1 << slot.tag_bits) - 1)) as u16);
    for i in 0..usize::from(slot.units) {
        let code = (field >> (usize::from(slot.tag_bits) + i * usize::from(UNIT_BITS))) & 0xf;
        raw.units[i] = Unit::from_code(code).unwrap_or_default();
    }
    let start = usize::from(slot.value);
    let count = usize::from(slot.values);
    raw.values[..count].copy_from_slice(&values[start..start + count]);
    raw
}

fn write_raw(bits: &mut [u32], values: &mut [u32], slot: Slot, raw: &Raw) {
    let mut field = u32::from(raw.tag) & ((1 << slot.tag_bits) - 1);
    for i in 0..usize::from(slot.units) {
        field |= raw.units[i].code() << (usize::from(slot.tag_bits) + i * usize::from(UNIT_BITS));
    }
    let word = &mut bits[usize::from(slot.word)];
    *word = (*word & !slot.mask()) | (field << slot.shift);

    let start = usize::from(slot.value);
    let count = usize::from(slot.values);
    values[start..start + count].copy_from_slice(&raw.values[..count]);
}

macro_rules! keyword_accessors {
    ($($name:ident: $property:ident => $ty:ty;)+) => {
        $(
            pub fn $name(&self) -> $ty {
                self.keyword(Property::$property)
            }
        )+
    };
}

macro_rules! dimension_accessors {
    ($($name:ident: $property:ident => $ty:ident::$set:ident;)+) => {
        $(
            pub fn $name(&self) -> ($ty, Option<Dimension>) {
                self.dimension(Property::$property, $ty::$set)
            }
        )+
    };
}

macro_rules! colour_accessors {
    ($($name:ident: $property:ident;)+) => {
        $(
            /// The colour as `0xAARRGGBB` when it is set explicitly
            pub fn $name(&self) -> (ColorValue, Option<u32>) {
                let raw = self.raw(Property::$property);
                let tag = ColorValue::from_code(raw.tag).unwrap_or(ColorValue::INHERIT);
                (tag, (tag == ColorValue::Set).then_some(raw.values[0]))
            }
        )+
    };
}

impl ComputedStyle {
    /// A style without values: common properties are in the `inherit` state, uncommon ones read
    /// as their initial values until they are set
    pub fn new() -> Self {
        Self {
            bits: [0; COMMON_WORDS],
            values: [0; COMMON_VALUES],
            background_image: None,
            list_style_image: None,
            font_family: Box::default(),
            quotes: Box::default(),
            uncommon: None,
        }
    }

    /// A style in which every property has its initial value
    pub fn initial() -> CascadeResult<Self> {
        let mut style = Self::new();
        for property in Property::ALL {
            style.set_initial(property)?;
        }
        Ok(style)
    }

    /// Whether the uncommon block has been allocated
    pub fn has_uncommon(&self) -> bool {
        self.uncommon.is_some()
    }

    pub(crate) fn raw(&self, property: Property) -> Raw {
        match slot(property) {
            Some(slot) if slot.block == Block::Common => read_raw(&self.bits, &self.values, slot),
            Some(slot) => match &self.uncommon {
                Some(uncommon) => read_raw(&uncommon.bits, &uncommon.values, slot),
                None => initial::raw(property),
            },
            None => Raw::default(),
        }
    }

    /// Stores the tag and operands of a property. Aural properties are ignored.
    pub(crate) fn set_raw(&mut self, property: Property, raw: &Raw) {
        let Some(slot) = slot(property) else {
            return;
        };
        match slot.block {
            Block::Common => write_raw(&mut self.bits, &mut self.values, slot, raw),
            Block::Uncommon => {
                // A missing uncommon block reads as initial values
                if self.uncommon.is_none() && *raw == initial::raw(property) {
                    return;
                }
                let uncommon = self.uncommon.get_or_insert_with(|| Box::new(Uncommon::initial()));
                write_raw(&mut uncommon.bits, &mut uncommon.values, slot, raw);
            }
        }
    }

    /// A copy of the list value of a property
    pub(crate) fn list(&self, property: Property) -> CascadeResult<Option<List>> {
        let uncommon = self.uncommon.as_deref();
        let list = match property {
            Property::BackgroundImage => List::Uri(self.background_image.clone()),
            Property::ListStyleImage => List::Uri(self.list_style_image.clone()),
            Property::FontFamily => List::FontFamily(try_boxed(&self.font_family)?),
            Property::Quotes => List::Quotes(try_boxed(&self.quotes)?),
            Property::CounterIncrement => {
                List::Counters(try_boxed(uncommon.map_or(&[][..], |u| &u.counter_increment))?)
            }
            Property::CounterReset => List::Counters(try_boxed(uncommon.map_or(&[][..], |u| &u.counter_reset))?),
            Property::Cursor => List::Cursor(try_boxed(uncommon.map_or(&[][..], |u| &u.cursor))?),
            Property::Content => List::Content(try_boxed(uncommon.map_or(&[][..], |u| &u.content))?),
            _ => return Ok(None),
        };
        Ok(Some(list))
    }

    /// Stores the list value of a property. Empty uncommon lists do not allocate the uncommon
    /// block.
    pub(crate) fn set_list(&mut self, property: Property, list: List) {
        match (property, list) {
            (Property::BackgroundImage, List::Uri(uri)) => self.background_image = uri,
            (Property::ListStyleImage, List::Uri(uri)) => self.list_style_image = uri,
            (Property::FontFamily, List::FontFamily(items)) => self.font_family = items,
            (Property::Quotes, List::Quotes(items)) => self.quotes = items,
            (property, list) => {
                let empty = match &list {
                    List::Counters(items) => items.is_empty(),
                    List::Cursor(items) => items.is_empty(),
                    List::Content(items) => items.is_empty(),
                    _ => return,
                };
                if empty && self.uncommon.is_none() {
                    return;
                }
                let uncommon = self.uncommon.get_or_insert_with(|| Box::new(Uncommon::initial()));
                match (property, list) {
                    (Property::CounterIncrement, List::Counters(items)) => uncommon.counter_increment = items,
                    (Property::CounterReset, List::Counters(items)) => uncommon.counter_reset = items,
                    (Property::Cursor, List::Cursor(items)) => uncommon.cursor = items,
                    (Property::Content, List::Content(items)) => uncommon.content = items,
                    _ => {}
                }
            }
        }
    }

    /// Whether the property is in the `inherit` state. Aural properties are never stored and
    /// report false.
    pub fn is_inherit(&self, property: Property) -> bool {
        slot(property).is_some() && self.raw(property).tag == 0
    }

    pub(crate) fn set_initial(&mut self, property: Property) -> CascadeResult<()> {
        self.set_raw(property, &initial::raw(property));
        if let Some(list) = initial::list(property)? {
            self.set_list(property, list);
        }
        Ok(())
    }

    /// Puts a property in the `inherit` state
    pub(crate) fn set_inherit(&mut self, property: Property) {
        self.set_raw(property, &Raw::default());
        if let Some(list) = empty_list(property) {
            self.set_list(property, list);
        }
    }

    /// Copies the value of a property from another style
    pub(crate) fn copy_from(&mut self, from: &ComputedStyle, property: Property) -> CascadeResult<()> {
        self.set_raw(property, &from.raw(property));
        if let Some(list) = from.list(property)? {
            self.set_list(property, list);
        }
        Ok(())
    }

    fn keyword<K: Keyword>(&self, property: Property) -> K {
        K::from_code(self.raw(property).tag).unwrap_or(K::INHERIT)
    }

    fn dimension<K: Keyword + PartialEq>(&self, property: Property, set: K) -> (K, Option<Dimension>) {
        let raw = self.raw(property);
        let tag = K::from_code(raw.tag).unwrap_or(K::INHERIT);
        (tag, (tag == set).then(|| raw.get_dimension(0)))
    }

    fn uri<'a>(&self, property: Property, uri: Option<&'a Istr>) -> (UriValue, Option<&'a Istr>) {
        let tag = self.keyword::<UriValue>(property);
        (tag, uri.filter(|_| tag == UriValue::Uri))
    }

    fn integer<K: Keyword + PartialEq>(&self, property: Property, set: K) -> (K, Option<i32>) {
        let raw = self.raw(property);
        let tag = K::from_code(raw.tag).unwrap_or(K::INHERIT);
        (tag, (tag == set).then(|| raw.fixed(0).to_int()))
    }

    keyword_accessors! {
        background_attachment: BackgroundAttachment => BackgroundAttachment;
        background_repeat: BackgroundRepeat => BackgroundRepeat;
        border_collapse: BorderCollapse => BorderCollapse;
        border_top_style: BorderTopStyle => BorderStyle;
        border_right_style: BorderRightStyle => BorderStyle;
        border_bottom_style: BorderBottomStyle => BorderStyle;
        border_left_style: BorderLeftStyle => BorderStyle;
        caption_side: CaptionSide => CaptionSide;
        clear: Clear => Clear;
        direction: Direction => Direction;
        display: Display => Display;
        empty_cells: EmptyCells => EmptyCells;
        float: Float => Float;
        font_style: FontStyle => FontStyle;
        font_variant: FontVariant => FontVariant;
        font_weight: FontWeight => FontWeight;
        list_style_position: ListStylePosition => ListStylePosition;
        list_style_type: ListStyleType => ListStyleType;
        outline_style: OutlineStyle => BorderStyle;
        overflow: Overflow => Overflow;
        page_break_after: PageBreakAfter => PageBreak;
        page_break_before: PageBreakBefore => PageBreak;
        page_break_inside: PageBreakInside => PageBreakInside;
        position: Position => Position;
        table_layout: TableLayout => TableLayout;
        text_align: TextAlign => TextAlign;
        text_transform: TextTransform => TextTransform;
        unicode_bidi: UnicodeBidi => UnicodeBidi;
        visibility: Visibility => Visibility;
        white_space: WhiteSpace => WhiteSpace;
    }

    dimension_accessors! {
        top: Top => Offset::Set;
        right: Right => Offset::Set;
        bottom: Bottom => Offset::Set;
        left: Left => Offset::Set;
        margin_top: MarginTop => Offset::Set;
        margin_right: MarginRight => Offset::Set;
        margin_bottom: MarginBottom => Offset::Set;
        margin_left: MarginLeft => Offset::Set;
        padding_top: PaddingTop => Length::Set;
        padding_right: PaddingRight => Length::Set;
        padding_bottom: PaddingBottom => Length::Set;
        padding_left: PaddingLeft => Length::Set;
        border_top_width: BorderTopWidth => BorderWidth::Width;
        border_right_width: BorderRightWidth => BorderWidth::Width;
        border_bottom_width: BorderBottomWidth => BorderWidth::Width;
        border_left_width: BorderLeftWidth => BorderWidth::Width;
        outline_width: OutlineWidth => BorderWidth::Width;
        width: Width => Size::Set;
        height: Height => Size::Set;
        min_width: MinWidth => Length::Set;
        min_height: MinHeight => Length::Set;
        max_width: MaxWidth => MaxSize::Set;
        max_height: MaxHeight => MaxSize::Set;
        font_size: FontSize => FontSize::Dimension;
        letter_spacing: LetterSpacing => Spacing::Set;
        word_spacing: WordSpacing => Spacing::Set;
        text_indent: TextIndent => Length::Set;
        vertical_align: VerticalAlign => VerticalAlign::Set;
    }

    colour_accessors! {
        color: Color;
        background_color: BackgroundColor;
        border_top_color: BorderTopColor;
        border_right_color: BorderRightColor;
        border_bottom_color: BorderBottomColor;
        border_left_color: BorderLeftColor;
        outline_color: OutlineColor;
    }

    pub fn background_image(&self) -> (UriValue, Option<&Istr>) {
        self.uri(Property::BackgroundImage, self.background_image.as_ref())
    }

    pub fn list_style_image(&self) -> (UriValue, Option<&Istr>) {
        self.uri(Property::ListStyleImage, self.list_style_image.as_ref())
    }

    /// Horizontal and vertical position. Keywords are computed to percentages.
    pub fn background_position(&self) -> [(PositionAxis, Option<Dimension>); 2] {
        let raw = self.raw(Property::BackgroundPosition);
        let (horizontal, vertical) = position_axes(raw.tag);
        let axis = |axis: PositionAxis, index| (axis, (axis == PositionAxis::Set).then(|| raw.get_dimension(index)));
        [axis(horizontal, 0), axis(vertical, 1)]
    }

    /// Horizontal and vertical spacing
    pub fn border_spacing(&self) -> (BorderSpacing, Option<[Dimension; 2]>) {
        let raw = self.raw(Property::BorderSpacing);
        let tag = BorderSpacing::from_code(raw.tag).unwrap_or(BorderSpacing::Inherit);
        let spacing = (tag == BorderSpacing::Set).then(|| [raw.get_dimension(0), raw.get_dimension(1)]);
        (tag, spacing)
    }

    pub fn clip(&self) -> (Clip, Option<ClipRect>) {
        let raw = self.raw(Property::Clip);
        let tag = Clip::from_code(raw.tag & 0x3).unwrap_or(Clip::Inherit);
        if tag != Clip::Rect {
            return (tag, None);
        }
        let edge = |index: usize| (raw.tag & CLIP_EDGE_AUTO[index] == 0).then(|| raw.get_dimension(index));
        let rect = ClipRect {
            top: edge(0),
            right: edge(1),
            bottom: edge(2),
            left: edge(3),
        };
        (tag, Some(rect))
    }

    /// `line-height`: a number is returned without unit
    pub fn line_height(&self) -> (LineHeight, Option<Fixed>, Option<Unit>) {
        let raw = self.raw(Property::LineHeight);
        let tag = LineHeight::from_code(raw.tag).unwrap_or(LineHeight::Inherit);
        match tag {
            LineHeight::Number => (tag, Some(raw.fixed(0)), None),
            LineHeight::Dimension => (tag, Some(raw.fixed(0)), Some(raw.units[0])),
            _ => (tag, None, None),
        }
    }

    pub fn z_index(&self) -> (ZIndex, Option<i32>) {
        self.integer(Property::ZIndex, ZIndex::Set)
    }

    pub fn orphans(&self) -> (Integer, Option<i32>) {
        self.integer(Property::Orphans, Integer::Set)
    }

    pub fn widows(&self) -> (Integer, Option<i32>) {
        self.integer(Property::Widows, Integer::Set)
    }

    /// The set of `TEXT_DECORATION_*` lines, 0 when inherited
    pub fn text_decoration(&self) -> u16 {
        self.raw(Property::TextDecoration).tag
    }

    /// Font family list, empty when inherited
    pub fn font_family(&self) -> &[FontFamilyItem] {
        &self.font_family
    }

    /// Open and close quote pairs
    pub fn quotes(&self) -> (Quotes, &[(Istr, Istr)]) {
        (self.keyword(Property::Quotes), &self.quotes)
    }

    pub fn counter_increment(&self) -> (Counters, &[CounterEntry]) {
        let items = self.uncommon.as_deref().map_or(&[][..], |u| &u.counter_increment);
        (self.keyword(Property::CounterIncrement), items)
    }

    pub fn counter_reset(&self) -> (Counters, &[CounterEntry]) {
        let items = self.uncommon.as_deref().map_or(&[][..], |u| &u.counter_reset);
        (self.keyword(Property::CounterReset), items)
    }

    /// The uris to try, in order, and the keyword to fall back to
    pub fn cursor(&self) -> (Cursor, &[Istr]) {
        let items = self.uncommon.as_deref().map_or(&[][..], |u| &u.cursor);
        (self.keyword(Property::Cursor), items)
    }

    pub fn content(&self) -> (Content, &[ContentValue]) {
        let items = self.uncommon.as_deref().map_or(&[][..], |u| &u.content);
        (self.keyword(Property::Content), items)
    }
}

/// The empty list value of a property that has one
fn empty_list(property: Property) -> Option<List> {
    let list = match property {
        Property::BackgroundImage | Property::ListStyleImage => List::Uri(None),
        Property::FontFamily => List::FontFamily(Box::default()),
        Property::Quotes => List::Quotes(Box::default()),
        Property::CounterIncrement | Property::CounterReset => List::Counters(Box::default()),
        Property::Cursor => List::Cursor(Box::default()),
        Property::Content => List::Content(Box::default()),
        _ => return None,
    };
    Some(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheen_css::values::TEXT_DECORATION_NONE;
    use sheen_shared::intern::Interner;

    #[test]
    fn new_styles_inherit_everything() {
        let style = ComputedStyle::new();
        assert_eq!(style.display(), Display::Inherit);
        assert_eq!(style.width(), (Size::Inherit, None));
        assert!(style.is_inherit(Property::Color));
        assert!(!style.is_inherit(Property::Azimuth));
    }

    #[test]
    fn raw_values_round_trip() {
        let mut style = ComputedStyle::new();
        let width = Dimension::new(Fixed::from_int(-12), Unit::Em);
        style.set_raw(Property::Width, &Raw::dimension(Size::Set.code(), width));
        style.set_raw(Property::Display, &Raw::tag(Display::TableCell.code()));
        style.set_raw(Property::Color, &Raw::word(ColorValue::Set.code(), 0xff11_2233));

        assert_eq!(style.width(), (Size::Set, Some(width)));
        assert_eq!(style.display(), Display::TableCell);
        assert_eq!(style.color(), (ColorValue::Set, Some(0xff11_2233)));
        // Neighbouring fields are untouched
        assert_eq!(style.height(), (Size::Inherit, None));
        assert_eq!(style.float(), Float::Inherit);
    }

    #[test]
    fn initial_values() {
        let style = ComputedStyle::initial().unwrap();
        assert_eq!(style.display(), Display::Inline);
        assert_eq!(style.margin_top(), (Offset::Set, Some(Dimension::ZERO)));
        assert_eq!(style.width(), (Size::Auto, None));
        assert_eq!(style.border_top_width(), (BorderWidth::Medium, None));
        assert_eq!(style.color(), (ColorValue::Set, Some(0xff00_0000)));
        assert_eq!(style.font_family(), &[FontFamilyItem::Generic(FontFamily::SansSerif)]);
        assert_eq!(style.text_decoration(), TEXT_DECORATION_NONE);
        assert_eq!(style.orphans(), (Integer::Set, Some(2)));
        assert_eq!(style.line_height(), (LineHeight::Normal, None, None));
        assert_eq!(style.clip(), (Clip::Auto, None));
        assert_eq!(style.cursor(), (Cursor::Auto, &[][..]));
        assert!(!style.has_uncommon());
    }

    #[test]
    fn uncommon_block_is_allocated_on_demand() {
        let mut style = ComputedStyle::initial().unwrap();
        style.set_raw(Property::LetterSpacing, &Raw::tag(Spacing::Normal.code()));
        assert!(!style.has_uncommon());

        let spacing = Dimension::px(2);
        style.set_raw(Property::LetterSpacing, &Raw::dimension(Spacing::Set.code(), spacing));
        assert!(style.has_uncommon());
        assert_eq!(style.letter_spacing(), (Spacing::Set, Some(spacing)));
        // Other uncommon properties keep their initial values
        assert_eq!(style.word_spacing(), (Spacing::Normal, None));
        assert_eq!(style.outline_color(), (ColorValue::Invert, None));
    }

    #[test]
    fn clip_edges() {
        let mut style = ComputedStyle::new();
        let mut raw = Raw::tag(Clip::Rect.code() | CLIP_EDGE_AUTO[1]);
        raw.set_dimension(0, Dimension::px(1));
        raw.set_dimension(2, Dimension::px(3));
        raw.set_dimension(3, Dimension::new(Fixed::from_int(4), Unit::Mm));
        style.set_raw(Property::Clip, &raw);

        let rect = ClipRect {
            top: Some(Dimension::px(1)),
            right: None,
            bottom: Some(Dimension::px(3)),
            left: Some(Dimension::new(Fixed::from_int(4), Unit::Mm)),
        };
        assert_eq!(style.clip(), (Clip::Rect, Some(rect)));
    }

    #[test]
    fn copying_lists() {
        let interner = Interner::new();
        let mut parent = ComputedStyle::initial().unwrap();
        let family: Box<[FontFamilyItem]> = Box::new([
            FontFamilyItem::Named(interner.intern("Gill Sans")),
            FontFamilyItem::Generic(FontFamily::Serif),
        ]);
        parent.set_raw(Property::FontFamily, &Raw::tag(FontFamily::String.code()));
        parent.set_list(Property::FontFamily, List::FontFamily(family.clone()));

        let mut child = ComputedStyle::new();
        child.copy_from(&parent, Property::FontFamily).unwrap();
        assert_eq!(child.font_family(), &family[..]);
        assert_eq!(parent.font_family(), &family[..]);
    }
}
