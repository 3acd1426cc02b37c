//! Property value compiler
//!
//! Turns the value tokens of a declaration into bytecode (see [`bytecode`]). Every longhand has an
//! entry in the property table below: its opcode, its name, whether it is inherited and the
//! routine that compiles its values. Shorthands expand into the longhands they set.

pub mod bytecode;
mod common;

mod aural;
mod background;
mod box_model;
mod font;
mod generated;
mod paged;
mod shorthands;
mod text;
mod ui;

use std::collections::HashMap;
use std::fmt;

use cow_utils::CowUtils;
use lazy_static::lazy_static;
use sheen_shared::intern::Interner;

use crate::errors::{CssError, CssResult};
use crate::parser::Token;
use crate::properties::bytecode::{Opv, Style, StyleBuilder};
use crate::properties::common::{keyword, parse_important, Compiler, Cursor};
use crate::values::{self as v, Keyword};

pub use crate::properties::shorthands::Shorthand;

/// Number of longhand properties
pub const PROPERTY_COUNT: usize = 99;

macro_rules! properties {
    ($($variant:ident = $code:literal, $name:literal, $inherited:literal, $compiler:expr;)+) => {
        /// CSS 2.1 longhand properties. The discriminant is the opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum Property {
            $($variant = $code),+
        }

        impl Property {
            /// All longhands, in opcode order
            pub const ALL: [Property; PROPERTY_COUNT] = [$(Property::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Property::$variant => $name),+
                }
            }

            /// Whether the property takes its parent's value when nothing sets it
            pub fn is_inherited(self) -> bool {
                match self {
                    $(Property::$variant => $inherited),+
                }
            }

            pub(crate) fn compiler(self) -> Compiler {
                match self {
                    $(Property::$variant => $compiler),+
                }
            }
        }
    };
}

properties! {
    Azimuth = 0, "azimuth", true, Compiler::Value(aural::parse_azimuth);
    BackgroundAttachment = 1, "background-attachment", false, Compiler::Value(keyword::<v::BackgroundAttachment>);
    BackgroundColor = 2, "background-color", false, Compiler::Value(background::parse_background_color);
    BackgroundImage = 3, "background-image", false, Compiler::Value(background::parse_image);
    BackgroundPosition = 4, "background-position", false, Compiler::Custom(background::background_position);
    BackgroundRepeat = 5, "background-repeat", false, Compiler::Value(keyword::<v::BackgroundRepeat>);
    BorderBottomColor = 6, "border-bottom-color", false, Compiler::Value(box_model::parse_border_color);
    BorderBottomStyle = 7, "border-bottom-style", false, Compiler::Value(keyword::<v::BorderStyle>);
    BorderBottomWidth = 8, "border-bottom-width", false, Compiler::Value(box_model::parse_border_width);
    BorderCollapse = 9, "border-collapse", true, Compiler::Value(keyword::<v::BorderCollapse>);
    BorderLeftColor = 10, "border-left-color", false, Compiler::Value(box_model::parse_border_color);
    BorderLeftStyle = 11, "border-left-style", false, Compiler::Value(keyword::<v::BorderStyle>);
    BorderLeftWidth = 12, "border-left-width", false, Compiler::Value(box_model::parse_border_width);
    BorderRightColor = 13, "border-right-color", false, Compiler::Value(box_model::parse_border_color);
    BorderRightStyle = 14, "border-right-style", false, Compiler::Value(keyword::<v::BorderStyle>);
    BorderRightWidth = 15, "border-right-width", false, Compiler::Value(box_model::parse_border_width);
    BorderSpacing = 16, "border-spacing", true, Compiler::Custom(box_model::border_spacing);
    BorderTopColor = 17, "border-top-color", false, Compiler::Value(box_model::parse_border_color);
    BorderTopStyle = 18, "border-top-style", false, Compiler::Value(keyword::<v::BorderStyle>);
    BorderTopWidth = 19, "border-top-width", false, Compiler::Value(box_model::parse_border_width);
    Bottom = 20, "bottom", false, Compiler::Value(box_model::parse_offset);
    CaptionSide = 21, "caption-side", true, Compiler::Value(keyword::<v::CaptionSide>);
    Clear = 22, "clear", false, Compiler::Value(keyword::<v::Clear>);
    Clip = 23, "clip", false, Compiler::Custom(box_model::clip);
    Color = 24, "color", true, Compiler::Custom(text::color);
    Content = 25, "content", false, Compiler::Custom(generated::content);
    CounterIncrement = 26, "counter-increment", false, Compiler::Custom(generated::counter);
    CounterReset = 27, "counter-reset", false, Compiler::Custom(generated::counter);
    CueAfter = 28, "cue-after", false, Compiler::Value(background::parse_image);
    CueBefore = 29, "cue-before", false, Compiler::Value(background::parse_image);
    Cursor = 30, "cursor", true, Compiler::Custom(ui::cursor);
    Direction = 31, "direction", true, Compiler::Value(keyword::<v::Direction>);
    Display = 32, "display", false, Compiler::Value(keyword::<v::Display>);
    Elevation = 33, "elevation", true, Compiler::Value(aural::parse_elevation);
    EmptyCells = 34, "empty-cells", true, Compiler::Value(keyword::<v::EmptyCells>);
    Float = 35, "float", false, Compiler::Value(keyword::<v::Float>);
    FontFamily = 36, "font-family", true, Compiler::Custom(font::font_family);
    FontSize = 37, "font-size", true, Compiler::Value(font::parse_font_size);
    FontStyle = 38, "font-style", true, Compiler::Value(keyword::<v::FontStyle>);
    FontVariant = 39, "font-variant", true, Compiler::Value(keyword::<v::FontVariant>);
    FontWeight = 40, "font-weight", true, Compiler::Value(font::parse_font_weight);
    Height = 41, "height", false, Compiler::Value(box_model::parse_size);
    Left = 42, "left", false, Compiler::Value(box_model::parse_offset);
    LetterSpacing = 43, "letter-spacing", true, Compiler::Value(text::parse_spacing);
    LineHeight = 44, "line-height", true, Compiler::Value(font::parse_line_height);
    ListStyleImage = 45, "list-style-image", true, Compiler::Value(background::parse_image);
    ListStylePosition = 46, "list-style-position", true, Compiler::Value(keyword::<v::ListStylePosition>);
    ListStyleType = 47, "list-style-type", true, Compiler::Value(keyword::<v::ListStyleType>);
    MarginBottom = 48, "margin-bottom", false, Compiler::Value(box_model::parse_offset);
    MarginLeft = 49, "margin-left", false, Compiler::Value(box_model::parse_offset);
    MarginRight = 50, "margin-right", false, Compiler::Value(box_model::parse_offset);
    MarginTop = 51, "margin-top", false, Compiler::Value(box_model::parse_offset);
    MaxHeight = 52, "max-height", false, Compiler::Value(box_model::parse_max_size);
    MaxWidth = 53, "max-width", false, Compiler::Value(box_model::parse_max_size);
    MinHeight = 54, "min-height", false, Compiler::Value(box_model::parse_min_size);
    MinWidth = 55, "min-width", false, Compiler::Value(box_model::parse_min_size);
    Orphans = 56, "orphans", true, Compiler::Value(paged::parse_integer);
    OutlineColor = 57, "outline-color", false, Compiler::Value(ui::parse_outline_color);
    OutlineStyle = 58, "outline-style", false, Compiler::Value(ui::parse_outline_style);
    OutlineWidth = 59, "outline-width", false, Compiler::Value(box_model::parse_border_width);
    Overflow = 60, "overflow", false, Compiler::Value(keyword::<v::Overflow>);
    PaddingBottom = 61, "padding-bottom", false, Compiler::Value(box_model::parse_min_size);
    PaddingLeft = 62, "padding-left", false, Compiler::Value(box_model::parse_min_size);
    PaddingRight = 63, "padding-right", false, Compiler::Value(box_model::parse_min_size);
    PaddingTop = 64, "padding-top", false, Compiler::Value(box_model::parse_min_size);
    PageBreakAfter = 65, "page-break-after", false, Compiler::Value(keyword::<v::PageBreak>);
    PageBreakBefore = 66, "page-break-before", false, Compiler::Value(keyword::<v::PageBreak>);
    PageBreakInside = 67, "page-break-inside", false, Compiler::Value(keyword::<v::PageBreakInside>);
    PauseAfter = 68, "pause-after", false, Compiler::Value(aural::parse_pause);
    PauseBefore = 69, "pause-before", false, Compiler::Value(aural::parse_pause);
    Pitch = 70, "pitch", true, Compiler::Value(aural::parse_pitch);
    PitchRange = 71, "pitch-range", true, Compiler::Value(aural::parse_percentile);
    PlayDuring = 72, "play-during", false, Compiler::Value(aural::parse_play_during);
    Position = 73, "position", false, Compiler::Value(keyword::<v::Position>);
    Quotes = 74, "quotes", true, Compiler::Custom(generated::quotes);
    Richness = 75, "richness", true, Compiler::Value(aural::parse_percentile);
    Right = 76, "right", false, Compiler::Value(box_model::parse_offset);
    Speak = 77, "speak", true, Compiler::Value(keyword::<v::Speak>);
    SpeakHeader = 78, "speak-header", true, Compiler::Value(keyword::<v::SpeakHeader>);
    SpeakNumeral = 79, "speak-numeral", true, Compiler::Value(keyword::<v::SpeakNumeral>);
    SpeakPunctuation = 80, "speak-punctuation", true, Compiler::Value(keyword::<v::SpeakPunctuation>);
    SpeechRate = 81, "speech-rate", true, Compiler::Value(aural::parse_speech_rate);
    Stress = 82, "stress", true, Compiler::Value(aural::parse_percentile);
    TableLayout = 83, "table-layout", false, Compiler::Value(keyword::<v::TableLayout>);
    TextAlign = 84, "text-align", true, Compiler::Value(keyword::<v::TextAlign>);
    TextDecoration = 85, "text-decoration", false, Compiler::Value(text::parse_text_decoration);
    TextIndent = 86, "text-indent", true, Compiler::Value(text::parse_text_indent);
    TextTransform = 87, "text-transform", true, Compiler::Value(keyword::<v::TextTransform>);
    Top = 88, "top", false, Compiler::Value(box_model::parse_offset);
    UnicodeBidi = 89, "unicode-bidi", false, Compiler::Value(keyword::<v::UnicodeBidi>);
    VerticalAlign = 90, "vertical-align", false, Compiler::Value(text::parse_vertical_align);
    Visibility = 91, "visibility", true, Compiler::Value(keyword::<v::Visibility>);
    VoiceFamily = 92, "voice-family", true, Compiler::Custom(aural::voice_family);
    Volume = 93, "volume", true, Compiler::Value(aural::parse_volume);
    WhiteSpace = 94, "white-space", true, Compiler::Value(keyword::<v::WhiteSpace>);
    Widows = 95, "widows", true, Compiler::Value(paged::parse_integer);
    Width = 96, "width", false, Compiler::Value(box_model::parse_size);
    WordSpacing = 97, "word-spacing", true, Compiler::Value(text::parse_spacing);
    ZIndex = 98, "z-index", false, Compiler::Value(box_model::parse_z_index);
}

lazy_static! {
    static ref PROPERTY_NAMES: HashMap<&'static str, Property> =
        Property::ALL.iter().map(|p| (p.name(), *p)).collect();
}

impl Property {
    pub fn opcode(self) -> u16 {
        self as u16
    }

    pub fn from_opcode(opcode: u16) -> Option<Property> {
        Property::ALL.get(usize::from(opcode)).copied()
    }

    /// Case-insensitive lookup of a longhand name
    pub fn from_name(name: &str) -> Option<Property> {
        PROPERTY_NAMES.get(name.cow_to_ascii_lowercase().as_ref()).copied()
    }

    /// Aural properties are compiled and cascaded, but not stored in a computed style
    pub fn is_aural(self) -> bool {
        matches!(
            self,
            Property::Azimuth
                | Property::CueAfter
                | Property::CueBefore
                | Property::Elevation
                | Property::PauseAfter
                | Property::PauseBefore
                | Property::Pitch
                | Property::PitchRange
                | Property::PlayDuring
                | Property::Richness
                | Property::Speak
                | Property::SpeakHeader
                | Property::SpeakNumeral
                | Property::SpeakPunctuation
                | Property::SpeechRate
                | Property::Stress
                | Property::VoiceFamily
                | Property::Volume
        )
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The property part of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyName {
    Longhand(Property),
    Shorthand(Shorthand),
}

impl PropertyName {
    pub fn lookup(name: &str) -> Option<PropertyName> {
        Property::from_name(name)
            .map(PropertyName::Longhand)
            .or_else(|| Shorthand::from_name(name).map(PropertyName::Shorthand))
    }

    /// The longhands a declaration of this property sets
    pub fn longhands(&self) -> &[Property] {
        match self {
            PropertyName::Longhand(property) => std::slice::from_ref(property),
            PropertyName::Shorthand(shorthand) => shorthand.longhands(),
        }
    }
}

/// State shared by the compilations of one stylesheet
#[derive(Debug, Clone, Default)]
pub struct CompileContext {
    interner: Interner,
    quirks: bool,
    quirks_used: bool,
}

impl CompileContext {
    pub fn new(interner: Interner, quirks: bool) -> Self {
        Self {
            interner,
            quirks,
            quirks_used: false,
        }
    }

    pub fn quirks(&self) -> bool {
        self.quirks
    }

    pub fn set_quirks(&mut self, quirks: bool) {
        self.quirks = quirks;
    }

    /// True once a value was only accepted because of quirks mode
    pub fn quirks_used(&self) -> bool {
        self.quirks_used
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }
}

/// Compiles a single declaration into its own [`Style`]
pub fn compile(ctx: &mut CompileContext, property: &str, tokens: &[Token]) -> CssResult<Style> {
    let mut builder = StyleBuilder::new();
    compile_into(ctx, property, tokens, &mut builder)?;
    Ok(builder.finish())
}

/// Compiles a declaration and appends it to `builder`. The value may end with `!important`.
///
/// On error nothing is appended: unknown properties and invalid values give
/// [`CssError::Invalid`], failed allocations [`CssError::OutOfMemory`].
pub fn compile_into(
    ctx: &mut CompileContext,
    property: &str,
    tokens: &[Token],
    builder: &mut StyleBuilder,
) -> CssResult<()> {
    let name = PropertyName::lookup(property).ok_or(CssError::Invalid)?;
    let (value, important) = parse_important(tokens);

    let checkpoint = builder.checkpoint();
    let quirks_used = ctx.quirks_used;

    builder.set_important(important);
    let result = compile_value(ctx, name, value, builder);
    builder.set_important(false);

    if result.is_err() {
        builder.rollback(checkpoint);
        ctx.quirks_used = quirks_used;
    }
    result
}

fn compile_value(
    ctx: &mut CompileContext,
    name: PropertyName,
    tokens: &[Token],
    builder: &mut StyleBuilder,
) -> CssResult<()> {
    let mut c = Cursor::new(ctx, tokens);
    if c.at_end() {
        return Err(CssError::Invalid);
    }

    if c.is_inherit() {
        for property in name.longhands() {
            builder.inherit(*property)?;
        }
        return Ok(());
    }

    match name {
        PropertyName::Longhand(property) => match property.compiler() {
            Compiler::Value(parse) => parse(&mut c)?.write(property, builder)?,
            Compiler::Custom(handler) => handler(&mut c, property, builder)?,
        },
        PropertyName::Shorthand(shorthand) => shorthand.compile(&mut c, builder)?,
    }
    c.expect_end()
}

/// Number of operand words following the header of an instruction that is not `inherit`.
/// `rest` holds the words after the header. Returns `None` for malformed bytecode.
pub fn operand_words(opv: Opv, rest: &[u32]) -> Option<usize> {
    const DIMENSION: usize = 2;

    let value = opv.value;
    let when = |set: bool, words: usize| if set { words } else { 0 };

    let words = match opv.property {
        Property::Azimuth => when(value & !v::AZIMUTH_BEHIND == v::Azimuth::Angle.code(), DIMENSION),
        Property::BackgroundColor
        | Property::BorderBottomColor
        | Property::BorderLeftColor
        | Property::BorderRightColor
        | Property::BorderTopColor
        | Property::Color
        | Property::OutlineColor => when(value == v::ColorValue::Set.code(), 1),
        Property::BackgroundImage | Property::ListStyleImage | Property::CueAfter | Property::CueBefore => {
            when(value == v::UriValue::Uri.code(), 1)
        }
        Property::BackgroundPosition => {
            let (horizontal, vertical) = v::position_axes(value);
            [horizontal, vertical]
                .into_iter()
                .filter(|axis| *axis == v::PositionAxis::Set)
                .count()
                * DIMENSION
        }
        Property::BorderSpacing => when(value == v::BorderSpacing::Set.code(), 2 * DIMENSION),
        Property::BorderBottomWidth
        | Property::BorderLeftWidth
        | Property::BorderRightWidth
        | Property::BorderTopWidth
        | Property::OutlineWidth => when(value == v::BorderWidth::Width.code(), DIMENSION),
        Property::Bottom
        | Property::Left
        | Property::Right
        | Property::Top
        | Property::MarginBottom
        | Property::MarginLeft
        | Property::MarginRight
        | Property::MarginTop => when(value == v::Offset::Set.code(), DIMENSION),
        Property::Clip => {
            if value & 0x3 == v::Clip::Rect.code() {
                let auto = v::CLIP_EDGE_AUTO.iter().filter(|bit| value & **bit != 0).count();
                (4 - auto) * DIMENSION
            } else {
                0
            }
        }
        Property::Content => {
            if value == v::Content::Set.code() {
                content_words(rest)?
            } else {
                0
            }
        }
        Property::CounterIncrement | Property::CounterReset => {
            when(value == v::Counters::Set.code(), pair_list_words(rest, v::Counters::Set.code())?)
        }
        Property::Quotes => when(value == v::Quotes::Set.code(), pair_list_words(rest, v::Quotes::Set.code())?),
        Property::Cursor => cursor_words(value, rest)?,
        Property::FontFamily => family_words(
            value,
            rest,
            [v::FontFamily::String.code(), v::FontFamily::IdentList.code()],
        )?,
        Property::VoiceFamily => family_words(
            value,
            rest,
            [v::VoiceFamily::String.code(), v::VoiceFamily::IdentList.code()],
        )?,
        Property::Elevation => when(value == v::Elevation::Angle.code(), DIMENSION),
        Property::FontSize => when(value == v::FontSize::Dimension.code(), DIMENSION),
        Property::Height | Property::Width => when(value == v::Size::Set.code(), DIMENSION),
        Property::LetterSpacing | Property::WordSpacing => when(value == v::Spacing::Set.code(), DIMENSION),
        Property::LineHeight => match v::LineHeight::from_code(value) {
            Some(v::LineHeight::Number) => 1,
            Some(v::LineHeight::Dimension) => DIMENSION,
            _ => 0,
        },
        Property::MaxHeight | Property::MaxWidth => when(value == v::MaxSize::Set.code(), DIMENSION),
        Property::MinHeight
        | Property::MinWidth
        | Property::PaddingBottom
        | Property::PaddingLeft
        | Property::PaddingRight
        | Property::PaddingTop
        | Property::TextIndent => when(value == v::Length::Set.code(), DIMENSION),
        Property::Orphans | Property::Widows => when(value == v::Integer::Set.code(), 1),
        Property::PauseAfter | Property::PauseBefore => when(value == v::Pause::Set.code(), DIMENSION),
        Property::Pitch => when(value == v::Pitch::Frequency.code(), DIMENSION),
        Property::PitchRange | Property::Richness | Property::Stress => when(value == v::Number::Set.code(), 1),
        Property::PlayDuring => when(value & 0x1f == v::PlayDuring::Uri.code(), 1),
        Property::SpeechRate => when(value == v::SpeechRate::Set.code(), 1),
        Property::VerticalAlign => when(value == v::VerticalAlign::Set.code(), DIMENSION),
        Property::Volume => match v::Volume::from_code(value) {
            Some(v::Volume::Number) => 1,
            Some(v::Volume::Dimension) => DIMENSION,
            _ => 0,
        },
        Property::ZIndex => when(value == v::ZIndex::Set.code(), 1),
        _ => 0,
    };
    Some(words)
}

fn content_words(rest: &[u32]) -> Option<usize> {
    let mut pos = 0;
    loop {
        let item = *rest.get(pos)?;
        pos += 1;
        if item == 0 {
            return Some(pos);
        }
        pos += match v::ContentItem::from_code((item & 0xff) as u16)? {
            v::ContentItem::String | v::ContentItem::Uri | v::ContentItem::Attr | v::ContentItem::Counter => 1,
            v::ContentItem::Counters => 2,
            v::ContentItem::Inherit => return None,
            _ => 0,
        };
    }
}

/// Lists of two operand words per entry, separated by `set` words and ended by a zero word
fn pair_list_words(rest: &[u32], set: u16) -> Option<usize> {
    let mut pos = 0;
    loop {
        pos += 2;
        let next = *rest.get(pos)?;
        pos += 1;
        if next == 0 {
            return Some(pos);
        }
        if next != u32::from(set) {
            return None;
        }
    }
}

fn cursor_words(first: u16, rest: &[u32]) -> Option<usize> {
    let mut pos = 0;
    let mut item = first;
    while item == v::Cursor::Uri.code() {
        pos += 1;
        item = u16::try_from(*rest.get(pos)?).ok()?;
        pos += 1;
    }
    v::Cursor::from_code(item).map(|_| pos)
}

fn family_words(first: u16, rest: &[u32], named: [u16; 2]) -> Option<usize> {
    let mut pos = usize::from(named.contains(&first));
    loop {
        let item = *rest.get(pos)?;
        pos += 1;
        if item == 0 {
            return Some(pos);
        }
        if named.iter().any(|code| u32::from(*code) == item) {
            pos += 1;
        }
    }
}
