//! Bit layout of the computed style
//!
//! Every stored property owns one bit field and a run of value words in either the common or the
//! uncommon block. The bit field holds the value tag in its low bits, followed by four bits per
//! unit. Value words hold raw fixed-point numbers, colours and integers. Fields never straddle a
//! word. The positions are worked out at compile time from the table below.

use sheen_css::properties::{Property, PROPERTY_COUNT};

/// Bits needed for a [`Unit`](sheen_css::values::Unit) code
pub const UNIT_BITS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Common = 0,
    Uncommon = 1,
}

/// Where a property lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub block: Block,
    pub word: u8,
    pub shift: u8,
    pub tag_bits: u8,
    pub units: u8,
    /// First value word
    pub value: u8,
    pub values: u8,
}

impl Slot {
    pub const fn width(&self) -> u8 {
        self.tag_bits + self.units * UNIT_BITS
    }

    pub const fn mask(&self) -> u32 {
        (((1u64 << self.width()) - 1) as u32) << self.shift
    }
}

/// `(property, block, tag bits, units, value words)`
type Entry = (Property, Block, u8, u8, u8);

use Block::{Common, Uncommon};

const ENTRIES: [Entry; 81] = [
    (Property::BackgroundAttachment, Common, 2, 0, 0),
    (Property::BackgroundColor, Common, 3, 0, 1),
    (Property::BackgroundImage, Common, 2, 0, 0),
    (Property::BackgroundPosition, Common, 6, 2, 2),
    (Property::BackgroundRepeat, Common, 3, 0, 0),
    (Property::BorderBottomColor, Common, 3, 0, 1),
    (Property::BorderBottomStyle, Common, 4, 0, 0),
    (Property::BorderBottomWidth, Common, 3, 1, 1),
    (Property::BorderCollapse, Common, 2, 0, 0),
    (Property::BorderLeftColor, Common, 3, 0, 1),
    (Property::BorderLeftStyle, Common, 4, 0, 0),
    (Property::BorderLeftWidth, Common, 3, 1, 1),
    (Property::BorderRightColor, Common, 3, 0, 1),
    (Property::BorderRightStyle, Common, 4, 0, 0),
    (Property::BorderRightWidth, Common, 3, 1, 1),
    (Property::BorderSpacing, Uncommon, 1, 2, 2),
    (Property::BorderTopColor, Common, 3, 0, 1),
    (Property::BorderTopStyle, Common, 4, 0, 0),
    (Property::BorderTopWidth, Common, 3, 1, 1),
    (Property::Bottom, Common, 2, 1, 1),
    (Property::CaptionSide, Common, 2, 0, 0),
    (Property::Clear, Common, 3, 0, 0),
    (Property::Clip, Uncommon, 6, 4, 4),
    (Property::Color, Common, 3, 0, 1),
    (Property::Content, Uncommon, 2, 0, 0),
    (Property::CounterIncrement, Uncommon, 2, 0, 0),
    (Property::CounterReset, Uncommon, 2, 0, 0),
    (Property::Cursor, Uncommon, 5, 0, 0),
    (Property::Direction, Common, 2, 0, 0),
    (Property::Display, Common, 5, 0, 0),
    (Property::EmptyCells, Common, 2, 0, 0),
    (Property::Float, Common, 2, 0, 0),
    (Property::FontFamily, Common, 3, 0, 0),
    (Property::FontSize, Common, 4, 1, 1),
    (Property::FontStyle, Common, 2, 0, 0),
    (Property::FontVariant, Common, 2, 0, 0),
    (Property::FontWeight, Common, 4, 0, 0),
    (Property::Height, Common, 2, 1, 1),
    (Property::Left, Common, 2, 1, 1),
    (Property::LetterSpacing, Uncommon, 2, 1, 1),
    (Property::LineHeight, Common, 2, 1, 1),
    (Property::ListStyleImage, Common, 2, 0, 0),
    (Property::ListStylePosition, Common, 2, 0, 0),
    (Property::ListStyleType, Common, 4, 0, 0),
    (Property::MarginBottom, Common, 2, 1, 1),
    (Property::MarginLeft, Common, 2, 1, 1),
    (Property::MarginRight, Common, 2, 1, 1),
    (Property::MarginTop, Common, 2, 1, 1),
    (Property::MaxHeight, Common, 2, 1, 1),
    (Property::MaxWidth, Common, 2, 1, 1),
    (Property::MinHeight, Common, 1, 1, 1),
    (Property::MinWidth, Common, 1, 1, 1),
    (Property::Orphans, Common, 1, 0, 1),
    (Property::OutlineColor, Uncommon, 3, 0, 1),
    (Property::OutlineStyle, Common, 4, 0, 0),
    (Property::OutlineWidth, Uncommon, 3, 1, 1),
    (Property::Overflow, Common, 3, 0, 0),
    (Property::PaddingBottom, Common, 1, 1, 1),
    (Property::PaddingLeft, Common, 1, 1, 1),
    (Property::PaddingRight, Common, 1, 1, 1),
    (Property::PaddingTop, Common, 1, 1, 1),
    (Property::PageBreakAfter, Common, 3, 0, 0),
    (Property::PageBreakBefore, Common, 3, 0, 0),
    (Property::PageBreakInside, Common, 2, 0, 0),
    (Property::Position, Common, 3, 0, 0),
    (Property::Quotes, Common, 2, 0, 0),
    (Property::Right, Common, 2, 1, 1),
    (Property::TableLayout, Common, 2, 0, 0),
    (Property::TextAlign, Common, 3, 0, 0),
    (Property::TextDecoration, Common, 5, 0, 0),
    (Property::TextIndent, Common, 1, 1, 1),
    (Property::TextTransform, Common, 3, 0, 0),
    (Property::Top, Common, 2, 1, 1),
    (Property::UnicodeBidi, Common, 2, 0, 0),
    (Property::VerticalAlign, Common, 4, 1, 1),
    (Property::Visibility, Common, 2, 0, 0),
    (Property::WhiteSpace, Common, 3, 0, 0),
    (Property::Widows, Common, 1, 0, 1),
    (Property::Width, Common, 2, 1, 1),
    (Property::WordSpacing, Uncommon, 2, 1, 1),
    (Property::ZIndex, Common, 2, 0, 1),
];

/// Bits and value words used by each block
#[derive(Debug, Clone, Copy)]
struct Usage {
    bits: [usize; 2],
    values: [usize; 2],
}

const fn pack(entries: &[Entry]) -> ([Option<Slot>; PROPERTY_COUNT], Usage) {
    let mut slots = [None; PROPERTY_COUNT];
    let mut usage = Usage {
        bits: [0; 2],
        values: [0; 2],
    };

    let mut i = 0;
    while i < entries.len() {
        let (property, block, tag_bits, units, values) = entries[i];
        let b = block as usize;
        let width = (tag_bits + units * UNIT_BITS) as usize;

        let mut shift = usage.bits[b] % 32;
        if shift + width > 32 {
            usage.bits[b] += 32 - shift;
            shift = 0;
        }

        slots[property as usize] = Some(Slot {
            block,
            word: (usage.bits[b] / 32) as u8,
            shift: shift as u8,
            tag_bits,
            units,
            value: usage.values[b] as u8,
            values,
        });
        usage.bits[b] += width;
        usage.values[b] += values as usize;
        i += 1;
    }
    (slots, usage)
}

const PACKED: ([Option<Slot>; PROPERTY_COUNT], Usage) = pack(&ENTRIES);

/// Slots indexed by opcode. Aural properties have none.
pub const SLOTS: [Option<Slot>; PROPERTY_COUNT] = PACKED.0;

pub const COMMON_WORDS: usize = PACKED.1.bits[0].div_ceil(32);
pub const COMMON_VALUES: usize = PACKED.1.values[0];
pub const UNCOMMON_WORDS: usize = PACKED.1.bits[1].div_ceil(32);
pub const UNCOMMON_VALUES: usize = PACKED.1.values[1];

pub fn slot(property: Property) -> Option<Slot> {
    SLOTS[property as usize]
}
