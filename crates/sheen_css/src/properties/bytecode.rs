//! Compiled declaration format
//!
//! A compiled declaration is a run of 32 bit words. Every instruction starts with a header
//! (opcode in bits 0-9, flags in bits 10-17, value tag in bits 18-31) followed by the operands its
//! value tag asks for:
//!
//! * fixed-point numbers as the raw 22.10 value,
//! * units as [`Unit`] codes,
//! * colours as `0xAARRGGBB`,
//! * strings as indices into the string table of the [`Style`].

use std::fmt;

use bitflags::bitflags;
use sheen_shared::fixed::Fixed;
use sheen_shared::intern::Istr;

use crate::errors::CssResult;
use crate::properties::Property;
use crate::values::{Dimension, Unit};

const OPCODE_MASK: u32 = 0x3ff;
const FLAGS_SHIFT: u32 = 10;
const FLAGS_MASK: u32 = 0xff;
const VALUE_SHIFT: u32 = 18;

/// Largest value tag that fits an instruction header
pub const MAX_VALUE: u16 = (1 << 14) - 1;

bitflags! {
    /// Instruction flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpFlags: u8 {
        const IMPORTANT = 0x01;
        const INHERIT = 0x02;
    }
}

/// A decoded instruction header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opv {
    pub property: Property,
    pub flags: OpFlags,
    pub value: u16,
}

impl Opv {
    pub fn new(property: Property, flags: OpFlags, value: u16) -> Self {
        Self { property, flags, value }
    }

    pub fn encode(self) -> u32 {
        u32::from(self.property.opcode())
            | (u32::from(self.flags.bits()) << FLAGS_SHIFT)
            | (u32::from(self.value & MAX_VALUE) << VALUE_SHIFT)
    }

    /// Decodes a header word. Returns `None` for an unknown opcode.
    pub fn decode(word: u32) -> Option<Self> {
        let property = Property::from_opcode((word & OPCODE_MASK) as u16)?;
        let flags = OpFlags::from_bits_truncate(((word >> FLAGS_SHIFT) & FLAGS_MASK) as u8);
        let value = (word >> VALUE_SHIFT) as u16;
        Some(Self { property, flags, value })
    }

    pub fn is_important(self) -> bool {
        self.flags.contains(OpFlags::IMPORTANT)
    }

    pub fn is_inherit(self) -> bool {
        self.flags.contains(OpFlags::INHERIT)
    }
}

/// A compiled declaration block: instructions plus the strings they refer to
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Style {
    bytecode: Vec<u32>,
    strings: Vec<Istr>,
}

impl Style {
    pub fn bytecode(&self) -> &[u32] {
        &self.bytecode
    }

    pub fn strings(&self) -> &[Istr] {
        &self.strings
    }

    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    pub fn string(&self, index: u32) -> Option<&Istr> {
        self.strings.get(index as usize)
    }

    pub fn reader(&self) -> Reader<'_> {
        Reader { style: self, pos: 0 }
    }

    /// Headers of all instructions, in order
    pub fn instructions(&self) -> Vec<Opv> {
        let mut reader = self.reader();
        let mut headers = Vec::new();
        while let Some(opv) = reader.next_instruction() {
            headers.push(opv);
            if reader.skip_operands(opv).is_none() {
                break;
            }
        }
        headers
    }
}

impl fmt::Debug for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<String> = self.bytecode.iter().map(|w| format!("{w:08x}")).collect();
        f.debug_struct("Style")
            .field("bytecode", &words)
            .field("strings", &self.strings)
            .finish()
    }
}

/// Destination of compiled words. Lists are compiled twice: once into a [`Measure`] to find the
/// size of the instruction, then into the builder.
pub trait Sink {
    fn opv(&mut self, property: Property, value: u16) -> CssResult<()>;

    fn word(&mut self, word: u32) -> CssResult<()>;

    fn string(&mut self, string: Istr) -> CssResult<()>;

    fn fixed(&mut self, value: Fixed) -> CssResult<()> {
        self.word(value.raw() as u32)
    }

    fn dimension(&mut self, dimension: Dimension) -> CssResult<()> {
        self.fixed(dimension.value)?;
        self.word(dimension.unit.code())
    }
}

/// Counts the words an instruction needs
#[derive(Debug, Default)]
pub struct Measure {
    pub words: usize,
}

impl Sink for Measure {
    fn opv(&mut self, _property: Property, _value: u16) -> CssResult<()> {
        self.words += 1;
        Ok(())
    }

    fn word(&mut self, _word: u32) -> CssResult<()> {
        self.words += 1;
        Ok(())
    }

    fn string(&mut self, _string: Istr) -> CssResult<()> {
        self.words += 1;
        Ok(())
    }
}

/// Position in a [`StyleBuilder`] that can be returned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    words: usize,
    strings: usize,
}

/// Accumulates compiled declarations
#[derive(Debug, Default)]
pub struct StyleBuilder {
    bytecode: Vec<u32>,
    strings: Vec<Istr>,
    flags: OpFlags,
}

impl StyleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the instructions written from now on as important (or not)
    pub fn set_important(&mut self, important: bool) {
        self.flags.set(OpFlags::IMPORTANT, important);
    }

    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            words: self.bytecode.len(),
            strings: self.strings.len(),
        }
    }

    /// Drops everything written after the checkpoint
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.bytecode.truncate(checkpoint.words);
        self.strings.truncate(checkpoint.strings);
    }

    /// Makes room for exactly `words` more words
    pub fn reserve(&mut self, words: usize) -> CssResult<()> {
        self.bytecode.try_reserve_exact(words)?;
        Ok(())
    }

    /// Writes an `inherit` instruction
    pub fn inherit(&mut self, property: Property) -> CssResult<()> {
        let opv = Opv::new(property, self.flags | OpFlags::INHERIT, 0);
        self.word(opv.encode())
    }

    pub fn finish(self) -> Style {
        Style {
            bytecode: self.bytecode,
            strings: self.strings,
        }
    }
}

impl Sink for StyleBuilder {
    fn opv(&mut self, property: Property, value: u16) -> CssResult<()> {
        debug_assert!(value <= MAX_VALUE);
        let opv = Opv::new(property, self.flags, value);
        self.word(opv.encode())
    }

    fn word(&mut self, word: u32) -> CssResult<()> {
        self.bytecode.try_reserve(1)?;
        self.bytecode.push(word);
        Ok(())
    }

    /// Writes the index of the string, adding it to the string table when needed
    fn string(&mut self, string: Istr) -> CssResult<()> {
        let index = match self.strings.iter().position(|s| *s == string) {
            Some(index) => index,
            None => {
                self.strings.try_reserve(1)?;
                self.strings.push(string);
                self.strings.len() - 1
            }
        };
        self.word(index as u32)
    }
}

/// Walks the words of a [`Style`]. All reads return `None` when the bytecode is truncated.
#[derive(Clone)]
pub struct Reader<'a> {
    style: &'a Style,
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn at_end(&self) -> bool {
        self.pos >= self.style.bytecode.len()
    }

    /// The words that have not been read yet
    pub fn remaining(&self) -> &'a [u32] {
        self.style.bytecode.get(self.pos..).unwrap_or_default()
    }

    /// Decodes the next instruction header
    pub fn next_instruction(&mut self) -> Option<Opv> {
        self.word().and_then(Opv::decode)
    }

    pub fn word(&mut self) -> Option<u32> {
        let word = self.style.bytecode.get(self.pos).copied()?;
        self.pos += 1;
        Some(word)
    }

    pub fn fixed(&mut self) -> Option<Fixed> {
        self.word().map(|w| Fixed::from_raw(w as i32))
    }

    pub fn unit(&mut self) -> Option<Unit> {
        self.word().and_then(Unit::from_code)
    }

    pub fn dimension(&mut self) -> Option<Dimension> {
        let value = self.fixed()?;
        let unit = self.unit()?;
        Some(Dimension::new(value, unit))
    }

    pub fn colour(&mut self) -> Option<u32> {
        self.word()
    }

    pub fn string(&mut self) -> Option<&'a Istr> {
        let index = self.word()?;
        self.style.string(index)
    }

    /// Skips the operands of an instruction whose header was just read
    pub fn skip_operands(&mut self, opv: Opv) -> Option<()> {
        if opv.is_inherit() {
            return Some(());
        }
        let words = crate::properties::operand_words(opv, self.remaining())?;
        if self.pos + words > self.style.bytecode.len() {
            return None;
        }
        self.pos += words;
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheen_shared::intern::Interner;

    #[test]
    fn header_layout() {
        let opv = Opv::new(Property::ZIndex, OpFlags::IMPORTANT, 2);
        let word = opv.encode();
        assert_eq!(word & 0x3ff, 98);
        assert_eq!((word >> 10) & 0xff, 1);
        assert_eq!(word >> 18, 2);
        assert_eq!(Opv::decode(word), Some(opv));
        assert!(opv.is_important());
        assert!(!opv.is_inherit());
    }

    #[test]
    fn unknown_opcode_does_not_decode() {
        assert_eq!(Opv::decode(0x3ff), None);
    }

    #[test]
    fn strings_are_deduplicated() {
        let interner = Interner::new();
        let mut builder = StyleBuilder::new();
        builder.string(interner.intern("a")).unwrap();
        builder.string(interner.intern("b")).unwrap();
        builder.string(interner.intern("a")).unwrap();

        let style = builder.finish();
        assert_eq!(style.bytecode(), &[0, 1, 0]);
        assert_eq!(style.strings().len(), 2);
    }

    #[test]
    fn rollback_discards_partial_output() {
        let interner = Interner::new();
        let mut builder = StyleBuilder::new();
        builder.opv(Property::Display, 2).unwrap();
        let checkpoint = builder.checkpoint();
        builder.opv(Property::BackgroundImage, 2).unwrap();
        builder.string(interner.intern("x.png")).unwrap();
        builder.rollback(checkpoint);

        let style = builder.finish();
        assert_eq!(style.bytecode().len(), 1);
        assert!(style.strings().is_empty());
    }

    #[test]
    fn measure_counts_every_word() {
        let interner = Interner::new();
        let mut measure = Measure::default();
        measure.opv(Property::Width, 2).unwrap();
        measure.dimension(Dimension::px(3)).unwrap();
        measure.string(interner.intern("x")).unwrap();
        assert_eq!(measure.words, 4);
    }

    #[test]
    fn important_and_inherit_flags() {
        let mut builder = StyleBuilder::new();
        builder.set_important(true);
        builder.inherit(Property::Color).unwrap();
        let style = builder.finish();

        let opv = style.reader().next_instruction().unwrap();
        assert_eq!(opv.property, Property::Color);
        assert!(opv.is_important());
        assert!(opv.is_inherit());
        assert_eq!(opv.value, 0);
    }
}
