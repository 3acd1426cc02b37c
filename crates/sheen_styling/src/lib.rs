//! Styling functionality
//!
//! This crate runs the compiled declarations of [`sheen_css`] through the cascade and produces a
//! bit-packed [`ComputedStyle`] per element. Selector matching is left to the caller: it hands
//! the declaration blocks of the matching rules to [`select_style`] together with their
//! [`Rank`].

pub mod cascade;
pub mod computed;
pub mod errors;
mod initial;
pub mod layout;
pub mod useragent;

pub use cascade::{compose, select_style, Cascade, Rank};
pub use computed::ComputedStyle;
pub use initial::{INITIAL_COLOUR, INITIAL_FONT_FAMILY};
