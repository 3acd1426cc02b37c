//! Sheen: a resumable CSS 2.1 style engine
//!
//! The work is split over the workspace crates, re-exported here:
//! - [`css`]: input decoding, tokenizer, grammar parser, selectors and the property compiler
//! - [`styling`]: the cascade and bit-packed computed styles
//! - [`shared`]: fixed-point numbers, string interning and source locations

pub use sheen_css as css;
pub use sheen_shared as shared;
pub use sheen_styling as styling;

pub mod testing;
