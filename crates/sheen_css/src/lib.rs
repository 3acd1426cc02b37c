//! CSS 2.1 front end
//!
//! Bytes are decoded by the [`input`] stream, split into tokens by the [`tokenizer`] and fed
//! through the resumable [`parser`], which reports the grammar as events. The [`stylesheet`]
//! builder turns those events into rules, compiling every declaration into the bytecode of the
//! [`properties`] module.
//!
//! ```
//! use sheen_css::parser_config::ParserConfig;
//! use sheen_css::stylesheet::Stylesheet;
//!
//! let sheet = Stylesheet::parse("h1 { color: red }", ParserConfig::default()).unwrap();
//! assert_eq!(sheet.rules.len(), 1);
//! ```

pub mod colors;
pub mod errors;
pub mod input;
pub mod parser;
pub mod parser_config;
pub mod properties;
pub mod selector;
pub mod stylesheet;
pub mod tokenizer;
pub mod values;
