use serde::Deserialize;

use crate::input::CharsetSource;
use crate::stylesheet::Origin;

/// What the parser is fed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Context {
    /// A complete stylesheet
    #[default]
    Stylesheet,
    /// The contents of a `style` attribute: a bare declaration list
    Inline,
}

/// ParserConfig holds the configuration for the parser
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Context defines how the data needs to be parsed
    pub context: Context,
    /// Accept historic constructs such as unitless lengths and bare hex colours
    pub quirks: bool,
    /// Emit comment tokens instead of dropping them in the tokenizer
    pub emit_comments: bool,
    /// Origin of the stylesheet
    pub origin: Origin,
    /// Optional source filename or url
    pub source: Option<String>,
    /// Charset label hint, used according to `charset_source`
    pub charset: Option<String>,
    pub charset_source: CharsetSource,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            context: Context::Stylesheet,
            quirks: false,
            emit_comments: false,
            origin: Origin::Author,
            source: None,
            charset: None,
            charset_source: CharsetSource::Default,
        }
    }
}
