use std::fmt;

/// Grammar productions. Every production is a state of the parser; the frame on top of the
/// parser stack is the production that is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    Stylesheet,
    Statement,
    Ruleset,
    RulesetEnd,
    AtRule,
    AtRuleEnd,
    Block,
    BlockContent,
    Selector,
    Declaration,
    DeclList,
    DeclListEnd,
    Property,
    Value0,
    Value1,
    Value,
    Any0,
    Any1,
    Any,
    MalformedDecl,
    MalformedSelector,
    MalformedAtRule,
    InlineStyle,
    InlineStyleBody,
}

/// A production together with the point inside the production where parsing resumes
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub state: State,
    pub substate: u8,
}

impl Frame {
    pub fn new(state: State) -> Self {
        Self { state, substate: 0 }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.state, self.substate)
    }
}
