/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Bold(String),
    Italic(String),
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Span::Plain(text) | Span::Bold(text) | Span::Italic(text) => text,
        }
    }
}

/// Formatting instructions produced from a product description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattingToken {
    Run(Span),
    LineBreak,
    ListStart,
    ListItem(Vec<Span>),
    ListEnd,
}

impl FormattingToken {
    pub fn plain(text: impl Into<String>) -> Self {
        FormattingToken::Run(Span::Plain(text.into()))
    }

    pub fn bold(text: impl Into<String>) -> Self {
        FormattingToken::Run(Span::Bold(text.into()))
    }

    pub fn italic(text: impl Into<String>) -> Self {
        FormattingToken::Run(Span::Italic(text.into()))
    }

    /// Concatenated text of a list item's spans, `None` for other tokens.
    pub fn list_item_text(&self) -> Option<String> {
        match self {
            FormattingToken::ListItem(spans) => Some(spans.iter().map(Span::text).collect()),
            _ => None,
        }
    }
}
