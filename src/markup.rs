use std::sync::LazyLock;

use regex::Regex;

use crate::token::{FormattingToken, Span};

/// `**text**` or `__text__`, shortest match, never crossing a line.
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").expect("valid bold pattern"));

/// A bullet marker followed by whitespace at the start of a (trimmed) line.
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*•]\s+(.*)$").expect("valid list pattern"));

/// Parse a product description into formatting tokens.
///
/// Never fails: text that matches no construct comes back as plain runs.
pub fn parse(raw: &str) -> Vec<FormattingToken> {
    let raw = raw.trim();
    let mut tokens = Vec::new();
    if raw.is_empty() {
        return tokens;
    }

    let mut state = LineState::Normal;
    for line in raw.lines() {
        state = state.next(classify(line), &mut tokens);
    }
    state.finish(&mut tokens);

    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Normal,
    InList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Item(&'a str),
    Text(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }
    match LIST_ITEM.captures(line).and_then(|caps| caps.get(1)) {
        Some(item) => LineKind::Item(item.as_str()),
        None => LineKind::Text(line),
    }
}

impl LineState {
    fn next(self, kind: LineKind<'_>, tokens: &mut Vec<FormattingToken>) -> LineState {
        match (self, kind) {
            (LineState::Normal, LineKind::Item(item)) => {
                tokens.push(FormattingToken::ListStart);
                tokens.push(FormattingToken::ListItem(parse_inline(item)));
                LineState::InList
            }
            (LineState::InList, LineKind::Item(item)) => {
                tokens.push(FormattingToken::ListItem(parse_inline(item)));
                LineState::InList
            }
            (state, LineKind::Blank) => {
                state.finish(tokens);
                tokens.push(FormattingToken::LineBreak);
                LineState::Normal
            }
            (state, LineKind::Text(text)) => {
                state.finish(tokens);
                tokens.extend(parse_inline(text).into_iter().map(FormattingToken::Run));
                tokens.push(FormattingToken::LineBreak);
                LineState::Normal
            }
        }
    }

    /// Close an open list. Also the terminal transition at end of input.
    fn finish(self, tokens: &mut Vec<FormattingToken>) {
        if self == LineState::InList {
            tokens.push(FormattingToken::ListEnd);
        }
    }
}

/// Split one line into plain, bold and italic spans. Bold is matched first.
fn parse_inline(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;

    for caps in BOLD.captures_iter(line) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1).or_else(|| caps.get(2))) else {
            continue;
        };
        split_italic(&line[last..whole.start()], &mut spans);
        spans.push(Span::Bold(inner.as_str().to_string()));
        last = whole.end();
    }
    split_italic(&line[last..], &mut spans);

    spans
}

/// Extract `*text*` / `_text_` spans where neither delimiter touches another
/// copy of itself.
fn split_italic(text: &str, spans: &mut Vec<Span>) {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut plain_start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (open, delim) = chars[i];
        if is_single_delimiter(&chars, i) {
            let close = (i + 2..chars.len())
                .find(|&j| chars[j].1 == delim && is_single_delimiter(&chars, j));
            if let Some(j) = close {
                push_plain(&text[plain_start..open], spans);
                let inner = &text[chars[i + 1].0..chars[j].0];
                spans.push(Span::Italic(inner.to_string()));
                plain_start = chars[j].0 + delim.len_utf8();
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }

    push_plain(&text[plain_start..], spans);
}

fn is_single_delimiter(chars: &[(usize, char)], i: usize) -> bool {
    let ch = chars[i].1;
    if ch != '*' && ch != '_' {
        return false;
    }
    let before = i.checked_sub(1).map(|p| chars[p].1);
    let after = chars.get(i + 1).map(|&(_, c)| c);
    before != Some(ch) && after != Some(ch)
}

fn push_plain(text: &str, spans: &mut Vec<Span>) {
    if !text.is_empty() {
        spans.push(Span::Plain(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::token::{FormattingToken as T, Span};

    #[test]
    fn empty_and_whitespace() {
        assert!(parse("").is_empty());
        assert!(parse("   \n\t\n  ").is_empty());
    }

    #[test]
    fn plain_line() {
        assert_eq!(parse("Hello world"), vec![T::plain("Hello world"), T::LineBreak]);
    }

    #[test]
    fn bold_both_delimiters() {
        assert_eq!(
            parse("**Fast** and __quiet__"),
            vec![T::bold("Fast"), T::plain(" and "), T::bold("quiet"), T::LineBreak]
        );
    }

    #[test]
    fn bold_is_non_greedy() {
        assert_eq!(
            parse("**a** b **c**"),
            vec![T::bold("a"), T::plain(" b "), T::bold("c"), T::LineBreak]
        );
    }

    #[test]
    fn italic_both_delimiters() {
        assert_eq!(
            parse("*soft* and _light_"),
            vec![T::italic("soft"), T::plain(" and "), T::italic("light"), T::LineBreak]
        );
    }

    #[test]
    fn bold_takes_precedence_over_italic() {
        assert_eq!(
            parse("**bold** _italic_"),
            vec![T::bold("bold"), T::plain(" "), T::italic("italic"), T::LineBreak]
        );
    }

    #[test]
    fn no_residual_delimiters_in_plain_runs() {
        let tokens = parse("Our **best** copier, _now_ with **duplex** and *colour*.");
        for token in &tokens {
            if let T::Run(Span::Plain(text)) = token {
                assert!(!text.contains('*') && !text.contains('_'), "residual in {text:?}");
            }
        }
        assert!(tokens.contains(&T::bold("best")));
        assert!(tokens.contains(&T::italic("colour")));
    }

    #[test]
    fn unterminated_bold_stays_on_its_line() {
        assert_eq!(
            parse("**\nnext **line**"),
            vec![
                T::plain("**"),
                T::LineBreak,
                T::plain("next "),
                T::bold("line"),
                T::LineBreak,
            ]
        );
    }

    #[test]
    fn unterminated_italic_does_not_span_lines() {
        assert_eq!(
            parse("a *b\nc* d"),
            vec![T::plain("a *b"), T::LineBreak, T::plain("c* d"), T::LineBreak]
        );
    }

    #[test]
    fn bullet_list() {
        assert_eq!(
            parse("Features:\n- Duplex\n* Wi-Fi\n• Scan"),
            vec![
                T::plain("Features:"),
                T::LineBreak,
                T::ListStart,
                T::ListItem(vec![Span::Plain("Duplex".into())]),
                T::ListItem(vec![Span::Plain("Wi-Fi".into())]),
                T::ListItem(vec![Span::Plain("Scan".into())]),
                T::ListEnd,
            ]
        );
    }

    #[test]
    fn list_item_keeps_inline_styles() {
        assert_eq!(
            parse("- **A4** paper"),
            vec![
                T::ListStart,
                T::ListItem(vec![Span::Bold("A4".into()), Span::Plain(" paper".into())]),
                T::ListEnd,
            ]
        );
    }

    #[test]
    fn blank_line_closes_list() {
        assert_eq!(
            parse("- one\n\nafter"),
            vec![
                T::ListStart,
                T::ListItem(vec![Span::Plain("one".into())]),
                T::ListEnd,
                T::LineBreak,
                T::plain("after"),
                T::LineBreak,
            ]
        );
    }

    #[test]
    fn text_line_closes_list() {
        assert_eq!(
            parse("- one\nafter"),
            vec![
                T::ListStart,
                T::ListItem(vec![Span::Plain("one".into())]),
                T::ListEnd,
                T::plain("after"),
                T::LineBreak,
            ]
        );
    }

    #[test]
    fn marker_without_space_is_not_a_list() {
        assert_eq!(parse("-5% off"), vec![T::plain("-5% off"), T::LineBreak]);
        assert_eq!(parse("*starred*"), vec![T::italic("starred"), T::LineBreak]);
    }

    #[test]
    fn example_description() {
        let tokens = parse("**Fast** printing.\n- Duplex\n- Wi-Fi");
        assert_eq!(tokens[0], T::bold("Fast"));
        assert_eq!(tokens[1], T::plain(" printing."));
        let items: Vec<String> = tokens.iter().filter_map(T::list_item_text).collect();
        assert_eq!(items, vec!["Duplex", "Wi-Fi"]);
        assert_eq!(tokens.last(), Some(&T::ListEnd));
    }
}
