//! Splits a template document into literal text and script fragments.
//!
//! Markers look like `` [`code`] `` (run for effect) and `` [=`code`] ``
//! (splice the value). A backslash right before the `[` keeps the marker as
//! literal text; that backslash is dropped from the output.

use regex::Regex;

use std::ops::Range;
use std::sync::LazyLock;

#[cfg(test)]
pub mod test;

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[(?<mode>=)?`(?<expression>.*?)`\]").expect("marker pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Document text copied to the output verbatim.
    Text(String),
    /// A fragment body. `writes_output` is set for `[=` markers.
    Script {
        expression: String,
        writes_output: bool,
    },
}

/// Tokenize a template.
///
/// Text tokens carry the span of their content, script tokens the span of the
/// fragment body between the backticks. Whitespace-only text is dropped.
/// Lexing never fails: anything that is not a well-formed marker is text.
pub fn tokenize(source: &str) -> Vec<(Token, Range<usize>)> {
    let mut tokens = vec![];
    let mut text_start = 0;
    let mut search_from = 0;
    // byte offsets of escaping backslashes in the current text run
    let mut escapes = vec![];

    while let Some(captures) = MARKER.captures_at(source, search_from) {
        let Some(marker) = captures.get(0) else {
            break;
        };

        // escaped: retry one byte further, '[' is ASCII
        if source[..marker.start()].ends_with('\\') {
            escapes.push(marker.start() - 1);
            search_from = marker.start() + 1;
            continue;
        }

        push_text(&mut tokens, source, text_start..marker.start(), &escapes);
        escapes.clear();

        if let Some(body) = captures.name("expression") {
            tokens.push((
                Token::Script {
                    expression: body.as_str().to_string(),
                    writes_output: captures.name("mode").is_some(),
                },
                body.range(),
            ));
        }

        text_start = marker.end();
        search_from = marker.end();
    }

    push_text(&mut tokens, source, text_start..source.len(), &escapes);

    tracing::debug!(tokens = tokens.len(), "tokenized template");
    tokens
}

fn push_text(
    tokens: &mut Vec<(Token, Range<usize>)>,
    source: &str,
    span: Range<usize>,
    escapes: &[usize],
) {
    let mut content = String::with_capacity(span.len());
    let mut from = span.start;
    for &backslash in escapes {
        content.push_str(&source[from..backslash]);
        from = backslash + 1;
    }
    content.push_str(&source[from..span.end]);

    // Collapse whitespace-only runs so markers on their own line leave no blank lines
    if is_blank(&content) {
        return;
    }

    tokens.push((Token::Text(content), span));
}

/// Unicode white space plus the byte order mark.
fn is_blank(content: &str) -> bool {
    content.chars().all(|c| c.is_whitespace() || c == '\u{feff}')
}
