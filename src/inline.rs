use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until},
    character::complete::{anychar, char},
    combinator::{recognize, verify},
    error::{context, ContextError, ParseError},
    multi::many1_count,
    sequence::{delimited, pair},
    IResult, Parser,
};

use crate::{
    data::{Segment, Token, Tx},
    grammar::placeholder,
};

/// Parses `$$...$$` found inside of a text line
fn display_span<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    context(
        "inline display math",
        delimited(
            tag("$$"),
            verify(take_until("$$"), |body: &str| {
                !body.trim().is_empty() && !body.contains('\n')
            }),
            tag("$$"),
        ),
    )
    .map(|body: &str| Token::DisplayMath {
        expression: body.trim().into(),
    })
    .parse(input)
}

/// Parses inline math, delimited by '$'
///
/// Escaped characters (like `\$` or `\{`) are allowed inside, newlines are not.
fn dollar_math<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    context(
        "inline math",
        delimited(
            char('$'),
            verify(
                recognize(many1_count(alt((
                    recognize(pair(char('\\'), anychar)),
                    is_not("$\\\n"),
                )))),
                |body: &str| !body.trim().is_empty() && !body.contains('\n'),
            ),
            char('$'),
        ),
    )
    .map(|body: &str| Token::InlineMath {
        expression: body.trim().into(),
    })
    .parse(input)
}

/// Parses inline math, delimited by `\(` and `\)`
fn paren_math<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    context(
        "inline math",
        delimited(
            tag("\\("),
            verify(take_until("\\)"), |body: &str| {
                !body.trim().is_empty() && !body.contains('\n')
            }),
            tag("\\)"),
        ),
    )
    .map(|body: &str| Token::InlineMath {
        expression: body.trim().into(),
    })
    .parse(input)
}

fn inline_token<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    alt((display_span, dollar_math, paren_math, placeholder)).parse(input)
}

/// Turns `\$` into `$`. An escaped backslash `\\` is kept as is and does not escape what follows
fn unescape_dollars(source: &str) -> String {
    let mut text = String::with_capacity(source.len());
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.next() {
            Some('$') => text.push('$'),
            Some(next) => {
                text.push(c);
                text.push(next);
            }
            None => text.push(c),
        }
    }
    text
}

fn flush<'source>(segments: &mut Vec<Segment<'source>>, source: &'source str) {
    if source.is_empty() {
        return;
    }
    let text: Tx = if source.contains("\\$") {
        unescape_dollars(source).into()
    } else {
        source.into()
    };
    segments.push(Segment {
        source: source.into(),
        token: Token::PlainText { text },
    });
}

/// Splits a text field into plain text, math and placeholder segments.
///
/// Nothing is ever lost: concatenating `source` of all the segments gives back the input.
/// Unmatched delimiters simply stay in the text.
pub fn segment(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    // start of text that was not yet flushed
    let mut flushed = 0;
    let mut cursor = 0;
    while let Some(c) = text[cursor..].chars().next() {
        let rest = &text[cursor..];
        // `\\` is a backslash on its own, `\$` is a literal dollar
        if rest.starts_with("\\\\") || rest.starts_with("\\$") {
            cursor += 2;
            continue;
        }
        if matches!(c, '$' | '\\' | '{') {
            if let Ok((after, token)) = inline_token::<nom::error::Error<&str>>(rest) {
                let consumed = rest.len() - after.len();
                flush(&mut segments, &text[flushed..cursor]);
                segments.push(Segment {
                    source: rest[..consumed].into(),
                    token,
                });
                cursor += consumed;
                flushed = cursor;
                continue;
            }
        }
        cursor += c.len_utf8();
    }
    flush(&mut segments, &text[flushed..]);
    segments
}
