use std::num::ParseIntError;

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while, take_while_m_n},
    character::complete::{char, digit1, one_of, space0, space1},
    combinator::{all_consuming, map_opt, map_res, opt, rest},
    error::{context, ContextError, FromExternalError, ParseError},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult, Parser,
};

use crate::{
    data::{MathDelimiter, OptionLetter, Token, DEFAULT_WORKING_LINES, MAX_WORKING_LINES},
    util::regex,
};

// Line-level parsers never report anything but "did not match", so the cheapest error type is fine
type LineError<'source> = nom::error::Error<&'source str>;

/// What a single trimmed, non-blank line turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass<'source> {
    /// Line is a complete token on its own
    Token(Token<'source>),
    /// `Question N:` with nothing after the colon; stem is expected on a following line
    QuestionAwaitingStem { number: &'source str },
    /// Display math was opened, but not closed on this line
    DisplayMathOpener { delimiter: MathDelimiter },
}

/// Parses a markdown heading, like `## Heading text`
pub(crate) fn markdown_heading<
    'source,
    E: ParseError<&'source str> + ContextError<&'source str>,
>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    context(
        "markdown heading",
        tuple((take_while_m_n(1, 6, |c: char| c == '#'), space1, rest)),
    )
    .map(|(hashes, _, text): (&str, _, &str)| Token::MarkdownHeading {
        level: hashes.len() as u8,
        text: text.trim().into(),
    })
    .parse(input)
}

/// Parses `Question <digits>:` and whatever follows the colon
pub(crate) fn question_header<
    'source,
    E: ParseError<&'source str> + ContextError<&'source str>,
>(
    input: &'source str,
) -> IResult<&'source str, (&'source str, &'source str), E> {
    context(
        "question header",
        tuple((
            tag_no_case("question"),
            space1,
            digit1,
            space0,
            char(':'),
            space0,
            rest,
        )),
    )
    .map(|(_, _, number, _, _, _, stem): (_, _, &str, _, _, _, &str)| (number, stem.trim()))
    .parse(input)
}

/// Parses marks annotation, like `[3 marks]` or `[1 Mark]`
pub(crate) fn marks<
    'source,
    E: ParseError<&'source str>
        + ContextError<&'source str>
        + FromExternalError<&'source str, ParseIntError>,
>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    context(
        "marks",
        delimited(
            pair(char('['), space0),
            terminated(
                map_res(digit1, |digits: &str| digits.parse::<u32>()),
                tuple((space0, tag_no_case("mark"), opt(tag_no_case("s")), space0)),
            ),
            char(']'),
        ),
    )
    .map(|count| Token::MarksAnnotation { count })
    .parse(input)
}

/// Parses a multiple choice option, like `B. 42`
///
/// Letters are uppercase only, and there must be some space after the period.
pub(crate) fn mcq_option<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    context(
        "mcq option",
        tuple((
            map_opt(one_of("ABCD"), OptionLetter::from_char),
            char('.'),
            space1,
            rest,
        )),
    )
    .map(|(letter, _, _, text): (_, _, _, &str)| Token::McqOption {
        letter,
        text: text.trim().into(),
    })
    .parse(input)
}

/// Parses `{working}`, `{working()}` or `{working(N)}`
///
/// Anything that is not a number inside the parentheses falls back to default line count,
/// counts above [`MAX_WORKING_LINES`] are clamped.
fn working<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    context(
        "working",
        delimited(
            tag("{working"),
            opt(delimited(
                char('('),
                take_while(|c: char| c != ')' && c != '}'),
                char(')'),
            )),
            char('}'),
        ),
    )
    .map(|count: Option<&str>| Token::WorkingPlaceholder {
        line_count: count
            .and_then(|count| count.trim().parse().ok())
            .unwrap_or(DEFAULT_WORKING_LINES)
            .min(MAX_WORKING_LINES),
    })
    .parse(input)
}

/// Parses any of the placeholders: `{graph}`, `{working(N)}` or `{answer}`
pub(crate) fn placeholder<'source, E: ParseError<&'source str> + ContextError<&'source str>>(
    input: &'source str,
) -> IResult<&'source str, Token<'source>, E> {
    context(
        "placeholder",
        alt((
            tag("{graph}").map(|_| Token::GraphPlaceholder),
            tag("{answer}").map(|_| Token::AnswerBoxPlaceholder),
            working,
        )),
    )
    .parse(input)
}

/// Strips delimiter sequences left over inside of a display math expression
pub(crate) fn strip_stray_delimiters(expression: &str, delimiter: MathDelimiter) -> String {
    let stripped = match delimiter {
        MathDelimiter::Dollars => expression.replace("$$", ""),
        MathDelimiter::Brackets => expression.replace("\\[", "").replace("\\]", ""),
    };
    stripped.trim().to_string()
}

/// Detects display math closed on the very same line: `$$x$$`, `\[x\]` or the whole line being `$x$`
///
/// Returns the expression, with delimiters removed.
pub(crate) fn closed_display_math(line: &str) -> Option<&str> {
    for delimiter in [MathDelimiter::Dollars, MathDelimiter::Brackets] {
        let inner = line
            .strip_prefix(delimiter.opening())
            .and_then(|line| line.strip_suffix(delimiter.closing()));
        // `$$a$$ and $$b$$` is a line with two formulas, not one, and `$$$$` is none at all
        if let Some(inner) = inner.filter(|inner| {
            !inner.trim().is_empty()
                && !inner.contains(delimiter.opening())
                && !inner.contains(delimiter.closing())
        }) {
            return Some(inner.trim());
        }
    }
    // whole line in single dollars means "this line IS an equation"
    preceded(
        char::<_, LineError>('$'),
        terminated(take_while(|c: char| c != '$'), char('$')),
    )
    .parse(line)
    .ok()
    .filter(|(rest, inner)| rest.is_empty() && !inner.trim().is_empty())
    .map(|(_, inner)| inner.trim())
}

/// Detects display math opened, but not closed on this line
pub(crate) fn display_math_opening(line: &str) -> Option<MathDelimiter> {
    [MathDelimiter::Dollars, MathDelimiter::Brackets]
        .into_iter()
        .find(|delimiter| {
            line.strip_prefix(delimiter.opening())
                .is_some_and(|rest| !rest.contains(delimiter.closing()))
        })
}

/// Detects a section header, returning title and (non-empty) subtitle
pub(crate) fn section_header(line: &str) -> Option<Token<'_>> {
    let captures = regex!(
        r"(?i)^(section\s+[a-z0-9]+|part\s+[ivxlcdm]+|multiple\s+choice\s+questions|short\s+answer\s+questions)\s*(?::\s*(.*))?$"
    )
    .captures(line)?;
    let title = captures.get(1)?.as_str();
    let subtitle = captures
        .get(2)
        .map(|subtitle| subtitle.as_str().trim())
        .filter(|subtitle| !subtitle.is_empty());
    Some(Token::SectionHeader {
        title: title.into(),
        subtitle: subtitle.map(Into::into),
    })
}

/// Detects an instruction note, like `Note: show all working`
pub(crate) fn instruction_note(line: &str) -> Option<Token<'_>> {
    let captures =
        regex!(r"(?i)^(instructions|instruction|note|important|attention)\s*:\s*(.*)$").captures(line)?;
    Some(Token::InstructionNote {
        kind: captures.get(1)?.as_str().into(),
        text: captures.get(2).map_or("", |text| text.as_str().trim()).into(),
    })
}

fn whole<'source, O>(
    parser: impl Parser<&'source str, O, LineError<'source>>,
    line: &'source str,
) -> Option<O> {
    all_consuming(parser)(line)
        .ok()
        .map(|(_, output)| output)
}

/// Classifies a single trimmed, non-blank line.
///
/// Patterns are tried in a fixed order, first match wins:
/// markdown heading, display math, placeholder, section header, question header,
/// marks, mcq option, instruction note. Anything else is plain text.
pub fn classify(line: &str) -> LineClass<'_> {
    if let Some(heading) = whole(markdown_heading, line) {
        return LineClass::Token(heading);
    }
    if let Some(expression) = closed_display_math(line) {
        return LineClass::Token(Token::DisplayMath {
            expression: expression.into(),
        });
    }
    if let Some(delimiter) = display_math_opening(line) {
        return LineClass::DisplayMathOpener { delimiter };
    }
    if let Some(token) = whole(placeholder, line) {
        return LineClass::Token(token);
    }
    if let Some(section) = section_header(line) {
        return LineClass::Token(section);
    }
    if let Some((number, stem)) = whole(question_header, line) {
        if stem.is_empty() {
            return LineClass::QuestionAwaitingStem { number };
        }
        return LineClass::Token(Token::QuestionHeader {
            number: number.into(),
            stem: stem.into(),
        });
    }
    if let Some(annotation) = whole(marks, line) {
        return LineClass::Token(annotation);
    }
    if let Some(option) = whole(mcq_option, line) {
        return LineClass::Token(option);
    }
    if let Some(note) = instruction_note(line) {
        return LineClass::Token(note);
    }
    LineClass::Token(Token::text(line))
}
