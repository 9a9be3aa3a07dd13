use std::borrow::Cow;

use tracing::{debug, warn};

use crate::{
    data::{Block, MathDelimiter, ParseWarning, Segment, ToStaticExt, Token},
    grammar::{classify, strip_stray_delimiters, LineClass},
    inline::segment,
};

/// Output of the line classifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lexed<'source> {
    pub blocks: Vec<Block<'source>>,
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug)]
enum State<'source> {
    Scanning,
    AccumulatingDisplayMath {
        delimiter: MathDelimiter,
        // 1-based number of the opener line
        start: usize,
        // raw lines, opener included
        buffer: Vec<&'source str>,
    },
}

struct Lexer<'source> {
    lines: Vec<&'source str>,
    cursor: usize,
    state: State<'source>,
    // there were blank lines since the last emitted block
    pending_spacing: bool,
    out: Lexed<'source>,
}

/// Segments of a token's free-text field
fn segments_of<'source>(token: &Token<'source>) -> Vec<Segment<'source>> {
    match token.segmented_field() {
        Some(&Cow::Borrowed(field)) => segment(field),
        Some(Cow::Owned(field)) => segment(field).to_static(),
        None => Vec::new(),
    }
}

impl<'source> Lexer<'source> {
    fn new(normalized: &'source str) -> Self {
        Self {
            lines: normalized.lines().collect(),
            cursor: 0,
            state: State::Scanning,
            pending_spacing: false,
            out: Lexed::default(),
        }
    }

    fn push(&mut self, block: Block<'source>) {
        if self.pending_spacing && !self.out.blocks.is_empty() {
            self.out.blocks.push(Block::Spacing);
        }
        self.pending_spacing = false;
        self.out.blocks.push(block);
    }

    fn emit(&mut self, token: Token<'source>, line: usize) {
        debug!(line, kind = token.kind(), "classified line");
        let segments = segments_of(&token);
        self.push(Block::Token {
            token,
            segments,
            line,
        });
    }

    /// Finds a stem for `Question N:` on the following lines.
    ///
    /// Only a line that would be plain text on its own is adopted. Blank lines before it are consumed with it.
    fn adopt_stem(&mut self) -> Option<&'source str> {
        let (offset, candidate) = self.lines[self.cursor..]
            .iter()
            .copied()
            .enumerate()
            .map(|(offset, line)| (offset, line.trim()))
            .find(|(_, line)| !line.is_empty())?;
        match classify(candidate) {
            LineClass::Token(Token::PlainText { .. }) => {
                self.cursor += offset + 1;
                Some(candidate)
            }
            _ => None,
        }
    }

    fn scan(&mut self, raw: &'source str, number: usize) -> State<'source> {
        let line = raw.trim();
        if line.is_empty() {
            self.pending_spacing = true;
            return State::Scanning;
        }
        match classify(line) {
            LineClass::Token(token) => {
                self.emit(token, number);
                State::Scanning
            }
            LineClass::QuestionAwaitingStem { number: question } => {
                let stem = self.adopt_stem().unwrap_or_default();
                debug!(line = number, question, stem, "deferred question stem");
                self.emit(
                    Token::QuestionHeader {
                        number: question.into(),
                        stem: stem.into(),
                    },
                    number,
                );
                State::Scanning
            }
            LineClass::DisplayMathOpener { delimiter } => {
                debug!(line = number, "display math opened");
                State::AccumulatingDisplayMath {
                    delimiter,
                    start: number,
                    buffer: vec![raw],
                }
            }
        }
    }

    fn close_display_math(&mut self, delimiter: MathDelimiter, start: usize, buffer: &[&str]) {
        let joined = buffer.join("\n");
        let joined = joined.trim();
        let joined = joined.strip_prefix(delimiter.opening()).unwrap_or(joined);
        let joined = joined.strip_suffix(delimiter.closing()).unwrap_or(joined);
        let expression = strip_stray_delimiters(joined, delimiter);
        self.emit(
            Token::DisplayMath {
                expression: expression.into(),
            },
            start,
        );
    }

    /// Unterminated display math keeps its lines verbatim, as plain text
    fn degrade(&mut self, start: usize, buffer: &[&'source str]) {
        warn!(line = start, "display math was never closed, keeping it as text");
        self.out
            .warnings
            .push(ParseWarning::UnterminatedDisplayMath { line: start });
        for (offset, raw) in buffer.iter().copied().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                self.pending_spacing = true;
                continue;
            }
            self.push(Block::Token {
                token: Token::text(line),
                segments: vec![Segment {
                    source: line.into(),
                    token: Token::text(line),
                }],
                line: start + offset,
            });
        }
    }

    fn run(mut self) -> Lexed<'source> {
        while let Some(&raw) = self.lines.get(self.cursor) {
            self.cursor += 1;
            let number = self.cursor;
            self.state = match std::mem::replace(&mut self.state, State::Scanning) {
                State::Scanning => self.scan(raw, number),
                State::AccumulatingDisplayMath {
                    delimiter,
                    start,
                    mut buffer,
                } => {
                    buffer.push(raw);
                    if raw.trim_end().ends_with(delimiter.closing()) {
                        self.close_display_math(delimiter, start, &buffer);
                        State::Scanning
                    } else {
                        State::AccumulatingDisplayMath {
                            delimiter,
                            start,
                            buffer,
                        }
                    }
                }
            };
        }
        if let State::AccumulatingDisplayMath { start, buffer, .. } =
            std::mem::replace(&mut self.state, State::Scanning)
        {
            self.degrade(start, &buffer);
        }
        self.out
    }
}

/// Turns normalized text into blocks, one per non-blank line
/// (multi-line display math and a question with its deferred stem count as one).
///
/// Never fails: whatever is not recognized becomes plain text.
pub fn lex(normalized: &str) -> Lexed<'_> {
    Lexer::new(normalized).run()
}
