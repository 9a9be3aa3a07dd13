use std::{borrow::Cow, fmt::Display};

// Tokens borrow from the (normalized) generated text wherever possible.
// Only multi-line display math and unescaped text ever need to own their data.
pub(crate) type Tx<'source> = Cow<'source, str>;

/// Number of working lines drawn when `{working}` does not say otherwise
pub const DEFAULT_WORKING_LINES: u32 = 8;

/// Upper bound on working lines of a single placeholder; larger counts are clamped to it
pub const MAX_WORKING_LINES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

impl Display for OptionLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Delimiter family of a display math block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MathDelimiter {
    /// `$$ ... $$`
    Dollars,
    /// `\[ ... \]`
    Brackets,
}

impl MathDelimiter {
    pub fn opening(self) -> &'static str {
        match self {
            Self::Dollars => "$$",
            Self::Brackets => "\\[",
        }
    }

    pub fn closing(self) -> &'static str {
        match self {
            Self::Dollars => "$$",
            Self::Brackets => "\\]",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Token<'source> {
    SectionHeader {
        title: Tx<'source>,
        subtitle: Option<Tx<'source>>,
    },
    QuestionHeader {
        number: Tx<'source>,
        stem: Tx<'source>,
    },
    McqOption {
        letter: OptionLetter,
        text: Tx<'source>,
    },
    MarksAnnotation {
        count: u32,
    },
    DisplayMath {
        expression: Tx<'source>,
    },
    InlineMath {
        expression: Tx<'source>,
    },
    GraphPlaceholder,
    WorkingPlaceholder {
        line_count: u32,
    },
    AnswerBoxPlaceholder,
    PlainText {
        text: Tx<'source>,
    },
    MarkdownHeading {
        // 1..=6
        level: u8,
        text: Tx<'source>,
    },
    InstructionNote {
        kind: Tx<'source>,
        text: Tx<'source>,
    },
}

impl<'source> Token<'source> {
    pub fn text(text: impl Into<Tx<'source>>) -> Self {
        Self::PlainText { text: text.into() }
    }

    /// The free-text field of this token that is subject to inline segmentation, if any
    pub fn segmented_field(&self) -> Option<&Tx<'source>> {
        match self {
            Token::SectionHeader { subtitle, .. } => subtitle.as_ref(),
            Token::QuestionHeader { stem, .. } => Some(stem),
            Token::McqOption { text, .. }
            | Token::PlainText { text }
            | Token::MarkdownHeading { text, .. }
            | Token::InstructionNote { text, .. } => Some(text),
            Token::MarksAnnotation { .. }
            | Token::DisplayMath { .. }
            | Token::InlineMath { .. }
            | Token::GraphPlaceholder
            | Token::WorkingPlaceholder { .. }
            | Token::AnswerBoxPlaceholder => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(
            self,
            Token::GraphPlaceholder | Token::WorkingPlaceholder { .. } | Token::AnswerBoxPlaceholder
        )
    }

    /// Short name of the variant, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Token::SectionHeader { .. } => "section header",
            Token::QuestionHeader { .. } => "question header",
            Token::McqOption { .. } => "mcq option",
            Token::MarksAnnotation { .. } => "marks",
            Token::DisplayMath { .. } => "display math",
            Token::InlineMath { .. } => "inline math",
            Token::GraphPlaceholder => "graph",
            Token::WorkingPlaceholder { .. } => "working",
            Token::AnswerBoxPlaceholder => "answer box",
            Token::PlainText { .. } => "plain text",
            Token::MarkdownHeading { .. } => "markdown heading",
            Token::InstructionNote { .. } => "instruction note",
        }
    }
}

/// Display label of a marks annotation.
///
/// Singular is only used for exactly one mark, so `0` renders as `[0 marks]`.
pub fn marks_label(count: u32) -> String {
    if count == 1 {
        "[1 mark]".to_string()
    } else {
        format!("[{count} marks]")
    }
}

/// A piece of a text field, as produced by the inline segmenter.
///
/// `source` is always the exact slice the segment was produced from,
/// so concatenating sources of all segments gives back the original field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment<'source> {
    pub source: Tx<'source>,
    pub token: Token<'source>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "block", rename_all = "snake_case"))]
pub enum Block<'source> {
    /// Visual gap left by blank lines between two pieces of content
    Spacing,
    Token {
        token: Token<'source>,
        // empty for tokens without a free-text field
        segments: Vec<Segment<'source>>,
        // 1-based, first source line of the block
        line: usize,
    },
}

impl<'source> Block<'source> {
    pub fn token(&self) -> Option<&Token<'source>> {
        match self {
            Block::Spacing => None,
            Block::Token { token, .. } => Some(token),
        }
    }

    pub fn is_question_header(&self) -> bool {
        matches!(self.token(), Some(Token::QuestionHeader { .. }))
    }

    pub fn is_section_header(&self) -> bool {
        matches!(self.token(), Some(Token::SectionHeader { .. }))
    }

    pub fn is_option(&self) -> bool {
        matches!(self.token(), Some(Token::McqOption { .. }))
    }

    /// Blocks that may sit inside a run of options without ending it
    pub fn is_pass_through(&self) -> bool {
        match self {
            Block::Spacing => true,
            Block::Token { token, .. } => token.is_placeholder(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "item", rename_all = "snake_case"))]
pub enum GroupItem<'source> {
    Block { block: Block<'source> },
    /// A contiguous run of options (with pass-through placeholders between them), laid out together
    Options { blocks: Vec<Block<'source>> },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QuestionGroup<'source> {
    /// Always a `QuestionHeader` block
    pub header: Block<'source>,
    pub items: Vec<GroupItem<'source>>,
}

impl<'source> QuestionGroup<'source> {
    /// All blocks of the group in document order, header first
    pub fn blocks(&self) -> impl Iterator<Item = &Block<'source>> {
        std::iter::once(&self.header).chain(self.items.iter().flat_map(|item| match item {
            GroupItem::Block { block } => std::slice::from_ref(block).iter(),
            GroupItem::Options { blocks } => blocks.iter(),
        }))
    }

    pub fn has_options(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, GroupItem::Options { .. }))
    }

    pub fn marks(&self) -> u32 {
        self.blocks()
            .filter_map(|block| match block.token() {
                Some(Token::MarksAnnotation { count }) => Some(*count),
                _ => None,
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "element", rename_all = "snake_case"))]
pub enum Element<'source> {
    Block { block: Block<'source> },
    Group { group: QuestionGroup<'source> },
}

/// An element of the final document, with the hints the print surface needs
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Placed<'source> {
    pub element: Element<'source>,
    /// Element must start on a fresh page
    pub page_break_before: bool,
    /// Element must not be split across pages
    pub keep_together: bool,
}

/// Problems in the markup that were absorbed while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParseWarning {
    /// Display math opened on `line` was never closed; its lines were kept as plain text
    UnterminatedDisplayMath { line: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DocumentStats {
    pub sections: usize,
    pub questions: usize,
    pub mcq_questions: usize,
    pub short_answer_questions: usize,
    pub total_marks: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderedDocument<'source> {
    pub elements: Vec<Placed<'source>>,
    pub stats: DocumentStats,
    pub warnings: Vec<ParseWarning>,
}

/// Result of handing generated text to the pipeline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "outcome", rename_all = "snake_case"))]
pub enum RenderOutcome<'source> {
    /// Provider produced no text at all; nothing to render
    Empty,
    Document { document: RenderedDocument<'source> },
}

impl<'source> RenderOutcome<'source> {
    pub fn document(&self) -> Option<&RenderedDocument<'source>> {
        match self {
            RenderOutcome::Empty => None,
            RenderOutcome::Document { document } => Some(document),
        }
    }
}

pub trait ToStaticExt {
    type AsStatic;
    fn to_static(&self) -> Self::AsStatic;
}

impl ToStaticExt for Cow<'_, str> {
    type AsStatic = Cow<'static, str>;

    fn to_static(&self) -> Self::AsStatic {
        Cow::Owned(self.to_string())
    }
}

impl<T: ToStaticExt> ToStaticExt for Option<T> {
    type AsStatic = Option<T::AsStatic>;

    fn to_static(&self) -> Self::AsStatic {
        self.as_ref().map(T::to_static)
    }
}

impl<T: ToStaticExt> ToStaticExt for Vec<T> {
    type AsStatic = Vec<T::AsStatic>;

    fn to_static(&self) -> Self::AsStatic {
        self.iter().map(T::to_static).collect()
    }
}

impl ToStaticExt for Token<'_> {
    type AsStatic = Token<'static>;

    fn to_static(&self) -> Self::AsStatic {
        match self {
            Token::SectionHeader { title, subtitle } => Token::SectionHeader {
                title: title.to_static(),
                subtitle: subtitle.to_static(),
            },
            Token::QuestionHeader { number, stem } => Token::QuestionHeader {
                number: number.to_static(),
                stem: stem.to_static(),
            },
            Token::McqOption { letter, text } => Token::McqOption {
                letter: *letter,
                text: text.to_static(),
            },
            Token::MarksAnnotation { count } => Token::MarksAnnotation { count: *count },
            Token::DisplayMath { expression } => Token::DisplayMath {
                expression: expression.to_static(),
            },
            Token::InlineMath { expression } => Token::InlineMath {
                expression: expression.to_static(),
            },
            Token::GraphPlaceholder => Token::GraphPlaceholder,
            Token::WorkingPlaceholder { line_count } => Token::WorkingPlaceholder {
                line_count: *line_count,
            },
            Token::AnswerBoxPlaceholder => Token::AnswerBoxPlaceholder,
            Token::PlainText { text } => Token::PlainText {
                text: text.to_static(),
            },
            Token::MarkdownHeading { level, text } => Token::MarkdownHeading {
                level: *level,
                text: text.to_static(),
            },
            Token::InstructionNote { kind, text } => Token::InstructionNote {
                kind: kind.to_static(),
                text: text.to_static(),
            },
        }
    }
}

impl ToStaticExt for Segment<'_> {
    type AsStatic = Segment<'static>;

    fn to_static(&self) -> Self::AsStatic {
        Segment {
            source: self.source.to_static(),
            token: self.token.to_static(),
        }
    }
}

impl ToStaticExt for Block<'_> {
    type AsStatic = Block<'static>;

    fn to_static(&self) -> Self::AsStatic {
        match self {
            Block::Spacing => Block::Spacing,
            Block::Token {
                token,
                segments,
                line,
            } => Block::Token {
                token: token.to_static(),
                segments: segments.to_static(),
                line: *line,
            },
        }
    }
}

impl ToStaticExt for GroupItem<'_> {
    type AsStatic = GroupItem<'static>;

    fn to_static(&self) -> Self::AsStatic {
        match self {
            GroupItem::Block { block } => GroupItem::Block {
                block: block.to_static(),
            },
            GroupItem::Options { blocks } => GroupItem::Options {
                blocks: blocks.to_static(),
            },
        }
    }
}

impl ToStaticExt for QuestionGroup<'_> {
    type AsStatic = QuestionGroup<'static>;

    fn to_static(&self) -> Self::AsStatic {
        QuestionGroup {
            header: self.header.to_static(),
            items: self.items.to_static(),
        }
    }
}

impl ToStaticExt for Element<'_> {
    type AsStatic = Element<'static>;

    fn to_static(&self) -> Self::AsStatic {
        match self {
            Element::Block { block } => Element::Block {
                block: block.to_static(),
            },
            Element::Group { group } => Element::Group {
                group: group.to_static(),
            },
        }
    }
}

impl ToStaticExt for Placed<'_> {
    type AsStatic = Placed<'static>;

    fn to_static(&self) -> Self::AsStatic {
        Placed {
            element: self.element.to_static(),
            page_break_before: self.page_break_before,
            keep_together: self.keep_together,
        }
    }
}

impl ToStaticExt for RenderedDocument<'_> {
    type AsStatic = RenderedDocument<'static>;

    fn to_static(&self) -> Self::AsStatic {
        RenderedDocument {
            elements: self.elements.to_static(),
            stats: self.stats.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

impl ToStaticExt for RenderOutcome<'_> {
    type AsStatic = RenderOutcome<'static>;

    fn to_static(&self) -> Self::AsStatic {
        match self {
            RenderOutcome::Empty => RenderOutcome::Empty,
            RenderOutcome::Document { document } => RenderOutcome::Document {
                document: document.to_static(),
            },
        }
    }
}
