use tracing::debug;

use crate::{
    data::{Block, DocumentStats, Element, ParseWarning, Placed, RenderedDocument, Token},
    grouper::Grouped,
};

fn keep_together(element: &Element<'_>) -> bool {
    match element {
        Element::Group { .. } => true,
        Element::Block { block } => matches!(block.token(), Some(Token::DisplayMath { .. })),
    }
}

fn marks_of(block: &Block<'_>) -> u32 {
    match block.token() {
        Some(Token::MarksAnnotation { count }) => *count,
        _ => 0,
    }
}

impl DocumentStats {
    /// Accounts for a single element of the document
    fn count(&mut self, element: &Element<'_>) {
        match element {
            Element::Block { block } => {
                if block.is_section_header() {
                    self.sections += 1;
                }
                self.total_marks += marks_of(block);
            }
            Element::Group { group } => {
                self.questions += 1;
                if group.has_options() {
                    self.mcq_questions += 1;
                } else {
                    self.short_answer_questions += 1;
                }
                self.total_marks += group.marks();
            }
        }
    }
}

/// Builds the final document: attaches page hints and collects statistics, keeping order
pub fn assemble(grouped: Vec<Grouped<'_>>, warnings: Vec<ParseWarning>) -> RenderedDocument<'_> {
    let mut stats = DocumentStats::default();
    let elements: Vec<_> = grouped
        .into_iter()
        .map(|grouped| {
            stats.count(&grouped.element);
            Placed {
                keep_together: keep_together(&grouped.element),
                page_break_before: grouped.page_break_before,
                element: grouped.element,
            }
        })
        .collect();
    debug!(elements = elements.len(), ?stats, "assembled document");
    RenderedDocument {
        elements,
        stats,
        warnings,
    }
}
