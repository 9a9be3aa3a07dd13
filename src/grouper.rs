use tracing::debug;

use crate::data::{Block, Element, GroupItem, QuestionGroup};

/// An element of the document, with the page boundary flag signalled by grouping
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<'source> {
    pub element: Element<'source>,
    /// Every section header but the first starts a fresh page
    pub page_break_before: bool,
}

#[derive(Debug)]
enum State<'source> {
    Scanning,
    InQuestionGroup {
        group: QuestionGroup<'source>,
        // currently open run of options, if any
        options: Option<Vec<Block<'source>>>,
    },
}

/// Closes a run of options. Pass-through blocks after the last option are not part of the run
fn finish_run<'source>(items: &mut Vec<GroupItem<'source>>, mut blocks: Vec<Block<'source>>) {
    let options_end = blocks
        .iter()
        .rposition(Block::is_option)
        .map_or(0, |last| last + 1);
    let trailing = blocks.split_off(options_end);
    items.push(GroupItem::Options { blocks });
    items.extend(trailing.into_iter().map(|block| GroupItem::Block { block }));
}

struct Grouper<'source> {
    state: State<'source>,
    sections: usize,
    out: Vec<Grouped<'source>>,
}

impl<'source> Grouper<'source> {
    fn new() -> Self {
        Self {
            state: State::Scanning,
            sections: 0,
            out: Vec::new(),
        }
    }

    fn bare(&mut self, block: Block<'source>, page_break_before: bool) {
        self.out.push(Grouped {
            element: Element::Block { block },
            page_break_before,
        });
    }

    fn close(&mut self) {
        let State::InQuestionGroup { mut group, options } =
            std::mem::replace(&mut self.state, State::Scanning)
        else {
            return;
        };
        if let Some(blocks) = options {
            finish_run(&mut group.items, blocks);
        }
        // spacing after the last block belongs between elements, not inside the group
        let mut trailing = 0;
        while let Some(GroupItem::Block {
            block: Block::Spacing,
        }) = group.items.last()
        {
            group.items.pop();
            trailing += 1;
        }
        debug!(
            items = group.items.len(),
            has_options = group.has_options(),
            "closed question group"
        );
        self.out.push(Grouped {
            element: Element::Group { group },
            page_break_before: false,
        });
        for _ in 0..trailing {
            self.bare(Block::Spacing, false);
        }
    }

    fn feed(&mut self, block: Block<'source>) {
        if block.is_question_header() {
            self.close();
            self.state = State::InQuestionGroup {
                group: QuestionGroup {
                    header: block,
                    items: Vec::new(),
                },
                options: None,
            };
            return;
        }
        if block.is_section_header() {
            self.close();
            let page_break_before = self.sections > 0;
            self.sections += 1;
            self.bare(block, page_break_before);
            return;
        }
        match &mut self.state {
            State::Scanning => self.bare(block, false),
            State::InQuestionGroup { group, options } => match options {
                Some(blocks) if block.is_option() || block.is_pass_through() => blocks.push(block),
                None if block.is_option() => *options = Some(vec![block]),
                _ => {
                    if let Some(blocks) = options.take() {
                        finish_run(&mut group.items, blocks);
                    }
                    group.items.push(GroupItem::Block { block });
                }
            },
        }
    }
}

/// Partitions blocks into question groups and bare blocks, keeping document order
pub fn group<'source>(blocks: impl IntoIterator<Item = Block<'source>>) -> Vec<Grouped<'source>> {
    let mut grouper = Grouper::new();
    for block in blocks {
        grouper.feed(block);
    }
    grouper.close();
    grouper.out
}
