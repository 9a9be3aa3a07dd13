pub mod html;

use std::fmt::Write;

use itertools::Itertools;

use crate::data::{Placed, RenderedDocument};

#[derive(Debug, derive_more::From, thiserror::Error)]
pub enum GenerationError {
    #[error("{}", .0)]
    IOs(std::fmt::Error),
    #[error("Failed to write the output: {}", .0)]
    Io(std::io::Error),
    #[error("Math engine failed: {}", .0)]
    Math(Box<dyn std::error::Error + Send + Sync>),
}

pub type Res = Result<(), GenerationError>;

/// Presentation adapter: writes document elements in some output format
pub trait OutputGenerator<'source, Meta, Context> {
    fn write_to<'meta, 'context, 'element, W: Write + ?Sized>(
        &self,
        output: &mut W,
        meta: &'meta Meta,
        context: &'context mut Context,
        placed: &'element Placed<'source>,
    ) -> Res
    where
        'source: 'meta + 'context + 'element;

    fn write_document_to<'meta, 'context, 'element, W: Write + ?Sized>(
        &self,
        output: &mut W,
        meta: &'meta Meta,
        context: &'context mut Context,
        document: &'element RenderedDocument<'source>,
    ) -> Res
    where
        'source: 'meta + 'context + 'element,
    {
        document
            .elements
            .iter()
            .map(|placed| self.write_to(output, meta, context, placed))
            .try_collect()
    }
}
