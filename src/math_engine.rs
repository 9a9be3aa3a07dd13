use std::fmt::Write;

/// How a formula is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    /// Within a line of text
    Inline,
    /// On its own line, centered
    Display,
}

/// Turns a math expression into something the print surface can display.
///
/// Typesetting itself is not done here: implementations hand the expression off to whatever does it.
pub trait MathEngine {
    type Error: std::error::Error + Send + Sync + 'static;

    fn render<W: Write + ?Sized>(
        &self,
        output: &mut W,
        expression: &str,
        mode: MathMode,
    ) -> Result<(), Self::Error>;
}

impl<E: MathEngine + ?Sized> MathEngine for &E {
    type Error = E::Error;

    fn render<W: Write + ?Sized>(
        &self,
        output: &mut W,
        expression: &str,
        mode: MathMode,
    ) -> Result<(), Self::Error> {
        (**self).render(output, expression, mode)
    }
}

pub use primitive::Engine as PrimitiveEngine;
mod primitive {
    use std::fmt::Write;

    use super::{MathEngine, MathMode};
    use crate::util::escape_html;

    /// Leaves the expression in TeX delimiters, for KaTeX auto-render to pick up in the browser
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Engine;

    impl MathEngine for Engine {
        type Error = std::fmt::Error;

        fn render<W: Write + ?Sized>(
            &self,
            output: &mut W,
            expression: &str,
            mode: MathMode,
        ) -> Result<(), Self::Error> {
            let expression = escape_html(expression);
            match mode {
                MathMode::Inline => {
                    write!(output, "<span class=\"math inline\">\\({expression}\\)</span>")
                }
                MathMode::Display => {
                    write!(output, "<div class=\"math display\">\\[{expression}\\]</div>")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_inline() {
        let mut out = String::new();
        PrimitiveEngine
            .render(&mut out, "a<b", MathMode::Inline)
            .expect("Writing to string should not fail");
        assert_eq!(out, "<span class=\"math inline\">\\(a&lt;b\\)</span>");
    }

    #[test]
    fn primitive_display_by_ref() {
        let mut out = String::new();
        let engine = &PrimitiveEngine;
        engine
            .render(&mut out, "\\frac{1}{2}", MathMode::Display)
            .expect("Writing to string should not fail");
        assert_eq!(out, "<div class=\"math display\">\\[\\frac{1}{2}\\]</div>");
    }
}
