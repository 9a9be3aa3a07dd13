use smart_default::SmartDefault;

/// Visual settings of the printed paper. Nothing here affects what the document contains
#[derive(Debug, Clone, PartialEq, SmartDefault)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Style {
    #[default = "Georgia, 'Times New Roman', serif"]
    pub font_family: String,
    #[default = 12.0]
    pub font_size_pt: f32,
    /// Css `@page` size
    #[default = "A4"]
    pub page_size: String,
    /// Distance between working lines, in px
    #[default = 30]
    pub working_line_spacing: u32,
    /// Rendered width and height of graph paper, in px
    #[default = 400]
    pub graph_size: u32,
    /// Graph paper cell, in viewBox units (the box is 600 wide)
    #[default = 20]
    pub graph_grid: u32,
    #[default = 120]
    pub answer_box_height: u32,
    /// Where `katex.min.css`, `katex.min.js` and `contrib/auto-render.min.js` are served from
    #[default = "https://cdn.jsdelivr.net/npm/katex@0.16.11/dist"]
    pub katex_url: String,
    #[default = true]
    pub cover_page: bool,
}

impl Style {
    pub fn css(&self) -> String {
        let Self {
            font_family,
            font_size_pt,
            page_size,
            answer_box_height,
            ..
        } = self;
        format!(
            r#"@page {{ size: {page_size}; margin: 20mm 18mm 25mm; }}
body {{ font-family: {font_family}; font-size: {font_size_pt}pt; line-height: 1.5; color: #111; margin: 0 auto; max-width: 190mm; }}
.page-break-before {{ break-before: page; page-break-before: always; }}
.page-break-after {{ break-after: page; page-break-after: always; }}
.avoid-break {{ break-inside: avoid; page-break-inside: avoid; }}
.cover-title {{ text-align: center; border-bottom: 4px solid #1f2937; padding-bottom: 1.5em; margin-bottom: 2em; }}
.cover-details {{ width: 100%; border: 2px solid #1f2937; padding: 1em; margin-bottom: 2em; }}
.cover-details th {{ text-align: left; }}
.candidate, .instructions {{ border: 2px solid #1f2937; padding: 1em; margin-bottom: 2em; }}
.candidate h3, .instructions h3 {{ text-align: center; }}
.candidate-line {{ display: flex; margin: 0.8em 0; }}
.candidate-line span {{ width: 8em; font-weight: 600; }}
.candidate-line div {{ flex: 1; border-bottom: 2px solid #1f2937; }}
.section-header {{ text-transform: uppercase; border-bottom: 2px solid #1f2937; }}
.question {{ margin: 1.2em 0; }}
.question-header {{ font-size: 1.05em; margin-bottom: 0.4em; }}
.question-number {{ font-weight: bold; }}
.options {{ margin: 0.5em 0 0.5em 1.5em; }}
.option-letter {{ font-weight: bold; }}
.marks {{ text-align: right; font-style: italic; }}
.note {{ background: #f9fafb; padding: 0.5em; }}
.spacing {{ height: 1em; }}
.answer-box {{ border: 2px solid #111; height: {answer_box_height}px; position: relative; margin: 0.5em 0; }}
.answer-label {{ position: absolute; top: 4px; left: 8px; font-size: 0.8em; }}
.graph {{ text-align: center; }}
.graph figcaption {{ font-size: 0.75em; color: #6b7280; }}
.graph .grid {{ stroke: #e5e7eb; stroke-width: 0.5; }}
.graph .axis {{ stroke: #374151; stroke-width: 1.5; }}
.graph .frame {{ fill: none; stroke: #374151; stroke-width: 2; }}
.working {{ display: block; background: white; }}
.working line {{ stroke: black; stroke-width: 1; }}
.print-footer {{ display: none; }}
@media print {{
  .print-footer {{ display: flex; justify-content: space-between; position: fixed; bottom: 0; left: 0; right: 0; border-top: 2px solid black; padding: 0.5em; font-size: 0.75em; background: white; }}
  .page-number::after {{ content: "Page " counter(page); }}
}}
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_uses_style() {
        let style = Style {
            font_size_pt: 14.0,
            answer_box_height: 90,
            ..Default::default()
        };
        let css = style.css();
        assert!(css.contains("font-size: 14pt"));
        assert!(css.contains("height: 90px"));
        assert!(css.contains("size: A4"));
    }
}
