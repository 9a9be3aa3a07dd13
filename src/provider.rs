//! Seam to the text-generation provider.
//!
//! The pipeline itself never talks to a provider: it receives the single text string a provider returned.
//! This module describes what is sent ([`GenerationRequest`]) and what may come back.

use std::path::Path;

use base64::Engine as _;
use tracing::warn;

use crate::config::ExamConfig;

/// Models the provider is known to serve
pub const MODELS: &[&str] = &[
    "gemma-3-27b-it",
    "gemma-3-12b-it",
    "gemma-3n-e4b-it",
    "gemma-3-4b-it",
    "gemma-3-1b-it",
    "gemini-2.5-pro",
    "gemini-2.5-flash",
];

pub const PDF_MIME: &str = "application/pdf";

/// A file sent along with the exam request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn pdf(data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime: PDF_MIME.to_string(),
            data: data.into(),
        }
    }

    pub fn read_pdf(path: impl AsRef<Path>) -> std::io::Result<Self> {
        std::fs::read(path).map(Self::pdf)
    }

    /// Payload as it travels on the wire
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Title,
    Exam,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub kind: RequestKind,
    pub prompt: String,
    pub model: String,
    pub attachment: Option<Attachment>,
}

impl GenerationRequest {
    /// Only the first attachment is sent, the rest are dropped with a warning
    pub fn exam(config: &ExamConfig, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        let mut attachments = attachments.into_iter();
        let attachment = attachments.next();
        let ignored = attachments.count();
        if ignored > 0 {
            warn!("Only the first file will be processed, {ignored} more ignored");
        }
        Self {
            kind: RequestKind::Exam,
            prompt: exam_prompt(config),
            model: config.model.clone(),
            attachment,
        }
    }

    pub fn title(config: &ExamConfig) -> Self {
        Self {
            kind: RequestKind::Title,
            prompt: title_prompt(&config.topic),
            model: config.title_model.clone(),
            attachment: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider could not be reached: {}", .0)]
    Transport(Box<dyn std::error::Error + Send + Sync>),
    #[error("Provider rejected the request: {}", .0)]
    Rejected(String),
}

/// Anything that turns a prompt into text.
///
/// `Ok(None)` means the provider answered, but with no text at all.
pub trait TextProvider: Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ProviderError>;
}

impl<P: TextProvider + ?Sized> TextProvider for &P {
    fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ProviderError> {
        (**self).generate(request)
    }
}

/// Provider with fixed answers, one per request kind. `Err` holds a rejection message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedProvider {
    pub title: Result<Option<String>, String>,
    pub exam: Result<Option<String>, String>,
}

impl CannedProvider {
    pub fn new(title: impl Into<String>, exam: impl Into<String>) -> Self {
        Self {
            title: Ok(Some(title.into())),
            exam: Ok(Some(exam.into())),
        }
    }
}

impl TextProvider for CannedProvider {
    fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ProviderError> {
        let canned = match request.kind {
            RequestKind::Title => &self.title,
            RequestKind::Exam => &self.exam,
        };
        canned.clone().map_err(ProviderError::Rejected)
    }
}

pub fn title_prompt(topic: &str) -> String {
    format!(
        r#"You are a professional educator generating clean, descriptive titles for educational resources.

Instructions:
- Create **one** clear, concise, and academically appropriate title.
- The title should reflect the topic: "{topic}".
- Use proper title casing (Capitalize Main Words).
- Do NOT include a colon, dash, or subtitle. Just a single-line title.
- Do NOT include quotation marks, explanations, or any additional text.
- Your output should only be the title. No prefixes like "Title:" or any extra content.

Topic: "{topic}"
"#
    )
}

pub fn exam_prompt(config: &ExamConfig) -> String {
    let ExamConfig {
        topic,
        mcq_count: mcq,
        short_answer_count: short,
        ..
    } = config;
    let (mcq, short) = (*mcq, *short);

    let mut prompt = format!(
        "You are an AI exam generator creating a professional, print-ready examination paper on the topic: \"{topic}\".\n\nEXAM STRUCTURE:\n"
    );
    if mcq > 0 {
        prompt.push_str(&format!("- Generate exactly {mcq} multiple choice questions (MCQs).\n"));
    }
    if short > 0 {
        prompt.push_str(&format!("- Generate exactly {short} short answer questions.\n"));
    }
    prompt.push_str(&format!("- Total questions: {}.\n", mcq + short));

    prompt.push_str("\nFORMATTING REQUIREMENTS:\n");
    match (mcq > 0, short > 0) {
        (true, true) => prompt.push_str(
            "1. Start with \"SECTION A: Multiple Choice Questions\"\n\
            2. Follow with \"SECTION B: Short Answer Questions\"\n",
        ),
        (true, false) => prompt.push_str("1. Start with \"Multiple Choice Questions\"\n"),
        (false, _) => prompt.push_str("1. Start with \"Short Answer Questions\"\n"),
    }

    prompt.push_str(
        r#"
QUESTION FORMAT:
- Each question: "Question X:" where X is the question number (1, 2, 3, etc.).
- For MCQs: Provide exactly 4 options labeled A, B, C, D on separate lines.
- For short answer: Ask clear, specific questions requiring written responses.
- Follow each question with marks in format: [X marks] where X is appropriate for difficulty.

PROFESSIONAL ELEMENTS:
- Add {working(X)} after calculation questions where X = number of marks for working space.
- Use {graph} if graph sketching or coordinate geometry is required.
- Add {answer} for questions requiring boxed final answers.
- Include "Instructions: Show all working clearly" before calculation sections.

MATH FORMATTING:
- Use LaTeX notation: $x^2 + 3x - 4 = 0$ for inline math.
- Display equations: $$\frac{dy}{dx} = 2x + 3$$ for complex expressions.
- No currency symbols; write "twenty-five dollars" instead of "$25".

MARK ALLOCATION:
- MCQ questions: 1-2 marks each
- Short answer: 3-8 marks depending on complexity
- Calculation questions: Include method marks
- Graph/diagram questions: 4-6 marks

PROFESSIONAL STANDARDS:
- Clear, unambiguous language
- Appropriate difficulty for the topic level
- Logical progression from easier to harder questions
- Real-world applications where relevant
- No answer keys or solutions provided

OUTPUT FORMAT:
- Use proper section headers
- Leave blank lines between questions
- Include mark allocations for every question
- Add working space for appropriate questions
- End with clear question numbering throughout
"#,
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mcq: u32, short: u32) -> ExamConfig {
        ExamConfig {
            mcq_count: mcq,
            short_answer_count: short,
            ..ExamConfig::new("Quadratic equations", "key")
        }
    }

    #[test]
    fn exam_prompt_sections() {
        let both = exam_prompt(&config(4, 2));
        assert!(both.contains("\"Quadratic equations\""));
        assert!(both.contains("SECTION A: Multiple Choice Questions"));
        assert!(both.contains("SECTION B: Short Answer Questions"));
        assert!(both.contains("- Total questions: 6."));

        let mcq_only = exam_prompt(&config(3, 0));
        assert!(mcq_only.contains("1. Start with \"Multiple Choice Questions\""));
        assert!(!mcq_only.contains("SECTION B"));
        assert!(!mcq_only.contains("short answer questions."));

        let short_only = exam_prompt(&config(0, 2));
        assert!(short_only.contains("1. Start with \"Short Answer Questions\""));
        assert!(!short_only.contains("(MCQs)"));
    }

    #[test]
    fn exam_prompt_structure_lines() {
        let prompt = exam_prompt(&config(4, 2));

        assert!(prompt.contains(
            "EXAM STRUCTURE:\n\
            - Generate exactly 4 multiple choice questions (MCQs).\n\
            - Generate exactly 2 short answer questions.\n\
            - Total questions: 6.\n\nFORMATTING REQUIREMENTS:\n"
        ));
    }

    #[test]
    fn exam_prompt_markup_rules() {
        let prompt = exam_prompt(&config(1, 1));
        assert!(prompt.contains("{working(X)}"));
        assert!(prompt.contains("{graph}"));
        assert!(prompt.contains("{answer}"));
        assert!(prompt.contains("$$\\frac{dy}{dx} = 2x + 3$$"));
    }

    #[test]
    fn title_request() {
        let request = GenerationRequest::title(&config(1, 1));
        assert_eq!(request.kind, RequestKind::Title);
        assert_eq!(request.model, "gemma-3-1b-it");
        assert!(request.prompt.contains("Topic: \"Quadratic equations\""));
        assert!(request.attachment.is_none());
    }

    #[test]
    fn only_first_attachment_is_sent() {
        let request = GenerationRequest::exam(
            &config(1, 1),
            [Attachment::pdf(b"first".to_vec()), Attachment::pdf(b"second".to_vec())],
        );
        assert_eq!(request.model, "gemini-2.5-flash");
        let attachment = request.attachment.expect("First attachment is kept");
        assert_eq!(attachment.data, b"first");
        assert_eq!(attachment.mime, PDF_MIME);
        assert_eq!(attachment.base64(), "Zmlyc3Q=");
    }

    #[test]
    fn canned_answers() {
        let provider = CannedProvider {
            exam: Err("quota".to_string()),
            ..CannedProvider::new("Title", "")
        };
        let title = provider
            .generate(&GenerationRequest::title(&config(1, 0)))
            .expect("Title is canned");
        assert_eq!(title.as_deref(), Some("Title"));
        let exam = provider.generate(&GenerationRequest::exam(&config(1, 0), None));
        assert!(matches!(exam, Err(ProviderError::Rejected(message)) if message == "quota"));
    }

    #[test]
    fn default_models_are_known() {
        let config = ExamConfig::default();
        assert!(MODELS.contains(&config.model.as_str()));
        assert!(MODELS.contains(&config.title_model.as_str()));
    }
}
