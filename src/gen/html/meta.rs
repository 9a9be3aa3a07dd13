use smart_default::SmartDefault;

use crate::data::RenderedDocument;

/// Everything the cover page and the footer say about the exam as a whole
#[derive(Debug, Clone, PartialEq, SmartDefault)]
pub struct ExamMeta {
    #[default = "Examination"]
    pub title: String,
    pub topic: Option<String>,
    pub date: Option<String>,
    #[default = "2 hours"]
    pub duration: String,
    pub mcq_questions: usize,
    pub short_answer_questions: usize,
    pub total_marks: u32,
    pub calculators_permitted: bool,
}

impl ExamMeta {
    /// Collects question counts and marks from the document.
    ///
    /// If the document has no marks annotations at all, total is estimated at 2 per MCQ and 5 per short answer question.
    pub fn collect(document: &RenderedDocument<'_>) -> Self {
        let stats = &document.stats;
        let total_marks = match stats.total_marks {
            0 => (stats.mcq_questions * 2 + stats.short_answer_questions * 5) as u32,
            marks => marks,
        };
        Self {
            mcq_questions: stats.mcq_questions,
            short_answer_questions: stats.short_answer_questions,
            total_marks,
            ..Self::default()
        }
    }

    /// Blank titles are ignored
    pub fn with_title(mut self, title: impl AsRef<str>) -> Self {
        let title = title.as_ref().trim();
        if !title.is_empty() {
            self.title = title.to_string();
        }
        self
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_calculators(mut self, permitted: bool) -> Self {
        self.calculators_permitted = permitted;
        self
    }

    pub fn total_questions(&self) -> usize {
        self.mcq_questions + self.short_answer_questions
    }

    /// Half of total marks, rounded up
    pub fn pass_mark(&self) -> u32 {
        self.total_marks.div_ceil(2)
    }

    /// Numbered instructions to candidates, in order
    pub fn instructions(&self) -> Vec<String> {
        let both = self.mcq_questions > 0 && self.short_answer_questions > 0;
        let mut sections = Vec::new();
        if self.mcq_questions > 0 {
            sections.push(format!(
                "Section A: {} Multiple Choice Questions",
                self.mcq_questions
            ));
        }
        if self.short_answer_questions > 0 {
            sections.push(format!(
                "Section B: {} Short Answer Questions",
                self.short_answer_questions
            ));
        }
        let calculators = if self.calculators_permitted {
            "are"
        } else {
            "are not"
        };
        vec![
            "Write your name and student ID clearly in the spaces provided above.".to_string(),
            format!(
                "This examination consists of {} questions in {}: {}.",
                self.total_questions(),
                if both { "two sections" } else { "one section" },
                sections.join("; ")
            ),
            "Answer ALL questions in the spaces provided.".to_string(),
            "For multiple choice questions, circle the letter of your chosen answer.".to_string(),
            "Show all working for calculation questions in the designated areas.".to_string(),
            "Use only black or blue pen. Pencil may be used for diagrams only.".to_string(),
            format!("Calculators {calculators} permitted for this examination."),
            "Mobile phones and other electronic devices must be switched off.".to_string(),
            "No materials may be taken from the examination room.".to_string(),
            "Remain seated until instructed to leave.".to_string(),
        ]
    }
}
