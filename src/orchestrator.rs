//! Requesting a title and an exam body, in parallel.
//!
//! Each request fails on its own: a title may arrive while the body fails, and the other way around.
//! Every run holds a [`Ticket`]; once a newer ticket is issued, results of the older run are discarded.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, warn};

use crate::{
    config::{ExamConfig, InputError},
    data::RenderOutcome,
    provider::{Attachment, GenerationRequest, TextProvider},
};

pub const EXAM_FAILURE: &str = "Failed to generate exam. Please check your API key and try again.";
pub const TITLE_FAILURE: &str = "Failed to generate title. Please check your API key and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleState {
    Ready(String),
    /// Provider answered with nothing usable
    Empty,
    Failed(String),
}

impl TitleState {
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Ready(title) => Some(title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyState {
    /// Generated markup, not rendered yet
    Generated(String),
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub title: TitleState,
    pub body: BodyState,
}

impl Generation {
    /// Rendered body, or `None` if the body request failed
    pub fn render(&self) -> Option<RenderOutcome<'_>> {
        match &self.body {
            BodyState::Generated(text) => Some(crate::render(text)),
            BodyState::Empty => Some(RenderOutcome::Empty),
            BodyState::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A newer run was started meanwhile; results were dropped
    Superseded,
    Generation(Generation),
}

#[derive(Debug)]
pub struct Orchestrator<P> {
    provider: P,
    latest: AtomicU64,
}

impl<P: TextProvider> Orchestrator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            latest: AtomicU64::new(0),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Issues a new ticket. Any run holding an older one becomes stale
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Validates the config, then asks for the title and the body at the same time.
    ///
    /// Invalid input is rejected before the provider is contacted.
    pub fn run(
        &self,
        ticket: Ticket,
        config: &ExamConfig,
        attachments: impl IntoIterator<Item = Attachment>,
    ) -> Result<Outcome, InputError> {
        config.validate()?;
        if !self.is_current(ticket) {
            info!("Run {} superseded before it started", ticket.0);
            return Ok(Outcome::Superseded);
        }

        let title_request = GenerationRequest::title(config);
        let exam_request = GenerationRequest::exam(config, attachments);
        info!(
            "Run {}: requesting title from {} and exam from {}",
            ticket.0, title_request.model, exam_request.model
        );

        let (title, body) = rayon::join(
            || self.provider.generate(&title_request),
            || self.provider.generate(&exam_request),
        );

        if !self.is_current(ticket) {
            info!("Run {} superseded, discarding its results", ticket.0);
            return Ok(Outcome::Superseded);
        }

        let title = match title {
            Ok(Some(title)) if !title.trim().is_empty() => TitleState::Ready(title.trim().to_string()),
            Ok(_) => TitleState::Empty,
            Err(err) => {
                warn!("Title request failed: {err}");
                TitleState::Failed(TITLE_FAILURE.to_string())
            }
        };
        let body = match body {
            Ok(Some(text)) if !text.trim().is_empty() => BodyState::Generated(text),
            Ok(_) => BodyState::Empty,
            Err(err) => {
                warn!("Exam request failed: {err}");
                BodyState::Failed(EXAM_FAILURE.to_string())
            }
        };
        info!(
            "Run {} finished: title {}, body {}",
            ticket.0,
            state_name(matches!(title, TitleState::Ready(_)), matches!(title, TitleState::Empty)),
            state_name(matches!(body, BodyState::Generated(_)), matches!(body, BodyState::Empty)),
        );
        Ok(Outcome::Generation(Generation { title, body }))
    }

    /// Starts and runs a fresh request in one go
    pub fn generate(
        &self,
        config: &ExamConfig,
        attachments: impl IntoIterator<Item = Attachment>,
    ) -> Result<Outcome, InputError> {
        let ticket = self.begin();
        self.run(ticket, config, attachments)
    }
}

fn state_name(ready: bool, empty: bool) -> &'static str {
    match (ready, empty) {
        (true, _) => "ready",
        (_, true) => "empty",
        _ => "failed",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::provider::{CannedProvider, ProviderError, RequestKind};

    fn config() -> ExamConfig {
        ExamConfig::new("Trigonometry", "key")
    }

    #[test]
    fn both_succeed() {
        let orchestrator = Orchestrator::new(CannedProvider::new(
            "  Trigonometry Basics\n",
            "Question 1: Find $\\sin 0$\n[1 mark]",
        ));

        let outcome = orchestrator.generate(&config(), None).expect("Input is valid");

        let Outcome::Generation(generation) = outcome else {
            panic!("Should not be superseded");
        };
        assert_eq!(generation.title.title(), Some("Trigonometry Basics"));
        let rendered = generation.render().expect("Body should be present");
        let document = rendered.document().expect("Body is not empty");
        assert_eq!(document.stats.questions, 1);
        assert_eq!(document.stats.total_marks, 1);
    }

    #[test]
    fn failures_are_independent() {
        let orchestrator = Orchestrator::new(CannedProvider {
            title: Err("bad key".to_string()),
            ..CannedProvider::new("", "Question 1: Why?")
        });

        let outcome = orchestrator.generate(&config(), None).expect("Input is valid");

        let Outcome::Generation(generation) = outcome else {
            panic!("Should not be superseded");
        };
        assert_eq!(generation.title, TitleState::Failed(TITLE_FAILURE.to_string()));
        assert!(matches!(generation.body, BodyState::Generated(_)));
    }

    #[test]
    fn empty_body() {
        let orchestrator = Orchestrator::new(CannedProvider {
            exam: Ok(None),
            ..CannedProvider::new("Title", "")
        });

        let Ok(Outcome::Generation(generation)) = orchestrator.generate(&config(), None) else {
            panic!("Should produce a generation");
        };
        assert_eq!(generation.body, BodyState::Empty);
        assert_eq!(generation.render(), Some(RenderOutcome::Empty));
    }

    #[test]
    fn body_failure_message() {
        let orchestrator = Orchestrator::new(CannedProvider {
            exam: Err("quota".to_string()),
            ..CannedProvider::new("Title", "")
        });

        let Ok(Outcome::Generation(generation)) = orchestrator.generate(&config(), None) else {
            panic!("Should produce a generation");
        };
        assert_eq!(generation.body, BodyState::Failed(EXAM_FAILURE.to_string()));
        assert_eq!(generation.render(), None);
        assert_eq!(generation.title.title(), Some("Title"));
    }

    struct Counting(AtomicUsize);

    impl TextProvider for Counting {
        fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ProviderError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Some(match request.kind {
                RequestKind::Title => "Title".to_string(),
                RequestKind::Exam => "Question 1: Why?".to_string(),
            }))
        }
    }

    #[test]
    fn invalid_input_never_reaches_provider() {
        let orchestrator = Orchestrator::new(Counting(AtomicUsize::new(0)));

        let result = orchestrator.generate(&ExamConfig::new("", "key"), None);

        assert_eq!(result, Err(InputError::MissingTopic));
        assert_eq!(orchestrator.provider().0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stale_run_is_discarded() {
        let orchestrator = Orchestrator::new(Counting(AtomicUsize::new(0)));
        let stale = orchestrator.begin();
        let fresh = orchestrator.begin();

        assert_eq!(
            orchestrator.run(stale, &config(), None),
            Ok(Outcome::Superseded)
        );
        assert!(matches!(
            orchestrator.run(fresh, &config(), None),
            Ok(Outcome::Generation(_))
        ));
        assert_eq!(orchestrator.provider().0.load(Ordering::SeqCst), 2);
    }
}
