use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Context {
    pub encountered_questions: HashMap<String, usize>,
    pub inside_group: bool,
}

impl Context {
    /// Anchor id for a question header. Generated text sometimes repeats numbers, ids must stay unique
    pub fn question_id(&mut self, number: &str) -> String {
        let seen = self
            .encountered_questions
            .entry(number.to_string())
            .or_default();
        *seen += 1;
        match *seen {
            1 => format!("question-{number}"),
            n => format!("question-{number}-{n}"),
        }
    }
}
