//! Grading prompt construction
//!
//! One multi-turn conversation per grading attempt: the submission first,
//! then one message per criterion. Each criterion message pins the exact
//! response shape and requires the model to echo the criterion name, so the
//! parser can key response blocks by name instead of by position.

use crate::llm::Message;
use crate::model::{Assignment, CriterionExample, RubricCriterion, StudentSubmission};

/// A criterion together with its calibration examples, in prompt order
pub struct PromptCriterion {
    pub criterion: RubricCriterion,
    pub examples: Vec<CriterionExample>,
}

pub fn build_grading_prompt(
    assignment: &Assignment,
    submission: &StudentSubmission,
    criteria: &[PromptCriterion],
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(criteria.len() + 2);

    let mut opening = format!(
        "You are grading a student submission for the assignment: \"{}\".",
        assignment.title
    );
    if let Some(instructions) = &assignment.instructions {
        opening.push_str(&format!(" Assignment instructions: {}", instructions));
    }
    opening.push_str(&format!(
        " Here's the submission content: \"{}\"",
        submission.content
    ));
    messages.push(Message::user(opening));

    messages.push(Message::user(
        "I will now provide you with the grading criteria. For each criterion, \
         provide a score and detailed feedback. Respond with one block per \
         criterion, and begin every block by repeating the criterion name \
         exactly as given.",
    ));

    for entry in criteria {
        messages.push(Message::user(criterion_message(entry)));
    }

    messages
}

fn criterion_message(entry: &PromptCriterion) -> String {
    let criterion = &entry.criterion;
    let mut text = format!(
        "Criterion: {}\nDescription: {}\nMax Score: {}\n",
        criterion.name, criterion.description, criterion.max_score
    );

    for example in &entry.examples {
        text.push_str(&format!(
            "Example (score {}): \"{}\" - {}\n",
            example.example_score, example.example_text, example.example_feedback
        ));
    }

    text.push_str(&format!(
        "Respond for this criterion in the exact format:\n\
         Criterion: {}\nScore: [score]\nFeedback: [detailed feedback]",
        criterion.name
    ));
    text
}
