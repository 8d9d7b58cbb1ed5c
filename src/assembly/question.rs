use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Option letter -> option text. Keys are iterated in letter order, which keeps
/// every permutation that starts from a choice map reproducible.
pub type Choices = BTreeMap<String, String>;

pub const MAX_CHOICES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[serde(alias = "multiple_choice")]
    Mcq,
    #[serde(alias = "true-false", alias = "truefalse")]
    TrueFalse,
    Essay,
    #[serde(alias = "short-answer")]
    ShortAnswer,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Essay => "essay",
            QuestionType::ShortAnswer => "short_answer",
        }
    }
}

/// Cognitive-demand categories, ordered from Remembering to Creating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloomLevel {
    #[serde(alias = "remembering")]
    Remembering,
    #[serde(alias = "understanding")]
    Understanding,
    #[serde(alias = "applying")]
    Applying,
    #[serde(alias = "analyzing")]
    Analyzing,
    #[serde(alias = "evaluating")]
    Evaluating,
    #[serde(alias = "creating")]
    Creating,
}

impl BloomLevel {
    pub const ALL: [BloomLevel; 6] = [
        BloomLevel::Remembering,
        BloomLevel::Understanding,
        BloomLevel::Applying,
        BloomLevel::Analyzing,
        BloomLevel::Evaluating,
        BloomLevel::Creating,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BloomLevel::Remembering => "Remembering",
            BloomLevel::Understanding => "Understanding",
            BloomLevel::Applying => "Applying",
            BloomLevel::Analyzing => "Analyzing",
            BloomLevel::Evaluating => "Evaluating",
            BloomLevel::Creating => "Creating",
        }
    }

    /// Difficulty band a TOS cell at this level is drawn from.
    pub fn default_difficulty(self) -> Difficulty {
        match self {
            BloomLevel::Remembering | BloomLevel::Understanding => Difficulty::Easy,
            BloomLevel::Applying | BloomLevel::Analyzing => Difficulty::Average,
            BloomLevel::Evaluating | BloomLevel::Creating => Difficulty::Difficult,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[serde(alias = "average")]
    Average,
    #[serde(alias = "difficult")]
    Difficult,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Average, Difficulty::Difficult];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Average => "Average",
            Difficulty::Difficult => "Difficult",
        }
    }
}

/// An approved (or pending) question from the bank. Read-only input to selection
/// and assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "type", alias = "question_type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub choices: Option<Choices>,
    #[serde(default, alias = "correctAnswer")]
    pub correct_answer: Option<String>,
    pub topic: String,
    #[serde(alias = "bloomLevel")]
    pub bloom_level: BloomLevel,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionShapeError {
    #[error("question id must not be empty")]
    EmptyId,
    #[error("question {id}: multiple-choice questions need at least 2 choices, got {count}")]
    TooFewChoices { id: String, count: usize },
    #[error("question {id}: at most 6 choices are supported, got {count}")]
    TooManyChoices { id: String, count: usize },
    #[error("question {id}: invalid choice label '{label}'")]
    InvalidChoiceLabel { id: String, label: String },
    #[error("question {id}: choices are only allowed on multiple-choice questions")]
    UnexpectedChoices { id: String },
    #[error("question {id}: multiple-choice questions need a correct answer")]
    MissingCorrectAnswer { id: String },
    #[error("question {id}: correct answer '{answer}' is not one of the choice keys")]
    UnknownCorrectAnswer { id: String, answer: String },
    #[error("question {id}: true/false answer must be 'True' or 'False', got '{answer}'")]
    InvalidTrueFalseAnswer { id: String, answer: String },
    #[error("question {id} appears more than once in the pool")]
    DuplicateId { id: String },
}

impl Question {
    pub fn is_mcq(&self) -> bool {
        self.kind == QuestionType::Mcq
    }

    /// Checks the invariants assembly relies on. Meant for the boundary that feeds
    /// the core; the core itself tolerates violations.
    pub fn check_shape(&self) -> Result<(), QuestionShapeError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(QuestionShapeError::EmptyId);
        }

        match self.kind {
            QuestionType::Mcq => {
                let choices = self.choices.as_ref();
                let count = choices.map(|choices| choices.len()).unwrap_or(0);
                if count < 2 {
                    return Err(QuestionShapeError::TooFewChoices { id: id.to_string(), count });
                }
                if count > MAX_CHOICES {
                    return Err(QuestionShapeError::TooManyChoices { id: id.to_string(), count });
                }
                if let Some(label) =
                    choices.into_iter().flat_map(|c| c.keys()).find(|label| !is_choice_label(label))
                {
                    return Err(QuestionShapeError::InvalidChoiceLabel {
                        id: id.to_string(),
                        label: label.clone(),
                    });
                }
                let answer = self
                    .correct_answer
                    .as_deref()
                    .ok_or_else(|| QuestionShapeError::MissingCorrectAnswer { id: id.to_string() })?;
                if !choices.is_some_and(|choices| choices.contains_key(answer)) {
                    return Err(QuestionShapeError::UnknownCorrectAnswer {
                        id: id.to_string(),
                        answer: answer.to_string(),
                    });
                }
            }
            QuestionType::TrueFalse => {
                if self.choices.is_some() {
                    return Err(QuestionShapeError::UnexpectedChoices { id: id.to_string() });
                }
                if let Some(answer) = self.correct_answer.as_deref() {
                    if !matches!(answer, "True" | "False") {
                        return Err(QuestionShapeError::InvalidTrueFalseAnswer {
                            id: id.to_string(),
                            answer: answer.to_string(),
                        });
                    }
                }
            }
            QuestionType::Essay | QuestionType::ShortAnswer => {
                if self.choices.is_some() {
                    return Err(QuestionShapeError::UnexpectedChoices { id: id.to_string() });
                }
            }
        }

        Ok(())
    }
}

/// Shape-checks every question, then rejects the first id seen twice.
pub fn check_pool(pool: &[Question]) -> Result<(), QuestionShapeError> {
    pool.iter().try_for_each(Question::check_shape)?;

    let mut seen = HashSet::new();
    match pool.iter().find(|&question| !seen.insert(question.id.as_str())) {
        Some(question) => Err(QuestionShapeError::DuplicateId { id: question.id.clone() }),
        None => Ok(()),
    }
}

fn is_choice_label(label: &str) -> bool {
    let mut chars = label.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if ch.is_ascii_uppercase())
}

/// One row of a distribution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequirement {
    pub topic: String,
    #[serde(alias = "bloomLevel")]
    pub bloom_level: BloomLevel,
    pub difficulty: Difficulty,
    pub count: usize,
}

impl SelectionRequirement {
    pub(crate) fn matches_exactly(&self, question: &Question) -> bool {
        self.matches_relaxed(question) && question.difficulty == self.difficulty
    }

    /// Same topic and Bloom level; difficulty is not considered.
    pub(crate) fn matches_relaxed(&self, question: &Question) -> bool {
        question.approved
            && question.topic == self.topic
            && question.bloom_level == self.bloom_level
    }
}
