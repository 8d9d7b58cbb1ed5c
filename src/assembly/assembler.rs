use serde::{Deserialize, Serialize};

use crate::assembly::question::{
    BloomLevel, Choices, Difficulty, Question, QuestionType, MAX_CHOICES,
};
use crate::assembly::shuffle::shuffle;

pub const VERSION_LABELS: [char; 6] = ['A', 'B', 'C', 'D', 'E', 'F'];
pub const MAX_VERSIONS: usize = VERSION_LABELS.len();

const DEFAULT_SEED: &str = "default";

/// Answer-key text for items that carry no machine-checkable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPlaceholders {
    /// Used for essays.
    pub rubric: String,
    /// Used for everything else without a correct answer.
    pub ungraded: String,
}

impl Default for AnswerPlaceholders {
    fn default() -> Self {
        Self { rubric: "See rubric".to_string(), ungraded: "N/A".to_string() }
    }
}

impl AnswerPlaceholders {
    fn for_kind(&self, kind: QuestionType) -> &str {
        match kind {
            QuestionType::Essay => &self.rubric,
            _ => &self.ungraded,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    pub shuffle_questions: bool,
    pub shuffle_choices: bool,
    pub version_count: usize,
    pub seed: String,
    pub placeholders: AnswerPlaceholders,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            shuffle_questions: true,
            shuffle_choices: true,
            version_count: 1,
            seed: DEFAULT_SEED.to_string(),
            placeholders: AnswerPlaceholders::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormItem {
    pub position: usize,
    pub source_question_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Choices>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    pub topic: String,
    pub bloom_level: BloomLevel,
    pub difficulty: Difficulty,
}

impl FormItem {
    pub(crate) fn is_mcq(&self) -> bool {
        self.kind == QuestionType::Mcq
    }

    /// Option texts in letter order.
    pub(crate) fn choice_texts(&self) -> Option<Vec<&str>> {
        self.choices.as_ref().map(|choices| choices.values().map(String::as_str).collect())
    }
}

/// One exam form. Its permutation is reproducible from the run seed and `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestForm {
    pub label: char,
    pub title: String,
    pub items: Vec<FormItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    pub question_number: usize,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerKey {
    pub label: char,
    pub entries: Vec<AnswerKeyEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTest {
    pub versions: Vec<TestForm>,
    pub answer_keys: Vec<AnswerKey>,
}

/// Builds one to six parallel forms of `base` labelled `A`, `B`, ...
///
/// Each form is derived only from `"{seed}-{label}"`, so forms can be rebuilt
/// independently. An empty `base` yields forms without items.
pub fn assemble(base: &[Question], options: &GenerationOptions, title: &str) -> GeneratedTest {
    let count = options.version_count.clamp(1, MAX_VERSIONS);
    let (versions, answer_keys): (Vec<_>, Vec<_>) = VERSION_LABELS
        .iter()
        .take(count)
        .map(|&label| build_form(base, options, label, title))
        .unzip();

    GeneratedTest { versions, answer_keys }
}

/// A single form with the default options, labelled `label`.
pub fn assemble_one(questions: &[Question], label: char, title: &str) -> TestForm {
    build_form(questions, &GenerationOptions::default(), label, title).0
}

fn build_form(
    base: &[Question],
    options: &GenerationOptions,
    label: char,
    title: &str,
) -> (TestForm, AnswerKey) {
    let version_seed = format!("{}-{}", options.seed, label);

    let ordered = if options.shuffle_questions {
        shuffle(base, &format!("{version_seed}-order"))
    } else {
        base.to_vec()
    };

    let items = ordered
        .into_iter()
        .enumerate()
        .map(|(idx, question)| {
            let choice_seed = format!("{version_seed}-q{idx}");
            to_form_item(question, idx + 1, options.shuffle_choices.then_some(choice_seed.as_str()))
        })
        .collect::<Vec<_>>();

    let entries = items
        .iter()
        .map(|item| AnswerKeyEntry {
            question_number: item.position,
            answer: item
                .correct_answer
                .clone()
                .unwrap_or_else(|| options.placeholders.for_kind(item.kind).to_string()),
        })
        .collect();

    (
        TestForm { label, title: title.to_string(), items },
        AnswerKey { label, entries },
    )
}

fn to_form_item(question: Question, position: usize, choice_seed: Option<&str>) -> FormItem {
    let Question { id, text, kind, choices, correct_answer, topic, bloom_level, difficulty, .. } =
        question;

    let (choices, correct_answer) = match (kind, choices, choice_seed) {
        (QuestionType::Mcq, Some(choices), Some(seed)) => {
            match remap_choices(&choices, correct_answer.as_deref(), seed) {
                Some((remapped, key)) => (Some(remapped), Some(key)),
                None => {
                    tracing::warn!(
                        question_id = %id,
                        "multiple-choice key does not name a choice; options left in place"
                    );
                    (Some(choices), correct_answer)
                }
            }
        }
        (_, choices, _) => (choices, correct_answer),
    };

    FormItem {
        position,
        source_question_id: id,
        text,
        kind,
        choices,
        correct_answer,
        topic,
        bloom_level,
        difficulty,
    }
}

/// Shuffles the options and relabels them `A`, `B`, ... in their new order. The
/// returned key is the new label of the option that was correct before. `None`
/// when the current key does not name an option or there are too many options to
/// relabel.
fn remap_choices(choices: &Choices, correct: Option<&str>, seed: &str) -> Option<(Choices, String)> {
    let correct = correct?;
    if !choices.contains_key(correct) || choices.len() > MAX_CHOICES {
        return None;
    }

    let entries = choices.iter().collect::<Vec<_>>();
    let mut new_key = None;
    let mut remapped = Choices::new();
    for (label, (original_key, text)) in ('A'..).zip(shuffle(&entries, seed)) {
        if original_key == correct {
            new_key = Some(label.to_string());
        }
        remapped.insert(label.to_string(), text.clone());
    }

    new_key.map(|key| (remapped, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mcq, question};

    fn options(count: usize, seed: &str) -> GenerationOptions {
        GenerationOptions { version_count: count, seed: seed.to_string(), ..Default::default() }
    }

    fn six_mcqs() -> Vec<Question> {
        (1..=6).map(|n| mcq(&format!("Q{n}"), "Math", "A")).collect()
    }

    fn order(form: &TestForm) -> Vec<&str> {
        form.items.iter().map(|item| item.source_question_id.as_str()).collect()
    }

    #[test]
    fn labels_follow_the_fixed_sequence() {
        for count in 1..=MAX_VERSIONS {
            let generated = assemble(&six_mcqs(), &options(count, "labels"), "Quiz");
            let labels: Vec<char> = generated.versions.iter().map(|form| form.label).collect();
            assert_eq!(labels, VERSION_LABELS[..count].to_vec());
            assert_eq!(generated.answer_keys.len(), count);
        }
    }

    #[test]
    fn version_count_is_clamped() {
        let generated = assemble(&six_mcqs(), &options(9, "clamp"), "Quiz");
        assert_eq!(generated.versions.len(), MAX_VERSIONS);
    }

    #[test]
    fn zero_versions_still_builds_form_a() {
        let generated = assemble(&six_mcqs(), &options(0, "clamp"), "Quiz");
        let labels: Vec<char> = generated.versions.iter().map(|form| form.label).collect();
        assert_eq!(labels, vec!['A']);
        assert_eq!(generated.answer_keys.len(), 1);
    }

    #[test]
    fn pinned_question_order_for_exam_seed() {
        let generated = assemble(&six_mcqs(), &options(2, "exam1"), "Exam 1");
        assert_eq!(order(&generated.versions[0]), vec!["Q2", "Q1", "Q5", "Q3", "Q6", "Q4"]);
        assert_eq!(order(&generated.versions[1]), vec!["Q5", "Q2", "Q3", "Q6", "Q1", "Q4"]);
    }

    #[test]
    fn choices_are_relabelled_and_key_follows_the_text() {
        let generated = assemble(&six_mcqs(), &options(1, "exam1"), "Exam 1");
        let first = &generated.versions[0].items[0];
        // Options of Q2 are drawn in the order D, C, B, A; A was correct.
        assert_eq!(first.source_question_id, "Q2");
        assert_eq!(first.correct_answer.as_deref(), Some("D"));
        assert_eq!(first.choices.as_ref().unwrap()["A"], "Q2 option D");
        assert_eq!(first.choices.as_ref().unwrap()["D"], "Q2 option A");
        assert_eq!(generated.answer_keys[0].entries[0].answer, "D");
    }

    #[test]
    fn answer_key_points_at_original_text() {
        let pool: Vec<Question> = ["A", "B", "C", "D", "B", "C"]
            .iter()
            .enumerate()
            .map(|(n, key)| mcq(&format!("Q{n}"), "Math", key))
            .collect();
        for seed in ["s1", "s2", "s3", "another seed"] {
            let generated = assemble(&pool, &options(MAX_VERSIONS, seed), "Quiz");
            for (form, key) in generated.versions.iter().zip(&generated.answer_keys) {
                for (item, entry) in form.items.iter().zip(&key.entries) {
                    let source = pool.iter().find(|q| q.id == item.source_question_id).unwrap();
                    let original_text = &source.choices.as_ref().unwrap()
                        [source.correct_answer.as_deref().unwrap()];
                    assert_eq!(&item.choices.as_ref().unwrap()[&entry.answer], original_text);
                    assert_eq!(entry.question_number, item.position);
                }
            }
        }
    }

    #[test]
    fn without_shuffling_forms_mirror_the_input() {
        let base = six_mcqs();
        let generated = assemble(
            &base,
            &GenerationOptions {
                shuffle_questions: false,
                shuffle_choices: false,
                ..options(2, "plain")
            },
            "Quiz",
        );
        for form in &generated.versions {
            assert_eq!(order(form), vec!["Q1", "Q2", "Q3", "Q4", "Q5", "Q6"]);
            for (item, question) in form.items.iter().zip(&base) {
                assert_eq!(item.choices, question.choices);
                assert_eq!(item.correct_answer, question.correct_answer);
            }
        }
    }

    #[test]
    fn positions_are_one_based_and_contiguous() {
        let generated = assemble(&six_mcqs(), &options(3, "pos"), "Quiz");
        for form in &generated.versions {
            let positions: Vec<usize> = form.items.iter().map(|item| item.position).collect();
            assert_eq!(positions, (1..=6).collect::<Vec<_>>());
        }
    }

    #[test]
    fn empty_base_yields_empty_forms() {
        let generated = assemble(&[], &options(3, "empty"), "Quiz");
        assert_eq!(generated.versions.len(), 3);
        assert!(generated.versions.iter().all(|form| form.items.is_empty()));
        assert!(generated.answer_keys.iter().all(|key| key.entries.is_empty()));
    }

    #[test]
    fn placeholders_fill_keys_without_answers() {
        let mut short = question("S1", QuestionType::ShortAnswer, "Math");
        short.correct_answer = None;
        let essay = question("E1", QuestionType::Essay, "Math");
        let mut tf = question("T1", QuestionType::TrueFalse, "Math");
        tf.correct_answer = Some("False".to_string());

        let generated = assemble(
            &[short, essay, tf],
            &GenerationOptions { shuffle_questions: false, ..options(1, "keys") },
            "Quiz",
        );
        let answers: Vec<&str> =
            generated.answer_keys[0].entries.iter().map(|entry| entry.answer.as_str()).collect();
        assert_eq!(answers, vec!["N/A", "See rubric", "False"]);
    }

    #[test]
    fn custom_placeholders_are_used() {
        let essay = question("E1", QuestionType::Essay, "Math");
        let generated = assemble(
            &[essay],
            &GenerationOptions {
                placeholders: AnswerPlaceholders {
                    rubric: "Rubric R-2".to_string(),
                    ungraded: "-".to_string(),
                },
                ..options(1, "keys")
            },
            "Quiz",
        );
        assert_eq!(generated.answer_keys[0].entries[0].answer, "Rubric R-2");
    }

    #[test]
    fn malformed_mcq_passes_through_unshuffled() {
        let broken = mcq("Q1", "Math", "Z");
        let generated = assemble(std::slice::from_ref(&broken), &options(1, "broken"), "Quiz");
        let item = &generated.versions[0].items[0];
        assert_eq!(item.choices, broken.choices);
        assert_eq!(item.correct_answer.as_deref(), Some("Z"));
    }

    #[test]
    fn assembly_is_repeatable() {
        let base = six_mcqs();
        assert_eq!(
            assemble(&base, &options(4, "repeat"), "Quiz"),
            assemble(&base, &options(4, "repeat"), "Quiz")
        );
    }

    #[test]
    fn single_form_matches_first_version_of_default_run() {
        let base = six_mcqs();
        let single = assemble_one(&base, 'A', "Quiz");
        let full = assemble(&base, &GenerationOptions::default(), "Quiz");
        assert_eq!(single, full.versions[0]);

        let other = assemble_one(&base, 'C', "Quiz");
        assert_eq!(other.label, 'C');
        assert_eq!(other.items.len(), base.len());
    }
}
