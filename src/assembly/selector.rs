use std::collections::HashSet;

use serde::Serialize;

use crate::assembly::question::{Question, SelectionRequirement};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub requirement: SelectionRequirement,
    pub exact: usize,
    pub relaxed: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionOutcome {
    pub questions: Vec<Question>,
    pub shortfalls: Vec<Shortfall>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementCheck {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Picks questions for each requirement in order, never reusing an id.
pub fn select(pool: &[Question], requirements: &[SelectionRequirement]) -> Vec<Question> {
    select_detailed(pool, requirements).questions
}

/// Like [`select`], additionally recording how each requirement was filled.
///
/// Exact matches (topic, Bloom level, difficulty) are taken first in pool order;
/// a shortfall is then filled from the same topic and Bloom level at any
/// difficulty. Whatever is still missing stays missing.
pub fn select_detailed(pool: &[Question], requirements: &[SelectionRequirement]) -> SelectionOutcome {
    let mut taken: HashSet<&str> = HashSet::new();
    let mut outcome = SelectionOutcome::default();

    for requirement in requirements {
        let exact = take_matching(pool, &mut taken, requirement.count, |question| {
            requirement.matches_exactly(question)
        });
        let exact_count = exact.len();
        outcome.questions.extend(exact);

        let shortfall = requirement.count - exact_count;
        if shortfall == 0 {
            continue;
        }

        let relaxed = take_matching(pool, &mut taken, shortfall, |question| {
            requirement.matches_relaxed(question)
        });
        let relaxed_count = relaxed.len();
        outcome.questions.extend(relaxed);

        let missing = shortfall - relaxed_count;
        tracing::debug!(
            topic = %requirement.topic,
            bloom_level = requirement.bloom_level.as_str(),
            difficulty = requirement.difficulty.as_str(),
            requested = requirement.count,
            exact = exact_count,
            relaxed = relaxed_count,
            missing,
            "requirement not fully met by exact matches"
        );
        outcome.shortfalls.push(Shortfall {
            requirement: requirement.clone(),
            exact: exact_count,
            relaxed: relaxed_count,
            missing,
        });
    }

    outcome
}

fn take_matching<'a>(
    pool: &'a [Question],
    taken: &mut HashSet<&'a str>,
    limit: usize,
    predicate: impl Fn(&Question) -> bool,
) -> Vec<Question> {
    let mut picked = Vec::new();
    for question in pool {
        if picked.len() == limit {
            break;
        }
        if taken.contains(question.id.as_str()) || !predicate(question) {
            continue;
        }
        taken.insert(question.id.as_str());
        picked.push(question.clone());
    }
    picked
}

/// Exact-match supply check, without relaxation or cross-requirement dedup.
pub fn validate_requirements(
    pool: &[Question],
    requirements: &[SelectionRequirement],
) -> RequirementCheck {
    let issues = requirements
        .iter()
        .filter_map(|requirement| {
            let have =
                pool.iter().filter(|question| requirement.matches_exactly(question)).count();
            (have < requirement.count).then(|| {
                format!(
                    "Insufficient questions for {} - {} - {}: need {}, have {}",
                    requirement.topic,
                    requirement.bloom_level.as_str(),
                    requirement.difficulty.as_str(),
                    requirement.count,
                    have
                )
            })
        })
        .collect::<Vec<_>>();

    RequirementCheck { valid: issues.is_empty(), issues }
}
