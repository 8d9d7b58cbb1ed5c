use std::collections::BTreeSet;

use serde::Serialize;

use crate::assembly::assembler::{FormItem, TestForm};
use crate::assembly::question::Difficulty;

const MAX_TOPIC_SPREAD: usize = 1;
const MAX_DIFFICULTY_SPREAD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub is_balanced: bool,
    pub warnings: Vec<String>,
}

/// Advisory comparison of forms: equal length, topic counts within one of each
/// other, difficulty counts within two.
pub fn validate_balance(versions: &[TestForm]) -> BalanceReport {
    let mut warnings = Vec::new();

    let lengths: Vec<usize> = versions.iter().map(|form| form.items.len()).collect();
    if spread(&lengths) > 0 {
        warnings.push(format!("Versions have different question counts: {lengths:?}"));
    }

    let topics: BTreeSet<&str> = versions
        .iter()
        .flat_map(|form| form.items.iter().map(|item| item.topic.as_str()))
        .collect();
    for topic in topics {
        let counts = count_per_form(versions, |item| item.topic == topic);
        if spread(&counts) > MAX_TOPIC_SPREAD {
            warnings.push(format!(
                "Topic \"{topic}\" is unevenly distributed across versions: {counts:?}"
            ));
        }
    }

    for difficulty in Difficulty::ALL {
        let counts = count_per_form(versions, |item| item.difficulty == difficulty);
        if spread(&counts) > MAX_DIFFICULTY_SPREAD {
            warnings.push(format!(
                "Difficulty {} is unevenly distributed across versions: {counts:?}",
                difficulty.as_str()
            ));
        }
    }

    BalanceReport { is_balanced: warnings.is_empty(), warnings }
}

fn count_per_form(
    versions: &[TestForm],
    predicate: impl Fn(&FormItem) -> bool,
) -> Vec<usize> {
    versions.iter().map(|form| form.items.iter().filter(|item| predicate(*item)).count()).collect()
}

fn spread(counts: &[usize]) -> usize {
    match (counts.iter().max(), counts.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}
