use std::collections::BTreeMap;

use serde::Serialize;

use crate::assembly::assembler::{FormItem, TestForm};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionDifferences {
    pub question_order_changes: BTreeMap<char, usize>,
    pub choice_order_changes: BTreeMap<char, usize>,
    pub total_differences: usize,
}

/// Position-by-position comparison of every form against the first one.
///
/// Option order is compared between whatever items share a position, so a
/// position holding a different multiple-choice question usually counts in both
/// maps.
pub fn analyze_differences(versions: &[TestForm]) -> VersionDifferences {
    let Some((baseline, others)) = versions.split_first() else {
        return VersionDifferences::default();
    };

    let mut differences = VersionDifferences::default();
    for form in others {
        let positions = baseline.items.len().max(form.items.len());
        let mut question_changes = 0;
        let mut choice_changes = 0;

        for position in 0..positions {
            let (base_item, item) = (baseline.items.get(position), form.items.get(position));
            match (base_item, item) {
                (Some(base_item), Some(item)) => {
                    if base_item.source_question_id != item.source_question_id {
                        question_changes += 1;
                    }
                    if choices_reordered(base_item, item) {
                        choice_changes += 1;
                    }
                }
                _ => question_changes += 1,
            }
        }

        differences.question_order_changes.insert(form.label, question_changes);
        differences.choice_order_changes.insert(form.label, choice_changes);
        differences.total_differences += question_changes + choice_changes;
    }

    differences
}

fn choices_reordered(base_item: &FormItem, item: &FormItem) -> bool {
    if !(base_item.is_mcq() && item.is_mcq()) {
        return false;
    }
    match (base_item.choice_texts(), item.choice_texts()) {
        (Some(base_texts), Some(texts)) => base_texts != texts,
        _ => false,
    }
}
