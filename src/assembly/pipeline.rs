use std::collections::HashSet;

use serde::Serialize;

use crate::assembly::assembler::{assemble, GeneratedTest, GenerationOptions};
use crate::assembly::balance::{validate_balance, BalanceReport};
use crate::assembly::diff::{analyze_differences, VersionDifferences};
use crate::assembly::question::{Question, SelectionRequirement};
use crate::assembly::selector::{select_detailed, validate_requirements, Shortfall};

#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub requested_count: usize,
    pub selected_count: usize,
    pub issues: Vec<String>,
    pub shortfalls: Vec<Shortfall>,
    #[serde(flatten)]
    pub generated: GeneratedTest,
    pub balance: BalanceReport,
    pub differences: VersionDifferences,
}

impl GenerationReport {
    /// No requirement issue, no unfilled gap and no balance warning.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
            && self.shortfalls.iter().all(|shortfall| shortfall.missing == 0)
            && self.balance.is_balanced
    }
}

/// Select, assemble and check in one pass. With no requirements the approved part
/// of `pool` is used as the base set in input order, keeping the first question
/// for each id.
pub fn generate(
    pool: &[Question],
    requirements: &[SelectionRequirement],
    options: &GenerationOptions,
    title: &str,
) -> GenerationReport {
    let (base, issues, shortfalls, requested_count) = if requirements.is_empty() {
        let mut seen = HashSet::new();
        let approved: Vec<Question> = pool
            .iter()
            .filter(|&question| question.approved && seen.insert(question.id.as_str()))
            .cloned()
            .collect();
        let requested = approved.len();
        (approved, Vec::new(), Vec::new(), requested)
    } else {
        let check = validate_requirements(pool, requirements);
        let outcome = select_detailed(pool, requirements);
        let requested = requirements.iter().map(|requirement| requirement.count).sum::<usize>();
        (outcome.questions, check.issues, outcome.shortfalls, requested)
    };

    let generated = assemble(&base, options, title);
    let balance = validate_balance(&generated.versions);
    let differences = analyze_differences(&generated.versions);

    let missing: usize = shortfalls.iter().map(|shortfall: &Shortfall| shortfall.missing).sum();
    metrics::counter!("test_versions_generated_total").increment(generated.versions.len() as u64);
    metrics::counter!("selection_shortfall_questions_total").increment(missing as u64);
    metrics::counter!("balance_warnings_total").increment(balance.warnings.len() as u64);

    tracing::info!(
        title,
        requested = requested_count,
        selected = base.len(),
        missing,
        versions = generated.versions.len(),
        issues = issues.len(),
        balance_warnings = balance.warnings.len(),
        "generated test versions"
    );

    GenerationReport {
        requested_count,
        selected_count: base.len(),
        issues,
        shortfalls,
        generated,
        balance,
        differences,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::question::{BloomLevel, Difficulty};
    use crate::test_support::{graded, mcq, requirement};

    #[test]
    fn report_covers_every_stage() {
        let pool: Vec<Question> = (1..=6).map(|n| mcq(&format!("Q{n}"), "Math", "A")).collect();
        let report = generate(
            &pool,
            &[requirement("Math", BloomLevel::Remembering, Difficulty::Easy, 6)],
            &GenerationOptions { version_count: 2, seed: "exam1".to_string(), ..Default::default() },
            "Exam 1",
        );

        assert_eq!(report.requested_count, 6);
        assert_eq!(report.selected_count, 6);
        assert!(report.issues.is_empty());
        assert!(report.shortfalls.is_empty());
        assert_eq!(report.generated.versions.len(), 2);
        assert_eq!(report.differences.question_order_changes[&'B'], 5);
        assert!(report.is_clean());
    }

    #[test]
    fn shortfalls_are_reported_but_forms_are_still_built() {
        let pool = vec![
            graded("E1", "Physics", BloomLevel::Applying, Difficulty::Easy),
            graded("A1", "Physics", BloomLevel::Applying, Difficulty::Average),
        ];
        let report = generate(
            &pool,
            &[requirement("Physics", BloomLevel::Applying, Difficulty::Easy, 4)],
            &GenerationOptions { version_count: 3, ..Default::default() },
            "Quiz",
        );

        assert_eq!(report.requested_count, 4);
        assert_eq!(report.selected_count, 2);
        assert_eq!(
            report.issues,
            vec!["Insufficient questions for Physics - Applying - Easy: need 4, have 1"]
        );
        assert_eq!(report.shortfalls[0].missing, 2);
        assert_eq!(report.generated.versions.len(), 3);
        assert!(report.generated.versions.iter().all(|form| form.items.len() == 2));
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_requirements_use_the_approved_pool() {
        let mut pending = mcq("P1", "Math", "A");
        pending.approved = false;
        let pool = vec![mcq("Q1", "Math", "A"), pending, mcq("Q2", "Math", "B")];
        let report = generate(&pool, &[], &GenerationOptions::default(), "Quiz");
        assert_eq!(report.selected_count, 2);
        let mut ids: Vec<&str> = report.generated.versions[0]
            .items
            .iter()
            .map(|item| item.source_question_id.as_str())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["Q1", "Q2"]);
    }

    #[test]
    fn repeated_ids_appear_once_per_form() {
        let mut twin = mcq("Q1", "Math", "B");
        twin.text = "Same id, other text".to_string();
        let pool = vec![mcq("Q1", "Math", "A"), twin, mcq("Q2", "Math", "A")];
        let report = generate(
            &pool,
            &[],
            &GenerationOptions { shuffle_questions: false, version_count: 2, ..Default::default() },
            "Quiz",
        );
        assert_eq!(report.selected_count, 2);
        for form in &report.generated.versions {
            let ids: Vec<&str> =
                form.items.iter().map(|item| item.source_question_id.as_str()).collect();
            assert_eq!(ids, vec!["Q1", "Q2"]);
            assert_eq!(form.items[0].text, "Question Q1");
        }
    }
}
