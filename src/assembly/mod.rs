//! Deterministic multi-version test assembly.
//!
//! Everything in here is a pure function of its inputs and an explicit seed
//! string: no I/O, no clock, no ambient state. Shortfalls and imbalances come
//! back as data for the caller to act on.

pub mod assembler;
pub mod balance;
pub mod diff;
pub mod pipeline;
pub mod question;
pub mod rng;
pub mod selector;
pub mod shuffle;
pub mod tos;

pub use assembler::{
    assemble, assemble_one, AnswerKey, AnswerKeyEntry, AnswerPlaceholders, FormItem,
    GeneratedTest, GenerationOptions, TestForm, MAX_VERSIONS, VERSION_LABELS,
};
pub use balance::{validate_balance, BalanceReport};
pub use diff::{analyze_differences, VersionDifferences};
pub use pipeline::{generate, GenerationReport};
pub use question::{
    check_pool, BloomLevel, Choices, Difficulty, Question, QuestionShapeError, QuestionType,
    SelectionRequirement,
};
pub use rng::{make_rng, SeededRng};
pub use selector::{
    select, select_detailed, validate_requirements, RequirementCheck, SelectionOutcome, Shortfall,
};
pub use shuffle::shuffle;
pub use tos::{build_requirements, BloomDistribution, TosError, TosPlan, TosTopic};
