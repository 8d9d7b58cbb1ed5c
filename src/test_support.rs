use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::api;
use crate::assembly::{
    BloomLevel, Choices, Difficulty, FormItem, Question, QuestionType, SelectionRequirement,
    TestForm,
};
use crate::core::{config::Settings, state::AppState};

const MANAGED_ENV: &[&str] = &[
    "EXAMFORGE_HOST",
    "EXAMFORGE_PORT",
    "EXAMFORGE_LOG_LEVEL",
    "EXAMFORGE_LOG_JSON",
    "PROJECT_NAME",
    "VERSION",
    "API_V1_STR",
    "BACKEND_CORS_ORIGINS",
    "DEFAULT_VERSION_COUNT",
    "MAX_POOL_SIZE",
    "UNGRADED_ANSWER_PLACEHOLDER",
    "RUBRIC_ANSWER_PLACEHOLDER",
    "ENVIRONMENT",
];

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    for key in MANAGED_ENV {
        std::env::remove_var(key);
    }
    std::env::set_var("EXAMFORGE_ENV", "test");
    std::env::set_var("EXAMFORGE_STRICT_CONFIG", "0");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
}

pub(crate) async fn setup_test_context() -> TestContext {
    setup_test_context_with(&[]).await
}

pub(crate) async fn setup_test_context_with(overrides: &[(&str, &str)]) -> TestContext {
    let guard = env_lock().await;
    set_test_env();
    for (key, value) in overrides {
        std::env::set_var(key, value);
    }

    let settings = Settings::load().expect("settings");
    let state = AppState::new(settings);
    let app = api::router::router(state.clone());

    TestContext { state, app, _guard: guard }
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}

/// Approved four-option question at Remembering/Easy. Option `X` reads
/// `"{id} option X"`.
pub(crate) fn mcq(id: &str, topic: &str, correct: &str) -> Question {
    let choices: Choices = ["A", "B", "C", "D"]
        .iter()
        .map(|letter| (letter.to_string(), format!("{id} option {letter}")))
        .collect();
    Question {
        id: id.to_string(),
        text: format!("Question {id}"),
        kind: QuestionType::Mcq,
        choices: Some(choices),
        correct_answer: Some(correct.to_string()),
        topic: topic.to_string(),
        bloom_level: BloomLevel::Remembering,
        difficulty: Difficulty::Easy,
        approved: true,
    }
}

/// Approved question of `kind` without choices or answer.
pub(crate) fn question(id: &str, kind: QuestionType, topic: &str) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {id}"),
        kind,
        choices: None,
        correct_answer: None,
        topic: topic.to_string(),
        bloom_level: BloomLevel::Understanding,
        difficulty: Difficulty::Average,
        approved: true,
    }
}

pub(crate) fn graded(id: &str, topic: &str, bloom_level: BloomLevel, difficulty: Difficulty) -> Question {
    Question { bloom_level, difficulty, ..mcq(id, topic, "A") }
}

pub(crate) fn requirement(
    topic: &str,
    bloom_level: BloomLevel,
    difficulty: Difficulty,
    count: usize,
) -> SelectionRequirement {
    SelectionRequirement { topic: topic.to_string(), bloom_level, difficulty, count }
}

/// Unshuffled form over `questions` in the given order.
pub(crate) fn form(label: char, questions: &[Question]) -> TestForm {
    let items = questions
        .iter()
        .enumerate()
        .map(|(idx, question)| FormItem {
            position: idx + 1,
            source_question_id: question.id.clone(),
            text: question.text.clone(),
            kind: question.kind,
            choices: question.choices.clone(),
            correct_answer: question.correct_answer.clone(),
            topic: question.topic.clone(),
            bloom_level: question.bloom_level,
            difficulty: question.difficulty,
        })
        .collect();
    TestForm { label, title: "Fixture".to_string(), items }
}

pub(crate) fn question_json(question: &Question) -> serde_json::Value {
    serde_json::to_value(question).expect("question json")
}
