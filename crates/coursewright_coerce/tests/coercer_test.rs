use async_trait::async_trait;
use coursewright_coerce::{
    CoercerConfig, Generated, GenerationRequest, OutputSpec, StrictOutput, UserPrompt,
};
use coursewright_core::{GenerateRequest, GenerateResponse, Role};
use coursewright_error::{
    CoerceErrorKind, CoursewrightErrorKind, CoursewrightResult, ModelError, ModelErrorKind,
};
use coursewright_interface::CoursewrightDriver;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One scripted backend reply.
enum Reply {
    Text(&'static str),
    TransportFailure,
}

/// Mock driver that plays back scripted replies and records every request.
struct MockDriver {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockDriver {
    fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn texts(replies: &[&'static str]) -> Arc<Self> {
        Self::new(replies.iter().copied().map(Reply::Text).collect())
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, index: usize) -> GenerateRequest {
        self.requests.lock().unwrap()[index].clone()
    }

    fn system_prompt(&self, index: usize) -> String {
        self.request(index).messages()[0].content().clone()
    }

    fn user_prompt(&self, index: usize) -> String {
        self.request(index).messages()[1].content().clone()
    }
}

#[async_trait]
impl CoursewrightDriver for MockDriver {
    async fn generate(&self, req: &GenerateRequest) -> CoursewrightResult<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());
        let reply = self.replies.lock().unwrap().pop_front();

        match reply {
            Some(Reply::Text(text)) => Ok(GenerateResponse::text(text)),
            Some(Reply::TransportFailure) => Err(ModelError::new(ModelErrorKind::Http(
                "connection refused".to_string(),
            ))
            .into()),
            None => Ok(GenerateResponse::text("")),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model-v1"
    }
}

fn coercer(driver: &Arc<MockDriver>) -> StrictOutput<Arc<MockDriver>> {
    StrictOutput::new(Arc::clone(driver), CoercerConfig::default())
}

fn title_request(prompt: impl Into<UserPrompt>) -> GenerationRequest {
    GenerationRequest::builder()
        .system_prompt("You are an AI capable of curating course content.")
        .user_prompt(prompt)
        .output_spec(OutputSpec::new().describe("title", "title of the unit"))
        .build()
        .unwrap()
}

fn sentiment_request(default_category: Option<&str>) -> GenerationRequest {
    GenerationRequest::builder()
        .system_prompt("Classify the sentiment.")
        .user_prompt("I love it")
        .output_spec(OutputSpec::new().choices("sentiment", ["positive", "negative"]))
        .default_category(default_category.map(str::to_string))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_first_attempt_success_uses_one_call() {
    let driver = MockDriver::texts(&[r#"{"title": "Ownership"}"#]);
    let result = coercer(&driver)
        .generate(&title_request("Explain ownership"))
        .await
        .unwrap();

    assert_eq!(result, Generated::Record(json!({"title": "Ownership"})));
    assert_eq!(driver.calls(), 1);

    let sent = driver.request(0);
    assert_eq!(sent.messages().len(), 2);
    assert_eq!(*sent.messages()[0].role(), Role::System);
    assert_eq!(*sent.messages()[1].role(), Role::User);
    assert_eq!(driver.user_prompt(0), "Explain ownership");
    assert_eq!(sent.model().as_deref(), Some("gpt-3.5-turbo"));
    assert_eq!(*sent.temperature(), Some(1.0));
    assert_eq!(*sent.max_tokens(), None);
    assert!(driver.system_prompt(0).starts_with(
        "You are an AI capable of curating course content.\nYou are to output the following in json format: {\"title\":\"title of the unit\"}."
    ));
}

#[tokio::test]
async fn test_request_overrides_config_defaults() {
    let driver = MockDriver::texts(&[r#"{"title": "x"}"#]);
    let request = GenerationRequest::builder()
        .system_prompt("sys")
        .user_prompt("user")
        .output_spec(OutputSpec::new().describe("title", "title"))
        .model(Some("gpt-4o-mini".to_string()))
        .temperature(Some(0.2_f32))
        .max_tokens(Some(512_u32))
        .build()
        .unwrap();

    coercer(&driver).generate(&request).await.unwrap();

    let sent = driver.request(0);
    assert_eq!(sent.model().as_deref(), Some("gpt-4o-mini"));
    assert_eq!(*sent.temperature(), Some(0.2));
    assert_eq!(*sent.max_tokens(), Some(512));
}

#[tokio::test]
async fn test_invalid_choice_becomes_default_category() {
    let driver = MockDriver::texts(&[r#"{"sentiment": "ecstatic"}"#]);
    let result = coercer(&driver)
        .generate(&sentiment_request(Some("neutral")))
        .await
        .unwrap();

    assert_eq!(result, Generated::Record(json!({"sentiment": "neutral"})));
    assert!(
        driver
            .system_prompt(0)
            .contains("You are to output an array of objects in json format")
    );
}

#[tokio::test]
async fn test_invalid_choice_passes_through_without_default() {
    let driver = MockDriver::texts(&[r#"[{"sentiment": "ecstatic"}]"#]);
    let result = coercer(&driver)
        .generate(&sentiment_request(None))
        .await
        .unwrap();

    assert_eq!(result, Generated::Record(json!({"sentiment": "ecstatic"})));
}

#[tokio::test]
async fn test_empty_default_category_counts_as_absent() {
    let driver = MockDriver::texts(&[r#"{"sentiment": "ecstatic"}"#]);
    let result = coercer(&driver)
        .generate(&sentiment_request(Some("")))
        .await
        .unwrap();

    assert_eq!(result, Generated::Record(json!({"sentiment": "ecstatic"})));
}

#[tokio::test]
async fn test_choice_description_is_truncated_at_colon() {
    let driver = MockDriver::texts(&[r#"{"animal": "cat: a small domesticated feline"}"#]);
    let request = GenerationRequest::builder()
        .system_prompt("Pick an animal.")
        .user_prompt("Which pet purrs?")
        .output_spec(OutputSpec::new().choices("animal", ["cat", "dog"]))
        .build()
        .unwrap();

    let result = coercer(&driver).generate(&request).await.unwrap();
    assert_eq!(result, Generated::Record(json!({"animal": "cat"})));
}

#[tokio::test]
async fn test_recovers_after_malformed_attempts() {
    let driver = MockDriver::texts(&["bad one", "bad two", r#"{"title": "Traits"}"#]);
    let result = coercer(&driver)
        .generate(&title_request("Explain traits"))
        .await
        .unwrap();

    assert_eq!(result, Generated::Record(json!({"title": "Traits"})));
    assert_eq!(driver.calls(), 3);

    assert!(!driver.system_prompt(0).contains("Error message:"));
    let second = driver.system_prompt(1);
    assert!(second.contains("\n\nResult: bad one\n\nError message: "));

    let third = driver.system_prompt(2);
    assert!(third.contains("\n\nResult: bad two\n\nError message: "));
    assert!(!third.contains("bad one"));
}

#[tokio::test]
async fn test_exhaustion_returns_empty_records() {
    let driver = MockDriver::texts(&["nope", "still nope", "never"]);
    let result = coercer(&driver)
        .generate(&title_request("Explain lifetimes"))
        .await
        .unwrap();

    assert_eq!(result, Generated::Records(vec![]));
    assert!(result.is_empty());
    assert_eq!(driver.calls(), 3);
}

#[tokio::test]
async fn test_strict_mode_reports_exhaustion() {
    let driver = MockDriver::texts(&["nope", "still nope"]);
    let request = GenerationRequest::builder()
        .system_prompt("sys")
        .user_prompt("user")
        .output_spec(OutputSpec::new().describe("title", "title"))
        .max_tries(Some(2_usize))
        .build()
        .unwrap();

    let err = coercer(&driver).generate_strict(&request).await.unwrap_err();
    match err.coerce_kind() {
        Some(CoerceErrorKind::Exhausted {
            attempts,
            last_error,
        }) => {
            assert_eq!(*attempts, 2);
            assert!(!last_error.is_empty());
        }
        other => panic!("expected exhaustion, got {:?}", other),
    }
    assert_eq!(driver.calls(), 2);
}

#[tokio::test]
async fn test_list_input_returns_aligned_records() {
    let driver = MockDriver::texts(&[
        r#"[{"title": "Ownership"}, {"title": "Borrowing"}, {"title": "Lifetimes"}]"#,
    ]);
    let request = title_request(vec!["ownership", "borrowing", "lifetimes"]);

    let result = coercer(&driver).generate(&request).await.unwrap();

    assert_eq!(
        result.into_records(),
        vec![
            json!({"title": "Ownership"}),
            json!({"title": "Borrowing"}),
            json!({"title": "Lifetimes"}),
        ]
    );
    assert_eq!(driver.user_prompt(0), "1. ownership\n2. borrowing\n3. lifetimes");
    assert!(
        driver
            .system_prompt(0)
            .contains("Generate an array of json, one json for each input element.")
    );
}

#[tokio::test]
async fn test_list_input_rejects_wrong_shapes() {
    let driver = MockDriver::texts(&[
        r#"{"title": "Ownership"}"#,
        r#"[{"title": "Ownership"}]"#,
        r#"[{"title": "Ownership"}, {"title": "Borrowing"}]"#,
    ]);
    let request = title_request(vec!["ownership", "borrowing"]);

    let result = coercer(&driver).generate(&request).await.unwrap();

    assert_eq!(result.into_records().len(), 2);
    assert_eq!(driver.calls(), 3);
    assert!(
        driver
            .system_prompt(1)
            .contains("Output format not in an array of json")
    );
    assert!(driver.system_prompt(2).contains("expected 2 json objects"));
}

#[tokio::test]
async fn test_values_only_returns_bare_values() {
    let driver = MockDriver::texts(&[r#"[{"summary": "first"}, {"summary": "second"}]"#]);
    let request = GenerationRequest::builder()
        .system_prompt("Summarize.")
        .user_prompt(vec!["a", "b"])
        .output_spec(OutputSpec::new().describe("summary", "summary of the text"))
        .values_only(true)
        .build()
        .unwrap();

    let result = coercer(&driver).generate(&request).await.unwrap();
    assert_eq!(result, Generated::Records(vec![json!("first"), json!("second")]));
}

#[tokio::test]
async fn test_values_only_keeps_multiple_values_in_order() {
    let driver = MockDriver::texts(&[r#"{"question": "q?", "answer": "a"}"#]);
    let request = GenerationRequest::builder()
        .system_prompt("Quiz.")
        .user_prompt("one question")
        .output_spec(
            OutputSpec::new()
                .describe("question", "question")
                .describe("answer", "answer"),
        )
        .values_only(true)
        .build()
        .unwrap();

    let result = coercer(&driver).generate(&request).await.unwrap();
    assert_eq!(result, Generated::Record(json!(["q?", "a"])));
}

#[tokio::test]
async fn test_single_quoted_output_is_repaired() {
    let driver = MockDriver::texts(&["{'question': 'what's this'}"]);
    let request = GenerationRequest::builder()
        .system_prompt("Ask.")
        .user_prompt("anything")
        .output_spec(OutputSpec::new().describe("question", "question"))
        .build()
        .unwrap();

    let result = coercer(&driver).generate(&request).await.unwrap();
    assert_eq!(result, Generated::Record(json!({"question": "what's this"})));
}

#[tokio::test]
async fn test_fenced_bare_output_is_repaired() {
    let driver = MockDriver::texts(&["```json\n{title: Smart Pointers}\n```"]);
    let result = coercer(&driver)
        .generate(&title_request("Explain Box"))
        .await
        .unwrap();

    assert_eq!(result, Generated::Record(json!({"title": "Smart Pointers"})));
}

#[tokio::test]
async fn test_transport_error_propagates_after_one_call() {
    let driver = MockDriver::new(vec![
        Reply::TransportFailure,
        Reply::Text(r#"{"title": "unused"}"#),
    ]);

    let err = coercer(&driver)
        .generate(&title_request("Explain ownership"))
        .await
        .unwrap_err();

    assert!(matches!(err.kind(), CoursewrightErrorKind::Model(_)));
    assert_eq!(driver.calls(), 1);
}

#[tokio::test]
async fn test_missing_field_triggers_retry() {
    let driver = MockDriver::texts(&[r#"{"name": "Ownership"}"#, r#"{"title": "Ownership"}"#]);
    let result = coercer(&driver)
        .generate(&title_request("Explain ownership"))
        .await
        .unwrap();

    assert_eq!(result, Generated::Record(json!({"title": "Ownership"})));
    assert_eq!(driver.calls(), 2);
    assert!(
        driver
            .system_prompt(1)
            .contains("Error message: title not in json output")
    );
}

#[tokio::test]
async fn test_empty_completion_is_retried() {
    let driver = MockDriver::texts(&["   ", r#"{"title": "Ownership"}"#]);
    let result = coercer(&driver)
        .generate(&title_request("Explain ownership"))
        .await
        .unwrap();

    assert!(!result.is_empty());
    assert!(driver.system_prompt(1).contains("Error message: empty completion"));
}

#[tokio::test]
async fn test_generated_keys_are_not_required() {
    let driver = MockDriver::texts(&[r#"{"school": "a place for education"}"#]);
    let request = GenerationRequest::builder()
        .system_prompt("Describe a place.")
        .user_prompt("somewhere to learn")
        .output_spec(OutputSpec::new().describe("<location>", "description of location"))
        .build()
        .unwrap();

    let result = coercer(&driver).generate(&request).await.unwrap();

    assert_eq!(
        result,
        Generated::Record(json!({"school": "a place for education"}))
    );
    assert!(
        driver
            .system_prompt(0)
            .contains("Any output key containing < and > indicates you must generate the key name")
    );
}

#[tokio::test]
async fn test_nested_spec_is_validated() {
    let driver = MockDriver::texts(&[
        r#"{"unit": {"title": "Ownership"}}"#,
        r#"{"unit": {"title": "Ownership", "level": "beginner: new to rust"}}"#,
    ]);
    let request = GenerationRequest::builder()
        .system_prompt("Describe a unit.")
        .user_prompt("ownership")
        .output_spec(
            OutputSpec::new().nested(
                "unit",
                OutputSpec::new()
                    .describe("title", "title")
                    .choices("level", ["beginner", "advanced"]),
            ),
        )
        .build()
        .unwrap();

    let result = coercer(&driver).generate(&request).await.unwrap();

    assert_eq!(
        result,
        Generated::Record(json!({"unit": {"title": "Ownership", "level": "beginner"}}))
    );
    assert!(
        driver
            .system_prompt(1)
            .contains("unit.level not in json output")
    );
}

#[tokio::test]
async fn test_invalid_requests_make_no_backend_call() {
    let driver = MockDriver::texts(&[]);
    let coercer = coercer(&driver);

    let empty_list = title_request(Vec::<String>::new());
    let empty_spec = GenerationRequest::builder()
        .system_prompt("sys")
        .user_prompt("user")
        .output_spec(OutputSpec::new())
        .build()
        .unwrap();
    let zero_tries = GenerationRequest::builder()
        .system_prompt("sys")
        .user_prompt("user")
        .output_spec(OutputSpec::new().describe("title", "title"))
        .max_tries(Some(0_usize))
        .build()
        .unwrap();
    let bad_temperature = GenerationRequest::builder()
        .system_prompt("sys")
        .user_prompt("user")
        .output_spec(OutputSpec::new().describe("title", "title"))
        .temperature(Some(f32::NAN))
        .build()
        .unwrap();

    for request in [empty_list, empty_spec, zero_tries, bad_temperature] {
        let err = coercer.generate(&request).await.unwrap_err();
        assert!(
            matches!(err.coerce_kind(), Some(CoerceErrorKind::InvalidRequest(_))),
            "unexpected error: {}",
            err
        );
    }
    assert_eq!(driver.calls(), 0);
}

#[tokio::test]
async fn test_typed_extraction_from_records() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Unit {
        title: String,
    }

    let driver = MockDriver::texts(&[r#"[{"title": "A"}, {"title": "B"}]"#]);
    let units: Vec<Unit> = coercer(&driver)
        .generate_strict(&title_request(vec!["a", "b"]))
        .await
        .unwrap()
        .deserialize()
        .unwrap();

    assert_eq!(
        units,
        vec![
            Unit {
                title: "A".to_string()
            },
            Unit {
                title: "B".to_string()
            }
        ]
    );
}

#[tokio::test]
async fn test_typed_generation_retries_shape_mismatch() {
    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Lesson {
        title: String,
        minutes: u32,
    }

    let driver = MockDriver::texts(&[
        r#"{"title": "Lifetimes", "minutes": "about ten"}"#,
        r#"{"title": "Lifetimes", "minutes": 10}"#,
    ]);
    let request = GenerationRequest::builder()
        .system_prompt("Plan a lesson.")
        .user_prompt("Lifetimes")
        .output_spec(
            OutputSpec::new()
                .describe("title", "lesson title")
                .describe("minutes", "length in minutes"),
        )
        .build()
        .unwrap();

    let lesson: Lesson = coercer(&driver).generate_as(&request).await.unwrap();

    assert_eq!(
        lesson,
        Lesson {
            title: "Lifetimes".to_string(),
            minutes: 10
        }
    );
    assert_eq!(driver.calls(), 2);
    assert!(
        driver
            .system_prompt(1)
            .contains("Error message: output does not have the expected structure: invalid type")
    );
}

#[tokio::test]
async fn test_typed_generation_reports_exhaustion() {
    #[derive(serde::Deserialize, Debug)]
    struct Lesson {
        #[allow(dead_code)]
        minutes: u32,
    }

    let driver = MockDriver::texts(&[r#"{"minutes": "ten"}"#, r#"{"minutes": "ten"}"#]);
    let request = GenerationRequest::builder()
        .system_prompt("Plan a lesson.")
        .user_prompt("Lifetimes")
        .output_spec(OutputSpec::new().describe("minutes", "length in minutes"))
        .max_tries(Some(2_usize))
        .build()
        .unwrap();

    let err = coercer(&driver)
        .generate_as::<Lesson>(&request)
        .await
        .unwrap_err();

    assert!(matches!(
        err.coerce_kind(),
        Some(CoerceErrorKind::Exhausted { attempts: 2, .. })
    ));
    assert_eq!(driver.calls(), 2);
}
