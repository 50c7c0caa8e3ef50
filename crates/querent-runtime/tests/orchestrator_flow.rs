use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;

use querent_config::QuerentConfig;
use querent_core::executor::ErrorKind;
use querent_core::tool::names;
use querent_core::{
    Engine, GenerationError, Generator, ParamValue, Plan, PromptNormalizer, QueryParser, Step,
    ToolRegistry,
};
use querent_runtime::{build_orchestrator, AnswerSource, Orchestrator};

const KB: &str = r#"{
    "entries": [
        {
            "name": "Ada Lovelace",
            "summary": "English mathematician known for her work on the Analytical Engine."
        }
    ]
}"#;

struct Fixture {
    orchestrator: Orchestrator,
    _kb: tempfile::NamedTempFile,
}

fn fixture() -> Fixture {
    let mut kb = tempfile::NamedTempFile::new().expect("kb file");
    kb.write_all(KB.as_bytes()).expect("write kb");

    let mut config = QuerentConfig::default();
    config.tools.knowledge_base.path = kb.path().display().to_string();
    config.tools.currency.live.enabled = false;
    let orchestrator = build_orchestrator(&config).expect("orchestrator");
    Fixture {
        orchestrator,
        _kb: kb,
    }
}

struct BrokenGenerator;

#[async_trait]
impl Generator for BrokenGenerator {
    fn name(&self) -> &str {
        "broken"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable("offline for test".to_string()))
    }
}

#[tokio::test]
async fn test_percentage_answers() {
    let fx = fixture();
    assert_eq!(fx.orchestrator.process_query("What is 25% of 100?").await, "25.0");
    assert_eq!(
        fx.orchestrator.process_query("What is 12.5% of 243?").await,
        "30.375"
    );
    assert_eq!(fx.orchestrator.process_query("What is 15 + 25?").await, "40.0");
}

#[tokio::test]
async fn test_arithmetic_over_average_temperature() {
    let fx = fixture();
    let answer = fx
        .orchestrator
        .answer("Add 10 to the average temperature in Paris and London right now.")
        .await;
    assert_eq!(answer.text, "27.5°C");
    assert_eq!(answer.source, AnswerSource::Pipeline);
    assert_eq!(answer.steps.len(), 4);
    assert_eq!(answer.strategy.as_deref(), Some("multi_step"));

    assert_eq!(
        fx.orchestrator
            .process_query("Subtract 5 from the average temperature in Paris and London right now.")
            .await,
        "12.5°C"
    );
    assert_eq!(
        fx.orchestrator
            .process_query("Multiply 2 with the average temperature in Paris and London")
            .await,
        "35.0°C"
    );
}

#[tokio::test]
async fn test_conditional_temperature_arithmetic() {
    let fx = fixture();
    let answer = fx
        .orchestrator
        .answer("If the temperature in Paris is 18 and I add 5")
        .await;
    assert_eq!(answer.text, "23.0°C");
    assert_eq!(answer.strategy.as_deref(), Some("multi_step"));
    assert!(answer.steps.iter().all(|step| step.tool != "weather"));

    assert_eq!(
        fx.orchestrator
            .process_query("If the weather in London is 17 and I subtract 3")
            .await,
        "14.0°C"
    );
    assert_eq!(
        fx.orchestrator
            .process_query("If the temperature in Paris is 18 and add 5")
            .await,
        "23.0°C"
    );
}

#[tokio::test]
async fn test_convert_average_amount() {
    let fx = fixture();
    assert_eq!(
        fx.orchestrator
            .process_query("Convert the average of 10 and 20 USD into EUR")
            .await,
        "12.75"
    );
    assert_eq!(
        fx.orchestrator.process_query("Convert 100 USD to EUR").await,
        "85.0"
    );
}

#[tokio::test]
async fn test_weather_summary_prompt_uses_display_text() {
    let fx = fixture();
    let answer = fx
        .orchestrator
        .process_query("Summarize today's weather in Paris in 3 words.")
        .await;
    assert!(
        answer.contains("Summarize 18°C in exactly 3 words"),
        "unexpected answer: {}",
        answer
    );
}

#[tokio::test]
async fn test_knowledge_lookup() {
    let fx = fixture();
    let answer = fx.orchestrator.process_query("Who is Ada Lovelace?").await;
    assert!(answer.contains("Analytical Engine"), "unexpected answer: {}", answer);
}

#[tokio::test]
async fn test_unmatched_question_goes_to_generator() {
    let fx = fixture();
    let answer = fx.orchestrator.answer("Gibberish xyz 123").await;
    assert_eq!(answer.text, "Generated Answer for: Gibberish xyz 123");
    assert_eq!(answer.source, AnswerSource::Pipeline);
    assert!(answer.trace.as_ref().expect("trace").is_fallback());
    assert_eq!(answer.plan.as_ref().expect("plan").steps.len(), 0);
}

#[tokio::test]
async fn test_tool_failure_falls_back_to_generation() {
    let fx = fixture();
    let answer = fx.orchestrator.answer("What is 10 / 0?").await;
    assert_eq!(answer.source, AnswerSource::GenerationFallback);
    assert_eq!(answer.text, "Generated Answer for: What is 10 / 0?");
    assert!(answer.error.as_deref().unwrap_or_default().contains("divide by zero"));
}

#[tokio::test]
async fn test_empty_question_still_answers() {
    let fx = fixture();
    let answer = fx.orchestrator.answer("   ").await;
    assert_eq!(answer.source, AnswerSource::GenerationFallback);
    assert_eq!(answer.text, "Generated Answer for: [Empty prompt]");
}

#[tokio::test]
async fn test_placeholder_when_generation_fails_too() {
    let broken: Arc<dyn Generator> = Arc::new(BrokenGenerator);
    let engine = Engine::new(ToolRegistry::new(), broken);
    let orchestrator = Orchestrator::new(
        PromptNormalizer::default(),
        QueryParser::with_default_recognizers(),
        engine,
    );
    let answer = orchestrator.answer("Gibberish xyz 123").await;
    assert_eq!(answer.source, AnswerSource::Placeholder);
    assert_eq!(answer.text, "Generated Answer for: Gibberish xyz 123");
}

#[tokio::test]
async fn test_runs_do_not_share_variables() {
    let fx = fixture();
    assert_eq!(
        fx.orchestrator
            .process_query("Add 10 to the average temperature in Paris and London")
            .await,
        "27.5°C"
    );

    let dangling = Plan::multi_step(
        vec![
            Step::new(names::CALCULATOR, "add")
                .with_param("first_number", ParamValue::reference("avg_temp"))
                .with_param("second_number", 1.0),
            Step::new(names::WEATHER, "get_weather").with_param("city", "paris"),
        ],
        "Add 1 to a previous result",
    );
    let err = fx
        .orchestrator
        .engine()
        .execute(&dangling)
        .await
        .expect_err("unbound reference");
    assert_eq!(err.kind(), ErrorKind::SubstitutionUnboundVariable);
}

#[test]
fn test_explain_does_not_execute() {
    let fx = fixture();
    let explanation = fx
        .orchestrator
        .explain("avg temp in paris and london")
        .expect("explain");
    assert_eq!(explanation.normalized.text, "Average temperature in paris and london");
    assert!(!explanation.normalized.transformations.is_empty());
}
