//! PlanGenerator - one model call per goal

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};

use super::{PlanOutcome, normalize};
use crate::config::LlmConfig;
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, StopReason};
use crate::prompts;

/// JSON schema sent to providers that support structured output
pub fn plan_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "project_name": { "type": "string" },
            "steps": { "type": "array", "items": { "type": "string" } },
            "estimated_hours": { "type": "integer" },
            "difficulty": { "type": "string", "enum": ["Easy", "Medium", "Hard"] },
            "created_at": { "type": "string" },
        },
        "required": ["project_name", "steps", "estimated_hours", "difficulty"],
    })
}

/// Turns a goal into a plan through the injected model client
pub struct PlanGenerator {
    llm: Arc<dyn LlmClient>,
    max_tokens: u32,
    timeout: Duration,
}

impl PlanGenerator {
    pub fn new(llm: Arc<dyn LlmClient>, max_tokens: u32, timeout: Duration) -> Self {
        Self {
            llm,
            max_tokens,
            timeout,
        }
    }

    pub fn from_config(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        Self::new(llm, config.max_tokens, config.timeout())
    }

    fn build_request(&self, goal: &str) -> CompletionRequest {
        let prompt = prompts::render_goal(goal).unwrap_or_else(|e| {
            warn!(error = %e, "build_request: goal template failed, using plain prompt");
            format!("Create a plan for: {}", goal)
        });

        CompletionRequest {
            system_prompt: prompts::SYSTEM.to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
            response_schema: Some(plan_schema()),
        }
    }

    /// Request a plan for `goal`
    ///
    /// Does not check for an empty goal; front-ends do that before calling.
    /// Transport failures and timeouts come back as `Err`; replies that do not
    /// decode come back as `Ok(PlanOutcome::Invalid)`.
    pub async fn generate(&self, goal: &str) -> Result<PlanOutcome, LlmError> {
        debug!(provider = self.llm.provider(), goal_len = goal.len(), "generate: called");
        let request = self.build_request(goal);

        let response = match tokio::time::timeout(self.timeout, self.llm.complete(request)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(timeout = ?self.timeout, "generate: model call timed out");
                return Err(LlmError::Timeout(self.timeout));
            }
        };

        if response.stop_reason != StopReason::EndTurn {
            warn!(stop_reason = ?response.stop_reason, "generate: model stopped early");
        }

        let raw = response.content.unwrap_or_default();
        match normalize(&raw) {
            PlanOutcome::Plan(mut plan) => {
                if plan.created_at.is_none() {
                    plan.created_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
                }
                info!(
                    project = %plan.project_name,
                    steps = plan.steps.len(),
                    tokens = response.usage.total(),
                    "Generated plan"
                );
                Ok(PlanOutcome::Plan(plan))
            }
            PlanOutcome::Invalid(invalid) => {
                warn!(
                    reason = invalid.reason.code(),
                    raw_len = invalid.raw_text.len(),
                    "generate: model reply did not decode"
                );
                Ok(PlanOutcome::Invalid(invalid))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionResponse;
    use crate::llm::client::mock::MockLlmClient;

    const TODO_REPLY: &str = r#"{"project_name":"Todo App","steps":["1. Design schema","2. Build API"],"estimated_hours":10,"difficulty":"Medium","created_at":"2024-01-01T00:00:00Z"}"#;

    fn generator(mock: Arc<MockLlmClient>) -> PlanGenerator {
        PlanGenerator::new(mock, 2048, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mock = Arc::new(MockLlmClient::with_texts(&[TODO_REPLY]));
        let outcome = generator(mock.clone()).generate("build a todo app").await.unwrap();

        let plan = outcome.plan().expect("plan");
        assert_eq!(plan.project_name, "Todo App");
        assert_eq!(plan.steps, vec!["Design schema", "Build API"]);
        assert_eq!(plan.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_sends_schema_and_goal() {
        let mock = Arc::new(MockLlmClient::with_texts(&[TODO_REPLY]));
        generator(mock.clone()).generate("build a todo app").await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.system_prompt, prompts::SYSTEM);
        assert_eq!(request.messages[0].content, "Create a plan for: build a todo app");
        assert_eq!(request.max_tokens, 2048);
        assert_eq!(request.response_schema, Some(plan_schema()));
    }

    #[tokio::test]
    async fn test_generate_stamps_missing_created_at() {
        let mock = Arc::new(MockLlmClient::with_texts(&[r#"{"project_name":"X","steps":[]}"#]));
        let outcome = generator(mock).generate("x").await.unwrap();

        let created = outcome.plan().and_then(|p| p.created_at.clone()).expect("created_at");
        assert!(chrono::DateTime::parse_from_rfc3339(&created).is_ok());
    }

    #[tokio::test]
    async fn test_generate_malformed_reply_is_invalid() {
        let mock = Arc::new(MockLlmClient::with_texts(&["I cannot help with that"]));
        match generator(mock).generate("x").await.unwrap() {
            PlanOutcome::Invalid(invalid) => assert_eq!(invalid.raw_text, "I cannot help with that"),
            PlanOutcome::Plan(_) => panic!("expected invalid"),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_reply_is_invalid() {
        let mock = Arc::new(MockLlmClient::new(vec![Ok(CompletionResponse {
            content: None,
            stop_reason: StopReason::Refused,
            usage: Default::default(),
        })]));
        let outcome = generator(mock).generate("x").await.unwrap();
        assert!(!outcome.is_plan());
    }

    #[tokio::test]
    async fn test_generate_transport_error_is_err() {
        let mock = Arc::new(MockLlmClient::new(vec![Err(LlmError::ApiError {
            status: 503,
            message: "overloaded".to_string(),
        })]));
        let err = generator(mock).generate("x").await.unwrap_err();
        assert!(matches!(err, LlmError::ApiError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let mock = Arc::new(MockLlmClient::with_texts(&[TODO_REPLY]).with_delay(Duration::from_secs(10)));
        let generator = PlanGenerator::new(mock, 2048, Duration::from_millis(50));

        let err = generator.generate("x").await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout(d) if d == Duration::from_millis(50)));
    }

    #[test]
    fn test_plan_schema_shape() {
        let schema = plan_schema();
        assert_eq!(schema["type"], "object");
        for field in ["project_name", "steps", "estimated_hours", "difficulty", "created_at"] {
            assert!(schema["properties"].get(field).is_some(), "missing {}", field);
        }
    }
}
