//! Planner adapter for OpenAI-compatible chat completion endpoints

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Chat-completions backed planner
pub struct OpenAiPlanner {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl OpenAiPlanner {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Prompt asking the model for a JSON plan
pub fn build_prompt(request: &PlanRequest) -> String {
    format!(
        r#"You are a professional video editing AI. Create a processing plan based on:

User Input: {instruction}
Available Tools: {tools}
Style Preference: {style}
Output Format: {format}

Generate a JSON array of processing steps with 'name' and 'args'.
Use only these tools: {tools}, and style preferences if the user input specifically requests it.
Only include steps that are directly requested in the user input.
Order steps logically for video processing workflow.
Respond with the JSON array only.

Example Response:
User Input: Remove duplicates from the video and add captions of size 32 and background music at normal volume.
Plan:
[
    {{"name": "remove_duplicates", "args": {{}}}},
    {{"name": "add_captions", "args": {{"font_size": 32}}}},
    {{"name": "add_music", "args": {{"music_volume": 0.4}}}}
]
"#,
        instruction = request.instruction.trim(),
        tools = request.available_tools.join(", "),
        style = request.style_preference,
        format = request.output_format,
    )
}

/// Extract the plan array from a model reply
///
/// Tolerates code fences and prose around the array; an empty or
/// unparseable plan is an error.
pub fn parse_plan(reply: &str) -> Result<Plan, DomainError> {
    let start = reply.find('[');
    let end = reply.rfind(']');
    let body = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            return Err(DomainError::Planner(format!(
                "Reply does not contain a JSON array: {}",
                truncate(reply, 200)
            )))
        }
    };

    let plan: Plan = serde_json::from_str(body)
        .map_err(|e| DomainError::Planner(format!("Malformed plan: {}", e)))?;
    if plan.is_empty() {
        return Err(DomainError::Planner("Planner returned an empty plan".to_string()));
    }
    Ok(plan)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[async_trait]
impl PlannerPort for OpenAiPlanner {
    async fn plan(&self, request: &PlanRequest) -> Result<Plan, DomainError> {
        let prompt = build_prompt(request);
        let payload = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
        };

        info!("Requesting plan from {} ({})", self.endpoint(), self.model);
        let mut http = self.client.post(self.endpoint()).json(&payload);
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        let response = http
            .send()
            .await
            .map_err(|e| DomainError::Planner(format!("Planner request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Planner(format!(
                "Planner returned {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Planner(format!("Unreadable planner response: {}", e)))?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DomainError::Planner("Planner response had no content".to_string()))?;

        debug!("Planner reply: {}", content);
        let plan = parse_plan(&content)?;
        info!("Planner produced {} steps", plan.len());
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PlanRequest {
        PlanRequest {
            instruction: "  cut the repeats and add captions  ".to_string(),
            available_tools: vec!["remove_duplicates".to_string(), "add_captions".to_string()],
            style_preference: "vlog".to_string(),
            output_format: "mp4".to_string(),
        }
    }

    #[test]
    fn test_build_prompt_lists_tools_and_preferences() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("User Input: cut the repeats and add captions\n"));
        assert!(prompt.contains("Available Tools: remove_duplicates, add_captions"));
        assert!(prompt.contains("Style Preference: vlog"));
        assert!(prompt.contains("Output Format: mp4"));
        assert!(prompt.contains(r#"{"name": "remove_duplicates", "args": {}}"#));
    }

    #[test]
    fn test_parse_plan_with_fences() {
        let reply = "Here you go:\n```json\n[{\"name\": \"remove_duplicates\", \"args\": {}},\n {\"name\": \"add_captions\", \"args\": {\"font_size\": 32}}]\n```";
        let plan = parse_plan(reply).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].name, "add_captions");
        assert_eq!(plan[1].args.u32("font_size"), Some(32));
    }

    #[test]
    fn test_parse_plan_missing_args_defaults_empty() {
        let plan = parse_plan(r#"[{"name": "add_music"}]"#).unwrap();
        assert!(plan[0].args.is_empty());
    }

    #[test]
    fn test_parse_plan_rejects_empty_and_garbage() {
        assert!(matches!(parse_plan("[]"), Err(DomainError::Planner(_))));
        assert!(matches!(parse_plan("no plan today"), Err(DomainError::Planner(_))));
        assert!(matches!(parse_plan("[{\"args\": {}}]"), Err(DomainError::Planner(_))));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let planner = OpenAiPlanner::new(
            "https://api.example.com/v1/",
            "m",
            None,
            0.2,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(planner.endpoint(), "https://api.example.com/v1/chat/completions");
    }
}
