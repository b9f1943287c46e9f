use std::{collections::HashMap, future::Future, sync::Mutex, time::Duration};

use axum::{Json, Router, response::Json as ResponseJson, routing::post};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};
use utils::response::ApiResponse;

const RIVAMAR_OPENAI_API_BASE: &str = "RIVAMAR_OPENAI_API_BASE";
const RIVAMAR_OPENAI_API_KEY: &str = "RIVAMAR_OPENAI_API_KEY";
const RIVAMAR_OPENAI_DEFAULT_MODEL: &str = "RIVAMAR_OPENAI_DEFAULT_MODEL";
const OPENAI_API_BASE: &str = "OPENAI_API_BASE";
const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
const OPENAI_DEFAULT_MODEL: &str = "OPENAI_DEFAULT_MODEL";

/// How long an edited source field sits idle before its translation job
/// fires.
pub const AUTO_TRANSLATE_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

#[derive(Debug, Serialize)]
pub struct TranslationResponse {
    pub translated_text: String,
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "de".to_string()
}

#[derive(Debug, Serialize)]
struct OpenAiChatRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: Option<OpenAiError>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    message: Option<String>,
}

struct LlmConfig {
    base_url: String,
    api_key: String,
    model: String,
}

/// Debounces per-field translation jobs. The admin form fires a job a moment
/// after the user stops typing in a source-language field; typing again in
/// the same field before the job lands aborts the in-flight one, so the last
/// edit always wins and stale translations never overwrite newer text. No
/// retry on abort.
pub struct FieldDebouncer {
    delay: Duration,
    inflight: Mutex<HashMap<String, tokio::task::JoinHandle<()>>>,
}

impl FieldDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn schedule<F>(&self, field: &str, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
        });

        let mut inflight = self.inflight.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(previous) = inflight.insert(field.to_string(), handle) {
            previous.abort();
        }
    }

    pub fn cancel(&self, field: &str) {
        let mut inflight = self.inflight.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(handle) = inflight.remove(field) {
            handle.abort();
        }
    }

    pub fn is_scheduled(&self, field: &str) -> bool {
        let inflight = self.inflight.lock().unwrap_or_else(|err| err.into_inner());
        inflight
            .get(field)
            .is_some_and(|handle| !handle.is_finished())
    }
}

/// Queues a debounced translation of one source-language field and hands the
/// result to `apply` when it lands. Queueing the same field again before the
/// job fires replaces it, so only the latest text is translated.
pub fn schedule_field_translation<F, Fut>(
    debouncer: &FieldDebouncer,
    field_key: String,
    text: String,
    apply: F,
) where
    F: FnOnce(String) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let key = field_key.clone();
    debouncer.schedule(&field_key, async move {
        match translate_text(&text, "en", "de").await {
            Ok(translated) => apply(translated).await,
            Err(err) => {
                tracing::warn!("Auto-translation of '{}' failed: {}", key, err);
            }
        }
    });
}

pub fn router() -> Router<AppState> {
    Router::new().route("/translation", post(translate))
}

async fn translate(
    Json(payload): Json<TranslationRequest>,
) -> Result<ResponseJson<ApiResponse<TranslationResponse>>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Translation text is empty".to_string()));
    }

    let translated_text =
        translate_text(&payload.text, &payload.source_lang, &payload.target_lang).await?;

    Ok(ResponseJson(ApiResponse::success(TranslationResponse {
        translated_text,
    })))
}

async fn translate_text(
    text: &str,
    source_lang: &str,
    target_lang: &str,
) -> Result<String, ApiError> {
    let config = resolve_llm_config()?;
    let url = format_openai_url(&config.base_url);
    let system_prompt = build_system_prompt(source_lang, target_lang);

    let request_body = OpenAiChatRequest {
        model: config.model,
        messages: vec![
            OpenAiMessage {
                role: "system".to_string(),
                content: system_prompt,
            },
            OpenAiMessage {
                role: "user".to_string(),
                content: text.to_string(),
            },
        ],
        temperature: 0.2,
    };

    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .bearer_auth(config.api_key)
        .json(&request_body)
        .send()
        .await
        .map_err(|err| ApiError::BadRequest(format!("Translation request failed: {}", err)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = parse_openai_error(&body)
            .unwrap_or_else(|| body.trim().to_string())
            .trim()
            .to_string();
        let fallback = format!("Translation failed with status {}", status);
        let message = if message.is_empty() { fallback } else { message };
        return Err(ApiError::BadRequest(message));
    }

    let data = response
        .json::<OpenAiChatResponse>()
        .await
        .map_err(|err| ApiError::BadRequest(format!("Translation response invalid: {}", err)))?;

    let translated_text = data
        .choices
        .iter()
        .find_map(|choice| choice.message.as_ref()?.content.as_ref())
        .map(|text| text.to_string())
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Translation unavailable".to_string()))?;

    Ok(translated_text)
}

fn resolve_llm_config() -> Result<LlmConfig, ApiError> {
    let base_url = resolve_env(RIVAMAR_OPENAI_API_BASE, OPENAI_API_BASE)
        .ok_or_else(|| ApiError::BadRequest("Missing OpenAI API base URL".to_string()))?;
    let api_key = resolve_env(RIVAMAR_OPENAI_API_KEY, OPENAI_API_KEY)
        .ok_or_else(|| ApiError::BadRequest("Missing OpenAI API key".to_string()))?;
    let model = resolve_env(RIVAMAR_OPENAI_DEFAULT_MODEL, OPENAI_DEFAULT_MODEL)
        .ok_or_else(|| ApiError::BadRequest("Missing OpenAI default model".to_string()))?;

    Ok(LlmConfig {
        base_url,
        api_key,
        model,
    })
}

fn resolve_env(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| {
            std::env::var(fallback)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
}

fn format_openai_url(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/v1") {
        format!("{}/chat/completions", trimmed)
    } else {
        format!("{}/v1/chat/completions", trimmed)
    }
}

fn build_system_prompt(source_lang: &str, target_lang: &str) -> String {
    format!(
        "You are a translation engine. Translate from {source} to {target}. \
Return only the translated text with original formatting preserved. Do not add commentary.",
        source = source_lang,
        target = target_lang
    )
}

fn parse_openai_error(body: &str) -> Option<String> {
    let parsed: OpenAiErrorResponse = serde_json::from_str(body).ok()?;
    parsed.error.and_then(|err| err.message)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::{FieldDebouncer, build_system_prompt, format_openai_url};

    #[test]
    fn format_openai_url_appends_v1() {
        assert_eq!(
            format_openai_url("https://example.com"),
            "https://example.com/v1/chat/completions"
        );
        assert_eq!(
            format_openai_url("https://example.com/"),
            "https://example.com/v1/chat/completions"
        );
    }

    #[test]
    fn format_openai_url_respects_existing_v1() {
        assert_eq!(
            format_openai_url("https://example.com/v1"),
            "https://example.com/v1/chat/completions"
        );
        assert_eq!(
            format_openai_url("https://example.com/v1/"),
            "https://example.com/v1/chat/completions"
        );
    }

    #[test]
    fn build_system_prompt_includes_languages() {
        let prompt = build_system_prompt("en", "de");
        assert!(prompt.contains("en"));
        assert!(prompt.contains("de"));
    }

    #[tokio::test]
    async fn rescheduling_a_field_aborts_the_previous_job() {
        let debouncer = FieldDebouncer::new(std::time::Duration::from_millis(50));
        let runs = Arc::new(AtomicUsize::new(0));

        let first = runs.clone();
        debouncer.schedule("summary", async move {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = runs.clone();
        debouncer.schedule("summary", async move {
            second.fetch_add(10, Ordering::SeqCst);
        });

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn fields_debounce_independently() {
        let debouncer = FieldDebouncer::new(std::time::Duration::from_millis(50));
        let runs = Arc::new(AtomicUsize::new(0));

        let summary = runs.clone();
        debouncer.schedule("summary", async move {
            summary.fetch_add(1, Ordering::SeqCst);
        });
        let description = runs.clone();
        debouncer.schedule("description", async move {
            description.fetch_add(10, Ordering::SeqCst);
        });

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 11);
    }

    #[tokio::test]
    async fn cancel_drops_a_scheduled_job() {
        let debouncer = FieldDebouncer::new(std::time::Duration::from_millis(50));
        let runs = Arc::new(AtomicUsize::new(0));

        let job = runs.clone();
        debouncer.schedule("notes", async move {
            job.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.cancel("notes");

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
