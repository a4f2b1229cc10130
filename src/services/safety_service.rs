// src/services/safety_service.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    common::error::AppError,
    config::AnalysisMode,
    models::inspection::{AnalysisRecord, SafetyVerdict},
};

pub const FALLBACK_REASON: &str =
    "Safety analysis is unavailable. Do not operate the unit and contact your supervisor.";

const SYSTEM_PROMPT: &str = "You are a forklift (MHE) safety inspector. \
You receive the result of a pre-use checklist: for each item the part, the question, \
the operator's safe/unsafe answer and a photo. Policy: if every item is safe the unit is safe; \
if any item is unsafe the unit is unsafe and the reason must name every failing item. \
Answer only with a JSON object: {\"is_safe\": boolean, \"reason\": string}.";

// Veredito fixo quando o serviço de análise falha: nunca "seguro".
pub fn fallback_verdict() -> SafetyVerdict {
    SafetyVerdict {
        is_safe: false,
        reason: FALLBACK_REASON.to_string(),
    }
}

fn failing_items_reason(records: &[AnalysisRecord]) -> Option<String> {
    let failing: Vec<String> = records
        .iter()
        .filter(|record| !record.is_safe)
        .map(AnalysisRecord::label)
        .collect();

    if failing.is_empty() {
        None
    } else {
        Some(format!("Unsafe items found: {}.", failing.join(", ")))
    }
}

/// Política declarada aplicada localmente.
pub fn local_verdict(records: &[AnalysisRecord]) -> SafetyVerdict {
    match failing_items_reason(records) {
        Some(reason) => SafetyVerdict { is_safe: false, reason },
        None => SafetyVerdict {
            is_safe: true,
            reason: format!("All {} checklist items were marked safe.", records.len()),
        },
    }
}

/// Nenhum veredito pode declarar seguro um checklist com item inseguro.
pub fn enforce_policy(records: &[AnalysisRecord], verdict: SafetyVerdict) -> SafetyVerdict {
    match failing_items_reason(records) {
        Some(reason) if verdict.is_safe => SafetyVerdict { is_safe: false, reason },
        _ => verdict,
    }
}

#[async_trait]
pub trait SafetyAnalyzer: Send + Sync {
    async fn analyze(&self, records: &[AnalysisRecord]) -> Result<SafetyVerdict, AppError>;
}

// ---
// Modo local (offline)
// ---
pub struct RuleBasedSafetyAnalyzer;

#[async_trait]
impl SafetyAnalyzer for RuleBasedSafetyAnalyzer {
    async fn analyze(&self, records: &[AnalysisRecord]) -> Result<SafetyVerdict, AppError> {
        if records.is_empty() {
            return Err(AppError::AnalysisUnavailable("no inspection records".to_string()));
        }
        Ok(local_verdict(records))
    }
}

// ---
// Modo remoto: API de chat completions com suporte a imagem
// ---
pub struct RemoteSafetyAnalyzer {
    api_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl RemoteSafetyAnalyzer {
    pub fn new(api_url: String, api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            api_url,
            api_key,
            model,
            timeout,
        }
    }
}

/// Monta o corpo da requisição: texto com o checklist + uma imagem por item.
pub fn build_request_body(model: &str, records: &[AnalysisRecord]) -> Value {
    let mut summary = String::from("Inspection records:\n");
    for (idx, record) in records.iter().enumerate() {
        summary.push_str(&format!(
            "{}. {} | question: {} | operator answer: {} | at: {}\n",
            idx + 1,
            record.label(),
            record.question.as_deref().unwrap_or("-"),
            if record.is_safe { "SAFE" } else { "UNSAFE" },
            record.timestamp.to_rfc3339(),
        ));
    }

    let mut content = vec![json!({ "type": "text", "text": summary })];
    for record in records {
        content.push(json!({
            "type": "image_url",
            "image_url": { "url": record.photo },
        }));
    }

    json!({
        "model": model,
        "response_format": { "type": "json_object" },
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": content },
        ],
    })
}

/// Extrai `{is_safe, reason}` da primeira escolha do modelo.
pub fn parse_response(body: &Value) -> Result<SafetyVerdict, AppError> {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::AnalysisUnavailable("response has no message content".to_string()))?;

    // Alguns modelos embrulham o JSON em ```json ... ```
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str::<SafetyVerdict>(unfenced)
        .map_err(|e| AppError::AnalysisUnavailable(format!("malformed verdict: {e}")))
}

#[async_trait]
impl SafetyAnalyzer for RemoteSafetyAnalyzer {
    async fn analyze(&self, records: &[AnalysisRecord]) -> Result<SafetyVerdict, AppError> {
        if records.is_empty() {
            return Err(AppError::AnalysisUnavailable("no inspection records".to_string()));
        }

        let body = build_request_body(&self.model, records);
        let url = self.api_url.clone();
        let auth = format!("Bearer {}", self.api_key);
        let timeout = self.timeout;

        // ureq é bloqueante: roda fora do executor
        let response = tokio::task::spawn_blocking(move || -> Result<Value, AppError> {
            let agent = ureq::AgentBuilder::new().timeout(timeout).build();
            let response = agent
                .post(&url)
                .set("Authorization", &auth)
                .send_json(body)
                .map_err(|e| AppError::AnalysisUnavailable(e.to_string()))?;
            response
                .into_json::<Value>()
                .map_err(|e| AppError::AnalysisUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| anyhow::anyhow!("Safety analysis task failed: {}", e))??;

        parse_response(&response)
    }
}

#[derive(Clone)]
pub struct SafetyService {
    analyzer: Arc<dyn SafetyAnalyzer>,
}

impl SafetyService {
    pub fn new(analyzer: Arc<dyn SafetyAnalyzer>) -> Self {
        Self { analyzer }
    }

    pub fn from_mode(mode: &AnalysisMode) -> Self {
        let analyzer: Arc<dyn SafetyAnalyzer> = match mode {
            AnalysisMode::Local => Arc::new(RuleBasedSafetyAnalyzer),
            AnalysisMode::Remote {
                api_url,
                api_key,
                model,
                timeout,
            } => Arc::new(RemoteSafetyAnalyzer::new(
                api_url.clone(),
                api_key.clone(),
                model.clone(),
                *timeout,
            )),
        };
        Self::new(analyzer)
    }

    /// Nunca falha: qualquer erro do analisador vira o veredito fixo de inseguro.
    pub async fn analyze_with_fallback(&self, records: &[AnalysisRecord]) -> SafetyVerdict {
        match self.analyzer.analyze(records).await {
            Ok(verdict) => enforce_policy(records, verdict),
            Err(e) => {
                tracing::warn!("⚠️ Safety analysis failed, using fail-safe verdict: {}", e);
                fallback_verdict()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const PHOTO: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";

    fn record(id: i64, part: &str, is_safe: bool) -> AnalysisRecord {
        AnalysisRecord {
            checklist_item_id: id,
            part_name: Some(part.to_string()),
            question: Some(format!("Is the {part} OK?")),
            photo: PHOTO.to_string(),
            is_safe,
            timestamp: Utc::now(),
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl SafetyAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _records: &[AnalysisRecord]) -> Result<SafetyVerdict, AppError> {
            Err(AppError::AnalysisUnavailable("connection refused".to_string()))
        }
    }

    // Simula um modelo que ignora a política
    struct AlwaysSafeAnalyzer;

    #[async_trait]
    impl SafetyAnalyzer for AlwaysSafeAnalyzer {
        async fn analyze(&self, _records: &[AnalysisRecord]) -> Result<SafetyVerdict, AppError> {
            Ok(SafetyVerdict {
                is_safe: true,
                reason: "Looks fine".to_string(),
            })
        }
    }

    #[test]
    fn all_safe_items_give_a_safe_verdict() {
        let verdict = local_verdict(&[record(1, "Forks", true), record(2, "Horn", true)]);
        assert!(verdict.is_safe);
    }

    #[test]
    fn one_unsafe_item_flips_the_verdict_and_is_named() {
        let records = [record(1, "Forks", true), record(2, "Horn", false), record(3, "Brakes", true)];
        let verdict = local_verdict(&records);
        assert!(!verdict.is_safe);
        assert!(verdict.reason.contains("Horn (item #2)"));
        assert!(!verdict.reason.contains("Forks"));
    }

    #[tokio::test]
    async fn failing_delegate_falls_back_to_unsafe() {
        let service = SafetyService::new(Arc::new(FailingAnalyzer));
        let verdict = service.analyze_with_fallback(&[record(1, "Forks", true)]).await;
        assert_eq!(verdict, fallback_verdict());
        assert!(verdict.reason.contains("contact your supervisor"));
    }

    #[tokio::test]
    async fn delegate_cannot_fail_open_on_unsafe_items() {
        let service = SafetyService::new(Arc::new(AlwaysSafeAnalyzer));
        let verdict = service
            .analyze_with_fallback(&[record(1, "Forks", true), record(2, "Mast chain", false)])
            .await;
        assert!(!verdict.is_safe);
        assert!(verdict.reason.contains("Mast chain"));
    }

    #[tokio::test]
    async fn empty_input_is_treated_as_unavailable() {
        let service = SafetyService::new(Arc::new(RuleBasedSafetyAnalyzer));
        let verdict = service.analyze_with_fallback(&[]).await;
        assert!(!verdict.is_safe);
    }

    #[tokio::test]
    async fn unreachable_remote_service_falls_back() {
        let service = SafetyService::from_mode(&AnalysisMode::Remote {
            api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: "test".to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(2),
        });
        let verdict = service.analyze_with_fallback(&[record(1, "Forks", true)]).await;
        assert_eq!(verdict, fallback_verdict());
    }

    #[test]
    fn request_body_carries_every_photo_and_answer() {
        let body = build_request_body("vision-model", &[record(1, "Forks", true), record(2, "Horn", false)]);
        assert_eq!(body["model"], "vision-model");

        let content = body["messages"][1]["content"].as_array().unwrap();
        assert_eq!(content.len(), 3);
        let text = content[0]["text"].as_str().unwrap();
        assert!(text.contains("Horn (item #2)"));
        assert!(text.contains("UNSAFE"));
        assert_eq!(content[2]["image_url"]["url"], PHOTO);
    }

    #[test]
    fn parses_plain_and_fenced_model_output() {
        let plain = json!({
            "choices": [{ "message": { "content": "{\"is_safe\": true, \"reason\": \"ok\"}" } }]
        });
        assert!(parse_response(&plain).unwrap().is_safe);

        let fenced = json!({
            "choices": [{ "message": { "content": "```json\n{\"is_safe\": false, \"reason\": \"Horn\"}\n```" } }]
        });
        let verdict = parse_response(&fenced).unwrap();
        assert!(!verdict.is_safe);
        assert_eq!(verdict.reason, "Horn");

        assert!(parse_response(&json!({ "choices": [] })).is_err());
        let garbage = json!({ "choices": [{ "message": { "content": "I think it is fine" } }] });
        assert!(parse_response(&garbage).is_err());
    }
}
