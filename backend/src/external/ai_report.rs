//! AI Quality Report Client
//!
//! Client for a Gemini-style `generateContent` API. The response is
//! constrained by a JSON schema to `{summary, strengths, improvements,
//! narrative}`. Without an API key the client produces a canned report from
//! the same aggregated data.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{classify_by_score, Attribute};

use crate::config::AiConfig;
use crate::error::{AppError, AppResult};

/// Marker for reports produced without calling the API
pub const MOCK_GENERATOR: &str = "mock";

/// Client for the generative report API
#[derive(Clone)]
pub struct AiReportClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http_client: Client,
}

/// Aggregated data a report is written from
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    /// What the report is about (e.g., "Green bean lot GB-1A2B3C4D (AA)")
    pub subject: String,
    /// Provenance and cupping facts, one per line
    pub facts: Vec<String>,
    pub average_score: Option<Decimal>,
    pub attribute_means: BTreeMap<Attribute, Decimal>,
}

impl ReportContext {
    /// Prompt sent to the model
    pub fn to_prompt(&self) -> String {
        let mut prompt = format!(
            "You are a specialty coffee quality analyst. Write a quality report for {}.\n\nData:\n",
            self.subject
        );
        for fact in &self.facts {
            prompt.push_str("- ");
            prompt.push_str(fact);
            prompt.push('\n');
        }
        if let Some(score) = self.average_score {
            prompt.push_str(&format!("- Average SCA score: {}\n", score));
        }
        if !self.attribute_means.is_empty() {
            prompt.push_str("- Attribute means:");
            for (attr, mean) in &self.attribute_means {
                prompt.push_str(&format!(" {}={}", attr.as_str(), mean));
            }
            prompt.push('\n');
        }
        prompt.push_str(
            "\nRespond with a short summary, the main strengths, concrete improvements \
             for the producer, and a narrative paragraph suitable for buyers.",
        );
        prompt
    }
}

/// Structured report returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub narrative: String,
    /// Model name, or "mock" for the canned fallback
    #[serde(default)]
    pub generated_by: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "strengths": { "type": "ARRAY", "items": { "type": "STRING" } },
            "improvements": { "type": "ARRAY", "items": { "type": "STRING" } },
            "narrative": { "type": "STRING" }
        },
        "required": ["summary", "strengths", "improvements", "narrative"]
    })
}

impl AiReportClient {
    /// Create a new client from configuration
    pub fn new(config: &AiConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            http_client,
        })
    }

    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }

    /// Generate a report, falling back to the canned one when no key is configured
    pub async fn generate(&self, context: &ReportContext) -> AppResult<QualityReport> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                tracing::debug!(subject = %context.subject, "No AI key configured, using mock report");
                return Ok(mock_report(context));
            }
        };

        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": context.to_prompt() }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        });

        tracing::info!(subject = %context.subject, model = %self.model, "Requesting AI quality report");

        let response = self
            .http_client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::AiReportError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::AiReportError(format!(
                "API returned {}: {}",
                status, error_text
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AppError::AiReportError(format!("Failed to parse response: {}", e)))?;

        let text = payload
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or_else(|| AppError::AiReportError("Response contained no text".to_string()))?;

        let mut report: QualityReport = serde_json::from_str(&text)
            .map_err(|e| AppError::AiReportError(format!("Malformed report JSON: {}", e)))?;
        report.generated_by = self.model.clone();
        Ok(report)
    }
}

/// Canned report built from the aggregated data
pub fn mock_report(context: &ReportContext) -> QualityReport {
    let summary = match context.average_score {
        Some(score) => format!(
            "{} averages {} points on the SCA scale ({}).",
            context.subject,
            score,
            classify_by_score(score)
        ),
        None => format!("{} has not been cupped yet.", context.subject),
    };

    let mut ranked: Vec<(&Attribute, &Decimal)> = context
        .attribute_means
        .iter()
        .filter(|(attr, _)| attr.is_sensory())
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let strengths = if ranked.is_empty() {
        vec!["Complete provenance record from farm to green lot".to_string()]
    } else {
        ranked
            .iter()
            .take(2)
            .map(|(attr, mean)| format!("{} scored {} on average", attr.as_str(), mean))
            .collect()
    };

    let improvements = if ranked.is_empty() {
        vec!["Cup the lot to establish a quality baseline".to_string()]
    } else {
        ranked
            .iter()
            .rev()
            .take(2)
            .map(|(attr, mean)| {
                format!(
                    "{} averaged {}; review processing and drying for this attribute",
                    attr.as_str(),
                    mean
                )
            })
            .collect()
    };

    QualityReport {
        summary,
        strengths,
        improvements,
        narrative: context.facts.join(" "),
        generated_by: MOCK_GENERATOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(with_scores: bool) -> ReportContext {
        let mut attribute_means = BTreeMap::new();
        if with_scores {
            attribute_means.insert(Attribute::Flavor, Decimal::new(850, 2));
            attribute_means.insert(Attribute::Acidity, Decimal::new(775, 2));
            attribute_means.insert(Attribute::Body, Decimal::new(800, 2));
            attribute_means.insert(Attribute::Sweetness, Decimal::from(10));
        }
        ReportContext {
            subject: "Green bean lot GB-00000001 (AA)".to_string(),
            facts: vec!["Grown at Doi Chang.".to_string(), "Washed process.".to_string()],
            average_score: with_scores.then(|| Decimal::new(8650, 2)),
            attribute_means,
        }
    }

    #[test]
    fn test_mock_report_ranks_sensory_attributes() {
        let report = mock_report(&context(true));
        assert_eq!(report.generated_by, MOCK_GENERATOR);
        assert!(report.summary.contains("86.50"));
        assert!(report.summary.contains("Excellent"));
        assert!(report.strengths[0].starts_with("flavor"));
        assert!(report.improvements[0].starts_with("acidity"));
        assert_eq!(report.narrative, "Grown at Doi Chang. Washed process.");
    }

    #[test]
    fn test_mock_report_without_scores() {
        let report = mock_report(&context(false));
        assert!(report.summary.contains("not been cupped"));
        assert_eq!(report.strengths.len(), 1);
        assert_eq!(report.improvements.len(), 1);
    }

    #[test]
    fn test_prompt_includes_data() {
        let prompt = context(true).to_prompt();
        assert!(prompt.contains("GB-00000001"));
        assert!(prompt.contains("Average SCA score: 86.50"));
        assert!(prompt.contains("flavor=8.50"));
    }

    #[tokio::test]
    async fn test_client_without_key_is_mock() {
        let client = AiReportClient::new(&crate::config::Config::default().ai).unwrap();
        assert!(client.is_mock());
        let report = client.generate(&context(true)).await.unwrap();
        assert_eq!(report.generated_by, MOCK_GENERATOR);
    }
}
