use async_trait::async_trait;
use rand::RngCore;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::domain::{digits_only, CreditScore};
use crate::config::CreditServiceConfig;
use crate::telemetry::mask_cpf;

/// Bureau answer for a single taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditReport {
    pub status: String,
    pub score: CreditScore,
}

/// Outbound credit bureau. Implementations must fail rather than invent a score.
#[async_trait]
pub trait CreditService: Send + Sync {
    async fn fetch_score(&self, cpf: &str) -> Result<CreditReport, CreditServiceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CreditServiceError {
    #[error("cpf is required")]
    MissingDocument,
    #[error("credit service unreachable: {0}")]
    Transport(String),
    #[error("credit service responded with status {0}")]
    UpstreamStatus(u16),
    #[error("credit service returned malformed data: {0}")]
    MalformedResponse(String),
}

/// `reqwest` client for the bureau's score endpoint.
#[derive(Debug, Clone)]
pub struct HttpCreditService {
    client: Client,
    endpoint: String,
}

impl HttpCreditService {
    pub fn new(config: &CreditServiceConfig) -> Result<Self, CreditServiceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| CreditServiceError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CreditService for HttpCreditService {
    async fn fetch_score(&self, cpf: &str) -> Result<CreditReport, CreditServiceError> {
        let document = digits_only(cpf);
        if document.is_empty() {
            return Err(CreditServiceError::MissingDocument);
        }

        info!(cpf = %mask_cpf(&document), "requesting credit score");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(session_token())
            .json(&score_request(&document))
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "credit service request failed");
                CreditServiceError::Transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "credit service rejected request");
            return Err(CreditServiceError::UpstreamStatus(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| CreditServiceError::MalformedResponse(err.to_string()))?;

        let report = parse_report(&body)?;
        info!(score = report.score.0, "credit score received");
        Ok(report)
    }
}

fn score_request(document: &str) -> Value {
    json!({
        "documento": document,
        "tipo_documento": "CPF",
        "parametros": {
            "consultar_score": true,
            "exibir_negativacoes": false,
        },
    })
}

/// Fresh random bearer token per request.
fn session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Extract `{score, status?}`; a missing or non-integer score is malformed.
pub(crate) fn parse_report(body: &Value) -> Result<CreditReport, CreditServiceError> {
    let score = match body.get("score") {
        Some(Value::Number(number)) => number.as_i64().ok_or_else(|| {
            CreditServiceError::MalformedResponse(format!("score {number} is not an integer"))
        })?,
        Some(other) => {
            return Err(CreditServiceError::MalformedResponse(format!(
                "score must be numeric, found {other}"
            )))
        }
        None => {
            return Err(CreditServiceError::MalformedResponse(
                "missing score field".to_string(),
            ))
        }
    };

    let status = body
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("Done")
        .to_string();

    Ok(CreditReport {
        status,
        score: CreditScore(score),
    })
}
