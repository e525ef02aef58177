// src/services/notification.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, validation::not_blank},
    models::shift::Shift,
};

pub const RESEND_API_URL: &str = "https://api.resend.com";

// Dados do e-mail "raport aprobat".
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShiftApprovedNotice {
    #[validate(custom(function = "not_blank"))]
    #[schema(example = "Site A")]
    pub shift_title: String,
    #[schema(example = "Alice")]
    pub approved_by: String,
    #[schema(example = "10.03.2026")]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_email: Option<String>,
}

impl ShiftApprovedNotice {
    /// Aviso de um turno recém-aprovado (data no formato dd.mm.aaaa).
    pub fn for_shift(shift: &Shift, approved_by: String, recipient_email: Option<String>) -> Self {
        Self {
            shift_title: shift.job_title.clone(),
            approved_by,
            date: shift.date.format("%d.%m.%Y").to_string(),
            recipient_email,
        }
    }
}

/// Resultado de um envio. Falha aqui nunca desfaz a aprovação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NotificationOutcome {
    Sent {
        #[schema(value_type = Object)]
        response: Value,
    },
    Skipped { reason: String },
    Failed { reason: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// `Ok(Sent | Skipped)` ou `Err(NotificationError)`.
    async fn shift_approved(&self, notice: &ShiftApprovedNotice) -> Result<NotificationOutcome, AppError>;
}

/// Versão "best effort" usada pela aprovação: loga e engole a falha.
pub async fn notify_best_effort(notifier: &dyn Notifier, notice: &ShiftApprovedNotice) -> NotificationOutcome {
    match notifier.shift_approved(notice).await {
        Ok(outcome) => {
            if let NotificationOutcome::Skipped { reason } = &outcome {
                tracing::info!("📭 Notificação ignorada: {}", reason);
            }
            outcome
        }
        Err(err) => {
            tracing::warn!("⚠️ Falha ao notificar aprovação de '{}': {}", notice.shift_title, err);
            NotificationOutcome::Failed { reason: err.to_string() }
        }
    }
}

// ---
// Sem RESEND_API_KEY: nada é enviado.
// ---
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn shift_approved(&self, _notice: &ShiftApprovedNotice) -> Result<NotificationOutcome, AppError> {
        Ok(NotificationOutcome::Skipped {
            reason: "RESEND_API_KEY not configured".to_string(),
        })
    }
}

// ---
// Resend (HTTP API)
// ---
pub struct ResendNotifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    from: String,
    fallback_recipient: Option<String>,
}

impl ResendNotifier {
    pub fn new(
        api_key: String,
        from: String,
        fallback_recipient: Option<String>,
    ) -> Result<Self, AppError> {
        Self::with_base_url(RESEND_API_URL.to_string(), api_key, from, fallback_recipient)
    }

    pub fn with_base_url(
        base_url: String,
        api_key: String,
        from: String,
        fallback_recipient: Option<String>,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            from,
            fallback_recipient,
        })
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn shift_approved(&self, notice: &ShiftApprovedNotice) -> Result<NotificationOutcome, AppError> {
        let recipient = notice
            .recipient_email
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .or(self.fallback_recipient.as_deref());

        let Some(recipient) = recipient else {
            return Ok(NotificationOutcome::Skipped {
                reason: "no recipient configured".to_string(),
            });
        };

        let body = json!({
            "from": self.from,
            "to": [recipient],
            "subject": format!("✅ Raport Aprobat: {}", notice.shift_title),
            "html": approval_html(notice),
        });

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::NotificationError(e.to_string()))?;

        let status = response.status();
        let payload: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(AppError::NotificationError(format!("Resend respondeu {}: {}", status, payload)));
        }

        tracing::info!("📧 Notificação de aprovação enviada para {}", recipient);
        Ok(NotificationOutcome::Sent { response: payload })
    }
}

fn approval_html(notice: &ShiftApprovedNotice) -> String {
    format!(
        r#"<div style="font-family: sans-serif; padding: 20px; color: #333;">
  <h2 style="color: #059669;">Raport Finalizat</h2>
  <p>Raportul pentru lucrarea <strong>{title}</strong> a fost aprobat și închis.</p>
  <hr style="border: 1px solid #eee; margin: 20px 0;" />
  <p><strong>Data lucrării:</strong> {date}</p>
  <p><strong>Semnat de:</strong> {by}</p>
</div>"#,
        title = escape_html(&notice.shift_title),
        date = escape_html(&notice.date),
        by = escape_html(&notice.approved_by),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
