use crate::pipeline::CLASS_LABELS;
use serde::Serialize;
use shared::PredictionResult;

pub const REPORT_SUBJECT: &str = "AI Prediction Report - Ovarian Cancer Detection";

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport error: {0}")]
    Transport(String),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Report fields handed to the notification collaborator, which owns
/// templating and delivery. All probabilities are formatted here as
/// two-decimal percentages; this is the only place fractions leave the
/// data model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReport {
    pub subject: String,
    pub highest_class: String,
    /// Two-decimal percentage, e.g. "93.12".
    pub highest_probability: String,
    /// One `label: value%` line per class, in label-index order.
    pub predictions: String,
}

pub fn render_report(result: &PredictionResult) -> RenderedReport {
    let predictions = CLASS_LABELS
        .iter()
        .map(|label| {
            let prob = match result.predictions.get(*label) {
                Some(&p) => p,
                None => {
                    // The pipeline always fills all five labels; a miss here
                    // means the label table drifted.
                    log::warn!("Prediction table is missing label {}; rendering 0", label);
                    0.0
                }
            };
            format!("{}: {:.2}%", label, prob * 100.0)
        })
        .collect::<Vec<_>>()
        .join("\n");

    RenderedReport {
        subject: REPORT_SUBJECT.to_string(),
        highest_class: result.highest_class.clone(),
        highest_probability: format!("{:.2}", result.highest_probability * 100.0),
        predictions,
    }
}

/// Outbound transport contract. Failures are independent of classification:
/// a failed send never touches the cached prediction.
pub trait NotificationSender: Send + Sync {
    fn send(&self, recipient: &str, report: &RenderedReport) -> Result<(), NotificationError>;
}

/// Ships rendered reports to a delivery webhook as JSON. Called from request
/// handlers through `web::block`, hence the blocking client.
pub struct WebhookNotifier {
    client: reqwest::blocking::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    pub fn new(webhook_url: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            webhook_url,
        }
    }
}

impl NotificationSender for WebhookNotifier {
    fn send(&self, recipient: &str, report: &RenderedReport) -> Result<(), NotificationError> {
        let payload = serde_json::json!({
            "recipient": recipient,
            "subject": report.subject,
            "highest_class": report.highest_class,
            "highest_probability": report.highest_probability,
            "predictions": report.predictions,
        });

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Rejected(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        log::info!("Notification dispatched to {}", recipient);
        Ok(())
    }
}
