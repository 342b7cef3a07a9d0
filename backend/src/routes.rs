use crate::cache::PredictionCache;
use crate::notify::{self, NotificationSender};
use crate::pipeline::{ClassificationPipeline, PipelineError};
use actix_multipart::Multipart;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info, warn};
use serde::Serialize;
use shared::{ClassifyResponse, NotifyRequest, NotifyResponse};
use std::io::Write;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// User-facing messages. Gate rejections and internal failures are kept
// generic; the precise reason only goes to the server logs.
const INVALID_COLOR_MESSAGE: &str =
    "Invalid image uploaded. Please upload a valid colored histopathology image.";
const GATE_REJECT_MESSAGE: &str =
    "Invalid image uploaded. Please upload a valid histopathology image (H&E-stained).";
const RETRY_LATER_MESSAGE: &str =
    "The prediction service is temporarily unavailable. Please try again later.";
const GENERIC_FAILURE_MESSAGE: &str =
    "Invalid image uploaded. Please upload a proper histopathology image.";

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/classify").route(web::post().to(handle_classify)))
        .service(web::resource("/api/notify").route(web::post().to(handle_notify)));
}

async fn handle_classify(
    req: HttpRequest,
    pipeline: web::Data<ClassificationPipeline>,
    cache: web::Data<PredictionCache>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    // Session identity comes from the hosting session mechanism when
    // present; otherwise one is minted and echoed back to the client.
    let session_id = req
        .headers()
        .get("X-Session-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut image_data: Vec<u8> = Vec::new();
    let mut recipient_email = String::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let field_name = field.name().unwrap_or("").to_string();
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            data.write_all(&chunk)?;
        }
        match field_name.as_str() {
            "image" => image_data = data,
            "recipient_email" => {
                recipient_email = match String::from_utf8(data) {
                    Ok(text) => text.trim().to_string(),
                    Err(_) => {
                        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                            error: "recipient_email must be valid UTF-8.".into(),
                        }));
                    }
                };
            }
            _ => {}
        }
    }

    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "No image file was uploaded.".into(),
        }));
    }
    if recipient_email.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Missing recipient_email field.".into(),
        }));
    }

    let pipeline = pipeline.into_inner();
    let email = recipient_email.clone();
    let outcome = web::block(move || pipeline.classify(&image_data, &email)).await;

    let response = match outcome {
        Ok(Ok(result)) => {
            cache.put(&session_id, result.clone());
            info!(
                "Session {}: classified as {} ({:.4})",
                session_id, result.highest_class, result.highest_probability
            );
            HttpResponse::Ok().json(ClassifyResponse { session_id, result })
        }
        Ok(Err(err)) => classify_error_response(&session_id, err),
        Err(e) => {
            // Worker panic or cancellation; collapse to the generic failure.
            error!("Session {}: classification task failed: {:?}", session_id, e);
            classify_error_response(&session_id, PipelineError::PipelineFailure)
        }
    };
    Ok(response)
}

fn classify_error_response(session_id: &str, err: PipelineError) -> HttpResponse {
    match err {
        PipelineError::UnsupportedFormat(_) => {
            warn!("Session {}: {}", session_id, err);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: format!("{}.", capitalize(&err.to_string())),
            })
        }
        PipelineError::InvalidColorMode => {
            warn!("Session {}: {}", session_id, err);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: INVALID_COLOR_MESSAGE.into(),
            })
        }
        PipelineError::ContentRejected(reason) => {
            warn!("Session {}: gate rejected upload ({})", session_id, reason);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: GATE_REJECT_MESSAGE.into(),
            })
        }
        PipelineError::ModelUnavailable(ref msg) => {
            error!("Session {}: model unavailable: {}", session_id, msg);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: RETRY_LATER_MESSAGE.into(),
            })
        }
        PipelineError::InferenceFailure(ref msg) => {
            error!("Session {}: inference failure: {}", session_id, msg);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: GENERIC_FAILURE_MESSAGE.into(),
            })
        }
        PipelineError::PipelineFailure => {
            error!("Session {}: pipeline failure", session_id);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: GENERIC_FAILURE_MESSAGE.into(),
            })
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

async fn handle_notify(
    body: web::Json<NotifyRequest>,
    cache: web::Data<PredictionCache>,
    notifier: web::Data<Arc<dyn NotificationSender>>,
) -> Result<HttpResponse, Error> {
    let session_id = body.into_inner().session_id;

    let Some(result) = cache.get(&session_id) else {
        // Normal outcome: nothing classified for this session yet, or the
        // session expired.
        info!("Session {}: no prediction available to notify about", session_id);
        return Ok(HttpResponse::NotFound()
            .json(NotifyResponse::error("No prediction available for this session.")));
    };

    let report = notify::render_report(&result);
    let recipient = result.recipient_email.clone();
    let sender = notifier.get_ref().clone();
    let sent = web::block(move || sender.send(&recipient, &report)).await;

    let response = match sent {
        Ok(Ok(())) => HttpResponse::Ok().json(NotifyResponse::success()),
        Ok(Err(e)) => {
            // Send failures never invalidate the cached prediction.
            error!("Session {}: notification failed: {}", session_id, e);
            HttpResponse::BadGateway().json(NotifyResponse::error(e.to_string()))
        }
        Err(e) => {
            error!("Session {}: notification task failed: {:?}", session_id, e);
            HttpResponse::InternalServerError()
                .json(NotifyResponse::error("Notification failed."))
        }
    };
    Ok(response)
}
