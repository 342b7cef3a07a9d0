use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use histoscreen_backend::cache::PredictionCache;
use histoscreen_backend::config::GateConfig;
use histoscreen_backend::inference::{Classifier, InferenceEngine, TorchClassifier};
use histoscreen_backend::notify::{NotificationSender, WebhookNotifier};
use histoscreen_backend::pipeline::ClassificationPipeline;
use histoscreen_backend::routes::configure_routes;
use std::env;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let model_path =
        env::var("MODEL_PATH").unwrap_or_else(|_| "models/ovarian_subtype.pt".to_string());

    let gate_config = match env::var("GATE_CONFIG_PATH") {
        Ok(path) => match GateConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded gate config from {}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to load gate config from {}: {}; using defaults", path, e);
                GateConfig::default()
            }
        },
        Err(_) => GateConfig::default(),
    };

    // Lazy model load: the first classify request pays for it, and a missing
    // artifact surfaces as a per-request 503 instead of a crashed server.
    let engine = Arc::new(InferenceEngine::new(Box::new(move || {
        log::info!("Loading classifier from {}", model_path);
        TorchClassifier::load(&model_path).map(|c| Box::new(c) as Box<dyn Classifier>)
    })));

    let pipeline = web::Data::new(ClassificationPipeline::new(gate_config, engine));
    let cache = PredictionCache::new();

    let webhook_url = env::var("NOTIFY_WEBHOOK_URL")
        .unwrap_or_else(|_| "http://localhost:8081/hooks/notify".to_string());
    let notifier: Arc<dyn NotificationSender> = Arc::new(WebhookNotifier::new(webhook_url));

    let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());
    let bind_address = format!("0.0.0.0:{}", port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(pipeline.clone())
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(notifier.clone()))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
