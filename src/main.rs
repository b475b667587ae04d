use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{Compress, Logger};
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use siteops::ai::AiService;
use siteops::api;
use siteops::config::AppConfig;
use siteops::database::{ensure_indexes, DocumentStore, MongoStore};
use siteops::events::EventBus;
use siteops::middleware::RequestMetrics;
use siteops::seeds;
use siteops::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    log::info!("🚀 Starting SiteOps Service...");

    let store: Arc<dyn DocumentStore> = Arc::new(MongoStore::connect(&config.database_url).await.map_err(|e| {
        log::error!("❌ Failed to connect to MongoDB: {}", e);
        io::Error::other(e)
    })?);
    log::info!("✅ MongoDB connected successfully");

    ensure_indexes(store.as_ref()).await.map_err(io::Error::other)?;

    // 🌱 Seeds
    if config.seed_demo_data {
        if let Err(e) = seeds::seed_demo_data(store.clone()).await {
            log::error!("❌ Demo seed failed: {}", e);
        }
    }
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if let Err(e) = seeds::seed_admin(store.clone(), email, password).await {
            log::error!("❌ Admin seed failed: {}", e);
        }
    }

    let ai = AiService::from_config(&config.ai).map_err(io::Error::other)?;
    let providers = ai.providers();
    if providers.is_empty() {
        log::warn!("⚠️  No AI provider configured, /api/v1/ai routes will answer 503");
    } else {
        log::info!("🤖 AI providers: {:?} (default {})", providers, config.ai.default_provider);
    }

    let host = config.host.clone();
    let port = config.port;
    let state = web::Data::new(AppState::new(store, EventBus::new(), ai, config));

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);
    log::info!("🔌 Event socket at: ws://{}:{}/ws?token=<access token>", host, port);

    HttpServer::new(move || {
        let cors = state
            .config
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PATCH", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::CACHE_CONTROL,
                header::PRAGMA,
            ])
            .expose_headers(vec![header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(RequestMetrics)
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", api::swagger::ApiDoc::openapi()))
            .configure(api::routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
