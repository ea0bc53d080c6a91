use actix_cors::Cors;
use actix_multipart::form::MultipartFormConfig;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use forum_content::handlers;
use forum_content::handlers::forms::multipart_error_handler;
use forum_content::jobs::start_orphan_sweep;
use forum_content::media::MediaStore;
use forum_content::middleware::{init_validation_key, SessionAuthMiddleware};
use forum_content::services::TagCatalog;
use forum_content::{db, metrics, Config};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
}

impl HealthState {
    async fn check_postgres(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.db_pool)
            .await
            .map(|_| ())
    }
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "forum-content",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "forum-content"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting forum-content v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    init_validation_key(&config.auth.jwt_secret);

    // Initialize database connection pool
    let db_pool = match db::create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&db_pool).await {
        tracing::error!("Migration failed: {:#}", e);
        return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
    }

    tracing::info!("Connected to database, schema up to date");

    // Load the read-only tag catalog once; it is immutable for the process
    // lifetime.
    let catalog = match db::tag_repo::load_tags(&db_pool).await {
        Ok(tags) => {
            tracing::info!(count = tags.len(), "tag catalog loaded");
            TagCatalog::new(tags)
        }
        Err(e) => {
            tracing::error!("Tag catalog load failed: {:#}", e);
            return Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
        }
    };

    let store = MediaStore::new(config.storage.upload_dir.clone());
    let max_form_bytes = config.storage.max_form_bytes;

    // Reclaim media files orphaned by earlier failures, then keep sweeping.
    tokio::spawn(start_orphan_sweep(db_pool.clone(), store.clone()));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });
    let catalog_data = web::Data::new(catalog);
    let store_data = web::Data::new(store);
    let config_data = web::Data::new(config.clone());

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(health_state.clone())
            .app_data(catalog_data.clone())
            .app_data(store_data.clone())
            .app_data(config_data.clone())
            .app_data(
                // Overall multipart bound; checked before field parsing
                // proceeds past the limit.
                MultipartFormConfig::default()
                    .total_limit(max_form_bytes)
                    .memory_limit(max_form_bytes)
                    .error_handler(multipart_error_handler),
            )
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            // Health check endpoints
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/api/v1")
                    .wrap(SessionAuthMiddleware)
                    .route("/tags", web::get().to(handlers::get_tags))
                    .service(
                        web::scope("/posts")
                            .service(
                                web::resource("").route(web::post().to(handlers::create_post)),
                            )
                            .service(
                                web::resource("/{post_id}")
                                    .route(web::get().to(handlers::get_post))
                                    .route(web::put().to(handlers::edit_post)),
                            ),
                    )
                    .service(
                        web::scope("/comments").service(
                            web::resource("/{comment_id}")
                                .route(web::get().to(handlers::get_comment))
                                .route(web::put().to(handlers::edit_comment)),
                        ),
                    ),
            )
    })
    .bind(&bind_address)?
    .workers(4)
    .run()
    .await
}
