use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use foodshare_api::foods;
use foodshare_api::requests;
use foodshare_api::session::{self, AppState, AppStateInner, require_session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodshare=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("FOODSHARE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("FOODSHARE_DB_PATH").unwrap_or_else(|_| "foodshare.db".into());
    let host = std::env::var("FOODSHARE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("FOODSHARE_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;

    // Init database — one shared handle for the whole process
    let db = foodshare_db::Database::open(&PathBuf::from(&db_path))?;

    let state: AppState = Arc::new(AppStateInner { db, jwt_secret });

    // Routes
    let public_routes = Router::new()
        .route("/", get(home))
        .route(
            "/session",
            post(session::issue_session).delete(session::revoke_session),
        )
        .route("/foods", post(foods::create_food).get(foods::list_foods))
        .route("/foods/{id}", get(foods::get_food))
        .route("/foods/{id}/request", post(requests::submit_request))
        .route(
            "/myfoods/{id}",
            put(foods::update_food).delete(foods::delete_food),
        )
        .route("/requests/{email}", get(requests::list_donor_requests))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/myfoods", get(foods::list_my_foods))
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer()?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Foodshare server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home() -> &'static str {
    "Foodshare server is running"
}

/// The session cookie rides on cross-origin requests, so credentials
/// are enabled and the origin list must be explicit.
fn cors_layer() -> anyhow::Result<CorsLayer> {
    let origins = std::env::var("FOODSHARE_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173".into());

    let origins: Vec<HeaderValue> = origins
        .split(',')
        .map(|o| o.trim().parse())
        .collect::<Result<_, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
