//! Application setup and server configuration.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::{Extension, Request},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use object_storage::{StorageOptions, StorageService};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::common::{AppError, Viewer};
use crate::config::Config;
use crate::domains::auth::JwtService;
use crate::domains::profiles::actions::ensure_viewer;
use crate::kernel::{
    BaseObjectStorage, BucketStorage, LocalObjectStorage, PostgresContentStore, ServerDeps,
};
use crate::server::graphql::{create_schema, GraphQLContext};
use crate::server::middleware::{
    jwt_auth_middleware, AuthUser, GRAPHQL_BURST_SIZE, GRAPHQL_REQUESTS_PER_SECOND,
};
use crate::server::routes::{
    graphql_batch_handler, graphql_handler, graphql_playground, health_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub deps: Arc<ServerDeps>,
    /// Where featured images go: "bucket" or "local"
    pub storage_mode: &'static str,
}

/// HTTP-level settings for build_app
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    /// Serve this directory under /uploads (local storage mode)
    pub local_uploads: Option<PathBuf>,
}

impl AppOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            request_timeout: config.request_timeout,
            local_uploads: match config.remote_storage {
                Some(_) => None,
                None => Some(config.upload_dir.clone()),
            },
        }
    }
}

/// Wire the Postgres store, object storage and JWT verification into ServerDeps
pub fn build_server_deps(config: &Config, pool: PgPool) -> Result<ServerDeps> {
    let storage: Arc<dyn BaseObjectStorage> = match &config.remote_storage {
        Some(remote) => {
            let service = StorageService::new(StorageOptions {
                endpoint: remote.url.clone(),
                service_key: remote.service_key.clone(),
                bucket: remote.bucket.clone(),
                timeout: config.request_timeout,
            })
            .context("Failed to create object storage client")?;
            info!(bucket = %remote.bucket, "Using remote object storage");
            Arc::new(BucketStorage::new(service))
        }
        None => {
            info!(dir = %config.upload_dir.display(), "Using local upload directory");
            Arc::new(LocalObjectStorage::new(
                config.upload_dir.clone(),
                config.public_base_url.clone(),
            ))
        }
    };

    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    Ok(ServerDeps::new(
        Arc::new(PostgresContentStore::new(pool)),
        storage,
        jwt_service,
        config.tag_conflict_policy,
        config.admin_emails.clone(),
    ))
}

/// Middleware to create GraphQLContext per-request
///
/// Verified identities get their profile ensured and roles loaded into the viewer.
async fn create_graphql_context(
    Extension(state): Extension<AxumAppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Populated by jwt_auth_middleware
    let auth_user = request.extensions().get::<AuthUser>().cloned();

    let viewer = match auth_user {
        Some(user) => {
            match ensure_viewer(
                user.identity,
                &user.email,
                user.display_name.as_deref(),
                &state.deps,
            )
            .await
            {
                Ok(viewer) => viewer,
                Err(e) => return viewer_error_response(e),
            }
        }
        None => Viewer::anonymous(),
    };

    request
        .extensions_mut()
        .insert(GraphQLContext::new(state.deps.clone(), viewer));

    next.run(request).await
}

fn viewer_error_response(e: AppError) -> Response {
    error!(error = %e, "Failed to load viewer");
    let status = if e.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, "failed to load viewer").into_response()
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid origin in ALLOWED_ORIGINS: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

/// Requests running past `timeout` are answered with 408
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps, options: AppOptions) -> Result<Router> {
    // GraphQL schema (singleton)
    let schema = Arc::new(create_schema());

    let app_state = AxumAppState {
        deps: Arc::new(deps),
        storage_mode: if options.local_uploads.is_some() {
            "local"
        } else {
            "bucket"
        },
    };

    let jwt_service = app_state.deps.jwt_service.clone();

    // Keyed by peer address; requires ConnectInfo<SocketAddr>
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(GRAPHQL_REQUESTS_PER_SECOND)
            .burst_size(GRAPHQL_BURST_SIZE)
            .finish()
            .context("Invalid rate limiter configuration")?,
    );
    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    // GET serves the playground; it answers 404 in release builds
    let graphql_route = post(graphql_handler).get(graphql_playground);

    let graphql = Router::new()
        .route("/graphql", graphql_route)
        .route("/graphql/batch", post(graphql_batch_handler))
        // Applied in reverse order: rate limit, then auth, then context
        .layer(middleware::from_fn(create_graphql_context))
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service.clone(), req, next)
        }))
        .layer(rate_limit_layer)
        .with_state(schema);

    let mut router = Router::new()
        .merge(graphql)
        .route("/health", get(health_handler));

    if let Some(dir) = &options.local_uploads {
        router = router.nest_service("/uploads", ServeDir::new(dir));
    }

    Ok(router
        .layer(Extension(app_state))
        .layer(timeout_layer(options.request_timeout))
        .layer(cors_layer(&options.allowed_origins)?)
        .layer(TraceLayer::new_for_http()))
}
