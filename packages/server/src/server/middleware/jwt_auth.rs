use crate::common::ProfileId;
use crate::domains::auth::JwtService;
use axum::{middleware::Next, response::Response};
use std::sync::Arc;
use tracing::debug;

/// Authenticated identity from a verified bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity: ProfileId,
    pub email: String,
    pub display_name: Option<String>,
}

/// JWT authentication middleware
///
/// Extracts the token from the Authorization header, verifies it, and adds AuthUser to
/// request extensions. Without a token, or with an invalid one, the request continues
/// anonymously.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt_service);

    if let Some(user) = auth_user {
        debug!(identity = %user.identity, "Authenticated request");
        request.extensions_mut().insert(user);
    } else {
        debug!("No valid authentication token");
    }

    next.run(request).await
}

/// Extract and verify JWT token from request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Accept both "Bearer <token>" and a raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        identity: ProfileId::from_uuid(claims.sub),
        email: claims.email,
        display_name: claims.name,
    })
}
