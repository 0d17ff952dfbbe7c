use crate::server::graphql::{GraphQLContext, Schema};
use axum::{
    extract::{Extension, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use juniper::http::{GraphQLBatchRequest, GraphQLRequest};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

/// GraphQL POST endpoint
pub async fn graphql_handler(
    State(schema): State<Arc<Schema>>,
    Extension(context): Extension<GraphQLContext>,
    Json(request): Json<GraphQLRequest>,
) -> Response {
    let response = request.execute(&schema, &context).await;
    respond(response.is_ok(), &response)
}

/// GraphQL batch POST endpoint
pub async fn graphql_batch_handler(
    State(schema): State<Arc<Schema>>,
    Extension(context): Extension<GraphQLContext>,
    Json(batch): Json<GraphQLBatchRequest>,
) -> Response {
    let response = batch.execute(&schema, &context).await;
    respond(response.is_ok(), &response)
}

/// GraphiQL in debug builds; release builds answer 404.
pub async fn graphql_playground() -> Response {
    if cfg!(debug_assertions) {
        let source = juniper::http::graphiql::graphiql_source("/graphql", None);
        (
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            source,
        )
            .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

fn respond<T: Serialize>(executed: bool, response: &T) -> Response {
    let body = match serde_json::to_value(response) {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "Failed to serialize GraphQL response");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let status = response_status(executed, &body);
    if status == StatusCode::SERVICE_UNAVAILABLE {
        warn!("GraphQL request produced no data, only retryable errors");
    }

    (status, Json(body)).into_response()
}

/// 400 when the request never executed (parse or validation failure), 503 when
/// every response carries no data and only retryable errors, otherwise 200.
fn response_status(executed: bool, body: &Value) -> StatusCode {
    if !executed {
        return StatusCode::BAD_REQUEST;
    }

    let unavailable = match body {
        Value::Array(responses) => {
            !responses.is_empty() && responses.iter().all(only_retryable_errors)
        }
        single => only_retryable_errors(single),
    };

    if unavailable {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

fn only_retryable_errors(response: &Value) -> bool {
    let no_data = response.get("data").map_or(true, Value::is_null);
    let errors = match response.get("errors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => errors,
        _ => return false,
    };

    no_data
        && errors.iter().all(|e| {
            e.pointer("/extensions/retryable")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        })
}
