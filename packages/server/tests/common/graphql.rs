//! GraphQL client for integration testing.
//!
//! Executes GraphQL queries directly against the schema without HTTP overhead.

use juniper::{ScalarValue, Variables};
use newsroom_core::common::Viewer;
use newsroom_core::kernel::ServerDeps;
use newsroom_core::server::graphql::{create_schema, GraphQLContext, Schema};
use serde_json::Value;
use std::sync::Arc;

/// GraphQL client for executing queries and mutations in tests.
pub struct GraphQLClient {
    schema: Schema,
    context: GraphQLContext,
}

/// An error returned by the schema, with its extensions flattened
#[derive(Debug, Clone)]
pub struct GraphQLErrorInfo {
    pub message: String,
    pub code: Option<String>,
    pub retryable: Option<bool>,
}

/// Result of a GraphQL execution.
#[derive(Debug)]
pub struct GraphQLResult {
    pub data: Option<Value>,
    pub errors: Vec<GraphQLErrorInfo>,
}

impl GraphQLResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Unwraps the data, panicking if there were errors.
    pub fn unwrap(self) -> Value {
        if !self.errors.is_empty() {
            panic!("GraphQL errors: {:?}", self.errors);
        }
        self.data.expect("No data returned")
    }

    /// Code of the first error, if any
    pub fn error_code(&self) -> Option<&str> {
        self.errors.first().and_then(|e| e.code.as_deref())
    }

    /// Gets a value at the given dotted JSON path, e.g. `createPost.slug`.
    pub fn get(&self, path: &str) -> Value {
        let data = self.data.as_ref().expect("No data returned");
        let mut current = data;
        for key in path.split('.') {
            current = &current[key];
        }
        current.clone()
    }
}

impl GraphQLClient {
    /// Anonymous client
    pub fn new(deps: Arc<ServerDeps>) -> Self {
        Self::with_viewer(deps, Viewer::anonymous())
    }

    pub fn with_viewer(deps: Arc<ServerDeps>, viewer: Viewer) -> Self {
        Self {
            schema: create_schema(),
            context: GraphQLContext::new(deps, viewer),
        }
    }

    pub async fn execute(&self, query: &str) -> GraphQLResult {
        self.execute_with_vars(query, Variables::new()).await
    }

    pub async fn execute_with_vars(&self, query: &str, variables: Variables) -> GraphQLResult {
        let (result, errors) =
            juniper::execute(query, None, &self.schema, &variables, &self.context)
                .await
                .expect("GraphQL execution failed");

        let data = Some(serde_json::to_value(&result).expect("Failed to serialize GraphQL result"));

        let errors = errors
            .iter()
            .map(|e| {
                let extensions = e.error().extensions().as_object_value();
                GraphQLErrorInfo {
                    message: e.error().message().to_string(),
                    code: extensions
                        .and_then(|o| o.get_field_value("code"))
                        .and_then(|v| v.as_string_value())
                        .map(String::from),
                    retryable: extensions
                        .and_then(|o| o.get_field_value("retryable"))
                        .and_then(|v| v.as_scalar())
                        .and_then(|s| s.as_bool()),
                }
            })
            .collect();

        GraphQLResult { data, errors }
    }

    /// Execute a query and expect success, returning the data.
    pub async fn query(&self, query: &str) -> Value {
        self.execute(query).await.unwrap()
    }

    pub async fn query_with_vars(&self, query: &str, variables: Variables) -> Value {
        self.execute_with_vars(query, variables).await.unwrap()
    }
}
