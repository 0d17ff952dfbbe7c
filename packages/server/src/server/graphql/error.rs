//! Mapping from `AppError` onto GraphQL errors.
//!
//! Every error carries `extensions.code` and `extensions.retryable` so clients
//! can tell a rejected request from one worth sending again.

use juniper::{FieldError, Object, Value};
use tracing::{error, warn};

use crate::common::{AppError, ErrorClass};

pub fn to_field_error(e: AppError) -> FieldError {
    match e.class() {
        ErrorClass::Transport => warn!(error = %e, "Transport failure while resolving field"),
        ErrorClass::Rejected if matches!(e, AppError::Backend(_)) => {
            error!(error = %e, "Backend rejected request")
        }
        _ => {}
    }

    let mut extensions = Object::with_capacity(2);
    extensions.add_field("code", Value::scalar(e.code().to_string()));
    extensions.add_field("retryable", Value::scalar(e.is_retryable()));

    FieldError::new(e.to_string(), Value::Object(extensions))
}
