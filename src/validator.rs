use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use sysacad_core::AppError;
use validator::Validate;

/// JSON body extractor that also runs the `validator` derive rules.
///
/// Malformed or mistyped JSON is a 400; rule failures are a 422 carrying the
/// field-scoped messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let error_msg = rejection.body_text();

    if error_msg.contains("missing field") {
        let field = error_msg
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::bad_request(anyhow!("{} is required", field));
    }

    if error_msg.contains("unknown variant") {
        let detail = error_msg
            .split("target type: ")
            .nth(1)
            .unwrap_or(&error_msg)
            .to_string();
        return AppError::bad_request(anyhow!("Invalid choice: {}", detail));
    }

    if error_msg.contains("invalid type") || error_msg.contains("input contains invalid") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    AppError::new(StatusCode::BAD_REQUEST, anyhow!("Invalid request body"))
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value.validate().map_err(AppError::validation)?;

        Ok(ValidatedJson(value))
    }
}
