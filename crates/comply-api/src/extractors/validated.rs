//! JSON body extractor that runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use comply_core::error::AppError;

use crate::error::ApiError;

/// A JSON body that passed its `#[validate]` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;
        value.validate().map_err(validation_error)?;
        Ok(Self(value))
    }
}

/// 422 whose message is the first failure and whose details list every
/// failing field.
pub fn validation_error(errors: ValidationErrors) -> ApiError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut details = serde_json::Map::new();
    let mut first = None;
    for (field, errs) in fields {
        let messages: Vec<String> = errs
            .iter()
            .map(|e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("The {field} field is invalid."),
            })
            .collect();
        if first.is_none() {
            first = messages.first().cloned();
        }
        details.insert(field.to_string(), serde_json::json!(messages));
    }

    let message = first.unwrap_or_else(|| "The given data was invalid.".to_string());
    ApiError::from(AppError::validation(message)).with_details(serde_json::Value::Object(details))
}
