//! JSON body extractor whose rejections use the API error envelope.

use axum::{
    extract::{FromRequest, Request, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::error::{AppError, FieldError};

/// Drop-in for [`axum::Json`]. Malformed bodies answer 400 with field errors
/// instead of axum's plain-text 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => match field_error(&err.body_text()) {
                Some(field) => AppError::Validation(vec![field]),
                None => AppError::BadRequest(err.body_text()),
            },
            JsonRejection::JsonSyntaxError(_) => {
                AppError::BadRequest("Request body is not valid JSON".to_string())
            }
            JsonRejection::MissingJsonContentType(_) => AppError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ),
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

/// Pull the offending field out of a body deserialization message.
///
/// Messages look like `path.to[0].field: reason at line 1 column 9` or
/// `missing field `name` at line 1 column 2`, optionally behind axum's
/// "Failed to deserialize ..." prefix.
fn field_error(detail: &str) -> Option<FieldError> {
    let detail = detail
        .split_once("target type: ")
        .map_or(detail, |(_, rest)| rest);
    let (path, reason) = match detail.split_once(": ") {
        Some((path, reason)) if !path.is_empty() && path != "." && !path.contains(' ') => {
            (Some(path), reason)
        }
        _ => (None, detail),
    };
    let missing = reason
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(name, _)| name);

    let field = match (path, missing) {
        (Some(path), Some(name)) => format!("{path}.{name}"),
        (Some(path), None) => path.to_string(),
        (None, Some(name)) => name.to_string(),
        (None, None) => return None,
    };
    let message = reason
        .split(" at line ")
        .next()
        .unwrap_or(reason)
        .to_string();
    Some(FieldError { field, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_top_level_field() {
        let err = field_error(
            "Failed to deserialize the JSON body into the target type: missing field `product_id` at line 1 column 14",
        )
        .expect("field");
        assert_eq!(err.field, "product_id");
        assert_eq!(err.message, "missing field `product_id`");
    }

    #[test]
    fn invalid_value_keeps_the_path() {
        let err = field_error(
            "Failed to deserialize the JSON body into the target type: product_id: UUID parsing failed: invalid character: expected an optional prefix of `urn:uuid:` followed by [0-9a-fA-F-], found `n` at 1 at line 1 column 20",
        )
        .expect("field");
        assert_eq!(err.field, "product_id");
        assert!(err.message.starts_with("UUID parsing failed"));
    }

    #[test]
    fn missing_field_inside_a_list_item() {
        let err = field_error("items[0]: missing field `quantity` at line 1 column 40").expect("field");
        assert_eq!(err.field, "items[0].quantity");
    }

    #[test]
    fn root_type_mismatch_has_no_field() {
        assert!(field_error("invalid type: sequence, expected struct AddToCartRequest at line 1 column 0").is_none());
    }
}
