//! Request extractors that validate their payload and reject with
//! `{"detail": ...}` bodies instead of axum's plain-text rejections.

use axum::{
    async_trait,
    extract::{
        rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Request,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::Validate;

use crate::{Error, Result};

/// JSON body that passed `Validate`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Response> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value
            .validate()
            .map_err(|e| Error::from(e).into_response())?;
        Ok(Self(value))
    }
}

/// Query string that passed `Validate`.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|e: QueryRejection| Error::Validation(e.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path parameters; a segment that does not parse is a 422, not axum's
/// plain-text 400.
#[derive(Debug, Clone)]
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| Error::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// URL-encoded form body.
#[derive(Debug, Clone)]
pub struct FormBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Response> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(form_rejection)?;
        Ok(Self(value))
    }
}

fn json_rejection(rejection: JsonRejection) -> Response {
    match rejection {
        JsonRejection::JsonDataError(e) => Error::Validation(e.body_text()).into_response(),
        JsonRejection::JsonSyntaxError(e) => Error::BadRequest(e.body_text()).into_response(),
        other => detail_response(other.status(), other.body_text()),
    }
}

fn form_rejection(rejection: FormRejection) -> Response {
    match rejection {
        FormRejection::FailedToDeserializeForm(e) => Error::Validation(e.body_text()).into_response(),
        FormRejection::FailedToDeserializeFormBody(e) => {
            Error::Validation(e.body_text()).into_response()
        }
        other => detail_response(other.status(), other.body_text()),
    }
}

/// Keep axum's status (413, 415, ...) but use the common body shape.
fn detail_response(status: StatusCode, detail: String) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}
