use crate::error::Error;
use crate::probs::ProblemDetails;
use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

pub(crate) struct APIError(anyhow::Error);

impl APIError {
    fn rejection(&self) -> Option<&JsonRejection> {
        match self.0.downcast_ref::<Error>() {
            Some(Error::JsonExtractorRejection(err)) => Some(err),
            _ => self.0.downcast_ref::<JsonRejection>(),
        }
    }

    fn problem(&self) -> ProblemDetails {
        if let Some(prob) = self.0.downcast_ref::<ProblemDetails>() {
            return prob.clone();
        }
        if let Some(rejection) = self.rejection() {
            let status = rejection.status();
            let prob = if status.is_client_error() {
                ProblemDetails::malformed(rejection.body_text())
            } else {
                ProblemDetails::server_internal("internal error")
            };
            return prob.with_status(status.as_u16());
        }
        match self.0.downcast_ref::<Error>() {
            Some(err) => err.into(),
            None => ProblemDetails::server_internal("internal error"),
        }
    }
}

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let prob = self.problem();
        let status = StatusCode::from_u16(prob.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("API error: {:#}", self.0);
        }
        (
            status,
            [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
            Json(prob),
        )
            .into_response()
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
