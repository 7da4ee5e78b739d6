use crate::api::api_error::APIError;
use crate::api::model::{AddrsRequest, AddrsResult, Dns01Request, Dns01Result};
use crate::api::server::AppState;
use crate::probs::ProblemDetails;
use crate::va::{available_addresses, Challenge};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::net::SocketAddr;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/dns-01", post(dns01))
        .route("/addrs", post(addrs))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn dns01(
    State(state): State<AppState>,
    ConnectInfo(client_addr): ConnectInfo<SocketAddr>,
    WithRejection(Json(payload), _): WithRejection<Json<Dns01Request>, APIError>,
) -> Result<Json<Dns01Result>, APIError> {
    let client_addr = client_addr.ip();
    let ident = &payload.identifier;

    if let Err(err) = payload.valid_key_authorization() {
        tracing::debug!("rejected DNS-01 request from {client_addr} for {ident}: {err}");
        return Err(ProblemDetails::malformed(format!("invalid key authorization: {err}")).into());
    }

    let ctx = state.lookup_context();
    let challenge = Challenge::new(payload.key_authorization.clone());
    match state.va.validate_dns01(&ctx, ident, &challenge).await {
        Ok(records) => {
            tracing::info!("validated DNS-01 for {ident} requested by {client_addr}");
            Ok(Json(Dns01Result { records }))
        }
        Err(prob) => {
            tracing::info!("DNS-01 for {ident} requested by {client_addr} failed: {prob}");
            Err(prob.into())
        }
    }
}

async fn addrs(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<AddrsRequest>, APIError>,
) -> Result<Json<AddrsResult>, APIError> {
    let ctx = state.lookup_context();
    let addresses = state.va.get_addrs(&ctx, &payload.hostname).await?;
    let (v4, v6) = available_addresses(&addresses);
    Ok(Json(AddrsResult { addresses, v4, v6 }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::identifier::Identifier;
    use crate::resolver::mock::{MockResolver, GOOD_KEY_AUTHORIZATION};
    use crate::va::ValidationAuthority;
    use axum::http::StatusCode;
    use axum::response::Response;
    use std::marker::PhantomData;
    use std::sync::Arc;
    use std::time::Duration;

    fn state() -> AppState {
        let config = Config {
            api_bind_addr: "127.0.0.1:0".parse().unwrap(),
            api_timeout: Duration::from_secs(10),
            lookup_timeout: Duration::from_secs(5),
            resolver_addrs: vec![],
            resolver_port: 53,
            resolver_timeout: Duration::from_secs(2),
            resolver_attempts: 2,
        };
        AppState {
            config: Arc::new(config),
            va: ValidationAuthority::new(Arc::new(MockResolver::new())),
        }
    }

    fn client() -> ConnectInfo<SocketAddr> {
        ConnectInfo("127.0.0.1:4000".parse().unwrap())
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post_dns01(domain: &str, key_authorization: &str) -> Response {
        let req = Dns01Request {
            identifier: Identifier::dns(domain),
            key_authorization: key_authorization.to_string(),
        };
        dns01(State(state()), client(), WithRejection(Json(req), PhantomData))
            .await
            .into_response()
    }

    #[tokio::test]
    async fn dns01_success() {
        let resp = post_dns01("good-dns01.com", GOOD_KEY_AUTHORIZATION).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({"records": [{"hostname": "good-dns01.com"}]})
        );
    }

    #[tokio::test]
    async fn dns01_unauthorized_problem() {
        let resp = post_dns01("wrong-dns01.com", GOOD_KEY_AUTHORIZATION).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            resp.headers()[axum::http::header::CONTENT_TYPE],
            "application/problem+json"
        );
        let body = body_json(resp).await;
        assert_eq!(body["type"], "urn:ietf:params:acme:error:unauthorized");
        assert_eq!(body["reason"], "incorrectTxtRecord");
    }

    #[tokio::test]
    async fn dns01_malformed_key_authorization() {
        let resp = post_dns01("good-dns01.com", "nope").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["type"], "urn:ietf:params:acme:error:malformed");
    }

    #[tokio::test]
    async fn addrs_splits_families() {
        let req = AddrsRequest {
            hostname: "ipv4.and.ipv6.localhost".to_string(),
        };
        let resp = addrs(State(state()), WithRejection(Json(req), PhantomData))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({
                "addresses": ["::1", "127.0.0.1"],
                "v4": ["127.0.0.1"],
                "v6": ["::1"],
            })
        );
    }

    #[tokio::test]
    async fn addrs_dns_problem() {
        let req = AddrsRequest {
            hostname: "always.invalid".to_string(),
        };
        let resp = addrs(State(state()), WithRejection(Json(req), PhantomData))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["type"], "urn:ietf:params:acme:error:dns");
        assert_eq!(body["detail"], "No valid IP addresses found for always.invalid");
    }
}
