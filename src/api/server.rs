use crate::api::routes;
use crate::config::Shared;
use crate::resolver::LookupContext;
use crate::va::ValidationAuthority;
use std::future::Future;
use std::net::SocketAddr;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: Shared,
    pub va: ValidationAuthority,
}

impl AppState {
    /// A fresh context for the lookups of one request.
    pub fn lookup_context(&self) -> LookupContext {
        LookupContext::new().with_timeout(self.config.lookup_timeout)
    }
}

/// Serve the HTTP API on [`Config::api_bind_addr`][crate::config::Config::api_bind_addr].
pub fn new(
    config: Shared,
    va: ValidationAuthority,
) -> impl Future<Output = hyper::Result<()>> {
    axum::Server::bind(&config.api_bind_addr).serve(
        routes::new(AppState { config, va }).into_make_service_with_connect_info::<SocketAddr>(),
    )
}
