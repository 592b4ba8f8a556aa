//! Hexlight HTTP surface
//!
//! Exposes every [`LightController`] request as an HTTP endpoint.

#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
// Too many false positives.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn
)]

use std::{future::Future, sync::Arc};

use hexlight_app::LightController;
use tokio::net::TcpListener;

pub use crate::{error::ApiError, routes::router};

mod error;
mod routes;

/// Serves the controller endpoints until the server fails.
pub async fn serve(listener: TcpListener, controller: Arc<LightController>) -> std::io::Result<()> {
    serve_with_shutdown(listener, controller, std::future::pending::<()>()).await
}

/// Serves the controller endpoints until the given signal resolves.
pub async fn serve_with_shutdown<S>(
    listener: TcpListener,
    controller: Arc<LightController>,
    signal: S,
) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(controller))
        .with_graceful_shutdown(signal)
        .await
}
