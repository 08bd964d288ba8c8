//! nutshell-web: HTTP surface of the nutshell front-end.
//!
//! [`router`] wires every route to its handler; [`serve`] runs it until
//! Ctrl-C. The store handle and compiled templates travel in [`AppState`].
//!
//! | Route                          | Handler                      |
//! |--------------------------------|------------------------------|
//! | `GET /`, `GET /welcome`        | welcome page                 |
//! | `GET /logs`                    | log list                     |
//! | `GET /logs/show/{id}`          | log detail                   |
//! | `GET /logs/delete/{id}`        | delete, redirect             |
//! | `GET /logs/search?value=`      | JSON prefix search           |
//! | `GET/POST /logs/create`        | create form / submit         |
//! | `GET/POST /logs/edit/{id}`     | edit form / submit           |
//! | `GET /customers`               | customer list                |
//! | `GET /customers/show/{id}`     | customer detail              |
//! | `GET /customers/delete/{id}`   | delete, redirect             |
//! | `GET /customers/search?value=` | JSON prefix search           |
//! | `GET /js/nutshell.js`          | search-as-you-type script    |

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod paths;
pub mod templates;

use std::sync::Arc;

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use nutshell_core::SharedStore;
use serde::Serialize;
use tokio::net::TcpListener;

use crate::error::ApiError;
use crate::middleware::RequestTracingLayer;
use crate::templates::Templates;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub templates: Arc<Templates>,
    /// Row limit for list and search queries.
    pub page_size: usize,
}

impl AppState {
    pub fn new(store: SharedStore, page_size: usize) -> Result<Self, minijinja::Error> {
        Ok(Self {
            store,
            templates: Arc::new(Templates::new()?),
            page_size,
        })
    }

    fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, ApiError> {
        Ok(Html(self.templates.render(name, ctx)?))
    }
}

pub fn router(state: AppState) -> Router {
    use handlers::*;

    Router::new()
        .route("/", get(welcome))
        .route("/welcome", get(welcome))
        .route("/logs", get(list_logs))
        .route("/logs/show/{id}", get(show_log))
        .route("/logs/delete/{id}", get(delete_log))
        .route("/logs/search", get(search_logs))
        .route("/logs/create", get(create_log_form).post(create_log))
        .route("/logs/edit/{id}", get(edit_log_form).post(edit_log))
        .route("/customers", get(list_customers))
        .route("/customers/show/{id}", get(show_customer))
        .route("/customers/delete/{id}", get(delete_customer))
        .route("/customers/search", get(search_customers))
        .route("/js/nutshell.js", get(script))
        .layer(RequestTracingLayer)
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("listening on http://{addr}");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
