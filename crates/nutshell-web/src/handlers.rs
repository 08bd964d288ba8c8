//! HTTP route handlers.
//!
//! Each handler runs one request end to end: build bounds, query the store,
//! map rows to entities, then render a template or serialize JSON.

use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Redirect};
use axum::{Form, Json};
use minijinja::context;
use nutshell_core::form::{log_id, normalize};
use nutshell_core::mapper::{
    fetch_customer, fetch_log, map_customer_rows, map_link_rows, map_log_rows,
};
use nutshell_core::query::{build_prefix_query, mapkey_single, QueryBounds};
use nutshell_core::types::{
    EntityKind, CLUSTERS_BY_CUSTOMER, CUSTOMERS_BY_NAME, LOGS_BY_CUSTOMER, LOGS_BY_NAME,
    TYPE_FIELD,
};
use nutshell_core::{Error, LogEntity};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::paths;
use crate::AppState;

const SCRIPT: &str = include_str!("static/nutshell.js");

/// Form field prefix for log edit forms.
const LOG_PREFIX: &str = "log";

type HtmlResult = Result<Html<String>, ApiError>;

/// Query string of the search endpoints. A missing `value` searches for the
/// empty prefix, i.e. everything up to the page size.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub value: String,
}

/// One log search result.
#[derive(Debug, Serialize)]
pub struct LogHit {
    pub id: String,
    pub name: String,
    pub customer: Option<String>,
}

/// One customer search result.
#[derive(Debug, Serialize)]
pub struct CustomerHit {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

pub async fn welcome(State(state): State<AppState>) -> HtmlResult {
    state.render("welcome.html", context! {})
}

pub async fn list_logs(State(state): State<AppState>) -> HtmlResult {
    let rows = state
        .store
        .query(LOGS_BY_NAME, &QueryBounds::all().with_limit(state.page_size))
        .await?;
    let logs = map_log_rows(rows, state.store.as_ref()).await?;
    state.render("log/index.html", context! { logs })
}

pub async fn list_customers(State(state): State<AppState>) -> HtmlResult {
    let rows = state
        .store
        .query(
            CUSTOMERS_BY_NAME,
            &QueryBounds::all().with_limit(state.page_size),
        )
        .await?;
    let customers = map_customer_rows(rows);
    state.render("customer/index.html", context! { customers })
}

pub async fn show_log(State(state): State<AppState>, Path(id): Path<String>) -> HtmlResult {
    let log = fetch_log(&id, state.store.as_ref()).await?;
    let fields = log.fields();
    state.render("log/show.html", context! { log, fields })
}

pub async fn show_customer(State(state): State<AppState>, Path(id): Path<String>) -> HtmlResult {
    let customer = fetch_customer(&id, state.store.as_ref()).await?;
    let fields = customer.fields();

    let bounds = mapkey_single(&id)
        .with_limit(state.page_size)
        .include_docs(true);
    let logs = map_link_rows(state.store.query(LOGS_BY_CUSTOMER, &bounds).await?);
    let clusters = map_link_rows(state.store.query(CLUSTERS_BY_CUSTOMER, &bounds).await?);

    state.render(
        "customer/show.html",
        context! { customer, fields, logs, clusters },
    )
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

pub async fn delete_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    delete_entity(&state, EntityKind::Log, &id).await
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, ApiError> {
    delete_entity(&state, EntityKind::Customer, &id).await
}

async fn delete_entity(state: &AppState, kind: EntityKind, id: &str) -> Result<Redirect, ApiError> {
    if !state.store.delete(id).await? {
        return Err(Error::not_found(kind, id).into());
    }
    tracing::info!(%kind, %id, "deleted document");
    Ok(Redirect::to("/welcome"))
}

// ---------------------------------------------------------------------------
// Search (JSON)
// ---------------------------------------------------------------------------

pub async fn search_logs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<LogHit>>, ApiError> {
    let bounds = build_prefix_query(&params.value).with_limit(state.page_size);
    let rows = state.store.query(LOGS_BY_NAME, &bounds).await?;
    let hits = map_log_rows(rows, state.store.as_ref())
        .await?
        .into_iter()
        .map(|log| LogHit {
            id: log.id,
            name: log.name,
            customer: log.customer_id,
        })
        .collect();
    Ok(Json(hits))
}

pub async fn search_customers(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<CustomerHit>>, ApiError> {
    let bounds = build_prefix_query(&params.value).with_limit(state.page_size);
    let rows = state.store.query(CUSTOMERS_BY_NAME, &bounds).await?;
    let hits = map_customer_rows(rows)
        .into_iter()
        .map(|customer| CustomerHit {
            id: customer.id,
            name: customer.name,
        })
        .collect();
    Ok(Json(hits))
}

// ---------------------------------------------------------------------------
// Create / edit
// ---------------------------------------------------------------------------

pub async fn create_log_form(State(state): State<AppState>) -> HtmlResult {
    let log = LogEntity::from_row("", "");
    state.render(
        "log/edit.html",
        context! { log, description => "", is_create => true },
    )
}

pub async fn create_log(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect, ApiError> {
    let mut doc = normalize(pairs(&fields), LOG_PREFIX, state.store.as_ref()).await?;
    let id = log_id(&doc);
    doc.insert(TYPE_FIELD.into(), EntityKind::Log.doc_type().into());
    state.store.add(&id, doc).await?;
    tracing::info!(%id, "created log");
    Ok(Redirect::to(&paths::show_log(&id)))
}

pub async fn edit_log_form(State(state): State<AppState>, Path(id): Path<String>) -> HtmlResult {
    let log = fetch_log(&id, state.store.as_ref()).await?;
    let description = log.field("description");
    state.render(
        "log/edit.html",
        context! { log, description, is_create => false },
    )
}

pub async fn edit_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect, ApiError> {
    let mut doc = normalize(pairs(&fields), LOG_PREFIX, state.store.as_ref()).await?;
    doc.insert(TYPE_FIELD.into(), EntityKind::Log.doc_type().into());
    state.store.set(&id, doc).await?;
    tracing::info!(%id, "updated log");
    Ok(Redirect::to(&paths::show_log(&id)))
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

pub async fn script() -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/javascript")], SCRIPT)
}

fn pairs(fields: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}
