//! Request handlers
//!
//! Three routes: the public search page data, and the two idempotent
//! get-or-create endpoints backing client-side autofill.

use crate::error::ServerError;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use libris_core::Book;
use libris_database::search::MIN_QUERY_LEN;
use serde::{Deserialize, Serialize};

/// One row of the public search results; exactly the fields the page
/// displays
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookListItem {
    pub id: String,
    pub title: String,
    pub authors: String,
    pub publisher: Option<String>,
    pub collection: Option<String>,
    pub infos: Vec<String>,
}

impl From<&Book> for BookListItem {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.as_string(),
            title: book.title_str(),
            authors: book.authors_str(),
            publisher: book.publisher.as_ref().map(|p| p.name.clone()),
            collection: book.collection.as_ref().map(|c| c.name.clone()),
            infos: book.infos(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub search_text: Option<String>,
    pub books: Vec<BookListItem>,
}

/// GET / — the search page data. Without a query it renders an empty
/// result set; queries under three characters are a client error.
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ServerError> {
    let search_text = match params.search {
        Some(text) if !text.is_empty() => text,
        _ => {
            return Ok(Json(SearchResponse {
                search_text: None,
                books: Vec::new(),
            }))
        }
    };

    if search_text.chars().count() < MIN_QUERY_LEN {
        return Err(ServerError::BadRequest(
            "Search query must have at least 3 characters".to_string(),
        ));
    }

    let books = state.catalog.search(&search_text).await?;

    Ok(Json(SearchResponse {
        search_text: Some(search_text),
        books: books.iter().map(BookListItem::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct NamePayload {
    pub name: Option<String>,
}

/// POST /api/authors/get_or_create
pub async fn author_get_or_create(
    State(state): State<AppState>,
    Json(payload): Json<NamePayload>,
) -> Result<impl axum::response::IntoResponse, ServerError> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Author name not supplied".to_string()))?;

    let (author, created) = state.catalog.get_or_create_author(name).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(author)))
}

/// POST /api/publishers/get_or_create
pub async fn publisher_get_or_create(
    State(state): State<AppState>,
    Json(payload): Json<NamePayload>,
) -> Result<impl axum::response::IntoResponse, ServerError> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ServerError::BadRequest("Publisher name not supplied".to_string()))?;

    let (publisher, created) = state.catalog.get_or_create_publisher(name).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(publisher)))
}
