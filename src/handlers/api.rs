use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::instrument;

use crate::models::ErrorBody;
use crate::services::MenuService;

/// Path segments of the form `messtype=<MessType>` select a menu
pub const MESS_TYPE_SELECTOR: &str = "messtype=";

/// Shared state of the menu endpoints
#[derive(Clone)]
pub struct ApiState {
    pub menu_service: Arc<MenuService>,
}

/// Static greeting served at the root
pub async fn root() -> &'static str {
    "Hello World!"
}

/// Get the menu of one mess.
///
/// Mounted on the whole first path segment, which has to read
/// `messtype=<MessType>`; anything else is an unknown route. The
/// `messtype=` key matches in any case, the mess type itself does not.
#[instrument(name = "get_menu", skip(state))]
pub async fn get_menu(State(state): State<ApiState>, Path(selector): Path<String>) -> Response {
    let mess_type = match mess_type_from_selector(&selector) {
        Some(mess_type) => mess_type,
        None => return not_found().await.into_response(),
    };

    match state.menu_service.get_menu(mess_type).await {
        Ok(menu) => (StatusCode::OK, Json(menu.to_response())).into_response(),
        Err(err) => err.into_response(),
    }
}

fn mess_type_from_selector(selector: &str) -> Option<&str> {
    let key = selector.get(..MESS_TYPE_SELECTOR.len())?;
    if !key.eq_ignore_ascii_case(MESS_TYPE_SELECTOR) {
        return None;
    }

    let mess_type = &selector[MESS_TYPE_SELECTOR.len()..];
    (!mess_type.is_empty()).then_some(mess_type)
}

/// Fallback for every path that is not a known route
pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            status: StatusCode::NOT_FOUND.as_u16(),
            message: "Not Found".to_string(),
            error: None,
        }),
    )
}
