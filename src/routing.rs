//! Application router configuration.

use std::path::Path;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::{
        get_category_csv, get_dashboard_page, get_dashboard_partial, get_region_csv,
        get_sub_category_month_csv, get_time_series_csv,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    upload::{get_upload_page, upload_dataset},
};

/// Extra room on top of the upload limit for the multipart boundaries and
/// headers.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Return a router with all the app's routes.
///
/// Files in `static_dir` are served under [endpoints::STATIC].
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let body_limit = state
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let upload_routes = Router::new()
        .route(endpoints::UPLOAD_API, post(upload_dataset))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::UPLOAD_VIEW, get(get_upload_page))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .route(endpoints::DASHBOARD_API, get(get_dashboard_partial))
        .route(endpoints::EXPORT_CATEGORY, get(get_category_csv))
        .route(endpoints::EXPORT_REGION, get(get_region_csv))
        .route(endpoints::EXPORT_TIME_SERIES, get(get_time_series_csv))
        .route(
            endpoints::EXPORT_SUB_CATEGORY_MONTH,
            get(get_sub_category_month_csv),
        )
        .merge(upload_routes)
        .nest_service(endpoints::STATIC, ServeDir::new(static_dir.as_ref()))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
