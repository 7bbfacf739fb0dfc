//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The dashboard page with the charts and tables.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for uploading a sales file.
pub const UPLOAD_VIEW: &str = "/upload";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to upload a CSV or Excel file of sales records.
pub const UPLOAD_API: &str = "/api/upload";
/// The route for the dashboard content, used by the filter form.
pub const DASHBOARD_API: &str = "/api/dashboard";
/// Download the category totals as CSV.
pub const EXPORT_CATEGORY: &str = "/api/export/category.csv";
/// Download the region totals as CSV.
pub const EXPORT_REGION: &str = "/api/export/region.csv";
/// Download the monthly totals as CSV.
pub const EXPORT_TIME_SERIES: &str = "/api/export/time_series.csv";
/// Download the sub-category by month pivot as CSV.
pub const EXPORT_SUB_CATEGORY_MONTH: &str = "/api/export/sub_category_month.csv";
