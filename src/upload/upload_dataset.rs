use axum::{
    extract::{Multipart, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error, endpoints,
    sales::{FileFormat, load_dataset},
};

/// The name of the multipart field that holds the uploaded file.
const FILE_FIELD: &str = "file";

/// Route handler for uploading a CSV or Excel file of sales records.
///
/// On success the uploaded data replaces the current dataset and the client
/// is redirected to the dashboard. Otherwise the current dataset is kept and
/// an alert describes what was wrong with the file.
pub async fn upload_dataset(State(state): State<AppState>, multipart: Multipart) -> Response {
    let start_time = std::time::Instant::now();

    let (file_name, bytes) = match read_upload(multipart, state.max_upload_mb).await {
        Ok(upload) => upload,
        Err(error) => {
            tracing::debug!("Rejected upload: {error}");
            return error.into_alert_response();
        }
    };

    let dataset = match load_dataset(&file_name, &bytes) {
        Ok(dataset) => dataset,
        Err(error) => {
            tracing::debug!("Could not load '{file_name}': {error}");
            return error.into_alert_response();
        }
    };

    let row_count = dataset.len();

    if let Err(error) = state.replace_dataset(&file_name, dataset) {
        return error.into_alert_response();
    }

    tracing::info!(
        "Loaded {row_count} rows from '{file_name}' in {}ms",
        start_time.elapsed().as_millis()
    );

    (
        HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
        StatusCode::OK,
    )
        .into_response()
}

/// Read the file name and contents of the uploaded file.
///
/// Fields other than [FILE_FIELD] are skipped.
async fn read_upload(
    mut multipart: Multipart,
    max_upload_mb: usize,
) -> Result<(String, Vec<u8>), Error> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| multipart_error(error, max_upload_mb))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        return read_file_field(field, max_upload_mb).await;
    }

    Err(Error::NoFileUploaded)
}

async fn read_file_field(
    field: Field<'_>,
    max_upload_mb: usize,
) -> Result<(String, Vec<u8>), Error> {
    let file_name = match field.file_name() {
        // Browsers send an empty file name when no file was chosen.
        Some(file_name) if !file_name.is_empty() => file_name.to_owned(),
        _ => return Err(Error::NoFileUploaded),
    };

    // Reject unsupported files before reading the body.
    FileFormat::from_file_name(&file_name)?;

    let data = field
        .bytes()
        .await
        .map_err(|error| multipart_error(error, max_upload_mb))?;

    if data.len() > max_upload_mb.saturating_mul(1024 * 1024) {
        return Err(Error::FileTooLarge(max_upload_mb));
    }

    tracing::debug!("Received file '{}' that is {} bytes", file_name, data.len());

    Ok((file_name, data.to_vec()))
}

fn multipart_error(error: axum::extract::multipart::MultipartError, max_upload_mb: usize) -> Error {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::FileTooLarge(max_upload_mb);
    }

    tracing::error!("Could not read multipart form: {error}");
    Error::MultipartError(error.body_text())
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{FromRequest, Multipart, State},
        http::{Request, StatusCode},
        response::Response,
    };

    use crate::{
        AppState, Error, endpoints,
        sales::test_utils::dataset,
        test_utils::{
            assert_content_type, assert_hx_redirect, assert_valid_html, parse_html_fragment,
        },
        upload::upload_dataset::upload_dataset,
    };

    const SALES_CSV: &str = "Row ID,Order Date,Region,State,City,Category,Sub-Category,Sales,Profit,Quantity\n\
        1,11/8/2016,South,Kentucky,Henderson,Furniture,Bookcases,261.96,41.9136,2\n\
        2,11/8/2016,South,Kentucky,Henderson,Furniture,Chairs,731.94,219.582,3\n\
        3,6/12/2016,West,California,Los Angeles,Office Supplies,Labels,14.62,6.8714,2";

    #[tokio::test]
    async fn upload_replaces_dataset_and_redirects() {
        let state = AppState::default();

        let response = upload_dataset(
            State(state.clone()),
            must_make_multipart("file", "superstore.csv", SALES_CSV).await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let loaded = state.current_dataset().unwrap();
        assert_eq!(loaded.file_name, "superstore.csv");
        assert_eq!(loaded.dataset.len(), 3);
    }

    #[tokio::test]
    async fn unsupported_file_type_renders_error_message() {
        let state = AppState::with_dataset(1, "previous.csv", dataset(vec![]));

        let response = upload_dataset(
            State(state.clone()),
            must_make_multipart("file", "notes.txt", "hello").await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_content_type(&response, "text/html; charset=utf-8");
        assert_alert_error_message(response, "Unsupported file type").await;
        assert_eq!(state.current_dataset().unwrap().file_name, "previous.csv");
    }

    #[tokio::test]
    async fn missing_column_renders_error_message() {
        let state = AppState::default();

        let response = upload_dataset(
            State(state.clone()),
            must_make_multipart("file", "sales.csv", "Order Date,Region,State,City\n").await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_alert_error_message(response, "Missing column").await;
        assert_eq!(state.current_dataset(), Err(Error::NoDataset));
    }

    #[tokio::test]
    async fn invalid_number_renders_error_message() {
        let csv = "Order Date,Region,State,City,Sales\n2023-01-01,West,California,Fresno,lots\n";

        let response = upload_dataset(
            State(AppState::default()),
            must_make_multipart("file", "sales.csv", csv).await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_alert_error_message(response, "Could not read the file").await;
    }

    #[tokio::test]
    async fn form_without_file_field_renders_error_message() {
        let response = upload_dataset(
            State(AppState::default()),
            must_make_multipart("comment", "sales.csv", SALES_CSV).await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_alert_error_message(response, "Choose a file to upload.").await;
    }

    #[tokio::test]
    async fn empty_file_name_renders_error_message() {
        let response = upload_dataset(
            State(AppState::default()),
            must_make_multipart("file", "", "").await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_alert_error_message(response, "Choose a file to upload.").await;
    }

    #[tokio::test]
    async fn file_over_limit_renders_error_message() {
        let state = AppState::new(0);

        let response = upload_dataset(
            State(state),
            must_make_multipart("file", "superstore.csv", SALES_CSV).await,
        )
        .await;

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_alert_error_message(response, "File too large").await;
    }

    async fn assert_alert_error_message(response: Response, expected_message: &str) {
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let alert_container = html
            .select(&scraper::Selector::parse("#alert-container").unwrap())
            .next()
            .expect("No alert container found");

        let message_p = alert_container
            .select(&scraper::Selector::parse("p.text-sm.font-medium").unwrap())
            .next()
            .expect("No alert message found");

        let message = message_p.text().collect::<String>();
        assert_eq!(message.trim(), expected_message);
    }

    async fn must_make_multipart(field_name: &str, file_name: &str, contents: &str) -> Multipart {
        let boundary = "MY_BOUNDARY123456789";
        let disposition =
            format!("Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"");

        let data = [
            format!("--{boundary}"),
            disposition,
            "Content-Type: application/octet-stream".to_owned(),
            String::new(),
            contents.to_owned(),
            format!("--{boundary}--"),
        ]
        .join("\r\n")
        .into_bytes();

        let request = Request::builder()
            .method("POST")
            .uri(endpoints::UPLOAD_API)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(data.into())
            .unwrap();

        Multipart::from_request(request, &{}).await.unwrap()
    }
}
