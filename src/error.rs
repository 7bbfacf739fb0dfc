//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The uploaded file's extension is not one of the supported formats.
    ///
    /// Callers should pass in the rejected file name.
    #[error("\"{0}\" is not a CSV or Excel file")]
    UnsupportedFormat(String),

    /// The file could not be parsed as a table of sales records.
    ///
    /// The string describes what went wrong and, where known, the row and
    /// column of the offending cell.
    #[error("could not parse the file: {0}")]
    ParseFailure(String),

    /// The file is missing a column that the dashboard cannot work without.
    #[error("the file is missing the required column \"{0}\"")]
    MissingColumn(String),

    /// The multipart form could not be read.
    #[error("could not parse multipart form: {0}")]
    MultipartError(String),

    /// The multipart form did not contain a file.
    #[error("no file was uploaded")]
    NoFileUploaded,

    /// The uploaded file is larger than the configured limit.
    #[error("the file is larger than the {0} MB upload limit")]
    FileTooLarge(usize),

    /// An aggregate table could not be written as CSV.
    #[error("could not export CSV: {0}")]
    CsvExport(String),

    /// No sales data has been uploaded yet.
    #[error("no sales data has been uploaded")]
    NoDataset,

    /// Could not acquire the dataset lock.
    #[error("could not acquire the dataset lock")]
    DatasetLockError,

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::NoDataset => (
                StatusCode::NOT_FOUND,
                InternalServerError {
                    description: "No Sales Data",
                    fix: "Upload a CSV or Excel file of sales records first.",
                }
                .into_html(),
            )
                .into_response(),
            Error::MissingColumn(column) => {
                let fix = format!("The current file has no \"{column}\" column.");

                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    InternalServerError {
                        description: "Missing Column",
                        fix: &fix,
                    }
                    .into_html(),
                )
                    .into_response()
            }
            Error::DatasetLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::UnsupportedFormat(file_name) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Alert::Error {
                    message: "Unsupported file type".to_owned(),
                    details: format!(
                        "\"{file_name}\" is not a supported file. \
                        Upload a file ending in .csv, .xlsx or .xls."
                    ),
                },
            ),
            Error::ParseFailure(reason) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Could not read the file".to_owned(),
                    details: reason,
                },
            ),
            Error::MissingColumn(column) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::Error {
                    message: "Missing column".to_owned(),
                    details: format!(
                        "The file must have a \"{column}\" column. \
                        Check the header row and try again."
                    ),
                },
            ),
            Error::MultipartError(reason) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Upload failed".to_owned(),
                    details: reason,
                },
            ),
            Error::NoFileUploaded => (
                StatusCode::BAD_REQUEST,
                Alert::ErrorSimple {
                    message: "Choose a file to upload.".to_owned(),
                },
            ),
            Error::FileTooLarge(limit) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Alert::Error {
                    message: "File too large".to_owned(),
                    details: format!("Files must be smaller than {limit} MB."),
                },
            ),
            Error::NoDataset => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "No sales data".to_owned(),
                    details: "Upload a CSV or Excel file of sales records first.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Something went wrong".to_owned(),
                        details:
                            "An unexpected error occurred, check the server logs for more details."
                                .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
