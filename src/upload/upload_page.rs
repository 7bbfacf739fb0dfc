use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, loading_spinner},
    navigation::NavBar,
    sales::Column,
};

/// The file extensions the upload form accepts.
const ACCEPTED_FILE_TYPES: &str = ".csv,.xlsx,.xls";

fn upload_form_view() -> Markup {
    let upload_route = endpoints::UPLOAD_API;
    let spinner = loading_spinner();

    html! {
        form
            hx-post=(upload_route)
            enctype="multipart/form-data"
            hx-disabled-elt="#file, #submit-button"
            hx-indicator="#indicator"
            hx-swap="none"
            hx-target-error="#alert-container"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="file" class=(FORM_LABEL_STYLE)
                {
                    "Choose a file to upload"
                }

                input
                    id="file"
                    type="file"
                    name="file"
                    accept=(ACCEPTED_FILE_TYPES)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                p class="mt-2 text-sm"
                {
                    "Upload a CSV or Excel file of sales records. The file needs the columns "
                    (required_columns())
                    ". Category, Sub-Category, Profit and Quantity columns enable more charts."
                }
            }

            button
                type="submit"
                id="submit-button"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator" { (spinner) }
                " Upload File"
            }
        }
    }
}

fn required_columns() -> String {
    Column::ALL
        .into_iter()
        .filter(|column| column.is_required())
        .map(|column| column.header())
        .collect::<Vec<_>>()
        .join(", ")
}

fn upload_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::UPLOAD_VIEW).into_html();
    let form = upload_form_view();

    let content = html! {
        (nav_bar)

        div
            class="flex flex-col items-center px-6 py-8 mx-auto lg:py-0
            text-gray-900 dark:text-white"
        {
            div class="relative max-w-md"
            {
                (form)
            }
        }
    };

    base("Upload Sales Data", &[], &content)
}

/// Route handler for the upload page.
pub async fn get_upload_page() -> Response {
    upload_view().into_response()
}

#[cfg(test)]
mod upload_page_tests {
    use axum::http::StatusCode;
    use scraper::ElementRef;

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document,
        },
        upload::upload_page::get_upload_page,
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_upload_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::UPLOAD_API, "hx-post");
        assert_form_enctype(&form, "multipart/form-data");
        assert_form_input(&form, "file", "file");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn accepts_csv_and_excel_files() {
        let html = parse_html_document(get_upload_page().await).await;
        let form = must_get_form(&html);

        let input = form
            .select(&scraper::Selector::parse("input[name='file']").unwrap())
            .next()
            .expect("No file input found");

        assert_eq!(input.value().attr("accept"), Some(".csv,.xlsx,.xls"));
        assert!(input.value().attr("multiple").is_none());
    }

    #[tokio::test]
    async fn lists_required_columns() {
        let html = parse_html_document(get_upload_page().await).await;

        assert!(
            html.html()
                .contains("Order Date, Region, State, City, Sales"),
            "want required columns listed in {}",
            html.html()
        );
    }

    #[track_caller]
    fn assert_form_enctype(form: &ElementRef, enctype: &str) {
        let form_enctype = form
            .value()
            .attr("enctype")
            .expect("enctype attribute missing");

        assert_eq!(
            form_enctype, enctype,
            "want form with attribute enctype=\"{enctype}\", got {form_enctype:?}"
        );
    }
}
