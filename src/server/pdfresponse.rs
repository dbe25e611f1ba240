// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use poem_openapi::{
    payload::{Binary, Json, PlainText},
    ApiResponse, Object,
};

use crate::{types::PipelineError, utils::sanitize_filename};

#[derive(ApiResponse)]
#[oai(bad_request_handler = "generate_pdf_bad_request")]
pub enum GeneratePdfResponse {
    #[oai(status = 200, content_type = "application/pdf")]
    Pdf(
        Binary<Vec<u8>>,
        #[oai(header = "Content-Disposition")] String,
    ),
    #[oai(status = 400, content_type = "text/plain; charset=utf-8")]
    BadRequest(PlainText<String>),
    #[oai(status = 500, content_type = "text/plain; charset=utf-8")]
    InternalError(PlainText<String>),
}

impl GeneratePdfResponse {
    pub fn pdf(name: &str, pdf: Vec<u8>) -> Self {
        Self::Pdf(Binary(pdf), content_disposition(name))
    }

    pub fn bad_request(message: &str) -> Self {
        Self::BadRequest(PlainText(message.to_string()))
    }

    pub fn from_error(error: &PipelineError) -> Self {
        match error.http_status() {
            400 => Self::BadRequest(PlainText(error.to_string())),
            _ => Self::InternalError(PlainText(format!("Error generating PDF: {}", error))),
        }
    }
}

#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct CreatePdfRequest {
    pub name: Option<String>,
    #[oai(default)]
    pub urls: Vec<String>,
    pub page_size: Option<String>,
    pub landscape: Option<bool>,
    #[oai(default)]
    pub sections_to_remove: Vec<String>,
}

#[derive(Object, Debug)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(ApiResponse)]
#[oai(bad_request_handler = "create_pdf_bad_request")]
pub enum CreatePdfResponse {
    #[oai(status = 200, content_type = "application/pdf")]
    Pdf(
        Binary<Vec<u8>>,
        #[oai(header = "Content-Disposition")] String,
    ),
    #[oai(status = 400)]
    BadRequest(Json<ErrorBody>),
    #[oai(status = 500)]
    InternalError(Json<ErrorBody>),
}

impl CreatePdfResponse {
    pub fn pdf(name: &str, pdf: Vec<u8>) -> Self {
        Self::Pdf(Binary(pdf), content_disposition(name))
    }

    pub fn from_error(error: &PipelineError) -> Self {
        let body = Json(ErrorBody {
            error: error.to_string(),
        });
        match error.http_status() {
            400 => Self::BadRequest(body),
            _ => Self::InternalError(body),
        }
    }
}

// Requests poem-openapi could not parse get the same error shape as job errors
fn generate_pdf_bad_request(error: poem::Error) -> GeneratePdfResponse {
    GeneratePdfResponse::bad_request(&error.to_string())
}

fn create_pdf_bad_request(error: poem::Error) -> CreatePdfResponse {
    CreatePdfResponse::BadRequest(Json(ErrorBody {
        error: error.to_string(),
    }))
}

pub fn content_disposition(name: &str) -> String {
    format!("attachment; filename=\"{}.pdf\"", sanitize_filename(name))
}
