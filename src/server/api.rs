// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use std::sync::Arc;

use poem_openapi::{
    param::Query,
    payload::{Json, PlainText},
    OpenApi,
};
use tracing::{error, info};

use crate::{
    job::{split_list, Job, PageSize, RenderOptions},
    renderer::Pipeline,
    server::pdfresponse::{CreatePdfRequest, CreatePdfResponse, GeneratePdfResponse},
    types::PipelineError,
};

pub const STATUS_TEXT: &str = "Pagepress PDF service is running";

pub struct Api {
    pipeline: Arc<Pipeline>,
}

#[OpenApi]
impl Api {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    #[oai(path = "/", method = "get")]
    async fn index(&self) -> PlainText<String> {
        PlainText(STATUS_TEXT.to_string())
    }

    /// Renders the comma separated `urls` into one PDF
    #[oai(path = "/generate-pdf", method = "get")]
    async fn generate_pdf(
        &self,
        Query(urls): Query<Option<String>>,
        Query(name): Query<Option<String>>,
        #[oai(name = "pageSize")] page_size: Query<Option<String>>,
        Query(landscape): Query<Option<String>>,
        #[oai(name = "sectionsToRemove")] sections_to_remove: Query<Option<String>>,
    ) -> GeneratePdfResponse {
        let urls = match urls.as_deref().map(split_list) {
            Some(urls) if !urls.is_empty() => urls,
            _ => return GeneratePdfResponse::bad_request("Missing URLs"),
        };
        let sections = sections_to_remove
            .0
            .as_deref()
            .map(split_list)
            .unwrap_or_default();
        let landscape = landscape.as_deref() == Some("true");

        let ret = self
            .generate(name.as_deref(), urls, page_size.0.as_deref(), landscape, sections)
            .await;
        match ret {
            Ok((name, pdf)) => GeneratePdfResponse::pdf(&name, pdf),
            Err(e) => GeneratePdfResponse::from_error(&e),
        }
    }

    /// Same as `/generate-pdf`, with the job given as a JSON body
    #[oai(path = "/create-pdf", method = "post")]
    async fn create_pdf(&self, Json(request): Json<CreatePdfRequest>) -> CreatePdfResponse {
        let ret = self
            .generate(
                request.name.as_deref(),
                request.urls,
                request.page_size.as_deref(),
                request.landscape.unwrap_or(false),
                request.sections_to_remove,
            )
            .await;
        match ret {
            Ok((name, pdf)) => CreatePdfResponse::pdf(&name, pdf),
            Err(e) => CreatePdfResponse::from_error(&e),
        }
    }
}

impl Api {
    async fn generate(
        &self,
        name: Option<&str>,
        urls: Vec<String>,
        page_size: Option<&str>,
        landscape: bool,
        sections: Vec<String>,
    ) -> Result<(String, Vec<u8>), PipelineError> {
        let options = render_options(page_size, landscape, sections)?;
        let job = Job::from_raw(name, urls, options)?;
        info!(
            "Created job id={} name={} urls={}",
            job.id,
            job.name,
            job.urls.len()
        );
        match self.pipeline.run(&job).await {
            Ok(pdf) => Ok((job.name, pdf)),
            Err(e) => {
                error!("Error processing job id={}: {}", job.id, e);
                Err(e)
            }
        }
    }
}

fn render_options(
    page_size: Option<&str>,
    landscape: bool,
    sections: Vec<String>,
) -> Result<RenderOptions, PipelineError> {
    let page_size = match page_size.map(str::trim).filter(|s| !s.is_empty()) {
        Some(size) => size.parse::<PageSize>()?,
        None => PageSize::default(),
    };
    Ok(RenderOptions::new()
        .with_page_size(page_size)
        .with_landscape(landscape)
        .with_sections_to_remove(sections))
}
