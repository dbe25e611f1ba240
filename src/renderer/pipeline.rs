// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use std::{sync::Arc, time::Duration};

use futures::{stream, StreamExt};
use tokio::time::Instant;
use tracing::{error, info, instrument};
use url::Url;

use crate::{
    config::{Config, PipelineConfig},
    job::Job,
    renderer::{
        backend::{BrowserlessBackend, RenderBackend},
        pdf::merge_or_first,
        request::RequestBuilder,
    },
    types::{PipelineError, RenderError},
};

/// Renders every URL of a job and assembles the result into one PDF.
///
/// Per-URL failures are logged and skipped, a job only fails when no URL
/// produced a document.
pub struct Pipeline {
    config: PipelineConfig,
    builder: RequestBuilder,
    backend: Arc<dyn RenderBackend>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pipeline")
    }
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        builder: RequestBuilder,
        backend: Arc<dyn RenderBackend>,
    ) -> Self {
        Self {
            config,
            builder,
            backend,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let builder = RequestBuilder::new(&config.backend).map_err(setup_error)?;
        let backend = Arc::new(BrowserlessBackend::from_config(&config.backend));
        Ok(Self::new(config.pipeline.clone(), builder, backend))
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, job_name = %job.name))]
    pub async fn run(&self, job: &Job) -> Result<Vec<u8>, PipelineError> {
        if job.urls.is_empty() {
            return Err(PipelineError::InvalidJob(
                "No valid URLs provided".to_string(),
            ));
        }
        self.backend.check().map_err(setup_error)?;

        info!("Processing {} URLs", job.urls.len());
        let results = self.render_all(job).await;

        let attempted = results.len();
        let mut pdfs = Vec::with_capacity(attempted);
        let mut last_error = None;
        for result in results {
            match result {
                Ok(pdf) => pdfs.push(pdf),
                Err(e) => last_error = Some(e),
            }
        }
        info!(
            "Rendered successes={} failures={}",
            pdfs.len(),
            attempted - pdfs.len()
        );

        if let Some(RenderError::Configuration(message)) = &last_error {
            if pdfs.is_empty() {
                return Err(PipelineError::Configuration(message.clone()));
            }
        }

        let pdf = match pdfs.len() {
            0 => {
                return Err(PipelineError::NoOutput {
                    attempted,
                    last_error: last_error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown error".to_string()),
                })
            }
            1 => pdfs.pop(),
            _ => merge_or_first(&pdfs),
        };
        let pdf = pdf.ok_or_else(|| PipelineError::NoOutput {
            attempted,
            last_error: "no document produced".to_string(),
        })?;

        info!("Output PDF length={}", pdf.len());
        Ok(pdf)
    }

    /// One result per URL, in URL order
    async fn render_all(&self, job: &Job) -> Vec<Result<Vec<u8>, RenderError>> {
        let start = Instant::now();
        let interval = self.config.request_interval();
        let concurrency = self.config.max_concurrency.max(1);

        stream::iter(job.urls.iter().cloned().enumerate())
            .map(|(idx, url)| async move {
                let wait = dispatch_offset(interval, idx).saturating_sub(start.elapsed());
                tokio::time::sleep(wait).await;
                self.render_one(job, idx, &url).await
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    async fn render_one(
        &self,
        job: &Job,
        idx: usize,
        url: &Url,
    ) -> Result<Vec<u8>, RenderError> {
        info!("Processing url={} index={}", url, idx);
        let request = self.builder.build(job, url)?;
        let started = Instant::now();
        let ret = self.backend.render(&request).await;
        if let Err(e) = &ret {
            error!(
                "Error generating PDF for url={} index={} elapsed={:?}: {}",
                url,
                idx,
                started.elapsed(),
                e
            );
        }
        ret
    }
}

/// Earliest start of the `idx`-th dispatch, relative to the job start
fn dispatch_offset(interval: Duration, idx: usize) -> Duration {
    interval.saturating_mul(u32::try_from(idx).unwrap_or(u32::MAX))
}

/// Failures before any URL is dispatched can only come from configuration
fn setup_error(error: RenderError) -> PipelineError {
    match error {
        RenderError::Configuration(message) => PipelineError::Configuration(message),
        other => PipelineError::Configuration(other.to_string()),
    }
}
