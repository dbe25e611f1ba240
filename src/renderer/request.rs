// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::{
    config::BackendConfig,
    job::{Job, Margins, PageSize},
    types::RenderError,
};

const NORMALIZE_CSS: &str = "normalize.css";
const EXPAND_JS: &str = "expand.js";
const HEADER_HTML: &str = "header.html";
const FOOTER_HTML: &str = "footer.html";

pub const WAIT_UNTIL_NETWORK_IDLE: &str = "networkidle0";

/// The JSON body posted to the rendering backend for one URL
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub url: Url,
    pub options: PrintOptions,
    pub add_style_tag: Vec<TagContent>,
    pub add_script_tag: Vec<TagContent>,
    pub goto_options: GotoOptions,
    pub wait_for_timeout: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
    pub print_background: bool,
    pub format: PageSize,
    pub landscape: bool,
    pub margin: Margins,
    pub display_header_footer: bool,
    pub header_template: String,
    pub footer_template: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagContent {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GotoOptions {
    pub wait_until: String,
    /// milliseconds
    pub timeout: u64,
}

/// Turns a job and one of its URLs into a backend request.
///
/// The injected style and script are static templates, only the job name,
/// the sections to remove and the timings are substituted.
pub struct RequestBuilder {
    env: Environment<'static>,
    navigation_timeout_ms: u64,
    settle_delay_ms: u64,
}

impl std::fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RequestBuilder")
    }
}

impl RequestBuilder {
    pub fn new(config: &BackendConfig) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|name| {
            if name.ends_with(".html") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });
        for (name, source) in [
            (NORMALIZE_CSS, include_str!("templates/normalize.css")),
            (EXPAND_JS, include_str!("templates/expand.js")),
            (HEADER_HTML, include_str!("templates/header.html")),
            (FOOTER_HTML, include_str!("templates/footer.html")),
        ] {
            env.add_template(name, source).map_err(template_error)?;
        }

        Ok(Self {
            env,
            navigation_timeout_ms: config.navigation_timeout().as_millis() as u64,
            settle_delay_ms: config.settle_delay().as_millis() as u64,
        })
    }

    pub fn build(&self, job: &Job, url: &Url) -> Result<RenderRequest, RenderError> {
        let options = &job.options;
        let ctx = context! {
            name => &job.name,
            sections => &options.sections_to_remove,
            settle_delay_ms => self.settle_delay_ms,
        };

        let style = self.render(NORMALIZE_CSS, &ctx)?;
        let script = self.render(EXPAND_JS, &ctx)?;
        debug!(
            "Built request url={} style_len={} script_len={}",
            url,
            style.len(),
            script.len()
        );

        Ok(RenderRequest {
            url: url.clone(),
            options: PrintOptions {
                print_background: true,
                format: options.page_size,
                landscape: options.landscape,
                margin: options.margins.clone(),
                display_header_footer: true,
                header_template: self.render(HEADER_HTML, &ctx)?,
                footer_template: self.render(FOOTER_HTML, &ctx)?,
            },
            add_style_tag: vec![TagContent { content: style }],
            add_script_tag: vec![TagContent { content: script }],
            goto_options: GotoOptions {
                wait_until: WAIT_UNTIL_NETWORK_IDLE.to_string(),
                timeout: self.navigation_timeout_ms,
            },
            wait_for_timeout: self.settle_delay_ms,
        })
    }

    fn render(&self, name: &str, ctx: &minijinja::Value) -> Result<String, RenderError> {
        self.env
            .get_template(name)
            .and_then(|template| template.render(ctx))
            .map_err(template_error)
    }
}

fn template_error(e: minijinja::Error) -> RenderError {
    RenderError::Configuration(format!("Invalid request template: {}", e))
}
