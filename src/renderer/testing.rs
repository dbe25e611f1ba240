// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

//! Test doubles shared by the renderer and server tests

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use lopdf::{dictionary, Document, Object, Stream};
use url::Url;

use crate::{
    renderer::{backend::RenderBackend, request::RenderRequest, transport::Transport},
    types::RenderError,
};

/// A small valid PDF with the given number of pages.
///
/// MediaBox and Resources live on the page tree node so merging
/// has to carry them over to every page.
pub fn make_pdf(pages: usize, text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let mut kids: Vec<Object> = Vec::new();
    for idx in 0..pages {
        let content = format!("BT /F1 18 Tf 72 720 Td ({} {}) Tj ET", text, idx).into_bytes();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save");
    out
}

pub type Response = (Duration, Result<Vec<u8>, RenderError>);

/// In-memory backend answering per URL, recording calls and concurrency
#[derive(Default)]
pub struct FakeBackend {
    responses: HashMap<String, Response>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub requests: Mutex<Vec<RenderRequest>>,
}

impl FakeBackend {
    pub fn with(mut self, url: &str, delay_ms: u64, response: Result<Vec<u8>, RenderError>) -> Self {
        self.responses.insert(
            Url::parse(url).unwrap().to_string(),
            (Duration::from_millis(delay_ms), response),
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderBackend for FakeBackend {
    async fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let (delay, response) = self
            .responses
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| {
                (
                    Duration::ZERO,
                    Err(RenderError::Backend {
                        status_code: 404,
                        body: "unknown url".to_string(),
                    }),
                )
            });
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// Transport that never touches the network and counts how often it was asked to
#[derive(Default)]
pub struct CountingTransport {
    pub calls: AtomicUsize,
    pub last_url: Mutex<Option<Url>>,
    pub response: Vec<u8>,
}

#[async_trait]
impl Transport for CountingTransport {
    async fn post_json(
        &self,
        url: &Url,
        _body: &serde_json::Value,
        _timeout: Duration,
    ) -> Result<Vec<u8>, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.clone());
        Ok(self.response.clone())
    }
}
