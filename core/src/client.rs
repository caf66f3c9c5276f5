//! The analysis entry point.
//!
//! # Design
//! `TextRazor` pairs a [`Connection`] with a set of [`AnalysisOptions`].
//! Each `analyze*` call encodes the current options, appends the document
//! (`text` or `url`) and sends one POST to the service root. The options are
//! only read during a call, so a configured client can be reused for many
//! documents.

use serde_json::Value;

use crate::connection::Connection;
use crate::error::Result;
use crate::http::{ApiPath, HttpMethod, HttpRequest, CONTENT_TYPE_FORM};
use crate::options::AnalysisOptions;
use crate::settings::Settings;
use crate::transport::{Transport, UreqTransport};

/// Client for the analysis endpoint.
#[derive(Debug, Clone)]
pub struct TextRazor<T = UreqTransport> {
    connection: Connection<T>,
    options: AnalysisOptions,
}

impl TextRazor<UreqTransport> {
    /// Fails with `Error::Validation` when `settings` carries no API key.
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_transport(settings, UreqTransport::new())
    }
}

impl<T: Transport> TextRazor<T> {
    pub fn with_transport(settings: &Settings, transport: T) -> Result<Self> {
        Ok(Self {
            connection: Connection::with_transport(settings, transport)?,
            options: AnalysisOptions::default(),
        })
    }

    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection<T> {
        &mut self.connection
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut AnalysisOptions {
        &mut self.options
    }

    pub fn set_options(&mut self, options: AnalysisOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Analyze `text` with the configured options.
    pub fn analyze(&self, text: &str) -> Result<Value> {
        let request = self.build_analyze_request(text)?;
        self.connection.dispatch(&request)
    }

    /// Ask the service to download `url` and analyze its content.
    pub fn analyze_url(&self, url: &str) -> Result<Value> {
        let request = self.build_analyze_url_request(url)?;
        self.connection.dispatch(&request)
    }

    pub fn build_analyze_request(&self, text: &str) -> Result<HttpRequest> {
        self.build_document_request("text", text)
    }

    pub fn build_analyze_url_request(&self, url: &str) -> Result<HttpRequest> {
        self.build_document_request("url", url)
    }

    fn build_document_request(&self, key: &str, document: &str) -> Result<HttpRequest> {
        let mut query = self.options.build_query();
        query.add(key, document);
        self.connection.build_request(
            query.build(),
            &ApiPath::root(),
            HttpMethod::Post,
            Some(CONTENT_TYPE_FORM),
        )
    }
}
