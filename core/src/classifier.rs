//! Custom classifiers and their categories.

use serde::Serialize;
use serde_json::Value;

use crate::connection::{json_body, require_id, Connection};
use crate::error::{Error, Result};
use crate::http::{ApiPath, HttpMethod, CONTENT_TYPE_CSV, CONTENT_TYPE_JSON};
use crate::settings::Settings;
use crate::transport::{Transport, UreqTransport};

const CLASSIFIER: &str = "Classifiers";

#[derive(Debug, Clone)]
pub struct ClassifierManager<T = UreqTransport> {
    connection: Connection<T>,
}

impl ClassifierManager<UreqTransport> {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_transport(settings, UreqTransport::new())
    }
}

impl<T: Transport> ClassifierManager<T> {
    pub fn with_transport(settings: &Settings, transport: T) -> Result<Self> {
        Ok(Self {
            connection: Connection::with_transport(settings, transport)?,
        })
    }

    pub fn connection(&self) -> &Connection<T> {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection<T> {
        &mut self.connection
    }

    /// Create (or replace) a classifier from a list of categories, typically
    /// [`Category`](crate::types::Category) values.
    pub fn create_classifier<C: Serialize>(&self, classifier_id: &str, categories: &[C]) -> Result<Value> {
        require_id(CLASSIFIER, classifier_id)?;
        if categories.is_empty() {
            return Err(Error::validation("array of new categories cannot be empty"));
        }
        self.connection.send_request(
            json_body(categories)?,
            &ApiPath::new(["categories", classifier_id]),
            HttpMethod::Put,
            Some(CONTENT_TYPE_JSON),
        )
    }

    /// Create (or replace) a classifier from the contents of a CSV file.
    pub fn create_classifier_with_csv(&self, classifier_id: &str, categories_csv: &str) -> Result<Value> {
        require_id(CLASSIFIER, classifier_id)?;
        self.connection.send_request(
            categories_csv,
            &ApiPath::new(["categories", classifier_id]),
            HttpMethod::Put,
            Some(CONTENT_TYPE_CSV),
        )
    }

    pub fn delete_classifier(&self, classifier_id: &str) -> Result<Value> {
        require_id(CLASSIFIER, classifier_id)?;
        self.connection.send_request(
            "",
            &ApiPath::new(["categories", classifier_id]),
            HttpMethod::Delete,
            None,
        )
    }

    pub fn all_categories(
        &self,
        classifier_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Value> {
        require_id(CLASSIFIER, classifier_id)?;
        let path = ApiPath::new(["categories", classifier_id, "_all"])
            .query_opt("limit", limit)
            .query_opt("offset", offset);
        self.connection.send_request("", &path, HttpMethod::Get, None)
    }

    pub fn get_category(&self, classifier_id: &str, category_id: &str) -> Result<Value> {
        require_id(CLASSIFIER, classifier_id)?;
        require_id("Categories", category_id)?;
        self.connection.send_request(
            "",
            &ApiPath::new(["categories", classifier_id, category_id]),
            HttpMethod::Get,
            None,
        )
    }

    pub fn delete_category(&self, classifier_id: &str, category_id: &str) -> Result<Value> {
        require_id(CLASSIFIER, classifier_id)?;
        require_id("Categories", category_id)?;
        self.connection.send_request(
            "",
            &ApiPath::new(["categories", classifier_id, category_id]),
            HttpMethod::Delete,
            None,
        )
    }
}
