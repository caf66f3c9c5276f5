//! Custom entity dictionaries and their entries.

use serde::Serialize;
use serde_json::Value;

use crate::connection::{json_body, require_id, Connection};
use crate::error::{Error, Result};
use crate::http::{ApiPath, HttpMethod, CONTENT_TYPE_JSON};
use crate::settings::Settings;
use crate::transport::{Transport, UreqTransport};
use crate::types::DictionaryOptions;

const DICTIONARY: &str = "Custom Entity Dictionaries";

#[derive(Debug, Clone)]
pub struct DictionaryManager<T = UreqTransport> {
    connection: Connection<T>,
}

impl DictionaryManager<UreqTransport> {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_transport(settings, UreqTransport::new())
    }
}

impl<T: Transport> DictionaryManager<T> {
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

    /// Create (or replace) the dictionary `dictionary_id`.
    pub fn create_dictionary(&self, dictionary_id: &str, options: &DictionaryOptions) -> Result<Value> {
        require_id(DICTIONARY, dictionary_id)?;
        self.connection.send_request(
            json_body(options)?,
            &ApiPath::new(["entities", dictionary_id]),
            HttpMethod::Put,
            Some(CONTENT_TYPE_JSON),
        )
    }

    pub fn all_dictionaries(&self) -> Result<Value> {
        self.connection
            .send_request("", &ApiPath::new(["entities", ""]), HttpMethod::Get, None)
    }

    pub fn get_dictionary(&self, dictionary_id: &str) -> Result<Value> {
        require_id(DICTIONARY, dictionary_id)?;
        self.connection.send_request(
            "",
            &ApiPath::new(["entities", dictionary_id]),
            HttpMethod::Get,
            None,
        )
    }

    pub fn delete_dictionary(&self, dictionary_id: &str) -> Result<Value> {
        require_id(DICTIONARY, dictionary_id)?;
        self.connection.send_request(
            "",
            &ApiPath::new(["entities", dictionary_id]),
            HttpMethod::Delete,
            None,
        )
    }

    /// One page of entries. Unset `limit`/`offset` use the service defaults.
    pub fn all_entries(
        &self,
        dictionary_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<Value> {
        require_id(DICTIONARY, dictionary_id)?;
        let path = ApiPath::new(["entities", dictionary_id, "_all"])
            .query_opt("limit", limit)
            .query_opt("offset", offset);
        self.connection.send_request("", &path, HttpMethod::Get, None)
    }

    /// Add entries, typically [`DictionaryEntry`](crate::types::DictionaryEntry)
    /// values. At least one entry is required.
    pub fn add_entries<E: Serialize>(&self, dictionary_id: &str, entries: &[E]) -> Result<Value> {
        require_id(DICTIONARY, dictionary_id)?;
        if entries.is_empty() {
            return Err(Error::validation("array of new entries cannot be empty"));
        }
        self.connection.send_request(
            json_body(entries)?,
            &ApiPath::new(["entities", dictionary_id, ""]),
            HttpMethod::Post,
            Some(CONTENT_TYPE_JSON),
        )
    }

    pub fn get_entry(&self, dictionary_id: &str, entry_id: &str) -> Result<Value> {
        require_id(DICTIONARY, dictionary_id)?;
        require_id("Custom Entity Dictionary Entries", entry_id)?;
        self.connection.send_request(
            "",
            &ApiPath::new(["entities", dictionary_id, entry_id]),
            HttpMethod::Get,
            None,
        )
    }

    pub fn delete_entry(&self, dictionary_id: &str, entry_id: &str) -> Result<Value> {
        require_id(DICTIONARY, dictionary_id)?;
        require_id("Custom Entity Dictionary Entries", entry_id)?;
        self.connection.send_request(
            "",
            &ApiPath::new(["entities", dictionary_id, entry_id]),
            HttpMethod::Delete,
            None,
        )
    }
}
