//! Account usage and plan information.

use serde_json::Value;

use crate::connection::Connection;
use crate::error::Result;
use crate::http::{ApiPath, HttpMethod};
use crate::settings::Settings;
use crate::transport::{Transport, UreqTransport};

#[derive(Debug, Clone)]
pub struct AccountManager<T = UreqTransport> {
    connection: Connection<T>,
}

impl AccountManager<UreqTransport> {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_transport(settings, UreqTransport::new())
    }
}

impl<T: Transport> AccountManager<T> {
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

    pub fn get_account(&self) -> Result<Value> {
        self.connection
            .send_request("", &ApiPath::new(["account", ""]), HttpMethod::Get, None)
    }
}
