//! Blocking client for the TextRazor text-analysis service.
//!
//! # Overview
//! [`TextRazor`] encodes a set of [`AnalysisOptions`] as a form body, sends
//! it with the document to analyze, and returns the decoded JSON reply as a
//! [`serde_json::Value`]. [`DictionaryManager`], [`ClassifierManager`] and
//! [`AccountManager`] wrap the service's resource endpoints.
//!
//! # Design
//! - Configuration is an explicit [`Settings`] value passed to each
//!   constructor. Every client copies it into its own connection settings.
//! - Requests are built as plain [`HttpRequest`] data and executed by a
//!   [`Transport`]; [`UreqTransport`] is the default.
//! - One call is one request. Nothing is retried.
//!
//! ```no_run
//! use textrazor::{Settings, TextRazor};
//!
//! # fn main() -> textrazor::Result<()> {
//! let settings = Settings::from_env()?;
//! let mut client = TextRazor::new(&settings)?;
//! client.options_mut().add_extractor("entities").add_extractor("words");
//!
//! let reply = client.analyze("Barclays misled shareholders and the public.")?;
//! for entity in reply["response"]["entities"].as_array().into_iter().flatten() {
//!     println!("{}", entity["entityId"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod classifier;
pub mod client;
pub mod connection;
pub mod dictionary;
pub mod error;
pub mod http;
pub mod options;
pub mod query;
pub mod settings;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use account::AccountManager;
pub use classifier::ClassifierManager;
pub use client::TextRazor;
pub use connection::{Connection, ConnectionSettings};
pub use dictionary::DictionaryManager;
pub use error::{Error, Result, TransportErrorKind};
pub use http::{ApiPath, HttpMethod, HttpRequest, HttpResponse};
pub use options::AnalysisOptions;
pub use query::{QueryBuilder, QueryValue};
pub use settings::Settings;
pub use transport::{Transport, UreqTransport};
pub use types::{Category, DictionaryEntry, DictionaryOptions};
