//! Request payloads for the dictionary and classifier endpoints.
//!
//! # Design
//! Managers accept any `Serialize` value, so callers may pass `serde_json`
//! values directly. These types cover the documented fields and omit unset
//! ones from the JSON body.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Properties of a new custom entity dictionary. All fields are optional;
/// an empty value serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryOptions {
    /// `token` or `stem`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_insensitive: Option<bool>,
    /// ISO-639-2 code, e.g. `eng`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// One entry of a custom entity dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Assigned by the service when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, Vec<String>>,
}

impl DictionaryEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, values: Vec<String>) -> Self {
        self.data.insert(key.into(), values);
        self
    }
}

/// One category of a custom classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Boolean query matched against the analyzed text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Category {
    pub fn new(category_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            label: None,
            query: Some(query.into()),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
