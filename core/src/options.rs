//! Analysis options and their encoding into a request body.
//!
//! Setters are statically typed. Options that arrive as data (a JSON config
//! file, a message from another service) go through [`AnalysisOptions::apply_json`],
//! which performs the type checks at runtime and reports mismatches as
//! [`Error::Validation`].

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::query::QueryBuilder;

/// Every option the analysis endpoint understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOptions {
    extractors: Vec<String>,
    classifiers: Vec<String>,
    rules: Option<String>,
    cleanup_html: bool,
    language_override: Option<String>,
    allow_overlap: bool,
    dbpedia_type_filters: Vec<String>,
    freebase_type_filters: Vec<String>,
    enrichment_queries: Vec<String>,
    entity_dictionaries: Vec<String>,
    cleanup_mode: Option<String>,
    cleanup_return_cleaned: bool,
    cleanup_return_raw: bool,
    cleanup_use_metadata: bool,
    download_user_agent: Option<String>,
    classifier_max_categories: Option<u32>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            extractors: Vec::new(),
            classifiers: Vec::new(),
            rules: None,
            cleanup_html: false,
            language_override: None,
            allow_overlap: true,
            dbpedia_type_filters: Vec::new(),
            freebase_type_filters: Vec::new(),
            enrichment_queries: Vec::new(),
            entity_dictionaries: Vec::new(),
            cleanup_mode: None,
            cleanup_return_cleaned: false,
            cleanup_return_raw: false,
            cleanup_use_metadata: false,
            download_user_agent: None,
            classifier_max_categories: None,
        }
    }
}

fn to_strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options built from a JSON object; see [`AnalysisOptions::apply_json`].
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut options = Self::default();
        options.apply_json(value)?;
        Ok(options)
    }

    pub fn extractors(&self) -> &[String] {
        &self.extractors
    }

    pub fn classifiers(&self) -> &[String] {
        &self.classifiers
    }

    pub fn entity_dictionaries(&self) -> &[String] {
        &self.entity_dictionaries
    }

    pub fn set_extractors<I, S>(&mut self, extractors: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extractors = to_strings(extractors);
        self
    }

    pub fn add_extractor(&mut self, extractor: impl Into<String>) -> &mut Self {
        self.extractors.push(extractor.into());
        self
    }

    pub fn set_classifiers<I, S>(&mut self, classifiers: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classifiers = to_strings(classifiers);
        self
    }

    pub fn add_classifier(&mut self, classifier: impl Into<String>) -> &mut Self {
        self.classifiers.push(classifier.into());
        self
    }

    pub fn set_rules(&mut self, rules: impl Into<String>) -> &mut Self {
        self.rules = Some(rules.into());
        self
    }

    pub fn set_cleanup_html(&mut self, cleanup_html: bool) -> &mut Self {
        self.cleanup_html = cleanup_html;
        self
    }

    pub fn set_language_override(&mut self, language: impl Into<String>) -> &mut Self {
        self.language_override = Some(language.into());
        self
    }

    pub fn set_allow_overlap(&mut self, allow_overlap: bool) -> &mut Self {
        self.allow_overlap = allow_overlap;
        self
    }

    pub fn set_entity_dictionaries<I, S>(&mut self, dictionaries: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_dictionaries = to_strings(dictionaries);
        self
    }

    pub fn add_entity_dictionary(&mut self, dictionary_id: impl Into<String>) -> &mut Self {
        self.entity_dictionaries.push(dictionary_id.into());
        self
    }

    pub fn set_dbpedia_type_filters<I, S>(&mut self, filters: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dbpedia_type_filters = to_strings(filters);
        self
    }

    pub fn add_dbpedia_type_filter(&mut self, filter: impl Into<String>) -> &mut Self {
        self.dbpedia_type_filters.push(filter.into());
        self
    }

    pub fn set_freebase_type_filters<I, S>(&mut self, filters: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.freebase_type_filters = to_strings(filters);
        self
    }

    pub fn add_freebase_type_filter(&mut self, filter: impl Into<String>) -> &mut Self {
        self.freebase_type_filters.push(filter.into());
        self
    }

    pub fn set_enrichment_queries<I, S>(&mut self, queries: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enrichment_queries = to_strings(queries);
        self
    }

    pub fn add_enrichment_query(&mut self, query: impl Into<String>) -> &mut Self {
        self.enrichment_queries.push(query.into());
        self
    }

    pub fn set_cleanup_mode(&mut self, mode: impl Into<String>) -> &mut Self {
        self.cleanup_mode = Some(mode.into());
        self
    }

    pub fn set_cleanup_return_cleaned(&mut self, return_cleaned: bool) -> &mut Self {
        self.cleanup_return_cleaned = return_cleaned;
        self
    }

    pub fn set_cleanup_return_raw(&mut self, return_raw: bool) -> &mut Self {
        self.cleanup_return_raw = return_raw;
        self
    }

    pub fn set_cleanup_use_metadata(&mut self, use_metadata: bool) -> &mut Self {
        self.cleanup_use_metadata = use_metadata;
        self
    }

    pub fn set_download_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.download_user_agent = Some(user_agent.into());
        self
    }

    pub fn set_classifier_max_categories(&mut self, max_categories: u32) -> &mut Self {
        self.classifier_max_categories = Some(max_categories);
        self
    }

    /// Encode every option under its wire key.
    ///
    /// The order is fixed so identical options always produce an identical
    /// body.
    pub fn build_query(&self) -> QueryBuilder {
        let mut query = QueryBuilder::new();

        query
            .add("extractors", self.extractors.as_slice())
            .add("cleanupHTML", self.cleanup_html)
            .add("rules", self.rules.as_deref())
            .add("languageOverride", self.language_override.as_deref());

        query
            .add("entities.allowOverlap", self.allow_overlap)
            .add("entities.filterDbpediaTypes", self.dbpedia_type_filters.as_slice())
            .add("entities.filterFreebaseTypes", self.freebase_type_filters.as_slice())
            .add("entities.enrichmentQueries", self.enrichment_queries.as_slice())
            .add("entities.dictionaries", self.entity_dictionaries.as_slice());

        query
            .add("classifiers", self.classifiers.as_slice())
            .add("classifier.maxCategories", self.classifier_max_categories);

        query
            .add("cleanup.mode", self.cleanup_mode.as_deref())
            .add("cleanup.returnCleaned", self.cleanup_return_cleaned)
            .add("cleanup.returnRaw", self.cleanup_return_raw)
            .add("cleanup.useMetadata", self.cleanup_use_metadata);

        query.add("download.userAgent", self.download_user_agent.as_deref());

        query
    }

    /// Apply options given as a JSON object keyed by option name.
    ///
    /// All keys are checked before anything is written, so a rejected
    /// document leaves `self` unchanged.
    pub fn apply_json(&mut self, value: &Value) -> Result<()> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::validation("analysis options must be a JSON object"))?;

        let mut updated = self.clone();
        for (key, value) in object {
            updated.apply_field(key, value)?;
        }
        *self = updated;
        Ok(())
    }

    fn apply_field(&mut self, key: &str, value: &Value) -> Result<()> {
        match key {
            "extractors" => self.extractors = string_list(key, value)?,
            "classifiers" => self.classifiers = string_list(key, value)?,
            "entityDictionaries" => self.entity_dictionaries = string_list(key, value)?,
            "dbpediaTypeFilters" => self.dbpedia_type_filters = string_list(key, value)?,
            "freebaseTypeFilters" => self.freebase_type_filters = string_list(key, value)?,
            "enrichmentQueries" => self.enrichment_queries = string_list(key, value)?,
            "rules" => self.rules = Some(string(key, value)?),
            "languageOverride" => self.language_override = Some(string(key, value)?),
            "cleanupMode" => self.cleanup_mode = Some(string(key, value)?),
            "downloadUserAgent" => self.download_user_agent = Some(string(key, value)?),
            "cleanupHTML" => self.cleanup_html = boolean(key, value)?,
            "allowOverlap" => self.allow_overlap = boolean(key, value)?,
            "cleanupReturnCleaned" => self.cleanup_return_cleaned = boolean(key, value)?,
            "cleanupReturnRaw" => self.cleanup_return_raw = boolean(key, value)?,
            "cleanupUseMetadata" => self.cleanup_use_metadata = boolean(key, value)?,
            "classifierMaxCategories" => {
                let max = value
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| Error::validation(format!("{key} must be a non-negative integer")))?;
                self.classifier_max_categories = Some(max);
            }
            other => return Err(Error::validation(format!("unknown analysis option {other:?}"))),
        }
        Ok(())
    }
}

fn string(key: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::validation(format!("{key} must be a string")))
}

fn boolean(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::validation(format!("{key} must be a bool")))
}

fn string_list(key: &str, value: &Value) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::validation(format!("{key} must be an array of strings")))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::validation(format!("{key} must be an array of strings")))
        })
        .collect()
}

impl TryFrom<&Value> for AnalysisOptions {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Self::from_json(value)
    }
}

impl TryFrom<Map<String, Value>> for AnalysisOptions {
    type Error = Error;

    fn try_from(map: Map<String, Value>) -> Result<Self> {
        Self::from_json(&Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const DEFAULT_BODY: &str = "cleanupHTML=false&entities.allowOverlap=true\
&cleanup.returnCleaned=false&cleanup.returnRaw=false&cleanup.useMetadata=false";

    #[test]
    fn defaults_emit_only_booleans() {
        assert_eq!(AnalysisOptions::new().build_query().build(), DEFAULT_BODY);
    }

    #[test]
    fn every_field_in_fixed_order() {
        let mut options = AnalysisOptions::new();
        options
            .add_extractor("entities")
            .add_extractor("words")
            .set_cleanup_html(true)
            .set_rules("r")
            .set_language_override("fre")
            .set_allow_overlap(false)
            .add_dbpedia_type_filter("Person")
            .add_freebase_type_filter("/people/person")
            .add_enrichment_query("q")
            .add_entity_dictionary("dict")
            .add_classifier("textrazor_iab")
            .set_classifier_max_categories(3)
            .set_cleanup_mode("stripTags")
            .set_cleanup_return_cleaned(true)
            .set_cleanup_return_raw(true)
            .set_cleanup_use_metadata(true)
            .set_download_user_agent("bot");

        let q = options.build_query();
        let keys: Vec<&str> = q.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "extractors",
                "extractors",
                "cleanupHTML",
                "rules",
                "languageOverride",
                "entities.allowOverlap",
                "entities.filterDbpediaTypes",
                "entities.filterFreebaseTypes",
                "entities.enrichmentQueries",
                "entities.dictionaries",
                "classifiers",
                "classifier.maxCategories",
                "cleanup.mode",
                "cleanup.returnCleaned",
                "cleanup.returnRaw",
                "cleanup.useMetadata",
                "download.userAgent",
            ]
        );
        assert_eq!(q.pairs()[11].1, "3");
    }

    #[test]
    fn build_query_is_deterministic() {
        let mut options = AnalysisOptions::new();
        options.set_extractors(["entities", "topics"]).add_classifier("c");
        assert_eq!(options.build_query().build(), options.build_query().build());
    }

    #[test]
    fn scalar_setters_overwrite_and_list_adders_append() {
        let mut options = AnalysisOptions::new();
        options.set_rules("first").set_rules("second");
        options.add_extractor("entities").add_extractor("words");
        options.set_extractors(["topics"]).add_extractor("entities");
        let body = options.build_query().build();
        assert!(body.starts_with("extractors=topics&extractors=entities&cleanupHTML=false&rules=second&"));
    }

    #[test]
    fn json_configuration_applies_typed_values() {
        let options = AnalysisOptions::from_json(&json!({
            "extractors": ["entities", "words"],
            "cleanupHTML": true,
            "classifierMaxCategories": 10,
            "languageOverride": "eng",
        }))
        .unwrap();
        assert_eq!(options.extractors(), ["entities", "words"]);
        assert!(options.cleanup_html);
        assert_eq!(options.classifier_max_categories, Some(10));
        assert_eq!(options.language_override.as_deref(), Some("eng"));
    }

    #[test]
    fn non_list_extractors_is_validation_error() {
        let err = AnalysisOptions::from_json(&json!({"extractors": 42})).unwrap_err();
        match err {
            Error::Validation(msg) => assert!(msg.contains("extractors"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn wrong_scalar_types_are_rejected() {
        for doc in [
            json!({"cleanupHTML": "yes"}),
            json!({"rules": 1}),
            json!({"classifiers": ["ok", 2]}),
            json!({"classifierMaxCategories": -1}),
            json!({"noSuchOption": true}),
            json!(["extractors"]),
        ] {
            let err = AnalysisOptions::from_json(&doc).unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{doc}");
        }
    }

    #[test]
    fn rejected_document_leaves_options_untouched() {
        let mut options = AnalysisOptions::new();
        options.add_extractor("entities");
        let before = options.clone();
        let err = options
            .apply_json(&json!({"extractors": ["words"], "allowOverlap": "no"}))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(options, before);
    }
}
