//! Elasticsearch-backed implementation of the content search port.

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use crate::{
    config::SearchConfig,
    models::SentimentCounts,
    search::{ContentSearchPort, MentionQuery, SearchError},
};

/// Queries an Elasticsearch-compatible endpoint with a sentiment terms
/// aggregation over the alert's filter and window.
pub struct ElasticContentSearch {
    client: reqwest::Client,
    search_url: Url,
}

impl ElasticContentSearch {
    /// Creates a new client for the configured endpoint and index.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let search_url = config
            .base_url
            .join(&format!("{}/_search", config.index))
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
        Ok(Self { client, search_url })
    }

    /// Builds the aggregation query body for one mention query.
    fn build_query_body(query: &MentionQuery) -> Value {
        let mut filters = vec![json!({
            "range": {
                "published_at": {
                    "gt": query.window.start.to_rfc3339(),
                    "lte": query.window.end.to_rfc3339(),
                }
            }
        })];

        // Empty filter sets mean "match everything" and are omitted.
        if !query.sources.is_empty() {
            filters.push(json!({ "terms": { "source": query.sources } }));
        }
        if !query.sentiments.is_empty() {
            filters.push(json!({ "terms": { "sentiment": query.sentiments } }));
        }
        if let Some(topic_id) = query.topic_id {
            filters.push(json!({ "term": { "topic_id": topic_id } }));
        }

        json!({
            "size": 0,
            "query": {
                "bool": {
                    "must": [
                        { "query_string": { "query": query.keywords, "default_field": "content" } }
                    ],
                    "filter": filters,
                }
            },
            "aggs": {
                "sentiments": { "terms": { "field": "sentiment" } }
            }
        })
    }

    /// Folds the terms-aggregation buckets into the three canonical
    /// sentiment counts, ignoring any other bucket labels.
    fn parse_counts(body: &Value) -> Result<SentimentCounts, SearchError> {
        let buckets = body
            .pointer("/aggregations/sentiments/buckets")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SearchError::InvalidResponse("missing sentiment aggregation buckets".to_string())
            })?;

        let mut counts = SentimentCounts::default();
        for bucket in buckets {
            let key = bucket.get("key").and_then(Value::as_str).unwrap_or_default();
            let doc_count = bucket.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
            match key.to_ascii_lowercase().as_str() {
                "positive" => counts.positive += doc_count,
                "neutral" => counts.neutral += doc_count,
                "negative" => counts.negative += doc_count,
                _ => {}
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl ContentSearchPort for ElasticContentSearch {
    async fn count_mentions(&self, query: &MentionQuery) -> Result<SentimentCounts, SearchError> {
        let body = Self::build_query_body(query);
        tracing::debug!(url = %self.search_url, "Executing mention count query.");

        let response = self.client.post(self.search_url.clone()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::BadStatus(status.as_u16()));
        }

        let payload: Value = response.json().await?;
        Self::parse_counts(&payload)
    }
}
