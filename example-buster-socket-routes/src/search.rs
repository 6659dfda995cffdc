use buster_socket_caller::SocketRoute;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_threads: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_dashboards: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_data_sources: Option<bool>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub updated_at: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    #[serde(default)]
    pub score: f64,
}

/// `/search` -> `/search:search`
pub struct Search;

impl SocketRoute for Search {
    const REQUEST_ROUTE: &'static str = "/search";
    const RESPONSE_ROUTE: &'static str = "/search:search";

    type Request = SearchRequest;
    type Response = Vec<SearchResult>;
}
