use buster_socket_caller::SocketRoute;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GetDataSourceRequest {
    pub id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DataSource {
    pub id: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub source_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub credentials: Option<Value>,
}

/// `/data_sources/get` -> `/data_sources/get:getDataSource`
pub struct GetDataSource;

impl SocketRoute for GetDataSource {
    const REQUEST_ROUTE: &'static str = "/data_sources/get";
    const RESPONSE_ROUTE: &'static str = "/data_sources/get:getDataSource";

    type Request = GetDataSourceRequest;
    type Response = DataSource;
}
