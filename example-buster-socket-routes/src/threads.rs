use buster_socket_caller::{SocketEvent, SocketRoute};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ListThreadsRequest {
    pub page: i64,
    pub page_size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_view: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ThreadListItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub last_edited: Option<String>,
    #[serde(default)]
    pub dataset_name: Option<String>,
    #[serde(default)]
    pub created_by_name: Option<String>,
    #[serde(default)]
    pub is_shared: bool,
}

/// `/threads/list` -> `/threads/list:getThreadsList`
pub struct ListThreads;

impl SocketRoute for ListThreads {
    const REQUEST_ROUTE: &'static str = "/threads/list";
    const RESPONSE_ROUTE: &'static str = "/threads/list:getThreadsList";

    type Request = ListThreadsRequest;
    type Response = Vec<ThreadListItem>;
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StepProgress {
    InProgress,
    Completed,
    Failed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FetchingData {
    pub thread_id: String,
    pub message_id: String,
    pub progress: StepProgress,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Pushed while a thread's query results stream in.
pub struct ThreadFetchingData;

impl SocketEvent for ThreadFetchingData {
    const ROUTE: &'static str = "/threads/get:fetchingData";

    type Payload = FetchingData;
}
