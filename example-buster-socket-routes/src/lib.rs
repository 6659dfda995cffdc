pub mod data_sources;
pub mod search;
pub mod threads;

pub use data_sources::GetDataSource;
pub use search::Search;
pub use threads::{ListThreads, ThreadFetchingData};
