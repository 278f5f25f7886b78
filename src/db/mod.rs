pub mod async_connection;
pub mod connection;
pub mod memory_connection;
#[cfg(feature = "restless")]
pub mod restless;

pub use async_connection::{AsyncRecordSource, BlockingSource};
pub use connection::{ListResponse, MockRecordSource, PageRequest, RecordSource, SourceError};
pub use memory_connection::MemorySource;
#[cfg(feature = "restless")]
pub use restless::{RestlessConfig, RestlessTranslator};
