// Adapters layer: concrete implementations for external systems (file storage, http).

pub mod http;
pub mod storage;

pub use http::HttpSubscriptionSink;
pub use storage::LocalStorage;
