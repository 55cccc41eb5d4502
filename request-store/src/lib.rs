//! Storage and retrieval of logged HTTP accesses.
//!
//! Records are validated with [`validator`], persisted through a [`store::RequestStore`]
//! and read back through the filters in [`query`].

pub mod config;
pub mod metrics_defs;
pub mod query;
pub mod record;
pub mod store;
pub mod validator;

pub use query::{Filter, Page, QueryParams};
pub use record::Record;
pub use store::{RequestStore, StoreError, open_store};
