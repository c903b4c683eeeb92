//! Finals publication.
//!
//! Finals results stay hidden from consumer-facing standings until an admin
//! publishes them. Publication is one-way: there is no un-publish.
//!
//! ## Example
//!
//! ```no_run
//! use standings::db::memory::InMemoryStore;
//! use standings::publication::{PublicationGate, PublishOutcome};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let gate = PublicationGate::new(Arc::new(InMemoryStore::new()));
//!
//!     match gate.publish_pending_finals(false).await? {
//!         PublishOutcome::Published(summary) => {
//!             println!("Published {} finals", summary.published_count)
//!         }
//!         PublishOutcome::NothingToPublish => println!("Nothing to publish"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod gate;

pub use gate::{PublicationGate, PublishOutcome, PublishSummary, is_query_visible};
