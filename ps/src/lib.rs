//! PlanStore - flat-file persistence for generated project plans
//!
//! Each plan is written as one human-readable text record named after a key
//! derived from its project name. Keys are lossy: two plans whose names
//! normalize to the same key share a record, and the last save wins.
//!
//! # Layout
//!
//! ```text
//! plans/
//! ├── todo_app.txt
//! ├── weather_dashboard.txt
//! └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use planstore::{Plan, PlanStore};
//!
//! let store = PlanStore::open("plans")?;
//! let key = store.save(&plan)?;
//! let text = store.read(&key)?;
//! for record in store.list_history()? {
//!     println!("{}", record.key.display_name());
//! }
//! ```

mod error;
mod key;
mod plan;
pub mod record;
mod store;

pub use error::{Result, StoreError};
pub use key::StorageKey;
pub use plan::{Plan, Severity, strip_ordinal};
pub use store::{PlanStore, StoredPlanRecord};

/// File extension used for plan records
pub const RECORD_EXTENSION: &str = "txt";

/// Placeholder shown for fields the model did not provide
pub const NOT_AVAILABLE: &str = "N/A";
