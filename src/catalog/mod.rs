//! The resource catalog: grades, subjects and the per-pair resource bundles,
//! plus the read-side views derived from them.

pub mod error;
pub mod language;
pub mod model;
pub mod page;
pub mod seed;
pub mod snapshot;
pub mod stats;
pub mod store;

pub use error::{CatalogError, ImportError};
pub use language::{Language, LanguageSelector};
pub use model::{NoteInput, PaperInput};
pub use store::CatalogStore;
