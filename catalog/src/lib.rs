pub mod error;
pub mod slug;
pub mod store;
pub mod types;

pub use error::CatalogError;
pub use store::Catalog;
pub use types::{PosterRecord, Provenance};
