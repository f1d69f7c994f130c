pub mod error;
pub mod flat;
pub mod io;

pub use error::VecError;
pub use flat::{FlatIndex, SearchHit, inner_product, norm};
pub use io::{load_keys, load_vectors, save};
