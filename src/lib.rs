pub mod error;
pub use error::*;

pub mod provider;
pub mod record;
pub mod sync;
pub mod zone;

mod wrapper;
