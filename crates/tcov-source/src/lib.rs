pub mod error;
pub mod loader;
pub mod types;

pub use error::*;
pub use loader::*;
pub use types::*;
