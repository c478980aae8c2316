pub mod classify;
pub mod compare;
pub mod config;
pub mod coverage;
pub mod gaps;
pub mod normalize;
pub mod record;
pub mod scoring;
pub mod similarity;
pub mod validation;

pub use classify::*;
pub use compare::*;
pub use config::*;
pub use coverage::*;
pub use gaps::*;
pub use normalize::*;
pub use record::*;
pub use scoring::*;
pub use similarity::*;
pub use validation::*;
