pub mod market;
pub mod errors;

pub use market::*;
pub use errors::*;
