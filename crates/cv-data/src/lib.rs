pub mod loaders;
pub mod providers;
pub mod sources;

pub use loaders::*;
pub use providers::*;
pub use sources::*;
