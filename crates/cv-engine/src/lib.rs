// ChainView host entry points: configuration, render sessions and the
// load-then-render pipeline used by the `chainview` binary.

pub mod config;
pub mod session;

pub use config::{OutputFormat, RenderConfig};
pub use session::{run, RenderOutput, RenderSession};
