//! Quote transformation and charting pipeline.
//!
//! Raw chain → [`filter`] → [`group`] → [`scale`] → [`graph`] produces an
//! ordered [`DrawList`] for one chain; [`glyph`] does the same for a single
//! held option. [`svg`] replays draw lists into SVG markup.

pub mod draw;
pub mod filter;
pub mod format;
pub mod glyph;
pub mod graph;
pub mod group;
pub mod measure;
pub mod scale;
pub mod svg;
pub mod ticks;

pub use draw::*;
pub use filter::*;
pub use format::*;
pub use glyph::*;
pub use graph::*;
pub use group::*;
pub use measure::*;
pub use scale::*;
pub use svg::*;
