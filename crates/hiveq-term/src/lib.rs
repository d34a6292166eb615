//! hiveq-term: terminal presentation for hiveq.
//!
//! The run pipeline builds one [`Highlighter`](highlight::Highlighter) after
//! the hits are known and hands it, by reference, to the
//! [`Renderer`](render::Renderer). Nothing here touches hit data; it only
//! decides how lines look.

pub mod highlight;
pub mod render;
pub mod theme;

pub use highlight::{HighlightRule, Highlighter};
pub use render::Renderer;
pub use theme::{HighlightColors, OutputStyle};
