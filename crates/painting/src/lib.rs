//! UV-space texture painting engine
//!
//! Paints directly into a mesh texture from pointer positions on its UV
//! layout:
//! - [`coverage`] / [`islands`] - UV coverage mask and island labeling
//! - [`masks`] - Cached masks and the per-pixel paint gate
//! - [`kernel`] / [`brush`] - Brush weights and drag resampling
//! - [`compositor`] - Dab and fill blending (scalar and row-parallel)
//! - [`fill`] - Island selection for fill and island erase
//! - [`symmetry`] - Mirror painting and axis editing
//! - [`canvas`] - Canvas storage with dirty-tile tracking
//! - [`pipeline`] - The paint session: strokes, fills, undo/redo
//! - [`messages`] - Localized user notices

pub mod brush;
pub mod canvas;
pub mod compositor;
pub mod constants;
pub mod coverage;
pub mod error;
pub mod export;
pub mod fill;
pub mod islands;
pub mod kernel;
pub mod masks;
pub mod mesh;
pub mod messages;
pub mod pipeline;
pub mod surface;
pub mod symmetry;
pub mod types;
pub mod validation;

pub use brush::*;
pub use canvas::*;
pub use compositor::*;
pub use constants::*;
pub use coverage::*;
pub use error::*;
pub use export::*;
pub use fill::*;
pub use islands::*;
pub use kernel::*;
pub use masks::*;
pub use mesh::*;
pub use messages::*;
pub use pipeline::*;
pub use surface::*;
pub use symmetry::*;
pub use types::*;
pub use validation::*;

pub use uvpaint_config::{CompositorBackend, Language, PainterSettings};
