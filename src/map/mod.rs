mod geometry;
pub mod markers;
mod projection;
mod renderer;

pub use markers::{Marker, MarkerLayer, FOCUS_PITCH, FOCUS_ZOOM};
pub use projection::{Camera, Viewport};
pub use renderer::{Glyph, GlyphKind, LineString, Lod, MapLayers, MapRenderer, Scene};
