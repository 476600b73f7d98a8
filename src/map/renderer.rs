use crate::braille::BrailleCanvas;
use crate::geo::Coordinate;
use crate::map::geometry::{draw_cross, draw_line, draw_ring};
use crate::map::markers::MarkerLayer;
use crate::map::projection::Viewport;
use crate::model::ExperienceId;

/// A geographic line as (lng, lat) pairs, the GeoJSON axis order
pub type LineString = Vec<(f64, f64)>;

/// Level of detail for basemap data
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lod {
    Low,    // 110m - world view
    Medium, // 50m - country
    High,   // 10m - city
}

impl Lod {
    /// Select LOD based on zoom level
    pub fn from_zoom(zoom: f64) -> Self {
        if zoom < 4.0 {
            Lod::Low
        } else if zoom < 8.0 {
            Lod::Medium
        } else {
            Lod::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Lod::Low => "110m",
            Lod::Medium => "50m",
            Lod::High => "10m",
        }
    }
}

/// What a glyph on the map stands for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphKind {
    Marker,
    Highlighted,
    Picker,
}

/// A symbol drawn on top of the braille layers, in character cells
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    pub x: u16,
    pub y: u16,
    pub symbol: char,
    pub kind: GlyphKind,
}

/// Output of one map render pass
pub struct MapLayers {
    /// Coastlines and borders, or the graticule when no data is loaded
    pub basemap: BrailleCanvas,
    /// Highlight ring and user position
    pub overlay: BrailleCanvas,
    pub glyphs: Vec<Glyph>,
}

/// Per-frame inputs beyond the basemap itself
pub struct Scene<'a> {
    pub markers: &'a MarkerLayer,
    pub highlighted: Option<&'a ExperienceId>,
    pub user: Coordinate,
    pub picker: Option<Coordinate>,
}

/// Basemap renderer with multi-resolution vector data
#[derive(Default)]
pub struct MapRenderer {
    coastlines_low: Vec<LineString>,
    coastlines_medium: Vec<LineString>,
    coastlines_high: Vec<LineString>,
    borders: Vec<LineString>,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coastlines for the LOD, falling back to the nearest coarser set
    fn coastlines(&self, lod: Lod) -> &[LineString] {
        let candidates = match lod {
            Lod::High => [&self.coastlines_high, &self.coastlines_medium, &self.coastlines_low],
            Lod::Medium => [&self.coastlines_medium, &self.coastlines_low, &self.coastlines_high],
            Lod::Low => [&self.coastlines_low, &self.coastlines_medium, &self.coastlines_high],
        };
        candidates
            .into_iter()
            .find(|c| !c.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Render the basemap and scene into a `width` x `height` character area
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport, scene: &Scene) -> MapLayers {
        let mut basemap = BrailleCanvas::new(width, height);
        let mut overlay = BrailleCanvas::new(width, height);

        if self.has_data() {
            for line in self.coastlines(Lod::from_zoom(viewport.zoom())) {
                draw_linestring(&mut basemap, line, viewport);
            }
            if viewport.zoom() >= 4.0 {
                for line in &self.borders {
                    draw_linestring(&mut basemap, line, viewport);
                }
            }
        } else {
            draw_graticule(&mut basemap, viewport);
        }

        let (ux, uy) = viewport.project(scene.user);
        if viewport.is_visible(ux, uy) {
            draw_cross(&mut overlay, ux, uy, 2);
        }

        let mut glyphs = Vec::with_capacity(scene.markers.len() + 1);
        let mut highlight = None;
        for marker in scene.markers.markers() {
            let (px, py) = viewport.project(marker.coordinate);
            if !viewport.is_visible(px, py) {
                continue;
            }
            let is_highlighted = scene.highlighted == Some(&marker.id);
            if is_highlighted {
                highlight = Some((px, py));
            }
            glyphs.push(Glyph {
                x: (px / 2) as u16,
                y: (py / 4) as u16,
                symbol: if is_highlighted { '◆' } else { '●' },
                kind: if is_highlighted { GlyphKind::Highlighted } else { GlyphKind::Marker },
            });
        }
        // Highlighted marker last so it is never covered by a neighbour
        glyphs.sort_by_key(|g| g.kind == GlyphKind::Highlighted);
        if let Some((px, py)) = highlight {
            draw_ring(&mut overlay, px, py, 5);
        }

        if let Some(pick) = scene.picker {
            let (px, py) = viewport.project(pick);
            if viewport.is_visible(px, py) {
                glyphs.push(Glyph {
                    x: (px / 2) as u16,
                    y: (py / 4) as u16,
                    symbol: '✚',
                    kind: GlyphKind::Picker,
                });
            }
        }

        MapLayers { basemap, overlay, glyphs }
    }

    /// Add coastline data at a specific LOD
    pub fn add_coastline(&mut self, line: LineString, lod: Lod) {
        match lod {
            Lod::Low => self.coastlines_low.push(line),
            Lod::Medium => self.coastlines_medium.push(line),
            Lod::High => self.coastlines_high.push(line),
        }
    }

    /// Add country border data
    pub fn add_border(&mut self, line: LineString) {
        self.borders.push(line);
    }

    /// Check if any coastline data is loaded
    pub fn has_data(&self) -> bool {
        !self.coastlines_low.is_empty()
            || !self.coastlines_medium.is_empty()
            || !self.coastlines_high.is_empty()
    }
}

/// Draw a linestring with viewport culling
fn draw_linestring(canvas: &mut BrailleCanvas, line: &LineString, viewport: &Viewport) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for &(lng, lat) in line {
        let p = viewport.project(Coordinate::new(lat, lng));
        if let Some(q) = prev {
            // Long jumps are antimeridian wraps, not real segments
            let dist = ((p.0 - q.0).abs() + (p.1 - q.1).abs()) as usize;
            if dist < viewport.width * 4 && viewport.line_might_be_visible(q, p) {
                draw_line(canvas, q.0, q.1, p.0, p.1);
            }
        }
        prev = Some(p);
    }
}

/// Degree spacings tried for the graticule, coarse to fine
const GRID_STEPS: [f64; 10] = [30.0, 10.0, 5.0, 1.0, 0.5, 0.1, 0.05, 0.01, 0.005, 0.001];
/// Minimum on-screen spacing between graticule lines, in braille pixels
const GRID_MIN_SPACING: f64 = 24.0;

/// Latitude/longitude grid drawn when no coastline data is available
fn draw_graticule(canvas: &mut BrailleCanvas, viewport: &Viewport) {
    let px_per_degree = super::projection::TILE_SIZE * viewport.zoom().exp2() / 360.0;
    let step = GRID_STEPS
        .iter()
        .rev()
        .copied()
        .find(|s| s * px_per_degree >= GRID_MIN_SPACING)
        .unwrap_or(GRID_STEPS[0]);

    let (w, h) = (viewport.width as i32, viewport.height as i32);
    let corners = [
        viewport.unproject(0, 0),
        viewport.unproject(w, 0),
        viewport.unproject(0, h),
        viewport.unproject(w, h),
    ];
    let min_lat = corners.iter().map(|c| c.lat).fold(f64::INFINITY, f64::min).max(-85.0);
    let max_lat = corners.iter().map(|c| c.lat).fold(f64::NEG_INFINITY, f64::max).min(85.0);
    let min_lng = corners.iter().map(|c| c.lng).fold(f64::INFINITY, f64::min);
    let max_lng = corners.iter().map(|c| c.lng).fold(f64::NEG_INFINITY, f64::max);

    // Mercator parallels and meridians stay straight under rotation and tilt
    let mut lat = (min_lat / step).floor() * step;
    while lat <= max_lat {
        let a = viewport.project(Coordinate::new(lat, min_lng));
        let b = viewport.project(Coordinate::new(lat, max_lng));
        draw_line(canvas, a.0, a.1, b.0, b.1);
        lat += step;
    }
    let mut lng = (min_lng / step).floor() * step;
    while lng <= max_lng {
        let a = viewport.project(Coordinate::new(min_lat, lng));
        let b = viewport.project(Coordinate::new(max_lat, lng));
        draw_line(canvas, a.0, a.1, b.0, b.1);
        lng += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilteredIndex;
    use crate::map::projection::Camera;
    use crate::model::{Experience, ExperienceFields};

    fn viewport() -> Viewport {
        Viewport::new(
            Camera {
                center: Coordinate::new(17.6868, 83.2185),
                zoom: 13.0,
                pitch: 45.0,
                bearing: -20.0,
            },
            80,
            40,
        )
    }

    fn layer() -> MarkerLayer {
        let e = Experience::new(
            "here",
            ExperienceFields {
                lat: Some(17.6868),
                lng: Some(83.2185),
                ..Default::default()
            },
        );
        let mut layer = MarkerLayer::new();
        layer.sync(&FilteredIndex::from_entries(vec![e]));
        layer
    }

    #[test]
    fn test_lod_from_zoom() {
        assert_eq!(Lod::from_zoom(2.0), Lod::Low);
        assert_eq!(Lod::from_zoom(6.0), Lod::Medium);
        assert_eq!(Lod::from_zoom(13.0), Lod::High);
    }

    #[test]
    fn test_coastline_fallback_to_coarser() {
        let mut r = MapRenderer::new();
        r.add_coastline(vec![(0.0, 0.0), (1.0, 1.0)], Lod::Low);
        assert_eq!(r.coastlines(Lod::High).len(), 1);
        assert!(r.has_data());
    }

    #[test]
    fn test_graticule_drawn_without_data() {
        let r = MapRenderer::new();
        let markers = MarkerLayer::new();
        let scene = Scene {
            markers: &markers,
            highlighted: None,
            user: Coordinate::new(0.0, 0.0),
            picker: None,
        };
        let mut vp = viewport();
        vp.camera.zoom = 4.0;
        let layers = r.render(40, 10, &vp, &scene);
        assert!(layers.basemap.rows().any(|row| row.chars().any(|c| c != '\u{2800}')));
    }

    #[test]
    fn test_highlighted_marker_glyph() {
        let r = MapRenderer::new();
        let markers = layer();
        let id = ExperienceId::from("here");
        let scene = Scene {
            markers: &markers,
            highlighted: Some(&id),
            user: Coordinate::new(0.0, 0.0),
            picker: Some(Coordinate::new(17.6868, 83.2185)),
        };
        let layers = r.render(40, 10, &viewport(), &scene);
        let kinds: Vec<_> = layers.glyphs.iter().map(|g| g.kind).collect();
        assert_eq!(kinds, vec![GlyphKind::Highlighted, GlyphKind::Picker]);
        assert_eq!((layers.glyphs[0].x, layers.glyphs[0].y), (20, 5));
    }
}
