use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geojson::{GeoJson, Geometry, Value};
use log::{info, warn};

use crate::map::{LineString, Lod, MapRenderer};

/// Coastline files tried in the data dir, one per level of detail
const COASTLINE_FILES: [(&str, Lod); 3] = [
    ("ne_110m_coastline.json", Lod::Low),
    ("ne_50m_coastline.json", Lod::Medium),
    ("ne_10m_coastline.json", Lod::High),
];

const BORDER_FILES: [&str; 2] = ["ne_10m_borders.json", "ne_50m_borders.json"];

/// Load whatever Natural Earth GeoJSON files exist in `data_dir`.
/// Missing files are skipped, broken ones are logged and skipped.
pub fn load_basemap(renderer: &mut MapRenderer, data_dir: &Path) -> usize {
    let mut loaded = 0;

    for (filename, lod) in COASTLINE_FILES {
        let path = data_dir.join(filename);
        if !path.exists() {
            continue;
        }
        match read_lines(&path) {
            Ok(lines) => {
                info!("Loaded {} coastline segments from {}", lines.len(), filename);
                lines.into_iter().for_each(|l| renderer.add_coastline(l, lod));
                loaded += 1;
            }
            Err(e) => warn!("Failed to load {}: {:#}", filename, e),
        }
    }

    // Only the most detailed border file present is used
    if let Some(path) = BORDER_FILES.iter().map(|f| data_dir.join(f)).find(|p| p.exists()) {
        match read_lines(&path) {
            Ok(lines) => {
                lines.into_iter().for_each(|l| renderer.add_border(l));
                loaded += 1;
            }
            Err(e) => warn!("Failed to load {}: {:#}", path.display(), e),
        }
    }

    loaded
}

fn read_lines(path: &Path) -> Result<Vec<LineString>> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = content.parse().context("parsing GeoJSON")?;
    let mut lines = Vec::new();
    collect_lines(&geojson, &mut lines);
    Ok(lines)
}

/// Extract every line-like ring or string from a GeoJSON document
fn collect_lines(geojson: &GeoJson, out: &mut Vec<LineString>) {
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for geometry in fc.features.iter().filter_map(|f| f.geometry.as_ref()) {
                geometry_lines(geometry, out);
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = &f.geometry {
                geometry_lines(geometry, out);
            }
        }
        GeoJson::Geometry(geometry) => geometry_lines(geometry, out),
    }
}

fn to_line(coords: &[Vec<f64>]) -> LineString {
    coords.iter().filter(|c| c.len() >= 2).map(|c| (c[0], c[1])).collect()
}

fn geometry_lines(geometry: &Geometry, out: &mut Vec<LineString>) {
    match &geometry.value {
        Value::LineString(coords) => out.push(to_line(coords)),
        Value::MultiLineString(lines) => out.extend(lines.iter().map(|l| to_line(l))),
        // Exterior rings only
        Value::Polygon(rings) => out.extend(rings.first().map(|r| to_line(r))),
        Value::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| rings.first()).map(|r| to_line(r)))
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                geometry_lines(g, out);
            }
        }
        Value::Point(_) | Value::MultiPoint(_) => {}
    }
}
