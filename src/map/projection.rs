use std::f64::consts::PI;

use crate::geo::{wrap_lng, Coordinate};

/// World width in braille pixels at zoom level 0
pub const TILE_SIZE: f64 = 64.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 19.0;
/// Zoom levels added or removed per zoom step
pub const ZOOM_STEP: f64 = 0.5;
pub const MAX_PITCH: f64 = 60.0;
/// Web Mercator latitude limit
const MAX_LAT: f64 = 85.0511;
/// Frames a fly-to animation takes (~0.75s at 60fps)
pub const FLY_FRAMES: u16 = 45;

/// Camera placement over the map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub center: Coordinate,
    /// Web Mercator zoom level
    pub zoom: f64,
    /// Tilt in degrees, 0 = straight down
    pub pitch: f64,
    /// Compass direction of screen-up in degrees
    pub bearing: f64,
}

impl Camera {
    fn lerp(&self, to: &Camera, t: f64) -> Camera {
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        let dlng = wrap_lng(to.center.lng - self.center.lng);
        Camera {
            center: Coordinate::new(
                lerp(self.center.lat, to.center.lat),
                wrap_lng(self.center.lng + dlng * t),
            ),
            zoom: lerp(self.zoom, to.zoom),
            pitch: lerp(self.pitch, to.pitch),
            bearing: lerp(self.bearing, to.bearing),
        }
    }
}

/// In-flight camera animation
#[derive(Clone, Debug)]
struct Flight {
    from: Camera,
    to: Camera,
    frame: u16,
}

/// Viewport representing the visible map area and camera
#[derive(Clone, Debug)]
pub struct Viewport {
    pub camera: Camera,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
    flight: Option<Flight>,
}

#[inline(always)]
fn mercator_x(lng: f64) -> f64 {
    (lng + 180.0) / 360.0
}

#[inline(always)]
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

#[inline(always)]
fn inverse_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

impl Viewport {
    pub fn new(camera: Camera, width: usize, height: usize) -> Self {
        Self {
            camera,
            width,
            height,
            flight: None,
        }
    }

    pub fn center(&self) -> Coordinate {
        self.camera.center
    }

    pub fn zoom(&self) -> f64 {
        self.camera.zoom
    }

    /// World width in pixels at the current zoom
    fn scale(&self) -> f64 {
        TILE_SIZE * self.camera.zoom.exp2()
    }

    fn half(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Screen-space rotation for bearing, then pitch foreshortening
    fn to_screen(&self, dx: f64, dy: f64) -> (f64, f64) {
        let (s, c) = self.camera.bearing.to_radians().sin_cos();
        let rx = dx * c + dy * s;
        let ry = (-dx * s + dy * c) * self.camera.pitch.to_radians().cos();
        (rx, ry)
    }

    fn from_screen(&self, rx: f64, ry: f64) -> (f64, f64) {
        let (s, c) = self.camera.bearing.to_radians().sin_cos();
        let ry = ry / self.camera.pitch.to_radians().cos();
        (rx * c - ry * s, rx * s + ry * c)
    }

    /// Project a coordinate to pixel coordinates
    pub fn project(&self, coord: Coordinate) -> (i32, i32) {
        let scale = self.scale();
        let center = self.camera.center;

        let mut dx = (mercator_x(coord.lng) - mercator_x(center.lng)) * scale;
        // Take the short way around the antimeridian
        if dx > scale / 2.0 {
            dx -= scale;
        } else if dx < -scale / 2.0 {
            dx += scale;
        }
        let dy = (mercator_y(coord.lat) - mercator_y(center.lat)) * scale;

        let (rx, ry) = self.to_screen(dx, dy);
        let (hw, hh) = self.half();
        ((rx + hw).round() as i32, (ry + hh).round() as i32)
    }

    /// Unproject pixel coordinates back to a geographic coordinate
    pub fn unproject(&self, px: i32, py: i32) -> Coordinate {
        let scale = self.scale();
        let (hw, hh) = self.half();
        let (dx, dy) = self.from_screen(px as f64 - hw, py as f64 - hh);

        let x = mercator_x(self.camera.center.lng) + dx / scale;
        let y = (mercator_y(self.camera.center.lat) + dy / scale).clamp(0.0, 1.0);

        Coordinate::new(inverse_mercator_y(y), wrap_lng(x * 360.0 - 180.0))
    }

    /// Pan the viewport by a screen pixel delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.flight = None;
        let (hw, hh) = self.half();
        let target = self.unproject(hw as i32 + dx, hh as i32 + dy);
        self.camera.center = Coordinate::new(target.lat.clamp(-MAX_LAT, MAX_LAT), target.lng);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.camera.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.camera.zoom - ZOOM_STEP);
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.flight = None;
        self.camera.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Zoom in towards a specific pixel location
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    /// Zoom out from a specific pixel location
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -ZOOM_STEP);
    }

    /// Zoom keeping the coordinate under (px, py) fixed on screen
    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let anchor = self.unproject(px, py);
        self.set_zoom(self.camera.zoom + delta);
        let (new_px, new_py) = self.project(anchor);
        self.pan(new_px - px, new_py - py);
    }

    /// Rotate the map by `degrees` of bearing
    pub fn rotate(&mut self, degrees: f64) {
        self.flight = None;
        self.camera.bearing = (self.camera.bearing + degrees + 180.0).rem_euclid(360.0) - 180.0;
    }

    /// Tilt the camera by `degrees` of pitch
    pub fn tilt(&mut self, degrees: f64) {
        self.flight = None;
        self.camera.pitch = (self.camera.pitch + degrees).clamp(0.0, MAX_PITCH);
    }

    /// Start an animated camera move to `center` at the given zoom and pitch
    pub fn fly_to(&mut self, center: Coordinate, zoom: f64, pitch: f64) {
        let to = Camera {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            pitch: pitch.clamp(0.0, MAX_PITCH),
            bearing: self.camera.bearing,
        };
        self.flight = Some(Flight {
            from: self.camera,
            to,
            frame: 0,
        });
    }

    /// Target of the running animation, if any
    pub fn flight_target(&self) -> Option<Camera> {
        self.flight.as_ref().map(|f| f.to)
    }

    /// Advance the fly-to animation by one frame, returns true while moving
    pub fn advance(&mut self) -> bool {
        let Some(flight) = self.flight.as_mut() else {
            return false;
        };
        flight.frame += 1;
        let t = flight.frame as f64 / FLY_FRAMES as f64;
        if t >= 1.0 {
            self.camera = flight.to;
            self.flight = None;
            return false;
        }
        // Ease in-out
        let eased = t * t * (3.0 - 2.0 * t);
        self.camera = flight.from.lerp(&flight.to, eased);
        true
    }

    /// Check if a projected point is visible in the viewport
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= 0 && px < self.width as i32 && py >= 0 && py < self.height as i32
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(pitch: f64, bearing: f64) -> Camera {
        Camera {
            center: Coordinate::new(17.6868, 83.2185),
            zoom: 13.0,
            pitch,
            bearing,
        }
    }

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(camera(45.0, -20.0), 100, 100);
        assert_eq!(vp.project(vp.center()), (50, 50));
    }

    #[test]
    fn test_unproject_roundtrip_with_pitch_and_bearing() {
        let vp = Viewport::new(camera(45.0, -20.0), 200, 120);
        for (px, py) in [(0, 0), (37, 90), (199, 5), (100, 60)] {
            let c = vp.unproject(px, py);
            let (x, y) = vp.project(c);
            assert!((x - px).abs() <= 1 && (y - py).abs() <= 1, "{px},{py} -> {x},{y}");
        }
    }

    #[test]
    fn test_north_is_up_without_bearing() {
        let vp = Viewport::new(camera(0.0, 0.0), 100, 100);
        let (x, y) = vp.project(Coordinate::new(17.70, 83.2185));
        assert_eq!(x, 50);
        assert!(y < 50);
    }

    #[test]
    fn test_pitch_foreshortens_vertically() {
        let flat = Viewport::new(camera(0.0, 0.0), 100, 100);
        let tilted = Viewport::new(camera(60.0, 0.0), 100, 100);
        let north = Coordinate::new(17.70, 83.2185);
        let flat_dy = 50 - flat.project(north).1;
        let tilted_dy = 50 - tilted.project(north).1;
        assert!(tilted_dy < flat_dy);
        assert!(tilted_dy > 0);
    }

    #[test]
    fn test_pan() {
        let mut vp = Viewport::new(camera(0.0, 0.0), 100, 100);
        let before = vp.center().lng;
        vp.pan(10, 0);
        assert!(vp.center().lng > before);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::new(camera(0.0, 0.0), 100, 100);
        for _ in 0..100 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom(), MAX_ZOOM);
    }

    #[test]
    fn test_fly_to_lands_on_target() {
        let mut vp = Viewport::new(camera(30.0, -20.0), 100, 100);
        let target = Coordinate::new(17.72, 83.30);
        vp.fly_to(target, 15.0, 45.0);
        let mut frames = 0;
        while vp.advance() {
            frames += 1;
        }
        assert_eq!(frames, FLY_FRAMES as usize - 1);
        assert_eq!(vp.center(), target);
        assert_eq!(vp.zoom(), 15.0);
        assert_eq!(vp.camera.pitch, 45.0);
        assert_eq!(vp.camera.bearing, -20.0);
    }

    #[test]
    fn test_manual_pan_cancels_flight() {
        let mut vp = Viewport::new(camera(0.0, 0.0), 100, 100);
        vp.fly_to(Coordinate::new(10.0, 10.0), 15.0, 45.0);
        vp.pan(1, 0);
        assert!(vp.flight_target().is_none());
        assert!(!vp.advance());
    }
}
