//! Web Mercator helpers for placing geographic coordinates into slippy-map
//! tile pixel space.

use std::f64::consts::PI;

pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

const TILE_SIZE: u64 = 256;

/// Geographic bounding rectangle of a tile, in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

fn map_size(zoom: u8) -> f64 {
    (TILE_SIZE << zoom) as f64
}

/// Projects a lat/lon pair into local pixel coordinates of the given tile,
/// on the 0-256 canvas. Latitude is clamped to the Mercator limits and
/// longitude to +-180 before projecting; the world pixel position is
/// clamped to `[0, world - 1]`.
pub fn lat_lon_to_tile_pixel(lat: f64, lon: f64, tile_x: u32, tile_y: u32, zoom: u8) -> (f64, f64) {
    let lat = clamp(lat, MIN_LAT, MAX_LAT);
    let lon = clamp(lon, MIN_LON, MAX_LON);

    let lx = (lon + 180.0) / 360.0;
    let sin_lat = (lat * PI / 180.0).sin();
    let ly = 0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI);

    let size = map_size(zoom);
    let pixel_x = clamp(lx * size, 0.0, size - 1.0);
    let pixel_y = clamp(ly * size, 0.0, size - 1.0);

    (
        pixel_x - (tile_x as f64) * 256.0,
        pixel_y - (tile_y as f64) * 256.0,
    )
}

fn pixel_to_lat_lon(pixel_x: f64, pixel_y: f64, zoom: u8) -> (f64, f64) {
    let size = map_size(zoom);
    let x = clamp(pixel_x, 0.0, size - 1.0) / size - 0.5;
    let y = 0.5 - clamp(pixel_y, 0.0, size - 1.0) / size;
    let lat = 90.0 - 360.0 * (-y * 2.0 * PI).exp().atan() / PI;
    let lon = 360.0 * x;
    (lat, lon)
}

/// Returns the geographic bounds of a tile. Tiles on the world edge are
/// snapped to the full longitude range and to the Mercator latitude
/// limits, compensating for the projection's behavior at the poles and
/// the antimeridian.
pub fn tile_bounds(tile_x: u32, tile_y: u32, zoom: u8) -> GeoBounds {
    let size = 1u64 << zoom;
    let pixel_x = (tile_x as f64) * 256.0;
    let pixel_y = (tile_y as f64) * 256.0;

    let (max_lat, min_lon) = pixel_to_lat_lon(pixel_x, pixel_y, zoom);
    let (min_lat, max_lon) = pixel_to_lat_lon(pixel_x + 256.0, pixel_y + 256.0, zoom);

    let mut bounds = GeoBounds {
        min_lat,
        min_lon,
        max_lat,
        max_lon,
    };
    if u64::from(tile_x) % size == 0 {
        bounds.min_lon = MIN_LON;
    }
    if u64::from(tile_x) % size == size - 1 {
        bounds.max_lon = MAX_LON;
    }
    if tile_y == 0 {
        bounds.max_lat = MAX_LAT;
    }
    if u64::from(tile_y) >= size - 1 {
        bounds.min_lat = MIN_LAT;
    }
    bounds
}

#[cfg(test)]
mod geo_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn world_tile_bounds() {
        let b = tile_bounds(0, 0, 0);
        assert_relative_eq!(b.min_lat, MIN_LAT);
        assert_relative_eq!(b.min_lon, -180.0);
        assert_relative_eq!(b.max_lat, MAX_LAT);
        assert_relative_eq!(b.max_lon, 180.0);
    }

    #[test]
    fn interior_tile_bounds() {
        // Tile (2, 1) of 4 at zoom 2 covers lon 0..90 in the northern
        // mid-latitudes; no edge overrides apply.
        let b = tile_bounds(2, 1, 2);
        assert_relative_eq!(b.min_lon, 0.0, epsilon = 1e-9);
        assert_relative_eq!(b.max_lon, 90.0, epsilon = 1e-9);
        assert_relative_eq!(b.min_lat, 0.0, epsilon = 1e-9);
        assert_relative_eq!(b.max_lat, 66.51326044311186, epsilon = 1e-9);
    }

    #[test]
    fn origin_projects_to_world_center() {
        let (x, y) = lat_lon_to_tile_pixel(0.0, 0.0, 0, 0, 0);
        assert_relative_eq!(x, 128.0);
        assert_relative_eq!(y, 128.0);
    }

    #[test]
    fn tile_origin_subtracted() {
        // At zoom 1 the world is 512px; (0, 0) sits at world (256, 256),
        // the top-left corner of tile (1, 1).
        let (x, y) = lat_lon_to_tile_pixel(0.0, 0.0, 1, 1, 1);
        assert_relative_eq!(x, 0.0);
        assert_relative_eq!(y, 0.0);
    }

    #[test]
    fn poles_clamp_inside_world() {
        let (_, y) = lat_lon_to_tile_pixel(90.0, 0.0, 0, 0, 0);
        assert!(y >= 0.0);
        let (_, y) = lat_lon_to_tile_pixel(-90.0, 0.0, 0, 0, 0);
        assert!(y <= 255.0);
    }

    #[test]
    fn antimeridian_clamps_to_last_pixel() {
        let (x, _) = lat_lon_to_tile_pixel(0.0, 200.0, 0, 0, 0);
        assert_relative_eq!(x, 255.0);
        let (x, _) = lat_lon_to_tile_pixel(0.0, -200.0, 0, 0, 0);
        assert_relative_eq!(x, 0.0);
    }
}
