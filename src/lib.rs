//! Builder-style encoder for Mapbox Vector Tiles.
//!
//! A [`write::Tile`] is assembled incrementally from layers and features
//! carrying move/line/close geometry on a 0-256 pixel canvas, then
//! rendered into the MVT protobuf wire format in one pass. The [`geo`]
//! module places geographic coordinates onto that canvas via the Web
//! Mercator slippy-map projection.
//!
//! ```
//! use mvt_build::common::GeomType;
//! use mvt_build::geo::lat_lon_to_tile_pixel;
//! use mvt_build::write::Tile;
//!
//! let mut tile = Tile::new(0, 0, 0);
//! let layer = tile.add_layer("poi");
//! let feature = layer.add_feature(GeomType::Point);
//! let (x, y) = lat_lon_to_tile_pixel(47.4979, 19.0402, 0, 0, 0);
//! feature.move_to(x, y);
//! feature.add_tag("name", "Budapest");
//! let bytes = tile.render();
//! assert!(!bytes.is_empty());
//! ```

pub mod common;
pub mod geo;
pub mod varint;
pub mod write;
