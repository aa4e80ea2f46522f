use mvt_build::common::{GeomType, Value};
use mvt_build::geo::lat_lon_to_tile_pixel;
use mvt_build::write::Tile;

use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut tile = Tile::new(0, 0, 0);

    let layer = tile.add_layer("example");

    let point = layer.add_feature(GeomType::Point);
    point.set_id(1234);
    let (x, y) = lat_lon_to_tile_pixel(47.4979, 19.0402, 0, 0, 0);
    point.move_to(x, y);
    point.add_tag("name", "Budapest");

    let line = layer.add_feature(GeomType::LineString);
    line.move_to(10.0, 20.0);
    line.line_to(30.0, 40.0);
    line.quadratic_to(60.0, 40.0, 60.0, 80.0);
    line.add_tag("length", Value::Float(4.0));

    fs::write("example.mvt", tile.render())?;

    Ok(())
}
