//! The tile/layer/feature builder graph and the wire encoder behind
//! [`Tile::render`].
//!
//! A caller assembles a [`Tile`] incrementally (append-only), then renders
//! it bottom-up into one protobuf-style buffer. Rendering never mutates
//! the graph, so it can be repeated and always reproduces the same bytes.

use std::collections::HashMap;

use crate::common::{GeomType, Value};
use crate::geo::{tile_bounds, GeoBounds};
use crate::varint::{append_svarint, append_uvarint};

// Field tags, (field_number << 3) | wire_type.
const TILE_LAYERS: u8 = (3 << 3) | 2;

const LAYER_NAME: u8 = (1 << 3) | 2;
const LAYER_FEATURES: u8 = (2 << 3) | 2;
const LAYER_KEYS: u8 = (3 << 3) | 2;
const LAYER_VALUES: u8 = (4 << 3) | 2;
const LAYER_EXTENT: u8 = (5 << 3) | 0;
const LAYER_VERSION: u8 = (15 << 3) | 0;

const FEATURE_ID: u8 = (1 << 3) | 0;
const FEATURE_TAGS: u8 = (2 << 3) | 2;
const FEATURE_TYPE: u8 = (3 << 3) | 0;
const FEATURE_GEOMETRY: u8 = (4 << 3) | 2;

const VALUE_STRING: u8 = (1 << 3) | 2;
const VALUE_FLOAT: u8 = (2 << 3) | 5;
const VALUE_DOUBLE: u8 = (3 << 3) | 1;
const VALUE_INT: u8 = (4 << 3) | 0;
const VALUE_UINT: u8 = (5 << 3) | 0;
const VALUE_BOOL: u8 = (6 << 3) | 0;

const MOVE_TO: u32 = 1;
const LINE_TO: u32 = 2;
const CLOSE_PATH: u32 = 7;

const DEFAULT_EXTENT: u32 = 4096;

#[derive(Copy, Clone, Debug, PartialEq)]
enum GeomOp {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
}

impl GeomOp {
    fn opcode(&self) -> u32 {
        match self {
            GeomOp::MoveTo(..) => MOVE_TO,
            GeomOp::LineTo(..) => LINE_TO,
            GeomOp::ClosePath => CLOSE_PATH,
        }
    }
}

/// A vector tile under construction: an ordered list of layers plus the
/// tile's slippy-map address and derived geographic bounds.
pub struct Tile {
    layers: Vec<Layer>,
    x: u32,
    y: u32,
    zoom: u8,
    bounds: GeoBounds,
}

impl Tile {
    pub fn new(x: u32, y: u32, zoom: u8) -> Tile {
        Tile {
            layers: Vec::new(),
            x,
            y,
            zoom,
            bounds: tile_bounds(x, y, zoom),
        }
    }

    /// Appends a new layer; it inherits the tile's address and bounds.
    pub fn add_layer<N: Into<String>>(&mut self, name: N) -> &mut Layer {
        self.layers.push(Layer {
            name: name.into(),
            features: Vec::new(),
            extent: None,
            x: self.x,
            y: self.y,
            zoom: self.zoom,
            bounds: self.bounds,
        });
        self.layers.last_mut().unwrap()
    }

    /// Geographic bounds of the tile, as computed by
    /// [`tile_bounds`](crate::geo::tile_bounds).
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Encodes the tile into its final wire buffer. Pure with respect to
    /// the builder graph; rendering twice yields identical bytes.
    pub fn render(&self) -> Vec<u8> {
        let mut pb = Vec::new();
        for layer in &self.layers {
            layer.append(&mut pb);
        }
        pb
    }
}

/// A named layer owning an ordered list of features.
pub struct Layer {
    name: String,
    features: Vec<Feature>,
    extent: Option<u32>,
    x: u32,
    y: u32,
    zoom: u8,
    bounds: GeoBounds,
}

impl Layer {
    const VERSION: u32 = 2;

    /// Sets the layer extent explicitly. The default is 4096; an explicit
    /// 4096 still counts as the default on the wire.
    pub fn set_extent(&mut self, extent: u32) {
        self.extent = Some(extent);
    }

    pub fn extent(&self) -> u32 {
        self.extent.unwrap_or(DEFAULT_EXTENT)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning tile's (x, y, zoom) address.
    pub fn tile_coords(&self) -> (u32, u32, u8) {
        (self.x, self.y, self.zoom)
    }

    /// Geographic bounds inherited from the owning tile. Useful for
    /// spatial filtering by callers; the encoder itself never reads them.
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn add_feature(&mut self, geom_type: GeomType) -> &mut Feature {
        self.features.push(Feature {
            geom_type,
            id: None,
            tags: Vec::new(),
            geometry: Vec::new(),
        });
        self.features.last_mut().unwrap()
    }

    /// Builds the layer's deduplicated key/value tables and the flattened
    /// tag index stream, two indices per tag in feature order. Identity is
    /// the wire encoding itself, so e.g. UInt(5) and Int(5) occupy
    /// distinct value slots.
    fn collect_tags(&self) -> (Vec<Vec<u8>>, Vec<Vec<u8>>, Vec<u32>) {
        let mut keys: Vec<Vec<u8>> = Vec::new();
        let mut values: Vec<Vec<u8>> = Vec::new();
        let mut key_lookup: HashMap<Vec<u8>, u32> = HashMap::new();
        let mut value_lookup: HashMap<Vec<u8>, u32> = HashMap::new();
        let mut tag_idxs = Vec::new();

        for feature in &self.features {
            for (key, value) in &feature.tags {
                let encoded = encode_key(key);
                let idx = match key_lookup.get(&encoded) {
                    Some(&idx) => idx,
                    None => {
                        let idx = keys.len() as u32;
                        key_lookup.insert(encoded.clone(), idx);
                        keys.push(encoded);
                        idx
                    }
                };
                tag_idxs.push(idx);

                let encoded = encode_value(value);
                let idx = match value_lookup.get(&encoded) {
                    Some(&idx) => idx,
                    None => {
                        let idx = values.len() as u32;
                        value_lookup.insert(encoded.clone(), idx);
                        values.push(encoded);
                        idx
                    }
                };
                tag_idxs.push(idx);
            }
        }

        (keys, values, tag_idxs)
    }

    fn append(&self, out: &mut Vec<u8>) {
        let (keys, values, tag_idxs) = self.collect_tags();
        let extent = f64::from(self.extent());

        let mut pb = Vec::new();
        if !self.name.is_empty() {
            pb.push(LAYER_NAME);
            append_uvarint(&mut pb, self.name.len() as u64);
            pb.extend_from_slice(self.name.as_bytes());
        }
        let mut consumed = 0;
        for feature in &self.features {
            let pair_count = feature.tags.len() * 2;
            feature.append(&mut pb, &tag_idxs[consumed..consumed + pair_count], extent);
            consumed += pair_count;
        }
        for key in &keys {
            pb.extend_from_slice(key);
        }
        for value in &values {
            pb.extend_from_slice(value);
        }
        if let Some(extent) = self.extent {
            if extent != DEFAULT_EXTENT {
                pb.push(LAYER_EXTENT);
                append_uvarint(&mut pb, u64::from(extent));
            }
        }
        pb.push(LAYER_VERSION);
        append_uvarint(&mut pb, u64::from(Self::VERSION));

        out.push(TILE_LAYERS);
        append_uvarint(out, pb.len() as u64);
        out.extend_from_slice(&pb);
    }
}

/// One feature: a geometry type, an optional id, tags, and an ordered
/// move/line/close operation sequence on the 0-256 local pixel canvas.
pub struct Feature {
    geom_type: GeomType,
    id: Option<u64>,
    tags: Vec<(String, Value)>,
    geometry: Vec<GeomOp>,
}

impl Feature {
    pub fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    /// Appends a tag. Any type convertible to [`Value`] is accepted;
    /// integers widen to 64 bits preserving signedness.
    pub fn add_tag<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.tags.push((key.into(), value.into()));
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.geometry.push(GeomOp::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.geometry.push(GeomOp::LineTo(x, y));
    }

    pub fn close_path(&mut self) {
        self.geometry.push(GeomOp::ClosePath);
    }

    /// Flattens a quadratic Bezier from the current point through
    /// (x1, y1) to (x2, y2) into line segments. Segment count is the
    /// rounded control-polygon length, at least 4; the last sample lands
    /// exactly on t = 1.
    pub fn quadratic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let (x0, y0) = self.last_point();
        let chord = (x1 - x0).hypot(y1 - y0) + (x2 - x1).hypot(y2 - y1);
        let n = ((chord + 0.5) as usize).max(4);
        let d = (n - 1) as f64;
        for i in 0..n {
            let (x, y) = quadratic(x0, y0, x1, y1, x2, y2, i as f64 / d);
            self.line_to(x, y);
        }
    }

    /// Flattens a cubic Bezier from the current point through (x1, y1)
    /// and (x2, y2) to (x3, y3), with the same sampling rule as
    /// [`quadratic_to`](Feature::quadratic_to).
    pub fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        let (x0, y0) = self.last_point();
        let chord = (x1 - x0).hypot(y1 - y0)
            + (x2 - x1).hypot(y2 - y1)
            + (x3 - x2).hypot(y3 - y2);
        let n = ((chord + 0.5) as usize).max(4);
        let d = (n - 1) as f64;
        for i in 0..n {
            let (x, y) = cubic(x0, y0, x1, y1, x2, y2, x3, y3, i as f64 / d);
            self.line_to(x, y);
        }
    }

    // A trailing ClosePath carries no coordinates and counts as (0, 0),
    // as does an empty sequence.
    fn last_point(&self) -> (f64, f64) {
        match self.geometry.last() {
            Some(GeomOp::MoveTo(x, y)) | Some(GeomOp::LineTo(x, y)) => (*x, *y),
            _ => (0.0, 0.0),
        }
    }

    fn append(&self, out: &mut Vec<u8>, tag_idxs: &[u32], extent: f64) {
        let mut pb = Vec::new();
        if let Some(id) = self.id {
            pb.push(FEATURE_ID);
            append_uvarint(&mut pb, id);
        }
        if !self.tags.is_empty() {
            let mut tpb = Vec::new();
            for &idx in tag_idxs {
                append_uvarint(&mut tpb, u64::from(idx));
            }
            pb.push(FEATURE_TAGS);
            append_uvarint(&mut pb, tpb.len() as u64);
            pb.extend_from_slice(&tpb);
        }
        if self.geom_type != GeomType::Unknown {
            pb.push(FEATURE_TYPE);
            append_uvarint(&mut pb, self.geom_type as u64);
        }
        if !self.geometry.is_empty() {
            let gpb = pack_geometry(&self.geometry, extent);
            pb.push(FEATURE_GEOMETRY);
            append_uvarint(&mut pb, gpb.len() as u64);
            pb.extend_from_slice(&gpb);
        }

        out.push(LAYER_FEATURES);
        append_uvarint(out, pb.len() as u64);
        out.extend_from_slice(&pb);
    }
}

fn command_integer(opcode: u32, count: u32) -> u32 {
    (opcode & 0x7) | (count << 3)
}

/// Packs an op sequence into the command/coordinate stream: one command
/// integer per maximal run of identical op kinds, coordinates scaled by
/// `extent / 256`, truncated, and delta-coded against a cursor that
/// persists across the whole feature.
fn pack_geometry(ops: &[GeomOp], extent: f64) -> Vec<u8> {
    let mut pb = Vec::new();
    let (mut last_x, mut last_y) = (0i64, 0i64);

    // Streams must begin with a move; synthesize one at the origin if the
    // caller didn't. Should not occur with well-formed input.
    if ops[0].opcode() != MOVE_TO {
        append_uvarint(&mut pb, u64::from(command_integer(MOVE_TO, 1)));
        append_svarint(&mut pb, 0);
        append_svarint(&mut pb, 0);
    }

    let mut i = 0;
    while i < ops.len() {
        let opcode = ops[i].opcode();
        let mut count = 1;
        while i + count < ops.len() && ops[i + count].opcode() == opcode {
            count += 1;
        }
        append_uvarint(&mut pb, u64::from(command_integer(opcode, count as u32)));
        for op in &ops[i..i + count] {
            match *op {
                GeomOp::MoveTo(x, y) | GeomOp::LineTo(x, y) => {
                    let x = (x / 256.0 * extent) as i64;
                    let y = (y / 256.0 * extent) as i64;
                    append_svarint(&mut pb, x - last_x);
                    append_svarint(&mut pb, y - last_y);
                    last_x = x;
                    last_y = y;
                }
                GeomOp::ClosePath => {}
            }
        }
        i += count;
    }
    pb
}

fn encode_key(key: &str) -> Vec<u8> {
    let mut pb = vec![LAYER_KEYS];
    append_uvarint(&mut pb, key.len() as u64);
    pb.extend_from_slice(key.as_bytes());
    pb
}

fn encode_value(value: &Value) -> Vec<u8> {
    let mut vpb = Vec::new();
    match value {
        Value::String(v) => {
            vpb.push(VALUE_STRING);
            append_uvarint(&mut vpb, v.len() as u64);
            vpb.extend_from_slice(v.as_bytes());
        }
        Value::UInt(v) => {
            vpb.push(VALUE_UINT);
            append_uvarint(&mut vpb, *v);
        }
        Value::Int(v) => {
            vpb.push(VALUE_INT);
            append_svarint(&mut vpb, *v);
        }
        Value::Float(v) => {
            vpb.push(VALUE_FLOAT);
            vpb.extend_from_slice(&v.to_le_bytes());
        }
        Value::Double(v) => {
            vpb.push(VALUE_DOUBLE);
            vpb.extend_from_slice(&v.to_le_bytes());
        }
        Value::Bool(v) => {
            vpb.push(VALUE_BOOL);
            vpb.push(*v as u8);
        }
    }

    let mut pb = vec![LAYER_VALUES];
    append_uvarint(&mut pb, vpb.len() as u64);
    pb.extend_from_slice(&vpb);
    pb
}

fn quadratic(x0: f64, y0: f64, x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let a = u * u;
    let b = 2.0 * u * t;
    let c = t * t;
    (a * x0 + b * x1 + c * x2, a * y0 + b * y1 + c * y2)
}

fn cubic(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    x3: f64,
    y3: f64,
    t: f64,
) -> (f64, f64) {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    (
        a * x0 + b * x1 + c * x2 + d * x3,
        a * y0 + b * y1 + c * y2 + d * y3,
    )
}
