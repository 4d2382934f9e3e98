//! # Polyline Codec
//!
//! Encoded polylines are the wire format for every route and road geometry this
//! crate exchanges with upstream data. Each coordinate is stored as the
//! zig-zag encoded delta from the previous one, scaled by 1e5 and split into
//! 5-bit chunks (low chunk first, `0x20` continuation bit, `+63` ASCII offset).
//!
//! ```rust
//! use city_roads_map::{GeoPoint, polyline};
//!
//! let points = polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//! assert_eq!(points.len(), 3);
//! assert!((points[0].latitude - 38.5).abs() < 1e-9);
//! assert!((points[2].longitude - -126.453).abs() < 1e-9);
//!
//! assert!(polyline::decode("_p~iF").is_empty()); // latitude without longitude
//! ```

use log::debug;

use crate::error::PolylineError;
use crate::GeoPoint;

/// Fixed precision factor (5 decimal places).
pub const PRECISION: f64 = 1e5;

const CHAR_OFFSET: u8 = 63;
const CONTINUATION: u32 = 0x20;
const CHUNK_MASK: u32 = 0x1f;

/// Decode an encoded polyline, returning an empty sequence on malformed input.
///
/// Callers treat an empty result as "this route contributes nothing".
pub fn decode(encoded: &str) -> Vec<GeoPoint> {
    match try_decode(encoded) {
        Ok(points) => points,
        Err(e) => {
            debug!("[Polyline] Discarding malformed polyline ({} bytes): {}", encoded.len(), e);
            Vec::new()
        }
    }
}

/// Decode an encoded polyline, reporting why it is malformed.
pub fn try_decode(encoded: &str) -> Result<Vec<GeoPoint>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while offset < bytes.len() {
        let (dlat, next) = read_value(bytes, offset)?;
        if next >= bytes.len() {
            return Err(PolylineError::Truncated { offset: next });
        }
        let (dlng, next) = read_value(bytes, next)?;
        offset = next;

        lat += dlat;
        lng += dlng;
        points.push(GeoPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

/// Read one zig-zag encoded value starting at `offset`.
/// Returns the signed delta and the offset just past it.
fn read_value(bytes: &[u8], mut offset: usize) -> Result<(i64, usize), PolylineError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let Some(&byte) = bytes.get(offset) else {
            return Err(PolylineError::Truncated { offset });
        };
        if !(CHAR_OFFSET..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                offset,
                character: byte as char,
            });
        }
        if shift >= 32 {
            return Err(PolylineError::Overflow { offset });
        }

        let chunk = u32::from(byte - CHAR_OFFSET);
        result |= u64::from(chunk & CHUNK_MASK) << shift;
        // The seventh chunk may only carry the top two bits
        if result > u64::from(u32::MAX) {
            return Err(PolylineError::Overflow { offset });
        }
        shift += 5;
        offset += 1;

        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    let value = if result & 1 != 0 {
        !((result >> 1) as i64)
    } else {
        (result >> 1) as i64
    };
    Ok((value, offset))
}

/// Encode points with the same 1e5 precision `decode` expects.
pub fn encode(points: &[GeoPoint]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let mut prev_lat: i64 = 0;
    let mut prev_lng: i64 = 0;

    for p in points {
        let lat = (p.latitude * PRECISION).round() as i64;
        let lng = (p.longitude * PRECISION).round() as i64;
        write_value(&mut out, lat - prev_lat);
        write_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn write_value(out: &mut String, delta: i64) {
    let zigzag = if delta < 0 { !(delta << 1) } else { delta << 1 };
    let mut value = zigzag as u64;
    while value >= u64::from(CONTINUATION) {
        let chunk = (u64::from(CONTINUATION) | (value & u64::from(CHUNK_MASK))) as u8;
        out.push((chunk + CHAR_OFFSET) as char);
        value >>= 5;
    }
    out.push((value as u8 + CHAR_OFFSET) as char);
}
