//! Display (pixel) <-> simulation (meter) conversion.

use bevy::math::Vec2;

/// Pixels per simulation meter, applied uniformly to positions and sizes.
pub const PIXELS_PER_METER: f32 = 32.0;

pub fn to_meters(pixels: Vec2) -> Vec2 {
    pixels / PIXELS_PER_METER
}

pub fn to_pixels(meters: Vec2) -> Vec2 {
    meters * PIXELS_PER_METER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_is_uniform() {
        let p = Vec2::new(64.0, -16.0);
        assert_eq!(to_meters(p), Vec2::new(2.0, -0.5));
        assert_eq!(to_pixels(to_meters(p)), p);
    }
}
