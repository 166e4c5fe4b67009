use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Map a confidence score to a red-to-green gradient for box outlines.
///
/// The score is clamped to [0, 1] first; 0.0 is pure red, 1.0 is pure
/// green, blue stays at 0. Channels round half away from zero.
pub fn confidence_to_color(confidence: f32) -> Rgb {
    let clamped = if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    };
    Rgb {
        r: (255.0 * (1.0 - clamped)).round() as u8,
        g: (255.0 * clamped).round() as u8,
        b: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_confidence_is_pure_red() {
        assert_eq!(confidence_to_color(0.0), Rgb { r: 255, g: 0, b: 0 });
    }

    #[test]
    fn full_confidence_is_pure_green() {
        assert_eq!(confidence_to_color(1.0), Rgb { r: 0, g: 255, b: 0 });
    }

    #[test]
    fn midpoint_blends_evenly() {
        let color = confidence_to_color(0.5);
        assert_eq!(color, Rgb { r: 128, g: 128, b: 0 });
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(confidence_to_color(-0.4), confidence_to_color(0.0));
        assert_eq!(confidence_to_color(3.2), confidence_to_color(1.0));
    }

    #[test]
    fn non_finite_confidence_maps_like_zero() {
        assert_eq!(confidence_to_color(f32::NAN), confidence_to_color(0.0));
    }
}
