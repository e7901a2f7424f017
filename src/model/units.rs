//! Length unit conversions used by the word-processing format.
//!
//! Drawing extents are stored in EMU, page and table geometry in twips
//! (twentieths of a point), font sizes in half-points.

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMU per centimetre.
pub const EMU_PER_CM: i64 = 360_000;

/// EMU per point.
pub const EMU_PER_PT: i64 = 12_700;

/// Twips per point.
pub const TWIPS_PER_PT: f64 = 20.0;

/// Twips per inch.
pub const TWIPS_PER_INCH: f64 = 1440.0;

/// Line-spacing units per single line (`w:spacing/@w:line` with `auto` rule).
pub const LINE_UNITS: f64 = 240.0;

/// Convert inches to EMU.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Convert EMU to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// Convert centimetres to twips.
pub fn cm_to_twips(cm: f64) -> i64 {
    (cm / 2.54 * TWIPS_PER_INCH).round() as i64
}

/// Convert twips to centimetres.
pub fn twips_to_cm(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_INCH * 2.54
}

/// Convert points to twips.
pub fn pt_to_twips(pt: f64) -> i64 {
    (pt * TWIPS_PER_PT).round() as i64
}

/// Convert twips to points.
pub fn twips_to_pt(twips: i64) -> f64 {
    twips as f64 / TWIPS_PER_PT
}

/// Convert points to half-points (`w:sz`).
pub fn pt_to_half_points(pt: f64) -> i64 {
    (pt * 2.0).round() as i64
}

/// Convert half-points to points.
pub fn half_points_to_pt(half_points: i64) -> f64 {
    half_points as f64 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_roundtrip() {
        assert_eq!(inches_to_emu(6.0), 5_486_400);
        assert!((emu_to_inches(5_486_400) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_twips() {
        assert_eq!(cm_to_twips(2.54), 1440);
        assert_eq!(pt_to_twips(12.0), 240);
        assert!((twips_to_cm(11906) - 21.0).abs() < 0.01);
    }

    #[test]
    fn test_half_points() {
        assert_eq!(pt_to_half_points(10.5), 21);
        assert_eq!(half_points_to_pt(24), 12.0);
    }
}
