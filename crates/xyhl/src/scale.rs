//! Resolution scaling between a record's reference screen and the screen a
//! widget is shown on.

use geom::Expanse;

use crate::record::GeometryRecord;

/// Ratio `current / reference`. A zero on either side means "no scaling".
pub(crate) fn ratio(current: u32, reference: u32) -> f64 {
    if current == 0 || reference == 0 {
        1.0
    } else {
        f64::from(current) / f64::from(reference)
    }
}

/// Stateless transforms between reference and live resolutions.
pub struct ScreenScaler;

impl ScreenScaler {
    /// Scale width and height by the horizontal factor `screen.w /
    /// reference_width`. Both dimensions follow the horizontal factor.
    pub fn scale_size(record: &GeometryRecord, screen: Expanse) -> GeometryRecord {
        let f = ratio(screen.w, record.reference_width);
        let mut r = record.clone();
        r.width *= f;
        r.height *= f;
        r
    }

    /// Scale x by the horizontal factor and y by the vertical factor.
    pub fn scale_origin(record: &GeometryRecord, screen: Expanse) -> GeometryRecord {
        let mut r = record.clone();
        r.x *= ratio(screen.w, record.reference_width);
        r.y *= ratio(screen.h, record.reference_height);
        r
    }

    /// Apply both transforms once. Used right after a successful lookup.
    pub fn scale_for_screen(record: &GeometryRecord, screen: Expanse) -> GeometryRecord {
        Self::scale_origin(&Self::scale_size(record, screen), screen)
    }

    /// Map values measured on `screen` back to the record's reference
    /// resolution. The reference itself is left untouched.
    pub fn to_reference(record: &GeometryRecord, screen: Expanse) -> GeometryRecord {
        let fx = ratio(record.reference_width, screen.w);
        let fy = ratio(record.reference_height, screen.h);
        let mut r = record.clone();
        r.x *= fx;
        r.y *= fy;
        r.width *= fx;
        r.height *= fx;
        r
    }
}
