//! Conversion from major currency units (dollars) to the minor units
//! (cents) that prices are stored and compared in.

use super::db::DatabaseError;

const MINOR_PER_MAJOR: f64 = 100.0;

/// Convert a major-unit amount to minor units, rounding to the nearest cent.
///
/// Rejects NaN, infinities, negatives, and amounts too large for `i64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn to_minor_units(major: f64) -> Result<i64, DatabaseError> {
    if !major.is_finite() || major < 0.0 {
        return Err(DatabaseError::InvalidCriteria(format!(
            "price must be a non-negative number, got {major}"
        )));
    }
    let minor = (major * MINOR_PER_MAJOR).round();
    if minor >= i64::MAX as f64 {
        return Err(DatabaseError::InvalidCriteria(format!(
            "price {major} is out of range"
        )));
    }
    Ok(minor as i64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn whole_dollars_become_cents() {
        assert_eq!(to_minor_units(100.0).unwrap(), 10_000);
        assert_eq!(to_minor_units(150.00).unwrap(), 15_000);
        assert_eq!(to_minor_units(0.0).unwrap(), 0);
    }

    #[test]
    fn fractional_amounts_round_to_nearest_cent() {
        // 19.99 * 100 is 1998.9999999999998 in f64
        assert_eq!(to_minor_units(19.99).unwrap(), 1999);
        assert_eq!(to_minor_units(0.005).unwrap(), 1);
    }

    #[test]
    fn negative_and_non_finite_are_rejected() {
        for bad in [-0.01, f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 1e30] {
            assert!(matches!(
                to_minor_units(bad),
                Err(DatabaseError::InvalidCriteria(_))
            ));
        }
    }
}
