use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::error::RideError;
use crate::geo::{GeoPoint, distance};
use crate::models::vehicle::VehicleKind;

/// Per-distance rates by vehicle kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub car: Decimal,
    pub bike: Decimal,
    pub cng: Decimal,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            car: Decimal::from(15),
            bike: Decimal::from(8),
            cng: Decimal::from(5),
        }
    }
}

impl RateTable {
    pub fn rate_for(&self, kind: VehicleKind) -> Decimal {
        match kind {
            VehicleKind::Car => self.car,
            VehicleKind::Bike => self.bike,
            VehicleKind::Cng => self.cng,
        }
    }
}

/// `distance(a, b) * rate`, rounded half-to-even to two decimal places.
pub fn fare(a: &GeoPoint, b: &GeoPoint, rate: Decimal) -> Result<Decimal, RideError> {
    let distance = distance(a, b);

    Decimal::from_f64(distance)
        .and_then(|d| d.checked_mul(rate))
        .map(|amount| amount.round_dp(2))
        .ok_or(RideError::UnpricableTrip { distance })
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::{RateTable, fare};
    use crate::error::RideError;
    use crate::geo::GeoPoint;
    use crate::models::vehicle::VehicleKind;

    #[test]
    fn car_fare_for_reference_trip() {
        let start = GeoPoint::new(10.0, 10.0);
        let end = GeoPoint::new(15.0, 12.0);

        assert_eq!(fare(&start, &end, dec!(15)).unwrap(), dec!(80.78));
        assert_eq!(fare(&start, &end, dec!(8)).unwrap(), dec!(43.08));
    }

    #[test]
    fn fare_is_deterministic_and_two_decimal() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 1.0);

        let first = fare(&a, &b, dec!(5)).unwrap();
        let second = fare(&a, &b, dec!(5)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, dec!(7.07));
        assert!(first.scale() <= 2);
    }

    #[test]
    fn zero_length_trip_is_free() {
        let p = GeoPoint::new(3.0, 4.0);
        assert_eq!(fare(&p, &p, dec!(15)).unwrap(), dec!(0));
    }

    #[test]
    fn non_finite_distance_cannot_be_priced() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(f64::INFINITY, 0.0);
        assert!(matches!(
            fare(&a, &b, dec!(15)),
            Err(RideError::UnpricableTrip { .. })
        ));
    }

    #[test]
    fn default_rates_order_car_above_bike_above_cng() {
        let rates = RateTable::default();
        assert!(rates.rate_for(VehicleKind::Car) > rates.rate_for(VehicleKind::Bike));
        assert!(rates.rate_for(VehicleKind::Bike) > rates.rate_for(VehicleKind::Cng));
    }
}
