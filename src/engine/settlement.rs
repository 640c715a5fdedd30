use rust_decimal::Decimal;

use crate::error::RideError;
use crate::models::driver::Driver;
use crate::models::rider::Rider;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Outcome of a successful settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub fare: Decimal,
    pub rating: u8,
    pub rider_wallet: Decimal,
    pub driver_wallet: Decimal,
}

/// Moves `fare` from the rider to the driver and records `rating`.
///
/// All checks run before the first write, so on error neither participant
/// is modified. The caller must hold exclusive access to both.
pub fn settle(
    rider: &mut Rider,
    driver: &mut Driver,
    fare: Decimal,
    rating: i64,
) -> Result<Settlement, RideError> {
    if rider.wallet < fare {
        return Err(RideError::InsufficientFunds {
            rider: rider.id,
            available: rider.wallet,
            required: fare,
        });
    }

    let rating = validate_rating(rating)?;

    let rider_wallet = rider
        .wallet
        .checked_sub(fare)
        .ok_or(RideError::ArithmeticOverflow {
            operation: "debit",
            party: rider.id,
        })?;
    let driver_wallet = driver
        .wallet
        .checked_add(fare)
        .ok_or(RideError::ArithmeticOverflow {
            operation: "credit",
            party: driver.id,
        })?;

    rider.wallet = rider_wallet;
    driver.wallet = driver_wallet;
    driver.ratings.push(rating);

    Ok(Settlement {
        fare,
        rating,
        rider_wallet,
        driver_wallet,
    })
}

pub fn validate_rating(rating: i64) -> Result<u8, RideError> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        u8::try_from(rating).map_err(|_| RideError::InvalidRating(rating))
    } else {
        Err(RideError::InvalidRating(rating))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::settle;
    use crate::error::RideError;
    use crate::geo::GeoPoint;
    use crate::models::driver::Driver;
    use crate::models::rider::Rider;
    use crate::models::vehicle::{Vehicle, VehicleKind};

    fn rider(wallet: Decimal) -> Rider {
        Rider {
            id: Uuid::from_u128(1),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            location: GeoPoint::new(10.0, 10.0),
            wallet,
            active_ride: None,
            updated_at: Utc::now(),
        }
    }

    fn driver() -> Driver {
        Driver {
            id: Uuid::from_u128(2),
            seq: 0,
            name: "Bob".to_string(),
            email: "bob@example.com".to_string(),
            location: GeoPoint::new(11.0, 10.0),
            vehicle: Vehicle::new(VehicleKind::Car, "CAR-123".to_string(), dec!(15)),
            wallet: Decimal::ZERO,
            ratings: Vec::new(),
            active_ride: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn transfers_fare_and_records_rating() {
        let mut rider = rider(dec!(500));
        let mut driver = driver();

        let settlement = settle(&mut rider, &mut driver, dec!(80.78), 5).unwrap();

        assert_eq!(settlement.rider_wallet, dec!(419.22));
        assert_eq!(rider.wallet, dec!(419.22));
        assert_eq!(driver.wallet, dec!(80.78));
        assert_eq!(driver.ratings, vec![5]);
    }

    #[test]
    fn exact_balance_drains_wallet_to_zero() {
        let mut rider = rider(dec!(80.78));
        let mut driver = driver();

        settle(&mut rider, &mut driver, dec!(80.78), 3).unwrap();
        assert_eq!(rider.wallet, Decimal::ZERO);
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let mut rider = rider(dec!(50));
        let mut driver = driver();

        let err = settle(&mut rider, &mut driver, dec!(80.78), 5).unwrap_err();

        assert_eq!(
            err,
            RideError::InsufficientFunds {
                rider: rider.id,
                available: dec!(50),
                required: dec!(80.78),
            }
        );
        assert_eq!(rider.wallet, dec!(50));
        assert_eq!(driver.wallet, Decimal::ZERO);
        assert!(driver.ratings.is_empty());
    }

    #[test]
    fn out_of_range_rating_rolls_back_transfer() {
        for rating in [0, 6, -1] {
            let mut rider = rider(dec!(500));
            let mut driver = driver();

            let err = settle(&mut rider, &mut driver, dec!(80.78), rating).unwrap_err();

            assert_eq!(err, RideError::InvalidRating(rating));
            assert_eq!(rider.wallet, dec!(500));
            assert_eq!(driver.wallet, Decimal::ZERO);
            assert!(driver.ratings.is_empty());
        }
    }

    #[test]
    fn credit_overflow_is_reported_without_debiting() {
        let mut rider = rider(dec!(10));
        let mut driver = driver();
        driver.wallet = Decimal::MAX;

        let err = settle(&mut rider, &mut driver, dec!(1), 4).unwrap_err();

        assert!(matches!(err, RideError::ArithmeticOverflow { operation: "credit", .. }));
        assert_eq!(rider.wallet, dec!(10));
        assert_eq!(driver.wallet, Decimal::MAX);
    }
}
