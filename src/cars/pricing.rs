//! Daily rent derived from fuel efficiency and age. Never stored.

use chrono::Datelike;

pub const BASE_PRICE_PER_DAY: f64 = 50.0;
pub const MILEAGE_FACTOR: f64 = 0.1;
pub const AGE_FACTOR: f64 = 0.05;

/// Source of the "current year" used by pricing.
pub trait Clock: Send + Sync {
	fn current_year(&self) -> i32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn current_year(&self) -> i32 {
		chrono::Local::now().year()
	}
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i32);

impl Clock for FixedClock {
	fn current_year(&self) -> i32 {
		self.0
	}
}

/// Unrounded rent. A year in the future makes the age term negative; it is left unguarded.
pub fn rent_before_rounding(city_mpg: u32, year: i32, current_year: i32) -> f64 {
	let age = f64::from(current_year) - f64::from(year);
	BASE_PRICE_PER_DAY + f64::from(city_mpg) * MILEAGE_FACTOR + age * AGE_FACTOR
}

/// Rent per day rounded to the nearest whole unit, floored at zero.
pub fn calculate_rent(city_mpg: u32, year: i32, current_year: i32) -> u32 {
	rent_before_rounding(city_mpg, year, current_year).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPSILON: f64 = 1e-9;

	#[test]
	fn rent_for_recent_car() {
		assert!((rent_before_rounding(23, 2023, 2024) - 52.35).abs() < EPSILON);
		assert_eq!(calculate_rent(23, 2023, 2024), 52);
	}

	#[test]
	fn ten_mpg_adds_one_unit() {
		let low = rent_before_rounding(20, 2020, 2024);
		let high = rent_before_rounding(30, 2020, 2024);
		assert!((high - low - 1.0).abs() < EPSILON);
	}

	#[test]
	fn one_year_of_age_is_five_cents() {
		let newer = rent_before_rounding(25, 2022, 2024);
		let older = rent_before_rounding(25, 2021, 2024);
		assert!((older - newer - AGE_FACTOR).abs() < EPSILON);
	}

	#[test]
	fn monotonic_in_mpg() {
		let mut last = 0;
		for mpg in 0..200 {
			let rent = calculate_rent(mpg, 2015, 2024);
			assert!(rent >= last);
			last = rent;
		}
	}

	#[test]
	fn future_year_lowers_rent_but_stays_non_negative() {
		assert_eq!(calculate_rent(0, 2034, 2024), 50);
		assert_eq!(calculate_rent(0, i32::MAX, 2024), 0);
	}

	#[test]
	fn fixed_clock_is_stable() {
		let clock = FixedClock(2024);
		assert_eq!(clock.current_year(), clock.current_year());
		assert!(SystemClock.current_year() >= 2024);
	}
}
