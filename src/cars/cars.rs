use std::{fmt, str::FromStr};

use axum::{
	extract::{Path, State},
	Json,
};
use serde::{Deserialize, Serialize};

use crate::{
	cars::pricing::calculate_rent,
	encryption_engine,
	error::{AppError, AppResult},
	server::AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
	Gas,
	Electricity,
	Hybrid,
	Diesel,
}

impl FuelType {
	pub const ALL: [FuelType; 4] = [FuelType::Gas, FuelType::Electricity, FuelType::Hybrid, FuelType::Diesel];

	pub fn as_str(&self) -> &'static str {
		match self {
			FuelType::Gas => "gas",
			FuelType::Electricity => "electricity",
			FuelType::Hybrid => "hybrid",
			FuelType::Diesel => "diesel",
		}
	}
}

impl fmt::Display for FuelType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FuelType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		FuelType::ALL
			.into_iter()
			.find(|fuel| fuel.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| format!("unknown fuel type `{}`", s))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transmission {
	#[serde(rename = "a")]
	Automatic,
	#[serde(rename = "m")]
	Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Drive {
	Fwd,
	Rwd,
	Awd,
	#[serde(rename = "4wd")]
	FourWd,
}

/// A car as supplied by a data source. Immutable once sourced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
	pub make: String,
	pub model: String,
	pub year: i32,
	pub fuel_type: FuelType,
	pub transmission: Transmission,
	pub drive: Drive,
	pub city_mpg: u32,
	pub highway_mpg: u32,
	pub combination_mpg: u32,
	pub cylinders: u32,
	pub displacement: f64,
	pub class: String,
}

impl Car {
	pub fn id(&self) -> String {
		encryption_engine::car_id(&self.make, &self.model, self.year)
	}

	/// Unsigned fields cover mpg and cylinders; displacement must be finite and non-negative.
	pub fn is_valid(&self) -> bool {
		self.displacement.is_finite() && self.displacement >= 0.0 && !self.make.trim().is_empty() && !self.model.trim().is_empty()
	}
}

/// A car as shown to the client, with its derived daily rent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarListing {
	pub car_id: String,
	pub rent_per_day: u32,
	#[serde(flatten)]
	pub car: Car,
}

impl CarListing {
	pub fn new(car: Car, current_year: i32) -> Self {
		CarListing {
			car_id: car.id(),
			rent_per_day: calculate_rent(car.city_mpg, car.year, current_year),
			car,
		}
	}
}

pub async fn car_details(state: State<AppState>, Path(car_id): Path<String>) -> AppResult<Json<CarListing>> {
	let not_found = || AppError::NotFound(format!("car {}", car_id));
	let (make, model, year) = encryption_engine::decode_car_id(&car_id).ok_or_else(not_found)?;
	let car = state.catalog.find(&make, &model, year).await.ok_or_else(not_found)?;
	Ok(Json(CarListing::new(car, state.clock.current_year())))
}

#[cfg(test)]
pub(crate) fn sample(make: &str, model: &str, year: i32, city_mpg: u32, fuel_type: FuelType) -> Car {
	Car {
		make: make.to_owned(),
		model: model.to_owned(),
		year,
		fuel_type,
		transmission: Transmission::Automatic,
		drive: Drive::Fwd,
		city_mpg,
		highway_mpg: city_mpg + 5,
		combination_mpg: city_mpg + 2,
		cylinders: 4,
		displacement: 2.0,
		class: "midsize car".to_owned(),
	}
}
