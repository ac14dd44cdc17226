use serde::Serialize;
use serde_json::Value;

use crate::{
	cars::cars::{Car, FuelType},
	error::CatalogError,
};

const BUILT_IN_CARS: &str = include_str!("data/cars.json");

pub const MANUFACTURERS: &[&str] = &[
	"Acura",
	"Alfa Romeo",
	"Aston Martin",
	"Audi",
	"Bentley",
	"BMW",
	"Buick",
	"Cadillac",
	"Chevrolet",
	"Chrysler",
	"Citroen",
	"Dodge",
	"Ferrari",
	"Fiat",
	"Ford",
	"GMC",
	"Honda",
	"Hyundai",
	"Infiniti",
	"Jaguar",
	"Jeep",
	"Kia",
	"Lamborghini",
	"Land Rover",
	"Lexus",
	"Lincoln",
	"Maserati",
	"Mazda",
	"McLaren",
	"Mercedes-Benz",
	"MINI",
	"Mitsubishi",
	"Nissan",
	"Porsche",
	"Ram",
	"Rolls-Royce",
	"Subaru",
	"Tesla",
	"Toyota",
	"Volkswagen",
	"Volvo",
];

pub const FIRST_PRODUCTION_YEAR: i32 = 2015;
pub const LAST_PRODUCTION_YEAR: i32 = 2023;

/// Choices offered by the search bar.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogOptions {
	pub manufacturers: Vec<&'static str>,
	pub years: Vec<i32>,
	pub fuels: Vec<FuelType>,
}

pub fn options() -> CatalogOptions {
	CatalogOptions {
		manufacturers: MANUFACTURERS.to_vec(),
		years: (FIRST_PRODUCTION_YEAR..=LAST_PRODUCTION_YEAR).rev().collect(),
		fuels: FuelType::ALL.to_vec(),
	}
}

/// Decodes a JSON array of car records, skipping malformed or invalid entries.
pub fn parse_cars(json: &str) -> Result<Vec<Car>, CatalogError> {
	let rows: Vec<Value> = serde_json::from_str(json)?;
	Ok(from_rows(rows))
}

pub fn from_rows(rows: Vec<Value>) -> Vec<Car> {
	let total = rows.len();
	let cars: Vec<Car> = rows
		.into_iter()
		.filter_map(|row| match serde_json::from_value::<Car>(row) {
			Ok(car) if car.is_valid() => Some(car),
			Ok(car) => {
				log::warn!("dropping invalid car record {} {} {}", car.make, car.model, car.year);
				None
			}
			Err(e) => {
				log::warn!("dropping malformed car record: {}", e);
				None
			}
		})
		.collect();
	if cars.len() < total {
		log::debug!("kept {} of {} car records", cars.len(), total);
	}
	cars
}

pub fn built_in() -> Result<Vec<Car>, CatalogError> {
	parse_cars(BUILT_IN_CARS)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn built_in_catalog_loads() {
		let cars = built_in().expect("built-in catalog parses");
		assert_eq!(cars.len(), 30);
		assert!(cars.iter().all(Car::is_valid));
	}

	#[test]
	fn malformed_rows_are_skipped() {
		let json = r#"[
			{"make":"kia","model":"rio","year":2020,"fuel_type":"gas","transmission":"a","drive":"fwd",
			 "city_mpg":33,"highway_mpg":41,"combination_mpg":36,"cylinders":4,"displacement":1.6,"class":"compact car"},
			{"make":"kia","model":"rio","year":2020,"fuel_type":"gas","transmission":"a","drive":"fwd",
			 "city_mpg":-3,"highway_mpg":41,"combination_mpg":36,"cylinders":4,"displacement":1.6,"class":"compact car"},
			{"make":"kia","model":"rio","year":2020,"fuel_type":"gas","transmission":"a","drive":"fwd",
			 "city_mpg":33,"highway_mpg":41,"combination_mpg":36,"cylinders":4,"displacement":-1.6,"class":"compact car"},
			{"make":"kia"}
		]"#;
		let cars = parse_cars(json).expect("array parses");
		assert_eq!(cars.len(), 1);
	}

	#[test]
	fn options_list_newest_year_first() {
		let options = options();
		assert_eq!(options.years.first(), Some(&LAST_PRODUCTION_YEAR));
		assert_eq!(options.fuels.len(), 4);
	}
}
