use std::{
	cmp::Reverse,
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc,
	},
};

use axum::{
	extract::{Query, State},
	Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
	cars::{
		cars::{Car, CarListing, FuelType},
		catalog::{self, CatalogOptions, MANUFACTURERS},
		pricing::{calculate_rent, Clock},
		source::CarSource,
	},
	config::DEFAULT_PAGE_SIZE,
	error::{AppResult, ValidationErrors},
	server::AppState,
};

/// Optional filters applied to the car collection. Absent fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
	pub manufacturer: Option<String>,
	pub model: Option<String>,
	pub year: Option<i32>,
	pub fuel: Option<FuelType>,
	pub limit: Option<usize>,
}

impl Criteria {
	/// Display cap, always at least one.
	pub fn limit(&self) -> usize {
		self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
	}

	pub fn matches(&self, car: &Car) -> bool {
		contains_term(&car.make, self.manufacturer.as_deref())
			&& contains_term(&car.model, self.model.as_deref())
			&& self.year.map_or(true, |year| car.year == year)
			&& self.fuel.map_or(true, |fuel| car.fuel_type == fuel)
	}
}

fn contains_term(value: &str, term: Option<&str>) -> bool {
	match term.map(|t| t.trim().to_lowercase()) {
		Some(term) if !term.is_empty() => value.to_lowercase().contains(&term),
		_ => true,
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
	/// Cheapest first.
	#[default]
	Price,
	/// Newest first.
	Year,
	/// Most efficient first.
	Mpg,
}

/// Stable sort by a single key.
pub fn sort_cars(cars: &mut [Car], sort: SortKey, current_year: i32) {
	match sort {
		SortKey::Price => cars.sort_by_key(|car| calculate_rent(car.city_mpg, car.year, current_year)),
		SortKey::Year => cars.sort_by_key(|car| Reverse(car.year)),
		SortKey::Mpg => cars.sort_by_key(|car| Reverse(car.city_mpg)),
	}
}

fn filter_and_sort(cars: &[Car], criteria: &Criteria, sort: SortKey, current_year: i32) -> Vec<Car> {
	let mut matching: Vec<Car> = cars.iter().filter(|car| criteria.matches(car)).cloned().collect();
	sort_cars(&mut matching, sort, current_year);
	matching
}

/// Filters, sorts and truncates to the criteria limit. Re-runs from scratch on every call.
pub fn search(cars: &[Car], criteria: &Criteria, sort: SortKey, current_year: i32) -> Vec<Car> {
	let mut result = filter_and_sort(cars, criteria, sort, current_year);
	result.truncate(criteria.limit());
	result
}

/// One rendered page of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
	pub cars: Vec<CarListing>,
	pub limit: usize,
	pub total_matches: usize,
	pub has_more: bool,
	pub is_empty: bool,
}

impl SearchResults {
	pub fn build(cars: &[Car], criteria: &Criteria, sort: SortKey, current_year: i32) -> Self {
		let limit = criteria.limit();
		let matching = filter_and_sort(cars, criteria, sort, current_year);
		let total_matches = matching.len();
		let cars: Vec<CarListing> = matching.into_iter().take(limit).map(|car| CarListing::new(car, current_year)).collect();
		SearchResults {
			is_empty: cars.is_empty(),
			has_more: total_matches > limit,
			cars,
			limit,
			total_matches,
		}
	}
}

/// Case and whitespace insensitive substring matches, then near misses within edit distance 2.
pub fn suggest_manufacturers(query: &str) -> Vec<&'static str> {
	let needle = normalize(query);
	if needle.is_empty() {
		return MANUFACTURERS.to_vec();
	}
	let mut result: Vec<&'static str> = MANUFACTURERS.iter().copied().filter(|m| normalize(m).contains(&needle)).collect();
	for manufacturer in MANUFACTURERS {
		if !result.contains(manufacturer) && levenshtein::levenshtein(&normalize(manufacturer), &needle) <= 2 {
			result.push(*manufacturer);
		}
	}
	result
}

fn normalize(s: &str) -> String {
	s.chars().filter(|c| !c.is_whitespace()).flat_map(char::to_lowercase).collect()
}

/// The criteria slot and last rendered page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogView {
	pub criteria: Criteria,
	pub sort: SortKey,
	pub results: SearchResults,
	#[serde(skip)]
	generation: u64,
}

/// Owns the current criteria slot. The most recently started search wins.
pub struct Catalog {
	source: Arc<dyn CarSource>,
	clock: Arc<dyn Clock>,
	page_size: usize,
	page_increment: usize,
	generation: AtomicU64,
	current: RwLock<CatalogView>,
}

impl Catalog {
	pub fn new(source: Arc<dyn CarSource>, clock: Arc<dyn Clock>, page_size: usize, page_increment: usize) -> Self {
		Catalog {
			source,
			clock,
			page_size: page_size.max(1),
			page_increment: page_increment.max(1),
			generation: AtomicU64::new(0),
			current: RwLock::new(CatalogView::default()),
		}
	}

	async fn fetch(&self, criteria: &Criteria) -> Vec<Car> {
		match self.source.fetch(criteria).await {
			Ok(cars) => cars,
			Err(e) => {
				log::warn!("car data source unavailable, showing no results: {}", e);
				Vec::new()
			}
		}
	}

	/// Never fails: an unavailable source yields an empty page.
	pub async fn search(&self, mut criteria: Criteria, sort: SortKey) -> SearchResults {
		criteria.limit = Some(criteria.limit.unwrap_or(self.page_size).max(1));
		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		let cars = self.fetch(&criteria).await;
		let results = SearchResults::build(&cars, &criteria, sort, self.clock.current_year());

		let mut current = self.current.write().await;
		if generation > current.generation {
			*current = CatalogView {
				criteria,
				sort,
				results: results.clone(),
				generation,
			};
		} else {
			log::debug!("discarding stale search #{} (current #{})", generation, current.generation);
		}
		results
	}

	/// Raises the limit of the current criteria and re-runs the whole search.
	pub async fn show_more(&self) -> SearchResults {
		let (mut criteria, sort) = {
			let current = self.current.read().await;
			(current.criteria.clone(), current.sort)
		};
		criteria.limit = Some(criteria.limit.unwrap_or(self.page_size).saturating_add(self.page_increment));
		self.search(criteria, sort).await
	}

	pub async fn current(&self) -> CatalogView {
		self.current.read().await.clone()
	}

	/// Exact lookup by identity, case-insensitive on make and model.
	pub async fn find(&self, make: &str, model: &str, year: i32) -> Option<Car> {
		let criteria = Criteria {
			manufacturer: Some(make.to_owned()),
			model: Some(model.to_owned()),
			year: Some(year),
			fuel: None,
			limit: Some(self.page_size),
		};
		self.fetch(&criteria)
			.await
			.into_iter()
			.find(|car| car.year == year && car.make.eq_ignore_ascii_case(make) && car.model.eq_ignore_ascii_case(model))
	}
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
	manufacturer: Option<String>,
	model: Option<String>,
	year: Option<String>,
	fuel: Option<String>,
	limit: Option<String>,
	sort: Option<String>,
}

#[derive(Debug, Validate)]
struct SearchBounds {
	#[validate(range(min = 1, max = 1000, message = "limit must be between 1 and 1000"))]
	limit: Option<usize>,
}

impl SearchParams {
	fn parse(self) -> Result<(Criteria, SortKey), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		let present = |s: Option<String>| s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty());

		let year = present(self.year).and_then(|y| match y.parse::<i32>() {
			Ok(year) => Some(year),
			Err(_) => {
				errors.add("year", "year must be a number");
				None
			}
		});
		let fuel = present(self.fuel).and_then(|f| match f.parse::<FuelType>() {
			Ok(fuel) => Some(fuel),
			Err(e) => {
				errors.add("fuel", e);
				None
			}
		});
		let limit = present(self.limit).and_then(|l| match l.parse::<usize>() {
			Ok(limit) => Some(limit),
			Err(_) => {
				errors.add("limit", "limit must be a positive integer");
				None
			}
		});
		if let Err(report) = (SearchBounds { limit }).validate() {
			errors.extend(ValidationErrors::from_report(&report, &["limit"]));
		}
		let sort = match present(self.sort).as_deref() {
			None | Some("price") => SortKey::Price,
			Some("year") => SortKey::Year,
			Some("mpg") => SortKey::Mpg,
			Some(other) => {
				errors.add("sort", format!("unknown sort key `{}`", other));
				SortKey::Price
			}
		};
		errors.into_result()?;

		let criteria = Criteria {
			manufacturer: present(self.manufacturer),
			model: present(self.model),
			year,
			fuel,
			limit,
		};
		Ok((criteria, sort))
	}
}

pub async fn search_cars(state: State<AppState>, Query(params): Query<SearchParams>) -> AppResult<Json<SearchResults>> {
	let (criteria, sort) = params.parse()?;
	log::debug!("search {:?} sorted by {:?}", criteria, sort);
	Ok(Json(state.catalog.search(criteria, sort).await))
}

pub async fn show_more(state: State<AppState>) -> Json<SearchResults> {
	Json(state.catalog.show_more().await)
}

pub async fn catalog_options() -> Json<CatalogOptions> {
	Json(catalog::options())
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
	#[serde(default)]
	query: String,
}

pub async fn suggest(Query(params): Query<SuggestParams>) -> Json<Vec<&'static str>> {
	Json(suggest_manufacturers(&params.query))
}
