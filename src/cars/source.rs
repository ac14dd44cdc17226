//! Car data sources: the built-in catalog or a remote cars API.

use async_trait::async_trait;
use serde_json::Value;

use crate::{
	cars::{cars::Car, catalog},
	config::Config,
	error::CatalogError,
	search::Criteria,
};

/// Supplies raw car records for a set of criteria. The result may be empty.
#[async_trait]
pub trait CarSource: Send + Sync {
	async fn fetch(&self, criteria: &Criteria) -> Result<Vec<Car>, CatalogError>;
}

/// Fixed list; criteria are applied by the search pipeline.
#[derive(Debug, Clone, Default)]
pub struct StaticCarSource {
	cars: Vec<Car>,
}

impl StaticCarSource {
	pub fn new(cars: Vec<Car>) -> Self {
		StaticCarSource { cars }
	}

	pub fn built_in() -> Result<Self, CatalogError> {
		Ok(Self::new(catalog::built_in()?))
	}
}

#[async_trait]
impl CarSource for StaticCarSource {
	async fn fetch(&self, _criteria: &Criteria) -> Result<Vec<Car>, CatalogError> {
		Ok(self.cars.clone())
	}
}

/// Looks cars up on a RapidAPI-hosted cars endpoint.
#[derive(Debug, Clone)]
pub struct RemoteCarSource {
	client: reqwest::Client,
	url: String,
	api_key: String,
	api_host: String,
}

impl RemoteCarSource {
	pub fn new(url: impl Into<String>, api_key: impl Into<String>, api_host: impl Into<String>) -> Self {
		RemoteCarSource {
			client: reqwest::Client::new(),
			url: url.into(),
			api_key: api_key.into(),
			api_host: api_host.into(),
		}
	}

	pub fn from_config(config: &Config) -> Option<Self> {
		let key = config.remote_api_key.as_deref()?;
		Some(Self::new(&config.remote_url, key, &config.remote_api_host))
	}

	fn query(criteria: &Criteria) -> Vec<(&'static str, String)> {
		let mut query = Vec::with_capacity(5);
		if let Some(make) = criteria.manufacturer.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
			query.push(("make", make.to_owned()));
		}
		if let Some(model) = criteria.model.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
			query.push(("model", model.to_owned()));
		}
		if let Some(year) = criteria.year {
			query.push(("year", year.to_string()));
		}
		if let Some(fuel) = criteria.fuel {
			query.push(("fuel_type", fuel.to_string()));
		}
		query.push(("limit", criteria.limit().to_string()));
		query
	}
}

#[async_trait]
impl CarSource for RemoteCarSource {
	async fn fetch(&self, criteria: &Criteria) -> Result<Vec<Car>, CatalogError> {
		let response = self
			.client
			.get(&self.url)
			.header("X-RapidAPI-Key", &self.api_key)
			.header("X-RapidAPI-Host", &self.api_host)
			.query(&Self::query(criteria))
			.send()
			.await?;
		if !response.status().is_success() {
			return Err(CatalogError::Status(response.status()));
		}
		let rows: Vec<Value> = response.json().await?;
		Ok(catalog::from_rows(rows))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cars::cars::FuelType;

	#[test]
	fn remote_query_skips_blank_fields() {
		let criteria = Criteria {
			manufacturer: Some("  ".to_owned()),
			model: Some("corolla".to_owned()),
			year: Some(2020),
			fuel: Some(FuelType::Gas),
			limit: None,
		};
		let query = RemoteCarSource::query(&criteria);
		assert_eq!(
			query,
			vec![
				("model", "corolla".to_owned()),
				("year", "2020".to_owned()),
				("fuel_type", "gas".to_owned()),
				("limit", "10".to_owned()),
			]
		);
	}

	#[tokio::test]
	async fn static_source_returns_everything() {
		let source = StaticCarSource::built_in().expect("built-in catalog");
		let cars = source.fetch(&Criteria::default()).await.expect("static fetch");
		assert_eq!(cars.len(), 30);
	}
}
