//! Server configuration: defaults, then `CarRental.toml`, then `CAR_RENTAL_*` environment variables.

use std::{path::Path, time::Duration};

use figment::{
	providers::{Env, Format, Serialized, Toml},
	Figment,
};
use serde::{Deserialize, Serialize};

/// Records shown before the first "show more".
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
	/// Built-in catalog shipped with the binary.
	Static,
	/// Remote cars API.
	Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub bind_addr: String,
	pub page_size: usize,
	pub page_increment: usize,
	pub data_source: DataSourceKind,
	pub remote_url: String,
	pub remote_api_key: Option<String>,
	pub remote_api_host: String,
	/// Simulated backend latency of the mock auth store, in milliseconds.
	pub mock_delay_ms: u64,
	/// Where a successful sign-in lands when no return path was given.
	pub post_login_path: String,
	pub sign_in_path: String,
	/// Pins the "current year" used by rent pricing.
	pub reference_year: Option<i32>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			bind_addr: "0.0.0.0:4000".to_owned(),
			page_size: DEFAULT_PAGE_SIZE,
			page_increment: DEFAULT_PAGE_SIZE,
			data_source: DataSourceKind::Static,
			remote_url: "https://cars-by-api-ninjas.p.rapidapi.com/v1/cars".to_owned(),
			remote_api_key: None,
			remote_api_host: "cars-by-api-ninjas.p.rapidapi.com".to_owned(),
			mock_delay_ms: 500,
			post_login_path: "/dashboard".to_owned(),
			sign_in_path: "/sign-in".to_owned(),
			reference_year: None,
		}
	}
}

impl Config {
	pub fn load() -> anyhow::Result<Self> {
		Self::load_from("CarRental.toml")
	}

	pub fn load_from(file: impl AsRef<Path>) -> anyhow::Result<Self> {
		let config: Config = Figment::new()
			.merge(Serialized::defaults(Config::default()))
			.merge(Toml::file(file.as_ref()))
			.merge(Env::prefixed("CAR_RENTAL_"))
			.extract()?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> anyhow::Result<()> {
		if self.page_size == 0 {
			anyhow::bail!("page_size must be a positive integer");
		}
		if self.page_increment == 0 {
			anyhow::bail!("page_increment must be a positive integer");
		}
		if self.data_source == DataSourceKind::Remote && self.remote_api_key.is_none() {
			anyhow::bail!("remote data source needs remote_api_key");
		}
		Ok(())
	}

	pub fn mock_delay(&self) -> Duration {
		Duration::from_millis(self.mock_delay_ms)
	}

	/// Configuration used by tests: no simulated latency, pinned year.
	pub fn for_tests() -> Self {
		Self {
			bind_addr: "127.0.0.1:0".to_owned(),
			mock_delay_ms: 0,
			reference_year: Some(2024),
			..Self::default()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		let config = Config::default();
		assert!(config.validate().is_ok());
		assert_eq!(config.page_size, 10);
		assert_eq!(config.data_source, DataSourceKind::Static);
	}

	#[test]
	fn zero_page_size_is_rejected() {
		let config = Config { page_size: 0, ..Config::default() };
		assert!(config.validate().is_err());
	}

	#[test]
	fn remote_source_requires_key() {
		let config = Config { data_source: DataSourceKind::Remote, ..Config::default() };
		assert!(config.validate().is_err());
	}

	#[test]
	fn missing_file_falls_back_to_defaults() {
		let config = Config::load_from("does-not-exist.toml").expect("defaults load");
		assert_eq!(config.post_login_path, "/dashboard");
	}
}
