use std::sync::Arc;

use axum::{
	middleware,
	routing::{get, post, Router},
};
use tower_http::cors::CorsLayer;

use crate::{
	cars::{
		cars::car_details,
		pricing::{Clock, FixedClock, SystemClock},
		source::{CarSource, RemoteCarSource, StaticCarSource},
	},
	config::{Config, DataSourceKind},
	rental::booking,
	search::{self, Catalog},
	users::{gate, session::SessionManager, store::MockStore, users},
};

/// Everything the handlers share. Owned by the server for the lifetime of the application session.
#[derive(Clone)]
pub struct AppState {
	pub config: Arc<Config>,
	pub clock: Arc<dyn Clock>,
	pub catalog: Arc<Catalog>,
	pub session: Arc<SessionManager>,
	pub store: Arc<MockStore>,
}

impl AppState {
	pub fn new(config: Config) -> anyhow::Result<Self> {
		let source: Arc<dyn CarSource> = match config.data_source {
			DataSourceKind::Static => Arc::new(StaticCarSource::built_in()?),
			DataSourceKind::Remote => {
				let remote = RemoteCarSource::from_config(&config).ok_or_else(|| anyhow::anyhow!("remote data source needs remote_api_key"))?;
				Arc::new(remote)
			}
		};
		Ok(Self::with_source(config, source))
	}

	pub fn with_source(config: Config, source: Arc<dyn CarSource>) -> Self {
		let clock: Arc<dyn Clock> = match config.reference_year {
			Some(year) => Arc::new(FixedClock(year)),
			None => Arc::new(SystemClock),
		};
		let store = Arc::new(MockStore::new(config.mock_delay()));
		let catalog = Arc::new(Catalog::new(source, clock.clone(), config.page_size, config.page_increment));
		let session = Arc::new(SessionManager::new(store.clone()));
		AppState {
			config: Arc::new(config),
			clock,
			catalog,
			session,
			store,
		}
	}
}

pub fn router(state: AppState) -> Router {
	let auth_only = Router::new()
		.route("/auth/sign-in", post(users::user_login))
		.route("/auth/sign-up", post(users::create_user))
		.route("/auth/reset-password", post(users::reset_password))
		.route_layer(middleware::from_fn_with_state(state.clone(), gate::require_signed_out));

	let protected = Router::new()
		.route("/profile", get(users::get_profile).put(users::update_profile))
		.route("/dashboard", get(booking::dashboard))
		.route("/saved", get(booking::saved_cars))
		.route("/saved/:car_id", post(booking::save_car).delete(booking::unsave_car))
		.route("/bookings", get(booking::list_bookings).post(booking::create_booking))
		.route("/bookings/quote", post(booking::quote_booking))
		.route_layer(middleware::from_fn_with_state(state.clone(), gate::require_signed_in));

	Router::new()
		.route("/cars", get(search::search_cars))
		.route("/cars/show-more", post(search::show_more))
		.route("/cars/options", get(search::catalog_options))
		.route("/cars/suggest", get(search::suggest))
		.route("/cars/:car_id", get(car_details))
		.route("/auth/sign-out", post(users::user_logout))
		.route("/session", get(users::session))
		.merge(auth_only)
		.merge(protected)
		.layer(CorsLayer::permissive())
		.with_state(state)
}
