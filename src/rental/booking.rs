use axum::{
	extract::{Path, State},
	Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use hyper::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
	cars::cars::CarListing,
	encryption_engine,
	error::{AppError, AppResult, AuthError, ValidationErrors},
	server::AppState,
	users::user::{Profile, User},
};

#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
	pub car_id: String,
	pub pickup_date: NaiveDate,
	pub return_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
	pub car_id: String,
	pub rent_per_day: u32,
	pub days: u32,
	pub total: u32,
}

/// Rental days between pickup and return, at least one.
pub fn rental_days(pickup: NaiveDate, return_date: NaiveDate) -> Result<u32, ValidationErrors> {
	let days = (return_date - pickup).num_days();
	if days < 0 {
		return Err(ValidationErrors::single("return_date", "Return date must not be before pickup date"));
	}
	u32::try_from(days.max(1)).map_err(|_| ValidationErrors::single("return_date", "Rental period is too long"))
}

pub fn quote(listing: &CarListing, pickup: NaiveDate, return_date: NaiveDate) -> Result<Quote, ValidationErrors> {
	let days = rental_days(pickup, return_date)?;
	let total = listing
		.rent_per_day
		.checked_mul(days)
		.ok_or_else(|| ValidationErrors::single("return_date", "Rental period is too long"))?;
	Ok(Quote {
		car_id: listing.car_id.clone(),
		rent_per_day: listing.rent_per_day,
		days,
		total,
	})
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
	pub booking_id: Uuid,
	pub user_id: Uuid,
	pub car_id: String,
	pub pickup_date: NaiveDate,
	pub return_date: NaiveDate,
	pub days: u32,
	pub total: u32,
	pub created_at: DateTime<Utc>,
}

async fn signed_in_user(state: &AppState) -> AppResult<User> {
	state.session.current_user().await.ok_or(AppError::Auth(AuthError::NotSignedIn))
}

async fn listing(state: &AppState, car_id: &str) -> AppResult<CarListing> {
	let not_found = || AppError::NotFound(format!("car {}", car_id));
	let (make, model, year) = encryption_engine::decode_car_id(car_id).ok_or_else(not_found)?;
	let car = state.catalog.find(&make, &model, year).await.ok_or_else(not_found)?;
	Ok(CarListing::new(car, state.clock.current_year()))
}

pub async fn quote_booking(state: State<AppState>, request: Json<BookingRequest>) -> AppResult<Json<Quote>> {
	let request = request.0;
	signed_in_user(&state).await?;
	let listing = listing(&state, &request.car_id).await?;
	Ok(Json(quote(&listing, request.pickup_date, request.return_date)?))
}

pub async fn create_booking(state: State<AppState>, request: Json<BookingRequest>) -> AppResult<(StatusCode, Json<Booking>)> {
	let request = request.0;
	let user = signed_in_user(&state).await?;
	let listing = listing(&state, &request.car_id).await?;
	let quote = quote(&listing, request.pickup_date, request.return_date)?;
	let booking = Booking {
		booking_id: Uuid::new_v4(),
		user_id: user.id,
		car_id: quote.car_id,
		pickup_date: request.pickup_date,
		return_date: request.return_date,
		days: quote.days,
		total: quote.total,
		created_at: Utc::now(),
	};
	state.store.insert_booking(booking.clone()).await;
	log::info!("booking {} created for user {}", booking.booking_id, user.id);
	Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(state: State<AppState>) -> AppResult<Json<Vec<Booking>>> {
	let user = signed_in_user(&state).await?;
	Ok(Json(state.store.bookings(user.id).await))
}

pub async fn saved_cars(state: State<AppState>) -> AppResult<Json<Vec<String>>> {
	let user = signed_in_user(&state).await?;
	Ok(Json(state.store.saved_cars(user.id).await))
}

pub async fn save_car(state: State<AppState>, Path(car_id): Path<String>) -> AppResult<StatusCode> {
	let user = signed_in_user(&state).await?;
	listing(&state, &car_id).await?;
	if state.store.save_car(user.id, &car_id).await {
		Ok(StatusCode::CREATED)
	} else {
		Ok(StatusCode::OK)
	}
}

pub async fn unsave_car(state: State<AppState>, Path(car_id): Path<String>) -> AppResult<StatusCode> {
	let user = signed_in_user(&state).await?;
	if state.store.unsave_car(user.id, &car_id).await {
		Ok(StatusCode::NO_CONTENT)
	} else {
		Err(AppError::NotFound(format!("saved car {}", car_id)))
	}
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
	pub profile: Profile,
	pub saved_cars: Vec<String>,
	pub bookings: Vec<Booking>,
}

pub async fn dashboard(state: State<AppState>) -> AppResult<Json<Dashboard>> {
	let user = signed_in_user(&state).await?;
	let profile = state.session.resolve_profile(user.id).await?;
	Ok(Json(Dashboard {
		profile,
		saved_cars: state.store.saved_cars(user.id).await,
		bookings: state.store.bookings(user.id).await,
	}))
}
