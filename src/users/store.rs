//! In-memory stand-in for the auth and database backend.

use std::{collections::HashMap, time::Duration};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
	rental::booking::Booking,
	users::user::{Profile, User},
};

#[derive(Debug, Default)]
struct Tables {
	users: HashMap<String, User>,
	profiles: HashMap<Uuid, Profile>,
	saved_cars: HashMap<Uuid, Vec<String>>,
	bookings: HashMap<Uuid, Vec<Booking>>,
	password_resets: Vec<String>,
}

/// Every call waits `delay` before touching the tables.
#[derive(Debug, Default)]
pub struct MockStore {
	delay: Duration,
	tables: RwLock<Tables>,
}

impl MockStore {
	pub fn new(delay: Duration) -> Self {
		MockStore {
			delay,
			tables: RwLock::default(),
		}
	}

	async fn latency(&self) {
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
	}

	pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
		self.latency().await;
		self.tables.read().await.users.get(&email.trim().to_lowercase()).cloned()
	}

	pub async fn find_user(&self, user_id: Uuid) -> Option<User> {
		self.latency().await;
		self.tables.read().await.users.values().find(|u| u.id == user_id).cloned()
	}

	/// `false` when the email is already registered.
	pub async fn insert_user(&self, user: User) -> bool {
		self.latency().await;
		let mut tables = self.tables.write().await;
		if tables.users.contains_key(&user.email) {
			return false;
		}
		tables.users.insert(user.email.clone(), user);
		true
	}

	pub async fn get_profile(&self, user_id: Uuid) -> Option<Profile> {
		self.latency().await;
		self.tables.read().await.profiles.get(&user_id).cloned()
	}

	pub async fn upsert_profile(&self, profile: Profile) {
		self.latency().await;
		self.tables.write().await.profiles.insert(profile.user_id, profile);
	}

	/// Inserts only when absent; returns the stored profile either way.
	pub async fn insert_profile_if_absent(&self, profile: Profile) -> Profile {
		self.latency().await;
		self.tables.write().await.profiles.entry(profile.user_id).or_insert(profile).clone()
	}

	pub async fn delete_profile(&self, user_id: Uuid) -> bool {
		self.latency().await;
		self.tables.write().await.profiles.remove(&user_id).is_some()
	}

	pub async fn saved_cars(&self, user_id: Uuid) -> Vec<String> {
		self.latency().await;
		self.tables.read().await.saved_cars.get(&user_id).cloned().unwrap_or_default()
	}

	/// `false` when the car was already saved.
	pub async fn save_car(&self, user_id: Uuid, car_id: &str) -> bool {
		self.latency().await;
		let mut tables = self.tables.write().await;
		let saved = tables.saved_cars.entry(user_id).or_default();
		if saved.iter().any(|id| id == car_id) {
			return false;
		}
		saved.push(car_id.to_owned());
		true
	}

	pub async fn unsave_car(&self, user_id: Uuid, car_id: &str) -> bool {
		self.latency().await;
		let mut tables = self.tables.write().await;
		let Some(saved) = tables.saved_cars.get_mut(&user_id) else {
			return false;
		};
		let before = saved.len();
		saved.retain(|id| id != car_id);
		saved.len() != before
	}

	pub async fn bookings(&self, user_id: Uuid) -> Vec<Booking> {
		self.latency().await;
		self.tables.read().await.bookings.get(&user_id).cloned().unwrap_or_default()
	}

	pub async fn insert_booking(&self, booking: Booking) {
		self.latency().await;
		self.tables.write().await.bookings.entry(booking.user_id).or_default().push(booking);
	}

	pub async fn request_password_reset(&self, email: &str) {
		self.latency().await;
		self.tables.write().await.password_resets.push(email.trim().to_lowercase());
	}

	pub async fn password_reset_requests(&self) -> Vec<String> {
		self.tables.read().await.password_resets.clone()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::users::user::UserMetadata;

	fn user(email: &str) -> User {
		User::new(email, UserMetadata::default())
	}

	#[tokio::test]
	async fn duplicate_email_is_rejected() {
		let store = MockStore::default();
		assert!(store.insert_user(user("a@b.com")).await);
		assert!(!store.insert_user(user("A@B.com")).await);
		assert!(store.find_user_by_email(" a@b.com").await.is_some());
	}

	#[tokio::test]
	async fn profile_insert_if_absent_keeps_existing() {
		let store = MockStore::default();
		let u = user("a@b.com");
		let mut first = Profile::from_user(&u);
		first.address = Some("1 Main St".to_owned());
		store.insert_profile_if_absent(first).await;
		let kept = store.insert_profile_if_absent(Profile::from_user(&u)).await;
		assert_eq!(kept.address.as_deref(), Some("1 Main St"));
		assert!(store.delete_profile(u.id).await);
		assert!(store.get_profile(u.id).await.is_none());
	}

	#[tokio::test]
	async fn saved_cars_are_unique() {
		let store = MockStore::default();
		let id = Uuid::new_v4();
		assert!(store.save_car(id, "car-1").await);
		assert!(!store.save_car(id, "car-1").await);
		assert!(store.save_car(id, "car-2").await);
		assert_eq!(store.saved_cars(id).await, vec!["car-1", "car-2"]);
		assert!(store.unsave_car(id, "car-1").await);
		assert!(!store.unsave_car(id, "car-1").await);
		assert!(!store.unsave_car(Uuid::new_v4(), "car-2").await);
	}

	#[tokio::test(start_paused = true)]
	async fn calls_wait_for_simulated_latency() {
		let store = MockStore::new(Duration::from_millis(500));
		let started = tokio::time::Instant::now();
		store.find_user_by_email("a@b.com").await;
		assert!(started.elapsed() >= Duration::from_millis(500));
	}
}
