use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
	pub first_name: String,
	pub last_name: String,
	pub phone: Option<String>,
}

/// Authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: Uuid,
	pub email: String,
	pub metadata: UserMetadata,
	pub created_at: DateTime<Utc>,
}

impl User {
	pub fn new(email: &str, metadata: UserMetadata) -> Self {
		User {
			id: Uuid::new_v4(),
			email: email.trim().to_lowercase(),
			metadata,
			created_at: Utc::now(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
	pub preferred_fuel: Option<String>,
	pub preferred_class: Option<String>,
	#[serde(default)]
	pub newsletter: bool,
}

/// Extended user record beyond bare identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	pub user_id: Uuid,
	pub first_name: String,
	pub last_name: String,
	pub email: String,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub license_number: Option<String>,
	pub preferences: Preferences,
	pub is_verified: bool,
	pub updated_at: DateTime<Utc>,
}

impl Profile {
	/// Profile seeded from identity metadata; optional fields start empty.
	pub fn from_user(user: &User) -> Self {
		Profile {
			user_id: user.id,
			first_name: user.metadata.first_name.clone(),
			last_name: user.metadata.last_name.clone(),
			email: user.email.clone(),
			phone: user.metadata.phone.clone(),
			address: None,
			license_number: None,
			preferences: Preferences::default(),
			is_verified: false,
			updated_at: Utc::now(),
		}
	}

	pub fn apply(&mut self, update: ProfileUpdate) {
		if let Some(first_name) = update.first_name {
			self.first_name = first_name;
		}
		if let Some(last_name) = update.last_name {
			self.last_name = last_name;
		}
		if update.phone.is_some() {
			self.phone = update.phone;
		}
		if update.address.is_some() {
			self.address = update.address;
		}
		if update.license_number.is_some() {
			self.license_number = update.license_number;
		}
		if let Some(preferences) = update.preferences {
			self.preferences = preferences;
		}
		self.updated_at = Utc::now();
	}
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
	pub first_name: Option<String>,
	pub last_name: Option<String>,
	pub phone: Option<String>,
	pub address: Option<String>,
	pub license_number: Option<String>,
	pub preferences: Option<Preferences>,
}
