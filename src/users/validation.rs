//! Field checks run before anything reaches the store.

use std::borrow::Cow;

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{error::ValidationErrors, users::user::ProfileUpdate};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Fields collected by the sign-up form besides the credentials.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpFields {
	pub first_name: String,
	pub last_name: String,
	pub phone: Option<String>,
}

#[derive(Debug, Validate)]
struct SignUpForm {
	#[validate(length(min = 1, message = "First name is required"))]
	first_name: String,

	#[validate(length(min = 1, message = "Last name is required"))]
	last_name: String,

	#[validate(length(min = 1, message = "Email is required"), email(message = "Enter a valid email address"))]
	email: String,

	#[validate(custom(function = "password_policy"))]
	password: String,
}

const SIGN_UP_ORDER: [&str; 4] = ["first_name", "last_name", "email", "password"];

#[derive(Debug, Validate)]
struct EmailForm {
	#[validate(length(min = 1, message = "Email is required"), email(message = "Enter a valid email address"))]
	email: String,
}

/// Only the fields present in the update are checked.
#[derive(Debug, Validate)]
struct ProfileForm {
	#[validate(length(min = 1, message = "First name is required"))]
	first_name: Option<String>,

	#[validate(length(min = 1, message = "Last name is required"))]
	last_name: Option<String>,
}

/// At least eight characters with an uppercase letter, a lowercase letter and a digit.
fn password_policy(password: &str) -> Result<(), ValidationError> {
	let message = if password.chars().count() < MIN_PASSWORD_LEN {
		format!("Password must be at least {} characters", MIN_PASSWORD_LEN)
	} else if !password.chars().any(|c| c.is_uppercase()) {
		"Password must contain an uppercase letter".to_owned()
	} else if !password.chars().any(|c| c.is_lowercase()) {
		"Password must contain a lowercase letter".to_owned()
	} else if !password.chars().any(|c| c.is_ascii_digit()) {
		"Password must contain a number".to_owned()
	} else {
		return Ok(());
	};
	Err(ValidationError::new("password").with_message(Cow::Owned(message)))
}

fn check(form: &impl Validate, order: &[&'static str]) -> Result<(), ValidationErrors> {
	match form.validate() {
		Ok(()) => Ok(()),
		Err(report) => ValidationErrors::from_report(&report, order).into_result(),
	}
}

fn trimmed(value: &str) -> String {
	value.trim().to_owned()
}

pub fn validate_email(email: &str) -> Result<(), ValidationErrors> {
	check(&EmailForm { email: trimmed(email) }, &["email"])
}

pub fn validate_sign_up(email: &str, password: &str, fields: &SignUpFields) -> Result<(), ValidationErrors> {
	let form = SignUpForm {
		first_name: trimmed(&fields.first_name),
		last_name: trimmed(&fields.last_name),
		email: trimmed(email),
		password: password.to_owned(),
	};
	check(&form, &SIGN_UP_ORDER)
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ValidationErrors> {
	let form = ProfileForm {
		first_name: update.first_name.as_deref().map(trimmed),
		last_name: update.last_name.as_deref().map(trimmed),
	};
	check(&form, &["first_name", "last_name"])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn email_format() {
		assert!(validate_email("a@b.com").is_ok());
		assert!(validate_email(" jane.doe+cars@mail.example.org ").is_ok());
		for bad in ["", "   ", "plain", "@b.com", "a@@b.com", "a b@c.com"] {
			let errors = validate_email(bad).expect_err(bad);
			assert!(errors.has("email"), "{}", bad);
		}
	}

	#[test]
	fn password_policy_rules() {
		assert!(password_policy("Secret123").is_ok());
		for weak in ["Sh0rt", "alllower123", "ALLUPPER123", "NoDigitsHere"] {
			assert!(password_policy(weak).is_err(), "{}", weak);
		}
		let err = password_policy("Sh0rt").expect_err("too short");
		assert_eq!(err.message.as_deref(), Some("Password must be at least 8 characters"));
	}

	#[test]
	fn sign_up_reports_every_field() {
		let errors = validate_sign_up("nope", "weak", &SignUpFields::default()).expect_err("invalid");
		let fields: Vec<&str> = errors.fields().collect();
		assert_eq!(fields, vec!["first_name", "last_name", "email", "password"]);
	}

	#[test]
	fn blank_names_are_missing() {
		let fields = SignUpFields {
			first_name: "  ".to_owned(),
			last_name: "Doe".to_owned(),
			phone: None,
		};
		let errors = validate_sign_up("jane@example.com", "Secret123", &fields).expect_err("blank first name");
		assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["first_name"]);
	}

	#[test]
	fn valid_sign_up_passes() {
		let fields = SignUpFields {
			first_name: "Jane".to_owned(),
			last_name: "Doe".to_owned(),
			phone: None,
		};
		assert!(validate_sign_up("jane@example.com", "Secret123", &fields).is_ok());
	}

	#[test]
	fn profile_update_checks_present_names_only() {
		assert!(validate_profile_update(&ProfileUpdate::default()).is_ok());
		let update = ProfileUpdate {
			last_name: Some(" ".to_owned()),
			..ProfileUpdate::default()
		};
		let errors = validate_profile_update(&update).expect_err("blank last name");
		assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["last_name"]);
	}
}
