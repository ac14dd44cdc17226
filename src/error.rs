//! Error types shared by the catalog, session and HTTP layers.

use axum::{
	response::{IntoResponse, Response},
	Json,
};
use hyper::StatusCode;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single field-level validation failure, rendered next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
	pub field: &'static str,
	pub message: String,
}

/// One or more field-level validation failures. Never fatal.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
#[error("invalid fields: {}", field_list(.0))]
pub struct ValidationErrors(Vec<FieldError>);

fn field_list(errors: &[FieldError]) -> String {
	errors.iter().map(|e| e.field).collect::<Vec<_>>().join(", ")
}

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
		self.0.push(FieldError { field, message: message.into() });
	}

	pub fn single(field: &'static str, message: impl Into<String>) -> Self {
		let mut errors = Self::new();
		errors.add(field, message);
		errors
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.0.iter().map(|e| e.field)
	}

	pub fn has(&self, field: &str) -> bool {
		self.0.iter().any(|e| e.field == field)
	}

	pub fn extend(&mut self, other: ValidationErrors) {
		self.0.extend(other.0);
	}

	/// Flattens a `validator` report, keeping the first message per field in `order`.
	pub fn from_report(report: &validator::ValidationErrors, order: &[&'static str]) -> Self {
		let by_field = report.field_errors();
		let mut errors = Self::new();
		for field in order {
			if let Some(first) = by_field.get(*field).and_then(|list| list.first()) {
				let message = match &first.message {
					Some(message) => message.to_string(),
					None => format!("{} is invalid", field),
				};
				errors.add(field, message);
			}
		}
		errors
	}

	/// `Ok(())` when nothing was recorded.
	pub fn into_result(self) -> Result<(), Self> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(self)
		}
	}
}

/// Failures of the session manager operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	/// Input rejected before contacting the store.
	#[error(transparent)]
	Validation(#[from] ValidationErrors),

	#[error("invalid login credentials")]
	InvalidCredentials,

	#[error("account not found")]
	AccountNotFound,

	#[error("an account with this email already exists")]
	EmailTaken,

	#[error("already signed in")]
	AlreadySignedIn,

	#[error("not signed in")]
	NotSignedIn,

	/// A newer sign-in/sign-up was started while this one was pending.
	#[error("request superseded by a newer one")]
	Superseded,
}

impl AuthError {
	pub fn is_validation(&self) -> bool {
		matches!(self, Self::Validation(_))
	}
}

/// Failures of a car data source. Caught by the catalog and turned into an empty result.
#[derive(Error, Debug)]
pub enum CatalogError {
	#[error("car data source request failed: {0}")]
	Request(#[from] reqwest::Error),

	#[error("car data source returned {0}")]
	Status(StatusCode),

	#[error("invalid catalog data: {0}")]
	Data(#[from] serde_json::Error),
}

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub enum AppError {
	Validation(ValidationErrors),
	Auth(AuthError),
	NotFound(String),
	Internal(anyhow::Error),
}

impl From<AuthError> for AppError {
	fn from(err: AuthError) -> Self {
		match err {
			AuthError::Validation(errors) => Self::Validation(errors),
			other => Self::Auth(other),
		}
	}
}

impl From<ValidationErrors> for AppError {
	fn from(err: ValidationErrors) -> Self {
		Self::Validation(err)
	}
}

impl From<anyhow::Error> for AppError {
	fn from(err: anyhow::Error) -> Self {
		Self::Internal(err)
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		match self {
			AppError::Validation(errors) => (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "errors": errors }))).into_response(),
			AppError::Auth(err) => {
				let status = match err {
					AuthError::EmailTaken | AuthError::AlreadySignedIn | AuthError::Superseded => StatusCode::CONFLICT,
					_ => StatusCode::UNAUTHORIZED,
				};
				(status, Json(json!({ "message": err.to_string() }))).into_response()
			}
			AppError::NotFound(what) => (StatusCode::NOT_FOUND, Json(json!({ "message": format!("{} not found", what) }))).into_response(),
			AppError::Internal(err) => {
				log::error!("internal error: {:#}", err);
				(StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "message": "Something went wrong, please try again." }))).into_response()
			}
		}
	}
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn validation_errors_collect_fields() {
		let mut errors = ValidationErrors::new();
		assert!(errors.clone().into_result().is_ok());
		errors.add("email", "invalid email");
		errors.add("password", "too short");
		assert!(errors.has("email"));
		assert!(!errors.has("first_name"));
		assert_eq!(errors.to_string(), "invalid fields: email, password");
	}

	#[test]
	fn report_keeps_field_order_and_first_message() {
		let mut report = validator::ValidationErrors::new();
		report.add("password", validator::ValidationError::new("length").with_message("too short".into()));
		report.add("email", validator::ValidationError::new("email"));
		report.add("email", validator::ValidationError::new("length").with_message("ignored".into()));

		let errors = ValidationErrors::from_report(&report, &["first_name", "email", "password"]);
		let fields: Vec<&str> = errors.fields().collect();
		assert_eq!(fields, vec!["email", "password"]);
		assert_eq!(errors.0[0].message, "email is invalid");
		assert_eq!(errors.0[1].message, "too short");
	}

	#[test]
	fn auth_validation_maps_to_field_errors() {
		let err: AppError = AuthError::from(ValidationErrors::single("email", "bad")).into();
		assert!(matches!(err, AppError::Validation(_)));
		let err: AppError = AuthError::InvalidCredentials.into();
		assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
	}

	#[test]
	fn responses_use_expected_status() {
		assert_eq!(AppError::NotFound("car".into()).into_response().status(), StatusCode::NOT_FOUND);
		assert_eq!(AppError::Auth(AuthError::EmailTaken).into_response().status(), StatusCode::CONFLICT);
		assert_eq!(
			AppError::Validation(ValidationErrors::single("email", "bad")).into_response().status(),
			StatusCode::UNPROCESSABLE_ENTITY
		);
	}
}
