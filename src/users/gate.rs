use axum::{
	extract::{Request, State},
	middleware::Next,
	response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;

use crate::{server::AppState, users::session::SessionState};

/// Who may see a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
	Public,
	/// Needs a signed-in user.
	Protected,
	/// Sign-in/up forms; only while signed out.
	AuthOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
	Home,
	CarDetails,
	Booking,
	SignIn,
	SignUp,
	ResetPassword,
	Profile,
	Dashboard,
	Help,
	Legal,
}

impl View {
	pub fn access(&self) -> Access {
		match self {
			View::Home | View::CarDetails | View::Help | View::Legal => Access::Public,
			View::Booking | View::Profile | View::Dashboard => Access::Protected,
			View::SignIn | View::SignUp | View::ResetPassword => Access::AuthOnly,
		}
	}
}

/// Navigation intent handed to the router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Navigation {
	Allow,
	Redirect(String),
}

/// Where the sign-in form sends the user afterwards. Only same-site paths are honoured.
pub fn post_login_target(return_path: Option<&str>, landing: &str) -> String {
	match return_path {
		Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_owned(),
		_ => landing.to_owned(),
	}
}

pub fn sign_in_redirect(sign_in_path: &str, return_path: &str) -> String {
	format!("{}?redirect={}", sign_in_path, encode_path(return_path))
}

fn encode_path(path: &str) -> String {
	let mut encoded = String::with_capacity(path.len());
	for byte in path.bytes() {
		match byte {
			b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => encoded.push(byte as char),
			_ => encoded.push_str(&format!("%{:02X}", byte)),
		}
	}
	encoded
}

/// Decides whether a view with `access` may render in `state`, redirecting instead of failing.
pub fn gate(access: Access, state: SessionState, requested_path: &str, sign_in_path: &str, landing: &str) -> Navigation {
	match (access, state.is_signed_in()) {
		(Access::Protected, false) => Navigation::Redirect(sign_in_redirect(sign_in_path, requested_path)),
		(Access::AuthOnly, true) => Navigation::Redirect(landing.to_owned()),
		_ => Navigation::Allow,
	}
}

async fn gate_request(access: Access, state: AppState, request: Request, next: Next) -> Response {
	let path = request
		.uri()
		.path_and_query()
		.map(|pq| pq.as_str().to_owned())
		.unwrap_or_else(|| request.uri().path().to_owned());
	let session_state = state.session.state().await;
	match gate(access, session_state, &path, &state.config.sign_in_path, &state.config.post_login_path) {
		Navigation::Allow => next.run(request).await,
		Navigation::Redirect(target) => {
			log::debug!("redirecting {} to {}", path, target);
			Redirect::to(&target).into_response()
		}
	}
}

pub async fn require_signed_in(State(state): State<AppState>, request: Request, next: Next) -> Response {
	gate_request(Access::Protected, state, request, next).await
}

pub async fn require_signed_out(State(state): State<AppState>, request: Request, next: Next) -> Response {
	gate_request(Access::AuthOnly, state, request, next).await
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn protected_view_redirects_with_return_path() {
		let nav = gate(View::Profile.access(), SessionState::SignedOut, "/profile", "/sign-in", "/dashboard");
		assert_eq!(nav, Navigation::Redirect("/sign-in?redirect=/profile".to_owned()));
		assert_eq!(gate(View::Profile.access(), SessionState::SignedIn, "/profile", "/sign-in", "/dashboard"), Navigation::Allow);
	}

	#[test]
	fn pending_sign_in_is_not_signed_in() {
		let nav = gate(View::Booking.access(), SessionState::SigningIn, "/bookings", "/sign-in", "/dashboard");
		assert!(matches!(nav, Navigation::Redirect(_)));
	}

	#[test]
	fn auth_only_view_redirects_signed_in_user() {
		let nav = gate(View::SignUp.access(), SessionState::SignedIn, "/sign-up", "/sign-in", "/dashboard");
		assert_eq!(nav, Navigation::Redirect("/dashboard".to_owned()));
		assert_eq!(gate(View::SignUp.access(), SessionState::SignedOut, "/sign-up", "/sign-in", "/dashboard"), Navigation::Allow);
	}

	#[test]
	fn public_views_always_render() {
		for state in [SessionState::SignedOut, SessionState::SignedIn] {
			assert_eq!(gate(View::Home.access(), state, "/", "/sign-in", "/dashboard"), Navigation::Allow);
			assert_eq!(gate(View::Legal.access(), state, "/legal", "/sign-in", "/dashboard"), Navigation::Allow);
		}
	}

	#[test]
	fn view_table() {
		assert_eq!(View::Dashboard.access(), Access::Protected);
		assert_eq!(View::ResetPassword.access(), Access::AuthOnly);
		assert_eq!(View::CarDetails.access(), Access::Public);
	}

	#[test]
	fn return_path_is_encoded() {
		assert_eq!(sign_in_redirect("/sign-in", "/cars?x=1&y=2"), "/sign-in?redirect=/cars%3Fx%3D1%26y%3D2");
	}

	#[test]
	fn post_login_ignores_foreign_targets() {
		assert_eq!(post_login_target(Some("/profile"), "/dashboard"), "/profile");
		assert_eq!(post_login_target(Some("//evil.example"), "/dashboard"), "/dashboard");
		assert_eq!(post_login_target(Some("https://evil.example"), "/dashboard"), "/dashboard");
		assert_eq!(post_login_target(None, "/dashboard"), "/dashboard");
	}
}
