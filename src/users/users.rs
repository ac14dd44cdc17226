use axum::{extract::State, Json};
use hyper::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
	error::{AppError, AppResult, AuthError},
	server::AppState,
	users::{
		gate::post_login_target,
		session::SessionSnapshot,
		user::{Profile, ProfileUpdate},
		validation::SignUpFields,
	},
};

#[derive(Deserialize, Debug)]
pub struct Logins {
	email: String,
	password: String,
	redirect: Option<String>,
}

pub async fn user_login(state: State<AppState>, logins: Json<Logins>) -> AppResult<Json<Value>> {
	let logins = logins.0;
	let user = state.session.sign_in(&logins.email, &logins.password).await?;
	let redirect_to = post_login_target(logins.redirect.as_deref(), &state.config.post_login_path);
	Ok(Json(json!({ "user": user, "redirect_to": redirect_to })))
}

#[derive(Deserialize, Debug)]
pub struct NewUser {
	email: String,
	password: String,
	#[serde(flatten)]
	fields: SignUpFields,
	redirect: Option<String>,
}

pub async fn create_user(state: State<AppState>, new_user: Json<NewUser>) -> AppResult<(StatusCode, Json<Value>)> {
	let new_user = new_user.0;
	let user = state.session.sign_up(&new_user.email, &new_user.password, new_user.fields).await?;
	let redirect_to = post_login_target(new_user.redirect.as_deref(), &state.config.post_login_path);
	Ok((StatusCode::CREATED, Json(json!({ "user": user, "redirect_to": redirect_to }))))
}

pub async fn user_logout(state: State<AppState>) -> StatusCode {
	state.session.sign_out().await;
	StatusCode::NO_CONTENT
}

#[derive(Deserialize, Debug)]
pub struct ResetRequest {
	email: String,
}

pub async fn reset_password(state: State<AppState>, request: Json<ResetRequest>) -> AppResult<StatusCode> {
	state.session.reset_password(&request.email).await?;
	Ok(StatusCode::ACCEPTED)
}

pub async fn session(state: State<AppState>) -> Json<SessionSnapshot> {
	Json(state.session.snapshot().await)
}

pub async fn get_profile(state: State<AppState>) -> AppResult<Json<Profile>> {
	let user = state.session.current_user().await.ok_or(AppError::Auth(AuthError::NotSignedIn))?;
	Ok(Json(state.session.resolve_profile(user.id).await?))
}

pub async fn update_profile(state: State<AppState>, update: Json<ProfileUpdate>) -> AppResult<Json<Profile>> {
	Ok(Json(state.session.update_profile(update.0).await?))
}
