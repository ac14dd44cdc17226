//! Session manager: at most one signed-in user and their profile.
//!
//! ```text
//! SignedOut -> SigningIn -> SignedIn -> SignedOut
//! SignedOut -> SigningUp -> SignedIn
//! ```
//!
//! A failed sign-in or sign-up drops back to `SignedOut`. Re-submitting while a
//! previous attempt is pending is allowed; only the most recent attempt may
//! commit, older ones resolve to [`AuthError::Superseded`]. Subscribers are
//! notified after the session lock has been released.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::{
	error::AuthError,
	users::{
		store::MockStore,
		user::{Profile, ProfileUpdate, User, UserMetadata},
		validation::{self, SignUpFields},
	},
};

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
	SignedOut,
	SigningIn,
	SigningUp,
	SignedIn,
	/// Sign-out clears the slot under one lock, so readers never observe this state.
	SigningOut,
}

impl SessionState {
	pub fn is_signed_in(&self) -> bool {
		matches!(self, SessionState::SignedIn)
	}

	fn is_pending(&self) -> bool {
		matches!(self, SessionState::SigningIn | SessionState::SigningUp)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
	SignedIn(User),
	SignedUp(User),
	SignedOut,
	ProfileUpdated(Profile),
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
	pub state: SessionState,
	pub user: Option<User>,
	pub profile: Option<Profile>,
}

#[derive(Debug)]
struct Slot {
	state: SessionState,
	user: Option<User>,
	profile: Option<Profile>,
	attempt: u64,
}

pub struct SessionManager {
	store: Arc<MockStore>,
	slot: Mutex<Slot>,
	events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
	pub fn new(store: Arc<MockStore>) -> Self {
		let (events, _) = broadcast::channel(EVENT_CAPACITY);
		SessionManager {
			store,
			slot: Mutex::new(Slot {
				state: SessionState::SignedOut,
				user: None,
				profile: None,
				attempt: 0,
			}),
			events,
		}
	}

	pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
		self.events.subscribe()
	}

	fn notify(&self, event: SessionEvent) {
		// no subscribers is fine
		let _ = self.events.send(event);
	}

	pub async fn state(&self) -> SessionState {
		self.slot.lock().await.state
	}

	pub async fn current_user(&self) -> Option<User> {
		self.slot.lock().await.user.clone()
	}

	pub async fn profile(&self) -> Option<Profile> {
		self.slot.lock().await.profile.clone()
	}

	pub async fn snapshot(&self) -> SessionSnapshot {
		let slot = self.slot.lock().await;
		SessionSnapshot {
			state: slot.state,
			user: slot.user.clone(),
			profile: slot.profile.clone(),
		}
	}

	async fn begin(&self, pending: SessionState) -> Result<u64, AuthError> {
		let mut slot = self.slot.lock().await;
		if matches!(slot.state, SessionState::SignedIn | SessionState::SigningOut) {
			return Err(AuthError::AlreadySignedIn);
		}
		slot.attempt += 1;
		slot.state = pending;
		Ok(slot.attempt)
	}

	async fn fail(&self, attempt: u64, err: AuthError) -> AuthError {
		let mut slot = self.slot.lock().await;
		if slot.attempt == attempt && slot.state.is_pending() {
			slot.state = SessionState::SignedOut;
		}
		err
	}

	async fn commit(&self, attempt: u64, user: User, profile: Profile) -> Result<(), AuthError> {
		let mut slot = self.slot.lock().await;
		if slot.attempt != attempt || !slot.state.is_pending() {
			log::debug!("sign-in attempt #{} superseded by #{}", attempt, slot.attempt);
			return Err(AuthError::Superseded);
		}
		slot.state = SessionState::SignedIn;
		slot.user = Some(user);
		slot.profile = Some(profile);
		Ok(())
	}

	/// Mocked: any non-empty credential pair signs in. Unknown emails get a fresh identity.
	pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
		if email.trim().is_empty() || password.is_empty() {
			return Err(AuthError::InvalidCredentials);
		}
		let attempt = self.begin(SessionState::SigningIn).await?;

		let user = match self.store.find_user_by_email(email).await {
			Some(user) => user,
			None => {
				let user = User::new(email, UserMetadata::default());
				if self.store.insert_user(user.clone()).await {
					user
				} else {
					match self.store.find_user_by_email(email).await {
						Some(existing) => existing,
						None => return Err(self.fail(attempt, AuthError::AccountNotFound).await),
					}
				}
			}
		};
		let profile = self.profile_for(&user).await;
		self.commit(attempt, user.clone(), profile).await?;

		log::info!("user {} signed in", user.id);
		self.notify(SessionEvent::SignedIn(user.clone()));
		Ok(user)
	}

	/// Validates every field first; failures there never touch the session state.
	pub async fn sign_up(&self, email: &str, password: &str, fields: SignUpFields) -> Result<User, AuthError> {
		validation::validate_sign_up(email, password, &fields)?;
		let attempt = self.begin(SessionState::SigningUp).await?;

		let metadata = UserMetadata {
			first_name: fields.first_name.trim().to_owned(),
			last_name: fields.last_name.trim().to_owned(),
			phone: fields.phone.map(|p| p.trim().to_owned()).filter(|p| !p.is_empty()),
		};
		let user = User::new(email, metadata);
		if !self.store.insert_user(user.clone()).await {
			return Err(self.fail(attempt, AuthError::EmailTaken).await);
		}
		let profile = Profile::from_user(&user);
		self.store.upsert_profile(profile.clone()).await;
		self.commit(attempt, user.clone(), profile).await?;

		log::info!("user {} signed up", user.id);
		self.notify(SessionEvent::SignedUp(user.clone()));
		Ok(user)
	}

	/// Clears the session. Calling it while signed out does nothing.
	pub async fn sign_out(&self) {
		let signed_out = {
			let mut slot = self.slot.lock().await;
			match slot.state {
				SessionState::SignedOut => return,
				SessionState::SigningIn | SessionState::SigningUp => {
					// cancels the pending attempt
					slot.attempt += 1;
					slot.state = SessionState::SignedOut;
					None
				}
				SessionState::SignedIn | SessionState::SigningOut => {
					slot.profile = None;
					let user = slot.user.take();
					slot.state = SessionState::SignedOut;
					user
				}
			}
		};
		if let Some(user) = signed_out {
			log::info!("user {} signed out", user.id);
			self.notify(SessionEvent::SignedOut);
		}
	}

	/// Stored profile, or a new one built from the user's metadata when none exists yet.
	pub async fn resolve_profile(&self, user_id: Uuid) -> Result<Profile, AuthError> {
		let session_user = self.current_user().await.filter(|u| u.id == user_id);
		let user = match session_user {
			Some(user) => user,
			None => self.store.find_user(user_id).await.ok_or(AuthError::AccountNotFound)?,
		};
		let profile = self.profile_for(&user).await;

		let mut slot = self.slot.lock().await;
		if slot.user.as_ref().is_some_and(|u| u.id == user_id) {
			slot.profile = Some(profile.clone());
		}
		Ok(profile)
	}

	async fn profile_for(&self, user: &User) -> Profile {
		match self.store.get_profile(user.id).await {
			Some(profile) => profile,
			None => {
				log::debug!("creating profile for user {}", user.id);
				self.store.insert_profile_if_absent(Profile::from_user(user)).await
			}
		}
	}

	/// Nothing is written unless the same user is still signed in.
	pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile, AuthError> {
		validation::validate_profile_update(&update)?;

		let user = self.current_user().await.ok_or(AuthError::NotSignedIn)?;
		let mut profile = self.profile_for(&user).await;
		profile.apply(update);

		{
			// check and write under one lock
			let mut slot = self.slot.lock().await;
			if !slot.user.as_ref().is_some_and(|u| u.id == user.id) {
				return Err(AuthError::NotSignedIn);
			}
			self.store.upsert_profile(profile.clone()).await;
			slot.profile = Some(profile.clone());
		}
		self.notify(SessionEvent::ProfileUpdated(profile.clone()));
		Ok(profile)
	}

	/// Checks the email format before contacting the store.
	pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
		validation::validate_email(email)?;
		self.store.request_password_reset(email).await;
		log::info!("password reset requested");
		Ok(())
	}

	/// Ends the application session.
	pub async fn teardown(&self) {
		self.sign_out().await;
	}
}
