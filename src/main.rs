use car_rental_server::{
	config::Config,
	server::{router, AppState},
	users::session::SessionEvent,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = Config::load()?;
	let addr = config.bind_addr.clone();
	let state = AppState::new(config)?;

	let mut events = state.session.subscribe();
	tokio::spawn(async move {
		while let Ok(event) = events.recv().await {
			match event {
				SessionEvent::SignedIn(user) | SessionEvent::SignedUp(user) => log::debug!("session started for {}", user.email),
				SessionEvent::SignedOut => log::debug!("session ended"),
				SessionEvent::ProfileUpdated(profile) => log::debug!("profile {} updated", profile.user_id),
			}
		}
	});

	let listener = TcpListener::bind(addr.trim()).await?;
	log::info!("listening on {}", listener.local_addr()?);
	axum::serve(listener, router(state.clone()))
		.with_graceful_shutdown(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				log::error!("failed to listen for shutdown signal: {}", e);
			}
		})
		.await?;

	state.session.teardown().await;
	log::info!("server stopped");
	Ok(())
}
