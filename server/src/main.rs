use mine_web_server::{
    build_rocket, cleanup::start_cleanup_task, config::Settings, logic::Sessions,
    rate_limit::RateLimiter,
};
use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
};
use tracing::{info, warn};

struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Session Cleanup Task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        match (
            rocket.state::<Sessions>(),
            rocket.state::<RateLimiter>(),
            rocket.state::<Settings>(),
        ) {
            (Some(sessions), Some(rate_limiter), Some(settings)) => {
                info!("Starting cleanup task for session management");
                let sessions = sessions.clone();
                let rate_limiter = rate_limiter.clone();
                let interval = settings.cleanup_interval_secs;
                let timeout = settings.inactive_timeout_secs;
                tokio::spawn(async move {
                    start_cleanup_task(sessions, rate_limiter, interval, timeout).await;
                });
            }
            _ => warn!("Failed to get session state for cleanup task"),
        }
        Ok(rocket)
    }
}

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("🚀 Starting mine-web engine server");

    let rocket = build_rocket(Settings::from_env()).attach(CleanupFairing);

    info!("📡 Endpoints: POST /start, POST /reveal, POST /flag, GET /state, GET /hint, GET /difficulties");

    rocket
}
