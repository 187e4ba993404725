//! Authoritative minesweeper engine behind the mine-web client.
//!
//! The engine lives in [`data`] and [`logic`]; [`routes`] exposes it over
//! HTTP as the `start`, `reveal` and `flag` actions, plus a `hint` helper.

use std::sync::Arc;

use dashmap::DashMap;
use rocket::{Build, Rocket, catchers, routes};
use tracing::{error, info};

pub mod cleanup;
pub mod config;
pub mod cors;
pub mod data;
pub mod error;
pub mod logic;
pub mod rate_limit;
pub mod routes;

use crate::{
    config::Settings,
    cors::create_cors,
    logic::Sessions,
    rate_limit::create_rate_limiter,
    routes::{
        default_catcher, difficulties, flag_cell, game_state, hint, reveal_cell, start_game,
    },
};

/// Assembles the server with empty session storage.
pub fn build_rocket(settings: Settings) -> Rocket<Build> {
    let sessions: Sessions = Arc::new(DashMap::new());
    let rate_limiter = create_rate_limiter();

    info!("📊 Initialized session storage and rate limiter");

    let rocket = rocket::build()
        .manage(sessions)
        .manage(rate_limiter)
        .mount(
            "/",
            routes![
                start_game,
                reveal_cell,
                flag_cell,
                game_state,
                hint,
                difficulties
            ],
        )
        .register("/", catchers![default_catcher]);

    let rocket = match create_cors(&settings.cors_allowed_origins) {
        Ok(cors) => rocket.attach(cors),
        Err(e) => {
            error!("Invalid CORS configuration, serving without CORS: {}", e);
            rocket
        }
    };

    rocket.manage(settings)
}
