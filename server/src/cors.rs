use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use tracing::info;

use crate::routes::SESSION_HEADER;

pub fn create_cors(allowed_origins: &[String]) -> Result<rocket_cors::Cors, rocket_cors::Error> {
    info!("CORS allowed origins: {:?}", allowed_origins);

    CorsOptions {
        allowed_origins: AllowedOrigins::some_exact(allowed_origins),
        allowed_methods: vec![Method::Get, Method::Post, Method::Options]
            .into_iter()
            .map(|m| m.into())
            .collect(),
        allowed_headers: AllowedHeaders::some(&["Accept", "Content-Type", SESSION_HEADER]),
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()
}
