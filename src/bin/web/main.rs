use std::{error::Error, net::SocketAddr, str::FromStr};

use axum::http::{header, HeaderName, HeaderValue, Method};

use messages::{
	adapters::repositories::message_repository::MessageRepository,
	common::{middleware_identity::USER_ID_HEADER, pagination::PAGINATION},
	dependencies::{config, connection_pool},
	routes::{create_routes, AppState},
};
use tower_http::{
	cors::{AllowOrigin, CorsLayer},
	trace::TraceLayer,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	dotenv::dotenv().ok();
	let config = config()?;

	// ! Tracing
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			// axum logs rejections from built-in extractors with the `axum::rejection`
			// target, at `TRACE` level. `axum::rejection=trace` enables showing those events
			format!("messages={level},tower_http={level},axum::rejection=trace", level = config.log_level).into()
		}))
		.with(tracing_subscriber::fmt::layer())
		.init();

	// ! Connection
	tracing::info!("Connections Are Being Pooled...");
	let pool = connection_pool().await?;

	let allowed_origins = config.allowed_origins().map(HeaderValue::from_str).collect::<Result<Vec<_>, _>>()?;

	let app = create_routes(AppState::<MessageRepository>::new(pool.clone()))
		.layer(
			CorsLayer::new()
				.allow_origin(AllowOrigin::list(allowed_origins))
				.allow_methods([Method::GET, Method::POST])
				.allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
				.expose_headers([HeaderName::from_static(PAGINATION), header::LOCATION]),
		)
		.layer(TraceLayer::new_for_http());

	let addr = SocketAddr::from_str(&config.server_ip_port)?;
	tracing::info!("Start Web Server on {}...", addr);
	axum::Server::bind(&addr).serve(app.into_make_service()).await?;
	Ok(())
}
