use crate::components::remembered::TomlFileStore;
use crate::components::rsvp::InMemoryRsvpStore;
use crate::config::Config;
use crate::context::InviteContext;
use crate::error::Error;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Wire the optional collaborators the config asks for
pub async fn build_context(config: Config) -> InviteContext {
    let redis_url = config.redis_url.clone();
    let remembered_path = config.remembered_path.clone();
    let mut ctx = InviteContext::new(config);

    match redis_url {
        Some(url) => ctx = with_rsvp(ctx, &url),
        None => info!("REDIS_URL not set, RSVP is disabled"),
    }

    if let Some(path) = remembered_path {
        info!("Remembering attendees in {}", path.display());
        ctx = ctx.with_remembered_store(Arc::new(TomlFileStore::new(path)));
    }

    ctx
}

#[cfg(feature = "rsvp")]
fn with_rsvp(ctx: InviteContext, url: &str) -> InviteContext {
    match crate::components::redis_service::RedisActor::new(url) {
        Ok((mut actor, handle)) => {
            tokio::spawn(async move {
                actor.run().await;
            });
            info!("RSVP responses stored in Redis");
            ctx.with_redis(handle)
        }
        Err(e) => {
            error!("Failed to start Redis actor: {:?}", e);
            warn!("Falling back to in-memory RSVP storage");
            ctx.with_rsvp_store(Arc::new(InMemoryRsvpStore::new()))
        }
    }
}

#[cfg(not(feature = "rsvp"))]
fn with_rsvp(ctx: InviteContext, _url: &str) -> InviteContext {
    warn!("Built without Redis support, RSVP responses are kept in memory");
    ctx.with_rsvp_store(Arc::new(InMemoryRsvpStore::new()))
}

/// HTTP routes of the service
#[cfg(feature = "web-interface")]
pub fn app(ctx: InviteContext) -> axum::Router {
    use crate::handlers;
    use axum::routing::{get, post};
    use tower_http::{cors::CorsLayer, trace::TraceLayer};

    let rsvp_routes = axum::Router::new()
        .route("/rsvp", post(handlers::submit_rsvp_handler))
        .route("/rsvp/{event_id}", get(handlers::list_rsvps_handler))
        .layer(CorsLayer::permissive());

    axum::Router::new()
        .route(
            "/",
            get(handlers::generate_handler).options(handlers::preflight_handler),
        )
        .route("/device", get(handlers::device_handler))
        .route("/invite", get(handlers::invite_handler))
        .route("/health", get(handlers::health_handler))
        .merge(rsvp_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Serve until a termination signal arrives, then stop the collaborators
#[cfg(feature = "web-interface")]
pub async fn serve(ctx: InviteContext) -> miette::Result<()> {
    let addr = format!("{}:{}", ctx.config.bind_addr, ctx.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        Error::Io(e)
    })?;
    info!("Listening on {}", addr);

    let result = axum::serve(listener, app(ctx.clone()))
        .with_graceful_shutdown(crate::shutdown::shutdown_signal())
        .await
        .map_err(Error::Io);

    ctx.shutdown().await;
    info!("Server stopped");

    result.map_err(Into::into)
}
