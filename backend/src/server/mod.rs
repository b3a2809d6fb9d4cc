//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServiceSettings};

use state_builders::{Services, build_services};

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use carelink::Trace;
#[cfg(debug_assertions)]
use carelink::doc::ApiDoc;
use carelink::inbound::http::health::{HealthState, live, ready};
use carelink::inbound::http::state::HttpState;
use carelink::inbound::http::{alerts, care_graph, falls, medical_history, users};
use carelink::seed::{load_seed_file, seed_accounts};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Largest raw document body accepted by the upload endpoint.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn api_routes(cfg: &mut web::ServiceConfig) {
    users::configure(cfg);
    care_graph::configure(cfg);
    medical_history::configure(cfg);
    alerts::configure(cfg);
    falls::configure(cfg);
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .configure(api_routes);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Provision the accounts listed in the configured seed file, if any.
async fn apply_seed_file(config: &ServerConfig, services: &Services) -> std::io::Result<()> {
    let Some(path) = config.settings.seed_file.as_deref() else {
        info!(reason = "not configured", "account seeding skipped");
        return Ok(());
    };
    let accounts = load_seed_file(path).map_err(std::io::Error::other)?;
    let created = seed_accounts(&services.accounts, accounts)
        .await
        .map_err(std::io::Error::other)?;
    info!(path = %path.display(), created, "account seeding applied");
    Ok(())
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Builds the services, applies the seed file, then binds the listener.
/// Readiness is flagged once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when adapter setup, seeding, binding the
/// socket, or starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let services = build_services(&config.settings)?;
    apply_seed_file(&config, &services).await?;

    let server_health_state = health_state.clone();
    let http_state = web::Data::new(services.http_state);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        settings: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, "listening");
    health_state.mark_ready();
    Ok(server)
}
