//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, web};

use crate::domain::{Actor, Error, Role, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Extract the session cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Route that signs in as `{role}/{id}` without credentials.
async fn act_as(session: SessionContext, path: web::Path<(Role, String)>) -> Result<HttpResponse, Error> {
    let (role, raw_id) = path.into_inner();
    let id = UserId::parse(&raw_id).map_err(|err| Error::validation(err.to_string()))?;
    session.persist_actor(&Actor::new(id, role))?;
    Ok(HttpResponse::NoContent().finish())
}

/// App with session middleware, `state`, the `/test/act-as/{role}/{id}` route,
/// and `/api/v1` routes registered by `configure`.
pub fn test_app(
    state: HttpState,
    configure: impl FnOnce(&mut web::ServiceConfig),
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route("/test/act-as/{role}/{id}", web::post().to(act_as))
        .service(web::scope("/api/v1").configure(configure))
}

/// Request path that signs in as `actor` inside a [`test_app`].
pub fn act_as_uri(actor: &Actor) -> String {
    format!("/test/act-as/{}/{}", actor.role, actor.id)
}

/// Sign in as `actor` and return the session cookie.
pub async fn sign_in<S, B>(app: &S, actor: &Actor) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse<B>,
            Error = actix_web::Error,
        >,
{
    let res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri(&act_as_uri(actor))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "act-as failed: {}", res.status());
    session_cookie(&res)
}
