use axum::{
    Json, Router,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
};
use serde::Serialize;

use std::sync::Arc;

use crate::{ServerError, drinks, postpaid, prepaid, statistics};
use engine::{Engine, MoneyCents, Principal};

static REMOTE_USER_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-remote-user");
static REMOTE_GROUPS_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-remote-groups");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    /// Price charged by `/drink` when the request names none.
    pub drink_cost: MoneyCents,
}

/// `TypedHeader` for the username the identity-aware proxy injects.
///
/// The login flow itself lives outside this service; by the time a request
/// arrives here the proxy has already authenticated it and stamped
/// "x-remote-user" / "x-remote-groups" onto it.
#[derive(Debug)]
pub struct RemoteUser(pub String);

impl Header for RemoteUser {
    fn name() -> &'static axum::http::HeaderName {
        &REMOTE_USER_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AxumError::invalid());
        }

        Ok(RemoteUser(trimmed.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-remote-user header"),
        }
    }
}

/// `TypedHeader` for the comma-separated group list of the proxy.
#[derive(Debug)]
pub struct RemoteGroups(pub Vec<String>);

impl Header for RemoteGroups {
    fn name() -> &'static axum::http::HeaderName {
        &REMOTE_GROUPS_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let groups = value
            .split(',')
            .map(str::trim)
            .filter(|group| !group.is_empty())
            .map(ToString::to_string)
            .collect();

        Ok(RemoteGroups(groups))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0.join(",")) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-remote-groups header"),
        }
    }
}

/// Builds the principal for routes that accept both authenticated and
/// key-based callers.
pub(crate) fn principal_from(
    user: Option<TypedHeader<RemoteUser>>,
    groups: Option<TypedHeader<RemoteGroups>>,
) -> Option<Principal> {
    let TypedHeader(user) = user?;
    let groups = groups.map(|TypedHeader(g)| g.0).unwrap_or_default();
    Some(Principal::new(user.0, groups))
}

/// Gate for the authenticated routes.
///
/// Browser GETs without an identity bounce to the login flow with a 303;
/// everything else gets a plain 401. On the way through, the username is
/// provisioned as a postpaid record ("created implicitly on first login").
async fn identity(
    user: Option<TypedHeader<RemoteUser>>,
    groups: Option<TypedHeader<RemoteGroups>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let Some(principal) = principal_from(user, groups) else {
        let denial = if request.method() == Method::GET {
            Redirect::to("/login").into_response()
        } else {
            StatusCode::UNAUTHORIZED.into_response()
        };
        return Err(denial);
    };

    state
        .engine
        .ensure_postpaid_user(&principal.username)
        .await
        .map_err(|err| ServerError::from(err).into_response())?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

#[derive(Serialize)]
struct ServiceInfo {
    service: &'static str,
    version: &'static str,
}

async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "matekasse",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/me", get(postpaid::me))
        .route("/add_prepaid_user", post(prepaid::add))
        .route("/add_money_prepaid_user", post(prepaid::top_up))
        .route("/payup", post(postpaid::pay_up))
        .route("/set_money_postpaid", post(postpaid::set_money))
        .route(
            "/toggle_activated_user_postpaid",
            post(postpaid::toggle_activated),
        )
        .route(
            "/toggle_activated_user_prepaid",
            post(prepaid::toggle_activated),
        )
        .route("/del_prepaid_user", post(prepaid::delete))
        .route("/add_drink_type", post(statistics::add_drink_type))
        .route(
            "/set_drink_type_quantity",
            post(statistics::set_drink_type_quantity),
        )
        .route("/stats", get(statistics::get_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), identity))
        .route("/", get(index))
        .route("/drink_types", get(statistics::list_drink_types))
        .route("/drink", post(drinks::drink))
        .route("/revert_drink", post(drinks::revert))
        .with_state(state)
}

pub async fn run(engine: Engine, drink_cost: MoneyCents) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, drink_cost, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    drink_cost: MoneyCents,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        drink_cost,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    drink_cost: MoneyCents,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, drink_cost, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
