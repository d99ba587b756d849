//! Authentication middleware that reads the auth cookie, identifies the caller, and extends sessions.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use time::Duration;

use crate::{
    AppState,
    auth::{
        UserID,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
    },
};

/// How far into the future an authenticated request pushes the cookie expiry.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// The identity of whoever sent the request, as established by [auth_gateway].
///
/// Anonymous callers are represented by `CurrentUser(None)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CurrentUser(pub Option<UserID>);

impl CurrentUser {
    /// The logged in user's ID, if any.
    pub fn user_id(&self) -> Option<UserID> {
        self.0
    }
}

/// Middleware function that identifies the caller from the auth cookie.
///
/// Unlike a guard, this never rejects a request. A valid cookie places
/// `CurrentUser(Some(user_id))` into the request extensions and extends the
/// cookie expiry. A missing, invalid or expired cookie places `CurrentUser(None)`.
///
/// **Note**: Route handlers can use the function argument `Extension(current_user): Extension<CurrentUser>` to receive the caller.
pub async fn auth_gateway(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Treating caller as anonymous.");
            parts.extensions.insert(CurrentUser(None));
            return next.run(Request::from_parts(parts, body)).await;
        }
    };

    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(_) => {
            parts.extensions.insert(CurrentUser(None));
            return next.run(Request::from_parts(parts, body)).await;
        }
    };

    tracing::debug!("Authenticated request from user {user_id}");
    parts.extensions.insert(CurrentUser(Some(user_id)));
    let response = next.run(Request::from_parts(parts, body)).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), SESSION_EXTENSION) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}
