//! Implements a struct that holds the state of the server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{extract::FromRef, http::HeaderValue};
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::DEFAULT_COOKIE_DURATION,
    db::initialize,
    graphql::{ExpenseTrackerSchema, build_schema},
};

/// The origin the frontend dev server is served from by default.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// The state of the server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The directory containing the built frontend, including its `index.html`.
    pub frontend_dir: PathBuf,

    /// The origin allowed to call the GraphQL API with credentials from another site.
    pub cors_origin: HeaderValue,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The GraphQL schema, which shares `db_connection`.
    pub schema: ExpenseTrackerSchema,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        frontend_dir: impl Into<PathBuf>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            frontend_dir: frontend_dir.into(),
            cors_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            schema: build_schema(connection.clone()),
            db_connection: connection,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for ExpenseTrackerSchema {
    fn from_ref(state: &AppState) -> Self {
        state.schema.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
