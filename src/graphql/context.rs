//! The per-request context handed to every resolver.

use std::sync::{Arc, Mutex};

use async_graphql::Context;
use rusqlite::Connection;

use crate::{Error, auth::UserID};

/// Per-request values for the resolvers, populated once by the auth gateway.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestContext {
    user: Option<UserID>,
}

impl RequestContext {
    /// Create a context for a request sent by `user`, or an anonymous caller if `None`.
    pub fn new(user: Option<UserID>) -> Self {
        Self { user }
    }

    /// The authenticated caller, if any.
    pub fn get_user(&self) -> Option<UserID> {
        self.user
    }
}

/// Accessors for the data the schema and the request make available to resolvers.
pub(crate) trait ContextExt {
    /// The authenticated caller, if any.
    fn get_user(&self) -> Option<UserID>;

    /// The authenticated caller.
    ///
    /// # Errors
    /// Returns [Error::Unauthorized] for anonymous callers.
    fn require_user(&self) -> Result<UserID, Error> {
        self.get_user().ok_or(Error::Unauthorized)
    }

    /// Run `query` with the database connection locked.
    fn with_connection<T>(
        &self,
        query: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error>;
}

impl ContextExt for Context<'_> {
    fn get_user(&self) -> Option<UserID> {
        self.data_opt::<RequestContext>()
            .and_then(RequestContext::get_user)
    }

    fn with_connection<T>(
        &self,
        query: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let connection = self
            .data_unchecked::<Arc<Mutex<Connection>>>()
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        query(&connection)
    }
}
