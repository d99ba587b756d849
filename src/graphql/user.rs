//! The `User` GraphQL type and the query for the logged in user.

use async_graphql::{Context, ID, Object, Result};

use crate::{
    Error,
    auth::{Gender, User, get_user_by_id},
    graphql::{context::ContextExt, error::resolver_error},
};

const GET_AUTH_USER_FAILED: &str = "Error getting authenticated user";

#[Object]
impl User {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn username(&self) -> &str {
        &self.username
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn gender(&self) -> Gender {
        self.gender
    }

    /// The URL of the user's avatar image.
    async fn profile_picture(&self) -> &str {
        &self.profile_picture
    }
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The logged in user, or null if nobody is logged in.
    async fn auth_user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let Some(user_id) = ctx.get_user() else {
            return Ok(None);
        };

        ctx.with_connection(|connection| match get_user_by_id(user_id, connection) {
            Ok(user) => Ok(Some(user)),
            Err(Error::NotFound) => Ok(None),
            Err(error) => Err(error),
        })
        .map_err(|error| resolver_error(error, GET_AUTH_USER_FAILED))
    }
}
