//! The URIs of the server's endpoints.

/// The GraphQL API. `GET` serves the GraphiQL explorer.
pub const GRAPHQL: &str = "/graphql";
/// The route for signing up a new user.
pub const USERS: &str = "/api/users";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
