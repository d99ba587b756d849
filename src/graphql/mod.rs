//! The GraphQL API: schema construction, the HTTP handlers, and the resolvers.

mod context;
mod error;
mod transaction;
mod user;

use std::sync::{Arc, Mutex};

use async_graphql::{EmptySubscription, MergedObject, Schema, http::GraphiQLSource};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{Extension, extract::State, response::Html};
use rusqlite::Connection;

use crate::{auth::CurrentUser, endpoints};

pub use context::RequestContext;

use transaction::{TransactionMutation, TransactionQuery};
use user::UserQuery;

/// The root query type.
#[derive(MergedObject, Default)]
pub struct Query(TransactionQuery, UserQuery);

/// The root mutation type.
#[derive(MergedObject, Default)]
pub struct Mutation(TransactionMutation);

/// The schema of the GraphQL API.
pub type ExpenseTrackerSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the GraphQL schema over the database behind `db_connection`.
///
/// Each request must be given a [RequestContext] identifying the caller.
pub fn build_schema(db_connection: Arc<Mutex<Connection>>) -> ExpenseTrackerSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(db_connection)
        .finish()
}

/// Execute a GraphQL request on behalf of the caller identified by the auth gateway.
pub async fn graphql_handler(
    State(schema): State<ExpenseTrackerSchema>,
    Extension(current_user): Extension<CurrentUser>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let context = RequestContext::new(current_user.user_id());

    schema.execute(request.into_inner().data(context)).await.into()
}

/// Serve the GraphiQL explorer for the API.
pub async fn get_graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(endpoints::GRAPHQL).finish())
}
