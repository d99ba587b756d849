//! Queries and mutations over the caller's transactions, and the `Transaction` GraphQL type.

use async_graphql::{Context, ID, InputObject, Object, Result};
use time::Date;

use crate::{
    Error,
    auth::{User, get_user_by_id},
    database_id::TransactionId,
    graphql::{context::ContextExt, error::resolver_error},
    transaction::{
        CategoryStatistic, PaymentType, Transaction, TransactionUpdate, create_transaction,
        delete_transaction, get_category_statistics, get_transaction, get_transactions_by_user,
        update_transaction,
    },
};

const GET_TRANSACTIONS_FAILED: &str = "Error getting transactions";
const GET_TRANSACTION_FAILED: &str = "Error getting transaction";
const GET_CATEGORY_STATISTICS_FAILED: &str = "Error getting category statistics";
const CREATE_TRANSACTION_FAILED: &str = "Error creating transaction";
const UPDATE_TRANSACTION_FAILED: &str = "Error updating transaction";
const DELETE_TRANSACTION_FAILED: &str = "Error deleting transaction";
const GET_USER_FAILED: &str = "Error getting user";

/// Parse a GraphQL ID into a transaction ID, returning `not_found` if it is not one.
fn parse_transaction_id(id: &ID, not_found: Error) -> Result<TransactionId, Error> {
    id.parse().map_err(|_| not_found)
}

#[Object]
impl Transaction {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    /// The ID of the user that owns the transaction.
    async fn user_id(&self) -> ID {
        ID(self.user_id.to_string())
    }

    async fn amount(&self) -> f64 {
        self.amount
    }

    async fn category(&self) -> &str {
        &self.category
    }

    async fn description(&self) -> &str {
        &self.description
    }

    async fn date(&self) -> Date {
        self.date
    }

    async fn location(&self) -> &str {
        &self.location
    }

    async fn payment_type(&self) -> PaymentType {
        self.payment_type
    }

    /// The user that owns the transaction, or null if they no longer exist.
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        ctx.with_connection(|connection| match get_user_by_id(self.user_id, connection) {
            Ok(user) => Ok(Some(user)),
            Err(Error::NotFound) => Ok(None),
            Err(error) => Err(error),
        })
        .map_err(|error| resolver_error(error, GET_USER_FAILED))
    }
}

/// The fields for a new transaction.
#[derive(InputObject)]
pub struct CreateTransactionInput {
    pub description: String,
    pub payment_type: PaymentType,
    pub category: String,
    pub amount: f64,
    /// Defaults to "Unknown".
    pub location: Option<String>,
    pub date: Date,
    /// Ignored: the owner is always the logged in user.
    pub user_id: Option<ID>,
}

/// The transaction to update and the fields to change. Omitted fields are left unchanged.
#[derive(InputObject)]
pub struct UpdateTransactionInput {
    pub transaction_id: ID,
    pub description: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub location: Option<String>,
    pub date: Option<Date>,
}

impl From<UpdateTransactionInput> for TransactionUpdate {
    fn from(input: UpdateTransactionInput) -> Self {
        Self {
            amount: input.amount,
            date: input.date,
            description: input.description,
            category: input.category,
            location: input.location,
            payment_type: input.payment_type,
        }
    }
}

#[derive(Default)]
pub struct TransactionQuery;

#[Object]
impl TransactionQuery {
    /// All of the logged in user's transactions.
    async fn transactions(&self, ctx: &Context<'_>) -> Result<Vec<Transaction>> {
        let user_id = ctx
            .require_user()
            .map_err(|error| resolver_error(error, GET_TRANSACTIONS_FAILED))?;

        ctx.with_connection(|connection| get_transactions_by_user(user_id, connection))
            .map_err(|error| resolver_error(error, GET_TRANSACTIONS_FAILED))
    }

    /// A single transaction by its ID.
    ///
    /// This lookup does not check who owns the transaction.
    async fn transaction(&self, ctx: &Context<'_>, transaction_id: ID) -> Result<Transaction> {
        parse_transaction_id(&transaction_id, Error::NotFound)
            .and_then(|id| ctx.with_connection(|connection| get_transaction(id, connection)))
            .map_err(|error| resolver_error(error, GET_TRANSACTION_FAILED))
    }

    /// The total amount of the logged in user's transactions in each category.
    async fn category_statistics(&self, ctx: &Context<'_>) -> Result<Vec<CategoryStatistic>> {
        let user_id = ctx
            .require_user()
            .map_err(|error| resolver_error(error, GET_CATEGORY_STATISTICS_FAILED))?;

        ctx.with_connection(|connection| get_category_statistics(user_id, connection))
            .map_err(|error| resolver_error(error, GET_CATEGORY_STATISTICS_FAILED))
    }
}

#[derive(Default)]
pub struct TransactionMutation;

#[Object]
impl TransactionMutation {
    /// Record a new transaction owned by the logged in user.
    async fn create_transaction(
        &self,
        ctx: &Context<'_>,
        input: CreateTransactionInput,
    ) -> Result<Transaction> {
        let user_id = ctx
            .require_user()
            .map_err(|error| resolver_error(error, CREATE_TRANSACTION_FAILED))?;

        if let Some(requested_owner) = &input.user_id {
            tracing::debug!(
                "Ignoring owner {} requested by user {user_id}",
                requested_owner.as_str()
            );
        }

        let builder = Transaction::build(
            input.amount,
            input.date,
            &input.description,
            &input.category,
            input.payment_type,
        )
        .location(input.location);

        let transaction = ctx
            .with_connection(|connection| create_transaction(user_id, builder, connection))
            .map_err(|error| resolver_error(error, CREATE_TRANSACTION_FAILED))?;

        tracing::info!("User {user_id} created transaction {}", transaction.id);

        Ok(transaction)
    }

    /// Change a transaction owned by the logged in user.
    async fn update_transaction(
        &self,
        ctx: &Context<'_>,
        input: UpdateTransactionInput,
    ) -> Result<Transaction> {
        let user_id = ctx
            .require_user()
            .map_err(|error| resolver_error(error, UPDATE_TRANSACTION_FAILED))?;

        parse_transaction_id(&input.transaction_id, Error::NotFoundOrUnauthorized)
            .and_then(|id| {
                ctx.with_connection(|connection| {
                    update_transaction(id, user_id, input.into(), connection)
                })
            })
            .map_err(|error| resolver_error(error, UPDATE_TRANSACTION_FAILED))
    }

    /// Delete a transaction owned by the logged in user, returning what was deleted.
    async fn delete_transaction(
        &self,
        ctx: &Context<'_>,
        transaction_id: ID,
    ) -> Result<Transaction> {
        let user_id = ctx
            .require_user()
            .map_err(|error| resolver_error(error, DELETE_TRANSACTION_FAILED))?;

        let transaction = parse_transaction_id(&transaction_id, Error::NotFoundOrUnauthorized)
            .and_then(|id| {
                ctx.with_connection(|connection| delete_transaction(id, user_id, connection))
            })
            .map_err(|error| resolver_error(error, DELETE_TRANSACTION_FAILED))?;

        tracing::info!("User {user_id} deleted transaction {}", transaction.id);

        Ok(transaction)
    }
}

