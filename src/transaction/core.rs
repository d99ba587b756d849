//! Defines the core data models and database queries for transactions.

use rusqlite::{
    Connection, Row, ToSql, named_params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, auth::UserID, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// The location recorded when the user does not give one.
pub const DEFAULT_LOCATION: &str = "Unknown";

/// How a transaction was paid.
#[derive(async_graphql::Enum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    /// Paid with notes and coins.
    Cash,
    /// Paid with a debit or credit card.
    Card,
}

impl PaymentType {
    /// The lowercase name stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Card => "card",
        }
    }
}

impl ToSql for PaymentType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PaymentType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "cash" => Ok(PaymentType::Cash),
            "card" => Ok(PaymentType::Card),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the user that owns the transaction.
    pub user_id: UserID,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// The label the transaction is grouped under, e.g. "saving", "expense".
    pub category: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
    /// Where the transaction happened.
    pub location: String,
    /// How the transaction was paid.
    pub payment_type: PaymentType,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: f64,
        date: Date,
        description: &str,
        category: &str,
        payment_type: PaymentType,
    ) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            description: description.to_owned(),
            category: category.to_owned(),
            location: None,
            payment_type,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The builder has no owner field: the owner is passed separately to
/// [create_transaction] so that it always comes from the authenticated caller.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income/credits, negative values represent
    /// expenses/debits.
    pub amount: f64,

    /// The date when the transaction occurred.
    pub date: Date,

    /// A human-readable description of the transaction.
    ///
    /// # Examples
    /// - `"Salary - January 2025"`
    /// - `"Starbucks #1234 - Downtown"`
    pub description: String,

    /// The category label. Stored exactly as given.
    pub category: String,

    /// Where the transaction happened. Defaults to [DEFAULT_LOCATION].
    pub location: Option<String>,

    /// How the transaction was paid.
    pub payment_type: PaymentType,
}

impl TransactionBuilder {
    /// Set the location for the transaction.
    pub fn location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }
}

/// Changes to apply to an existing transaction.
///
/// Fields set to `None` are left unchanged.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct TransactionUpdate {
    pub amount: Option<f64>,
    pub date: Option<Date>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub payment_type: Option<PaymentType>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str =
    "id, user_id, amount, category, description, date, location, payment_type";

/// Create a new transaction owned by `user_id` in the database from a builder.
///
/// # Errors
/// This function will return a [Error::SqlError] if `user_id` does not refer
/// to a registered user or there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let location = builder
        .location
        .map(location_or_default)
        .unwrap_or_else(|| DEFAULT_LOCATION.to_owned());

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, amount, category, description, date, location, payment_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                builder.amount,
                builder.category,
                builder.description,
                builder.date,
                location,
                builder.payment_type,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`, whoever owns it.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all transactions owned by `user_id`, ordered by ID.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions_by_user(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE user_id = :user_id ORDER BY id"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Use [DEFAULT_LOCATION] in place of a blank location.
fn location_or_default(location: String) -> String {
    if location.trim().is_empty() {
        DEFAULT_LOCATION.to_owned()
    } else {
        location
    }
}

/// Apply `update` to the transaction with `id` owned by `user_id`.
///
/// A blank location is stored as [DEFAULT_LOCATION], the same as on creation.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFoundOrUnauthorized] if no transaction has both `id` and `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "UPDATE \"transaction\" SET
                amount = COALESCE(:amount, amount),
                category = COALESCE(:category, category),
                description = COALESCE(:description, description),
                date = COALESCE(:date, date),
                location = COALESCE(:location, location),
                payment_type = COALESCE(:payment_type, payment_type)
             WHERE id = :id AND user_id = :user_id
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            named_params! {
                ":amount": update.amount,
                ":category": update.category,
                ":description": update.description,
                ":date": update.date,
                ":location": update.location.map(location_or_default),
                ":payment_type": update.payment_type,
                ":id": id,
                ":user_id": user_id.as_i64(),
            },
            map_transaction_row,
        )
        .map_err(map_owned_row_error)
}

/// Delete the transaction with `id` owned by `user_id`, returning the deleted row.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFoundOrUnauthorized] if no transaction has both `id` and `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "DELETE FROM \"transaction\" WHERE id = :id AND user_id = :user_id
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(map_owned_row_error)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                amount REAL NOT NULL,
                category TEXT NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                location TEXT NOT NULL,
                payment_type TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Every query filters by owner.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user ON \"transaction\"(user_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: row.get(2)?,
        category: row.get(3)?,
        description: row.get(4)?,
        date: row.get(5)?,
        location: row.get(6)?,
        payment_type: row.get(7)?,
    })
}

fn map_owned_row_error(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::NotFoundOrUnauthorized,
        error => error.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod database_tests {
    use time::macros::date;

    use crate::{
        Error,
        auth::UserID,
        transaction::{
            PaymentType, Transaction, TransactionUpdate, count_transactions, create_transaction,
            delete_transaction, get_transaction, get_transactions_by_user, update_transaction,
        },
    };

    use super::{
        DEFAULT_LOCATION,
        test_utils::{get_test_connection, insert_test_user},
    };

    fn groceries() -> super::TransactionBuilder {
        Transaction::build(
            -45.5,
            date!(2025 - 10 - 05),
            "Groceries",
            "expense",
            PaymentType::Card,
        )
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let user = insert_test_user("alice", &conn);

        let transaction = create_transaction(user.id, groceries(), &conn).unwrap();

        assert_eq!(transaction.user_id, user.id);
        assert_eq!(transaction.amount, -45.5);
        assert_eq!(transaction.category, "expense");
        assert_eq!(transaction.location, DEFAULT_LOCATION);
        assert_eq!(transaction.payment_type, PaymentType::Card);
    }

    #[test]
    fn create_keeps_given_location() {
        let conn = get_test_connection();
        let user = insert_test_user("alice", &conn);

        let transaction = create_transaction(
            user.id,
            groceries().location(Some("Wellington".to_owned())),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.location, "Wellington");
    }

    #[test]
    fn create_fails_for_missing_user() {
        let conn = get_test_connection();

        let result = create_transaction(UserID::new(42), groceries(), &conn);

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn get_returns_transaction_of_any_owner() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let created = create_transaction(alice.id, groceries(), &conn).unwrap();

        let got = get_transaction(created.id, &conn).unwrap();

        assert_eq!(got, created);
        assert_eq!(get_transaction(created.id + 1, &conn), Err(Error::NotFound));
    }

    #[test]
    fn get_by_user_only_returns_owned_transactions() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let alices = create_transaction(alice.id, groceries(), &conn).unwrap();
        create_transaction(bob.id, groceries(), &conn).unwrap();

        let got = get_transactions_by_user(alice.id, &conn).unwrap();

        assert_eq!(got, vec![alices]);
    }

    #[test]
    fn update_applies_only_given_fields() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let created = create_transaction(alice.id, groceries(), &conn).unwrap();

        let updated = update_transaction(
            created.id,
            alice.id,
            TransactionUpdate {
                amount: Some(-12.0),
                payment_type: Some(PaymentType::Cash),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(
            updated,
            Transaction {
                amount: -12.0,
                payment_type: PaymentType::Cash,
                ..created
            }
        );
    }

    #[test]
    fn update_replaces_blank_location_with_default() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let created = create_transaction(
            alice.id,
            groceries().location(Some("Wellington".to_owned())),
            &conn,
        )
        .unwrap();

        let updated = update_transaction(
            created.id,
            alice.id,
            TransactionUpdate {
                location: Some("  ".to_owned()),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(updated.location, DEFAULT_LOCATION);
    }

    #[test]
    fn update_fails_for_other_owner() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let created = create_transaction(alice.id, groceries(), &conn).unwrap();

        let result = update_transaction(
            created.id,
            bob.id,
            TransactionUpdate {
                amount: Some(1_000_000.0),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(result, Err(Error::NotFoundOrUnauthorized));
        assert_eq!(get_transaction(created.id, &conn).unwrap(), created);
    }

    #[test]
    fn delete_returns_snapshot_then_fails_on_repeat() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let created = create_transaction(alice.id, groceries(), &conn).unwrap();

        let deleted = delete_transaction(created.id, alice.id, &conn).unwrap();
        let repeat = delete_transaction(created.id, alice.id, &conn);

        assert_eq!(deleted, created);
        assert_eq!(repeat, Err(Error::NotFoundOrUnauthorized));
        assert_eq!(count_transactions(&conn).unwrap(), 0);
    }

    #[test]
    fn delete_fails_for_other_owner() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        let created = create_transaction(alice.id, groceries(), &conn).unwrap();

        let result = delete_transaction(created.id, bob.id, &conn);

        assert_eq!(result, Err(Error::NotFoundOrUnauthorized));
        assert_eq!(count_transactions(&conn).unwrap(), 1);
    }
}
