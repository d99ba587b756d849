//! Per-category totals of a user's transactions.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::{
    Error,
    auth::UserID,
    transaction::{Transaction, get_transactions_by_user},
};

/// The sum of the amounts of a user's transactions with the same category label.
#[derive(async_graphql::SimpleObject, Debug, Clone, PartialEq)]
pub struct CategoryStatistic {
    /// The category label, exactly as stored on the transactions.
    pub category: String,
    /// The sum of the amounts of the transactions in the category.
    pub total_amount: f64,
}

/// Sum transaction amounts by category label.
///
/// Labels are compared as-is, so "Food" and "food " are separate categories.
/// The order of the returned statistics is unspecified.
pub fn aggregate_by_category(transactions: &[Transaction]) -> Vec<CategoryStatistic> {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for transaction in transactions {
        *totals.entry(transaction.category.as_str()).or_insert(0.0) += transaction.amount;
    }

    totals
        .into_iter()
        .map(|(category, total_amount)| CategoryStatistic {
            category: category.to_owned(),
            total_amount,
        })
        .collect()
}

/// Get the category totals of all the transactions owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_category_statistics(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryStatistic>, Error> {
    let transactions = get_transactions_by_user(user_id, connection)?;

    Ok(aggregate_by_category(&transactions))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use time::macros::date;

    use crate::{
        auth::UserID,
        transaction::{
            PaymentType, Transaction, create_transaction,
            test_utils::{get_test_connection, insert_test_user},
        },
    };

    use super::{CategoryStatistic, aggregate_by_category, get_category_statistics};

    fn transaction(category: &str, amount: f64) -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            amount,
            category: category.to_owned(),
            description: String::new(),
            date: date!(2025 - 01 - 01),
            location: "Unknown".to_owned(),
            payment_type: PaymentType::Cash,
        }
    }

    fn as_map(statistics: Vec<CategoryStatistic>) -> HashMap<String, f64> {
        statistics
            .into_iter()
            .map(|statistic| (statistic.category, statistic.total_amount))
            .collect()
    }

    #[test]
    fn sums_amounts_per_category() {
        let transactions = [
            transaction("food", 10.0),
            transaction("food", 5.0),
            transaction("rent", 100.0),
        ];

        let got = as_map(aggregate_by_category(&transactions));

        let want = HashMap::from([("food".to_owned(), 15.0), ("rent".to_owned(), 100.0)]);
        assert_eq!(got, want);
    }

    #[test]
    fn does_not_normalise_labels() {
        let transactions = [
            transaction("food", 1.0),
            transaction("Food", 2.0),
            transaction("food ", 4.0),
        ];

        let got = aggregate_by_category(&transactions);

        assert_eq!(got.len(), 3);
    }

    #[test]
    fn empty_input_gives_no_statistics() {
        assert!(aggregate_by_category(&[]).is_empty());
    }

    #[test]
    fn only_counts_the_users_own_transactions() {
        let conn = get_test_connection();
        let alice = insert_test_user("alice", &conn);
        let bob = insert_test_user("bob", &conn);
        for (user_id, category, amount) in [
            (alice.id, "food", 10.0),
            (alice.id, "food", 5.0),
            (alice.id, "rent", 100.0),
            (bob.id, "food", 1000.0),
        ] {
            create_transaction(
                user_id,
                Transaction::build(amount, date!(2025 - 01 - 01), "", category, PaymentType::Card),
                &conn,
            )
            .unwrap();
        }

        let got = as_map(get_category_statistics(alice.id, &conn).unwrap());

        let want = HashMap::from([("food".to_owned(), 15.0), ("rent".to_owned(), 100.0)]);
        assert_eq!(got, want);
    }
}
