//! Transactions: the model, its database queries, and per-category statistics.

mod core;
mod statistics;

pub use core::{
    DEFAULT_LOCATION, PaymentType, Transaction, TransactionBuilder, TransactionUpdate,
    count_transactions, create_transaction, create_transaction_table, delete_transaction,
    get_transaction, get_transactions_by_user, map_transaction_row, update_transaction,
};
pub use statistics::{CategoryStatistic, aggregate_by_category, get_category_statistics};

#[cfg(test)]
pub(crate) use core::test_utils;
