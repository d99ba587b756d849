//! A background job that keeps the database in good shape while the server runs.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::Connection;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

use crate::{Error, auth::count_users, transaction::count_transactions};

/// The outcome of one maintenance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceReport {
    /// The number of registered users.
    pub users: usize,
    /// The number of stored transactions.
    pub transactions: u32,
}

/// Let SQLite optimize the database and count the stored rows.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the queries fail.
pub fn run_maintenance(connection: &Connection) -> Result<MaintenanceReport, Error> {
    connection.execute_batch("PRAGMA optimize;")?;

    Ok(MaintenanceReport {
        users: count_users(connection)?,
        transactions: count_transactions(connection)?,
    })
}

fn run_locked_maintenance(db_connection: &Mutex<Connection>) -> Result<MaintenanceReport, Error> {
    let connection = db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    run_maintenance(&connection)
}

/// Run [run_maintenance] every `period`, starting one `period` from now.
///
/// Failures are logged and the job carries on. Abort the returned handle to stop the job.
///
/// # Panics
/// Panics if `period` is zero.
pub fn spawn_maintenance_job(
    db_connection: Arc<Mutex<Connection>>,
    period: Duration,
) -> JoinHandle<()> {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::spawn(async move {
        loop {
            interval.tick().await;

            match run_locked_maintenance(&db_connection) {
                Ok(report) => tracing::info!(
                    "Database maintenance finished: {} users, {} transactions",
                    report.users,
                    report.transactions
                ),
                Err(error) => tracing::error!("Database maintenance failed: {error}"),
            }
        }
    })
}
