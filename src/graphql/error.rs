//! Converts application errors into the messages clients see.

use crate::Error;

/// Convert `error` into a GraphQL error.
///
/// Errors the client can act on keep their own message. Anything else is
/// logged and replaced with `failure_message`, so internal details never reach
/// the client.
pub(crate) fn resolver_error(error: Error, failure_message: &'static str) -> async_graphql::Error {
    match error {
        Error::Unauthorized | Error::NotFound | Error::NotFoundOrUnauthorized => {
            tracing::debug!("{failure_message}: {error}");
            async_graphql::Error::new(error.to_string())
        }
        error => {
            tracing::error!("{failure_message}: {error}");
            async_graphql::Error::new(failure_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::resolver_error;

    #[test]
    fn domain_errors_keep_their_message() {
        assert_eq!(
            resolver_error(Error::Unauthorized, "Error getting transactions").message,
            "Unauthorized"
        );
        assert_eq!(
            resolver_error(Error::NotFound, "Error getting transaction").message,
            "Transaction not found"
        );
        assert_eq!(
            resolver_error(Error::NotFoundOrUnauthorized, "Error updating transaction").message,
            "Transaction not found or unauthorized"
        );
    }

    #[test]
    fn internal_errors_are_replaced() {
        let error = resolver_error(
            Error::SqlError(rusqlite::Error::InvalidQuery),
            "Error creating transaction",
        );

        assert_eq!(error.message, "Error creating transaction");
    }
}
