//! Translation of Diesel failures into [`StoreError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::StoreError;

/// Map a Diesel error raised while running `operation`.
///
/// Unique violations carry the constraint name so services can tell which
/// key collided. Foreign key violations mean the row is still referenced.
pub(crate) fn map_diesel_error(error: DieselError, operation: &str) -> StoreError {
    match error {
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            debug!(?kind, message = info.message(), ?constraint, %operation, "diesel operation failed");
            match kind {
                DatabaseErrorKind::UniqueViolation => {
                    StoreError::duplicate(constraint.unwrap_or_else(|| operation.to_owned()))
                }
                DatabaseErrorKind::ForeignKeyViolation => {
                    StoreError::in_use(constraint.unwrap_or_else(|| operation.to_owned()))
                }
                DatabaseErrorKind::ClosedConnection => {
                    StoreError::connection(format!("{operation}: connection closed"))
                }
                _ => StoreError::query(format!("{operation}: {}", info.message())),
            }
        }
        other => {
            debug!(error = %other, %operation, "diesel operation failed");
            StoreError::query(format!("{operation}: {other}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug)]
    struct Info {
        constraint: Option<&'static str>,
    }

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "violation"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            self.constraint
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind, constraint: Option<&'static str>) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info { constraint }))
    }

    #[rstest]
    fn unique_violation_names_the_constraint() {
        let err = map_diesel_error(
            database_error(
                DatabaseErrorKind::UniqueViolation,
                Some("clients_owner_id_name_key"),
            ),
            "insert client",
        );
        assert_eq!(err, StoreError::duplicate("clients_owner_id_name_key"));
    }

    #[rstest]
    fn foreign_key_violation_is_in_use() {
        let err = map_diesel_error(
            database_error(DatabaseErrorKind::ForeignKeyViolation, None),
            "delete client",
        );
        assert_eq!(err, StoreError::in_use("delete client"));
    }

    #[rstest]
    #[case(database_error(DatabaseErrorKind::ClosedConnection, None), true)]
    #[case(DieselError::NotFound, false)]
    #[case(database_error(DatabaseErrorKind::SerializationFailure, None), false)]
    fn connection_loss_is_distinguished(#[case] error: DieselError, #[case] connection: bool) {
        let mapped = map_diesel_error(error, "find user");
        assert_eq!(matches!(mapped, StoreError::Connection { .. }), connection);
    }
}
