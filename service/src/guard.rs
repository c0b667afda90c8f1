//! Guards vetoing an [`Employment`] lifecycle operation before any write.

use common::operations::{By, Select};
use derive_more::{Display, Error};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{employment, user, Employment},
    infra::{database, Database},
    read::employment::Active,
};

/// Business rule violation of an [`Employment`] lifecycle operation.
#[derive(Clone, Debug, Display, Error)]
pub enum Conflict {
    /// [`User`] already has an active [`Employment`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` already has an active employment record")]
    ActiveEmploymentExists(#[error(not(source))] user::Id),

    /// Active [`Employment`] cannot be updated except for its status.
    #[display(
        "Cannot update active `Employment(id: {id})` except for status \
         changes, changed fields: {fields:?}"
    )]
    ActiveEmploymentImmutable {
        /// ID of the active [`Employment`].
        id: employment::Id,

        /// [`employment::Field`]s attempted to be changed.
        fields: Vec<employment::Field>,
    },
}

/// Ensures that the [`User`] with the provided ID has no active
/// [`Employment`], ignoring the `exclude`d one.
///
/// Should be called inside the transaction performing the write, once the
/// [`User`] is locked.
///
/// # Errors
///
/// - [`Conflict::ActiveEmploymentExists`] if another active [`Employment`]
///   exists.
/// - If the [`Database`] fails to select the active [`Employment`].
///
/// [`User`]: crate::domain::User
pub async fn ensure_no_active_conflict<Db, E>(
    db: &Db,
    user_id: user::Id,
    exclude: Option<employment::Id>,
) -> Result<(), Traced<E>>
where
    Db: Database<
        Select<By<Option<Active<Employment>>, user::Id>>,
        Ok = Option<Active<Employment>>,
        Err = Traced<database::Error>,
    >,
    E: From<Conflict> + From<database::Error>,
{
    let active = db
        .execute(Select(By::new(user_id)))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?
        .filter(|Active(e)| Some(e.id) != exclude);

    if let Some(Active(existing)) = active {
        log::debug!(
            "`User(id: {user_id})` already has active \
             `Employment(id: {})`",
            existing.id,
        );
        return Err(tracerr::new!(E::from(
            Conflict::ActiveEmploymentExists(user_id)
        )));
    }
    Ok(())
}

/// Ensures that the `existing` [`Employment`] may receive the `proposed`
/// [`employment::Terms`].
///
/// Non-active [`Employment`]s accept any [`employment::Terms`], while active
/// ones accept only identical [`employment::Terms`].
///
/// # Errors
///
/// [`Conflict::ActiveEmploymentImmutable`] if the `existing` [`Employment`]
/// is active and any of its [`employment::Terms`] differs.
pub fn ensure_edit_allowed(
    existing: &Employment,
    proposed: &employment::Terms,
) -> Result<(), Conflict> {
    if !existing.is_active() {
        return Ok(());
    }

    let fields = existing.terms.changed_fields(proposed);
    if fields.is_empty() {
        return Ok(());
    }

    log::debug!(
        "attempted to change {fields:?} of active `Employment(id: {})`",
        existing.id,
    );
    Err(Conflict::ActiveEmploymentImmutable {
        id: existing.id,
        fields,
    })
}

/// Converts a unique violation of the [`ACTIVE_EMPLOYMENT_CONSTRAINT`] into a
/// [`Conflict::ActiveEmploymentExists`] of the [`User`] with the provided ID.
///
/// Any other [`database::Error`] is propagated as is.
///
/// [`ACTIVE_EMPLOYMENT_CONSTRAINT`]: database::ACTIVE_EMPLOYMENT_CONSTRAINT
/// [`User`]: crate::domain::User
pub fn active_constraint<E>(
    user_id: user::Id,
) -> impl FnOnce(Traced<database::Error>) -> Traced<E>
where
    E: From<Conflict> + From<database::Error>,
{
    move |e| {
        let e = e.into_inner();
        let constraint = database::ACTIVE_EMPLOYMENT_CONSTRAINT;
        if e.is_unique_violation(Some(constraint)) {
            log::debug!(
                "`{constraint}` constraint rejected a second active \
                 employment of `User(id: {user_id})`",
            );
            tracerr::new!(E::from(Conflict::ActiveEmploymentExists(user_id)))
        } else {
            tracerr::new!(E::from(e))
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{Date, DateTime};

    use crate::{
        command::create_employment::ExecutionError,
        domain::{
            employment::{self, Field, Position, Status, Terms},
            user, Employment,
        },
        infra::database::{self, memory, ACTIVE_EMPLOYMENT_CONSTRAINT},
    };

    use super::{active_constraint, ensure_edit_allowed, Conflict};

    fn employment(status: Status) -> Employment {
        let date = |s: &str| s.parse::<Date>().unwrap();
        let now = DateTime::now();
        Employment {
            id: employment::Id::new(),
            terms: Terms {
                user_id: user::Id::new(),
                client_id: None,
                position: Position::new("Developer").unwrap(),
                hire_date: date("2023-01-10").coerce(),
                salary: None,
                work_location: None,
                effective_date: date("2023-01-10").coerce(),
                end_date: None,
            },
            status,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    #[test]
    fn active_accepts_identical_terms() {
        let existing = employment(Status::Active);

        assert!(ensure_edit_allowed(&existing, &existing.terms).is_ok());
    }

    #[test]
    fn active_rejects_changed_terms() {
        let existing = employment(Status::Active);
        let mut proposed = existing.terms.clone();
        proposed.position = Position::new("Senior Developer").unwrap();
        proposed.salary = Some("100".parse().unwrap());

        let err = ensure_edit_allowed(&existing, &proposed).unwrap_err();

        assert!(matches!(
            err,
            Conflict::ActiveEmploymentImmutable { id, fields }
                if id == existing.id
                    && fields == [Field::Position, Field::Salary],
        ));
    }

    #[test]
    fn non_active_accepts_any_terms() {
        for status in [Status::Inactive, Status::Terminated] {
            let existing = employment(status);
            let mut proposed = existing.terms.clone();
            proposed.user_id = user::Id::new();
            proposed.position = Position::new("Manager").unwrap();

            assert!(ensure_edit_allowed(&existing, &proposed).is_ok());
        }
    }

    #[test]
    fn active_constraint_violation_becomes_conflict() {
        let user_id = user::Id::new();
        let err = database::Error::from(memory::Error::UniqueViolation(
            ACTIVE_EMPLOYMENT_CONSTRAINT,
        ));

        let err = active_constraint::<ExecutionError>(user_id)(
            tracerr::new!(err),
        );

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Conflict(Conflict::ActiveEmploymentExists(id))
                if id == user_id,
        ));
    }

    #[test]
    fn other_database_errors_pass_through() {
        for err in [
            memory::Error::UniqueViolation("users_pkey"),
            memory::Error::TxFinished,
        ] {
            let err = active_constraint::<ExecutionError>(user::Id::new())(
                tracerr::new!(database::Error::from(err)),
            );

            assert!(matches!(
                err.into_inner(),
                ExecutionError::Db(database::Error::Memory(_)),
            ));
        }
    }
}
