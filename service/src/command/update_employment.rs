//! [`Command`] for updating an existing [`Employment`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    Date, DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{client, employment, user, Client, Employment, User},
    guard::{self, Conflict},
    infra::{database, Database},
    read::employment::Active,
    Service,
};

use super::Command;

/// [`Command`] for updating an existing [`Employment`].
///
/// Carries the full desired [`employment::Terms`] and [`employment::Status`],
/// not a partial patch.
#[derive(Clone, Debug)]
pub struct UpdateEmployment {
    /// ID of the [`Employment`] to update.
    pub employment_id: employment::Id,

    /// New [`employment::Terms`] of the [`Employment`].
    pub terms: employment::Terms,

    /// New [`employment::Status`] of the [`Employment`].
    pub status: employment::Status,
}

impl<Db> Command<UpdateEmployment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Employment, employment::Id>>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<User, user::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Employment>, employment::Id>>,
            Ok = Option<Employment>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Client>, client::Id>>,
            Ok = Option<Client>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Employment>>, user::Id>>,
            Ok = Option<Active<Employment>>,
            Err = Traced<database::Error>,
        > + Database<Update<Employment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Employment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateEmployment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateEmployment {
            employment_id,
            terms,
            status,
        } = cmd;

        terms
            .validate(Date::today())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Employment`.
        tx.execute(Lock(By::<Employment, _>::new(employment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Option<Employment>, _>::new(employment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EmploymentNotExists(employment_id))
            .map_err(tracerr::wrap!())?;

        guard::ensure_edit_allowed(&existing, &terms)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        if terms.user_id != existing.terms.user_id {
            tx.execute(Select(By::<Option<User>, _>::new(terms.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::UserNotExists(terms.user_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }
        if let Some(client_id) = terms.client_id {
            if terms.client_id != existing.terms.client_id {
                tx.execute(Select(By::<Option<Client>, _>::new(client_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::ClientNotExists(client_id))
                    .map_err(tracerr::wrap!())
                    .map(drop)?;
            }
        }

        let activating =
            status == employment::Status::Active && !existing.is_active();
        if activating {
            // Serialize activations of the same `User`.
            tx.execute(Lock(By::<User, _>::new(terms.user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            guard::ensure_no_active_conflict::<_, E>(
                &tx,
                terms.user_id,
                Some(existing.id),
            )
            .await
            .map_err(tracerr::wrap!())?;
        }

        if existing.terms == terms && existing.status == status {
            log::debug!(
                "`Employment(id: {employment_id})` is unchanged, skipping",
            );
            return Ok(existing);
        }

        let user_id = terms.user_id;
        let employment = Employment {
            terms,
            status,
            updated_at: DateTime::now().coerce(),
            ..existing
        };
        tx.execute(Update(employment.clone()))
            .await
            .map_err(guard::active_constraint::<E>(user_id))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "updated `Employment(id: {employment_id})`: {} -> {status}",
            existing.status,
        );

        Ok(employment)
    }
}

/// Error of [`UpdateEmployment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Client`] with the provided ID does not exist.
    #[display("`Client(id: {_0})` does not exist")]
    ClientNotExists(#[error(not(source))] client::Id),

    /// Lifecycle rule is violated.
    #[display("Employment lifecycle rule violated: {_0}")]
    #[from]
    Conflict(Conflict),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Employment`] with the provided ID does not exist.
    #[display("`Employment(id: {_0})` does not exist")]
    EmploymentNotExists(#[error(not(source))] employment::Id),

    /// [`employment::Terms`] are invalid.
    #[display("Invalid employment terms: {_0}")]
    #[from]
    Invalid(employment::Invalid),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{
            fixture::{self, date},
            Command as _,
        },
        domain::{
            client,
            employment::{self, Field, Status},
        },
        guard::Conflict,
    };

    use super::{ExecutionError, UpdateEmployment};

    #[tokio::test]
    async fn active_rejects_field_changes() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let active =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;

        let mut terms = active.terms.clone();
        terms.position = employment::Position::new("Senior Developer").unwrap();
        let err = svc
            .execute(UpdateEmployment {
                employment_id: active.id,
                terms,
                status: Status::Active,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Conflict(Conflict::ActiveEmploymentImmutable {
                id,
                fields,
            }) if id == active.id && fields == [Field::Position],
        ));
        let stored = fixture::stored(&svc, active.id).await.unwrap();
        assert_eq!(stored.terms, active.terms);
        assert_eq!(stored.updated_at, active.updated_at);
    }

    #[tokio::test]
    async fn active_rejects_field_changes_along_with_status() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let active =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;

        let mut terms = active.terms.clone();
        terms.salary = Some("5000".parse().unwrap());
        let err = svc
            .execute(UpdateEmployment {
                employment_id: active.id,
                terms,
                status: Status::Inactive,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Conflict(Conflict::ActiveEmploymentImmutable {
                ..
            }),
        ));
        let stored = fixture::stored(&svc, active.id).await.unwrap();
        assert_eq!(stored.status, Status::Active);
    }

    #[tokio::test]
    async fn active_accepts_status_change() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let active =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;

        let updated = svc
            .execute(UpdateEmployment {
                employment_id: active.id,
                terms: active.terms.clone(),
                status: Status::Inactive,
            })
            .await
            .unwrap();

        assert_eq!(updated.status, Status::Inactive);
        assert_eq!(updated.terms, active.terms);
        assert!(updated.updated_at >= active.updated_at);
        assert_eq!(updated.created_at, active.created_at);
        let stored = fixture::stored(&svc, active.id).await.unwrap();
        assert_eq!(stored.status, Status::Inactive);
    }

    #[tokio::test]
    async fn unchanged_update_performs_no_write() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let active =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;

        let updated = svc
            .execute(UpdateEmployment {
                employment_id: active.id,
                terms: active.terms.clone(),
                status: Status::Active,
            })
            .await
            .unwrap();

        assert_eq!(updated.updated_at, active.updated_at);
        let stored = fixture::stored(&svc, active.id).await.unwrap();
        assert_eq!(stored.updated_at, active.updated_at);
    }

    #[tokio::test]
    async fn non_active_accepts_any_changes() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let other = fixture::user(&svc).await;
        let client = fixture::client(&svc).await;

        for status in [Status::Inactive, Status::Terminated] {
            let record =
                fixture::employment(&svc, fixture::terms(user.id), status)
                    .await;

            let mut terms = fixture::terms(other.id);
            terms.client_id = Some(client.id);
            terms.position = employment::Position::new("Manager").unwrap();
            terms.salary = None;
            terms.work_location = None;
            terms.hire_date = date("2022-05-05");
            terms.effective_date = date("2022-06-01");
            terms.end_date = Some(date("2022-12-31"));
            let updated = svc
                .execute(UpdateEmployment {
                    employment_id: record.id,
                    terms: terms.clone(),
                    status,
                })
                .await
                .unwrap();

            assert_eq!(updated.terms, terms);
            let stored = fixture::stored(&svc, record.id).await.unwrap();
            assert_eq!(stored.terms, terms);
            assert_eq!(stored.status, status);
        }
    }

    #[tokio::test]
    async fn activation_conflicts_with_other_active() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let active =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;
        let inactive = fixture::employment(
            &svc,
            fixture::terms(user.id),
            Status::Inactive,
        )
        .await;

        let err = svc
            .execute(UpdateEmployment {
                employment_id: inactive.id,
                terms: inactive.terms.clone(),
                status: Status::Active,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Conflict(Conflict::ActiveEmploymentExists(id))
                if id == user.id,
        ));
        assert_eq!(
            fixture::stored(&svc, inactive.id).await.unwrap().status,
            Status::Inactive,
        );
        assert_eq!(
            fixture::stored(&svc, active.id).await.unwrap().status,
            Status::Active,
        );
    }

    #[tokio::test]
    async fn activation_of_reassigned_record_checks_new_user() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let other = fixture::user(&svc).await;
        _ = fixture::employment(&svc, fixture::terms(other.id), Status::Active)
            .await;
        let inactive = fixture::employment(
            &svc,
            fixture::terms(user.id),
            Status::Inactive,
        )
        .await;

        let err = svc
            .execute(UpdateEmployment {
                employment_id: inactive.id,
                terms: fixture::terms(other.id),
                status: Status::Active,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Conflict(Conflict::ActiveEmploymentExists(id))
                if id == other.id,
        ));
        assert_eq!(fixture::count(&svc, other.id, Status::Active).await, 1);
        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 0);
    }

    #[tokio::test]
    async fn terminated_may_be_reactivated() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let terminated = fixture::employment(
            &svc,
            fixture::terms(user.id),
            Status::Terminated,
        )
        .await;

        let updated = svc
            .execute(UpdateEmployment {
                employment_id: terminated.id,
                terms: terminated.terms.clone(),
                status: Status::Active,
            })
            .await
            .unwrap();

        assert_eq!(updated.status, Status::Active);
        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 1);
    }

    #[tokio::test]
    async fn requires_existing_references() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;

        let missing = employment::Id::new();
        let err = svc
            .execute(UpdateEmployment {
                employment_id: missing,
                terms: fixture::terms(user.id),
                status: Status::Inactive,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            ExecutionError::EmploymentNotExists(id) if id == missing,
        ));

        let inactive = fixture::employment(
            &svc,
            fixture::terms(user.id),
            Status::Inactive,
        )
        .await;
        let missing = client::Id::new();
        let mut terms = inactive.terms.clone();
        terms.client_id = Some(missing);
        let err = svc
            .execute(UpdateEmployment {
                employment_id: inactive.id,
                terms,
                status: Status::Inactive,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            ExecutionError::ClientNotExists(id) if id == missing,
        ));
        let stored = fixture::stored(&svc, inactive.id).await.unwrap();
        assert_eq!(stored.terms, inactive.terms);
    }

    #[tokio::test]
    async fn rejects_invalid_period() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let inactive = fixture::employment(
            &svc,
            fixture::terms(user.id),
            Status::Inactive,
        )
        .await;

        let mut terms = inactive.terms.clone();
        terms.end_date = Some(date("2023-01-01"));
        let err = svc
            .execute(UpdateEmployment {
                employment_id: inactive.id,
                terms,
                status: Status::Inactive,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Invalid(employment::Invalid::Period { .. }),
        ));
        let stored = fixture::stored(&svc, inactive.id).await.unwrap();
        assert_eq!(stored.terms.end_date, None);
    }
}
