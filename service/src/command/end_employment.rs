//! [`Command`] for ending an [`Employment`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{employment, Employment},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for ending an [`Employment`].
///
/// Moves the [`Employment`] into [`employment::Status::Terminated`] whatever
/// its current [`employment::Status`] is, as long as the resulting
/// [`employment::EndDate`] is strictly after its
/// [`employment::EffectiveDate`].
#[derive(Clone, Copy, Debug)]
pub struct EndEmployment {
    /// ID of the [`Employment`] to end.
    pub employment_id: employment::Id,

    /// [`employment::EndDate`] to set, or today if [`None`].
    pub end_date: Option<employment::EndDate>,
}

impl<Db> Command<EndEmployment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Employment, employment::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Employment>, employment::Id>>,
            Ok = Option<Employment>,
            Err = Traced<database::Error>,
        > + Database<Update<Employment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Employment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: EndEmployment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let EndEmployment {
            employment_id,
            end_date,
        } = cmd;

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

        let mut employment = tx
            .execute(Select(By::<Option<Employment>, _>::new(employment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EmploymentNotExists(employment_id))
            .map_err(tracerr::wrap!())?;
        let previous = employment.status;

        let end_date = end_date.unwrap_or_else(employment::EndDate::today);
        if end_date.coerce() <= employment.terms.effective_date {
            return Err(tracerr::new!(E::Invalid(employment::Invalid::Period {
                effective_date: employment.terms.effective_date,
                end_date,
            })));
        }
        employment.status = employment::Status::Terminated;
        employment.terms.end_date = Some(end_date);
        employment.updated_at = DateTime::now().coerce();

        tx.execute(Update(employment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "ended {previous} `Employment(id: {employment_id})` at {end_date}",
        );

        Ok(employment)
    }
}

/// Error of [`EndEmployment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Employment`] with the provided ID does not exist.
    #[display("`Employment(id: {_0})` does not exist")]
    EmploymentNotExists(#[error(not(source))] employment::Id),

    /// Resulting [`employment::Terms`] are invalid.
    #[display("Invalid employment terms: {_0}")]
    #[from]
    Invalid(employment::Invalid),
}

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::{
        command::{
            fixture::{self, date},
            Command as _, CreateEmployment,
        },
        domain::employment::{self, Status},
    };

    use super::{EndEmployment, ExecutionError};

    #[tokio::test]
    async fn ends_employment_of_any_status() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;

        for status in [Status::Active, Status::Inactive, Status::Terminated] {
            let record =
                fixture::employment(&svc, fixture::terms(user.id), status)
                    .await;

            let ended = svc
                .execute(EndEmployment {
                    employment_id: record.id,
                    end_date: Some(date("2024-03-31")),
                })
                .await
                .unwrap();

            assert_eq!(ended.status, Status::Terminated);
            assert_eq!(ended.terms.end_date, Some(date("2024-03-31")));
            let stored = fixture::stored(&svc, record.id).await.unwrap();
            assert_eq!(stored.status, Status::Terminated);
            assert_eq!(stored.terms.position, record.terms.position);
        }
        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 0);
    }

    #[tokio::test]
    async fn rejects_end_date_not_after_effective_date() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;

        for status in [Status::Active, Status::Inactive, Status::Terminated] {
            let record =
                fixture::employment(&svc, fixture::terms(user.id), status)
                    .await;

            for end_date in ["2020-01-01", "2023-02-01"] {
                let err = svc
                    .execute(EndEmployment {
                        employment_id: record.id,
                        end_date: Some(date(end_date)),
                    })
                    .await
                    .unwrap_err();

                assert!(matches!(
                    err.into_inner(),
                    ExecutionError::Invalid(employment::Invalid::Period {
                        ..
                    }),
                ));
            }
            let stored = fixture::stored(&svc, record.id).await.unwrap();
            assert_eq!(stored.status, status);
            assert_eq!(stored.terms.end_date, None);
        }
    }

    #[tokio::test]
    async fn rejects_defaulted_end_date_before_effective_date() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let mut terms = fixture::terms(user.id);
        terms.effective_date = Date::today().next_day().unwrap().coerce();
        let active = fixture::employment(&svc, terms, Status::Active).await;

        let err = svc
            .execute(EndEmployment {
                employment_id: active.id,
                end_date: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Invalid(employment::Invalid::Period { .. }),
        ));
        let stored = fixture::stored(&svc, active.id).await.unwrap();
        assert_eq!(stored.status, Status::Active);
    }

    #[tokio::test]
    async fn defaults_end_date_to_today() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let active =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;

        let before = Date::today();
        let ended = svc
            .execute(EndEmployment {
                employment_id: active.id,
                end_date: None,
            })
            .await
            .unwrap();
        let after = Date::today();

        let end_date: Date = ended.terms.end_date.unwrap().coerce();
        assert!(before <= end_date && end_date <= after);
    }

    #[tokio::test]
    async fn frees_user_for_new_active_employment() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let active =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;

        _ = svc
            .execute(EndEmployment {
                employment_id: active.id,
                end_date: None,
            })
            .await
            .unwrap();
        let created = svc
            .execute(CreateEmployment {
                terms: fixture::terms(user.id),
                status: Status::Active,
            })
            .await
            .unwrap();

        assert_eq!(created.status, Status::Active);
        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 1);
    }

    #[tokio::test]
    async fn fails_on_missing_employment() {
        let svc = fixture::service();
        let missing = employment::Id::new();

        let err = svc
            .execute(EndEmployment {
                employment_id: missing,
                end_date: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::EmploymentNotExists(id) if id == missing,
        ));
    }
}
