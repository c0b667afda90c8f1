//! [`Command`] for deleting an [`Employment`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
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

/// [`Command`] for permanently deleting an [`Employment`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteEmployment {
    /// ID of the [`Employment`] to delete.
    pub employment_id: employment::Id,
}

impl<Db> Command<DeleteEmployment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Employment, employment::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Employment>, employment::Id>>,
            Ok = Option<Employment>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Employment, employment::Id>>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = bool;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeleteEmployment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteEmployment { employment_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::<Employment, _>::new(employment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        let employment = tx
            .execute(Select(By::<Option<Employment>, _>::new(employment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::EmploymentNotExists(employment_id))
            .map_err(tracerr::wrap!())?;

        let deleted = tx
            .execute(Delete(By::<Employment, _>::new(employment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "deleted {} `Employment(id: {employment_id})`",
            employment.status,
        );

        Ok(deleted)
    }
}

/// Error of [`DeleteEmployment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Employment`] with the provided ID does not exist.
    #[display("`Employment(id: {_0})` does not exist")]
    EmploymentNotExists(#[error(not(source))] employment::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, Command as _},
        domain::employment::{self, Status},
    };

    use super::{DeleteEmployment, ExecutionError};

    #[tokio::test]
    async fn deletes_employment_of_any_status() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;

        for status in [Status::Active, Status::Inactive, Status::Terminated] {
            let record =
                fixture::employment(&svc, fixture::terms(user.id), status)
                    .await;

            let deleted = svc
                .execute(DeleteEmployment {
                    employment_id: record.id,
                })
                .await
                .unwrap();

            assert!(deleted);
            assert!(fixture::stored(&svc, record.id).await.is_none());
        }
    }

    #[tokio::test]
    async fn leaves_other_records_untouched() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let kept =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;
        let removed = fixture::employment(
            &svc,
            fixture::terms(user.id),
            Status::Inactive,
        )
        .await;

        assert!(svc
            .execute(DeleteEmployment {
                employment_id: removed.id,
            })
            .await
            .unwrap());

        let stored = fixture::stored(&svc, kept.id).await.unwrap();
        assert_eq!(stored.status, Status::Active);
        assert_eq!(fixture::count(&svc, user.id, Status::Inactive).await, 0);
    }

    #[tokio::test]
    async fn fails_on_missing_employment() {
        let svc = fixture::service();
        let missing = employment::Id::new();

        let err = svc
            .execute(DeleteEmployment {
                employment_id: missing,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::EmploymentNotExists(id) if id == missing,
        ));
    }
}
