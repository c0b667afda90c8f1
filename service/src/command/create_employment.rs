//! [`Command`] for creating a new [`Employment`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
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

/// [`Command`] for creating a new [`Employment`].
#[derive(Clone, Debug)]
pub struct CreateEmployment {
    /// [`employment::Terms`] of a new [`Employment`].
    pub terms: employment::Terms,

    /// [`employment::Status`] of a new [`Employment`].
    pub status: employment::Status,
}

impl<Db> Command<CreateEmployment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<User, user::Id>>,
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
        > + Database<Insert<Employment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Employment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateEmployment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateEmployment { terms, status } = cmd;

        terms
            .validate(Date::today())
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize lifecycle operations upon the same `User`.
        tx.execute(Lock(By::<User, _>::new(terms.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let user = tx
            .execute(Select(By::<Option<User>, _>::new(terms.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(terms.user_id))
            .map_err(tracerr::wrap!())?;
        if let Some(client_id) = terms.client_id {
            tx.execute(Select(By::<Option<Client>, _>::new(client_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::ClientNotExists(client_id))
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }

        if status == employment::Status::Active {
            guard::ensure_no_active_conflict::<_, E>(&tx, user.id, None)
                .await
                .map_err(tracerr::wrap!())?;
        }

        let now = DateTime::now();
        let employment = Employment {
            id: employment::Id::new(),
            terms,
            status,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        };

        tx.execute(Insert(employment.clone()))
            .await
            .map_err(guard::active_constraint::<E>(user.id))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "created {status} `Employment(id: {})` of `User(id: {})`",
            employment.id,
            user.id,
        );

        Ok(employment)
    }
}

/// Error of [`CreateEmployment`] [`Command`] execution.
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
    use common::Date;

    use crate::{
        command::{
            fixture::{self, date},
            Command as _,
        },
        domain::{client, employment::Status, user},
        guard::Conflict,
    };

    use super::{CreateEmployment, ExecutionError};

    #[tokio::test]
    async fn creates_employment() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let client = fixture::client(&svc).await;
        let mut terms = fixture::terms(user.id);
        terms.client_id = Some(client.id);

        let created = svc
            .execute(CreateEmployment {
                terms: terms.clone(),
                status: Status::Active,
            })
            .await
            .unwrap();

        assert_eq!(created.terms, terms);
        assert_eq!(created.status, Status::Active);
        assert_eq!(created.created_at, created.updated_at.coerce());

        let stored = fixture::stored(&svc, created.id).await.unwrap();
        assert_eq!(stored.terms, terms);
        assert_eq!(stored.status, Status::Active);
    }

    #[tokio::test]
    async fn second_active_employment_conflicts() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        let first =
            fixture::employment(&svc, fixture::terms(user.id), Status::Active)
                .await;

        let mut terms = fixture::terms(user.id);
        terms.position = "Tester".parse().unwrap();
        let err = svc
            .execute(CreateEmployment {
                terms,
                status: Status::Active,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::Conflict(Conflict::ActiveEmploymentExists(id))
                if id == user.id,
        ));
        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 1);
        let stored = fixture::stored(&svc, first.id).await.unwrap();
        assert_eq!(stored.terms, first.terms);
        assert_eq!(stored.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn non_active_employments_do_not_conflict() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;
        _ = fixture::employment(&svc, fixture::terms(user.id), Status::Inactive)
            .await;
        _ = fixture::employment(
            &svc,
            fixture::terms(user.id),
            Status::Terminated,
        )
        .await;

        let created = svc
            .execute(CreateEmployment {
                terms: fixture::terms(user.id),
                status: Status::Active,
            })
            .await
            .unwrap();
        assert_eq!(created.status, Status::Active);

        _ = fixture::employment(&svc, fixture::terms(user.id), Status::Inactive)
            .await;

        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 1);
        assert_eq!(fixture::count(&svc, user.id, Status::Inactive).await, 2);
    }

    #[tokio::test]
    async fn concurrent_creations_leave_single_active() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;

        let (a, b) = tokio::join!(
            svc.execute(CreateEmployment {
                terms: fixture::terms(user.id),
                status: Status::Active,
            }),
            svc.execute(CreateEmployment {
                terms: fixture::terms(user.id),
                status: Status::Active,
            }),
        );

        assert_ne!(a.is_ok(), b.is_ok());
        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 1);
    }

    #[tokio::test]
    async fn requires_existing_references() {
        let svc = fixture::service();

        let missing = user::Id::new();
        let err = svc
            .execute(CreateEmployment {
                terms: fixture::terms(missing),
                status: Status::Active,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            ExecutionError::UserNotExists(id) if id == missing,
        ));

        let user = fixture::user(&svc).await;
        let missing = client::Id::new();
        let mut terms = fixture::terms(user.id);
        terms.client_id = Some(missing);
        let err = svc
            .execute(CreateEmployment {
                terms,
                status: Status::Active,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            ExecutionError::ClientNotExists(id) if id == missing,
        ));

        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 0);
    }

    #[tokio::test]
    async fn rejects_invalid_terms() {
        let svc = fixture::service();
        let user = fixture::user(&svc).await;

        let mut terms = fixture::terms(user.id);
        terms.hire_date = Date::today().next_day().unwrap().coerce();
        let err = svc
            .execute(CreateEmployment {
                terms,
                status: Status::Active,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            ExecutionError::Invalid(
                crate::domain::employment::Invalid::HireDateInFuture(_)
            ),
        ));

        let mut terms = fixture::terms(user.id);
        terms.end_date = Some(date("2023-02-01"));
        let err = svc
            .execute(CreateEmployment {
                terms,
                status: Status::Inactive,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.into_inner(),
            ExecutionError::Invalid(
                crate::domain::employment::Invalid::Period { .. }
            ),
        ));

        assert_eq!(fixture::count(&svc, user.id, Status::Active).await, 0);
        assert_eq!(fixture::count(&svc, user.id, Status::Inactive).await, 0);
    }
}
