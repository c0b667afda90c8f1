//! [`Command`] definition.

pub mod create_client;
pub mod create_employment;
pub mod create_user;
pub mod delete_employment;
pub mod end_employment;
pub mod update_employment;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_client::CreateClient, create_employment::CreateEmployment,
    create_user::CreateUser, delete_employment::DeleteEmployment,
    end_employment::EndEmployment, update_employment::UpdateEmployment,
};

#[cfg(test)]
mod fixture {
    //! Helpers for [`Command`]s execution against a [`Memory`] database.

    use common::Date;

    use crate::{
        domain::{client, employment, user, Client, Employment, User},
        infra::Memory,
        query,
        read::employment::list,
        Query as _,
    };

    use super::{Command as _, CreateClient, CreateEmployment, CreateUser};

    /// [`crate::Service`] backed by a [`Memory`] database.
    pub(super) type Service = crate::Service<Memory>;

    /// Creates a new [`Service`] with an empty [`Memory`] database.
    pub(super) fn service() -> Service {
        Service::new(Memory::default())
    }

    /// Parses the provided `YYYY-MM-DD` string.
    pub(super) fn date<Of: ?Sized>(s: &str) -> common::DateOf<Of> {
        s.parse::<Date>().unwrap().coerce()
    }

    pub(super) async fn user(svc: &Service) -> User {
        svc.execute(CreateUser {
            name: user::Name::new("Jane Doe").unwrap(),
            email: None,
        })
        .await
        .unwrap()
    }

    pub(super) async fn client(svc: &Service) -> Client {
        svc.execute(CreateClient {
            name: client::Name::new("Acme").unwrap(),
        })
        .await
        .unwrap()
    }

    /// Returns valid [`employment::Terms`] of a `Developer` [`User`].
    pub(super) fn terms(user_id: user::Id) -> employment::Terms {
        employment::Terms {
            user_id,
            client_id: None,
            position: employment::Position::new("Developer").unwrap(),
            hire_date: date("2023-01-10"),
            salary: Some("4200".parse().unwrap()),
            work_location: Some(employment::WorkLocation::new("Remote").unwrap()),
            effective_date: date("2023-02-01"),
            end_date: None,
        }
    }

    pub(super) async fn employment(
        svc: &Service,
        terms: employment::Terms,
        status: employment::Status,
    ) -> Employment {
        svc.execute(CreateEmployment { terms, status }).await.unwrap()
    }

    /// Loads the stored [`Employment`] with the provided ID.
    pub(super) async fn stored(
        svc: &Service,
        id: employment::Id,
    ) -> Option<Employment> {
        svc.execute(query::employment::ById::by(id)).await.unwrap()
    }

    /// Counts the stored [`Employment`]s of the [`User`] with the provided
    /// ID in the provided [`employment::Status`].
    pub(super) async fn count(
        svc: &Service,
        user_id: user::Id,
        status: employment::Status,
    ) -> i32 {
        svc.execute(query::employments::TotalCount::by(list::Filter {
            user_id: Some(user_id),
            status: Some(status),
            ..list::Filter::default()
        }))
        .await
        .unwrap()
        .into()
    }
}
