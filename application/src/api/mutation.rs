//! GraphQL [`Mutation`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided name and email.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: Option<api::user::Email>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Client` with the provided name.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createClient",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_client(
        name: api::client::Name,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        ctx.service()
            .execute(command::CreateClient { name: name.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Employment` of the `User` with the provided ID.
    ///
    /// The `Employment` is created `ACTIVE`, unless another `status` is
    /// provided.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ACTIVE_EMPLOYMENT_EXISTS` - the `User` already has an `ACTIVE`
    ///                                `Employment`;
    /// - `CLIENT_NOT_EXISTS` - the `Client` with the provided ID does not
    ///                         exist;
    /// - `HIRE_DATE_IN_FUTURE` - the provided `hireDate` is after today;
    /// - `INVALID_EMPLOYMENT_PERIOD` - the provided `endDate` is not after
    ///                                 the `effectiveDate`;
    /// - `USER_NOT_EXISTS` - the `User` with the provided ID does not exist.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = ?client_id,
            effective_date = %effective_date,
            end_date = ?end_date.map(|d| d.to_string()),
            gql.name = "createEmployment",
            hire_date = %hire_date,
            otel.name = Self::SPAN_NAME,
            position = %position,
            status = ?status,
            user_id = %user_id,
        ),
    )]
    pub async fn create_employment(
        user_id: api::user::Id,
        client_id: Option<api::client::Id>,
        position: api::employment::Position,
        hire_date: Date,
        salary: Option<api::employment::Salary>,
        work_location: Option<api::employment::WorkLocation>,
        effective_date: Date,
        end_date: Option<Date>,
        status: Option<api::employment::Status>,
        ctx: &Context,
    ) -> Result<api::Employment, Error> {
        ctx.service()
            .execute(command::CreateEmployment {
                terms: domain::employment::Terms {
                    user_id: user_id.into(),
                    client_id: client_id.map(Into::into),
                    position: position.into(),
                    hire_date: hire_date.coerce(),
                    salary: salary.map(Into::into),
                    work_location: work_location.map(Into::into),
                    effective_date: effective_date.coerce(),
                    end_date: end_date.map(Date::coerce),
                },
                status: status
                    .unwrap_or(api::employment::Status::Active)
                    .into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Replaces the terms and the status of the `Employment` with the
    /// provided ID.
    ///
    /// An `ACTIVE` `Employment` accepts only a `status` change, while its
    /// other fields must repeat the stored ones.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ACTIVE_EMPLOYMENT_EXISTS` - the `Employment` is activated, while its
    ///                                `User` already has another `ACTIVE`
    ///                                one;
    /// - `ACTIVE_EMPLOYMENT_IMMUTABLE` - any field except `status` of an
    ///                                   `ACTIVE` `Employment` is changed;
    /// - `CLIENT_NOT_EXISTS` - the `Client` with the provided ID does not
    ///                         exist;
    /// - `EMPLOYMENT_NOT_EXISTS` - the `Employment` with the provided ID does
    ///                             not exist;
    /// - `HIRE_DATE_IN_FUTURE` - the provided `hireDate` is after today;
    /// - `INVALID_EMPLOYMENT_PERIOD` - the provided `endDate` is not after
    ///                                 the `effectiveDate`;
    /// - `USER_NOT_EXISTS` - the `User` with the provided ID does not exist.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = ?client_id,
            effective_date = %effective_date,
            end_date = ?end_date.map(|d| d.to_string()),
            gql.name = "updateEmployment",
            hire_date = %hire_date,
            id = %id,
            otel.name = Self::SPAN_NAME,
            position = %position,
            status = ?status,
            user_id = %user_id,
        ),
    )]
    pub async fn update_employment(
        id: api::employment::Id,
        user_id: api::user::Id,
        client_id: Option<api::client::Id>,
        position: api::employment::Position,
        hire_date: Date,
        salary: Option<api::employment::Salary>,
        work_location: Option<api::employment::WorkLocation>,
        effective_date: Date,
        end_date: Option<Date>,
        status: api::employment::Status,
        ctx: &Context,
    ) -> Result<api::Employment, Error> {
        ctx.service()
            .execute(command::UpdateEmployment {
                employment_id: id.into(),
                terms: domain::employment::Terms {
                    user_id: user_id.into(),
                    client_id: client_id.map(Into::into),
                    position: position.into(),
                    hire_date: hire_date.coerce(),
                    salary: salary.map(Into::into),
                    work_location: work_location.map(Into::into),
                    effective_date: effective_date.coerce(),
                    end_date: end_date.map(Date::coerce),
                },
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Ends the `Employment` with the provided ID, making it `TERMINATED`.
    ///
    /// Permitted regardless of the current `status`. The `endDate` is today,
    /// unless provided, and must be after the `effectiveDate`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMPLOYMENT_NOT_EXISTS` - the `Employment` with the provided ID does
    ///                             not exist.
    /// - `INVALID_EMPLOYMENT_PERIOD` - the `endDate` is not after the
    ///                                 `effectiveDate`.
    #[tracing::instrument(
        skip_all,
        fields(
            end_date = ?end_date.map(|d| d.to_string()),
            gql.name = "endEmployment",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn end_employment(
        id: api::employment::Id,
        end_date: Option<Date>,
        ctx: &Context,
    ) -> Result<api::Employment, Error> {
        ctx.service()
            .execute(command::EndEmployment {
                employment_id: id.into(),
                end_date: end_date.map(Date::coerce),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes the `Employment` with the provided ID permanently.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMPLOYMENT_NOT_EXISTS` - the `Employment` with the provided ID does
    ///                             not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteEmployment",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_employment(
        id: api::employment::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::DeleteEmployment {
                employment_id: id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }
}

define_error! {
    enum ReferenceError {
        #[code = "CLIENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Client` with the provided ID does not exist"]
        ClientNotExists,

        #[code = "EMPLOYMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Employment` with the provided ID does not exist"]
        EmploymentNotExists,

        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the provided ID does not exist"]
        UserNotExists,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_client::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_employment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::ClientNotExists(_) => ReferenceError::ClientNotExists.into(),
            Self::Conflict(e) => return e.try_as_error(),
            Self::Db(e) => return e.try_as_error(),
            Self::Invalid(e) => return e.try_as_error(),
            Self::UserNotExists(_) => ReferenceError::UserNotExists.into(),
        })
    }
}

impl AsError for command::update_employment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::ClientNotExists(_) => ReferenceError::ClientNotExists.into(),
            Self::Conflict(e) => return e.try_as_error(),
            Self::Db(e) => return e.try_as_error(),
            Self::EmploymentNotExists(_) => {
                ReferenceError::EmploymentNotExists.into()
            }
            Self::Invalid(e) => return e.try_as_error(),
            Self::UserNotExists(_) => ReferenceError::UserNotExists.into(),
        })
    }
}

impl AsError for command::end_employment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmploymentNotExists(_) => {
                Some(ReferenceError::EmploymentNotExists.into())
            }
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::delete_employment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmploymentNotExists(_) => {
                Some(ReferenceError::EmploymentNotExists.into())
            }
        }
    }
}
