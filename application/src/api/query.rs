//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Employment` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMPLOYMENT_NOT_EXISTS` - the `Employment` with the specified ID does
    ///                             not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "employment",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn employment(
        id: api::employment::Id,
        ctx: &Context,
    ) -> Result<api::Employment, Error> {
        ctx.service()
            .execute(query::employment::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| EmploymentError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Employment`s.
    ///
    /// `position` is searched fuzzily, so the closest matches go first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous.
    #[expect(clippy::too_many_arguments, reason = "GraphQL arguments")]
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            client_id = ?client_id,
            first = ?first,
            gql.name = "employments",
            last = ?last,
            otel.name = Self::SPAN_NAME,
            position = ?position.as_ref().map(ToString::to_string),
            status = ?status,
            user_id = ?user_id,
        ),
    )]
    pub async fn employments(
        first: Option<i32>,
        after: Option<api::employment::list::Cursor>,
        last: Option<i32>,
        before: Option<api::employment::list::Cursor>,
        user_id: Option<api::user::Id>,
        client_id: Option<api::client::Id>,
        status: Option<api::employment::Status>,
        position: Option<api::employment::Position>,
        ctx: &Context,
    ) -> Result<api::employment::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let arguments = read::employment::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;
        let filter = read::employment::list::Filter {
            user_id: user_id.map(Into::into),
            client_id: client_id.map(Into::into),
            status: status.map(Into::into),
            position: position.map(Into::into),
        };

        ctx.service()
            .execute(query::employments::List::by(
                read::employment::list::Selector {
                    arguments,
                    filter: filter.clone(),
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|page| api::employment::list::Connection::new(page, filter))
    }

    /// Returns the `ACTIVE` `Employment` of the `User` with the specified ID,
    /// if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "activeEmployment",
            otel.name = Self::SPAN_NAME,
            user_id = %user_id,
        ),
    )]
    pub async fn active_employment(
        user_id: api::user::Id,
        ctx: &Context,
    ) -> Result<Option<api::Employment>, Error> {
        ctx.service()
            .execute(query::employment::Active::by(user_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|e| e.map(Into::into))
    }

    /// Returns the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn user(
        id: api::user::Id,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(query::user::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Client` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CLIENT_NOT_EXISTS` - the `Client` with the specified ID does not
    ///                         exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "client",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn client(
        id: api::client::Id,
        ctx: &Context,
    ) -> Result<api::Client, Error> {
        ctx.service()
            .execute(query::client::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ClientError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum ClientError {
        #[code = "CLIENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Client` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum EmploymentError {
        #[code = "EMPLOYMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Employment` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
