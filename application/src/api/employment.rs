//! [`Employment`]-related definitions.

use std::future;

use common::{Date, DateTime};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use itertools::Itertools as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, guard, query, read, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    define_error, AsError, Context, Error,
};

/// Period of work of a [`User`], optionally engaged at a [`Client`].
///
/// [`Client`]: api::Client
/// [`User`]: api::User
#[derive(Clone, Debug)]
pub struct Employment {
    /// ID of this [`Employment`].
    pub id: Id,

    /// [`domain::Employment`] representing this [`Employment`].
    employment: OnceCell<domain::Employment>,
}

impl From<domain::Employment> for Employment {
    fn from(employment: domain::Employment) -> Self {
        Self {
            id: employment.id.into(),
            employment: OnceCell::new_with(Some(employment)),
        }
    }
}

impl From<read::employment::Active<domain::Employment>> for Employment {
    fn from(
        read::employment::Active(e): read::employment::Active<
            domain::Employment,
        >,
    ) -> Self {
        e.into()
    }
}

impl Employment {
    /// Creates a new [`Employment`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Employment`] with the provided ID exists,
    /// otherwise accessing this [`Employment`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            employment: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Employment`] representing this [`Employment`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Employment`] doesn't exist.
    async fn employment(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Employment, Error> {
        let id = self.id.into();
        self.employment
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::employment::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|e| {
                        future::ready(e.ok_or_else(|| {
                            ctx.error()(
                                api::query::EmploymentError::NotExists.into(),
                            )
                        }))
                    })
            })
            .await
    }

    /// Returns the [`domain::employment::Terms`] of this [`Employment`].
    async fn terms(
        &self,
        ctx: &Context,
    ) -> Result<&domain::employment::Terms, Error> {
        Ok(&self.employment(ctx).await?.terms)
    }
}

/// Period of work of a `User`, optionally engaged at a `Client`.
///
/// While `ACTIVE`, only the `status` of an `Employment` may change.
#[graphql_object(context = Context)]
impl Employment {
    /// Unique identifier of this `Employment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `User` this `Employment` belongs to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.user",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn user(&self, ctx: &Context) -> Result<api::User, Error> {
        let id = self.terms(ctx).await?.user_id;
        #[expect(
            unsafe_code,
            reason = "foreign key guarantees `User` existence"
        )]
        let user = unsafe { api::User::new_unchecked(id) };
        Ok(user)
    }

    /// `Client` this `Employment` is engaged at, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.client",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn client(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Client>, Error> {
        let id = self.terms(ctx).await?.client_id;
        #[expect(
            unsafe_code,
            reason = "foreign key guarantees `Client` existence"
        )]
        let client = id.map(|id| unsafe { api::Client::new_unchecked(id) });
        Ok(client)
    }

    /// Job title of this `Employment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.position",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn position(&self, ctx: &Context) -> Result<Position, Error> {
        Ok(self.terms(ctx).await?.position.clone().into())
    }

    /// `Date` when the `User` was hired.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.hireDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn hire_date(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.terms(ctx).await?.hire_date.coerce())
    }

    /// Salary of this `Employment`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.salary",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn salary(&self, ctx: &Context) -> Result<Option<Salary>, Error> {
        Ok(self.terms(ctx).await?.salary.map(Into::into))
    }

    /// Place where the work of this `Employment` is done, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.workLocation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn work_location(
        &self,
        ctx: &Context,
    ) -> Result<Option<WorkLocation>, Error> {
        Ok(self.terms(ctx).await?.work_location.clone().map(Into::into))
    }

    /// `Date` when the terms of this `Employment` take effect.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.effectiveDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn effective_date(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.terms(ctx).await?.effective_date.coerce())
    }

    /// `Date` when the terms of this `Employment` stop having effect, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.endDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn end_date(&self, ctx: &Context) -> Result<Option<Date>, Error> {
        Ok(self.terms(ctx).await?.end_date.map(|d| d.coerce()))
    }

    /// Lifecycle status of this `Employment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.employment(ctx).await?.status.into())
    }

    /// `DateTime` when this `Employment` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.employment(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Employment` was modified the last time.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Employment.updatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn updated_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.employment(ctx).await?.updated_at.coerce())
    }
}

/// Unique identifier of an `Employment`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::employment::Id)]
#[into(domain::employment::Id)]
#[graphql(name = "EmploymentId", transparent)]
pub struct Id(Uuid);

/// Job title of an `Employment`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "EmploymentPosition",
    with = scalar::Via::<domain::employment::Position>,
)]
pub struct Position(domain::employment::Position);

/// Place where the work of an `Employment` is done.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "EmploymentWorkLocation",
    with = scalar::Via::<domain::employment::WorkLocation>,
)]
pub struct WorkLocation(domain::employment::WorkLocation);

/// Salary of an `Employment`.
///
/// Non-negative decimal string with at most 2 decimal places.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "EmploymentSalary",
    with = scalar::Via::<domain::employment::Salary>,
)]
pub struct Salary(domain::employment::Salary);

/// Lifecycle status of an `Employment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "EmploymentStatus")]
pub enum Status {
    /// The `Employment` is ongoing.
    ///
    /// A `User` has at most one `ACTIVE` `Employment`.
    Active,

    /// The `Employment` is paused.
    Inactive,

    /// The `Employment` is over.
    Terminated,
}

impl From<domain::employment::Status> for Status {
    fn from(status: domain::employment::Status) -> Self {
        use domain::employment::Status as S;
        match status {
            S::Active => Self::Active,
            S::Inactive => Self::Inactive,
            S::Terminated => Self::Terminated,
        }
    }
}

impl From<Status> for domain::employment::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Active => Self::Active,
            Status::Inactive => Self::Inactive,
            Status::Terminated => Self::Terminated,
        }
    }
}

impl AsError for guard::Conflict {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ACTIVE_EMPLOYMENT_EXISTS"]
                #[status = CONFLICT]
                #[message = "`User` already has an active `Employment`"]
                ActiveEmploymentExists,

                #[code = "ACTIVE_EMPLOYMENT_IMMUTABLE"]
                #[status = CONFLICT]
                #[message = "Active `Employment` cannot be updated except \
                             for its status"]
                ActiveEmploymentImmutable,
            }
        }

        Some(match self {
            Self::ActiveEmploymentExists(_) => {
                Error::ActiveEmploymentExists.into()
            }
            Self::ActiveEmploymentImmutable { fields, .. } => {
                let mut err = crate::Error::from(
                    Error::ActiveEmploymentImmutable,
                );
                err.message = format!(
                    "{}, changed fields: {}",
                    err.message,
                    fields.iter().join(", "),
                );
                err
            }
        })
    }
}

impl AsError for domain::employment::Invalid {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "HIRE_DATE_IN_FUTURE"]
                #[status = BAD_REQUEST]
                #[message = "Hire date cannot be in the future"]
                HireDateInFuture,

                #[code = "INVALID_EMPLOYMENT_PERIOD"]
                #[status = BAD_REQUEST]
                #[message = "End date must be after the effective date"]
                InvalidPeriod,
            }
        }

        Some(match self {
            Self::HireDateInFuture(_) => Error::HireDateInFuture.into(),
            Self::Period { .. } => Error::InvalidPeriod.into(),
        })
    }
}

pub mod list {
    //! Definitions related to [`Employment`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Employment, Id};

    /// Cursor for the `Employment` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::employment::list::Cursor)]
    #[graphql(
        name = "EmploymentListCursor",
        with = scalar::Via::<read::employment::list::Cursor>,
    )]
    pub struct Cursor(pub read::employment::list::Cursor);

    /// Edge in the [`Employment`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::employment::list::Edge);

    /// Edge in the `Employment` list.
    #[graphql_object(name = "EmploymentListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `EmploymentListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `EmploymentListEdge`.
        #[must_use]
        pub fn node(&self) -> Employment {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees \
                          `Employment` existence"
            )]
            unsafe {
                Employment::new_unchecked(self.0.node)
            }
        }
    }

    /// Connection of the [`Employment`] list.
    #[derive(Clone, Debug)]
    pub struct Connection {
        /// Underlying [`read::employment::list::Page`].
        page: read::employment::list::Page,

        /// [`read::employment::list::Filter`] the page was selected with.
        filter: read::employment::list::Filter,
    }

    impl Connection {
        /// Creates a new [`Connection`] of the provided `page` selected with
        /// the provided `filter`.
        #[must_use]
        pub fn new(
            page: read::employment::list::Page,
            filter: read::employment::list::Filter,
        ) -> Self {
            Self { page, filter }
        }
    }

    /// Connection of the `Employment` list.
    #[graphql_object(name = "EmploymentListConnection", context = Context)]
    impl Connection {
        /// Edges in this `EmploymentListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.page.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.page.page_info(),
                start_cursor: self.page.edges.first().map(|e| e.cursor.into()),
                end_cursor: self.page.edges.last().map(|e| e.cursor.into()),
                filter: self.filter.clone(),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::employment::list::PageInfo`].
        info: read::employment::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,

        /// [`read::employment::list::Filter`] to count the total with.
        filter: read::employment::list::Filter,
    }

    /// Information about a `EmploymentListConnection` page.
    #[graphql_object(name = "EmploymentListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }

        /// Total count of `Employment`s satisfying the list filter.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::employments::TotalCount::by(
                    self.filter.clone(),
                ))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}

#[cfg(test)]
mod spec {
    use common::Date;
    use service::{
        domain::{employment, user},
        guard::Conflict,
    };

    use crate::AsError as _;

    #[test]
    fn conflicts_map_to_http_conflict() {
        let err = Conflict::ActiveEmploymentExists(user::Id::new())
            .try_as_error()
            .unwrap();
        assert_eq!(err.code, "ACTIVE_EMPLOYMENT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);

        let err = Conflict::ActiveEmploymentImmutable {
            id: employment::Id::new(),
            fields: vec![employment::Field::Position, employment::Field::Salary],
        }
        .try_as_error()
        .unwrap();
        assert_eq!(err.code, "ACTIVE_EMPLOYMENT_IMMUTABLE");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert!(
            err.message.ends_with("changed fields: position, salary"),
            "unexpected message: {}",
            err.message,
        );
    }

    #[test]
    fn invalid_period_maps_to_bad_request() {
        let date = |s: &str| s.parse::<Date>().unwrap();
        let err = employment::Invalid::Period {
            effective_date: date("2023-02-01").coerce(),
            end_date: date("2020-01-01").coerce(),
        }
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "INVALID_EMPLOYMENT_PERIOD");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
