//! [`Query`] collection related to a single [`Employment`].

use common::operations::By;

use crate::{
    domain::{employment, user, Employment},
    read,
};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries an [`Employment`] by its [`employment::Id`].
pub type ById = DatabaseQuery<By<Option<Employment>, employment::Id>>;

/// Queries the active [`Employment`] of a [`User`] by its [`user::Id`].
pub type Active = DatabaseQuery<
    By<Option<read::employment::Active<Employment>>, user::Id>,
>;
