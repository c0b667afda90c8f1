//! [`Query`] collection related to the multiple [`Employment`]s.

use std::collections::HashMap;

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{employment, Employment},
    read::employment::list,
};

use super::DatabaseQuery;

/// Queries multiple [`Employment`]s by their [`employment::Id`]s.
pub type ByIds = DatabaseQuery<
    By<HashMap<employment::Id, Employment>, Vec<employment::Id>>,
>;

/// Queries a list of [`Employment`]s.
pub type List = DatabaseQuery<By<list::Page, list::Selector>>;

/// Queries total count of [`Employment`]s satisfying a [`list::Filter`].
pub type TotalCount = DatabaseQuery<By<list::TotalCount, list::Filter>>;
