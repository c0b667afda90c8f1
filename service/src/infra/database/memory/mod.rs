//! In-memory [`Database`] implementation.
//!
//! Keeps every table in a single process-local store guarded by an async
//! mutex. A [`Tx`] holds that mutex for its whole lifetime and works on a
//! staged copy of the tables, so transactions are serialized and dropping a
//! [`Tx`] without a [`Commit`] discards everything it has written.
//!
//! [`Commit`]: common::operations::Commit
//! [`Database`]: crate::infra::Database

mod impls;

use std::{collections::HashMap, future::Future, sync::Arc};

use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{client, employment, user, Client, Employment, User},
    infra::database::{self, ACTIVE_EMPLOYMENT_CONSTRAINT},
};

/// In-memory [`Database`] client.
///
/// [`Database`]: crate::infra::Database
#[derive(Clone, Debug, Default)]
pub struct Memory<T = NonTx>(T);

/// Every table stored by a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct Tables {
    /// Stored [`User`]s.
    users: HashMap<user::Id, User>,

    /// Stored [`Client`]s.
    clients: HashMap<client::Id, Client>,

    /// Stored [`Employment`]s.
    employments: HashMap<employment::Id, Employment>,
}

impl Tables {
    /// Verifies the constraints of these [`Tables`].
    ///
    /// # Errors
    ///
    /// [`Error::UniqueViolation`] of the [`ACTIVE_EMPLOYMENT_CONSTRAINT`] if
    /// any [`User`] has more than one active [`Employment`].
    fn check(&self) -> Result<(), Error> {
        let mut active = HashMap::new();
        for e in self.employments.values().filter(|e| e.is_active()) {
            if active.insert(e.terms.user_id, e.id).is_some() {
                return Err(Error::UniqueViolation(
                    ACTIVE_EMPLOYMENT_CONSTRAINT,
                ));
            }
        }
        Ok(())
    }
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx(Arc<Mutex<Tables>>);

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<Option<Staged>>>);

/// [`Tables`] staged by a [`Tx`] until its commit.
#[derive(Debug)]
struct Staged {
    /// Exclusive access to the committed [`Tables`].
    committed: OwnedMutexGuard<Tables>,

    /// [`Tables`] as seen inside the [`Tx`].
    tables: Tables,
}

impl Tx {
    /// Starts a new [`Tx`] upon the provided [`NonTx`] client, waiting for
    /// any other [`Tx`] to finish.
    async fn begin(client: &NonTx) -> Self {
        let committed = Arc::clone(&client.0).lock_owned().await;
        let tables = committed.clone();
        Self(Arc::new(Mutex::new(Some(Staged { committed, tables }))))
    }

    /// Publishes the staged [`Tables`] of this [`Tx`].
    ///
    /// Committing an already committed [`Tx`] is a no-op.
    async fn commit(&self) {
        if let Some(Staged {
            mut committed,
            tables,
        }) = self.0.lock().await.take()
        {
            *committed = tables;
        }
    }
}

/// Access to the [`Tables`] of a [`Memory`] database.
pub trait Storage {
    /// Reads the [`Tables`] with the provided function.
    ///
    /// # Errors
    ///
    /// [`Error::TxFinished`] if the transaction is already committed.
    fn read<R>(
        &self,
        f: impl FnOnce(&Tables) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Modifies the [`Tables`] with the provided function.
    ///
    /// The modification is applied only if the modified [`Tables`] satisfy
    /// their constraints.
    ///
    /// # Errors
    ///
    /// - [`Error::TxFinished`] if the transaction is already committed.
    /// - [`Error::UniqueViolation`] if a constraint is violated.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

impl Storage for NonTx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&Tables) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*self.0.lock().await))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut tables = self.0.lock().await;
        apply(&mut tables, f)
    }
}

impl Storage for Tx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&Tables) -> R,
    ) -> Result<R, Traced<database::Error>> {
        self.0
            .lock()
            .await
            .as_ref()
            .map(|staged| f(&staged.tables))
            .ok_or_else(|| tracerr::new!(Error::TxFinished))
            .map_err(tracerr::map_from)
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut guard = self.0.lock().await;
        let staged = guard
            .as_mut()
            .ok_or_else(|| tracerr::new!(Error::TxFinished))
            .map_err(tracerr::map_from)?;
        apply(&mut staged.tables, f)
    }
}

/// Applies the provided modification to the `tables`, unless it violates
/// their constraints.
fn apply<R>(
    tables: &mut Tables,
    f: impl FnOnce(&mut Tables) -> R,
) -> Result<R, Traced<database::Error>> {
    let mut modified = tables.clone();
    let out = f(&mut modified);
    modified
        .check()
        .map_err(tracerr::from_and_wrap!(=> Error))
        .map_err(tracerr::map_from)?;
    *tables = modified;
    Ok(out)
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Operation is performed on an already committed [`Tx`].
    #[display("Transaction is already committed")]
    TxFinished,

    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    ///
    /// Any unique violation matches if no `constraint` is specified.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |x| x == *c),
            Self::TxFinished => false,
        }
    }
}
