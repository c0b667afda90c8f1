//! [`Database`] implementations for [`Memory`].

use std::collections::HashMap;

use common::{
    operations::{
        By, Commit, Delete, Insert, Lock, Select, Transact, Update,
    },
    pagination,
};
use tracerr::Traced;

use crate::{
    domain::{client, employment, user, Client, Employment, User},
    infra::{database, Database},
    read::employment::{list, Active},
};

use super::{Memory, NonTx, Storage, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(Memory(Tx::begin(&self.0).await))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.0.commit().await;
        Ok(())
    }
}

// Transactions are already serialized by the store-wide mutex.
impl<T: Storage> Database<Lock<By<User, user::Id>>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<T: Storage> Database<Lock<By<Employment, employment::Id>>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Employment, employment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl<T: Storage> Database<Insert<User>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|t| drop(t.users.insert(user.id, user)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Select<By<Option<User>, user::Id>>> for Memory<T> {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|t| t.users.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Select<By<HashMap<user::Id, User>, Vec<user::Id>>>>
    for Memory<T>
{
    type Ok = HashMap<user::Id, User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<user::Id, User>, Vec<user::Id>>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        self.0
            .read(|t| {
                ids.iter()
                    .filter_map(|id| t.users.get(id))
                    .map(|u| (u.id, u.clone()))
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Insert<Client>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(client): Insert<Client>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|t| drop(t.clients.insert(client.id, client)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Select<By<Option<Client>, client::Id>>> for Memory<T> {
    type Ok = Option<Client>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Client>, client::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|t| t.clients.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Insert<Employment>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(employment): Insert<Employment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|t| drop(t.employments.insert(employment.id, employment)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Update<Employment>> for Memory<T> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(employment): Update<Employment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|t| drop(t.employments.insert(employment.id, employment)))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Delete<By<Employment, employment::Id>>> for Memory<T> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Employment, employment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .write(|t| t.employments.remove(&id).is_some())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Select<By<Option<Employment>, employment::Id>>>
    for Memory<T>
{
    type Ok = Option<Employment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Employment>, employment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|t| t.employments.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage>
    Database<
        Select<
            By<HashMap<employment::Id, Employment>, Vec<employment::Id>>,
        >,
    > for Memory<T>
{
    type Ok = HashMap<employment::Id, Employment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<HashMap<employment::Id, Employment>, Vec<employment::Id>>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        self.0
            .read(|t| {
                ids.iter()
                    .filter_map(|id| t.employments.get(id))
                    .map(|e| (e.id, e.clone()))
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Select<By<Option<Active<Employment>>, user::Id>>>
    for Memory<T>
{
    type Ok = Option<Active<Employment>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Employment>>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        self.0
            .read(|t| {
                t.employments
                    .values()
                    .find(|e| e.terms.user_id == user_id && e.is_active())
                    .cloned()
                    .map(Active)
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<T: Storage> Database<Select<By<list::Page, list::Selector>>> for Memory<T> {
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector { arguments, filter } = by.into_inner();
        let kind = arguments.kind();
        let cursor = arguments.cursor().copied();

        let mut ids = self
            .0
            .read(|t| {
                t.employments
                    .values()
                    .filter(|e| filter.matches(e))
                    .map(|e| e.id)
                    .filter(|id| {
                        cursor.map_or(true, |c| match kind {
                            pagination::Kind::Forward => *id > c,
                            pagination::Kind::ForwardIncluding => *id >= c,
                            pagination::Kind::Backward => *id < c,
                            pagination::Kind::BackwardIncluding => *id <= c,
                        })
                    })
                    .collect::<Vec<_>>()
            })
            .await
            .map_err(tracerr::wrap!())?;
        ids.sort_unstable();
        if kind.is_backward() {
            ids.reverse();
        }

        let has_more = ids.len() > arguments.limit();
        let edges = ids
            .into_iter()
            .take(arguments.limit())
            .map(|id| (id, id))
            .collect::<Vec<_>>();

        Ok(list::Page::new(&arguments, edges, has_more))
    }
}

impl<T: Storage> Database<Select<By<list::TotalCount, list::Filter>>>
    for Memory<T>
{
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let count = self
            .0
            .read(|t| {
                t.employments.values().filter(|e| filter.matches(e)).count()
            })
            .await
            .map_err(tracerr::wrap!())?;
        Ok(i32::try_from(count).unwrap_or(i32::MAX).into())
    }
}

#[cfg(test)]
mod spec {
    use std::collections::HashMap;

    use common::{
        operations::{By, Commit, Insert, Select, Transact},
        DateTime,
    };

    use crate::{
        domain::{employment, user, Employment, User},
        infra::{database, Database as _, Memory},
        read::employment::list,
    };

    fn user() -> User {
        User {
            id: user::Id::new(),
            name: user::Name::new("Jane").unwrap(),
            email: None,
            created_at: DateTime::now().coerce(),
        }
    }

    fn employment(user_id: user::Id, status: employment::Status) -> Employment {
        let now = DateTime::now();
        Employment {
            id: employment::Id::new(),
            terms: employment::Terms {
                user_id,
                client_id: None,
                position: employment::Position::new("Developer").unwrap(),
                hire_date: now.date(),
                salary: None,
                work_location: None,
                effective_date: now.date(),
                end_date: None,
            },
            status,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }

    #[tokio::test]
    async fn uncommitted_tx_is_discarded() {
        let db: Memory = Memory::default();
        let user = user();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(user.clone())).await.unwrap();
        drop(tx);

        let stored = db
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn committed_tx_is_published() {
        let db: Memory = Memory::default();
        let user = user();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(user.clone())).await.unwrap();
        tx.execute(Commit).await.unwrap();
        drop(tx);

        let stored = db
            .execute(Select(By::<Option<User>, _>::new(user.id)))
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn rejects_second_active_employment() {
        let db: Memory = Memory::default();
        let user_id = user::Id::new();
        db.execute(Insert(employment(user_id, employment::Status::Active)))
            .await
            .unwrap();

        let err = db
            .execute(Insert(employment(user_id, employment::Status::Active)))
            .await
            .unwrap_err();

        assert!(err.into_inner().is_unique_violation(Some(
            database::ACTIVE_EMPLOYMENT_CONSTRAINT
        )));
        let count = db
            .execute(Select(By::<list::TotalCount, _>::new(list::Filter {
                user_id: Some(user_id),
                ..list::Filter::default()
            })))
            .await
            .unwrap();
        assert_eq!(i32::from(count), 1);
    }

    #[tokio::test]
    async fn paginates_by_id() {
        let db: Memory = Memory::default();
        let user_id = user::Id::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            let e = employment(user_id, employment::Status::Inactive);
            ids.push(e.id);
            db.execute(Insert(e)).await.unwrap();
        }
        ids.sort_unstable();

        let page = db
            .execute(Select(By::<list::Page, _>::new(list::Selector {
                arguments: list::Arguments::new(
                    Some(2),
                    Some(ids[0]),
                    None,
                    None,
                    10,
                )
                .unwrap(),
                filter: list::Filter::default(),
            })))
            .await
            .unwrap();
        let nodes = page.edges.iter().map(|e| e.node).collect::<Vec<_>>();
        assert_eq!(nodes, [ids[1], ids[2]]);
        assert!(page.page_info().has_next_page);

        let page = db
            .execute(Select(By::<list::Page, _>::new(list::Selector {
                arguments: list::Arguments::new(
                    None,
                    None,
                    Some(3),
                    Some(ids[2]),
                    10,
                )
                .unwrap(),
                filter: list::Filter::default(),
            })))
            .await
            .unwrap();
        let nodes = page.edges.iter().map(|e| e.node).collect::<Vec<_>>();
        assert_eq!(nodes, [ids[1], ids[0]]);
        assert!(!page.page_info().has_previous_page);
    }

    #[tokio::test]
    async fn selects_existing_by_ids() {
        let db: Memory = Memory::default();
        let (jane, john) = (user(), user());
        db.execute(Insert(jane.clone())).await.unwrap();
        db.execute(Insert(john.clone())).await.unwrap();
        let active = employment(jane.id, employment::Status::Active);
        db.execute(Insert(active.clone())).await.unwrap();

        let users = db
            .execute(Select(By::<HashMap<user::Id, User>, _>::new(vec![
                jane.id,
                user::Id::new(),
            ])))
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert!(users.contains_key(&jane.id));

        let employments = db
            .execute(Select(By::<HashMap<employment::Id, Employment>, _>::new(vec![
                active.id,
                employment::Id::new(),
            ])))
            .await
            .unwrap();
        assert_eq!(employments.len(), 1);
        assert_eq!(employments[&active.id].terms.user_id, jane.id);
    }
}
