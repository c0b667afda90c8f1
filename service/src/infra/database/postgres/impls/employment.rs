//! [`Employment`]-related [`Database`] implementations.

use std::collections::HashMap;

use common::operations::{By, Delete, Insert, Lock, Select, Update};
use itertools::Itertools as _;
use postgres_types::ToSql;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{employment, user, Employment},
    infra::{
        database::{
            self,
            postgres::{Connection, FuzzPattern},
            Postgres,
        },
        Database,
    },
    read::employment::{list, Active},
};

/// Builds an [`Employment`] out of the provided [`Row`] of the `employments`
/// table.
fn from_row(row: &Row) -> Employment {
    Employment {
        id: row.get("id"),
        terms: employment::Terms {
            user_id: row.get("user_id"),
            client_id: row.get("client_id"),
            position: row.get("position"),
            hire_date: row.get("hire_date"),
            salary: row.get("salary"),
            work_location: row.get("work_location"),
            effective_date: row.get("effective_date"),
            end_date: row.get("end_date"),
        },
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Columns of the `employments` table selected to build an [`Employment`].
const COLUMNS: &str = "\
    id, user_id, client_id, position, hire_date, status, \
    salary, work_location, effective_date, end_date, \
    created_at, updated_at";

impl<C, IDs> Database<Select<By<HashMap<employment::Id, Employment>, IDs>>>
    for Postgres<C>
where
    C: Connection,
    IDs: AsRef<[employment::Id]>,
{
    type Ok = HashMap<employment::Id, Employment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<HashMap<employment::Id, Employment>, IDs>>,
    ) -> Result<Self::Ok, Self::Err> {
        let ids = by.into_inner();
        let ids = ids.as_ref();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let sql = format!(
            "SELECT {COLUMNS} FROM employments WHERE id = ANY($1::UUID[])",
        );
        Ok(self
            .query(sql.as_str(), &[&ids])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .map(|e| (e.id, e))
            .collect())
    }
}

impl<C> Database<Select<By<Option<Employment>, employment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Employment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Employment>, employment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        let sql =
            format!("SELECT {COLUMNS} FROM employments WHERE id = $1::UUID");
        self.query_opt(sql.as_str(), &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Option<Active<Employment>>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Active<Employment>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Employment>>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} FROM employments \
             WHERE user_id = $1::UUID AND status = $2::INT2 \
             LIMIT 1",
        );
        self.query_opt(sql.as_str(), &[&user_id, &employment::Status::Active])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row).map(Active))
    }
}

impl<C> Database<Insert<Employment>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Employment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(employment): Insert<Employment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(employment))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Employment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(employment): Update<Employment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Employment {
            id,
            terms:
                employment::Terms {
                    user_id,
                    client_id,
                    position,
                    hire_date,
                    salary,
                    work_location,
                    effective_date,
                    end_date,
                },
            status,
            created_at,
            updated_at,
        } = employment;

        const SQL: &str = "\
            INSERT INTO employments (\
                id, user_id, client_id, \
                position, hire_date, status, \
                salary, work_location, \
                effective_date, end_date, \
                created_at, updated_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::VARCHAR, $5::DATE, $6::INT2, \
                $7::NUMERIC, $8::VARCHAR, \
                $9::DATE, $10::DATE, \
                $11::TIMESTAMPTZ, $12::TIMESTAMPTZ\
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET user_id = EXCLUDED.user_id, \
                client_id = EXCLUDED.client_id, \
                position = EXCLUDED.position, \
                hire_date = EXCLUDED.hire_date, \
                status = EXCLUDED.status, \
                salary = EXCLUDED.salary, \
                work_location = EXCLUDED.work_location, \
                effective_date = EXCLUDED.effective_date, \
                end_date = EXCLUDED.end_date, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &client_id,
                &position,
                &hire_date,
                &status,
                &salary,
                &work_location,
                &effective_date,
                &end_date,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Employment, employment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Employment, employment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM employments \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|affected| affected > 0)
    }
}

impl<C> Database<Lock<By<Employment, employment::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Employment, employment::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT 1 \
            FROM employments \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<list::Page, list::Selector>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector {
            arguments,
            filter:
                list::Filter {
                    user_id,
                    client_id,
                    status,
                    position,
                },
        } = by.into_inner();

        let limit =
            i32::try_from(arguments.limit()).unwrap_or(i32::MAX - 1) + 1;

        let mut ps: Vec<&(dyn ToSql + Sync)> = vec![&limit];

        let cursor_idx = arguments.cursor().map(|c| {
            ps.push(c);
            ps.len()
        });
        let user_idx = user_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let client_idx = client_id.as_ref().map(|id| {
            ps.push(id);
            ps.len()
        });
        let status_idx = status.as_ref().map(|s| {
            ps.push(s);
            ps.len()
        });
        let position_idx = position.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });

        let position_pattern = position
            .as_ref()
            .map(|p| FuzzPattern::new(AsRef::<str>::as_ref(p)));
        let position_pattern_idx = position_pattern.as_ref().map(|p| {
            ps.push(p);
            ps.len()
        });

        let order = arguments.kind().order().sql();
        let sql = format!(
            "SELECT id \
             FROM employments \
             WHERE true \
                   {cursor} \
                   {user_filtering} \
                   {client_filtering} \
                   {status_filtering} \
                   {position_filtering} \
             ORDER BY {position_ordering} \
                      id {order} \
             LIMIT $1::INT4",
            cursor = cursor_idx.into_iter().format_with("", |idx, f| {
                let op = arguments.kind().operator();
                f(&format_args!("AND id {op} ${idx}::UUID"))
            }),
            user_filtering = user_idx.into_iter().format_with("", |idx, f| {
                f(&format_args!("AND user_id = ${idx}::UUID"))
            }),
            client_filtering =
                client_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND client_id = ${idx}::UUID"))
                }),
            status_filtering =
                status_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!("AND status = ${idx}::INT2"))
                }),
            position_filtering =
                position_pattern_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "AND LOWER(position) SIMILAR TO LOWER(${idx}::VARCHAR)"
                    ))
                }),
            position_ordering =
                position_idx.into_iter().format_with("", |idx, f| {
                    f(&format_args!(
                        "LEVENSHTEIN(position, ${idx}::VARCHAR, 1, 1, 0) \
                         {order},"
                    ))
                }),
        );
        let rows = self
            .query(&sql, ps.as_slice())
            .await
            .map_err(tracerr::wrap!())?;

        let has_more = rows.len() > arguments.limit();
        let edges = rows
            .into_iter()
            .take(arguments.limit())
            .map(|row| {
                let id = row.get("id");
                (id, id)
            })
            .collect::<Vec<_>>();

        Ok(list::Page::new(&arguments, edges, has_more))
    }
}

impl<C> Database<Select<By<list::TotalCount, list::Filter>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = list::TotalCount;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::TotalCount, list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Filter {
            user_id,
            client_id,
            status,
            position,
        } = by.into_inner();
        let position = position
            .as_ref()
            .map(|p| FuzzPattern::new(AsRef::<str>::as_ref(p)));

        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM employments \
            WHERE ($1::UUID IS NULL OR user_id = $1::UUID) \
              AND ($2::UUID IS NULL OR client_id = $2::UUID) \
              AND ($3::INT2 IS NULL OR status = $3::INT2) \
              AND ($4::VARCHAR IS NULL \
                   OR LOWER(position) SIMILAR TO LOWER($4::VARCHAR))";
        let row = self
            .query_opt(SQL, &[&user_id, &client_id, &status, &position])
            .await
            .map_err(tracerr::wrap!())?;
        Ok(row.map_or(0, |row| row.get::<_, i32>(0)).into())
    }
}
