//! `PostgreSQL` repository implementation for task record storage.

use super::{
    models::{NewTaskRecordRow, TaskRecordRow},
    schema::task_records,
};
use crate::task::{
    domain::{
        OwnerId, OwnerRef, PersistedTaskRecordData, TaskId, TaskMetaState, TaskRecord,
    },
    ports::{
        TaskRecordOrder, TaskRecordQuery, TaskRecordRepository, TaskRepositoryError,
        TaskRepositoryResult,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task record repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRecordRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRecordRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

/// Column-level form of a [`TaskRecordQuery`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RowFilter {
    owner: Option<(String, i64)>,
    owner_kind: Option<String>,
    task_id: Option<String>,
    excluded_task_id: Option<String>,
    states: Option<Vec<i16>>,
}

impl RowFilter {
    fn from_query(query: &TaskRecordQuery) -> TaskRepositoryResult<Self> {
        let owner = query
            .owner()
            .map(|owner| Ok((owner.kind().as_str().to_owned(), owner_id_to_column(owner.id())?)))
            .transpose()?;
        Ok(Self {
            owner,
            owner_kind: query.owner_kind().map(|kind| kind.as_str().to_owned()),
            task_id: query.task_id().map(|task_id| task_id.as_str().to_owned()),
            excluded_task_id: query
                .excluded_task_id()
                .map(|task_id| task_id.as_str().to_owned()),
            states: query.state().map(|filter| {
                filter
                    .states()
                    .into_iter()
                    .map(TaskMetaState::code)
                    .collect()
            }),
        })
    }

    fn apply<'a, ST>(
        &self,
        mut query: task_records::BoxedQuery<'a, Pg, ST>,
    ) -> task_records::BoxedQuery<'a, Pg, ST> {
        if let Some((kind, id)) = &self.owner {
            query = query
                .filter(task_records::owner_kind.eq(kind.clone()))
                .filter(task_records::owner_id.eq(*id));
        }
        if let Some(kind) = &self.owner_kind {
            query = query.filter(task_records::owner_kind.eq(kind.clone()));
        }
        if let Some(task_id) = &self.task_id {
            query = query.filter(task_records::task_id.eq(task_id.clone()));
        }
        if let Some(task_id) = &self.excluded_task_id {
            query = query.filter(task_records::task_id.ne(task_id.clone()));
        }
        if let Some(states) = &self.states {
            query = query.filter(task_records::state.eq_any(states.clone()));
        }
        query
    }
}

#[async_trait]
impl TaskRecordRepository for PostgresTaskRecordRepository {
    async fn insert(&self, record: &TaskRecord) -> TaskRepositoryResult<()> {
        let task_id = record.task_id().clone();
        let new_row = to_new_row(record)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(task_records::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id.clone())
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn save(&self, record: &TaskRecord) -> TaskRepositoryResult<()> {
        let task_id = record.task_id().clone();
        let row = to_new_row(record)?;

        self.run_blocking(move |connection| {
            let updated = diesel::update(
                task_records::table.filter(task_records::task_id.eq(task_id.as_str())),
            )
            .set(&row)
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            if updated == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_task_id(&self, task_id: &TaskId) -> TaskRepositoryResult<Option<TaskRecord>> {
        let lookup = task_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = task_records::table
                .filter(task_records::task_id.eq(lookup))
                .select(TaskRecordRow::as_select())
                .first::<TaskRecordRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn find(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<Vec<TaskRecord>> {
        let filter = RowFilter::from_query(query)?;
        self.run_blocking(move |connection| {
            let rows = filter
                .apply(
                    task_records::table
                        .select(TaskRecordRow::as_select())
                        .into_boxed(),
                )
                .order(task_records::id.asc())
                .load::<TaskRecordRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }

    async fn first(
        &self,
        query: &TaskRecordQuery,
        order: TaskRecordOrder,
    ) -> TaskRepositoryResult<Option<TaskRecord>> {
        let filter = RowFilter::from_query(query)?;
        self.run_blocking(move |connection| {
            let base = filter.apply(
                task_records::table
                    .select(TaskRecordRow::as_select())
                    .into_boxed(),
            );
            let ordered = match order {
                TaskRecordOrder::Newest => base.order(task_records::id.desc()),
                TaskRecordOrder::LastUpdated => base.order((
                    task_records::updated_at.desc(),
                    task_records::id.desc(),
                )),
            };
            let row = ordered
                .first::<TaskRecordRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_record).transpose()
        })
        .await
    }

    async fn owners(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<Vec<OwnerRef>> {
        let filter = RowFilter::from_query(query)?;
        self.run_blocking(move |connection| {
            let pairs = filter
                .apply(
                    task_records::table
                        .select((task_records::owner_kind, task_records::owner_id))
                        .distinct()
                        .into_boxed(),
                )
                .order((task_records::owner_kind.asc(), task_records::owner_id.asc()))
                .load::<(String, i64)>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            pairs
                .into_iter()
                .map(|(kind, id)| owner_from_columns(kind, id))
                .collect()
        })
        .await
    }

    async fn update_state(
        &self,
        task_id: &TaskId,
        state: TaskMetaState,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<u64> {
        let lookup = task_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                task_records::table.filter(task_records::task_id.eq(lookup)),
            )
            .set((
                task_records::state.eq(state.code()),
                task_records::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(to_count(updated))
        })
        .await
    }

    async fn block_ui(&self, task_id: &TaskId) -> TaskRepositoryResult<u64> {
        let lookup = task_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let updated = diesel::update(
                task_records::table.filter(task_records::task_id.eq(lookup)),
            )
            .set(task_records::ui_block.eq(true))
            .execute(connection)
            .map_err(TaskRepositoryError::persistence)?;
            Ok(to_count(updated))
        })
        .await
    }

    async fn delete(&self, query: &TaskRecordQuery) -> TaskRepositoryResult<u64> {
        let filter = RowFilter::from_query(query)?;
        self.run_blocking(move |connection| {
            let deleted = connection
                .transaction::<usize, DieselError, _>(|conn| {
                    let ids = filter
                        .apply(task_records::table.select(task_records::id).into_boxed())
                        .load::<i64>(conn)?;
                    if ids.is_empty() {
                        return Ok(0);
                    }
                    diesel::delete(task_records::table.filter(task_records::id.eq_any(ids)))
                        .execute(conn)
                })
                .map_err(TaskRepositoryError::persistence)?;
            Ok(to_count(deleted))
        })
        .await
    }
}

fn to_new_row(record: &TaskRecord) -> TaskRepositoryResult<NewTaskRecordRow> {
    Ok(NewTaskRecordRow {
        task_id: record.task_id().as_str().to_owned(),
        owner_kind: record.owner().kind().as_str().to_owned(),
        owner_id: owner_id_to_column(record.owner().id())?,
        task_name: record.task_name().to_owned(),
        state: record.state().code(),
        created_at: record.created_at(),
        updated_at: record.updated_at(),
        ui_block: record.ui_block(),
    })
}

fn row_to_record(row: TaskRecordRow) -> TaskRepositoryResult<TaskRecord> {
    let data = PersistedTaskRecordData {
        task_id: TaskId::new(row.task_id).map_err(TaskRepositoryError::persistence)?,
        owner: owner_from_columns(row.owner_kind, row.owner_id)?,
        task_name: row.task_name,
        state: TaskMetaState::from_code(row.state).map_err(TaskRepositoryError::persistence)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
        ui_block: row.ui_block,
    };
    Ok(TaskRecord::from_persisted(data))
}

fn owner_from_columns(kind: String, id: i64) -> TaskRepositoryResult<OwnerRef> {
    let owner_id = u64::try_from(id).map_err(TaskRepositoryError::persistence)?;
    OwnerRef::from_parts(kind, owner_id).map_err(TaskRepositoryError::persistence)
}

fn owner_id_to_column(id: OwnerId) -> TaskRepositoryResult<i64> {
    i64::try_from(id.value()).map_err(TaskRepositoryError::persistence)
}

fn to_count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
