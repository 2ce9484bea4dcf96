//! SQL task store backed by an sqlx SQLite pool

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use tracing::{debug, info, instrument};

use crate::task::{NewTask, Pagination, Task, TaskFilter};
use crate::{Error, Result};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const SELECT_TASKS: &str =
    "SELECT id, title, description, status, due_date, created_at, updated_at FROM tasks";

const COUNT_TASKS: &str = "SELECT COUNT(*) FROM tasks";

const SELECT_TASK_BY_ID: &str = "SELECT id, title, description, status, due_date, created_at, updated_at \
     FROM tasks WHERE id = ?";

const INSERT_TASK: &str = "INSERT INTO tasks \
     (title, description, status, due_date, created_at, updated_at, title_folded, description_folded) \
     VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
     RETURNING id, title, description, status, due_date, created_at, updated_at";

const UPDATE_TASK: &str = "UPDATE tasks \
     SET title = ?, description = ?, status = ?, due_date = ?, updated_at = ?, \
         title_folded = ?, description_folded = ? \
     WHERE id = ? \
     RETURNING id, title, description, status, due_date, created_at, updated_at";

const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?";

/// Connection settings for the task store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://tasks.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Task store over a shared connection pool
///
/// Cloning is cheap and shares the pool.
#[derive(Debug, Clone)]
pub struct SqlTaskStore {
    pool: SqlitePool,
}

impl SqlTaskStore {
    /// Connect to the database at `config.url`, creating the file if missing
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        info!(url = %config.url, "Connected to task store");
        Ok(Self { pool })
    }

    /// Open a private in-memory database with the schema applied
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// every SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Close every pooled connection; later statements fail with `StoreUnavailable`
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Task store closed");
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(sqlx::Error::from)?;
        Ok(())
    }

    /// Round-trip a trivial statement to check connectivity
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self, task), fields(title = %task.title))]
    pub async fn insert(&self, task: &NewTask, now: DateTime<Utc>) -> Result<Task> {
        let created = sqlx::query_as::<_, Task>(INSERT_TASK)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.due_date)
            .bind(now)
            .bind(now)
            .bind(fold(&task.title))
            .bind(task.description.as_deref().map(fold))
            .fetch_one(&self.pool)
            .await?;

        debug!(id = created.id, "Inserted task row");
        Ok(created)
    }

    /// Fetch a task row; `Ok(None)` when no row has this id
    #[instrument(skip(self))]
    pub async fn fetch(&self, id: i64) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(SELECT_TASK_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    /// Count rows matching the filter, ignoring pagination
    #[instrument(skip(self))]
    pub async fn count(&self, filter: &TaskFilter) -> Result<u64> {
        let mut query = QueryBuilder::<Sqlite>::new(COUNT_TASKS);
        push_predicate(&mut query, filter);

        let total = query.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    /// Fetch one page of rows matching the filter, ordered by id
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, filter: &TaskFilter, pagination: Pagination) -> Result<Vec<Task>> {
        let offset = i64::try_from(pagination.offset())
            .map_err(|_| Error::validation("page is out of range"))?;

        let mut query = QueryBuilder::<Sqlite>::new(SELECT_TASKS);
        push_predicate(&mut query, filter);
        query
            .push(" ORDER BY id ASC LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(offset);

        let tasks = query.build_query_as::<Task>().fetch_all(&self.pool).await?;
        debug!(rows = tasks.len(), "Fetched task page");
        Ok(tasks)
    }

    /// Replace the mutable fields of a row; `Ok(None)` when the row is gone
    #[instrument(skip(self, task), fields(id = task.id))]
    pub async fn update(&self, task: &Task, now: DateTime<Utc>) -> Result<Option<Task>> {
        let updated = sqlx::query_as::<_, Task>(UPDATE_TASK)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.due_date)
            .bind(now)
            .bind(fold(&task.title))
            .bind(task.description.as_deref().map(fold))
            .bind(task.id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    /// Physically remove a row; returns whether one existed
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(DELETE_TASK)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Append the WHERE clause shared by the count and the page statements
///
/// Both listing statements go through here so their predicates cannot drift.
fn push_predicate<'args>(query: &mut QueryBuilder<'args, Sqlite>, filter: &TaskFilter) {
    query.push(" WHERE 1 = 1");

    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status);
    }

    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        query
            .push(" AND (title_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description_folded LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Case folding shared by the stored search columns and search terms
fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Folded substring pattern with LIKE wildcards escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in fold(term).chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    async fn seed(store: &SqlTaskStore, title: &str, status: TaskStatus) -> Task {
        store
            .insert(&NewTask::new(title, due()).with_status(status), Utc::now())
            .await
            .unwrap()
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Milk"), "%milk%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_predicate_is_identical_for_count_and_page() {
        let filter = TaskFilter::default()
            .with_status(TaskStatus::Completed)
            .with_search("milk");

        let mut count = QueryBuilder::<Sqlite>::new(COUNT_TASKS);
        push_predicate(&mut count, &filter);
        let mut page = QueryBuilder::<Sqlite>::new(SELECT_TASKS);
        push_predicate(&mut page, &filter);

        let count_sql = count.sql().to_string();
        let page_sql = page.sql().to_string();
        assert_eq!(
            count_sql.strip_prefix(COUNT_TASKS),
            page_sql.strip_prefix(SELECT_TASKS)
        );
        assert!(count_sql.contains("status = ?"));
        assert!(count_sql.contains("description_folded LIKE ?"));
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        let now = Utc::now();

        let task = store
            .insert(&NewTask::new("Buy milk", due()).with_description("Two litres"), now)
            .await
            .unwrap();

        assert!(task.id > 0);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description.as_deref(), Some("Two litres"));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.due_date, due());
        assert_eq!(task.created_at, now);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[tokio::test]
    async fn test_fetch_distinguishes_missing_row() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        let task = seed(&store, "Buy milk", TaskStatus::Pending).await;

        assert_eq!(store.fetch(task.id).await.unwrap(), Some(task));
        assert_eq!(store.fetch(9999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_count_and_page_apply_status_filter() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        for i in 0..3 {
            seed(&store, &format!("Done {}", i), TaskStatus::Completed).await;
        }
        for i in 0..2 {
            seed(&store, &format!("Open {}", i), TaskStatus::Pending).await;
        }

        let filter = TaskFilter::default().with_status(TaskStatus::Completed);
        assert_eq!(store.count(&filter).await.unwrap(), 3);

        let page = store.fetch_page(&filter, Pagination::new(1, 10)).await.unwrap();
        assert_eq!(page.len(), 3);
        assert!(page.iter().all(|t| t.status == TaskStatus::Completed));

        assert_eq!(store.count(&TaskFilter::default()).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_search_matches_title_or_description_case_insensitively() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        seed(&store, "Buy MILK", TaskStatus::Pending).await;
        store
            .insert(
                &NewTask::new("Groceries", due()).with_description("eggs and milk"),
                Utc::now(),
            )
            .await
            .unwrap();
        seed(&store, "Walk the dog", TaskStatus::Pending).await;

        let filter = TaskFilter::default().with_search("Milk");
        assert_eq!(store.count(&filter).await.unwrap(), 2);

        let titles: HashSet<String> = store
            .fetch_page(&filter, Pagination::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert!(titles.contains("Buy MILK"));
        assert!(titles.contains("Groceries"));
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        seed(&store, "50% off", TaskStatus::Pending).await;
        seed(&store, "500 items", TaskStatus::Pending).await;

        let filter = TaskFilter::default().with_search("50%");
        assert_eq!(store.count(&filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_folds_non_ascii_case() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        seed(&store, "Éclair order", TaskStatus::Pending).await;
        store
            .insert(
                &NewTask::new("Bakery", due()).with_description("Straße café"),
                Utc::now(),
            )
            .await
            .unwrap();

        for term in ["Éclair", "éclair", "ÉCLAIR"] {
            let filter = TaskFilter::default().with_search(term);
            assert_eq!(store.count(&filter).await.unwrap(), 1, "{}", term);
        }

        let filter = TaskFilter::default().with_search("CAFÉ");
        let page = store.fetch_page(&filter, Pagination::default()).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Bakery");
    }

    #[tokio::test]
    async fn test_search_sees_updated_text() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        let mut task = seed(&store, "Buy milk", TaskStatus::Pending).await;

        task.title = "Ölwechsel".to_string();
        store.update(&task, Utc::now()).await.unwrap();

        let milk = TaskFilter::default().with_search("milk");
        let oil = TaskFilter::default().with_search("ölwechsel");
        assert_eq!(store.count(&milk).await.unwrap(), 0);
        assert_eq!(store.count(&oil).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        store.close().await;

        assert!(matches!(
            store.fetch(1).await,
            Err(Error::StoreUnavailable(_))
        ));
        assert!(matches!(
            store.count(&TaskFilter::default()).await,
            Err(Error::StoreUnavailable(_))
        ));
        assert!(store.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_status_and_search_compose() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        seed(&store, "Buy milk", TaskStatus::Completed).await;
        seed(&store, "Buy bread", TaskStatus::Completed).await;
        seed(&store, "Buy milk again", TaskStatus::Pending).await;

        let filter = TaskFilter::default()
            .with_status(TaskStatus::Completed)
            .with_search("milk");
        assert_eq!(store.count(&filter).await.unwrap(), 1);
        let page = store.fetch_page(&filter, Pagination::default()).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn test_pages_are_ordered_and_disjoint() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        for i in 0..7 {
            seed(&store, &format!("Task {}", i), TaskStatus::Pending).await;
        }

        let filter = TaskFilter::default();
        let first = store.fetch_page(&filter, Pagination::new(1, 3)).await.unwrap();
        let second = store.fetch_page(&filter, Pagination::new(2, 3)).await.unwrap();
        let third = store.fetch_page(&filter, Pagination::new(3, 3)).await.unwrap();
        let beyond = store.fetch_page(&filter, Pagination::new(4, 3)).await.unwrap();

        assert_eq!((first.len(), second.len(), third.len()), (3, 3, 1));
        assert!(beyond.is_empty());
        assert!(first.last().unwrap().id < second[0].id);
        assert!(second.last().unwrap().id < third[0].id);
    }

    #[tokio::test]
    async fn test_update_replaces_mutable_fields() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        let mut task = seed(&store, "Buy milk", TaskStatus::Pending).await;
        let created_at = task.created_at;

        task.title = "Buy oat milk".to_string();
        task.status = TaskStatus::Completed;
        task.due_date = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let later = Utc::now();

        let updated = store.update(&task, later).await.unwrap().unwrap();
        assert_eq!(updated.title, "Buy oat milk");
        assert_eq!(updated.status, TaskStatus::Completed);
        assert_eq!(updated.due_date, task.due_date);
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.updated_at, later);
    }

    #[tokio::test]
    async fn test_update_missing_row_returns_none() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        let mut task = seed(&store, "Buy milk", TaskStatus::Pending).await;
        task.id = 9999;

        assert!(store.update(&task, Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_physical_and_ids_are_not_reused() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        let first = seed(&store, "First", TaskStatus::Pending).await;
        let second = seed(&store, "Second", TaskStatus::Pending).await;

        assert!(store.delete(second.id).await.unwrap());
        assert!(!store.delete(second.id).await.unwrap());
        assert_eq!(store.fetch(second.id).await.unwrap(), None);

        let third = seed(&store, "Third", TaskStatus::Pending).await;
        assert!(third.id > second.id);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let config = StoreConfig {
            url: format!("sqlite://{}", temp_dir.path().join("tasks.db").display()),
            max_connections: 1,
        };

        let task_id = {
            let store = SqlTaskStore::connect(&config).await.unwrap();
            store.migrate().await.unwrap();
            seed(&store, "Persistent task", TaskStatus::Completed).await.id
        };

        let store = SqlTaskStore::connect(&config).await.unwrap();
        store.migrate().await.unwrap();
        let task = store.fetch(task_id).await.unwrap().unwrap();
        assert_eq!(task.title, "Persistent task");
        assert_eq!(task.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_ping() {
        let store = SqlTaskStore::in_memory().await.unwrap();
        store.ping().await.unwrap();
    }
}
