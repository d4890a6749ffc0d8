//! Repository for the `job_records` table.
//!
//! Every read goes through [`RecordRow::into_record`], so callers only ever
//! see normalized [`Record`] values.

use dyemark_core::normalize::normalize_batch;
use dyemark_core::pagination::PageRequest;
use dyemark_core::record::{Record, RecordStatus};
use dyemark_core::types::DbId;
use sqlx::PgPool;

use crate::models::record::{like_pattern, CreateRecord, RecordFilter, RecordRow};

/// Select list shared by all record reads. Expects aliases `r`, `c`, `p`.
const COLUMNS: &str = "\
    r.id, r.task_id, r.biz_id, r.operation, r.status, r.file_url, r.file_size, \
    c.content AS watermark_text, r.policy_id, p.name AS policy_name, \
    r.progress, r.result, r.metadata, r.error, r.retry_of_record_id, \
    r.created_at, r.updated_at";

const FROM_JOINED: &str = "\
    FROM job_records r \
    LEFT JOIN watermark_contents c ON c.id = r.content_id \
    LEFT JOIN policies p ON p.id = r.policy_id";

/// Provides record persistence and the filtered, paginated listing.
pub struct RecordRepo;

impl RecordRepo {
    /// Insert a record and return its id.
    pub async fn create(pool: &PgPool, input: &CreateRecord) -> Result<DbId, sqlx::Error> {
        let metadata = input.metadata.as_ref().map(|m| m.to_string());
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO job_records \
                 (task_id, biz_id, operation, status, file_url, file_size, \
                  content_id, policy_id, traffic_rule_id, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id",
        )
        .bind(input.task_id.as_deref())
        .bind(input.biz_id.as_deref())
        .bind(input.operation.as_str())
        .bind(input.status.as_str())
        .bind(input.file_url.as_deref())
        .bind(input.file_size)
        .bind(input.content_id)
        .bind(input.policy_id)
        .bind(input.traffic_rule_id)
        .bind(metadata)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Find a normalized record by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Record>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} {FROM_JOINED} WHERE r.id = $1");
        let row = sqlx::query_as::<_, RecordRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.and_then(RecordRow::into_record))
    }

    /// Filtered, newest-first page of records plus the unpaginated total.
    ///
    /// `keyword` is a case-insensitive substring match over `task_id`,
    /// `file_url`, and `result`; `operation` and `status` are exact matches.
    ///
    /// The operation and status filters compare against the stored text, so
    /// a row holding a non-canonical value is not matched by the value it
    /// normalizes to on read.
    pub async fn list(
        pool: &PgPool,
        filter: &RecordFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Record>, i64), sqlx::Error> {
        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if filter.keyword().is_some() {
            conditions.push(format!(
                "(r.task_id ILIKE ${bind_idx} ESCAPE '\\' \
                  OR r.file_url ILIKE ${bind_idx} ESCAPE '\\' \
                  OR r.result ILIKE ${bind_idx} ESCAPE '\\')"
            ));
            bind_idx += 1;
        }
        if filter.operation().is_some() {
            conditions.push(format!("r.operation = ${bind_idx}"));
            bind_idx += 1;
        }
        if filter.status().is_some() {
            conditions.push(format!("r.status = ${bind_idx}"));
            bind_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_query = format!("SELECT COUNT(*) FROM job_records r {where_clause}");
        let list_query = format!(
            "SELECT {COLUMNS} {FROM_JOINED} \
             {where_clause} \
             ORDER BY r.created_at DESC, r.id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );

        let keyword = filter.keyword().map(like_pattern);

        let mut count_q = sqlx::query_scalar::<_, i64>(&count_query);
        let mut list_q = sqlx::query_as::<_, RecordRow>(&list_query);

        if let Some(ref pattern) = keyword {
            count_q = count_q.bind(pattern);
            list_q = list_q.bind(pattern);
        }
        if let Some(operation) = filter.operation() {
            count_q = count_q.bind(operation);
            list_q = list_q.bind(operation);
        }
        if let Some(status) = filter.status() {
            count_q = count_q.bind(status);
            list_q = list_q.bind(status);
        }
        list_q = list_q.bind(page.limit()).bind(page.offset());

        let total = count_q.fetch_one(pool).await?;
        let rows = list_q.fetch_all(pool).await?;

        Ok((normalize_batch(rows, "record", RecordRow::into_record), total))
    }

    /// Apply a polled status to every live record carrying `task_id`.
    ///
    /// Only records whose current status is in `from` are touched, so
    /// terminal records are never rewritten. Returns the number of rows
    /// updated.
    pub async fn sync_task_status(
        pool: &PgPool,
        task_id: &str,
        from: &[RecordStatus],
        to: RecordStatus,
        progress: u8,
        result: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        if from.is_empty() {
            return Ok(0);
        }
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();

        let outcome = sqlx::query(
            "UPDATE job_records \
             SET status = $3, progress = $4, result = COALESCE($5, result) \
             WHERE task_id = $1 AND status = ANY($2)",
        )
        .bind(task_id)
        .bind(&from)
        .bind(to.as_str())
        .bind(i32::from(progress))
        .bind(result)
        .execute(pool)
        .await?;
        Ok(outcome.rows_affected())
    }

    /// Insert a retry attempt copying the original's job parameters.
    ///
    /// The new row gets `task_id = biz_id = new_task_id`, status
    /// `processing`, and `retry_of_record_id` pointing at the original,
    /// which is left untouched. Returns `None` if the original is missing.
    pub async fn create_retry(
        pool: &PgPool,
        original_id: DbId,
        new_task_id: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let row: Option<(DbId,)> = sqlx::query_as(
            "INSERT INTO job_records \
                 (task_id, biz_id, operation, status, file_url, file_size, \
                  content_id, policy_id, traffic_rule_id, metadata, progress, \
                  retry_of_record_id) \
             SELECT $2, $2, operation, $3, file_url, file_size, \
                    content_id, policy_id, traffic_rule_id, metadata, 0, id \
             FROM job_records WHERE id = $1 \
             RETURNING id",
        )
        .bind(original_id)
        .bind(new_task_id)
        .bind(RecordStatus::Processing.as_str())
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }
}
