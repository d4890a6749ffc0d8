//! Repository for the `traffic_rules` table.
//!
//! Enum columns are stored as free text. Writes store canonical values;
//! reads normalize whatever is there.

use dyemark_core::normalize::normalize_batch;
use dyemark_core::traffic::{RuleStatus, TrafficRule, DEFAULT_PRIORITY};
use dyemark_core::types::DbId;
use sqlx::PgPool;

use crate::models::traffic_rule::{CreateTrafficRule, TrafficRuleListQuery, TrafficRuleRow};

/// Column list for `traffic_rules` queries.
const COLUMNS: &str = "\
    id, name, description, target, app_type, protocol, status, priority, \
    dye_result, trace_info, report_data, created_at, updated_at";

/// Provides CRUD operations for traffic-dye rules.
pub struct TrafficRuleRepo;

impl TrafficRuleRepo {
    /// Insert a rule with canonical enum values.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTrafficRule,
    ) -> Result<Option<TrafficRule>, sqlx::Error> {
        let query = format!(
            "INSERT INTO traffic_rules \
                 (name, description, target, app_type, protocol, status, priority) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TrafficRuleRow>(&query)
            .bind(input.name.trim())
            .bind(input.description.as_deref())
            .bind(input.target.as_deref())
            .bind(input.app_type.as_str())
            .bind(input.protocol.as_str())
            .bind(input.status.as_str())
            .bind(input.priority.unwrap_or(DEFAULT_PRIORITY))
            .fetch_one(pool)
            .await?;
        Ok(row.into_rule())
    }

    /// Find a normalized rule by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TrafficRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM traffic_rules WHERE id = $1");
        let row = sqlx::query_as::<_, TrafficRuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.and_then(TrafficRuleRow::into_rule))
    }

    /// List rules by descending priority, then newest first.
    ///
    /// `status` and `app_type` filters compare against the stored text, so
    /// they only match rows holding canonical values.
    pub async fn list(
        pool: &PgPool,
        params: &TrafficRuleListQuery,
    ) -> Result<Vec<TrafficRule>, sqlx::Error> {
        let status = params.status.as_deref().filter(|s| !s.trim().is_empty());
        let app_type = params.app_type.as_deref().filter(|s| !s.trim().is_empty());

        let mut conditions: Vec<String> = Vec::new();
        let mut bind_idx: u32 = 1;

        if status.is_some() {
            conditions.push(format!("status = ${bind_idx}"));
            bind_idx += 1;
        }
        if app_type.is_some() {
            conditions.push(format!("app_type = ${bind_idx}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {COLUMNS} FROM traffic_rules {where_clause} \
             ORDER BY COALESCE(priority, {DEFAULT_PRIORITY}) DESC, created_at DESC, id DESC"
        );

        let mut q = sqlx::query_as::<_, TrafficRuleRow>(&query);
        if let Some(s) = status {
            q = q.bind(s.trim());
        }
        if let Some(a) = app_type {
            q = q.bind(a.trim());
        }

        let rows = q.fetch_all(pool).await?;
        Ok(normalize_batch(rows, "traffic_rule", TrafficRuleRow::into_rule))
    }

    /// Mark a rule as dispatched to the processor under `task_id`.
    ///
    /// Returns the updated rule, or `None` if it does not exist.
    pub async fn mark_dispatched(
        pool: &PgPool,
        id: DbId,
        task_id: &str,
    ) -> Result<Option<TrafficRule>, sqlx::Error> {
        let query = format!(
            "UPDATE traffic_rules SET status = $2, last_task_id = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, TrafficRuleRow>(&query)
            .bind(id)
            .bind(RuleStatus::Processing.as_str())
            .bind(task_id)
            .fetch_optional(pool)
            .await?;
        Ok(row.and_then(TrafficRuleRow::into_rule))
    }
}
