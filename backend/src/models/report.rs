use chrono::{DateTime, Utc};
use marketplace_shared::{ReportStatus, ERROR_ALREADY_REPORTED};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use super::{unique_violation, Pagination};
use crate::error::AppError;

/// A user's complaint about an item, awaiting admin review.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub admin_notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub item_id: Uuid,
    pub user_id: Uuid,
    pub reason: String,
    pub description: Option<String>,
}

const REPORT_COLUMNS: &str = "id, item_id, user_id, reason, description, status, admin_notes, \
    reviewed_by, reviewed_at, created_at, updated_at";

impl Report {
    pub fn from_new(new: NewReport) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            item_id: new.item_id,
            user_id: new.user_id,
            reason: new.reason,
            description: new.description,
            status: ReportStatus::Pending,
            admin_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn create(conn: &mut PgConnection, new: NewReport) -> Result<Self, AppError> {
        let report = Self::from_new(new);
        sqlx::query_as::<_, Report>(&format!(
            "INSERT INTO item_reports ({REPORT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {REPORT_COLUMNS}"
        ))
        .bind(report.id)
        .bind(report.item_id)
        .bind(report.user_id)
        .bind(&report.reason)
        .bind(&report.description)
        .bind(report.status)
        .bind(&report.admin_notes)
        .bind(report.reviewed_by)
        .bind(report.reviewed_at)
        .bind(report.created_at)
        .bind(report.updated_at)
        .fetch_one(conn)
        .await
        .map_err(|e| unique_violation(e, ERROR_ALREADY_REPORTED))
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, AppError> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM item_reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(report)
    }

    pub async fn find_pending(
        conn: &mut PgConnection,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<Self>, AppError> {
        let report = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM item_reports \
             WHERE user_id = $1 AND item_id = $2 AND status = 'pending'"
        ))
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(conn)
        .await?;
        Ok(report)
    }

    pub async fn save(conn: &mut PgConnection, report: &Report) -> Result<Self, AppError> {
        let saved = sqlx::query_as::<_, Report>(&format!(
            r#"
            UPDATE item_reports SET
                status = $2, admin_notes = $3, reviewed_by = $4, reviewed_at = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report.id)
        .bind(report.status)
        .bind(&report.admin_notes)
        .bind(report.reviewed_by)
        .bind(report.reviewed_at)
        .fetch_one(conn)
        .await?;
        Ok(saved)
    }

    pub async fn list(
        conn: &mut PgConnection,
        status: Option<ReportStatus>,
        pagination: Pagination,
    ) -> Result<(Vec<Self>, i64), AppError> {
        // NULL status matches every report.
        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM item_reports \
             WHERE ($1::report_status IS NULL OR status = $1) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM item_reports WHERE ($1::report_status IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&mut *conn)
        .await?;

        Ok((reports, total))
    }

    pub async fn delete_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM item_reports WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
