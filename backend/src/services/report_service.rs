use std::sync::Arc;

use chrono::Utc;
use marketplace_shared::{
    ItemStatus, ReportItemRequest, ReportQuery, ReportStatus, ReviewReportRequest, UserRole, ERROR_ALREADY_REPORTED,
    ERROR_ITEM_NOT_FOUND,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::Actor;
use crate::error::AppError;
use crate::models::{NewReport, Page, Pagination, Report};
use crate::repositories::{finish, Repository, UnitOfWork};

/// Moderation queue for reported items.
#[derive(Clone)]
pub struct ReportService {
    repo: Arc<dyn Repository>,
}

impl ReportService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// File a report; a user may hold at most one pending report per item.
    pub async fn report_item(
        &self,
        actor: &Actor,
        item_id: Uuid,
        request: ReportItemRequest,
    ) -> Result<Report, AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = Self::report_in(uow.as_mut(), actor.user_id, item_id, request).await;
        let report = finish(uow, result).await?;

        info!(report_id = %report.id, item_id = %item_id, "Item reported");
        Ok(report)
    }

    async fn report_in(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        item_id: Uuid,
        request: ReportItemRequest,
    ) -> Result<Report, AppError> {
        if uow.find_item(item_id).await?.is_none() {
            return Err(AppError::NotFound(ERROR_ITEM_NOT_FOUND.to_string()));
        }
        if uow.find_pending_report(user_id, item_id).await?.is_some() {
            return Err(AppError::Duplicate(ERROR_ALREADY_REPORTED.to_string()));
        }

        uow.insert_report(NewReport {
            item_id,
            user_id,
            reason: request.reason.trim().to_string(),
            description: request.description,
        })
        .await
    }

    /// Admin listing; `status` defaults to pending and accepts `all`.
    pub async fn list_reports(&self, actor: &Actor, query: ReportQuery) -> Result<Page<Report>, AppError> {
        actor.require(UserRole::Admin)?;
        let status = parse_status_filter(query.status.as_deref())?;
        let pagination = Pagination::new(query.page, query.per_page);

        let mut uow = self.repo.begin().await?;
        let result = uow.list_reports(status, pagination).await;
        finish(uow, result).await
    }

    /// Close out a report, optionally taking the item off the catalog.
    pub async fn review_report(
        &self,
        actor: &Actor,
        report_id: Uuid,
        request: ReviewReportRequest,
    ) -> Result<Report, AppError> {
        actor.require(UserRole::Admin)?;
        if request.status == ReportStatus::Pending {
            return Err(AppError::Validation("status must be one of reviewed, resolved".to_string()));
        }

        let mut uow = self.repo.begin().await?;
        let result = Self::review_in(uow.as_mut(), actor.user_id, report_id, request).await;
        let report = finish(uow, result).await?;

        info!(report_id = %report.id, status = %report.status, reviewer = %actor.user_id, "Report reviewed");
        Ok(report)
    }

    async fn review_in(
        uow: &mut dyn UnitOfWork,
        admin_id: Uuid,
        report_id: Uuid,
        request: ReviewReportRequest,
    ) -> Result<Report, AppError> {
        let mut report = uow
            .find_report(report_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

        report.status = request.status;
        report.admin_notes = request.admin_notes;
        report.reviewed_by = Some(admin_id);
        report.reviewed_at = Some(Utc::now());
        let report = uow.save_report(&report).await?;

        if request.remove_item {
            if let Some(mut item) = uow.find_item(report.item_id).await? {
                item.status = ItemStatus::Removed;
                uow.save_item(&item).await?;
                info!(item_id = %item.id, "Item removed after report");
            }
        }

        Ok(report)
    }
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<ReportStatus>, AppError> {
    match raw.unwrap_or("pending") {
        "all" => Ok(None),
        "pending" => Ok(Some(ReportStatus::Pending)),
        "reviewed" => Ok(Some(ReportStatus::Reviewed)),
        "resolved" => Ok(Some(ReportStatus::Resolved)),
        other => Err(AppError::Validation(format!("Unknown report status '{}'", other))),
    }
}
