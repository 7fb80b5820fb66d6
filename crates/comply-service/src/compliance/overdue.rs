//! Daily overdue marking.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use comply_core::result::AppResult;
use comply_database::repositories::AssignmentRepository;

/// Moves assignments past their deadline to OVERDUE.
#[derive(Debug, Clone)]
pub struct OverdueService {
    assignment_repo: Arc<AssignmentRepository>,
}

impl OverdueService {
    pub fn new(assignment_repo: Arc<AssignmentRepository>) -> Self {
        Self { assignment_repo }
    }

    /// Mark PENDING and REJECTED assignments with `deadline < today` as
    /// OVERDUE. Returns how many rows changed.
    pub async fn mark(&self, today: NaiveDate) -> AppResult<usize> {
        let marked = self.assignment_repo.mark_overdue(today).await?;
        info!(%today, count = marked.len(), "Marked overdue assignments");
        Ok(marked.len())
    }
}
