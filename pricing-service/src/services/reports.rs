use std::sync::Arc;

use crate::{
    dtos::reports::{CreateReportRequest, EstimateQuery},
    models::{Report, User},
    services::{ReportStore, ServiceError},
};

/// Report submission, approval and price estimation.
#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn ReportStore>,
}

impl ReportService {
    pub fn new(reports: Arc<dyn ReportStore>) -> Self {
        Self { reports }
    }

    /// Persist a report owned by the submitting user. New reports start
    /// unapproved and are invisible to estimates.
    pub async fn create(&self, user: &User, req: CreateReportRequest) -> Result<Report, ServiceError> {
        self.reports
            .create(user.id, &req)
            .await
            .map_err(ServiceError::Database)
    }

    pub async fn set_approval(&self, id: i64, approved: bool) -> Result<Report, ServiceError> {
        self.reports
            .set_approved(id, approved)
            .await
            .map_err(ServiceError::Database)?
            .ok_or(ServiceError::ReportNotFound)
    }

    pub async fn estimate(&self, query: &EstimateQuery) -> Result<Option<f64>, ServiceError> {
        self.reports
            .estimate(query)
            .await
            .map_err(ServiceError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MockReportStore;
    use chrono::Utc;

    fn owner() -> User {
        User {
            id: 1,
            email: "driver@example.com".to_string(),
            password_hash: "salt.key".to_string(),
            admin: true,
            created_utc: Utc::now(),
        }
    }

    fn report_req(price: f64, mileage: i64) -> CreateReportRequest {
        CreateReportRequest {
            make: "toyota".to_string(),
            model: "corolla".to_string(),
            year: 2018,
            mileage,
            lng: 0.0,
            lat: 0.0,
            price,
        }
    }

    fn estimate_query() -> EstimateQuery {
        EstimateQuery {
            make: "toyota".to_string(),
            model: "corolla".to_string(),
            year: 2018,
            mileage: 0,
            lng: 0.0,
            lat: 0.0,
        }
    }

    #[tokio::test]
    async fn new_reports_belong_to_the_submitter_and_start_unapproved() {
        let service = ReportService::new(Arc::new(MockReportStore::new()));

        let report = service.create(&owner(), report_req(10_000.0, 5_000)).await.unwrap();

        assert_eq!(report.user_id, 1);
        assert!(!report.approved);
    }

    #[tokio::test]
    async fn approving_an_unknown_report_is_not_found() {
        let service = ReportService::new(Arc::new(MockReportStore::new()));

        let err = service.set_approval(42, true).await.unwrap_err();
        assert!(matches!(err, ServiceError::ReportNotFound));
    }

    #[tokio::test]
    async fn estimate_ignores_unapproved_reports() {
        let service = ReportService::new(Arc::new(MockReportStore::new()));
        let user = owner();

        service.create(&user, report_req(99_999.0, 0)).await.unwrap();

        let price = service.estimate(&estimate_query()).await.unwrap();
        assert_eq!(price, None);
    }

    #[tokio::test]
    async fn estimate_averages_the_closest_approved_reports() {
        let service = ReportService::new(Arc::new(MockReportStore::new()));
        let user = owner();

        for (price, mileage) in [(10_000.0, 1_000), (20_000.0, 2_000), (30_000.0, 3_000)] {
            let report = service.create(&user, report_req(price, mileage)).await.unwrap();
            service.set_approval(report.id, true).await.unwrap();
        }
        // A fourth approved report far out in mileage falls outside the
        // three-closest window.
        let outlier = service.create(&user, report_req(90_000.0, 500_000)).await.unwrap();
        service.set_approval(outlier.id, true).await.unwrap();

        let price = service.estimate(&estimate_query()).await.unwrap();
        assert_eq!(price, Some(20_000.0));
    }
}
