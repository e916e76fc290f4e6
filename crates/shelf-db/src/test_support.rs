//! Shared test utilities for shelf-db tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use shelf_core::clock::ManualClock;
    use shelf_core::due::LoanPeriod;
    use shelf_core::workflow::WorkflowRegistry;

    use crate::ShelfDb;
    use crate::service::CirculationService;

    /// 2026-01-01T00:00:00Z.
    pub const T0: i64 = 1_767_225_600;

    pub fn at(epoch_secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(epoch_secs, 0).unwrap()
    }

    /// In-memory service with a manual clock at [`T0`] and a 14-day loan period.
    pub async fn test_service() -> CirculationService {
        test_service_with(LoanPeriod::Days(14)).await.0
    }

    /// In-memory service with the given loan period; the clock is returned for driving.
    pub async fn test_service_with(period: LoanPeriod) -> (CirculationService, Arc<ManualClock>) {
        let db = ShelfDb::open_local(":memory:").await.unwrap();
        let clock = Arc::new(ManualClock::at(T0));
        let svc = CirculationService::from_db(db, WorkflowRegistry::with_default(), period)
            .with_clock(clock.clone());
        (svc, clock)
    }

    /// Register members M1..M3 and holdings H1..H3, all on the shelf.
    pub async fn seed(svc: &CirculationService) {
        for (id, name) in [("M1", "Member One"), ("M2", "Member Two"), ("M3", "Member Three")] {
            svc.register_member(id, name, None).await.unwrap();
        }
        for (id, title) in [("H1", "Dune"), ("H2", "Emma"), ("H3", "Ulysses")] {
            svc.register_holding(id, title, None).await.unwrap();
        }
    }

    pub async fn seeded_service() -> CirculationService {
        let svc = test_service().await;
        seed(&svc).await;
        svc
    }

    pub async fn seeded_service_with(period: LoanPeriod) -> (CirculationService, Arc<ManualClock>) {
        let (svc, clock) = test_service_with(period).await;
        seed(&svc).await;
        (svc, clock)
    }
}
