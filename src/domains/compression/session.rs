//! Application-side state for one selection at a time.
//!
//! A run is tied to the selection it started against. If the user picks
//! something else before the run finishes, its outcome is dropped.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

use crate::domains::media::types::Asset;
use crate::errors::{ServiceError, ServiceResult};
use super::mapper::CompressionLevel;
use super::service::CompressionService;
use super::types::CompressionResult;

/// Handle for one in-flight run
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionTicket {
    pub generation: u64,
    pub asset: Asset,
    pub level: CompressionLevel,
}

/// Snapshot of the session for the presentation layer
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub selected: Option<Asset>,
    pub level: CompressionLevel,
    pub is_compressing: bool,
    pub result: Option<CompressionResult>,
}

#[derive(Debug, Default)]
struct SessionState {
    selected: Option<Asset>,
    level: CompressionLevel,
    in_flight: Option<u64>,
    result: Option<CompressionResult>,
    generation: u64,
}

#[derive(Debug, Default)]
pub struct CompressionSession {
    state: Mutex<SessionState>,
}

impl CompressionSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ServiceResult<MutexGuard<'_, SessionState>> {
        self.state.lock()
            .map_err(|_| ServiceError::Ui("Compression session lock poisoned".to_string()))
    }

    /// Replace the selection. Clears the last result and invalidates any run
    /// still in flight.
    pub fn select_asset(&self, asset: Asset) -> ServiceResult<()> {
        let mut state = self.lock()?;
        log::debug!("Selected {} ({})", asset.location, asset.kind);
        state.selected = Some(asset);
        state.result = None;
        state.in_flight = None;
        state.generation += 1;
        Ok(())
    }

    pub fn set_level(&self, level: CompressionLevel) -> ServiceResult<()> {
        self.lock()?.level = level;
        Ok(())
    }

    pub fn snapshot(&self) -> ServiceResult<SessionSnapshot> {
        let state = self.lock()?;
        Ok(SessionSnapshot {
            selected: state.selected.clone(),
            level: state.level,
            is_compressing: state.in_flight.is_some(),
            result: state.result.clone(),
        })
    }

    /// Start a run against the current selection and level.
    pub fn begin(&self) -> ServiceResult<CompressionTicket> {
        let mut state = self.lock()?;

        let asset = state.selected.clone()
            .ok_or_else(|| ServiceError::Ui("Please select an image or video first.".to_string()))?;

        if state.in_flight.is_some() {
            return Err(ServiceError::Ui("Compression already in progress".to_string()));
        }

        state.generation += 1;
        state.in_flight = Some(state.generation);
        state.result = None;

        Ok(CompressionTicket {
            generation: state.generation,
            asset,
            level: state.level,
        })
    }

    /// Record the outcome of a run.
    ///
    /// Returns `None` when the ticket is stale; the outcome is dropped and the
    /// session is left untouched.
    pub fn finish(
        &self,
        ticket: &CompressionTicket,
        outcome: ServiceResult<CompressionResult>,
    ) -> Option<ServiceResult<CompressionResult>> {
        let mut state = match self.lock() {
            Ok(state) => state,
            Err(e) => return Some(Err(e)),
        };

        let is_current = state.in_flight == Some(ticket.generation)
            && state.selected.as_ref().map(|a| a.id) == Some(ticket.asset.id);
        if !is_current {
            log::debug!("Discarding stale compression outcome for {}", ticket.asset.location);
            return None;
        }

        state.in_flight = None;
        match &outcome {
            Ok(result) => state.result = Some(result.clone()),
            Err(e) => {
                log::warn!("Compression of {} failed: {}", ticket.asset.location, e);
                state.result = None;
            }
        }
        Some(outcome)
    }

    /// begin, compress, finish. `Ok(None)` means the selection changed while
    /// the run was in flight.
    pub async fn run(&self, service: &dyn CompressionService) -> ServiceResult<Option<CompressionResult>> {
        let ticket = self.begin()?;
        let outcome = service.compress(&ticket.asset, ticket.level).await;
        self.finish(&ticket, outcome).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::media::types::MediaKind;
    use crate::domains::media::saver::SaveDestination;
    use crate::domains::compression::mapper::CompressionLevelInfo;
    use crate::errors::DomainError;
    use async_trait::async_trait;

    fn result_for(asset: &Asset) -> CompressionResult {
        CompressionResult::new(asset, "out.jpg".to_string(), CompressionLevel::default(), 1000, Some(500), 5)
    }

    struct FixedService;

    #[async_trait]
    impl CompressionService for FixedService {
        async fn compress(&self, asset: &Asset, level: CompressionLevel) -> ServiceResult<CompressionResult> {
            if asset.kind == MediaKind::Unknown {
                return Err(DomainError::UnsupportedMediaType("unknown".to_string()).into());
            }
            Ok(CompressionResult::new(asset, "out".to_string(), level, 10, Some(5), 1))
        }

        async fn save(&self, _location: &str, _kind: MediaKind) -> ServiceResult<SaveDestination> {
            Ok(SaveDestination::PhotoLibrary)
        }

        fn level_info(&self, level: CompressionLevel) -> CompressionLevelInfo {
            CompressionLevelInfo::new(level, 1_000_000)
        }
    }

    #[test]
    fn test_begin_requires_selection() {
        let session = CompressionSession::new();
        let err = session.begin().unwrap_err();
        assert!(matches!(err, ServiceError::Ui(msg) if msg.contains("select an image or video")));
    }

    #[test]
    fn test_rejects_retrigger_while_in_flight() {
        let session = CompressionSession::new();
        session.select_asset(Asset::new("a.jpg", MediaKind::Image)).unwrap();
        let _ticket = session.begin().unwrap();
        assert!(session.begin().is_err());
        assert!(session.snapshot().unwrap().is_compressing);
    }

    #[test]
    fn test_finish_records_current_result() {
        let session = CompressionSession::new();
        let asset = Asset::new("a.jpg", MediaKind::Image);
        session.select_asset(asset.clone()).unwrap();

        let ticket = session.begin().unwrap();
        let outcome = session.finish(&ticket, Ok(result_for(&asset)));

        assert!(matches!(outcome, Some(Ok(_))));
        assert_eq!(session.snapshot().unwrap().result, Some(result_for(&asset)));
        assert!(!session.snapshot().unwrap().is_compressing);
    }

    #[test]
    fn test_stale_outcome_is_dropped() {
        let session = CompressionSession::new();
        let first = Asset::new("a.jpg", MediaKind::Image);
        session.select_asset(first.clone()).unwrap();
        let ticket = session.begin().unwrap();

        // User picks something else before the run completes
        session.select_asset(Asset::new("b.mp4", MediaKind::Video)).unwrap();

        assert!(session.finish(&ticket, Ok(result_for(&first))).is_none());
        assert_eq!(session.snapshot().unwrap().result, None);
        // The new selection can be compressed right away
        assert!(session.begin().is_ok());
    }

    #[test]
    fn test_failure_clears_prior_result() {
        let session = CompressionSession::new();
        let asset = Asset::new("a.jpg", MediaKind::Image);
        session.select_asset(asset.clone()).unwrap();

        let ticket = session.begin().unwrap();
        session.finish(&ticket, Ok(result_for(&asset)));

        let ticket = session.begin().unwrap();
        assert_eq!(session.snapshot().unwrap().result, None);
        let outcome = session.finish(&ticket, Err(ServiceError::Ui("boom".to_string())));

        assert!(matches!(outcome, Some(Err(_))));
        assert_eq!(session.snapshot().unwrap().result, None);
    }

    #[test]
    fn test_selection_clears_result() {
        let session = CompressionSession::new();
        let asset = Asset::new("a.jpg", MediaKind::Image);
        session.select_asset(asset.clone()).unwrap();
        let ticket = session.begin().unwrap();
        session.finish(&ticket, Ok(result_for(&asset)));

        session.select_asset(Asset::new("c.png", MediaKind::Image)).unwrap();
        assert_eq!(session.snapshot().unwrap().result, None);
    }

    #[tokio::test]
    async fn test_run_uses_selected_level() {
        let session = CompressionSession::new();
        session.select_asset(Asset::new("a.jpg", MediaKind::Image)).unwrap();
        session.set_level(CompressionLevel::new(42)).unwrap();

        let result = session.run(&FixedService).await.unwrap().unwrap();
        assert_eq!(result.level.value(), 10);
        assert_eq!(result.ratio_percent, 50);
    }

    #[tokio::test]
    async fn test_run_propagates_failure() {
        let session = CompressionSession::new();
        session.select_asset(Asset::new("notes.txt", MediaKind::Unknown)).unwrap();

        let err = session.run(&FixedService).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::UnsupportedMediaType(_))));
        assert!(!session.snapshot().unwrap().is_compressing);
    }
}
