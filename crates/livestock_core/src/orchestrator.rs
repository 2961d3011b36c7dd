//! crates/livestock_core/src/orchestrator.rs
//!
//! The hybrid analysis pipeline: a best-effort vision hint, a report generated
//! with that hint, and a single write of the finished record.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{AnalysisImage, AnalysisRecord, BreedCandidate, NewAnalysis, ReportData, VisionHint};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{with_timeout, AnalysisStore, PortError, ReportGenerationService, VisionHintService};
use crate::prompts;
use crate::schema::{self, SchemaViolation};

/// Per-call limits for the remote services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTimeouts {
    pub vision: Duration,
    pub generation: Duration,
}

impl Default for RemoteTimeouts {
    fn default() -> Self {
        Self {
            vision: Duration::from_secs(15),
            generation: Duration::from_secs(60),
        }
    }
}

/// Input for one hybrid analysis.
#[derive(Debug, Clone)]
pub struct HybridAnalysisRequest {
    pub image: AnalysisImage,
    pub location: String,
    pub language: String,
}

impl HybridAnalysisRequest {
    pub fn validate(&self) -> ServiceResult<()> {
        self.image.validate()?;
        if self.location.trim().is_empty() {
            return Err(ServiceError::Validation("location is required".to_string()));
        }
        Ok(())
    }
}

/// Input for the report stage alone.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest<'a> {
    pub image: &'a AnalysisImage,
    pub location: &'a str,
    pub language: &'a str,
    pub breed_hint: Option<&'a str>,
}

#[derive(Clone)]
pub struct HybridOrchestrator {
    vision: Arc<dyn VisionHintService>,
    reports: Arc<dyn ReportGenerationService>,
    store: Arc<dyn AnalysisStore>,
    timeouts: RemoteTimeouts,
}

impl HybridOrchestrator {
    pub fn new(
        vision: Arc<dyn VisionHintService>,
        reports: Arc<dyn ReportGenerationService>,
        store: Arc<dyn AnalysisStore>,
        timeouts: RemoteTimeouts,
    ) -> Self {
        Self {
            vision,
            reports,
            store,
            timeouts,
        }
    }

    /// Runs vision hint, report generation and persistence in that order.
    ///
    /// Nothing is written unless the report fully validates. A failed vision
    /// call only drops the hint.
    pub async fn run_hybrid_analysis(
        &self,
        request: HybridAnalysisRequest,
        owner_id: Uuid,
    ) -> ServiceResult<AnalysisRecord> {
        request.validate()?;
        let started = Instant::now();
        info!(%owner_id, location = %request.location, "Hybrid analysis started.");

        let hint = self.vision_hint(&request.image, &request.language).await;
        let breed_hint = hint.as_ref().and_then(VisionHint::top_breed);

        let report = self
            .generate_report(ReportRequest {
                image: &request.image,
                location: &request.location,
                language: &request.language,
                breed_hint,
            })
            .await?;

        let new_analysis = NewAnalysis {
            owner_id,
            image: request.image.to_data_uri(),
            location: request.location.trim().to_string(),
            report_data: report,
            yolo_data: hint.map(VisionHint::into_candidates).unwrap_or_default(),
        };

        let record = self.store.create_analysis(new_analysis).await.map_err(|e| {
            error!(%owner_id, error = %e, "Report was generated but could not be saved; it is lost.");
            ServiceError::Persistence(e.to_string())
        })?;

        info!(
            %owner_id,
            analysis_id = %record.id,
            elapsed = ?started.elapsed(),
            "Hybrid analysis stored."
        );
        Ok(record)
    }

    /// Calls the breed detector, surfacing every failure.
    pub async fn detect_breeds(
        &self,
        image: &AnalysisImage,
        language: &str,
    ) -> ServiceResult<Vec<BreedCandidate>> {
        with_timeout(
            self.timeouts.vision,
            "vision hint",
            self.vision.detect_breeds(image, language),
        )
        .await
        .map_err(|e| ServiceError::VisionHint(e.to_string()))
    }

    /// Stage A: the detector's opinion, or `None` if it failed or saw nothing.
    pub async fn vision_hint(&self, image: &AnalysisImage, language: &str) -> Option<VisionHint> {
        match self.detect_breeds(image, language).await {
            Ok(candidates) => {
                let hint = VisionHint::from_candidates(candidates);
                match &hint {
                    Some(h) => info!(breed = ?h.top_breed(), candidates = h.candidates().len(), "Vision hint received."),
                    None => info!("Vision hint service returned no detections."),
                }
                hint
            }
            Err(e) => {
                warn!(error = %e, "Vision hint unavailable; continuing without it.");
                None
            }
        }
    }

    /// Stage B: asks the report model and validates what comes back.
    pub async fn generate_report(&self, request: ReportRequest<'_>) -> ServiceResult<ReportData> {
        request.image.validate()?;
        if request.location.trim().is_empty() {
            return Err(ServiceError::Validation("location is required".to_string()));
        }
        let prompt = prompts::report_prompt(request.location, request.language, request.breed_hint);

        let raw = with_timeout(
            self.timeouts.generation,
            "report generation",
            self.reports.generate_report(request.image, &prompt),
        )
        .await
        .map_err(|e: PortError| {
            error!(error = %e, "Report generation call failed.");
            ServiceError::ReportGeneration(e.to_string())
        })?;

        schema::parse_report(&raw).map_err(|violation: SchemaViolation| {
            error!(%violation, "Report model returned an unusable response.");
            ServiceError::UpstreamFormat(violation.to_string())
        })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use crate::prompts::GenerationPrompt;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    pub enum VisionBehaviour {
        Candidates(Vec<BreedCandidate>),
        Fail,
        Hang,
    }

    pub struct FakeVision {
        pub behaviour: VisionBehaviour,
        pub calls: Mutex<usize>,
    }

    impl FakeVision {
        pub fn new(behaviour: VisionBehaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: Mutex::new(0),
            })
        }
    }

    #[async_trait]
    impl VisionHintService for FakeVision {
        async fn detect_breeds(&self, _image: &AnalysisImage, _language: &str) -> crate::ports::PortResult<Vec<BreedCandidate>> {
            *self.calls.lock().unwrap() += 1;
            match &self.behaviour {
                VisionBehaviour::Candidates(c) => Ok(c.clone()),
                VisionBehaviour::Fail => Err(PortError::Unexpected("connection refused".into())),
                VisionBehaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(vec![])
                }
            }
        }
    }

    pub struct FakeReports {
        pub response: crate::ports::PortResult<String>,
        pub prompts: Mutex<Vec<GenerationPrompt>>,
    }

    impl FakeReports {
        pub fn returning(raw: String) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(raw),
                prompts: Mutex::new(vec![]),
            })
        }

        pub fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: Err(PortError::Unexpected("quota exceeded".into())),
                prompts: Mutex::new(vec![]),
            })
        }

        pub fn last_prompt(&self) -> Option<GenerationPrompt> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl ReportGenerationService for FakeReports {
        async fn generate_report(&self, _image: &AnalysisImage, prompt: &GenerationPrompt) -> crate::ports::PortResult<String> {
            self.prompts.lock().unwrap().push(prompt.clone());
            match &self.response {
                Ok(raw) => Ok(raw.clone()),
                Err(e) => Err(PortError::Unexpected(e.to_string())),
            }
        }
    }

    #[derive(Default)]
    pub struct FakeStore {
        pub records: Mutex<Vec<AnalysisRecord>>,
        pub fail_writes: bool,
    }

    #[async_trait]
    impl AnalysisStore for FakeStore {
        async fn create_analysis(&self, analysis: NewAnalysis) -> crate::ports::PortResult<AnalysisRecord> {
            if self.fail_writes {
                return Err(PortError::Unexpected("disk full".into()));
            }
            let now = Utc::now();
            let record = AnalysisRecord {
                id: Uuid::new_v4(),
                owner_id: analysis.owner_id,
                image: analysis.image,
                location: analysis.location,
                report_data: analysis.report_data,
                yolo_data: analysis.yolo_data,
                created_at: now,
                updated_at: now,
            };
            self.records.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn list_analyses_by_owner(&self, owner_id: Uuid) -> crate::ports::PortResult<Vec<AnalysisRecord>> {
            let mut records: Vec<_> = self
                .records
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.owner_id == owner_id)
                .cloned()
                .collect();
            records.reverse();
            Ok(records)
        }

        async fn fetch_analysis(&self, analysis_id: Uuid) -> crate::ports::PortResult<AnalysisRecord> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == analysis_id)
                .cloned()
                .ok_or_else(|| PortError::NotFound(format!("Analysis {} not found", analysis_id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::*;
    use super::*;
    use crate::prompts::breed_hint_clause;
    use crate::schema::fixtures::report_json;

    fn gir() -> BreedCandidate {
        BreedCandidate {
            breed: "Gir".to_string(),
            confidence: 0.91,
            bounding_box: None,
        }
    }

    fn request() -> HybridAnalysisRequest {
        HybridAnalysisRequest {
            image: AnalysisImage::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg"),
            location: "Anand, Gujarat".to_string(),
            language: "English".to_string(),
        }
    }

    fn orchestrator(
        vision: Arc<FakeVision>,
        reports: Arc<FakeReports>,
        store: Arc<FakeStore>,
    ) -> HybridOrchestrator {
        HybridOrchestrator::new(vision, reports, store, RemoteTimeouts::default())
    }

    #[tokio::test]
    async fn gir_hint_flows_into_prompt_and_record() {
        let vision = FakeVision::new(VisionBehaviour::Candidates(vec![gir()]));
        let reports = FakeReports::returning(report_json("Gir").to_string());
        let store = Arc::new(FakeStore::default());
        let owner = Uuid::new_v4();

        let record = orchestrator(vision, reports.clone(), store.clone())
            .run_hybrid_analysis(request(), owner)
            .await
            .unwrap();

        let prompt = reports.last_prompt().unwrap();
        assert!(prompt.user.contains(&breed_hint_clause(Some("Gir"))));
        assert_eq!(record.owner_id, owner);
        assert_eq!(record.yolo_data, vec![gir()]);
        assert!(!record.report_data.advanced_breed_detector.primary_breed.is_empty());
        assert_eq!(record.image, "data:image/jpeg;base64,/9j/4A==");
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn vision_failure_is_absorbed() {
        let vision = FakeVision::new(VisionBehaviour::Fail);
        let reports = FakeReports::returning(report_json("Sahiwal").to_string());
        let store = Arc::new(FakeStore::default());

        let record = orchestrator(vision, reports.clone(), store)
            .run_hybrid_analysis(request(), Uuid::new_v4())
            .await
            .unwrap();

        assert!(record.yolo_data.is_empty());
        assert!(reports.last_prompt().unwrap().user.contains(&breed_hint_clause(None)));
    }

    #[tokio::test(start_paused = true)]
    async fn vision_timeout_is_absorbed() {
        let vision = FakeVision::new(VisionBehaviour::Hang);
        let reports = FakeReports::returning(report_json("Gir").to_string());
        let store = Arc::new(FakeStore::default());

        let record = orchestrator(vision, reports.clone(), store.clone())
            .run_hybrid_analysis(request(), Uuid::new_v4())
            .await
            .unwrap();

        assert!(record.yolo_data.is_empty());
        assert!(reports.last_prompt().unwrap().user.contains("No secondary breed detection"));
        assert_eq!(store.records.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_detection_list_means_no_hint() {
        let vision = FakeVision::new(VisionBehaviour::Candidates(vec![]));
        let reports = FakeReports::returning(report_json("Gir").to_string());
        let store = Arc::new(FakeStore::default());

        let record = orchestrator(vision, reports.clone(), store)
            .run_hybrid_analysis(request(), Uuid::new_v4())
            .await
            .unwrap();

        assert!(record.yolo_data.is_empty());
        assert!(reports.last_prompt().unwrap().user.contains(&breed_hint_clause(None)));
    }

    #[tokio::test]
    async fn malformed_report_persists_nothing() {
        let mut body = report_json("Gir");
        body.as_object_mut().unwrap().remove("ai_veterinary_assistant");
        let vision = FakeVision::new(VisionBehaviour::Candidates(vec![gir()]));
        let reports = FakeReports::returning(body.to_string());
        let store = Arc::new(FakeStore::default());

        let err = orchestrator(vision, reports, store.clone())
            .run_hybrid_analysis(request(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::UpstreamFormat(ref m) if m.contains("ai_veterinary_assistant")));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn report_service_failure_aborts() {
        let vision = FakeVision::new(VisionBehaviour::Candidates(vec![gir()]));
        let store = Arc::new(FakeStore::default());

        let err = orchestrator(vision, FakeReports::failing(), store.clone())
            .run_hybrid_analysis(request(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::ReportGeneration(_)));
        assert!(store.records.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_reported_as_persistence() {
        let vision = FakeVision::new(VisionBehaviour::Candidates(vec![gir()]));
        let reports = FakeReports::returning(report_json("Gir").to_string());
        let store = Arc::new(FakeStore {
            fail_writes: true,
            ..Default::default()
        });

        let err = orchestrator(vision, reports, store)
            .run_hybrid_analysis(request(), Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Persistence(_)));
    }

    #[tokio::test]
    async fn invalid_input_fails_before_any_remote_call() {
        let vision = FakeVision::new(VisionBehaviour::Candidates(vec![gir()]));
        let reports = FakeReports::returning(report_json("Gir").to_string());
        let store = Arc::new(FakeStore::default());
        let orchestrator = orchestrator(vision.clone(), reports.clone(), store);

        let mut blank_location = request();
        blank_location.location = "  ".to_string();
        let mut empty_image = request();
        empty_image.image.bytes.clear();

        for bad in [blank_location, empty_image] {
            let err = orchestrator.run_hybrid_analysis(bad, Uuid::new_v4()).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert_eq!(*vision.calls.lock().unwrap(), 0);
        assert!(reports.last_prompt().is_none());
    }

    #[tokio::test]
    async fn direct_detection_surfaces_failures() {
        let vision = FakeVision::new(VisionBehaviour::Fail);
        let orchestrator = orchestrator(
            vision,
            FakeReports::returning(String::new()),
            Arc::new(FakeStore::default()),
        );
        let err = orchestrator
            .detect_breeds(&request().image, "en")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::VisionHint(_)));
    }

    #[tokio::test]
    async fn stored_record_reads_back_for_owner_only() {
        let vision = FakeVision::new(VisionBehaviour::Candidates(vec![gir()]));
        let reports = FakeReports::returning(report_json("Gir").to_string());
        let store = Arc::new(FakeStore::default());
        let owner = Uuid::new_v4();

        let record = orchestrator(vision, reports, store.clone())
            .run_hybrid_analysis(request(), owner)
            .await
            .unwrap();

        let first = store.get_analysis_for_owner(record.id, owner).await.unwrap();
        let second = store.get_analysis_for_owner(record.id, owner).await.unwrap();
        assert_eq!(first, record);
        assert_eq!(first, second);
        assert!(matches!(
            store.get_analysis_for_owner(record.id, Uuid::new_v4()).await,
            Err(PortError::Unauthorized)
        ));
    }
}
