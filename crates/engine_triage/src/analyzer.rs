//! Claim analyzer loop
//!
//! Polls the claim repository for `OPEN` claims and runs one analysis
//! sub-task per claim through the process supervisor. Three mechanisms keep
//! analysis at most-once per claim: the mutex-guarded active set stops a
//! second dispatch while one is in flight, an existing result suppresses
//! re-analysis permanently, and a failed attempt writes no result so the
//! claim is simply retried on the next poll.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use core_kernel::{ClaimId, PortError, TaskSupervisor};
use domain_claims::{triage, Claim, ClaimsPort, Document, DocumentsPort, ReasoningPort, ResultsPort};
use infra_staging::StagingStore;

/// Background analyzer for open claims
pub struct ClaimAnalyzer {
    claims: Arc<dyn ClaimsPort>,
    documents: Arc<dyn DocumentsPort>,
    results: Arc<dyn ResultsPort>,
    reasoning: Arc<dyn ReasoningPort>,
    staging: Arc<StagingStore>,
    supervisor: Arc<TaskSupervisor>,
    active: Arc<Mutex<HashSet<ClaimId>>>,
}

/// Membership token in the analyzer's active set.
///
/// Dropping the guard removes the claim id again, which covers success,
/// failure, and cancellation of the owning sub-task alike.
struct ActiveGuard {
    active: Arc<Mutex<HashSet<ClaimId>>>,
    claim: ClaimId,
}

impl ActiveGuard {
    fn acquire(active: Arc<Mutex<HashSet<ClaimId>>>, claim: ClaimId) -> Option<Self> {
        let inserted = match active.lock() {
            Ok(mut set) => set.insert(claim),
            Err(_) => return None,
        };
        inserted.then_some(Self { active, claim })
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        if let Ok(mut set) = self.active.lock() {
            set.remove(&self.claim);
        }
    }
}

impl ClaimAnalyzer {
    pub fn new(
        claims: Arc<dyn ClaimsPort>,
        documents: Arc<dyn DocumentsPort>,
        results: Arc<dyn ResultsPort>,
        reasoning: Arc<dyn ReasoningPort>,
        staging: Arc<StagingStore>,
        supervisor: Arc<TaskSupervisor>,
    ) -> Self {
        Self {
            claims,
            documents,
            results,
            reasoning,
            staging,
            supervisor,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Polling loop; runs until the owning task is cancelled.
    ///
    /// A failed poll (e.g. the database being briefly unreachable) is logged
    /// and retried on the next tick rather than terminating the loop.
    pub async fn run(self: Arc<Self>, poll_interval: Duration) -> anyhow::Result<()> {
        info!(interval_secs = poll_interval.as_secs(), "claim analyzer started");
        loop {
            tokio::time::sleep(poll_interval).await;
            if let Err(err) = self.poll_once().await {
                error!(error = %err, "claim poll failed");
            }
        }
    }

    /// One poll cycle: dispatch an analysis sub-task for every `OPEN` claim
    /// that is neither currently being analyzed nor already has a result.
    pub async fn poll_once(self: &Arc<Self>) -> Result<(), PortError> {
        let open = self.claims.find_open().await?;
        for claim in open {
            if self.is_active(claim.id) {
                continue;
            }
            if self.results.exists(claim.id).await? {
                continue;
            }
            let Some(guard) = ActiveGuard::acquire(Arc::clone(&self.active), claim.id) else {
                continue;
            };

            let analyzer = Arc::clone(self);
            let claim_id = claim.id;
            let spawned = self.supervisor.spawn(&format!("analyze-{}", claim_id), async move {
                let _active = guard;
                if let Err(err) = analyzer.analyze_claim(claim).await {
                    // contained: no result was written, the claim stays OPEN
                    // and is retried on the next poll
                    error!(claim = %claim_id, error = %err, "claim analysis failed");
                }
                Ok(())
            });
            if spawned.is_err() {
                debug!(claim = %claim_id, "shutdown in progress, not dispatching");
                return Ok(());
            }
        }
        Ok(())
    }

    fn is_active(&self, claim: ClaimId) -> bool {
        self.active
            .lock()
            .map(|set| set.contains(&claim))
            .unwrap_or(false)
    }

    /// Analyzes one claim end to end and persists the outcome
    async fn analyze_claim(&self, mut claim: Claim) -> Result<(), PortError> {
        let primary = match claim.document {
            Some(id) => match self.documents.get(id).await? {
                Some(doc) if doc.is_image() => Some(doc),
                Some(doc) => {
                    warn!(claim = %claim.id, document = %doc.id, content_type = %doc.content_type,
                        "primary document is not an image, skipping");
                    None
                }
                None => {
                    warn!(claim = %claim.id, document = %id, "linked primary document missing");
                    None
                }
            },
            None => None,
        };

        let supporting: Vec<Document> = self
            .documents
            .find_by_claim(claim.id)
            .await?
            .into_iter()
            .filter(|doc| Some(doc.id) != claim.document)
            .filter(|doc| {
                if doc.is_image() {
                    true
                } else {
                    warn!(claim = %claim.id, document = %doc.id, content_type = %doc.content_type,
                        "dropping non-image document from analysis");
                    false
                }
            })
            .collect();

        let result = if primary.is_none() && supporting.is_empty() {
            triage::reduce(&claim, None, None)
        } else {
            let primary_insight = async {
                match &primary {
                    Some(doc) => self
                        .reasoning
                        .analyze_document(doc, &claim.description)
                        .await
                        .map(Some),
                    None => Ok(None),
                }
            };
            let set_insight = async {
                if supporting.is_empty() {
                    Ok(None)
                } else {
                    self.reasoning
                        .analyze_document_set(&supporting)
                        .await
                        .map(Some)
                }
            };
            // either call failing fails the whole attempt; no partial result
            let (doc_insight, set_insight) = tokio::try_join!(primary_insight, set_insight)?;

            if let Some(material) = doc_insight.as_ref().and_then(|d| d.material) {
                claim.set_material(material);
            }
            triage::reduce(&claim, doc_insight, set_insight)
        };

        // result first: its existence alone must suppress re-analysis even if
        // the claim save below is lost to a crash
        self.results.insert(&result).await?;
        self.claims.save(&claim).await?;

        if let Err(err) = self.staging.remove(claim.id).await {
            warn!(claim = %claim.id, error = %err, "failed to clear staging after analysis");
        }

        info!(claim = %claim.id, status = %result.status, reason = ?result.reason, "claim analyzed");
        Ok(())
    }
}
