//! Scripted reasoning service stub
//!
//! Lets analyzer tests dictate what the "reasoning service" answers, make it
//! fail, or hold calls open to observe in-flight behavior. Call counts are
//! tracked per operation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::watch;

use core_kernel::{DomainPort, PortError};
use domain_claims::{DamageInsight, Document, DocumentInsight, ReasoningPort};

/// A reasoning service that answers from a script
pub struct ScriptedReasoning {
    document_insight: Mutex<DocumentInsight>,
    set_insight: Mutex<DamageInsight>,
    fail: AtomicBool,
    document_calls: AtomicUsize,
    set_calls: AtomicUsize,
    gate_tx: watch::Sender<bool>,
    gate_rx: watch::Receiver<bool>,
}

impl Default for ScriptedReasoning {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedReasoning {
    pub fn new() -> Self {
        let (gate_tx, gate_rx) = watch::channel(true);
        Self {
            document_insight: Mutex::new(DocumentInsight {
                relevant: true,
                material: None,
                summary: Some("scripted summary".to_string()),
            }),
            set_insight: Mutex::new(DamageInsight {
                description: Some("scripted description".to_string()),
                department: Some("scripted".to_string()),
                damage: None,
            }),
            fail: AtomicBool::new(false),
            document_calls: AtomicUsize::new(0),
            set_calls: AtomicUsize::new(0),
            gate_tx,
            gate_rx,
        }
    }

    /// Scripts the answer for single-document analysis
    pub fn with_document_insight(self, insight: DocumentInsight) -> Self {
        *self.document_insight.lock().expect("script lock") = insight;
        self
    }

    /// Scripts the answer for document-set analysis
    pub fn with_set_insight(self, insight: DamageInsight) -> Self {
        *self.set_insight.lock().expect("script lock") = insight;
        self
    }

    /// Makes every call fail with a transient connection error
    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Holds subsequent calls open until [`release`](Self::release)
    pub fn hold(&self) {
        self.gate_tx.send_replace(false);
    }

    /// Releases calls held open by [`hold`](Self::hold)
    pub fn release(&self) {
        self.gate_tx.send_replace(true);
    }

    pub fn document_calls(&self) -> usize {
        self.document_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    async fn pass_gate(&self) -> Result<(), PortError> {
        let mut gate = self.gate_rx.clone();
        gate.wait_for(|open| *open)
            .await
            .map_err(|_| PortError::internal("scripted gate dropped"))?;
        if self.fail.load(Ordering::SeqCst) {
            return Err(PortError::connection("scripted reasoning failure"));
        }
        Ok(())
    }
}

impl DomainPort for ScriptedReasoning {}

#[async_trait]
impl ReasoningPort for ScriptedReasoning {
    async fn analyze_document(
        &self,
        _document: &Document,
        _claim_description: &str,
    ) -> Result<DocumentInsight, PortError> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await?;
        Ok(self.document_insight.lock().expect("script lock").clone())
    }

    async fn analyze_document_set(
        &self,
        _documents: &[Document],
    ) -> Result<DamageInsight, PortError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await?;
        Ok(self.set_insight.lock().expect("script lock").clone())
    }
}
