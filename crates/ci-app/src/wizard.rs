//! Six-step intake wizard: validates one step slice at a time, merges it
//! into the accumulated record and awaits the durable write before
//! reporting success, so navigation never outruns persistence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use ci_core::intake::{step, validate_step, FieldError, IntakeRecord, STEPS};
use ci_core::ports::{AuthApiPort, DraftStorePort};

/// Failure of a single step submission.
#[derive(Debug, thiserror::Error)]
pub enum StepSubmitError {
    #[error("etapa desconhecida: {0}")]
    UnknownStep(u8),

    /// Field messages in screen order; the record was not touched.
    #[error("dados inválidos")]
    Validation(Vec<FieldError>),

    /// The merge happened in memory but the durable write failed.
    #[error("falha ao salvar o rascunho")]
    Persistence(#[source] anyhow::Error),
}

/// Failure of the final submission.
#[derive(Debug, thiserror::Error)]
pub enum FinalizeError {
    /// Another finalize is still awaiting the backend; nothing was
    /// submitted on this call.
    #[error("envio já em andamento")]
    InFlight,

    /// A step no longer validates against the accumulated record.
    #[error("etapa {step} incompleta")]
    Incomplete { step: u8, errors: Vec<FieldError> },

    /// The backend denied or never received the submission; the draft is
    /// kept so the user can retry.
    #[error("{0}")]
    Submission(String),

    /// Already submitted and accepted, but the local draft could not be
    /// removed.
    #[error("falha ao limpar o rascunho")]
    Cleanup(#[source] anyhow::Error),
}

/// Owner of the accumulated intake record.
///
/// All screens read step defaults from here and submit their slice back
/// through [`submit_step`](IntakeWizard::submit_step); nothing else writes
/// the draft store.
pub struct IntakeWizard {
    draft: Mutex<IntakeRecord>,
    store: Arc<dyn DraftStorePort>,
    api: Arc<dyn AuthApiPort>,
    is_submitting: AtomicBool,
}

impl IntakeWizard {
    pub fn new(store: Arc<dyn DraftStorePort>, api: Arc<dyn AuthApiPort>) -> Self {
        Self {
            draft: Mutex::new(IntakeRecord::new()),
            store,
            api,
            is_submitting: AtomicBool::new(false),
        }
    }

    /// Restore the draft persisted by a previous run. A missing draft is an
    /// empty record; an unreadable one is logged and also treated as empty
    /// rather than blocking the wizard.
    pub async fn load(&self) {
        let restored = match self.store.load().await {
            Ok(Some(record)) => {
                debug!(fields = record.len(), "draft restored");
                record
            }
            Ok(None) => IntakeRecord::new(),
            Err(err) => {
                warn!("stored draft unreadable, starting empty: {err:#}");
                IntakeRecord::new()
            }
        };
        *self.lock() = restored;
    }

    /// The already-entered values for one step, used to seed the screen's
    /// inputs on mount. `None` for an index outside 1..=6.
    pub fn step_defaults(&self, index: u8) -> Option<Map<String, Value>> {
        let projection = step(index)?;
        Some(self.lock().slice(projection))
    }

    /// Validate one step's raw input, merge the normalized slice into the
    /// record and persist. Keys outside the step's projection are ignored;
    /// invalid input leaves the record and the stored draft untouched.
    pub async fn submit_step(
        &self,
        index: u8,
        raw: &Map<String, Value>,
    ) -> Result<(), StepSubmitError> {
        let projection = step(index).ok_or(StepSubmitError::UnknownStep(index))?;
        let normalized = validate_step(projection, raw).map_err(StepSubmitError::Validation)?;

        let snapshot = {
            let mut draft = self.lock();
            draft.merge(normalized);
            draft.clone()
        };
        self.store
            .save(&snapshot)
            .await
            .map_err(StepSubmitError::Persistence)
    }

    /// Merge an arbitrary partial without step validation, then persist.
    /// For programmatic writes (prefills, migrations); screen input goes
    /// through [`submit_step`](IntakeWizard::submit_step).
    pub async fn set_data(&self, partial: Map<String, Value>) -> anyhow::Result<()> {
        let snapshot = {
            let mut draft = self.lock();
            draft.merge(partial);
            draft.clone()
        };
        self.store.save(&snapshot).await
    }

    /// Re-validate every step against the accumulated record, submit it to
    /// the backend, then clear the draft. The clear only happens after the
    /// backend accepts, so a failed submission keeps the data for retry.
    pub async fn finalize(&self) -> Result<(), FinalizeError> {
        if self.is_submitting.swap(true, Ordering::SeqCst) {
            debug!("finalize already in flight, refusing duplicate");
            return Err(FinalizeError::InFlight);
        }
        let outcome = self.finalize_inner().await;
        self.is_submitting.store(false, Ordering::SeqCst);
        outcome
    }

    async fn finalize_inner(&self) -> Result<(), FinalizeError> {
        let record = self.lock().clone();

        // Normalized values re-validate cleanly, so any error here means a
        // step was skipped or a conditional companion is still missing.
        for projection in &STEPS {
            if let Err(errors) = validate_step(projection, record.as_map()) {
                return Err(FinalizeError::Incomplete {
                    step: projection.index,
                    errors,
                });
            }
        }

        self.api
            .submit_intake(record.as_map())
            .await
            .map_err(|err| FinalizeError::Submission(err.to_string()))?;
        info!(fields = record.len(), "intake submitted");

        self.lock().clear();
        self.store.clear().await.map_err(FinalizeError::Cleanup)
    }

    /// Discard the draft, memory and disk both. Used on logout and after a
    /// deliberate "start over".
    pub async fn reset(&self) -> anyhow::Result<()> {
        self.lock().clear();
        self.store.clear().await
    }

    /// A copy of the accumulated record as it stands.
    pub fn record(&self) -> IntakeRecord {
        self.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IntakeRecord> {
        self.draft.lock().expect("draft poisoned")
    }
}
