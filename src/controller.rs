use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::artifact::ArtifactStore;
use crate::config::CropConfig;
use crate::error::CropError;
use crate::gateway::{Gateway, GatewayError, ImageFile, SharedConfig};
use crate::state_machine::{
    ProcessedImage, ReadingMode, Ritual, RitualEvent, RitualRecord, RitualState, StateMachine,
    Strategy, Transition,
};

/// Drives one ritual at a time from submission to a terminal state.
///
/// `submit` and `reset` take `&mut self`: a single caller drives the
/// controller, and observers follow along through [`subscribe`](Self::subscribe)
/// and [`settings`](Self::settings).
pub struct RitualController<G> {
    gateway: G,
    store: ArtifactStore,
    settings: SharedConfig,
    reading_mode: ReadingMode,
    failure_reset: Duration,
    state: Arc<watch::Sender<RitualState>>,
    result: Option<ProcessedImage>,
    auto_reset: Option<JoinHandle<()>>,
    ritual: Option<Ritual>,
    last_record: Option<RitualRecord>,
}

impl<G: Gateway> RitualController<G> {
    pub fn new(gateway: G, config: &CropConfig) -> Self {
        let (state, _rx) = watch::channel(RitualState::Idle);
        Self {
            gateway,
            store: ArtifactStore::new(),
            settings: SharedConfig::new(config.backend()),
            reading_mode: config.reading_mode(),
            failure_reset: config.failure_reset(),
            state: Arc::new(state),
            result: None,
            auto_reset: None,
            ritual: None,
            last_record: None,
        }
    }

    pub fn state(&self) -> RitualState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change, including the auto-reset.
    pub fn subscribe(&self) -> watch::Receiver<RitualState> {
        self.state.subscribe()
    }

    pub fn result(&self) -> Option<&ProcessedImage> {
        self.result.as_ref()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Handle on the runtime configuration; clones share the same value.
    pub fn settings(&self) -> SharedConfig {
        self.settings.clone()
    }

    pub fn last_record(&self) -> Option<&RitualRecord> {
        self.last_record.as_ref()
    }

    /// Flip between the mock and live strategies for the next submission.
    pub fn toggle_mock(&self) -> bool {
        let use_mock = self.settings.toggle_mock();
        tracing::info!(use_mock, "backend strategy toggled");
        use_mock
    }

    /// Run a ritual for `file`, returning the terminal state it reached.
    ///
    /// Fails with [`CropError::Rejected`] (and changes nothing) unless the
    /// controller is `Idle` or `Failed`.
    pub async fn submit(&mut self, file: ImageFile) -> Result<RitualState, CropError> {
        let current = self.state();
        if StateMachine::next(current, RitualEvent::Submitted) == Transition::Rejected {
            tracing::warn!(state = %current, file = %file.name, "submission rejected");
            return Err(CropError::Rejected(current));
        }

        self.defuse_auto_reset();
        self.discard_result();

        let config = self.settings.snapshot();
        self.ritual = Some(Ritual::begin(
            file.name.clone(),
            file.bytes.len(),
            Strategy::from_mock_flag(config.use_mock),
        ));
        self.apply(RitualEvent::Submitted);

        let original = self.store.create(file.bytes.clone());

        let gateway = &self.gateway;
        let reading_mode = &self.reading_mode;
        let removal = gateway.remove_background(&file, &config);
        let reading = async {
            let reading = match reading_mode {
                ReadingMode::Resolved => gateway.describe(&file, &config).await,
                ReadingMode::Placeholder(text) => Some(text.clone()),
            };
            Ok::<_, GatewayError>(reading)
        };

        // A removal failure returns early and drops the pending description.
        let outcome = tokio::try_join!(removal, reading);
        match outcome {
            Ok((bytes, reading)) => {
                let processed = self.store.create(bytes);
                if let Some(ritual) = self.ritual.as_mut() {
                    ritual.reading = reading.clone();
                }
                self.result = Some(ProcessedImage {
                    source_name: file.name,
                    original,
                    processed,
                    reading,
                });
                self.apply(RitualEvent::Severed);
            }
            Err(e) => {
                tracing::error!(file = %file.name, error = %e, "severing failed");
                self.store.release(&original);
                if let Some(ritual) = self.ritual.as_mut() {
                    ritual.failure = Some(e.to_string());
                }
                self.apply(RitualEvent::SeverFailed);
                self.arm_auto_reset();
            }
        }

        self.finish_ritual();
        Ok(self.state())
    }

    /// Discard the current result and return to `Idle`.
    ///
    /// A no-op while `Severing`. Releasing is idempotent: with no live
    /// result nothing is released.
    pub fn reset(&mut self) {
        if self.apply(RitualEvent::ResetRequested) == Transition::Rejected {
            tracing::debug!(state = %self.state(), "reset ignored");
            return;
        }
        self.defuse_auto_reset();
        self.discard_result();
    }

    /// Write the processed image of the current result to `path`.
    pub fn export(&self, path: &Path) -> anyhow::Result<()> {
        let image = self.result.as_ref().ok_or(CropError::NothingToExport)?;
        self.store.export(&image.processed, path)
    }

    fn apply(&mut self, event: RitualEvent) -> Transition {
        let current = self.state();
        let transition = StateMachine::next(current, event);
        if let Transition::Next(next) = transition {
            if next != current {
                self.state.send_replace(next);
            }
            if next != RitualState::Severing
                && let Some(ritual) = self.ritual.as_mut()
            {
                ritual.record(next);
            }
            tracing::debug!(from = %current, to = %next, ?event, "ritual transition");
        }
        transition
    }

    fn finish_ritual(&mut self) {
        if let Some(ritual) = self.ritual.take() {
            let record = RitualRecord::from_ritual(&ritual);
            tracing::info!(
                ritual_id = %record.ritual_id,
                strategy = %record.strategy,
                duration_ms = record.duration_ms,
                state = %self.state(),
                "ritual finished"
            );
            self.last_record = Some(record);
        }
    }

    fn discard_result(&mut self) {
        if let Some(image) = self.result.take() {
            image.release(&mut self.store);
        }
    }

    // One-shot timer back to Idle; it re-checks the state so a stale timer is harmless.
    fn arm_auto_reset(&mut self) {
        let state = Arc::clone(&self.state);
        let delay = self.failure_reset;
        self.auto_reset = Some(tokio::spawn(async move {
            sleep(delay).await;
            state.send_if_modified(|current| {
                match StateMachine::next(*current, RitualEvent::TimedOut) {
                    Transition::Next(next) => {
                        tracing::debug!(from = %current, to = %next, "failure auto-reset");
                        *current = next;
                        true
                    }
                    Transition::Rejected => false,
                }
            });
        }));
    }

    fn defuse_auto_reset(&mut self) {
        if let Some(timer) = self.auto_reset.take() {
            timer.abort();
        }
    }
}

impl<G> Drop for RitualController<G> {
    fn drop(&mut self) {
        if let Some(timer) = self.auto_reset.take() {
            timer.abort();
        }
    }
}
