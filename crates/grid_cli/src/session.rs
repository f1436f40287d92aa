use std::collections::VecDeque;
use std::future::Future;

use grid_core::{update, AppState, AppViewModel, Msg, RunStatus};

use crate::effects::EffectRunner;

/// Drives the upload state machine: messages in, effects out, replies fed back.
pub struct UploadSession {
    state: AppState,
    runner: EffectRunner,
}

impl UploadSession {
    pub fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn runner(&self) -> &EffectRunner {
        &self.runner
    }

    /// Applies `msg` and every message produced by the effects it triggers.
    pub async fn dispatch(&mut self, msg: Msg) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            inbox.extend(self.runner.run(effects).await);
        }
    }

    /// The current view if anything changed since the last call.
    pub fn take_view(&mut self) -> Option<AppViewModel> {
        let view = self.state.view();
        self.state.consume_dirty().then_some(view)
    }

    /// Feeds poller snapshots into the state machine until the batch reaches a
    /// terminal status or `shutdown` resolves, then closes the monitor.
    ///
    /// Returns the terminal status, or `None` if following was interrupted.
    pub async fn follow_progress<S, R>(&mut self, shutdown: S, mut render: R) -> Option<RunStatus>
    where
        S: Future<Output = ()>,
        R: FnMut(&AppViewModel),
    {
        let mut updates = self.runner.monitor().subscribe()?;
        tokio::pin!(shutdown);

        let outcome = loop {
            tokio::select! {
                _ = &mut shutdown => break None,
                changed = updates.changed() => {
                    if changed.is_err() {
                        break None;
                    }
                    let Some(progress) = updates.borrow_and_update().clone() else {
                        continue;
                    };
                    let Some(batch_id) = self.state.monitored_batch().cloned() else {
                        break None;
                    };
                    let terminal = progress.is_terminal().then(|| progress.status.clone());
                    self.dispatch(Msg::ProgressReceived { batch_id, progress }).await;
                    if let Some(view) = self.take_view() {
                        render(&view);
                    }
                    if terminal.is_some() {
                        break terminal;
                    }
                }
            }
        };

        self.dispatch(Msg::MonitorClosed).await;
        outcome
    }
}
