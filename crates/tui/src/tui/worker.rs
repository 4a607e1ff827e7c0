use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::core::api::TaskApi;
use crate::core::session::{self, Command, Completion};

/// Runs backend commands off the UI thread and hands completions back.
pub(crate) struct Worker {
    runtime: Runtime,
    api: Arc<dyn TaskApi>,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
}

impl Worker {
    pub(crate) fn new(api: Arc<dyn TaskApi>) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to start async runtime")?;
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime,
            api,
            completions_tx,
            completions_rx,
        })
    }

    pub(crate) fn submit(&self, command: Command) {
        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        self.runtime.spawn(async move {
            let completion = session::execute(api.as_ref(), command).await;
            if tx.send(completion).is_err() {
                tracing::debug!("board closed before a request finished");
            }
        });
    }

    pub(crate) fn try_recv(&mut self) -> Option<Completion> {
        self.completions_rx.try_recv().ok()
    }
}
