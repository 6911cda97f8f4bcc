//! [`Orchestrator`]: starts a list of components in dependency order within
//! a deadline, and stops them in reverse.

use std::{sync::Arc, time::Duration};

use eyre::{eyre, WrapErr};
use parking_lot::Mutex;

/// A component the orchestrator can bring up and tear down.
///
/// A list of these lets several subsystems be sequenced with a shared
/// startup deadline and fail-fast rollback, rather than each one wiring up
/// its own bespoke startup check.
#[async_trait::async_trait]
pub trait Component: Send + Sync {
    /// A short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Bring the component up. Returning `Ok(())` means ready.
    async fn start(&self) -> eyre::Result<()>;

    /// Tear the component down. Must be idempotent: called more than once,
    /// the second call is a no-op.
    async fn stop(&self) -> eyre::Result<()>;
}

/// Sequences a fixed list of components through `start`/`stop`.
pub struct Orchestrator {
    components: Vec<Arc<dyn Component>>,
    started: Mutex<Vec<Arc<dyn Component>>>,
}

impl Orchestrator {
    /// Build an orchestrator over `components`, started in list order and
    /// stopped in reverse.
    #[must_use]
    pub fn new(components: Vec<Arc<dyn Component>>) -> Self {
        Self {
            components,
            started: Mutex::new(Vec::new()),
        }
    }

    /// Start every component in order. Each component's `start` must
    /// complete before `deadline` elapses; if any component times out or
    /// errors, every component already started in this call is stopped in
    /// reverse order and the failure is returned.
    pub async fn start(&self, deadline: Duration) -> eyre::Result<()> {
        let mut started = Vec::new();
        for component in &self.components {
            let outcome = tokio::time::timeout(deadline, component.start()).await;
            match outcome {
                Ok(Ok(())) => {
                    tracing::info!(component = component.name(), "component started");
                    started.push(Arc::clone(component));
                }
                Ok(Err(error)) => {
                    tracing::error!(component = component.name(), %error, "component failed to start");
                    Self::rollback(started).await;
                    return Err(error).wrap_err_with(|| format!("component {} failed to start", component.name()));
                }
                Err(_elapsed) => {
                    tracing::error!(component = component.name(), "component did not become ready before the deadline");
                    Self::rollback(started).await;
                    return Err(eyre!("component {} did not become ready before the deadline", component.name()));
                }
            }
        }
        *self.started.lock() = started;
        Ok(())
    }

    async fn rollback(started: Vec<Arc<dyn Component>>) {
        for component in started.into_iter().rev() {
            if let Err(error) = component.stop().await {
                tracing::error!(component = component.name(), %error, "failed to stop component during rollback");
            }
        }
    }

    /// Stop every started component in reverse order. Idempotent: a second
    /// call finds nothing left to stop and returns `Ok(())`.
    pub async fn stop(&self) -> eyre::Result<()> {
        let started = {
            let mut guard = self.started.lock();
            std::mem::take(&mut *guard)
        };
        for component in started.into_iter().rev() {
            tracing::info!(component = component.name(), "stopping component");
            component.stop().await?;
        }
        Ok(())
    }
}
