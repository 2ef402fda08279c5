//! Coordinator-side fan-out: start N agents in parallel, barrier on all of
//! them reaching `Running` or `Failed`, and report every outcome.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::agent::{ExitReport, LifecycleController};
use crate::backend::BackendSpec;
use crate::error::{AppError, AppResult};

/// Transport-agnostic handle to one agent. The control RPC layer is a
/// collaborator; in-process agents implement this directly.
#[async_trait]
pub trait AgentHandle: Send + Sync {
    /// Endpoint label used in reports.
    fn endpoint(&self) -> String;

    /// Drives the agent's database process to `Running`.
    async fn start(&self, spec: BackendSpec) -> AppResult<()>;

    /// Stops the agent's database process.
    async fn stop(&self) -> AppResult<ExitReport>;
}

/// In-process agent backed directly by a lifecycle controller.
pub struct LocalAgent {
    endpoint: String,
    controller: Arc<LifecycleController>,
}

impl LocalAgent {
    #[must_use]
    pub fn new(endpoint: String, controller: Arc<LifecycleController>) -> Self {
        Self {
            endpoint,
            controller,
        }
    }
}

#[async_trait]
impl AgentHandle for LocalAgent {
    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn start(&self, spec: BackendSpec) -> AppResult<()> {
        self.controller.prepare(spec).await?;
        self.controller.launch().await?;
        Ok(())
    }

    async fn stop(&self) -> AppResult<ExitReport> {
        self.controller.stop().await
    }
}

#[derive(Debug)]
pub struct AgentStartOutcome {
    pub endpoint: String,
    pub result: AppResult<()>,
}

/// Everything the barrier observed: one outcome per agent, in spec order.
/// A failed agent never hides the others' outcomes.
#[derive(Debug)]
pub struct FleetStartReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub outcomes: Vec<AgentStartOutcome>,
}

impl FleetStartReport {
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .count()
    }

    #[must_use]
    pub fn failed_endpoints(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .map(|outcome| outcome.endpoint.as_str())
            .collect()
    }

    /// Surfaces the first failure, consuming the report.
    pub fn into_first_failure(self) -> Option<(String, AppError)> {
        self.outcomes
            .into_iter()
            .find_map(|outcome| match outcome.result {
                Ok(()) => None,
                Err(err) => Some((outcome.endpoint, err)),
            })
    }
}

/// Fans `specs` out to `agents` pairwise and waits for every agent to
/// finish starting. This is a barrier, not a race: all outcomes are
/// collected even when some fail.
pub async fn start_fleet(
    agents: &[Arc<dyn AgentHandle>],
    specs: Vec<BackendSpec>,
) -> FleetStartReport {
    let started_at = Utc::now();
    let mut join_set = JoinSet::new();
    for (index, (agent, spec)) in agents.iter().zip(specs).enumerate() {
        let agent = Arc::clone(agent);
        join_set.spawn(async move {
            let endpoint = agent.endpoint();
            let result = agent.start(spec).await;
            (index, endpoint, result)
        });
    }

    let mut outcomes: Vec<Option<AgentStartOutcome>> = Vec::new();
    outcomes.resize_with(agents.len(), || None);
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, endpoint, result)) => {
                if let Err(err) = result.as_ref() {
                    error!("Agent {} failed to start: {}", endpoint, err);
                }
                if let Some(slot) = outcomes.get_mut(index) {
                    *slot = Some(AgentStartOutcome { endpoint, result });
                }
            }
            Err(join_err) => {
                error!("Agent start task panicked: {}", join_err);
            }
        }
    }

    let outcomes: Vec<AgentStartOutcome> = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| {
            outcome.unwrap_or_else(|| AgentStartOutcome {
                endpoint: format!("agent-{}", index),
                result: Err(AppError::agent(crate::error::AgentError::SupervisorGone)),
            })
        })
        .collect();

    let report = FleetStartReport {
        started_at,
        completed_at: Utc::now(),
        outcomes,
    };
    info!(
        "Fleet start: {}/{} agents running",
        report.running_count(),
        report.outcomes.len()
    );
    report
}

/// Stops every agent, collecting all results; used for teardown after the
/// load phase regardless of how many starts succeeded.
pub async fn stop_fleet(agents: &[Arc<dyn AgentHandle>]) -> Vec<(String, AppResult<ExitReport>)> {
    let mut join_set = JoinSet::new();
    for (index, agent) in agents.iter().enumerate() {
        let agent = Arc::clone(agent);
        join_set.spawn(async move { (index, agent.endpoint(), agent.stop().await) });
    }

    let mut results: Vec<Option<(String, AppResult<ExitReport>)>> = Vec::new();
    results.resize_with(agents.len(), || None);
    while let Some(joined) = join_set.join_next().await {
        if let Ok((index, endpoint, result)) = joined {
            if let Some(slot) = results.get_mut(index) {
                *slot = Some((endpoint, result));
            }
        }
    }
    results
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            entry.unwrap_or_else(|| {
                (
                    format!("agent-{}", index),
                    Err(AppError::agent(crate::error::AgentError::SupervisorGone)),
                )
            })
        })
        .collect()
}
