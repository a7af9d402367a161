//! Run coordination: configuration loading, trigger resolution and the
//! sequential execution of every resolved model.

use crate::config::LoadConfig;
use crate::error::PrepareError;
use crate::model::{Model, ModelId};
use crate::outcome::{Aggregate, ExitStatus, Outcome, RunLog};
use crate::registry::ModelRegistry;
use crate::trigger;
use tracing::{debug, info, info_span};

/// Executes one model.
///
/// Warnings and errors are recorded in `log`; a failing model never stops the
/// run.
pub trait Perform {
    fn perform(&self, model: &Model, log: &mut RunLog);
}

impl<F> Perform for F
where
    F: Fn(&Model, &mut RunLog),
{
    fn perform(&self, model: &Model, log: &mut RunLog) {
        self(model, log)
    }
}

/// Lifecycle of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Preparing,
    Running,
    Finalizing,
    Done(ExitStatus),
    Aborted,
}

/// What happened to one performed model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReport {
    pub id: ModelId,
    pub trigger: String,
    pub label: String,
    pub outcome: Outcome,
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub models: Vec<ModelReport>,
    pub aggregate: Aggregate,
}

impl RunReport {
    pub fn status(&self) -> ExitStatus {
        self.aggregate.status()
    }
}

/// Registry and run list produced by a successful preparation.
#[derive(Debug)]
pub struct Prepared {
    pub registry: ModelRegistry,
    pub run_list: Vec<ModelId>,
}

pub struct Runner<L, P> {
    loader: L,
    performer: P,
    state: RunState,
}

impl<L: LoadConfig, P: Perform> Runner<L, P> {
    pub fn new(loader: L, performer: P) -> Self {
        Self {
            loader,
            performer,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Loads the configuration once and resolves `patterns` against it.
    ///
    /// # Errors
    /// Any load failure becomes [`PrepareError::Configuration`]; an empty run
    /// list becomes [`PrepareError::NoModelsFound`]. The runner is then
    /// [`RunState::Aborted`].
    pub fn prepare<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<Prepared, PrepareError> {
        self.transition(RunState::Preparing);

        let mut registry = ModelRegistry::new();
        let mut log = RunLog::new();
        if let Err(e) = self.loader.load_config(&mut registry, &mut log) {
            self.transition(RunState::Aborted);
            return Err(PrepareError::configuration(&e));
        }
        // Load warnings were already emitted and do not count against any model.
        log.clear();

        match trigger::resolve(patterns, &registry) {
            Ok(run_list) => Ok(Prepared { registry, run_list }),
            Err(e) => {
                self.transition(RunState::Aborted);
                Err(e)
            }
        }
    }

    /// Prepares and then performs every resolved model in order.
    ///
    /// # Errors
    /// Only preparation failures are returned; nothing has been performed
    /// when this returns `Err`.
    pub fn run<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<RunReport, PrepareError> {
        let prepared = self.prepare(patterns)?;
        Ok(self.perform(&prepared))
    }

    /// Performs every model of a prepared run list in order.
    pub fn perform(&mut self, prepared: &Prepared) -> RunReport {
        self.transition(RunState::Running);

        let mut log = RunLog::new();
        let mut aggregate = Aggregate::new();
        let mut models = Vec::with_capacity(prepared.run_list.len());

        for &id in &prepared.run_list {
            let model = &prepared.registry[id];
            let span = info_span!("model", trigger = %model.trigger, label = %model.label);
            let _enter = span.enter();

            info!("Performing {model}");
            self.performer.perform(model, &mut log);
            let outcome = log.take_outcome();
            aggregate.record(outcome);
            if outcome.had_errors {
                info!("Backup for {model} finished with errors");
            } else if outcome.had_warnings {
                info!("Backup for {model} finished with warnings");
            } else {
                info!("Backup for {model} completed successfully");
            }

            models.push(ModelReport {
                id,
                trigger: model.trigger.clone(),
                label: model.label.clone(),
                outcome,
            });
        }

        self.transition(RunState::Finalizing);
        let report = RunReport { models, aggregate };
        self.transition(RunState::Done(report.status()));
        report
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "run state");
        self.state = next;
    }
}
