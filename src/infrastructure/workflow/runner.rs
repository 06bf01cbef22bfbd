//! Workflow executor implementation
//!
//! Drives one run of a workflow document: seeds the trigger into the run
//! data, dispatches logic steps then action steps strictly in order, and
//! halts at the first failed step. Control-flow drivers recurse back through
//! the runner via the [`ScopeRunner`] capability.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::domain::workflow::resolver;
use crate::domain::{
    Driver, DriverRegistry, DriverResult, ExecutionContext, RegisteredDriver, RunResult,
    ScopeRunner, Step, Workflow, WorkflowError,
};

/// Configuration for the workflow runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum number of steps to execute (prevents runaway loops)
    pub max_steps: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { max_steps: 100 }
    }
}

/// Executes workflow documents against the driver registry
#[derive(Debug)]
pub struct WorkflowRunner {
    /// Step type dispatch table, shared read-only
    registry: Arc<DriverRegistry>,

    /// Runner configuration
    config: RunnerConfig,
}

impl WorkflowRunner {
    /// Create a new runner with default configuration
    pub fn new(registry: Arc<DriverRegistry>) -> Self {
        Self {
            registry,
            config: RunnerConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(registry: Arc<DriverRegistry>, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Execute one run of a workflow on behalf of a user.
    ///
    /// Validation and step type resolution happen before any driver runs, so
    /// a malformed document or an unbound step type is rejected with an `Err`
    /// before side effects occur. Once execution starts, every outcome is a
    /// terminal [`RunResult`]: a failed step halts the run and yields
    /// `"<stepType> failed: <reason>"`, a completed run carries the
    /// accumulated run data.
    pub async fn run(
        &self,
        workflow: &Workflow,
        user_id: impl Into<String>,
    ) -> Result<RunResult, WorkflowError> {
        let started_at = Utc::now();
        let start = Instant::now();

        workflow.validate()?;
        self.check_step_types(workflow)?;

        let mut context = ExecutionContext::new(user_id);

        // Trigger is addressable via the reserved `trigger` reference source
        if let Some(trigger) = workflow.trigger() {
            let mut seed = Map::new();
            seed.insert("type".to_string(), Value::String(trigger.step_type().to_string()));
            seed.insert(
                "parameters".to_string(),
                Value::Object(trigger.parameters().clone()),
            );
            context.insert_output("trigger", Value::Object(seed));
        }

        info!(
            run_id = %context.run_id(),
            user_id = %context.user_id(),
            steps = workflow.step_count(),
            "Starting workflow run"
        );

        let outcome = match self.run_scope(workflow.logic(), &mut context).await {
            Ok(()) => self.run_scope(workflow.actions(), &mut context).await,
            Err(e) => Err(e),
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => {
                info!(elapsed_ms, "Workflow run completed");
                Ok(RunResult::success(context.into_data(), started_at, elapsed_ms))
            }
            Err(err @ (WorkflowError::StepExecution { .. } | WorkflowError::StepBudgetExceeded(_))) => {
                warn!(error = %err, elapsed_ms, "Workflow run failed");
                Ok(RunResult::failure(err.to_string(), started_at, elapsed_ms))
            }
            Err(other) => Err(other),
        }
    }

    /// Verify every step type in the document, including nested branch and
    /// loop bodies, resolves against the registry
    fn check_step_types(&self, workflow: &Workflow) -> Result<(), WorkflowError> {
        fn check(steps: &[Step], registry: &DriverRegistry) -> Result<(), WorkflowError> {
            for step in steps {
                registry.resolve(step.step_type())?;
                check(step.true_path(), registry)?;
                check(step.false_path(), registry)?;
                check(step.body(), registry)?;
            }
            Ok(())
        }

        check(workflow.logic(), &self.registry)?;
        check(workflow.actions(), &self.registry)?;
        Ok(())
    }

    /// Dispatch one step through its registered driver
    async fn dispatch(
        &self,
        step: &Step,
        context: &mut ExecutionContext,
    ) -> Result<(), WorkflowError> {
        if context.steps_executed() >= self.config.max_steps {
            return Err(WorkflowError::StepBudgetExceeded(self.config.max_steps));
        }

        context.note_step();

        debug!(
            run_id = %context.run_id(),
            step_id = %step.id(),
            step_type = %step.step_type(),
            "Dispatching step"
        );

        let result = match self.registry.resolve(step.step_type())? {
            RegisteredDriver::ControlFlow(driver) => {
                driver.execute(step, context, self).await?
            }
            RegisteredDriver::Action(driver) => {
                let parameters = resolver::resolve_parameters(step.parameters(), context);
                self.call_action(driver.as_ref(), step, parameters, context).await
            }
        };

        if result.is_failed() {
            return Err(WorkflowError::step_execution(
                step.step_type(),
                result.error_message(),
            ));
        }

        // An empty object still records that the step ran
        context.insert_output(step.output_key(), Value::Object(result.output));

        Ok(())
    }

    /// Invoke an action driver, enforcing the step's timeout when declared.
    ///
    /// A timed-out call surfaces as a failed driver result so the single
    /// failure path applies.
    async fn call_action(
        &self,
        driver: &dyn Driver,
        step: &Step,
        parameters: Map<String, Value>,
        context: &ExecutionContext,
    ) -> DriverResult {
        match step.timeout_ms() {
            Some(timeout_ms) => {
                let deadline = Duration::from_millis(timeout_ms);
                match tokio::time::timeout(deadline, driver.execute(parameters, context)).await {
                    Ok(result) => result,
                    Err(_) => DriverResult::failed(format!("timed out after {}ms", timeout_ms)),
                }
            }
            None => driver.execute(parameters, context).await,
        }
    }
}

#[async_trait]
impl ScopeRunner for WorkflowRunner {
    async fn run_scope(
        &self,
        steps: &[Step],
        context: &mut ExecutionContext,
    ) -> Result<(), WorkflowError> {
        for step in steps {
            self.dispatch(step, context).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    #[derive(Debug)]
    struct RecordingDriver {
        call_count: AtomicUsize,
        result: DriverResult,
    }

    impl RecordingDriver {
        fn succeeding(output: Map<String, Value>) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                result: DriverResult::success(output),
            }
        }

        fn failing(error: &str) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                result: DriverResult::failed(error),
            }
        }

        fn call_count(&self) -> usize {
            self.call_count.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Driver for RecordingDriver {
        async fn execute(
            &self,
            _parameters: Map<String, Value>,
            _context: &ExecutionContext,
        ) -> DriverResult {
            self.call_count.fetch_add(1, Ordering::Relaxed);
            self.result.clone()
        }
    }

    /// Driver that records the parameters it received
    #[derive(Debug, Default)]
    struct CapturingDriver {
        captured: std::sync::Mutex<Vec<Map<String, Value>>>,
    }

    #[async_trait]
    impl Driver for CapturingDriver {
        async fn execute(
            &self,
            parameters: Map<String, Value>,
            _context: &ExecutionContext,
        ) -> DriverResult {
            self.captured.lock().unwrap().push(parameters);
            DriverResult::success_empty()
        }
    }

    #[derive(Debug)]
    struct SlowDriver;

    #[async_trait]
    impl Driver for SlowDriver {
        async fn execute(
            &self,
            _parameters: Map<String, Value>,
            _context: &ExecutionContext,
        ) -> DriverResult {
            tokio::time::sleep(Duration::from_secs(60)).await;
            DriverResult::success_empty()
        }
    }

    fn output(key: &str, value: Value) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        map
    }

    fn runner_with(entries: Vec<(&str, Arc<dyn Driver>)>) -> WorkflowRunner {
        let mut registry = DriverRegistry::new();
        for (step_type, driver) in entries {
            registry.register(step_type, driver).unwrap();
        }
        WorkflowRunner::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_successful_run_collects_outputs() {
        let driver = Arc::new(RecordingDriver::succeeding(output("sent", json!(true))));
        let runner = runner_with(vec![("emailSend", driver.clone())]);

        let workflow = Workflow::new(Step::new("trigger", "manual"))
            .with_action(Step::new("emailSend", "emailSend").with_parameter("toEmail", "a@b.com"));

        let result = runner.run(&workflow, "user-1").await.unwrap();

        assert!(result.is_success());
        let data = result.output.unwrap();
        assert_eq!(data["emailSend"], json!({"sent": true}));
        assert_eq!(driver.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_step_halts_run() {
        let failing = Arc::new(RecordingDriver::failing("smtp timeout"));
        let after = Arc::new(RecordingDriver::succeeding(Map::new()));
        let runner = runner_with(vec![
            ("emailSend", failing.clone() as Arc<dyn Driver>),
            ("slackPost", after.clone() as Arc<dyn Driver>),
        ]);

        let workflow = Workflow::new(Step::new("trigger", "manual"))
            .with_action(Step::new("email", "emailSend"))
            .with_action(Step::new("slack", "slackPost"));

        let result = runner.run(&workflow, "user-1").await.unwrap();

        assert!(!result.is_success());
        assert_eq!(result.error.as_deref(), Some("emailSend failed: smtp timeout"));
        assert_eq!(failing.call_count(), 1);
        assert_eq!(after.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_step_type_rejected_before_execution() {
        let driver = Arc::new(RecordingDriver::succeeding(Map::new()));
        let runner = runner_with(vec![("echo", driver.clone() as Arc<dyn Driver>)]);

        let workflow = Workflow::new(Step::new("trigger", "manual"))
            .with_action(Step::new("a", "echo"))
            .with_action(Step::new("b", "send_fax"));

        let err = runner.run(&workflow, "user-1").await.unwrap_err();

        assert_eq!(err, WorkflowError::UnknownStepType("send_fax".to_string()));
        // Rejected up front, so not even the known step ran
        assert_eq!(driver.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_workflow_rejected() {
        let runner = runner_with(vec![]);
        let workflow = Workflow::empty();

        let err = runner.run(&workflow, "user-1").await.unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_trigger_seeded_into_run_data() {
        let capturing = Arc::new(CapturingDriver::default());
        let runner = runner_with(vec![("echo", capturing.clone() as Arc<dyn Driver>)]);

        let workflow = Workflow::new(
            Step::new("trigger", "webhook").with_parameter("path", "/hooks/new-lead"),
        )
        .with_action(
            Step::new("echo1", "echo").with_parameter("from", "{{trigger.parameters.path}}"),
        );

        let result = runner.run(&workflow, "user-1").await.unwrap();
        assert!(result.is_success());

        let captured = capturing.captured.lock().unwrap();
        assert_eq!(captured[0]["from"], json!("/hooks/new-lead"));

        // The seed itself survives in the final output
        let data = result.output.unwrap();
        assert_eq!(data["trigger"]["type"], json!("webhook"));
    }

    #[tokio::test]
    async fn test_forward_reference_passes_through_literally() {
        let capturing = Arc::new(CapturingDriver::default());
        let runner = runner_with(vec![("echo", capturing.clone() as Arc<dyn Driver>)]);

        let workflow = Workflow::new(Step::new("trigger", "manual"))
            .with_action(Step::new("first", "echo").with_parameter("later", "{{second.value}}"))
            .with_action(Step::new("second", "echo"));

        runner.run(&workflow, "user-1").await.unwrap();

        let captured = capturing.captured.lock().unwrap();
        assert_eq!(captured[0]["later"], json!("{{second.value}}"));
    }

    #[tokio::test]
    async fn test_output_merged_under_declared_output_key() {
        let driver = Arc::new(RecordingDriver::succeeding(output("n", json!(1))));
        let runner = runner_with(vec![("fetch", driver as Arc<dyn Driver>)]);

        let workflow = Workflow::new(Step::new("trigger", "manual"))
            .with_action(Step::new("fetch1", "fetch").with_parameter("output_key", "response"));

        let result = runner.run(&workflow, "user-1").await.unwrap();
        let data = result.output.unwrap();

        assert_eq!(data["response"], json!({"n": 1}));
        assert!(!data.contains_key("fetch1"));
    }

    #[tokio::test]
    async fn test_empty_output_still_recorded_under_step_id() {
        let driver = Arc::new(RecordingDriver::succeeding(Map::new()));
        let runner = runner_with(vec![("mark_seen", driver as Arc<dyn Driver>)]);

        let workflow = Workflow::new(Step::new("trigger", "manual"))
            .with_action(Step::new("noop", "mark_seen"));

        let result = runner.run(&workflow, "user-1").await.unwrap();
        let data = result.output.unwrap();

        // A succeeded step always leaves a key, even with nothing to report
        assert_eq!(data["noop"], json!({}));
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_timeout_becomes_failed_result() {
        let runner = runner_with(vec![("slow", Arc::new(SlowDriver) as Arc<dyn Driver>)]);

        let workflow = Workflow::new(Step::new("trigger", "manual"))
            .with_action(Step::new("s", "slow").with_timeout_ms(50));

        let result = runner.run(&workflow, "user-1").await.unwrap();

        assert!(!result.is_success());
        assert_eq!(
            result.error.as_deref(),
            Some("slow failed: timed out after 50ms")
        );
    }

    #[tokio::test]
    async fn test_step_budget_bounds_run() {
        let driver = Arc::new(RecordingDriver::succeeding(Map::new()));
        let mut registry = DriverRegistry::new();
        registry.register("echo", driver.clone() as Arc<dyn Driver>).unwrap();
        let runner = WorkflowRunner::with_config(
            Arc::new(registry),
            RunnerConfig { max_steps: 2 },
        );

        let workflow = Workflow::new(Step::new("trigger", "manual"))
            .with_action(Step::new("a", "echo"))
            .with_action(Step::new("b", "echo"))
            .with_action(Step::new("c", "echo"));

        let result = runner.run(&workflow, "user-1").await.unwrap();

        assert!(!result.is_success());
        assert_eq!(driver.call_count(), 2);
        assert!(result.error.as_deref().unwrap_or_default().contains("budget"));
    }
}
