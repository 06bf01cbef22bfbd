//! Workflow and step documents

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::WorkflowError;

/// Maximum length for step ids
pub const MAX_STEP_ID_LENGTH: usize = 64;

/// Step ids are alphanumeric with hyphens and underscores, starting alphanumeric
static STEP_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$").unwrap());

/// Validate a step id string
pub fn validate_step_id(id: &str) -> Result<(), WorkflowError> {
    if id.is_empty() {
        return Err(WorkflowError::validation("Step id cannot be empty"));
    }

    if id.len() > MAX_STEP_ID_LENGTH {
        return Err(WorkflowError::validation(format!(
            "Step id exceeds maximum length of {} characters",
            MAX_STEP_ID_LENGTH
        )));
    }

    if !STEP_ID_PATTERN.is_match(id) {
        return Err(WorkflowError::validation(format!(
            "Invalid step id '{}': must be alphanumeric with hyphens or underscores, starting alphanumeric",
            id
        )));
    }

    Ok(())
}

/// A single unit of work inside a workflow.
///
/// `step_type` is a string key resolved against the driver registry at run
/// time. Control-flow steps additionally carry nested step lists
/// (`true_path`/`false_path` for conditionals, `body` for loops).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Unique id within the containing step list. Optional on the trigger,
    /// which is addressed by the reserved `trigger` name instead.
    #[serde(default)]
    id: String,

    /// Step type key resolved against the driver registry
    #[serde(rename = "type")]
    step_type: String,

    /// Raw parameters; values may contain `{{stepId.key}}` references
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    parameters: Map<String, Value>,

    /// Condition expression (conditional steps only)
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<String>,

    /// Steps executed when the condition holds
    #[serde(default, rename = "truePath", skip_serializing_if = "Vec::is_empty")]
    true_path: Vec<Step>,

    /// Steps executed when the condition does not hold
    #[serde(default, rename = "falsePath", skip_serializing_if = "Vec::is_empty")]
    false_path: Vec<Step>,

    /// Name of the run-data collection to iterate (loop steps only)
    #[serde(skip_serializing_if = "Option::is_none")]
    collection: Option<String>,

    /// Loop body steps
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    body: Vec<Step>,

    /// Optional per-step timeout enforced around the driver call
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
}

impl Step {
    /// Create a new step
    pub fn new(id: impl Into<String>, step_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            step_type: step_type.into(),
            parameters: Map::new(),
            condition: None,
            true_path: Vec::new(),
            false_path: Vec::new(),
            collection: None,
            body: Vec::new(),
            timeout_ms: None,
        }
    }

    // Builder methods

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_true_path(mut self, steps: Vec<Step>) -> Self {
        self.true_path = steps;
        self
    }

    pub fn with_false_path(mut self, steps: Vec<Step>) -> Self {
        self.false_path = steps;
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_body(mut self, steps: Vec<Step>) -> Self {
        self.body = steps;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    // Getters

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn step_type(&self) -> &str {
        &self.step_type
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn true_path(&self) -> &[Step] {
        &self.true_path
    }

    pub fn false_path(&self) -> &[Step] {
        &self.false_path
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn body(&self) -> &[Step] {
        &self.body
    }

    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    /// Key the step's output is merged under: the `output_key` parameter when
    /// declared, otherwise the step id.
    pub fn output_key(&self) -> &str {
        self.parameters
            .get("output_key")
            .and_then(Value::as_str)
            .unwrap_or(&self.id)
    }

    /// Nested step lists of a control-flow step, in declared order
    pub fn nested_steps(&self) -> impl Iterator<Item = &Step> {
        self.true_path
            .iter()
            .chain(self.false_path.iter())
            .chain(self.body.iter())
    }
}

/// A declarative workflow document: one trigger plus ordered logic and action
/// steps. Immutable per run; safe to reuse across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workflow {
    /// How the run was initiated (manual, scheduled, webhook, inbound message)
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger: Option<Step>,

    /// Control-flow steps, executed before actions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    logic: Vec<Step>,

    /// Effectful steps, executed after logic
    #[serde(default)]
    actions: Vec<Step>,
}

impl Workflow {
    /// Create a new workflow with the given trigger
    pub fn new(trigger: Step) -> Self {
        Self {
            trigger: Some(trigger),
            logic: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Create a workflow with no trigger; fails validation, useful for tests
    /// and for documents built incrementally
    pub fn empty() -> Self {
        Self {
            trigger: None,
            logic: Vec::new(),
            actions: Vec::new(),
        }
    }

    // Builder methods

    pub fn with_logic_step(mut self, step: Step) -> Self {
        self.logic.push(step);
        self
    }

    pub fn with_action(mut self, step: Step) -> Self {
        self.actions.push(step);
        self
    }

    pub fn with_actions(mut self, steps: Vec<Step>) -> Self {
        self.actions = steps;
        self
    }

    // Getters

    pub fn trigger(&self) -> Option<&Step> {
        self.trigger.as_ref()
    }

    pub fn logic(&self) -> &[Step] {
        &self.logic
    }

    pub fn actions(&self) -> &[Step] {
        &self.actions
    }

    pub fn step_count(&self) -> usize {
        self.logic.len() + self.actions.len()
    }

    /// Validate the document before execution.
    ///
    /// A workflow with a missing trigger or empty `actions` is rejected here,
    /// before any side effect occurs. Step ids must be valid and unique within
    /// their containing list.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let trigger = self
            .trigger
            .as_ref()
            .ok_or_else(|| WorkflowError::validation("Workflow has no trigger"))?;

        if trigger.step_type().is_empty() {
            return Err(WorkflowError::validation("Trigger has no type"));
        }

        if self.actions.is_empty() {
            return Err(WorkflowError::validation("Workflow has no actions"));
        }

        validate_step_list(&self.logic)?;
        validate_step_list(&self.actions)?;

        Ok(())
    }
}

/// Validate ids in a step list: well-formed and unique within the list.
/// Recurses into nested branch/loop bodies, which form their own scopes.
fn validate_step_list(steps: &[Step]) -> Result<(), WorkflowError> {
    let mut seen = std::collections::HashSet::new();

    for step in steps {
        validate_step_id(step.id())?;

        if !seen.insert(step.id()) {
            return Err(WorkflowError::validation(format!(
                "Duplicate step id '{}' in step list",
                step.id()
            )));
        }

        if step.step_type().is_empty() {
            return Err(WorkflowError::validation(format!(
                "Step '{}' has no type",
                step.id()
            )));
        }

        validate_step_list(step.true_path())?;
        validate_step_list(step.false_path())?;
        validate_step_list(step.body())?;
    }

    Ok(())
}
