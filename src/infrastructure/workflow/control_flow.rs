//! Built-in control-flow drivers
//!
//! Conditionals and loops are ordinary registered drivers. They carry no
//! external effects of their own; nested step lists run on a child context
//! through the [`ScopeRunner`] capability, and the child's outputs become
//! visible to the parent only after the nested scope completes.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::domain::workflow::resolver;
use crate::domain::{
    ControlFlowDriver, DriverResult, ExecutionContext, ScopeRunner, Step, WorkflowError,
};

/// Comparison operator inside a condition expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionOperator {
    Eq,
    Ne,
    Gte,
    Lte,
    Gt,
    Lt,
    Contains,
}

impl ConditionOperator {
    /// Operators in match order; multi-character symbols come before their
    /// single-character prefixes
    const TOKENS: [(&'static str, Self); 7] = [
        ("==", Self::Eq),
        ("!=", Self::Ne),
        (">=", Self::Gte),
        ("<=", Self::Lte),
        (">", Self::Gt),
        ("<", Self::Lt),
        (" contains ", Self::Contains),
    ];

    fn evaluate(&self, field: &Value, compare: &Value) -> bool {
        match self {
            Self::Eq => loose_eq(field, compare),
            Self::Ne => !loose_eq(field, compare),
            Self::Gt => compare_numbers(field, compare, |a, b| a > b),
            Self::Gte => compare_numbers(field, compare, |a, b| a >= b),
            Self::Lt => compare_numbers(field, compare, |a, b| a < b),
            Self::Lte => compare_numbers(field, compare, |a, b| a <= b),
            Self::Contains => contains(field, compare),
        }
    }
}

/// Equality with numeric coercion, so `score == 80` matches whether the run
/// data holds an integer or a float
fn loose_eq(a: &Value, b: &Value) -> bool {
    if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
        return a == b;
    }
    a == b
}

fn compare_numbers<F>(a: &Value, b: &Value, f: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (a.as_f64(), b.as_f64()) {
        (Some(a), Some(b)) => f(a, b),
        _ => false,
    }
}

fn contains(field: &Value, value: &Value) -> bool {
    match field {
        Value::String(s) => value.as_str().is_some_and(|v| s.contains(v)),
        Value::Array(arr) => arr.contains(value),
        _ => false,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(_) => true,
    }
}

/// Evaluate a condition expression against the run data.
///
/// Grammar: `<path> <op> <literal>` with `== != > >= < <= contains`, or a
/// bare path evaluated for truthiness. `{{...}}` references are resolved
/// first, then the left side is looked up as a dotted path in the run data
/// (falling back to a literal), and the right side parses as a JSON literal
/// (falling back to a plain string).
pub fn evaluate_condition(
    condition: &str,
    context: &ExecutionContext,
) -> Result<bool, WorkflowError> {
    let resolved = match resolver::resolve_value(&Value::String(condition.to_string()), context) {
        Value::String(s) => s,
        other => other.to_string(),
    };

    let expression = resolved.trim();
    if expression.is_empty() {
        return Err(WorkflowError::invalid_condition(condition));
    }

    for (token, operator) in ConditionOperator::TOKENS {
        if let Some(position) = expression.find(token) {
            let lhs = expression[..position].trim();
            let rhs = expression[position + token.len()..].trim();

            if lhs.is_empty() || rhs.is_empty() {
                return Err(WorkflowError::invalid_condition(condition));
            }

            let field = operand_value(lhs, context);
            let compare = operand_value(rhs, context);

            return Ok(operator.evaluate(&field, &compare));
        }
    }

    // Bare expression: truthiness of the referenced value. A `{{...}}`
    // reference has already been substituted here, so a literal that no
    // longer names a path falls back to JSON-literal truthiness.
    if let Some(value) = context.lookup(expression) {
        return Ok(truthy(value));
    }

    Ok(serde_json::from_str::<Value>(expression)
        .map(|value| truthy(&value))
        .unwrap_or(false))
}

/// An operand is a dotted path into the run data when one matches, otherwise
/// a JSON literal, otherwise a plain string
fn operand_value(operand: &str, context: &ExecutionContext) -> Value {
    if let Some(value) = context.lookup(operand) {
        return value.clone();
    }

    serde_json::from_str(operand).unwrap_or_else(|_| Value::String(operand.to_string()))
}

/// Conditional branching: runs exactly one of `truePath`/`falsePath`
#[derive(Debug, Default)]
pub struct IfElseDriver;

#[async_trait]
impl ControlFlowDriver for IfElseDriver {
    async fn execute(
        &self,
        step: &Step,
        context: &mut ExecutionContext,
        scope: &dyn ScopeRunner,
    ) -> Result<DriverResult, WorkflowError> {
        let condition = step
            .condition()
            .ok_or_else(|| WorkflowError::invalid_condition("<missing>"))?;

        let matched = evaluate_condition(condition, context)?;

        debug!(
            step_id = %step.id(),
            condition = %condition,
            matched,
            "Evaluated branch condition"
        );

        let branch = if matched { step.true_path() } else { step.false_path() };

        let mut child = context.child();
        scope.run_scope(branch, &mut child).await?;
        context.absorb(child);

        Ok(DriverResult::success_empty())
    }
}

/// Loop over a named collection in the run data, one child scope per element
#[derive(Debug, Default)]
pub struct ForEachDriver;

#[async_trait]
impl ControlFlowDriver for ForEachDriver {
    async fn execute(
        &self,
        step: &Step,
        context: &mut ExecutionContext,
        scope: &dyn ScopeRunner,
    ) -> Result<DriverResult, WorkflowError> {
        let collection_path = step
            .collection()
            .ok_or_else(|| WorkflowError::missing_collection("<missing>"))?;

        let items = match context.lookup(collection_path) {
            Some(Value::Array(items)) => items.clone(),
            _ => return Err(WorkflowError::missing_collection(collection_path)),
        };

        debug!(
            step_id = %step.id(),
            collection = %collection_path,
            count = items.len(),
            "Iterating collection"
        );

        let iterations = items.len();

        for (index, item) in items.into_iter().enumerate() {
            let mut child = context.child();
            child.insert_output("item", item);
            child.insert_output("index", json!(index));

            // First failing iteration stops the loop and propagates
            scope.run_scope(step.body(), &mut child).await?;

            // The loop variables are scoped to the iteration
            child.remove("item");
            child.remove("index");
            context.absorb(child);
        }

        let mut output = Map::new();
        output.insert("iterations".to_string(), json!(iterations));
        Ok(DriverResult::success(output))
    }
}
