//! Run-scoped execution context
//!
//! `current_data` is the substrate every step reads from and writes to: each
//! executed step merges its output under its own id (or a declared
//! `output_key`), and the parameter resolver reads references out of it.

use serde_json::{Map, Value};
use uuid::Uuid;

/// Mutable pipeline state threaded through one workflow run
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Accumulated step outputs, keyed by step id (or declared output key)
    current_data: Map<String, Value>,

    /// Opaque run identifier, fixed for the lifetime of the run
    run_id: Uuid,

    /// User the run executes on behalf of; used for credential scoping
    user_id: String,

    /// Steps dispatched so far, counted across nested scopes
    steps_executed: usize,
}

impl ExecutionContext {
    /// Create a fresh context for a new run
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            current_data: Map::new(),
            run_id: Uuid::new_v4(),
            user_id: user_id.into(),
            steps_executed: 0,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.current_data
    }

    /// Take ownership of the accumulated data, consuming the context
    pub fn into_data(self) -> Map<String, Value> {
        self.current_data
    }

    pub fn steps_executed(&self) -> usize {
        self.steps_executed
    }

    /// Record one dispatched step
    pub fn note_step(&mut self) {
        self.steps_executed += 1;
    }

    /// Merge a step's output into the run data under the given key
    pub fn insert_output(&mut self, key: impl Into<String>, output: Value) {
        self.current_data.insert(key.into(), output);
    }

    /// Remove an entry, returning it if present
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.current_data.remove(key)
    }

    /// Look up a dotted path (`stepId.key.nested`) in the run data
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let root = segments.next()?;
        let mut current = self.current_data.get(root)?;

        for segment in segments {
            match current {
                Value::Object(obj) => {
                    current = obj.get(segment)?;
                }
                Value::Array(arr) => {
                    let index: usize = segment.parse().ok()?;
                    current = arr.get(index)?;
                }
                _ => return None,
            }
        }

        Some(current)
    }

    /// Copy-on-write view for a nested (branch/loop) scope.
    ///
    /// The child reads all outer data; its own outputs become visible to the
    /// parent only through [`absorb`](Self::absorb) after the nested run
    /// completes.
    pub fn child(&self) -> Self {
        self.clone()
    }

    /// Merge a completed child scope back into this context
    pub fn absorb(&mut self, child: Self) {
        self.steps_executed = child.steps_executed;
        for (key, value) in child.current_data {
            self.current_data.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_creation() {
        let ctx = ExecutionContext::new("user-1");
        assert_eq!(ctx.user_id(), "user-1");
        assert!(ctx.data().is_empty());
        assert_eq!(ctx.steps_executed(), 0);
    }

    #[test]
    fn test_run_ids_are_unique() {
        let a = ExecutionContext::new("u");
        let b = ExecutionContext::new("u");
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn test_lookup_nested_path() {
        let mut ctx = ExecutionContext::new("u");
        ctx.insert_output(
            "search",
            json!({
                "items": [{"name": "first"}, {"name": "second"}],
                "count": 2
            }),
        );

        assert_eq!(ctx.lookup("search.count"), Some(&json!(2)));
        assert_eq!(ctx.lookup("search.items.1.name"), Some(&json!("second")));
        assert_eq!(ctx.lookup("search.missing"), None);
        assert_eq!(ctx.lookup("other.count"), None);
    }

    #[test]
    fn test_child_sees_outer_data() {
        let mut ctx = ExecutionContext::new("u");
        ctx.insert_output("a", json!({"x": 1}));

        let child = ctx.child();
        assert_eq!(child.lookup("a.x"), Some(&json!(1)));
        assert_eq!(child.run_id(), ctx.run_id());
    }

    #[test]
    fn test_child_outputs_invisible_until_absorbed() {
        let mut ctx = ExecutionContext::new("u");

        let mut child = ctx.child();
        child.insert_output("nested", json!({"done": true}));
        assert_eq!(ctx.lookup("nested.done"), None);

        ctx.absorb(child);
        assert_eq!(ctx.lookup("nested.done"), Some(&json!(true)));
    }

    #[test]
    fn test_absorb_carries_step_count() {
        let mut ctx = ExecutionContext::new("u");
        ctx.note_step();

        let mut child = ctx.child();
        child.note_step();
        child.note_step();

        ctx.absorb(child);
        assert_eq!(ctx.steps_executed(), 3);
    }
}
