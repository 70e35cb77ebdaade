// ABOUTME: Chained-scope environment for variable bindings

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// What a name is currently bound to in a frame. `Pending` exists only for
/// the brief window between a `letrec` binding names and evaluating their
/// right-hand sides — referencing a name still `Pending` is a program error
/// (`UninitializedBinding`), not a missing binding.
#[derive(Debug, Clone)]
enum Slot {
    Ready(Value),
    Pending,
}

pub enum Lookup {
    Value(Value),
    Uninitialized,
}

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<Rc<str>, Slot>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new root environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child scope chained to `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds `name` in this frame, shadowing any binding of the same name
    /// in an enclosing scope.
    pub fn add(&self, name: Rc<str>, value: Value) {
        self.bindings.borrow_mut().insert(name, Slot::Ready(value));
    }

    /// Reserves `name` in this frame without a value yet, for `letrec`.
    pub fn add_pending(&self, name: Rc<str>) {
        self.bindings.borrow_mut().insert(name, Slot::Pending);
    }

    /// Fills in a name previously reserved with `add_pending` in this frame.
    pub fn resolve_pending(&self, name: &str, value: Value) {
        self.bindings
            .borrow_mut()
            .insert(Rc::from(name), Slot::Ready(value));
    }

    /// Looks up `name` in this scope, then recursively in parent scopes.
    pub fn lookup(&self, name: &str) -> Option<Lookup> {
        if let Some(slot) = self.bindings.borrow().get(name) {
            return Some(match slot {
                Slot::Ready(v) => Lookup::Value(v.clone()),
                Slot::Pending => Lookup::Uninitialized,
            });
        }
        self.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Rewrites the nearest existing binding of `name` up the parent chain.
    /// If no binding exists anywhere in the chain, falls back to binding
    /// `name` locally, exactly as a fresh `add` would.
    pub fn update(&self, name: Rc<str>, value: Value) {
        if self.bindings.borrow().contains_key(name.as_ref()) {
            self.bindings.borrow_mut().insert(name, Slot::Ready(value));
            return;
        }
        if let Some(parent) = &self.parent {
            if parent.contains(&name) {
                parent.update(name, value);
                return;
            }
        }
        self.add(name, value);
    }

    fn contains(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
            || self.parent.as_ref().is_some_and(|p| p.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(lookup: Option<Lookup>) -> Option<Value> {
        match lookup {
            Some(Lookup::Value(v)) => Some(v),
            _ => None,
        }
    }

    #[test]
    fn add_and_lookup() {
        let env = Environment::new();
        env.add(Rc::from("x"), Value::Number(42));
        assert!(matches!(value_of(env.lookup("x")), Some(Value::Number(42))));
    }

    #[test]
    fn lookup_missing_is_none() {
        let env = Environment::new();
        assert!(env.lookup("undefined").is_none());
    }

    #[test]
    fn add_always_shadows_in_current_frame() {
        let parent = Environment::new();
        parent.add(Rc::from("x"), Value::Number(1));

        let child = Environment::with_parent(parent.clone());
        child.add(Rc::from("x"), Value::Number(2));

        assert!(matches!(value_of(child.lookup("x")), Some(Value::Number(2))));
        assert!(matches!(value_of(parent.lookup("x")), Some(Value::Number(1))));
    }

    #[test]
    fn update_rewrites_nearest_existing_binding_up_the_chain() {
        let parent = Environment::new();
        parent.add(Rc::from("x"), Value::Number(1));

        let child = Environment::with_parent(parent.clone());
        child.update(Rc::from("x"), Value::Number(99));

        assert!(matches!(value_of(child.lookup("x")), Some(Value::Number(99))));
        assert!(matches!(value_of(parent.lookup("x")), Some(Value::Number(99))));
    }

    #[test]
    fn update_with_no_existing_binding_defines_locally() {
        let parent = Environment::new();
        let child = Environment::with_parent(parent.clone());
        child.update(Rc::from("y"), Value::Number(5));

        assert!(matches!(value_of(child.lookup("y")), Some(Value::Number(5))));
        assert!(parent.lookup("y").is_none());
    }

    #[test]
    fn multiple_levels_see_all_ancestors() {
        let grandparent = Environment::new();
        grandparent.add(Rc::from("a"), Value::Number(1));
        let parent = Environment::with_parent(grandparent);
        parent.add(Rc::from("b"), Value::Number(2));
        let child = Environment::with_parent(parent);
        child.add(Rc::from("c"), Value::Number(3));

        assert!(matches!(value_of(child.lookup("a")), Some(Value::Number(1))));
        assert!(matches!(value_of(child.lookup("b")), Some(Value::Number(2))));
        assert!(matches!(value_of(child.lookup("c")), Some(Value::Number(3))));
    }

    #[test]
    fn pending_binding_reports_uninitialized_until_resolved() {
        let env = Environment::new();
        env.add_pending(Rc::from("x"));
        assert!(matches!(env.lookup("x"), Some(Lookup::Uninitialized)));
        env.resolve_pending("x", Value::Number(7));
        assert!(matches!(value_of(env.lookup("x")), Some(Value::Number(7))));
    }
}
