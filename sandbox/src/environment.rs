use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::builtins;
use crate::runtime_value::RuntimeValue;

/// A single scope level. Closures keep their defining scope alive.
#[derive(Debug, Default)]
struct Scope {
    variables: RefCell<HashMap<String, RuntimeValue>>,
    parent: Option<Environment>,
}

/// A chain of scopes, innermost first. Cloning shares the chain.
#[derive(Debug, Clone, Default)]
pub struct Environment(Rc<Scope>);

impl Environment {
    /// An empty environment with no bindings at all.
    pub fn new() -> Self {
        Environment::default()
    }

    /// A fresh sandbox realm: the three published bindings plus the
    /// language intrinsics. Nothing is shared between two calls.
    pub fn sandbox() -> Self {
        let env = Environment::new();
        for (name, value) in builtins::globals() {
            env.define(name, value);
        }
        env
    }

    /// A new innermost scope whose parent is `self`.
    pub fn child(&self) -> Self {
        Environment(Rc::new(Scope {
            variables: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    pub fn get(&self, name: &str) -> Option<RuntimeValue> {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if let Some(value) = env.0.variables.borrow().get(name) {
                return Some(value.clone());
            }
            scope = env.0.parent.as_ref();
        }
        None
    }

    /// Bind `name` in the innermost scope.
    pub fn define(&self, name: &str, value: RuntimeValue) {
        self.0.variables.borrow_mut().insert(name.to_string(), value);
    }

    /// Rebind an existing variable in the scope that holds it; unknown names
    /// become globals, as sloppy-mode assignment does.
    pub fn assign(&self, name: &str, value: RuntimeValue) {
        let mut scope = Some(self);
        while let Some(env) = scope {
            if env.0.variables.borrow().contains_key(name) {
                env.define(name, value);
                return;
            }
            scope = env.0.parent.as_ref();
        }
        self.define_global(name, value);
    }

    /// Bind `name` in the outermost scope.
    pub fn define_global(&self, name: &str, value: RuntimeValue) {
        self.root().define(name, value);
    }

    fn root(&self) -> &Environment {
        let mut env = self;
        while let Some(parent) = env.0.parent.as_ref() {
            env = parent;
        }
        env
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_scopes_shadow_and_fall_back() {
        let root = Environment::new();
        root.define("x", RuntimeValue::Number(1.0));
        let child = root.child();
        child.define("x", RuntimeValue::Number(2.0));
        assert_eq!(child.get("x"), Some(RuntimeValue::Number(2.0)));
        assert_eq!(root.get("x"), Some(RuntimeValue::Number(1.0)));
    }

    #[test]
    fn assignment_updates_the_defining_scope() {
        let root = Environment::new();
        root.define("x", RuntimeValue::Number(1.0));
        let child = root.child();
        child.assign("x", RuntimeValue::Number(5.0));
        assert_eq!(root.get("x"), Some(RuntimeValue::Number(5.0)));

        child.assign("fresh", RuntimeValue::Null);
        assert_eq!(root.get("fresh"), Some(RuntimeValue::Null));
    }

    #[test]
    fn sandbox_exposes_published_bindings() {
        let env = Environment::sandbox();
        for name in ["R", "S", "sqrt", "Math"] {
            assert!(env.get(name).is_some(), "missing binding {}", name);
        }
        assert!(env.get("process").is_none());
        assert!(env.get("require").is_none());
    }
}
