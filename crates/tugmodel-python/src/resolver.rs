// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Reference resolution.
//!
//! The resolver collects every class name and every binding of a unit
//! before resolving anything, so a value may name a class or a binding
//! defined further down the file. Resolution then maps each
//! [`RawValue`] to its final [`TypedValue`]:
//!
//! - a call whose callee names a known class is an object construction
//! - a bare known class name is a reference to that class
//! - a name bound to a construction (possibly through a chain of other
//!   bindings) is a reference to the constructed class
//! - a dotted chain or method call whose leading part is a known class or
//!   such a binding (`Known.CONST`, `Known.make()`, `engine.part`) is a
//!   reference to that class
//! - anything else is an external reference carrying its dotted path
//!
//! # Binding Keys
//!
//! | Binding                    | Key               |
//! |----------------------------|-------------------|
//! | module-level `name = ...`  | `name`            |
//! | class body `name = ...`    | `Class.name`      |
//! | constructor `self.name =`  | `Class.self.name` |
//!
//! A later binding of the same key replaces an earlier one.

use std::collections::{HashMap, HashSet};

use tracing::trace;
use tugmodel_core::TypedValue;

use crate::classifier::RawValue;

/// Where a value was written, for scoping its references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope<'a> {
    /// Qualified name of the enclosing class.
    pub class: Option<&'a str>,
    /// The constructor's self parameter name, if inside one.
    pub self_name: Option<&'a str>,
}

impl<'a> Scope<'a> {
    pub fn module() -> Self {
        Self::default()
    }

    pub fn class(class: &'a str) -> Self {
        Self {
            class: Some(class),
            self_name: None,
        }
    }

    pub fn method(class: &'a str, self_name: Option<&'a str>) -> Self {
        Self {
            class: Some(class),
            self_name,
        }
    }
}

#[derive(Debug, Clone)]
struct Binding {
    value: RawValue,
    class: Option<String>,
    self_name: Option<String>,
}

/// Class and binding tables for one unit.
#[derive(Debug, Default)]
pub struct Resolver {
    /// Lookup name (qualified or short) to qualified class name.
    classes: HashMap<String, String>,
    bindings: HashMap<String, Binding>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class by qualified name.
    ///
    /// A nested class is also reachable by its short name unless that name
    /// is already taken.
    pub fn add_class(&mut self, qualified: &str) {
        self.classes
            .insert(qualified.to_string(), qualified.to_string());
        if let Some((_, short)) = qualified.rsplit_once('.') {
            self.classes
                .entry(short.to_string())
                .or_insert_with(|| qualified.to_string());
        }
    }

    /// True if `name` resolves to a known class.
    pub fn is_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn bind_module(&mut self, name: &str, value: RawValue) {
        self.bind(name.to_string(), value, Scope::module());
    }

    pub fn bind_class_attribute(&mut self, class: &str, name: &str, value: RawValue) {
        self.bind(format!("{class}.{name}"), value, Scope::class(class));
    }

    pub fn bind_self(&mut self, class: &str, self_name: &str, name: &str, value: RawValue) {
        self.bind(
            format!("{class}.self.{name}"),
            value,
            Scope::method(class, Some(self_name)),
        );
    }

    /// Drop every binding made inside the body of `class`, including its
    /// self bindings and those of its nested classes.
    pub fn forget_class_bindings(&mut self, class: &str) {
        let prefix = format!("{class}.");
        self.bindings.retain(|key, _| !key.starts_with(&prefix));
    }

    fn bind(&mut self, key: String, value: RawValue, scope: Scope<'_>) {
        trace!(%key, "bind");
        self.bindings.insert(
            key,
            Binding {
                value,
                class: scope.class.map(str::to_string),
                self_name: scope.self_name.map(str::to_string),
            },
        );
    }

    /// Resolve `value` as written in `scope`.
    pub fn resolve(&self, value: &RawValue, scope: Scope<'_>) -> TypedValue {
        self.resolve_value(value, scope, &mut HashSet::new())
    }

    fn resolve_value(
        &self,
        value: &RawValue,
        scope: Scope<'_>,
        visiting: &mut HashSet<String>,
    ) -> TypedValue {
        match value {
            RawValue::Literal(literal) => literal.clone(),
            RawValue::List(items) => TypedValue::List(self.resolve_all(items, scope, visiting)),
            RawValue::Tuple(items) => TypedValue::Tuple(self.resolve_all(items, scope, visiting)),
            RawValue::Dict(entries) => TypedValue::Dict(
                entries
                    .iter()
                    .map(|(k, v)| {
                        (
                            self.resolve_value(k, scope, visiting),
                            self.resolve_value(v, scope, visiting),
                        )
                    })
                    .collect(),
            ),
            RawValue::Reference { path, args } => {
                self.resolve_reference(path, args.as_deref(), scope, visiting)
            }
        }
    }

    fn resolve_all(
        &self,
        items: &[RawValue],
        scope: Scope<'_>,
        visiting: &mut HashSet<String>,
    ) -> Vec<TypedValue> {
        items
            .iter()
            .map(|item| self.resolve_value(item, scope, visiting))
            .collect()
    }

    fn resolve_reference(
        &self,
        path: &[String],
        args: Option<&[RawValue]>,
        scope: Scope<'_>,
        visiting: &mut HashSet<String>,
    ) -> TypedValue {
        let dotted = path.join(".");

        match (self.classes.get(&dotted), args) {
            (Some(class), Some(args)) => {
                return TypedValue::object_call(class, self.resolve_all(args, scope, visiting));
            }
            (Some(class), None) => return TypedValue::object_ref(class),
            (None, None) => {
                if let Some(class) = self.binding_class(path, scope, visiting) {
                    return TypedValue::object_ref(class);
                }
            }
            (None, Some(_)) => {}
        }

        // Longest leading part that names a class or a class binding.
        for len in (1..path.len()).rev() {
            let root = &path[..len];
            if let Some(class) = self.classes.get(&root.join(".")) {
                return TypedValue::object_ref(class);
            }
            if let Some(class) = self.binding_class(root, scope, visiting) {
                return TypedValue::object_ref(class);
            }
        }

        TypedValue::external(path.iter().cloned())
    }

    /// Follow the binding `path` refers to and return the class it was
    /// ultimately constructed from.
    fn binding_class(
        &self,
        path: &[String],
        scope: Scope<'_>,
        visiting: &mut HashSet<String>,
    ) -> Option<String> {
        for key in self.candidate_keys(path, scope) {
            let Some(binding) = self.bindings.get(&key) else {
                continue;
            };
            if !visiting.insert(key.clone()) {
                trace!(%key, "binding cycle");
                return None;
            }
            let binding_scope = Scope {
                class: binding.class.as_deref(),
                self_name: binding.self_name.as_deref(),
            };
            let resolved = self.resolve_value(&binding.value, binding_scope, visiting);
            visiting.remove(&key);
            return match resolved {
                TypedValue::ObjectReference { class, .. } => Some(class),
                _ => None,
            };
        }
        None
    }

    /// Binding keys `path` may refer to from `scope`, most specific first.
    fn candidate_keys(&self, path: &[String], scope: Scope<'_>) -> Vec<String> {
        let mut keys = Vec::new();
        let dotted = path.join(".");

        if let (Some(class), Some(self_name)) = (scope.class, scope.self_name) {
            if path.len() == 2 && path[0] == self_name {
                keys.push(format!("{class}.self.{}", path[1]));
                keys.push(format!("{class}.{}", path[1]));
                return keys;
            }
        }
        if let Some(class) = scope.class {
            keys.push(format!("{class}.{dotted}"));
        }
        keys.push(dotted);

        // `Other.attr` names a class attribute of a known class.
        if let Some((attribute, owner)) = path.split_last() {
            if let Some(class) = self.classes.get(&owner.join(".")) {
                keys.push(format!("{class}.{attribute}"));
            }
        }
        keys
    }
}
