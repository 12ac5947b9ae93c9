// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Model assembly: events to class descriptors.
//!
//! The assembler folds the extractor's events into [`ClassDescriptor`]s in
//! source order. Values are classified as they arrive but resolved only in
//! [`Assembler::finish`], once every class and binding of the unit is
//! known. Until then each attribute value and parameter default holds a
//! placeholder, and a pending entry remembers where its resolved value
//! goes.
//!
//! ## Method Shape
//!
//! - `@staticmethod`: static, every parameter kept
//! - `@classmethod`: first parameter dropped
//! - first parameter is a self name (`self`, `cls` by default): dropped
//! - otherwise: static, every parameter kept
//!
//! ## Redefinition
//!
//! When a class name is defined twice in one unit, only the later
//! definition survives (at its own position) and a duplicate-class
//! diagnostic is recorded. Bindings made in the earlier body are forgotten.
//!
//! ## Documentation
//!
//! A docstring wins over the `#` comment block above a header.

use std::collections::HashSet;

use tracing::trace;
use tugmodel_core::{
    Attribute, ClassDescriptor, DiagnosticKind, Diagnostics, ExtractConfig, MethodDescriptor,
    ParameterDescriptor, ParameterKind, TypedValue, Visibility,
};

use crate::classifier::{classify, RawValue};
use crate::extractor::{Event, RawParameter};
use crate::resolver::{Resolver, Scope};

/// Where a resolved value is written back.
#[derive(Debug, Clone, Copy)]
enum Slot {
    ClassAttribute(usize),
    InstanceAttribute(usize),
    Default { method: usize, parameter: usize },
}

#[derive(Debug)]
struct Pending {
    class: usize,
    slot: Slot,
    value: RawValue,
    self_name: Option<String>,
}

/// The parts of a `MethodStart` event other than its parameters.
#[derive(Debug)]
struct MethodHeader {
    name: String,
    decorators: Vec<String>,
    comment: Option<String>,
    line: usize,
}

#[derive(Debug)]
struct OpenMethod {
    index: usize,
    self_name: Option<String>,
}

/// Folds [`Event`]s into class descriptors.
pub struct Assembler<'c> {
    config: &'c ExtractConfig,
    classes: Vec<ClassDescriptor>,
    /// Indices into `classes` of the open class bodies, innermost last.
    open: Vec<usize>,
    method: Option<OpenMethod>,
    resolver: Resolver,
    pending: Vec<Pending>,
}

impl<'c> Assembler<'c> {
    pub fn new(config: &'c ExtractConfig) -> Self {
        Self {
            config,
            classes: Vec::new(),
            open: Vec::new(),
            method: None,
            resolver: Resolver::new(),
            pending: Vec::new(),
        }
    }

    fn visibility(&self, name: &str) -> Visibility {
        if self.config.infer_visibility {
            Visibility::from_name(name)
        } else {
            Visibility::Public
        }
    }

    /// Fold one event.
    pub fn fold(&mut self, event: Event, diagnostics: &mut Diagnostics) {
        match event {
            Event::ClassStart {
                name,
                bases,
                comment,
                line,
            } => self.class_start(name, bases, comment, line, diagnostics),
            Event::ClassEnd { .. } => {
                self.open.pop();
                self.method = None;
            }
            Event::Decorator { name, line } => trace!(line, %name, "decorator"),
            Event::MethodStart {
                name,
                parameters,
                decorators,
                comment,
                line,
                ..
            } => {
                let method = MethodHeader {
                    name,
                    decorators,
                    comment,
                    line,
                };
                self.method_start(method, parameters, diagnostics)
            }
            Event::MethodEnd { source, .. } => self.method_end(source),
            Event::ClassLevelAssignment {
                name,
                annotation,
                value,
                line,
            } => self.class_assignment(name, annotation, &value, line, diagnostics),
            Event::SelfAssignment {
                name,
                annotation,
                value,
                line,
            } => self.self_assignment(name, annotation, &value, line, diagnostics),
            Event::ModuleAssignment { name, value, line } => {
                let raw = classify(&value, line, diagnostics);
                self.resolver.bind_module(&name, raw);
            }
            Event::Docstring { text, .. } => self.docstring(text),
            Event::Ignored { reason, line } => trace!(line, %reason, "skip"),
        }
    }

    fn class_start(
        &mut self,
        name: String,
        bases: Vec<String>,
        comment: Option<String>,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) {
        if let Some(earlier) = self.classes.iter().rev().find(|c| c.name == name) {
            diagnostics.push(
                line,
                DiagnosticKind::DuplicateClass,
                format!(
                    "class `{name}` redefined; definition at line {} is replaced",
                    earlier.line
                ),
            );
            self.resolver.forget_class_bindings(&name);
        }
        self.resolver.add_class(&name);
        self.method = None;

        let mut class = ClassDescriptor::new(name, line);
        class.bases = bases;
        class.doc = comment;
        self.open.push(self.classes.len());
        self.classes.push(class);
    }

    fn method_start(
        &mut self,
        header: MethodHeader,
        raw_parameters: Vec<RawParameter>,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(&class) = self.open.last() else {
            return;
        };
        let MethodHeader {
            name,
            decorators,
            comment,
            line,
        } = header;
        let is_class_method = decorators.iter().any(|d| d == "classmethod");
        let first_regular = raw_parameters
            .first()
            .filter(|p| p.kind == ParameterKind::Regular);

        let (is_static, drops_first) = if decorators.iter().any(|d| d == "staticmethod") {
            (true, false)
        } else if is_class_method {
            (false, first_regular.is_some())
        } else if first_regular.is_some_and(|p| self.config.is_self_name(&p.name)) {
            (false, true)
        } else {
            (true, false)
        };
        let self_name = first_regular
            .filter(|_| drops_first)
            .map(|p| p.name.clone());

        let method_index = self.classes[class].methods.len();
        let mut parameters = Vec::new();
        for raw in raw_parameters.into_iter().skip(usize::from(drops_first)) {
            if let Some(text) = &raw.default {
                let value = classify(text, line, diagnostics);
                self.pending.push(Pending {
                    class,
                    slot: Slot::Default {
                        method: method_index,
                        parameter: parameters.len(),
                    },
                    value,
                    self_name: None,
                });
            }
            parameters.push(ParameterDescriptor {
                name: raw.name,
                kind: raw.kind,
                annotation: raw.annotation,
                default: raw.default.map(|_| TypedValue::NoneValue),
            });
        }

        let method = MethodDescriptor {
            visibility: self.visibility(&name),
            is_constructor: name == self.config.constructor_name,
            name,
            parameters,
            decorators,
            is_static,
            is_class_method,
            doc: comment,
            source: String::new(),
            line,
        };
        self.classes[class].methods.push(method);
        self.method = Some(OpenMethod {
            index: method_index,
            self_name,
        });
    }

    fn class_assignment(
        &mut self,
        name: String,
        annotation: Option<String>,
        value: &str,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(&class) = self.open.last() else {
            return;
        };
        let raw = classify(value, line, diagnostics);
        self.resolver
            .bind_class_attribute(&self.classes[class].name, &name, raw.clone());

        let visibility = self.visibility(&name);
        let attributes = &mut self.classes[class].class_attributes;
        self.pending.push(Pending {
            class,
            slot: Slot::ClassAttribute(attributes.len()),
            value: raw,
            self_name: None,
        });
        attributes.push(Attribute {
            name,
            value: TypedValue::NoneValue,
            annotation,
            visibility,
            line,
        });
    }

    fn self_assignment(
        &mut self,
        name: String,
        annotation: Option<String>,
        value: &str,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) {
        let (Some(&class), Some(method)) = (self.open.last(), self.method.as_ref()) else {
            return;
        };
        let self_name = method.self_name.clone();
        let raw = classify(value, line, diagnostics);
        if let Some(self_name) = &self_name {
            self.resolver
                .bind_self(&self.classes[class].name, self_name, &name, raw.clone());
        }

        let visibility = self.visibility(&name);
        let attributes = &mut self.classes[class].instance_attributes;
        self.pending.push(Pending {
            class,
            slot: Slot::InstanceAttribute(attributes.len()),
            value: raw,
            self_name,
        });
        attributes.push(Attribute {
            name,
            value: TypedValue::NoneValue,
            annotation,
            visibility,
            line,
        });
    }

    fn method_end(&mut self, source: String) {
        let (Some(&class), Some(method)) = (self.open.last(), self.method.take()) else {
            return;
        };
        if let Some(m) = self.classes[class].methods.get_mut(method.index) {
            m.source = source;
        }
    }

    fn docstring(&mut self, text: String) {
        let Some(&class) = self.open.last() else {
            return;
        };
        let class = &mut self.classes[class];
        match &self.method {
            Some(method) => {
                if let Some(m) = class.methods.get_mut(method.index) {
                    m.doc = Some(text);
                }
            }
            None => class.doc = Some(text),
        }
    }

    /// Resolve every pending value and return the classes in source order.
    pub fn finish(self) -> Vec<ClassDescriptor> {
        let Assembler {
            mut classes,
            resolver,
            pending,
            ..
        } = self;

        for entry in pending {
            let class_name = classes[entry.class].name.clone();
            let scope = Scope::method(&class_name, entry.self_name.as_deref());
            let value = resolver.resolve(&entry.value, scope);
            let class = &mut classes[entry.class];
            match entry.slot {
                Slot::ClassAttribute(i) => class.class_attributes[i].value = value,
                Slot::InstanceAttribute(i) => class.instance_attributes[i].value = value,
                Slot::Default { method, parameter } => {
                    class.methods[method].parameters[parameter].default = Some(value)
                }
            }
        }

        // Later definitions replace earlier ones of the same name.
        let mut seen = HashSet::new();
        let mut keep: Vec<bool> = classes
            .iter()
            .rev()
            .map(|c| seen.insert(c.name.clone()))
            .collect();
        keep.reverse();
        classes
            .into_iter()
            .zip(keep)
            .filter_map(|(class, keep)| keep.then_some(class))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Extractor;
    use crate::scanner::scan;

    fn assemble(source: &str) -> (Vec<ClassDescriptor>, Diagnostics) {
        let config = ExtractConfig::default();
        let mut diagnostics = Diagnostics::new();
        let scanned = scan(source, &config, &mut diagnostics);
        let events = Extractor::run(&scanned.lines, &config, &mut diagnostics);
        let mut assembler = Assembler::new(&config);
        for event in events {
            assembler.fold(event, &mut diagnostics);
        }
        (assembler.finish(), diagnostics)
    }

    #[test]
    fn method_shapes() {
        let source = "\
class A:
    def run(self, n=1):
        pass
    @staticmethod
    def make(x):
        pass
    @classmethod
    def build(cls, y):
        pass
    def bare(z):
        pass
";
        let (classes, _) = assemble(source);
        let class = &classes[0];

        let run = class.method("run").unwrap();
        assert!(!run.is_static);
        assert_eq!(run.parameter_names(), vec!["n"]);
        assert_eq!(run.parameters[0].default, Some(TypedValue::Int(1)));

        let make = class.method("make").unwrap();
        assert!(make.is_static);
        assert_eq!(make.parameter_names(), vec!["x"]);
        assert_eq!(make.decorators, vec!["staticmethod".to_string()]);

        let build = class.method("build").unwrap();
        assert!(build.is_class_method);
        assert!(!build.is_static);
        assert_eq!(build.parameter_names(), vec!["y"]);

        let bare = class.method("bare").unwrap();
        assert!(bare.is_static);
        assert_eq!(bare.parameter_names(), vec!["z"]);
    }

    #[test]
    fn forward_references_resolve() {
        let source = "\
class Car:
    def __init__(self):
        self.engine = Engine(4)
        self.backup = self.engine
class Engine:
    pass
";
        let (classes, _) = assemble(source);
        let car = &classes[0];
        assert_eq!(
            car.instance_attribute("engine").unwrap().value,
            TypedValue::object_call("Engine", vec![TypedValue::Int(4)])
        );
        assert_eq!(
            car.instance_attribute("backup").unwrap().value,
            TypedValue::object_ref("Engine")
        );
    }

    #[test]
    fn redefined_class_replaces_earlier() {
        let source = "\
class A:
    x = 1
class B:
    pass
class A:
    y = 2
";
        let (classes, diagnostics) = assemble(source);
        let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(classes[1].class_attribute("x").is_none());
        assert_eq!(diagnostics.count(DiagnosticKind::DuplicateClass), 1);
    }

    #[test]
    fn decorator_before_assignment_is_dropped() {
        let source = "\
class A:
    @staticmethod
    x = 1
    def f(self, y):
        pass
";
        let (classes, _) = assemble(source);
        let f = classes[0].method("f").unwrap();
        assert!(f.decorators.is_empty());
        assert!(!f.is_static);
        assert_eq!(f.parameter_names(), vec!["y"]);
    }

    #[test]
    fn redefined_class_forgets_old_bindings() {
        let source = "\
class A:
    spare = Engine()
class Engine:
    pass
class A:
    backup = spare
";
        let (classes, _) = assemble(source);
        let a = classes.iter().find(|c| c.name == "A").unwrap();
        assert_eq!(
            a.class_attribute("backup").unwrap().value,
            TypedValue::external(["spare"])
        );
    }

    #[test]
    fn comments_document_when_no_docstring() {
        let source = "\
# A shape.
class Shape:
    '''Docstring wins.'''
    # Compute the area.
    def area(self):
        return self.w * self.h
    # Ignored for docstring.
    def name(self):
        'Shape name.'
        return 'shape'
";
        let (classes, _) = assemble(source);
        let shape = &classes[0];
        assert_eq!(shape.doc.as_deref(), Some("Docstring wins."));
        let area = shape.method("area").unwrap();
        assert_eq!(area.doc.as_deref(), Some("Compute the area."));
        assert_eq!(area.source, "return self.w * self.h");
        let name = shape.method("name").unwrap();
        assert_eq!(name.doc.as_deref(), Some("Shape name."));
        assert_eq!(name.source, "'Shape name.'\nreturn 'shape'");
    }

    #[test]
    fn docstrings_attach_to_their_owner() {
        let source = "\
class A:
    'Class doc.'
    def f(self):
        '''Method doc.'''
";
        let (classes, _) = assemble(source);
        assert_eq!(classes[0].doc.as_deref(), Some("Class doc."));
        assert_eq!(classes[0].methods[0].doc.as_deref(), Some("Method doc."));
    }

    #[test]
    fn visibility_inference_can_be_disabled() {
        let source = "class A:\n    _hidden = 1\n    __secret = 2\n";
        let (classes, _) = assemble(source);
        assert_eq!(
            classes[0].class_attribute("_hidden").unwrap().visibility,
            Visibility::Protected
        );
        assert_eq!(
            classes[0].class_attribute("__secret").unwrap().visibility,
            Visibility::Private
        );

        let config = ExtractConfig::default().with_infer_visibility(false);
        let mut diagnostics = Diagnostics::new();
        let scanned = scan(source, &config, &mut diagnostics);
        let mut assembler = Assembler::new(&config);
        for event in Extractor::run(&scanned.lines, &config, &mut diagnostics) {
            assembler.fold(event, &mut diagnostics);
        }
        let classes = assembler.finish();
        assert_eq!(
            classes[0].class_attribute("_hidden").unwrap().visibility,
            Visibility::Public
        );
    }
}
