// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! End-to-end extraction over fixture files.

use tugmodel_core::{
    DiagnosticKind, ExtractConfig, ParameterKind, TypedValue, UnitModel, Visibility,
};
use tugmodel_python::extract_unit;

const TYPES: &str = include_str!("fixtures/types.py");
const MALFORMED: &str = include_str!("fixtures/malformed.py");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn extract(name: &str, source: &str) -> UnitModel {
    init_tracing();
    extract_unit(name, source, &ExtractConfig::default())
}

fn string(s: &str) -> TypedValue {
    TypedValue::String(s.to_string())
}

fn class_value(model: &UnitModel, class: &str, attribute: &str) -> TypedValue {
    model
        .class(class)
        .and_then(|c| c.class_attribute(attribute))
        .map(|a| a.value.clone())
        .unwrap_or_else(|| panic!("missing {class}.{attribute}"))
}

fn instance_value(model: &UnitModel, class: &str, attribute: &str) -> TypedValue {
    model
        .class(class)
        .and_then(|c| c.instance_attribute(attribute))
        .map(|a| a.value.clone())
        .unwrap_or_else(|| panic!("missing self.{attribute} in {class}"))
}

// ============================================================================
// Well-formed source
// ============================================================================

#[test]
fn classes_in_source_order() {
    let model = extract("types.py", TYPES);
    assert_eq!(model.unit, "types.py");
    assert_eq!(model.encoding.as_deref(), Some("utf-8"));
    assert_eq!(model.class_names(), vec!["ReferencedType", "Holder"]);
    assert!(model.diagnostics.is_empty(), "{:?}", model.diagnostics);

    let holder = model.class("Holder").unwrap();
    assert_eq!(holder.bases, vec!["object".to_string()]);
    assert_eq!(holder.doc.as_deref(), Some("Holds one of everything."));
    let methods: Vec<&str> = holder.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["__init__", "helper", "duplicate", "create"]);
}

#[test]
fn scalar_literals_keep_their_sign() {
    let model = extract("types.py", TYPES);
    assert_eq!(class_value(&model, "Holder", "flag"), TypedValue::Bool(true));
    assert_eq!(class_value(&model, "Holder", "count"), TypedValue::Int(0));
    assert_eq!(
        class_value(&model, "Holder", "negative"),
        TypedValue::Int(-54341)
    );
    assert_eq!(
        class_value(&model, "Holder", "ratio"),
        TypedValue::Float(-1.0876544)
    );
    assert_eq!(class_value(&model, "Holder", "name"), string("holder"));
}

#[test]
fn containers_classify_recursively() {
    let model = extract("types.py", TYPES);
    assert_eq!(
        class_value(&model, "Holder", "empty_list"),
        TypedValue::EmptyList
    );
    assert_eq!(
        class_value(&model, "Holder", "empty_dict"),
        TypedValue::EmptyDict
    );
    assert_eq!(
        class_value(&model, "Holder", "empty_tuple"),
        TypedValue::EmptyTuple
    );
    assert_eq!(
        class_value(&model, "Holder", "numbers"),
        TypedValue::Tuple(vec![
            TypedValue::Int(1),
            TypedValue::Int(2),
            TypedValue::Int(3)
        ])
    );
    assert_eq!(
        class_value(&model, "Holder", "nested"),
        TypedValue::Dict(vec![
            (string("a"), TypedValue::Int(1)),
            (
                string("b"),
                TypedValue::Dict(vec![
                    (string("a"), TypedValue::Int(1)),
                    (string("b"), TypedValue::Int(2)),
                ])
            ),
        ])
    );
    assert_eq!(
        instance_value(&model, "Holder", "mixed"),
        TypedValue::List(vec![
            TypedValue::Int(1),
            string("two"),
            TypedValue::Float(3.0),
            TypedValue::List(vec![
                TypedValue::Int(4),
                TypedValue::Tuple(vec![TypedValue::Int(5)]),
            ]),
        ])
    );
}

#[test]
fn references_resolve_to_classes_or_external_paths() {
    let model = extract("types.py", TYPES);
    assert_eq!(
        instance_value(&model, "Holder", "ref"),
        TypedValue::object_call(
            "ReferencedType",
            vec![TypedValue::Int(1), TypedValue::Int(2)]
        )
    );
    // A binding to a construction resolves to the constructed class.
    assert_eq!(
        instance_value(&model, "Holder", "alias"),
        TypedValue::object_ref("ReferencedType")
    );
    // Module-level binding made before the class was defined.
    assert_eq!(
        class_value(&model, "Holder", "default"),
        TypedValue::object_ref("ReferencedType")
    );
    assert_eq!(
        class_value(&model, "Holder", "separator"),
        TypedValue::external(["os", "path", "sep"])
    );
    assert_eq!(
        instance_value(&model, "ReferencedType", "a"),
        TypedValue::external(["a"])
    );
}

#[test]
fn dotted_chains_on_known_roots_are_object_references() {
    let model = extract("types.py", TYPES);
    for attribute in ["limit", "shared_value", "made"] {
        assert_eq!(
            class_value(&model, "Holder", attribute),
            TypedValue::object_ref("ReferencedType"),
            "{attribute}"
        );
    }
}

#[test]
fn method_bodies_and_comment_docs() {
    let model = extract("types.py", TYPES);
    let holder = model.class("Holder").unwrap();
    let helper = holder.method("helper").unwrap();
    assert_eq!(helper.doc.as_deref(), Some("Not part of the public surface."));
    assert_eq!(helper.source, "self.not_an_attribute = 1");
    assert_eq!(holder.method("create").unwrap().source, "return Holder()");
    assert_eq!(holder.method("duplicate").unwrap().doc, None);
}

#[test]
fn only_constructor_self_assignments_are_instance_attributes() {
    let model = extract("types.py", TYPES);
    let holder = model.class("Holder").unwrap();
    let names: Vec<&str> = holder
        .instance_attributes
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["ref", "alias", "mixed"]);
    assert!(holder.class_attribute("local").is_none());
    assert!(holder.instance_attribute("not_an_attribute").is_none());
}

#[test]
fn constructor_signature() {
    let model = extract("types.py", TYPES);
    let init = model.class("Holder").unwrap().constructor().unwrap();
    assert!(!init.is_static);
    assert_eq!(init.visibility, Visibility::Public);
    assert_eq!(
        init.parameter_names(),
        vec!["first", "second", "label", "items", "args", "kwargs"]
    );
    let defaults: Vec<Option<TypedValue>> =
        init.parameters.iter().map(|p| p.default.clone()).collect();
    assert_eq!(
        defaults,
        vec![
            Some(TypedValue::Int(0)),
            Some(TypedValue::Float(-1.5)),
            Some(string("x")),
            Some(TypedValue::EmptyList),
            None,
            None,
        ]
    );
    assert_eq!(init.parameters[4].kind, ParameterKind::VarArgs);
    assert_eq!(init.parameters[5].kind, ParameterKind::KwArgs);
}

#[test]
fn duplicate_parameters_are_all_retained() {
    let model = extract("types.py", TYPES);
    let method = model.class("Holder").unwrap().method("duplicate").unwrap();
    assert_eq!(method.parameter_names(), vec!["x", "x"]);
    assert_eq!(method.parameters[0].default, None);
    assert_eq!(
        method.parameter("x").and_then(|p| p.default.clone()),
        Some(TypedValue::Int(1))
    );
}

#[test]
fn static_methods_keep_all_parameters() {
    let model = extract("types.py", TYPES);
    let create = model.class("Holder").unwrap().method("create").unwrap();
    assert!(create.is_static);
    assert!(create.parameters.is_empty());
}

#[test]
fn extraction_is_deterministic() {
    let first = extract("types.py", TYPES);
    let second = extract("types.py", TYPES);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn model_serializes_with_tagged_values() {
    let model = extract("types.py", TYPES);
    let json = serde_json::to_value(&model).unwrap();
    let holder = &json["classes"][1];
    assert_eq!(holder["name"], "Holder");
    assert_eq!(holder["class_attributes"][2]["name"], "negative");
    assert_eq!(holder["class_attributes"][2]["value"]["kind"], "int");
    assert_eq!(holder["class_attributes"][2]["value"]["value"], -54341);
}

// ============================================================================
// Malformed source
// ============================================================================

#[test]
fn missing_dict_separators_are_recovered() {
    let model = extract("malformed.py", MALFORMED);
    assert_eq!(
        class_value(&model, "Broken", "mapping"),
        TypedValue::Dict(vec![
            (string("first"), TypedValue::Int(1)),
            (string("second"), TypedValue::Int(2)),
        ])
    );
    assert_eq!(
        instance_value(&model, "Broken", "mapping"),
        TypedValue::Dict(vec![
            (
                string("x"),
                TypedValue::Tuple(vec![TypedValue::Int(1), TypedValue::Int(2)])
            ),
            (string("y"), TypedValue::List(vec![TypedValue::Int(3)])),
        ])
    );
    assert_eq!(
        class_value(&model, "Broken", "values"),
        TypedValue::List(vec![
            TypedValue::Int(1),
            TypedValue::Int(2),
            TypedValue::Int(3)
        ])
    );
}

#[test]
fn parameters_without_separators_stay_separate() {
    let model = extract("malformed.py", MALFORMED);
    let broken = model.class("Broken").unwrap();

    let init = broken.constructor().unwrap();
    assert_eq!(init.parameter_names(), vec!["a", "b"]);
    assert_eq!(init.parameters[1].default, Some(TypedValue::Int(2)));

    let method = broken.method("method").unwrap();
    assert_eq!(method.parameter_names(), vec!["p", "q"]);
}

#[test]
fn recovery_continues_past_bad_lines() {
    let model = extract("malformed.py", MALFORMED);
    assert_eq!(
        class_value(&model, "Broken", "ratio"),
        TypedValue::Float(2.5)
    );
    assert_eq!(
        class_value(&model, "Later", "pending"),
        TypedValue::Unrecognized("(1,".to_string())
    );
}

#[test]
fn malformed_source_reports_diagnostics_by_line() {
    let model = extract("malformed.py", MALFORMED);
    let found: Vec<(usize, DiagnosticKind)> = model
        .diagnostics
        .iter()
        .map(|d| (d.line, d.kind))
        .collect();
    assert_eq!(
        found,
        vec![
            (2, DiagnosticKind::MissingSeparator),
            (3, DiagnosticKind::MissingSeparator),
            (5, DiagnosticKind::AmbiguousParameterSplit),
            (6, DiagnosticKind::MissingSeparator),
            (7, DiagnosticKind::UnrecognizedStatement),
            (9, DiagnosticKind::AmbiguousParameterSplit),
            (16, DiagnosticKind::UnresolvedNesting),
            (16, DiagnosticKind::UnclassifiableLiteral),
        ]
    );
}

#[test]
fn units_are_independent() {
    let first = extract("one.py", "class Shared:\n    x = 1\n");
    let second = extract("two.py", "class Shared:\n    y = Shared()\n");
    assert!(first.class("Shared").unwrap().class_attribute("y").is_none());
    assert_eq!(
        class_value(&second, "Shared", "y"),
        TypedValue::object_call("Shared", vec![])
    );
}
