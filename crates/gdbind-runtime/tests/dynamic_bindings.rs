//! End-to-end binding behavior against the headless engine

mod common;

use gdbind_runtime::{Attribute, BindError, BindingKind, Member, RuntimeOptions, Value};
use gdbind_sdk::{ChannelError, Variant};

// ============================================================================
// Module Surface
// ============================================================================

#[test]
fn test_global_constants() {
    let (_engine, rt) = common::runtime();
    let module = rt.module();

    assert_eq!(module.kind_of("OK"), Some(BindingKind::Constant));
    assert_eq!(module.get("OK").unwrap().as_constant(), Some(0));
    assert_eq!(module.get("FAILED").unwrap().as_constant(), Some(1));
    assert_eq!(module.get("KEY_ESCAPE").unwrap().as_constant(), Some(16777217));
}

#[test]
fn test_module_bindings_are_read_only() {
    let (_engine, rt) = common::runtime();
    let module = rt.module();

    for name in ["OK", "Node", "Engine"] {
        assert!(matches!(
            module.assign(name, Value::Int(5)),
            Err(BindError::ImmutableMember { .. })
        ));
    }
    assert!(matches!(
        module.assign("NOT_THERE", Value::Int(5)),
        Err(BindError::UnknownMember { .. })
    ));
    assert_eq!(module.get("OK").unwrap().as_constant(), Some(0));
}

#[test]
fn test_singleton_binding_kind() {
    let (_engine, rt) = common::runtime();
    let module = rt.module();

    assert_eq!(module.kind_of("Engine"), Some(BindingKind::Singleton));
    assert_eq!(module.kind_of("_Engine"), Some(BindingKind::Class));
    // Same binding name as the class: the singleton takes the slot
    assert_eq!(module.kind_of("Input"), Some(BindingKind::Singleton));
    assert_eq!(module.kind_of("Node"), Some(BindingKind::Class));

    let engine = module.get("Engine").unwrap().as_singleton().unwrap();
    assert_eq!(engine.class_name(), "_Engine");
    assert_eq!(engine, rt.singleton("Engine").unwrap());
    assert!(module.get("Engine").unwrap().as_class().is_none());
}

#[test]
fn test_every_class_is_bound() {
    let (_engine, rt) = common::runtime();
    for ty in rt.lattice().iter() {
        assert!(rt.module().contains(ty.name()), "missing {}", ty.name());
    }
}

// ============================================================================
// Class Constants
// ============================================================================

#[test]
fn test_class_constant() {
    let (_engine, rt) = common::runtime();
    let plugin = rt.type_named("EditorPlugin").unwrap();

    match rt.class_attr(plugin, "CONTAINER_TOOLBAR").unwrap() {
        Member::Constant(c) => assert_eq!(c.value, 0),
        other => panic!("Expected constant, got {:?}", other),
    }
    assert!(matches!(
        rt.set_class_attr(plugin, "CONTAINER_TOOLBAR", Value::Int(42)),
        Err(BindError::ImmutableMember { .. })
    ));
    match rt.class_attr(plugin, "CONTAINER_TOOLBAR").unwrap() {
        Member::Constant(c) => assert_eq!(c.value, 0),
        other => panic!("Expected constant, got {:?}", other),
    }
}

#[test]
fn test_constants_inherited_by_descendants() {
    let (_engine, rt) = common::runtime();
    let line_edit = rt.type_named("LineEdit").unwrap();
    let ready = rt.class_attr(line_edit, "NOTIFICATION_READY").unwrap();
    assert_eq!(ready.owner(), "Node");

    let edit = rt.instantiate("LineEdit").unwrap();
    assert_eq!(
        rt.getattr(&edit, "NOTIFICATION_POSTINITIALIZE").unwrap().into_value(),
        Some(Value::Int(0))
    );
}

// ============================================================================
// Singletons and Objects
// ============================================================================

#[test]
fn test_singleton_methods() {
    let (_engine, rt) = common::runtime();
    let engine = rt.singleton("Engine").unwrap();

    let main_loop = rt.call(engine, "get_main_loop", &[]).unwrap();
    let tree = main_loop.as_object().unwrap();
    assert_eq!(tree.class_name(), "SceneTree");
    assert!(rt.is_instance(&main_loop, "MainLoop"));
    assert!(rt.is_instance(&main_loop, "Object"));

    assert_eq!(
        rt.call(engine, "get_frames_drawn", &[]).unwrap(),
        Value::Int(60)
    );
}

#[test]
fn test_unicity() {
    let (_engine, rt) = common::runtime();
    let engine = rt.singleton("Engine").unwrap();

    let first = rt.call(engine, "get_main_loop", &[]).unwrap();
    let second = rt.call(engine, "get_main_loop", &[]).unwrap();
    assert_eq!(first, second);

    let root_a = rt.getattr(first.as_object().unwrap(), "root").unwrap().into_value().unwrap();
    let root_b = rt.call(second.as_object().unwrap(), "get_root", &[]).unwrap();
    assert_eq!(root_a, root_b);
    assert_ne!(first, root_a);
}

#[test]
fn test_equality_never_fails() {
    let (_engine, rt) = common::runtime();
    let engine = Value::Object(rt.singleton("Engine").unwrap().clone());

    assert_ne!(engine, Value::Nil);
    assert_ne!(engine, Value::Int(0));
    assert_ne!(engine, Value::from(""));
    assert_ne!(engine, Value::Bool(false));
    assert_ne!(Value::Nil, engine);
    assert_eq!(engine, engine.clone());
}

#[test]
fn test_inheritance() {
    let (_engine, rt) = common::runtime();
    let lattice = rt.lattice();

    assert!(lattice.is_subclass_of("Viewport", "Node"));
    assert!(lattice.is_subclass_of("Viewport", "Object"));
    assert!(lattice.is_subclass_of("LineEdit", "CanvasItem"));
    assert!(!lattice.is_subclass_of("Node", "Viewport"));
    assert!(!lattice.is_subclass_of("SceneTree", "Node"));
    assert_eq!(lattice.root().name(), "Object");

    let tree = rt
        .call(rt.singleton("Engine").unwrap(), "get_main_loop", &[])
        .unwrap();
    let root = rt.call(tree.as_object().unwrap(), "get_root", &[]).unwrap();
    assert!(rt.is_instance(&root, "Viewport"));
    assert!(rt.is_instance(&root, "Node"));
    assert!(rt.is_instance(&root, "Object"));
    assert!(!rt.is_instance(&root, "SceneTree"));
}

#[test]
fn test_instance_methods_from_ancestors() {
    let (_engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();

    assert_eq!(rt.call(&edit, "get_class", &[]).unwrap(), Value::from("LineEdit"));
    assert_eq!(
        rt.call(&edit, "get_instance_id", &[]).unwrap(),
        Value::Int(edit.handle().to_raw() as i64)
    );
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_property_default_and_round_trip() {
    let (_engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();

    let max_length = |rt: &gdbind_runtime::Runtime| {
        rt.getattr(&edit, "max_length").unwrap().into_value().unwrap()
    };
    assert_eq!(max_length(&rt), Value::Int(0));
    rt.setattr(&edit, "max_length", Value::Int(42)).unwrap();
    assert_eq!(max_length(&rt), Value::Int(42));
    assert_eq!(rt.call(&edit, "get_max_length", &[]).unwrap(), Value::Int(42));
}

#[test]
fn test_bool_property_and_methods() {
    let (_engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();

    // Raw integer 0 in the engine comes back as a real boolean
    assert_eq!(rt.call(&edit, "is_secret", &[]).unwrap(), Value::Bool(false));
    rt.call(&edit, "set_secret", &[Value::Bool(true)]).unwrap();
    assert_eq!(rt.call(&edit, "is_secret", &[]).unwrap(), Value::Bool(true));
    assert_eq!(
        rt.getattr(&edit, "secret").unwrap().into_value(),
        Some(Value::Bool(true))
    );
}

#[test]
fn test_bool_return_from_raw_int() {
    let (_engine, rt) = common::runtime();
    let input = rt.singleton("Input").unwrap();
    assert_eq!(
        rt.call(input, "is_action_pressed", &[Value::from("ui_cancel")]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        rt.call(input, "is_action_pressed", &[Value::from("ui_accept")]).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_float_property_accepts_int() {
    let (_engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();
    assert_eq!(
        rt.getattr(&edit, "placeholder_alpha").unwrap().into_value(),
        Some(Value::Float(0.6))
    );
    rt.setattr(&edit, "placeholder_alpha", Value::Int(1)).unwrap();
    assert_eq!(
        rt.getattr(&edit, "placeholder_alpha").unwrap().into_value(),
        Some(Value::Float(1.0))
    );
}

#[test]
fn test_read_only_property() {
    let (engine, rt) = common::runtime();
    let tree = rt
        .call(rt.singleton("Engine").unwrap(), "get_main_loop", &[])
        .unwrap();
    let tree = tree.as_object().unwrap();
    let before = engine.field(tree.handle(), "root").unwrap();

    let err = rt.setattr(tree, "root", Value::Nil).unwrap_err();
    assert_eq!(
        err,
        BindError::ImmutableMember {
            class: "SceneTree".to_string(),
            member: "root".to_string(),
        }
    );
    assert_eq!(engine.field(tree.handle(), "root").unwrap(), before);
}

#[test]
fn test_property_type_mismatch() {
    let (_engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();
    let err = rt.setattr(&edit, "max_length", Value::from("long")).unwrap_err();
    assert!(matches!(err, BindError::ArgumentType { index: Some(0), .. }));
    assert_eq!(
        rt.getattr(&edit, "max_length").unwrap().into_value(),
        Some(Value::Int(0))
    );
}

// ============================================================================
// Methods
// ============================================================================

#[test]
fn test_void_method_discards_result() {
    let (engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();
    rt.setattr(&edit, "text", Value::from("secret")).unwrap();

    assert_eq!(rt.call(&edit, "clear", &[]).unwrap(), Value::Nil);
    assert_eq!(engine.field(edit.handle(), "text").unwrap(), Variant::from(""));
}

#[test]
fn test_object_arguments() {
    let (_engine, rt) = common::runtime();
    let parent = rt.instantiate("Node").unwrap();
    let child = rt.instantiate("LineEdit").unwrap();

    assert_eq!(rt.call(&child, "is_inside_tree", &[]).unwrap(), Value::Bool(false));
    rt.call(&parent, "add_child", &[Value::Object(child.clone())]).unwrap();
    assert_eq!(rt.call(&child, "get_parent", &[]).unwrap(), Value::Object(parent.clone()));
    assert_eq!(rt.call(&child, "is_inside_tree", &[]).unwrap(), Value::Bool(true));
    assert_eq!(rt.call(&parent, "get_child_count", &[]).unwrap(), Value::Int(1));

    // A SceneTree is not a Node
    let tree = rt
        .call(rt.singleton("Engine").unwrap(), "get_main_loop", &[])
        .unwrap();
    let err = rt.call(&parent, "add_child", &[tree]).unwrap_err();
    assert!(matches!(err, BindError::ArgumentType { index: Some(0), .. }));
}

#[test]
fn test_loose_object_arguments() {
    let options = RuntimeOptions {
        strict_object_args: false,
        ..RuntimeOptions::default()
    };
    let (_engine, rt) = common::runtime_with(options);
    let parent = rt.instantiate("Node").unwrap();
    let tree = rt
        .call(rt.singleton("Engine").unwrap(), "get_main_loop", &[])
        .unwrap();
    assert!(rt.call(&parent, "add_child", &[tree]).is_ok());
}

#[test]
fn test_arity_mismatch() {
    let (_engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();
    let err = rt.call(&edit, "set_max_length", &[]).unwrap_err();
    assert!(matches!(err, BindError::ArgumentType { index: None, .. }));
}

#[test]
fn test_bound_method_attribute() {
    let (_engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();
    let Attribute::Method(set_text) = rt.getattr(&edit, "set_text").unwrap() else {
        panic!("Expected bound method");
    };
    assert_eq!(set_text.receiver(), &edit);
    set_text.call(&rt, &[Value::from("hi")]).unwrap();
    assert_eq!(rt.call(&edit, "get_text", &[]).unwrap(), Value::from("hi"));
}

#[test]
fn test_signals() {
    let (_engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();
    for name in ["text_changed", "resized", "draw", "ready", "script_changed"] {
        match rt.getattr(&edit, name).unwrap() {
            Attribute::Signal(signal) => assert_eq!(signal.name, name),
            other => panic!("Expected signal {}, got {:?}", name, other),
        }
    }
    assert!(matches!(
        rt.setattr(&edit, "text_changed", Value::Nil),
        Err(BindError::ImmutableMember { .. })
    ));
}

#[test]
fn test_private_methods() {
    let (_engine, rt) = common::runtime();
    let node = rt.instantiate("Node").unwrap();
    assert!(matches!(
        rt.getattr(&node, "_ready"),
        Err(BindError::UnknownMember { .. })
    ));

    let options = RuntimeOptions {
        expose_private_methods: true,
        ..RuntimeOptions::default()
    };
    let (_engine, rt) = common::runtime_with(options);
    let node = rt.instantiate("Node").unwrap();
    assert!(rt.getattr(&node, "_ready").unwrap().into_method().is_some());
}

#[test]
fn test_not_instantiable_classes() {
    let (_engine, rt) = common::runtime();
    assert_eq!(
        rt.instantiate("CanvasItem").unwrap_err(),
        BindError::NotInstantiable("CanvasItem".to_string())
    );
    assert_eq!(
        rt.instantiate("_Engine").unwrap_err(),
        BindError::NotInstantiable("_Engine".to_string())
    );
    assert!(rt.instantiate("Control").is_ok());
}

// ============================================================================
// Native Failures
// ============================================================================

#[test]
fn test_destroyed_object() {
    let (engine, rt) = common::runtime();
    let edit = rt.instantiate("LineEdit").unwrap();
    engine.destroy(edit.handle());

    let err = rt.call(&edit, "get_max_length", &[]).unwrap_err();
    assert_eq!(
        err,
        BindError::NativeCall {
            method: "get_max_length".to_string(),
            source: ChannelError::DestroyedObject(edit.handle()),
        }
    );
    assert!(matches!(
        rt.getattr(&edit, "max_length"),
        Err(BindError::NativeCall { .. })
    ));
}

#[test]
fn test_engine_method_missing() {
    let (_engine, rt) = common::runtime();
    let tree = rt
        .call(rt.singleton("Engine").unwrap(), "get_main_loop", &[])
        .unwrap();
    let err = rt
        .call(tree.as_object().unwrap(), "get_class_list", &[])
        .unwrap_err();
    assert!(matches!(err, BindError::UnknownMember { .. }));

    // Declared in the database, unknown to the engine
    let reference = rt.instantiate("Reference").unwrap();
    let err = rt.call(&reference, "reference", &[]).unwrap_err();
    assert!(matches!(
        err,
        BindError::NativeCall {
            source: ChannelError::UnknownMethod { .. },
            ..
        }
    ));
}

#[test]
fn test_unknown_runtime_class_falls_back_to_root() {
    let (engine, rt) = common::runtime();
    let handle = engine.create_object("EditorInterface").unwrap();
    let w = rt.wrap(handle).unwrap();
    assert_eq!(w.class_name(), "Object");
    assert_eq!(rt.call(&w, "get_class", &[]).unwrap(), Value::from("EditorInterface"));
}
