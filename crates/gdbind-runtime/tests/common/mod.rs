//! Shared setup: a headless engine mirroring `fixtures/classes.json`

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use gdbind_runtime::{ClassDatabase, Runtime, RuntimeOptions};
use gdbind_sdk::convert::arg;
use gdbind_sdk::{FromVariant, HeadlessEngine, NativeChannel, ObjectHandle, ToVariant, Variant};

pub const CLASSES_JSON: &str = include_str!("../fixtures/classes.json");

pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/classes.json")
}

pub fn database() -> ClassDatabase {
    ClassDatabase::from_json_str(CLASSES_JSON).unwrap()
}

/// Engine with the fixture hierarchy, an `Engine` singleton whose main loop
/// is a `SceneTree` rooted at a `Viewport`, and an `Input` singleton.
pub fn engine() -> Arc<HeadlessEngine> {
    let engine = Arc::new(HeadlessEngine::new());
    for (class, parent) in [
        ("Object", None),
        ("Reference", Some("Object")),
        ("Node", Some("Object")),
        ("Viewport", Some("Node")),
        ("CanvasItem", Some("Node")),
        ("Control", Some("CanvasItem")),
        ("LineEdit", Some("Control")),
        ("EditorPlugin", Some("Node")),
        ("MainLoop", Some("Object")),
        ("SceneTree", Some("MainLoop")),
        ("_Engine", Some("Object")),
        ("Input", Some("Object")),
        // Known to the engine, absent from the class database
        ("EditorInterface", Some("Node")),
    ] {
        engine.define_class(class, parent);
    }
    engine.set_instantiable("CanvasItem", false);

    engine.set_default("Node", "name", Variant::from(""));
    engine.set_default("Node", "child_count", Variant::Int(0));
    engine.set_default("CanvasItem", "visible", Variant::Bool(true));
    engine.set_default("Viewport", "using_arvr", Variant::Bool(false));
    engine.set_default("LineEdit", "max_length", Variant::Int(0));
    // Stored as a raw integer on purpose
    engine.set_default("LineEdit", "secret", Variant::Int(0));
    engine.set_default("LineEdit", "text", Variant::from(""));
    engine.set_default("LineEdit", "placeholder_alpha", Variant::Float(0.6));

    engine.register_method("Object", "get_class", |engine, this, _args| {
        Ok(engine.class_name_of(this)?.to_variant())
    });
    engine.register_method("Object", "get_instance_id", |_engine, this, _args| {
        Ok((this.to_raw() as i64).to_variant())
    });
    engine.register_method("Node", "add_child", |engine, this, args| {
        let child = ObjectHandle::from_variant(arg(args, 0)?)?;
        let count = engine.field(this, "child_count")?.as_int().unwrap_or(0);
        engine.set_field(this, "child_count", (count + 1).to_variant())?;
        engine.set_field(child, "parent", this.to_variant())?;
        Ok(Variant::Nil)
    });
    // Raw integer truthiness, normalized by the bool return tag
    engine.register_method("Node", "is_inside_tree", |engine, this, _args| {
        Ok(Variant::Int(engine.field(this, "parent")?.truthy() as i64))
    });
    engine.register_method("Viewport", "set_use_arvr", |engine, this, args| {
        engine.set_field(this, "using_arvr", arg(args, 0)?.clone())?;
        Ok(Variant::Nil)
    });
    engine.register_method("Input", "is_action_pressed", |_engine, _this, args| {
        let action = String::from_variant(arg(args, 0)?)?;
        Ok(Variant::Int(if action == "ui_cancel" { 7 } else { 0 }))
    });
    engine.register_method("LineEdit", "clear", |engine, this, _args| {
        engine.set_field(this, "text", Variant::from(""))?;
        // Engines may hand back junk from void calls
        Ok(Variant::Int(-1))
    });

    let tree = engine.create_object("SceneTree").unwrap();
    let root = engine.create_object("Viewport").unwrap();
    engine.set_field(root, "name", Variant::from("root")).unwrap();
    engine.set_field(tree, "root", Variant::Object(root)).unwrap();
    engine.set_field(tree, "frame", Variant::Int(120)).unwrap();

    let singleton = engine.register_singleton("Engine", "_Engine").unwrap();
    engine.set_field(singleton, "main_loop", Variant::Object(tree)).unwrap();
    engine.set_field(singleton, "frames_drawn", Variant::Int(60)).unwrap();
    engine.set_field(singleton, "editor_hint", Variant::Bool(false)).unwrap();
    engine.register_singleton("Input", "Input").unwrap();

    engine
}

pub fn runtime_with(options: RuntimeOptions) -> (Arc<HeadlessEngine>, Runtime) {
    let engine = engine();
    let channel: Arc<dyn NativeChannel> = engine.clone();
    let runtime = Runtime::new(database(), channel, options).unwrap();
    (engine, runtime)
}

pub fn runtime() -> (Arc<HeadlessEngine>, Runtime) {
    runtime_with(RuntimeOptions::default())
}
