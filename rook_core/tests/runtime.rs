// Integration tests driving the runtime the way the frame loop does:
// on-disk resources, registered behaviors, full update cycles.
use glam::Vec2;
use rook_core::actor::actor::ActorRef;
use rook_core::physics::backend::{BodyHandle, ContactEvent, ContactPhase};
use rook_core::physics::contact_bridge::CONTACT_SENTINEL;
use rook_core::physics::headless::{ContactInjector, HeadlessPhysics};
use rook_core::runtime::runtime::Runtime;
use rook_core::scripting::component::ComponentRef;
use rook_core::scripting::value::{Callable, ScriptError, Value};
use serde_json::json;
use std::cell::RefCell;
use std::fs;
use std::rc::Rc;
use tempfile::TempDir;

type Trace = Rc<RefCell<Vec<String>>>;

struct Fixture {
    _dir: TempDir,
    runtime: Runtime,
    injector: ContactInjector,
    trace: Trace,
}

impl Fixture {
    /// Resources tree on disk plus a headless-physics runtime. Files are
    /// (relative path, JSON) pairs.
    fn new(files: &[(&str, serde_json::Value)]) -> Fixture {
        let dir = TempDir::new().unwrap();
        for sub in ["component_types", "scenes", "actor_templates"] {
            fs::create_dir_all(dir.path().join(sub)).unwrap();
        }
        for (path, body) in files {
            fs::write(dir.path().join(path), body.to_string()).unwrap();
        }

        let physics = HeadlessPhysics::new();
        let injector = physics.contact_injector();
        let runtime = Runtime::new(dir.path(), Box::new(physics));

        Fixture {
            _dir: dir,
            runtime,
            injector,
            trace: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn log(&self, line: impl Into<String>) {
        self.trace.borrow_mut().push(line.into());
    }

    fn taken_trace(&self) -> Vec<String> {
        std::mem::take(&mut *self.trace.borrow_mut())
    }

    /// Callable that records "<tag>:<component key>".
    fn tracer(&self, name: &str, tag: &str) -> Callable {
        let trace = self.trace.clone();
        let tag = tag.to_string();
        Callable::new(name.to_string(), move |_, component, _| {
            trace.borrow_mut().push(format!("{}:{}", tag, component.key()));
            Ok(())
        })
    }
}

fn rigidbody_handle(component: &ComponentRef) -> BodyHandle {
    component.as_rigidbody().unwrap().borrow().body().unwrap()
}

fn first_component(actor: &ActorRef, type_name: &str) -> ComponentRef {
    actor.borrow().component_of_type(type_name).unwrap()
}

#[test]
fn lifecycle_passes_run_in_pass_then_key_order_and_start_runs_once() {
    let mut fx = Fixture::new(&[
        ("component_types/Alpha.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [{"name": "player", "components": {
                "b": {"type": "Alpha"},
                "a": {"type": "Alpha"}
            }}]}),
        ),
    ]);
    fx.runtime.components.register_behavior(
        "Alpha",
        [
            fx.tracer("OnStart", "start"),
            fx.tracer("OnUpdate", "update"),
            fx.tracer("OnLateUpdate", "late"),
        ],
    );

    fx.runtime.load_scene("basic").unwrap();
    fx.runtime.update(0.016).unwrap();

    assert_eq!(
        fx.taken_trace(),
        vec!["start:a", "start:b", "update:a", "update:b", "late:a", "late:b"]
    );

    // OnStart fired once; later frames only update.
    fx.runtime.update(0.016).unwrap();
    assert_eq!(
        fx.taken_trace(),
        vec!["update:a", "update:b", "late:a", "late:b"]
    );
}

#[test]
fn disabling_an_actor_mid_pass_skips_its_remaining_callbacks() {
    let mut fx = Fixture::new(&[
        ("component_types/Chain.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [{"name": "player", "components": {
                "a": {"type": "Chain"},
                "b": {"type": "Chain"},
                "c": {"type": "Chain"}
            }}]}),
        ),
    ]);
    let trace = fx.trace.clone();
    fx.runtime.components.register_behavior(
        "Chain",
        [Callable::new("OnUpdate", move |_, component, _| {
            trace.borrow_mut().push(format!("update:{}", component.key()));
            if component.key() == "b" {
                if let Some(actor) = component.owner() {
                    actor.borrow_mut().enabled = false;
                }
            }
            Ok(())
        })],
    );

    fx.runtime.load_scene("basic").unwrap();
    fx.runtime.update(0.016).unwrap();

    // "c" never runs: the actor's enabled flag is re-checked per callback.
    assert_eq!(fx.taken_trace(), vec!["update:a", "update:b"]);
}

#[test]
fn added_components_stay_invisible_and_silent_until_the_flush() {
    let mut fx = Fixture::new(&[
        ("component_types/Widget.json", json!({"size": 3})),
        (
            "scenes/basic.scene",
            json!({"actors": [{"name": "player", "components": {}}]}),
        ),
    ]);
    fx.runtime
        .components
        .register_behavior("Widget", [fx.tracer("OnStart", "start")]);

    fx.runtime.load_scene("basic").unwrap();
    fx.runtime.update(0.016).unwrap();

    let player = fx.runtime.actor("player").unwrap();
    let added = fx.runtime.add_component(&player, "Widget").unwrap();

    // Returned immediately, configurable, disabled, not yet queryable.
    assert!(!added.enabled());
    added.set("size", Value::Int(9));
    assert!(player.borrow().component_of_type("Widget").is_none());

    // The flush at the end of this frame admits it; no callback yet.
    fx.runtime.update(0.016).unwrap();
    assert!(fx.taken_trace().is_empty());
    assert!(player.borrow().component_of_type("Widget").is_some());
    assert!(added.enabled());

    // Next frame its OnStart runs.
    fx.runtime.update(0.016).unwrap();
    assert_eq!(fx.taken_trace(), vec!["start:r0"]);
}

#[test]
fn template_overrides_resolve_per_instance_and_never_leak() {
    let mut fx = Fixture::new(&[
        ("component_types/Health.json", json!({"health": 10})),
        (
            "actor_templates/enemy.template",
            json!({"name": "enemy", "components": {
                "hp": {"type": "Health", "health": 100}
            }}),
        ),
        (
            "scenes/basic.scene",
            json!({"actors": [
                {"name": "a", "template": "enemy", "components": {"hp": {"health": 50}}},
                {"name": "b", "template": "enemy"}
            ]}),
        ),
    ]);

    fx.runtime.load_scene("basic").unwrap();

    let a_hp = first_component(&fx.runtime.actor("a").unwrap(), "Health");
    let b_hp = first_component(&fx.runtime.actor("b").unwrap(), "Health");

    assert_eq!(a_hp.get("health"), Some(Value::Int(50)));
    assert_eq!(b_hp.get("health"), Some(Value::Int(100)));

    // Mutating one instance touches neither its sibling nor the template.
    a_hp.set("health", Value::Int(1));
    assert_eq!(b_hp.get("health"), Some(Value::Int(100)));

    let again = fx.runtime.instantiate("enemy").unwrap();
    let again_hp = first_component(&again, "Health");
    assert_eq!(again_hp.get("health"), Some(Value::Int(100)));
}

#[test]
fn get_component_breaks_ties_by_smallest_key() {
    let mut fx = Fixture::new(&[
        ("component_types/Alpha.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [{"name": "player", "components": {
                "b": {"type": "Alpha"},
                "a": {"type": "Alpha"}
            }}]}),
        ),
    ]);

    fx.runtime.load_scene("basic").unwrap();
    let player = fx.runtime.actor("player").unwrap();

    assert_eq!(first_component(&player, "Alpha").key(), "a");

    let all: Vec<String> = player
        .borrow()
        .components_of_type("Alpha")
        .iter()
        .map(|c| c.key())
        .collect();
    assert_eq!(all, vec!["a", "b"]);
}

#[test]
fn removed_components_vanish_immediately_and_get_their_destroy_callback() {
    let mut fx = Fixture::new(&[
        ("component_types/Mortal.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [{"name": "player", "components": {"m": {"type": "Mortal"}}}]}),
        ),
    ]);
    fx.runtime.components.register_behavior(
        "Mortal",
        [fx.tracer("OnUpdate", "update"), fx.tracer("OnDestroy", "destroy")],
    );

    fx.runtime.load_scene("basic").unwrap();
    fx.runtime.update(0.016).unwrap();
    fx.taken_trace();

    let player = fx.runtime.actor("player").unwrap();
    let component = first_component(&player, "Mortal");
    player.borrow_mut().remove_component(&component);

    assert!(player.borrow().component_of_type("Mortal").is_none());
    assert!(player.borrow().component_by_key("m").is_none());
    assert!(!component.enabled());

    // Same frame: no update (disabled), one destroy callback.
    fx.runtime.update(0.016).unwrap();
    assert_eq!(fx.taken_trace(), vec!["destroy:m"]);

    // Fully gone afterwards.
    fx.runtime.update(0.016).unwrap();
    assert!(fx.taken_trace().is_empty());
}

#[test]
fn destroying_an_actor_runs_destroy_callbacks_and_removes_it() {
    let mut fx = Fixture::new(&[
        ("component_types/Mortal.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [
                {"name": "enemy", "components": {"m": {"type": "Mortal"}}},
                {"name": "bystander", "components": {}}
            ]}),
        ),
    ]);
    fx.runtime
        .components
        .register_behavior("Mortal", [fx.tracer("OnDestroy", "destroy")]);

    fx.runtime.load_scene("basic").unwrap();
    fx.runtime.update(0.016).unwrap();

    let enemy = fx.runtime.actor("enemy").unwrap();
    fx.runtime.destroy(&enemy);

    assert!(fx.runtime.actor("enemy").is_none());
    assert!(fx.runtime.actor("bystander").is_some());

    fx.runtime.update(0.016).unwrap();
    assert_eq!(fx.taken_trace(), vec!["destroy:m"]);

    fx.runtime.update(0.016).unwrap();
    assert!(fx.taken_trace().is_empty());
}

#[test]
fn event_subscribers_run_in_order_and_unsubscription_waits_for_the_flush() {
    let mut fx = Fixture::new(&[
        ("component_types/Listener.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [
                {"name": "first", "components": {"l": {"type": "Listener"}}},
                {"name": "second", "components": {"l": {"type": "Listener"}}}
            ]}),
        ),
    ]);
    let trace = fx.trace.clone();
    fx.runtime.components.register_behavior(
        "Listener",
        [Callable::new("OnPing", move |runtime, component, payload| {
            let owner = component.owner().unwrap().borrow().name.clone();
            let value = payload.event().and_then(|v| v.as_i64()).unwrap_or(0);
            trace.borrow_mut().push(format!("ping:{owner}:{value}"));

            // The first listener kicks the second off the bus mid-publish.
            if owner == "first" {
                if let Some(second) = runtime.actor("second") {
                    let target = second.borrow().component_of_type("Listener").unwrap();
                    let callback = target.callback("OnPing").unwrap();
                    runtime.events.unsubscribe("ping", target, callback);
                }
            }
            Ok(())
        })],
    );

    fx.runtime.load_scene("basic").unwrap();

    let first = first_component(&fx.runtime.actor("first").unwrap(), "Listener");
    let second = first_component(&fx.runtime.actor("second").unwrap(), "Listener");
    let first_cb = first.callback("OnPing").unwrap();
    let second_cb = second.callback("OnPing").unwrap();
    fx.runtime.events.subscribe("ping", first, first_cb);
    fx.runtime.events.subscribe("ping", second, second_cb);
    fx.runtime.update(0.016).unwrap();

    // Subscription order; the mid-publish unsubscribe does not cut the
    // second listener off from this publish.
    fx.runtime.publish("ping", Value::Int(7));
    assert_eq!(fx.taken_trace(), vec!["ping:first:7", "ping:second:7"]);

    // After the queue flush it is gone.
    fx.runtime.update(0.016).unwrap();
    fx.runtime.publish("ping", Value::Int(8));
    assert_eq!(fx.taken_trace(), vec!["ping:first:8"]);
}

#[test]
fn faulted_event_callbacks_are_auto_unsubscribed() {
    let mut fx = Fixture::new(&[
        ("component_types/Faulty.json", json!({})),
        ("component_types/Steady.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [
                {"name": "bad", "components": {"f": {"type": "Faulty"}}},
                {"name": "good", "components": {"s": {"type": "Steady"}}}
            ]}),
        ),
    ]);
    let trace = fx.trace.clone();
    fx.runtime.components.register_behavior(
        "Faulty",
        [Callable::new("OnPing", move |_, _, _| {
            trace.borrow_mut().push("faulty".to_string());
            Err(ScriptError::new("script divergence"))
        })],
    );
    let trace = fx.trace.clone();
    fx.runtime.components.register_behavior(
        "Steady",
        [Callable::new("OnPing", move |_, _, _| {
            trace.borrow_mut().push("steady".to_string());
            Ok(())
        })],
    );

    fx.runtime.load_scene("basic").unwrap();
    let faulty = first_component(&fx.runtime.actor("bad").unwrap(), "Faulty");
    let steady = first_component(&fx.runtime.actor("good").unwrap(), "Steady");
    let faulty_cb = faulty.callback("OnPing").unwrap();
    let steady_cb = steady.callback("OnPing").unwrap();
    fx.runtime.events.subscribe("ping", faulty, faulty_cb);
    fx.runtime.events.subscribe("ping", steady, steady_cb);
    fx.runtime.update(0.016).unwrap();

    // The failure does not stop later subscribers.
    fx.runtime.publish("ping", Value::Bool(true));
    assert_eq!(fx.taken_trace(), vec!["faulty", "steady"]);

    fx.runtime.update(0.016).unwrap();
    fx.runtime.publish("ping", Value::Bool(true));
    assert_eq!(fx.taken_trace(), vec!["steady"]);
}

#[test]
fn callback_errors_are_isolated_to_the_single_invocation() {
    let mut fx = Fixture::new(&[
        ("component_types/Crashy.json", json!({})),
        ("component_types/Alpha.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [
                {"name": "crasher", "components": {"c": {"type": "Crashy"}}},
                {"name": "survivor", "components": {"a": {"type": "Alpha"}}}
            ]}),
        ),
    ]);
    fx.runtime.components.register_behavior(
        "Crashy",
        [Callable::new("OnUpdate", |_, _, _| {
            Err(ScriptError::new("boom"))
        })],
    );
    fx.runtime
        .components
        .register_behavior("Alpha", [fx.tracer("OnUpdate", "update")]);

    fx.runtime.load_scene("basic").unwrap();
    fx.runtime.update(0.016).unwrap();

    // The crashing component never halts the frame or later actors.
    assert_eq!(fx.taken_trace(), vec!["update:a"]);
}

#[test]
fn raycasts_resolve_actors_in_ascending_fraction_order() {
    let mut fx = Fixture::new(&[(
        "scenes/basic.scene",
        json!({"actors": [
            {"name": "far", "components": {"rb": {"type": "Rigidbody",
                "body_type": "static", "x": 8.0, "y": 0.0, "has_trigger": false}}},
            {"name": "near", "components": {"rb": {"type": "Rigidbody",
                "body_type": "static", "x": 2.0, "y": 0.0, "has_trigger": false}}},
            {"name": "mid", "components": {"rb": {"type": "Rigidbody",
                "body_type": "static", "x": 5.0, "y": 0.0, "has_trigger": false}}}
        ]}),
    )]);

    fx.runtime.load_scene("basic").unwrap();
    fx.runtime.update(0.016).unwrap();

    let hits = fx
        .runtime
        .raycast_all(Vec2::ZERO, Vec2::new(1.0, 0.0), 10.0);
    let order: Vec<String> = hits
        .iter()
        .map(|hit| hit.actor.borrow().name.clone())
        .collect();
    assert_eq!(order, vec!["near", "mid", "far"]);
    assert!(hits.iter().all(|hit| !hit.is_trigger));

    let closest = fx
        .runtime
        .raycast(Vec2::ZERO, Vec2::new(1.0, 0.0), 10.0)
        .unwrap();
    assert_eq!(closest.actor.borrow().name, "near");

    // Out of range: explicit empty results, not errors.
    assert!(fx
        .runtime
        .raycast(Vec2::ZERO, Vec2::new(-1.0, 0.0), 10.0)
        .is_none());
}

#[test]
fn contacts_dispatch_with_manifold_on_enter_and_sentinel_elsewhere() {
    let mut fx = Fixture::new(&[
        ("component_types/Bumper.json", json!({})),
        (
            "scenes/basic.scene",
            json!({"actors": [
                {"name": "left", "components": {
                    "rb": {"type": "Rigidbody", "body_type": "static", "x": 0.0},
                    "s": {"type": "Bumper"}
                }},
                {"name": "right", "components": {
                    "rb": {"type": "Rigidbody", "body_type": "static", "x": 1.0},
                    "s": {"type": "Bumper"}
                }}
            ]}),
        ),
    ]);
    let trace = fx.trace.clone();
    let bumper_callback = |tag: &'static str, trace: Trace| {
        Callable::new(tag, move |_, component, payload| {
            let collision = payload.collision().unwrap();
            let owner = component.owner().unwrap().borrow().name.clone();
            let other = collision.other.borrow().name.clone();
            trace.borrow_mut().push(format!(
                "{tag}:{owner}<-{other}@{},{}",
                collision.point.x, collision.point.y
            ));
            Ok(())
        })
    };
    fx.runtime.components.register_behavior(
        "Bumper",
        [
            bumper_callback("OnCollisionEnter", trace.clone()),
            bumper_callback("OnCollisionExit", trace.clone()),
            bumper_callback("OnTriggerEnter", trace.clone()),
            bumper_callback("OnTriggerExit", trace),
        ],
    );

    fx.runtime.load_scene("basic").unwrap();
    fx.runtime.update(0.016).unwrap();

    let left = fx.runtime.actor("left").unwrap();
    let right = fx.runtime.actor("right").unwrap();
    let left_body = rigidbody_handle(&first_component(&left, "Rigidbody"));
    let right_body = rigidbody_handle(&first_component(&right, "Rigidbody"));

    let contact = |phase, sensors: bool| ContactEvent {
        phase,
        body_a: left_body,
        body_b: right_body,
        sensor_a: sensors,
        sensor_b: sensors,
        point: Vec2::new(0.5, 0.0),
        normal: Vec2::new(1.0, 0.0),
        relative_velocity: Vec2::ZERO,
    };

    // Solid-solid begin: real manifold point, both sides notified.
    fx.injector.push(contact(ContactPhase::Begin, false));
    fx.runtime.update(0.016).unwrap();
    assert_eq!(
        fx.taken_trace(),
        vec![
            "OnCollisionEnter:left<-right@0.5,0",
            "OnCollisionEnter:right<-left@0.5,0"
        ]
    );

    // Solid-solid end: sentinel manifold.
    fx.injector.push(contact(ContactPhase::End, false));
    fx.runtime.update(0.016).unwrap();
    assert_eq!(
        fx.taken_trace(),
        vec![
            format!(
                "OnCollisionExit:left<-right@{},{}",
                CONTACT_SENTINEL.x, CONTACT_SENTINEL.y
            ),
            format!(
                "OnCollisionExit:right<-left@{},{}",
                CONTACT_SENTINEL.x, CONTACT_SENTINEL.y
            ),
        ]
    );

    // Sensor-sensor begin: trigger callbacks, sentinel manifold.
    fx.injector.push(contact(ContactPhase::Begin, true));
    fx.runtime.update(0.016).unwrap();
    assert_eq!(
        fx.taken_trace(),
        vec![
            format!(
                "OnTriggerEnter:left<-right@{},{}",
                CONTACT_SENTINEL.x, CONTACT_SENTINEL.y
            ),
            format!(
                "OnTriggerEnter:right<-left@{},{}",
                CONTACT_SENTINEL.x, CONTACT_SENTINEL.y
            ),
        ]
    );

    // Mixed sensor/solid contacts dispatch nothing.
    fx.injector.push(ContactEvent {
        sensor_a: true,
        sensor_b: false,
        ..contact(ContactPhase::Begin, false)
    });
    fx.runtime.update(0.016).unwrap();
    assert!(fx.taken_trace().is_empty());
}

#[test]
fn runtime_scene_loads_are_deferred_and_keep_marked_actors() {
    let mut fx = Fixture::new(&[
        ("component_types/Widget.json", json!({})),
        (
            "scenes/first.scene",
            json!({"actors": [
                {"name": "keeper", "components": {"w": {"type": "Widget"}}},
                {"name": "mob", "components": {}}
            ]}),
        ),
        (
            "scenes/second.scene",
            json!({"actors": [{"name": "boss", "components": {}}]}),
        ),
    ]);

    fx.runtime.load_scene("first").unwrap();
    fx.runtime.update(0.016).unwrap();
    assert_eq!(fx.runtime.scene.name(), "first");

    let keeper = fx.runtime.actor("keeper").unwrap();
    fx.runtime.scene.dont_destroy_on_load(&keeper);

    fx.runtime.load_scene_runtime("second");

    // Nothing is torn down mid-frame, but everything is flagged.
    assert!(fx.runtime.actor("mob").is_none());
    assert_eq!(fx.runtime.scene.name(), "first");

    fx.runtime.update(0.016).unwrap();

    assert_eq!(fx.runtime.scene.name(), "second");
    assert!(fx.runtime.actor("boss").is_some());
    assert!(fx.runtime.actor("keeper").is_some());
    assert!(fx.runtime.actor("mob").is_none());

    // The carried actor kept its components and its id.
    assert!(keeper.borrow().component_by_key("w").is_some());
    assert_eq!(keeper.borrow().id, 0);
}

#[test]
fn instantiated_actors_join_the_passes_at_the_next_flush() {
    let mut fx = Fixture::new(&[
        ("component_types/Alpha.json", json!({})),
        (
            "actor_templates/minion.template",
            json!({"name": "minion", "components": {"a": {"type": "Alpha"}}}),
        ),
        ("scenes/basic.scene", json!({"actors": []})),
    ]);
    fx.runtime.components.register_behavior(
        "Alpha",
        [fx.tracer("OnStart", "start"), fx.tracer("OnUpdate", "update")],
    );

    fx.runtime.load_scene("basic").unwrap();
    let minion = fx.runtime.instantiate("minion").unwrap();

    // Findable by name right away, but not part of this frame's passes.
    assert!(fx.runtime.actor("minion").is_some());
    fx.runtime.update(0.016).unwrap();
    assert!(fx.taken_trace().is_empty());

    // After the flush the clone runs like any scene actor.
    fx.runtime.update(0.016).unwrap();
    assert_eq!(fx.taken_trace(), vec!["start:a", "update:a"]);
    assert!(minion.borrow().enabled);

    let mob_ids: Vec<u32> = fx
        .runtime
        .actors("minion")
        .iter()
        .map(|a| a.borrow().id)
        .collect();
    assert_eq!(mob_ids, vec![0]);
}

#[test]
fn missing_scene_and_component_files_are_fatal() {
    let mut fx = Fixture::new(&[(
        "scenes/broken.scene",
        json!({"actors": [{"name": "x", "components": {"g": {"type": "Ghost"}}}]}),
    )]);

    assert!(fx.runtime.load_scene("nope").is_err());
    assert!(fx.runtime.load_scene("broken").is_err());
}
