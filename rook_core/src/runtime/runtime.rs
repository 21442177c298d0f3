// rook_core/src/runtime/runtime.rs
use crate::actor::actor::ActorRef;
use crate::actor::lifecycle::LifecycleEvent;
use crate::console_error;
use crate::error::EngineError;
use crate::physics::backend::{ContactEvent, ContactPhase, PhysicsBackend};
use crate::physics::contact_bridge::{Collision, ContactBridge, CONTACT_SENTINEL};
use crate::scene::scene::{parse_actor, Scene};
use crate::scene::template::{clone_from_blueprint, TemplateStore};
use crate::scripting::component::{Component, ComponentRef};
use crate::scripting::component_store::ComponentStore;
use crate::scripting::event_bus::EventBus;
use crate::scripting::value::{CallbackResult, Payload, ScriptError, Value};
use crate::storage::json::read_json_file;
use crate::storage::path_utils::{component_types_dir, scene_path, templates_dir};
use glam::Vec2;
use std::path::PathBuf;

/// The engine context: every store, the live scene, the event bus and the
/// physics boundary, threaded explicitly through dispatch so callbacks can
/// reach the whole scripting surface. One per game; tests build their own.
pub struct Runtime {
    pub components: ComponentStore,
    pub templates: TemplateStore,
    pub scene: Scene,
    pub events: EventBus,
    pub physics: Box<dyn PhysicsBackend>,
    pub bridge: ContactBridge,
    /// Seconds covered by the current frame, readable from callbacks.
    pub delta_time: f32,
    resource_root: PathBuf,
    quit: bool,
}

impl Runtime {
    pub fn new(resource_root: impl Into<PathBuf>, physics: Box<dyn PhysicsBackend>) -> Self {
        let resource_root = resource_root.into();
        Self {
            components: ComponentStore::new(component_types_dir(&resource_root)),
            templates: TemplateStore::new(templates_dir(&resource_root)),
            scene: Scene::new(),
            events: EventBus::default(),
            physics,
            bridge: ContactBridge::default(),
            delta_time: 0.0,
            resource_root,
            quit: false,
        }
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    /// One frame: pending scene load, the four lifecycle passes, the
    /// structural flushes, the event-bus queue drain, then the physics
    /// step whose contacts dispatch synchronously.
    pub fn update(&mut self, dt: f32) -> Result<(), EngineError> {
        self.delta_time = dt;

        if let Some(next) = self.scene.take_pending_scene() {
            self.load_scene(&next)?;
        }

        self.run_lifecycle_pass(LifecycleEvent::OnStart);
        self.run_lifecycle_pass(LifecycleEvent::OnUpdate);
        self.run_lifecycle_pass(LifecycleEvent::OnLateUpdate);
        self.run_destroy_pass();

        self.flush_structural_queues();
        self.events.handle_subscription_queues();

        self.step_physics(dt);
        Ok(())
    }

    /// Replaces the live actor set with the named scene. Actors marked
    /// "don't destroy on load" carry over; everything else is parsed fresh.
    pub fn load_scene(&mut self, name: &str) -> Result<(), EngineError> {
        let path = scene_path(&self.resource_root, name);
        if !path.exists() {
            return Err(EngineError::MissingScene(name.to_string()));
        }

        self.scene.begin_load(name);

        let document = read_json_file(&path)?;
        let entries = document
            .get("actors")
            .and_then(|v| v.as_array())
            .ok_or_else(|| EngineError::MalformedScene {
                name: name.to_string(),
                message: "missing actors array".to_string(),
            })?;

        for entry in entries {
            let actor = parse_actor(&mut self.components, &mut self.templates, entry, name)?;
            self.scene.add_parsed_actor(actor);
        }

        Ok(())
    }

    /// Deferred scene switch: safe to call from any callback. The parse
    /// happens at the top of the next update.
    pub fn load_scene_runtime(&mut self, name: impl Into<String>) {
        self.scene.queue_scene(name);
    }

    /// Clones the named template into a new actor. Queued for admission at
    /// the flush, but findable by name immediately.
    pub fn instantiate(&mut self, template_name: &str) -> Result<ActorRef, EngineError> {
        let blueprint = self.templates.load(template_name, &mut self.components)?;
        let actor = clone_from_blueprint(&self.components, &blueprint);

        // Owner links resolve right away; bucket membership waits for the
        // actor flush like any other queued admission.
        let components = actor.borrow().components_snapshot();
        for (_, component) in components {
            component.set_owner(&actor);
        }

        self.scene.register(actor.clone());
        Ok(actor)
    }

    pub fn destroy(&mut self, actor: &ActorRef) {
        self.scene.destroy(actor);
    }

    pub fn actor(&self, name: &str) -> Option<ActorRef> {
        self.scene.actor(name)
    }

    pub fn actors(&self, name: &str) -> Vec<ActorRef> {
        self.scene.actors_named(name)
    }

    /// Obtains a runtime component from the store, links it to the actor
    /// and queues it for admission. The handle is returned immediately so
    /// the caller can configure fields before the flush enables it.
    pub fn add_component(
        &mut self,
        actor: &ActorRef,
        type_name: &str,
    ) -> Result<ComponentRef, EngineError> {
        let component = self.components.load_runtime(type_name)?;
        component.set_owner(actor);
        actor.borrow_mut().queue_add(component.clone());
        Ok(component)
    }

    /// Invokes every live subscriber for the event type in subscription
    /// order. Faulted callbacks are logged and scheduled for automatic
    /// unsubscription once the loop has finished; a subscriber that
    /// unsubscribes mid-publish is still invoked for this publish.
    pub fn publish(&mut self, event_type: &str, payload: Value) {
        let subscribers = self.events.subscribers_snapshot(event_type);
        let mut faulted = Vec::new();

        for subscription in subscribers {
            let payload = Payload::Event(payload.clone());
            if let Err(err) = subscription
                .callback
                .call(self, &subscription.component, &payload)
            {
                self.report_callback_error(&subscription.component, &err);
                faulted.push(subscription);
            }
        }

        for subscription in faulted {
            self.events.unsubscribe(
                subscription.event_type,
                subscription.component,
                subscription.callback,
            );
        }
    }

    /// Runs one bucket across all actors in registration order, components
    /// in key order. A disabled actor skips its remaining callbacks for
    /// this pass; a disabled component is skipped. OnStart buckets clear
    /// after running so a component starts once.
    fn run_lifecycle_pass(&mut self, event: LifecycleEvent) {
        let actors = self.scene.actors_snapshot();
        for actor in actors {
            let components = actor.borrow().bucket_components(event);
            for component in components {
                if !actor.borrow().enabled {
                    break;
                }
                if !component.enabled() {
                    continue;
                }
                self.invoke(&actor, &component, event, &Payload::None);
            }

            if event == LifecycleEvent::OnStart {
                actor.borrow_mut().clear_bucket(event);
            }
        }
    }

    /// Invokes OnDestroy for every component queued for removal that
    /// registered one, before the flush erases them. Errors are logged and
    /// never stop the remaining components.
    fn run_destroy_pass(&mut self) {
        let actors = self.scene.actors_snapshot();
        for actor in actors {
            let components = actor.borrow().pending_destroy_components();
            for component in components {
                self.invoke(&actor, &component, LifecycleEvent::OnDestroy, &Payload::None);
            }
        }
    }

    fn flush_structural_queues(&mut self) {
        for actor in self.scene.actors_snapshot() {
            actor.borrow_mut().process_component_queues();
        }
        self.scene.process_actor_queues();
    }

    fn step_physics(&mut self, dt: f32) {
        let contacts = self.physics.step(dt);
        for event in contacts {
            self.dispatch_contact(event);
        }
    }

    /// Translates one contact notification into actor-level callbacks.
    /// Solid-solid pairs produce collision events, sensor-sensor pairs
    /// produce trigger events with the sentinel manifold; mixed pairs
    /// produce nothing. Contact ends always carry the sentinel.
    fn dispatch_contact(&mut self, event: ContactEvent) {
        let Some(actor_a) = self.bridge.actor_for(event.body_a) else {
            return;
        };
        let Some(actor_b) = self.bridge.actor_for(event.body_b) else {
            return;
        };

        let (lifecycle, point, normal) = match (event.phase, event.sensor_a, event.sensor_b) {
            (ContactPhase::Begin, false, false) => {
                (LifecycleEvent::OnCollisionEnter, event.point, event.normal)
            }
            (ContactPhase::Begin, true, true) => {
                (LifecycleEvent::OnTriggerEnter, CONTACT_SENTINEL, CONTACT_SENTINEL)
            }
            (ContactPhase::End, false, false) => {
                (LifecycleEvent::OnCollisionExit, CONTACT_SENTINEL, CONTACT_SENTINEL)
            }
            (ContactPhase::End, true, true) => {
                (LifecycleEvent::OnTriggerExit, CONTACT_SENTINEL, CONTACT_SENTINEL)
            }
            _ => return,
        };

        self.run_contact_bucket(
            &actor_a,
            &actor_b,
            lifecycle,
            point,
            normal,
            event.relative_velocity,
        );
        self.run_contact_bucket(
            &actor_b,
            &actor_a,
            lifecycle,
            point,
            normal,
            event.relative_velocity,
        );
    }

    fn run_contact_bucket(
        &mut self,
        target: &ActorRef,
        other: &ActorRef,
        event: LifecycleEvent,
        point: Vec2,
        normal: Vec2,
        relative_velocity: Vec2,
    ) {
        let components = target.borrow().bucket_components(event);
        for component in components {
            if !target.borrow().enabled {
                break;
            }
            if !component.enabled() {
                continue;
            }
            let payload = Payload::Collision(Collision {
                other: other.clone(),
                point,
                normal,
                relative_velocity,
            });
            self.invoke(target, &component, event, &payload);
        }
    }

    /// Single callback invocation with error isolation: a failure is
    /// logged with the owning actor's name and the frame continues.
    fn invoke(
        &mut self,
        actor: &ActorRef,
        component: &ComponentRef,
        event: LifecycleEvent,
        payload: &Payload,
    ) {
        if let Err(err) = self.invoke_inner(component, event, payload) {
            let name = actor.borrow().name.clone();
            log_callback_error(&name, &err);
        }
    }

    fn invoke_inner(
        &mut self,
        component: &ComponentRef,
        event: LifecycleEvent,
        payload: &Payload,
    ) -> CallbackResult {
        match &**component {
            Component::Rigidbody(cell) => {
                match event {
                    LifecycleEvent::OnStart => {
                        let handle = cell.borrow_mut().on_start(self.physics.as_mut());
                        if let Some(actor) = component.owner() {
                            self.bridge.register(handle, &actor);
                        }
                    }
                    LifecycleEvent::OnDestroy => {
                        let handle = cell.borrow().body();
                        cell.borrow_mut().on_destroy(self.physics.as_mut());
                        if let Some(handle) = handle {
                            self.bridge.unregister(handle);
                        }
                    }
                    _ => {}
                }
                Ok(())
            }
            Component::Script(_) => match component.callback(event.callback_name()) {
                Some(callable) => callable.call(self, component, payload),
                None => Ok(()),
            },
        }
    }

    fn report_callback_error(&self, component: &ComponentRef, err: &ScriptError) {
        let name = component
            .owner()
            .map(|actor| actor.borrow().name.clone())
            .unwrap_or_default();
        log_callback_error(&name, err);
    }
}

/// Red diagnostic line for a recoverable callback failure.
pub fn log_callback_error(actor_name: &str, err: &ScriptError) {
    console_error!("\x1b[31m{} : {}\x1b[0m", actor_name, err.sanitized_message());
}
