//! Render engine scenarios.
//!
//! These tests drive a full engine against [`MemoryHost`] and check the
//! ordering guarantees of passes, hooks and effects.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use crate::{
    Component, EffectErrorPolicy, Engine, EngineBuilder, MemoryHost, Props, RenderError, Setter,
    SurfaceId, Value, create_element,
};

// ============================================================================
// Test Infrastructure
// ============================================================================

/// Ordered record of what effects observed.
#[derive(Debug, Clone, Default)]
struct Log(Rc<RefCell<Vec<String>>>);

impl Log {
    fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// Smuggles a setter out of a component so tests can call it between passes.
#[derive(Debug)]
struct Handle<T>(Rc<RefCell<Option<Setter<T>>>>);

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }
}

impl<T: Clone + PartialEq + 'static> Handle<T> {
    fn store(&self, setter: &Setter<T>) {
        *self.0.borrow_mut() = Some(setter.clone());
    }

    fn get(&self) -> Setter<T> {
        self.0.borrow().clone().expect("component ran at least once")
    }
}

fn fixture() -> (Engine<MemoryHost>, SurfaceId) {
    let mut host = MemoryHost::new();
    let surface = host.create_surface("root");
    (Engine::new(host), surface)
}

fn text(engine: &Engine<MemoryHost>, surface: SurfaceId) -> String {
    engine.with_host(|host| {
        host.content(surface)
            .map(|node| node.text_content().to_string())
            .unwrap_or_default()
    })
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn mount_effect_drives_a_second_pass() {
    let (engine, surface) = fixture();
    let log = Log::default();
    let sink = log.clone();

    engine
        .render(
            move |hooks| {
                let (count, set_count) = hooks.use_state(0_i64);
                let mounted = sink.clone();
                hooks.use_effect(
                    move || {
                        set_count.set(1)?;
                        mounted.push("mounted");
                        Ok(())
                    },
                    deps![],
                );
                let counted = sink.clone();
                hooks.use_effect(
                    move || {
                        counted.push(format!("count: {count}"));
                        Ok(())
                    },
                    deps![count],
                );
                Ok(create_element("div", Props::new(), children![count]))
            },
            surface,
        )
        .expect("render succeeds");

    assert_eq!(log.entries(), ["mounted", "count: 0", "count: 1"]);
    assert!(text(&engine, surface).contains('1'));
    assert_eq!(engine.stats().passes, 2);
    assert_eq!(engine.stats().commits, 2);
}

#[test]
fn descriptor_round_trips_into_the_host() {
    let (engine, surface) = fixture();
    engine
        .render(
            |_| {
                Ok(create_element(
                    "div",
                    Props::new().style("color", "red").with("id", "main"),
                    children!["hello"],
                ))
            },
            surface,
        )
        .expect("render succeeds");

    let first = engine.with_host(|host| {
        let node = host.content(surface).expect("content committed");
        assert_eq!(node.tag(), "div");
        assert_eq!(node.style_property("color"), Some("red"));
        assert_eq!(node.text_content(), "hello");
        assert_eq!(node.property("id").and_then(Value::as_str), Some("main"));
        host.content_id(surface).expect("content committed")
    });

    engine.rerender().expect("rerender succeeds");
    engine.with_host(|host| {
        let second = host.content_id(surface).expect("content committed");
        assert_ne!(first, second);
        assert!(!host.contains(first), "old content must be gone, not hidden");
        assert_eq!(host.commit_count(surface), 2);
    });
}

// ============================================================================
// State hook
// ============================================================================

#[test]
fn setting_the_current_value_never_renders() {
    let (engine, surface) = fixture();
    let handle = Handle::default();
    let stash = handle.clone();
    engine
        .render(
            move |hooks| {
                let (value, set_value) = hooks.use_state(String::from("same"));
                stash.store(&set_value);
                Ok(create_element("p", Props::new(), children![value]))
            },
            surface,
        )
        .expect("render succeeds");

    let before = engine.stats();
    for _ in 0..5 {
        handle.get().set(String::from("same")).expect("no-op set");
    }
    assert_eq!(engine.stats(), before);
    assert_eq!(engine.with_host(|host| host.commit_count(surface)), 1);
}

#[test]
fn each_changing_set_runs_exactly_one_pass() {
    let (engine, surface) = fixture();
    let handle = Handle::default();
    let stash = handle.clone();
    engine
        .render(
            move |hooks| {
                let (count, set_count) = hooks.use_state(0_i64);
                stash.store(&set_count);
                Ok(create_element("p", Props::new(), children![count]))
            },
            surface,
        )
        .expect("render succeeds");

    for next in 1..=3 {
        handle.get().set(next).expect("pass succeeds");
        assert_eq!(text(&engine, surface), next.to_string());
    }
    assert_eq!(engine.stats().passes, 4);
}

#[test]
fn sets_inside_a_pass_queue_one_pass_each() {
    let (engine, surface) = fixture();
    engine
        .render(
            |hooks| {
                let (count, set_count) = hooks.use_state(0_i64);
                hooks.use_effect(
                    move || {
                        set_count.set(1)?;
                        set_count.set(2)?;
                        Ok(())
                    },
                    deps![],
                );
                Ok(create_element("p", Props::new(), children![count]))
            },
            surface,
        )
        .expect("render succeeds");

    assert_eq!(engine.stats().passes, 3);
    assert_eq!(text(&engine, surface), "2");
}

#[test]
fn update_derives_from_the_current_value() {
    let (engine, surface) = fixture();
    let handle = Handle::default();
    let stash = handle.clone();
    engine
        .render(
            move |hooks| {
                let (count, set_count) = hooks.use_state(10_i64);
                stash.store(&set_count);
                Ok(create_element("p", Props::new(), children![count]))
            },
            surface,
        )
        .expect("render succeeds");

    handle.get().update(|count| count + 5).expect("pass succeeds");
    assert_eq!(text(&engine, surface), "15");
}

#[test]
fn lazy_initializer_runs_once() {
    let (engine, surface) = fixture();
    let calls = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&calls);
    engine
        .render(
            move |hooks| {
                let counter = Rc::clone(&counter);
                let (label, _) = hooks.use_state_with(move || {
                    counter.set(counter.get() + 1);
                    String::from("ready")
                });
                Ok(create_element("p", Props::new(), children![label]))
            },
            surface,
        )
        .expect("render succeeds");
    engine.rerender().expect("rerender succeeds");
    engine.rerender().expect("rerender succeeds");

    assert_eq!(calls.get(), 1);
    assert_eq!(text(&engine, surface), "ready");
}

#[test]
fn slots_follow_call_order() {
    let (engine, surface) = fixture();
    let first = Handle::default();
    let second = Handle::default();
    let (a_handle, b_handle) = (first.clone(), second.clone());
    engine
        .render(
            move |hooks| {
                let (a, set_a) = hooks.use_state(0_i64);
                let (b, set_b) = hooks.use_state(0_i64);
                a_handle.store(&set_a);
                b_handle.store(&set_b);
                Ok(create_element("p", Props::new(), children!["a=", a, " b=", b]))
            },
            surface,
        )
        .expect("render succeeds");

    assert_eq!(first.get().slot(), 0);
    assert_eq!(second.get().slot(), 1);
    second.get().set(10).expect("pass succeeds");
    assert_eq!(text(&engine, surface), "a=0 b=10");
    first.get().set(3).expect("pass succeeds");
    assert_eq!(text(&engine, surface), "a=3 b=10");
}

#[test]
fn cursor_counts_hook_calls_on_every_pass() {
    let (engine, surface) = fixture();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let record = Rc::clone(&seen);
    engine
        .render(
            move |hooks| {
                let (count, set_count) = hooks.use_state(0_i64);
                hooks.use_effect(|| Ok(()), None);
                hooks.use_effect(
                    move || {
                        if count < 2 {
                            set_count.set(count + 1)?;
                        }
                        Ok(())
                    },
                    deps![count],
                );
                record.borrow_mut().push(hooks.cursor());
                Ok(create_element("p", Props::new(), children![count]))
            },
            surface,
        )
        .expect("render succeeds");

    assert_eq!(*seen.borrow(), [3, 3, 3]);
    assert_eq!(engine.cursor(), 3);
    assert_eq!(engine.slot_count(), 3);
}

// ============================================================================
// Effect hook
// ============================================================================

#[test]
fn dependency_lists_gate_effects() {
    let (engine, surface) = fixture();
    let log = Log::default();
    let sink = log.clone();
    let handle = Handle::default();
    let other_handle = Handle::default();
    let (x_stash, other_stash) = (handle.clone(), other_handle.clone());
    engine
        .render(
            move |hooks| {
                let (x, set_x) = hooks.use_state(0_i64);
                let (other, set_other) = hooks.use_state(0_i64);
                x_stash.store(&set_x);
                other_stash.store(&set_other);
                let once = sink.clone();
                hooks.use_effect(move || Ok(once.push("once")), deps![]);
                let tracked = sink.clone();
                hooks.use_effect(move || Ok(tracked.push(format!("x={x}"))), deps![x]);
                let always = sink.clone();
                hooks.use_effect(move || Ok(always.push("always")), None);
                Ok(create_element("p", Props::new(), children![x, other]))
            },
            surface,
        )
        .expect("render succeeds");

    other_handle.get().set(1).expect("pass succeeds");
    handle.get().set(7).expect("pass succeeds");

    assert_eq!(
        log.entries(),
        ["once", "x=0", "always", "always", "x=7", "always"]
    );
}

#[test]
fn unchanged_sets_inside_effects_stay_idle() {
    let (engine, surface) = fixture();
    engine
        .render(
            |hooks| {
                let (count, set_count) = hooks.use_state(4_i64);
                hooks.use_effect(move || Ok(set_count.set(count)?), None);
                Ok(create_element("p", Props::new(), children![count]))
            },
            surface,
        )
        .expect("render succeeds");
    engine.rerender().expect("rerender succeeds");

    assert_eq!(engine.stats().passes, 2);
    assert_eq!(engine.stats().effects_run, 2);
}

#[test]
fn isolated_effect_failures_do_not_stop_the_flush() {
    let (engine, surface) = fixture();
    let log = Log::default();
    let sink = log.clone();
    engine
        .render(
            move |hooks| {
                hooks.use_effect(|| Err(anyhow::anyhow!("first effect broke")), deps![]);
                let after = sink.clone();
                hooks.use_effect(move || Ok(after.push("second")), deps![]);
                Ok(create_element("p", Props::new(), children!["ok"]))
            },
            surface,
        )
        .expect("isolated failures are not returned");

    assert_eq!(log.entries(), ["second"]);
    assert_eq!(engine.stats().effects_failed, 1);
    assert_eq!(engine.stats().effects_run, 1);
}

#[test]
fn fail_fast_skips_the_rest_of_the_queue() {
    let mut host = MemoryHost::new();
    let surface = host.create_surface("root");
    let engine = EngineBuilder::new()
        .effect_errors(EffectErrorPolicy::FailFast)
        .build(host);
    let log = Log::default();
    let sink = log.clone();

    let error = engine
        .render(
            move |hooks| {
                hooks.use_effect(|| Err(anyhow::anyhow!("first effect broke")), deps![]);
                let after = sink.clone();
                hooks.use_effect(move || Ok(after.push("second")), deps![]);
                Ok(create_element("p", Props::new(), children!["committed"]))
            },
            surface,
        )
        .expect_err("fail-fast returns the effect error");

    assert!(matches!(error, RenderError::Effect(_)));
    assert!(log.entries().is_empty());
    assert_eq!(text(&engine, surface), "committed");
}

#[test]
fn effects_skipped_by_fail_fast_run_on_the_next_pass() {
    let mut host = MemoryHost::new();
    let surface = host.create_surface("root");
    let engine = EngineBuilder::new()
        .effect_errors(EffectErrorPolicy::FailFast)
        .build(host);
    let broken = Rc::new(Cell::new(true));
    let flag = Rc::clone(&broken);
    let log = Log::default();
    let sink = log.clone();

    engine
        .render(
            move |hooks| {
                let fail = flag.get();
                hooks.use_effect(
                    move || {
                        if fail {
                            anyhow::bail!("only the first pass breaks");
                        }
                        Ok(())
                    },
                    None,
                );
                let mount = sink.clone();
                hooks.use_effect(move || Ok(mount.push("mount")), deps![]);
                Ok(create_element("p", Props::new(), children!["x"]))
            },
            surface,
        )
        .expect_err("first pass fails fast");
    assert!(log.entries().is_empty());

    broken.set(false);
    engine.rerender().expect("second pass succeeds");
    engine.rerender().expect("third pass succeeds");
    assert_eq!(log.entries(), ["mount"]);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn component_errors_leave_the_surface_untouched() {
    let (engine, surface) = fixture();
    let failing = Rc::new(Cell::new(false));
    let flag = Rc::clone(&failing);
    let log = Log::default();
    let sink = log.clone();
    engine
        .render(
            move |hooks| {
                let effect_log = sink.clone();
                hooks.use_effect(move || Ok(effect_log.push("ran")), None);
                if flag.get() {
                    anyhow::bail!("component exploded");
                }
                Ok(create_element("p", Props::new(), children!["stable"]))
            },
            surface,
        )
        .expect("first render succeeds");
    let committed = engine.with_host(|host| host.content_id(surface));

    failing.set(true);
    let error = engine.rerender().expect_err("component fails");
    assert!(matches!(error, RenderError::Component { .. }));
    assert_eq!(engine.with_host(|host| host.content_id(surface)), committed);
    assert_eq!(text(&engine, surface), "stable");
    assert_eq!(log.entries(), ["ran"], "effects of an aborted pass are dropped");
}

#[test]
fn aborted_passes_leave_mount_effects_pending() {
    let (engine, surface) = fixture();
    let failing = Rc::new(Cell::new(true));
    let flag = Rc::clone(&failing);
    let log = Log::default();
    let sink = log.clone();

    engine
        .render(
            move |hooks| {
                let mount = sink.clone();
                hooks.use_effect(move || Ok(mount.push("mount")), deps![]);
                if flag.get() {
                    anyhow::bail!("not ready yet");
                }
                Ok(create_element("p", Props::new(), children!["ready"]))
            },
            surface,
        )
        .expect_err("first pass aborts");
    assert!(log.entries().is_empty());

    failing.set(false);
    engine.rerender().expect("rerender succeeds");
    engine.rerender().expect("rerender succeeds");
    assert_eq!(log.entries(), ["mount"]);
    assert_eq!(text(&engine, surface), "ready");
}

#[test]
fn host_errors_abort_before_the_commit() {
    let (engine, surface) = fixture();
    let tag = Rc::new(RefCell::new(String::from("p")));
    let current = Rc::clone(&tag);
    engine
        .render(
            move |_| {
                Ok(create_element(
                    current.borrow().as_str(),
                    Props::new(),
                    children!["kept"],
                ))
            },
            surface,
        )
        .expect("first render succeeds");

    engine.with_host(|host| host.reject_tag("blink"));
    *tag.borrow_mut() = String::from("blink");
    let error = engine.rerender().expect_err("host refuses the tag");
    assert!(matches!(error, RenderError::Host(_)));
    assert_eq!(text(&engine, surface), "kept");
    assert_eq!(engine.stats().commits, 1);
}

#[test]
fn runaway_updates_hit_the_pass_limit() {
    let mut host = MemoryHost::new();
    let surface = host.create_surface("root");
    let engine = EngineBuilder::new().max_consecutive_passes(5).build(host);

    let error = engine
        .render(
            |hooks| {
                let (count, set_count) = hooks.use_state(0_i64);
                set_count.set(count + 1)?;
                Ok(create_element("p", Props::new(), children![count]))
            },
            surface,
        )
        .expect_err("loop is cut off");

    assert!(matches!(error, RenderError::RenderLoop { limit: 5 }));
    assert_eq!(engine.stats().passes, 5);
}

#[test]
fn zero_pass_limit_still_renders_once() {
    let mut host = MemoryHost::new();
    let surface = host.create_surface("root");
    let engine = EngineBuilder::new().max_consecutive_passes(0).build(host);

    engine
        .render(
            |_| Ok(create_element("p", Props::new(), children!["drawn"])),
            surface,
        )
        .expect("a single pass fits any limit");

    assert_eq!(engine.config().max_consecutive_passes, 1);
    assert_eq!(text(&engine, surface), "drawn");
}

#[test]
fn rendering_from_inside_a_pass_is_rejected() {
    let (engine, surface) = fixture();
    let outcome = Rc::new(Cell::new(false));
    let seen = Rc::clone(&outcome);
    let nested = engine.clone();
    engine
        .render(
            move |hooks| {
                let nested = nested.clone();
                let seen = Rc::clone(&seen);
                hooks.use_effect(
                    move || {
                        seen.set(matches!(nested.rerender(), Err(RenderError::Reentrant)));
                        Ok(())
                    },
                    deps![],
                );
                Ok(create_element("p", Props::new(), children![]))
            },
            surface,
        )
        .expect("outer render succeeds");

    assert!(outcome.get());
    assert_eq!(engine.stats().passes, 1);
}

#[test]
fn unmount_invalidates_setters() {
    let (engine, surface) = fixture();
    let handle = Handle::default();
    let stash = handle.clone();
    engine
        .render(
            move |hooks| {
                let (count, set_count) = hooks.use_state(0_i64);
                stash.store(&set_count);
                Ok(create_element("p", Props::new(), children![count]))
            },
            surface,
        )
        .expect("render succeeds");

    engine.unmount().expect("unmount outside a pass");
    assert!(!engine.is_mounted());
    assert!(matches!(handle.get().set(9), Err(RenderError::Unmounted)));
    assert!(matches!(engine.rerender(), Err(RenderError::NotMounted)));
    assert_eq!(engine.slot_count(), 0);
}

// ============================================================================
// Descriptor resolution
// ============================================================================

#[test]
fn component_roots_resolve_on_the_same_cursor() {
    let (engine, surface) = fixture();
    let greeting = Component::new("Greeting", |hooks, props| {
        let (greeting, _) = hooks.use_state(String::from("hello"));
        let name = props.get("name").map(ToString::to_string).unwrap_or_default();
        Ok(create_element("p", Props::new(), children![greeting, " ", name]))
    });
    engine
        .render(
            move |hooks| {
                let (_, _) = hooks.use_state(0_i64);
                Ok(create_element(
                    greeting.clone(),
                    Props::new().with("name", "ada"),
                    children![],
                ))
            },
            surface,
        )
        .expect("render succeeds");

    assert_eq!(text(&engine, surface), "hello ada");
    assert_eq!(engine.cursor(), 2);
}

#[test]
fn component_resolution_is_bounded() {
    let mut host = MemoryHost::new();
    let surface = host.create_surface("root");
    let engine = EngineBuilder::new().max_component_depth(2).build(host);
    let leaf = Component::new("Leaf", |_, _| {
        Ok(create_element("p", Props::new(), children![]))
    });
    let middle = Component::new("Middle", move |_, _| {
        Ok(create_element(leaf.clone(), Props::new(), children![]))
    });
    let top = Component::new("Top", move |_, _| {
        Ok(create_element(middle.clone(), Props::new(), children![]))
    });

    let error = engine
        .render(
            move |_| Ok(create_element(top.clone(), Props::new(), children![])),
            surface,
        )
        .expect_err("three levels exceed the limit");
    assert!(matches!(error, RenderError::ComponentDepth { limit: 2 }));
}

#[test]
fn nested_tags_contribute_their_text() {
    let (engine, surface) = fixture();
    engine
        .render(
            |_| {
                let inner = create_element("b", Props::new().style("color", "blue"), children!["c", 1]);
                Ok(create_element("div", Props::new(), children!["a", inner, 2.5]))
            },
            surface,
        )
        .expect("render succeeds");

    assert_eq!(text(&engine, surface), "ac12.5");
    assert_eq!(engine.with_host(|host| host.node_count()), 1);
}

#[test]
fn nested_components_are_a_shape_error() {
    let (engine, surface) = fixture();
    let inner = Component::new("Inner", |_, _| {
        Ok(create_element("span", Props::new(), children![]))
    });
    let error = engine
        .render(
            move |_| {
                let child = create_element(inner.clone(), Props::new(), children![]);
                Ok(create_element("div", Props::new(), children![child]))
            },
            surface,
        )
        .expect_err("nested components are not mounted");

    assert!(matches!(
        error,
        RenderError::NestedComponent { ref component } if component == "Inner"
    ));
    assert_eq!(engine.with_host(|host| host.content_id(surface)), None);
}
