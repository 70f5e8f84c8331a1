//! The render engine.
//!
//! One [`Engine`] owns one render session and one mount. A pass resets the
//! cursor, invokes the root component, builds a host node from the returned
//! descriptor, swaps it into the surface, and then flushes the effects queued
//! during the pass. Passes never overlap: state changes made while a pass is in
//! flight queue another pass that starts after the flush.

use alloc::rc::{Rc, Weak};
use alloc::string::ToString;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use serde::Serialize;

use crate::config::{EffectErrorPolicy, EngineConfig};
use crate::element::{Child, Component, Element, Kind, Props};
use crate::error::RenderError;
use crate::hooks::{Hooks, QueuedEffect, Rerender, Session};
use crate::host::HostSurface;

/// Counters accumulated over the lifetime of an engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderStats {
    /// Passes started, including aborted ones.
    pub passes: u64,
    /// Passes that replaced the surface content.
    pub commits: u64,
    /// Effect callbacks that returned `Ok`.
    pub effects_run: u64,
    /// Effect callbacks that returned an error.
    pub effects_failed: u64,
}

#[derive(Debug, Clone)]
struct Mount<S> {
    root: Component,
    surface: S,
}

struct EngineInner<H: HostSurface> {
    host: RefCell<H>,
    session: RefCell<Rc<Session>>,
    mount: RefCell<Option<Mount<H::Surface>>>,
    config: EngineConfig,
    stats: Cell<RenderStats>,
    this: Weak<Self>,
}

/// Renders a root component into a host surface and keeps it up to date.
///
/// `Engine` is a shared handle; clones drive the same session.
pub struct Engine<H: HostSurface> {
    inner: Rc<EngineInner<H>>,
}

impl<H: HostSurface> Clone for Engine<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: HostSurface> fmt::Debug for Engine<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("mounted", &self.inner.mount.borrow().is_some())
            .field("session", &*self.inner.session.borrow())
            .field("stats", &self.inner.stats.get())
            .finish_non_exhaustive()
    }
}

impl<H: HostSurface + 'static> Engine<H> {
    /// Creates an engine with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    ///
    /// A `max_consecutive_passes` of zero is raised to one.
    pub fn with_config(host: H, mut config: EngineConfig) -> Self {
        if config.validate().is_err() {
            tracing::warn!("max-consecutive-passes must be at least 1; using 1");
            config.max_consecutive_passes = 1;
        }
        let inner = Rc::new_cyclic(|this: &Weak<EngineInner<H>>| EngineInner {
            host: RefCell::new(host),
            session: RefCell::new(Rc::new(Session::new(this.clone()))),
            mount: RefCell::new(None),
            config,
            stats: Cell::new(RenderStats::default()),
            this: this.clone(),
        });
        Self { inner }
    }

    /// Mounts `root` on `surface` and runs a pass, followed by any passes the
    /// pass itself scheduled.
    ///
    /// Hook state survives a second `render` call; use [`Self::unmount`] to
    /// start from scratch.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Reentrant`] when called from inside a pass, and
    /// otherwise the first error of any pass run. A failed pass leaves the
    /// surface as it was.
    pub fn render<F>(&self, root: F, surface: H::Surface) -> Result<(), RenderError>
    where
        F: Fn(&Hooks) -> anyhow::Result<Element> + 'static,
    {
        let session = self.inner.session();
        if session.in_pass() {
            return Err(RenderError::Reentrant);
        }
        let root = Component::new(short_type_name::<F>(), move |hooks, _props| root(hooks));
        tracing::debug!(root = root.name(), ?surface, "mounting");
        *self.inner.mount.borrow_mut() = Some(Mount { root, surface });
        session.request_pass();
        self.inner.run_passes()
    }

    /// Runs a pass against the recorded mount.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NotMounted`] before the first render or after
    /// an unmount, and otherwise behaves like [`Self::render`].
    pub fn rerender(&self) -> Result<(), RenderError> {
        let session = self.inner.session();
        if session.in_pass() {
            return Err(RenderError::Reentrant);
        }
        if self.inner.mount.borrow().is_none() {
            return Err(RenderError::NotMounted);
        }
        session.request_pass();
        self.inner.run_passes()
    }

    /// Forgets the mount and every hook slot. Setters handed out before this
    /// call fail with [`RenderError::Unmounted`].
    ///
    /// The host surface keeps showing the last committed node.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Reentrant`] when called from inside a pass.
    pub fn unmount(&self) -> Result<(), RenderError> {
        if self.inner.session().in_pass() {
            return Err(RenderError::Reentrant);
        }
        self.inner.mount.borrow_mut().take();
        *self.inner.session.borrow_mut() = Rc::new(Session::new(self.inner.this.clone()));
        tracing::debug!("unmounted");
        Ok(())
    }

    /// Whether a root is currently mounted.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mount.borrow().is_some()
    }

    /// The cursor left by the most recent pass: the number of hook calls the
    /// root made.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.inner.session().cursor()
    }

    /// Number of allocated hook slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.inner.session().slot_count()
    }

    /// Lifetime counters.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.inner.stats.get()
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Gives temporary access to the host.
    ///
    /// # Panics
    ///
    /// Panics if called from inside another `with_host` closure.
    pub fn with_host<R>(&self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.inner.host.borrow_mut())
    }
}

impl<H: HostSurface + 'static> EngineInner<H> {
    fn session(&self) -> Rc<Session> {
        Rc::clone(&self.session.borrow())
    }

    fn record(&self, update: impl FnOnce(&mut RenderStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    fn run_passes(&self) -> Result<(), RenderError> {
        let session = self.session();
        let limit = self.config.max_consecutive_passes;
        let mut passes = 0;
        while session.take_pending() {
            if passes == limit {
                session.clear_pending();
                tracing::warn!(limit, "state updates keep scheduling passes; giving up");
                return Err(RenderError::RenderLoop { limit });
            }
            passes += 1;
            if let Err(error) = self.pass(&session) {
                session.clear_pending();
                return Err(error);
            }
        }
        Ok(())
    }

    fn pass(&self, session: &Rc<Session>) -> Result<(), RenderError> {
        let mount = self
            .mount
            .borrow()
            .clone()
            .ok_or(RenderError::NotMounted)?;
        self.record(|stats| stats.passes += 1);
        let span = tracing::debug_span!(
            "render_pass",
            pass = self.stats.get().passes,
            root = mount.root.name()
        );
        let _entered = span.enter();

        session.begin_pass();
        let result = self.commit_and_flush(session, &mount);
        session.end_pass();
        result
    }

    fn commit_and_flush(
        &self,
        session: &Rc<Session>,
        mount: &Mount<H::Surface>,
    ) -> Result<(), RenderError> {
        let hooks = Hooks::new(Rc::clone(session));
        let element = mount
            .root
            .call(&hooks, &Props::default())
            .map_err(|source| RenderError::Component {
                component: mount.root.name().to_string(),
                source,
            })?;
        let element = self.resolve(&hooks, element)?;

        {
            let mut host = self
                .host
                .try_borrow_mut()
                .map_err(|_| RenderError::Reentrant)?;
            let node = build_node(&mut *host, &element)?;
            host.replace_content(&mount.surface, node)
                .map_err(RenderError::host)?;
        }
        self.record(|stats| stats.commits += 1);
        tracing::debug!(hooks = session.cursor(), "committed");

        self.flush(session, session.take_effects())
    }

    /// Replaces component descriptors by their output until a tag is reached.
    fn resolve(&self, hooks: &Hooks, mut element: Element) -> Result<Element, RenderError> {
        let limit = self.config.max_component_depth;
        let mut depth = 0;
        loop {
            let component = match element.kind() {
                Kind::Tag(_) => return Ok(element),
                Kind::Component(component) => component.clone(),
            };
            depth += 1;
            if depth > limit {
                return Err(RenderError::ComponentDepth { limit });
            }
            element = component
                .call(hooks, element.props())
                .map_err(|source| RenderError::Component {
                    component: component.name().to_string(),
                    source,
                })?;
        }
    }

    /// Runs the queued effects in order. Dependencies are persisted only for
    /// effects that actually get invoked; anything fail-fast skips is
    /// re-evaluated on the next pass.
    fn flush(&self, session: &Session, effects: Vec<QueuedEffect>) -> Result<(), RenderError> {
        let total = effects.len();
        tracing::debug!(effects = total, "flushing effects");
        for (index, effect) in effects.into_iter().enumerate() {
            session.commit_deps(effect.slot, effect.deps);
            match (effect.callback)() {
                Ok(()) => self.record(|stats| stats.effects_run += 1),
                Err(error) => {
                    self.record(|stats| stats.effects_failed += 1);
                    match self.config.effect_errors {
                        EffectErrorPolicy::Isolate => {
                            tracing::error!(effect = index, error = %error, "effect failed");
                        }
                        EffectErrorPolicy::FailFast => {
                            tracing::error!(
                                effect = index,
                                skipped = total - index - 1,
                                error = %error,
                                "effect failed; skipping the rest of the queue"
                            );
                            return Err(RenderError::Effect(error));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl<H: HostSurface + 'static> Rerender for EngineInner<H> {
    fn drive(&self) -> Result<(), RenderError> {
        self.run_passes()
    }
}

fn build_node<H: HostSurface>(host: &mut H, element: &Element) -> Result<H::Node, RenderError> {
    let tag = match element.kind() {
        Kind::Tag(tag) => tag,
        Kind::Component(component) => {
            return Err(RenderError::NestedComponent {
                component: component.name().to_string(),
            });
        }
    };
    let node = host.create_node(tag).map_err(RenderError::host)?;
    let props = element.props();
    if let Some(style) = props.style_map() {
        host.set_style_properties(&node, style)
            .map_err(RenderError::host)?;
    }
    for (key, value) in props.extra() {
        host.set_property(&node, key, value)
            .map_err(RenderError::host)?;
    }
    append_children(host, &node, props.child_list())?;
    Ok(node)
}

// Nested tags only contribute their text; they are not mounted as host nodes.
fn append_children<H: HostSurface>(
    host: &mut H,
    node: &H::Node,
    children: &[Child],
) -> Result<(), RenderError> {
    for child in children {
        match child {
            Child::Text(text) => host
                .append_text_content(node, text)
                .map_err(RenderError::host)?,
            Child::Element(element) => match element.kind() {
                Kind::Tag(_) => append_children(host, node, element.children())?,
                Kind::Component(component) => {
                    return Err(RenderError::NestedComponent {
                        component: component.name().to_string(),
                    });
                }
            },
        }
    }
    Ok(())
}

fn short_type_name<T>() -> &'static str {
    let name = core::any::type_name::<T>();
    name.split("::{{closure}}")
        .next()
        .and_then(|path| path.rsplit("::").next())
        .unwrap_or(name)
}

/// Builder for [`Engine`].
#[derive(Debug, Default, Clone)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Creates a builder with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the effect failure policy.
    #[must_use]
    pub const fn effect_errors(mut self, policy: EffectErrorPolicy) -> Self {
        self.config.effect_errors = policy;
        self
    }

    /// Bounds the passes one render or state update may run back to back.
    /// Zero is raised to one when the engine is built.
    #[must_use]
    pub const fn max_consecutive_passes(mut self, limit: usize) -> Self {
        self.config.max_consecutive_passes = limit;
        self
    }

    /// Bounds component-to-component resolution of a root descriptor.
    #[must_use]
    pub const fn max_component_depth(mut self, limit: usize) -> Self {
        self.config.max_component_depth = limit;
        self
    }

    /// Finalises the builder around `host`.
    pub fn build<H: HostSurface + 'static>(self, host: H) -> Engine<H> {
        Engine::with_config(host, self.config)
    }
}
