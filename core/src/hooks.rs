//! State and effect hooks.
//!
//! A [`Hooks`] handle is passed to every component invocation. Each hook call
//! takes the next slot of the session's store, so a component must make the
//! same hook calls in the same order on every pass: calling a hook inside a
//! condition or a loop of varying length shifts every later slot.
//!
//! ```
//! use rivulet_core::{Engine, MemoryHost, Props, children, create_element, deps};
//!
//! let mut host = MemoryHost::new();
//! let surface = host.create_surface("app");
//! let engine = Engine::new(host);
//!
//! engine
//!     .render(
//!         |hooks| {
//!             let (count, set_count) = hooks.use_state(0_i64);
//!             hooks.use_effect(move || Ok(set_count.set(1)?), deps![]);
//!             Ok(create_element("p", Props::new(), children![count]))
//!         },
//!         surface,
//!     )
//!     .expect("render succeeds");
//!
//! let text = engine.with_host(|host| host.content(surface).map(|n| n.text_content().to_string()));
//! assert_eq!(text.as_deref(), Some("1"));
//! ```

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::marker::PhantomData;

use crate::error::RenderError;
use crate::store::{Deps, HookStore};
use crate::value::Value;

pub(crate) type EffectFn = Box<dyn FnOnce() -> anyhow::Result<()>>;

pub(crate) struct QueuedEffect {
    pub(crate) slot: usize,
    pub(crate) deps: Deps,
    pub(crate) callback: EffectFn,
}

impl fmt::Debug for QueuedEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedEffect")
            .field("slot", &self.slot)
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

/// Runs passes on behalf of a session whose state changed outside a pass.
pub(crate) trait Rerender {
    fn drive(&self) -> Result<(), RenderError>;
}

/// Per-mount render state: cursor, hook store, effect queue and scheduling.
pub(crate) struct Session {
    cursor: Cell<usize>,
    store: RefCell<HookStore>,
    effects: RefCell<Vec<QueuedEffect>>,
    pending: Cell<usize>,
    in_pass: Cell<bool>,
    driver: Weak<dyn Rerender>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("cursor", &self.cursor.get())
            .field("slots", &self.store.borrow().len())
            .field("queued_effects", &self.effects.borrow().len())
            .field("pending", &self.pending.get())
            .field("in_pass", &self.in_pass.get())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(driver: Weak<dyn Rerender>) -> Self {
        Self {
            cursor: Cell::new(0),
            store: RefCell::new(HookStore::default()),
            effects: RefCell::new(Vec::new()),
            pending: Cell::new(0),
            in_pass: Cell::new(false),
            driver,
        }
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor.get()
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.store.borrow().len()
    }

    pub(crate) fn in_pass(&self) -> bool {
        self.in_pass.get()
    }

    pub(crate) fn begin_pass(&self) {
        self.cursor.set(0);
        self.in_pass.set(true);
        self.effects.borrow_mut().clear();
    }

    pub(crate) fn end_pass(&self) {
        self.in_pass.set(false);
        self.effects.borrow_mut().clear();
    }

    pub(crate) fn request_pass(&self) {
        self.pending.set(self.pending.get() + 1);
    }

    /// Consumes one pending pass, if any.
    pub(crate) fn take_pending(&self) -> bool {
        let pending = self.pending.get();
        if pending == 0 {
            return false;
        }
        self.pending.set(pending - 1);
        true
    }

    pub(crate) fn clear_pending(&self) {
        self.pending.set(0);
    }

    /// Hands over the effects queued during the pass, in registration order.
    pub(crate) fn take_effects(&self) -> Vec<QueuedEffect> {
        core::mem::take(&mut *self.effects.borrow_mut())
    }

    /// Persists the dependency list of an effect that is about to run.
    pub(crate) fn commit_deps(&self, slot: usize, deps: Deps) {
        self.store.borrow_mut().commit_deps(slot, deps);
    }

    fn advance(&self) -> usize {
        let slot = self.cursor.get();
        self.cursor.set(slot + 1);
        slot
    }

    fn schedule(&self) -> Result<(), RenderError> {
        self.request_pass();
        if self.in_pass.get() {
            return Ok(());
        }
        match self.driver.upgrade() {
            Some(driver) => driver.drive(),
            None => {
                self.clear_pending();
                Err(RenderError::Unmounted)
            }
        }
    }
}

/// Hook entry points available to a component during one pass.
#[derive(Debug, Clone)]
pub struct Hooks {
    session: Rc<Session>,
}

impl Hooks {
    pub(crate) const fn new(session: Rc<Session>) -> Self {
        Self { session }
    }

    /// Declares a piece of state, initialized with `initial` on the first pass.
    ///
    /// Returns the value read during this pass and a setter bound to the slot.
    pub fn use_state<T>(&self, initial: T) -> (T, Setter<T>)
    where
        T: Clone + PartialEq + 'static,
    {
        self.use_state_with(move || initial)
    }

    /// Like [`Self::use_state`], but only computes the initial value when the
    /// slot is first allocated.
    pub fn use_state_with<T, F>(&self, init: F) -> (T, Setter<T>)
    where
        T: Clone + PartialEq + 'static,
        F: FnOnce() -> T,
    {
        let slot = self.session.advance();
        let value = self.session.store.borrow_mut().state(slot, init);
        let setter = Setter {
            session: Rc::downgrade(&self.session),
            slot,
            _marker: PhantomData,
        };
        (value, setter)
    }

    /// Registers an effect to run after this pass commits.
    ///
    /// With `deps` of `None` the effect runs on every pass. With a list, it
    /// runs on the first pass and whenever an element differs from the list
    /// seen when it last ran; `deps![]` therefore runs once.
    pub fn use_effect<F>(&self, callback: F, deps: Option<Vec<Value>>)
    where
        F: FnOnce() -> anyhow::Result<()> + 'static,
    {
        let slot = self.session.advance();
        let changed = self
            .session
            .store
            .borrow_mut()
            .effect_changed(slot, deps.as_deref());
        if !changed {
            return;
        }
        self.session.effects.borrow_mut().push(QueuedEffect {
            slot,
            deps,
            callback: Box::new(callback),
        });
    }

    /// Number of hook calls made so far in this pass.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.session.cursor()
    }
}

/// Updates one state slot and schedules a pass when the value changes.
pub struct Setter<T> {
    session: Weak<Session>,
    slot: usize,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            slot: self.slot,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter").field("slot", &self.slot).finish()
    }
}

impl<T: Clone + PartialEq + 'static> Setter<T> {
    /// The slot this setter writes to.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Stores `next`. Equal values are ignored; a different value schedules
    /// exactly one pass.
    ///
    /// Inside a pass the new pass starts once the current one has flushed its
    /// effects. Outside a pass it runs before `set` returns.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Unmounted`] once the mount is gone, or the error
    /// of a pass this call drove.
    pub fn set(&self, next: T) -> Result<(), RenderError> {
        let session = self.session.upgrade().ok_or(RenderError::Unmounted)?;
        if !session.store.borrow_mut().replace_state(self.slot, next) {
            tracing::trace!(slot = self.slot, "state unchanged; no pass scheduled");
            return Ok(());
        }
        tracing::debug!(slot = self.slot, "state changed; scheduling pass");
        session.schedule()
    }

    /// Derives the next value from the current one and stores it like
    /// [`Self::set`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::set`].
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<(), RenderError> {
        let session = self.session.upgrade().ok_or(RenderError::Unmounted)?;
        let current = session.store.borrow().peek_state::<T>(self.slot);
        drop(session);
        match current {
            Some(current) => self.set(f(&current)),
            None => Err(RenderError::Unmounted),
        }
    }
}
