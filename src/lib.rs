#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]

pub mod logging;

#[doc(inline)]
pub use rivulet_core::*;

pub mod prelude {
    //! Commonly used types for writing components.
    //!
    //! ```rust
    //! use rivulet::prelude::*;
    //!
    //! fn greeting(hooks: &Hooks) -> anyhow::Result<Element> {
    //!     let (name, _set_name) = hooks.use_state(String::from("world"));
    //!     Ok(create_element("p", Props::new(), children!["hello ", name]))
    //! }
    //! # let mut host = MemoryHost::new();
    //! # let surface = host.create_surface("root");
    //! # let engine = Engine::new(host);
    //! # engine.render(greeting, surface).unwrap();
    //! ```
    pub use rivulet_core::{
        Child, Component, EffectErrorPolicy, Element, Engine, EngineBuilder, EngineConfig, Hooks,
        HostSurface, MemoryHost, Props, RenderError, Setter, Text, Value, children,
        create_element, deps,
    };
}
