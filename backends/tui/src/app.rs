use rivulet_core::{Element, Engine, EngineConfig, Hooks, RenderStats};

use crate::{
    error::TuiError,
    host::{Screen, TerminalHost},
    renderer::RenderFrame,
    terminal::Terminal,
};

/// Entry point for running Rivulet components in the terminal.
#[derive(Debug, Clone)]
pub struct TuiApp {
    engine: Engine<TerminalHost>,
}

impl TuiApp {
    /// Mounts `root` on the screen and paints it.
    ///
    /// # Errors
    ///
    /// Returns an error when a pass fails or the terminal cannot be written to.
    pub fn render<F>(&self, root: F) -> Result<(), TuiError>
    where
        F: Fn(&Hooks) -> anyhow::Result<Element> + 'static,
    {
        self.engine.render(root, Screen)?;
        Ok(())
    }

    /// Repaints the mounted component.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing is mounted or the pass fails.
    pub fn rerender(&self) -> Result<(), TuiError> {
        self.engine.rerender()?;
        Ok(())
    }

    /// The frame currently on screen.
    #[must_use]
    pub fn frame(&self) -> Option<RenderFrame> {
        self.engine.with_host(|host| host.last_frame().cloned())
    }

    /// Returns the buffered output when the terminal was created via
    /// [`Terminal::buffered`].
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.engine.with_host(|host| {
            host.terminal()
                .snapshot()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        })
    }

    /// Lifetime counters of the underlying engine.
    #[must_use]
    pub fn stats(&self) -> RenderStats {
        self.engine.stats()
    }

    /// Provides access to the engine, e.g. to hand it to event handlers.
    #[must_use]
    pub const fn engine(&self) -> &Engine<TerminalHost> {
        &self.engine
    }
}

/// Builder for [`TuiApp`] instances.
#[derive(Debug, Default)]
pub struct TuiAppBuilder {
    terminal: Option<Terminal>,
    config: EngineConfig,
}

impl TuiAppBuilder {
    /// Creates a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the terminal handle used by the application.
    #[must_use]
    pub fn with_terminal(mut self, terminal: Terminal) -> Self {
        self.terminal = Some(terminal);
        self
    }

    /// Replaces the engine configuration.
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Consumes the builder and produces a [`TuiApp`].
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialised.
    pub fn build(self) -> Result<TuiApp, TuiError> {
        let terminal = match self.terminal {
            Some(terminal) => terminal,
            None => Terminal::stdout()?,
        };
        let engine = Engine::with_config(TerminalHost::new(terminal), self.config);
        Ok(TuiApp { engine })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rivulet_core::{Props, children, create_element, deps};

    fn buffered_app() -> TuiApp {
        TuiAppBuilder::new()
            .with_terminal(Terminal::buffered())
            .build()
            .expect("building app should succeed")
    }

    #[test]
    fn render_into_buffer() {
        let app = buffered_app();
        app.render(|_| Ok(create_element("p", Props::new(), children!["Hello TUI"])))
            .expect("rendering should succeed");
        let snapshot = app.snapshot().expect("buffered terminal");
        assert!(snapshot.contains("Hello TUI"));
    }

    #[test]
    fn effects_repaint_the_screen() {
        let app = buffered_app();
        app.render(|hooks| {
            let (count, set_count) = hooks.use_state(0_i64);
            hooks.use_effect(move || Ok(set_count.set(41)?), deps![]);
            Ok(create_element(
                "p",
                Props::new().style("color", "green"),
                children!["answer: ", count + 1],
            ))
        })
        .expect("rendering should succeed");

        assert_eq!(app.snapshot().as_deref(), Some("answer: 42"));
        assert_eq!(app.stats().commits, 2);
        let frames = app.engine().with_host(|host| host.terminal().frames());
        assert_eq!(frames, 2);
    }

    #[test]
    fn invalid_styles_surface_as_render_errors() {
        let app = buffered_app();
        let error = app
            .render(|_| {
                Ok(create_element(
                    "p",
                    Props::new().style("color", "not-a-color"),
                    children!["x"],
                ))
            })
            .expect_err("terminal host rejects the color");
        assert!(matches!(error, TuiError::Render(_)));
        assert!(app.frame().is_none());
    }
}
