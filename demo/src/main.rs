//! Interactive counter: `+`/`-` change the count, `r` resets it, `q` quits.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use rivulet::prelude::*;
use rivulet_tui::TuiAppBuilder;
use tracing::level_filters::LevelFilter;

type SharedSetter = Rc<RefCell<Option<Setter<i64>>>>;

fn counter(hooks: &Hooks, setter: &SharedSetter) -> anyhow::Result<Element> {
    let (count, set_count) = hooks.use_state(0_i64);
    let (renders, set_renders) = hooks.use_state(0_u32);

    let slot = Rc::clone(setter);
    hooks.use_effect(
        move || {
            slot.borrow_mut().replace(set_count);
            Ok(())
        },
        deps![],
    );
    hooks.use_effect(
        move || {
            tracing::debug!(count, "count changed");
            Ok(())
        },
        deps![count],
    );
    hooks.use_effect(move || Ok(set_renders.set(renders.saturating_add(1))?), deps![count]);

    let color = if count < 0 { "red" } else { "green" };
    Ok(create_element(
        "h1",
        Props::new().style("color", color),
        children![
            "Rivulet counter\n\n",
            "count: ",
            count,
            "\nrenders: ",
            renders,
            "\n\n[+] increment  [-] decrement  [r] reset  [q] quit",
        ],
    ))
}

fn main() -> anyhow::Result<()> {
    // Log lines share the terminal with the frame; keep them rare.
    rivulet::logging::set_default_level(LevelFilter::WARN);
    rivulet::logging::install_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(Path::new(&path))?,
        None => EngineConfig::default(),
    };
    let app = TuiAppBuilder::new()
        .with_config(config)
        .build()
        .context("failed to initialise the terminal")?;

    let setter: SharedSetter = Rc::default();
    let shared = Rc::clone(&setter);
    app.render(move |hooks| counter(hooks, &shared))?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let Some(set_count) = setter.borrow().clone() else {
            continue;
        };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('+' | '=') | KeyCode::Up => set_count.update(|count| count + 1)?,
            KeyCode::Char('-') | KeyCode::Down => set_count.update(|count| count - 1)?,
            KeyCode::Char('r') => set_count.set(0)?,
            _ => {}
        }
    }

    tracing::info!(stats = ?app.stats(), "exiting");
    Ok(())
}
