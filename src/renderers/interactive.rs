//! Interactive flowchart rendering.
//!
//! A render cycle runs in a fixed order: clear the container, await the
//! generator, insert the markup, attach interactivity, apply the current
//! selection. Selection changes take a separate path that only restyles the
//! nodes already on the surface and never reaches the generator.
//!
//! Overlapping cycles are not cancelled. Each one clears and repopulates the
//! same container, so the cycle that inserts last wins, and inserting drops
//! the nodes (and handlers) of any earlier cycle.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use regex::Regex;
use tracing::{debug, error, warn};

use super::surface::{Container, Interaction, SelectHandler};
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::model::{Step, StepRegistry};

// ─── DiagramGenerator ────────────────────────────────────────────────────────

/// Turns diagram text into SVG markup.
#[allow(async_fn_in_trait)]
pub trait DiagramGenerator {
    async fn generate(&self, render_id: &str, source: &str) -> Result<String, RenderError>;
}

// ─── Render cycle steps ──────────────────────────────────────────────────────

/// Clear `container`, generate and insert. Failures are logged and shown as
/// the inline error element; they never propagate.
pub async fn render<G: DiagramGenerator + ?Sized>(
    container: &RefCell<Container>,
    generator: &G,
    render_id: &str,
    source: &str,
    config: &RenderConfig,
) {
    container.borrow_mut().clear();
    let inserted = match generator.generate(render_id, source).await {
        Ok(svg) => container.borrow_mut().insert(svg),
        Err(e) => Err(e),
    };
    match inserted {
        Ok(count) => debug!(render_id, nodes = count, "diagram rendered"),
        Err(e) => {
            error!(render_id, error = %e, "error rendering flowchart");
            container.borrow_mut().show_error(&config.error_message);
        }
    }
}

/// Regex recovering the step id from `{prefix}-{stepId}-{n}`.
pub fn step_id_pattern(prefix: &str) -> Result<Regex, RenderError> {
    Regex::new(&format!(r"^{}-(.+?)-\d+$", regex::escape(prefix)))
        .map_err(|e| RenderError::Generation(e.to_string()))
}

pub fn recover_step_id<'a>(pattern: &Regex, element_id: &'a str) -> Option<&'a str> {
    pattern
        .captures(element_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Mark nodes whose recovered id is a known step as interactive; every
/// other node is inert. Returns the number of interactive nodes.
pub fn attach_interactivity(
    container: &mut Container,
    steps: StepRegistry<'_>,
    on_select: SelectHandler,
    config: &RenderConfig,
) -> Result<usize, RenderError> {
    if !container.has_surface() {
        return Err(RenderError::SurfaceMissing);
    }
    let pattern = step_id_pattern(&config.node_id_prefix)?;
    let mut interactive = 0;
    for node in container.nodes_mut() {
        let step_id = recover_step_id(&pattern, &node.id)
            .filter(|id| steps.contains(id))
            .map(String::from);
        match step_id {
            Some(step_id) => {
                node.make_interactive(
                    Interaction {
                        step_id,
                        hover_class: config.hover_class.clone(),
                        on_select: Rc::clone(&on_select),
                    },
                    &config.interactive_class,
                );
                interactive += 1;
            }
            None => node.make_inert(&config.interactive_class),
        }
    }
    Ok(interactive)
}

/// Toggle the selected class on the nodes already on the surface.
pub fn apply_selection(container: &mut Container, selected: Option<&str>, config: &RenderConfig) {
    for node in container.nodes_mut() {
        let on = selected.is_some() && node.step_id() == selected;
        node.toggle_class(&config.selected_class, on);
    }
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// The selected step. A host-supplied value (`Controlled`) overrides clicks;
/// without one, clicks drive the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Controlled(Option<String>),
    Uncontrolled(Option<String>),
}

impl Default for Selection {
    fn default() -> Self {
        Self::Uncontrolled(None)
    }
}

impl Selection {
    pub fn current(&self) -> Option<&str> {
        match self {
            Self::Controlled(s) | Self::Uncontrolled(s) => s.as_deref(),
        }
    }

    pub fn is_controlled(&self) -> bool {
        matches!(self, Self::Controlled(_))
    }

    /// Record a click. Returns true when the selection changed.
    pub fn click(&mut self, step_id: &str) -> bool {
        match self {
            Self::Controlled(_) => false,
            Self::Uncontrolled(s) => {
                let changed = s.as_deref() != Some(step_id);
                *s = Some(step_id.to_string());
                changed
            }
        }
    }
}

// ─── InteractiveRenderer ─────────────────────────────────────────────────────

/// Owns one container and keeps it in sync with a program's diagram and
/// the selected step.
pub struct InteractiveRenderer<G> {
    generator: G,
    container: Rc<RefCell<Container>>,
    config: RenderConfig,
    program_id: String,
    steps: Rc<Vec<Step>>,
    selection: Rc<RefCell<Selection>>,
    on_step_select: SelectHandler,
    cycle: Cell<u64>,
}

impl<G: DiagramGenerator> InteractiveRenderer<G> {
    pub fn new(
        generator: G,
        container: Rc<RefCell<Container>>,
        program_id: impl Into<String>,
        steps: Vec<Step>,
        on_step_select: SelectHandler,
    ) -> Self {
        Self {
            generator,
            container,
            config: RenderConfig::default(),
            program_id: program_id.into(),
            steps: Rc::new(steps),
            selection: Rc::new(RefCell::new(Selection::default())),
            on_step_select,
            cycle: Cell::new(0),
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn container(&self) -> &Rc<RefCell<Container>> {
        &self.container
    }

    pub fn selection(&self) -> Selection {
        self.selection.borrow().clone()
    }

    /// Render id of the most recently started cycle.
    pub fn render_id(&self) -> String {
        format!(
            "{}-{}-{}",
            self.config.node_id_prefix,
            self.program_id,
            self.cycle.get()
        )
    }

    /// Run one render cycle for `source`. Returns whether a diagram is on
    /// the surface afterwards.
    pub async fn render_diagram(&self, source: &str) -> bool {
        self.cycle.set(self.cycle.get() + 1);
        let render_id = self.render_id();
        render(&self.container, &self.generator, &render_id, source, &self.config).await;

        let mut container = self.container.borrow_mut();
        let attached = attach_interactivity(
            &mut container,
            StepRegistry::new(&self.steps),
            self.click_handler(),
            &self.config,
        );
        match attached {
            Ok(count) => {
                debug!(%render_id, interactive = count, "interactivity attached");
                let selection = self.selection.borrow();
                apply_selection(&mut container, selection.current(), &self.config);
                true
            }
            Err(RenderError::SurfaceMissing) => false,
            Err(e) => {
                warn!(%render_id, error = %e, "cannot attach interactivity");
                false
            }
        }
    }

    /// Host-supplied selection. Restyles only.
    pub fn set_selected_step(&self, step_id: Option<&str>) {
        *self.selection.borrow_mut() = Selection::Controlled(step_id.map(String::from));
        self.restyle();
    }

    /// Drop the host override; clicks drive the selection from here on.
    pub fn release_selection(&self) {
        let current = self.selection.borrow().current().map(String::from);
        *self.selection.borrow_mut() = Selection::Uncontrolled(current);
    }

    fn restyle(&self) {
        let selection = self.selection.borrow();
        apply_selection(&mut self.container.borrow_mut(), selection.current(), &self.config);
    }

    fn click_handler(&self) -> SelectHandler {
        let selection = Rc::clone(&self.selection);
        let container: Weak<RefCell<Container>> = Rc::downgrade(&self.container);
        let host = Rc::clone(&self.on_step_select);
        let config = self.config.clone();
        Rc::new(move |step_id: &str| {
            host(step_id);
            if !selection.borrow_mut().click(step_id) {
                return;
            }
            if let Some(container) = container.upgrade() {
                let current = selection.borrow();
                apply_selection(&mut container.borrow_mut(), current.current(), &config);
            }
        })
    }
}
