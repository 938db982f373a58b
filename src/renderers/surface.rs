//! The rendering surface: the container a diagram is inserted into.
//!
//! A [`Container`] holds the current SVG markup and one [`VisualNode`] per
//! `<g class="node" id="..">` group found in it. Interaction state (hover
//! class, click handler) lives on the visual node, so replacing or clearing
//! the content drops every handler along with the nodes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use regex::{Captures, Regex};

use super::svg::escape;
use crate::error::RenderError;

/// Callback invoked with the canonical step id of a clicked node.
pub type SelectHandler = Rc<dyn Fn(&str)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    Enter,
    Leave,
    Click,
}

// ─── VisualNode ──────────────────────────────────────────────────────────────

pub struct Interaction {
    pub step_id: String,
    pub hover_class: String,
    pub on_select: SelectHandler,
}

pub struct VisualNode {
    /// Element id, e.g. `flowchart-job-offer-3`.
    pub id: String,
    pub classes: Vec<String>,
    pub cursor: Option<String>,
    interaction: Option<Interaction>,
}

impl fmt::Debug for VisualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisualNode")
            .field("id", &self.id)
            .field("classes", &self.classes)
            .field("cursor", &self.cursor)
            .field("step_id", &self.step_id())
            .finish()
    }
}

impl VisualNode {
    fn new(id: &str, class_attr: &str) -> Self {
        Self {
            id: id.to_string(),
            classes: class_attr.split_whitespace().map(String::from).collect(),
            cursor: None,
            interaction: None,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// Step id of an interactive node.
    pub fn step_id(&self) -> Option<&str> {
        self.interaction.as_ref().map(|i| i.step_id.as_str())
    }

    pub fn is_interactive(&self) -> bool {
        self.interaction.is_some()
    }

    /// Live listeners on this node: enter, leave and click when interactive.
    pub fn listener_count(&self) -> usize {
        if self.is_interactive() { 3 } else { 0 }
    }

    pub fn make_interactive(&mut self, interaction: Interaction, interactive_class: &str) {
        self.cursor = Some("pointer".into());
        self.add_class(interactive_class);
        self.interaction = Some(interaction);
    }

    pub fn make_inert(&mut self, interactive_class: &str) {
        self.cursor = Some("default".into());
        self.remove_class(interactive_class);
        self.interaction = None;
    }
}

// ─── Container ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Container {
    markup: Option<String>,
    nodes: Vec<VisualNode>,
    error: Option<String>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Remove the surface, its nodes and their handlers.
    pub fn clear(&mut self) {
        self.markup = None;
        self.nodes.clear();
        self.error = None;
    }

    /// Replace the content with `svg`, discovering its node groups.
    pub fn insert(&mut self, svg: String) -> Result<usize, RenderError> {
        self.clear();
        let nodes = {
            let doc = roxmltree::Document::parse(&svg)
                .map_err(|e| RenderError::InvalidMarkup(e.to_string()))?;
            if !doc.root_element().has_tag_name("svg") {
                return Err(RenderError::InvalidMarkup(format!(
                    "root element is <{}>",
                    doc.root_element().tag_name().name()
                )));
            }
            doc.descendants()
                .filter(|n| n.has_tag_name("g"))
                .filter(|n| {
                    n.attribute("class")
                        .is_some_and(|c| c.split_whitespace().any(|c| c == "node"))
                })
                .filter_map(|n| Some(VisualNode::new(n.attribute("id")?, n.attribute("class")?)))
                .collect::<Vec<_>>()
        };
        let count = nodes.len();
        self.nodes = nodes;
        self.markup = Some(svg);
        Ok(count)
    }

    /// Replace the content with an inline error element.
    pub fn show_error(&mut self, message: &str) {
        self.clear();
        self.error = Some(message.to_string());
    }

    pub fn has_surface(&self) -> bool {
        self.markup.is_some()
    }

    /// The SVG as inserted, before any class changes.
    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// What the container currently displays.
    pub fn inner_html(&self) -> String {
        match (&self.markup, &self.error) {
            (Some(_), _) => self.to_svg().unwrap_or_default(),
            (None, Some(message)) => {
                format!(r#"<div class="flowchart-error">{}</div>"#, escape(message))
            }
            (None, None) => String::new(),
        }
    }

    pub fn nodes(&self) -> &[VisualNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [VisualNode] {
        &mut self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut VisualNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn listener_count(&self) -> usize {
        self.nodes.iter().map(VisualNode::listener_count).sum()
    }

    /// Current markup with each node group's `class` attribute reflecting
    /// its present classes.
    pub fn to_svg(&self) -> Option<String> {
        let markup = self.markup.as_deref()?;
        let Ok(group) = Regex::new(r#"<g class="([^"]*)" id="([^"]*)""#) else {
            return Some(markup.to_string());
        };
        let out = group.replace_all(markup, |caps: &Captures<'_>| {
            let id = &caps[2];
            match self.nodes.iter().find(|n| escape(&n.id) == id) {
                Some(node) => {
                    format!(r#"<g class="{}" id="{id}""#, escape(&node.classes.join(" ")))
                }
                None => caps[0].to_string(),
            }
        });
        Some(out.into_owned())
    }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// Deliver `event` to the node with element id `id`. Returns false when no
/// live listener handled it. The click handler runs after the container
/// borrow is released, so it may restyle the container itself.
pub fn dispatch(container: &RefCell<Container>, id: &str, event: NodeEvent) -> bool {
    let click = {
        let mut c = container.borrow_mut();
        let Some(node) = c.node_mut(id) else {
            return false;
        };
        let Some(interaction) = node.interaction.as_ref() else {
            return false;
        };
        match event {
            NodeEvent::Enter => {
                let hover = interaction.hover_class.clone();
                node.add_class(&hover);
                None
            }
            NodeEvent::Leave => {
                let hover = interaction.hover_class.clone();
                node.remove_class(&hover);
                None
            }
            NodeEvent::Click => Some((
                Rc::clone(&interaction.on_select),
                interaction.step_id.clone(),
            )),
        }
    };
    if let Some((on_select, step_id)) = click {
        on_select(&step_id);
    }
    true
}
