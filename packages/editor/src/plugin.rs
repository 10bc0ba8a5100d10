//! # Plugin Pipeline
//!
//! A plugin contributes any of: a normalizer, element renderers, toolbar
//! items, a key handler, side-channel modals and a change observer.
//!
//! Plugins are assembled from an ordered [`PluginStack`]; **later entries take
//! precedence**:
//!
//! - normalizers run last-registered first, and the first one that handles a
//!   path stops the chain for it
//! - a renderer registered for a type another plugin already claimed replaces
//!   it; every collision is recorded and logged
//! - key handlers run in registration order until one prevents the default
//!
//! The core plugin sits at the bottom of the stack so every feature plugin can
//! see a node before the generic structural rules do.

use std::collections::HashMap;
use std::rc::Rc;

use folio_model::{ElementType, Path};
use tracing::{trace, warn};

use crate::keys::KeyEvent;
use crate::normalize::{NodeRef, NormalizeContext, Normalizer};
use crate::operations::Operation;
use crate::render::ElementRenderer;
use crate::side_channel::Modals;
use crate::toolbar::ToolbarItem;
use crate::{Editor, EditorResult};

pub trait Plugin {
    fn name(&self) -> &'static str;

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        None
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        Vec::new()
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        Vec::new()
    }

    /// Install this plugin's side channels
    fn attach(&self, _modals: &mut Modals) {}

    /// Default handler: run the toolbar action whose hotkey matches
    fn on_key_down(&self, event: &mut KeyEvent, editor: &mut Editor) -> EditorResult<()> {
        run_matching_hotkey(&self.toolbar(), event, editor)
    }

    /// Called once per flush with the operations applied since the last one
    fn on_change(&self, _editor: &mut Editor, _operations: &[Operation]) {}
}

/// Run the first toolbar action bound to the pressed chord
pub fn run_matching_hotkey(
    items: &[ToolbarItem],
    event: &mut KeyEvent,
    editor: &mut Editor,
) -> EditorResult<()> {
    let Some(item) = items
        .iter()
        .find(|item| item.hotkey.as_ref().is_some_and(|hotkey| hotkey.matches(event)))
    else {
        return Ok(());
    };
    event.prevent_default();
    trace!(item = item.id, "Hotkey matched");
    editor.run_action(&item.action)
}

/// Ordered plugin list; later entries take precedence
#[derive(Clone, Default)]
pub struct PluginStack {
    plugins: Vec<Rc<dyn Plugin>>,
}

impl PluginStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, plugin: impl Plugin + 'static) -> Self {
        self.push(plugin);
        self
    }

    pub fn push(&mut self, plugin: impl Plugin + 'static) {
        self.plugins.push(Rc::new(plugin));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rc<dyn Plugin>> {
        self.plugins.iter()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }
}

/// A renderer that replaced an earlier plugin's renderer for the same type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCollision {
    pub kind: ElementType,
    pub replaced: &'static str,
    pub by: &'static str,
}

/// The assembled view of a [`PluginStack`]
pub struct PluginRegistry {
    plugins: Vec<Rc<dyn Plugin>>,
    normalizers: Vec<(&'static str, Rc<dyn Normalizer>)>,
    renderers: HashMap<ElementType, (&'static str, Rc<dyn ElementRenderer>)>,
    collisions: Vec<RendererCollision>,
    toolbar: Vec<ToolbarItem>,
}

impl PluginRegistry {
    pub fn build(stack: &PluginStack) -> Self {
        let mut registry = PluginRegistry {
            plugins: Vec::new(),
            normalizers: Vec::new(),
            renderers: HashMap::new(),
            collisions: Vec::new(),
            toolbar: Vec::new(),
        };

        for plugin in stack.iter() {
            let name = plugin.name();

            if let Some(normalizer) = plugin.normalizer() {
                registry.normalizers.push((name, normalizer));
            }

            for (kind, renderer) in plugin.renderers() {
                if let Some(&(replaced, _)) = registry.renderers.get(&kind) {
                    warn!(kind = %kind, replaced, by = name, "Renderer collision; later plugin wins");
                    registry.collisions.push(RendererCollision {
                        kind: kind.clone(),
                        replaced,
                        by: name,
                    });
                }
                registry.renderers.insert(kind, (name, renderer));
            }

            for item in plugin.toolbar() {
                if let Some(hotkey) = &item.hotkey {
                    let taken = registry
                        .toolbar
                        .iter()
                        .any(|existing| existing.hotkey.as_ref() == Some(hotkey));
                    if taken {
                        warn!(hotkey = %hotkey, item = item.id, "Hotkey already bound by an earlier item");
                    }
                }
                registry.toolbar.push(item);
            }

            registry.plugins.push(plugin.clone());
        }

        registry
    }

    pub fn plugins(&self) -> &[Rc<dyn Plugin>] {
        &self.plugins
    }

    /// Run the normalizer chain, last registered first
    pub fn normalize_node(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        for (name, normalizer) in self.normalizers.iter().rev() {
            if normalizer.normalize(entry, path, cx) {
                trace!(plugin = *name, path = %path, "Path handled");
                return true;
            }
        }
        false
    }

    pub fn renderer(&self, kind: &ElementType) -> Option<&dyn ElementRenderer> {
        self.renderers.get(kind).map(|(_, renderer)| renderer.as_ref())
    }

    /// Name of the plugin whose renderer is active for `kind`
    pub fn renderer_owner(&self, kind: &ElementType) -> Option<&'static str> {
        self.renderers.get(kind).map(|(name, _)| *name)
    }

    pub fn collisions(&self) -> &[RendererCollision] {
        &self.collisions
    }

    pub fn toolbar(&self) -> &[ToolbarItem] {
        &self.toolbar
    }

    pub fn attach(&self, modals: &mut Modals) {
        for plugin in &self.plugins {
            plugin.attach(modals);
        }
    }
}
