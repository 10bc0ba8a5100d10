//! The plugins the rich editor ships with.
//!
//! Each module bundles a feature's normalizer, renderers, toolbar items and
//! commands. [`PluginStack::standard`] assembles them with the structural
//! rules at the bottom of the stack.

pub mod equations;
pub mod formatting;
pub mod images;
pub mod links;
pub mod lists;
pub mod references;
pub mod shortcuts;
pub mod structure;
pub mod subsections;
pub mod tables;

pub use equations::EquationsPlugin;
pub use formatting::FormattingPlugin;
pub use images::ImagesPlugin;
pub use links::LinksPlugin;
pub use lists::ListsPlugin;
pub use references::ReferencesPlugin;
pub use shortcuts::ShortcutsPlugin;
pub use structure::StructurePlugin;
pub use subsections::SubsectionsPlugin;
pub use tables::TablesPlugin;

use crate::plugin::PluginStack;

impl PluginStack {
    /// Every standard plugin, structural rules first
    pub fn standard() -> Self {
        PluginStack::new()
            .with(StructurePlugin)
            .with(FormattingPlugin)
            .with(ListsPlugin)
            .with(TablesPlugin)
            .with(ImagesPlugin)
            .with(EquationsPlugin)
            .with(LinksPlugin)
            .with(ReferencesPlugin)
            .with(SubsectionsPlugin)
            .with(ShortcutsPlugin)
    }
}
