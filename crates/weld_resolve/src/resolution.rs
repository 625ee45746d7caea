//! Resolution records and the finalized, read-only program view.

use std::collections::HashMap;

use weld_common::{Ident, Interner};
use weld_ir::{Arena, IrModule, ModuleId};

/// The cross-module resolution state of one global symbol name.
///
/// There is at most one record per name, and `prevailing` is stable once
/// the registry is finalized. A symbol observed only through references has
/// `prevailing: None` and is left for the linker's own resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionRecord {
    /// The module whose definition was selected as authoritative, or `None`
    /// if the symbol is undefined in every module.
    pub prevailing: Option<ModuleId>,

    /// `true` if any non-IR input references this symbol. The prevailing
    /// definition must then keep external visibility through optimization.
    pub visible_outside_ir: bool,
}

/// The resolution decision for one symbol descriptor of one module.
///
/// Views are aligned with the module's descriptor order, mirroring how the
/// descriptors were ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolResolution {
    /// `true` if this module's copy is the authoritative definition.
    pub prevailing: bool,

    /// `true` if the symbol must stay externally visible after optimization
    /// because non-IR input references it.
    pub visible_outside_ir: bool,
}

/// The finalized whole program: all registered modules plus their
/// resolution views, read-only for the rest of the link.
///
/// Produced by [`ResolutionRegistry::finalize`](crate::ResolutionRegistry::finalize);
/// since finalize consumes the registry, no further registration is
/// possible once a `ResolvedProgram` exists.
pub struct ResolvedProgram {
    pub(crate) interner: Interner,
    pub(crate) modules: Arena<ModuleId, IrModule>,
    pub(crate) records: HashMap<Ident, ResolutionRecord>,
    /// Per-module resolution views, indexed by raw module ID, aligned with
    /// each module's descriptor order.
    pub(crate) views: Vec<Vec<SymbolResolution>>,
}

impl ResolvedProgram {
    /// Returns the module with the given ID.
    pub fn module(&self, id: ModuleId) -> &IrModule {
        &self.modules[id]
    }

    /// Iterates over `(ModuleId, &IrModule)` in registration order.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &IrModule)> {
        self.modules.iter()
    }

    /// Returns the number of registered modules.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Returns the resolution view for a module, aligned with its
    /// descriptor order.
    pub fn resolutions(&self, id: ModuleId) -> &[SymbolResolution] {
        &self.views[id.as_raw() as usize]
    }

    /// Looks up the resolution record for a global symbol name.
    ///
    /// Returns `None` for names never observed in any module descriptor
    /// (including symbols referenced only from native code).
    pub fn record(&self, name: &str) -> Option<ResolutionRecord> {
        let ident = self.interner.get(name)?;
        self.records.get(&ident).copied()
    }

    /// Returns the module owning the prevailing definition of `name`, if any.
    pub fn prevailing_module(&self, name: &str) -> Option<ModuleId> {
        self.record(name)?.prevailing
    }
}
