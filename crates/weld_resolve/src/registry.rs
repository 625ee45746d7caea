//! The registration-order symbol resolution registry.

use std::collections::{HashMap, HashSet};

use weld_common::{Ident, InternalError, Interner, WeldResult};
use weld_ir::{Arena, IrModule, ModuleId};

use crate::resolution::{ResolutionRecord, ResolvedProgram, SymbolResolution};

/// Accumulates input modules and computes per-symbol resolutions.
///
/// Modules are registered one at a time; the registry takes ownership of
/// each and updates its resolution records incrementally. Once every module
/// is in, [`finalize`](Self::finalize) consumes the registry and returns
/// the read-only [`ResolvedProgram`] — the type system rules out
/// registration after finalization.
///
/// Tie-break: a module's copy of a symbol prevails iff the copy is not
/// undefined and no earlier-registered module offered a non-undefined copy.
/// A later conflicting definition is never selected; this layer does not
/// diagnose multiple-definition errors (that is the front-end's and the
/// linker's job), it only picks a winner deterministically.
pub struct ResolutionRegistry {
    interner: Interner,
    modules: Arena<ModuleId, IrModule>,
    records: HashMap<Ident, ResolutionRecord>,
    module_names: HashSet<String>,
}

impl ResolutionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            modules: Arena::new(),
            records: HashMap::new(),
            module_names: HashSet::new(),
        }
    }

    /// Registers a module, ingesting its symbol descriptors.
    ///
    /// Duplicate module identities must be rejected by the caller before
    /// registration; encountering one here is an internal error, as is any
    /// other violation of the registration contract.
    ///
    /// `visible_outside_ir` accumulates as the OR across all registered
    /// modules, so it is complete before any prevailing choice is read —
    /// the flag changes whether the winning definition may be internalized
    /// during optimization.
    pub fn register(&mut self, module: IrModule) -> WeldResult<ModuleId> {
        if !self.module_names.insert(module.name.clone()) {
            return Err(InternalError::new(format!(
                "duplicate module identity '{}' reached the registry",
                module.name
            )));
        }

        let id = ModuleId::from_raw(self.modules.len() as u32);
        for sym in &module.symbols {
            let ident = self.interner.get_or_intern(&sym.name);
            let record = self.records.entry(ident).or_insert(ResolutionRecord {
                prevailing: None,
                visible_outside_ir: false,
            });
            record.visible_outside_ir |= sym.used_in_native;
            if record.prevailing.is_none() && sym.def.is_definition() {
                record.prevailing = Some(id);
            }
        }

        let allocated = self.modules.alloc(module);
        debug_assert_eq!(allocated, id);
        Ok(id)
    }

    /// Returns the number of modules registered so far.
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Finalizes resolution and transitions to the read-only program view.
    ///
    /// Builds, for every module, a resolution view aligned with its
    /// descriptor order: a descriptor is prevailing iff it is a definition
    /// and its module won the tie-break for that name.
    pub fn finalize(self) -> ResolvedProgram {
        let views = self
            .modules
            .iter()
            .map(|(id, module)| {
                module
                    .symbols
                    .iter()
                    .map(|sym| {
                        // Every name was interned during registration.
                        let ident = self.interner.get_or_intern(&sym.name);
                        let record = &self.records[&ident];
                        SymbolResolution {
                            prevailing: sym.def.is_definition()
                                && record.prevailing == Some(id),
                            visible_outside_ir: record.visible_outside_ir,
                        }
                    })
                    .collect()
            })
            .collect();

        ResolvedProgram {
            interner: self.interner,
            modules: self.modules,
            records: self.records,
            views,
        }
    }
}

impl Default for ResolutionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
