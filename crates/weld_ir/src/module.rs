//! Input modules and their symbol descriptors.
//!
//! An [`IrModule`] is one independently compiled IR unit as handed over by
//! the front-end: a stable name, a reference to the file it came from, and
//! an ordered list of [`SymbolDescriptor`]s. Modules are immutable once
//! registered; resolution state lives in the registry, never in the module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a symbol appears inside one particular module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Definedness {
    /// The module carries a full definition for this symbol.
    Defined,
    /// The module carries a tentative (common) definition that a strong
    /// definition elsewhere may override at link time.
    Tentative,
    /// The module only references the symbol; the definition lives elsewhere.
    Undefined,
}

impl Definedness {
    /// Returns `true` if this is any kind of definition (full or tentative),
    /// i.e. it can be selected as the prevailing copy.
    pub fn is_definition(self) -> bool {
        !matches!(self, Definedness::Undefined)
    }
}

/// A symbol as seen from inside one module.
///
/// The descriptor order within a module is meaningful: resolution views are
/// returned aligned with it, and it feeds the task fingerprint in order.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SymbolDescriptor {
    /// The global symbol name.
    pub name: String,

    /// Whether this module defines, tentatively defines, or only references
    /// the symbol.
    pub def: Definedness,

    /// `true` if the symbol is also referenced from machine-code-level
    /// (non-IR) input. A prevailing definition with this flag set must stay
    /// externally visible after optimization.
    pub used_in_native: bool,

    /// Opaque IR fragment for the symbol's body. Empty for undefined
    /// symbols; the driver never interprets these bytes, it only hashes
    /// them and passes them through to the codegen engine.
    pub ir: Vec<u8>,
}

impl SymbolDescriptor {
    /// Creates a descriptor for a symbol this module fully defines.
    pub fn defined(name: impl Into<String>, ir: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            def: Definedness::Defined,
            used_in_native: false,
            ir: ir.into(),
        }
    }

    /// Creates a descriptor for a tentative (common) definition.
    pub fn tentative(name: impl Into<String>, ir: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            def: Definedness::Tentative,
            used_in_native: false,
            ir: ir.into(),
        }
    }

    /// Creates a descriptor for a symbol this module only references.
    pub fn undefined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            def: Definedness::Undefined,
            used_in_native: false,
            ir: Vec::new(),
        }
    }

    /// Marks the symbol as also referenced from non-IR input.
    pub fn used_in_native(mut self) -> Self {
        self.used_in_native = true;
        self
    }
}

/// One independently compiled IR input unit.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct IrModule {
    /// Stable module identity. Duplicate names across one link are rejected
    /// before registration.
    pub name: String,

    /// The file this module was loaded from.
    pub source_path: PathBuf,

    /// Exported and imported symbols, in the front-end's emission order.
    pub symbols: Vec<SymbolDescriptor>,
}

impl IrModule {
    /// Creates a module from its parts.
    pub fn new(
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        symbols: Vec<SymbolDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            symbols,
        }
    }

    /// Returns `true` if the module offers at least one definition
    /// (full or tentative) of any symbol.
    pub fn has_definitions(&self) -> bool {
        self.symbols.iter().any(|s| s.def.is_definition())
    }
}
