//! The built-in deterministic object emitter.
//!
//! Weld treats the module-level optimizer as an opaque service; this
//! emitter is the concrete engine the CLI links with. It applies the
//! resolution decisions — keeps prevailing definitions, drops copies that
//! lost the tie-break, demotes them to external references, and marks
//! which survivors must stay visible to non-IR code — and packs the result
//! into a `WOBJ` container. The output depends only on the task's input,
//! so it is safe to cache and to run at any job limit.

use serde::{Deserialize, Serialize};
use weld_backend::{CodegenEngine, CodegenInput, EngineError};

/// Magic bytes identifying a Weld native object container.
const OBJECT_MAGIC: [u8; 4] = *b"WOBJ";

/// Current object container format version.
const OBJECT_FORMAT_VERSION: u32 = 1;

/// One symbol surviving in a generated object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSymbol {
    /// The global symbol name.
    pub name: String,

    /// `true` if the symbol must stay externally visible because non-IR
    /// input references it; `false` means it was internalized.
    pub exported: bool,

    /// The symbol's code, carried through from its IR fragment.
    pub code: Vec<u8>,
}

/// The `WOBJ` container layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeObject {
    /// Magic bytes: must be `b"WOBJ"`.
    pub magic: [u8; 4],

    /// Container format version.
    pub format_version: u32,

    /// Name of the module partition this object was generated from.
    pub module: String,

    /// Target triple the object was generated for.
    pub triple: String,

    /// Optimization level the object was generated at.
    pub opt_level: u8,

    /// Definitions that prevailed in this partition, in descriptor order.
    pub symbols: Vec<ObjectSymbol>,

    /// Names this partition references but does not define: undefined
    /// symbols plus definitions demoted to references by the tie-break.
    /// Sorted and deduplicated.
    pub externals: Vec<String>,
}

impl NativeObject {
    /// Decodes a `WOBJ` container from bytes, for inspection and tests.
    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        let object: NativeObject =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| EngineError::new(format!("undecodable object: {e}")))?
                .0;
        if object.magic != OBJECT_MAGIC {
            return Err(EngineError::new("not a WOBJ container"));
        }
        Ok(object)
    }
}

/// The default codegen engine: deterministic IR-to-container emission.
pub struct IrObjectEngine;

impl CodegenEngine for IrObjectEngine {
    fn generate(&self, input: &CodegenInput<'_>) -> Result<Vec<u8>, EngineError> {
        let mut symbols = Vec::new();
        let mut externals = Vec::new();

        for (sym, res) in input.module.symbols.iter().zip(input.resolutions) {
            if res.prevailing {
                symbols.push(ObjectSymbol {
                    name: sym.name.clone(),
                    exported: res.visible_outside_ir,
                    code: sym.ir.clone(),
                });
            } else {
                externals.push(sym.name.clone());
            }
        }
        externals.sort();
        externals.dedup();

        let object = NativeObject {
            magic: OBJECT_MAGIC,
            format_version: OBJECT_FORMAT_VERSION,
            module: input.module.name.clone(),
            triple: input.target.triple.clone(),
            opt_level: input.target.opt_level,
            symbols,
            externals,
        };
        bincode::serde::encode_to_vec(&object, bincode::config::standard())
            .map_err(|e| EngineError::new(format!("object encoding failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weld_ir::{IrModule, SymbolDescriptor, TargetOptions, TaskId};
    use weld_resolve::SymbolResolution;

    fn input<'a>(
        module: &'a IrModule,
        resolutions: &'a [SymbolResolution],
        target: &'a TargetOptions,
    ) -> CodegenInput<'a> {
        CodegenInput {
            task: TaskId::from_raw(0),
            module,
            resolutions,
            target,
        }
    }

    #[test]
    fn prevailing_definitions_survive() {
        let module = IrModule::new(
            "a",
            "a.wir",
            vec![
                SymbolDescriptor::defined("f", b"f-code".to_vec()),
                SymbolDescriptor::undefined("g"),
            ],
        );
        let resolutions = vec![
            SymbolResolution {
                prevailing: true,
                visible_outside_ir: false,
            },
            SymbolResolution {
                prevailing: false,
                visible_outside_ir: false,
            },
        ];
        let target = TargetOptions::default();

        let bytes = IrObjectEngine
            .generate(&input(&module, &resolutions, &target))
            .unwrap();
        let object = NativeObject::decode(&bytes).unwrap();

        assert_eq!(object.module, "a");
        assert_eq!(object.symbols.len(), 1);
        assert_eq!(object.symbols[0].name, "f");
        assert_eq!(object.symbols[0].code, b"f-code");
        assert_eq!(object.externals, vec!["g".to_string()]);
    }

    #[test]
    fn losing_definition_is_demoted_to_external() {
        let module = IrModule::new(
            "b",
            "b.wir",
            vec![SymbolDescriptor::defined("f", b"loser".to_vec())],
        );
        let resolutions = vec![SymbolResolution {
            prevailing: false,
            visible_outside_ir: false,
        }];
        let target = TargetOptions::default();

        let bytes = IrObjectEngine
            .generate(&input(&module, &resolutions, &target))
            .unwrap();
        let object = NativeObject::decode(&bytes).unwrap();

        assert!(object.symbols.is_empty());
        assert_eq!(object.externals, vec!["f".to_string()]);
    }

    #[test]
    fn native_visibility_prevents_internalization() {
        let module = IrModule::new(
            "a",
            "a.wir",
            vec![
                SymbolDescriptor::defined("kept", b"1".to_vec()),
                SymbolDescriptor::defined("hidden", b"2".to_vec()),
            ],
        );
        let resolutions = vec![
            SymbolResolution {
                prevailing: true,
                visible_outside_ir: true,
            },
            SymbolResolution {
                prevailing: true,
                visible_outside_ir: false,
            },
        ];
        let target = TargetOptions::default();

        let bytes = IrObjectEngine
            .generate(&input(&module, &resolutions, &target))
            .unwrap();
        let object = NativeObject::decode(&bytes).unwrap();

        assert!(object.symbols[0].exported);
        assert!(!object.symbols[1].exported);
    }

    #[test]
    fn emission_is_deterministic() {
        let module = IrModule::new(
            "a",
            "a.wir",
            vec![
                SymbolDescriptor::defined("f", b"f-code".to_vec()),
                SymbolDescriptor::undefined("z"),
                SymbolDescriptor::undefined("y"),
            ],
        );
        let resolutions = vec![
            SymbolResolution {
                prevailing: true,
                visible_outside_ir: false,
            },
            SymbolResolution {
                prevailing: false,
                visible_outside_ir: false,
            },
            SymbolResolution {
                prevailing: false,
                visible_outside_ir: false,
            },
        ];
        let target = TargetOptions::default();

        let first = IrObjectEngine
            .generate(&input(&module, &resolutions, &target))
            .unwrap();
        let second = IrObjectEngine
            .generate(&input(&module, &resolutions, &target))
            .unwrap();
        assert_eq!(first, second);

        // References appear sorted regardless of descriptor order.
        let object = NativeObject::decode(&first).unwrap();
        assert_eq!(object.externals, vec!["y".to_string(), "z".to_string()]);
    }

    #[test]
    fn target_settings_are_recorded() {
        let module = IrModule::new("a", "a.wir", vec![]);
        let resolutions = vec![];
        let target = TargetOptions {
            triple: "x86_64-unknown-linux-gnu".to_string(),
            opt_level: 3,
            ..TargetOptions::default()
        };

        let bytes = IrObjectEngine
            .generate(&input(&module, &resolutions, &target))
            .unwrap();
        let object = NativeObject::decode(&bytes).unwrap();
        assert_eq!(object.triple, "x86_64-unknown-linux-gnu");
        assert_eq!(object.opt_level, 3);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(NativeObject::decode(b"not an object").is_err());
    }
}
