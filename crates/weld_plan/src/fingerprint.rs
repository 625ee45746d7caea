//! Canonical content fingerprints for codegen tasks.

use weld_common::{ContentHash, ContentHasher};
use weld_ir::{Definedness, IrModule, TargetOptions};
use weld_resolve::SymbolResolution;

/// Bumped whenever the encoding below changes, so stale cache entries from
/// older drivers can never match.
const FINGERPRINT_VERSION: u64 = 1;

/// Computes the content fingerprint of one codegen task.
///
/// The fingerprint covers exactly the semantic inputs of the task: the
/// target and optimization settings, the module's name, and — in descriptor
/// order — every symbol's name, definedness, native-reference flag,
/// resolution decision, and IR bytes. It deliberately excludes the module's
/// source path (moving a build tree must not invalidate the cache) and
/// anything address- or time-dependent. All variable-length fields are
/// length-prefixed by [`ContentHasher`].
///
/// # Panics
///
/// Panics if `resolutions` is not aligned with `module.symbols`; the
/// planner always passes the view produced for this module.
pub fn task_fingerprint(
    module: &IrModule,
    resolutions: &[SymbolResolution],
    target: &TargetOptions,
) -> ContentHash {
    assert_eq!(
        module.symbols.len(),
        resolutions.len(),
        "resolution view must align with module descriptors"
    );

    let mut hasher = ContentHasher::new();
    hasher.update_u64(FINGERPRINT_VERSION);

    hasher.update_str(&target.triple);
    hasher.update_str(&target.cpu);
    hasher.update_u64(target.features.len() as u64);
    for feature in &target.features {
        hasher.update_str(feature);
    }
    hasher.update_u8(target.opt_level);

    hasher.update_str(&module.name);
    hasher.update_u64(module.symbols.len() as u64);
    for (sym, res) in module.symbols.iter().zip(resolutions) {
        hasher.update_str(&sym.name);
        hasher.update_u8(match sym.def {
            Definedness::Defined => 0,
            Definedness::Tentative => 1,
            Definedness::Undefined => 2,
        });
        hasher.update_u8(sym.used_in_native as u8);
        hasher.update_u8(res.prevailing as u8);
        hasher.update_u8(res.visible_outside_ir as u8);
        hasher.update_bytes(&sym.ir);
    }

    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weld_ir::SymbolDescriptor;

    fn prevailing() -> SymbolResolution {
        SymbolResolution {
            prevailing: true,
            visible_outside_ir: false,
        }
    }

    fn external() -> SymbolResolution {
        SymbolResolution {
            prevailing: false,
            visible_outside_ir: false,
        }
    }

    fn sample() -> (IrModule, Vec<SymbolResolution>) {
        let module = IrModule::new(
            "m",
            "src/m.wir",
            vec![
                SymbolDescriptor::defined("f", b"f-body".to_vec()),
                SymbolDescriptor::undefined("g"),
            ],
        );
        (module, vec![prevailing(), external()])
    }

    #[test]
    fn identical_input_identical_fingerprint() {
        let (m1, r1) = sample();
        let (m2, r2) = sample();
        let target = TargetOptions::default();
        assert_eq!(
            task_fingerprint(&m1, &r1, &target),
            task_fingerprint(&m2, &r2, &target)
        );
    }

    #[test]
    fn ir_change_changes_fingerprint() {
        let (m1, r) = sample();
        let mut m2 = m1.clone();
        m2.symbols[0].ir = b"different body".to_vec();
        let target = TargetOptions::default();
        assert_ne!(
            task_fingerprint(&m1, &r, &target),
            task_fingerprint(&m2, &r, &target)
        );
    }

    #[test]
    fn resolution_flip_changes_fingerprint() {
        let (m, r1) = sample();
        let r2 = vec![external(), external()];
        let target = TargetOptions::default();
        assert_ne!(
            task_fingerprint(&m, &r1, &target),
            task_fingerprint(&m, &r2, &target)
        );
    }

    #[test]
    fn visibility_change_changes_fingerprint() {
        let (m, r1) = sample();
        let mut r2 = r1.clone();
        r2[0].visible_outside_ir = true;
        let target = TargetOptions::default();
        assert_ne!(
            task_fingerprint(&m, &r1, &target),
            task_fingerprint(&m, &r2, &target)
        );
    }

    #[test]
    fn target_options_change_fingerprint() {
        let (m, r) = sample();
        let base = TargetOptions::default();
        let mut other_triple = base.clone();
        other_triple.triple = "aarch64-unknown-linux-gnu".to_string();
        let mut other_opt = base.clone();
        other_opt.opt_level = 0;

        let fp = task_fingerprint(&m, &r, &base);
        assert_ne!(fp, task_fingerprint(&m, &r, &other_triple));
        assert_ne!(fp, task_fingerprint(&m, &r, &other_opt));
    }

    #[test]
    fn source_path_does_not_affect_fingerprint() {
        let (m1, r) = sample();
        let mut m2 = m1.clone();
        m2.source_path = "/somewhere/else/m.wir".into();
        let target = TargetOptions::default();
        assert_eq!(
            task_fingerprint(&m1, &r, &target),
            task_fingerprint(&m2, &r, &target)
        );
    }

    #[test]
    fn symbol_order_is_significant() {
        let target = TargetOptions::default();
        let m1 = IrModule::new(
            "m",
            "m.wir",
            vec![
                SymbolDescriptor::defined("a", b"1".to_vec()),
                SymbolDescriptor::defined("b", b"2".to_vec()),
            ],
        );
        let m2 = IrModule::new(
            "m",
            "m.wir",
            vec![
                SymbolDescriptor::defined("b", b"2".to_vec()),
                SymbolDescriptor::defined("a", b"1".to_vec()),
            ],
        );
        let r = vec![prevailing(), prevailing()];
        assert_ne!(
            task_fingerprint(&m1, &r, &target),
            task_fingerprint(&m2, &r, &target)
        );
    }

    #[test]
    #[should_panic(expected = "resolution view must align")]
    fn misaligned_view_panics() {
        let (m, _) = sample();
        task_fingerprint(&m, &[], &TargetOptions::default());
    }
}
