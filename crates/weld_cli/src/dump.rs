//! `weld dump` — symbol-table listing of a `.wir` module.

use weld_ir::{Definedness, IrModule};

use crate::DumpArgs;

/// Runs the `weld dump` command. Returns exit code 0 on success.
pub fn run(args: &DumpArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let module = weld_ir::read_module(&args.module)?;
    print!("{}", render(&module));
    Ok(0)
}

/// Renders a module's symbol table, nm-style: one line per symbol with a
/// definedness letter, the name, the IR fragment size for definitions, and
/// a marker for symbols also referenced from native code.
fn render(module: &IrModule) -> String {
    let mut out = format!(
        "module {} ({})\n",
        module.name,
        module.source_path.display()
    );
    for sym in &module.symbols {
        let letter = match sym.def {
            Definedness::Defined => 'D',
            Definedness::Tentative => 'T',
            Definedness::Undefined => 'U',
        };
        out.push_str(&format!("  {letter} {}", sym.name));
        if sym.def.is_definition() {
            out.push_str(&format!(" [{} bytes]", sym.ir.len()));
        }
        if sym.used_in_native {
            out.push_str(" [native]");
        }
        out.push('\n');
    }
    out
}
