//! Host-exported runtime symbols.
//!
//! JITted Pizza code can call `print(x)` and `printchar(x)` once they are
//! declared with `sauce`. The functions live in the host process and are
//! wired into each module that declares them through explicit
//! `add_global_mapping` calls; an executable does not export its symbols
//! for dynamic lookup, so the mapping step is what makes them resolvable.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use inkwell::execution_engine::ExecutionEngine;
use inkwell::module::Module;

static REPL_OUTPUT: AtomicBool = AtomicBool::new(false);

/// Route `print`/`printchar` output: stderr in REPL mode, stdout in batch
/// mode.
pub fn set_repl_output(repl: bool) {
    REPL_OUTPUT.store(repl, Ordering::Relaxed);
}

fn repl_output() -> bool {
    REPL_OUTPUT.load(Ordering::Relaxed)
}

/// `print(x)`: write the scalar followed by a newline. Returns 0.
pub extern "C" fn print(x: f64) -> f64 {
    if repl_output() {
        eprintln!("{x:.6}");
    } else {
        println!("{x:.6}");
    }
    0.0
}

/// `printchar(x)`: write the low 8 bits of the integer part as one
/// character. Returns 0.
pub extern "C" fn printchar(x: f64) -> f64 {
    let c = (x as i64 & 0xff) as u8 as char;
    if repl_output() {
        eprint!("{c}");
        let _ = std::io::stderr().flush();
    } else {
        print!("{c}");
        let _ = std::io::stdout().flush();
    }
    0.0
}

/// Address of a host runtime symbol, if `name` names one.
pub(crate) fn host_symbol(name: &str) -> Option<usize> {
    match name {
        "print" => Some(print as usize),
        "printchar" => Some(printchar as usize),
        _ => None,
    }
}

/// Map every host runtime symbol `module` declares into `engine`.
pub(crate) fn map_host_symbols<'ctx>(engine: &ExecutionEngine<'ctx>, module: &Module<'ctx>) {
    for function in module.get_functions() {
        if function.count_basic_blocks() > 0 {
            continue;
        }
        let Ok(name) = function.get_name().to_str() else {
            continue;
        };
        if let Some(addr) = host_symbol(name) {
            engine.add_global_mapping(&function, addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_symbols_resolve_by_name() {
        assert_eq!(host_symbol("print"), Some(print as usize));
        assert_eq!(host_symbol("printchar"), Some(printchar as usize));
        assert_eq!(host_symbol("putc"), None);
    }

    #[test]
    fn print_returns_zero() {
        assert_eq!(print(1.5), 0.0);
        assert_eq!(printchar(10.0), 0.0);
    }

    #[test]
    fn printchar_truncates_to_low_byte() {
        // 321 & 0xff == 65 == 'A'; exercised via the same conversion
        let c = (321.9_f64 as i64 & 0xff) as u8 as char;
        assert_eq!(c, 'A');
    }
}
