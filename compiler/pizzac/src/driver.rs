//! Top-level driver.
//!
//! Reads top-level units one at a time and pushes each through dump →
//! lower → JIT. Definitions and anonymous expressions transfer the
//! current module to the JIT and start a fresh one; externs only move
//! their prototype into the registry. Parse and lowering failures are
//! reported as `LogError:` lines and recovered from by consuming one
//! token; only CLI misuse, I/O-open failures, and JIT symbol-resolution
//! failures end the run.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use inkwell::context::Context;
use inkwell::values::FunctionValue;
use serde_json::json;
use tracing::debug;

use pizza_ast::{Function, Prototype, ANON_FN_NAME};
use pizza_lexer::{Token, TokenStream};
use pizza_llvm::{runtime, CodegenCx, Jit};
use pizza_parse::Parser;

use crate::output::{AstWriter, IrWriter};

/// A fatal driver failure.
#[derive(Debug)]
pub struct DriverError {
    message: String,
}

impl DriverError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        DriverError {
            message: message.into(),
        }
    }

    pub(crate) fn io(err: io::Error) -> Self {
        DriverError::new(err.to_string())
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DriverError {}

impl From<pizza_llvm::JitError> for DriverError {
    fn from(err: pizza_llvm::JitError) -> Self {
        DriverError::new(err.to_string())
    }
}

impl From<pizza_llvm::CodegenError> for DriverError {
    fn from(err: pizza_llvm::CodegenError) -> Self {
        DriverError::new(err.to_string())
    }
}

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub repl: bool,
    pub src_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    pub ll_path: Option<PathBuf>,
}

impl Options {
    /// `--repl [jsonPath] [llPath]` or `<srcPath> [jsonPath] [llPath]`.
    pub fn from_args(args: &[String]) -> Option<Self> {
        if args.is_empty() || args.len() > 3 {
            return None;
        }
        let repl = args[0] == "--repl";
        Some(Options {
            repl,
            src_path: (!repl).then(|| PathBuf::from(&args[0])),
            json_path: args.get(1).map(PathBuf::from),
            ll_path: args.get(2).map(PathBuf::from),
        })
    }
}

/// Open the inputs and outputs, build the pipeline, and run it.
pub fn run(opts: &Options) -> Result<(), DriverError> {
    let source: Box<dyn BufRead> = if opts.repl {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let path = opts
            .src_path
            .as_deref()
            .ok_or_else(|| DriverError::new("missing source path"))?;
        Box::new(BufReader::new(open_source(path)?))
    };
    let json = opts
        .json_path
        .as_deref()
        .map(AstWriter::create)
        .transpose()?;
    let ll = opts.ll_path.as_deref().map(IrWriter::create).transpose()?;

    runtime::set_repl_output(opts.repl);

    let llcx = Context::create();
    let mut driver = Driver::new(&llcx, source, json, ll, opts.repl)?;
    driver.run_loop()
}

fn open_source(path: &Path) -> Result<File, DriverError> {
    File::open(path).map_err(|e| DriverError::new(format!("cannot open {}: {e}", path.display())))
}

struct Driver<'ctx> {
    parser: Parser,
    cx: CodegenCx<'ctx>,
    jit: Jit<'ctx>,
    json: Option<AstWriter>,
    ll: Option<IrWriter>,
    repl: bool,
}

impl<'ctx> Driver<'ctx> {
    fn new(
        llcx: &'ctx Context,
        source: Box<dyn BufRead>,
        json: Option<AstWriter>,
        ll: Option<IrWriter>,
        repl: bool,
    ) -> Result<Self, DriverError> {
        Ok(Driver {
            parser: Parser::new(TokenStream::new(source)),
            cx: CodegenCx::new(llcx)?,
            jit: Jit::new(llcx)?,
            json,
            ll,
            repl,
        })
    }

    fn run_loop(&mut self) -> Result<(), DriverError> {
        self.prompt();
        self.parser.bump();

        loop {
            self.prompt();
            match self.parser.current() {
                Token::Eof => break,
                Token::Raw(';') => {
                    self.parser.bump();
                }
                Token::Base => self.handle_definition()?,
                Token::Sauce => self.handle_extern()?,
                _ => self.handle_top_level_expression()?,
            }
        }

        if let Some(json) = self.json.take() {
            json.finish()?;
        }
        if let Some(ll) = self.ll.take() {
            ll.finish()?;
        }
        Ok(())
    }

    fn prompt(&self) {
        if self.repl {
            eprint!("ready> ");
        }
    }

    /// Report a recoverable failure and consume one token.
    fn recover(&mut self, err: impl fmt::Display) -> Result<(), DriverError> {
        eprintln!("LogError: {err}");
        self.parser.bump();
        Ok(())
    }

    fn handle_definition(&mut self) -> Result<(), DriverError> {
        debug!(target: "pizzac", "handling definition");
        let unit = match self.parser.parse_definition() {
            Ok(unit) => unit,
            Err(err) => return self.recover(err),
        };
        self.dump_ast(unit.dump())?;

        match self.cx.lower_function(unit, self.parser.operators_mut()) {
            Ok(function) => {
                self.emit_ir(function)?;
                let module = self.cx.take_module();
                self.jit.add_module(module)?;
            }
            Err(err) => eprintln!("LogError: {err}"),
        }
        Ok(())
    }

    fn handle_extern(&mut self) -> Result<(), DriverError> {
        debug!(target: "pizzac", "handling extern");
        let proto = match self.parser.parse_extern() {
            Ok(proto) => proto,
            Err(err) => return self.recover(err),
        };
        self.dump_ast(json!({ "extern": proto.dump() }))?;

        let function = self.cx.lower_prototype(&proto);
        self.emit_ir(function)?;
        self.cx.register_prototype(proto);
        Ok(())
    }

    fn handle_top_level_expression(&mut self) -> Result<(), DriverError> {
        debug!(target: "pizzac", "handling top-level expression");
        let body = match self.parser.parse_expression() {
            Ok(body) => body,
            Err(err) => return self.recover(err),
        };
        self.dump_ast(body.dump())?;

        let unit = Function::new(Prototype::anonymous(), body);
        match self.cx.lower_function(unit, self.parser.operators_mut()) {
            Ok(function) => {
                self.emit_ir(function)?;
                let module = self.cx.take_module();
                let tracker = self.jit.add_tracked_module(module)?;
                let value = tracker.call_scalar(ANON_FN_NAME)?;
                if self.repl {
                    eprintln!("Evaluated to {value:.6}");
                }
                tracker.remove();
            }
            Err(err) => eprintln!("LogError: {err}"),
        }
        Ok(())
    }

    fn dump_ast(&mut self, unit: serde_json::Value) -> Result<(), DriverError> {
        match &mut self.json {
            Some(json) => json.entry(&unit),
            None => Ok(()),
        }
    }

    fn emit_ir(&mut self, function: FunctionValue<'ctx>) -> Result<(), DriverError> {
        match &mut self.ll {
            Some(ll) => ll.function(function),
            None => Ok(()),
        }
    }
}
