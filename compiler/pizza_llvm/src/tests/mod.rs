//! End-to-end tests: source text through lexer, parser, lowering, and the
//! JIT, mirroring the driver loop in `pizzac`.

mod arithmetic_tests;
mod operator_tests;

use inkwell::context::Context;

use pizza_ast::{Function, Prototype, ANON_FN_NAME};
use pizza_lexer::{Token, TokenStream};
use pizza_parse::Parser;

use crate::{CodegenCx, Jit};

/// Run a Pizza program and collect the value of every anonymous top-level
/// expression.
pub(crate) fn eval(source: &str) -> Result<Vec<f64>, String> {
    let llcx = Context::create();
    let mut cx = CodegenCx::new(&llcx).map_err(|e| e.to_string())?;
    let mut jit = Jit::new(&llcx).map_err(|e| e.to_string())?;
    let mut parser = Parser::new(TokenStream::from_source(source));
    let mut results = Vec::new();

    parser.bump();
    loop {
        match parser.current() {
            Token::Eof => break,
            Token::Raw(';') => {
                parser.bump();
            }
            Token::Base => {
                let unit = parser.parse_definition().map_err(|e| e.to_string())?;
                cx.lower_function(unit, parser.operators_mut())
                    .map_err(|e| e.to_string())?;
                jit.add_module(cx.take_module()).map_err(|e| e.to_string())?;
            }
            Token::Sauce => {
                let proto = parser.parse_extern().map_err(|e| e.to_string())?;
                cx.lower_prototype(&proto);
                cx.register_prototype(proto);
            }
            _ => {
                let body = parser.parse_expression().map_err(|e| e.to_string())?;
                let unit = Function::new(Prototype::anonymous(), body);
                cx.lower_function(unit, parser.operators_mut())
                    .map_err(|e| e.to_string())?;
                let tracker = jit
                    .add_tracked_module(cx.take_module())
                    .map_err(|e| e.to_string())?;
                results.push(tracker.call_scalar(ANON_FN_NAME).map_err(|e| e.to_string())?);
                tracker.remove();
            }
        }
    }
    Ok(results)
}

/// Run a program and return the last anonymous expression's value.
pub(crate) fn eval_one(source: &str) -> f64 {
    let results = eval(source).expect("program should compile and run");
    *results.last().expect("program should produce a value")
}
