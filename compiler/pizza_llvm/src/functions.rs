//! Function lowering: calls, prototypes, definitions, and the
//! per-function optimization pipeline.

use inkwell::module::Linkage;
use inkwell::passes::PassBuilderOptions;
use inkwell::types::BasicMetadataTypeEnum;
use inkwell::values::{BasicMetadataValueEnum, FloatValue, FunctionValue};
use tracing::debug;

use pizza_ast::{Expr, Function, Prototype};
use pizza_parse::OperatorTable;

use crate::context::{CodegenCx, CodegenError};

/// Fixed pipeline run over every freshly emitted function: collapse the
/// stack slots to SSA values, then clean up.
const FUNCTION_PASSES: &str = "mem2reg,instcombine,reassociate,gvn,simplifycfg";

impl<'ctx> CodegenCx<'ctx> {
    /// Lower a call, resolving the callee current-module-first.
    pub(crate) fn lower_call(
        &mut self,
        callee: &str,
        args: &[Expr],
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let callee_fn = self
            .get_function(callee)
            .ok_or_else(|| CodegenError::new("Unknown function referenced"))?;

        if callee_fn.count_params() as usize != args.len() {
            return Err(CodegenError::new("Incorrect # arguments passed"));
        }

        let mut lowered: Vec<BasicMetadataValueEnum<'ctx>> = Vec::with_capacity(args.len());
        for arg in args {
            lowered.push(self.lower_expr(arg, function)?.into());
        }

        let call = self.builder.build_call(callee_fn, &lowered, "calltmp")?;
        call.try_as_basic_value()
            .left()
            .map(|v| v.into_float_value())
            .ok_or_else(|| CodegenError::new("call produced no value"))
    }

    /// Declare `double <name>(double, …)` with external linkage and named
    /// parameters in the current module.
    pub fn lower_prototype(&mut self, proto: &Prototype) -> FunctionValue<'ctx> {
        let f64_type = self.f64_type();
        let param_types: Vec<BasicMetadataTypeEnum> =
            vec![f64_type.into(); proto.params.len()];
        let fn_type = f64_type.fn_type(&param_types, false);
        let function = self
            .module
            .add_function(&proto.name, fn_type, Some(Linkage::External));

        for (param, name) in function.get_param_iter().zip(&proto.params) {
            param.set_name(name);
        }
        function
    }

    /// Lower a function definition into the current module.
    ///
    /// The prototype moves into the registry first (replacing any prior
    /// entry), a binary-operator definition registers its precedence so the
    /// parser sees it on subsequent lines, and the body is lowered under a
    /// fresh lexical frame with one entry-block slot per parameter. On
    /// failure the frame is restored and the partially emitted function is
    /// erased.
    pub fn lower_function(
        &mut self,
        unit: Function,
        ops: &mut OperatorTable,
    ) -> Result<FunctionValue<'ctx>, CodegenError> {
        let Function { proto, body } = unit;
        let name = proto.name.clone();
        let params = proto.params.clone();
        let operator = if proto.is_binary_op() {
            proto.operator_char().zip(proto.binary_precedence())
        } else {
            None
        };
        debug!(target: "pizza_llvm", function = %name, "lowering definition");

        self.register_prototype(proto);
        let function = self
            .get_function(&name)
            .ok_or_else(|| CodegenError::new("prototype registration failed"))?;

        if let Some((op, precedence)) = operator {
            ops.define(op, precedence as i32);
        }

        let entry = self.llcx.append_basic_block(function, "entry");
        self.builder.position_at_end(entry);

        self.scopes.save_fresh();
        let result = self.lower_function_body(function, &params, &body);
        self.scopes.restore();

        match result {
            Ok(()) => Ok(function),
            Err(err) => {
                // SAFETY: the function was created by this lowering and
                // nothing outside the erased module body refers to it.
                unsafe { function.delete() };
                Err(err)
            }
        }
    }

    fn lower_function_body(
        &mut self,
        function: FunctionValue<'ctx>,
        params: &[String],
        body: &Expr,
    ) -> Result<(), CodegenError> {
        for (index, name) in params.iter().enumerate() {
            let slot = self.create_entry_block_alloca(function, name)?;
            let param = function
                .get_nth_param(index as u32)
                .ok_or_else(|| CodegenError::new("missing function parameter"))?;
            self.builder.build_store(slot, param)?;
            self.scopes.bind(name.clone(), slot);
        }

        let ret = self.lower_expr(body, function)?;
        self.builder.build_return(Some(&ret))?;

        if !function.verify(true) {
            return Err(CodegenError::new("generated function failed verification"));
        }
        self.run_function_passes()
    }

    fn run_function_passes(&self) -> Result<(), CodegenError> {
        self.module
            .run_passes(
                FUNCTION_PASSES,
                &self.target_machine,
                PassBuilderOptions::create(),
            )
            .map_err(|e| CodegenError::new(e.to_string()))
    }
}
