//! Expression lowering dispatch.

use inkwell::values::{FloatValue, FunctionValue};

use pizza_ast::Expr;

use crate::context::{CodegenCx, CodegenError};

impl<'ctx> CodegenCx<'ctx> {
    /// Lower an expression to an f64 value at the current insertion point.
    pub(crate) fn lower_expr(
        &mut self,
        expr: &Expr,
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        match expr {
            Expr::Number(value) => Ok(self.const_f64(*value)),
            Expr::Variable(name) => self.lower_variable(name),
            Expr::Binary { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs, function),
            Expr::Unary { opcode, operand } => self.lower_unary(*opcode, operand, function),
            Expr::Call { callee, args } => self.lower_call(callee, args, function),
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => self.lower_if(cond, then_branch, else_branch, function),
            Expr::For {
                var,
                start,
                end,
                step,
                body,
            } => self.lower_for(var, start, end, step.as_deref(), body, function),
            Expr::Var { bindings, body } => self.lower_var(bindings, body.as_deref(), function),
            Expr::Scope(body) => self.lower_scope(body, function),
        }
    }

    /// Load a named binding from its stack slot.
    fn lower_variable(&mut self, name: &str) -> Result<FloatValue<'ctx>, CodegenError> {
        let slot = self
            .scopes
            .lookup(name)
            .ok_or_else(|| CodegenError::new("Unknown variable name"))?;
        Ok(self
            .builder
            .build_load(slot, name)?
            .into_float_value())
    }
}
