//! Binary and unary operator lowering.

use inkwell::values::{FloatValue, FunctionValue};
use inkwell::FloatPredicate;

use pizza_ast::Expr;

use crate::context::{CodegenCx, CodegenError};

impl<'ctx> CodegenCx<'ctx> {
    pub(crate) fn lower_binary(
        &mut self,
        op: char,
        lhs: &Expr,
        rhs: &Expr,
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        // Assignment is special-cased: the left side is a store target, not
        // a value to lower.
        if op == '=' {
            return self.lower_assignment(lhs, rhs, function);
        }

        let l = self.lower_expr(lhs, function)?;
        let r = self.lower_expr(rhs, function)?;

        match op {
            '+' => Ok(self.builder.build_float_add(l, r, "addtmp")?),
            '-' => Ok(self.builder.build_float_sub(l, r, "subtmp")?),
            '*' => Ok(self.builder.build_float_mul(l, r, "multmp")?),
            '/' => Ok(self.builder.build_float_div(l, r, "divtmp")?),
            '<' => {
                let cmp = self
                    .builder
                    .build_float_compare(FloatPredicate::ULT, l, r, "cmptmp")?;
                // widen the i1 back to 0.0 / 1.0
                Ok(self
                    .builder
                    .build_unsigned_int_to_float(cmp, self.f64_type(), "booltmp")?)
            }
            _ => {
                let callee = self
                    .get_function(&format!("binary{op}"))
                    .ok_or_else(|| CodegenError::new("binary operator not found"))?;
                let call =
                    self.builder
                        .build_call(callee, &[l.into(), r.into()], "binop")?;
                call.try_as_basic_value()
                    .left()
                    .map(|v| v.into_float_value())
                    .ok_or_else(|| CodegenError::new("operator call produced no value"))
            }
        }
    }

    /// `lhs = rhs`: store into the named slot and yield the stored value.
    fn lower_assignment(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let Expr::Variable(name) = lhs else {
            return Err(CodegenError::new("destination of '=' must be a variable"));
        };
        let value = self.lower_expr(rhs, function)?;
        let slot = self
            .scopes
            .lookup(name)
            .ok_or_else(|| CodegenError::new("Unknown variable name"))?;
        self.builder.build_store(slot, value)?;
        Ok(value)
    }

    /// Unary operators always dispatch to a `unary<op>` function.
    pub(crate) fn lower_unary(
        &mut self,
        opcode: char,
        operand: &Expr,
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let value = self.lower_expr(operand, function)?;
        let callee = self
            .get_function(&format!("unary{opcode}"))
            .ok_or_else(|| CodegenError::new("Unknown unary operator"))?;
        let call = self.builder.build_call(callee, &[value.into()], "unop")?;
        call.try_as_basic_value()
            .left()
            .map(|v| v.into_float_value())
            .ok_or_else(|| CodegenError::new("operator call produced no value"))
    }
}
