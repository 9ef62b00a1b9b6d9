//! Control-flow lowering: conditionals, loops, scope blocks, bindings.
//!
//! Branch lowering can move the builder's insertion block (a branch body
//! may add blocks of its own), so the terminating block of each branch is
//! re-read from the builder after the nested lowering, never cached from
//! before it.

use inkwell::values::{FloatValue, FunctionValue};
use inkwell::FloatPredicate;

use pizza_ast::Expr;

use crate::context::{CodegenCx, CodegenError};

impl<'ctx> CodegenCx<'ctx> {
    /// `if cond then A else B` with a phi merge in `ifcont`.
    pub(crate) fn lower_if(
        &mut self,
        cond: &Expr,
        then_branch: &Expr,
        else_branch: &Expr,
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let cond_value = self.lower_expr(cond, function)?;
        let cond_bool = self.builder.build_float_compare(
            FloatPredicate::ONE,
            cond_value,
            self.const_f64(0.0),
            "ifcond",
        )?;

        let then_bb = self.llcx.append_basic_block(function, "then");
        let else_bb = self.llcx.append_basic_block(function, "else");
        let merge_bb = self.llcx.append_basic_block(function, "ifcont");
        self.builder
            .build_conditional_branch(cond_bool, then_bb, else_bb)?;

        self.builder.position_at_end(then_bb);
        let then_value = self.lower_expr(then_branch, function)?;
        self.builder.build_unconditional_branch(merge_bb)?;
        let then_end = self
            .builder
            .get_insert_block()
            .ok_or_else(|| CodegenError::new("builder lost its insertion block"))?;

        self.builder.position_at_end(else_bb);
        let else_value = self.lower_expr(else_branch, function)?;
        self.builder.build_unconditional_branch(merge_bb)?;
        let else_end = self
            .builder
            .get_insert_block()
            .ok_or_else(|| CodegenError::new("builder lost its insertion block"))?;

        self.builder.position_at_end(merge_bb);
        let phi = self.builder.build_phi(self.f64_type(), "iftmp")?;
        phi.add_incoming(&[(&then_value, then_end), (&else_value, else_end)]);
        Ok(phi.as_basic_value().into_float_value())
    }

    /// `for id = start, end [, step] in body`. The loop variable lives in
    /// an entry-block stack slot and shadows any outer binding for the
    /// duration of the loop. The whole expression evaluates to 0.0.
    pub(crate) fn lower_for(
        &mut self,
        var: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        self.scopes.save_copy();
        let result = self.lower_for_inner(var, start, end, step, body, function);
        self.scopes.restore();
        result
    }

    fn lower_for_inner(
        &mut self,
        var: &str,
        start: &Expr,
        end: &Expr,
        step: Option<&Expr>,
        body: &Expr,
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let start_value = self.lower_expr(start, function)?;
        let slot = self.create_entry_block_alloca(function, var)?;
        self.builder.build_store(slot, start_value)?;
        self.scopes.bind(var.to_string(), slot);

        let loop_bb = self.llcx.append_basic_block(function, "loop");
        self.builder.build_unconditional_branch(loop_bb)?;
        self.builder.position_at_end(loop_bb);

        // body value is discarded; failure still aborts the loop
        self.lower_expr(body, function)?;

        let step_value = match step {
            Some(step) => self.lower_expr(step, function)?,
            None => self.const_f64(1.0),
        };
        let end_value = self.lower_expr(end, function)?;

        let current = self
            .builder
            .build_load(slot, var)?
            .into_float_value();
        let next = self.builder.build_float_add(current, step_value, "nextvar")?;
        self.builder.build_store(slot, next)?;

        let end_cond = self.builder.build_float_compare(
            FloatPredicate::ONE,
            end_value,
            self.const_f64(0.0),
            "loopcond",
        )?;
        let after_bb = self.llcx.append_basic_block(function, "afterloop");
        self.builder
            .build_conditional_branch(end_cond, loop_bb, after_bb)?;
        self.builder.position_at_end(after_bb);

        Ok(self.const_f64(0.0))
    }

    /// `{ e1; e2; … }`: the last sub-expression's value, under a copied
    /// lexical frame.
    pub(crate) fn lower_scope(
        &mut self,
        body: &[Expr],
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        self.scopes.save_copy();
        let result = self.lower_scope_inner(body, function);
        self.scopes.restore();
        result
    }

    fn lower_scope_inner(
        &mut self,
        body: &[Expr],
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let mut last = None;
        for expr in body {
            last = Some(self.lower_expr(expr, function)?);
        }
        last.ok_or_else(|| CodegenError::new("empty scope block has no value"))
    }

    /// `topping` bindings. Slots are created in declaration order and bound
    /// into the *current* frame; enclosing constructs own the scoping.
    pub(crate) fn lower_var(
        &mut self,
        bindings: &[(String, Option<Expr>)],
        body: Option<&Expr>,
        function: FunctionValue<'ctx>,
    ) -> Result<FloatValue<'ctx>, CodegenError> {
        let mut last = self.const_f64(0.0);
        for (name, init) in bindings {
            let value = match init {
                Some(init) => self.lower_expr(init, function)?,
                None => self.const_f64(0.0),
            };
            let slot = self.create_entry_block_alloca(function, name)?;
            self.builder.build_store(slot, value)?;
            self.scopes.bind(name.clone(), slot);
            last = value;
        }

        match body {
            Some(body) => self.lower_expr(body, function),
            None => Ok(last),
        }
    }
}
