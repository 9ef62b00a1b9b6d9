//! JSON tree dump.
//!
//! Each top-level unit serializes to one entry of the `"ast"` array the
//! driver writes. Definitions dump as `{"function":{"proto":…,"body":…}}`,
//! externs as `{"extern":<proto>}` (wrapped by the driver), and anonymous
//! top-level expressions dump as their body's tree.

use serde_json::{json, Map, Value};

use crate::ast::{Expr, Function, Prototype};

impl Expr {
    /// Serialize this tree to its JSON dump form.
    pub fn dump(&self) -> Value {
        match self {
            Expr::Number(v) => json!({ "num": v }),
            Expr::Variable(name) => json!({ "var": name }),
            Expr::Binary { op, lhs, rhs } => json!({
                "op": op.to_string(),
                "lhs": lhs.dump(),
                "rhs": rhs.dump(),
            }),
            Expr::Unary { opcode, operand } => json!({
                "unary": { "opcode": opcode.to_string(), "operand": operand.dump() },
            }),
            Expr::Call { callee, args } => json!({
                "callee": callee,
                "args": args.iter().map(Expr::dump).collect::<Vec<_>>(),
            }),
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => json!({
                "if": { "cond": cond.dump(), "then": then_branch.dump(), "else": else_branch.dump() },
            }),
            Expr::For {
                var,
                start,
                end,
                step,
                body,
            } => {
                let mut inner = Map::new();
                inner.insert("var".into(), json!(var));
                inner.insert("start".into(), start.dump());
                inner.insert("end".into(), end.dump());
                if let Some(step) = step {
                    inner.insert("step".into(), step.dump());
                }
                inner.insert("body".into(), body.dump());
                json!({ "for": inner })
            }
            Expr::Var { bindings, body } => {
                let names: Vec<Value> = bindings
                    .iter()
                    .map(|(name, init)| {
                        let mut entry = Map::new();
                        entry.insert("name".into(), json!(name));
                        if let Some(init) = init {
                            entry.insert("value".into(), init.dump());
                        }
                        Value::Object(entry)
                    })
                    .collect();
                let mut inner = Map::new();
                inner.insert("names".into(), Value::Array(names));
                if let Some(body) = body {
                    inner.insert("body".into(), body.dump());
                }
                json!({ "var": inner })
            }
            Expr::Scope(body) => json!({
                "scope": body.iter().map(Expr::dump).collect::<Vec<_>>(),
            }),
        }
    }
}

impl Prototype {
    pub fn dump(&self) -> Value {
        let name = if self.name.is_empty() {
            Value::Null
        } else {
            json!(self.name)
        };
        json!({ "name": name, "args": self.params })
    }
}

impl Function {
    pub fn dump(&self) -> Value {
        json!({ "function": { "proto": self.proto.dump(), "body": self.body.dump() } })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::PrototypeKind;

    #[test]
    fn number_and_variable() {
        assert_eq!(Expr::Number(1.5).dump(), json!({ "num": 1.5 }));
        assert_eq!(
            Expr::Variable("x".into()).dump(),
            json!({ "var": "x" })
        );
    }

    #[test]
    fn binary_tree() {
        let tree = Expr::Binary {
            op: '+',
            lhs: Box::new(Expr::Number(4.0)),
            rhs: Box::new(Expr::Variable("y".into())),
        };
        assert_eq!(
            tree.dump(),
            json!({ "op": "+", "lhs": { "num": 4.0 }, "rhs": { "var": "y" } })
        );
    }

    #[test]
    fn call_with_args() {
        let tree = Expr::Call {
            callee: "fib".into(),
            args: vec![Expr::Number(10.0)],
        };
        assert_eq!(
            tree.dump(),
            json!({ "callee": "fib", "args": [{ "num": 10.0 }] })
        );
    }

    #[test]
    fn unary_wraps_opcode_and_operand() {
        let tree = Expr::Unary {
            opcode: '!',
            operand: Box::new(Expr::Number(0.0)),
        };
        assert_eq!(
            tree.dump(),
            json!({ "unary": { "opcode": "!", "operand": { "num": 0.0 } } })
        );
    }

    #[test]
    fn for_omits_absent_step() {
        let tree = Expr::For {
            var: "i".into(),
            start: Box::new(Expr::Number(1.0)),
            end: Box::new(Expr::Number(4.0)),
            step: None,
            body: Box::new(Expr::Variable("i".into())),
        };
        let dumped = tree.dump();
        assert!(dumped["for"].get("step").is_none());
        assert_eq!(dumped["for"]["var"], json!("i"));
    }

    #[test]
    fn var_bindings_with_and_without_init() {
        let tree = Expr::Var {
            bindings: vec![
                ("a".into(), Some(Expr::Number(1.0))),
                ("b".into(), None),
            ],
            body: Some(Box::new(Expr::Variable("a".into()))),
        };
        assert_eq!(
            tree.dump(),
            json!({ "var": {
                "names": [{ "name": "a", "value": { "num": 1.0 } }, { "name": "b" }],
                "body": { "var": "a" },
            }})
        );
    }

    #[test]
    fn scope_lists_sub_expressions() {
        let tree = Expr::Scope(vec![Expr::Number(1.0), Expr::Number(2.0)]);
        assert_eq!(
            tree.dump(),
            json!({ "scope": [{ "num": 1.0 }, { "num": 2.0 }] })
        );
    }

    #[test]
    fn function_dump_nests_proto_and_body() {
        let unit = Function::new(
            Prototype::new("double", vec!["x".into()], PrototypeKind::Function),
            Expr::Variable("x".into()),
        );
        assert_eq!(
            unit.dump(),
            json!({ "function": {
                "proto": { "name": "double", "args": ["x"] },
                "body": { "var": "x" },
            }})
        );
    }
}
