use super::{eval, eval_one};

#[test]
fn user_binary_operator_at_low_precedence() {
    // `:` keeps its right operand, so the chain evaluates to the last value
    assert_eq!(eval_one("base binary : 1 (a b) b ;  1 : 2 : 3 ;"), 3.0);
}

#[test]
fn user_binary_operator_precedence_interacts_with_builtins() {
    // `@` at precedence 5 binds looser than `+`, so 1 @ 2 + 3 is 1 @ (2 + 3)
    assert_eq!(
        eval_one("base binary @ 5 (a b) a * 10 + b ;  1 @ 2 + 3 ;"),
        15.0
    );
}

#[test]
fn user_binary_operator_default_precedence() {
    // default precedence 30 sits between `+` (20) and `*` (40):
    // 1 + 2 | 3 groups as 1 + (2 | 3)
    assert_eq!(
        eval_one("base binary | (a b) a * b ;  1 + 2 | 3 ;"),
        7.0
    );
}

#[test]
fn user_unary_operator() {
    assert_eq!(
        eval_one("base unary ! (v) if v then 0 else 1 ;  !1 ;"),
        0.0
    );
    assert_eq!(
        eval_one("base unary ! (v) if v then 0 else 1 ;  !0 ;"),
        1.0
    );
}

#[test]
fn unary_operators_compose_with_binary_expressions() {
    assert_eq!(
        eval_one("base unary - (v) 0 - v ;  -5 + 8 ;"),
        3.0
    );
}

#[test]
fn short_circuit_style_logical_or() {
    assert_eq!(
        eval_one(
            "base binary | 5 (a b) if a then 1 else if b then 1 else 0 ;  0 | 1 ;"
        ),
        1.0
    );
}

#[test]
fn missing_user_operator_is_a_lowering_error() {
    assert!(eval("1 ? 2 ;").is_err());
    assert!(eval("~1 ;").is_err());
}
