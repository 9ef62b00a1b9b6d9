use super::{eval, eval_one};

#[test]
fn precedence_multiplication_before_addition() {
    assert_eq!(eval_one("4 + 5 * 2 ;"), 14.0);
}

#[test]
fn parentheses_group_first() {
    assert_eq!(eval_one("(4 + 5) * 2 ;"), 18.0);
}

#[test]
fn subtraction_is_left_associative() {
    assert_eq!(eval_one("10 - 3 - 2 ;"), 5.0);
}

#[test]
fn division() {
    assert_eq!(eval_one("9 / 2 ;"), 4.5);
}

#[test]
fn comparison_widens_to_zero_or_one() {
    assert_eq!(eval_one("1 < 2 ;"), 1.0);
    assert_eq!(eval_one("2 < 1 ;"), 0.0);
}

#[test]
fn each_top_level_expression_evaluates_separately() {
    assert_eq!(eval("1 + 1 ; 2 + 2 ; 3 + 3 ;").expect("program"), vec![2.0, 4.0, 6.0]);
}

#[test]
fn fractional_literals() {
    assert_eq!(eval_one("1.5 * 2 ;"), 3.0);
}
