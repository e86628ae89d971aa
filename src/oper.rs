//! Static operator tables: binding precedence and the style option that
//! governs wrapping around each operator.

/// Which wrapping option family governs an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperatorClass {
    Arithmetic,
    Logical,
}

/// Binding precedence, lower = tighter.
// https://docs.oracle.com/javase/tutorial/java/nutsandbolts/operators.html
pub(crate) fn precedence(op: &str) -> u8 {
    match op {
        "*" | "/" | "%" => 1,
        "+" | "-" => 2,
        "<<" | ">>" | ">>>" => 3,
        "<" | ">" | "<=" | ">=" => 4,
        "==" | "!=" => 5,
        "&" => 6,
        "^" => 7,
        "|" => 8,
        "&&" => 9,
        "||" => 10,
        _ => panic!("unexpected infix operator: {}", op),
    }
}

pub(crate) fn wrap_class(op: &str) -> OperatorClass {
    match op {
        "*" | "/" | "%" | "+" | "-" | "<<" | ">>" | ">>>" => OperatorClass::Arithmetic,
        "<" | ">" | "<=" | ">=" | "==" | "!=" | "&" | "^" | "|" | "&&" | "||" => {
            OperatorClass::Logical
        }
        _ => panic!("unexpected infix operator: {}", op),
    }
}

pub(crate) fn is_infix_operator(op: &str) -> bool {
    matches!(
        op,
        "*" | "/"
            | "%"
            | "+"
            | "-"
            | "<<"
            | ">>"
            | ">>>"
            | "<"
            | ">"
            | "<="
            | ">="
            | "=="
            | "!="
            | "&"
            | "^"
            | "|"
            | "&&"
            | "||"
    )
}
