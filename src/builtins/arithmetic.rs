//! Arithmetic: SUM, DIFFERENCE, PRODUCT, QUOTIENT, REMAINDER, MAXIMUM,
//! MINIMUM, RANDOM, RND, SQRT, POW, SIN, COS, ARCTAN
//!
//! All arithmetic is IEEE-754 double precision. SUM and PRODUCT are
//! variadic inside a group: `(SUM 1 2 3)`. The trigonometric primitives
//! work in degrees.

use crate::error::{Error, ErrorKind};
use crate::frame::{CallResult, Signal};
use crate::node::{numeric_args, Node};
use crate::workspace::Workspace;
use rand::Rng;

pub fn builtin_sum(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let mut total = 0.0;
    for arg in args {
        total += arg.to_number()?;
    }
    Ok(Signal::Value(Node::number(total)))
}

pub fn builtin_difference(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let (x, y) = numeric_args(&args[0], &args[1])?;
    Ok(Signal::Value(Node::number(x - y)))
}

pub fn builtin_product(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let mut total = 1.0;
    for arg in args {
        total *= arg.to_number()?;
    }
    Ok(Signal::Value(Node::number(total)))
}

pub fn builtin_quotient(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let (x, y) = numeric_args(&args[0], &args[1])?;
    if y == 0.0 {
        return Err(Error::at(ErrorKind::AttemptToDivideByZero, &args[1]));
    }
    Ok(Signal::Value(Node::number(x / y)))
}

/// Integer remainder, truncating both operands.
pub fn builtin_remainder(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let (x, y) = numeric_args(&args[0], &args[1])?;
    if y as i64 == 0 {
        return Err(Error::at(ErrorKind::AttemptToDivideByZero, &args[1]));
    }
    Ok(Signal::Value(Node::number((x as i64 % y as i64) as f64)))
}

pub fn builtin_maximum(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let (x, y) = numeric_args(&args[0], &args[1])?;
    Ok(Signal::Value(Node::number(x.max(y))))
}

pub fn builtin_minimum(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let (x, y) = numeric_args(&args[0], &args[1])?;
    Ok(Signal::Value(Node::number(x.min(y))))
}

/// RND n: a random integer in 0..n.
pub fn builtin_rnd(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let n = args[0].to_number()? as i64;
    if n < 1 {
        return Err(Error::at(ErrorKind::PositiveIntegerExpected, &args[0]));
    }
    let value = rand::thread_rng().gen_range(0..n);
    Ok(Signal::Value(Node::number(value as f64)))
}

/// RANDOM: a random digit, as RND 10.
pub fn builtin_random(ws: &mut Workspace, _args: &[Node]) -> CallResult {
    builtin_rnd(ws, &[Node::number(10.0)])
}

pub fn builtin_sqrt(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let n = args[0].to_number()?;
    if n <= 0.0 {
        return Err(Error::at(ErrorKind::PositiveNumberExpected, &args[0]));
    }
    Ok(Signal::Value(Node::number(n.sqrt())))
}

pub fn builtin_pow(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let (x, y) = numeric_args(&args[0], &args[1])?;
    Ok(Signal::Value(Node::number(x.powf(y))))
}

pub fn builtin_sin(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let degrees = args[0].to_number()?;
    Ok(Signal::Value(Node::number(degrees.to_radians().sin())))
}

pub fn builtin_cos(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let degrees = args[0].to_number()?;
    Ok(Signal::Value(Node::number(degrees.to_radians().cos())))
}

pub fn builtin_arctan(_ws: &mut Workspace, args: &[Node]) -> CallResult {
    let n = args[0].to_number()?;
    Ok(Signal::Value(Node::number(n.atan().to_degrees())))
}

pub fn register(ws: &mut Workspace) {
    ws.register_variadic("SUM", "", 2, builtin_sum);
    ws.register_builtin("DIFFERENCE", "DIFF", 2, builtin_difference);
    ws.register_variadic("PRODUCT", "", 2, builtin_product);
    ws.register_builtin("QUOTIENT", "", 2, builtin_quotient);
    ws.register_builtin("REMAINDER", "MOD", 2, builtin_remainder);
    ws.register_builtin("MAXIMUM", "MAX", 2, builtin_maximum);
    ws.register_builtin("MINIMUM", "MIN", 2, builtin_minimum);

    ws.register_builtin("RANDOM", "", 0, builtin_random);
    ws.register_builtin("RND", "", 1, builtin_rnd);
    ws.register_builtin("SQRT", "", 1, builtin_sqrt);
    ws.register_builtin("POW", "", 2, builtin_pow);
    ws.register_builtin("SIN", "", 1, builtin_sin);
    ws.register_builtin("COS", "", 1, builtin_cos);
    ws.register_builtin("ARCTAN", "", 1, builtin_arctan);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::scratch_workspace;

    fn prints(source: &str) -> String {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate(source).unwrap();
        ws.take_capture()
    }

    #[test]
    fn test_prefix_arithmetic() {
        assert_eq!(prints("PRINT SUM 2 3"), "5\n");
        assert_eq!(prints("PRINT DIFFERENCE 2 3"), "-1\n");
        assert_eq!(prints("PRINT PRODUCT 4 2.5"), "10\n");
        assert_eq!(prints("PRINT QUOTIENT 10 4"), "2.5\n");
        assert_eq!(prints("PRINT MOD 17 5"), "2\n");
        assert_eq!(prints("PRINT MAX 2 3"), "3\n");
        assert_eq!(prints("PRINT MIN 2 3"), "2\n");
    }

    #[test]
    fn test_variadic_in_group() {
        assert_eq!(prints("PRINT (SUM 1 2 3 4)"), "10\n");
        assert_eq!(prints("PRINT (PRODUCT 2 3 4)"), "24\n");
    }

    #[test]
    fn test_divide_by_zero() {
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("PRINT QUOTIENT 1 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttemptToDivideByZero);

        let err = ws.evaluate("PRINT 1 / 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttemptToDivideByZero);

        let err = ws.evaluate("PRINT MOD 5 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::AttemptToDivideByZero);
    }

    #[test]
    fn test_sum_rejects_words() {
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("PRINT SUM \"a 1").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::BadInput(_)));
    }

    #[test]
    fn test_rnd_bounds() {
        let (_dir, mut ws) = scratch_workspace();
        for _ in 0..50 {
            ws.evaluate("MAKE \"r RND 6").unwrap();
            let r: f64 = ws.get_variable("r").unwrap().to_number().unwrap();
            assert!((0.0..6.0).contains(&r));
            assert_eq!(r.fract(), 0.0);
        }
        let err = ws.evaluate("MAKE \"r RND 0").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PositiveIntegerExpected);
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(prints("PRINT SQRT 9"), "3\n");
        let (_dir, mut ws) = scratch_workspace();
        let err = ws.evaluate("PRINT SQRT -4").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PositiveNumberExpected);
    }

    #[test]
    fn test_pow() {
        assert_eq!(prints("PRINT POW 2 10"), "1024\n");
    }

    #[test]
    fn test_degree_trigonometry() {
        let (_dir, mut ws) = scratch_workspace();
        ws.evaluate("MAKE \"s SIN 90 MAKE \"c COS 0 MAKE \"a ARCTAN 1")
            .unwrap();
        let s = ws.get_variable("s").unwrap().to_number().unwrap();
        let c = ws.get_variable("c").unwrap().to_number().unwrap();
        let a = ws.get_variable("a").unwrap().to_number().unwrap();
        assert!((s - 1.0).abs() < 1e-9);
        assert!((c - 1.0).abs() < 1e-9);
        assert!((a - 45.0).abs() < 1e-9);
    }
}
