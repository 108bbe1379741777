//! Operator dispatch for external evaluators.
//!
//! [`get_op`] is a pure lookup: given the operand types, their shapes
//! (vector or scalar), and an operation, it answers whether a kernel
//! exists and hands back an opaque [`OpKernel`] when it does. The handle
//! resolves into the vector layer on [`OpKernel::invoke`]; the lookup
//! itself never touches data.
//!
//! Supported shapes are vector-vector, vector-scalar, and scalar-scalar.
//! Scalar-on-the-left with a vector on the right is deliberately absent;
//! evaluators normalize that shape before dispatch.

#![forbid(unsafe_code)]

use std::fmt;

use draken_result::{Error, Result};
use draken_types::{ArithmeticOp, CompareOp, LogicalOp, TypeTag, Value};
use draken_vector::{ByteMask, Vector};

/// Wire-stable operation codes: arithmetic 1..=4, comparison 10..=15,
/// boolean 20..=22.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Add = 1,
    Subtract = 2,
    Multiply = 3,
    Divide = 4,
    Equals = 10,
    NotEquals = 11,
    GreaterThan = 12,
    GreaterThanOrEquals = 13,
    LessThan = 14,
    LessThanOrEquals = 15,
    And = 20,
    Or = 21,
    Xor = 22,
}

impl Operation {
    /// Stable numeric code of this operation.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Operation> {
        Some(match code {
            1 => Operation::Add,
            2 => Operation::Subtract,
            3 => Operation::Multiply,
            4 => Operation::Divide,
            10 => Operation::Equals,
            11 => Operation::NotEquals,
            12 => Operation::GreaterThan,
            13 => Operation::GreaterThanOrEquals,
            14 => Operation::LessThan,
            15 => Operation::LessThanOrEquals,
            20 => Operation::And,
            21 => Operation::Or,
            22 => Operation::Xor,
            _ => return None,
        })
    }

    fn kind(self) -> OpKind {
        match self {
            Operation::Add => OpKind::Arithmetic(ArithmeticOp::Add),
            Operation::Subtract => OpKind::Arithmetic(ArithmeticOp::Sub),
            Operation::Multiply => OpKind::Arithmetic(ArithmeticOp::Mul),
            Operation::Divide => OpKind::Arithmetic(ArithmeticOp::Div),
            Operation::Equals => OpKind::Compare(CompareOp::Eq),
            Operation::NotEquals => OpKind::Compare(CompareOp::Ne),
            Operation::GreaterThan => OpKind::Compare(CompareOp::Gt),
            Operation::GreaterThanOrEquals => OpKind::Compare(CompareOp::Ge),
            Operation::LessThan => OpKind::Compare(CompareOp::Lt),
            Operation::LessThanOrEquals => OpKind::Compare(CompareOp::Le),
            Operation::And => OpKind::Boolean(LogicalOp::And),
            Operation::Or => OpKind::Boolean(LogicalOp::Or),
            Operation::Xor => OpKind::Boolean(LogicalOp::Xor),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            OpKind::Arithmetic(op) => write!(f, "{op}"),
            OpKind::Compare(op) => write!(f, "{op}"),
            OpKind::Boolean(op) => write!(f, "{op}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpKind {
    Arithmetic(ArithmeticOp),
    Compare(CompareOp),
    Boolean(LogicalOp),
}

/// One operand of a dispatched kernel.
#[derive(Debug)]
pub enum Operand<'a> {
    Vector(&'a Vector),
    Scalar(&'a Value),
}

impl Operand<'_> {
    fn type_tag(&self) -> Option<TypeTag> {
        match self {
            Operand::Vector(v) => Some(v.type_tag()),
            Operand::Scalar(s) => s.type_tag(),
        }
    }

    fn is_scalar(&self) -> bool {
        matches!(self, Operand::Scalar(_))
    }
}

/// The result of an invoked kernel: a vector for arithmetic and boolean
/// logic, a byte-mask for comparisons, a scalar for scalar-scalar shapes.
#[derive(Debug)]
pub enum OpOutput {
    Vector(Vector),
    Mask(ByteMask),
    Scalar(Value),
}

/// An opaque kernel handle returned by [`get_op`]. Invoking it resolves to
/// the concrete per-type kernel in the vector layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpKernel {
    op: Operation,
    left: TypeTag,
    right: TypeTag,
    left_is_scalar: bool,
    right_is_scalar: bool,
}

/// Whether a kernel exists for the given signature.
///
/// Compatibility rules:
/// - comparisons and arithmetic require identical operand types;
/// - arithmetic further requires numeric types;
/// - boolean operations require both sides `Bool`;
/// - scalar-on-the-left with vector-on-the-right is unsupported.
pub fn get_op(
    left: TypeTag,
    left_is_scalar: bool,
    right: TypeTag,
    right_is_scalar: bool,
    op: Operation,
) -> Option<OpKernel> {
    if left_is_scalar && !right_is_scalar {
        return None;
    }
    let compatible = match op.kind() {
        OpKind::Compare(_) => left == right,
        OpKind::Arithmetic(_) => left == right && left.is_numeric(),
        OpKind::Boolean(_) => left == TypeTag::Bool && right == TypeTag::Bool,
    };
    if !compatible {
        tracing::trace!(%op, %left, %right, "no kernel for signature");
        return None;
    }
    Some(OpKernel {
        op,
        left,
        right,
        left_is_scalar,
        right_is_scalar,
    })
}

impl OpKernel {
    pub fn operation(&self) -> Operation {
        self.op
    }

    /// Run the kernel. The operands must match the signature the handle
    /// was looked up with, both in type and in shape.
    pub fn invoke(&self, left: Operand<'_>, right: Operand<'_>) -> Result<OpOutput> {
        self.check_operand("left", &left, self.left, self.left_is_scalar)?;
        self.check_operand("right", &right, self.right, self.right_is_scalar)?;
        match (left, right) {
            (Operand::Vector(l), Operand::Vector(r)) => self.invoke_vector_vector(l, r),
            (Operand::Vector(l), Operand::Scalar(r)) => self.invoke_vector_scalar(l, r),
            (Operand::Scalar(l), Operand::Scalar(r)) => self.invoke_scalar_scalar(l, r),
            (Operand::Scalar(_), Operand::Vector(_)) => Err(Error::UnsupportedType(
                "scalar-vector shape is unsupported".into(),
            )),
        }
    }

    fn check_operand(
        &self,
        side: &str,
        operand: &Operand<'_>,
        expected: TypeTag,
        expect_scalar: bool,
    ) -> Result<()> {
        if operand.is_scalar() != expect_scalar {
            return Err(Error::UnsupportedType(format!(
                "{side} operand shape does not match the dispatched kernel"
            )));
        }
        // A null scalar carries no tag and passes the type check; the
        // kernels treat it as unknown.
        if let Some(tag) = operand.type_tag() {
            if tag != expected {
                return Err(Error::UnsupportedType(format!(
                    "{side} operand is {tag}, kernel was dispatched for {expected}"
                )));
            }
        }
        Ok(())
    }

    fn invoke_vector_vector(&self, left: &Vector, right: &Vector) -> Result<OpOutput> {
        match self.op.kind() {
            OpKind::Compare(op) => Ok(OpOutput::Mask(left.compare_vector(op, right)?)),
            OpKind::Arithmetic(op) => Ok(OpOutput::Vector(left.arith_vector(op, right)?)),
            OpKind::Boolean(op) => Ok(OpOutput::Vector(left.logical_vector(op, right)?)),
        }
    }

    fn invoke_vector_scalar(&self, left: &Vector, right: &Value) -> Result<OpOutput> {
        match self.op.kind() {
            OpKind::Compare(op) => Ok(OpOutput::Mask(left.compare_scalar(op, right)?)),
            OpKind::Arithmetic(op) => Ok(OpOutput::Vector(left.arith_scalar(op, right)?)),
            OpKind::Boolean(op) => {
                let rhs = match right {
                    Value::Bool(b) => *b,
                    Value::Null => {
                        // Unknown operand nulls every row.
                        let nulls =
                            draken_vector::BoolVector::from_options((0..left.len()).map(|_| None));
                        return left
                            .logical_vector(op, &Vector::Bool(nulls))
                            .map(OpOutput::Vector);
                    }
                    other => {
                        return Err(Error::UnsupportedType(format!(
                            "boolean {op} requires a bool scalar, got {other:?}"
                        )));
                    }
                };
                let broadcast = draken_vector::BoolVector::from_values(
                    std::iter::repeat(rhs).take(left.len()),
                );
                left.logical_vector(op, &Vector::Bool(broadcast))
                    .map(OpOutput::Vector)
            }
        }
    }

    fn invoke_scalar_scalar(&self, left: &Value, right: &Value) -> Result<OpOutput> {
        Ok(OpOutput::Scalar(match self.op.kind() {
            OpKind::Compare(op) => scalar_compare(op, left, right)?,
            OpKind::Arithmetic(op) => scalar_arith(op, left, right)?,
            OpKind::Boolean(op) => scalar_logic(op, left, right)?,
        }))
    }
}

fn scalar_compare(op: CompareOp, left: &Value, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        // Comparisons of unknown values are false, matching the vector
        // kernels' mask semantics.
        return Ok(Value::Bool(false));
    }
    let matched = match (left, right) {
        (Value::Int8(a), Value::Int8(b)) => op.matches(a.cmp(b)),
        (Value::Int16(a), Value::Int16(b)) => op.matches(a.cmp(b)),
        (Value::Int32(a), Value::Int32(b)) => op.matches(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => op.matches(a.cmp(b)),
        (Value::Date32(a), Value::Date32(b)) => op.matches(a.cmp(b)),
        (Value::Timestamp64(a), Value::Timestamp64(b)) => op.matches(a.cmp(b)),
        (Value::Float32(a), Value::Float32(b)) => float_matches(op, f64::from(*a), f64::from(*b)),
        (Value::Float64(a), Value::Float64(b)) => float_matches(op, *a, *b),
        (Value::Bytes(a), Value::Bytes(b)) => op.matches(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => match op {
            CompareOp::Eq => a == b,
            CompareOp::Ne => a != b,
            _ => {
                return Err(Error::UnsupportedType(format!(
                    "comparison {op} is not defined for bool scalars"
                )));
            }
        },
        _ => {
            return Err(Error::UnsupportedType(format!(
                "cannot compare {left:?} with {right:?}"
            )));
        }
    };
    Ok(Value::Bool(matched))
}

fn float_matches(op: CompareOp, a: f64, b: f64) -> bool {
    match a.partial_cmp(&b) {
        Some(ord) => op.matches(ord),
        None => op == CompareOp::Ne,
    }
}

fn scalar_arith(op: ArithmeticOp, left: &Value, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    macro_rules! int_arm {
        ($variant:ident, $a:expr, $b:expr) => {{
            let (a, b) = ($a, $b);
            match op {
                ArithmeticOp::Add => Value::$variant(a.wrapping_add(b)),
                ArithmeticOp::Sub => Value::$variant(a.wrapping_sub(b)),
                ArithmeticOp::Mul => Value::$variant(a.wrapping_mul(b)),
                ArithmeticOp::Div => {
                    if b == 0 {
                        Value::Null
                    } else {
                        Value::$variant(a.wrapping_div(b))
                    }
                }
            }
        }};
    }
    macro_rules! float_arm {
        ($variant:ident, $a:expr, $b:expr) => {{
            let (a, b) = ($a, $b);
            match op {
                ArithmeticOp::Add => Value::$variant(a + b),
                ArithmeticOp::Sub => Value::$variant(a - b),
                ArithmeticOp::Mul => Value::$variant(a * b),
                ArithmeticOp::Div => Value::$variant(a / b),
            }
        }};
    }
    Ok(match (left, right) {
        (Value::Int8(a), Value::Int8(b)) => int_arm!(Int8, *a, *b),
        (Value::Int16(a), Value::Int16(b)) => int_arm!(Int16, *a, *b),
        (Value::Int32(a), Value::Int32(b)) => int_arm!(Int32, *a, *b),
        (Value::Int64(a), Value::Int64(b)) => int_arm!(Int64, *a, *b),
        (Value::Float32(a), Value::Float32(b)) => float_arm!(Float32, *a, *b),
        (Value::Float64(a), Value::Float64(b)) => float_arm!(Float64, *a, *b),
        _ => {
            return Err(Error::UnsupportedType(format!(
                "arithmetic {op} is not defined between {left:?} and {right:?}"
            )));
        }
    })
}

fn scalar_logic(op: LogicalOp, left: &Value, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        return Ok(Value::Null);
    }
    match (left.as_bool(), right.as_bool()) {
        (Some(a), Some(b)) => Ok(Value::Bool(match op {
            LogicalOp::And => a && b,
            LogicalOp::Or => a || b,
            LogicalOp::Xor => a ^ b,
        })),
        _ => Err(Error::UnsupportedType(format!(
            "boolean {op} requires bool scalars, got {left:?} and {right:?}"
        ))),
    }
}
