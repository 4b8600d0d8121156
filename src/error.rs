use std::fmt;
use thiserror::Error;

/// Which family a matrix-like operand belongs to: dimensions carried in
/// the type, or dimensions fixed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Fixed,
    Variable,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Fixed => write!(f, "fixed"),
            ShapeKind::Variable => write!(f, "variable"),
        }
    }
}

/// Shape of one operand as reported in `IncompatibleOperands`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeDesc {
    pub kind: ShapeKind,
    pub rows: usize,
    pub cols: usize,
}

impl ShapeDesc {
    pub fn new(kind: ShapeKind, rows: usize, cols: usize) -> ShapeDesc {
        ShapeDesc { kind, rows, cols }
    }

    pub fn is_scalar(&self) -> bool {
        self.rows == 1 && self.cols == 1
    }
}

impl fmt::Display for ShapeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}x{}", self.kind, self.rows, self.cols)
    }
}

pub type CResult<T> = Result<T, CError>;

#[derive(Error, Debug)]
pub enum CError {
    #[error("incompatible operands: ({lhs}) {op} ({rhs})")]
    IncompatibleOperands {
        op: &'static str,
        lhs: ShapeDesc,
        rhs: ShapeDesc,
    },
}

impl CError {
    pub(crate) fn incompatible(op: &'static str, lhs: ShapeDesc, rhs: ShapeDesc) -> CError {
        CError::IncompatibleOperands { op, lhs, rhs }
    }
}

impl From<CError> for String {
    fn from(e: CError) -> Self {
        format!("{}", e)
    }
}
