use crate::error::{CError, CResult, ShapeDesc, ShapeKind};
use std::fmt;

/// Read access to any matrix-like entity: owning matrices, views into
/// them, and bare scalars wrapped as 1x1 operands.
pub trait MatBase {
    type Elem;

    /// Whether the operand's dimensions live in its type or in the
    /// value; reported in shape descriptors.
    const KIND: ShapeKind;

    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    fn element_at(&self, row: usize, col: usize) -> &Self::Elem;

    fn shape_desc(&self) -> ShapeDesc {
        ShapeDesc::new(Self::KIND, self.rows(), self.cols())
    }
}

pub trait MatBaseMut: MatBase {
    fn element_at_mut(&mut self, row: usize, col: usize) -> &mut Self::Elem;
}

/// A bare value treated as a fixed 1x1 operand, so scalars flow through
/// the same comparison surface as matrices.
pub struct Scalar<T>(pub T);

impl<T> MatBase for Scalar<T> {
    type Elem = T;

    const KIND: ShapeKind = ShapeKind::Fixed;

    fn rows(&self) -> usize {
        1
    }

    fn cols(&self) -> usize {
        1
    }

    fn element_at(&self, _row: usize, _col: usize) -> &T {
        &self.0
    }
}

/// Owning row-major element iteration; powers element-wise move
/// assignment.
pub trait IntoElements: MatBase + Sized {
    type Elems: Iterator<Item = Self::Elem>;

    fn into_elements(self) -> Self::Elems;
}

/// Element-wise equality over two same-shaped operands. Shape
/// compatibility is the caller's business.
pub(crate) fn equal_to<L, R>(lhs: &L, rhs: &R) -> bool
where
    L: MatBase,
    R: MatBase,
    L::Elem: PartialEq<R::Elem>,
{
    for row in 0..lhs.rows() {
        for col in 0..lhs.cols() {
            if lhs.element_at(row, col) != rhs.element_at(row, col) {
                return false;
            }
        }
    }
    true
}

/// Cloning, possibly converting, element-wise copy. Shapes must match.
pub(crate) fn copy_into<D, S>(dst: &mut D, src: &S)
where
    D: MatBaseMut,
    S: MatBase,
    S::Elem: Clone,
    D::Elem: From<S::Elem>,
{
    for row in 0..dst.rows() {
        for col in 0..dst.cols() {
            *dst.element_at_mut(row, col) = D::Elem::from(src.element_at(row, col).clone());
        }
    }
}

/// Element-wise move from an owning source. Shapes must match.
pub(crate) fn move_into<D, S>(dst: &mut D, src: S)
where
    D: MatBaseMut,
    S: IntoElements<Elem = D::Elem>,
{
    let cols = dst.cols();
    for (index, value) in src.into_elements().enumerate() {
        *dst.element_at_mut(index / cols, index % cols) = value;
    }
}

pub(crate) fn ensure_same_shape<L, R>(lhs: &L, op: &'static str, rhs: &R) -> CResult<()>
where
    L: MatBase,
    R: MatBase,
{
    if lhs.rows() == rhs.rows() && lhs.cols() == rhs.cols() {
        Ok(())
    } else {
        Err(CError::incompatible(op, lhs.shape_desc(), rhs.shape_desc()))
    }
}

/// Ordering is only defined between 1x1 operands.
pub(crate) fn ensure_scalar_operands<L, R>(lhs: &L, op: &'static str, rhs: &R) -> CResult<()>
where
    L: MatBase,
    R: MatBase,
{
    if lhs.shape_desc().is_scalar() && rhs.shape_desc().is_scalar() {
        Ok(())
    } else {
        Err(CError::incompatible(op, lhs.shape_desc(), rhs.shape_desc()))
    }
}

pub(crate) fn fmt_matrix<M>(m: &M, f: &mut fmt::Formatter<'_>) -> fmt::Result
where
    M: MatBase,
    M::Elem: fmt::Debug,
{
    write!(f, "[")?;
    for row in 0..m.rows() {
        if row > 0 {
            write!(f, ", ")?;
        }
        write!(f, "[")?;
        for col in 0..m.cols() {
            if col > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", m.element_at(row, col))?;
        }
        write!(f, "]")?;
    }
    write!(f, "]")
}

/// Run-time-checked comparisons between any two matrix-like operands.
///
/// Equality requires both operands to have the same shape; ordering
/// additionally requires both to be 1x1. Violations surface as
/// [`CError::IncompatibleOperands`] carrying the operator symbol and
/// both shape descriptors. Fixed/fixed mismatches never get this far:
/// the operator impls simply do not exist for them.
pub trait MatCmp: MatBase + Sized {
    fn try_eq<R>(&self, other: &R) -> CResult<bool>
    where
        R: MatBase,
        Self::Elem: PartialEq<R::Elem>,
    {
        ensure_same_shape(self, "==", other)?;
        Ok(equal_to(self, other))
    }

    fn try_ne<R>(&self, other: &R) -> CResult<bool>
    where
        R: MatBase,
        Self::Elem: PartialEq<R::Elem>,
    {
        ensure_same_shape(self, "!=", other)?;
        Ok(!equal_to(self, other))
    }

    fn try_lt<R>(&self, other: &R) -> CResult<bool>
    where
        R: MatBase,
        Self::Elem: PartialOrd<R::Elem>,
    {
        ensure_scalar_operands(self, "<", other)?;
        Ok(self.element_at(0, 0) < other.element_at(0, 0))
    }

    fn try_le<R>(&self, other: &R) -> CResult<bool>
    where
        R: MatBase,
        Self::Elem: PartialOrd<R::Elem>,
    {
        ensure_scalar_operands(self, "<=", other)?;
        Ok(self.element_at(0, 0) <= other.element_at(0, 0))
    }

    fn try_gt<R>(&self, other: &R) -> CResult<bool>
    where
        R: MatBase,
        Self::Elem: PartialOrd<R::Elem>,
    {
        ensure_scalar_operands(self, ">", other)?;
        Ok(self.element_at(0, 0) > other.element_at(0, 0))
    }

    fn try_ge<R>(&self, other: &R) -> CResult<bool>
    where
        R: MatBase,
        Self::Elem: PartialOrd<R::Elem>,
    {
        ensure_scalar_operands(self, ">=", other)?;
        Ok(self.element_at(0, 0) >= other.element_at(0, 0))
    }
}

impl<M: MatBase> MatCmp for M {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynMat;
    use crate::fixed::Mat;

    fn assert_incompatible<T>(result: CResult<T>, op: &str) {
        match result {
            Err(CError::IncompatibleOperands { op: got, .. }) => assert_eq!(got, op),
            Ok(_) => panic!("expected incompatible operands for {}", op),
        }
    }

    #[test]
    fn test_fixed_vs_dynamic_comparison() {
        let fixed = Mat::from([[1, 2, 3], [4, 5, 6]]);
        let same = DynMat::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let other = DynMat::from_rows(vec![vec![1, 2, 3], vec![6, 6, 6]]);
        let transposed = DynMat::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);

        assert!(fixed.try_eq(&same).unwrap());
        assert!(!fixed.try_ne(&same).unwrap());
        assert!(!fixed.try_eq(&other).unwrap());
        assert!(fixed.try_ne(&other).unwrap());
        assert_incompatible(fixed.try_eq(&transposed), "==");
        assert_incompatible(transposed.try_ne(&fixed), "!=");
    }

    #[test]
    fn test_cross_kind_shape_descriptors() {
        let fixed = Mat::from([[1, 2, 3], [4, 5, 6]]);
        let transposed = DynMat::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
        match fixed.try_eq(&transposed) {
            Err(CError::IncompatibleOperands { op, lhs, rhs }) => {
                assert_eq!(op, "==");
                assert_eq!(lhs, ShapeDesc::new(ShapeKind::Fixed, 2, 3));
                assert_eq!(rhs, ShapeDesc::new(ShapeKind::Variable, 3, 2));
            }
            _ => panic!("expected incompatible operands"),
        }
    }

    #[test]
    fn test_scalar_ordering_across_kinds() {
        let fixed = Mat::from([[7]]);
        let dyn_small = DynMat::from_rows(vec![vec![3]]);
        let dyn_big = DynMat::from_rows(vec![vec![9]]);
        let dyn_wide = DynMat::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]);

        assert!(!fixed.try_lt(&dyn_small).unwrap());
        assert!(fixed.try_ge(&dyn_small).unwrap());
        assert!(fixed.try_lt(&dyn_big).unwrap());
        assert!(fixed.try_le(&dyn_big).unwrap());
        assert!(fixed.try_gt(&dyn_small).unwrap());
        assert!(!fixed.try_gt(&dyn_big).unwrap());
        assert_incompatible(fixed.try_lt(&dyn_wide), "<");
        assert_incompatible(fixed.try_ge(&dyn_wide), ">=");
    }

    #[test]
    fn test_bare_scalar_operand() {
        let m = DynMat::from_rows(vec![vec![7]]);
        assert!(m.try_eq(&Scalar(7)).unwrap());
        assert!(m.try_ne(&Scalar(3)).unwrap());
        assert!(m.try_lt(&Scalar(9)).unwrap());
        assert!(!m.try_lt(&Scalar(3)).unwrap());

        let wide = DynMat::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert_incompatible(wide.try_eq(&Scalar(7)), "==");
        assert_incompatible(wide.try_lt(&Scalar(7)), "<");
    }

    #[test]
    fn test_ordering_requires_scalars_even_for_matching_shapes() {
        // Same shape is not enough for ordering; both sides must be 1x1.
        let a = DynMat::from_rows(vec![vec![1, 2], vec![3, 4]]);
        let b = DynMat::from_rows(vec![vec![1, 2], vec![3, 4]]);
        assert!(a.try_eq(&b).unwrap());
        assert_incompatible(a.try_lt(&b), "<");
        assert_incompatible(a.try_le(&b), "<=");
        assert_incompatible(a.try_gt(&b), ">");
        assert_incompatible(a.try_ge(&b), ">=");
    }
}
