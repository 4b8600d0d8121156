use crate::base::{
    copy_into, ensure_same_shape, equal_to, fmt_matrix, move_into, IntoElements, MatBase,
    MatBaseMut,
};
use crate::error::{CResult, ShapeKind};
use crate::staged::{GridElemIter, StagedGrid};
use half::f16;
use num_traits::Zero;
use std::cmp::Ordering;
use std::fmt;

/// Matrix whose row and column counts are part of its type. Shape
/// mismatches between fixed operands are compile errors; there is no
/// run-time representation for them.
pub struct Mat<T, const R: usize, const C: usize> {
    elems: StagedGrid<T, R, C>,
}

/// Marker for operands whose shape is statically `R` x `C`; the bound
/// that makes view assignment a compile-time-checked operation.
pub trait FixedShape<const R: usize, const C: usize>: MatBase {}

impl<T, const R: usize, const C: usize> Mat<T, R, C> {
    pub const ROWS: usize = R;
    pub const COLS: usize = C;

    pub fn new() -> Mat<T, R, C>
    where
        T: Default,
    {
        Mat {
            elems: StagedGrid::default(),
        }
    }

    pub fn zeros() -> Mat<T, R, C>
    where
        T: Zero,
    {
        Mat {
            elems: StagedGrid::build(|_| T::zero()),
        }
    }

    pub fn from_fn<P>(mut provider: P) -> Mat<T, R, C>
    where
        P: FnMut(usize, usize) -> T,
    {
        Mat {
            elems: StagedGrid::build(|index| provider(index / C, index % C)),
        }
    }

    /// Element-wise converting move into another element type.
    pub fn converted<U>(self) -> Mat<U, R, C>
    where
        U: From<T>,
    {
        let mut elems = self.elems.into_iter();
        Mat {
            elems: StagedGrid::build(|_| match elems.next() {
                Some(value) => U::from(value),
                None => unreachable!("grid iterator yields R*C elements"),
            }),
        }
    }

    pub fn element_at(&self, row: usize, col: usize) -> &T {
        self.elems.at(row, col)
    }

    pub fn element_at_mut(&mut self, row: usize, col: usize) -> &mut T {
        self.elems.at_mut(row, col)
    }

    pub fn row(&self, row: usize) -> MatView<'_, Self, 1, C> {
        assert!(row < R, "row index out of range");
        MatView {
            mat: self,
            first_row: row,
            first_col: 0,
        }
    }

    pub fn row_mut(&mut self, row: usize) -> MatViewMut<'_, Self, 1, C> {
        assert!(row < R, "row index out of range");
        MatViewMut {
            mat: self,
            first_row: row,
            first_col: 0,
        }
    }

    /// A view of `N` rows starting at `first`; the row count is part of
    /// the view's type.
    pub fn row_span<const N: usize>(&self, first: usize) -> MatView<'_, Self, N, C> {
        const { assert!(N <= R) };
        assert!(first + N <= R, "row span out of range");
        MatView {
            mat: self,
            first_row: first,
            first_col: 0,
        }
    }

    pub fn row_span_mut<const N: usize>(&mut self, first: usize) -> MatViewMut<'_, Self, N, C> {
        const { assert!(N <= R) };
        assert!(first + N <= R, "row span out of range");
        MatViewMut {
            mat: self,
            first_row: first,
            first_col: 0,
        }
    }

    pub fn all_rows(&self) -> MatView<'_, Self, R, C> {
        MatView {
            mat: self,
            first_row: 0,
            first_col: 0,
        }
    }

    pub fn all_rows_mut(&mut self) -> MatViewMut<'_, Self, R, C> {
        MatViewMut {
            mat: self,
            first_row: 0,
            first_col: 0,
        }
    }
}

impl<T, const R: usize, const C: usize> MatBase for Mat<T, R, C> {
    type Elem = T;

    const KIND: ShapeKind = ShapeKind::Fixed;

    fn rows(&self) -> usize {
        R
    }

    fn cols(&self) -> usize {
        C
    }

    fn element_at(&self, row: usize, col: usize) -> &T {
        self.elems.at(row, col)
    }
}

impl<T, const R: usize, const C: usize> MatBaseMut for Mat<T, R, C> {
    fn element_at_mut(&mut self, row: usize, col: usize) -> &mut T {
        self.elems.at_mut(row, col)
    }
}

impl<T, const R: usize, const C: usize> FixedShape<R, C> for Mat<T, R, C> {}

impl<T, const R: usize, const C: usize> IntoElements for Mat<T, R, C> {
    type Elems = GridElemIter<T, R, C>;

    fn into_elements(self) -> Self::Elems {
        self.elems.into_iter()
    }
}

impl<T: Default, const R: usize, const C: usize> Default for Mat<T, R, C> {
    fn default() -> Self {
        Mat::new()
    }
}

impl<T, const R: usize, const C: usize> From<[[T; C]; R]> for Mat<T, R, C> {
    fn from(values: [[T; C]; R]) -> Self {
        Mat {
            elems: StagedGrid::from(values),
        }
    }
}

/// Converting copy from a same-shaped matrix of another element type.
impl<T, U, const R: usize, const C: usize> From<&Mat<U, R, C>> for Mat<T, R, C>
where
    T: From<U>,
    U: Clone,
{
    fn from(other: &Mat<U, R, C>) -> Self {
        Mat {
            elems: StagedGrid::from_ref(&other.elems),
        }
    }
}

impl<T: Clone, const R: usize, const C: usize> Clone for Mat<T, R, C> {
    fn clone(&self) -> Self {
        Mat {
            elems: self.elems.clone(),
        }
    }
}

impl<T: fmt::Debug, const R: usize, const C: usize> fmt::Debug for Mat<T, R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_matrix(self, f)
    }
}

impl<T, U, const R: usize, const C: usize> PartialEq<Mat<U, R, C>> for Mat<T, R, C>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Mat<U, R, C>) -> bool {
        equal_to(self, other)
    }
}

/// Ordering exists only between 1x1 fixed operands; anything else is a
/// compile error.
impl<T, U> PartialOrd<Mat<U, 1, 1>> for Mat<T, 1, 1>
where
    T: PartialOrd<U>,
{
    fn partial_cmp(&self, other: &Mat<U, 1, 1>) -> Option<Ordering> {
        self.element_at(0, 0).partial_cmp(other.element_at(0, 0))
    }
}

/// Non-owning view of a `VR` x `VC` region of a fixed matrix. Copying
/// the view copies the borrow-and-offset tuple, never the elements.
pub struct MatView<'a, M, const VR: usize, const VC: usize> {
    mat: &'a M,
    first_row: usize,
    first_col: usize,
}

impl<'a, M, const VR: usize, const VC: usize> Clone for MatView<'a, M, VR, VC> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, M, const VR: usize, const VC: usize> Copy for MatView<'a, M, VR, VC> {}

impl<'a, M: MatBase, const VR: usize, const VC: usize> MatView<'a, M, VR, VC> {
    pub fn row(self, row: usize) -> MatView<'a, M, 1, VC> {
        assert!(row < VR, "row index out of range");
        MatView {
            mat: self.mat,
            first_row: self.first_row + row,
            first_col: self.first_col,
        }
    }

    pub fn row_span<const N: usize>(self, first: usize) -> MatView<'a, M, N, VC> {
        const { assert!(N <= VR) };
        assert!(first + N <= VR, "row span out of range");
        MatView {
            mat: self.mat,
            first_row: self.first_row + first,
            first_col: self.first_col,
        }
    }

    pub fn all_rows(self) -> MatView<'a, M, VR, VC> {
        self
    }

    pub fn col(self, col: usize) -> MatView<'a, M, VR, 1> {
        assert!(col < VC, "column index out of range");
        MatView {
            mat: self.mat,
            first_row: self.first_row,
            first_col: self.first_col + col,
        }
    }

    pub fn col_span<const N: usize>(self, first: usize) -> MatView<'a, M, VR, N> {
        const { assert!(N <= VC) };
        assert!(first + N <= VC, "column span out of range");
        MatView {
            mat: self.mat,
            first_row: self.first_row,
            first_col: self.first_col + first,
        }
    }

    pub fn all_cols(self) -> MatView<'a, M, VR, VC> {
        self
    }
}

impl<'a, M: MatBase> MatView<'a, M, 1, 1> {
    pub fn scalar(&self) -> &M::Elem {
        self.mat.element_at(self.first_row, self.first_col)
    }
}

impl<'a, M: MatBase, const VR: usize, const VC: usize> MatBase for MatView<'a, M, VR, VC> {
    type Elem = M::Elem;

    const KIND: ShapeKind = M::KIND;

    fn rows(&self) -> usize {
        VR
    }

    fn cols(&self) -> usize {
        VC
    }

    fn element_at(&self, row: usize, col: usize) -> &M::Elem {
        assert!(row < VR && col < VC, "view index out of range");
        self.mat
            .element_at(self.first_row + row, self.first_col + col)
    }
}

impl<'a, M: MatBase, const R: usize, const C: usize> FixedShape<R, C> for MatView<'a, M, R, C> {}

impl<'a, M, const VR: usize, const VC: usize> fmt::Debug for MatView<'a, M, VR, VC>
where
    M: MatBase,
    M::Elem: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_matrix(self, f)
    }
}

impl<'a, M, T, const VR: usize, const VC: usize> PartialEq<Mat<T, VR, VC>>
    for MatView<'a, M, VR, VC>
where
    M: MatBase,
    M::Elem: PartialEq<T>,
{
    fn eq(&self, other: &Mat<T, VR, VC>) -> bool {
        equal_to(self, other)
    }
}

impl<'a, 'b, M1, M2, const VR: usize, const VC: usize> PartialEq<MatView<'b, M2, VR, VC>>
    for MatView<'a, M1, VR, VC>
where
    M1: MatBase,
    M2: MatBase,
    M1::Elem: PartialEq<M2::Elem>,
{
    fn eq(&self, other: &MatView<'b, M2, VR, VC>) -> bool {
        equal_to(self, other)
    }
}

/// Mutable view; additionally carries assignment. Narrowing consumes
/// the view, so a chain like `m.row_mut(1).col_mut(0)` keeps exactly
/// one exclusive borrow of the owner alive.
pub struct MatViewMut<'a, M, const VR: usize, const VC: usize> {
    mat: &'a mut M,
    first_row: usize,
    first_col: usize,
}

impl<'a, M: MatBaseMut, const VR: usize, const VC: usize> MatViewMut<'a, M, VR, VC> {
    pub fn as_view(&self) -> MatView<'_, M, VR, VC> {
        MatView {
            mat: &*self.mat,
            first_row: self.first_row,
            first_col: self.first_col,
        }
    }

    pub fn row(self, row: usize) -> MatViewMut<'a, M, 1, VC> {
        assert!(row < VR, "row index out of range");
        MatViewMut {
            mat: self.mat,
            first_row: self.first_row + row,
            first_col: self.first_col,
        }
    }

    pub fn row_span<const N: usize>(self, first: usize) -> MatViewMut<'a, M, N, VC> {
        const { assert!(N <= VR) };
        assert!(first + N <= VR, "row span out of range");
        MatViewMut {
            mat: self.mat,
            first_row: self.first_row + first,
            first_col: self.first_col,
        }
    }

    pub fn all_rows(self) -> MatViewMut<'a, M, VR, VC> {
        self
    }

    pub fn col(self, col: usize) -> MatViewMut<'a, M, VR, 1> {
        assert!(col < VC, "column index out of range");
        MatViewMut {
            mat: self.mat,
            first_row: self.first_row,
            first_col: self.first_col + col,
        }
    }

    pub fn col_span<const N: usize>(self, first: usize) -> MatViewMut<'a, M, VR, N> {
        const { assert!(N <= VC) };
        assert!(first + N <= VC, "column span out of range");
        MatViewMut {
            mat: self.mat,
            first_row: self.first_row,
            first_col: self.first_col + first,
        }
    }

    pub fn all_cols(self) -> MatViewMut<'a, M, VR, VC> {
        self
    }

    /// Copies `other` into the viewed region; the shapes are matched by
    /// the type system, so this cannot fail.
    pub fn assign<O>(&mut self, other: &O)
    where
        O: FixedShape<VR, VC>,
        O::Elem: Clone,
        M::Elem: From<O::Elem>,
    {
        copy_into(self, other);
    }

    /// Moves the elements of `other` into the viewed region.
    pub fn assign_from<O>(&mut self, other: O)
    where
        O: FixedShape<VR, VC> + IntoElements<Elem = M::Elem>,
    {
        move_into(self, other);
    }

    /// Run-time-checked assignment for variable-shaped sources. The
    /// shape check precedes any element write.
    pub fn try_assign<O>(&mut self, other: &O) -> CResult<()>
    where
        O: MatBase,
        O::Elem: Clone,
        M::Elem: From<O::Elem>,
    {
        ensure_same_shape(self, "=", other)?;
        copy_into(self, other);
        Ok(())
    }
}

impl<'a, M: MatBaseMut> MatViewMut<'a, M, 1, 1> {
    pub fn scalar(&self) -> &M::Elem {
        self.mat.element_at(self.first_row, self.first_col)
    }

    pub fn scalar_mut(&mut self) -> &mut M::Elem {
        self.mat.element_at_mut(self.first_row, self.first_col)
    }

    pub fn set(&mut self, value: M::Elem) {
        *self.scalar_mut() = value;
    }
}

impl<'a, M: MatBaseMut, const VR: usize, const VC: usize> MatBase for MatViewMut<'a, M, VR, VC> {
    type Elem = M::Elem;

    const KIND: ShapeKind = M::KIND;

    fn rows(&self) -> usize {
        VR
    }

    fn cols(&self) -> usize {
        VC
    }

    fn element_at(&self, row: usize, col: usize) -> &M::Elem {
        assert!(row < VR && col < VC, "view index out of range");
        self.mat
            .element_at(self.first_row + row, self.first_col + col)
    }
}

impl<'a, M: MatBaseMut, const VR: usize, const VC: usize> MatBaseMut for MatViewMut<'a, M, VR, VC> {
    fn element_at_mut(&mut self, row: usize, col: usize) -> &mut M::Elem {
        assert!(row < VR && col < VC, "view index out of range");
        self.mat
            .element_at_mut(self.first_row + row, self.first_col + col)
    }
}

macro_rules! scalar_cmp_impl {
    ($($t:ty),* $(,)?) => {
        $(
            impl PartialEq<$t> for Mat<$t, 1, 1> {
                fn eq(&self, other: &$t) -> bool {
                    self.element_at(0, 0) == other
                }
            }

            impl PartialOrd<$t> for Mat<$t, 1, 1> {
                fn partial_cmp(&self, other: &$t) -> Option<Ordering> {
                    self.element_at(0, 0).partial_cmp(other)
                }
            }

            impl<'a, M> PartialEq<$t> for MatView<'a, M, 1, 1>
            where
                M: MatBase<Elem = $t>,
            {
                fn eq(&self, other: &$t) -> bool {
                    self.scalar() == other
                }
            }

            impl<'a, M> PartialOrd<$t> for MatView<'a, M, 1, 1>
            where
                M: MatBase<Elem = $t>,
            {
                fn partial_cmp(&self, other: &$t) -> Option<Ordering> {
                    self.scalar().partial_cmp(other)
                }
            }
        )*
    };
}

scalar_cmp_impl!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64, f16);
