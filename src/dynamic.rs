use crate::base::{copy_into, ensure_same_shape, fmt_matrix, move_into, IntoElements, MatBase, MatBaseMut};
use crate::error::{CError, CResult, ShapeKind};
use num_traits::Zero;
use std::fmt;
use std::vec;

/// Matrix whose row and column counts are chosen at construction time.
/// All shape checks happen at run time and surface as
/// [`CError::IncompatibleOperands`].
pub struct DynMat<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> DynMat<T> {
    pub fn new(rows: usize, cols: usize) -> DynMat<T>
    where
        T: Default,
    {
        DynMat {
            rows,
            cols,
            data: (0..rows * cols).map(|_| T::default()).collect(),
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> DynMat<T>
    where
        T: Zero,
    {
        DynMat {
            rows,
            cols,
            data: (0..rows * cols).map(|_| T::zero()).collect(),
        }
    }

    /// Builds a `rows` x `cols` matrix from nested row vectors. Short
    /// rows are padded with defaults, long rows are truncated, and
    /// missing trailing rows are default-filled.
    pub fn with_shape(rows: usize, cols: usize, values: Vec<Vec<T>>) -> DynMat<T>
    where
        T: Default,
    {
        let mut data = Vec::with_capacity(rows * cols);
        let mut values = values.into_iter();
        for _ in 0..rows {
            let mut row = values.next().unwrap_or_default().into_iter();
            for _ in 0..cols {
                data.push(row.next().unwrap_or_default());
            }
        }
        DynMat { rows, cols, data }
    }

    /// Shape inferred from the nesting: as many rows as given, as many
    /// columns as the longest row.
    pub fn from_rows(values: Vec<Vec<T>>) -> DynMat<T>
    where
        T: Default,
    {
        let rows = values.len();
        let cols = values.iter().map(Vec::len).max().unwrap_or(0);
        Self::with_shape(rows, cols, values)
    }

    pub fn from_fn<P>(rows: usize, cols: usize, mut provider: P) -> DynMat<T>
    where
        P: FnMut(usize, usize) -> T,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(provider(row, col));
            }
        }
        DynMat { rows, cols, data }
    }

    /// Element-wise converting move into another element type.
    pub fn converted<U>(self) -> DynMat<U>
    where
        U: From<T>,
    {
        DynMat {
            rows: self.rows,
            cols: self.cols,
            data: self.data.into_iter().map(U::from).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn element_at(&self, row: usize, col: usize) -> &T {
        assert!(row < self.rows && col < self.cols, "index out of range");
        &self.data[row * self.cols + col]
    }

    pub fn element_at_mut(&mut self, row: usize, col: usize) -> &mut T {
        assert!(row < self.rows && col < self.cols, "index out of range");
        &mut self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> DynView<'_, T> {
        assert!(row < self.rows, "row index out of range");
        DynView {
            mat: self,
            first_row: row,
            first_col: 0,
            nrows: 1,
            ncols: self.cols,
        }
    }

    pub fn row_mut(&mut self, row: usize) -> DynViewMut<'_, T> {
        assert!(row < self.rows, "row index out of range");
        let ncols = self.cols;
        DynViewMut {
            mat: self,
            first_row: row,
            first_col: 0,
            nrows: 1,
            ncols,
        }
    }

    pub fn row_range(&self, first: usize, count: usize) -> DynView<'_, T> {
        assert!(first + count <= self.rows, "row range out of range");
        DynView {
            mat: self,
            first_row: first,
            first_col: 0,
            nrows: count,
            ncols: self.cols,
        }
    }

    pub fn row_range_mut(&mut self, first: usize, count: usize) -> DynViewMut<'_, T> {
        assert!(first + count <= self.rows, "row range out of range");
        let ncols = self.cols;
        DynViewMut {
            mat: self,
            first_row: first,
            first_col: 0,
            nrows: count,
            ncols,
        }
    }

    pub fn all_rows(&self) -> DynView<'_, T> {
        self.row_range(0, self.rows)
    }

    pub fn all_rows_mut(&mut self) -> DynViewMut<'_, T> {
        self.row_range_mut(0, self.rows)
    }
}

impl<T> MatBase for DynMat<T> {
    type Elem = T;

    const KIND: ShapeKind = ShapeKind::Variable;

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn element_at(&self, row: usize, col: usize) -> &T {
        DynMat::element_at(self, row, col)
    }
}

impl<T> MatBaseMut for DynMat<T> {
    fn element_at_mut(&mut self, row: usize, col: usize) -> &mut T {
        DynMat::element_at_mut(self, row, col)
    }
}

impl<T> IntoElements for DynMat<T> {
    type Elems = vec::IntoIter<T>;

    fn into_elements(self) -> Self::Elems {
        self.data.into_iter()
    }
}

/// Converting copy; the result takes the source's shape.
impl<T, U> From<&DynMat<U>> for DynMat<T>
where
    T: From<U>,
    U: Clone,
{
    fn from(other: &DynMat<U>) -> Self {
        DynMat {
            rows: other.rows,
            cols: other.cols,
            data: other.data.iter().map(|v| T::from(v.clone())).collect(),
        }
    }
}

impl<T: Clone> Clone for DynMat<T> {
    fn clone(&self) -> Self {
        DynMat {
            rows: self.rows,
            cols: self.cols,
            data: self.data.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynMat<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_matrix(self, f)
    }
}

// No `PartialEq` here on purpose: variable-shaped operands cannot
// promise an infallible comparison, so equality goes through the
// fallible `MatCmp` surface instead.

/// Non-owning view of a rectangular region of a variable-shaped matrix.
pub struct DynView<'a, T> {
    mat: &'a DynMat<T>,
    first_row: usize,
    first_col: usize,
    nrows: usize,
    ncols: usize,
}

impl<'a, T> Clone for DynView<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for DynView<'a, T> {}

impl<'a, T> DynView<'a, T> {
    pub fn row(self, row: usize) -> DynView<'a, T> {
        self.row_range(row, 1)
    }

    pub fn row_range(self, first: usize, count: usize) -> DynView<'a, T> {
        assert!(first + count <= self.nrows, "row range out of range");
        DynView {
            first_row: self.first_row + first,
            nrows: count,
            ..self
        }
    }

    pub fn all_rows(self) -> DynView<'a, T> {
        self
    }

    pub fn col(self, col: usize) -> DynView<'a, T> {
        self.col_range(col, 1)
    }

    pub fn col_range(self, first: usize, count: usize) -> DynView<'a, T> {
        assert!(first + count <= self.ncols, "column range out of range");
        DynView {
            first_col: self.first_col + first,
            ncols: count,
            ..self
        }
    }

    pub fn all_cols(self) -> DynView<'a, T> {
        self
    }

    /// The single element of a 1x1 view; any other shape is an
    /// incompatible-operands error.
    pub fn scalar(&self) -> CResult<&T> {
        self.ensure_scalar("scalar")?;
        Ok(self.mat.element_at(self.first_row, self.first_col))
    }

    fn ensure_scalar(&self, op: &'static str) -> CResult<()> {
        if self.nrows == 1 && self.ncols == 1 {
            Ok(())
        } else {
            Err(CError::incompatible(
                op,
                self.shape_desc(),
                crate::error::ShapeDesc::new(ShapeKind::Variable, 1, 1),
            ))
        }
    }
}

impl<'a, T> MatBase for DynView<'a, T> {
    type Elem = T;

    const KIND: ShapeKind = ShapeKind::Variable;

    fn rows(&self) -> usize {
        self.nrows
    }

    fn cols(&self) -> usize {
        self.ncols
    }

    fn element_at(&self, row: usize, col: usize) -> &T {
        assert!(row < self.nrows && col < self.ncols, "view index out of range");
        self.mat
            .element_at(self.first_row + row, self.first_col + col)
    }
}

impl<'a, T: fmt::Debug> fmt::Debug for DynView<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_matrix(self, f)
    }
}

/// Mutable region view; assignment and scalar writes are shape-checked
/// at run time before any element is touched.
pub struct DynViewMut<'a, T> {
    mat: &'a mut DynMat<T>,
    first_row: usize,
    first_col: usize,
    nrows: usize,
    ncols: usize,
}

impl<'a, T> DynViewMut<'a, T> {
    pub fn as_view(&self) -> DynView<'_, T> {
        DynView {
            mat: &*self.mat,
            first_row: self.first_row,
            first_col: self.first_col,
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }

    pub fn row(self, row: usize) -> DynViewMut<'a, T> {
        self.row_range(row, 1)
    }

    pub fn row_range(self, first: usize, count: usize) -> DynViewMut<'a, T> {
        assert!(first + count <= self.nrows, "row range out of range");
        DynViewMut {
            first_row: self.first_row + first,
            nrows: count,
            ..self
        }
    }

    pub fn all_rows(self) -> DynViewMut<'a, T> {
        self
    }

    pub fn col(self, col: usize) -> DynViewMut<'a, T> {
        self.col_range(col, 1)
    }

    pub fn col_range(self, first: usize, count: usize) -> DynViewMut<'a, T> {
        assert!(first + count <= self.ncols, "column range out of range");
        DynViewMut {
            first_col: self.first_col + first,
            ncols: count,
            ..self
        }
    }

    pub fn all_cols(self) -> DynViewMut<'a, T> {
        self
    }

    /// Copies `other` into the viewed region after a shape check; a
    /// rejected assignment leaves the region untouched.
    pub fn assign<O>(&mut self, other: &O) -> CResult<()>
    where
        O: MatBase,
        O::Elem: Clone,
        T: From<O::Elem>,
    {
        ensure_same_shape(self, "=", other)?;
        copy_into(self, other);
        Ok(())
    }

    /// Moves the elements of `other` into the viewed region after a
    /// shape check.
    pub fn assign_from<O>(&mut self, other: O) -> CResult<()>
    where
        O: IntoElements<Elem = T>,
    {
        ensure_same_shape(self, "=", &other)?;
        move_into(self, other);
        Ok(())
    }

    pub fn scalar(&self) -> CResult<&T> {
        self.ensure_scalar("scalar")?;
        Ok(self.mat.element_at(self.first_row, self.first_col))
    }

    pub fn scalar_mut(&mut self) -> CResult<&mut T> {
        self.ensure_scalar("scalar")?;
        Ok(self.mat.element_at_mut(self.first_row, self.first_col))
    }

    pub fn set(&mut self, value: T) -> CResult<()> {
        *self.scalar_mut()? = value;
        Ok(())
    }

    fn ensure_scalar(&self, op: &'static str) -> CResult<()> {
        if self.nrows == 1 && self.ncols == 1 {
            Ok(())
        } else {
            Err(CError::incompatible(
                op,
                self.shape_desc(),
                crate::error::ShapeDesc::new(ShapeKind::Variable, 1, 1),
            ))
        }
    }
}

impl<'a, T> MatBase for DynViewMut<'a, T> {
    type Elem = T;

    const KIND: ShapeKind = ShapeKind::Variable;

    fn rows(&self) -> usize {
        self.nrows
    }

    fn cols(&self) -> usize {
        self.ncols
    }

    fn element_at(&self, row: usize, col: usize) -> &T {
        assert!(row < self.nrows && col < self.ncols, "view index out of range");
        self.mat
            .element_at(self.first_row + row, self.first_col + col)
    }
}

impl<'a, T> MatBaseMut for DynViewMut<'a, T> {
    fn element_at_mut(&mut self, row: usize, col: usize) -> &mut T {
        assert!(row < self.nrows && col < self.ncols, "view index out of range");
        self.mat
            .element_at_mut(self.first_row + row, self.first_col + col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::MatCmp;
    use crate::fixed::Mat;

    #[test]
    fn test_basics() {
        let m: DynMat<i32> = DynMat::new(2, 3);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        for row in 0..2 {
            for col in 0..3 {
                assert_eq!(*m.element_at(row, col), 0);
            }
        }
    }

    #[test]
    fn test_from_rows_infers_shape() {
        let m = DynMat::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(*m.element_at(0, 0), 1);
        assert_eq!(*m.element_at(1, 2), 6);
    }

    #[test]
    fn test_with_shape_pads_and_truncates() {
        let m = DynMat::with_shape(3, 2, vec![vec![1], vec![2, 3, 4]]);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 2);
        assert_eq!(*m.element_at(0, 0), 1);
        assert_eq!(*m.element_at(0, 1), 0);
        assert_eq!(*m.element_at(1, 0), 2);
        assert_eq!(*m.element_at(1, 1), 3);
        assert_eq!(*m.element_at(2, 0), 0);
        assert_eq!(*m.element_at(2, 1), 0);
    }

    #[test]
    fn test_zeros_and_from_fn() {
        let z: DynMat<f64> = DynMat::zeros(2, 2);
        assert_eq!(*z.element_at(1, 1), 0.0);

        let m = DynMat::from_fn(2, 3, |row, col| row * 10 + col);
        assert_eq!(*m.element_at(0, 0), 0);
        assert_eq!(*m.element_at(1, 2), 12);
    }

    #[test]
    fn test_comparison_goes_through_fallible_surface() {
        let a = DynMat::from_rows(vec![vec![1, 2], vec![3, 4]]);
        let b = DynMat::from_rows(vec![vec![1, 2], vec![3, 4]]);
        let c = DynMat::from_rows(vec![vec![1, 2], vec![3, 5]]);
        let tall = DynMat::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);

        assert!(a.try_eq(&b).unwrap());
        assert!(!a.try_eq(&c).unwrap());
        assert!(a.try_ne(&c).unwrap());
        assert!(a.try_eq(&tall).is_err());
    }

    #[test]
    fn test_converting_copy_and_move() {
        let small = DynMat::from_rows(vec![vec![1u8, 2], vec![3, 4]]);
        let wide: DynMat<i32> = DynMat::from(&small);
        assert_eq!(*wide.element_at(1, 1), 4);

        let moved: DynMat<i64> = small.converted();
        assert_eq!(moved.rows(), 2);
        assert_eq!(*moved.element_at(0, 1), 2);
    }

    #[test]
    fn test_row_and_column_views() {
        let m = DynMat::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);

        let row = m.row(1);
        assert_eq!(row.rows(), 1);
        assert_eq!(row.cols(), 3);
        assert_eq!(*row.element_at(0, 2), 6);

        let area = m.row_range(1, 2).col(1);
        assert_eq!(area.rows(), 2);
        assert_eq!(area.cols(), 1);
        assert_eq!(*area.element_at(0, 0), 5);
        assert_eq!(*area.element_at(1, 0), 8);

        let wide = m.row_range(0, 2).col_range(1, 2);
        assert_eq!(*wide.element_at(0, 0), 2);
        assert_eq!(*wide.element_at(1, 1), 6);

        assert_eq!(m.all_rows().rows(), 3);
        assert_eq!(m.row_range(1, 2).all_cols().cols(), 3);
    }

    #[test]
    fn test_scalar_access() {
        let m = DynMat::from_rows(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(*m.row(1).col(0).scalar().unwrap(), 3);
        assert!(m.row(1).scalar().is_err());
        assert!(m.all_rows().scalar().is_err());
    }

    #[test]
    fn test_view_mutation_aliases_matrix() {
        let mut m = DynMat::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        {
            let mut v = m.row_mut(1);
            *v.element_at_mut(0, 1) = 50;
            assert_eq!(*v.as_view().element_at(0, 1), 50);
        }
        assert_eq!(*m.element_at(1, 1), 50);

        m.row_mut(0).col(2).set(30).unwrap();
        *m.row_mut(1).col(0).scalar_mut().unwrap() = 40;
        assert_eq!(*m.element_at(0, 2), 30);
        assert_eq!(*m.element_at(1, 0), 40);
    }

    #[test]
    fn test_assignment_is_shape_checked() {
        let mut m = DynMat::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        let good = DynMat::from_rows(vec![vec![7, 8, 9]]);
        let bad = DynMat::from_rows(vec![vec![7, 8]]);

        m.row_mut(0).assign(&good).unwrap();
        assert!(m.try_eq(&DynMat::from_rows(vec![vec![7, 8, 9], vec![4, 5, 6]])).unwrap());

        assert!(m.row_mut(1).assign(&bad).is_err());
        // The rejected assignment must not have touched anything.
        assert_eq!(*m.element_at(1, 0), 4);
    }

    #[test]
    fn test_assignment_from_fixed_source() {
        let mut m = DynMat::from_rows(vec![vec![0, 0, 0]]);
        let fixed = Mat::from([[1, 2, 3]]);
        m.all_rows_mut().assign(&fixed).unwrap();
        assert_eq!(*m.element_at(0, 2), 3);

        let narrow = Mat::from([[1, 2]]);
        assert!(m.all_rows_mut().assign(&narrow).is_err());
    }

    #[test]
    fn test_assign_from_moves_elements() {
        let mut m = DynMat::from_rows(vec![vec!["a".to_string()], vec!["b".to_string()]]);
        let src = DynMat::from_rows(vec![vec!["x".to_string()], vec!["y".to_string()]]);
        m.all_rows_mut().assign_from(src).unwrap();
        assert_eq!(m.element_at(0, 0), "x");
        assert_eq!(m.element_at(1, 0), "y");
    }

    #[test]
    fn test_set_requires_scalar_view() {
        let mut m = DynMat::from_rows(vec![vec![1, 2], vec![3, 4]]);
        assert!(m.row_mut(0).set(9).is_err());
        assert!(m.all_rows_mut().scalar_mut().is_err());
        assert_eq!(*m.element_at(0, 0), 1);
    }

    #[test]
    #[should_panic(expected = "row range out of range")]
    fn test_row_range_out_of_range() {
        let m: DynMat<i32> = DynMat::new(2, 2);
        m.row_range(1, 2);
    }

    #[test]
    #[should_panic(expected = "index out of range")]
    fn test_element_out_of_range() {
        let m: DynMat<i32> = DynMat::new(2, 2);
        m.element_at(2, 0);
    }
}
