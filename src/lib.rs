mod base;
mod dynamic;
mod error;
mod fixed;
mod staged;
mod storage;

pub use crate::base::{IntoElements, MatBase, MatBaseMut, MatCmp, Scalar};
pub use crate::dynamic::{DynMat, DynView, DynViewMut};
pub use crate::error::{CError, CResult, ShapeDesc, ShapeKind};
pub use crate::fixed::{FixedShape, Mat, MatView, MatViewMut};
pub use crate::staged::{ElemIter, GridElemIter, StagedArray, StagedGrid};
pub use crate::storage::{Slot, Trusted, Verified, Verify};

/// Fixed-shape matrix literal; the row and column counts come from the
/// nesting.
#[macro_export]
macro_rules! mat {
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {{
        $crate::Mat::from([$([$($x,)*],)*])
    }};
    ($($x:expr),+ $(,)*) => {{
        $crate::Mat::from([[$($x,)*]])
    }};
}

/// Variable-shape matrix literal; the column count is the longest row.
#[macro_export]
macro_rules! dmat {
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {{
        $crate::DynMat::from_rows(vec![$(vec![$($x,)*],)*])
    }};
    ($($x:expr),+ $(,)*) => {{
        $crate::DynMat::from_rows(vec![vec![$($x,)*]])
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mat_literal() {
        let m = mat![[1, 2, 3], [4, 5, 6]];
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(*MatBase::element_at(&m, 1, 2), 6);

        let row = mat![1, 2, 3];
        assert_eq!(row.rows(), 1);
        assert_eq!(row.cols(), 3);
    }

    #[test]
    fn test_dmat_literal() {
        let m = dmat![[1, 2, 3], [4, 5, 6]];
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);

        let ragged = dmat![[1], [2, 3]];
        assert_eq!(ragged.cols(), 2);
        assert_eq!(*ragged.element_at(0, 1), 0);
    }

    #[test]
    fn test_cross_literal_comparison() {
        let fixed = mat![[1, 2], [3, 4]];
        let variable = dmat![[1, 2], [3, 4]];
        assert!(fixed.try_eq(&variable).unwrap());
    }
}
