use crate::storage::{Slot, Trusted, Verify};
use std::mem::ManuallyDrop;

/// Destructs every slot in descending index order.
///
/// Callers guarantee all slots in the slice are holding.
pub(crate) fn tear_down<T, V: Verify>(slots: &mut [Slot<T, V>]) {
    for slot in slots.iter_mut().rev() {
        unsafe { slot.destruct() };
    }
}

/// Tracks the fully constructed prefix during a staged build. If the
/// build is abandoned (provider error or panic), dropping the guard
/// destructs that prefix in descending order; a completed build
/// forgets the guard instead.
struct Rollback<'a, T, V: Verify> {
    slots: &'a mut [Slot<T, V>],
    built: usize,
}

impl<'a, T, V: Verify> Drop for Rollback<'a, T, V> {
    fn drop(&mut self) {
        tear_down(&mut self.slots[..self.built]);
    }
}

/// Constructs `slots[i]` from `provider(i)` for ascending `i`,
/// all-or-nothing. On failure every already constructed slot is
/// destructed in descending order exactly once and the failure is
/// passed back; no slot is ever left half-constructed.
pub(crate) fn build_into<T, V, E, P>(slots: &mut [Slot<T, V>], mut provider: P) -> Result<(), E>
where
    V: Verify,
    P: FnMut(usize) -> Result<T, E>,
{
    let len = slots.len();
    let mut guard = Rollback { slots, built: 0 };
    for index in 0..len {
        let value = provider(index)?;
        guard.slots[index].construct(value);
        guard.built = index + 1;
    }
    std::mem::forget(guard);
    Ok(())
}

/// Fixed-length owning sequence of slots with all-or-nothing
/// construction. At any externally observable point every slot is
/// holding; destruction destructs all `N` slots in descending order.
pub struct StagedArray<T, const N: usize, V: Verify = Trusted> {
    slots: [Slot<T, V>; N],
}

impl<T, const N: usize, V: Verify> StagedArray<T, N, V> {
    fn empty_slots() -> [Slot<T, V>; N] {
        std::array::from_fn(|_| Slot::new())
    }

    pub fn try_build<E, P>(provider: P) -> Result<StagedArray<T, N, V>, E>
    where
        P: FnMut(usize) -> Result<T, E>,
    {
        let mut slots = Self::empty_slots();
        build_into(&mut slots, provider)?;
        Ok(StagedArray { slots })
    }

    /// Infallible provider variant; still rolls back if the provider
    /// panics.
    pub fn build<P>(mut provider: P) -> StagedArray<T, N, V>
    where
        P: FnMut(usize) -> T,
    {
        match Self::try_build::<std::convert::Infallible, _>(|index| Ok(provider(index))) {
            Ok(array) => array,
            Err(never) => match never {},
        }
    }

    /// Element-wise converting copy from an array of another element
    /// type (and possibly another verification policy).
    pub fn from_ref<U, V2>(other: &StagedArray<U, N, V2>) -> StagedArray<T, N, V>
    where
        T: From<U>,
        U: Clone,
        V2: Verify,
    {
        Self::build(|index| T::from(other[index].clone()))
    }

    pub fn len(&self) -> usize {
        N
    }

    pub fn is_empty(&self) -> bool {
        N == 0
    }
}

impl<T: Default, const N: usize, V: Verify> Default for StagedArray<T, N, V> {
    fn default() -> Self {
        Self::build(|_| T::default())
    }
}

impl<T, const N: usize, V: Verify> From<[T; N]> for StagedArray<T, N, V> {
    fn from(values: [T; N]) -> Self {
        let values = ManuallyDrop::new(values);
        let mut slots = Self::empty_slots();
        for (slot, value) in slots.iter_mut().zip(values.iter()) {
            // Ownership of each element transfers into its slot.
            slot.construct(unsafe { std::ptr::read(value) });
        }
        StagedArray { slots }
    }
}

impl<T: Clone, const N: usize, V: Verify> Clone for StagedArray<T, N, V> {
    fn clone(&self) -> Self {
        Self::build(|index| self[index].clone())
    }
}

impl<T, const N: usize, V: Verify> std::ops::Index<usize> for StagedArray<T, N, V> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        unsafe { self.slots[index].value() }
    }
}

impl<T, const N: usize, V: Verify> std::ops::IndexMut<usize> for StagedArray<T, N, V> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        unsafe { self.slots[index].value_mut() }
    }
}

impl<T, const N: usize, V: Verify> Drop for StagedArray<T, N, V> {
    fn drop(&mut self) {
        tear_down(&mut self.slots);
    }
}

/// Moves elements out front-to-back; dropping the iterator mid-way
/// destructs the remaining tail in descending order.
pub struct ElemIter<T, const N: usize, V: Verify> {
    array: ManuallyDrop<StagedArray<T, N, V>>,
    front: usize,
}

impl<T, const N: usize, V: Verify> Iterator for ElemIter<T, N, V> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front < N {
            let value = unsafe { self.array.slots[self.front].take() };
            self.front += 1;
            Some(value)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = N - self.front;
        (rest, Some(rest))
    }
}

impl<T, const N: usize, V: Verify> ExactSizeIterator for ElemIter<T, N, V> {}

impl<T, const N: usize, V: Verify> Drop for ElemIter<T, N, V> {
    fn drop(&mut self) {
        tear_down(&mut self.array.slots[self.front..]);
    }
}

impl<T, const N: usize, V: Verify> IntoIterator for StagedArray<T, N, V> {
    type Item = T;
    type IntoIter = ElemIter<T, N, V>;

    fn into_iter(self) -> Self::IntoIter {
        ElemIter {
            array: ManuallyDrop::new(self),
            front: 0,
        }
    }
}

/// The staged construction protocol over a rectangular slot grid,
/// addressed by flat row-major index (`i = row * C + col`).
///
/// Stable const generics cannot name `StagedArray<T, { R * C }>`, so
/// the grid carries `[[Slot<T>; C]; R]` and shares the build machinery
/// through the flattened slice.
pub struct StagedGrid<T, const R: usize, const C: usize> {
    slots: [[Slot<T>; C]; R],
}

impl<T, const R: usize, const C: usize> StagedGrid<T, R, C> {
    fn empty_slots() -> [[Slot<T>; C]; R] {
        std::array::from_fn(|_| std::array::from_fn(|_| Slot::new()))
    }

    fn flat_mut(&mut self) -> &mut [Slot<T>] {
        self.slots.as_flattened_mut()
    }

    pub fn try_build<E, P>(provider: P) -> Result<StagedGrid<T, R, C>, E>
    where
        P: FnMut(usize) -> Result<T, E>,
    {
        let mut slots = Self::empty_slots();
        build_into(slots.as_flattened_mut(), provider)?;
        Ok(StagedGrid { slots })
    }

    pub fn build<P>(mut provider: P) -> StagedGrid<T, R, C>
    where
        P: FnMut(usize) -> T,
    {
        match Self::try_build::<std::convert::Infallible, _>(|index| Ok(provider(index))) {
            Ok(grid) => grid,
            Err(never) => match never {},
        }
    }

    pub fn from_ref<U>(other: &StagedGrid<U, R, C>) -> StagedGrid<T, R, C>
    where
        T: From<U>,
        U: Clone,
    {
        Self::build(|index| T::from(other.at(index / C, index % C).clone()))
    }

    pub fn at(&self, row: usize, col: usize) -> &T {
        unsafe { self.slots[row][col].value() }
    }

    pub fn at_mut(&mut self, row: usize, col: usize) -> &mut T {
        unsafe { self.slots[row][col].value_mut() }
    }
}

impl<T: Default, const R: usize, const C: usize> Default for StagedGrid<T, R, C> {
    fn default() -> Self {
        Self::build(|_| T::default())
    }
}

impl<T, const R: usize, const C: usize> From<[[T; C]; R]> for StagedGrid<T, R, C> {
    fn from(values: [[T; C]; R]) -> Self {
        let values = ManuallyDrop::new(values);
        let mut slots = Self::empty_slots();
        for (slot, value) in slots
            .as_flattened_mut()
            .iter_mut()
            .zip(values.as_flattened().iter())
        {
            slot.construct(unsafe { std::ptr::read(value) });
        }
        StagedGrid { slots }
    }
}

impl<T: Clone, const R: usize, const C: usize> Clone for StagedGrid<T, R, C> {
    fn clone(&self) -> Self {
        Self::build(|index| self.at(index / C, index % C).clone())
    }
}

impl<T, const R: usize, const C: usize> Drop for StagedGrid<T, R, C> {
    fn drop(&mut self) {
        tear_down(self.flat_mut());
    }
}

/// Row-major owning element iterator over a grid.
pub struct GridElemIter<T, const R: usize, const C: usize> {
    grid: ManuallyDrop<StagedGrid<T, R, C>>,
    front: usize,
}

impl<T, const R: usize, const C: usize> Iterator for GridElemIter<T, R, C> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front < R * C {
            let index = self.front;
            self.front += 1;
            Some(unsafe { self.grid.slots[index / C][index % C].take() })
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = R * C - self.front;
        (rest, Some(rest))
    }
}

impl<T, const R: usize, const C: usize> ExactSizeIterator for GridElemIter<T, R, C> {}

impl<T, const R: usize, const C: usize> Drop for GridElemIter<T, R, C> {
    fn drop(&mut self) {
        tear_down(&mut self.grid.slots.as_flattened_mut()[self.front..]);
    }
}

impl<T, const R: usize, const C: usize> IntoIterator for StagedGrid<T, R, C> {
    type Item = T;
    type IntoIter = GridElemIter<T, R, C>;

    fn into_iter(self) -> Self::IntoIter {
        GridElemIter {
            grid: ManuallyDrop::new(self),
            front: 0,
        }
    }
}
