use std::mem::MaybeUninit;

/// State tracking policy for a [`Slot`].
///
/// `Trusted` compiles every check away; `Verified` keeps the holding
/// flag and panics on any illegal lifecycle transition, which makes it
/// usable as an instrumented probe for the staged construction
/// protocol.
pub trait Verify: Default {
    fn note(&mut self, holding: bool);
    fn expect(&self, holding: bool, op: &'static str);
}

/// Zero-overhead policy: the caller guarantees every transition.
#[derive(Default)]
pub struct Trusted;

impl Verify for Trusted {
    #[inline(always)]
    fn note(&mut self, _holding: bool) {}

    #[inline(always)]
    fn expect(&self, _holding: bool, _op: &'static str) {}
}

/// Tracked policy: rejects double-construct, double-destruct and
/// access while empty.
#[derive(Default)]
pub struct Verified {
    holding: bool,
}

impl Verify for Verified {
    fn note(&mut self, holding: bool) {
        self.holding = holding;
    }

    fn expect(&self, holding: bool, op: &'static str) {
        if self.holding != holding {
            panic!(
                "invalid slot state in {}: expected {}",
                op,
                if holding { "holding" } else { "empty" }
            );
        }
    }
}

/// Storage for zero or one `T`, with an explicit construct/destruct
/// lifecycle driven by its owner.
///
/// With `V = Trusted` the slot is exactly the size of `T` and performs
/// no checks; the `unsafe` accessors put the holding-state obligation
/// on the caller. With `V = Verified` every accessor checks the tracked
/// flag first and panics before any uninitialized access could happen.
pub struct Slot<T, V: Verify = Trusted> {
    value: MaybeUninit<T>,
    state: V,
}

impl<T, V: Verify> Slot<T, V> {
    pub fn new() -> Slot<T, V> {
        Slot {
            value: MaybeUninit::uninit(),
            state: V::default(),
        }
    }

    /// Places `value` into the slot. Constructing over an already
    /// holding `Trusted` slot leaks the old value; a `Verified` slot
    /// panics instead.
    pub fn construct(&mut self, value: T) {
        self.state.expect(false, "construct");
        self.value.write(value);
        self.state.note(true);
    }

    /// Drops the held value and returns the slot to empty.
    ///
    /// # Safety
    /// The slot must be holding a value. `Verified` slots check this
    /// and panic before anything else happens.
    pub unsafe fn destruct(&mut self) {
        self.state.expect(true, "destruct");
        self.value.assume_init_drop();
        self.state.note(false);
    }

    /// Moves the held value out and returns the slot to empty.
    ///
    /// # Safety
    /// The slot must be holding a value.
    pub unsafe fn take(&mut self) -> T {
        self.state.expect(true, "take");
        self.state.note(false);
        self.value.assume_init_read()
    }

    /// # Safety
    /// The slot must be holding a value.
    pub unsafe fn value(&self) -> &T {
        self.state.expect(true, "value");
        self.value.assume_init_ref()
    }

    /// # Safety
    /// The slot must be holding a value.
    pub unsafe fn value_mut(&mut self) -> &mut T {
        self.state.expect(true, "value_mut");
        self.value.assume_init_mut()
    }
}

impl<T, V: Verify> Default for Slot<T, V> {
    fn default() -> Self {
        Slot::new()
    }
}

impl<T, V: Verify> Drop for Slot<T, V> {
    fn drop(&mut self) {
        // A Verified slot dropped while holding is a leaked element.
        // Skipped mid-unwind: the owner's rollback already reported.
        if !std::thread::panicking() {
            self.state.expect(false, "drop");
        }
    }
}
