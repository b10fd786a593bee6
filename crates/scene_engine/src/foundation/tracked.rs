//! Change-tracked values
//!
//! A [`Tracked`] value carries a generation counter that moves forward only
//! when the stored value actually changes. Caches remember the generation they
//! were computed from; a differing generation means the cache is stale.

/// Value plus a generation bumped on every real change
#[derive(Debug, Clone, Copy)]
pub struct Tracked<T> {
    value: T,
    generation: u64,
}

impl<T: PartialEq> Tracked<T> {
    /// Wrap an initial value at generation 0
    pub const fn new(value: T) -> Self {
        Self { value, generation: 0 }
    }

    /// Current value
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Store `value`, returning whether it differed from the old one
    ///
    /// Writing an equal value leaves the generation alone.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.generation += 1;
        true
    }

    /// Mutate through a closure; counts as a change if the result differs
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) -> bool {
        let next = f(&self.value);
        self.set(next)
    }
}

impl<T: PartialEq + Default> Default for Tracked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_write_keeps_generation() {
        let mut value = Tracked::new(3);
        assert!(!value.set(3));
        assert_eq!(value.generation(), 0);
    }

    #[test]
    fn test_change_bumps_generation() {
        let mut value = Tracked::new(1.0_f32);
        assert!(value.set(2.0));
        assert!(value.update(|v| v * 2.0));
        assert_eq!(*value.get(), 4.0);
        assert_eq!(value.generation(), 2);
    }
}
