use crate::models::Subject;

/// Fixed cyclic rotation over the store. Never terminates.
#[derive(Debug, Clone, Default)]
pub struct CyclicRotation {
    index: usize,
}

impl CyclicRotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current<'a>(&self, subjects: &'a [Subject]) -> Option<&'a Subject> {
        if subjects.is_empty() {
            return None;
        }
        subjects.get(self.index % subjects.len())
    }

    /// Moves to the next subject, wrapping at `count`, and returns the new index.
    pub fn advance(&mut self, count: usize) -> usize {
        self.index = if count == 0 { 0 } else { (self.index + 1) % count };
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_cycles_through_the_store() {
        let mut cyclic = CyclicRotation::new();
        let mut sequence = vec![cyclic.index()];
        for _ in 0..6 {
            sequence.push(cyclic.advance(3));
        }
        assert_eq!(sequence, [0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn reset_rewinds_and_empty_store_is_safe() {
        let mut cyclic = CyclicRotation::new();
        cyclic.advance(3);
        cyclic.reset();
        assert_eq!(cyclic.index(), 0);
        assert_eq!(cyclic.advance(0), 0);
        assert!(cyclic.current(&[]).is_none());
    }
}
