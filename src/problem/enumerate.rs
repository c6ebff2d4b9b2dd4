//! Enumeration of value assignments and deterministic seed tests.

use crate::problem::TWayShape;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Mixed-radix counter over `[0, radix_0) x ... x [0, radix_{n-1})`.
///
/// Component 0 varies fastest. A zero radix makes the product empty; an
/// empty radix list yields exactly one empty vector.
#[derive(Debug, Clone)]
pub struct Odometer {
    radices: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl Odometer {
    pub fn new(radices: Vec<usize>) -> Self {
        let current = if radices.iter().any(|&r| r == 0) {
            None
        } else {
            Some(vec![0; radices.len()])
        };
        Self { radices, current }
    }

    /// `n` components, each in `[0, v)`.
    pub fn uniform(n: usize, v: usize) -> Self {
        Self::new(vec![v; n])
    }

    /// Number of vectors still to be produced by a fresh odometer.
    pub fn len_total(&self) -> usize {
        self.radices.iter().product()
    }
}

impl Iterator for Odometer {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let out = self.current.clone()?;
        let mut advanced = false;
        if let Some(cur) = self.current.as_mut() {
            for (digit, &radix) in cur.iter_mut().zip(&self.radices) {
                *digit += 1;
                if *digit < radix {
                    advanced = true;
                    break;
                }
                *digit = 0;
            }
        }
        if !advanced {
            self.current = None;
        }
        Some(out)
    }
}

pub fn is_non_decreasing(values: &[usize]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Draws `count` tests of the given shape from a generator seeded with
/// `seed`. Equal inputs always give equal tests.
pub fn seed_tests(shape: &TWayShape, count: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..shape.n()).map(|_| rng.gen_range(0..shape.v())).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn visits_every_vector_once() {
        let all: Vec<_> = Odometer::uniform(3, 2).collect();
        assert_eq!(all.len(), 8);
        let distinct: HashSet<_> = all.iter().cloned().collect();
        assert_eq!(distinct.len(), 8);
        assert_eq!(all[0], vec![0, 0, 0]);
        assert_eq!(all[1], vec![1, 0, 0]);
        assert_eq!(all[7], vec![1, 1, 1]);
    }

    #[test]
    fn mixed_radix_product() {
        let odo = Odometer::new(vec![3, 1, 2]);
        assert_eq!(odo.len_total(), 6);
        assert_eq!(odo.count(), 6);
    }

    #[test]
    fn degenerate_shapes() {
        assert_eq!(Odometer::uniform(3, 0).count(), 0);
        let empty: Vec<_> = Odometer::uniform(0, 5).collect();
        assert_eq!(empty, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn clone_restarts_independently() {
        let mut odo = Odometer::uniform(2, 3);
        let fresh = odo.clone();
        odo.next();
        assert_eq!(fresh.count(), 9);
        assert_eq!(odo.count(), 8);
    }

    #[test]
    fn monotone_predicate() {
        assert!(is_non_decreasing(&[0, 0, 1, 3]));
        assert!(is_non_decreasing(&[]));
        assert!(!is_non_decreasing(&[1, 0]));
    }

    #[test]
    fn seed_tests_are_reproducible() {
        let shape = TWayShape::new(2, 4, 5).unwrap();
        let a = seed_tests(&shape, 6, 42);
        let b = seed_tests(&shape, 6, 42);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.iter().all(|t| t.len() == 5 && t.iter().all(|&x| x < 4)));
        assert_ne!(a, seed_tests(&shape, 6, 43));
    }
}
