//! Shared test pencils for the driver and its benchmarks.

use pencil_core::linalg::dense::{from_real_rows, random_gaussian};
use pencil_core::Pencil;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Named pencil definition.
#[derive(Clone)]
pub struct TestPencil {
    pub name: &'static str,
    pub builder: fn() -> Pencil,
}

/// Complex Gaussian pencil of size n from a fixed seed.
pub fn random_pencil(n: usize, seed: u64) -> Pencil {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = random_gaussian(n, &mut rng);
    let b = random_gaussian(n, &mut rng);
    Pencil { a, b }
}

/// `A = I`, `B` the 2 × 2 swap: eigenvalues ±1, but the identity factors put
/// both diagonal pairs on the unstable side.
pub fn swap_pencil() -> Pencil {
    Pencil {
        a: from_real_rows(2, &[1.0, 0.0, 0.0, 1.0]),
        b: from_real_rows(2, &[0.0, 1.0, 1.0, 0.0]),
    }
}

/// Upper-triangular pencil with eigenvalues −1/2, 1/10 and 7/9.
fn stable_triangular() -> Pencil {
    Pencil {
        a: from_real_rows(3, &[0.5, 1.0, 2.0, 0.0, -0.2, 3.0, 0.0, 0.0, 0.7]),
        b: from_real_rows(3, &[1.0, -1.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0, -0.9]),
    }
}

/// `B = I`, `A` a 3 × 3 Jordan block with eigenvalue −2.
fn jordan_unstable() -> Pencil {
    Pencil {
        a: from_real_rows(3, &[2.0, 1.0, 0.0, 0.0, 2.0, 1.0, 0.0, 0.0, 2.0]),
        b: from_real_rows(3, &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]),
    }
}

/// `B` singular: one infinite eigenvalue.
fn singular_b() -> Pencil {
    Pencil {
        a: from_real_rows(2, &[1.0, 0.0, 0.0, 0.5]),
        b: from_real_rows(2, &[0.0, 0.0, 0.0, 1.0]),
    }
}

fn random_4() -> Pencil {
    random_pencil(4, 12345)
}

fn random_8() -> Pencil {
    random_pencil(8, 12345)
}

pub fn synthetic_test_pencils() -> Vec<TestPencil> {
    vec![
        TestPencil { name: "SWAP_2", builder: swap_pencil },
        TestPencil { name: "TRI_STABLE_3", builder: stable_triangular },
        TestPencil { name: "JORDAN_3", builder: jordan_unstable },
        TestPencil { name: "SINGULAR_B_2", builder: singular_b },
        TestPencil { name: "RANDOM_4", builder: random_4 },
        TestPencil { name: "RANDOM_8", builder: random_8 },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_pencils_are_valid() {
        for tp in synthetic_test_pencils() {
            let p = (tp.builder)();
            assert!(p.validate().is_ok(), "{}", tp.name);
        }
    }

    #[test]
    fn test_random_pencil_is_reproducible() {
        assert_eq!(random_pencil(3, 9), random_pencil(3, 9));
        assert_ne!(random_pencil(3, 9), random_pencil(3, 10));
    }
}
