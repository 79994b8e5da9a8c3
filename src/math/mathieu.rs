// Mathieu functions at negative q = -h^2, built from the Fourier coefficients
// of the ordinary functions at +h^2. Angular functions use the quarter-period
// shift psi -> pi/2 - psi; decaying radial functions are Bessel product series
// in s = h e^-eta, t = h e^eta. Radial functions are unnormalised.

use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use num_complex::Complex64;
use thiserror::Error;

use super::bessel::{bessel_i_sequence, bessel_k_sequence};
use crate::solver::basis::MathieuProvider;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MathieuError {
    #[error("Mathieu parameter must be negative and finite, got {q}")]
    InvalidParameter { q: f64 },

    #[error("order {order} exceeds the largest tabulated order {max_order}")]
    OrderOutOfRange { order: usize, max_order: usize },

    #[error("odd Mathieu functions start at order 1")]
    NoOddOrderZero,
}

// Coefficients below this fraction of the largest one are dropped.
const COEFFICIENT_CUTOFF: f64 = 1e-16;

// Orders this close to the truncation size are not trusted.
const TRUNCATION_MARGIN: usize = 20;

// One symmetry class, indexed by n in increasing characteristic value.
#[derive(Debug, Clone)]
struct Family {
    characteristic: Vec<f64>,
    coefficients: Vec<Vec<f64>>,
}

impl Family {
    fn new(diagonal: Vec<f64>, off_diagonal: Vec<f64>, first_scale: f64) -> Family {
        let size = diagonal.len();
        let matrix = DMatrix::from_fn(size, size, |i, j| {
            if i == j {
                diagonal[i]
            } else if i + 1 == j {
                off_diagonal[i]
            } else if j + 1 == i {
                off_diagonal[j]
            } else {
                0.0
            }
        });
        let eigen = SymmetricEigen::new(matrix);

        let mut order: Vec<usize> = (0..size).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

        let mut characteristic = Vec::with_capacity(size);
        let mut coefficients = Vec::with_capacity(size);
        for (n, &col) in order.iter().enumerate() {
            characteristic.push(eigen.eigenvalues[col]);

            let mut c: Vec<f64> = eigen.eigenvectors.column(col).iter().copied().collect();
            c[0] *= first_scale;
            // Tends to the plain harmonic of the same order as q -> 0.
            if c[n] < 0.0 {
                c.iter_mut().for_each(|v| *v = -*v);
            }
            let largest = c.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            let len = c
                .iter()
                .rposition(|v| v.abs() > COEFFICIENT_CUTOFF * largest)
                .map_or(1, |i| i + 1)
                .max(n + 1);
            c.truncate(len);
            coefficients.push(c);
        }
        Family {
            characteristic,
            coefficients,
        }
    }
}

fn alternating(n: usize) -> f64 {
    if n % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Mathieu functions at a fixed negative parameter `q`.
#[derive(Debug, Clone)]
pub struct Mathieu {
    q: f64,
    h: f64,
    max_order: usize,
    // Coefficients of ce_{2n}, ce_{2n+1}, se_{2n+1}, se_{2n+2} at +h^2.
    a_even: Family,
    a_odd: Family,
    b_odd: Family,
    b_even: Family,
}

impl Mathieu {
    pub fn new(q: f64) -> Result<Mathieu, MathieuError> {
        if !(q.is_finite() && q < 0.0) {
            return Err(MathieuError::InvalidParameter { q });
        }
        let h2 = -q;
        let h = h2.sqrt();
        let size = 40 + (2.0 * h).ceil() as usize;
        debug!("Mathieu::new(q={}), truncation size {}", q, size);

        let squares = |offset: usize| -> Vec<f64> {
            (0..size).map(|r| ((2 * r + offset) as f64).powi(2)).collect()
        };
        let off = vec![h2; size - 1];

        // ce_{2n}: the first row couples with weight 2q; rescaling A_0 by
        // sqrt(2) makes the matrix symmetric and the unit eigenvector
        // satisfies 2 A_0^2 + Σ A_{2r}^2 = 1.
        let mut off_even = off.clone();
        off_even[0] *= std::f64::consts::SQRT_2;
        let a_even = Family::new(squares(0), off_even, std::f64::consts::FRAC_1_SQRT_2);

        let mut diag = squares(1);
        diag[0] += h2;
        let a_odd = Family::new(diag, off.clone(), 1.0);

        let mut diag = squares(1);
        diag[0] -= h2;
        let b_odd = Family::new(diag, off.clone(), 1.0);

        let b_even = Family::new(squares(2), off, 1.0);

        Ok(Mathieu {
            q,
            h,
            max_order: 2 * (size - TRUNCATION_MARGIN),
            a_even,
            a_odd,
            b_odd,
            b_even,
        })
    }

    fn check_order(&self, order: usize) -> Result<(), MathieuError> {
        if order > self.max_order {
            Err(MathieuError::OrderOutOfRange {
                order,
                max_order: self.max_order,
            })
        } else {
            Ok(())
        }
    }

    // Family and index backing the even (cosine-type) function of `order`.
    fn even_family(&self, order: usize) -> (&Family, usize) {
        if order % 2 == 0 {
            (&self.a_even, order / 2)
        } else {
            (&self.b_odd, (order - 1) / 2)
        }
    }

    // Family and index backing the odd (sine-type) function of `order >= 1`.
    fn odd_family(&self, order: usize) -> (&Family, usize) {
        if order % 2 == 1 {
            (&self.a_odd, (order - 1) / 2)
        } else {
            (&self.b_even, (order - 2) / 2)
        }
    }

    pub fn even_characteristic(&self, order: usize) -> Result<f64, MathieuError> {
        self.check_order(order)?;
        let (family, n) = self.even_family(order);
        Ok(family.characteristic[n])
    }

    pub fn odd_characteristic(&self, order: usize) -> Result<f64, MathieuError> {
        self.check_order(order)?;
        if order == 0 {
            return Err(MathieuError::NoOddOrderZero);
        }
        let (family, n) = self.odd_family(order);
        Ok(family.characteristic[n])
    }

    fn angular_even(&self, order: usize, psi: f64) -> f64 {
        let (family, n) = self.even_family(order);
        // Harmonics are 2r for even orders and 2r + 1 for odd ones.
        let base = order % 2;
        let sum: f64 = family.coefficients[n]
            .iter()
            .enumerate()
            .map(|(r, c)| alternating(r) * c * (((2 * r + base) as f64) * psi).cos())
            .sum();
        alternating(n) * sum
    }

    fn angular_odd(&self, order: usize, psi: f64) -> f64 {
        let (family, n) = self.odd_family(order);
        let base = if order % 2 == 1 { 1 } else { 2 };
        let sum: f64 = family.coefficients[n]
            .iter()
            .enumerate()
            .map(|(r, c)| alternating(r) * c * (((2 * r + base) as f64) * psi).sin())
            .sum();
        alternating(n) * sum
    }

    fn bessel_products(&self, len: usize, eta: f64) -> (Vec<f64>, Vec<f64>) {
        let s = self.h * (-eta).exp();
        let t = self.h * eta.exp();
        (bessel_i_sequence(len, s), bessel_k_sequence(len, t))
    }

    fn series_len(&self, max_order: usize) -> usize {
        (0..=max_order)
            .flat_map(|m| {
                let even = self.even_family(m);
                let odd = (m > 0).then(|| self.odd_family(m));
                std::iter::once(even).chain(odd)
            })
            .map(|(family, n)| family.coefficients[n].len())
            .max()
            .unwrap_or(1)
            + 2
    }

    fn radial_even(&self, order: usize, i: &[f64], k: &[f64]) -> f64 {
        let (family, n) = self.even_family(order);
        let coefficients = family.coefficients[n].iter().enumerate();
        if order % 2 == 0 {
            coefficients.map(|(r, c)| c * i[r] * k[r]).sum()
        } else {
            coefficients
                .map(|(r, c)| c * (i[r] * k[r + 1] - i[r + 1] * k[r]))
                .sum()
        }
    }

    fn radial_odd(&self, order: usize, i: &[f64], k: &[f64]) -> f64 {
        let (family, n) = self.odd_family(order);
        let coefficients = family.coefficients[n].iter().enumerate();
        if order % 2 == 1 {
            coefficients
                .map(|(r, c)| c * (i[r] * k[r + 1] + i[r + 1] * k[r]))
                .sum()
        } else {
            coefficients
                .map(|(r, c)| c * (i[r] * k[r + 2] - i[r + 2] * k[r]))
                .sum()
        }
    }
}

impl MathieuProvider for Mathieu {
    fn q(&self) -> f64 {
        self.q
    }

    fn max_order(&self) -> usize {
        self.max_order
    }

    fn ce(&self, order: usize, psi: f64) -> Result<Complex64, MathieuError> {
        self.check_order(order)?;
        Ok(Complex64::new(self.angular_even(order, psi), 0.0))
    }

    fn se(&self, order: usize, psi: f64) -> Result<Complex64, MathieuError> {
        self.check_order(order)?;
        if order == 0 {
            return Err(MathieuError::NoOddOrderZero);
        }
        Ok(Complex64::new(self.angular_odd(order, psi), 0.0))
    }

    fn ke(&self, order: usize, eta: f64) -> Result<Complex64, MathieuError> {
        self.check_order(order)?;
        let (i, k) = self.bessel_products(self.series_len(order), eta);
        Ok(Complex64::new(self.radial_even(order, &i, &k), 0.0))
    }

    fn ko(&self, order: usize, eta: f64) -> Result<Complex64, MathieuError> {
        self.check_order(order)?;
        if order == 0 {
            return Err(MathieuError::NoOddOrderZero);
        }
        let (i, k) = self.bessel_products(self.series_len(order), eta);
        Ok(Complex64::new(self.radial_odd(order, &i, &k), 0.0))
    }

    fn radial(
        &self,
        max_order: usize,
        eta: f64,
    ) -> Result<(Vec<Complex64>, Vec<Complex64>), MathieuError> {
        self.check_order(max_order)?;
        // One Bessel sweep serves every order.
        let (i, k) = self.bessel_products(self.series_len(max_order), eta);
        let even = (0..=max_order)
            .map(|m| Complex64::new(self.radial_even(m, &i, &k), 0.0))
            .collect();
        let odd = (0..=max_order)
            .map(|m| {
                let v = if m == 0 { 0.0 } else { self.radial_odd(m, &i, &k) };
                Complex64::new(v, 0.0)
            })
            .collect();
        Ok((even, odd))
    }
}
