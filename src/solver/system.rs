use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::geometry::elliptic::to_elliptic;

use super::basis::{basis_len, MathieuBasis};
use super::map_indexed;

#[derive(Debug, Clone)]
pub struct BoundarySystem {
    pub matrix: DMatrix<f64>,
    pub target: DVector<f64>,
}

/// Solved expansion coefficients. Element `e` owns the slice starting at
/// `e * terms_per_element`, in basis term order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientVector {
    values: Vec<f64>,
    terms_per_element: usize,
}

impl CoefficientVector {
    pub fn new(values: Vec<f64>, terms_per_element: usize) -> Result<Self> {
        if terms_per_element == 0 || values.len() % terms_per_element != 0 {
            return Err(Error::InvalidConfig(format!(
                "{} coefficients do not split into blocks of {}",
                values.len(),
                terms_per_element
            )));
        }
        Ok(CoefficientVector {
            values,
            terms_per_element,
        })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Coefficients of element `e`. Panics if `e >= num_elements()`.
    pub fn element(&self, e: usize) -> &[f64] {
        &self.values[e * self.terms_per_element..(e + 1) * self.terms_per_element]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn terms_per_element(&self) -> usize {
        self.terms_per_element
    }

    pub fn num_elements(&self) -> usize {
        self.values.len() / self.terms_per_element
    }
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub coefficients: CoefficientVector,
    pub rank: usize,
    // ‖A c - b‖₂
    pub residual_norm: f64,
    pub singular_values: Vec<f64>,
}

pub struct SystemBuilder<'a> {
    config: &'a SimulationConfig,
    basis: &'a MathieuBasis,
}

impl<'a> SystemBuilder<'a> {
    pub fn new(config: &'a SimulationConfig, basis: &'a MathieuBasis) -> Self {
        SystemBuilder { config, basis }
    }

    // Basis values of every element at collocation point `cp` of element `e1`.
    pub fn row(&self, e1: usize, cp: usize) -> Result<Vec<f64>> {
        let elements = &self.config.elements;
        let stretch = self.config.stretch();
        let source = elements.get(e1).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "element {} out of range for {} elements",
                e1,
                elements.len()
            ))
        })?;
        let point = *source.outline.get(cp).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "collocation point {} out of range for element {} with {} points",
                cp,
                e1,
                source.outline.len()
            ))
        })?;

        let mut row = Vec::with_capacity(elements.len() * self.basis.len());
        for (e2, influencing) in elements.iter().enumerate() {
            // Express the point as an offset from the influencing element.
            let (x, y) = if e1 == e2 {
                (point.x, point.y)
            } else {
                (
                    point.x + source.x - influencing.x,
                    point.y + source.y - influencing.y,
                )
            };
            let coords = to_elliptic(x, y, influencing.d, stretch).map_err(|source| {
                Error::CollocationDomain {
                    source_element: e1,
                    influencing_element: e2,
                    collocation_index: cp,
                    source,
                }
            })?;
            self.basis
                .extend_terms(influencing.q, coords, &mut row)
                .map_err(|source| Error::Basis {
                    element: e2,
                    source,
                })?;
        }
        Ok(row)
    }

    pub fn assemble(&self) -> Result<BoundarySystem> {
        let elements = &self.config.elements;
        if elements.is_empty() {
            return Err(Error::NoElements);
        }
        let num_cp = self.config.discretization.num_cp;
        let num_terms = self.config.discretization.num_terms;
        if self.basis.num_terms() != num_terms {
            return Err(Error::InvalidConfig(format!(
                "basis has {} orders but num_terms is {}",
                self.basis.num_terms(),
                num_terms
            )));
        }
        for (i, e) in elements.iter().enumerate() {
            if e.outline.len() != num_cp || e.target.len() != num_cp {
                return Err(Error::InvalidConfig(format!(
                    "element {} has {} outline points and {} targets, expected {}",
                    i,
                    e.outline.len(),
                    e.target.len(),
                    num_cp
                )));
            }
        }

        let num_rows = elements.len() * num_cp;
        let num_cols = elements.len() * basis_len(num_terms);
        debug!("Assembling {}x{} boundary system", num_rows, num_cols);

        let rows = map_indexed(num_rows, |r| self.row(r / num_cp, r % num_cp))
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        let matrix = DMatrix::from_row_iterator(num_rows, num_cols, rows.into_iter().flatten());
        let target = DVector::from_iterator(
            num_rows,
            elements.iter().flat_map(|e| e.target.iter().copied()),
        );
        Ok(BoundarySystem { matrix, target })
    }

    pub fn solve(&self) -> Result<Solution> {
        let system = self.assemble()?;
        least_squares(&system, basis_len(self.config.discretization.num_terms))
    }
}

/// Minimum-norm least-squares solution by SVD. Singular values below
/// `eps * max(m, n) * σ_max` are treated as zero.
pub fn least_squares(system: &BoundarySystem, terms_per_element: usize) -> Result<Solution> {
    let (m, n) = system.matrix.shape();
    let svd = system.matrix.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    let eps = f64::EPSILON * m.max(n) as f64 * sigma_max;

    let rank = svd.rank(eps);
    let minimal = m.min(n);
    if rank < minimal {
        warn!(
            "Boundary system is rank deficient: rank {} of {}",
            rank, minimal
        );
    }

    let c = svd.solve(&system.target, eps).map_err(|e| Error::Solve(e.to_string()))?;
    let residual_norm = (&system.matrix * &c - &system.target).norm();
    if !residual_norm.is_finite() {
        return Err(Error::Solve(format!(
            "non-finite residual {}",
            residual_norm
        )));
    }

    Ok(Solution {
        coefficients: CoefficientVector::new(c.iter().copied().collect(), terms_per_element)?,
        rank,
        residual_norm,
        singular_values: svd.singular_values.iter().copied().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::testing::{config_with, trig_basis};
    use crate::element::Element;
    use approx::assert_relative_eq;

    #[test]
    fn test_coefficient_slices() {
        let c = CoefficientVector::new((0..6).map(f64::from).collect(), 3).unwrap();
        assert_eq!(c.num_elements(), 2);
        assert_eq!(c.element(1), &[3.0, 4.0, 5.0]);
        assert!(CoefficientVector::new(vec![1.0; 5], 3).is_err());
    }

    #[test]
    fn test_dimensions() {
        let mut config = config_with(
            vec![
                Element::circle(0.0, 0.0, 1.0, 1.0),
                Element::circle(5.0, 1.0, 0.5, 2.0),
                Element::circle(-4.0, 3.0, 0.8, 0.5),
            ],
            6,
            3,
        );
        config.prepare_elements().unwrap();
        let basis = trig_basis(3);
        let system = SystemBuilder::new(&config, &basis).assemble().unwrap();
        assert_eq!(system.matrix.shape(), (18, 15));
        assert_eq!(system.target.len(), 18);
        assert_eq!(system.target[6], config.elements[1].target[0]);
    }

    #[test]
    fn test_least_squares_exact_system() {
        let system = BoundarySystem {
            matrix: DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            target: DVector::from_vec(vec![1.0, 2.0, 3.0]),
        };
        let solution = least_squares(&system, 1).unwrap();
        assert_eq!(solution.rank, 2);
        assert_relative_eq!(solution.coefficients.as_slice()[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(solution.coefficients.as_slice()[1], 2.0, epsilon = 1e-12);
        assert!(solution.residual_norm < 1e-12);
    }

    #[test]
    fn test_least_squares_rank_deficient() {
        // Duplicate columns: the minimum-norm solution splits the weight.
        let system = BoundarySystem {
            matrix: DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 2.0, 2.0]),
            target: DVector::from_vec(vec![1.0, 2.0]),
        };
        let solution = least_squares(&system, 2).unwrap();
        assert_eq!(solution.rank, 1);
        assert_relative_eq!(solution.coefficients.as_slice()[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(solution.coefficients.as_slice()[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_collocation_failure_names_the_pair() {
        // Element 1's first collocation point lands on element 0's centre.
        let mut config = config_with(
            vec![
                Element::circle(0.0, 0.0, 0.5, 1.0),
                Element::circle(-1.0, 0.0, 1.0, 1.0),
            ],
            4,
            1,
        );
        config.prepare_elements().unwrap();
        let basis = trig_basis(1);
        let err = SystemBuilder::new(&config, &basis).assemble().unwrap_err();
        match err {
            Error::CollocationDomain {
                source_element,
                influencing_element,
                collocation_index,
                ..
            } => {
                assert_eq!(
                    (source_element, influencing_element, collocation_index),
                    (1, 0, 0)
                );
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_out_of_range_row_is_an_error() {
        let mut config = config_with(vec![Element::circle(0.0, 0.0, 1.0, 1.0)], 4, 1);
        config.prepare_elements().unwrap();
        let basis = trig_basis(1);
        let builder = SystemBuilder::new(&config, &basis);
        assert_eq!(builder.row(0, 3).unwrap().len(), 1);
        assert!(matches!(builder.row(1, 0), Err(Error::InvalidConfig(_))));
        assert!(matches!(builder.row(0, 4), Err(Error::InvalidConfig(_))));
    }

    #[test]
    #[should_panic]
    fn test_coefficient_block_out_of_range_panics() {
        let c = CoefficientVector::new(vec![1.0; 3], 3).unwrap();
        c.element(1);
    }

    #[test]
    fn test_unprepared_elements_are_rejected() {
        let config = config_with(vec![Element::circle(0.0, 0.0, 1.0, 1.0)], 4, 1);
        let basis = trig_basis(1);
        assert!(matches!(
            SystemBuilder::new(&config, &basis).assemble(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_system_is_rejected() {
        let config = config_with(vec![], 4, 1);
        let basis = trig_basis(1);
        assert!(matches!(
            SystemBuilder::new(&config, &basis).solve(),
            Err(Error::NoElements)
        ));
    }
}
