use nalgebra::DMatrix;

use crate::config::setup::parameters::domain::DomainParams;
use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::geometry::elliptic::to_elliptic;

use super::basis::MathieuBasis;
use super::map_indexed;
use super::system::CoefficientVector;

/// Concentration sampled on a regular grid: `values[(ix, iy)]` is the value at
/// `(x_axis[ix], y_axis[iy])`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationGrid {
    pub x_axis: Vec<f64>,
    pub y_axis: Vec<f64>,
    pub values: DMatrix<f64>,
}

impl ConcentrationGrid {
    pub fn dims(&self) -> (usize, usize) {
        self.values.shape()
    }

    pub fn value_range(&self) -> Option<(f64, f64)> {
        if self.values.is_empty() {
            return None;
        }
        Some((self.values.min(), self.values.max()))
    }

    // Largest x with any positive value.
    pub fn plume_extent(&self) -> Option<f64> {
        self.x_axis
            .iter()
            .enumerate()
            .rev()
            .find(|(ix, _)| self.values.row(*ix).iter().any(|v| *v > 0.0))
            .map(|(_, x)| *x)
    }
}

pub struct FieldEvaluator<'a> {
    config: &'a SimulationConfig,
    basis: &'a MathieuBasis,
    coefficients: &'a CoefficientVector,
}

impl<'a> FieldEvaluator<'a> {
    pub fn new(
        config: &'a SimulationConfig,
        basis: &'a MathieuBasis,
        coefficients: &'a CoefficientVector,
    ) -> Result<Self> {
        let expected = config.elements.len() * basis.len();
        if coefficients.len() != expected || coefficients.terms_per_element() != basis.len() {
            return Err(Error::InvalidConfig(format!(
                "expected {} coefficients in blocks of {}, got {} in blocks of {}",
                expected,
                basis.len(),
                coefficients.len(),
                coefficients.terms_per_element()
            )));
        }
        Ok(FieldEvaluator {
            config,
            basis,
            coefficients,
        })
    }

    // Before the exp(beta x) factor.
    pub fn potential(&self, x: f64, y: f64) -> Result<f64> {
        let stretch = self.config.stretch();
        let mut terms = Vec::with_capacity(self.basis.len());
        let mut total = 0.0;
        for (i, e) in self.config.elements.iter().enumerate() {
            let coords = to_elliptic(x - e.x, y - e.y, e.d, stretch).map_err(|source| {
                Error::FieldDomain {
                    x,
                    y,
                    element: i,
                    source,
                }
            })?;
            terms.clear();
            self.basis
                .extend_terms(e.q, coords, &mut terms)
                .map_err(|source| Error::Basis { element: i, source })?;
            let weighted: f64 = terms
                .iter()
                .zip(self.coefficients.element(i))
                .map(|(t, c)| t * c)
                .sum();
            total += weighted;
        }
        Ok(total)
    }

    pub fn evaluate_point(&self, x: f64, y: f64) -> Result<f64> {
        if let Some(e) = self.config.elements.iter().find(|e| e.is_inside(x, y)) {
            return Ok(e.interior_value());
        }
        let p = &self.config.physical;
        let t = self.potential(x, y)? * (p.beta * x).exp();
        if t > p.ca {
            Ok((t - p.ca) / p.gamma)
        } else {
            Ok(t - p.ca)
        }
    }

    pub fn evaluate_grid(&self, domain: &DomainParams) -> Result<ConcentrationGrid> {
        let x_axis = domain.x_axis();
        let y_axis = domain.y_axis();
        let (nx, ny) = (x_axis.len(), y_axis.len());
        let cells = map_indexed(nx * ny, |k| self.evaluate_point(x_axis[k / ny], y_axis[k % ny]))
            .into_iter()
            .collect::<Result<Vec<_>>>()?;
        Ok(ConcentrationGrid {
            values: DMatrix::from_row_iterator(nx, ny, cells),
            x_axis,
            y_axis,
        })
    }
}
