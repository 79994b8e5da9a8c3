pub mod setup;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::geometry::elliptic::anisotropy_stretch;

use self::setup::parameters::{
    discretization::DiscretizationParams, domain::DomainParams, physical::PhysicalParams,
};

/// Everything one run needs. The core only reads it; element geometry is
/// filled in by [`SimulationConfig::prepare_elements`] before the solve.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub physical: PhysicalParams,
    pub discretization: DiscretizationParams,
    pub domain: DomainParams,
    // Order matters: earlier elements take precedence where interiors overlap.
    pub elements: Vec<Element>,
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.elements.is_empty() {
            return Err(Error::NoElements);
        }
        let p = &self.physical;
        require_positive("alpha_l", p.alpha_l)?;
        require_positive("alpha_t", p.alpha_t)?;
        require_positive("gamma", p.gamma)?;
        if !(p.beta.is_finite() && p.ca.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "beta and ca must be finite, got {} and {}",
                p.beta, p.ca
            )));
        }
        // beta = 0 leaves q = 0, where the decaying Mathieu functions do not exist.
        if p.beta == 0.0 {
            return Err(Error::InvalidConfig(
                "beta must be non-zero (the native Mathieu basis needs q < 0)".into(),
            ));
        }

        if self.discretization.num_cp == 0 {
            return Err(Error::InvalidConfig("num_cp must be at least 1".into()));
        }
        if self.discretization.num_terms == 0 {
            return Err(Error::InvalidConfig("num_terms must be at least 1".into()));
        }

        let d = &self.domain;
        require_positive("inc", d.inc)?;
        if !(d.xmax > d.xmin) {
            return Err(Error::InvalidConfig(format!(
                "xmax ({}) must exceed xmin ({})",
                d.xmax, d.xmin
            )));
        }
        if !(d.ymax > d.ymin) {
            return Err(Error::InvalidConfig(format!(
                "ymax ({}) must exceed ymin ({})",
                d.ymax, d.ymin
            )));
        }
        Ok(())
    }

    /// Transverse scale of the elliptic frames.
    pub fn stretch(&self) -> f64 {
        anisotropy_stretch(self.physical.alpha_l, self.physical.alpha_t)
    }

    pub fn prepare_elements(&mut self) -> Result<()> {
        let num_cp = self.discretization.num_cp;
        for (i, e) in self.elements.iter_mut().enumerate() {
            e.prepare(i, &self.physical, num_cp)?;
        }
        Ok(())
    }
}
