use std::f64::consts::{PI, TAU};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("focal parameter must be positive and finite, got {d}")]
    InvalidFocalParameter { d: f64 },

    #[error("anisotropy stretch must be positive and finite, got {stretch}")]
    InvalidStretch { stretch: f64 },

    #[error("point coincides with the element centre")]
    CoincidentWithCentre,

    #[error("angular root {p} is not a valid squared sine")]
    AngularRootOutOfRange { p: f64 },

    #[error("radial root {q} gives a negative radicand")]
    NegativeRadicand { q: f64 },

    #[error("logarithm argument {arg} is not positive")]
    NonPositiveLogArgument { arg: f64 },

    #[error("non-finite elliptic coordinates (eta={eta}, psi={psi})")]
    NonFinite { eta: f64, psi: f64 },
}

/// Confocal elliptic coordinates.
///
/// With the stretched transverse coordinate `Y`, the Cartesian offset is
/// `x = d sinh(eta) sin(psi)`, `Y = d cosh(eta) cos(psi)`: the foci sit on the
/// `Y` axis at `±d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticCoords {
    pub eta: f64,
    pub psi: f64,
}

// Rounding can push the angular root slightly below zero near the Y axis.
const ANGULAR_ROOT_SLACK: f64 = 1e-12;

/// Scale applied to transverse offsets to undo transport anisotropy.
pub fn anisotropy_stretch(alpha_l: f64, alpha_t: f64) -> f64 {
    (alpha_l / alpha_t).sqrt()
}

/// Convert an offset `(x, y)` from an inclusion centre into elliptic
/// coordinates of the confocal family with focal parameter `d`.
pub fn to_elliptic(x: f64, y: f64, d: f64, stretch: f64) -> Result<EllipticCoords, TransformError> {
    if !(d.is_finite() && d > 0.0) {
        return Err(TransformError::InvalidFocalParameter { d });
    }
    if !(stretch.is_finite() && stretch > 0.0) {
        return Err(TransformError::InvalidStretch { stretch });
    }
    if x == 0.0 && y == 0.0 {
        return Err(TransformError::CoincidentWithCentre);
    }

    let y_s = stretch * y;
    let x2 = x * x;
    let d2 = d * d;

    // sin^2(psi) and -sinh^2(eta) are the two roots of
    //   d^2 t^2 + (x^2 + Y^2 - d^2) t - x^2 = 0.
    let b = x2 + y_s * y_s - d2;
    let f = (b * b + 4.0 * d2 * x2).sqrt();
    let p = (-b + f) / (2.0 * d2);
    let q = (-b - f) / (2.0 * d2);

    if !p.is_finite() || p < -ANGULAR_ROOT_SLACK {
        return Err(TransformError::AngularRootOutOfRange { p });
    }
    let psi_0 = p.max(0.0).sqrt().clamp(-1.0, 1.0).asin();

    // Quadrants are measured from the +Y axis towards +x, not from +x as in
    // polar coordinates.
    let psi = if y_s >= 0.0 {
        if x >= 0.0 {
            psi_0
        } else {
            TAU - psi_0
        }
    } else if x >= 0.0 {
        PI - psi_0
    } else {
        PI + psi_0
    };
    let psi = if psi >= TAU { psi - TAU } else { psi };

    let radicand = q * q - q;
    if !(radicand >= 0.0) {
        return Err(TransformError::NegativeRadicand { q });
    }
    let arg = 1.0 - 2.0 * q + 2.0 * radicand.sqrt();
    if !(arg > 0.0) {
        return Err(TransformError::NonPositiveLogArgument { arg });
    }
    let eta = 0.5 * arg.ln();

    if !(eta.is_finite() && psi.is_finite()) {
        return Err(TransformError::NonFinite { eta, psi });
    }
    Ok(EllipticCoords { eta, psi })
}
