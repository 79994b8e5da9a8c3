use log::debug;
use nalgebra::Point2;

use crate::config::setup::parameters::physical::PhysicalParams;
use crate::error::{Error, Result};
use crate::geometry::circle_outline;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ElementKind {
    /// Circular source held at a fixed concentration.
    Circle { radius: f64, concentration: f64 },
    /// Placeholder for line sources. It parses, is never "inside", and has no
    /// geometry setup yet.
    Line { length: f64 },
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Circle { .. } => "circle",
            ElementKind::Line { .. } => "line",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    // Focal parameter of the element's elliptic frame.
    pub d: f64,
    // Mathieu shape parameter.
    pub q: f64,
    // Collocation points, as offsets from (x, y).
    pub outline: Vec<Point2<f64>>,
    // Boundary values at the collocation points.
    pub target: Vec<f64>,
}

impl Element {
    /// An element whose geometry is still to be prepared.
    pub fn new(kind: ElementKind, x: f64, y: f64) -> Self {
        Element {
            kind,
            x,
            y,
            d: 0.0,
            q: 0.0,
            outline: Vec::new(),
            target: Vec::new(),
        }
    }

    pub fn circle(x: f64, y: f64, radius: f64, concentration: f64) -> Self {
        Self::new(
            ElementKind::Circle {
                radius,
                concentration,
            },
            x,
            y,
        )
    }

    /// Strictly inside. Points on the boundary are left to the expansion.
    pub fn is_inside(&self, x: f64, y: f64) -> bool {
        match self.kind {
            ElementKind::Circle { radius, .. } => {
                (x - self.x).powi(2) + (y - self.y).powi(2) < radius.powi(2)
            }
            ElementKind::Line { .. } => false,
        }
    }

    pub fn interior_value(&self) -> f64 {
        match self.kind {
            ElementKind::Circle { concentration, .. } => concentration,
            ElementKind::Line { .. } => 0.0,
        }
    }

    /// Derive the focal and shape parameters, the collocation outline and the
    /// boundary targets for `num_cp` collocation points.
    pub fn prepare(&mut self, index: usize, params: &PhysicalParams, num_cp: usize) -> Result<()> {
        let (radius, concentration) = match self.kind {
            ElementKind::Circle {
                radius,
                concentration,
            } => (radius, concentration),
            ElementKind::Line { .. } => {
                return Err(Error::UnsupportedElement {
                    element: index,
                    kind: self.kind.name(),
                })
            }
        };
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::Geometry {
                element: index,
                reason: format!("radius must be positive, got {}", radius),
            });
        }

        // Stretching y by sqrt(alpha_l / alpha_t) turns the circle into an
        // ellipse with semi-axes r (along x) and r * sqrt(alpha_l / alpha_t),
        // whose foci lie on the stretched y axis.
        let anisotropy = params.alpha_l / params.alpha_t;
        if !(anisotropy > 1.0) {
            return Err(Error::Geometry {
                element: index,
                reason: format!(
                    "alpha_l / alpha_t must exceed 1 for an elliptic frame, got {}",
                    anisotropy
                ),
            });
        }
        self.d = radius * (anisotropy - 1.0).sqrt();
        self.q = -(params.beta * self.d / 2.0).powi(2);

        self.outline = circle_outline(radius, num_cp);
        // In the transformed field φ = c exp(-beta x), the boundary holds the
        // conserved quantity gamma * c_source + ca.
        let boundary = params.gamma * concentration + params.ca;
        self.target = self
            .outline
            .iter()
            .map(|p| boundary * (-params.beta * (self.x + p.x)).exp())
            .collect();

        debug!(
            "Element {}: d={}, q={}, {} collocation points",
            index, self.d, self.q, num_cp
        );
        Ok(())
    }
}
