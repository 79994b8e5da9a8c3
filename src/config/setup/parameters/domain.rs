use crate::geometry::arange;

/// Rectangular evaluation window, sampled every `inc` from the lower bounds.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct DomainParams {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub inc: f64,
}

impl DomainParams {
    pub fn x_axis(&self) -> Vec<f64> {
        arange(self.xmin, self.xmax, self.inc)
    }

    pub fn y_axis(&self) -> Vec<f64> {
        arange(self.ymin, self.ymax, self.inc)
    }
}
