use log::warn;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct PhysicalParams {
    // Transverse dispersivity.
    pub alpha_t: f64,
    // Longitudinal dispersivity, along the flow direction (+x).
    pub alpha_l: f64,
    // Exponential decay rate of the transformed field, normally 1 / (2 alpha_l).
    pub beta: f64,
    // Stoichiometric ratio of the reaction.
    pub gamma: f64,
    // Ambient acceptor concentration.
    pub ca: f64,
}

impl PhysicalParams {
    pub fn natural_beta(alpha_l: f64) -> f64 {
        1.0 / (2.0 * alpha_l)
    }
}

// As written in the setup file: beta may be left out.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
pub struct PhysicalParamsYaml {
    pub alpha_t: f64,
    pub alpha_l: f64,
    #[serde(default)]
    pub beta: Option<f64>,
    pub gamma: f64,
    pub ca: f64,
}

impl PhysicalParamsYaml {
    pub fn as_params(&self) -> PhysicalParams {
        let natural = PhysicalParams::natural_beta(self.alpha_l);
        let beta = match self.beta {
            Some(beta) => {
                if (beta - natural).abs() > 1e-12 * natural.abs() {
                    warn!(
                        "beta={} differs from 1 / (2 alpha_l) = {}; boundary targets assume the given value",
                        beta, natural
                    );
                }
                beta
            }
            None => natural,
        };
        PhysicalParams {
            alpha_t: self.alpha_t,
            alpha_l: self.alpha_l,
            beta,
            gamma: self.gamma,
            ca: self.ca,
        }
    }
}
