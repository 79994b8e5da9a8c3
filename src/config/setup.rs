pub mod elements;
pub mod parameters;

use std::{fs::File, io::Read, path::Path};

use crate::{element::ElementKind, error::Result};

use self::{
    elements::ElementYaml,
    parameters::{
        discretization::DiscretizationParams, domain::DomainParams,
        physical::PhysicalParamsYaml,
    },
};

use super::SimulationConfig;

#[derive(serde::Serialize, serde::Deserialize)]
struct ConfigYaml {
    parameters: PhysicalParamsYaml,
    discretization: DiscretizationParams,
    domain: DomainParams,
    elements: Vec<ElementYaml>,
}

pub struct SetupConfig {
    pub simulation: SimulationConfig,
    // Whether beta came from the file rather than from alpha_l.
    pub beta_given: bool,
}

impl SetupConfig {
    pub fn parse<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config_raw: ConfigYaml = serde_yaml::from_str(contents)?;
        let simulation = SimulationConfig {
            physical: config_raw.parameters.as_params(),
            discretization: config_raw.discretization,
            domain: config_raw.domain,
            elements: config_raw
                .elements
                .iter()
                .map(ElementYaml::as_element)
                .collect(),
        };
        simulation.validate()?;
        Ok(SetupConfig {
            simulation,
            beta_given: config_raw.parameters.beta.is_some(),
        })
    }

    pub fn print(&self) {
        let physical = &self.simulation.physical;
        let discretization = &self.simulation.discretization;
        let domain = &self.simulation.domain;
        println!(
            "\
Transport:
  Longitudinal dispersivity: {alpha_l}
  Transverse dispersivity: {alpha_t}
  Decay rate beta: {beta}{beta_note}

Reaction:
  Stoichiometric ratio: {gamma}
  Ambient acceptor concentration: {ca}

Discretization:
  Collocation points per element: {num_cp}
  Expansion orders per element: {num_terms}

Domain:
  x: [{xmin}, {xmax})
  y: [{ymin}, {ymax})
  Increment: {inc} ({nx} x {ny} cells)",
            alpha_l = physical.alpha_l,
            alpha_t = physical.alpha_t,
            beta = physical.beta,
            beta_note = if self.beta_given { "" } else { " (from alpha_l)" },
            gamma = physical.gamma,
            ca = physical.ca,
            num_cp = discretization.num_cp,
            num_terms = discretization.num_terms,
            xmin = domain.xmin,
            xmax = domain.xmax,
            ymin = domain.ymin,
            ymax = domain.ymax,
            inc = domain.inc,
            nx = domain.x_axis().len(),
            ny = domain.y_axis().len(),
        );
        println!("Elements:");
        for (i, e) in self.simulation.elements.iter().enumerate() {
            match e.kind {
                ElementKind::Circle {
                    radius,
                    concentration,
                } => println!(
                    "  {i}: circle at ({x}, {y}), radius {radius}, concentration {concentration}",
                    x = e.x,
                    y = e.y,
                ),
                ElementKind::Line { length } => println!(
                    "  {i}: line at ({x}, {y}), length {length}",
                    x = e.x,
                    y = e.y,
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;

    const SETUP: &str = "
parameters:
  alpha_l: 10.0
  alpha_t: 0.5
  gamma: 3.5
  ca: 8.0
discretization:
  num_cp: 32
  num_terms: 6
domain:
  xmin: -10.0
  xmax: 100.0
  ymin: -8.0
  ymax: 8.0
  inc: 0.5
elements:
  - type: Circle
    x: 0.0
    y: 0.0
    radius: 1.0
    concentration: 10.0
  - type: Line
    x: 5.0
    y: 1.0
    length: 2.0
";

    #[test]
    fn test_parse_setup() {
        let setup = SetupConfig::from_yaml(SETUP).unwrap();
        assert!(!setup.beta_given);
        let sim = &setup.simulation;
        assert_relative_eq!(sim.physical.beta, 0.05);
        assert_eq!(sim.discretization.num_terms, 6);
        assert_eq!(sim.elements.len(), 2);
        assert_eq!(
            sim.elements[0].kind,
            ElementKind::Circle {
                radius: 1.0,
                concentration: 10.0
            }
        );
        assert!(matches!(sim.elements[1].kind, ElementKind::Line { .. }));
        assert_eq!(sim.elements[1].x, 5.0);
    }

    #[test]
    fn test_empty_element_list_is_rejected() {
        let end = SETUP.find("elements:").unwrap();
        let contents = format!("{}elements: []\n", &SETUP[..end]);
        assert!(matches!(
            SetupConfig::from_yaml(&contents),
            Err(Error::NoElements)
        ));
    }

    #[test]
    fn test_zero_beta_is_rejected_at_load() {
        let contents = SETUP.replace("  gamma: 3.5", "  beta: 0.0\n  gamma: 3.5");
        assert!(matches!(
            SetupConfig::from_yaml(&contents),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_unknown_element_type_is_a_yaml_error() {
        let contents = SETUP.replace("type: Line", "type: Polygon");
        assert!(matches!(
            SetupConfig::from_yaml(&contents),
            Err(Error::Yaml(_))
        ));
    }

    #[test]
    fn test_shipped_configs_parse() {
        for name in ["single_source.yaml", "two_sources.yaml"] {
            let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs").join(name);
            let setup = SetupConfig::parse(&path).unwrap();
            assert!(!setup.simulation.elements.is_empty());
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SetupConfig::parse("/nonexistent/setup.yaml"),
            Err(Error::Io(_))
        ));
    }
}
