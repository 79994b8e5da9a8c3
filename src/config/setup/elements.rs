use crate::element::{Element, ElementKind};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ElementYaml {
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        concentration: f64,
    },
    Line {
        x: f64,
        y: f64,
        length: f64,
    },
}

impl ElementYaml {
    pub fn as_element(&self) -> Element {
        match *self {
            ElementYaml::Circle {
                x,
                y,
                radius,
                concentration,
            } => Element::circle(x, y, radius, concentration),
            ElementYaml::Line { x, y, length } => Element::new(ElementKind::Line { length }, x, y),
        }
    }
}
