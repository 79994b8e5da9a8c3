#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscretizationParams {
    // Collocation points per element.
    pub num_cp: usize,
    // Expansion orders per element, 0..num_terms.
    pub num_terms: usize,
}
