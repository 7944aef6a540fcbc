//! Controlled vocabularies ("domain values") for cigar attributes.
//!
//! Submitted attribute values are only accepted when they are members of
//! the corresponding vocabulary. The sets are read-mostly reference data;
//! see [`crate::services::domain_cache`] for the caching policy.

use serde::{Deserialize, Serialize};

/// The current value set for every vocabulary-controlled attribute.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainValues {
    pub vitolas: Vec<String>,
    pub colors: Vec<String>,
    pub countries: Vec<String>,
    pub strengths: Vec<String>,
    pub wrappers: Vec<String>,
    pub binders: Vec<String>,
    pub fillers: Vec<String>,
}

impl DomainValues {
    /// Built-in starter vocabularies, installed when the backing store has
    /// none yet. Real deployments grow these out-of-band.
    pub fn builtin() -> Self {
        let strings = |values: &[&str]| values.iter().map(|v| v.to_string()).collect();
        DomainValues {
            vitolas: strings(&[
                "Churchill",
                "Corona",
                "Double Corona",
                "Gordo",
                "Lancero",
                "Lonsdale",
                "Panetela",
                "Perfecto",
                "Petit Corona",
                "Pyramid",
                "Robusto",
                "Toro",
                "Torpedo",
            ]),
            colors: strings(&[
                "Claro",
                "Colorado",
                "Colorado Claro",
                "Colorado Maduro",
                "Double Claro",
                "Maduro",
                "Natural",
                "Oscuro",
            ]),
            countries: strings(&[
                "Brazil",
                "Cameroon",
                "Cuba",
                "Dominican Republic",
                "Ecuador",
                "Honduras",
                "Indonesia",
                "Mexico",
                "Nicaragua",
                "United States",
            ]),
            strengths: strings(&["Mild", "Mild-Medium", "Medium", "Medium-Full", "Full"]),
            wrappers: strings(&[
                "Brazilian",
                "Cameroon",
                "Connecticut",
                "Connecticut Broadleaf",
                "Connecticut Shade",
                "Corojo",
                "Criollo",
                "Habano",
                "Maduro",
                "Sumatra",
            ]),
            binders: strings(&[
                "Brazilian",
                "Connecticut Broadleaf",
                "Corojo",
                "Criollo",
                "Habano",
                "Nicaraguan",
                "Sumatra",
            ]),
            fillers: strings(&[
                "Brazilian",
                "Dominican",
                "Honduran",
                "Ligero",
                "Nicaraguan",
                "Peruvian",
                "Seco",
            ]),
        }
    }
}
