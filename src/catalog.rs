//! Reference molecules used to build simulated hits when the screening backend isn't running.

use crate::Molecule;

/// Aspirin.
pub const DEFAULT_QUERY: &str = "CC(=O)OC1=CC=CC=C1C(=O)O";

/// (name, SMILES)
const REFERENCE_MOLS: [(&str, &str); 5] = [
    ("Aspirin (Query Match)", DEFAULT_QUERY),
    ("Salicylic Acid", "OC1=CC=CC=C1C(=O)O"),
    ("Paracetamol", "CC(=O)NC1=CC=C(O)C=C1"),
    ("Ibuprofen", "CC(C)CC1=CC=C(C(C)C(=O)O)C=C1"),
    ("Caffeine", "CN1C=NC2=C1C(=O)N(C(=O)N2C)C"),
];

pub const CATALOG_LEN: usize = REFERENCE_MOLS.len();

/// The catalog, unscored; scores are assigned per query.
pub fn reference_mols() -> Vec<Molecule> {
    REFERENCE_MOLS
        .iter()
        .map(|(name, smiles)| Molecule::new(name, smiles, 0.))
        .collect()
}
