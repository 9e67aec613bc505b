//! [Home page](https://pubchem.ncbi.nlm.nih.gov/)
//! [API docs](https://pubchem.ncbi.nlm.nih.gov/docs/pug-rest)
//!
//! 3D structure lookup, used when a screening hit arrives without coordinates.

use url::form_urlencoded;

use crate::{ReqError, make_agent, viewer::StructureSource};

const BASE_PUG_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// The SMILES is percent-encoded as a whole, so characters like `/`, `#`, `[` and `=` stay inside
/// a single path segment.
fn sdf_3d_url(base: &str, smiles: &str) -> String {
    let smiles: String = form_urlencoded::byte_serialize(smiles.as_bytes()).collect();
    format!("{base}/compound/smiles/{smiles}/record/SDF?record_type=3d")
}

/// Looks up 3D structures by SMILES. Unauthenticated, with no retry.
#[derive(Clone, Debug)]
pub struct PubChemSource {
    pub base_url: String,
}

impl Default for PubChemSource {
    fn default() -> Self {
        Self {
            base_url: BASE_PUG_URL.to_owned(),
        }
    }
}

impl StructureSource for PubChemSource {
    /// Download a 3D SDF (conformer), returning an SDF string.
    fn load_sdf(&self, smiles: &str) -> Result<String, ReqError> {
        let agent = make_agent();

        // A missing compound is a 404 with a JSON fault body; don't treat that as SDF text.
        let mut resp = agent.get(sdf_3d_url(&self.base_url, smiles)).call()?;
        if !resp.status().is_success() {
            return Err(ReqError::Status(resp.status().as_u16()));
        }

        Ok(resp.body_mut().read_to_string()?)
    }
}
