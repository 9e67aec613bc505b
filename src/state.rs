//! View state for a screening session: the query, ranked hits, selection, generated insight text,
//! and in-flight flags. All changes go through the transition methods here, so that starting a new
//! screen always clears what the previous one left behind.
//!
//! Each started request gets a `RequestId`. A completion carrying an older ID than the latest
//! started request is discarded, so a slow response can't overwrite a newer one.

use log::debug;

use crate::{Molecule, ScreenError, ScreeningResult, catalog::DEFAULT_QUERY};

pub const SCREENING_ERROR_TEXT: &str = "Failed to complete virtual screening.";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RequestId(u64);

impl RequestId {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Clone, Debug)]
pub struct MoleculeStore {
    pub query: String,
    hits: Vec<Molecule>,
    selected: Option<Molecule>,
    insight: Option<String>,
    screening_pending: bool,
    insight_pending: bool,
    error: Option<String>,
    /// Latest started requests.
    screening_req: RequestId,
    insight_req: RequestId,
}

impl Default for MoleculeStore {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_owned(),
            hits: Vec::new(),
            selected: None,
            insight: None,
            screening_pending: false,
            insight_pending: false,
            error: None,
            screening_req: RequestId::default(),
            insight_req: RequestId::default(),
        }
    }
}

impl MoleculeStore {
    pub fn hits(&self) -> &[Molecule] {
        &self.hits
    }

    pub fn selected(&self) -> Option<&Molecule> {
        self.selected.as_ref()
    }

    pub fn insight(&self) -> Option<&str> {
        self.insight.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn screening_pending(&self) -> bool {
        self.screening_pending
    }

    pub fn insight_pending(&self) -> bool {
        self.insight_pending
    }

    /// Keyed on SMILES, not name: Two hits sharing a structure both count as selected.
    pub fn is_selected(&self, mol: &Molecule) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|sel| sel.same_structure(mol))
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_owned();
    }

    /// Clears hits, selection, insight text and error. Any insight request still running for the
    /// old selection is abandoned.
    pub fn begin_screening(&mut self) -> RequestId {
        self.hits.clear();
        self.selected = None;
        self.error = None;
        self.abandon_insight();

        self.screening_pending = true;
        self.screening_req = self.screening_req.next();
        self.screening_req
    }

    /// Returns `false` if the result was discarded for being stale.
    pub fn finish_screening(
        &mut self,
        id: RequestId,
        result: Result<ScreeningResult, ScreenError>,
    ) -> bool {
        if id != self.screening_req {
            debug!("Discarding stale screening result ({id:?}; latest is {:?})", self.screening_req);
            return false;
        }

        match result {
            Ok(r) => {
                self.hits = r.hits;
                self.selected = self.hits.first().cloned();
            }
            Err(e) => {
                debug!("Screening failed: {e}");
                self.error = Some(SCREENING_ERROR_TEXT.to_owned());
            }
        }
        self.screening_pending = false;
        true
    }

    pub fn select(&mut self, mol: &Molecule) {
        self.selected = Some(mol.clone());
        self.abandon_insight();
    }

    /// Select by rank position (0-based). Returns `false` if out of range.
    pub fn select_index(&mut self, i: usize) -> bool {
        match self.hits.get(i).cloned() {
            Some(mol) => {
                self.select(&mol);
                true
            }
            None => false,
        }
    }

    /// Returns the request ID, and the molecule to describe. `None` if nothing is selected.
    pub fn begin_insight(&mut self) -> Option<(RequestId, Molecule)> {
        let mol = self.selected.clone()?;

        self.insight_pending = true;
        self.insight_req = self.insight_req.next();
        Some((self.insight_req, mol))
    }

    /// Placeholder and failure text is stored like any other. Returns `false` if discarded.
    pub fn finish_insight(&mut self, id: RequestId, text: String) -> bool {
        if id != self.insight_req || !self.insight_pending {
            debug!("Discarding stale insight text ({id:?})");
            return false;
        }

        self.insight = Some(text);
        self.insight_pending = false;
        true
    }

    fn abandon_insight(&mut self) {
        self.insight = None;
        self.insight_pending = false;
        self.insight_req = self.insight_req.next();
    }
}
