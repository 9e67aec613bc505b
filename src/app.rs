//! Ties user actions to the clients and the store: a submitted query runs a screen and fills the
//! hit list; a selection updates the 3D view; an insight request describes the selection.
//!
//! Calls block until complete. There is no cancellation; a request always writes its result,
//! unless a newer request of the same kind has started since (see `state`).

use log::info;

use crate::{
    Config,
    hit_list::{self, HitRow},
    insight::{InsightClient, Summarizer},
    pubchem::PubChemSource,
    screening::{Screener, ScreeningClient},
    state::MoleculeStore,
    viewer::{SceneRenderer, StructureRenderer, StructureSource, StructureViewer, ViewerStatus},
};

pub struct App<
    S: Screener = ScreeningClient,
    I: Summarizer = InsightClient,
    R: StructureRenderer = SceneRenderer,
    Src: StructureSource = PubChemSource,
> {
    pub store: MoleculeStore,
    screener: S,
    insight: I,
    pub viewer: StructureViewer<R, Src>,
    viewer_status: ViewerStatus,
}

impl App {
    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            ScreeningClient::from_config(cfg),
            InsightClient::from_config(cfg),
            StructureViewer::new(SceneRenderer::default()),
        )
    }
}

impl<S, I, R, Src> App<S, I, R, Src>
where
    S: Screener,
    I: Summarizer,
    R: StructureRenderer,
    Src: StructureSource,
{
    pub fn new(screener: S, insight: I, viewer: StructureViewer<R, Src>) -> Self {
        Self {
            store: MoleculeStore::default(),
            screener,
            insight,
            viewer,
            viewer_status: ViewerStatus::Empty,
        }
    }

    /// Run a screen for `query`. A blank query is rejected here, without a request; returns
    /// `false` in that case.
    pub fn submit_query(&mut self, query: &str) -> bool {
        self.store.set_query(query);
        if query.trim().is_empty() {
            return false;
        }

        let id = self.store.begin_screening();
        self.refresh_viewer();

        info!("Screening query {query}");
        let result = self.screener.screen(query);

        if self.store.finish_screening(id, result) {
            self.refresh_viewer();
        }
        true
    }

    /// Select by rank position (0-based).
    pub fn select(&mut self, i: usize) -> bool {
        if !self.store.select_index(i) {
            return false;
        }
        self.refresh_viewer();
        true
    }

    /// Describe the selected molecule. Always produces text if something is selected, including
    /// placeholder text on failure.
    pub fn request_insight(&mut self) -> Option<&str> {
        let (id, mol) = self.store.begin_insight()?;

        let text = self.insight.summarize(&mol.name, &mol.smiles);
        self.store.finish_insight(id, text);

        self.store.insight()
    }

    pub fn viewer_status(&self) -> ViewerStatus {
        self.viewer_status
    }

    pub fn hit_rows(&self) -> Vec<HitRow> {
        hit_list::rows_from_store(&self.store)
    }

    pub fn render_hits(&self) -> String {
        hit_list::render_table(&self.hit_rows())
    }

    /// Shown over the 3D view.
    pub fn score_overlay(&self) -> Option<String> {
        self.store
            .selected()
            .map(|mol| format!("Score: {:.4}", mol.score))
    }

    fn refresh_viewer(&mut self) {
        self.viewer_status = self.viewer.show(self.store.selected());
    }
}
