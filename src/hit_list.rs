//! Presentation of the ranked hits: one row per hit, with rank, name, shortened SMILES, a score bar
//! and a selection marker. Rows are plain data; `render_table` lays them out as text.

use std::fmt::{Display, Formatter};

use prettytable::{Cell, Row, Table, format};

use crate::{Molecule, state::MoleculeStore};

pub const TITLE: &str = "Screening Hits";
pub const EMPTY_TEXT: &str = "No hits found. Try running a screening.";

/// Longer SMILES are shortened, with an ellipsis.
const SMILES_DISPLAY_LEN: usize = 24;
/// Characters in the text score bar.
const BAR_WIDTH: usize = 10;

/// Color bands for the score bar. Thresholds assume scores in [0, 1].
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ScoreClass {
    High,
    Medium,
    Low,
}

impl ScoreClass {
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            Self::High
        } else if score > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl Display for ScoreClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let v = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        write!(f, "{v}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HitRow {
    /// 1-based.
    pub rank: usize,
    pub name: String,
    pub smiles: String,
    pub smiles_short: String,
    pub score: f64,
    /// Bar fill, as a percentage.
    pub bar_percent: f64,
    pub class: ScoreClass,
    pub selected: bool,
}

impl HitRow {
    pub fn score_text(&self) -> String {
        format!("{:.3}", self.score)
    }

    fn bar_text(&self) -> String {
        let filled = ((self.bar_percent / 100.) * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);
        format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
    }
}

pub fn shorten_smiles(smiles: &str) -> String {
    if smiles.chars().count() <= SMILES_DISPLAY_LEN {
        return smiles.to_owned();
    }

    let mut result: String = smiles.chars().take(SMILES_DISPLAY_LEN - 1).collect();
    result.push('…');
    result
}

/// `is_selected` decides the highlight; the store keys it on SMILES.
pub fn build_rows(hits: &[Molecule], is_selected: impl Fn(&Molecule) -> bool) -> Vec<HitRow> {
    hits.iter()
        .enumerate()
        .map(|(i, mol)| HitRow {
            rank: i + 1,
            name: mol.name.clone(),
            smiles: mol.smiles.clone(),
            smiles_short: shorten_smiles(&mol.smiles),
            score: mol.score,
            bar_percent: (mol.score * 100.).clamp(0., 100.),
            class: ScoreClass::from_score(mol.score),
            selected: is_selected(mol),
        })
        .collect()
}

pub fn rows_from_store(store: &MoleculeStore) -> Vec<HitRow> {
    build_rows(store.hits(), |mol| store.is_selected(mol))
}

/// The row clicked on, as a selection for the store.
pub fn clicked<'a>(hits: &'a [Molecule], row: &HitRow) -> Option<&'a Molecule> {
    hits.get(row.rank.checked_sub(1)?)
}

pub fn count_text(n: usize) -> String {
    format!("{n} molecules found")
}

pub fn render_table(rows: &[HitRow]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(vec![
        Cell::new(""),
        Cell::new("Rank"),
        Cell::new("Molecule"),
        Cell::new("SMILES"),
        Cell::new("Similarity"),
    ]));

    for row in rows {
        let marker = if row.selected { ">" } else { "" };
        table.add_row(Row::new(vec![
            Cell::new(marker),
            Cell::new(&format!("#{}", row.rank)),
            Cell::new(&row.name),
            Cell::new(&row.smiles_short),
            Cell::new(&format!("{} {}", row.bar_text(), row.score_text())),
        ]));
    }

    let mut result = format!("{TITLE} ({})\n", count_text(rows.len()));
    if rows.is_empty() {
        result.push_str(EMPTY_TEXT);
        result.push('\n');
    } else {
        result.push_str(&table.to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits() -> Vec<Molecule> {
        vec![
            Molecule::new("Ibuprofen", "CC(C)CC1=CC=C(C(C)C(=O)O)C=C1", 0.812_34),
            Molecule::new("Ethanol", "CCO", 0.5),
            Molecule::new("Ethyl alcohol", "CCO", 0.4),
            Molecule::new("Methane", "C", 0.0451),
        ]
    }

    #[test]
    fn classes() {
        assert_eq!(ScoreClass::from_score(1.), ScoreClass::High);
        assert_eq!(ScoreClass::from_score(0.71), ScoreClass::High);
        assert_eq!(ScoreClass::from_score(0.7), ScoreClass::Medium);
        assert_eq!(ScoreClass::from_score(0.41), ScoreClass::Medium);
        assert_eq!(ScoreClass::from_score(0.4), ScoreClass::Low);
        assert_eq!(ScoreClass::from_score(0.), ScoreClass::Low);
    }

    #[test]
    fn rows() {
        let hits = hits();
        let rows = build_rows(&hits, |m| m.smiles == "CCO");

        assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(rows[0].score_text(), "0.812");
        assert_eq!(rows[3].score_text(), "0.045");
        assert_eq!(rows[0].class, ScoreClass::High);
        assert_eq!(rows[1].class, ScoreClass::Medium);
        assert_eq!(rows[2].class, ScoreClass::Low);

        // Both CCO entries highlight together.
        assert!(!rows[0].selected);
        assert!(rows[1].selected && rows[2].selected);
    }

    #[test]
    fn shortening() {
        assert_eq!(shorten_smiles("CCO"), "CCO");
        let long = "CC(C)CC1=CC=C(C(C)C(=O)O)C=C1";
        let short = shorten_smiles(long);
        assert_eq!(short.chars().count(), SMILES_DISPLAY_LEN);
        assert!(short.ends_with('…'));
        assert!(long.starts_with(short.trim_end_matches('…')));
    }

    #[test]
    fn bar() {
        let rows = build_rows(&hits(), |_| false);
        assert_eq!(rows[0].bar_text(), "########--");
        assert_eq!(rows[1].bar_text(), "#####-----");
        assert_eq!(rows[3].bar_text(), "----------");

        let full = build_rows(&[Molecule::new("Query", "C", 1.)], |_| false);
        assert_eq!(full[0].bar_percent, 100.);
        assert_eq!(full[0].bar_text(), "##########");
    }

    #[test]
    fn click_maps_to_hit() {
        let hits = hits();
        let rows = build_rows(&hits, |_| false);
        assert_eq!(clicked(&hits, &rows[3]).unwrap().name, "Methane");
    }

    #[test]
    fn table_text() {
        let hits = hits();
        let text = render_table(&build_rows(&hits, |m| m.name == "Methane"));

        assert!(text.starts_with("Screening Hits (4 molecules found)"));
        assert!(text.contains("#4"));
        assert!(text.contains("0.812"));
        assert!(text.contains('>'));

        let empty = render_table(&[]);
        assert!(empty.contains(EMPTY_TEXT));
        assert!(empty.contains("0 molecules found"));
    }

    #[test]
    fn from_store() {
        let mut store = MoleculeStore::default();
        let id = store.begin_screening();
        store.finish_screening(id, Ok(crate::ScreeningResult { hits: hits() }));

        let rows = rows_from_store(&store);
        assert!(rows[0].selected);
        assert!(!rows[1].selected);
    }
}
