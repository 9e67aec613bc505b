//! 3D display of the selected molecule. Drawing itself is delegated to a `StructureRenderer`; this
//! module decides what to load, and in which style.
//!
//! Coordinates come from the screening response when present. Otherwise we make one best-effort
//! lookup by SMILES (PubChem by default), and show an "unavailable" label if that fails.

use std::{io, io::ErrorKind};

use bio_files::{BondType, Sdf};
use log::warn;

use crate::{Molecule, ReqError, pubchem::PubChemSource};

pub const UNAVAILABLE_LABEL: &str = "3D Structure Unavailable\n(Backend Required)";
pub const NO_SELECTION_TEXT: &str = "Select a molecule to visualize";

const DEFAULT_STICK_RADIUS: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ColorScheme {
    /// Color by element.
    Element,
    Jmol,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DrawStyle {
    pub stick_radius: f32,
    pub stick_colors: ColorScheme,
    pub sphere_radius: f32,
}

/// For coordinates supplied by the screening backend.
pub const SCREENING_STYLE: DrawStyle = DrawStyle {
    stick_radius: 0.15,
    stick_colors: ColorScheme::Element,
    sphere_radius: 0.4,
};

/// For coordinates fetched from the structure database.
pub const DATABASE_STYLE: DrawStyle = DrawStyle {
    stick_radius: DEFAULT_STICK_RADIUS,
    stick_colors: ColorScheme::Jmol,
    sphere_radius: 0.3,
};

/// The drawing surface. Created once, then reused for each molecule.
pub trait StructureRenderer {
    fn clear(&mut self);
    /// Load an SDF block, apply the style, zoom to fit, and draw.
    fn render_sdf(&mut self, sdf: &str, style: DrawStyle) -> io::Result<()>;
    fn show_label(&mut self, text: &str);
}

/// Somewhere to look up 3D coordinates by SMILES.
pub trait StructureSource {
    fn load_sdf(&self, smiles: &str) -> Result<String, ReqError>;
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum SdfOrigin {
    Screening,
    Database,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ViewerStatus {
    Empty,
    Rendered(SdfOrigin),
    Unavailable,
}

pub struct StructureViewer<R: StructureRenderer, S: StructureSource = PubChemSource> {
    pub renderer: R,
    source: S,
}

impl<R: StructureRenderer> StructureViewer<R> {
    pub fn new(renderer: R) -> Self {
        Self::with_source(renderer, PubChemSource::default())
    }
}

impl<R: StructureRenderer, S: StructureSource> StructureViewer<R, S> {
    pub fn with_source(renderer: R, source: S) -> Self {
        Self { renderer, source }
    }

    /// Replace whatever is displayed with `mol`. No retry on a failed lookup.
    pub fn show(&mut self, mol: Option<&Molecule>) -> ViewerStatus {
        self.renderer.clear();

        let Some(mol) = mol else {
            self.renderer.show_label(NO_SELECTION_TEXT);
            return ViewerStatus::Empty;
        };

        if let Some(sdf) = &mol.sdf {
            return self.render(sdf, SCREENING_STYLE, SdfOrigin::Screening);
        }

        match self.source.load_sdf(&mol.smiles) {
            Ok(sdf) => self.render(&sdf, DATABASE_STYLE, SdfOrigin::Database),
            Err(e) => {
                warn!("Unable to load a 3D structure for {}: {e}", mol.smiles);
                self.unavailable()
            }
        }
    }

    fn render(&mut self, sdf: &str, style: DrawStyle, origin: SdfOrigin) -> ViewerStatus {
        match self.renderer.render_sdf(sdf, style) {
            Ok(()) => ViewerStatus::Rendered(origin),
            Err(e) => {
                warn!("Unable to render structure: {e}");
                self.unavailable()
            }
        }
    }

    fn unavailable(&mut self) -> ViewerStatus {
        self.renderer.clear();
        self.renderer.show_label(UNAVAILABLE_LABEL);
        ViewerStatus::Unavailable
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneAtom {
    pub element: String,
    pub posit: [f64; 3],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBond {
    /// 0-based indices into the atom list.
    pub atom_0: usize,
    pub atom_1: usize,
    /// 1 for single, 2 for double etc. 4 is aromatic.
    pub order: u8,
}

/// What's currently drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub atoms: Vec<SceneAtom>,
    pub bonds: Vec<SceneBond>,
    pub style: Option<DrawStyle>,
    /// Zoom-to-fit target.
    pub center: [f64; 3],
    pub label: Option<String>,
}

/// Maps the parsed SDF into scene atoms and bonds. Bonds refer to atoms by serial number, which
/// for SDF is the 1-based position in the atom block.
fn scene_from_sdf(sdf: &Sdf) -> io::Result<(Vec<SceneAtom>, Vec<SceneBond>)> {
    let atoms: Vec<SceneAtom> = sdf
        .atoms
        .iter()
        .map(|a| SceneAtom {
            element: a.element.to_letter(),
            posit: [a.posit.x, a.posit.y, a.posit.z],
        })
        .collect();

    let index = |sn: u32| {
        (sn as usize)
            .checked_sub(1)
            .filter(|&i| i < atoms.len())
            .ok_or_else(|| {
                io::Error::new(
                    ErrorKind::InvalidData,
                    format!("Bond refers to a missing atom: {sn}"),
                )
            })
    };

    let mut bonds = Vec::with_capacity(sdf.bonds.len());
    for bond in &sdf.bonds {
        let order = match bond.bond_type {
            BondType::Single => 1,
            BondType::Double => 2,
            BondType::Triple => 3,
            BondType::Aromatic => 4,
            _ => 1,
        };

        bonds.push(SceneBond {
            atom_0: index(bond.atom_0_sn)?,
            atom_1: index(bond.atom_1_sn)?,
            order,
        });
    }

    Ok((atoms, bonds))
}

fn centroid(atoms: &[SceneAtom]) -> [f64; 3] {
    if atoms.is_empty() {
        return [0.; 3];
    }

    let mut result = [0.; 3];
    for atom in atoms {
        for (r, p) in result.iter_mut().zip(atom.posit) {
            *r += p;
        }
    }
    result.map(|v| v / atoms.len() as f64)
}

/// Builds an in-memory `Scene` from SDF text. Useful headless, and as the model a drawing
/// backend reads from.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    pub scene: Scene,
}

impl StructureRenderer for SceneRenderer {
    fn clear(&mut self) {
        self.scene = Scene::default();
    }

    fn render_sdf(&mut self, sdf: &str, style: DrawStyle) -> io::Result<()> {
        let (atoms, bonds) = scene_from_sdf(&Sdf::new(sdf)?)?;
        if atoms.is_empty() {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                "Structure has no atoms",
            ));
        }

        self.scene = Scene {
            center: centroid(&atoms),
            atoms,
            bonds,
            style: Some(style),
            label: None,
        };
        Ok(())
    }

    fn show_label(&mut self, text: &str) {
        self.scene.label = Some(text.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use approx::assert_relative_eq;

    use super::*;

    /// Ethanol, heavy atoms only.
    const ETHANOL_SDF: &str = "702
  -OEChem-10162607443D

  3  2  0     0  0  0  0  0  0999 V2000
   -0.8883    0.1670   -0.0273 C   0  0  0  0  0  0  0  0  0  0  0  0
    0.4658   -0.5116   -0.0272 C   0  0  0  0  0  0  0  0  0  0  0  0
    1.4195    0.3519    0.5664 O   0  0  0  0  0  0  0  0  0  0  0  0
  1  2  1  0  0  0  0
  2  3  1  0  0  0  0
M  END
$$$$
";

    struct FakeSource {
        sdf: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl FakeSource {
        fn new(sdf: Option<&'static str>) -> Self {
            Self {
                sdf,
                calls: Cell::new(0),
            }
        }
    }

    impl StructureSource for FakeSource {
        fn load_sdf(&self, _smiles: &str) -> Result<String, ReqError> {
            self.calls.set(self.calls.get() + 1);
            self.sdf.map(str::to_owned).ok_or(ReqError::Status(404))
        }
    }

    fn viewer(source: FakeSource) -> StructureViewer<SceneRenderer, FakeSource> {
        StructureViewer::with_source(SceneRenderer::default(), source)
    }

    #[test]
    fn render_ethanol() {
        let mut r = SceneRenderer::default();
        r.render_sdf(ETHANOL_SDF, SCREENING_STYLE).unwrap();

        let scene = &r.scene;
        assert_eq!(scene.atoms.len(), 3);
        assert_eq!(scene.atoms[2].element, "O");
        assert_relative_eq!(scene.atoms[1].posit[0], 0.4658);
        assert_eq!(
            scene.bonds[1],
            SceneBond {
                atom_0: 1,
                atom_1: 2,
                order: 1
            }
        );
    }

    #[test]
    fn bond_orders() {
        let sdf = ETHANOL_SDF
            .replace("  1  2  1  0", "  1  2  2  0")
            .replace("  2  3  1  0", "  2  3  3  0");

        let mut r = SceneRenderer::default();
        r.render_sdf(&sdf, DATABASE_STYLE).unwrap();
        assert_eq!(r.scene.bonds[0].order, 2);
        assert_eq!(r.scene.bonds[1].order, 3);
    }

    #[test]
    fn render_errors() {
        let mut r = SceneRenderer::default();
        assert!(r.render_sdf("too\nshort", SCREENING_STYLE).is_err());
        assert!(
            r.render_sdf(
                "a\nb\nc\n  5  4  0  0  0  0            999 V2000\n",
                SCREENING_STYLE
            )
            .is_err()
        );

        let bad_coord = ETHANOL_SDF.replace("0.4658", "x.4658");
        assert!(r.render_sdf(&bad_coord, SCREENING_STYLE).is_err());

        let bad_bond = ETHANOL_SDF.replace("  2  3  1  0", "  2  9  1  0");
        assert!(r.render_sdf(&bad_bond, SCREENING_STYLE).is_err());

        // A failed load leaves the previous scene alone; the viewer clears it.
        assert!(r.scene.atoms.is_empty());
    }

    #[test]
    fn screening_coords_used_directly() {
        let mut v = viewer(FakeSource::new(None));
        let mol = Molecule {
            sdf: Some(ETHANOL_SDF.to_owned()),
            ..Molecule::new("Ethanol", "CCO", 0.9)
        };

        assert_eq!(v.show(Some(&mol)), ViewerStatus::Rendered(SdfOrigin::Screening));
        assert_eq!(v.source.calls.get(), 0);

        let scene = &v.renderer.scene;
        assert_eq!(scene.style, Some(SCREENING_STYLE));
        assert_eq!(scene.atoms.len(), 3);
        assert_relative_eq!(scene.center[0], (-0.8883 + 0.4658 + 1.4195) / 3.);
        assert!(scene.label.is_none());
    }

    #[test]
    fn database_lookup() {
        let mut v = viewer(FakeSource::new(Some(ETHANOL_SDF)));
        let mol = Molecule::new("Ethanol", "CCO", 0.9);

        assert_eq!(v.show(Some(&mol)), ViewerStatus::Rendered(SdfOrigin::Database));
        assert_eq!(v.source.calls.get(), 1);
        assert_eq!(v.renderer.scene.style, Some(DATABASE_STYLE));
    }

    #[test]
    fn lookup_failure_shows_label() {
        let mut v = viewer(FakeSource::new(None));
        let mol = Molecule::new("Ethanol", "CCO", 0.9);

        assert_eq!(v.show(Some(&mol)), ViewerStatus::Unavailable);
        assert_eq!(v.renderer.scene.label.as_deref(), Some(UNAVAILABLE_LABEL));
        assert!(v.renderer.scene.atoms.is_empty());
    }

    #[test]
    fn bad_coords_show_label() {
        let mut v = viewer(FakeSource::new(None));
        let mol = Molecule {
            sdf: Some("not an sdf".to_owned()),
            ..Molecule::new("Ethanol", "CCO", 0.9)
        };
        assert_eq!(v.show(Some(&mol)), ViewerStatus::Unavailable);
    }

    #[test]
    fn change_clears_prior() {
        let mut v = viewer(FakeSource::new(None));
        let mol = Molecule {
            sdf: Some(ETHANOL_SDF.to_owned()),
            ..Molecule::new("Ethanol", "CCO", 0.9)
        };
        v.show(Some(&mol));
        assert!(!v.renderer.scene.atoms.is_empty());

        assert_eq!(v.show(None), ViewerStatus::Empty);
        assert!(v.renderer.scene.atoms.is_empty());
        assert!(v.renderer.scene.style.is_none());
        assert_eq!(v.renderer.scene.label.as_deref(), Some(NO_SELECTION_TEXT));
    }
}
