// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Docsplit engine.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SplitError;

/// Unique identifier for a loaded source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of logical documents a bundled scan is split into.
///
/// Declaration order is the extraction iteration order, and `Ord` follows it,
/// so a `BTreeMap<Category, _>` always iterates identity → resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Cédula de identidad.
    Identity,
    /// RIF (tax registry).
    TaxId,
    /// Títulos / certificaciones.
    Credentials,
    /// Constancia de servicios.
    ServiceLetter,
    /// Curriculum vitae.
    Resume,
}

impl Category {
    /// Every category, in iteration order.
    pub const ALL: [Category; 5] = [
        Category::Identity,
        Category::TaxId,
        Category::Credentials,
        Category::ServiceLetter,
        Category::Resume,
    ];

    /// Stable key used by the presentation layer to address a category.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Identity => "cedula",
            Self::TaxId => "rif",
            Self::Credentials => "titulo",
            Self::ServiceLetter => "constancia",
            Self::Resume => "curriculum",
        }
    }

    /// Slug used in generated output file names.
    pub fn file_slug(&self) -> &'static str {
        match self {
            Self::Identity => "cedula",
            Self::TaxId => "rif",
            Self::Credentials => "titulos",
            Self::ServiceLetter => "constancia",
            Self::Resume => "curriculum",
        }
    }

    /// Localized name shown in the editor.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Identity => "Cédula",
            Self::TaxId => "RIF",
            Self::Credentials => "Títulos",
            Self::ServiceLetter => "Constancia",
            Self::Resume => "Curriculum",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = SplitError;

    /// Accepts the boundary key (`titulo`), the file slug (`titulos`) or the
    /// snake_case variant name (`credentials`). Anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| {
                needle == category.key()
                    || needle == category.file_slug()
                    || needle == category.variant_name()
            })
            .ok_or_else(|| SplitError::UnknownCategory(s.to_string()))
    }
}

impl Category {
    fn variant_name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::TaxId => "tax_id",
            Self::Credentials => "credentials",
            Self::ServiceLetter => "service_letter",
            Self::Resume => "resume",
        }
    }
}

/// Which way the user turned a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    /// Counter-clockwise.
    Left,
    /// Clockwise.
    Right,
}

/// Page rotation, restricted to the four values a PDF `/Rotate` entry allows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation in clockwise degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Parse an exact rotation value. Only 0, 90, 180 and 270 are accepted.
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Turn 90° in `direction`: `(current ± 90 + 360) mod 360`.
    pub fn turned(self, direction: RotateDirection) -> Self {
        let current = i64::from(self.degrees());
        let delta = match direction {
            RotateDirection::Left => -90,
            RotateDirection::Right => 90,
        };
        let next = (current + delta + 360) % 360;
        // The arithmetic above stays on the 90° grid.
        Self::from_degrees(next).unwrap_or_default()
    }
}

impl TryFrom<i64> for Rotation {
    type Error = SplitError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::from_degrees(value).ok_or_else(|| {
            SplitError::InvalidRange(format!("rotation must be 0, 90, 180 or 270, got {value}"))
        })
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        i64::from(rotation.degrees())
    }
}

/// Category → 0-based page indices, as produced by the classifiers.
pub type PageMap = BTreeMap<Category, Vec<usize>>;

/// One page to copy into an output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAssignment {
    /// 0-based index into the source document.
    pub source_index: usize,
    /// Rotation to stamp on the copied page.
    #[serde(default)]
    pub rotation: Rotation,
}

impl PageAssignment {
    pub fn new(source_index: usize, rotation: Rotation) -> Self {
        Self {
            source_index,
            rotation,
        }
    }

    pub fn unrotated(source_index: usize) -> Self {
        Self::new(source_index, Rotation::Deg0)
    }
}

/// Category → pages (with rotation) that extraction should compose.
pub type ExtractionPlan = BTreeMap<Category, Vec<PageAssignment>>;

/// One generated result: a standalone PDF holding a single category's pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub file_name: String,
    pub category: Category,
    pub content: Vec<u8>,
}

impl OutputDocument {
    pub const MIME_TYPE: &'static str = "application/pdf";
}

/// `"<identifier> - <slug>.pdf"`.
pub fn output_file_name(identifier: &str, category: Category) -> String {
    format!("{identifier} - {}.pdf", category.file_slug())
}

/// User-supplied 1-based page boundaries for the manual override path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentConfig {
    pub cedula: u32,
    pub rif: u32,
    pub titulo_start: u32,
    pub titulo_end: u32,
    pub constancia: u32,
    pub curriculum_start: u32,
}

impl DocumentConfig {
    /// Boundaries the configurator proposes for a document of `page_count`
    /// pages before the user adjusts them.
    pub fn suggested(page_count: usize) -> Self {
        let total = u32::try_from(page_count).unwrap_or(u32::MAX);
        Self {
            cedula: 1,
            rif: 2,
            titulo_start: 3,
            titulo_end: 4.min(total.saturating_sub(2)).max(1),
            constancia: 5.min(total.saturating_sub(1)).max(1),
            curriculum_start: 6.min(total).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_left_then_right_is_identity() {
        for rotation in [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            let back = rotation
                .turned(RotateDirection::Left)
                .turned(RotateDirection::Right);
            assert_eq!(back, rotation);
        }
    }

    #[test]
    fn rotate_wraps_around() {
        assert_eq!(Rotation::Deg0.turned(RotateDirection::Left), Rotation::Deg270);
        assert_eq!(Rotation::Deg270.turned(RotateDirection::Right), Rotation::Deg0);
    }

    #[test]
    fn rotation_rejects_off_grid_values() {
        assert!(Rotation::from_degrees(45).is_none());
        assert!(Rotation::from_degrees(360).is_none());
        assert!(serde_json::from_str::<Rotation>("91").is_err());
        assert_eq!(serde_json::from_str::<Rotation>("180").unwrap(), Rotation::Deg180);
    }

    #[test]
    fn categories_parse_from_every_boundary_spelling() {
        assert_eq!("titulo".parse::<Category>().unwrap(), Category::Credentials);
        assert_eq!("titulos".parse::<Category>().unwrap(), Category::Credentials);
        assert_eq!("SERVICE_LETTER".parse::<Category>().unwrap(), Category::ServiceLetter);
        assert!(matches!(
            "passport".parse::<Category>(),
            Err(SplitError::UnknownCategory(key)) if key == "passport"
        ));
    }

    #[test]
    fn category_order_matches_extraction_order() {
        let mut sorted = Category::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::ALL.to_vec());
    }

    #[test]
    fn output_names_use_file_slugs() {
        assert_eq!(
            output_file_name("12345678", Category::Credentials),
            "12345678 - titulos.pdf"
        );
        assert_eq!(
            output_file_name("unknown", Category::Identity),
            "unknown - cedula.pdf"
        );
    }

    #[test]
    fn suggested_config_tracks_short_documents() {
        let long = DocumentConfig::suggested(10);
        assert_eq!(
            (long.titulo_end, long.constancia, long.curriculum_start),
            (4, 5, 6)
        );

        let short = DocumentConfig::suggested(5);
        assert_eq!(
            (short.titulo_end, short.constancia, short.curriculum_start),
            (3, 4, 5)
        );
    }

    #[test]
    fn document_config_uses_camel_case_on_the_wire() {
        let json = r#"{"cedula":1,"rif":2,"tituloStart":3,"tituloEnd":4,"constancia":5,"curriculumStart":6}"#;
        let config: DocumentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, DocumentConfig::suggested(12));
    }
}
