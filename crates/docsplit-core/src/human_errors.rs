// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the editing UI.
//
// Every engine error is mapped to a short Spanish message (the language of the
// documents being processed) with a suggestion. Nothing here retries on its
// own; `retriable` only tells the UI whether offering a retry button is useful.

use crate::error::SplitError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Likely to succeed if the user tries again.
    Transient,
    /// The user must change something (fix page ranges, pick another file).
    ActionRequired,
    /// Retrying the same input will not help.
    Permanent,
}

/// A human-readable error with a message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Summary shown as a heading.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether a user-triggered retry makes sense.
    pub retriable: bool,
    pub severity: Severity,
}

impl HumanError {
    fn new(message: &str, suggestion: String, retriable: bool, severity: Severity) -> Self {
        Self {
            message: message.into(),
            suggestion,
            retriable,
            severity,
        }
    }
}

/// Convert a `SplitError` into a `HumanError` for display.
pub fn humanize_error(err: &SplitError) -> HumanError {
    match err {
        SplitError::Load(detail) => HumanError::new(
            "Error al leer el PDF.",
            format!("Verifica que el archivo sea un PDF válido y vuelve a cargarlo. ({detail})"),
            false,
            Severity::ActionRequired,
        ),

        SplitError::DocumentNotFound(_) => HumanError::new(
            "El documento ya no está disponible.",
            "Vuelve a cargar el archivo.".into(),
            false,
            Severity::ActionRequired,
        ),

        SplitError::UnknownCategory(key) => HumanError::new(
            "Tipo de documento desconocido.",
            format!("El tipo {key:?} no existe."),
            false,
            Severity::Permanent,
        ),

        SplitError::InvalidRange(detail) => HumanError::new(
            "Las páginas indicadas no son válidas.",
            format!("Revisa la configuración de páginas: {detail}"),
            false,
            Severity::ActionRequired,
        ),

        SplitError::Render { page, .. } => HumanError::new(
            "No se pudo mostrar la vista previa.",
            format!("Intenta de nuevo. (Página {})", page + 1),
            true,
            Severity::Transient,
        ),

        SplitError::Extraction { category, .. } => HumanError::new(
            "No se pudo generar uno de los documentos.",
            format!("Falta el documento {}. Intenta guardar de nuevo.", category.display_name()),
            true,
            Severity::Transient,
        ),

        SplitError::PdfError(detail) | SplitError::ImageError(detail) => HumanError::new(
            "Ocurrió un problema al procesar el PDF.",
            format!("Intenta de nuevo. ({detail})"),
            true,
            Severity::Transient,
        ),

        SplitError::Packaging(detail) => HumanError::new(
            "No se pudo crear el archivo ZIP.",
            format!("Intenta descargar de nuevo. ({detail})"),
            true,
            Severity::Transient,
        ),

        SplitError::Config(detail) => HumanError::new(
            "La configuración no es válida.",
            detail.clone(),
            false,
            Severity::Permanent,
        ),

        SplitError::Io(io_err) => HumanError::new(
            "No se pudo leer o escribir un archivo.",
            format!("Revisa los permisos e intenta de nuevo. ({io_err})"),
            true,
            Severity::Transient,
        ),

        SplitError::Serialization(detail) => HumanError::new(
            "Los datos guardados están dañados.",
            format!("{detail}"),
            false,
            Severity::Permanent,
        ),
    }
}
