//! Editor-driven configuration.
//!
//! The editor pushes its whole settings object on every change; [`Settings::update`]
//! folds it into the process-wide record. Only the keys below are read:
//!
//! ```text
//! files.associations                       { "<wildcard>": "<language id>" }
//! luna.source.roots                        [ "<uri or path>" ]
//! luna.diagnostics.parameterValidation                     bool
//! luna.diagnostics.anyTypeCanAssignToAnyDefineType         bool
//! luna.diagnostics.defineAnyTypeCanBeAssignedByAnyVariable bool
//! luna.diagnostics.defineTypeCanReceiveNilType             bool
//! luna.diagnostics.tableLiteralEscape                      bool
//! luna.diagnostics.closureEscape                           bool
//! ```
//!
//! Associations and source roots are replaced by each update. A diagnostic
//! switch missing from an update keeps its previous value.

use std::collections::BTreeMap;
use std::path::Path;

use luna_typeck::CheckOptions;
use serde::Deserialize;

use crate::SettingsError;

/// Always associated, whatever the editor says.
pub const DEFAULT_ASSOCIATION: &str = "*.lua";

const LANGUAGE_ID: &str = "lua";

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    /// Sorted file-name wildcards of tracked files.
    associations: Vec<String>,
    /// Sorted, as written by the user.
    source_roots: Vec<String>,
    pub check: CheckOptions,
}

/// What an update changed that the coordinator must react to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    /// The tracked file set may differ: a reload is due.
    pub associations_changed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            associations: vec![DEFAULT_ASSOCIATION.to_owned()],
            source_roots: Vec::new(),
            check: CheckOptions::default(),
        }
    }
}

impl Settings {
    /// Read a settings file in the editor's JSON layout.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        let mut settings = Settings::default();
        settings.update(&value)?;
        Ok(settings)
    }

    pub fn associations(&self) -> &[String] {
        &self.associations
    }

    pub fn source_roots(&self) -> &[String] {
        &self.source_roots
    }

    /// Fold an editor settings object into this record.
    pub fn update(&mut self, value: &serde_json::Value) -> Result<SettingsUpdate, SettingsError> {
        let raw = RawSettings::deserialize(value)?;

        let mut associations = vec![DEFAULT_ASSOCIATION.to_owned()];
        if let Some(map) = raw.files.and_then(|files| files.associations) {
            associations.extend(
                map.into_iter()
                    .filter(|(_, language)| language.eq_ignore_ascii_case(LANGUAGE_ID))
                    .map(|(wildcard, _)| wildcard),
            );
        }
        associations.sort();
        associations.dedup();
        let associations_changed = associations != self.associations;
        self.associations = associations;

        let luna = raw.luna.unwrap_or_default();
        let mut roots = luna.source.and_then(|s| s.roots).unwrap_or_default();
        roots.sort();
        self.source_roots = roots;

        if let Some(diagnostics) = luna.diagnostics {
            diagnostics.apply(&mut self.check);
        }

        tracing::debug!(
            associations = ?self.associations,
            roots = self.source_roots.len(),
            associations_changed,
            "settings updated"
        );
        Ok(SettingsUpdate {
            associations_changed,
        })
    }
}

#[derive(Deserialize, Default)]
struct RawSettings {
    files: Option<RawFiles>,
    luna: Option<RawLuna>,
}

#[derive(Deserialize)]
struct RawFiles {
    associations: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize, Default)]
struct RawLuna {
    source: Option<RawSource>,
    diagnostics: Option<RawDiagnostics>,
}

#[derive(Deserialize)]
struct RawSource {
    roots: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDiagnostics {
    parameter_validation: Option<bool>,
    any_type_can_assign_to_any_define_type: Option<bool>,
    define_any_type_can_be_assigned_by_any_variable: Option<bool>,
    define_type_can_receive_nil_type: Option<bool>,
    table_literal_escape: Option<bool>,
    closure_escape: Option<bool>,
}

impl RawDiagnostics {
    fn apply(self, options: &mut CheckOptions) {
        let switches = [
            (self.parameter_validation, &mut options.parameter_validation),
            (
                self.any_type_can_assign_to_any_define_type,
                &mut options.unknown_assignable_to_any,
            ),
            (
                self.define_any_type_can_be_assigned_by_any_variable,
                &mut options.any_assignable_to_unknown,
            ),
            (
                self.define_type_can_receive_nil_type,
                &mut options.nil_assignable_to_any,
            ),
            (self.table_literal_escape, &mut options.table_literal_escape),
            (self.closure_escape, &mut options.closure_escape),
        ];
        for (value, slot) in switches {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}
