//! Error types for gridtopo

use std::fmt;
use thiserror::Error;

use crate::models::FeatureKind;

/// Pipeline stage an error was raised in.
///
/// Only fallible stages are listed; normalizing, filtering, aggregating and
/// linking cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RegionFetch,
    FeatureQuery,
    Reduce,
    Match,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RegionFetch => "region fetch",
            Stage::FeatureQuery => "feature query",
            Stage::Reduce => "reduce",
            Stage::Match => "match",
            Stage::Export => "export",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum GridError {
    // Region errors
    #[error("No regions requested")]
    NoRegions,

    #[error("Region not found: {name}")]
    RegionNotFound { name: String },

    // Feature errors
    #[error("No {kind} features found in the requested regions")]
    EmptyFeatureSet { kind: FeatureKind },

    #[error("CRS mismatch: {left} vs {right}")]
    CrsMismatch { left: String, right: String },

    #[error("Invalid geometry at feature {feature_id}: {reason}")]
    InvalidGeometry { feature_id: String, reason: String },

    #[error("Projection failed: {reason}")]
    Projection { reason: String },

    // Collaborator errors
    #[error("{source_name} request failed: {reason}")]
    Collaborator { source_name: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<GridError>,
    },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GridError {
    /// Attribute this error to a pipeline stage.
    ///
    /// Errors that already carry a stage keep the innermost one.
    pub fn at_stage(self, stage: Stage) -> Self {
        match self {
            GridError::StageFailed { .. } => self,
            other => GridError::StageFailed { stage, source: Box::new(other) },
        }
    }

    /// The stage this error was attributed to, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            GridError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
