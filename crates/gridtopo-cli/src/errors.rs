use console::style;
use gridtopo_core::error::{GridError, Stage};
use std::fmt;

/// Error with context and suggestions for the terminal
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: None, suggestions: Vec::new(), help_command: None }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Offline mode was requested with only some of the input files
pub fn incomplete_offline_inputs() -> CliError {
    CliError::new("Offline run needs all three input files")
        .with_suggestion("Pass --regions-file, --substations-file and --generators-file together")
        .with_suggestion("Or drop all three to query GADM and Overpass")
        .with_help("Run: gridtopo run --help")
}

/// Translate a pipeline error into a message with hints for its stage
pub fn from_grid_error(error: &GridError) -> CliError {
    let base = CliError::new(error.to_string());
    let inner = match error {
        GridError::StageFailed { source, .. } => source.as_ref(),
        other => other,
    };

    let hinted = match inner {
        GridError::NoRegions => base
            .with_suggestion("Name regions with --regions Brandenburg,Sachsen")
            .with_suggestion("Or set GRIDTOPO_REGIONS or `regions` in gridtopo.toml"),
        GridError::RegionNotFound { name } => base
            .with_context(format!("No boundary is named '{}'.", name))
            .with_suggestion("Check the spelling against the boundary file")
            .with_suggestion("Use --region-property if names live in another property"),
        GridError::EmptyFeatureSet { kind } => base
            .with_context(format!("The requested regions contain no {} features.", kind))
            .with_suggestion("Check that the regions cover the area of interest"),
        GridError::ConfigInvalid { key, .. } => base
            .with_suggestion(format!("Check `{}` in gridtopo.toml and GRIDTOPO_* variables", key))
            .with_help("Run: gridtopo config"),
        GridError::Collaborator { source_name, .. } => base
            .with_suggestion(format!("Check that {} is reachable", source_name))
            .with_suggestion("Or run offline with --regions-file, --substations-file and --generators-file"),
        GridError::InvalidGeometry { .. } => {
            base.with_suggestion("Drop --strict to skip invalid geometries with a warning")
        }
        _ => base,
    };

    match error.stage() {
        Some(Stage::Export) => hinted.with_suggestion("Check that the output directory is writable"),
        _ => hinted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtopo_core::models::FeatureKind;

    #[test]
    fn test_region_not_found_hints() {
        let err = GridError::RegionNotFound { name: "Bayern".to_string() }.at_stage(Stage::RegionFetch);
        let cli = from_grid_error(&err);
        assert!(cli.message.contains("Bayern"));
        assert!(cli.context.as_deref().unwrap_or_default().contains("Bayern"));
        assert_eq!(cli.suggestions.len(), 2);
    }

    #[test]
    fn test_export_stage_adds_hint() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let cli = from_grid_error(&GridError::Io(io).at_stage(Stage::Export));
        assert!(cli.suggestions.iter().any(|s| s.contains("writable")));
    }

    #[test]
    fn test_empty_features_context() {
        let err = GridError::EmptyFeatureSet { kind: FeatureKind::Generator };
        let cli = from_grid_error(&err);
        assert!(cli.context.unwrap().contains("generator"));
    }
}
