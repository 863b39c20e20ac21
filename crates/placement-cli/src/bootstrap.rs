use anyhow::Context;
use placement_config::PlacementConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<PlacementConfig> {
    let mut config =
        PlacementConfig::load_with_dotenv().context("failed to load placement configuration")?;
    apply_overrides(&mut config, flags);
    Ok(config)
}

fn apply_overrides(config: &mut PlacementConfig, flags: &GlobalFlags) {
    if let Some(db) = &flags.db {
        config.database.path.clone_from(db);
    }
    if let Some(roster) = &flags.roster {
        config.directory.roster_path.clone_from(roster);
    }
    if let Some(limit) = flags.limit {
        config.general.default_limit = limit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn flags_override_config() {
        let mut config = PlacementConfig::default();
        let flags = GlobalFlags {
            format: OutputFormat::Json,
            limit: Some(5),
            quiet: false,
            verbose: false,
            db: Some("/tmp/override.db".into()),
            roster: Some("roster.toml".into()),
        };
        apply_overrides(&mut config, &flags);
        assert_eq!(config.database.path, "/tmp/override.db");
        assert_eq!(config.directory.roster_path, "roster.toml");
        assert_eq!(config.general.default_limit, 5);
    }

    #[test]
    fn absent_flags_keep_config() {
        let mut config = PlacementConfig::default();
        let flags = GlobalFlags {
            format: OutputFormat::Raw,
            limit: None,
            quiet: true,
            verbose: false,
            db: None,
            roster: None,
        };
        apply_overrides(&mut config, &flags);
        assert_eq!(config.database.path, ".placement/approvals.db");
        assert!(!config.directory.is_configured());
    }
}
