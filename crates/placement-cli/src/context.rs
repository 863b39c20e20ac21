use anyhow::Context;
use placement_config::PlacementConfig;
use placement_db::directory::StaticDirectory;
use placement_db::service::ApprovalService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ApprovalService<StaticDirectory>,
    pub config: PlacementConfig,
}

impl AppContext {
    pub async fn init(config: PlacementConfig) -> anyhow::Result<Self> {
        let directory = match config.directory.roster_path() {
            Some(path) => StaticDirectory::load(&path)
                .with_context(|| format!("failed to load roster {}", path.display()))?,
            None => {
                tracing::warn!(
                    "no committee roster configured; advisor and committee lookups will be empty"
                );
                StaticDirectory::new()
            }
        };

        let service = ApprovalService::from_config(&config, directory)
            .await
            .with_context(|| format!("failed to open database {}", config.database.path))?;

        Ok(Self { service, config })
    }
}
