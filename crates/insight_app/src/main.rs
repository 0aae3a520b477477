mod cli;
mod config;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use insight_core::{history_rows, overview, TaskStatus};
use insight_engine::{
    ensure_dir, AnalysisClient, DirectoryHandle, DownloadDir, ExportStatus, Exporter, FileSlot,
    GeminiProvider, Orchestrator, TaskStore,
};
use insight_logging::{insight_info, LogDestination};

use crate::cli::{Cli, Command};
use crate::config::{api_key_from_env, config_path, describe_source, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let destination = LogDestination::from_name(&cli.log)
        .with_context(|| format!("unknown log destination {:?}", cli.log))?;
    let config_path = config_path(cli.config.as_deref())?;
    let config = AppConfig::load(&config_path)?;
    insight_logging::initialize(destination, config.log_level()?);
    insight_info!("{}", describe_source(&config_path));

    let data_dir = config.data_dir()?;
    ensure_dir(&data_dir).with_context(|| format!("data directory {data_dir:?}"))?;
    let store = Arc::new(TaskStore::open(
        Box::new(FileSlot::in_dir(data_dir)),
        Utc::now().timestamp_millis(),
    ));

    match cli.command {
        Command::Analyze { url } => analyze(&config, store, &url).await,
        Command::Overview => {
            let view = overview(&store.snapshot(), Utc::now().date_naive());
            print!("{}", render::overview(&view));
            Ok(())
        }
        Command::History => {
            print!("{}", render::history(&history_rows(&store.snapshot())));
            Ok(())
        }
        Command::Show { id } => {
            let tasks = store.snapshot();
            let task = tasks.get(&id).with_context(|| format!("no task with id {id}"))?;
            print!("{}", render::task(task));
            Ok(())
        }
        Command::Delete { id } => {
            if !store.remove(&id)? {
                bail!("no task with id {id}");
            }
            println!("Deleted {id}");
            Ok(())
        }
        Command::Export { id, folder } => export(&config, &store, id, folder),
    }
}

async fn analyze(config: &AppConfig, store: Arc<TaskStore>, url: &str) -> Result<()> {
    let provider = GeminiProvider::new(config.provider_settings(api_key_from_env()?))?;
    let orchestrator = Orchestrator::new(AnalysisClient::new(Arc::new(provider)), store);

    let task = orchestrator.submit(url).await?;
    print!("{}", render::task(&task));
    if task.status() == TaskStatus::Failed {
        bail!("analysis of {} failed", task.url());
    }
    Ok(())
}

fn export(
    config: &AppConfig,
    store: &TaskStore,
    id: Option<String>,
    folder: Option<PathBuf>,
) -> Result<()> {
    let mut exporter = Exporter::new(Arc::new(DownloadDir::new(config.downloads_dir()?)));
    if let Some(root) = folder.or_else(|| config.export_folder.clone()) {
        exporter = exporter.with_folder(
            DirectoryHandle::grant(&root).with_context(|| format!("export folder {root:?}"))?,
        );
    }

    let tasks = store.snapshot();
    let status = match id {
        Some(id) => {
            let task = tasks.get(&id).with_context(|| format!("no task with id {id}"))?;
            exporter.export_one(task)
        }
        None => exporter.export_all(&tasks),
    };
    print!("{}", render::export(&status));
    if let ExportStatus::Failed { message } = status {
        bail!(message);
    }
    Ok(())
}
