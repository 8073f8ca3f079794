mod app;
mod console;
mod train;

use std::{
    env,
    fs::{self, OpenOptions},
    process::ExitCode,
};

use anyhow::{Context, Result};
use onfs_core::{
    config::{self, AppConfig},
    manifest::manifest_path,
    parse_args_os,
    session::run_training,
    AssetCatalog, CatalogBuilder, CatalogManifest, DiskAssetLoader, LaunchOptions, RunMode,
    SelectionLoop, WorkingDirectories,
};
use tracing::{error, info, Level};
use tracing_subscriber::{filter::filter_fn, prelude::*, EnvFilter};

use crate::{
    app::TerminalSession,
    train::{HeadlessTrainer, TrainingParams},
};

fn main() -> ExitCode {
    if let Err(err) = init_logging() {
        eprintln!("onfs: failed to initialise logging: {err:#}");
        return ExitCode::FAILURE;
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("onfs: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let parameters = parse_args_os(env::args_os().skip(1))?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    let options = LaunchOptions::resolve(&parameters, &config)?;
    info!(
        "OpenNFS {} starting in {:?} mode at {}x{}",
        env!("CARGO_PKG_VERSION"),
        options.mode,
        options.xres,
        options.yres
    );

    WorkingDirectories::from_config(&config).ensure()?;
    let catalog = discover(&options, &config)?;

    match options.mode {
        RunMode::Training => {
            let runs = train(&catalog, &options)?;
            info!("Completed {} training run(s)", runs);
            Ok(())
        }
        RunMode::Interactive => {
            let loader = DiskAssetLoader::new(&catalog);
            let session = TerminalSession::new(options.xres, options.yres);
            let cycles = SelectionLoop::new(loader, session, &catalog, options.seed).run()?;
            info!("Exiting after {} sessions", cycles);
            Ok(())
        }
    }
}

/// Scan the resource root and snapshot the result. Both modes need the full
/// catalog, so an incomplete root fails training as well.
fn discover(options: &LaunchOptions, config: &AppConfig) -> Result<AssetCatalog> {
    let catalog = CatalogBuilder::new(&options.resource_root)
        .skip_broken_editions(config.skip_broken_editions)
        .build()
        .context("failed to discover installed assets")?;

    if config.write_catalog_manifest {
        CatalogManifest::new(&options.resource_root, catalog.clone())
            .persist(manifest_path(&config.asset_root))?;
    }
    Ok(catalog)
}

fn train(catalog: &AssetCatalog, options: &LaunchOptions) -> Result<usize> {
    let mut loader = DiskAssetLoader::new(catalog);
    let mut trainer = HeadlessTrainer::new(TrainingParams::default());
    run_training(&mut loader, &mut trainer, &options.training)?;
    Ok(trainer.runs())
}

fn init_logging() -> Result<()> {
    let log_dir = env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("onfs.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Warnings only, and nothing while the terminal session is on screen.
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(filter_fn(|metadata| {
            *metadata.level() <= Level::WARN && !console::is_suspended()
        }));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use onfs_core::{parse_args, DiscoveryError, SharedFolder};
    use std::path::Path;
    use tempfile::tempdir;

    fn install_nfs3(root: &Path) -> Result<()> {
        let nfs3 = root.join("NFS_3");
        fs::create_dir_all(nfs3.join("gamedata/tracks/trk008"))?;
        fs::create_dir_all(nfs3.join("gamedata/carmodel/diab"))?;
        fs::create_dir_all(nfs3.join("gamedata/carmodel/traffic/pursuit"))?;
        for shared in ["lanes", "misc"] {
            fs::create_dir_all(root.join(shared))?;
        }
        Ok(())
    }

    fn training_options(root: &Path, assets: &Path) -> Result<(LaunchOptions, AppConfig)> {
        let config = AppConfig {
            asset_root: assets.to_path_buf(),
            write_catalog_manifest: false,
            ..AppConfig::default()
        };
        let resources = format!("resources={}", root.display());
        let parameters = parse_args(["mode=train", resources.as_str()])?;
        let options = LaunchOptions::resolve(&parameters, &config)?;
        assert_eq!(options.mode, RunMode::Training);
        Ok((options, config))
    }

    #[test]
    fn training_requires_the_shared_folders() -> Result<()> {
        let dir = tempdir()?;
        install_nfs3(dir.path())?;
        let (options, config) = training_options(dir.path(), &dir.path().join("assets"))?;

        let err = discover(&options, &config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiscoveryError>(),
            Some(DiscoveryError::MissingSharedFolder(SharedFolder::Sfx))
        ));
        Ok(())
    }

    #[test]
    fn training_runs_once_on_a_complete_root() -> Result<()> {
        let dir = tempdir()?;
        install_nfs3(dir.path())?;
        fs::create_dir_all(dir.path().join("sfx"))?;
        let (options, config) = training_options(dir.path(), &dir.path().join("assets"))?;

        let catalog = discover(&options, &config)?;
        assert_eq!(train(&catalog, &options)?, 1);
        assert!(!manifest_path(&config.asset_root).exists());
        Ok(())
    }
}
