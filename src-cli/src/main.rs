use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use synthbox_core::{AppCore, AppError, Command, Event, SerialTransport, TransportConfig};
use synthbox_domain_settings::SettingsAction;
use synthbox_infra_catalog_json::{bundled_catalog, load_catalog};
use synthbox_infra_serial_serialport::SerialportConnector;
use synthbox_infra_storage_fs::FsStorage;
use synthbox_ports::catalog::{CatalogError, InMemoryCatalog};
use synthbox_ports::storage::{AppConfigDto, StorageError, StoragePort};

#[derive(Debug, Parser)]
#[command(name = "synthbox", about = "Configure a SynthBox MIDI controller over USB serial")]
struct Cli {
    /// Directory holding config.json (defaults to the platform config dir).
    #[arg(long = "config-dir", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// List serial ports and their USB manufacturer.
    Ports,
    /// List the synths in the catalog.
    Synths,
    /// Read the settings stored on the device.
    Load {
        /// Also write them to a settings file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Send a settings file to the device (RAM only until `commit`).
    Push {
        /// Defaults to the last pushed file.
        file: Option<PathBuf>,
    },
    /// Ask the device to persist the last pushed settings.
    Commit,
    /// Print a settings file the way it would be sent.
    Show { file: Option<PathBuf> },
    /// Change the grid size of a settings file in place.
    Resize {
        file: PathBuf,
        #[arg(long)]
        rows: Option<u32>,
        #[arg(long)]
        columns: Option<u32>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    App(#[from] AppError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("no settings file given and none pushed before")]
    NoSettingsFile,
}

struct Host {
    core: AppCore,
    storage: FsStorage,
    config: AppConfigDto,
    base_dir: PathBuf,
}

impl Host {
    fn start(config_dir: Option<PathBuf>) -> Result<Self, CliError> {
        let base_dir = match config_dir {
            Some(dir) => dir,
            None => FsStorage::default_base_dir()?,
        };
        let storage = FsStorage::new(base_dir.clone());
        let config = storage.load_config()?;

        let catalog: InMemoryCatalog = match &config.catalog_path {
            Some(path) => load_catalog(Path::new(path))?,
            None => bundled_catalog()?,
        };
        let transport = Arc::new(SerialTransport::new(
            Box::new(SerialportConnector::new()),
            TransportConfig::from_app_config(&config),
        ));
        let core = AppCore::new(
            Arc::new(catalog),
            transport,
            Some(Box::new(FsStorage::new(base_dir.clone()))),
        );
        Ok(Self {
            core,
            storage,
            config,
            base_dir,
        })
    }

    fn run(&mut self, command: Command) -> Result<Vec<Event>, CliError> {
        let result = self.core.handle_command(command);
        let events = self.core.drain_events();
        for event in &events {
            if let Event::DeviceOperationFailed {
                payload: Some(payload),
                ..
            } = event
            {
                warn!("offending payload: {}", payload);
            }
        }
        result?;
        Ok(events)
    }

    fn import(&mut self, file: &Path) -> Result<(), CliError> {
        self.run(Command::ImportFile {
            path: file.display().to_string(),
        })?;
        Ok(())
    }

    fn print_preview(&self) -> Result<(), CliError> {
        println!("{}", self.core.export_preview()?);
        Ok(())
    }

    fn remember_settings_file(&mut self, file: &Path) -> Result<(), CliError> {
        self.config.last_settings_file = Some(file.display().to_string());
        self.storage.save_config(&self.config)?;
        info!("saved config under {}", self.base_dir.display());
        Ok(())
    }
}

fn execute(cli: Cli) -> Result<(), CliError> {
    let mut host = Host::start(cli.config_dir)?;

    match cli.command {
        CliCommand::Ports => {
            for event in host.run(Command::ListSerialPorts)? {
                if let Event::SerialPortsListed { ports } = event {
                    for port in ports {
                        let manufacturer = port.manufacturer.as_deref().unwrap_or("-");
                        println!("{}\t{}", port.name, manufacturer);
                    }
                }
            }
        }
        CliCommand::Synths => {
            for event in host.run(Command::ListSynths)? {
                if let Event::SynthsListed { synths } = event {
                    for synth in synths {
                        println!(
                            "{}\t{}\t{} parameters",
                            synth.id,
                            synth.display_title(),
                            synth.parameters.len()
                        );
                    }
                }
            }
        }
        CliCommand::Load { out } => {
            host.run(Command::LoadFromDevice)?;
            host.print_preview()?;
            if let Some(out) = out {
                host.run(Command::ExportFile {
                    path: out.display().to_string(),
                })?;
            }
        }
        CliCommand::Push { file } => {
            let file = file
                .or_else(|| host.config.last_settings_file.clone().map(PathBuf::from))
                .ok_or(CliError::NoSettingsFile)?;
            host.import(&file)?;
            host.run(Command::PushToDevice)?;
            host.remember_settings_file(&file)?;
            println!("pushed {}; run `synthbox commit` to persist", file.display());
        }
        CliCommand::Commit => {
            host.run(Command::CommitToDevice)?;
            println!("committed");
        }
        CliCommand::Show { file } => {
            if let Some(file) = file {
                host.import(&file)?;
            }
            host.print_preview()?;
        }
        CliCommand::Resize {
            file,
            rows,
            columns,
        } => {
            host.import(&file)?;
            host.run(Command::Edit {
                action: SettingsAction::ResizeGrid { rows, columns },
            })?;
            host.run(Command::ExportFile {
                path: file.display().to_string(),
            })?;
            let session = host.core.session();
            println!(
                "{} now {}x{} with {} presets",
                file.display(),
                session.model.controller_rows,
                session.model.controller_columns,
                session.model.presets.len()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
