// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! ComfoConnect LAN C command-line driver.
//!
//! # Usage
//!
//! ```bash
//! # Find bridges on the local network
//! comfolanctl discover
//!
//! # Register this machine with the bridge (PIN from the unit's display)
//! comfolanctl register --host 192.168.1.20 --pin 1234
//!
//! # Drive the unit
//! comfolanctl set-speed low --host 192.168.1.20
//! comfolanctl show-sensor 276 --host 192.168.1.20 --follow
//! ```
//!
//! Exit codes: 0 success, 1 failure, 2 not registered, 3 connect
//! timeout, 4 RMI error (code on stderr).

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use comfolan::{
    discover_bridges, sensors, Bridge, BridgeConfig, ComfoCoolMode, ComfoClient, Error, PdoType,
    SessionError, TemperatureProfile, TransportError, VentilationMode, VentilationSetting,
    VentilationSpeed,
};
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_LOCAL_UUID: &str = "00000000000000000000000000000001";
const DEFAULT_DEVICE_NAME: &str = "comfolan";

/// ComfoConnect LAN C bridge CLI
#[derive(Parser, Debug)]
#[command(name = "comfolanctl")]
#[command(about = "Control a ComfoAir Q ventilation unit through its LAN C bridge")]
#[command(version)]
struct Args {
    /// Local application UUID (32 hex chars). Keep it stable across runs
    /// or the bridge forgets the registration.
    #[arg(long, default_value = DEFAULT_LOCAL_UUID, global = true)]
    local_uuid: String,

    /// Engine configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Discover bridges on the local network
    Discover {
        /// Probe a specific host instead of broadcasting
        #[arg(long)]
        host: Option<String>,

        /// Collection window in milliseconds
        #[arg(long, default_value = "2000")]
        timeout: u64,
    },

    /// Register this app on the bridge
    Register {
        #[arg(long)]
        host: String,

        /// Device name shown in the bridge's app list
        #[arg(long, default_value = DEFAULT_DEVICE_NAME)]
        name: String,

        /// PIN code of the unit
        #[arg(long, default_value = "0")]
        pin: u32,
    },

    /// Remove an app registration by UUID
    Deregister {
        #[arg(long)]
        host: String,

        /// UUID of the app to remove (32 hex chars)
        #[arg(long)]
        uuid: String,
    },

    /// List the bridge's registered apps
    ListRegistered {
        #[arg(long)]
        host: String,
    },

    /// Set the ventilation speed
    SetSpeed {
        speed: VentilationSpeed,

        #[arg(long)]
        host: String,
    },

    /// Set the operating mode
    SetMode {
        mode: VentilationMode,

        #[arg(long)]
        host: String,
    },

    /// Control the bypass
    SetBypass {
        setting: VentilationSetting,

        /// Duration in seconds (-1 = until changed)
        #[arg(long, default_value = "-1")]
        timeout: i32,

        #[arg(long)]
        host: String,
    },

    /// Boost to high speed for a while
    SetBoost {
        state: Switch,

        /// Duration in seconds
        #[arg(long, default_value = "3600")]
        timeout: i32,

        #[arg(long)]
        host: String,
    },

    /// Switch away mode
    SetAway {
        state: Switch,

        /// Duration in seconds
        #[arg(long, default_value = "3600")]
        timeout: i32,

        #[arg(long)]
        host: String,
    },

    /// Control the ComfoCool add-on
    SetComfocool {
        mode: ComfoCoolMode,

        /// Duration in seconds (-1 = until changed)
        #[arg(long, default_value = "-1")]
        timeout: i32,

        #[arg(long)]
        host: String,
    },

    /// Select the temperature profile
    SetTemperatureProfile {
        profile: TemperatureProfile,

        #[arg(long)]
        host: String,
    },

    /// Stream all catalog sensors until interrupted
    ShowSensors {
        #[arg(long)]
        host: String,
    },

    /// Show one sensor; with --follow, stream updates until interrupted
    ShowSensor {
        /// PDID of the sensor (e.g. 276 = outdoor air temperature)
        pdid: u32,

        #[arg(long)]
        host: String,

        #[arg(short, long)]
        follow: bool,
    },

    /// Read a raw property: UNIT SUBUNIT PROPERTY TYPE_TAG
    GetProperty {
        unit: u8,
        subunit: u8,
        property: u8,
        type_tag: u8,

        #[arg(long)]
        host: String,

        /// ComfoNet node to address
        #[arg(long, default_value = "1")]
        node_id: u8,
    },

    /// Read the target airflow (m3/h) for a speed step
    GetFlowForSpeed {
        speed: VentilationSpeed,

        #[arg(long)]
        host: String,
    },

    /// Set the target airflow (m3/h) for a speed step
    SetFlowForSpeed {
        speed: VentilationSpeed,
        flow: i64,

        #[arg(long)]
        host: String,
    },
}

#[derive(Tabled)]
struct BridgeRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Version")]
    version: u32,
}

#[derive(Tabled)]
struct AppRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Device name")]
    name: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.downcast_ref::<Error>() {
                Some(Error::Session(SessionError::NotRegistered)) => 2,
                Some(Error::Transport(TransportError::ConnectTimeout)) => 3,
                Some(Error::Rmi(rmi)) => {
                    eprintln!("{}", rmi.code);
                    4
                }
                _ => 1,
            };
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(code)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let local_uuid = comfolan::parse_uuid(&args.local_uuid)
        .context("--local-uuid must be 32 hex characters")?;

    let config = match &args.config {
        Some(path) => BridgeConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    match args.command {
        Commands::Discover { host, timeout } => {
            let target = resolve_target(host.as_deref()).await?;
            let bridges = discover_bridges(target, Duration::from_millis(timeout)).await?;
            if bridges.is_empty() {
                bail!("no bridge found");
            }
            let rows: Vec<BridgeRow> = bridges
                .iter()
                .map(|b| BridgeRow {
                    host: b.host.clone(),
                    uuid: comfolan::util::hex_encode(&b.uuid),
                    version: b.version,
                })
                .collect();
            println!("{}", Table::new(rows));
        }

        Commands::Register { host, name, pin } => {
            let bridge = find_bridge(&host, local_uuid, config).await?;

            match bridge.connect(true).await {
                Ok(()) => {
                    println!(
                        "UUID {} is already registered.",
                        comfolan::util::hex_encode(&local_uuid)
                    );
                }
                Err(Error::Session(SessionError::NotRegistered)) => {
                    bridge
                        .register_app(&name, pin)
                        .await
                        .context("registration failed; check the PIN")?;
                    println!(
                        "{} UUID {} is now registered.",
                        "ok:".green().bold(),
                        comfolan::util::hex_encode(&local_uuid)
                    );
                    bridge.connect(true).await?;
                }
                Err(e) => return Err(e.into()),
            }

            print_registered_apps(&bridge).await?;
            bridge.disconnect().await;
        }

        Commands::Deregister { host, uuid } => {
            let app_uuid =
                comfolan::parse_uuid(&uuid).context("--uuid must be 32 hex characters")?;
            let bridge = connect_bridge(&host, local_uuid, config).await?;
            bridge.deregister_app(app_uuid).await?;
            print_registered_apps(&bridge).await?;
            bridge.disconnect().await;
        }

        Commands::ListRegistered { host } => {
            let bridge = connect_bridge(&host, local_uuid, config).await?;
            print_registered_apps(&bridge).await?;
            bridge.disconnect().await;
        }

        Commands::SetSpeed { speed, host } => {
            with_client(&host, local_uuid, config, |client| async move {
                client.set_speed(speed).await
            })
            .await?;
        }

        Commands::SetMode { mode, host } => {
            with_client(&host, local_uuid, config, |client| async move {
                client.set_mode(mode).await
            })
            .await?;
        }

        Commands::SetBypass {
            setting,
            timeout,
            host,
        } => {
            with_client(&host, local_uuid, config, |client| async move {
                client.set_bypass(setting, timeout).await
            })
            .await?;
        }

        Commands::SetBoost {
            state,
            timeout,
            host,
        } => {
            with_client(&host, local_uuid, config, |client| async move {
                client.set_boost(state == Switch::On, timeout).await
            })
            .await?;
        }

        Commands::SetAway {
            state,
            timeout,
            host,
        } => {
            with_client(&host, local_uuid, config, |client| async move {
                client.set_away(state == Switch::On, timeout).await
            })
            .await?;
        }

        Commands::SetComfocool {
            mode,
            timeout,
            host,
        } => {
            with_client(&host, local_uuid, config, |client| async move {
                client.set_comfocool_mode(mode, timeout).await
            })
            .await?;
        }

        Commands::SetTemperatureProfile { profile, host } => {
            with_client(&host, local_uuid, config, |client| async move {
                client.set_temperature_profile(profile).await
            })
            .await?;
        }

        Commands::ShowSensors { host } => {
            let client = ComfoClient::new(find_bridge(&host, local_uuid, config).await?);
            client.set_sensor_callback(Some(Arc::new(|sensor, value| {
                println!(
                    "{:>44}: {} {}",
                    sensor.name,
                    sensors::display_value(sensor, &value),
                    sensor.unit.unwrap_or("")
                );
            })));
            client.set_alarm_callback(Some(Arc::new(|node_id, errors| {
                println!("Alarm received for node {}:", node_id);
                for (id, text) in errors {
                    println!("* {}: {}", id, text);
                }
            })));
            client.connect().await?;

            for sensor in sensors::SENSORS {
                client.register_sensor(sensor).await?;
            }

            tokio::signal::ctrl_c().await.ok();
            println!("Disconnecting...");
            client.disconnect().await;
        }

        Commands::ShowSensor { pdid, host, follow } => {
            let Some(sensor) = sensors::find(pdid) else {
                bail!("unknown sensor with PDID {}", pdid);
            };

            let client = ComfoClient::new(find_bridge(&host, local_uuid, config).await?);
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            client.set_sensor_callback(Some(Arc::new(move |sensor, value| {
                let _ = tx.send(sensors::display_value(sensor, &value));
            })));
            client.connect().await?;
            client.register_sensor(sensor).await?;

            if follow {
                loop {
                    tokio::select! {
                        Some(value) = rx.recv() => println!("{}", value),
                        _ = tokio::signal::ctrl_c() => break,
                    }
                }
            } else if let Some(value) = rx.recv().await {
                println!("{}", value);
            }

            client.disconnect().await;
        }

        Commands::GetProperty {
            unit,
            subunit,
            property,
            type_tag,
            host,
            node_id,
        } => {
            let Some(pdo_type) = PdoType::from_tag(type_tag) else {
                bail!("unknown type tag {:#04x}", type_tag);
            };
            let bridge = connect_bridge(&host, local_uuid, config).await?;
            let result = bridge
                .get_property(node_id, unit, subunit, property, pdo_type)
                .await;
            bridge.disconnect().await;
            println!("{}", result?);
        }

        Commands::GetFlowForSpeed { speed, host } => {
            let client = ComfoClient::new(find_bridge(&host, local_uuid, config).await?);
            client.connect().await?;
            let result = client.get_flow_for_speed(speed).await;
            client.disconnect().await;
            println!("{}", result?);
        }

        Commands::SetFlowForSpeed { speed, flow, host } => {
            with_client(&host, local_uuid, config, |client| async move {
                client.set_flow_for_speed(speed, flow).await
            })
            .await?;
        }
    }

    Ok(())
}

/// Resolve an optional host argument to a target address for discovery.
async fn resolve_target(host: Option<&str>) -> anyhow::Result<Option<IpAddr>> {
    let Some(host) = host else {
        return Ok(None);
    };
    let addr = tokio::net::lookup_host((host, comfolan::BRIDGE_PORT))
        .await
        .with_context(|| format!("cannot resolve {}", host))?
        .next()
        .with_context(|| format!("no address for {}", host))?;
    Ok(Some(addr.ip()))
}

/// Discover the bridge at `host` to learn its UUID, then bind it.
async fn find_bridge(
    host: &str,
    local_uuid: comfolan::Uuid,
    config: BridgeConfig,
) -> anyhow::Result<Bridge> {
    let target = resolve_target(Some(host)).await?;
    let bridges = discover_bridges(target, Duration::from_secs(2)).await?;
    let Some(found) = bridges.first() else {
        bail!("no bridge found at {}", host);
    };
    debug!(host = %found.host, uuid = %comfolan::util::hex_encode(&found.uuid), "bridge found");
    Ok(Bridge::new(
        found.host.clone(),
        found.uuid,
        local_uuid,
        config,
    )?)
}

/// Bind and connect, translating "not registered" into a friendly hint.
async fn connect_bridge(
    host: &str,
    local_uuid: comfolan::Uuid,
    config: BridgeConfig,
) -> anyhow::Result<Bridge> {
    let bridge = find_bridge(host, local_uuid, config).await?;
    match bridge.connect(true).await {
        Ok(()) => Ok(bridge),
        Err(e @ Error::Session(SessionError::NotRegistered)) => {
            eprintln!("Could not connect to bridge. Please register first.");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Run one high-level action against a connected client, then disconnect.
async fn with_client<F, Fut>(
    host: &str,
    local_uuid: comfolan::Uuid,
    config: BridgeConfig,
    action: F,
) -> anyhow::Result<()>
where
    F: FnOnce(Arc<ComfoClient>) -> Fut,
    Fut: std::future::Future<Output = Result<(), Error>>,
{
    let client = Arc::new(ComfoClient::new(connect_bridge(host, local_uuid, config).await?));
    let result = action(Arc::clone(&client)).await;
    client.disconnect().await;
    result?;
    Ok(())
}

async fn print_registered_apps(bridge: &Bridge) -> anyhow::Result<()> {
    let apps = bridge.list_registered_apps().await?;
    let rows: Vec<AppRow> = apps
        .iter()
        .map(|app| AppRow {
            uuid: comfolan::util::hex_encode(app.uuid.as_deref().unwrap_or_default()),
            name: app.devicename.clone().unwrap_or_default(),
        })
        .collect();
    println!("Registered applications:");
    println!("{}", Table::new(rows));
    Ok(())
}
