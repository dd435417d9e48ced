use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use watchdogd::{
    cli::{Cli, parse_args},
    config::ProbeKind,
    probe::{HealthProbe, HttpProbe, TcpProbe},
    process::OsLauncher,
    shutdown::ShutdownSignal,
    supervisor::Supervisor,
};

fn main() -> Result<(), Box<dyn Error>> {
    let args = parse_args();
    init_logging(&args);

    let config = args.into_config()?;
    let shutdown = ShutdownSignal::new();
    register_signal_handler(shutdown.clone())?;

    let probe: Box<dyn HealthProbe> = match config.probe {
        ProbeKind::Tcp => Box::new(TcpProbe::new(config.endpoint.clone(), config.probe_timeout)),
        ProbeKind::Http => Box::new(HttpProbe::new(
            &config.endpoint,
            &config.http_path,
            config.probe_timeout,
        )?),
    };

    let mut supervisor = Supervisor::new(config.command, OsLauncher, probe, shutdown)
        .with_poll_interval(config.poll_interval)
        .with_grace_period(config.grace_period);

    match supervisor.run()? {
        Some(status) => info!("Watchdog stopped. Final service status: {status}"),
        None => info!("Watchdog stopped. No service process was running."),
    }

    Ok(())
}

fn init_logging(args: &Cli) {
    let filter = if let Some(level) = args.log_level {
        EnvFilter::new(level.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn register_signal_handler(shutdown: ShutdownSignal) -> Result<(), Box<dyn Error>> {
    ctrlc::set_handler(move || {
        info!("Interrupt received; shutting the service down...");
        shutdown.cancel();
    })?;

    Ok(())
}
