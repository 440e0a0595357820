//! Meteotemplate uploader binary
//!
//! Usage:
//!   meteotemplate -c meteotemplate.yaml           # read host events from stdin
//!   meteotemplate -c meteotemplate.yaml --test    # send one synthetic record
//!
//! Host events are JSON lines:
//!   {"event": "archive", "record": {"dateTime": 1700000000, "usUnits": 16, "outTemp": 21.5}}

use argh::FromArgs;
use meteotemplate::{HostEvent, Record, SiteConfig, UnitSystem, Upload, UploadService, Uploader};
use std::io::BufRead;
use tokio::sync::{mpsc, watch};

#[derive(FromArgs)]
/// Upload weather station records to a Meteotemplate server
struct Args {
    /// path to the YAML configuration file
    #[argh(option, short = 'c', default = "String::from(\"meteotemplate.yaml\")")]
    config: String,

    /// send a single synthetic record and exit
    #[argh(switch)]
    test: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();
    log::info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
    log::info!("Loading config from: {}", args.config);

    let config = match SiteConfig::load(&args.config).and_then(SiteConfig::resolve) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Data will not be uploaded: {}", e);
            std::process::exit(1);
        }
    };

    if args.test {
        let uploader = Uploader::new(config)?;
        let outcome = uploader.upload(&test_record()).await;
        if outcome.is_failure() {
            std::process::exit(2);
        }
        return Ok(());
    }

    let service = UploadService::from_config(config)?;

    let (shutdown_tx, mut shutdown_rx) = watch::channel(());
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        let _ = shutdown_tx.send(());
    })?;

    let mut lines = spawn_stdin_reader()?;
    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            line = lines.recv() => match line {
                Some(Ok(line)) => handle_line(&service, &line),
                Some(Err(e)) => {
                    log::error!("Failed to read stdin: {e}");
                    break;
                }
                None => break,
            },
        }
    }

    log::info!("Waiting for queued uploads");
    service.shutdown().await;
    Ok(())
}

/// Read raw stdin lines on a detached thread, so a pending read never delays exit.
fn spawn_stdin_reader() -> std::io::Result<mpsc::Receiver<std::io::Result<Vec<u8>>>> {
    let (tx, rx) = mpsc::channel(64);
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let mut stdin = std::io::stdin().lock();
            loop {
                let mut line = Vec::new();
                match stdin.read_until(b'\n', &mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if tx.blocking_send(Ok(line)).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        let _ = tx.blocking_send(Err(e));
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}

fn handle_line(service: &UploadService, line: &[u8]) {
    match HostEvent::from_line(line) {
        Ok(Some(event)) => {
            service.submit(event);
        }
        Ok(None) => {}
        Err(e) => log::warn!("Ignoring event: {e}"),
    }
}

fn test_record() -> Record {
    Record::new(chrono::Utc::now().timestamp(), UnitSystem::Us)
        .with("outTemp", 32.5)
        .with("inTemp", 75.8)
        .with("outHumidity", 24.0)
}
