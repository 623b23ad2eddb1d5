//! Network Toolbox - Main CLI Application
//!
//! On-device network diagnostics: ping loop, port scanner, DNS lookup,
//! HTTP status checker, traceroute and subnet calculator.

use clap::Parser;
use network_toolbox::{
    cli::{Cli, Command},
    error::{AppError, Result},
    http_check::HttpChecker,
    logging::{LogLevel, Logger},
    output::Formatter,
    ping::PingLoop,
    resolver::Resolver,
    scanner::{PortScanner, ScanEvent},
    subnet::compute_subnet,
    traceroute::TracerouteRunner,
    PKG_NAME, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let use_color = cli.use_colors();

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        if e.is_recoverable() {
            eprintln!("This looks transient; retrying may succeed.");
        }
        process::exit(e.exit_code());
    }
}

/// Main application logic: build configuration, then dispatch the
/// subcommand against the engine.
async fn run_application(cli: Cli) -> Result<()> {
    let config = cli.build_config()?;
    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Info };
    let logger = Logger::new(level, cli.use_colors());
    let formatter = Formatter::new(cli.use_colors());
    let json = cli.json;
    logger.debug(&format!("{} v{}", PKG_NAME, VERSION));

    match cli.command {
        Command::Subnet { ip, prefix } => {
            let result = compute_subnet(&ip, prefix)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", formatter.subnet(&result));
            }
        }

        Command::Dns { hostname } => {
            logger.debug(&format!("Resolving {}", hostname));
            let resolver = Resolver::from_system_conf()?;
            let records = resolver.resolve(&hostname).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                println!("{}", formatter.dns_records(&records));
            }
        }

        Command::Ping { host, count, .. } => {
            logger.debug(&format!(
                "Pinging {} every {}s, {}ms timeout, TCP port {}",
                host, config.ping.interval_secs, config.ping.timeout_ms, config.ping.probe_port
            ));
            let (handle, mut rx) = PingLoop::start(&host, &config.ping);

            let mut emitted: u64 = 0;
            loop {
                tokio::select! {
                    update = rx.recv() => {
                        let Some(update) = update else { break };
                        if json {
                            println!("{}", serde_json::to_string(&update)?);
                        } else {
                            println!("{}", formatter.ping_update(&update));
                        }
                        emitted += 1;
                        if count.is_some_and(|limit| emitted >= limit) {
                            handle.stop();
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        handle.stop();
                    }
                }
            }

            let session = handle.join().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&session.stats())?);
            } else {
                println!("{}", formatter.ping_stats(&session.stats()));
            }
        }

        Command::Scan { host, start, end, .. } => {
            logger.debug(&format!(
                "Scanning {} ports {}-{}, {} in flight, {}ms timeout",
                host, start, end, config.scan.concurrency, config.scan.timeout_ms
            ));
            let scanner = PortScanner::new(&config.scan);
            let (handle, mut rx) = scanner.scan(&host, start, end);

            loop {
                tokio::select! {
                    event = rx.recv() => {
                        match event {
                            Some(ScanEvent::Open(result)) => {
                                if json {
                                    println!("{}", serde_json::to_string(&result)?);
                                } else {
                                    println!("{}", formatter.open_port(result.port, result.service));
                                }
                            }
                            Some(ScanEvent::Progress { scanned, total }) => {
                                logger.debug(&format!("Scanned {}/{}", scanned, total));
                            }
                            None => break,
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        handle.stop();
                    }
                }
            }

            let summary = handle.join().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", formatter.scan_summary(&summary));
            }
        }

        Command::Http { url, .. } => {
            logger.debug(&format!("Checking {}", url));
            let checker = HttpChecker::new(&config.http)?;
            let result = checker.check(&url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", formatter.http_result(&result, config.http.show_headers));
            }
        }

        Command::Trace { host, .. } => {
            logger.debug(&format!(
                "Tracing route to {}, at most {} hops",
                host, config.trace.max_hops
            ));
            let runner = TracerouteRunner::new(&config.trace)?;
            let (mut rx, degraded) = runner.run(&host).await?;
            if degraded {
                logger.warn("traceroute utility unavailable; reporting resolved destination only");
            }
            while let Some(hop) = rx.recv().await {
                if json {
                    println!("{}", serde_json::to_string(&hop)?);
                } else {
                    println!("{}", formatter.hop(&hop));
                }
            }
        }
    }

    Ok(())
}
