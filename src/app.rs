//! Main application orchestration and execution

use crate::{
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    contention::ContentionFiles,
    device::{AdbDevice, DeviceTransfer},
    error::{AppError, Result},
    executor::{BenchmarkDriver, TimingInstaller},
    logging::{Logger, LoggerFactory},
    models::Config,
    output::{OutputCoordinator, OutputFormatterFactory, RunSummary},
    stats::{self, RunLayout},
    types::{ClockType, ContentionLevel},
};
use std::sync::Arc;

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance; rejects inconsistent arguments
    pub fn new(cli: Cli) -> Result<Self> {
        cli.validate().map_err(AppError::config)?;
        Ok(Self { cli })
    }

    /// Run the application and return one summary per processed level
    pub async fn run(self) -> Result<Vec<RunSummary>> {
        if self.cli.help_topic.is_some() {
            println!("{}", self.cli.display_help());
            return Ok(Vec::new());
        }

        if let Some(path) = &self.cli.init_env {
            EnvManager::save_example_env_file(path)?;
            println!("Wrote example configuration to {}", path.display());
            return Ok(Vec::new());
        }

        let config = load_config(self.cli.clone())?;
        let clock: ClockType = self
            .cli
            .clock_type
            .as_deref()
            .ok_or_else(|| AppError::config("Must specify a CLOCK_TYPE (TIME, RTC or KVM)"))?
            .parse()?;

        if config.debug {
            println!("{} v{}", crate::PKG_NAME, crate::VERSION);
            println!("{}\n", display_config_summary(&config));
        }

        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("APP").await;
        logger.add_context_field("clock".to_string(), clock.as_str()).await;
        let error_logger = factory.create_error_logger();

        let result = self.run_levels(&config, clock, &factory, &logger).await;
        if let Err(e) = &result {
            error_logger.log_error(e, Some(clock.as_str())).await;
        }
        result
    }

    async fn run_levels(
        &self,
        config: &Config,
        clock: ClockType,
        factory: &LoggerFactory,
        logger: &Logger,
    ) -> Result<Vec<RunSummary>> {
        let coordinator =
            OutputCoordinator::new(OutputFormatterFactory::create_formatter(config.enable_color, config.verbose));
        let mut perf = factory.create_performance_logger();

        let driver = if self.cli.parse_only {
            None
        } else {
            let device: Arc<dyn DeviceTransfer> = Arc::new(AdbDevice::from_config(config));
            self.prepare_device(config, clock, Arc::clone(&device), logger).await?;
            Some(BenchmarkDriver::new(config.clone(), device).with_logger(factory.create_benchmark_logger().await))
        };

        let mut runs = Vec::with_capacity(config.contention_levels.len());
        for &level in &config.contention_levels {
            crate::log_info!(logger, "Running with contention level: {}", level);

            let operation = format!("{}/{}", clock, level);
            let correlation_id = logger.start_operation(&operation).await;

            let report = match &driver {
                Some(driver) => {
                    perf.start_timing(&operation).await;
                    let report = driver.run_level(clock, level).await;
                    perf.end_timing(&operation).await;
                    match report {
                        Ok(report) => {
                            if !report.is_clean() {
                                crate::log_warn!(
                                    logger,
                                    "{} of {} logs missing for {}",
                                    report.failed_pulls,
                                    report.iterations,
                                    operation
                                );
                            }
                            Some(report)
                        }
                        Err(e) => {
                            logger.end_operation(&correlation_id, &operation, false).await;
                            return Err(e);
                        }
                    }
                }
                None => None,
            };

            let parsed = self.parse_level(config, clock, level, logger).await;
            logger.end_operation(&correlation_id, &operation, parsed.is_ok()).await;

            let run = RunSummary { report, ..parsed? };
            println!("{}", coordinator.display_run(&run)?);
            runs.push(run);
        }

        println!("{}", coordinator.display_results(&runs)?);
        Ok(runs)
    }

    /// Install the timing program and make sure contention payloads exist
    async fn prepare_device(
        &self,
        config: &Config,
        clock: ClockType,
        device: Arc<dyn DeviceTransfer>,
        logger: &Logger,
    ) -> Result<()> {
        if self.cli.skip_install {
            crate::log_debug!(logger, "Skipping timing program install");
        } else {
            logger
                .info(&format!("Compiling and pushing timing program for {}", clock))
                .log()
                .await;
            TimingInstaller::new(config, device).install(clock).await?;
        }

        if config.contention_levels.iter().any(|l| l.counts().total() > 0) {
            let generated = ContentionFiles::in_dir(&config.contention_dir).prepare()?;
            for path in generated {
                logger
                    .info(&format!("Generated contention payload {}", path.display()))
                    .log()
                    .await;
            }
        }
        Ok(())
    }

    async fn parse_level(
        &self,
        config: &Config,
        clock: ClockType,
        level: ContentionLevel,
        logger: &Logger,
    ) -> Result<RunSummary> {
        let layout = RunLayout::new(config.run_dir(clock, level)?);
        let method = clock.parse_method();
        let parse = stats::parse_run(method, &layout)?;

        if parse.negative_diffs > 0 {
            crate::log_debug!(
                logger,
                "{} negative differences in {}",
                parse.negative_diffs,
                layout.root().display()
            );
        }

        Ok(RunSummary {
            clock,
            level,
            report: None,
            parse,
        })
    }
}
