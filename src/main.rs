use MolCalc::Electrochemistry::flow_battery::{ElectrochemCalculator, PhysicalConstants};
use MolCalc::cli::cli_main::run_with_args;
use MolCalc::settings::{CalcConfig, SettingsManager, config, init_config};
use log::{LevelFilter, warn};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

fn main() {
    let (loaded, config_error) = match SettingsManager::new() {
        Ok(manager) => (manager.into_config(), None),
        Err(e) => (CalcConfig::default(), Some(e)),
    };
    let level = loaded.level_filter().unwrap_or(LevelFilter::Info);
    init_config(loaded);

    let log_config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    if let Err(e) = TermLogger::init(level, log_config, TerminalMode::Stderr, ColorChoice::Auto) {
        eprintln!("failed to initialize logger: {}", e);
    }
    if let Some(e) = config_error {
        warn!("{}; using default settings", e);
    }

    let calculator = ElectrochemCalculator::with_constants(PhysicalConstants::from(config()));
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run_with_args(&calculator, &args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
