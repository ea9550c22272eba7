use std::env;
use std::error::Error;
use std::process::ExitCode;

use halal_scan::{
    HalalScanConfig, LoggingYamlConfig, MANUAL_SEPARATORS, OpenFoodFactsClient, Scanner,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: halal-scan <ingredient, ingredient, ...>
       halal-scan --barcode <code>

History is kept in ./halal-scan-history.redb unless HALAL_SCAN_CONFIG names a
YAML config file.";

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let config = HalalScanConfig::from_env()?;
    init_tracing(&config.logging);

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        return Ok(ExitCode::from(2));
    }

    let scanner = Scanner::from_config(&config)?;
    let outcome = match args.as_slice() {
        [flag, barcode] if flag == "--barcode" => {
            let client = OpenFoodFactsClient::new(&config.lookup)?;
            scanner.scan_barcode(&client, barcode).await?
        }
        words => scanner.scan_text("", &words.join(" "), MANUAL_SEPARATORS)?,
    };

    println!("{}", outcome.status);
    if let Some(record) = &outcome.record {
        println!("recorded as #{} ({})", record.id, record.product_name);
    }
    println!("history size: {}", scanner.history().count()?);

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(cfg: &LoggingYamlConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cfg.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
