use clap::Parser;
use receipt_scraper::{Credentials, ReceiptScraper};
use std::process::ExitCode;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let credentials =
        match Credentials::resolve(args.email.clone(), args.password.clone(), args.totp.clone()) {
            Ok(credentials) => credentials,
            Err(e) => {
                ::log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        };

    ::log::info!(
        "Saving receipts to {}",
        config.receipts_dir.display()
    );
    let start_time = std::time::Instant::now();

    match ReceiptScraper::new(config).run(&credentials).await {
        Ok(summary) => {
            ::log::info!(
                "Done in {:.2} seconds: {} orders, {} already saved, {} downloaded",
                start_time.elapsed().as_secs_f64(),
                summary.orders_found,
                summary.already_saved,
                summary.downloaded.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            ::log::error!("Scrape failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
