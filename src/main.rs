use clap::Parser;
use profile_fetch::config::{LogFormat, SummaryFormat};
use profile_fetch::core::shutdown;
use profile_fetch::core::summary::load_summary;
use profile_fetch::utils::error::{ErrorSeverity, FetchError};
use profile_fetch::utils::{logger, validation::Validate};
use profile_fetch::{
    CliConfig, HttpTransport, LocalStorage, ProfileFetcher, RunReport, StringsOutcome,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 缺少 host 時 clap 直接以用法錯誤結束
    let config = CliConfig::parse();

    // 初始化日誌
    match config.log_format {
        LogFormat::Compact => logger::init_cli_logger(config.verbose),
        LogFormat::Json => logger::init_json_logger(config.verbose),
    }

    tracing::info!("Starting profile-fetch");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 合併並驗證配置
    let settings = match config.resolve().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => fail(e),
    };

    let (trigger, shutdown) = shutdown::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🛑 Interrupt received, stopping");
            trigger.trigger();
        }
    });

    let storage = LocalStorage::from_config(&settings);
    let transport = match HttpTransport::new(settings.request_timeout) {
        Ok(transport) => transport,
        Err(e) => fail(e),
    };

    let fetcher = ProfileFetcher::new(storage.clone(), transport, &settings).with_shutdown(shutdown);

    // 先輸出 profile 位元組數，再請求 strings
    let profile = match fetcher.fetch_profile().await {
        Ok(profile) => profile,
        Err(e) => fail(e),
    };
    println!("{}", profile.bytes);

    let strings = fetcher.fetch_strings().await;
    if let StringsOutcome::Fetched(fetched) = &strings {
        println!("{}", fetched.response);
    }

    let report = RunReport {
        endpoint: fetcher.endpoint().clone(),
        profile,
        strings,
    };

    if config.summary {
        if report.strings.is_fetched() {
            match load_summary(&storage, config.top).await {
                Ok(summary) => match config.summary_format {
                    SummaryFormat::Text => print!("{}", summary),
                    SummaryFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                },
                Err(e) => tracing::warn!("⚠️ Could not summarize profile: {}", e),
            }
        } else {
            // 舊的 strings 檔不能配新的 profile
            tracing::warn!("⚠️ Skipping summary: strings were not fetched in this run");
        }
    }

    if config.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

fn fail(e: FetchError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
