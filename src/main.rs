use angora_fuzzbench::config::Command;
use angora_fuzzbench::domain::model::PlannedBuild;
use angora_fuzzbench::utils::{logger, validation::Validate};
use angora_fuzzbench::{
    create_engine, AdapterContext, AdapterError, BuildEnv, CliConfig, FuzzerEngine,
    ProcessExecutor,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(&cli).await {
        tracing::error!("❌ {} failed: {}", command_name(&cli.command), e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: &CliConfig) -> Result<(), AdapterError> {
    let config = cli.load_adapter_config()?;
    config.validate()?;

    let ctx = AdapterContext::new(config, BuildEnv::from_process(), ProcessExecutor::new());
    let engine: Box<dyn FuzzerEngine> = create_engine(cli.engine(), ctx);
    tracing::info!("🚀 Using {} engine", engine.name());

    match &cli.command {
        Command::Build { .. } => {
            if cli.dry_run {
                display_build_plan(&engine.plan_build()?);
                return Ok(());
            }
            engine.build().await?;
            tracing::info!("✅ All {} variants built", engine.variants().len());
        }
        Command::Fuzz {
            input_corpus,
            output_corpus,
            target_binary,
            ..
        } => {
            if cli.dry_run {
                let invocation = engine.plan_fuzz(input_corpus, output_corpus, target_binary)?;
                println!("🔍 Would run: {}", invocation);
                return Ok(());
            }
            engine.fuzz(input_corpus, output_corpus, target_binary).await?;
        }
        Command::Stats {
            output_corpus,
            fuzzer_log,
            ..
        } => {
            let stats = engine.get_stats(output_corpus, fuzzer_log.as_deref())?;
            println!("{}", stats);
        }
    }

    Ok(())
}

fn display_build_plan(plan: &[PlannedBuild]) {
    println!("📋 Build plan ({} variants):", plan.len());
    for step in plan {
        println!();
        println!("  {} -> {}", step.variant, step.artifact.display());
        for (key, value) in &step.overrides {
            println!("    {}={}", key, value);
        }
        println!("    $ {}", step.invocation);
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Build { .. } => "Build",
        Command::Fuzz { .. } => "Fuzzing",
        Command::Stats { .. } => "Stats",
    }
}
