use clap::Parser;
use syskit::config::cli::{Cli, Commands};
use syskit::config::TomlConfig;
use syskit::core::fsops::{self, CleanupOptions, ExcludeSet};
use syskit::core::toolkit::{Toolkit, ToolkitOptions};
use syskit::domain::model::RunOutcome;
use syskit::utils::error::{ErrorSeverity, SysKitError};
use syskit::utils::{logger, validation::Validate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("Starting syskit CLI");

    let config = match TomlConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load settings: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let toolkit = Toolkit::new(ToolkitOptions::from(&config));

    if let Err(e) = run(cli.command, &toolkit).await {
        tracing::error!("❌ Command failed: {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Commands, toolkit: &Toolkit) -> syskit::Result<()> {
    match command {
        Commands::Backup {
            source,
            destination,
            exclude,
            clean,
        } => {
            let entries = if clean {
                toolkit.archive_and_clean(&source, &destination, &exclude)?
            } else {
                toolkit.backup_folder(&source, &destination, &exclude)?
            };
            println!("✅ Backed up {} files to {}", entries, destination.display());
        }

        Commands::Restore {
            archive,
            destination,
        } => {
            let entries = toolkit.restore_backup(&archive, &destination)?;
            println!("✅ Restored {} entries to {}", entries, destination.display());
        }

        Commands::Copy {
            source,
            destination,
            exclude,
        } => {
            let copied = toolkit.copy(&source, &destination, &exclude)?;
            println!("✅ Copied {} files to {}", copied, destination.display());
        }

        Commands::Move {
            source,
            destination,
            exclude,
        } => {
            let moved = toolkit.move_path(&source, &destination, &exclude)?;
            println!("✅ Moved {} files to {}", moved, destination.display());
        }

        Commands::Delete { path } => {
            toolkit.delete(&path)?;
            println!("🗑️  Deleted {}", path.display());
        }

        Commands::Clean {
            path,
            days,
            recursive,
            exclude,
            dry_run,
        } => {
            let options = CleanupOptions {
                recursive,
                exclude: ExcludeSet::new(&exclude),
                dry_run,
            };
            let count = toolkit.delete_old_files(&path, days, &options)?;
            if dry_run {
                println!("🧹 Would delete {} files older than {} days", count, days);
            } else {
                println!("🧹 Deleted {} files older than {} days", count, days);
            }
        }

        Commands::Keep {
            path,
            keep,
            pattern,
        } => {
            let removed = toolkit.keep_recent_files(&path, keep, &pattern)?;
            println!("🧹 Removed {} files, kept the {} newest", removed, keep);
        }

        Commands::Size { path } => {
            let bytes = toolkit.dir_size(&path)?;
            println!("{} ({} bytes)", fsops::human_size(bytes), bytes);
        }

        Commands::List {
            path,
            pattern,
            long,
        } => {
            if long {
                for file in toolkit.inspect(&path, false)? {
                    println!(
                        "{:>10}  {}  {}",
                        file.size,
                        file.modified.format("%Y-%m-%d %H:%M:%S"),
                        file.name
                    );
                }
            } else {
                for file in toolkit.list_files(&path, pattern.as_deref())? {
                    println!("{}", file.display());
                }
            }
        }

        Commands::Info => {
            println!("{}", serde_json::to_string_pretty(&toolkit.info())?);
        }

        Commands::Monitor => {
            println!("{}", serde_json::to_string_pretty(&toolkit.monitor())?);
        }

        Commands::Health => {
            let report = toolkit.health();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Watch { every, count } => {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(every.max(1)));
            let mut samples = 0u64;
            loop {
                ticker.tick().await;
                let metrics = toolkit.monitor();
                println!(
                    "📊 CPU: {:.1}% | Memory: {:.1}% of {} MB | Disk free: {:.1} GB | Processes: {}",
                    metrics.cpu_usage_percent,
                    metrics.memory_used_percent,
                    metrics.memory_total_mb,
                    metrics.disk_free_gb,
                    metrics.process_count
                );
                toolkit.log_system_status().await?;

                samples += 1;
                if let Some(count) = count {
                    if samples >= count {
                        break;
                    }
                }
            }
        }

        Commands::Export { input, output } => {
            toolkit.csv_to_xlsx(&input, &output)?;
            println!("✅ Exported {} to {}", input.display(), output.display());
        }

        Commands::Optimize { path, quality } => {
            let stats = toolkit.optimize_image(&path, quality)?;
            let saved = stats.bytes_before.saturating_sub(stats.bytes_after);
            println!(
                "🖼️  {} -> {} (saved {})",
                fsops::human_size(stats.bytes_before),
                fsops::human_size(stats.bytes_after),
                fsops::human_size(saved)
            );
        }

        Commands::Logs { category, limit } => {
            for line in toolkit.logbook().recent(category.as_deref(), limit)? {
                println!("{}", line);
            }
        }

        Commands::Tick {
            every,
            key,
            max_runs,
            command,
        } => {
            let outcome = toolkit
                .run_every(&every, &key, max_runs, || async {
                    let program = &command[0];
                    let status = tokio::process::Command::new(program)
                        .args(&command[1..])
                        .status()
                        .await?;
                    if !status.success() {
                        return Err(SysKitError::TaskError {
                            message: format!("'{}' exited with {}", program, status),
                        });
                    }
                    Ok(())
                })
                .await?;

            match outcome {
                RunOutcome::Ran { count } => {
                    println!("✅ Task '{}' ran (run #{})", key, count);
                }
                RunOutcome::Skipped { remaining_secs } => {
                    println!("⏳ Task '{}' not due yet ({}s remaining)", key, remaining_secs);
                }
                RunOutcome::MaxRunsReached { max_runs } => {
                    println!("🛑 Task '{}' reached its run limit ({})", key, max_runs);
                }
            }
        }
    }

    Ok(())
}
