use clap::Args;

use roundbell_core::acceleration;
use roundbell_core::error::Result;
use roundbell_core::{format_clock, Config, SettingsPatch};

#[derive(Args)]
pub struct AccelerationsArgs {
    /// Work time in seconds
    #[arg(long)]
    work: Option<u32>,
    /// Minimum acceleration duration in seconds
    #[arg(long)]
    min: Option<u32>,
    /// Maximum acceleration duration in seconds
    #[arg(long)]
    max: Option<u32>,
    /// Target accelerations per minute of work
    #[arg(long)]
    per_minute: Option<u32>,
    /// RNG seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Print the set as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: AccelerationsArgs) -> Result<()> {
    let config = Config::load_or_default();
    let mut settings = config.settings();
    settings.apply(&SettingsPatch {
        work_secs: args.work,
        min_acceleration_secs: args.min,
        max_acceleration_secs: args.max,
        accelerations_per_minute: args.per_minute,
        ..SettingsPatch::default()
    });

    let intervals = acceleration::generate_with_seed(
        settings.work_secs(),
        settings.min_acceleration_secs(),
        settings.max_acceleration_secs(),
        settings.accelerations_per_minute(),
        args.seed,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&intervals)?);
        return Ok(());
    }

    println!(
        "work {}  accelerations {} (target {})",
        format_clock(settings.work_secs()),
        intervals.len(),
        settings.accelerations_per_minute() * settings.work_secs() / 60,
    );
    for i in &intervals {
        println!(
            "  {} - {}  ({}s)",
            format_clock(i.start_secs),
            format_clock(i.end_secs),
            i.duration_secs
        );
    }
    Ok(())
}
