use std::io::Write;

use clap::Args;
use tokio::time::{interval, Duration};

use roundbell_core::error::Result;
use roundbell_core::{
    format_clock, Config, Cue, CueSink, Event, KeepAwake, SettingsPatch, WorkoutTimer,
};

#[derive(Args)]
pub struct RunArgs {
    /// Preparation time in seconds
    #[arg(long)]
    preparation: Option<u32>,
    /// Work time in seconds
    #[arg(long)]
    work: Option<u32>,
    /// Rest time in seconds
    #[arg(long)]
    rest: Option<u32>,
    /// Number of rounds
    #[arg(long)]
    rounds: Option<u32>,
    /// Enable randomized accelerations
    #[arg(long)]
    accelerations: bool,
    /// Minimum acceleration duration in seconds
    #[arg(long)]
    min_acceleration: Option<u32>,
    /// Maximum acceleration duration in seconds
    #[arg(long)]
    max_acceleration: Option<u32>,
    /// Target accelerations per minute of work
    #[arg(long)]
    per_minute: Option<u32>,
    /// RNG seed for reproducible acceleration placement
    #[arg(long)]
    seed: Option<u64>,
    /// Emit events as JSON lines instead of the live display
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn patch(&self) -> SettingsPatch {
        SettingsPatch {
            preparation_secs: self.preparation,
            work_secs: self.work,
            rest_secs: self.rest,
            rounds: self.rounds,
            accelerations_enabled: self.accelerations.then_some(true),
            min_acceleration_secs: self.min_acceleration,
            max_acceleration_secs: self.max_acceleration,
            accelerations_per_minute: self.per_minute,
        }
    }
}

/// Rings the terminal bell for every cue. Best-effort: a failed write is
/// logged and dropped, the timer does not care.
struct TerminalBell;

impl CueSink for TerminalBell {
    fn play(&mut self, cue: Cue) {
        let mut out = std::io::stdout();
        if let Err(e) = out.write_all(b"\x07").and_then(|()| out.flush()) {
            tracing::warn!(?cue, error = %e, "failed to play cue");
        }
    }
}

/// Keep-awake collaborator for the terminal session. There is no wake lock
/// to hold in a plain terminal, so this only records the transitions.
#[derive(Default)]
struct SessionKeepAwake {
    active: bool,
}

impl KeepAwake for SessionKeepAwake {
    fn enable(&mut self) {
        if !self.active {
            self.active = true;
            tracing::debug!("keep-awake enabled");
        }
    }

    fn disable(&mut self) {
        if self.active {
            self.active = false;
            tracing::debug!("keep-awake disabled");
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let config = Config::load_or_default();
    let mut settings = config.settings();
    settings.apply(&args.patch());

    let timer = match args.seed {
        Some(seed) => WorkoutTimer::with_seed(settings, seed),
        None => WorkoutTimer::new(settings),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(timer, args.json))
}

async fn drive(mut timer: WorkoutTimer, json: bool) -> Result<()> {
    let mut bell = TerminalBell;
    let mut wake = SessionKeepAwake::default();

    let events = timer.start();
    wake.enable();
    emit(&events, &mut bell, json)?;
    if json {
        println!("{}", serde_json::to_string(&timer.snapshot())?);
    }
    render(&timer, json)?;

    let mut ticks = interval(Duration::from_secs(1));
    // An interval's first tick completes immediately; consume it so the
    // first workout second is a full one.
    ticks.tick().await;

    loop {
        tokio::select! {
            _ = ticks.tick() => {
                let events = timer.tick();
                emit(&events, &mut bell, json)?;
                render(&timer, json)?;
                if timer.workout_completed() {
                    wake.disable();
                    if json {
                        println!("{}", serde_json::to_string(&timer.snapshot())?);
                    } else {
                        println!();
                        println!("workout complete");
                    }
                    return Ok(());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                // Returning drops the interval, so no stale tick can fire
                // after the user-visible pause.
                let events = timer.pause();
                emit(&events, &mut bell, json)?;
                wake.disable();
                if json {
                    println!("{}", serde_json::to_string(&timer.snapshot())?);
                } else {
                    println!();
                    println!("paused at {} ({} remaining)",
                        timer.phase().label(),
                        format_clock(timer.remaining_secs()));
                }
                return Ok(());
            }
        }
    }
}

fn emit(events: &[Event], bell: &mut TerminalBell, json: bool) -> Result<()> {
    for event in events {
        if json {
            println!("{}", serde_json::to_string(event)?);
        } else if let Some(cue) = Cue::for_event(event) {
            bell.play(cue);
        }
    }
    Ok(())
}

fn render(timer: &WorkoutTimer, json: bool) -> Result<()> {
    if json {
        return Ok(());
    }
    let accelerate = if timer.current_acceleration().is_some() {
        "  ACCELERATE!"
    } else {
        ""
    };
    let mut out = std::io::stdout();
    write!(
        out,
        "\r\x1b[2K{} {}  round {}/{}{}",
        timer.phase().label(),
        format_clock(timer.remaining_secs()),
        timer.current_round(),
        timer.settings().rounds(),
        accelerate
    )?;
    out.flush()?;
    Ok(())
}
