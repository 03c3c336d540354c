use clap::Parser;
use cook_mode_lib::config::{self, CookModeConfig};
use cook_mode_lib::console::ConsoleSpeech;
use cook_mode_lib::{
    format_remaining, CookSession, HostCapabilities, Recipe, ServingsScaler, TimerEvent, TimerId,
    TokioClock,
};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "cook_mode=info,cook_mode_lib=info";

#[derive(Parser, Debug)]
#[command(name = "cook-mode")]
#[command(about = "Step through a recipe hands-free with spoken steps and cooking timers")]
#[command(version)]
struct Cli {
    /// Recipe JSON file
    recipe: PathBuf,

    /// Config file (created with defaults if missing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scale ingredients to this many servings
    #[arg(long)]
    servings: Option<u32>,

    /// Start with narration off
    #[arg(long)]
    mute: bool,
}

enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::CONFIG_FILE));
    let mut config = CookModeConfig::load_or_create(&config_path)?;
    config.apply_env_overrides();
    if cli.mute {
        config.voice_enabled = false;
    }

    let recipe = Recipe::load(&cli.recipe)?;
    let mut scaler = ServingsScaler::for_recipe(&recipe);
    if let Some(servings) = cli.servings {
        scaler.set_target(servings);
    }
    print_ingredients(&recipe, &scaler);

    let runtime = Handle::current();
    let host = HostCapabilities::new(
        Box::new(ConsoleSpeech::new(runtime.clone())),
        Arc::new(TokioClock::new(runtime)),
    );
    let mut session = CookSession::new(recipe.instructions.clone(), host, &config);
    session.set_on_complete(|| println!("  ** All steps done. Type `exit` to leave cook mode."));
    tracing::info!("Loaded {} ({} steps)", recipe.name, session.total_steps());
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if let Flow::Quit = run_command(&mut session, &line) {
                    break;
                }
            }
            fired = session.process_next() => {
                if let Some(event) = fired {
                    print_timer_event(&session, &event);
                }
            }
        }
    }

    session.exit();
    Ok(())
}

fn run_command(session: &mut CookSession, line: &str) -> Flow {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Flow::Continue;
    };
    let args: Vec<&str> = parts.collect();

    match command {
        "start" => {
            session.start();
            print_step(session);
        }
        "next" | "n" => {
            session.next();
            print_step(session);
        }
        "prev" | "p" => {
            session.previous();
            print_step(session);
        }
        "repeat" | "r" => session.repeat(),
        "step" => match args.first().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n >= 1 => {
                session.go_to_step(n - 1);
                print_step(session);
            }
            _ => println!("  usage: step <n>"),
        },
        "timer" => match args.first().and_then(|m| m.parse::<f64>().ok()) {
            Some(minutes) => {
                let label = args[1..].join(" ");
                let label = (!label.is_empty()).then_some(label.as_str());
                match session.create_timer(minutes, label) {
                    Ok(_) => print_timers(session),
                    Err(e) => println!("  !! {}", e),
                }
            }
            None => println!("  usage: timer <minutes> [label]"),
        },
        "suggest" => match session.accept_suggested_timer() {
            Some(_) => print_timers(session),
            None => println!("  No timer suggested for this step"),
        },
        "presets" => {
            let presets: Vec<String> = session
                .quick_timer_presets()
                .iter()
                .map(|minutes| format!("{}m", minutes))
                .collect();
            println!("  Quick timers: {}", presets.join(" "));
        }
        "toggle" => match timer_at(session, &args) {
            Some(id) => {
                if session.toggle_timer(id).is_none() {
                    println!("  Timer already finished");
                }
                print_timers(session);
            }
            None => println!("  usage: toggle <timer #>"),
        },
        "remove" => match timer_at(session, &args) {
            Some(id) => {
                session.remove_timer(id);
                print_timers(session);
            }
            None => println!("  usage: remove <timer #>"),
        },
        "timers" => print_timers(session),
        "voice" => match args.first().copied() {
            Some("on") => session.set_voice_enabled(true),
            Some("off") => {
                session.set_voice_enabled(false);
                session.stop_speaking();
            }
            _ => println!("  usage: voice on|off"),
        },
        "stop" => session.stop_speaking(),
        "status" => match serde_json::to_string_pretty(&session.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => println!("  !! {}", e),
        },
        "exit" => {
            session.exit();
            println!("  Left cook mode. Type `start` to begin again.");
        }
        "quit" | "q" => return Flow::Quit,
        "help" | "?" => print_help(),
        other => println!("  Unknown command `{}`; type `help`", other),
    }

    Flow::Continue
}

/// Timers are addressed by their 1-based position in the list.
fn timer_at(session: &CookSession, args: &[&str]) -> Option<TimerId> {
    let position = args.first()?.parse::<usize>().ok()?;
    session
        .timers()
        .get(position.checked_sub(1)?)
        .map(|timer| timer.id)
}

fn print_ingredients(recipe: &Recipe, scaler: &ServingsScaler) {
    println!("{}", recipe.name);
    if scaler.is_scaled() {
        println!(
            "Ingredients for {} servings (x{:.2}):",
            scaler.target_servings(),
            scaler.scale_factor()
        );
    } else {
        println!("Ingredients for {} servings:", scaler.target_servings());
    }
    for line in scaler.scale_ingredients(&recipe.ingredients) {
        println!("  - {}", line);
    }
    println!();
}

fn print_step(session: &CookSession) {
    if !session.is_active() {
        return;
    }
    let Some(instruction) = session.current_instruction() else {
        return;
    };
    println!(
        "[{}/{}] {}",
        session.current_step_index() + 1,
        session.total_steps(),
        instruction
    );
    if let Some(minutes) = session.suggested_minutes() {
        println!("  (suggested timer: {} min, type `suggest`)", minutes);
    }
}

fn print_timers(session: &CookSession) {
    let timers = session.timers();
    if timers.is_empty() {
        println!("  No timers");
        return;
    }
    for (idx, timer) in timers.iter().enumerate() {
        let status = if timer.is_finished() {
            "done"
        } else if timer.is_running {
            "running"
        } else {
            "paused"
        };
        println!(
            "  {}. {} {} ({})",
            idx + 1,
            timer.label,
            format_remaining(timer.remaining_seconds),
            status
        );
    }
}

fn print_timer_event(session: &CookSession, event: &TimerEvent) {
    let label = session
        .timer(event.timer_id())
        .map(|timer| timer.label.as_str())
        .unwrap_or("timer");
    match event {
        TimerEvent::Completed { .. } => println!("  ** Timer complete: {}", label),
        TimerEvent::Milestone { .. } => println!("  ** {}: {}", label, event.announcement()),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  start | next | prev | repeat | step <n> | exit");
    println!("  timer <minutes> [label] | suggest | presets | toggle <#> | remove <#> | timers");
    println!("  voice on|off | stop | status | help | quit");
}
