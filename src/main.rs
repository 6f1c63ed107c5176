//! weekfit - AI-generated weekly workout plan in the terminal

use std::fs::File;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use weekfit::config::Config;
use weekfit::links::{tiktok_search_url, youtube_embed_url, Platform};
use weekfit::plan::DayPlan;
use weekfit::tui::App;
use weekfit::{Database, Session};

#[derive(Parser)]
#[command(name = "weekfit")]
#[command(
    author,
    version,
    about = "Weekly hypertrophy plan with completion tracking and a workout timer"
)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI (default)
    Tui,

    /// Print the plan, generating one if nothing is cached
    Show {
        /// Only this day (1-based)
        day: Option<usize>,
    },

    /// Throw the current plan away and generate a new one
    Regenerate,

    /// Mark an exercise as done
    Done {
        /// Day number (1-based)
        day: usize,

        /// Exercise number within the day (1-based)
        exercise: usize,

        /// Mark as not done instead
        #[arg(long)]
        undo: bool,
    },

    /// Replace an exercise with an AI-suggested alternative
    Swap {
        day: usize,
        exercise: usize,
    },

    /// Print video search links for an exercise
    Link {
        day: usize,
        exercise: usize,

        #[arg(short, long, value_enum, default_value_t)]
        platform: Platform,
    },
}

fn init_logging(config: &Config, tui: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(tracing::Level::INFO);
    if tui {
        // the terminal belongs to the TUI
        let file = File::create(&config.log_file)
            .with_context(|| format!("cannot open log file {}", config.log_file))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}

/// 1-based CLI number to an index
fn index(n: usize, what: &str) -> Result<usize> {
    match n.checked_sub(1) {
        Some(i) => Ok(i),
        None => bail!("{} numbers start at 1", what),
    }
}

fn print_day(session: &Session, number: usize, day: &DayPlan) {
    let (done, total) = session.day_progress(number - 1);
    println!("{}. {} | {} ({}/{})", number, day.day_name, day.focus, done, total);
    if !day.description.is_empty() {
        println!("   {}", day.description);
    }
    println!("{:-<60}", "");
    for (i, e) in day.exercises.iter().enumerate() {
        let mark = if session.is_completed(e.id) { "x" } else { " " };
        println!(
            "[{}] {:>2}. {:30} | {} x {} | rest {}",
            mark,
            i + 1,
            e.name,
            e.sets,
            e.reps,
            e.rest_time
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let tui = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(&cli.config, tui)?;

    let db = Database::open(&cli.config.db)?;
    let mut session = Session::new(db, cli.config.generator());

    match cli.command {
        None | Some(Commands::Tui) => {
            let mut app = App::new(session);
            app.run()?;
        }

        Some(Commands::Show { day }) => {
            let plan = session.load_plan().await?.clone();
            match day {
                Some(n) => {
                    let i = index(n, "day")?;
                    let day = plan.day(i).with_context(|| format!("plan has no day {}", n))?;
                    print_day(&session, n, day);
                }
                None => {
                    for (i, day) in plan.days.iter().enumerate() {
                        print_day(&session, i + 1, day);
                    }
                }
            }
        }

        Some(Commands::Regenerate) => {
            let plan = session.regenerate_plan().await?;
            println!("New plan with {} days:", plan.days.len());
            for (i, day) in plan.days.iter().enumerate() {
                println!(
                    "{}. {} | {} ({} exercises)",
                    i + 1,
                    day.day_name,
                    day.focus,
                    day.exercises.len()
                );
            }
        }

        Some(Commands::Done { day, exercise, undo }) => {
            session.load_plan().await?;
            let (d, e) = (index(day, "day")?, index(exercise, "exercise")?);
            session
                .set_completed(d, e, !undo)
                .with_context(|| format!("no exercise {} on day {}", exercise, day))?;
            let (done, total) = session.day_progress(d);
            println!("{} ({}/{} done)", if undo { "Unmarked" } else { "Done" }, done, total);
            if total > 0 && done == total {
                println!("Day complete!");
            }
        }

        Some(Commands::Swap { day, exercise }) => {
            session.load_plan().await?;
            let (d, e) = (index(day, "day")?, index(exercise, "exercise")?);
            let old = session
                .plan()
                .and_then(|p| p.exercise(d, e))
                .map(|x| x.name.clone())
                .unwrap_or_default();
            let new = session.swap_exercise(d, e).await?;
            println!(
                "{} -> {} ({} x {}, rest {})",
                old, new.name, new.sets, new.reps, new.rest_time
            );
        }

        Some(Commands::Link { day, exercise, platform }) => {
            let plan = session.load_plan().await?;
            let e = plan
                .exercise(index(day, "day")?, index(exercise, "exercise")?)
                .with_context(|| format!("no exercise {} on day {}", exercise, day))?;
            println!("{}", tiktok_search_url(&e.search_term, platform));
            println!("{}", youtube_embed_url(&e.search_term));
        }
    }

    Ok(())
}
