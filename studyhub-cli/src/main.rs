use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use studyhub_core::{
    daily_analytics, resolve_level_capped, time::local_date, weekly_analytics, Catalog,
    DailyAnalytics, ProgressEngine, WeeklyAnalytics,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;
mod snapshot;
mod state;

use snapshot::SnapshotFile;

#[derive(Parser, Debug)]
#[command(name = "studyhub", version, about = "StudyHub progress engine CLI")]
struct Cli {
    /// Config file (default: ~/.studyhub/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate as of this instant (RFC 3339) instead of now
    #[arg(long, global = true)]
    at: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.studyhub/config.toml
    Init,

    /// Recompute progress and achievements for a snapshot file
    Progress {
        /// Snapshot JSON (default: ~/.studyhub/snapshot.json)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Print the full update as JSON
        #[arg(long)]
        json: bool,

        /// Store the derived state back into the snapshot file
        #[arg(long)]
        write: bool,
    },

    /// Resolve lifetime XP into a level
    Level { xp: u64 },

    /// List the achievement catalog in effect
    Catalog,

    /// Weekly rollup for the week containing --at (or today)
    Week {
        #[arg(long)]
        snapshot: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Daily rollup
    Day {
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// YYYY-MM-DD (default: today in the configured timezone)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let load = || match &cli.config {
        Some(p) => config::load_config_from(p),
        None => config::load_config(),
    };
    let now = resolve_now(cli.at.as_deref())?;
    debug!(%now, "evaluation instant");

    match cli.command {
        Command::Init => config::init_config()?,

        Command::Progress {
            snapshot,
            json,
            write,
        } => {
            let cfg = load()?;
            let engine = ProgressEngine::new(cfg.engine_config()?, cfg.catalog()?);
            let path = snapshot_path(snapshot)?;
            let mut file = SnapshotFile::load(&path)?;

            let update = engine.recompute(file.records(), &file.prior(), now);

            if json {
                println!("{}", serde_json::to_string_pretty(&update)?);
            } else {
                print_progress(&update);
            }

            if write {
                file.apply(&update);
                file.save(&path)?;
                info!(path = %path.display(), "snapshot updated");
            }
        }

        Command::Level { xp } => {
            let engine = load()?.engine_config()?;
            let info = resolve_level_capped(xp, engine.max_level);
            println!(
                "Level {} ({} / {} XP, {:.1}%)",
                info.level,
                info.current_xp,
                info.next_level_xp,
                info.progress_percent()
            );
            if info.is_max_level() {
                println!("Max level reached (cap {})", engine.max_level);
            } else {
                println!("{} XP to level {}", info.xp_to_next(), info.level + 1);
            }
        }

        Command::Catalog => {
            print_catalog(&load()?.catalog()?);
        }

        Command::Week { snapshot, json } => {
            let engine = load()?.engine_config()?;
            let file = SnapshotFile::load(&snapshot_path(snapshot)?)?;
            let today = local_date(now, engine.timezone);
            let week = weekly_analytics(today, &file.tasks, &file.sessions, &file.goals, engine.timezone);
            if json {
                println!("{}", serde_json::to_string_pretty(&week)?);
            } else {
                print_week(&week);
            }
        }

        Command::Day {
            snapshot,
            date,
            json,
        } => {
            let engine = load()?.engine_config()?;
            let file = SnapshotFile::load(&snapshot_path(snapshot)?)?;
            let date = date.unwrap_or_else(|| local_date(now, engine.timezone));
            let day = daily_analytics(date, &file.tasks, &file.sessions, &file.goals, engine.timezone);
            if json {
                println!("{}", serde_json::to_string_pretty(&day)?);
            } else {
                print_day(&day);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_now(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("--at expects RFC 3339, got {s:?}"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn snapshot_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    let p = match arg {
        Some(p) => p,
        None => state::default_snapshot_path()?,
    };
    if !p.exists() {
        bail!("Snapshot not found: {} (pass --snapshot <path>)", p.display());
    }
    Ok(p)
}

fn print_progress(update: &studyhub_core::ProgressUpdate) {
    let p = &update.progress;
    println!("# Progress\n");
    println!(
        "Level {}  ({} / {} XP)  total {} XP",
        p.level, p.current_xp, p.next_level_xp, p.total_xp
    );
    println!("Streak: {} days (longest {})", p.streak_days, p.longest_streak);
    println!("Productivity: {}/100", p.productivity_score);
    println!("Study time: {:.1} h", p.total_study_hours);
    println!(
        "Completed: {} tasks, {} goals",
        p.total_tasks_completed, p.total_goals_completed
    );
    if let Some(at) = p.last_active_date {
        println!("Last active: {}", at.to_rfc3339());
    }

    let unlocked = update.achievements.iter().filter(|a| a.is_unlocked).count();
    println!("\n## Achievements ({}/{})\n", unlocked, update.achievements.len());
    for a in &update.achievements {
        let mark = if a.is_unlocked { "x" } else { " " };
        println!(
            "- [{}] {} {} | {:.0}/{:.0} ({:.0}%)",
            mark,
            a.icon,
            a.title,
            a.progress.min(a.requirement),
            a.requirement,
            a.percent()
        );
    }

    if !update.newly_unlocked.is_empty() {
        println!("\n## Unlocked just now\n");
        for a in &update.newly_unlocked {
            println!("- {} {} [{}] +{} XP", a.icon, a.title, a.rarity.display_name(), a.xp_value);
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("{} achievements\n", catalog.len());
    for def in catalog.entries() {
        println!(
            "- {} {} ({}) [{:?}/{}] requirement={} xp={}",
            def.icon,
            def.title,
            def.id,
            def.category,
            def.rarity.display_name(),
            def.requirement,
            def.xp_value
        );
    }
}

fn print_day(day: &DailyAnalytics) {
    println!("# {}\n", day.date);
    println!("Study: {} min over {} sessions", day.study_minutes, day.session_count);
    println!("Tasks completed: {}", day.tasks_completed);
    println!("Goals completed: {}", day.goals_completed);
    println!("Focus: {:.1}", day.focus_score);
    println!("XP: {}", day.xp_earned);
    for (cat, minutes) in day.categories.iter().filter(|(_, m)| **m > 0) {
        println!("  {:<10} {} min", cat.label(), minutes);
    }
}

fn print_week(week: &WeeklyAnalytics) {
    println!("# Week of {}\n", week.week_start);
    println!("Study: {} min", week.total_study_minutes);
    println!(
        "Completed: {} tasks, {} goals",
        week.total_tasks_completed, week.total_goals_completed
    );
    println!("Average focus: {:.1}", week.average_focus_score);
    println!("XP: {}", week.total_xp_earned);
    println!("Consistency: {}%", week.consistency_score);
    match week.most_productive_day {
        Some(d) => println!("Most productive day: {d}"),
        None => println!("Most productive day: -"),
    }
    println!();
    for d in &week.days {
        println!(
            "  {} {:>4} min  {} tasks  focus {:.1}",
            d.date.format("%a %m-%d"),
            d.study_minutes,
            d.tasks_completed,
            d.focus_score
        );
    }
}
