use std::{io::Write, path::PathBuf, sync::Arc};

use chrono::Local;
use clap::Parser as ClapParser;
use craftlive::{LiveUpdateEngine, TickScheduler};
use crafttree::prelude::*;
use log::{LevelFilter, error, info};

#[derive(ClapParser)]
pub struct Arguments {
    /// Path to the solver's JSON search result
    input: PathBuf,

    /// Reveal every tree one recipe at a time
    #[arg(long)]
    live: bool,

    /// Configuration file (defaults to $CRAFTTREE_CONFIG, then the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay between two live ticks, overriding the configuration
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print the trees as render JSON instead of text
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn logger_builder(verbose: u8) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level(verbose)).format(|buf, record| {
        writeln!(
            buf,
            "[{} {:<5} {}] {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder
}

/// `RUST_LOG` takes precedence over `-v`.
fn init_logger(verbose: u8) {
    logger_builder(verbose).parse_default_env().init();
}

fn print_tree(key: &PathKey, tree: &TreeNode, json: bool) -> CraftResult<()> {
    if json {
        let rendered = serde_json::json!({ "id": key.to_string(), "tree": render_json(tree) });
        println!("{}", serde_json::to_string(&rendered)?);
    } else {
        println!("{key}");
        tree.pretty_print()?;
        println!();
    }
    Ok(())
}

fn run_static(views: &StaticViews, json: bool) -> CraftResult<()> {
    for (key, view) in views.iter() {
        print_tree(key, &view.tree, json)?;
    }
    Ok(())
}

fn run_live(views: &StaticViews, config: &CraftConfig, json: bool) -> CraftResult<()> {
    let engine = LiveUpdateEngine::from_config(config, Arc::clone(&views.images));
    let mut scheduler = TickScheduler::new(engine);
    let Some(target) = views.target.as_ref() else {
        return Ok(());
    };

    for (key, view) in views.iter() {
        scheduler.start(key.clone(), &view.path, target);
        if let Some(tree) = scheduler.engine().display_tree(key) {
            print_tree(key, tree, json)?;
        }
    }

    while let Some(deadline) = scheduler.next_deadline() {
        std::thread::sleep(deadline.saturating_sub(scheduler.now()));
        for fired in scheduler.advance_to(deadline) {
            if fired.outcome.is_skipped() {
                continue;
            }
            if let Some(tree) = scheduler.engine().display_tree(&fired.key) {
                print_tree(&fired.key, tree, json)?;
            }
        }
    }

    for (key, state) in scheduler.engine().states() {
        info!(
            "{key}: {} after {} tick(s){}",
            state.phase(),
            state.ticks(),
            if state.is_aborted() { " (aborted)" } else { "" }
        );
    }
    Ok(())
}

fn run(args: &Arguments) -> CraftResult<()> {
    let config_path = args.config.clone().unwrap_or_else(CraftConfig::default_path);
    let mut config = CraftConfig::load_or_default(&config_path)?;
    if let Some(delay) = args.delay_ms {
        config.live.tick_delay_ms = delay;
    }

    let file = std::fs::File::open(&args.input)?;
    let mut result = SearchResult::from_reader(std::io::BufReader::new(file))?;
    result.image_urls = result.image_urls.rebased(config.image_base_url.as_deref());

    println!("{}", result.summary());
    if let Some(message) = &result.error {
        error!("Solver reported: {message}");
    }

    let builder = TreeBuilder::from_config(&config.tree, Default::default());
    let views = StaticViews::from_search_result(&result, &builder);
    if views.is_empty() {
        println!("No recipe path found for `{}`", result.search_target);
        return Ok(());
    }

    if args.live {
        run_live(&views, &config, args.json)
    } else {
        run_static(&views, args.json)
    }
}

fn main() {
    let args = Arguments::parse();
    init_logger(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_selects_the_log_filter() {
        for (flags, level) in [
            (&[][..], LevelFilter::Info),
            (&["-v"][..], LevelFilter::Debug),
            (&["-vv"][..], LevelFilter::Trace),
            (&["-v", "-v", "-v"][..], LevelFilter::Trace),
        ] {
            let argv = ["crafttree-viewer", "result.json"].into_iter().chain(flags.iter().copied());
            let args = Arguments::try_parse_from(argv).unwrap();
            assert_eq!(log_level(args.verbose), level);
            assert_eq!(logger_builder(args.verbose).build().filter(), level);
        }
    }
}
