mod app;
mod command;
mod config;
mod consts;
mod game;
mod logo;
mod options;
mod play;
mod scores;
mod startup;
mod tracker;
mod util;
mod warning;
use crate::app::App;
use crate::config::Config;
use crate::scores::ScoreStore;
use anyhow::Context;
use lexopt::{Arg, Parser};
use crossterm::event::{DisableFocusChange, EnableFocusChange};
use crossterm::ExecutableCommand;
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use std::process::ExitCode;

static USAGE: &str = "\
Usage: nodsnake [--config <file>] [--feed <file>] [<command>]

Steer the snake with your head: point the tracker feed at a stream of
face-landmark frames (one JSON object per line; `-` reads stdin) and nod
your way around the board.  Without a feed the arrow keys steer.

Commands:
  play             Run the game (default)
  export [<file>]  Write score data as JSON to a file or stdout
  import <file>    Replace score data with a previously exported file
  clear            Remove all stored score data

Options:
  --config <file>  Read configuration from <file>
  --feed <file>    Read tracker frames from <file> instead of the
                   configured feed
  -h, --help       Show this message
";

struct Args {
    config: Option<PathBuf>,
    feed: Option<PathBuf>,
    command: Subcommand,
}

enum Subcommand {
    Play,
    Help,
    Export(Option<PathBuf>),
    Import(PathBuf),
    Clear,
}

impl Args {
    fn parse() -> anyhow::Result<Args> {
        let mut config = None;
        let mut feed = None;
        let mut positional = Vec::new();
        let mut help = false;
        let mut parser = Parser::from_env();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Long("config") => config = Some(PathBuf::from(parser.value()?)),
                Arg::Long("feed") => feed = Some(PathBuf::from(parser.value()?)),
                Arg::Short('h') | Arg::Long("help") => help = true,
                Arg::Value(val) => positional.push(val),
                other => return Err(other.unexpected().into()),
            }
        }
        let command = if help {
            Subcommand::Help
        } else {
            let mut positional = positional.into_iter();
            match positional.next() {
                None => Subcommand::Play,
                Some(word) => match word.to_str() {
                    Some("play") => Subcommand::Play,
                    Some("export") => Subcommand::Export(positional.next().map(PathBuf::from)),
                    Some("import") => Subcommand::Import(PathBuf::from(
                        positional
                            .next()
                            .context("import needs the file to read")?,
                    )),
                    Some("clear") => Subcommand::Clear,
                    _ => anyhow::bail!("unrecognized command {:?}", word.to_string_lossy()),
                },
            }
        };
        Ok(Args {
            config,
            feed,
            command,
        })
    }
}

fn main() -> ExitCode {
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("nodsnake: {e}");
            eprint!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    let result = match &args.command {
        Subcommand::Help => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Subcommand::Play => return play(&args),
        Subcommand::Export(dest) => export(&args, dest.as_deref()),
        Subcommand::Import(path) => import(&args, path),
        Subcommand::Clear => clear(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("nodsnake: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn play(args: &Args) -> ExitCode {
    let mut config = match load_config(args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("nodsnake: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(feed) = &args.feed {
        config.tracker.feed = Some(feed.clone());
    }
    let app = App::new(config);
    let terminal = ratatui::init();
    let _ = io::stdout().execute(EnableFocusChange);
    let r = app.run(terminal);
    let _ = io::stdout().execute(DisableFocusChange);
    ratatui::restore();
    io_exit(r)
}

fn io_exit(r: io::Result<()>) -> ExitCode {
    match r {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.kind() == ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(2)
        }
    }
}

fn open_store(args: &Args) -> anyhow::Result<ScoreStore<Box<dyn scores::ScoreBackend>>> {
    let config = load_config(args)?;
    Ok(ScoreStore::open(config.files.scores_file))
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    match &args.config {
        Some(path) => Config::load(path, false)
            .with_context(|| format!("cannot use configuration at {}", path.display())),
        None => {
            let path = Config::default_path()?;
            Ok(Config::load(&path, true)?)
        }
    }
}

fn export(args: &Args, dest: Option<&std::path::Path>) -> anyhow::Result<()> {
    let store = open_store(args)?;
    let mut body =
        serde_json::to_string_pretty(&store.export()).context("failed to serialize score data")?;
    body.push('\n');
    match dest {
        Some(path) => fs_err::write(path, body)?,
        None => print!("{body}"),
    }
    Ok(())
}

fn import(args: &Args, path: &std::path::Path) -> anyhow::Result<()> {
    let mut store = open_store(args)?;
    let raw = fs_err::read_to_string(path)?;
    let json: serde_json::Value =
        serde_json::from_str(&raw).context("import file is not valid JSON")?;
    store.import(&json).context("import file was rejected")?;
    Ok(())
}

fn clear(args: &Args) -> anyhow::Result<()> {
    let mut store = open_store(args)?;
    store.clear()?;
    Ok(())
}
