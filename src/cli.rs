use crate::cache::cache_traits::CacheStats;
use crate::cache::lru::LRUCache;
use crate::common::config::CacheConfig;
use crate::common::exception::CacheError;
use crate::common::logger::initialize_logger_with_cache_level;
use clap::Parser;
use colored::*;
use log::{LevelFilter, info};
use rustyline::DefaultEditor;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

const HISTORY_FILE: &str = ".lrukit_history";

const DEMO_SCRIPT: &[&str] = &[
    "put a 1", "put b 2", "put c 3", "show", "get a", "show", "put d 4", "show", "get b",
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Maximum number of entries (overrides the config file)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// TOML file with `capacity` and `enable_stats`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay commands from a file instead of starting the shell
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Walk through a small eviction example (always capacity 3)
    #[arg(long, conflicts_with_all = ["capacity", "config"])]
    demo: bool,

    /// Show per-entry cache activity such as evictions
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCommand {
    Put { key: String, value: String },
    Get(String),
    Peek(String),
    Contains(String),
    Remove(String),
    Size,
    Clear,
    Lru,
    Show,
    Stats,
    Help,
    Exit,
}

impl FromStr for CacheCommand {
    type Err = CacheError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let verb = parts
            .next()
            .ok_or_else(|| CacheError::Command("empty command".to_string()))?
            .to_lowercase();
        let args: Vec<&str> = parts.collect();

        let key = |name: &str| -> Result<String, CacheError> {
            match args.as_slice() {
                [key] => Ok(key.to_string()),
                _ => Err(CacheError::Command(format!("usage: {} <key>", name))),
            }
        };
        let bare = |command: CacheCommand| -> Result<CacheCommand, CacheError> {
            if args.is_empty() {
                Ok(command)
            } else {
                Err(CacheError::Command(format!("'{}' takes no arguments", verb)))
            }
        };

        match verb.as_str() {
            "put" => match args.as_slice() {
                [key, rest @ ..] if !rest.is_empty() => Ok(CacheCommand::Put {
                    key: key.to_string(),
                    value: rest.join(" "),
                }),
                _ => Err(CacheError::Command("usage: put <key> <value>".to_string())),
            },
            "get" => key("get").map(CacheCommand::Get),
            "peek" => key("peek").map(CacheCommand::Peek),
            "contains" => key("contains").map(CacheCommand::Contains),
            "remove" => key("remove").map(CacheCommand::Remove),
            "size" => bare(CacheCommand::Size),
            "clear" => bare(CacheCommand::Clear),
            "lru" => bare(CacheCommand::Lru),
            "show" => bare(CacheCommand::Show),
            "stats" => bare(CacheCommand::Stats),
            "help" => bare(CacheCommand::Help),
            "exit" | "quit" => bare(CacheCommand::Exit),
            other => Err(CacheError::Command(format!("unknown command '{}'", other))),
        }
    }
}

/// Executes shell commands against a string-keyed cache.
pub struct CacheShell {
    cache: LRUCache<String, String>,
}

impl CacheShell {
    pub fn new(cache: LRUCache<String, String>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &LRUCache<String, String> {
        &self.cache
    }

    pub fn execute(&mut self, command: CacheCommand) -> String {
        match command {
            CacheCommand::Put { key, value } => {
                let shown = format!("put {} = {}", key, value);
                match self.cache.put_evicting(key, value) {
                    Some((old_key, old_value)) => {
                        format!("{} (evicted {} = {})", shown, old_key, old_value)
                    }
                    None => shown,
                }
            }
            CacheCommand::Get(key) => match self.cache.get(key.as_str()) {
                Some(value) => value.clone(),
                None => "(not found)".to_string(),
            },
            CacheCommand::Peek(key) => match self.cache.peek(key.as_str()) {
                Some(value) => value.clone(),
                None => "(not found)".to_string(),
            },
            CacheCommand::Contains(key) => self.cache.contains(key.as_str()).to_string(),
            CacheCommand::Remove(key) => match self.cache.remove(key.as_str()) {
                Some(value) => format!("removed {} = {}", key, value),
                None => "(not found)".to_string(),
            },
            CacheCommand::Size => self.cache.len().to_string(),
            CacheCommand::Clear => {
                self.cache.clear();
                "cleared".to_string()
            }
            CacheCommand::Lru => match self.cache.peek_lru() {
                Some((key, value)) => format!("{} = {}", key, value),
                None => "(empty)".to_string(),
            },
            CacheCommand::Show => self.cache.to_string(),
            CacheCommand::Stats => format!(
                "gets={} hits={} misses={} evictions={} hit_ratio={:.2}",
                self.cache.total_gets(),
                self.cache.total_hits(),
                self.cache.total_misses(),
                self.cache.total_evictions(),
                self.cache.hit_ratio()
            ),
            CacheCommand::Help => help_text(),
            CacheCommand::Exit => "bye".to_string(),
        }
    }

    /// Parses and runs one line. `Ok(None)` means the session should end.
    pub fn execute_line(&mut self, line: &str) -> Result<Option<String>, CacheError> {
        match line.parse::<CacheCommand>()? {
            CacheCommand::Exit => Ok(None),
            command => Ok(Some(self.execute(command))),
        }
    }

    /// Replays a script, one command per line. Blank lines and `#` comments are skipped;
    /// bad lines are reported and skipped.
    pub fn run_script(&mut self, script: &str) -> Vec<String> {
        let mut transcript = Vec::new();
        for line in script.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match self.execute_line(line) {
                Ok(Some(output)) => transcript.push(format!("> {}\n{}", line, output)),
                Ok(None) => break,
                Err(e) => transcript.push(format!("> {}\nError: {}", line, e)),
            }
        }
        transcript
    }
}

fn help_text() -> String {
    [
        "Available Commands:",
        "  put <key> <value>  - Insert or update (marks key as most recent)",
        "  get <key>          - Read a value (marks key as most recent)",
        "  peek <key>         - Read a value without touching recency",
        "  contains <key>     - Membership test, does not touch recency",
        "  remove <key>       - Drop a key",
        "  size               - Number of entries",
        "  clear              - Remove all entries",
        "  lru                - Show the next eviction candidate",
        "  show               - Show entries, least recent first",
        "  stats              - Hit/miss/eviction counters",
        "  help               - Show this help message",
        "  exit               - Leave the shell",
    ]
    .join("\n")
}

fn resolve_config(args: &Args) -> Result<CacheConfig, CacheError> {
    let mut config = match &args.config {
        Some(path) => CacheConfig::load(path)?,
        None => CacheConfig::default(),
    };
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    if args.demo {
        config.capacity = 3;
    }
    config.validate()?;
    Ok(config)
}

fn print_transcript(transcript: Vec<String>) {
    for entry in transcript {
        println!("{}", entry);
    }
}

fn run_repl(shell: &mut CacheShell) -> Result<(), Box<dyn Error>> {
    println!("{}", "\nlrukit cache shell".blue().bold());
    println!("Type 'help' for commands\n");

    let mut rl = DefaultEditor::new()?;
    if rl.load_history(HISTORY_FILE).is_err() {
        println!("{}", "No previous history.".yellow());
    }

    loop {
        match rl.readline("lru> ") {
            Ok(line) => {
                let command = line.trim();
                if command.is_empty() {
                    continue;
                }

                rl.add_history_entry(command)?;

                match shell.execute_line(command) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {
                        println!("Shutting down...");
                        break;
                    }
                    Err(e) => println!("{}", format!("Error: {}", e).red()),
                }
            }
            Err(err) => {
                println!("Error: {}", err);
                break;
            }
        }
    }

    rl.save_history(HISTORY_FILE)?;
    Ok(())
}

pub fn run_cli() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    initialize_logger_with_cache_level(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    let config = resolve_config(&args)?;
    info!("Starting cache with capacity {}", config.capacity);
    let mut shell = CacheShell::new(LRUCache::with_config(&config)?);

    if args.demo {
        print_transcript(shell.run_script(&DEMO_SCRIPT.join("\n")));
        return Ok(());
    }

    if let Some(path) = &args.script {
        let script = fs::read_to_string(path)?;
        print_transcript(shell.run_script(&script));
        return Ok(());
    }

    run_repl(&mut shell)
}
