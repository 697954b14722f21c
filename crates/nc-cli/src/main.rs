//! Nutcracker CLI
//!
//! CLI tool for stripping tracking parameters from URLs and inspecting
//! removeparam filter lists.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use nc_core::{ParamMatcher, Rule, UrlCleaner};

mod rules;

use rules::{load_rules, RuleArgs};

#[derive(Parser)]
#[command(name = "nc-cli")]
#[command(about = "Nutcracker tracking-parameter remover")]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean URLs given as arguments, or one per line on stdin
    Clean {
        /// URLs to clean
        urls: Vec<String>,

        #[command(flatten)]
        rules: RuleArgs,

        /// Print removed parameter names to stderr
        #[arg(long)]
        explain: bool,

        /// Only print URLs that changed
        #[arg(long)]
        only_changed: bool,
    },

    /// Print the compiled rules
    Rules {
        #[command(flatten)]
        rules: RuleArgs,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-list parse statistics
    Inspect {
        #[command(flatten)]
        rules: RuleArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Clean {
            urls,
            rules,
            explain,
            only_changed,
        } => cmd_clean(&urls, &rules, explain, only_changed),
        Commands::Rules { rules, json } => cmd_rules(&rules, json),
        Commands::Inspect { rules } => cmd_inspect(&rules),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .format_target(false)
        .init();
}

fn cmd_clean(urls: &[String], rule_args: &RuleArgs, explain: bool, only_changed: bool) -> Result<(), String> {
    let report = load_rules(rule_args)?;
    let cleaner = UrlCleaner::new(report.rules);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut seen = 0usize;
    let mut cleaned_count = 0usize;

    let mut handle = |input: &str| -> Result<(), String> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }
        seen += 1;

        let cleaned = match cleaner.try_clean(input) {
            Ok(Some(cleaned)) => Some(cleaned),
            Ok(None) => None,
            Err(e) => {
                if explain {
                    eprintln!("{input}: {e}");
                }
                None
            }
        };

        let written = match cleaned {
            Some(cleaned) => {
                cleaned_count += 1;
                if explain {
                    eprintln!("{input}: removed {}", cleaned.removed.join(", "));
                }
                writeln!(out, "{}", cleaned.url)
            }
            None if only_changed => Ok(()),
            None => writeln!(out, "{input}"),
        };
        written.map_err(|e| format!("Failed to write output: {}", e))
    };

    if urls.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line.map_err(|e| format!("Failed to read stdin: {}", e))?;
            handle(&line)?;
        }
    } else {
        for url in urls {
            handle(url)?;
        }
    }

    info!("Cleaned {} of {} URLs", cleaned_count, seen);
    Ok(())
}

#[derive(Serialize)]
struct RuleView<'a> {
    exception: bool,
    domains: &'a [String],
    kind: &'static str,
    value: &'a str,
    case_insensitive: bool,
}

impl<'a> From<&'a Rule> for RuleView<'a> {
    fn from(rule: &'a Rule) -> Self {
        let (kind, case_insensitive) = match &rule.matcher {
            ParamMatcher::Exact(_) => ("exact", false),
            ParamMatcher::Regex {
                case_insensitive, ..
            } => ("regex", *case_insensitive),
        };

        Self {
            exception: rule.is_exception,
            domains: &rule.domains,
            kind,
            value: rule.matcher.source(),
            case_insensitive,
        }
    }
}

fn cmd_rules(rule_args: &RuleArgs, json: bool) -> Result<(), String> {
    let report = load_rules(rule_args)?;

    if json {
        let views: Vec<RuleView<'_>> = report.rules.iter().map(RuleView::from).collect();
        let text = serde_json::to_string_pretty(&views)
            .map_err(|e| format!("Failed to encode rules: {}", e))?;
        println!("{text}");
        return Ok(());
    }

    for rule in report.rules.iter() {
        println!("{}", format_rule(rule));
    }

    Ok(())
}

fn format_rule(rule: &Rule) -> String {
    let scope = if rule.domains.is_empty() {
        "*".to_string()
    } else {
        rule.domains.join("|")
    };
    let matcher = match &rule.matcher {
        ParamMatcher::Exact(name) => name.clone(),
        ParamMatcher::Regex {
            pattern,
            case_insensitive,
        } => format!("/{}/{}", pattern.as_str(), if *case_insensitive { "i" } else { "" }),
    };
    let prefix = if rule.is_exception { "@@ " } else { "" };

    format!("{prefix}{scope} -> {matcher}")
}

fn cmd_inspect(rule_args: &RuleArgs) -> Result<(), String> {
    let start = Instant::now();
    let report = load_rules(rule_args)?;
    let elapsed = start.elapsed();

    for (list_id, list) in report.lists.iter().enumerate() {
        if !list.loaded {
            println!("  [{}] {} - not cached", list_id, list.name);
            continue;
        }
        let stats = &list.stats;
        println!(
            "  [{}] {} - {} lines, {} rules (comments {}, cosmetic {}, other {}, malformed {})",
            list_id,
            list.name,
            stats.lines,
            stats.rules,
            stats.comments,
            stats.cosmetic,
            stats.unrelated,
            stats.malformed,
        );
    }

    println!();
    println!("Rules:");
    println!("  Count:       {}", report.rules.len());
    println!("  Exceptions:  {}", report.rules.exception_count());
    println!("  Deduped:     {}", report.deduped);
    println!("  Time:        {:.1}ms", elapsed.as_secs_f64() * 1000.0);

    Ok(())
}
