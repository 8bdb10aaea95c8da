use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::bot;
use crate::configuration::Config;
use crate::configuration::ConfigKey;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn arg_username() -> Arg {
    return Arg::new("username")
        .short('u')
        .long("username")
        .help("Letterboxd username")
        .num_args(1)
        .required(true);
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Letterroast")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to the log file written when LETTERROAST_LOG_DIR is set. Run with RUST_LOG=letterroast for debug logs.")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        )
        .subcommand(
            Command::new("models").about("List all Gemini models that can write roasts.")
        );
}

fn subcommand_roast() -> Command {
    return Command::new("roast")
        .about("Roast a Letterboxd user from the terminal without starting the bot.")
        .arg(arg_username());
}

fn subcommand_films() -> Command {
    return Command::new("films")
        .about("List the films a Letterboxd user rated five stars.")
        .arg(arg_username());
}

fn arg_config(key: ConfigKey, env: &'static str, help: String) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("letterroast")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(Command::new("bot").about("Start the Telegram bot. This is the default."))
        .subcommand(subcommand_roast())
        .subcommand(subcommand_films())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("LETTERROAST_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(arg_config(
            ConfigKey::TelegramToken,
            "TELEGRAM_BOT_TOKEN",
            "Telegram bot token from BotFather.".to_string(),
        ))
        .arg(arg_config(
            ConfigKey::TelegramURL,
            "LETTERROAST_TELEGRAM_URL",
            format!("Telegram Bot API URL. [default: {}]", Config::default(ConfigKey::TelegramURL)),
        ))
        .arg(arg_config(
            ConfigKey::PollTimeout,
            "LETTERROAST_POLL_TIMEOUT",
            format!("Seconds Telegram holds a long poll open while waiting for new messages. [default: {}]", Config::default(ConfigKey::PollTimeout)),
        ))
        .arg(arg_config(
            ConfigKey::GeminiToken,
            "GEMINI_API_KEY",
            "Gemini API key used to write roasts.".to_string(),
        ))
        .arg(arg_config(
            ConfigKey::GeminiURL,
            "LETTERROAST_GEMINI_URL",
            format!("Gemini API URL. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::GeminiURL)),
        ))
        .arg(arg_config(
            ConfigKey::Model,
            "LETTERROAST_MODEL",
            format!("The Gemini model used to write roasts. [default: {}]", Config::default(ConfigKey::Model)),
        ).short('m'))
        .arg(arg_config(
            ConfigKey::LetterboxdURL,
            "LETTERROAST_LETTERBOXD_URL",
            format!("Letterboxd URL profiles are scraped from. [default: {}]", Config::default(ConfigKey::LetterboxdURL)),
        ))
        .arg(arg_config(
            ConfigKey::RoastAttempts,
            "LETTERROAST_ROAST_ATTEMPTS",
            format!("Attempts made at generating a roast before giving up. [default: {}]", Config::default(ConfigKey::RoastAttempts)),
        ))
        .arg(arg_config(
            ConfigKey::RoastRetryDelay,
            "LETTERROAST_ROAST_RETRY_DELAY",
            format!("Time to wait in milliseconds between failed roast attempts. [default: {}]", Config::default(ConfigKey::RoastRetryDelay)),
        ))
        .arg(arg_config(
            ConfigKey::BackendHealthCheckTimeout,
            "LETTERROAST_BACKEND_HEALTH_CHECK_TIMEOUT",
            format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)),
        ));
}

/// Parses arguments and runs any one-off subcommand. Returns true when the bot
/// should be started.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("bot", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
        }
        Some(("roast", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            if let Some(username) = subcmd_matches.get_one::<String>("username") {
                println!("{}", bot::roast(username).await?);
            }
            return Ok(false);
        }
        Some(("films", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            if let Some(username) = subcmd_matches.get_one::<String>("username") {
                let films = bot::films(username).await?;
                if films.is_empty() {
                    bail!(format!("{username} has not rated any films five stars"));
                }
                println!("{}", films.join("\n"));
            }
            return Ok(false);
        }
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => match env::var("LETTERROAST_LOG_DIR") {
                    Ok(log_dir) => {
                        let log_path = path::PathBuf::from(log_dir).join("debug.log");
                        println!("{}", log_path.to_string_lossy());
                    }
                    Err(_) => {
                        println!("Logs are written to stderr. Set LETTERROAST_LOG_DIR to write them to a file.");
                    }
                },
                Some(("enum-config", _)) => {
                    println!("{}", ConfigKey::VARIANTS.join("\n"));
                }
                Some(("models", models_matches)) => {
                    Config::load(vec![&matches, debug_matches, models_matches]).await?;
                    println!("{}", bot::models().await?.join("\n"));
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        _ => {
            Config::load(vec![&matches]).await?;
        }
    }

    return Ok(true);
}
