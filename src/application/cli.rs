#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AnswerService;
use crate::domain::models::Session;
use crate::domain::services::SessionPersistence;
use crate::domain::services::SessionStore;
use crate::domain::services::HELP_TEXT;
use crate::infrastructure::backends::answer_api::AnswerApi;
use crate::infrastructure::storage::StorageManager;

/// How the chat UI should be started once arguments are parsed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChatOptions {
    pub ephemeral: bool,
}

pub fn load_session_store(ephemeral: bool) -> Result<Arc<SessionStore>> {
    let persistence = SessionPersistence::new(StorageManager::get(ephemeral)?);
    return Ok(Arc::new(SessionStore::new(persistence)));
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

fn format_session(session: &Session) -> String {
    let mut res = format!("- (ID: {}) {}", session.id, session.title);

    let message_count = session.messages.len();
    if message_count == 1 {
        res = format!("{res}, 1 message");
    } else {
        res = format!("{res}, {message_count} messages");
    }

    return res;
}

fn print_sessions_list(store: &SessionStore) {
    let sessions = store
        .navigable()
        .iter()
        .map(|session| {
            return format_session(session);
        })
        .collect::<Vec<String>>();

    if sessions.is_empty() {
        println!("There are no sessions available. You should start your first one!");
    } else {
        println!("{}", sessions.join("\n"));
    }
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

fn open_session(store: &SessionStore, session_id: &str) -> Result<()> {
    if store.session(session_id).is_none() {
        bail!(format!("Session {session_id} does not exist"));
    }

    Config::set(ConfigKey::SessionID, session_id);
    return Ok(());
}

/// Returns false when the selection was cancelled.
fn open_session_interactive(store: &SessionStore) -> Result<bool> {
    let sessions = store.navigable();
    if sessions.is_empty() {
        println!("There are no sessions available. You should start your first one!");
        return Ok(false);
    }

    let session_options = sessions
        .iter()
        .map(|session| {
            return format_session(session);
        })
        .collect::<Vec<String>>();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which session would you like to open?")
        .default(0)
        .items(&session_options)
        .interact_opt()?;

    if let Some(idx) = selection {
        open_session(store, &sessions[idx].id)?;
        return Ok(true);
    }

    return Ok(false);
}

async fn speak(speak_matches: &ArgMatches) -> Result<()> {
    let text = speak_matches
        .get_one::<String>("text")
        .map(|text| return text.to_string())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!("There's no text to speak");
    }

    let lang = speak_matches
        .get_one::<String>("lang")
        .map(|lang| return lang.to_string())
        .unwrap_or_else(|| return "en".to_string());
    let voice = speak_matches
        .get_one::<String>("voice")
        .map(|voice| return voice.to_string())
        .unwrap_or_else(|| return "male".to_string());
    let output = speak_matches
        .get_one::<String>("output")
        .map(|output| return output.to_string())
        .unwrap_or_else(|| return "careerist.mp3".to_string());

    let audio = AnswerApi::default()
        .text_to_speech(&text, &lang, &voice)
        .await?;
    fs::write(&output, &audio).await?;
    println!("Saved {} bytes of audio to {output}", audio.len());

    return Ok(());
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

fn subcommand_sessions_delete() -> Command {
    return Command::new("delete")
        .about("Delete one or all sessions.")
        .arg(
            clap::Arg::new("session-id")
                .short('i')
                .long("id")
                .help("Session ID")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("all")
                .long("all")
                .help("Delete all sessions.")
                .action(ArgAction::SetTrue),
        )
        .group(
            ArgGroup::new("delete-args")
                .args(["session-id", "all"])
                .required(true),
        );
}

fn arg_session_id() -> Arg {
    return Arg::new(ConfigKey::SessionID.to_string())
        .long(ConfigKey::SessionID.to_string())
        .env("CAREERIST_SESSION_ID")
        .num_args(1)
        .help("Open an existing chat session by ID instead of starting a new one.");
}

fn arg_ephemeral() -> Arg {
    return Arg::new("ephemeral")
        .long("ephemeral")
        .help("Keep sessions in memory only. Nothing is read from or written to the data directory.")
        .action(ArgAction::SetTrue);
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start a chat, or continue an existing one.")
        .arg(arg_session_id())
        .arg(arg_ephemeral());
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Manage locally saved chat sessions.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the sessions data directory path."))
        .subcommand(Command::new("list").about("List all saved sessions with their ids and titles."))
        .subcommand(
            Command::new("open")
                .about("Open a saved session by ID. Omit passing any session ID to load an interactive selection.")
                .arg(
                    clap::Arg::new(ConfigKey::SessionID.to_string())
                        .short('i')
                        .long("id")
                        .help("Session ID")
                        .required(false),
                ),
        )
        .subcommand(subcommand_sessions_delete());
}

fn subcommand_speak() -> Command {
    return Command::new("speak")
        .about("Converts text to speech with the Careerist service and saves it as an MP3.")
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .help("Text to read out.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("lang")
                .short('l')
                .long("lang")
                .help("Language of the text.")
                .num_args(1)
                .default_value("en"),
        )
        .arg(
            Arg::new("voice")
                .long("voice")
                .help("Voice to read the text with.")
                .num_args(1)
                .default_value("male"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("File to write the audio to.")
                .num_args(1)
                .default_value("careerist.mp3"),
        );
}

pub fn build() -> Command {
    let commands_text = HELP_TEXT
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("careerist")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_sessions())
        .subcommand(subcommand_speak())
        .arg(arg_session_id())
        .arg(arg_ephemeral())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("CAREERIST_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::ServiceURL.to_string())
                .long(ConfigKey::ServiceURL.to_string())
                .env("CAREERIST_SERVICE_URL")
                .num_args(1)
                .help(format!("Base URL of the Careerist answer service. [default: {}]", Config::default(ConfigKey::ServiceURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::HealthCheckTimeout.to_string())
                .long(ConfigKey::HealthCheckTimeout.to_string())
                .env("CAREERIST_HEALTH_CHECK_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before timing out when checking the answer service is reachable. [default: {}]", Config::default(ConfigKey::HealthCheckTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::DataDir.to_string())
                .long(ConfigKey::DataDir.to_string())
                .env("CAREERIST_DATA_DIR")
                .num_args(1)
                .help(format!("Directory chat sessions are saved to. [default: {}]", Config::default(ConfigKey::DataDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::LoadingInterval.to_string())
                .long(ConfigKey::LoadingInterval.to_string())
                .env("CAREERIST_LOADING_INTERVAL")
                .num_args(1)
                .help(format!("Milliseconds between loading phrases while waiting for an answer. [default: {}]", Config::default(ConfigKey::LoadingInterval)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Username.to_string())
                .short('u')
                .long(ConfigKey::Username.to_string())
                .env("CAREERIST_USERNAME")
                .num_args(1)
                .help("Your user name displayed above your chat bubbles. [default: $USER]")
                .global(true),
        );
}

fn chat_options(matches: &ArgMatches) -> ChatOptions {
    return ChatOptions {
        ephemeral: matches.get_flag("ephemeral"),
    };
}

/// Runs the requested command. Returns the options to start the chat UI
/// with, or `None` when the command has already done its work.
pub async fn parse() -> Result<Option<ChatOptions>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("chat", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            return Ok(Some(ChatOptions {
                ephemeral: matches.get_flag("ephemeral") || subcmd_matches.get_flag("ephemeral"),
            }));
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("speak", speak_matches)) => {
            Config::load(vec![&matches, speak_matches]).await?;
            speak(speak_matches).await?;
            return Ok(None);
        }
        Some(("sessions", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            match subcmd_matches.subcommand() {
                Some(("dir", _)) => {
                    println!("{}", Config::get(ConfigKey::DataDir));
                    return Ok(None);
                }
                Some(("list", _)) => {
                    print_sessions_list(&*load_session_store(false)?);
                    return Ok(None);
                }
                Some(("open", open_matches)) => {
                    let store = load_session_store(false)?;
                    if let Some(session_id) = open_matches.get_one::<String>("session-id") {
                        open_session(&store, session_id)?;
                    } else if !open_session_interactive(&store)? {
                        return Ok(None);
                    }
                    return Ok(Some(ChatOptions::default()));
                }
                Some(("delete", delete_matches)) => {
                    let store = load_session_store(false)?;
                    if let Some(session_id) = delete_matches.get_one::<String>("session-id") {
                        if store.session(session_id).is_none() {
                            bail!(format!("Session {session_id} does not exist"));
                        }
                        store.delete_session(session_id)?;
                        println!("Deleted session {session_id}");
                    } else if delete_matches.get_flag("all") {
                        store.clear_all()?;
                        println!("Deleted all sessions");
                    } else {
                        subcommand_sessions_delete().print_long_help()?;
                    }
                    return Ok(None);
                }
                _ => {
                    subcommand_sessions().print_long_help()?;
                    return Ok(None);
                }
            }
        }
        _ => {
            Config::load(vec![&matches]).await?;
            return Ok(Some(chat_options(&matches)));
        }
    }
}
