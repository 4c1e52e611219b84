use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use trustface::app::keyboard_input::KeyboardInputHandler;
use trustface::{
    run_capture_page, AuthForm, AuthMode, CaptureEvent, CapturePageBuilder, FileSessionStore,
    FormField, Navigator, PageCommand, PageExit, Route, SessionStore, TrustfaceConfig,
};

const EXIT_FAILED: i32 = 1;
const EXIT_INVALID: i32 = 2;
const EXIT_CANCELLED: i32 = 3;
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(name = "trustface")]
#[command(about = "Face capture and identity verification client")]
#[command(version)]
#[command(long_about = "Collects sign-up or sign-in details, captures a still from the \
camera after a short countdown and submits it to the TrustFace verification service. \
Verified sessions are persisted locally.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "trustface.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, global = true, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, global = true, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, global = true, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", global = true, help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign up, then verify with a face capture
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Local phone digits, without the dial code
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
        /// ISO country code selecting the dial code
        #[arg(long, default_value = trustface::country::DEFAULT_COUNTRY_CODE)]
        country: String,
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Sign in, then verify with a face capture
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Inspect or clear the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Validate form input and print field errors as JSON
    ValidateForm {
        #[arg(long, value_enum, default_value = "register")]
        mode: FormMode,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = trustface::country::DEFAULT_COUNTRY_CODE)]
        country: String,
    },
    /// Print the effective configuration in TOML format
    PrintConfig,
    /// Validate the configuration file and exit
    ValidateConfig,
}

#[derive(ClapArgs, Debug, Clone, Copy)]
struct CaptureArgs {
    /// Capture as soon as the camera is ready instead of waiting for SPACE
    #[arg(long)]
    auto_capture: bool,
}

#[derive(Subcommand, Debug)]
enum SessionAction {
    /// Print the stored session as JSON
    Show,
    /// Remove the stored session fields
    Clear,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum FormMode {
    Register,
    Login,
}

impl From<FormMode> for AuthMode {
    fn from(mode: FormMode) -> Self {
        match mode {
            FormMode::Register => AuthMode::Register,
            FormMode::Login => AuthMode::Login,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _guard = init_logging(&args)?;

    info!("Starting TrustFace client v{}", env!("CARGO_PKG_VERSION"));

    let config = match TrustfaceConfig::load_from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("✗ Failed to load configuration from {}: {}", args.config, e);
            drop(_guard);
            std::process::exit(EXIT_FAILED);
        }
    };

    let exit_code = match args.command {
        Command::PrintConfig => {
            let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("# TrustFace Configuration File");
            println!();
            println!("{}", rendered);
            0
        }
        Command::ValidateConfig => match config.validate() {
            Ok(()) => {
                println!("✓ Configuration is valid");
                0
            }
            Err(e) => {
                error!("Configuration validation failed: {}", e);
                eprintln!("✗ Configuration validation failed: {}", e);
                EXIT_FAILED
            }
        },
        Command::Session { action } => run_session(&config, action)?,
        Command::ValidateForm {
            mode,
            name,
            email,
            phone,
            password,
            country,
        } => {
            let fields = FormInput {
                name: &name,
                email: &email,
                phone: &phone,
                password: &password,
                country: &country,
            };
            let (code, report) = validate_form(mode.into(), &fields);
            if let Some(report) = report {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            code
        }
        Command::Register {
            name,
            email,
            phone,
            password,
            country,
            capture,
        } => {
            let mut form = AuthForm::new(AuthMode::Register);
            if form.select_country(&country) {
                form.set_field(FormField::Name, &name);
                form.set_field(FormField::Email, &email);
                form.set_field(FormField::Phone, &phone);
                form.set_field(FormField::Password, &password);
                run_verification(config, form, capture).await?
            } else {
                unknown_country(&country)
            }
        }
        Command::Login {
            email,
            password,
            capture,
        } => {
            let mut form = AuthForm::new(AuthMode::Login);
            form.set_field(FormField::Email, &email);
            form.set_field(FormField::Password, &password);
            run_verification(config, form, capture).await?
        }
    };

    info!("TrustFace client exited with code: {}", exit_code);

    // Flush buffered log lines before exiting the process
    drop(_guard);
    std::process::exit(exit_code);
}

/// Raw field values as typed on the command line
struct FormInput<'a> {
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    password: &'a str,
    country: &'a str,
}

/// Exit code plus the JSON report; no report when the country is unknown
fn validate_form(mode: AuthMode, input: &FormInput<'_>) -> (i32, Option<serde_json::Value>) {
    let mut form = AuthForm::new(mode);
    if !form.select_country(input.country) {
        return (unknown_country(input.country), None);
    }
    form.set_field(FormField::Name, input.name);
    form.set_field(FormField::Email, input.email);
    form.set_field(FormField::Phone, input.phone);
    form.set_field(FormField::Password, input.password);

    let valid = form.validate();
    let report = json!({
        "valid": valid,
        "errors": form.errors(),
        "strength": form.strength(),
    });
    (if valid { 0 } else { EXIT_INVALID }, Some(report))
}

fn unknown_country(code: &str) -> i32 {
    warn!("Unknown country code: {}", code);
    eprintln!("✗ Unknown country code: {}", code);
    EXIT_INVALID
}

fn run_session(config: &TrustfaceConfig, action: SessionAction) -> Result<i32> {
    let store = FileSessionStore::new(&config.session.path);
    match action {
        SessionAction::Show => {
            let record = store.get()?;
            if record.is_empty() {
                println!("No stored session");
            } else {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }
        SessionAction::Clear => {
            store.clear()?;
            println!("✓ Session cleared");
        }
    }
    Ok(0)
}

async fn run_verification(
    config: TrustfaceConfig,
    mut form: AuthForm,
    capture: CaptureArgs,
) -> Result<i32> {
    if let Err(e) = config.validate() {
        eprintln!("✗ Configuration validation failed: {}", e);
        return Ok(EXIT_FAILED);
    }

    let navigator = Arc::new(Navigator::new(Route::Auth));
    if let Err(e) = form.submit(&navigator) {
        for (field, message) in form.errors() {
            eprintln!("✗ {}: {}", field, message);
        }
        warn!("Form rejected: {}", e);
        return Ok(EXIT_INVALID);
    }

    let mut page = CapturePageBuilder::new()
        .config(config)
        .navigator(Arc::clone(&navigator))
        .build()
        .context("Failed to build capture page")?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C");
            signal_token.cancel();
        }
    });

    let (commands, receiver) = mpsc::channel(8);
    let status = spawn_status_printer(&page, capture.auto_capture.then(|| commands.clone()));

    let keyboard = if capture.auto_capture {
        None
    } else {
        let handler = KeyboardInputHandler::new(commands.clone());
        handler.start().await?;
        Some(handler)
    };

    let exit = run_capture_page(&mut page, receiver, shutdown).await;

    if let Some(handler) = keyboard {
        handler.stop().await?;
    }
    status.abort();
    drop(commands);

    let exit_code = match exit? {
        PageExit::Verified(context) => {
            println!("✓ Verified");
            println!("{}", serde_json::to_string_pretty(&context)?);
            0
        }
        PageExit::Cancelled => {
            println!("Capture cancelled; returned to {}", navigator.current());
            EXIT_CANCELLED
        }
        PageExit::Left(route) => {
            println!("Left capture page for {}", route);
            0
        }
        PageExit::Shutdown => match page.error() {
            Some(message) => {
                eprintln!("✗ {}", message);
                EXIT_FAILED
            }
            None => EXIT_INTERRUPTED,
        },
    };

    Ok(exit_code)
}

/// Echo capture status to the terminal. With `auto` set, capture starts once
/// the camera is ready and the run ends on the first failure.
fn spawn_status_printer(
    page: &trustface::CapturePage,
    auto: Option<mpsc::Sender<PageCommand>>,
) -> tokio::task::JoinHandle<()> {
    let mut events = page.event_bus().subscribe();
    tokio::spawn(async move {
        let mut captured = false;
        while let Ok(event) = events.recv().await {
            // Raw mode needs an explicit carriage return
            eprint!("{}\r\n", event.description());

            let Some(commands) = auto.as_ref() else {
                continue;
            };
            let command = match event {
                CaptureEvent::CameraReady { .. } if !captured => {
                    captured = true;
                    PageCommand::Capture
                }
                CaptureEvent::CameraError { .. } | CaptureEvent::SubmissionFailed { .. } => {
                    PageCommand::Exit
                }
                _ => continue,
            };
            if commands.send(command).await.is_err() {
                break;
            }
        }
    })
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Determine log level based on flags
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("trustface={}", log_level)));

    let (writer, guard) = match args.log_file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .context("Log file path must name a file")?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (fmt::writer::BoxMakeWriter::new(writer), Some(guard))
        }
        None => (fmt::writer::BoxMakeWriter::new(std::io::stderr), None),
    };
    let ansi = args.log_file.is_none();

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();

    Ok(guard)
}
