//! Courier - A command line client for the Mailroom backend
//!
//! Each invocation restores the persisted session, runs one command and
//! exits.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{debug, error, warn};
use std::path::PathBuf;
use std::sync::Arc;

use webmail::{
    AppState, ClientConfig, Collection, FileCredentialStore, HttpGateway, Mail, MailId,
    SessionStatus, SignupProfile, StateChange,
};

#[derive(Parser, Debug)]
#[command(
    name = "courier",
    about = "Read and send mail through a Mailroom server",
    arg_required_else_help = true
)]
struct Cli {
    #[arg(long, help = "Settings file (defaults to ~/.config/mailroom/mailroom.json)")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log in with it
    Signup {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(long, help = "Repeat the password (defaults to --password)")]
        confirm: Option<String>,
        #[arg(long, help = "Display name")]
        name: Option<String>,
    },
    /// Forget the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List received mail
    Inbox {
        #[arg(short, long, help = "Filter by sender, recipient or subject")]
        query: Option<String>,
    },
    /// List sent mail
    Sent {
        #[arg(short, long, help = "Filter by sender, recipient or subject")]
        query: Option<String>,
    },
    /// Show one mail by ID
    Show {
        #[arg(long)]
        id: String,
        #[arg(long, help = "Look in sent mail instead of the inbox")]
        sent: bool,
    },
    /// Send a mail
    Send {
        #[arg(long)]
        to: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        text: String,
    },
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    if let Err(e) = run(Cli::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::load()?,
    };
    debug!("Using API at {}", settings.api_url);

    let gateway = Arc::new(HttpGateway::new(&settings));
    let credentials = Arc::new(FileCredentialStore::new()?);
    let mut app = AppState::new(settings, gateway, credentials);

    app.subscribe(Arc::new(|change: StateChange| {
        debug!("State changed: {:?}", change);
    }));

    app.start();

    match cli.command {
        Commands::Login { username, password } => {
            app.login(&username, &password)?;
            print_user(&app);
        }
        Commands::Signup {
            username,
            password,
            confirm,
            name,
        } => {
            let confirm = confirm.unwrap_or_else(|| password.clone());
            let profile = SignupProfile::new(name.unwrap_or_default(), username, password, confirm);
            app.signup(&profile)?;
            print_user(&app);
        }
        Commands::Logout => {
            app.logout();
            println!("Logged out.");
        }
        Commands::Whoami => match app.session().status() {
            SessionStatus::Authenticated => print_user(&app),
            _ => println!("Not logged in."),
        },
        Commands::Inbox { query } => {
            require_session(&app)?;
            print_list(&app, Collection::Inbox, query.as_deref().unwrap_or(""));
        }
        Commands::Sent { query } => {
            require_session(&app)?;
            print_list(&app, Collection::Sent, query.as_deref().unwrap_or(""));
        }
        Commands::Show { id, sent } => {
            require_session(&app)?;
            let collection = if sent { Collection::Sent } else { Collection::Inbox };
            app.switch_collection(collection);

            let id = MailId::new(id);
            if !app.select(&id) {
                bail!("No mail with ID {} in {}", id.as_str(), collection.label());
            }
            let mail = app
                .mailbox()
                .find(collection, &id)
                .context("Selected mail disappeared")?;
            print_mail(mail);
        }
        Commands::Send { to, subject, text } => {
            require_session(&app)?;
            app.open_compose();
            app.set_draft_to(to.as_str());
            app.set_draft_subject(subject);
            app.set_draft_text(text);

            let id = app.submit_compose(Utc::now())?;
            println!("Message sent to {} ({})", to, id.as_str());
        }
    }

    Ok(())
}

fn require_session(app: &AppState) -> Result<()> {
    if !app.session().is_authenticated() {
        bail!("Not logged in. Run `courier login` first.");
    }
    if let Some(e) = app.mailbox().load_error() {
        warn!("{}", e);
    }
    Ok(())
}

fn print_user(app: &AppState) {
    if let Some(user) = app.session().user() {
        println!("Logged in as {} <{}>", user.display_name, user.address);
    }
}

fn print_list(app: &AppState, collection: Collection, query: &str) {
    let mails = app.mailbox().filtered(collection, query);
    if mails.is_empty() {
        println!("No messages found.");
        return;
    }

    println!("{} ({} message(s)):", collection.label(), mails.len());
    for (idx, mail) in mails.iter().enumerate() {
        let peer = match collection {
            Collection::Inbox => &mail.from,
            Collection::Sent => &mail.to,
        };
        println!(
            "{}. {}  {}  {}",
            idx + 1,
            mail.timestamp.format("%Y-%m-%d %H:%M"),
            peer,
            mail.display_subject()
        );
        println!("   ID: {}", mail.id.as_str());
    }
}

fn print_mail(mail: &Mail) {
    println!("From: {}", mail.from);
    println!("To: {}", mail.to);
    println!("Date: {}", mail.timestamp.to_rfc2822());
    println!("Subject: {}", mail.display_subject());
    println!();
    println!("{}", mail.text);
}
