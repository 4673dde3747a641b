//! Command-line entry point for the profile settings store.
//!
//! A small tool over the settings store: inspect the settings of a profile
//! and make the common edits (contact alias, circles, pending requests, proxy)
//! without starting the chat client.
//!
//! # Usage
//!
//! ```text
//! settings-store [OPTIONS] <COMMAND>
//!
//! Options:
//!   --dir <PATH>           Settings directory [default: platform directory]
//!   --profile <NAME>       Profile to operate on
//!   --password <PASSWORD>  Password of an encrypted profile
//!
//! Commands:
//!   show            Print global and personal settings
//!   create          Create an empty personal file for --profile
//!   set-alias       Set a contact's alias
//!   add-request     Queue a pending contact request
//!   requests        List pending contact requests
//!   add-circle      Add a circle
//!   remove-circle   Remove a circle by index
//!   set-proxy       Configure the proxy
//!   portable        Move the global settings next to the executable or back
//!   reset           Delete the profile's personal file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable            | Description                  |
//! |---------------------|------------------------------|
//! | `SETTINGS_DIR`      | Same as `--dir`              |
//! | `SETTINGS_PROFILE`  | Same as `--profile`          |
//! | `SETTINGS_PASSWORD` | Same as `--password`         |
//!
//! Log output is controlled with `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use settings_core::ProxyType;
use settings_store::infrastructure::bootstrap::open_store;
use settings_store::infrastructure::profile::LocalProfile;
use settings_store::{Profile, SettingsStore};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit profile settings.
#[derive(Debug, Parser)]
#[command(
    name = "settings-store",
    about = "Inspect and edit global and per-profile settings",
    version
)]
struct Cli {
    /// Settings directory.  Disables portable mode detection.
    #[arg(long, env = "SETTINGS_DIR")]
    dir: Option<PathBuf>,

    /// Profile whose personal settings are loaded.
    #[arg(long, env = "SETTINGS_PROFILE")]
    profile: Option<String>,

    /// Password of an encrypted profile.  Without it the personal file is
    /// read and written in clear text.
    #[arg(long, env = "SETTINGS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print global and personal settings.
    Show,
    /// Create an empty clear-text personal file for --profile.
    Create,
    /// Set the alias of the contact with the given address.
    SetAlias { address: String, alias: String },
    /// Queue a pending contact request.
    AddRequest {
        address: String,
        #[arg(default_value = "")]
        message: String,
    },
    /// List pending contact requests.
    Requests,
    /// Add a circle.  An empty name is numbered automatically.
    AddCircle {
        #[arg(default_value = "")]
        name: String,
    },
    /// Remove a circle.  The last circle takes its index.
    RemoveCircle { index: usize },
    /// Configure the proxy.
    SetProxy {
        #[arg(value_enum)]
        kind: ProxyKind,
        #[arg(long, default_value = "")]
        host: String,
        #[arg(long, default_value_t = 0)]
        port: u16,
    },
    /// Store the global settings next to the executable (true) or in the user
    /// directory (false).
    Portable {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    /// Delete the personal file of --profile.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProxyKind {
    None,
    Socks5,
    Http,
}

impl From<ProxyKind> for ProxyType {
    fn from(kind: ProxyKind) -> Self {
        match kind {
            ProxyKind::None => ProxyType::None,
            ProxyKind::Socks5 => ProxyType::Socks5,
            ProxyKind::Http => ProxyType::Http,
        }
    }
}

impl Cli {
    /// Builds the profile named by `--profile`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if a password was given but no key can be derived.
    fn local_profile(&self) -> anyhow::Result<Option<LocalProfile>> {
        let Some(name) = self.profile.as_deref() else {
            return Ok(None);
        };
        let profile = match self.password.as_deref() {
            Some(password) => LocalProfile::with_password(name, password)
                .context("failed to derive profile passkey")?,
            None => LocalProfile::unencrypted(name),
        };
        Ok(Some(profile))
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = open_store(cli.dir.clone()).context("failed to open settings store")?;
    let profile = cli.local_profile()?;

    if let Command::Portable { enabled } = cli.command {
        store.set_make_portable(enabled);
        store.sync();
        info!(portable = enabled, dir = %store.settings_dir().display(), "portable mode updated");
        return Ok(());
    }

    let Some(profile) = profile else {
        if matches!(cli.command, Command::Show) {
            print_global(&store);
            return Ok(());
        }
        bail!("this command needs --profile");
    };

    if let Command::Create = cli.command {
        store
            .create_personal(&profile.name())
            .context("failed to create personal settings")?;
        return Ok(());
    }

    store.update_profile_data(Some(&profile))?;

    match cli.command {
        Command::Show => {
            print_global(&store);
            print_personal(&store);
        }
        Command::SetAlias { address, alias } => {
            let key = store
                .update_contact_address(&address)
                .context("invalid contact address")?;
            store.set_contact_alias(key, alias);
            store.save_contact(&key);
        }
        Command::AddRequest { address, message } => {
            if !store.add_friend_request(&address, &message) {
                info!(address = %address, "request already queued, message updated");
            }
            store.save_active_personal();
        }
        Command::Requests => {
            for (index, request) in store.friend_requests().iter().enumerate() {
                let marker = if request.read { ' ' } else { '*' };
                println!("{marker}{index:>3}  {}  {}", request.address, request.message);
            }
        }
        Command::AddCircle { name } => {
            let index = store.add_circle(&name);
            println!("{index}");
        }
        Command::RemoveCircle { index } => {
            let count = store.remove_circle(index)?;
            println!("{count} circle(s) left");
        }
        Command::SetProxy { kind, host, port } => {
            store.set_proxy_type(ProxyType::from(kind));
            store.set_proxy_addr(host);
            store.set_proxy_port(port);
            store.save_active_personal();
        }
        Command::Reset => store.reset_to_default(),
        Command::Create | Command::Portable { .. } => {}
    }

    store.sync();
    Ok(())
}

fn print_global(store: &SettingsStore) {
    println!("settings directory: {}", store.settings_dir().display());
    println!("portable:           {}", store.make_portable());
    println!("current profile:    {}", store.current_profile());
    println!("profile id:         {:08x}", store.current_profile_id());
    println!("translation:        {}", store.translation());
    println!("auto-away minutes:  {}", store.auto_away_time());
    println!("style:              {}", store.style());
}

fn print_personal(store: &SettingsStore) {
    let proxy = store.proxy();
    println!(
        "proxy:              {:?} {}:{}",
        proxy.proxy_type, proxy.proxy_addr, proxy.proxy_port
    );
    println!("logging enabled:    {}", store.enable_logging());
    println!("blocked addresses:  {}", store.block_list().len());

    let circles = store.circles();
    println!("circles ({}):", circles.len());
    for (index, circle) in circles.iter().enumerate() {
        println!("  {index:>3}  {}", circle.name);
    }

    let mut contacts = store.contacts();
    contacts.sort_by(|a, b| a.key().cmp(b.key()));
    println!("contacts ({}):", contacts.len());
    for contact in &contacts {
        let circle = contact
            .circle
            .and_then(|i| circles.get(i))
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        println!("  {}  {:<20}  {}", contact.key(), contact.alias, circle);
    }

    println!(
        "pending requests:   {} ({} unread)",
        store.friend_request_count(),
        store.unread_friend_requests()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_show_without_options() {
        let cli = Cli::parse_from(["settings-store", "show"]);
        assert!(matches!(cli.command, Command::Show));
        assert!(cli.profile.is_none());
    }

    #[test]
    fn test_cli_global_options_parse() {
        let cli = Cli::parse_from([
            "settings-store",
            "--dir",
            "/tmp/settings",
            "--profile",
            "alice",
            "requests",
        ]);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/settings")));
        assert_eq!(cli.profile.as_deref(), Some("alice"));
    }

    #[test]
    fn test_cli_set_proxy_parses_kind_and_port() {
        let cli = Cli::parse_from([
            "settings-store",
            "set-proxy",
            "socks5",
            "--host",
            "127.0.0.1",
            "--port",
            "9050",
        ]);
        match cli.command {
            Command::SetProxy { kind, host, port } => {
                assert_eq!(ProxyType::from(kind), ProxyType::Socks5);
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 9050);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_add_circle_name_defaults_to_empty() {
        let cli = Cli::parse_from(["settings-store", "add-circle"]);
        assert!(matches!(cli.command, Command::AddCircle { ref name } if name.is_empty()));
    }

    #[test]
    fn test_cli_portable_takes_explicit_bool() {
        let cli = Cli::parse_from(["settings-store", "portable", "false"]);
        assert!(matches!(cli.command, Command::Portable { enabled: false }));
    }

    #[test]
    fn test_local_profile_without_password_is_clear_text() {
        let cli = Cli::parse_from(["settings-store", "--profile", "bob", "show"]);
        let profile = cli.local_profile().unwrap().unwrap();
        assert!(!profile.is_encrypted());
    }
}
