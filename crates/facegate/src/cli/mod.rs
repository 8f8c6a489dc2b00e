//! Command-line interface for facegate.
//!
//! This module provides the CLI structure for the `facegate` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AccessCommand, AreasCommand, ConfigCommand, RecognizeCommand, RegisterCommand, RolesCommand,
};

use crate::logging::Verbosity;

/// facegate - Face registration and role-based area access
///
/// Registers faces from a webcam or photo, trains an LBPH recognizer on them
/// and watches a camera, warning when a recognized role is not allowed in
/// the area the camera covers. Without a command the interactive menu runs.
#[derive(Debug, Parser)]
#[command(name = "facegate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the interactive menu (default)
    Menu,

    /// Register a face from the webcam or a photo
    Register(RegisterCommand),

    /// Train the recognizer and list the learned identities
    Train,

    /// Train, then watch the webcam for one area
    Recognize(RecognizeCommand),

    /// Manage name to role assignments
    #[command(subcommand)]
    Roles(RolesCommand),

    /// Manage the list of areas
    #[command(subcommand)]
    Areas(AreasCommand),

    /// Manage which roles may enter which areas
    #[command(subcommand)]
    Access(AccessCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                2 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        }
    }

    /// The command to run, defaulting to the menu.
    #[must_use]
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Menu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: None,
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "facegate");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Debug);
        assert_eq!(cli(5, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_default_command_is_menu() {
        let cli = Cli::try_parse_from(["facegate"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(cli.into_command(), Command::Menu));
    }

    #[test]
    fn test_parse_menu() {
        let cli = Cli::try_parse_from(["facegate", "menu"]).unwrap();
        assert!(matches!(cli.into_command(), Command::Menu));
    }

    #[test]
    fn test_parse_register_photo() {
        let cli = Cli::try_parse_from([
            "facegate", "register", "--photo", "me.jpg", "--name", "Alice", "--role", "Parent",
        ])
        .unwrap();
        let Some(Command::Register(cmd)) = cli.command else {
            panic!("expected register");
        };
        assert_eq!(cmd.photo, Some(PathBuf::from("me.jpg")));
        assert_eq!(cmd.name.as_deref(), Some("Alice"));
        assert_eq!(cmd.role.as_deref(), Some("Parent"));
    }

    #[test]
    fn test_parse_register_webcam() {
        let cli = Cli::try_parse_from(["facegate", "register"]).unwrap();
        let Some(Command::Register(cmd)) = cli.command else {
            panic!("expected register");
        };
        assert!(cmd.photo.is_none());
        assert!(cmd.name.is_none());
    }

    #[test]
    fn test_parse_train() {
        let cli = Cli::try_parse_from(["facegate", "train"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Train)));
    }

    #[test]
    fn test_parse_recognize() {
        let cli = Cli::try_parse_from(["facegate", "recognize", "Garage"]).unwrap();
        let Some(Command::Recognize(cmd)) = cli.command else {
            panic!("expected recognize");
        };
        assert_eq!(cmd.area, "Garage");
    }

    #[test]
    fn test_recognize_requires_area() {
        assert!(Cli::try_parse_from(["facegate", "recognize"]).is_err());
    }

    #[test]
    fn test_parse_roles() {
        let cli = Cli::try_parse_from(["facegate", "roles", "set", "Rex", "Pet"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Roles(RolesCommand::Set { .. }))
        ));

        let cli = Cli::try_parse_from(["facegate", "roles", "list", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Roles(RolesCommand::List { json: true }))
        ));
    }

    #[test]
    fn test_parse_areas() {
        let cli = Cli::try_parse_from(["facegate", "areas", "remove", "Attic"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Areas(AreasCommand::Remove { .. }))
        ));
    }

    #[test]
    fn test_parse_access() {
        let cli = Cli::try_parse_from(["facegate", "access", "grant", "Child", "Garage"]).unwrap();
        let Some(Command::Access(AccessCommand::Grant { role, area })) = cli.command else {
            panic!("expected access grant");
        };
        assert_eq!((role.as_str(), area.as_str()), ("Child", "Garage"));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["facegate", "config", "validate", "--file", "/tmp/c.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand::Validate { file: Some(_) }))
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["facegate", "-c", "/custom/config.toml", "train"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from(["facegate", "train", "-vv", "-q"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.quiet);
    }
}
