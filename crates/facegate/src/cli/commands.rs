//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Photo containing exactly one face (webcam capture when omitted)
    #[arg(short, long, value_name = "PATH")]
    pub photo: Option<PathBuf>,

    /// Name of the person or pet (prompted when omitted)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Role to assign (prompted when omitted)
    #[arg(short, long)]
    pub role: Option<String>,
}

/// Recognize command arguments.
#[derive(Debug, Args)]
pub struct RecognizeCommand {
    /// Area the camera is watching
    pub area: String,
}

/// Role assignment commands.
#[derive(Debug, Subcommand)]
pub enum RolesCommand {
    /// List every name with its role
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Assign a role to a name
    Set {
        /// Registered name
        name: String,
        /// Role to assign
        role: String,
    },

    /// Forget a name: its role and its face crop
    Remove {
        /// Registered name
        name: String,
    },
}

/// Area list commands.
#[derive(Debug, Subcommand)]
pub enum AreasCommand {
    /// List the configured areas
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add an area
    Add {
        /// Area name
        area: String,
    },

    /// Remove an area and every permission for it
    Remove {
        /// Area name
        area: String,
    },
}

/// Access matrix commands.
#[derive(Debug, Subcommand)]
pub enum AccessCommand {
    /// Show which roles may enter which areas
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Allow a role in an area
    Grant {
        /// Role name
        role: String,
        /// Area name
        area: String,
    },

    /// Deny a role in an area
    Revoke {
        /// Role name
        role: String,
        /// Area name
        area: String,
    },
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl AccessCommand {
    /// The `(role, area, allowed)` change this command makes, if any.
    #[must_use]
    pub fn change(&self) -> Option<(&str, &str, bool)> {
        match self {
            Self::Show { .. } => None,
            Self::Grant { role, area } => Some((role, area, true)),
            Self::Revoke { role, area } => Some((role, area, false)),
        }
    }
}
