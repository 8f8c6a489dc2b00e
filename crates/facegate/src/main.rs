//! `facegate` - CLI for facegate
//!
//! This binary runs the interactive menu or one of the non-interactive
//! registration, training, recognition and administration commands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;

use anyhow::{bail, Context};
use clap::Parser;

use facegate::cli::{
    AccessCommand, AreasCommand, Cli, Command, ConfigCommand, RecognizeCommand, RegisterCommand,
    RolesCommand,
};
use facegate::session::{CAPTURE_KEY, QUIT_KEY};
use facegate::{init_logging, Config, FaceActions, Menu, Registry, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.into_command() {
        Command::Menu => handle_menu(config),
        Command::Register(cmd) => handle_register(config, cmd),
        Command::Train => handle_train(config),
        Command::Recognize(cmd) => handle_recognize(config, &cmd),
        Command::Roles(cmd) => handle_roles(&config, cmd),
        Command::Areas(cmd) => handle_areas(&config, cmd),
        Command::Access(cmd) => handle_access(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn stdin_menu() -> Menu<io::StdinLock<'static>, io::Stdout> {
    Menu::new(io::stdin().lock(), io::stdout())
}

fn open_registry(config: &Config) -> anyhow::Result<Registry> {
    let data_dir = config.data_dir();
    Registry::open(&data_dir).with_context(|| format!("opening {}", data_dir.display()))
}

fn handle_menu(config: Config) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    stdin_menu().run(&mut session)?;
    Ok(())
}

fn handle_register(config: Config, cmd: RegisterCommand) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;

    let crop = match &cmd.photo {
        Some(path) => session.detect_in_photo(path)?,
        None => {
            println!("Press '{CAPTURE_KEY}' to capture a face or '{QUIT_KEY}' to quit.");
            match session.capture_from_webcam()? {
                Some(crop) => crop,
                None => {
                    println!("Face registration cancelled.");
                    return Ok(());
                }
            }
        }
    };

    let mut menu = stdin_menu();
    let name = match cmd.name {
        Some(name) => name,
        None => menu.ask_name()?.context("no name given")?,
    };
    let role = match cmd.role {
        Some(role) => role,
        None => menu.ask_role(&name)?.context("no role given")?,
    };

    session.enroll(&name, &role, &crop)?;
    println!("Registered {name} with role: {role}");
    Ok(())
}

fn handle_train(config: Config) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    session.train()?;
    println!("Training completed.");

    if let Some(recognizer) = session.recognizer() {
        let roles = &session.registry().roles;
        for (label, name) in recognizer.labels().iter() {
            println!("  {label:>3}  {name} ({})", roles.role_or_unknown(name));
        }
    }
    Ok(())
}

fn handle_recognize(config: Config, cmd: &RecognizeCommand) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    session.registry().require_area(&cmd.area)?;

    session.train()?;
    println!("Training completed.");
    println!("Press '{QUIT_KEY}' to quit live recognition.");
    session.recognize(&cmd.area)?;
    Ok(())
}

fn handle_roles(config: &Config, cmd: RolesCommand) -> anyhow::Result<()> {
    let mut registry = open_registry(config)?;
    match cmd {
        RolesCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&registry.roles)?);
            } else if registry.roles.is_empty() {
                println!("No roles assigned.");
            } else {
                for (name, role) in registry.roles.iter() {
                    println!("{name:<24} {role}");
                }
            }
        }
        RolesCommand::Set { name, role } => {
            registry.set_role(&name, &role)?;
            println!("{name} now has role: {role}");
        }
        RolesCommand::Remove { name } => {
            if registry.remove_identity(&name)? {
                println!("Removed {name}.");
            } else {
                bail!("{name} is not registered");
            }
        }
    }
    Ok(())
}

fn handle_areas(config: &Config, cmd: AreasCommand) -> anyhow::Result<()> {
    let mut registry = open_registry(config)?;
    match cmd {
        AreasCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&registry.areas)?);
            } else if registry.areas.is_empty() {
                println!("No areas configured.");
            } else {
                for area in registry.areas.names() {
                    println!("{area}");
                }
            }
        }
        AreasCommand::Add { area } => {
            if registry.add_area(&area)? {
                println!("Added area {area}.");
            } else {
                println!("Area {area} already exists.");
            }
        }
        AreasCommand::Remove { area } => {
            if registry.remove_area(&area)? {
                println!("Removed area {area}.");
            } else {
                bail!("unknown area {area}");
            }
        }
    }
    Ok(())
}

fn handle_access(config: &Config, cmd: &AccessCommand) -> anyhow::Result<()> {
    let mut registry = open_registry(config)?;

    if let Some((role, area, allowed)) = cmd.change() {
        registry.set_access(role, area, allowed)?;
        let verdict = if allowed { "allowed" } else { "denied" };
        println!("{role} is now {verdict} in {area}.");
        return Ok(());
    }

    if matches!(cmd, AccessCommand::Show { json: true }) {
        println!("{}", serde_json::to_string_pretty(&registry.access)?);
    } else if registry.access.is_empty() {
        println!("No access rules. Every role is denied everywhere.");
    } else {
        println!("{:<16} {:<16} ACCESS", "ROLE", "AREA");
        for (role, area, allowed) in registry.access.iter() {
            let verdict = if allowed { "allowed" } else { "denied" };
            println!("{role:<16} {area:<16} {verdict}");
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!();
                println!("[Detection]");
                match &config.detection.cascade_path {
                    Some(path) => println!("  Cascade:            {}", path.display()),
                    None => println!("  Cascade:            (OpenCV default)"),
                }
                println!("  Scale factor:       {}", config.detection.scale_factor);
                println!("  Min neighbors:      {}", config.detection.min_neighbors);
                println!("  Min face size:      {}", config.detection.min_face_size);
                println!();
                println!("[Recognition]");
                println!(
                    "  Threshold:          {}",
                    config.recognition.confidence_threshold
                );
                println!("  Face size:          {}", config.recognition.face_size);
                println!(
                    "  LBPH:               radius {}, neighbors {}, grid {}x{}",
                    config.recognition.radius,
                    config.recognition.neighbors,
                    config.recognition.grid_x,
                    config.recognition.grid_y
                );
                println!();
                println!("[Camera]");
                println!("  Device index:       {}", config.camera.device_index);
                println!("  Frame delay (ms):   {}", config.camera.frame_delay_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
