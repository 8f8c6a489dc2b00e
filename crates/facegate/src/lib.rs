//! `facegate` - Face registration, recognition and role-based area access
//!
//! This library registers faces from a webcam or photo, trains an LBPH
//! recognizer on them and checks recognized identities against a
//! role → area access matrix stored as JSON.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod access;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod menu;
pub mod registry;
pub mod session;
pub mod vision;

pub use access::{AccessPolicy, FaceVerdict, LabelMap, Prediction};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use menu::Menu;
pub use registry::Registry;
pub use session::{FaceActions, Session};
