//! The register, train and recognize actions.
//!
//! A [`Session`] owns the loaded registry plus the lazily loaded detector and
//! the most recently trained recognizer. Devices and windows only live for
//! the duration of one action.

use std::path::Path;

use opencv::core::{Mat, Rect};
use tracing::{debug, info, warn};

use crate::access::{annotate_frame, annotate_registration, AccessPolicy, FaceVerdict};
use crate::config::{Config, DetectionConfig};
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::vision::image::{crop, read_gray, to_gray, write_image};
use crate::vision::{draw_overlay, Camera, FaceDetector, Recognizer, Window};

/// Key that captures the single visible face while registering.
pub const CAPTURE_KEY: char = 'c';

/// Key that leaves a capture loop.
pub const QUIT_KEY: char = 'q';

/// Title of the registration preview.
pub const REGISTER_WINDOW: &str = "Register Face";

/// Title of the recognition preview.
pub const RECOGNIZE_WINDOW: &str = "Live Face Recognition";

/// What the interactive menu needs from the application.
pub trait FaceActions {
    /// A captured face crop, ready to be enrolled.
    type Crop;

    /// Show the webcam until a single face is captured or the user quits.
    ///
    /// Returns `None` when the user quits without capturing.
    ///
    /// # Errors
    ///
    /// Returns an error if the camera, cascade or window fails.
    fn capture_from_webcam(&mut self) -> Result<Option<Self::Crop>>;

    /// Cut the single face out of a photo file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PhotoNotFound`] or [`Error::FaceCount`] for unusable
    /// photos, or a vision error.
    fn detect_in_photo(&mut self, path: &Path) -> Result<Self::Crop>;

    /// Store the crop and role of `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or a file cannot be written.
    fn enroll(&mut self, name: &str, role: &str, crop: &Self::Crop) -> Result<()>;

    /// Train the recognizer on every stored crop. Returns the number of
    /// identities learned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoRegisteredFaces`] when nothing can be trained on.
    fn train(&mut self) -> Result<usize>;

    /// Run live recognition for `area` until the user quits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownArea`], [`Error::NotTrained`] or a vision error.
    fn recognize(&mut self, area: &str) -> Result<()>;

    /// Names of the configured areas.
    fn areas(&self) -> Vec<String>;

    /// Whether any face crop is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the crop directory cannot be listed.
    fn has_registered_faces(&self) -> Result<bool>;
}

/// Application state shared by the menu and the subcommands.
#[derive(Debug)]
pub struct Session {
    config: Config,
    registry: Registry,
    detector: Option<FaceDetector>,
    recognizer: Option<Recognizer>,
}

impl Session {
    /// Create a session over an already opened registry.
    #[must_use]
    pub fn new(config: Config, registry: Registry) -> Self {
        Self {
            config,
            registry,
            detector: None,
            recognizer: None,
        }
    }

    /// Open the registry in the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be loaded.
    pub fn open(config: Config) -> Result<Self> {
        let registry = Registry::open(config.data_dir())?;
        Ok(Self::new(config, registry))
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The loaded registry.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access to the registry.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The recognizer from the last successful training, if any.
    #[must_use]
    pub fn recognizer(&self) -> Option<&Recognizer> {
        self.recognizer.as_ref()
    }

    fn detect_faces(&mut self, gray: &Mat) -> Result<Vec<Rect>> {
        load_detector(&mut self.detector, &self.config.detection)?.detect(gray)
    }
}

fn load_detector<'a>(
    slot: &'a mut Option<FaceDetector>,
    config: &DetectionConfig,
) -> Result<&'a mut FaceDetector> {
    let detector = match slot.take() {
        Some(detector) => detector,
        None => FaceDetector::load(config)?,
    };
    Ok(slot.insert(detector))
}

impl FaceActions for Session {
    type Crop = Mat;

    fn capture_from_webcam(&mut self) -> Result<Option<Mat>> {
        let detector = load_detector(&mut self.detector, &self.config.detection)?;
        let mut camera = Camera::open(self.config.camera.device_index)?;
        let window = Window::open(REGISTER_WINDOW, self.config.frame_delay())?;

        loop {
            let mut frame = camera.read()?;
            let gray = to_gray(&frame)?;
            let faces = detector.detect(&gray)?;

            draw_overlay(&mut frame, &annotate_registration(&faces))?;
            window.show(&frame)?;

            match window.poll_key()? {
                Some(CAPTURE_KEY) => match faces.as_slice() {
                    [face] => {
                        debug!("Captured face at {:?}", face);
                        return Ok(Some(crop(&gray, *face)?));
                    }
                    _ => debug!("Ignoring capture with {} faces in view", faces.len()),
                },
                Some(QUIT_KEY) => return Ok(None),
                _ => {}
            }
        }
    }

    fn detect_in_photo(&mut self, path: &Path) -> Result<Mat> {
        if !path.is_file() {
            return Err(Error::PhotoNotFound {
                path: path.to_path_buf(),
            });
        }

        let gray = read_gray(path)?;
        let faces = self.detect_faces(&gray)?;
        match faces.as_slice() {
            [face] => crop(&gray, *face),
            _ => Err(Error::FaceCount { found: faces.len() }),
        }
    }

    fn enroll(&mut self, name: &str, role: &str, crop: &Mat) -> Result<()> {
        let path = self.registry.faces.crop_path(name)?;
        let previous = self.registry.roles.role_of(name).map(str::to_string);
        self.registry.set_role(name, role)?;

        if let Err(e) = write_image(&path, crop) {
            match previous {
                Some(previous) => self.registry.roles.assign(name, previous),
                None => {
                    self.registry.roles.remove(name);
                }
            }
            if let Err(undo) = self.registry.save_roles() {
                warn!("Failed to restore role of {}: {}", name, undo);
            }
            return Err(e);
        }

        info!("Enrolled {} as {} ({})", name, role, path.display());
        Ok(())
    }

    fn train(&mut self) -> Result<usize> {
        let mut samples = Vec::new();
        for stored in self.registry.faces.list()? {
            match read_gray(&stored.path) {
                Ok(image) => samples.push((stored.name, image)),
                Err(e) => warn!("Skipping crop {}: {}", stored.path.display(), e),
            }
        }

        let recognizer = Recognizer::train(&self.config.recognition, samples)?;
        let identities = recognizer.labels().len();
        self.recognizer = Some(recognizer);
        Ok(identities)
    }

    fn recognize(&mut self, area: &str) -> Result<()> {
        self.registry.require_area(area)?;
        let recognizer = self.recognizer.as_ref().ok_or(Error::NotTrained)?;
        let detector = load_detector(&mut self.detector, &self.config.detection)?;

        let policy = AccessPolicy::new(
            &self.registry.roles,
            &self.registry.access,
            area,
            self.config.recognition.confidence_threshold,
        );

        let mut camera = Camera::open(self.config.camera.device_index)?;
        let window = Window::open(RECOGNIZE_WINDOW, self.config.frame_delay())?;
        info!("Watching area {}", area);

        loop {
            let mut frame = camera.read()?;
            let gray = to_gray(&frame)?;

            let mut verdicts: Vec<(Rect, FaceVerdict)> = Vec::new();
            for rect in detector.detect(&gray)? {
                let prediction = recognizer.predict(&crop(&gray, rect)?)?;
                let verdict = policy.classify(recognizer.labels(), prediction);
                if verdict.is_denied() {
                    debug!("Denied face in {}: {:?}", area, verdict);
                }
                verdicts.push((rect, verdict));
            }

            draw_overlay(&mut frame, &annotate_frame(policy.area(), &verdicts))?;
            window.show(&frame)?;

            if window.poll_key()? == Some(QUIT_KEY) {
                return Ok(());
            }
        }
    }

    fn areas(&self) -> Vec<String> {
        self.registry.areas.names().to_vec()
    }

    fn has_registered_faces(&self) -> Result<bool> {
        Ok(!self.registry.faces.is_empty()?)
    }
}
