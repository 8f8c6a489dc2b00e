//! The interactive text menu.
//!
//! The menu reads answers line by line from any [`BufRead`] and writes
//! prompts to any [`Write`], so it can be driven by a terminal or a test.
//! Errors raised by an action are printed and the menu carries on; only
//! failures to talk to the terminal end it.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{format_areas, Result};
use crate::session::{FaceActions, CAPTURE_KEY, QUIT_KEY};

/// An option of the main menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Register a face.
    Register,
    /// Train the recognizer.
    Train,
    /// Run live recognition.
    Recognize,
    /// Leave the program.
    Exit,
}

impl MenuChoice {
    /// Parse an answer to the main menu prompt.
    #[must_use]
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim() {
            "1" => Some(Self::Register),
            "2" => Some(Self::Train),
            "3" => Some(Self::Recognize),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Where a face to register comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Webcam,
    Photo,
}

/// Prompts and answers over a pair of streams.
#[derive(Debug)]
pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Create a menu over `input` and `output`.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Give back the output stream.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the main loop until the user exits or input ends.
    ///
    /// # Errors
    ///
    /// Returns an error only if the streams fail.
    pub fn run<A: FaceActions>(&mut self, actions: &mut A) -> Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "Choose an option:")?;
            writeln!(self.output, "1. Register Faces")?;
            writeln!(self.output, "2. Train Recognizer")?;
            writeln!(self.output, "3. Recognize Faces")?;
            writeln!(self.output, "4. Exit")?;

            let Some(answer) = self.prompt("Enter your choice (1/2/3/4): ")? else {
                debug!("Input closed, leaving menu");
                return Ok(());
            };

            let outcome = match MenuChoice::parse(&answer) {
                Some(MenuChoice::Register) => self.register(actions),
                Some(MenuChoice::Train) => self.train(actions),
                Some(MenuChoice::Recognize) => self.recognize(actions),
                Some(MenuChoice::Exit) => {
                    writeln!(self.output, "Exiting program.")?;
                    return Ok(());
                }
                None => {
                    writeln!(self.output, "Invalid choice. Please try again.")?;
                    Ok(Flow::Continue)
                }
            };

            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => return Ok(()),
                Err(e) if e.is_recoverable() => {
                    warn!("Action failed: {:?}", e);
                    writeln!(self.output, "{e}")?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Ask for the name and role of the person being registered.
    ///
    /// Returns `None` if input ends first.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn ask_identity(&mut self) -> Result<Option<(String, String)>> {
        let Some(name) = self.ask_name()? else {
            return Ok(None);
        };
        let Some(role) = self.ask_role(&name)? else {
            return Ok(None);
        };
        Ok(Some((name, role)))
    }

    /// Ask for the name of the person being registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn ask_name(&mut self) -> Result<Option<String>> {
        self.prompt("Enter the name of the person or pet: ")
    }

    /// Ask for the role of `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn ask_role(&mut self, name: &str) -> Result<Option<String>> {
        self.prompt(&format!(
            "Assign a role for {name} (e.g., Admin, Parent, Child, Pet): "
        ))
    }

    /// Print `text` and read one trimmed line. `None` on end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the streams fail.
    pub fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn register<A: FaceActions>(&mut self, actions: &mut A) -> Result<Flow> {
        writeln!(self.output, "Choose an option to register a face:")?;
        writeln!(self.output, "1. Capture face using webcam")?;
        writeln!(self.output, "2. Upload photo file")?;

        let Some(answer) = self.prompt("Enter your choice (1/2): ")? else {
            return Ok(Flow::Stop);
        };
        let source = match answer.as_str() {
            "1" => Source::Webcam,
            "2" => Source::Photo,
            _ => {
                writeln!(self.output, "Invalid choice. Returning to the main menu.")?;
                return Ok(Flow::Continue);
            }
        };

        let crop = match source {
            Source::Webcam => {
                writeln!(
                    self.output,
                    "Press '{CAPTURE_KEY}' to capture a face or '{QUIT_KEY}' to quit."
                )?;
                match actions.capture_from_webcam()? {
                    Some(crop) => crop,
                    None => {
                        writeln!(self.output, "Face registration cancelled.")?;
                        return Ok(Flow::Continue);
                    }
                }
            }
            Source::Photo => {
                let Some(path) = self.prompt("Enter the file path of the photo: ")? else {
                    return Ok(Flow::Stop);
                };
                actions.detect_in_photo(&PathBuf::from(path))?
            }
        };

        let Some((name, role)) = self.ask_identity()? else {
            return Ok(Flow::Stop);
        };
        actions.enroll(&name, &role, &crop)?;
        writeln!(self.output, "Registered {name} with role: {role}")?;
        Ok(Flow::Continue)
    }

    fn train<A: FaceActions>(&mut self, actions: &mut A) -> Result<Flow> {
        actions.train()?;
        writeln!(self.output, "Training completed.")?;
        Ok(Flow::Continue)
    }

    fn recognize<A: FaceActions>(&mut self, actions: &mut A) -> Result<Flow> {
        let areas = actions.areas();
        let question = format!(
            "Enter the name of the camera (choose from {}): ",
            format_areas(&areas)
        );
        let Some(area) = self.prompt(&question)? else {
            return Ok(Flow::Stop);
        };

        if !actions.has_registered_faces()? {
            writeln!(
                self.output,
                "No registered faces found. Please register faces first."
            )?;
            return Ok(Flow::Continue);
        }

        self.train(actions)?;
        if areas.contains(&area) {
            writeln!(self.output, "Press '{QUIT_KEY}' to quit live recognition.")?;
        }
        actions.recognize(&area)?;
        Ok(Flow::Continue)
    }
}

/// Whether the main loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::Path;

    use super::*;
    use crate::error::Error;

    /// Records calls instead of touching a camera.
    #[derive(Debug, Default)]
    struct FakeActions {
        calls: Vec<String>,
        webcam_crop: Option<u8>,
        faces: bool,
        areas: Vec<String>,
        enrolled: Vec<(String, String, u8)>,
    }

    impl FaceActions for FakeActions {
        type Crop = u8;

        fn capture_from_webcam(&mut self) -> Result<Option<u8>> {
            self.calls.push("webcam".to_string());
            Ok(self.webcam_crop)
        }

        fn detect_in_photo(&mut self, path: &Path) -> Result<u8> {
            self.calls.push(format!("photo {}", path.display()));
            if path == Path::new("group.jpg") {
                return Err(Error::FaceCount { found: 3 });
            }
            Ok(7)
        }

        fn enroll(&mut self, name: &str, role: &str, crop: &u8) -> Result<()> {
            self.calls.push("enroll".to_string());
            self.enrolled.push((name.to_string(), role.to_string(), *crop));
            self.faces = true;
            Ok(())
        }

        fn train(&mut self) -> Result<usize> {
            self.calls.push("train".to_string());
            if self.faces {
                Ok(1)
            } else {
                Err(Error::NoRegisteredFaces)
            }
        }

        fn recognize(&mut self, area: &str) -> Result<()> {
            self.calls.push(format!("recognize {area}"));
            if self.areas.iter().any(|a| a == area) {
                Ok(())
            } else {
                Err(Error::unknown_area(area, &self.areas))
            }
        }

        fn areas(&self) -> Vec<String> {
            self.areas.clone()
        }

        fn has_registered_faces(&self) -> Result<bool> {
            Ok(self.faces)
        }
    }

    fn run(input: &str, actions: &mut FakeActions) -> String {
        let mut menu = Menu::new(Cursor::new(input.to_string()), Vec::new());
        menu.run(actions).unwrap();
        String::from_utf8(menu.into_output()).unwrap()
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Register));
        assert_eq!(MenuChoice::parse(" 3 "), Some(MenuChoice::Recognize));
        assert_eq!(MenuChoice::parse("4"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("5"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn test_exit() {
        let mut actions = FakeActions::default();
        let output = run("4\n", &mut actions);

        assert!(output.contains("1. Register Faces"));
        assert!(output.ends_with("Exiting program.\n"));
        assert!(actions.calls.is_empty());
    }

    #[test]
    fn test_end_of_input_exits() {
        let mut actions = FakeActions::default();
        let output = run("", &mut actions);
        assert!(!output.contains("Exiting program."));
    }

    #[test]
    fn test_invalid_choice_keeps_looping() {
        let mut actions = FakeActions::default();
        let output = run("9\n4\n", &mut actions);

        assert!(output.contains("Invalid choice. Please try again."));
        assert_eq!(output.matches("Choose an option:").count(), 2);
    }

    #[test]
    fn test_register_from_photo() {
        let mut actions = FakeActions::default();
        let output = run("1\n2\nalice.jpg\nAlice\nParent\n4\n", &mut actions);

        assert_eq!(actions.calls, vec!["photo alice.jpg", "enroll"]);
        assert_eq!(
            actions.enrolled,
            vec![("Alice".to_string(), "Parent".to_string(), 7)]
        );
        assert!(output.contains("Assign a role for Alice (e.g., Admin, Parent, Child, Pet): "));
        assert!(output.contains("Registered Alice with role: Parent"));
    }

    #[test]
    fn test_register_from_webcam() {
        let mut actions = FakeActions {
            webcam_crop: Some(9),
            ..FakeActions::default()
        };
        let output = run("1\n1\nRex\nPet\n4\n", &mut actions);

        assert!(output.contains("Press 'c' to capture a face or 'q' to quit."));
        assert_eq!(actions.enrolled[0].2, 9);
        assert!(output.contains("Registered Rex with role: Pet"));
    }

    #[test]
    fn test_register_cancelled() {
        let mut actions = FakeActions::default();
        let output = run("1\n1\n4\n", &mut actions);

        assert!(output.contains("Face registration cancelled."));
        assert!(actions.enrolled.is_empty());
        assert!(output.ends_with("Exiting program.\n"));
    }

    #[test]
    fn test_register_invalid_source() {
        let mut actions = FakeActions::default();
        let output = run("1\n3\n4\n", &mut actions);

        assert!(output.contains("Invalid choice. Returning to the main menu."));
        assert!(actions.calls.is_empty());
    }

    #[test]
    fn test_register_error_is_reported() {
        let mut actions = FakeActions::default();
        let output = run("1\n2\ngroup.jpg\n4\n", &mut actions);

        assert!(output.contains("Please ensure the photo contains exactly one face"));
        assert!(actions.enrolled.is_empty());
        assert!(output.ends_with("Exiting program.\n"));
    }

    #[test]
    fn test_train_without_faces() {
        let mut actions = FakeActions::default();
        let output = run("2\n4\n", &mut actions);

        assert!(output.contains("No registered faces to train."));
        assert!(!output.contains("Training completed."));
    }

    #[test]
    fn test_train() {
        let mut actions = FakeActions {
            faces: true,
            ..FakeActions::default()
        };
        let output = run("2\n4\n", &mut actions);
        assert!(output.contains("Training completed."));
    }

    #[test]
    fn test_recognize_without_faces() {
        let mut actions = FakeActions {
            areas: vec!["Kitchen".to_string()],
            ..FakeActions::default()
        };
        let output = run("3\nKitchen\n4\n", &mut actions);

        assert!(output.contains("Enter the name of the camera (choose from ['Kitchen']): "));
        assert!(output.contains("No registered faces found. Please register faces first."));
        assert!(actions.calls.is_empty());
    }

    #[test]
    fn test_recognize_trains_first() {
        let mut actions = FakeActions {
            faces: true,
            areas: vec!["Kitchen".to_string()],
            ..FakeActions::default()
        };
        let output = run("3\nKitchen\n4\n", &mut actions);

        assert_eq!(actions.calls, vec!["train", "recognize Kitchen"]);
        assert!(output.contains("Training completed."));
        assert!(output.contains("Press 'q' to quit live recognition."));
    }

    #[test]
    fn test_recognize_unknown_area() {
        let mut actions = FakeActions {
            faces: true,
            areas: vec!["Kitchen".to_string(), "Garage".to_string()],
            ..FakeActions::default()
        };
        let output = run("3\nAttic\n4\n", &mut actions);

        assert!(output.contains("Invalid camera name. Please choose from ['Kitchen', 'Garage']."));
        assert!(!output.contains("Press 'q'"));
        assert!(output.ends_with("Exiting program.\n"));
    }
}
