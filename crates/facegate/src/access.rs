//! Turning recognizer output into access decisions and overlay annotations.
//!
//! Nothing here touches a camera or a window; the vision module draws what
//! this module decides.

use opencv::core::{Point, Rect};

use crate::registry::{AccessMatrix, RoleBook};

/// Text shown for faces that could not be identified.
pub const UNKNOWN_FACE: &str = "Unknown";

/// A BGR color, the channel order OpenCV draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bgr(pub u8, pub u8, pub u8);

impl Bgr {
    /// Boxes around faces seen while registering.
    pub const BLUE: Self = Self(255, 0, 0);
    /// Recognized faces.
    pub const GREEN: Self = Self(0, 255, 0);
    /// Unknown faces and access warnings.
    pub const RED: Self = Self(0, 0, 255);
    /// The camera banner.
    pub const WHITE: Self = Self(255, 255, 255);
}

/// Integer labels the recognizer is trained with, one per identity.
///
/// Labels are assigned in the order names are given, starting at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    names: Vec<String>,
}

impl LabelMap {
    /// Assign labels to `names`. Repeated names keep their first label.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for name in names {
            map.insert(name.into());
        }
        map
    }

    /// Label of `name`, assigning the next free one if it is new.
    pub fn insert(&mut self, name: String) -> i32 {
        if let Some(label) = self.label_of(&name) {
            return label;
        }
        self.names.push(name);
        index_to_label(self.names.len() - 1)
    }

    /// Label of `name`, if known.
    #[must_use]
    pub fn label_of(&self, name: &str) -> Option<i32> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(index_to_label)
    }

    /// Name behind `label`, if any.
    #[must_use]
    pub fn name_of(&self, label: i32) -> Option<&str> {
        usize::try_from(label)
            .ok()
            .and_then(|i| self.names.get(i))
            .map(String::as_str)
    }

    /// Number of identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no identities are labelled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(label, name)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (index_to_label(i), n.as_str()))
    }
}

fn index_to_label(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}

/// Raw recognizer output. Lower confidence means a closer match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted label.
    pub label: i32,
    /// Histogram distance to the closest training sample.
    pub confidence: f64,
}

/// What was decided about one face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceVerdict {
    /// A registered identity.
    Known {
        /// Identity name.
        name: String,
        /// Its role, or the unknown-role placeholder.
        role: String,
        /// Whether the role may be in the current area.
        allowed: bool,
    },
    /// Not close enough to any registered identity.
    Unknown,
}

impl FaceVerdict {
    /// Whether this face should raise a warning.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Known { allowed: false, .. })
    }
}

/// Everything needed to judge faces seen by one camera.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy<'a> {
    roles: &'a RoleBook,
    access: &'a AccessMatrix,
    area: &'a str,
    threshold: f64,
}

impl<'a> AccessPolicy<'a> {
    /// Build a policy for `area`.
    #[must_use]
    pub fn new(roles: &'a RoleBook, access: &'a AccessMatrix, area: &'a str, threshold: f64) -> Self {
        Self {
            roles,
            access,
            area,
            threshold,
        }
    }

    /// The area being watched.
    #[must_use]
    pub fn area(&self) -> &str {
        self.area
    }

    /// Decide on one prediction.
    ///
    /// A face is known only when its confidence is strictly below the
    /// threshold and its label belongs to a trained identity.
    #[must_use]
    pub fn classify(&self, labels: &LabelMap, prediction: Prediction) -> FaceVerdict {
        if prediction.confidence >= self.threshold {
            return FaceVerdict::Unknown;
        }
        let Some(name) = labels.name_of(prediction.label) else {
            return FaceVerdict::Unknown;
        };

        let role = self.roles.role_or_unknown(name);
        FaceVerdict::Known {
            name: name.to_string(),
            role: role.to_string(),
            allowed: self.access.is_allowed(role, self.area),
        }
    }
}

/// A piece of text to draw on a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// The text.
    pub text: String,
    /// Bottom-left corner of the text.
    pub origin: Point,
    /// Text color.
    pub color: Bgr,
}

/// Boxes and text to draw on one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOverlay {
    /// Face rectangles with their colors.
    pub boxes: Vec<(Rect, Bgr)>,
    /// Text annotations, drawn after the boxes.
    pub texts: Vec<Annotation>,
}

/// Where the access warning is drawn.
pub const WARNING_ORIGIN: Point = Point { x: 100, y: 50 };

/// Where the camera banner is drawn.
pub const BANNER_ORIGIN: Point = Point { x: 10, y: 30 };

/// Vertical gap between a face box and its label.
const LABEL_OFFSET: i32 = 10;

/// Build the overlay for a recognition frame.
#[must_use]
pub fn annotate_frame(area: &str, faces: &[(Rect, FaceVerdict)]) -> FrameOverlay {
    let mut overlay = FrameOverlay::default();
    let mut warnings: Vec<String> = Vec::new();

    for (rect, verdict) in faces {
        let (text, color) = match verdict {
            FaceVerdict::Known { name, role, allowed } => {
                if !allowed {
                    let warning = format!("WARNING: {role} not allowed in {area}!");
                    if !warnings.contains(&warning) {
                        warnings.push(warning);
                    }
                }
                (format!("{name} ({role})"), Bgr::GREEN)
            }
            FaceVerdict::Unknown => (UNKNOWN_FACE.to_string(), Bgr::RED),
        };

        overlay.boxes.push((*rect, color));
        overlay.texts.push(Annotation {
            text,
            origin: Point::new(rect.x, rect.y - LABEL_OFFSET),
            color,
        });
    }

    overlay
        .texts
        .extend(warnings.into_iter().map(|text| Annotation {
            text,
            origin: WARNING_ORIGIN,
            color: Bgr::RED,
        }));
    overlay.texts.push(Annotation {
        text: format!("Camera: {area}"),
        origin: BANNER_ORIGIN,
        color: Bgr::WHITE,
    });

    overlay
}

/// Build the overlay for a registration frame: blue boxes only.
#[must_use]
pub fn annotate_registration(faces: &[Rect]) -> FrameOverlay {
    FrameOverlay {
        boxes: faces.iter().map(|r| (*r, Bgr::BLUE)).collect(),
        texts: Vec::new(),
    }
}
