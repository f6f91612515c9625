use serde::{Deserialize, Serialize};

/// A single landmark in normalized image space ([0,1] on x and y).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point3D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// The landmark set of one detected face, in the face-mesh ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks {
    pub points: Vec<Point3D>,
}

impl Landmarks {
    pub fn new(points: Vec<Point3D>) -> Self {
        Self { points }
    }

    pub fn get(&self, index: usize) -> Option<&Point3D> {
        self.points.get(index)
    }
}

/// What the landmark source delivers for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    #[serde(default)]
    pub faces: Vec<Landmarks>,
}

impl LandmarkFrame {
    pub fn no_face() -> Self {
        Self { faces: Vec::new() }
    }

    pub fn with_face(landmarks: Landmarks) -> Self {
        Self { faces: vec![landmarks] }
    }

    /// Only the first face is ever consumed.
    pub fn primary_face(&self) -> Option<&Landmarks> {
        self.faces.first()
    }
}

/// Estimated point of regard, the midpoint of both iris centers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GazePoint {
    pub x: f32,
    pub y: f32,
}

impl GazePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Gaze in grid space. Clamped into the unit square once a baseline exists.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedGaze {
    pub x: f32,
    pub y: f32,
}
