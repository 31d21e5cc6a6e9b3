use cone_core::nalgebra::Point3;
use cone_core::{CameraPose, FinalPosition};
use ply_rs::{
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use std::io::{self, Write};

pub const OBSERVED_COLOR: [u8; 3] = [0, 0, 255];
pub const PREDICTED_COLOR: [u8; 3] = [255, 0, 0];
pub const CAMERA_COLOR: [u8; 3] = [255, 0, 255];

/// Writes reconstructed positions and the cameras that saw them as an ASCII PLY point cloud.
///
/// Observed positions are blue, predicted positions red and cameras magenta. Each camera is
/// drawn as its optical center plus the four corners of a small frustum in front of it, and
/// optionally the four triangles connecting them.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct PlyExport {
    camera_faces: bool,
    frustum_size: f64,
}

impl PlyExport {
    /// Creates a `PlyExport` with default values.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Emit face elements for the camera frustums.
    ///
    /// Default is `true`.
    #[must_use]
    pub fn camera_faces(self, camera_faces: bool) -> Self {
        Self {
            camera_faces,
            ..self
        }
    }

    /// Set the depth and half width of the camera frustums in meters.
    ///
    /// Default is `0.1`.
    #[must_use]
    pub fn frustum_size(self, frustum_size: f64) -> Self {
        Self {
            frustum_size,
            ..self
        }
    }

    /// Writes the point cloud and returns the number of bytes written.
    pub fn write(
        &self,
        mut writer: impl Write,
        positions: &[FinalPosition],
        cameras: &[CameraPose],
    ) -> io::Result<usize> {
        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = Encoding::Ascii;
        ply.header
            .comments
            .push("LED positions reconstructed by cone-reconstruction".to_string());

        let mut vertex_element = ElementDef::new("vertex".to_string());
        for (name, scalar) in [
            ("x", ScalarType::Double),
            ("y", ScalarType::Double),
            ("z", ScalarType::Double),
            ("red", ScalarType::UChar),
            ("green", ScalarType::UChar),
            ("blue", ScalarType::UChar),
        ] {
            vertex_element
                .properties
                .add(PropertyDef::new(name.to_string(), PropertyType::Scalar(scalar)));
        }
        ply.header.elements.add(vertex_element);

        if self.camera_faces {
            let mut face_element = ElementDef::new("face".to_string());
            face_element.properties.add(PropertyDef::new(
                "vertex_index".to_string(),
                PropertyType::List(ScalarType::UChar, ScalarType::Int),
            ));
            ply.header.elements.add(face_element);
        }

        let mut vertices: Vec<DefaultElement> = vec![];
        let mut faces: Vec<DefaultElement> = vec![];

        for pose in cameras {
            let orientation = pose.orientation();
            let matrix = orientation.matrix();
            let right = matrix.column(0).into_owned();
            let down = matrix.column(1).into_owned();
            let forward = matrix.column(2).into_owned();
            let center = vertices.len();
            vertices.push(vertex(pose.position, CAMERA_COLOR));
            for (vertical, horizontal) in [(-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0), (1.0, 1.0)] {
                let corner = pose.position
                    + (forward + down * vertical + right * horizontal) * self.frustum_size;
                vertices.push(vertex(corner, CAMERA_COLOR));
            }
            if self.camera_faces {
                // Corners are upper right, upper left, lower left, lower right.
                for (a, b) in [(4, 1), (1, 2), (2, 3), (3, 4)] {
                    faces.push(triangle(center, center + a, center + b));
                }
            }
        }

        for position in positions {
            let color = if position.predicted {
                PREDICTED_COLOR
            } else {
                OBSERVED_COLOR
            };
            vertices.push(vertex(position.position(), color));
        }

        ply.payload.insert("vertex".to_string(), vertices);
        if self.camera_faces {
            ply.payload.insert("face".to_string(), faces);
        }

        Writer::new().write_ply(&mut writer, &mut ply)
    }
}

impl Default for PlyExport {
    fn default() -> Self {
        Self {
            camera_faces: true,
            frustum_size: 0.1,
        }
    }
}

fn vertex(point: Point3<f64>, [red, green, blue]: [u8; 3]) -> DefaultElement {
    let mut element = DefaultElement::new();
    element.insert("x".to_string(), Property::Double(point.x));
    element.insert("y".to_string(), Property::Double(point.y));
    element.insert("z".to_string(), Property::Double(point.z));
    element.insert("red".to_string(), Property::UChar(red));
    element.insert("green".to_string(), Property::UChar(green));
    element.insert("blue".to_string(), Property::UChar(blue));
    element
}

fn triangle(a: usize, b: usize, c: usize) -> DefaultElement {
    let mut element = DefaultElement::new();
    element.insert(
        "vertex_index".to_string(),
        Property::ListInt(vec![a as i32, b as i32, c as i32]),
    );
    element
}
