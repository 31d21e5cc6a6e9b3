use cone_core::{CameraModel, CameraPose, Observation, Ray};
use cone_pinhole::CameraGeometry;
use std::collections::BTreeMap;

/// The set of cameras of one capture session: one shared camera model and a pose per camera.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    geometry: CameraGeometry,
    poses: BTreeMap<usize, CameraPose>,
}

impl CameraRig {
    /// Creates a rig. If several poses share a camera index, the last one wins.
    pub fn new(geometry: CameraGeometry, poses: impl IntoIterator<Item = CameraPose>) -> Self {
        Self {
            geometry,
            poses: poses.into_iter().map(|pose| (pose.index, pose)).collect(),
        }
    }

    pub fn geometry(&self) -> &CameraGeometry {
        &self.geometry
    }

    pub fn pose(&self, camera_index: usize) -> Option<&CameraPose> {
        self.poses.get(&camera_index)
    }

    pub fn contains(&self, camera_index: usize) -> bool {
        self.poses.contains_key(&camera_index)
    }

    /// The poses ordered by camera index.
    pub fn poses(&self) -> impl Iterator<Item = &CameraPose> + '_ {
        self.poses.values()
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Casts the world ray of an observation, or `None` if its camera has no pose.
    pub fn ray(&self, observation: &Observation) -> Option<Ray> {
        self.pose(observation.camera_index)
            .map(|pose| self.geometry.cast_ray(pose, *observation))
    }
}
