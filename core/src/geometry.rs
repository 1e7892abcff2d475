use glam::Vec3;

/// Axis-aligned bounding box in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// World-space representation of one puzzle piece: its position (the quad
/// center), local scale, and rendered size including the transparent fringe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PieceBody {
    pub position: Vec3,
    pub scale: Vec3,
    pub size: Vec3,
}

impl PieceBody {
    pub fn new(position: Vec3, size: Vec3) -> Self {
        Self {
            position,
            scale: Vec3::ONE,
            size,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }

    pub fn translate(&mut self, by: Vec3) {
        self.position += by;
    }
}

pub fn bounds_of<'a>(bodies: impl IntoIterator<Item = &'a PieceBody>) -> Option<Aabb> {
    bodies
        .into_iter()
        .map(PieceBody::bounds)
        .reduce(|acc, next| acc.union(&next))
}

/// Orthographic camera placement that keeps every piece in view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraFrame {
    pub position: Vec3,
    pub ortho_size: f32,
}

pub const CAMERA_DEPTH: f32 = -10.0;

pub fn camera_frame(bounds: &Aabb) -> CameraFrame {
    let extent = bounds.size();
    CameraFrame {
        // the x divisor leaves room for the reference picture on the right
        position: Vec3::new(
            (bounds.min.x + bounds.max.x) / 2.25,
            (bounds.min.y + bounds.max.y) / 2.0,
            CAMERA_DEPTH,
        ),
        ortho_size: extent.x.max(extent.y) / 1.5,
    }
}
