use serde::Serialize;

/// Column-major 4x4 identity.
pub const IDENTITY: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// A triangulated mesh instance produced by the host geometry engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    /// Flat `x, y, z` triples.
    pub vertices: Vec<f64>,
    /// Triangle vertex indices.
    pub faces: Vec<u32>,
    /// Column-major instance transform.
    pub transform: [f64; 16],
    /// RGBA, each channel in `0.0..=1.0`.
    pub color: [f32; 4],
}

impl Mesh {
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.faces.len() / 3
    }
}

/// Supplies display meshes for an entity id.
pub trait GeometrySource {
    fn get_geometry(&self, id: u64) -> Vec<Mesh>;
}

/// A geometry source that never has anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl GeometrySource for NoGeometry {
    fn get_geometry(&self, _id: u64) -> Vec<Mesh> {
        Vec::new()
    }
}

impl<F> GeometrySource for F
where
    F: Fn(u64) -> Vec<Mesh>,
{
    fn get_geometry(&self, id: u64) -> Vec<Mesh> {
        self(id)
    }
}
