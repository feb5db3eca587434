use crate::heightmap::Heightmap;
use crate::math::Vector3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::prelude::*;

/// World-space distance between neighboring grid vertices.
pub const GRID_SPACING: f32 = 0.1;

#[derive(Debug)]
pub enum TerrainIoError {
    FileExportError,
}

/// An indexed triangle mesh built from a heightmap grid, ready for upload
/// as vertex and element buffers.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TerrainMesh {
    pub vertices: Vec<Vector3>,
    pub indices: Vec<u32>,
    pub width: usize,
    pub height: usize,
}

impl TerrainMesh {
    /// One vertex per heightmap sample at
    /// `(row * GRID_SPACING, sample, col * GRID_SPACING)`, and two
    /// triangles per grid cell.
    pub fn from_heightmap(heightmap: &Heightmap) -> TerrainMesh {
        let width = heightmap.width;
        let height = heightmap.height;

        let mut vertices = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                vertices.push(Vector3::new(
                    row as f32 * GRID_SPACING,
                    heightmap.get(col, row),
                    col as f32 * GRID_SPACING,
                ));
            }
        }

        // Each cell splits along the same diagonal: an upper and a lower
        // triangle, both wound the same way.
        let mut indices = Vec::with_capacity(width.saturating_sub(1) * height.saturating_sub(1) * 6);
        for row in 0..height.saturating_sub(1) {
            for col in 0..width.saturating_sub(1) {
                let row = row as u32;
                let col = col as u32;
                let width = width as u32;

                indices.push(row * width + col);
                indices.push(row * width + col + 1);
                indices.push((row + 1) * width + col + 1);

                indices.push(row * width + col);
                indices.push((row + 1) * width + col + 1);
                indices.push((row + 1) * width + col);
            }
        }

        TerrainMesh {
            vertices,
            indices,
            width,
            height,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounding box of the mesh.
    pub fn bounds(&self) -> (Vector3, Vector3) {
        let first = self.vertices[0];
        self.vertices
            .iter()
            .fold((first, first), |(min, max), vertex| {
                (min.min(vertex), max.max(vertex))
            })
    }

    pub fn center(&self) -> Vector3 {
        let (min, max) = self.bounds();
        (min + max) * 0.5
    }

    /// Length of the bounding-box diagonal, handy for framing a camera.
    pub fn diagonal(&self) -> f32 {
        let (min, max) = self.bounds();
        (max - min).magnitude()
    }
}

pub fn export(mesh: &TerrainMesh, filename: &str) -> Result<(), TerrainIoError> {
    fn _export(mesh: &TerrainMesh, filename: &str) -> std::io::Result<()> {
        let data = serde_json::to_string(&mesh).unwrap();
        let mut file = File::create(format!("{}.json", filename))?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    match _export(mesh, filename) {
        Ok(_) => Ok(()),
        Err(_) => Err(TerrainIoError::FileExportError),
    }
}
