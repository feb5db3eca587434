use log::{error, info};
use std::env;
use std::process;

pub mod bmp;
pub mod heightmap;
pub mod math;
pub mod terrain;

use bmp::ColorMode;
use heightmap::Heightmap;
use terrain::TerrainMesh;

/// Heights are kept normalized; the mesh scales them against the 0.1
/// grid spacing the viewer expects.
const TERRAIN_DEPTH: f32 = 1.0;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: terrain <heightmap.bmp> [output-prefix]");
        process::exit(2);
    }
    let input = &args[1];
    let prefix = args.get(2).map(String::as_str).unwrap_or("terrain");

    let mut image = match bmp::io::read(input) {
        Ok(image) => image,
        Err(e) => {
            error!("Failed to read {}: {:?}", input, e);
            process::exit(1);
        }
    };
    info!(
        "Loaded {} ({}x{}, {:?}, {} bytes)",
        input,
        image.width(),
        image.height(),
        image.color_mode(),
        image.size()
    );

    // Pixel values are heights, not colors.
    image.convert_to(ColorMode::Bw, true);
    let heightmap = Heightmap::from_bmp(&image, TERRAIN_DEPTH);

    let mesh = TerrainMesh::from_heightmap(&heightmap);
    info!(
        "Built terrain mesh: {} vertices, {} triangles, diagonal {:.2}",
        mesh.vertex_count(),
        mesh.triangle_count(),
        mesh.diagonal()
    );

    if let Err(e) = terrain::export(&mesh, prefix) {
        error!("Failed to export mesh: {:?}", e);
        process::exit(1);
    }
    if let Err(e) = heightmap::io::heightmap_to_image(&heightmap, prefix) {
        error!("Failed to save heightmap preview: {}", e);
        process::exit(1);
    }
    if let Err(e) = bmp::io::write(&image, &format!("{}_bw.bmp", prefix)) {
        error!("Failed to write grayscale bitmap: {:?}", e);
        process::exit(1);
    }

    info!(
        "Wrote {}.json, {}.png and {}_bw.bmp",
        prefix, prefix, prefix
    );
}
