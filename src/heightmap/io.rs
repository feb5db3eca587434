use crate::heightmap::*;
use std::fs::File;
use std::io::prelude::*;

#[derive(Debug)]
pub enum HeightmapIoError {
    FileExportError,
    FileImportError,
}

pub fn export(heightmap: &Heightmap, filename: &str) -> Result<(), HeightmapIoError> {
    fn _export(heightmap: &Heightmap, filename: &str) -> std::io::Result<()> {
        let data = serde_json::to_string(&heightmap).unwrap();
        let mut file = File::create(format!("{}.json", filename))?;
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    match _export(heightmap, filename) {
        Ok(_) => Ok(()),
        Err(_) => Err(HeightmapIoError::FileExportError),
    }
}

pub fn import(filename: &str) -> Result<Heightmap, HeightmapIoError> {
    fn _import(filename: &str) -> std::io::Result<Heightmap> {
        let mut data = String::new();
        {
            let mut file = File::open(filename)?;
            file.read_to_string(&mut data)?;
        }

        serde_json::from_str(&data).map_err(|err| err.into())
    }
    match _import(filename) {
        Ok(heightmap) => Ok(heightmap),
        Err(_) => Err(HeightmapIoError::FileImportError),
    }
}

/// Saves a grayscale PNG preview of the heightmap.
pub fn heightmap_to_image(heightmap: &Heightmap, filename: &str) -> image::ImageResult<()> {
    let buffer = heightmap.to_u8();

    image::save_buffer(
        format!("{}.png", filename),
        &buffer as &[u8],
        heightmap.width.try_into().unwrap(),
        heightmap.height.try_into().unwrap(),
        image::ColorType::L8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_name(name: &str) -> String {
        let mut path = std::env::temp_dir();
        path.push(format!("terrain_hm_test_{}_{}", std::process::id(), name));
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_export_import_round_trip() {
        let data = vec![vec![0.0, 0.25], vec![0.5, 1.0]];
        let heightmap = Heightmap::new(data, 2, 2, 1.0);

        let name = temp_name("round_trip");
        export(&heightmap, &name).unwrap();
        let imported = import(&format!("{}.json", name)).unwrap();
        fs::remove_file(format!("{}.json", name)).unwrap();

        assert_eq!(imported, heightmap);
    }

    #[test]
    fn test_import_missing_file() {
        let result = import("/nonexistent/heightmap.json");
        assert!(matches!(result, Err(HeightmapIoError::FileImportError)));
    }
}
