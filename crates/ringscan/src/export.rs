//! JSON export of point clouds.
//!
//! The file is a list of levels (ascending height), each a list of
//! `{"x", "y", "z"}` objects (ascending azimuth from 0). Consumers rely on
//! both orders.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::cloud::PointCloudModel;
use crate::error::Result;

/// Serialize a model to a pretty-printed JSON string (two-space indent).
pub fn to_json_string(model: &PointCloudModel) -> Result<String> {
    Ok(serde_json::to_string_pretty(model)?)
}

/// Write a model as pretty-printed JSON to any writer.
pub fn write_json<W: Write>(model: &PointCloudModel, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, model)?;
    Ok(())
}

/// Write a model as pretty-printed JSON to a file, replacing it if present.
pub fn write_json_file(model: &PointCloudModel, path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(model, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;
    use ringscan_index::primitives::make_cube;
    use ringscan_index::SurfaceIndex;

    #[test]
    fn test_json_nesting() {
        let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
        let model = scan(&index, 3, 5, -0.25, 2.0).unwrap();
        let text = to_json_string(&model).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        let levels = value.as_array().unwrap();
        assert_eq!(levels.len(), 3);
        for (level, json) in model.levels().iter().zip(levels) {
            let points = json.as_array().unwrap();
            assert_eq!(points.len(), 5);
            for (p, obj) in level.points().iter().zip(points) {
                let obj = obj.as_object().unwrap();
                assert_eq!(obj.len(), 3);
                assert_eq!(obj["x"].as_f64().unwrap(), p.x);
                assert_eq!(obj["y"].as_f64().unwrap(), p.y);
                assert_eq!(obj["z"].as_f64().unwrap(), p.z);
            }
        }

        // The top level sits above the cube, so every point is the axis point.
        for obj in levels[2].as_array().unwrap() {
            assert_eq!(obj["x"].as_f64(), Some(0.0));
            assert_eq!(obj["y"].as_f64(), Some(0.0));
            assert_eq!(obj["z"].as_f64(), Some(2.0));
        }
    }

    #[test]
    fn test_pretty_indent() {
        let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
        let model = scan(&index, 1, 1, 0.0, 0.0).unwrap();
        let text = to_json_string(&model).unwrap();
        assert!(text.starts_with("[\n  [\n    {\n      \"x\": "));
    }

    #[test]
    fn test_write_json_to_buffer() {
        let index = SurfaceIndex::build(make_cube(1.0)).unwrap();
        let model = scan(&index, 2, 3, 0.0, 0.1).unwrap();
        let mut buf = Vec::new();
        write_json(&model, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), to_json_string(&model).unwrap());
    }
}
