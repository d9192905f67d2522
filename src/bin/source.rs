use crate::BinResult;
use gifmaker::Segment;
use std::io::Read;
use std::path::{Path, PathBuf};

enum FileType {
    PNG, GIF, JPEG, Other,
}

fn file_type(path: &Path) -> BinResult<FileType> {
    let mut file = std::fs::File::open(path)?;
    let mut buf = [0; 4];
    file.read_exact(&mut buf)?;

    if &buf == b"\x89PNG" {
        return Ok(FileType::PNG);
    }
    if &buf == b"GIF8" {
        return Ok(FileType::GIF);
    }
    if buf[..2] == [0xFF, 0xD8] {
        return Ok(FileType::JPEG);
    }
    Ok(FileType::Other)
}

/// PNG files become stills, GIF files become clips
pub fn segments_from_files(paths: &[PathBuf], image_interval: Option<f64>) -> BinResult<Vec<Segment>> {
    paths.iter().map(|path| {
        let segment = match file_type(path).map_err(|e| format!("Can't read {}: {}", path.display(), e))? {
            FileType::PNG => Segment::png_file(path, image_interval)?,
            FileType::GIF => Segment::video(path),
            FileType::JPEG => return Err(format!("{}: JPEG stills aren't supported; convert them to PNG", path.display()).into()),
            FileType::Other => return Err(format!("{}: only PNG stills and GIF clips are supported", path.display()).into()),
        };
        Ok(segment)
    }).collect()
}

pub fn check_if_paths_exist(paths: &[PathBuf]) -> BinResult<()> {
    for path in paths {
        if !path.exists() {
            let mut msg = format!("Unable to find the input file: \"{}\"", path.display());
            if path.to_str().map_or(false, |p| p.contains('*')) {
                msg += "\nThe path contains a literal \"*\" character. If you want to select multiple files, don't put the special wildcard characters in quotes.";
            } else if path.is_relative() {
                msg += &format!(" (searched in \"{}\")", std::env::current_dir()?.display());
            }
            return Err(msg.into())
        }
    }
    Ok(())
}
