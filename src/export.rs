use crate::board::Board;
use crate::error::ExportError;
use crate::palette::cell_rgb;
use image::{Rgb, RgbImage};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pixels per board cell in exported images
pub const DEFAULT_SCALE: u32 = 4;

/// Delay between recorded frames, in hundredths of a second
const FRAME_DELAY: u16 = 2;

const BACKGROUND: [u8; 3] = [0, 0, 0];

/// Pixel size of a board rendered at `scale`, if it fits the formats' limits
fn scaled_size(board: &Board, scale: u32) -> Result<(u16, u16), ExportError> {
    let too_large = || ExportError::TooLarge {
        width: board.width(),
        height: board.height(),
    };
    let width = (board.width() as u64) * scale as u64;
    let height = (board.height() as u64) * scale as u64;
    let width = u16::try_from(width).map_err(|_| too_large())?;
    let height = u16::try_from(height).map_err(|_| too_large())?;
    Ok((width, height))
}

/// Render the board into an RGB image, `scale` pixels per cell
pub fn board_image(board: &Board, max_mass: i32, scale: u32) -> RgbImage {
    let scale = scale.max(1);
    let width = board.width() as u32 * scale;
    let height = board.height() as u32 * scale;
    RgbImage::from_fn(width, height, |px, py| {
        let value = board
            .get((px / scale) as usize, (py / scale) as usize)
            .unwrap_or(0);
        Rgb(cell_rgb(value, max_mass).unwrap_or(BACKGROUND))
    })
}

/// Save a PNG snapshot of the board
pub fn save_png(board: &Board, max_mass: i32, path: &Path, scale: u32) -> Result<(), ExportError> {
    scaled_size(board, scale.max(1))?;
    board_image(board, max_mass, scale).save(path)?;
    info!("saved snapshot to {}", path.display());
    Ok(())
}

/// Animated GIF recording of successive boards
pub struct GifRecorder {
    encoder: gif::Encoder<BufWriter<File>>,
    path: PathBuf,
    board_size: (usize, usize),
    frame_size: (u16, u16),
    scale: u32,
    frames: usize,
}

impl GifRecorder {
    /// Start a recording sized for `board`
    pub fn create(path: &Path, board: &Board, scale: u32) -> Result<Self, ExportError> {
        let scale = scale.max(1);
        let (width, height) = scaled_size(board, scale)?;
        let file = File::create(path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut encoder = gif::Encoder::new(BufWriter::new(file), width, height, &[])?;
        encoder.set_repeat(gif::Repeat::Infinite)?;
        info!("recording to {}", path.display());
        Ok(Self {
            encoder,
            path: path.to_path_buf(),
            board_size: (board.width(), board.height()),
            frame_size: (width, height),
            scale,
            frames: 0,
        })
    }

    /// Append the board as a frame. Boards of a different size than the
    /// recording are skipped; returns whether a frame was written.
    pub fn capture(&mut self, board: &Board, max_mass: i32) -> Result<bool, ExportError> {
        if (board.width(), board.height()) != self.board_size {
            return Ok(false);
        }
        let image = board_image(board, max_mass, self.scale);
        let mut frame = gif::Frame::from_rgb_speed(self.frame_size.0, self.frame_size.1, image.as_raw(), 10);
        frame.delay = FRAME_DELAY;
        self.encoder.write_frame(&frame)?;
        self.frames += 1;
        Ok(true)
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the trailer and close the file
    pub fn finish(self) -> Result<(PathBuf, usize), ExportError> {
        let path = self.path;
        let frames = self.frames;
        self.encoder
            .into_inner()
            .and_then(|mut writer| writer.flush())
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
        info!("finished recording {} ({} frames)", path.display(), frames);
        Ok((path, frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_board_image_scales_cells() {
        let board = Board::from_rows(&[&[6, 0], &[0, -1]]);
        let image = board_image(&board, 6, 3);
        assert_eq!(image.dimensions(), (6, 6));
        assert_eq!(image.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(2, 2), &Rgb([255, 0, 0]));
        assert_eq!(image.get_pixel(3, 0), &Rgb([0, 0, 0]));
        assert_eq!(image.get_pixel(5, 5), &Rgb([0, 224, 191]));
    }

    #[test]
    fn test_save_png_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.png");
        let board = Board::from_rows(&[&[6, 0, -3]]);
        save_png(&board, 6, &path, 2).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.dimensions(), (6, 2));
        assert_eq!(loaded.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_oversized_board_rejected() {
        let dir = tempdir().unwrap();
        let board = Board::empty(20_000, 1);
        let result = GifRecorder::create(&dir.path().join("big.gif"), &board, 4);
        assert!(matches!(result, Err(ExportError::TooLarge { .. })));
    }

    #[test]
    fn test_gif_recording() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.gif");
        let mut board = Board::empty(4, 3);
        let mut recorder = GifRecorder::create(&path, &board, 2).unwrap();

        assert!(recorder.capture(&board, 6).unwrap());
        board.set(1, 1, 6);
        assert!(recorder.capture(&board, 6).unwrap());
        assert!(!recorder.capture(&Board::empty(5, 5), 6).unwrap());
        assert_eq!(recorder.frames(), 2);

        let (written, frames) = recorder.finish().unwrap();
        assert_eq!(written, path);
        assert_eq!(frames, 2);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"GIF89a"));
        assert_eq!(bytes.last(), Some(&0x3B));
    }
}
