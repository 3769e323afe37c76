//! This module handles hand classification on raw camera frames.

use crate::HandPose;
use image::GrayImage;
use thiserror::Error;

/// A single hand reading from one camera frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandReading {
    /// The recognized pose.
    pub pose: HandPose,

    /// The wrist position in normalized frame coordinates, both components in [0, 1] with the
    /// origin at the top left.
    pub wrist: (f32, f32),
}

/// An error in classifying a single frame. Frame errors are logged and swallowed by the capture
/// worker; they never disable gesture input.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ClassifyError {
    /// The frame had a zero dimension.
    #[error("received an empty camera frame")]
    EmptyFrame,
}

/// The hand-recognition capability.
///
/// The concrete backend is deliberately swappable: the scene only needs a pose category and a
/// wrist point per frame, so anything from the bundled luma heuristic to a real landmark model
/// can sit behind this trait. Returning `Ok(None)` means no hand was visible in the frame.
pub trait HandClassifier: Send + 'static {
    /// Classify one grayscale camera frame.
    fn classify(&mut self, frame: &GrayImage) -> Result<Option<HandReading>, ClassifyError>;
}

/// A best-effort classifier that finds the brightest blob in the frame and treats it as a hand.
///
/// The wrist is the blob centroid. Open versus closed is decided by how spread out the blob is
/// relative to a solid disc of the same area: spread fingers push the mean pixel distance well
/// past the disc value, a fist stays close to it. This works tolerably with a hand in front of a
/// dark background, which is all the display needs; swap in a proper model via [`HandClassifier`]
/// for anything better.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LumaBlobClassifier {
    /// How far above the frame's mean luma a pixel must be to count as part of the blob.
    pub threshold_offset: u8,

    /// The minimum number of blob pixels before we believe there is a hand at all.
    pub min_area: u32,

    /// The spread ratio above which the blob counts as an open palm. A solid disc has a spread
    /// ratio of 2/3.
    pub spread_cutoff: f32,
}

impl Default for LumaBlobClassifier {
    fn default() -> Self {
        Self {
            threshold_offset: 40,
            min_area: 600,
            spread_cutoff: 0.75,
        }
    }
}

impl HandClassifier for LumaBlobClassifier {
    fn classify(&mut self, frame: &GrayImage) -> Result<Option<HandReading>, ClassifyError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(ClassifyError::EmptyFrame);
        }

        let mean = (frame.pixels().map(|p| u64::from(p.0[0])).sum::<u64>()
            / u64::from(width * height)) as u8;
        let threshold = mean.saturating_add(self.threshold_offset);

        let mut area: u32 = 0;
        let mut sum_x: u64 = 0;
        let mut sum_y: u64 = 0;
        for (x, y, pixel) in frame.enumerate_pixels() {
            if pixel.0[0] >= threshold {
                area += 1;
                sum_x += u64::from(x);
                sum_y += u64::from(y);
            }
        }

        if area < self.min_area {
            return Ok(None);
        }

        let cx = sum_x as f32 / area as f32;
        let cy = sum_y as f32 / area as f32;

        let mean_distance = frame
            .enumerate_pixels()
            .filter(|(_, _, pixel)| pixel.0[0] >= threshold)
            .map(|(x, y, _)| {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                (dx * dx + dy * dy).sqrt()
            })
            .sum::<f32>()
            / area as f32;

        let disc_radius = (area as f32 / std::f32::consts::PI).sqrt();
        let spread = mean_distance / disc_radius;

        let pose = if spread > self.spread_cutoff {
            HandPose::OpenPalm
        } else {
            HandPose::ClosedFist
        };

        Ok(Some(HandReading {
            pose,
            wrist: (cx / width as f32, cy / height as f32),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    /// Paint a bright filled disc onto a dark frame.
    fn frame_with_disc(centre: (i32, i32), radius: i32) -> GrayImage {
        let mut frame = GrayImage::from_pixel(200, 150, Luma([10]));
        for (x, y, pixel) in frame.enumerate_pixels_mut() {
            let dx = x as i32 - centre.0;
            let dy = y as i32 - centre.1;
            if dx * dx + dy * dy <= radius * radius {
                *pixel = Luma([230]);
            }
        }
        frame
    }

    #[test]
    fn a_dark_frame_has_no_hand() {
        let frame = GrayImage::from_pixel(200, 150, Luma([10]));
        let reading = LumaBlobClassifier::default().classify(&frame).unwrap();
        assert_eq!(reading, None);
    }

    #[test]
    fn an_empty_frame_is_an_error() {
        let frame = GrayImage::new(0, 0);
        assert_eq!(
            LumaBlobClassifier::default().classify(&frame),
            Err(ClassifyError::EmptyFrame)
        );
    }

    #[test]
    fn a_solid_disc_reads_as_a_fist_at_its_centre() {
        let frame = frame_with_disc((50, 75), 25);
        let reading = LumaBlobClassifier::default()
            .classify(&frame)
            .unwrap()
            .expect("a disc of radius 25 is nearly 2000 pixels");

        assert_eq!(reading.pose, HandPose::ClosedFist);
        assert!((reading.wrist.0 - 0.25).abs() < 0.02);
        assert!((reading.wrist.1 - 0.5).abs() < 0.02);
    }

    #[test]
    fn separated_blobs_read_as_an_open_palm() {
        // Two small discs far apart: same area as a fist but a much larger spread
        let mut frame = frame_with_disc((30, 75), 18);
        for (x, y, pixel) in frame.enumerate_pixels_mut() {
            let dx = x as i32 - 170;
            let dy = y as i32 - 75;
            if dx * dx + dy * dy <= 18 * 18 {
                *pixel = Luma([230]);
            }
        }

        let reading = LumaBlobClassifier::default()
            .classify(&frame)
            .unwrap()
            .expect("the blobs are big enough to count as a hand");

        assert_eq!(reading.pose, HandPose::OpenPalm);
    }
}
