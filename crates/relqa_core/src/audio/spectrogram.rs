//! Spectrogram rendering of residual signals for manual review.

use std::f64::consts::PI;
use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

/// Image width: one STFT frame per column.
pub const SPECTROGRAM_WIDTH: u32 = 2048;

/// Image height: one frequency bin per row.
pub const SPECTROGRAM_HEIGHT: u32 = 1024;

/// STFT frame size; yields `N_FFT / 2` usable bins.
const N_FFT: usize = 2048;

/// Dynamic range shown, in dB below the loudest bin.
const TOP_DB: f64 = 80.0;

fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}

/// Compute the dB magnitude matrix, one column per image column.
///
/// Frames are spread evenly across the signal, so long residuals are
/// subsampled in time rather than producing a wider image.
fn stft_db(samples: &[i32]) -> Vec<Vec<f64>> {
    let window = hann_window(N_FFT);
    let fft = FftPlanner::<f64>::new().plan_fft_forward(N_FFT);
    let span = samples.len().saturating_sub(N_FFT);
    let columns = SPECTROGRAM_WIDTH as usize;
    let bins = SPECTROGRAM_HEIGHT as usize;

    (0..columns)
        .into_par_iter()
        .map(|col| {
            let start = col * span / (columns - 1);
            let mut frame: Vec<Complex<f64>> = (0..N_FFT)
                .map(|i| {
                    let s = samples.get(start + i).copied().unwrap_or(0) as f64;
                    Complex::new(s * window[i], 0.0)
                })
                .collect();
            fft.process(&mut frame);

            frame
                .iter()
                .take(bins)
                .map(|c| 20.0 * (c.norm() + 1e-10).log10())
                .collect()
        })
        .collect()
}

/// Render `samples` as a grayscale spectrogram PNG at `path`.
///
/// Low frequencies are at the bottom; brightness is dB magnitude scaled over
/// the top 80 dB. Parent directories are created as needed.
pub fn render_spectrogram(samples: &[i32], path: &Path) -> Result<(), image::ImageError> {
    let columns = stft_db(samples);

    let max_db = columns
        .iter()
        .flatten()
        .fold(f64::MIN, |acc, &v| acc.max(v));
    let floor = max_db - TOP_DB;

    let mut img = GrayImage::new(SPECTROGRAM_WIDTH, SPECTROGRAM_HEIGHT);
    for (x, column) in columns.iter().enumerate() {
        for (bin, &db) in column.iter().enumerate() {
            let level = ((db.max(floor) - floor) / TOP_DB * 255.0).round() as u8;
            let y = SPECTROGRAM_HEIGHT - 1 - bin as u32;
            img.put_pixel(x as u32, y, Luma([level]));
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(image::ImageError::IoError)?;
    }
    img.save_with_format(path, ImageFormat::Png)?;

    tracing::info!("Wrote spectrogram {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn renders_fixed_size_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("diff.png");
        let samples: Vec<i32> = (0..48000)
            .map(|i| ((i as f64 * 0.3).sin() * 1000.0) as i32)
            .collect();

        render_spectrogram(&samples, &path).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), SPECTROGRAM_WIDTH);
        assert_eq!(img.height(), SPECTROGRAM_HEIGHT);
    }

    #[test]
    fn tone_is_brightest_in_its_bin() {
        // Frequency of bin 256 at N_FFT = 2048.
        let samples: Vec<i32> = (0..N_FFT * 4)
            .map(|i| ((2.0 * PI * 256.0 * i as f64 / N_FFT as f64).sin() * 5000.0) as i32)
            .collect();
        let columns = stft_db(&samples);
        let column = &columns[0];
        let peak = column
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        assert_eq!(peak.0, 256);
    }

    #[test]
    fn short_signals_are_zero_padded() {
        let columns = stft_db(&[100, -100, 50]);
        assert_eq!(columns.len(), SPECTROGRAM_WIDTH as usize);
        assert_eq!(columns[0].len(), SPECTROGRAM_HEIGHT as usize);
    }
}
