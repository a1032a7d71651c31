use ndarray::Array2;
use ndarray::Array3;
use ndarray::ArrayView2;
use ndarray::ArrayView3;
use ndarray::Axis;
use rayon::prelude::*;

/// Length of the longer side of every upsampled frame
pub const MAX_DIM: u32 = 1024;
/// Encoders want frame sides aligned to macroblocks
pub const MACROBLOCK: u32 = 16;

/// Upsampled frame size, always (width, height)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayDimensions {
    pub width: u32,
    pub height: u32,
}

impl DisplayDimensions {
    /// Scale the longer side of a (height, width) frame to [`MAX_DIM`] and the
    /// shorter side by the same ratio, rounded down to a multiple of
    /// [`MACROBLOCK`] (but never below one macroblock).
    pub fn plan(height: usize, width: usize) -> Self {
        let (height, width) = (height as u64, width as u64);
        let max_dim = MAX_DIM as u64;
        let block = MACROBLOCK as u64;

        let shorter = |short: u64, long: u64| -> u32 {
            let aligned = short * max_dim / (long * block) * block;
            aligned.max(block) as u32
        };

        if width > height {
            Self {
                width: MAX_DIM,
                height: shorter(height, width),
            }
        } else {
            Self {
                width: shorter(width, height),
                height: MAX_DIM,
            }
        }
    }

    /// Plan for a (t, h, w) stack; the time axis is ignored.
    pub fn for_stack<A>(stack: &ArrayView3<'_, A>) -> Self {
        let (_, height, width) = stack.dim();
        Self::plan(height, width)
    }

    /// ffmpeg scale filter performing nearest-neighbor upsampling
    pub fn scale_filter(&self) -> String {
        format!("scale={}:{}:flags=neighbor", self.width, self.height)
    }
}

pub struct Interpolator;

impl Interpolator {
    /// Nearest-neighbor resample of one frame; no new intensities are created.
    pub fn nearest_neighbor(frame: &ArrayView2<'_, u8>, dims: DisplayDimensions) -> Array2<u8> {
        let (frame_height, frame_width) = frame.dim();
        let (width, height) = (dims.width as usize, dims.height as usize);

        let columns: Vec<usize> = (0..width)
            .map(|x| Self::source_index(x, width, frame_width))
            .collect();

        let mut upsampled = Array2::zeros((height, width));
        upsampled
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(y, mut target)| {
                let row = frame.row(Self::source_index(y, height, frame_height));
                for (pixel, &src_x) in target.iter_mut().zip(&columns) {
                    *pixel = row[src_x];
                }
            });
        upsampled
    }

    /// Upsample every frame of a (t, h, w) stack.
    pub fn upsample_stack(stack: &ArrayView3<'_, u8>, dims: DisplayDimensions) -> Array3<u8> {
        let frames = stack.len_of(Axis(0));
        let mut upsampled = Array3::zeros((frames, dims.height as usize, dims.width as usize));
        for (frame, mut target) in stack
            .axis_iter(Axis(0))
            .zip(upsampled.axis_iter_mut(Axis(0)))
        {
            target.assign(&Self::nearest_neighbor(&frame, dims));
        }
        upsampled
    }

    #[inline]
    fn source_index(dst: usize, dst_len: usize, src_len: usize) -> usize {
        // sample at the pixel center, same convention as the scale filter
        let src = ((dst as f64 + 0.5) * src_len as f64 / dst_len as f64) as usize;
        src.min(src_len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn wide_frame_scales_width_to_max() {
        let dims = DisplayDimensions::plan(100, 200);
        assert_eq!(dims.width, 1024);
        assert_eq!(dims.height, 512);
    }

    #[test]
    fn tall_and_square_frames_scale_height_to_max() {
        assert_eq!(
            DisplayDimensions::plan(200, 100),
            DisplayDimensions {
                width: 512,
                height: 1024
            }
        );
        assert_eq!(
            DisplayDimensions::plan(64, 64),
            DisplayDimensions {
                width: 1024,
                height: 1024
            }
        );
    }

    #[test]
    fn shorter_side_is_rounded_down_to_macroblock() {
        // 96 * 1024 / 128 = 768 exact, 90 * 1024 / 128 = 720 exact,
        // 91 * 1024 / 128 = 728 -> 720, 100 * 1024 / 300 = 341.3 -> 336
        let cases = [
            ((96, 128), 768),
            ((90, 128), 720),
            ((91, 128), 720),
            ((100, 300), 336),
            ((64, 65), 1008),
        ];
        for ((height, width), expected) in cases {
            let dims = DisplayDimensions::plan(height, width);
            assert_eq!(dims.width, MAX_DIM);
            assert_eq!(dims.height, expected, "{height}x{width}");
        }
        for (height, width) in [(7, 13), (33, 17), (250, 251), (1, 2), (1000, 999)] {
            let dims = DisplayDimensions::plan(height, width);
            assert_eq!(dims.width.max(dims.height), MAX_DIM);
            assert_eq!(dims.width % MACROBLOCK, 0);
            assert_eq!(dims.height % MACROBLOCK, 0);
        }
    }

    #[test]
    fn very_thin_frame_keeps_one_macroblock() {
        let dims = DisplayDimensions::plan(2, 1000);
        assert_eq!(dims.height, MACROBLOCK);
    }

    #[test]
    fn scale_filter_requests_neighbor_flag() {
        let dims = DisplayDimensions::plan(100, 200);
        assert_eq!(dims.scale_filter(), "scale=1024:512:flags=neighbor");
    }

    #[test]
    fn nearest_neighbor_replicates_pixels() {
        let frame = array![[1u8, 2], [3, 4]];
        let up = Interpolator::nearest_neighbor(
            &frame.view(),
            DisplayDimensions {
                width: 4,
                height: 4,
            },
        );
        assert_eq!(
            up,
            array![[1, 1, 2, 2], [1, 1, 2, 2], [3, 3, 4, 4], [3, 3, 4, 4]]
        );
    }

    #[test]
    fn nearest_neighbor_fills_every_pixel_at_uneven_ratios() {
        // 3 -> 432 and 7 -> 1024 are not integer ratios
        let frame = Array2::from_shape_fn((7, 3), |(y, x)| (y * 3 + x + 1) as u8);
        let dims = DisplayDimensions::plan(7, 3);
        let up = Interpolator::nearest_neighbor(&frame.view(), dims);

        assert_eq!(up.dim(), (1024, 432));
        assert!(up.iter().all(|&v| v != 0));
        assert_eq!(up[[0, 0]], frame[[0, 0]]);
        assert_eq!(up[[1023, 431]], frame[[6, 2]]);
        assert_eq!(up[[512, 216]], frame[[3, 1]]);
    }

    #[test]
    fn upsampled_stack_only_contains_source_values() {
        let stack = Array3::from_shape_fn((3, 5, 7), |(t, y, x)| (t * 35 + y * 7 + x) as u8);
        let dims = DisplayDimensions::for_stack(&stack.view());
        let up = Interpolator::upsample_stack(&stack.view(), dims);
        assert_eq!(up.dim(), (3, dims.height as usize, dims.width as usize));
        for (t, frame) in up.axis_iter(Axis(0)).enumerate() {
            let source = stack.index_axis(Axis(0), t);
            assert!(frame.iter().all(|v| source.iter().any(|s| s == v)));
        }
    }
}
