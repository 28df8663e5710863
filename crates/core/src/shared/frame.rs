use ndarray::{ArrayView3, ArrayViewMut3};

pub const RGB_CHANNELS: u8 = 3;
pub const RGBA_CHANNELS: u8 = 4;

/// A single camera frame or overlay buffer: contiguous pixel bytes in
/// row-major order, either RGB or RGBA.
///
/// `sequence` is the position of the frame in its source stream; overlay
/// buffers use 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    sequence: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, sequence: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            sequence,
        }
    }

    /// Fully transparent RGBA buffer.
    pub fn transparent(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize) * RGBA_CHANNELS as usize;
        Self::new(vec![0; len], width, height, RGBA_CHANNELS, 0)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn sequence(&self) -> usize {
        self.sequence
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Converts to RGBA, filling alpha with 255 for RGB input.
    pub fn to_rgba(&self) -> Frame {
        if self.channels == RGBA_CHANNELS {
            return self.clone();
        }
        let pixels = (self.width as usize) * (self.height as usize);
        let mut data = Vec::with_capacity(pixels * RGBA_CHANNELS as usize);
        for px in self.data.chunks_exact(self.channels as usize) {
            match px {
                [gray] => data.extend_from_slice(&[*gray, *gray, *gray, 255]),
                [r, g, b, ..] => data.extend_from_slice(&[*r, *g, *b, 255]),
                _ => data.extend_from_slice(&[0, 0, 0, 255]),
            }
        }
        Frame::new(data, self.width, self.height, RGBA_CHANNELS, self.sequence)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.dimensions(), (2, 2));
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.sequence(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3, 0);
    }

    #[test]
    fn test_transparent_is_rgba_zeroed() {
        let frame = Frame::transparent(3, 2);
        assert_eq!(frame.channels(), RGBA_CHANNELS);
        assert_eq!(frame.data().len(), 24);
        assert!(frame.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }

    #[test]
    fn test_as_ndarray_mut_modification() {
        let mut frame = Frame::transparent(2, 2);
        {
            let mut arr = frame.as_ndarray_mut();
            arr[[0, 1, 3]] = 128; // row=0, col=1, alpha
        }
        assert_eq!(frame.as_ndarray()[[0, 1, 3]], 128);
    }

    #[test]
    fn test_to_rgba_adds_opaque_alpha() {
        let frame = Frame::new(vec![10, 20, 30, 40, 50, 60], 2, 1, 3, 7);
        let rgba = frame.to_rgba();
        assert_eq!(rgba.channels(), 4);
        assert_eq!(rgba.sequence(), 7);
        assert_eq!(rgba.data(), &[10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_to_rgba_on_rgba_is_identity() {
        let frame = Frame::new(vec![1, 2, 3, 4], 1, 1, 4, 0);
        assert_eq!(frame.to_rgba(), frame);
    }
}
