/// Row-major grayscale image storage
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Image {
    /// Create an empty image
    pub fn empty() -> Image {
        Image {
            data: vec![],
            width: 0,
            height: 0,
        }
    }

    /// Create a zero-filled image
    pub fn zeros(width: usize, height: usize) -> Image {
        Image {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    /// Create an image filled with a constant value
    pub fn filled(width: usize, height: usize, value: u8) -> Image {
        Image {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Change the dimensions and zero the contents, reusing the allocation
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(width * height, 0);
    }

    #[inline(always)]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    #[inline(always)]
    pub fn value(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    #[inline(always)]
    pub fn value_i32(&self, x: i32, y: i32) -> u8 {
        self.data[y as usize * self.width + x as usize]
    }

    #[inline(always)]
    #[cfg(test)]
    pub fn set_value(&mut self, x: usize, y: usize, value: u8) {
        self.data[y * self.width + x] = value;
    }
}

/// Row-major interleaved RGB image storage
#[derive(Clone, Debug, PartialEq)]
pub struct RgbImage {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl RgbImage {
    /// Create an empty image
    pub fn empty() -> RgbImage {
        RgbImage {
            data: vec![],
            width: 0,
            height: 0,
        }
    }

    /// Create a zero-filled image
    pub fn zeros(width: usize, height: usize) -> RgbImage {
        RgbImage {
            data: vec![0; 3 * width * height],
            width,
            height,
        }
    }

    /// Change the dimensions and zero the contents, reusing the allocation
    pub fn reset(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(3 * width * height, 0);
    }

    /// Copy the contents of another image, reusing the allocation
    pub fn copy_from(&mut self, other: &RgbImage) {
        self.width = other.width;
        self.height = other.height;
        self.data.clear();
        self.data.extend_from_slice(&other.data);
    }

    #[inline(always)]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
        let i = 3 * (y * self.width + x);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    #[inline(always)]
    pub fn set_pixel(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        let i = 3 * (y * self.width + x);
        self.data[i] = rgb[0];
        self.data[i + 1] = rgb[1];
        self.data[i + 2] = rgb[2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_reuses_storage() {
        let mut image = Image::filled(4, 4, 7);
        image.reset(2, 3);
        assert_eq!(image.width, 2);
        assert_eq!(image.height, 3);
        assert_eq!(image.data, vec![0; 6]);
    }

    #[test]
    fn test_rgb_pixel_roundtrip() {
        let mut image = RgbImage::zeros(3, 2);
        image.set_pixel(2, 1, [9, 8, 7]);
        assert_eq!(image.pixel(2, 1), [9, 8, 7]);
        assert_eq!(image.pixel(0, 0), [0, 0, 0]);
    }
}
