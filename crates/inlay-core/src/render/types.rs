/// A decoded, scaled image in the window server's pixel byte order.
///
/// Pixels are stored as 4-byte BGRx little-endian units, row-major with no
/// extra row padding (the 4-byte unit already satisfies the server's 32-bit
/// scanline pad). This is the layout a depth-24 ZPixmap blit expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RenderedImage {
    /// Bytes per scanline.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }
}
