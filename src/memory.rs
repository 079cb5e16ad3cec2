/// `PhysicalMemory` simulates the fixed pool of frames pages are loaded into. Frames are laid out
/// back to back in a single buffer, so an offset wider than a frame reads into the frame that
/// follows it. Reads wrap at the end of memory.
pub struct PhysicalMemory {
    frame_size: usize,
    buffer: Vec<u8>,
}

impl PhysicalMemory {
    /// Create zero-filled memory of `num_frames` frames, each `frame_size` bytes.
    pub fn build(num_frames: usize, frame_size: usize) -> Self {
        Self {
            frame_size,
            buffer: vec![0; num_frames * frame_size],
        }
    }

    pub fn num_frames(&self) -> usize {
        self.buffer.len() / self.frame_size
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Mutable view of one frame, for loading a page into it.
    pub fn frame_mut(&mut self, frame_number: usize) -> &mut [u8] {
        let start = frame_number * self.frame_size;
        &mut self.buffer[start..start + self.frame_size]
    }

    /// Read the byte at `offset` within `frame_number`.
    pub fn read(&self, frame_number: usize, offset: usize) -> u8 {
        let index = (frame_number * self.frame_size + offset) % self.buffer.len();
        self.buffer[index]
    }
}
