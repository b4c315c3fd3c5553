//! Shared-memory backing store for the surface's pixel buffer.
//!
//! The pool is an unlinked temporary file, sized to the buffer's byte
//! footprint and mapped shared/read-write. Its descriptor is what gets passed
//! to the compositor in `wl_shm.create_pool`.

use std::{
    fs::File,
    os::fd::{AsFd, BorrowedFd},
};

use memmap2::MmapMut;
use tracing::debug;

use crate::{
    error::{Error, Result},
    protocol::shm::{CreateBufferParam, Format},
};

/// Fixed geometry of the single buffer carved out of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    pub offset: u32,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: Format,
}

impl BufferLayout {
    /// Packed layout at offset 0: `stride = width * bytes_per_pixel`.
    pub fn packed(width: u32, height: u32, format: Format) -> Self {
        Self {
            offset: 0,
            width,
            height,
            stride: width * format.bytes_per_pixel(),
            format,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.stride as usize * self.height as usize
    }

    /// The `create_buffer` arguments describing this layout.
    pub fn create_buffer_param(&self, new_id: u32) -> CreateBufferParam {
        CreateBufferParam {
            new_id,
            offset: self.offset as i32,
            width: self.width as i32,
            height: self.height as i32,
            stride: self.stride as i32,
            format: self.format,
        }
    }
}

/// A temp-file-backed shared mapping.
///
/// Both the file and the mapping live as long as the pool; the compositor
/// maps the same file through the descriptor it received.
pub struct ShmPool {
    file: File,
    mmap: MmapMut,
}

impl ShmPool {
    /// Creates a backing file of exactly `size` bytes and maps it.
    ///
    /// # Errors
    /// Any failure creating, sizing or mapping the file is returned as
    /// [`Error::SharedMemory`].
    pub fn create(size: usize) -> Result<Self> {
        let file = tempfile::tempfile().map_err(Error::SharedMemory)?;
        file.set_len(size as u64).map_err(Error::SharedMemory)?;

        // SAFETY: the file is private to this process until its descriptor is
        // handed to the compositor, which only reads it between commits.
        let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(Error::SharedMemory)?;

        debug!(size, "mapped shared memory pool");
        Ok(Self { file, mmap })
    }

    pub fn size(&self) -> usize {
        self.mmap.len()
    }

    /// The bytes of the buffer described by `layout`.
    pub fn buffer_mut(&mut self, layout: &BufferLayout) -> &mut [u8] {
        let start = layout.offset as usize;
        &mut self.mmap[start..start + layout.size_bytes()]
    }
}

impl AsFd for ShmPool {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom};

    #[test]
    fn hundred_square_xrgb_layout() {
        let layout = BufferLayout::packed(100, 100, Format::Xrgb8888);

        assert_eq!(layout.stride, 400);
        assert_eq!(layout.size_bytes(), 40_000);
        assert_eq!(layout.offset, 0);
    }

    #[test]
    fn pool_matches_buffer_footprint() {
        let layout = BufferLayout::packed(100, 100, Format::Argb8888);
        let pool = ShmPool::create(layout.size_bytes()).unwrap();

        assert_eq!(pool.size(), 40_000);
        assert_eq!(pool.file.metadata().unwrap().len(), 40_000);
    }

    #[test]
    fn writes_are_visible_through_the_file() {
        let layout = BufferLayout::packed(2, 2, Format::Xrgb8888);
        let mut pool = ShmPool::create(layout.size_bytes()).unwrap();

        pool.buffer_mut(&layout).fill(0xAB);

        let mut file = pool.file.try_clone().unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, vec![0xAB; 16]);
    }

    #[test]
    fn create_buffer_param_mirrors_layout() {
        let layout = BufferLayout::packed(100, 50, Format::Xrgb8888);
        let param = layout.create_buffer_param(9);

        assert_eq!(param.new_id, 9);
        assert_eq!((param.width, param.height, param.stride), (100, 50, 400));
        assert_eq!(param.format, Format::Xrgb8888);
    }
}
