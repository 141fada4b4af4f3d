use std::ptr::{self, NonNull};

#[cfg(unix)]
use std::path::{Path, PathBuf};

#[cfg(unix)]
use tracing::{debug, info};

#[cfg(unix)]
use crate::error::{QueueError, Result};

/// A fixed-size byte region that another execution domain may also access.
///
/// All reads and writes go through explicit offsets. The 32-bit fields are
/// accessed with volatile loads and stores in little-endian order, and
/// nothing read from the region is cached, since the other side changes it
/// independently.
pub struct SharedRegion {
    ptr: NonNull<u8>,
    len: usize,
    backing: Backing,
}

enum Backing {
    /// Process-private memory, word-aligned. Used for loopback and tests.
    /// Held as a raw allocation so `ptr` stays valid when the region moves;
    /// freed in `Drop`.
    Heap(NonNull<[u32]>),
    /// A `MAP_SHARED` mapping of a device node or file.
    #[cfg(unix)]
    Mapped {
        path: PathBuf,
        base: *mut libc::c_void,
        map_len: usize,
        _file: std::fs::File,
    },
}

// SAFETY: the region is exclusively owned by this value; the raw pointer is
// only dereferenced through `&self`/`&mut self` methods, so moving the owner
// to another thread cannot create aliasing on the software side.
unsafe impl Send for SharedRegion {}

impl SharedRegion {
    /// Allocate a zeroed, process-private region of `len` bytes.
    pub fn anonymous(len: usize) -> Self {
        let words = vec![0u32; len.div_ceil(4).max(1)].into_boxed_slice();
        let words = NonNull::from(Box::leak(words));
        Self {
            ptr: words.cast::<u8>(),
            len,
            backing: Backing::Heap(words),
        }
    }

    /// Map `len` bytes of `path` starting at byte `offset`.
    ///
    /// `path` is typically a UIO device or a file under `/dev/shm`. A missing
    /// file is created. Regular files shorter than `offset + len` are extended; device nodes are
    /// mapped as they are. `offset` must be 4-byte aligned and need not be
    /// page aligned.
    #[cfg(unix)]
    pub fn map(path: impl AsRef<Path>, offset: u64, len: usize) -> Result<Self> {
        use std::os::unix::io::AsRawFd;

        let path = path.as_ref().to_path_buf();
        if offset % 4 != 0 {
            return Err(QueueError::Misaligned { offset });
        }

        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| QueueError::Open {
                path: path.clone(),
                source: e,
            })?;

        let metadata = file.metadata().map_err(|e| QueueError::Open {
            path: path.clone(),
            source: e,
        })?;
        let required = offset + len as u64;
        if metadata.is_file() && metadata.len() < required {
            debug!(?path, required, "extending backing file");
            file.set_len(required).map_err(|e| QueueError::Open {
                path: path.clone(),
                source: e,
            })?;
        }

        // SAFETY: sysconf has no preconditions.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as u64;
        let page_offset = offset % page_size;
        let aligned_offset = offset - page_offset;
        let map_len = (len as u64 + page_offset) as usize;

        // SAFETY: `file` is an open descriptor for the lifetime of the call,
        // the length is non-zero, and the offset is page aligned.
        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                map_len.max(1),
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                aligned_offset as libc::off_t,
            )
        };
        if base == libc::MAP_FAILED {
            return Err(QueueError::Map {
                path,
                source: std::io::Error::last_os_error(),
            });
        }

        // SAFETY: `page_offset < map_len` so the adjusted pointer stays in
        // the mapping, and mmap never returns null on success.
        let ptr = unsafe { NonNull::new_unchecked((base as *mut u8).add(page_offset as usize)) };

        info!(?path, offset, len, "mapped shared region");

        Ok(Self {
            ptr,
            len,
            backing: Backing::Mapped {
                path,
                base,
                map_len: map_len.max(1),
                _file: file,
            },
        })
    }

    /// Region size in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Path of the mapped device or file, if any.
    #[cfg(unix)]
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Mapped { path, .. } => Some(path),
            Backing::Heap(_) => None,
        }
    }

    /// Whether the region is shared through a mapping.
    pub fn is_mapped(&self) -> bool {
        !matches!(self.backing, Backing::Heap(_))
    }

    /// Volatile little-endian load of the 32-bit field at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not 4-byte aligned or the field is out of range.
    pub fn read_u32(&self, offset: usize) -> u32 {
        self.check_field(offset);
        // SAFETY: bounds and alignment checked above; the base pointer is
        // word-aligned for both backings.
        let raw = unsafe { ptr::read_volatile(self.ptr.as_ptr().add(offset).cast::<u32>()) };
        u32::from_le(raw)
    }

    /// Volatile little-endian store to the 32-bit field at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not 4-byte aligned or the field is out of range.
    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.check_field(offset);
        // SAFETY: as in `read_u32`; `&mut self` excludes software-side aliases.
        unsafe {
            ptr::write_volatile(self.ptr.as_ptr().add(offset).cast::<u32>(), value.to_le());
        }
    }

    /// Copy `src` into the region at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range falls outside the region.
    pub fn copy_in(&mut self, offset: usize, src: &[u8]) {
        self.check_range(offset, src.len());
        // SAFETY: range checked; `src` cannot overlap a region we hold `&mut` to.
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.ptr.as_ptr().add(offset), src.len());
        }
    }

    /// Copy bytes at `offset` out of the region into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if the range falls outside the region.
    pub fn copy_out(&self, offset: usize, dst: &mut [u8]) {
        self.check_range(offset, dst.len());
        // SAFETY: range checked; `dst` is a distinct exclusive borrow.
        unsafe {
            ptr::copy_nonoverlapping(self.ptr.as_ptr().add(offset), dst.as_mut_ptr(), dst.len());
        }
    }

    /// Borrow `len` bytes at `offset` without copying.
    ///
    /// The view is only stable while the hardware side is not writing the
    /// same bytes.
    ///
    /// # Panics
    ///
    /// Panics if the range falls outside the region.
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        self.check_range(offset, len);
        // SAFETY: range checked; the borrow is tied to `&self`, which blocks
        // software-side writes for its duration.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().add(offset), len) }
    }

    /// Raw base address, for handing the region to DMA or firmware setup.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    fn check_field(&self, offset: usize) {
        assert!(offset % 4 == 0, "field offset {offset} is not 4-byte aligned");
        self.check_range(offset, 4);
    }

    fn check_range(&self, offset: usize, len: usize) {
        assert!(
            offset.checked_add(len).is_some_and(|end| end <= self.len),
            "range {offset}+{len} outside region of {} bytes",
            self.len
        );
    }
}

impl Drop for SharedRegion {
    fn drop(&mut self) {
        match &self.backing {
            Backing::Heap(words) => {
                // SAFETY: `words` came from `Box::leak` in `anonymous`, is
                // freed only here, and no borrow of the region outlives `self`.
                drop(unsafe { Box::from_raw(words.as_ptr()) });
            }
            #[cfg(unix)]
            Backing::Mapped {
                path,
                base,
                map_len,
                ..
            } => {
                // SAFETY: `base`/`map_len` are exactly what mmap returned and
                // no borrow of the region outlives `self`.
                let rc = unsafe { libc::munmap(*base, *map_len) };
                if rc != 0 {
                    debug!(?path, "munmap failed: {}", std::io::Error::last_os_error());
                } else {
                    debug!(?path, "unmapped shared region");
                }
            }
        }
    }
}

impl std::fmt::Debug for SharedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.backing {
            Backing::Heap(_) => f
                .debug_struct("SharedRegion")
                .field("type", &"heap")
                .field("len", &self.len)
                .finish(),
            #[cfg(unix)]
            Backing::Mapped { path, .. } => f
                .debug_struct("SharedRegion")
                .field("type", &"mapped")
                .field("path", path)
                .field("len", &self.len)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_region_is_zeroed() {
        let region = SharedRegion::anonymous(10);
        assert_eq!(region.len(), 10);
        assert!(!region.is_mapped());
        assert_eq!(region.bytes(0, 10), &[0u8; 10]);
    }

    #[test]
    fn anonymous_region_survives_moves() {
        let mut region = SharedRegion::anonymous(16);
        region.write_u32(4, 97);

        let mut moved = vec![region];
        let mut region = moved.pop().unwrap();
        region.write_u32(8, 189);
        let region = Box::new(region);

        assert_eq!(region.read_u32(4), 97);
        assert_eq!(region.read_u32(8), 189);
        assert_eq!(region.bytes(0, 4), &[0u8; 4]);
    }

    #[test]
    fn fields_are_little_endian() {
        let mut region = SharedRegion::anonymous(16);
        region.write_u32(4, 0x0102_0304);
        assert_eq!(region.bytes(4, 4), &[4, 3, 2, 1]);
        assert_eq!(region.read_u32(4), 0x0102_0304);
        assert_eq!(region.read_u32(0), 0);
    }

    #[test]
    fn copy_in_and_out() {
        let mut region = SharedRegion::anonymous(12);
        region.copy_in(8, b"abcd");
        let mut out = [0u8; 4];
        region.copy_out(8, &mut out);
        assert_eq!(&out, b"abcd");
    }

    #[test]
    #[should_panic(expected = "outside region")]
    fn copy_past_end_panics() {
        let mut region = SharedRegion::anonymous(8);
        region.copy_in(6, b"abc");
    }

    #[test]
    #[should_panic(expected = "not 4-byte aligned")]
    fn misaligned_field_panics() {
        let region = SharedRegion::anonymous(8);
        region.read_u32(2);
    }

    #[test]
    #[cfg(unix)]
    fn mapped_file_is_shared_with_other_writers() {
        use std::os::unix::fs::FileExt;

        let dir = std::env::temp_dir().join(format!(
            "radiolink-region-map-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("region.bin");
        std::fs::File::create(&path).unwrap();

        let mut region = SharedRegion::map(&path, 0, 64).unwrap();
        assert!(region.is_mapped());
        assert_eq!(region.path(), Some(path.as_path()));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 64);

        // Another party writes the file; the mapping sees it.
        let other = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        other.write_all_at(&97u32.to_le_bytes(), 4).unwrap();
        assert_eq!(region.read_u32(4), 97);

        region.copy_in(8, b"frame");
        drop(region);
        let contents = std::fs::read(&path).unwrap();
        assert_eq!(&contents[8..13], b"frame");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn map_with_unaligned_page_offset() {
        let dir = std::env::temp_dir().join(format!(
            "radiolink-region-offset-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("region.bin");
        std::fs::write(&path, vec![0u8; 256]).unwrap();

        let mut region = SharedRegion::map(&path, 100, 16).unwrap();
        region.write_u32(0, 0xDEAD_BEEF);
        drop(region);

        let contents = std::fs::read(&path).unwrap();
        assert_eq!(&contents[100..104], &0xDEAD_BEEFu32.to_le_bytes());
        assert!(matches!(
            SharedRegion::map(&path, 2, 16),
            Err(QueueError::Misaligned { offset: 2 })
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn map_in_missing_directory_fails() {
        let err = SharedRegion::map("/nonexistent/radiolink/region", 0, 16).unwrap_err();
        assert!(matches!(err, QueueError::Open { .. }));
    }
}
