//! Named shared-memory region lifecycle.
//!
//! A region name like `"shijim_market_data_l2"` is translated to a backing
//! file path (`/dev/shm` on Linux, the temp dir elsewhere); absolute paths
//! pass through untouched so tests can place regions wherever they like.
//! The producer maps read-write and initializes the header; consumers map
//! read-only and validate magic/version/geometry before touching a byte.
//! The mmap protection flags are what enforce the consumer-side read-only
//! contract. Mappings are released on drop; the backing file persists until
//! unlinked, which is the caller's naming discipline.

use crate::clock::epoch_ns;
use crate::error::RingError;
use crate::layout::{REGION_HEADER_SIZE, RegionHeader, RingConfig};
use memmap2::{Mmap, MmapMut};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::ptr;

/// Translates a region name to its backing file path.
pub fn region_path(name: &str) -> PathBuf {
    let p = Path::new(name);
    if p.is_absolute() {
        return p.to_path_buf();
    }
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/dev/shm").join(name)
    }
    #[cfg(not(target_os = "linux"))]
    {
        std::env::temp_dir().join(name)
    }
}

fn map_err(name: &str, source: io::Error) -> RingError {
    if source.kind() == io::ErrorKind::AlreadyExists {
        RingError::AlreadyExists {
            name: name.to_string(),
        }
    } else {
        RingError::Map {
            name: name.to_string(),
            source,
        }
    }
}

/// Producer-owned read-write mapping. Created once per region; owns header
/// initialization.
#[derive(Debug)]
pub struct WritableRegion {
    /// Unmapped on drop. The backing file descriptor is closed as soon as
    /// the mapping exists; the mapping stays valid without it.
    mmap: MmapMut,
    cfg: RingConfig,
}

impl WritableRegion {
    /// Creates and initializes a region. Fails with `AlreadyExists` when the
    /// backing file is present and `force` is not set; with `force`, the file
    /// is truncated and re-initialized (stale consumers will see cursor 0).
    pub fn create(name: &str, cfg: RingConfig, force: bool) -> Result<Self, RingError> {
        cfg.validate()?;
        let path = region_path(name);

        let mut opts = OpenOptions::new();
        opts.read(true).write(true);
        if force {
            opts.create(true).truncate(true);
        } else {
            opts.create_new(true);
        }
        let file = opts.open(&path).map_err(|e| map_err(name, e))?;

        // set_len zeroes every byte it adds, so the slots start in the
        // never-written state and write_cursor == 0 gates readers off them.
        file.set_len(cfg.region_bytes() as u64)
            .map_err(|e| map_err(name, e))?;

        // SAFETY: the file was just created/truncated and sized by this
        // process; nobody else holds it under our naming discipline.
        let mut mmap = unsafe { MmapMut::map_mut(&file) }.map_err(|e| map_err(name, e))?;

        // SAFETY: the mapping covers at least REGION_HEADER_SIZE bytes.
        unsafe {
            let h = mmap.as_mut_ptr() as *mut RegionHeader;
            ptr::write(h, RegionHeader::new(cfg, std::process::id(), epoch_ns()));
        }

        Ok(Self { mmap, cfg })
    }

    #[inline(always)]
    pub fn config(&self) -> RingConfig {
        self.cfg
    }

    #[inline(always)]
    pub fn header(&mut self) -> &RegionHeader {
        // SAFETY: create() wrote a valid header at offset 0 and the mapping
        // outlives self.
        unsafe { &*(self.mmap.as_mut_ptr() as *const RegionHeader) }
    }

    /// Base pointer of the mapped region (the header).
    #[inline(always)]
    pub fn base(&mut self) -> *mut u8 {
        self.mmap.as_mut_ptr()
    }

    /// Base pointer of the first slot.
    #[inline(always)]
    pub fn slots_base(&mut self) -> *mut u8 {
        // SAFETY: the region is sized for header + slots.
        unsafe { self.mmap.as_mut_ptr().add(REGION_HEADER_SIZE) }
    }
}

/// Consumer-side read-only mapping, validated at attach.
#[derive(Debug)]
pub struct SharedRegion {
    /// Read-only mapping of the whole region; unmapped on drop.
    mmap: Mmap,
    cfg: RingConfig,
}

impl SharedRegion {
    /// Attaches to an existing region read-only.
    ///
    /// Refuses regions whose magic or version does not match, whose geometry
    /// is invalid, or whose backing file is smaller than the header implies.
    pub fn attach(name: &str) -> Result<Self, RingError> {
        let path = region_path(name);
        let file = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| map_err(name, e))?;

        // SAFETY: read-only mapping; concurrent producer writes are handled
        // by the slot protocol, never by aliasing rules on this struct.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| map_err(name, e))?;

        // A truncated or zero-sized file cannot even hold the header; check
        // before the magic is read.
        if mmap.len() < REGION_HEADER_SIZE {
            return Err(RingError::Undersized {
                actual: mmap.len(),
                required: REGION_HEADER_SIZE,
            });
        }

        // SAFETY: the mapping is at least header-sized; validate() rejects
        // anything that is not one of our regions before geometry is trusted.
        let cfg = unsafe { (*(mmap.as_ptr() as *const RegionHeader)).validate()? };

        let required = cfg.region_bytes();
        if mmap.len() < required {
            return Err(RingError::Undersized {
                actual: mmap.len(),
                required,
            });
        }

        Ok(Self { mmap, cfg })
    }

    #[inline(always)]
    pub fn config(&self) -> RingConfig {
        self.cfg
    }

    #[inline(always)]
    pub fn header(&self) -> &RegionHeader {
        // SAFETY: attach() validated a RegionHeader at offset 0.
        unsafe { &*(self.mmap.as_ptr() as *const RegionHeader) }
    }

    /// Base pointer of the first slot.
    #[inline(always)]
    pub fn slots_base(&self) -> *const u8 {
        // SAFETY: attach() verified the mapping covers header + slots.
        unsafe { self.mmap.as_ptr().add(REGION_HEADER_SIZE) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn unique_path(tag: &str) -> String {
        format!(
            "/tmp/shijim_region_{tag}_{}_{}",
            std::process::id(),
            crate::clock::monotonic_ns()
        )
    }

    #[test]
    fn create_then_attach_roundtrips_geometry() {
        let name = unique_path("geom");
        let cfg = RingConfig::new(256, 64);

        let _w = WritableRegion::create(&name, cfg, false).unwrap();
        let r = SharedRegion::attach(&name).unwrap();
        assert_eq!(r.config().slot_size, 256);
        assert_eq!(r.config().slot_count, 64);
        assert_eq!(r.header().producer_pid, std::process::id());

        let _ = std::fs::remove_file(&name);
    }

    #[test]
    fn create_refuses_existing_region_without_force() {
        let name = unique_path("force");
        let cfg = RingConfig::new(256, 64);

        let first = WritableRegion::create(&name, cfg, false).unwrap();
        drop(first);

        match WritableRegion::create(&name, cfg, false) {
            Err(RingError::AlreadyExists { .. }) => {}
            other => panic!("expected AlreadyExists, got {other:?}"),
        }

        // force re-creates in place
        WritableRegion::create(&name, cfg, true).unwrap();

        let _ = std::fs::remove_file(&name);
    }

    #[test]
    fn attach_rejects_foreign_files() {
        let name = unique_path("magic");
        {
            let mut f = std::fs::File::create(&name).unwrap();
            f.write_all(&[0u8; 256]).unwrap();
        }
        match SharedRegion::attach(&name) {
            Err(RingError::BadMagic { found: 0 }) => {}
            other => panic!("expected BadMagic, got {other:?}"),
        }
        let _ = std::fs::remove_file(&name);
    }

    /// A file too short to hold even the header is rejected before any
    /// field of it is interpreted.
    #[test]
    fn attach_rejects_undersized_region() {
        let name = unique_path("short");
        {
            let mut f = std::fs::File::create(&name).unwrap();
            f.write_all(&[0u8; 64]).unwrap();
        }
        match SharedRegion::attach(&name) {
            Err(RingError::Undersized { actual: 64, required }) => {
                assert_eq!(required, REGION_HEADER_SIZE);
            }
            other => panic!("expected Undersized, got {other:?}"),
        }
        let _ = std::fs::remove_file(&name);
    }

    #[test]
    fn attach_rejects_missing_region() {
        assert!(matches!(
            SharedRegion::attach("/tmp/shijim_region_does_not_exist"),
            Err(RingError::Map { .. })
        ));
    }
}
