//! Firmware staging into a realized region.
//!
//! The loader's boot contract is write-once into ROM: flash accepts the
//! image at boot time, RAM and overlay regions do not. Runtime
//! write-protection semantics are out of scope here.

use bytes::Bytes;

use crate::error::{Result, TopologyError};
use crate::space::{AddressSpace, RegionKind};

/// A firmware image: the byte blob and a human-readable source tag.
#[derive(Debug, Clone)]
pub struct FirmwareImage {
    bytes: Bytes,
    source: String,
}

impl FirmwareImage {
    /// Wrap an image blob.
    pub fn new(bytes: impl Into<Bytes>, source: impl Into<String>) -> Self {
        Self { bytes: bytes.into(), source: source.into() }
    }

    /// Image bytes.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Image length in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Whether the image is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Source tag (file name, build id, …).
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Immutable record of a completed load.
#[derive(Debug, Clone)]
pub struct LoadRecord {
    region: String,
    base: u64,
    offset: u64,
    staged: Bytes,
    source: String,
}

impl LoadRecord {
    /// Target region id.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// First absolute address occupied by the image.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.base + self.offset
    }

    /// One-past-the-end absolute address.
    #[must_use]
    pub fn end(&self) -> u64 {
        self.start() + self.staged.len() as u64
    }

    /// Image length in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.staged.len() as u64
    }

    /// Whether the staged image is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// The staged bytes, as the execution core will see them.
    #[must_use]
    pub fn staged(&self) -> &Bytes {
        &self.staged
    }

    /// Source tag of the image.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Stages firmware images into the address space it is bound to.
#[derive(Debug)]
pub struct FirmwareLoader<'a> {
    space: &'a AddressSpace,
}

impl<'a> FirmwareLoader<'a> {
    /// Bind a loader to an address space.
    #[must_use]
    pub const fn new(space: &'a AddressSpace) -> Self {
        Self { space }
    }

    /// Stage `image` into `region_id` at `offset`.
    ///
    /// # Errors
    ///
    /// `UnknownRegion`; `RegionKind` when the target is not ROM;
    /// `OutOfBounds` when `offset + image.len()` exceeds the region size.
    pub fn load(&self, image: &FirmwareImage, region_id: &str, offset: u64) -> Result<LoadRecord> {
        let region = self
            .space
            .region(region_id)
            .ok_or_else(|| TopologyError::unknown_region(region_id))?;

        if region.kind() != RegionKind::Rom {
            return Err(TopologyError::RegionKind {
                region: region_id.to_owned(),
                kind: region.kind().to_string(),
            });
        }

        let end = offset
            .checked_add(image.len())
            .ok_or_else(|| TopologyError::OutOfBounds {
                region: region_id.to_owned(),
                offset,
                end: u64::MAX,
                size: region.size(),
            })?;
        if end > region.size() {
            return Err(TopologyError::OutOfBounds {
                region: region_id.to_owned(),
                offset,
                end,
                size: region.size(),
            });
        }

        tracing::info!(
            region = region_id,
            len = image.len(),
            offset = %format_args!("{offset:#x}"),
            source = image.source(),
            "firmware staged"
        );
        Ok(LoadRecord {
            region: region_id.to_owned(),
            base: region.base(),
            offset,
            staged: image.bytes().clone(),
            source: image.source().to_owned(),
        })
    }
}
