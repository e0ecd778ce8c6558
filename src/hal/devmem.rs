//! `/dev/mem` register mapping.
//!
//! Maps the single page that contains the PIO bank with `MAP_SHARED`
//! read/write access and hands out volatile 32-bit word access into it.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::{AsRawFd, IntoRawFd};
use std::path::PathBuf;
use std::ptr::NonNull;

use crate::config::GpioConfig;
use crate::error::{GpioError, GpioResult};
use crate::gpio::layout::{self, BANK_SPAN, M1_GPIO_BASE};
use crate::traits::{MemoryMapper, RegisterBank};

/// Default physical memory device.
pub const DEV_MEM: &str = "/dev/mem";

/// Platform page size.
pub fn page_size() -> io::Result<usize> {
    // SAFETY: sysconf has no memory-safety preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size <= 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(size as usize)
}

/// Split a physical address into (page base, in-page offset).
#[inline]
pub const fn page_split(address: usize, page_size: usize) -> (usize, usize) {
    let base = address & !(page_size - 1);
    (base, address - base)
}

/// Maps the GPIO page from a physical memory device.
#[derive(Clone, Debug)]
pub struct DevMemMapper {
    device: PathBuf,
    base_address: usize,
}

impl Default for DevMemMapper {
    fn default() -> Self {
        Self::new(DEV_MEM, M1_GPIO_BASE)
    }
}

impl DevMemMapper {
    /// Mapper for the bank at `base_address` on `device`.
    pub fn new(device: impl Into<PathBuf>, base_address: usize) -> Self {
        Self {
            device: device.into(),
            base_address,
        }
    }

    /// Build from the shared configuration.
    pub fn from_config(config: &GpioConfig) -> Self {
        Self::new(config.device.as_str(), config.base_address)
    }

    /// Physical base address of the GPIO bank.
    pub fn base_address(&self) -> usize {
        self.base_address
    }
}

impl MemoryMapper for DevMemMapper {
    type Region = DevMem;
    type Error = GpioError;

    fn map(&self) -> GpioResult<DevMem> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.device)
            .map_err(|source| GpioError::Open {
                path: self.device.display().to_string(),
                source,
            })?;

        let map_err = |source: io::Error| GpioError::Map {
            address: self.base_address,
            source,
        };
        let len = page_size().map_err(map_err)?;
        let (page_base, bank_offset) = page_split(self.base_address, len);
        if bank_offset + BANK_SPAN > len {
            return Err(GpioError::BankOutsidePage {
                offset: bank_offset,
                page_size: len,
            });
        }
        let file_offset = libc::off_t::try_from(page_base)
            .map_err(|_| map_err(io::Error::from(io::ErrorKind::InvalidInput)))?;

        // SAFETY: fresh mapping chosen by the kernel, backed by an open fd.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                file_offset,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(map_err(io::Error::last_os_error()));
        }
        let ptr = NonNull::new(ptr.cast::<u8>())
            .ok_or_else(|| map_err(io::Error::from(io::ErrorKind::AddrNotAvailable)))?;

        log::info!(
            "mapped {} page {:#010x} ({} bytes), GPIO bank at +{:#x}",
            self.device.display(),
            page_base,
            len,
            bank_offset
        );

        Ok(DevMem {
            ptr: Some(ptr),
            len,
            bank_offset,
            file: Some(file),
        })
    }

    fn unmap(&self, region: DevMem) -> GpioResult<()> {
        region.close()
    }
}

/// A live mapping of the GPIO page.
///
/// Owns both the mapping and the device handle. [`close`](Self::close)
/// releases them and reports failures; dropping releases them silently.
#[derive(Debug)]
pub struct DevMem {
    ptr: Option<NonNull<u8>>,
    len: usize,
    bank_offset: usize,
    file: Option<File>,
}

// SAFETY: the pointer refers to device memory owned by this value; the
// facade serialises access behind a mutex.
unsafe impl Send for DevMem {}

impl DevMem {
    /// Unmap the page and close the device, attempting both even if the
    /// first step fails. Returns the first failure.
    pub fn close(mut self) -> GpioResult<()> {
        self.release()
    }

    fn release(&mut self) -> GpioResult<()> {
        let mut first_err = None;

        if let Some(ptr) = self.ptr.take() {
            // SAFETY: ptr/len came from a successful mmap and are unmapped once.
            if unsafe { libc::munmap(ptr.as_ptr().cast(), self.len) } != 0 {
                first_err = Some(io::Error::last_os_error());
            }
        }

        if let Some(file) = self.file.take() {
            let fd = file.into_raw_fd();
            // SAFETY: fd was just released from its File, so it is closed once.
            if unsafe { libc::close(fd) } != 0 && first_err.is_none() {
                first_err = Some(io::Error::last_os_error());
            }
        }

        match first_err {
            Some(err) => Err(GpioError::Unmap(err)),
            None => Ok(()),
        }
    }

    fn word_ptr(&self, offset: usize) -> GpioResult<*mut u32> {
        let ptr = self.ptr.ok_or(GpioError::NotInitialized)?;
        layout::check_word(offset, self.len)?;
        // SAFETY: offset + 4 <= len and offset is word aligned.
        Ok(unsafe { ptr.as_ptr().add(offset) }.cast::<u32>())
    }
}

impl RegisterBank for DevMem {
    type Error = GpioError;

    fn len(&self) -> usize {
        self.len
    }

    fn bank_offset(&self) -> usize {
        self.bank_offset
    }

    fn read_word(&self, offset: usize) -> GpioResult<u32> {
        let word = self.word_ptr(offset)?;
        // SAFETY: in-bounds, aligned pointer into a live mapping.
        Ok(unsafe { std::ptr::read_volatile(word) })
    }

    fn write_word(&mut self, offset: usize, value: u32) -> GpioResult<()> {
        let word = self.word_ptr(offset)?;
        // SAFETY: in-bounds, aligned pointer into a live mapping.
        unsafe { std::ptr::write_volatile(word, value) };
        Ok(())
    }
}

impl Drop for DevMem {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            log::warn!("releasing GPIO mapping on drop: {err}");
        }
    }
}
