use crate::error::{check_size, Error, Result};
use std::mem::size_of;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Accounting shared by a device and every buffer allocated on it.
#[derive(Debug)]
pub(crate) struct DeviceShared {
    pub(crate) device_num: usize,
    limit: AtomicUsize,
    used: AtomicUsize,
    peak: AtomicUsize,
    uploads: AtomicUsize,
    downloads: AtomicUsize,
    bytes_uploaded: AtomicUsize,
    bytes_downloaded: AtomicUsize,
    launches: AtomicUsize,
}

impl DeviceShared {
    pub(crate) fn new(device_num: usize) -> Self {
        Self {
            device_num,
            limit: AtomicUsize::new(usize::MAX),
            used: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
            bytes_uploaded: AtomicUsize::new(0),
            bytes_downloaded: AtomicUsize::new(0),
            launches: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_limit(&self, bytes: usize) {
        self.limit.store(bytes, Ordering::SeqCst);
    }

    pub(crate) fn limit(&self) -> Option<usize> {
        match self.limit.load(Ordering::SeqCst) {
            usize::MAX => None,
            l => Some(l),
        }
    }

    pub(crate) fn used(&self) -> usize {
        self.used.load(Ordering::SeqCst)
    }

    fn reserve(&self, bytes: usize) -> Result<()> {
        let limit = self.limit.load(Ordering::SeqCst);
        let reserved = self
            .used
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                used.checked_add(bytes).filter(|total| *total <= limit)
            });
        match reserved {
            Ok(before) => {
                self.peak.fetch_max(before + bytes, Ordering::SeqCst);
                Ok(())
            }
            Err(used) => Err(Error::Resource(format!(
                "device {}: cannot allocate {} bytes, {} of {} in use",
                self.device_num, bytes, used, limit
            ))),
        }
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::SeqCst);
    }

    pub(crate) fn record_launch(&self) {
        self.launches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stats(&self) -> TransferStats {
        TransferStats {
            uploads: self.uploads.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            launches: self.launches.load(Ordering::Relaxed),
            peak_memory: self.peak.load(Ordering::SeqCst),
        }
    }
}

/// Snapshot of the traffic between host and device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Host to device copies.
    pub uploads: usize,
    /// Device to host copies.
    pub downloads: usize,
    /// Bytes copied to the device.
    pub bytes_uploaded: usize,
    /// Bytes copied back to the host.
    pub bytes_downloaded: usize,
    /// Kernel launches.
    pub launches: usize,
    /// Most device memory held at once.
    pub peak_memory: usize,
}

/// A fixed size array in device memory.
///
/// The allocation is charged to its device when created and returned when the buffer
/// is dropped, whichever path drops it.
#[derive(Debug)]
pub struct DeviceBuffer<T> {
    data: Vec<T>,
    shared: Arc<DeviceShared>,
}

impl<T: Copy + Default> DeviceBuffer<T> {
    pub(crate) fn alloc(shared: &Arc<DeviceShared>, len: usize) -> Result<Self> {
        let bytes = len.checked_mul(size_of::<T>()).ok_or_else(|| {
            Error::Resource(format!("buffer of {} elements overflows", len))
        })?;
        shared.reserve(bytes)?;
        Ok(Self {
            data: vec![T::default(); len],
            shared: Arc::clone(shared),
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero length buffer.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes charged to the device.
    pub fn size_in_bytes(&self) -> usize {
        self.data.len() * size_of::<T>()
    }

    /// Overwrite the buffer with `host`, which must have the same length.
    pub fn copy_from_host(&mut self, host: &[T]) -> Result<()> {
        check_size(self.data.len(), host.len())?;
        self.data.copy_from_slice(host);
        self.shared.uploads.fetch_add(1, Ordering::Relaxed);
        self.shared
            .bytes_uploaded
            .fetch_add(self.size_in_bytes(), Ordering::Relaxed);
        Ok(())
    }

    /// Copy the buffer into `host`, which must have the same length.
    pub fn copy_to_host(&self, host: &mut [T]) -> Result<()> {
        check_size(self.data.len(), host.len())?;
        host.copy_from_slice(&self.data);
        self.count_download();
        Ok(())
    }

    /// Copy the buffer into a new host vector.
    pub fn download(&self) -> Vec<T> {
        self.count_download();
        self.data.clone()
    }

    fn count_download(&self) {
        self.shared.downloads.fetch_add(1, Ordering::Relaxed);
        self.shared
            .bytes_downloaded
            .fetch_add(self.size_in_bytes(), Ordering::Relaxed);
    }

    /// Device side view, used by kernels.
    pub(crate) fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Device side mutable view, used by kernels.
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        self.shared.release(self.data.len() * size_of::<T>());
    }
}
