use crate::error::{Error, Result};
use crate::gpu::memory::{DeviceBuffer, DeviceShared, TransferStats};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use tracing::debug;

/// A data parallel executor with its own memory budget.
///
/// Kernels launched on a device run on a dedicated thread pool. Memory is only reachable
/// through [`DeviceBuffer`]s and moves to or from the host through explicit copies.
/// Clones refer to the same device.
#[derive(Debug, Clone)]
pub struct Device {
    pool: Arc<ThreadPool>,
    shared: Arc<DeviceShared>,
}

impl Device {
    /// Acquire device `device_num` with an unlimited memory budget.
    pub fn new(device_num: usize) -> Result<Self> {
        Self::build(device_num, None)
    }

    /// Acquire device `device_num` running kernels on `num_threads` workers.
    pub fn with_threads(device_num: usize, num_threads: usize) -> Result<Self> {
        Self::build(device_num, Some(num_threads))
    }

    fn build(device_num: usize, num_threads: Option<usize>) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new()
            .thread_name(move |i| format!("device-{}-{}", device_num, i));
        if let Some(n) = num_threads {
            builder = builder.num_threads(n.max(1));
        }
        let pool = builder.build().map_err(|err| {
            Error::Resource(format!("device {}: {}", device_num, err))
        })?;
        debug!(
            device_num,
            threads = pool.current_num_threads(),
            "acquired device"
        );
        Ok(Self {
            pool: Arc::new(pool),
            shared: Arc::new(DeviceShared::new(device_num)),
        })
    }

    /// Cap the memory held by buffers on this device at `bytes`.
    pub fn with_memory_limit(self, bytes: usize) -> Self {
        self.shared.set_limit(bytes);
        self
    }

    /// Device ordinal.
    pub fn device_num(&self) -> usize {
        self.shared.device_num
    }

    /// Memory budget, if any.
    pub fn memory_limit(&self) -> Option<usize> {
        self.shared.limit()
    }

    /// Bytes currently held by live buffers.
    pub fn memory_used(&self) -> usize {
        self.shared.used()
    }

    /// Number of kernel workers.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Traffic so far.
    pub fn transfer_stats(&self) -> TransferStats {
        self.shared.stats()
    }

    /// Allocate `len` default initialized elements.
    pub fn alloc<T: Copy + Default>(&self, len: usize) -> Result<DeviceBuffer<T>> {
        let buf = DeviceBuffer::alloc(&self.shared, len)?;
        debug!(
            device_num = self.device_num(),
            bytes = buf.size_in_bytes(),
            used = self.memory_used(),
            "allocated device buffer"
        );
        Ok(buf)
    }

    /// Allocate a buffer holding a copy of `host`.
    pub fn alloc_from_host<T: Copy + Default>(&self, host: &[T]) -> Result<DeviceBuffer<T>> {
        let mut buf = self.alloc(host.len())?;
        buf.copy_from_host(host)?;
        Ok(buf)
    }

    /// Run `op` on the device workers.
    pub(crate) fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        self.shared.record_launch();
        self.pool.install(op)
    }
}
