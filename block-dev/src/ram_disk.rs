use std::io;
use std::sync::{Mutex, MutexGuard};

use crate::BlockDevice;

/// 内存中的镜像，读写都发生在一段连续的字节上
#[derive(Debug, Default)]
pub struct RamDisk(Mutex<Vec<u8>>);

impl RamDisk {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 镜像当前的字节数
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 拷贝出整个镜像
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BlockDevice for RamDisk {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let data = self.lock();
        let start = usize::try_from(offset).map_err(|_| out_of_range(offset))?;
        let end = start
            .checked_add(buf.len())
            .filter(|&end| end <= data.len())
            .ok_or_else(|| out_of_range(offset))?;

        buf.copy_from_slice(&data[start..end]);
        Ok(())
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<()> {
        let mut data = self.lock();
        let start = usize::try_from(offset).map_err(|_| out_of_range(offset))?;
        let end = start
            .checked_add(buf.len())
            .ok_or_else(|| out_of_range(offset))?;

        // 写越过末尾时，空洞补零
        if end > data.len() {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        Ok(())
    }
}

fn out_of_range(offset: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("access at {offset:#x} runs past the end of the ram disk"),
    )
}
