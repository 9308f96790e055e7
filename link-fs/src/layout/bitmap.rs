use block_dev::BlockDevice;

use crate::layout::{BlockId, Geometry};
use crate::{Error, Result};

/// 块位图，记录数据块区域的分配情况：位为1即已分配。
///
/// 内存中常驻一份副本，每次修改都立刻写回设备。
#[derive(Debug)]
pub struct Bitmap {
    /// 位图在镜像中的起始偏移
    offset: u64,
    /// 位图所指示区域的总块数
    capacity: u32,
    bits: Vec<u8>,
}

impl Bitmap {
    /// 全部空闲的位图
    pub fn new(geometry: &Geometry) -> Self {
        Self {
            offset: geometry.bitmap_offset(),
            capacity: geometry.blocks,
            bits: vec![0; geometry.bitmap_bytes()],
        }
    }

    /// 读出镜像中持久化的位图
    pub fn load(geometry: &Geometry, block_device: &dyn BlockDevice) -> Result<Self> {
        let mut bitmap = Self::new(geometry);
        block_device.read_at(bitmap.offset, &mut bitmap.bits)?;
        Ok(bitmap)
    }

    /// 整个位图写回设备
    pub fn persist(&self, block_device: &dyn BlockDevice) -> Result<()> {
        block_device.write_at(self.offset, &self.bits)?;
        Ok(())
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// 已分配的块数
    pub fn allocated(&self) -> u32 {
        self.bits.iter().map(|bits| bits.count_ones()).sum()
    }

    pub fn is_allocated(&self, id: BlockId) -> bool {
        let (byte_index, bit) = Self::pos(id);
        self.bits
            .get(byte_index)
            .is_some_and(|&bits| bits & (1 << bit) != 0)
    }

    /// 分配编号最小的空闲块。
    /// 若位图的空间用尽，则报错且不改动位图。
    pub fn alloc(&mut self, block_device: &dyn BlockDevice) -> Result<BlockId> {
        // 字节按下标升序，字节内按位从低到高
        let (byte_index, bit) = self
            .bits
            .iter()
            .enumerate()
            .find_map(|(byte_index, &bits)| {
                (bits != u8::MAX).then_some((byte_index, bits.trailing_ones()))
            })
            .ok_or(Error::NoFreeBlock)?;

        // 最后一个字节可能有超出块数的位
        let id = byte_index as u64 * 8 + u64::from(bit);
        if id >= u64::from(self.capacity) {
            return Err(Error::NoFreeBlock);
        }

        self.bits[byte_index] |= 1 << bit;
        self.sync(byte_index, block_device)?;

        let id = BlockId::new(id as u32);
        log::debug!("Allocated block {id}");
        Ok(id)
    }

    /// 释放块。块必须在位图范围内且已被分配。
    pub fn dealloc(&mut self, block_device: &dyn BlockDevice, id: BlockId) -> Result<()> {
        if id.get() >= self.capacity || !self.is_allocated(id) {
            return Err(Error::BlockNotAllocated(id));
        }

        let (byte_index, bit) = Self::pos(id);
        self.bits[byte_index] &= !(1 << bit);
        self.sync(byte_index, block_device)?;

        log::debug!("Deallocated block {id}");
        Ok(())
    }
}

impl Bitmap {
    /// 块编号在位图中的位置：**字节下标**以及**字节内的位**
    #[inline]
    fn pos(id: BlockId) -> (usize, u32) {
        ((id.get() / 8) as usize, id.get() % 8)
    }

    /// 只写回改动的那一字节
    fn sync(&self, byte_index: usize, block_device: &dyn BlockDevice) -> Result<()> {
        block_device.write_at(
            self.offset + byte_index as u64,
            &self.bits[byte_index..=byte_index],
        )?;
        Ok(())
    }
}
