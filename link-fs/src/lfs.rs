//! # 磁盘管理层
//!
//! 持有块设备与内存中的块位图，构建出磁盘的布局并使用。
//! 除位图外不缓存任何结构：inode 与数据块每次都从设备读出，改完立即写回。

use std::sync::Arc;

use block_dev::BlockDevice;

use crate::layout::{Bitmap, BlockId, DiskInode, Geometry, InodeId};
use crate::DataBlock;
use crate::{Error, Result};
use crate::{BLOCK_SIZE, ROOT};

#[derive(Debug)]
pub struct LinkFileSystem {
    block_device: Arc<dyn BlockDevice>,
    geometry: Geometry,
    block_bitmap: Bitmap,
}

impl LinkFileSystem {
    /// 在设备上创建新的文件系统：清空 inode 表与位图，
    /// 并建立以自身为父目录的根目录。
    pub fn format(block_device: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self> {
        let geometry = geometry.validate()?;

        // inode 表与位图紧挨着，一并清零
        let metadata_len = geometry.inode_table_bytes() as usize + geometry.bitmap_bytes();
        block_device.write_at(0, &vec![0u8; metadata_len])?;
        // 写入最后一个字节，让镜像撑满整个数据块区域
        block_device.write_at(geometry.image_len() - 1, &[0])?;

        let mut lfs = Self {
            block_bitmap: Bitmap::new(&geometry),
            block_device,
            geometry,
        };
        lfs.init_dir(ROOT, ROOT)?;
        lfs.block_device.flush()?;

        log::info!(
            "Formatted image: {} inodes, {} blocks, {} bytes",
            geometry.inodes,
            geometry.blocks,
            geometry.image_len()
        );
        Ok(lfs)
    }

    /// 打开已有的文件系统，载入持久化的位图
    pub fn open(block_device: Arc<dyn BlockDevice>, geometry: Geometry) -> Result<Self> {
        let geometry = geometry.validate()?;
        let block_bitmap = Bitmap::load(&geometry, block_device.as_ref())?;

        let lfs = Self {
            block_device,
            geometry,
            block_bitmap,
        };

        let root = lfs.read_inode(ROOT)?;
        if !root.is_dir() || root.links < 2 {
            return Err(Error::InvalidImage);
        }

        log::info!(
            "Opened image: {} of {} blocks in use",
            lfs.block_bitmap.allocated(),
            geometry.blocks
        );
        Ok(lfs)
    }

    /// 同步设备并释放句柄
    pub fn close(self) -> Result<()> {
        self.block_device.flush()?;
        log::info!("Closed image");
        Ok(())
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// 空闲的数据块数
    #[inline]
    pub fn free_blocks(&self) -> u32 {
        self.block_bitmap.capacity() - self.block_bitmap.allocated()
    }

    #[inline]
    pub fn is_block_allocated(&self, id: BlockId) -> bool {
        self.block_bitmap.is_allocated(id)
    }

    /// 按编号读出 inode 记录
    pub fn read_inode(&self, id: InodeId) -> Result<DiskInode> {
        let offset = self.inode_offset(id)?;
        let mut buf = [0; DiskInode::SIZE];
        self.block_device.read_at(offset, &mut buf)?;
        DiskInode::decode(&buf)
    }

    /// 按编号原地写回 inode 记录
    pub fn write_inode(&self, id: InodeId, inode: &DiskInode) -> Result<()> {
        let offset = self.inode_offset(id)?;
        self.block_device.write_at(offset, &inode.encode()?)?;
        Ok(())
    }

    /// 从1号开始线性扫描，返回第一个空闲 inode 的编号。
    /// 扫描本身不占用该槽位，写入记录后才算分配。
    pub fn find_free_inode(&self) -> Result<InodeId> {
        for id in self.geometry.inode_ids() {
            if self.read_inode(id)?.is_free() {
                log::debug!("Found free inode {id}");
                return Ok(id);
            }
        }

        Err(Error::NoFreeInode)
    }

    /// 在磁盘上分配新的数据块并返回其ID
    #[inline]
    pub fn alloc_block(&mut self) -> Result<BlockId> {
        self.block_bitmap.alloc(self.block_device.as_ref())
    }

    #[inline]
    pub fn dealloc_block(&mut self, id: BlockId) -> Result<()> {
        self.block_bitmap.dealloc(self.block_device.as_ref(), id)
    }
}

impl LinkFileSystem {
    pub(crate) fn read_block(&self, id: BlockId) -> Result<DataBlock> {
        let mut block = [0; BLOCK_SIZE];
        self.block_device
            .read_at(self.geometry.block_offset(id), &mut block)?;
        Ok(block)
    }

    /// 从块内偏移`offset`处写入`data`，不能越过块尾
    pub(crate) fn write_block(&self, id: BlockId, offset: usize, data: &[u8]) -> Result<()> {
        debug_assert!(offset + data.len() <= BLOCK_SIZE);
        self.block_device
            .write_at(self.geometry.block_offset(id) + offset as u64, data)?;
        Ok(())
    }

    fn inode_offset(&self, id: InodeId) -> Result<u64> {
        if !self.geometry.contains_inode(id) {
            return Err(Error::InvalidInode(id));
        }
        Ok(self.geometry.inode_offset(id))
    }
}
