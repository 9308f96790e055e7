//! # 磁盘数据结构层
//!
//! link-fs 的磁盘布局，各区域首尾相接：
//! 索引节点表 | 块位图 | 数据块区域
//!
//! 镜像没有超级块，区域的位置完全由 [`Geometry`] 推出，
//! 所有对设备的访问都经过这里的偏移计算。

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::{DiskInode, InodeKind};

/// 目录项，也属于磁盘文件系统数据结构
mod dir_entry;
pub use dir_entry::{DirEntry, ENTRIES_PER_BLOCK};

use derive_more::{Display, From, Into};

use crate::{Error, Result};
use crate::{BLOCK_SIZE, INODE_BLOCKS};

/// inode 编号，1起
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct InodeId(u32);

/// 数据块编号，0起，即块在位图中的位序
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct BlockId(u32);

impl InodeId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl BlockId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// 镜像的规模：inode 表的槽数与数据块的块数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub inodes: u32,
    pub blocks: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Geometry {
    /// 1024 个 inode，每个 inode 能用满 16 个块时所需的块数
    pub const DEFAULT: Self = Self {
        inodes: 1024,
        blocks: (INODE_BLOCKS * 1024 * 8) as u32,
    };

    #[inline]
    pub const fn new(inodes: u32, blocks: u32) -> Self {
        Self { inodes, blocks }
    }

    pub fn validate(self) -> Result<Self> {
        if self.inodes == 0 || self.blocks == 0 {
            return Err(Error::InvalidGeometry);
        }
        Ok(self)
    }

    /// 位图占用的字节数，每块一位
    #[inline]
    pub fn bitmap_bytes(&self) -> usize {
        (self.blocks as usize).div_ceil(8)
    }

    /// inode 表占用的字节数
    #[inline]
    pub fn inode_table_bytes(&self) -> u64 {
        u64::from(self.inodes) * DiskInode::SIZE as u64
    }

    /// 编号为`id`的 inode 记录的字节偏移，不检查越界
    #[inline]
    pub fn inode_offset(&self, id: InodeId) -> u64 {
        (u64::from(id.0) - 1) * DiskInode::SIZE as u64
    }

    /// 位图紧跟在 inode 表之后
    #[inline]
    pub fn bitmap_offset(&self) -> u64 {
        self.inode_table_bytes()
    }

    /// 编号为`id`的数据块的字节偏移，不检查越界
    #[inline]
    pub fn block_offset(&self, id: BlockId) -> u64 {
        self.bitmap_offset() + self.bitmap_bytes() as u64 + u64::from(id.0) * BLOCK_SIZE as u64
    }

    /// 整个镜像的字节数
    #[inline]
    pub fn image_len(&self) -> u64 {
        self.block_offset(BlockId(self.blocks))
    }

    #[inline]
    pub fn contains_inode(&self, id: InodeId) -> bool {
        (1..=self.inodes).contains(&id.0)
    }

    #[inline]
    pub fn contains_block(&self, id: BlockId) -> bool {
        id.0 < self.blocks
    }

    /// 按编号升序遍历全部 inode
    pub fn inode_ids(&self) -> impl Iterator<Item = InodeId> {
        (1..=self.inodes).map(InodeId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_sizes() {
        assert_eq!(76, DiskInode::SIZE);
        assert_eq!(68, DirEntry::SIZE);
        assert_eq!(7, ENTRIES_PER_BLOCK);
    }

    #[test]
    fn default_layout() {
        let geo = Geometry::DEFAULT;
        assert_eq!(16384, geo.bitmap_bytes());
        assert_eq!(0, geo.inode_offset(InodeId(1)));
        assert_eq!(76, geo.inode_offset(InodeId(2)));
        assert_eq!(77824, geo.bitmap_offset());
        assert_eq!(94208, geo.block_offset(BlockId(0)));
        assert_eq!(94208 + 3 * 512, geo.block_offset(BlockId(3)));
        assert_eq!(94208 + 131072 * 512, geo.image_len());
    }

    #[test]
    fn ragged_bitmap() {
        let geo = Geometry::new(4, 10);
        assert_eq!(2, geo.bitmap_bytes());
        assert_eq!(4 * 76 + 2, geo.block_offset(BlockId(0)));
        assert!(geo.contains_block(BlockId(9)));
        assert!(!geo.contains_block(BlockId(10)));
    }

    #[test]
    fn inode_range() {
        let geo = Geometry::new(4, 8);
        assert!(!geo.contains_inode(InodeId(0)));
        assert!(geo.contains_inode(InodeId(4)));
        assert!(!geo.contains_inode(InodeId(5)));
        assert_eq!(vec![1, 2, 3, 4], geo.inode_ids().map(InodeId::get).collect::<Vec<_>>());
        assert!(matches!(Geometry::new(0, 8).validate(), Err(Error::InvalidGeometry)));
    }
}
