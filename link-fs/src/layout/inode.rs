use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};

use crate::layout::BlockId;
use crate::Result;
use crate::INODE_BLOCKS;

/// inode 表中的一条记录。
///
/// `links == 0` 即表示该槽位空闲。
#[binrw]
#[brw(little)]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiskInode {
    /// 已使用的字节数
    pub size: u32,
    /// 硬链接个数
    pub links: u32,
    /// 类型
    pub kind: InodeKind,
    /// 块编号，目前只有`blocks[0]`有意义
    pub blocks: [u32; INODE_BLOCKS],
}

#[binrw]
#[brw(repr = u32)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InodeKind {
    #[default]
    Regular = 0,
    Directory = 1,
}

impl DiskInode {
    /// 记录在磁盘上恒为76字节
    pub const SIZE: usize = 4 + 4 + 4 + 4 * INODE_BLOCKS;

    #[inline]
    pub fn new(kind: InodeKind, size: u32, links: u32, block: BlockId) -> Self {
        let mut blocks = [0; INODE_BLOCKS];
        blocks[0] = block.get();
        Self {
            size,
            links,
            kind,
            blocks,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == InodeKind::Directory
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.links == 0
    }

    /// 唯一的数据块
    #[inline]
    pub fn data_block(&self) -> BlockId {
        BlockId::new(self.blocks[0])
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(Self::read(&mut Cursor::new(bytes))?)
    }

    pub fn encode(&self) -> Result<[u8; Self::SIZE]> {
        let mut buf = [0; Self::SIZE];
        self.write(&mut Cursor::new(buf.as_mut_slice()))?;
        Ok(buf)
    }
}
