/* link-fs 的整体架构，自上而下 */

// 索引节点层：目录项的链接与解链、路径解析、文件读写
mod vfs;
pub use vfs::{Stat, StatKind};

// 路径的拆分
mod path;
pub use path::Path;

// 磁盘管理层：inode 表、块位图与镜像的生命周期
mod lfs;
pub use lfs::LinkFileSystem;

// 磁盘数据结构层：布局计算与各类记录的编解码
pub mod layout;
pub use layout::{BlockId, DirEntry, DiskInode, Geometry, InodeId, InodeKind};

mod error;
pub use error::{Error, Result};

pub use block_dev::BlockDevice;

pub const BLOCK_SIZE: usize = 512;
/// 每个 inode 预留的块编号个数，目前只使用第0个
pub const INODE_BLOCKS: usize = 16;
/// 目录项名字缓冲区的长度
pub const NAME_LEN: usize = 64;
/// 根目录的 inode 编号
pub const ROOT: InodeId = InodeId::new(1);

type DataBlock = [u8; BLOCK_SIZE];
