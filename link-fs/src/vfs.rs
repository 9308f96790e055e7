//! # 索引节点层
//!
//! 确立了文件系统的操作逻辑：目录项把 inode 连成文件树，
//! 链接与解链维护 inode 的引用计数，计数归零（目录为归一）时回收 inode 与数据块。
//!
//! 每个目录只有一个数据块，其中紧密排列着`size / DirEntry::SIZE`个目录项，
//! 前两项恒为`.`与`..`。

use enumflags2::bitflags;

use crate::layout::{DirEntry, DiskInode, InodeId, InodeKind, ENTRIES_PER_BLOCK};
use crate::path::Path;
use crate::LinkFileSystem;
use crate::{Error, Result};
use crate::{BLOCK_SIZE, ROOT};

/// 空目录的大小：只有`.`与`..`
const EMPTY_DIR_SIZE: usize = 2 * DirEntry::SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    pub inode: InodeId,
    pub kind: StatKind,
    pub size: u32,
    pub links: u32,
}

#[allow(clippy::upper_case_acronyms)]
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatKind {
    DIR = 0o040000,
    #[default]
    FILE = 0o100000,
}

impl LinkFileSystem {
    /// 列出目录下的全部目录项，包括`.`与`..`
    pub fn list(&self, dir: InodeId) -> Result<Vec<DirEntry>> {
        let dir_inode = self.read_inode(dir)?;
        if !dir_inode.is_dir() {
            return Err(Error::NotADirectory);
        }
        self.entries(&dir_inode)
    }

    /// 从根目录出发，逐个名字地查找绝对路径所指的 inode
    pub fn resolve(&self, path: &str) -> Result<InodeId> {
        path.components()?
            .into_iter()
            .try_fold(ROOT, |id, name| self.lookup(id, name))
    }

    /// 创建一个尚未链接到任何目录的普通文件，`hard_links`为0。
    ///
    /// 在调用 [`LinkFileSystem::link`] 之前，它只能通过 inode 编号访问，
    /// 并且槽位会被下一次 inode 分配视为空闲。
    pub fn create_file(&mut self, data: &[u8]) -> Result<InodeId> {
        if data.len() > BLOCK_SIZE {
            return Err(Error::FileTooLarge { len: data.len() });
        }

        // 先找 inode 槽位，inode 耗尽时位图保持原样
        let id = self.find_free_inode()?;
        let block = self.alloc_block()?;
        self.write_block(block, 0, data)?;
        self.write_inode(
            id,
            &DiskInode::new(InodeKind::Regular, data.len() as u32, 0, block),
        )?;

        log::debug!("Created file {id} of {} bytes in block {block}", data.len());
        Ok(id)
    }

    /// 在`dir`下以`name`创建并链接普通文件
    pub fn write_file(&mut self, dir: InodeId, name: &str, data: &[u8]) -> Result<InodeId> {
        let dir_inode = self.read_inode(dir)?;
        self.check_new_entry(&dir_inode, name)?;

        let id = self.create_file(data)?;
        if let Err(err) = self.link(id, name, dir) {
            let inode = self.read_inode(id)?;
            self.release(id, &inode)?;
            return Err(err);
        }
        Ok(id)
    }

    /// 在`parent`下以`name`创建目录。
    ///
    /// 新目录自带的`.`算一个链接，父目录中的目录项再算一个，故`hard_links`为2。
    pub fn create_directory(&mut self, parent: InodeId, name: &str) -> Result<InodeId> {
        let parent_inode = self.read_inode(parent)?;
        self.check_new_entry(&parent_inode, name)?;

        let id = self.find_free_inode()?;
        self.init_dir(id, parent)?;
        if let Err(err) = self.link(id, name, parent) {
            log::warn!("Rolling back directory {id}: {err}");
            let inode = self.read_inode(id)?;
            self.release(id, &inode)?;
            return Err(err);
        }
        Ok(id)
    }

    /// 在`dir`末尾追加指向`child`的目录项，`child`的`hard_links`加一
    pub fn link(&mut self, child: InodeId, name: &str, dir: InodeId) -> Result<()> {
        let mut dir_inode = self.read_inode(dir)?;
        // 从未分配过的槽位全为零，其块编号0实为根目录的块
        if self.read_inode(child)? == DiskInode::default() {
            return Err(Error::InvalidInode(child));
        }
        self.check_new_entry(&dir_inode, name)?;

        let entry = DirEntry::new(name, child)?;
        self.write_block(dir_inode.data_block(), dir_inode.size as usize, &entry.encode()?)?;
        dir_inode.size += DirEntry::SIZE as u32;
        self.write_inode(dir, &dir_inode)?;

        // child 可能就是 dir 本身，必须在写回 dir 之后重新读取
        let mut child_inode = self.read_inode(child)?;
        child_inode.links += 1;
        self.write_inode(child, &child_inode)?;

        log::debug!("Linked inode {child} as {name:?} in {dir}");
        Ok(())
    }

    /// 从`dir`中移除名为`name`的目录项，其后的目录项依次前移，
    /// 然后递减目标的引用计数。
    ///
    /// 目标是仍有子项的目录时拒绝操作，`dir`保持原样。
    pub fn unlink(&mut self, name: &str, dir: InodeId) -> Result<()> {
        let mut dir_inode = self.read_inode(dir)?;
        if !dir_inode.is_dir() {
            return Err(Error::NotADirectory);
        }
        if name == "." || name == ".." {
            return Err(Error::InvalidName);
        }

        let mut entries = self.entries(&dir_inode)?;
        let Some(index) = entries.iter().position(|entry| entry.is(name)) else {
            log::warn!("Unlink: {name:?} not found in directory {dir}");
            return Err(Error::NotFound);
        };

        let target = entries[index].inode();
        let target_inode = self.read_inode(target)?;
        if target_inode.is_dir() && target_inode.size as usize > EMPTY_DIR_SIZE {
            log::warn!("Unlink: directory {name:?} still has entries");
            return Err(Error::DirectoryNotEmpty);
        }

        entries.remove(index);
        let mut block = DirEntry::encode_all(&entries)?;
        // 空出的末尾槽位清零
        block.resize(dir_inode.size as usize, 0);
        self.write_block(dir_inode.data_block(), 0, &block)?;
        dir_inode.size -= DirEntry::SIZE as u32;
        self.write_inode(dir, &dir_inode)?;

        log::debug!("Unlinked {name:?} (inode {target}) from {dir}");
        self.decrement_links(target)
    }

    /// 引用计数减一。
    ///
    /// 计数归零，或目录只剩下自身`.`这一个链接时，
    /// 释放其数据块并清空 inode 记录。计数已为零时什么都不做。
    /// 仍有子项的目录不能递减。
    pub fn decrement_links(&mut self, id: InodeId) -> Result<()> {
        let mut inode = self.read_inode(id)?;
        if inode.links == 0 {
            return Ok(());
        }
        if inode.is_dir() && inode.size as usize > EMPTY_DIR_SIZE {
            return Err(Error::DirectoryNotEmpty);
        }

        inode.links -= 1;
        if inode.links == 0 || (inode.is_dir() && inode.links == 1) {
            self.release(id, &inode)
        } else {
            self.write_inode(id, &inode)
        }
    }

    /// 读出普通文件的全部内容
    pub fn read_file(&self, id: InodeId) -> Result<Vec<u8>> {
        let inode = self.read_inode(id)?;
        if inode.is_dir() {
            return Err(Error::IsADirectory);
        }

        let size = inode.size as usize;
        if size == 0 {
            return Ok(Vec::new());
        }

        let block = self.read_block(inode.data_block())?;
        block
            .get(..size)
            .map(<[u8]>::to_vec)
            .ok_or(Error::InvalidImage)
    }

    pub fn stat(&self, id: InodeId) -> Result<Stat> {
        let inode = self.read_inode(id)?;
        Ok(Stat {
            inode: id,
            kind: inode.kind.into(),
            size: inode.size,
            links: inode.links,
        })
    }
}

impl LinkFileSystem {
    /// 为`id`分配数据块，写入`.`与`..`两个目录项。
    ///
    /// 不把新目录链接到父目录；只有根目录（`id == parent`）以2个链接起步。
    pub(crate) fn init_dir(&mut self, id: InodeId, parent: InodeId) -> Result<()> {
        let entries = [DirEntry::new(".", id)?, DirEntry::new("..", parent)?];
        let data = DirEntry::encode_all(&entries)?;

        let block = self.alloc_block()?;
        self.write_block(block, 0, &data)?;

        let links = if id == parent { 2 } else { 1 };
        self.write_inode(
            id,
            &DiskInode::new(InodeKind::Directory, data.len() as u32, links, block),
        )
    }

    /// 目录数据块中的全部目录项
    fn entries(&self, dir_inode: &DiskInode) -> Result<Vec<DirEntry>> {
        let count = dir_inode.size as usize / DirEntry::SIZE;
        let block = self.read_block(dir_inode.data_block())?;
        DirEntry::decode_block(&block, count)
    }

    /// 在目录`dir`下查找名字，当前 inode 不是目录时也视为找不到
    fn lookup(&self, dir: InodeId, name: &str) -> Result<InodeId> {
        let dir_inode = self.read_inode(dir)?;
        if !dir_inode.is_dir() {
            log::debug!("Resolve: inode {dir} is not a directory");
            return Err(Error::NotFound);
        }

        self.entries(&dir_inode)?
            .iter()
            .find(|entry| entry.is(name))
            .map(DirEntry::inode)
            .ok_or_else(|| {
                log::debug!("Resolve: {name:?} not found in directory {dir}");
                Error::NotFound
            })
    }

    /// 确认可以在目录中追加名为`name`的目录项
    fn check_new_entry(&self, dir_inode: &DiskInode, name: &str) -> Result<()> {
        if !dir_inode.is_dir() {
            return Err(Error::NotADirectory);
        }
        DirEntry::check_name(name)?;

        let entries = self.entries(dir_inode)?;
        if entries.iter().any(|entry| entry.is(name)) {
            return Err(Error::AlreadyExists);
        }
        if entries.len() >= ENTRIES_PER_BLOCK {
            return Err(Error::DirectoryFull);
        }
        Ok(())
    }

    /// 归还 inode 的数据块并清空其记录
    fn release(&mut self, id: InodeId, inode: &DiskInode) -> Result<()> {
        let block = inode.data_block();
        self.dealloc_block(block)?;
        self.write_inode(id, &DiskInode::default())?;

        log::debug!("Released inode {id} and block {block}");
        Ok(())
    }
}

impl From<InodeKind> for StatKind {
    #[inline]
    fn from(kind: InodeKind) -> Self {
        match kind {
            InodeKind::Directory => Self::DIR,
            InodeKind::Regular => Self::FILE,
        }
    }
}
