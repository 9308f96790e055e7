use std::borrow::Cow;
use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};

use crate::layout::InodeId;
use crate::{Error, Result};
use crate::{BLOCK_SIZE, NAME_LEN};

/// 一个目录块最多容纳的目录项数
pub const ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DirEntry::SIZE;

/// 目录项：(子 inode 编号, 名字)
///
/// 名字不足 [`NAME_LEN`] 时以`\0`填充，恰好占满时没有结尾的`\0`。
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    inode: u32,
    name: [u8; NAME_LEN],
}

impl DirEntry {
    /// 目录项大小恒为68字节
    pub const SIZE: usize = 4 + NAME_LEN;

    /// 构造目录项，名字须通过 [`DirEntry::check_name`]
    pub fn new(name: &str, inode: InodeId) -> Result<Self> {
        Self::check_name(name)?;
        let mut buf = [0; NAME_LEN];
        buf[..name.len()].copy_from_slice(name.as_bytes());

        Ok(Self {
            inode: inode.get(),
            name: buf,
        })
    }

    /// 名字不能为空，不能含有`/`或`\0`，且要放得进名字缓冲区
    pub fn check_name(name: &str) -> Result<()> {
        if name.is_empty() || name.contains(['/', '\0']) {
            return Err(Error::InvalidName);
        }
        if name.len() > NAME_LEN {
            return Err(Error::NameTooLong);
        }
        Ok(())
    }

    #[inline]
    pub fn inode(&self) -> InodeId {
        InodeId::new(self.inode)
    }

    /// 去掉填充后的名字字节
    pub fn name_bytes(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(NAME_LEN);
        &self.name[..len]
    }

    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    #[inline]
    pub fn is(&self, name: &str) -> bool {
        self.name_bytes() == name.as_bytes()
    }

    /// 从目录块中解出前`count`个目录项
    pub fn decode_block(block: &[u8], count: usize) -> Result<Vec<Self>> {
        let mut reader = Cursor::new(block);
        (0..count)
            .map(|_| Self::read(&mut reader).map_err(Error::from))
            .collect()
    }

    /// 将目录项紧密排列编码
    pub fn encode_all(entries: &[Self]) -> Result<Vec<u8>> {
        let mut writer = Cursor::new(Vec::with_capacity(entries.len() * Self::SIZE));
        for entry in entries {
            entry.write(&mut writer)?;
        }
        Ok(writer.into_inner())
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Self::encode_all(core::slice::from_ref(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_of_entry() {
        let entry = DirEntry::new("..", InodeId::new(3)).unwrap();
        let bytes = entry.encode().unwrap();

        assert_eq!(DirEntry::SIZE, bytes.len());
        assert_eq!(&bytes[..6], &[3, 0, 0, 0, b'.', b'.']);
        assert!(bytes[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn full_length_name_has_no_terminator() {
        let name = "x".repeat(NAME_LEN);
        let entry = DirEntry::new(&name, InodeId::new(9)).unwrap();
        let bytes = entry.encode().unwrap();
        let decoded = DirEntry::decode_block(&bytes, 1).unwrap();

        assert_eq!(name, decoded[0].name());
        assert!(decoded[0].is(&name));
    }

    #[test]
    fn bad_names() {
        let long = "x".repeat(NAME_LEN + 1);
        assert!(matches!(DirEntry::check_name(""), Err(Error::InvalidName)));
        assert!(matches!(DirEntry::check_name("a/b"), Err(Error::InvalidName)));
        assert!(matches!(DirEntry::check_name("a\0"), Err(Error::InvalidName)));
        assert!(matches!(DirEntry::check_name(&long), Err(Error::NameTooLong)));
    }

    #[test]
    fn decode_stops_at_count() {
        let entries = [
            DirEntry::new(".", InodeId::new(1)).unwrap(),
            DirEntry::new("..", InodeId::new(1)).unwrap(),
            DirEntry::new("a", InodeId::new(2)).unwrap(),
        ];
        let mut block = [0u8; BLOCK_SIZE];
        let bytes = DirEntry::encode_all(&entries).unwrap();
        block[..bytes.len()].copy_from_slice(&bytes);

        let decoded = DirEntry::decode_block(&block, 2).unwrap();
        assert_eq!(&entries[..2], decoded.as_slice());
    }
}
