use std::io;

use thiserror::Error;

use crate::{BlockId, InodeId};

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no free inode left")]
    NoFreeInode,
    #[error("no free block left")]
    NoFreeBlock,

    #[error("no such file or directory")]
    NotFound,
    #[error("not a directory")]
    NotADirectory,
    #[error("is a directory")]
    IsADirectory,
    #[error("directory not empty")]
    DirectoryNotEmpty,
    #[error("name already exists in directory")]
    AlreadyExists,
    #[error("directory block has no room for another entry")]
    DirectoryFull,
    #[error("payload of {len} bytes does not fit in one block")]
    FileTooLarge { len: usize },
    #[error("name longer than the entry name buffer")]
    NameTooLong,
    #[error("invalid entry name")]
    InvalidName,
    #[error("invalid path")]
    InvalidPath,
    #[error("inode {0} is outside the inode table")]
    InvalidInode(InodeId),
    #[error("block {0} is not allocated")]
    BlockNotAllocated(BlockId),

    #[error("geometry needs at least one inode and one block")]
    InvalidGeometry,
    #[error("image does not hold a formatted filesystem")]
    InvalidImage,
    #[error(transparent)]
    Device(#[from] io::Error),
    #[error("malformed on-disk record")]
    Codec(#[from] binrw::Error),
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Device(err) => err,
            Error::NotFound => io::Error::new(io::ErrorKind::NotFound, err),
            Error::AlreadyExists => io::Error::new(io::ErrorKind::AlreadyExists, err),
            Error::InvalidName | Error::InvalidPath | Error::NameTooLong => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            err => io::Error::other(err),
        }
    }
}
