//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘、光盘、U盘等；
//! [`BlockDevice`] 是对读写镜像的抽象：文件系统按**字节偏移**定位读写，
//! 块的划分由上层的布局决定。
//!
//! 实现了此特质的类型称为**块设备驱动**。

mod ram_disk;

use std::fmt;
use std::io;

pub use self::ram_disk::RamDisk;

/// 块设备驱动特质
pub trait BlockDevice: Send + Sync + fmt::Debug {
    /// 从`offset`处读满`buf`，读不满视为错误
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    /// 将`buf`全部写到`offset`处，必要时扩展设备
    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<()>;

    /// 将尚未落盘的数据同步到设备
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}
