use std::sync::Arc;

use block_dev::{BlockDevice, RamDisk};
use link_fs::{Geometry, LinkFileSystem};

pub const GEOMETRY: Geometry = Geometry::new(16, 64);

/// 新格式化的小镜像，同时返回底层设备以便重新打开
pub fn formatted(geometry: Geometry) -> (LinkFileSystem, Arc<RamDisk>) {
    let disk = Arc::new(RamDisk::new());
    let device: Arc<dyn BlockDevice> = disk.clone();
    let lfs = LinkFileSystem::format(device, geometry).unwrap();
    (lfs, disk)
}

pub fn reopen(disk: &Arc<RamDisk>, geometry: Geometry) -> LinkFileSystem {
    let device: Arc<dyn BlockDevice> = disk.clone();
    LinkFileSystem::open(device, geometry).unwrap()
}
