mod common;

use std::sync::Arc;

use block_dev::{BlockDevice, RamDisk};
use link_fs::{BlockId, Error, Geometry, InodeKind, LinkFileSystem, StatKind, ROOT};

use common::{formatted, reopen, GEOMETRY};

#[test]
fn root_is_self_parented() {
    let (lfs, _) = formatted(GEOMETRY);

    let root = lfs.read_inode(ROOT).unwrap();
    assert_eq!(InodeKind::Directory, root.kind);
    assert_eq!(2, root.links);
    assert_eq!(136, root.size);
    assert_eq!(BlockId::new(0), root.data_block());

    let entries = lfs.list(ROOT).unwrap();
    let names: Vec<_> = entries.iter().map(|entry| entry.name()).collect();
    assert_eq!(vec![".", ".."], names);
    assert!(entries.iter().all(|entry| entry.inode() == ROOT));
}

#[test]
fn image_spans_the_whole_layout() {
    let (lfs, disk) = formatted(GEOMETRY);

    assert_eq!(GEOMETRY.image_len() as usize, disk.len());
    assert_eq!(GEOMETRY.blocks - 1, lfs.free_blocks());
    assert!(lfs.is_block_allocated(BlockId::new(0)));
}

#[test]
fn reopen_loads_the_bitmap() {
    let (mut lfs, disk) = formatted(GEOMETRY);
    lfs.write_file(ROOT, "a", b"hello").unwrap();
    let free = lfs.free_blocks();
    lfs.close().unwrap();

    let lfs = reopen(&disk, GEOMETRY);
    assert_eq!(free, lfs.free_blocks());
    assert!(lfs.is_block_allocated(BlockId::new(1)));

    let id = lfs.resolve("/a").unwrap();
    assert_eq!(b"hello".to_vec(), lfs.read_file(id).unwrap());
}

#[test]
fn open_rejects_blank_image() {
    let disk = Arc::new(RamDisk::new());
    disk.write_at(GEOMETRY.image_len() - 1, &[0]).unwrap();

    let device: Arc<dyn BlockDevice> = disk;
    assert!(matches!(
        LinkFileSystem::open(device, GEOMETRY),
        Err(Error::InvalidImage)
    ));
}

#[test]
fn open_rejects_short_image() {
    let device: Arc<dyn BlockDevice> = Arc::new(RamDisk::new());
    assert!(matches!(
        LinkFileSystem::open(device, GEOMETRY),
        Err(Error::Device(_))
    ));
}

#[test]
fn zero_geometry_is_rejected() {
    let device: Arc<dyn BlockDevice> = Arc::new(RamDisk::new());
    assert!(matches!(
        LinkFileSystem::format(device, Geometry::new(0, 8)),
        Err(Error::InvalidGeometry)
    ));
}

#[test]
fn default_geometry_matches_the_classic_layout() {
    let disk = Arc::new(RamDisk::new());
    let device: Arc<dyn BlockDevice> = disk.clone();
    let lfs = LinkFileSystem::format(device, Geometry::DEFAULT).unwrap();
    let image = disk.snapshot();

    // 根 inode：size=136, hard_links=2, DIRECTORY, blocks[0]=0
    assert_eq!(&image[..12], &[136, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0]);
    // 位图的第0位
    assert_eq!(0b1, image[77824]);
    // 块0中的“.”
    assert_eq!(&image[94208..94213], &[1, 0, 0, 0, b'.']);

    let stat = lfs.stat(ROOT).unwrap();
    assert_eq!(StatKind::DIR, stat.kind);
}
