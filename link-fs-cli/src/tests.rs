use std::io;
use std::sync::Arc;

use block_dev::BlockDevice;
use link_fs::{Geometry, LinkFileSystem, ROOT};
use tempfile::TempDir;

use crate::BlockFile;

const GEOMETRY: Geometry = Geometry::new(16, 64);

#[test]
fn image_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fs.img");

    let mut lfs = LinkFileSystem::format(Arc::new(BlockFile::create(&path).unwrap()), GEOMETRY)
        .unwrap();
    let docs = lfs.create_directory(ROOT, "docs").unwrap();
    lfs.write_file(docs, "readme", b"hello, image").unwrap();
    lfs.close().unwrap();

    assert_eq!(
        GEOMETRY.image_len(),
        std::fs::metadata(&path).unwrap().len()
    );

    let lfs = LinkFileSystem::open(Arc::new(BlockFile::open(&path).unwrap()), GEOMETRY).unwrap();
    let id = lfs.resolve("/docs/readme").unwrap();
    assert_eq!(b"hello, image".to_vec(), lfs.read_file(id).unwrap());
    assert_eq!(GEOMETRY.blocks - 3, lfs.free_blocks());
}

#[test]
fn open_missing_image() {
    let dir = TempDir::new().unwrap();
    let err = BlockFile::open(dir.path().join("missing.img")).unwrap_err();
    assert_eq!(io::ErrorKind::NotFound, err.kind());
}

#[test]
fn read_past_end() {
    let dir = TempDir::new().unwrap();
    let file = BlockFile::create(dir.path().join("short.img")).unwrap();
    file.write_at(0, &[1, 2, 3]).unwrap();

    let mut buf = [0; 4];
    let err = file.read_at(0, &mut buf).unwrap_err();
    assert_eq!(io::ErrorKind::UnexpectedEof, err.kind());

    let mut buf = [0; 2];
    file.read_at(1, &mut buf).unwrap();
    assert_eq!([2, 3], buf);
}
