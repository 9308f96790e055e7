mod cli;

use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command};
use link_fs::{LinkFileSystem, StatKind};
use link_fs_cli::BlockFile;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let geometry = cli.geometry();

    match cli.command {
        Command::Create => {
            let block_file = Arc::new(BlockFile::create(&cli.image)?);
            let lfs = LinkFileSystem::format(block_file, geometry)?;
            println!("image={:?} size={}", cli.image, geometry.image_len());
            lfs.close()?;
        }
        command => {
            let block_file = Arc::new(BlockFile::open(&cli.image)?);
            let mut lfs = LinkFileSystem::open(block_file, geometry)?;
            let result = execute(&mut lfs, command, &mut io::stdout().lock());
            lfs.close()?;
            result?;
        }
    }

    Ok(())
}

fn execute(
    lfs: &mut LinkFileSystem,
    command: Command,
    out: &mut impl Write,
) -> link_fs::Result<()> {
    match command {
        Command::Create => unreachable!("images are formatted before being opened"),
        Command::Ls { path } => {
            let dir = lfs.resolve(&path)?;
            writeln!(out, "TYPE\tSIZE\tLINKS\tINODE\tNAME")?;
            for entry in lfs.list(dir)? {
                let stat = lfs.stat(entry.inode())?;
                let ty = if stat.kind == StatKind::DIR { 'D' } else { 'R' };
                writeln!(
                    out,
                    "{ty}\t{}\t{}\t{}\t{}",
                    stat.size,
                    stat.links,
                    stat.inode,
                    entry.name()
                )?;
            }
        }
        Command::Link { target, dir, name } => {
            let target = lfs.resolve(&target)?;
            let dir = lfs.resolve(&dir)?;
            lfs.link(target, &name, dir)?;
        }
        Command::Write { dir, name, text } => {
            let dir = lfs.resolve(&dir)?;
            let id = lfs.write_file(dir, &name, text.as_bytes())?;
            log::info!("Wrote {} bytes to inode {id}", text.len());
        }
        Command::Cat { path } => {
            let id = lfs.resolve(&path)?;
            writeln!(out, "{}", String::from_utf8_lossy(&lfs.read_file(id)?))?;
        }
        Command::Mkdir { parent, name } => {
            let parent = lfs.resolve(&parent)?;
            let id = lfs.create_directory(parent, &name)?;
            log::info!("Created directory inode {id}");
        }
        Command::Unlink { dir, name } => {
            let dir = lfs.resolve(&dir)?;
            lfs.unlink(&name, dir)?;
        }
    }

    Ok(())
}
