use crate::{Error, Result};

pub trait Path {
    fn is_absolute(&self) -> bool;

    /// 拆出绝对路径中依次要查找的各个名字。
    ///
    /// - `/` 没有任何名字；
    /// - 结尾的`/`带来的空名字视为路径结束；
    /// - 其余位置出现空名字（如`//a`、`/a//b`）即为非法路径。
    fn components(&self) -> Result<Vec<&str>>;

    fn is_relative(&self) -> bool {
        !self.is_absolute()
    }
}

impl Path for str {
    fn is_absolute(&self) -> bool {
        self.starts_with('/')
    }

    fn components(&self) -> Result<Vec<&str>> {
        let rest = self.strip_prefix('/').ok_or(Error::InvalidPath)?;
        if rest.is_empty() {
            return Ok(Vec::new());
        }

        let mut cmps: Vec<&str> = rest.split('/').collect();
        if cmps.last().is_some_and(|cmp| cmp.is_empty()) {
            cmps.pop();
        }
        if cmps.iter().any(|cmp| cmp.is_empty()) {
            return Err(Error::InvalidPath);
        }

        Ok(cmps)
    }
}
