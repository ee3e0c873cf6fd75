//! 数据集操作.
//!
//! 目录布局: 图像位于 `{prefix}{partition}`, 分割标签位于 `{prefix}seg_{partition}`,
//! 其中 `prefix` 是目录名的公共前缀 (例如 `.../keras_slices_`), 而不是目录本身.

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::consts::{HOME_PREFIX, NII_GZ_SUFFIX, PREFIX_ENV, SEG_DIR_PREFIX};
use crate::error::{DatasetError, PartitionError};
use crate::loader::{load_data_2d, Batch, LoadOptions};

mod pairing;

pub use pairing::{pair_key, pair_paths, PairMode};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 数据集划分.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Partition {
    /// 训练集.
    Train,

    /// 测试集.
    Test,

    /// 验证集.
    Validate,
}

impl Partition {
    /// 全部划分.
    pub const ALL: [Partition; 3] = [Partition::Train, Partition::Test, Partition::Validate];

    /// 目录名中使用的划分名.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Partition::Train => "train",
            Partition::Test => "test",
            Partition::Validate => "validate",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Partition {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Partition::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PartitionError(s.to_owned()))
    }
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 列出 `dir` 下所有 `.nii.gz` 文件, 按字典序排序.
pub fn list_nii_gz<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>, DatasetError> {
    let dir = dir.as_ref();
    let io_error = |source| DatasetError::Io {
        path: dir.to_owned(),
        source,
    };
    let mut ans = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_nii_gz = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(NII_GZ_SUFFIX));
        if is_nii_gz && path.is_file() {
            ans.push(path);
        }
    }
    ans.sort();
    Ok(ans)
}

/// [`DatasetLayout::load_img_seg_pair`] 的选项.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairOptions {
    /// 配对方式.
    pub mode: PairMode,

    /// 图像的加载选项. 默认做 z-score 归一化.
    pub images: LoadOptions,

    /// 分割标签的加载选项. 默认不做任何处理.
    pub segmentations: LoadOptions,
}

impl Default for PairOptions {
    fn default() -> Self {
        Self {
            mode: PairMode::default(),
            images: LoadOptions::new().norm_image(true),
            segmentations: LoadOptions::new(),
        }
    }
}

/// 数据集目录布局, 由路径前缀唯一确定.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatasetLayout {
    prefix: PathBuf,
}

impl DatasetLayout {
    /// 以 `prefix` 为目录名前缀创建布局.
    #[inline]
    pub fn new<P: Into<PathBuf>>(prefix: P) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// 获取数据集布局.
    ///
    /// 1. 若环境变量 `$HIPMRI_SLICES_PREFIX` 非空, 则以其值为前缀;
    /// 2. 否则, 以 `$HOME/dataset/keras_slices_data/keras_slices_` 为前缀.
    ///
    /// 两者都不可用时返回 `None`.
    pub fn from_env_or_home() -> Option<Self> {
        match std::env::var_os(PREFIX_ENV) {
            Some(p) if !p.is_empty() => Some(Self::new(p)),
            _ => home_dataset_dir_with(HOME_PREFIX).map(Self::new),
        }
    }

    /// 路径前缀.
    #[inline]
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// 前缀后直接拼接 `parts`, 不插入路径分隔符.
    fn join_raw(&self, parts: &[&str]) -> PathBuf {
        let mut s = OsString::from(self.prefix.as_os_str());
        parts.iter().for_each(|p| s.push(p));
        PathBuf::from(s)
    }

    /// `partition` 的图像目录.
    #[inline]
    pub fn image_dir(&self, partition: Partition) -> PathBuf {
        self.join_raw(&[partition.as_str()])
    }

    /// `partition` 的分割标签目录.
    #[inline]
    pub fn seg_dir(&self, partition: Partition) -> PathBuf {
        self.join_raw(&[SEG_DIR_PREFIX, partition.as_str()])
    }

    /// 列出并配对 `partition` 下的 (图像, 标签) 文件.
    pub fn pair_files(
        &self,
        partition: Partition,
        mode: PairMode,
    ) -> Result<Vec<(PathBuf, PathBuf)>, DatasetError> {
        let images = list_nii_gz(self.image_dir(partition))?;
        let segmentations = list_nii_gz(self.seg_dir(partition))?;
        log::info!(
            "Found {} images and {} segmentations for `{partition}`",
            images.len(),
            segmentations.len()
        );
        pair_paths(images, segmentations, mode)
    }

    /// 加载 `partition` 的全部图像和分割标签, 返回 `(images, segmentations)`.
    ///
    /// `partition` 必须是 `train`, `test` 或 `validate`, 否则在任何 I/O
    /// 之前返回 [`DatasetError::Partition`].
    pub fn load_img_seg_pair(
        &self,
        partition: &str,
        opts: &PairOptions,
    ) -> Result<(Batch, Batch), DatasetError> {
        let partition: Partition = partition.parse()?;
        let (images, segmentations): (Vec<_>, Vec<_>) =
            self.pair_files(partition, opts.mode)?.into_iter().unzip();

        let images = load_data_2d::<f32, _>(&images, &opts.images)?;
        let segmentations = load_data_2d::<f32, _>(&segmentations, &opts.segmentations)?;
        Ok((images, segmentations))
    }
}

/// 从默认布局 ([`DatasetLayout::from_env_or_home`]) 加载 `partition` 的图像与标签.
/// 图像做 z-score 归一化, 标签不做处理.
pub fn load_img_seg_pair(partition: &str) -> Result<(Batch, Batch), DatasetError> {
    // 先校验划分名, 保证非法输入不触发任何 I/O.
    let _: Partition = partition.parse()?;
    let layout = DatasetLayout::from_env_or_home().ok_or(DatasetError::NoRoot)?;
    layout.load_img_seg_pair(partition, &PairOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_parse() {
        for p in Partition::ALL {
            assert_eq!(p.as_str().parse::<Partition>(), Ok(p));
        }
        assert_eq!(
            "bogus".parse::<Partition>(),
            Err(PartitionError("bogus".to_owned()))
        );
        assert!("Train".parse::<Partition>().is_err());
    }

    #[test]
    fn test_layout_dirs() {
        let layout = DatasetLayout::new("/data/keras_slices_");
        assert_eq!(
            layout.image_dir(Partition::Train),
            Path::new("/data/keras_slices_train")
        );
        assert_eq!(
            layout.seg_dir(Partition::Validate),
            Path::new("/data/keras_slices_seg_validate")
        );
    }

    #[test]
    fn test_bogus_partition_does_no_io() {
        let layout = DatasetLayout::new("/definitely/not/here/keras_slices_");
        let err = layout
            .load_img_seg_pair("bogus", &PairOptions::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Partition(PartitionError(ref s)) if s == "bogus"));

        let err = load_img_seg_pair("bogus").unwrap_err();
        assert!(matches!(err, DatasetError::Partition(_)));
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let layout = DatasetLayout::new("/definitely/not/here/keras_slices_");
        let err = layout
            .load_img_seg_pair("test", &PairOptions::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }
}
