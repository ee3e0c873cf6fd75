//! 图像文件与分割标签文件的配对.

use crate::consts::NII_GZ_SUFFIX;
use crate::error::DatasetError;
use itertools::{EitherOrBoth, Itertools};
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 图像与标签的配对方式.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PairMode {
    /// 按 [`pair_key`] 给出的文件名键配对. 落单或重复的键都是错误.
    #[default]
    ByKey,

    /// 两个目录各自按字典序排序后按位置配对. 仅检查文件数是否一致.
    Positional,
}

/// 文件名配对键: 去掉 `.nii.gz` 后缀和第一个 `_` 及其之前的部分.
///
/// 例如 `case_004_week_0.nii.gz` 和 `seg_004_week_0.nii.gz` 的键都是 `004_week_0`.
/// 不含 `_` 时键为去掉后缀的整个文件名.
pub fn pair_key(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    let stem = name.strip_suffix(NII_GZ_SUFFIX).unwrap_or(&name);
    match stem.split_once('_') {
        Some((_, rest)) => rest.to_owned(),
        None => stem.to_owned(),
    }
}

/// 按 `mode` 将 `images` 与 `segmentations` 配对. 结果按图像文件名键 (或位置) 升序排列.
pub fn pair_paths(
    images: Vec<PathBuf>,
    segmentations: Vec<PathBuf>,
    mode: PairMode,
) -> Result<Vec<(PathBuf, PathBuf)>, DatasetError> {
    match mode {
        PairMode::Positional => {
            if images.len() != segmentations.len() {
                return Err(DatasetError::CountMismatch {
                    images: images.len(),
                    segmentations: segmentations.len(),
                });
            }
            Ok(images.into_iter().zip(segmentations).collect())
        }
        PairMode::ByKey => {
            let images = keyed(images)?;
            let segmentations = keyed(segmentations)?;
            images
                .into_iter()
                .merge_join_by(segmentations, |a: &(String, PathBuf), b: &(String, PathBuf)| {
                    a.0.cmp(&b.0)
                })
                .map(|pair| match pair {
                    EitherOrBoth::Both((_, img), (_, seg)) => Ok((img, seg)),
                    EitherOrBoth::Left((_, path)) | EitherOrBoth::Right((_, path)) => {
                        Err(DatasetError::Unpaired { path })
                    }
                })
                .collect()
        }
    }
}

/// 计算键并按键排序. 出现重复键时返回错误.
fn keyed(paths: Vec<PathBuf>) -> Result<Vec<(String, PathBuf)>, DatasetError> {
    let v: Vec<(String, PathBuf)> = paths
        .into_iter()
        .map(|p| (pair_key(&p), p))
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .collect();
    if let Some(key) = v.iter().map(|(k, _)| k).duplicates().next() {
        return Err(DatasetError::DuplicateKey { key: key.clone() });
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| Path::new("/d").join(n)).collect()
    }

    #[test]
    fn test_pair_key() {
        assert_eq!(pair_key(Path::new("a/case_004_week_0.nii.gz")), "004_week_0");
        assert_eq!(pair_key(Path::new("seg_004_week_0.nii.gz")), "004_week_0");
        assert_eq!(pair_key(Path::new("plain.nii.gz")), "plain");
    }

    #[test]
    fn test_pair_by_key_ignores_listing_order() {
        let imgs = paths(&["case_002_week_1.nii.gz", "case_001_week_0.nii.gz"]);
        let segs = paths(&["seg_001_week_0.nii.gz", "seg_002_week_1.nii.gz"]);
        let pairs = pair_paths(imgs, segs, PairMode::ByKey).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, Path::new("/d/case_001_week_0.nii.gz"));
        assert_eq!(pairs[0].1, Path::new("/d/seg_001_week_0.nii.gz"));
        assert_eq!(pairs[1].1, Path::new("/d/seg_002_week_1.nii.gz"));
    }

    #[test]
    fn test_pair_by_key_rejects_orphans() {
        let imgs = paths(&["case_001.nii.gz", "case_002.nii.gz"]);
        let segs = paths(&["seg_001.nii.gz", "seg_003.nii.gz"]);
        let err = pair_paths(imgs, segs, PairMode::ByKey).unwrap_err();
        assert!(
            matches!(err, DatasetError::Unpaired { ref path } if path == Path::new("/d/case_002.nii.gz"))
        );
    }

    #[test]
    fn test_pair_by_key_rejects_duplicates() {
        let imgs = paths(&["case_001.nii.gz", "mri_001.nii.gz"]);
        let segs = paths(&["seg_001.nii.gz"]);
        let err = pair_paths(imgs, segs, PairMode::ByKey).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateKey { ref key } if key == "001"));
    }

    #[test]
    fn test_positional() {
        let imgs = paths(&["a.nii.gz", "b.nii.gz"]);
        let segs = paths(&["x.nii.gz", "y.nii.gz"]);
        let pairs = pair_paths(imgs.clone(), segs, PairMode::Positional).unwrap();
        assert_eq!(pairs[1].0, imgs[1]);
        assert_eq!(pairs[1].1, Path::new("/d/y.nii.gz"));

        let err = pair_paths(imgs, paths(&["x.nii.gz"]), PairMode::Positional).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::CountMismatch {
                images: 2,
                segmentations: 1
            }
        ));
    }
}
