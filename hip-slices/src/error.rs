//! 运行时错误.

use std::path::PathBuf;
use thiserror::Error;

/// 标签值不能作为 one-hot 通道索引.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LabelError {
    /// 标签不是整数 (包括 NaN 和 inf).
    #[error("标签值 {0} 不是整数")]
    NonInteger(f64),

    /// 标签是整数, 但不在 `0..channels` 范围内.
    #[error("标签值 {label} 超出通道范围 0..{channels}")]
    OutOfRange {
        /// 违规标签.
        label: i64,
        /// 通道数.
        channels: usize,
    },
}

/// 批量加载错误. 任一样本出错都会中止整批加载.
#[derive(Debug, Error)]
pub enum LoadError {
    /// 没有给出任何输入路径.
    #[error("输入路径为空")]
    EmptyInput,

    /// nifti 文件无法打开或解析.
    #[error("无法读取 `{}`: {source}", .path.display())]
    Nifti {
        /// 出错文件.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: nifti::error::NiftiError,
    },

    /// 样本空间形状不是可接受的几何形状之一.
    #[error(
        "`{}` 的图像形状不可接受 (默认只接受 (256, 128) 或 (256, 144)). Shape: {shape:?}",
        .path.display()
    )]
    Format {
        /// 出错文件.
        path: PathBuf,
        /// 违规形状 (裁剪前, one-hot 时包含通道维).
        shape: Vec<usize>,
    },

    /// 严格模式下, 标签无法展开为 one-hot.
    #[error("`{}` 标签非法: {source}", .path.display())]
    Label {
        /// 出错文件.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: LabelError,
    },
}

/// 未知的数据集划分名.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("未知的数据集划分 `{0}`, 必须是 'train', 'test' 或 'validate'")]
pub struct PartitionError(pub String);

/// 数据集 (图像 + 标签) 加载错误.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// 划分名非法. 此时不会发生任何 I/O.
    #[error(transparent)]
    Partition(#[from] PartitionError),

    /// 既没有设置环境变量, 也无法获取用户主目录.
    #[error("无法确定数据集路径前缀")]
    NoRoot,

    /// 列目录失败.
    #[error("无法列出目录 `{}`: {source}", .path.display())]
    Io {
        /// 出错目录.
        path: PathBuf,
        /// 底层错误.
        #[source]
        source: std::io::Error,
    },

    /// 按键配对时, 某个文件找不到对应的另一半.
    #[error("`{}` 没有对应的图像或标签", .path.display())]
    Unpaired {
        /// 落单的文件.
        path: PathBuf,
    },

    /// 按键配对时, 同一目录下出现重复的键.
    #[error("配对键 `{key}` 重复")]
    DuplicateKey {
        /// 重复的键.
        key: String,
    },

    /// 按位置配对时, 两个目录文件数不一致.
    #[error("图像文件 {images} 个, 标签文件 {segmentations} 个, 无法按位置配对")]
    CountMismatch {
        /// 图像文件数.
        images: usize,
        /// 标签文件数.
        segmentations: usize,
    },

    /// 批量加载失败.
    #[error(transparent)]
    Load(#[from] LoadError),
}
