//! 通用常量.

/// 训练用切片的固定行数.
pub const TARGET_ROWS: usize = 256;

/// 训练用切片裁剪后的固定列数.
pub const TARGET_COLS: usize = 128;

/// 数据集中合法的原始列数. 部分切片原本是 (256, 144), 加载时会居中裁剪到 128 列.
pub const ACCEPTED_COLS: [usize; 2] = [128, 144];

/// 提前终止阈值: 处理完索引大于该值的样本后停止.
/// 因此提前终止时实际加载 `EARLY_STOP_INDEX + 2` 个样本.
pub const EARLY_STOP_INDEX: usize = 20;

/// 数据集文件后缀.
pub const NII_GZ_SUFFIX: &str = ".nii.gz";

/// 分割标签目录前缀, 如 `keras_slices_seg_train`.
pub const SEG_DIR_PREFIX: &str = "seg_";

/// 覆盖数据集路径前缀的环境变量.
pub const PREFIX_ENV: &str = "HIPMRI_SLICES_PREFIX";

/// 未设置 [`PREFIX_ENV`] 时, 相对 `{用户主目录}/dataset` 的默认路径前缀.
/// 最后一项是目录名的公共前缀, 而不是完整目录.
pub const HOME_PREFIX: [&str; 2] = ["keras_slices_data", "keras_slices_"];
