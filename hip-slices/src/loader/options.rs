//! 批量加载配置.

use crate::consts::{ACCEPTED_COLS, TARGET_COLS, TARGET_ROWS};
use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 标签无法作为 one-hot 通道索引时的处理方式.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LabelPolicy {
    /// 返回 [`crate::LabelError`], 中止整批加载.
    #[default]
    Strict,

    /// 静默忽略, 对应像素所有通道均为 0.
    Lenient,
}

/// 可接受的样本几何形状, 及裁剪目标.
///
/// 样本必须恰好有 `rows` 行, 列数属于 `cols`; 之后沿列方向居中裁剪到 `crop_to` 列.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geometry {
    /// 固定行数.
    pub rows: usize,

    /// 可接受的列数.
    pub cols: Vec<usize>,

    /// 裁剪后的列数.
    pub crop_to: usize,
}

impl Default for Geometry {
    /// HipMRI 切片: (256, 128) 或 (256, 144), 裁剪到 128 列.
    fn default() -> Self {
        Self {
            rows: TARGET_ROWS,
            cols: ACCEPTED_COLS.to_vec(),
            crop_to: TARGET_COLS,
        }
    }
}

impl Geometry {
    /// 形状 `(rows, cols)` 是否可接受.
    #[inline]
    pub fn accepts(&self, (rows, cols): Idx2d) -> bool {
        rows == self.rows && self.cols.contains(&cols) && cols >= self.crop_to
    }

    /// 裁剪后的空间形状.
    #[inline]
    pub fn output_shape(&self) -> Idx2d {
        (self.rows, self.crop_to)
    }
}

/// [`crate::load_data_2d`] 的选项. 默认全部关闭.
///
/// ```
/// use hip_slices::LoadOptions;
///
/// let opts = LoadOptions::new().norm_image(true).early_stop(true);
/// assert!(opts.norm_image && !opts.categorical);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadOptions {
    /// 对每个样本单独做 z-score 归一化.
    pub norm_image: bool,

    /// 将样本展开为 one-hot 通道.
    pub categorical: bool,

    /// 同时收集每个样本的仿射矩阵.
    pub affines: bool,

    /// 处理完索引 `consts::EARLY_STOP_INDEX + 1` 的样本后停止. 其余行保持为 0.
    pub early_stop: bool,

    /// 提前停止时, 是否把返回数组截断为实际加载的行数.
    pub truncate: bool,

    /// 显式给定 one-hot 通道数. `None` 时取第一个样本的不同标签个数.
    pub channels: Option<usize>,

    /// 非法标签的处理方式.
    pub labels: LabelPolicy,

    /// 可接受的样本形状.
    pub geometry: Geometry,
}

impl LoadOptions {
    /// 等价于 `Default::default()`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置 `norm_image`.
    #[inline]
    pub fn norm_image(mut self, yes: bool) -> Self {
        self.norm_image = yes;
        self
    }

    /// 设置 `categorical`.
    #[inline]
    pub fn categorical(mut self, yes: bool) -> Self {
        self.categorical = yes;
        self
    }

    /// 设置 `affines`.
    #[inline]
    pub fn affines(mut self, yes: bool) -> Self {
        self.affines = yes;
        self
    }

    /// 设置 `early_stop`.
    #[inline]
    pub fn early_stop(mut self, yes: bool) -> Self {
        self.early_stop = yes;
        self
    }

    /// 设置 `truncate`.
    #[inline]
    pub fn truncate(mut self, yes: bool) -> Self {
        self.truncate = yes;
        self
    }

    /// 设置 `channels`.
    #[inline]
    pub fn channels(mut self, channels: Option<usize>) -> Self {
        self.channels = channels;
        self
    }

    /// 设置 `labels`.
    #[inline]
    pub fn labels(mut self, policy: LabelPolicy) -> Self {
        self.labels = policy;
        self
    }

    /// 设置 `geometry`.
    #[inline]
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }
}
