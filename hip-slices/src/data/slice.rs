//! 单个样本的逐像素处理: 归一化与居中裁剪.

use ndarray::{ArrayBase, ArrayView, Axis, Data, DataMut, Dimension, Slice};
use num::{Float, FromPrimitive};

/// 居中裁剪时的起始列: 两侧各去掉 `(cols - width) / 2` 列.
///
/// 若 `cols < width`, 返回 `None`.
#[inline]
pub fn crop_offset(cols: usize, width: usize) -> Option<usize> {
    cols.checked_sub(width).map(|d| d / 2)
}

/// 沿第 1 轴 (列) 将 `arr` 居中裁剪为 `width` 列. 其它轴不变.
///
/// 列数不足 `width` 或 `arr` 不足二维时返回 `None`.
pub fn center_crop_cols<S, D>(arr: &ArrayBase<S, D>, width: usize) -> Option<ArrayView<'_, S::Elem, D>>
where
    S: Data,
    D: Dimension,
{
    if arr.ndim() < 2 {
        return None;
    }
    let start = crop_offset(arr.len_of(Axis(1)), width)?;
    Some(arr.slice_axis(Axis(1), Slice::from(start..start + width)))
}

/// 将 `arr` 就地替换为其 z-score: `(x - mean) / std`, 其中 `std` 为总体标准差.
///
/// 若标准差为 0 (常数图像) 或无意义, 则只减去均值, 并返回 `false`.
/// 空数组不做任何修改.
pub fn zscore_inplace<T, S, D>(arr: &mut ArrayBase<S, D>) -> bool
where
    T: Float + FromPrimitive,
    S: DataMut<Elem = T>,
    D: Dimension,
{
    let Some(mean) = arr.mean() else {
        return false;
    };
    let std = arr.std(T::zero());
    if std > T::zero() && std.is_finite() {
        arr.mapv_inplace(|x| (x - mean) / std);
        true
    } else {
        arr.mapv_inplace(|x| x - mean);
        false
    }
}
