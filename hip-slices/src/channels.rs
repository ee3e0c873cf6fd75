//! 标签图的 one-hot 通道展开.
//!
//! 标签值直接作为通道索引使用, 因此标签应当是稠密的 `0..K` 非负整数.
//! [`to_channels`] 与 [`to_channels_with`] 对不满足该条件的像素静默置零;
//! [`to_channels_checked`] 则返回错误.

use crate::error::LabelError;
use itertools::Itertools;
use ndarray::{Array2, Array3, ArrayBase, ArrayView3, Axis, Data, Ix2};
use num::{One, ToPrimitive, Zero};

/// 收集 `labels` 中出现的所有不同取值, 升序排列. 多个 NaN 只计一次.
pub fn distinct_labels<S>(labels: &ArrayBase<S, Ix2>) -> Vec<f64>
where
    S: Data,
    S::Elem: ToPrimitive,
{
    labels
        .iter()
        .map(as_f64)
        .sorted_by(f64::total_cmp)
        .dedup_by(|a, b| a.total_cmp(b).is_eq())
        .collect()
}

/// 将标签图展开为 one-hot 通道, 通道数为 `labels` 中不同取值的个数 K.
///
/// 结果形状为 `(rows, cols, K)`. 值为 `c` 的像素在第 `c` 个通道上为 1.
/// 非整数、负数或不小于 K 的像素所有通道均为 0.
///
/// # 注意
///
/// K 由本图像决定. 批量加载时应当用 [`to_channels_with`] 固定通道数.
#[inline]
pub fn to_channels<T, S>(labels: &ArrayBase<S, Ix2>) -> Array3<T>
where
    T: Clone + Zero + One,
    S: Data,
    S::Elem: ToPrimitive,
{
    let k = distinct_labels(labels).len();
    to_channels_with(labels, k)
}

/// 同 [`to_channels`], 但通道数由 `channels` 显式给定.
pub fn to_channels_with<T, S>(labels: &ArrayBase<S, Ix2>, channels: usize) -> Array3<T>
where
    T: Clone + Zero + One,
    S: Data,
    S::Elem: ToPrimitive,
{
    let (rows, cols) = labels.dim();
    let mut res = Array3::<T>::zeros((rows, cols, channels));
    for ((h, w), label) in labels.indexed_iter() {
        if let Ok(c) = channel_of(as_f64(label), channels) {
            res[(h, w, c)] = T::one();
        }
    }
    res
}

/// 严格版本的 one-hot 展开.
///
/// `channels` 为 `None` 时通道数取不同取值的个数. 任何像素不能映射到
/// `0..channels` 中的通道时返回对应的 [`LabelError`].
pub fn to_channels_checked<T, S>(
    labels: &ArrayBase<S, Ix2>,
    channels: Option<usize>,
) -> Result<Array3<T>, LabelError>
where
    T: Clone + Zero + One,
    S: Data,
    S::Elem: ToPrimitive,
{
    let channels = channels.unwrap_or_else(|| distinct_labels(labels).len());
    let (rows, cols) = labels.dim();
    let mut res = Array3::<T>::zeros((rows, cols, channels));
    for ((h, w), label) in labels.indexed_iter() {
        let c = channel_of(as_f64(label), channels)?;
        res[(h, w, c)] = T::one();
    }
    Ok(res)
}

/// [`to_channels`] 的逆操作: 逐像素取值最大的通道作为标签.
///
/// 通道数为 0 时结果全为 0. 并列时取索引较小者.
/// 结果为 `u8`, 索引超过 255 的通道饱和为 255.
pub fn from_channels<T>(onehot: ArrayView3<'_, T>) -> Array2<u8>
where
    T: Copy + PartialOrd,
{
    onehot.map_axis(Axis(2), |lane| {
        lane.iter()
            .enumerate()
            .fold(None::<(usize, T)>, |best, (i, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((i, v)),
            })
            .map_or(0, |(i, _)| u8::try_from(i).unwrap_or(u8::MAX))
    })
}

#[inline]
fn as_f64<A: ToPrimitive>(v: &A) -> f64 {
    v.to_f64().unwrap_or(f64::NAN)
}

/// 将单个标签值映射为通道索引.
fn channel_of(label: f64, channels: usize) -> Result<usize, LabelError> {
    if !label.is_finite() || label.fract() != 0.0 {
        return Err(LabelError::NonInteger(label));
    }
    let c = label as i64;
    if c < 0 || c as u64 >= channels as u64 {
        return Err(LabelError::OutOfRange { label: c, channels });
    }
    Ok(c as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_one_hot_exactly_one_channel() {
        let labels = array![[0.0, 1.0, 2.0], [2.0, 2.0, 0.0], [1.0, 0.0, 3.0]];
        let res = to_channels::<u8, _>(&labels);
        assert_eq!(res.dim(), (3, 3, 4));

        for ((h, w), &l) in labels.indexed_iter() {
            let lane = res.index_axis(Axis(0), h);
            let lane = lane.index_axis(Axis(0), w);
            assert_eq!(lane.sum(), 1);
            assert_eq!(lane[l as usize], 1);
        }
    }

    #[test]
    fn test_distinct_labels() {
        let labels = array![[3u8, 1, 1], [0, 3, 1]];
        assert_eq!(distinct_labels(&labels), vec![0.0, 1.0, 3.0]);

        let labels = array![[f32::NAN, 1.0], [f32::NAN, 1.0]];
        assert_eq!(distinct_labels(&labels).len(), 2);
    }

    #[test]
    fn test_sparse_labels_are_dropped_leniently() {
        // {0, 2}: K = 2, 标签 2 没有可用通道.
        let labels = array![[0u8, 2], [2, 0]];
        let res = to_channels::<f32, _>(&labels);
        assert_eq!(res.dim(), (2, 2, 2));
        assert_eq!(res[(0, 0, 0)], 1.0);
        assert_eq!(res.index_axis(Axis(0), 0).index_axis(Axis(0), 1).sum(), 0.0);
    }

    #[test]
    fn test_checked_rejects_sparse_and_fractional() {
        let labels = array![[0u8, 2], [2, 0]];
        assert_eq!(
            to_channels_checked::<f32, _>(&labels, None).unwrap_err(),
            LabelError::OutOfRange {
                label: 2,
                channels: 2
            }
        );

        let labels = array![[0.0, 1.5]];
        assert_eq!(
            to_channels_checked::<f32, _>(&labels, None).unwrap_err(),
            LabelError::NonInteger(1.5)
        );

        let labels = array![[0.0, -1.0]];
        assert!(matches!(
            to_channels_checked::<f32, _>(&labels, Some(4)),
            Err(LabelError::OutOfRange { label: -1, .. })
        ));
    }

    #[test]
    fn test_explicit_channels_pad_missing_labels() {
        // 只出现 0 和 1, 但固定为 4 个通道.
        let labels = array![[0u8, 1], [1, 1]];
        let res = to_channels_checked::<f32, _>(&labels, Some(4)).unwrap();
        assert_eq!(res.dim(), (2, 2, 4));
        assert_eq!(res.index_axis(Axis(2), 3).sum(), 0.0);
        assert_eq!(res.index_axis(Axis(2), 1).sum(), 3.0);
    }

    #[test]
    fn test_from_channels_saturates() {
        let mut onehot = Array3::<f32>::zeros((1, 2, 300));
        onehot[(0, 0, 299)] = 1.0;
        onehot[(0, 1, 255)] = 1.0;
        assert_eq!(from_channels(onehot.view()), array![[255u8, 255]]);
    }

    #[test]
    fn test_from_channels_inverts() {
        let labels = array![[0u8, 1, 2], [3, 2, 1]];
        let res = to_channels::<f32, _>(&labels);
        assert_eq!(from_channels(res.view()), labels);
    }
}
