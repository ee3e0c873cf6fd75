use std::path::Path;

use ndarray::{Array2, ArrayD, ArrayViewD, Axis, Ix2};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::Affine;

mod affine;
pub(crate) mod slice;

pub use affine::affine_from_header;

cfg_if::cfg_if! {
    if #[cfg(feature = "preview")] {
        mod preview;

        pub use preview::ImgWriteVis;
    }
}

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// nifti 文件 header 的共用属性.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取 header 记录的维度个数.
    #[inline]
    fn ndim(&self) -> usize {
        self.header().dim[0] as usize
    }

    /// 获取单个体素分辨率, 以毫米为单位, 按 nifti 轴序 \[i, j, k\] 排列.
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, i, j, k, ..] = self.header().pixdim;
        [i as f64, j as f64, k as f64]
    }

    /// 获取体素到世界坐标的 4×4 仿射矩阵.
    ///
    /// 依次尝试 sform, qform; 两者都未设置时使用由分辨率和形状推导的基础仿射.
    #[inline]
    fn affine(&self) -> Affine {
        affine_from_header(self.header())
    }
}

/// 单个 nifti 体数据 (2D 切片或 3D 体), 包括 header 和体素值.
///
/// 体素值以 `f64` 保存, 已应用 header 中的 `scl_slope`/`scl_inter` 缩放.
/// 轴序与文件一致, 即 `data[[i, j, k]]`, 不做转置.
#[derive(Debug, Clone)]
pub struct Volume {
    header: BoxedHeader,
    data: ArrayD<f64>,
}

impl NiftiHeaderAttr for Volume {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Volume {
    /// 打开 nifti 文件 (`.nii` 或 `.nii.gz`). `path` 为文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());
        let data = obj.into_volume().into_ndarray::<f64>()?;
        Ok(Self { header, data })
    }

    /// 直接由 header 和数据拼接实体. 主要用于测试.
    #[inline]
    pub fn from_parts(header: NiftiHeader, data: ArrayD<f64>) -> Self {
        Self {
            header: Box::new(header),
            data,
        }
    }

    /// 数据的实际形状.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    /// 将数据折叠为 2D 切片.
    ///
    /// - 2D 数据原样返回;
    /// - 3D 数据只保留第三轴上的第 0 层 (数据集中偶尔带有多余的维度);
    /// - 其它维度返回 `None`.
    pub fn into_slice(self) -> Option<Array2<f64>> {
        match self.data.ndim() {
            2 => self.data.into_dimensionality::<Ix2>().ok(),
            3 if self.data.len_of(Axis(2)) > 0 => Some(
                self.data
                    .index_axis(Axis(2), 0)
                    .into_dimensionality::<Ix2>()
                    .ok()?
                    .to_owned(),
            ),
            _ => None,
        }
    }

    /// 同时取出仿射矩阵和折叠后的 2D 切片.
    ///
    /// 切片失败时返回原始形状, 便于报告错误.
    pub fn into_affine_and_slice(self) -> (Affine, Result<Array2<f64>, Vec<usize>>) {
        let affine = self.affine();
        let shape = self.shape().to_vec();
        (affine, self.into_slice().ok_or(shape))
    }
}
