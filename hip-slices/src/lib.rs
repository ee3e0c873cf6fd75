#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 将 HipMRI 数据集 (keras_slices 格式) 的 2D MRI 切片和对应的分割标签
//! nifti 文件批量加载为固定大小的 `f32` 数组, 供分割模型训练使用.
//!
//! # 注意
//!
//! 1. 该 crate 只负责数据读入, 不包含模型、训练循环和数据增强.
//! 2. 加载是单线程、顺序的. 批数组按输入路径个数一次性预分配.
//! 3. 所有错误均以 `Result` 返回, 一个样本出错即整批失败, 不做跳过或重试.
//!
//! # 功能
//!
//! ### 单个 nifti 文件读取 ✅
//!
//! 读取 2D/3D 体数据 (以 `f64` 保存) 与其 4×4 仿射矩阵.
//!
//! 实现位于 `hip-slices/src/data`.
//!
//! ### 标签 one-hot 展开 ✅
//!
//! 宽松模式与原始行为一致; 严格模式拒绝非整数或越界标签.
//!
//! 实现位于 `hip-slices/src/channels.rs`.
//!
//! ### 批量加载 ✅
//!
//! 预分配、逐样本读取、z-score 归一化、one-hot 展开、形状校验与中心裁剪.
//!
//! 实现位于 `hip-slices/src/loader`.
//!
//! ### 数据集划分与图像/标签配对 ✅
//!
//! `train`/`test`/`validate` 三种划分; 默认按文件名键配对,
//! 也可退回按字典序位置配对.
//!
//! 实现位于 `hip-slices/src/dataset`.
//!
//! ### 切片预览图 ✅
//!
//! 开启 `preview` feature 时可将单个样本保存为灰度 PNG.

/// 二维形状 (行, 列), 同时也可用作二维索引.
pub type Idx2d = (usize, usize);

/// 4×4 仿射矩阵, 将体素索引映射到物理 (世界) 坐标. 行优先.
pub type Affine = [[f64; 4]; 4];

pub mod channels;
pub mod consts;
mod data;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod prelude;

pub use data::{NiftiHeaderAttr, Volume};

#[cfg(feature = "preview")]
pub use data::ImgWriteVis;

pub use channels::{from_channels, to_channels, to_channels_checked, to_channels_with};
pub use dataset::{load_img_seg_pair, DatasetLayout, PairMode, PairOptions, Partition};
pub use error::{DatasetError, LabelError, LoadError, PartitionError};
pub use loader::{load_data_2d, Batch, Geometry, LabelPolicy, LoadOptions};
